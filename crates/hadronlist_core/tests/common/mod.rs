#![allow(dead_code)]

use hadronlist_core::{parse_master, validate, Catalog, IntermediateStates, ValidationPolicy};
use std::path::PathBuf;

pub const MASTER: &str = include_str!("../../../../data/master_sample.tsv");
pub const INTERMEDIATES: &str = include_str!("../../../../data/intermediate_states.json");

/// Sample master with the N(1440)0 -> p pi- ratio raised by 0.01.
pub fn perturbed_master() -> String {
    let perturbed = MASTER.replace("12112\t0.4643\t", "12112\t0.4743\t");
    assert_ne!(perturbed, MASTER, "perturbation target missing from sample");
    perturbed
}

pub fn catalog() -> Catalog {
    parse_master(MASTER).unwrap()
}

pub fn validated() -> Catalog {
    validate(&catalog(), &ValidationPolicy::default())
        .unwrap()
        .catalog
}

pub fn intermediates() -> IntermediateStates {
    IntermediateStates::from_json_str(INTERMEDIATES).unwrap()
}

pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(name)
}
