mod common;

use hadronlist_core::{
    parse_master, validate, ValidationPolicy, ValidationWarning, Violation,
};

#[test]
fn sample_master_passes_and_drops_closed_channel() {
    let model = validate(&common::catalog(), &ValidationPolicy::default()).unwrap();

    let exclusions: Vec<_> = model.kinematic_exclusions().collect();
    assert_eq!(exclusions.len(), 2);
    assert!(exclusions
        .iter()
        .any(|exclusion| exclusion.mother == 12112 && exclusion.daughters == vec![2112, 113]));
    assert!(exclusions.iter().any(|exclusion| exclusion.mother == -12112));

    let kept = model.catalog.decays_of(12112);
    assert_eq!(kept.len(), 3);
    let sum: f64 = kept.iter().map(|channel| channel.branching_ratio).sum();
    assert!((sum - 1.0).abs() < 1e-12);
    assert!((kept[0].branching_ratio - 0.4643 / 0.9).abs() < 1e-12);
}

#[test]
fn untouched_mothers_keep_their_ratios() {
    let model = validate(&common::catalog(), &ValidationPolicy::default()).unwrap();
    let ratios: Vec<f64> = model
        .catalog
        .decays_of(1214)
        .iter()
        .map(|channel| channel.branching_ratio)
        .collect();
    assert_eq!(ratios, vec![0.4, 0.2, 0.4]);
}

#[test]
fn perturbed_ratio_is_fatal() {
    let catalog = parse_master(&common::perturbed_master()).unwrap();
    let err = validate(&catalog, &ValidationPolicy::default()).unwrap_err();
    let sum = err
        .violations
        .iter()
        .find_map(|violation| match violation {
            Violation::BranchingRatioSum { mother: 12112, sum } => Some(*sum),
            _ => None,
        })
        .unwrap();
    assert!((sum - 1.01).abs() < 1e-9);
    // The derived antiparticle carries the same error.
    assert!(err.violations.iter().any(|violation| matches!(
        violation,
        Violation::BranchingRatioSum { mother: -12112, .. }
    )));
}

#[test]
fn loose_tolerance_accepts_perturbed_ratio() {
    let catalog = parse_master(&common::perturbed_master()).unwrap();
    let policy = ValidationPolicy {
        br_rel_tolerance: 0.02,
        ..ValidationPolicy::default()
    };
    assert!(validate(&catalog, &policy).is_ok());
}

#[test]
fn hypercharge_mismatch_is_reported_with_every_other_violation() {
    let text = common::perturbed_master().replace(
        "321\tK+\t0.493677\t0\t1\t0\t1\t0\t0\t0.5\t0.5\t1\t",
        "321\tK+\t0.493677\t0\t1\t0\t1\t0\t0\t0.5\t0.5\t0\t",
    );
    let catalog = parse_master(&text).unwrap();
    let err = validate(&catalog, &ValidationPolicy::default()).unwrap_err();
    assert!(err.violations.iter().any(|violation| matches!(
        violation,
        Violation::HyperchargeMismatch {
            pid: 321,
            charge: 0,
            expected_doubled: 2,
        }
    )));
    assert!(err
        .violations
        .iter()
        .any(|violation| matches!(violation, Violation::BranchingRatioSum { .. })));
    assert!(err.to_string().contains("321"));
}

#[test]
fn retained_channels_conserve_quantum_numbers() {
    let catalog = common::validated();
    for (mother, channels) in catalog.decay_table() {
        let charges = catalog.get(*mother).unwrap().charges();
        for channel in channels {
            assert_eq!(
                catalog.total_charges(&channel.daughters),
                Some(charges),
                "{mother} -> {:?}",
                channel.daughters
            );
            assert!(catalog.total_mass(&channel.daughters).unwrap() <= catalog.get(*mother).unwrap().mass);
        }
    }
}

#[test]
fn listed_states_satisfy_hypercharge_and_conjugation() {
    let catalog = common::validated();
    for particle in catalog.particles() {
        assert!(particle.satisfies_hypercharge_relation(), "{}", particle.pid);
        if particle.pid < 0 {
            assert!(particle.is_conjugate_of(catalog.get(-particle.pid).unwrap()));
        }
    }
}

#[test]
fn warnings_do_not_include_stable_or_consistent_states() {
    let model = validate(&common::catalog(), &ValidationPolicy::default()).unwrap();
    assert!(!model.warnings.iter().any(|warning| matches!(
        warning,
        ValidationWarning::WidthWithoutDecays { .. } | ValidationWarning::AllChannelsExcluded { .. }
    )));
}
