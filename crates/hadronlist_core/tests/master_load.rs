mod common;

use hadronlist_core::{load_master, parse_master, Charges, ParseError, Parity};

#[test]
fn sample_master_loads_with_derived_antiparticles() {
    let catalog = common::catalog();
    // 15 listed species, 12 of them with a distinct antiparticle.
    assert_eq!(catalog.len(), 27);
    for pid in [111, 221, 113] {
        assert!(!catalog.contains(-pid), "{pid} is self-conjugate");
    }

    let antiproton = catalog.get(-2212).unwrap();
    assert_eq!(antiproton.name, "anti-p");
    assert_eq!(antiproton.charge, -1);
    assert_eq!(antiproton.baryon_number, -1);
    assert_eq!(antiproton.parity, Some(Parity::Negative));
    assert!(antiproton.is_conjugate_of(catalog.get(2212).unwrap()));

    assert_eq!(catalog.get(-211).unwrap().name, "π-");
}

#[test]
fn antiparticles_inherit_conjugated_channels() {
    let catalog = common::catalog();
    let channels = catalog.decays_of(-1214);
    assert_eq!(channels.len(), 3);
    assert_eq!(channels[0].daughters, vec![-2212, 211]);
    assert_eq!(channels[1].daughters, vec![-2112, 111]);
    assert_eq!(channels[2].daughters, vec![-2112, 211, -211]);
    assert_eq!(channels[2].branching_ratio, 0.4);
}

#[test]
fn stable_flag_follows_decay_table() {
    let catalog = common::catalog();
    assert!(catalog.get(2212).unwrap().stable);
    assert!(catalog.get(-321).unwrap().stable);
    assert!(!catalog.get(1214).unwrap().stable);
    assert!(!catalog.get(-2224).unwrap().stable);
}

#[test]
fn charges_of_listed_states_are_read_from_named_columns() {
    let catalog = common::catalog();
    let kaon = catalog.get(321).unwrap();
    assert_eq!(
        kaon.charges(),
        Charges {
            baryon: 0,
            strangeness: 1,
            charm: 0,
            bottom: 0,
            charge: 1,
        }
    );
    assert_eq!(kaon.isospin_z.doubled(), 1);
    assert_eq!(catalog.get(1214).unwrap().spin_doubled(), 3);
}

#[test]
fn load_master_reads_the_sample_file() {
    let from_file = load_master(&common::data_path("master_sample.tsv")).unwrap();
    assert_eq!(from_file, common::catalog());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_master(&dir.path().join("absent.tsv")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
}

#[test]
fn decay_of_unlisted_mother_is_rejected() {
    let text = format!("{}9999\t1\t211\t-211\t\t\t\n", common::MASTER);
    let err = parse_master(&text).unwrap_err();
    assert!(matches!(err, ParseError::UnknownMother { mother: 9999, .. }));
}

#[test]
fn missing_decay_section_is_rejected() {
    let particles_only = common::MASTER.split("#! decays").next().unwrap();
    let err = parse_master(particles_only).unwrap_err();
    assert!(matches!(err, ParseError::MissingSection("decays")));
}
