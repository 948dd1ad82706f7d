mod common;

use hadronlist_core::table::listing::{
    parse_mass_order, parse_mass_order_decays, parse_thermal_fist_decays, parse_thermal_fist_list,
};
use hadronlist_core::{
    check_lists, export, reduce_multibody, CheckOptions, ExportFormat, ExportOptions,
    IntermediateStates, Reduction, StatisticsConvention,
};

fn render(format: ExportFormat, reduction: &Reduction) -> String {
    export(
        &common::validated(),
        reduction,
        format,
        &ExportOptions::default(),
    )
    .unwrap()
}

fn mapped() -> Reduction {
    reduce_multibody(&common::validated(), &common::intermediates()).unwrap()
}

fn unmapped() -> Reduction {
    reduce_multibody(&common::validated(), &IntermediateStates::default()).unwrap()
}

#[test]
fn full_mass_order_round_trips_through_the_list_reader() {
    let catalog = common::validated();
    let text = render(ExportFormat::FullMassOrder, &Reduction::default());
    let particles = parse_mass_order(&text).unwrap();
    assert_eq!(particles.len(), catalog.len());

    for reread in &particles {
        let listed = catalog.get(reread.pid).unwrap();
        assert_eq!(reread.name, listed.name);
        assert_eq!(reread.mass, listed.mass);
        assert_eq!(reread.width, listed.width);
        assert_eq!(reread.spin_degeneracy, listed.spin_degeneracy);
        assert_eq!(reread.charges(), listed.charges());
        assert_eq!(reread.isospin, listed.isospin);
        assert_eq!(reread.isospin_z, listed.isospin_z);
        assert_eq!(reread.stable, listed.stable);
    }

    let masses: Vec<f64> = particles.iter().map(|particle| particle.mass).collect();
    assert!(masses.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(particles[0].pid, 111);
}

#[test]
fn unmapped_three_body_channel_stays_in_full_mass_order() {
    let text = render(ExportFormat::FullMassOrderDecays, &unmapped());
    assert!(text.contains("\n1214\t3\t0.4\t2112\t-211\t211\t0\t0\n"));

    let reread = parse_mass_order_decays(&text).unwrap();
    assert_eq!(reread.decays_of(1214), common::validated().decays_of(1214));

    let list = render(ExportFormat::FullMassOrder, &unmapped());
    let row = list.lines().find(|line| line.starts_with("1214\t")).unwrap();
    assert!(row.ends_with("\t3"));
}

#[test]
fn unmapped_three_body_channel_is_excluded_from_smash_decays() {
    let text = render(ExportFormat::SmashDecays, &unmapped());
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|line| *line == "N(1520)0").unwrap();
    assert!(lines[start + 1].ends_with("\t2\tp\tπ-"));
    assert!(lines[start + 2].ends_with("\t2\tn\tπ0"));
    assert!(lines[start + 3].is_empty());

    // No channel line carries more than two products, and the eta is gone.
    assert!(lines.iter().all(|line| line.split('\t').count() <= 4));
    assert!(!lines.contains(&"η"));
}

#[test]
fn mapped_channels_appear_in_smash_decays() {
    let text = render(ExportFormat::SmashDecays, &mapped());
    assert!(text.contains("N(1520)0\n0.4\t2\tp\tπ-\n0.2\t2\tn\tπ0\n0.4\t0\tΔ+\tπ-\n\n"));
    assert!(text.contains("η\n0.57\t0\tπ0\tπ0\tπ0\n0.43\t0\tπ+\tπ-\tπ0\n\n"));
    assert!(text.contains("ρ0\n1\t1\tπ+\tπ-\n\n"));
    assert!(text.contains("Δ++\n1\t1\tp\tπ+\n\n"));
    // Antiparticle decays are implied by SMASH.
    assert!(!text.contains("anti-"));
}

#[test]
fn smash_particles_group_isospin_multiplets() {
    let text = render(ExportFormat::SmashParticles, &Reduction::default());
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"Δ\t1.232\t0.117\t+\t1114\t2114\t2214\t2224"));
    assert!(lines.contains(&"ρ\t0.77526\t0.1491\t-\t113\t213"));
    assert!(lines.contains(&"p\t0.938272\t0\t+\t2212"));
    assert!(lines.contains(&"N(1520)0\t1.515\t0.11\t-\t1214"));
    assert_eq!(lines[0], "π0\t0.1349768\t0\t-\t111");
    assert!(lines.iter().all(|line| !line.contains("\t-2")));
}

#[test]
fn thermal_fist_pair_passes_the_consistency_check() {
    let list = render(ExportFormat::ThermalFistList, &Reduction::default());
    let decays = render(ExportFormat::ThermalFistDecays, &Reduction::default());

    let entries = parse_thermal_fist_list(&list).unwrap();
    let blocks = parse_thermal_fist_decays(&decays).unwrap();
    assert_eq!(entries.len(), 15);
    assert!(entries.iter().all(|entry| entry.pid > 0));
    assert_eq!(blocks.len(), 9);

    let n1440 = blocks.iter().find(|block| block.parent == 12112).unwrap();
    assert_eq!(n1440.channels.len(), 3);

    let report = check_lists(&entries, &blocks, &CheckOptions::default());
    assert!(report.is_ok(), "{:?}", report.errors);
    assert!(report.warnings.is_empty());
}

#[test]
fn thermal_fist_statistics_convention_is_configurable() {
    let catalog = common::validated();
    let signed = export(
        &catalog,
        &Reduction::default(),
        ExportFormat::ThermalFistList,
        &ExportOptions {
            statistics: StatisticsConvention::Signed,
        },
    )
    .unwrap();
    let entries = parse_thermal_fist_list(&signed).unwrap();
    let pion = entries.iter().find(|entry| entry.pid == 211).unwrap();
    let proton = entries.iter().find(|entry| entry.pid == 2212).unwrap();
    assert_eq!(pion.statistics, -1);
    assert_eq!(proton.statistics, 1);

    let default = render(ExportFormat::ThermalFistList, &Reduction::default());
    let entries = parse_thermal_fist_list(&default).unwrap();
    assert_eq!(entries.iter().find(|entry| entry.pid == 211).unwrap().statistics, 0);
}
