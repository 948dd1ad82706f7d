//! Thermal-FIST particle list and decay file.
//!
//! Thermal-FIST generates antiparticles itself, so only `pid > 0` entries
//! are written.

use crate::export::StatisticsConvention;
use crate::model::catalog::Catalog;
use crate::model::particle::Particle;

const LIST_HEADER: &str = "# ID\tName\tStable\tMass[GeV]\tDegeneracy\tStatistics\tB\tQ\tS\tC\t|S|\t|C|\tWidth[GeV]\tThreshold[GeV]\n";

const DECAYS_HEADER: &str = "\
# decay list, one block per unstable particle:
# the PDG ID of the decaying particle
# the number of decay channels
# one line per channel: branching ratio followed by the daughter PDG IDs
# text after # is a comment
# antiparticle decays are generated from the particle decays

";

/// 14-column particle list.
///
/// Statistics follow the spin alone. Massless entries such as the photon,
/// which Thermal-FIST lists with its own statistics code, never pass
/// validation, which requires a positive mass.
pub fn render_list(catalog: &Catalog, statistics: StatisticsConvention) -> String {
    let mut out = String::from(LIST_HEADER);
    for particle in listed(catalog) {
        let fields = [
            particle.pid.to_string(),
            particle.name.clone(),
            u8::from(particle.stable).to_string(),
            particle.mass.to_string(),
            particle.spin_degeneracy.to_string(),
            statistics.code(particle.is_fermion()).to_string(),
            particle.baryon_number.to_string(),
            particle.charge.to_string(),
            particle.strangeness.to_string(),
            particle.charm.to_string(),
            particle.strangeness.abs().to_string(),
            particle.charm.abs().to_string(),
            particle.width.to_string(),
            catalog.threshold(particle.pid).to_string(),
        ];
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
    out
}

/// Decay blocks: PID line, channel count, `BR d1 d2 ...` lines, blank line.
pub fn render_decays(catalog: &Catalog) -> String {
    let mut out = String::from(DECAYS_HEADER);
    for particle in listed(catalog).filter(|particle| !particle.stable) {
        let channels = catalog.decays_of(particle.pid);
        out.push_str(&format!("{}\n{}\n", particle.pid, channels.len()));
        for channel in channels {
            let mut fields = vec![channel.branching_ratio.to_string()];
            fields.extend(channel.daughters.iter().map(i32::to_string));
            out.push_str(&fields.join("\t"));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn listed(catalog: &Catalog) -> impl Iterator<Item = &Particle> {
    catalog
        .mass_ordered()
        .into_iter()
        .filter(|particle| particle.pid > 0)
}
