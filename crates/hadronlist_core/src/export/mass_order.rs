//! Mass-ordered full list, optionally interleaved with decay rows.

use crate::model::catalog::Catalog;
use crate::model::decay::DecayChannel;
use crate::model::particle::Particle;

/// One tab-separated row per particle (antiparticles included):
/// `PID Name Mass Width SpinDeg B S Charm Bottom Isospin Iz Q NDecayChannels`.
pub fn render_list(catalog: &Catalog) -> String {
    let mut out = String::new();
    for particle in catalog.mass_ordered() {
        push_particle_row(&mut out, catalog, particle);
    }
    out
}

/// Like [`render_list`], each particle row followed by its decay rows
/// `mother ndaughters BR d1 d2 d3 d4 d5` (absent daughters are `0`).
pub fn render_with_decays(catalog: &Catalog) -> String {
    let mut out = String::new();
    for particle in catalog.mass_ordered() {
        push_particle_row(&mut out, catalog, particle);
        for channel in catalog.decays_of(particle.pid) {
            push_decay_row(&mut out, channel);
        }
    }
    out
}

fn push_particle_row(out: &mut String, catalog: &Catalog, particle: &Particle) {
    let fields = [
        particle.pid.to_string(),
        particle.name.clone(),
        particle.mass.to_string(),
        particle.width.to_string(),
        particle.spin_degeneracy.to_string(),
        particle.baryon_number.to_string(),
        particle.strangeness.to_string(),
        particle.charm.to_string(),
        particle.bottom.to_string(),
        particle.isospin.to_string(),
        particle.isospin_z.to_string(),
        particle.charge.to_string(),
        catalog.decays_of(particle.pid).len().to_string(),
    ];
    out.push_str(&fields.join("\t"));
    out.push('\n');
}

fn push_decay_row(out: &mut String, channel: &DecayChannel) {
    let mut fields = vec![
        channel.mother.to_string(),
        channel.multiplicity().to_string(),
        channel.branching_ratio.to_string(),
    ];
    fields.extend(channel.padded_daughters().iter().map(i32::to_string));
    out.push_str(&fields.join("\t"));
    out.push('\n');
}
