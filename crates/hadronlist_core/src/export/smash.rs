//! SMASH `particles.txt` and `decaymodes.txt`.
//!
//! Particles are grouped into isospin multiplets; decays are written per
//! resonance from the two-body reduction, each channel with the lowest
//! orbital angular momentum allowed by spin coupling and, where all
//! parities are known, by parity conservation.

use crate::export::{ExportError, ExportResult};
use crate::model::catalog::Catalog;
use crate::model::particle::{HalfInt, Parity, Particle};
use crate::reduce::{ReducedChannel, Reduction};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Highest `L` tried before parity conservation is given up.
pub const MAX_PARITY_L: u32 = 8;

static CHARGE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+\-0⁺⁻⁰]+$").expect("charge suffix pattern is valid"));

/// Members of a multiplet share everything but the charge state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MultipletKey {
    baryon_number: i32,
    strangeness: i32,
    charm: i32,
    bottom: i32,
    isospin: HalfInt,
    mass_bits: u64,
    width_bits: u64,
    spin_degeneracy: u32,
    parity_sign: i32,
}

/// One line per isospin multiplet: `Name Mass Width Parity PID...`.
///
/// # Errors
/// [`ExportError::MissingParity`] when a particle has no parity.
pub fn render_particles(catalog: &Catalog) -> ExportResult<String> {
    let mut multiplets: Vec<(Parity, Vec<&Particle>)> = Vec::new();
    let mut index: BTreeMap<MultipletKey, usize> = BTreeMap::new();
    for particle in catalog.mass_ordered() {
        if particle.pid <= 0 {
            continue;
        }
        let parity = particle
            .parity
            .ok_or(ExportError::MissingParity { pid: particle.pid })?;
        let key = MultipletKey {
            baryon_number: particle.baryon_number,
            strangeness: particle.strangeness,
            charm: particle.charm,
            bottom: particle.bottom,
            isospin: particle.isospin,
            mass_bits: particle.mass.to_bits(),
            width_bits: particle.width.to_bits(),
            spin_degeneracy: particle.spin_degeneracy,
            parity_sign: parity.sign(),
        };
        match index.get(&key) {
            Some(position) => multiplets[*position].1.push(particle),
            None => {
                index.insert(key, multiplets.len());
                multiplets.push((parity, vec![particle]));
            }
        }
    }

    let mut out = String::new();
    for (parity, members) in &multiplets {
        let first = members[0];
        let mut fields = vec![
            multiplet_name(members),
            first.mass.to_string(),
            first.width.to_string(),
            parity.symbol().to_string(),
        ];
        fields.extend(members.iter().map(|member| member.pid.to_string()));
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
    Ok(out)
}

/// Per resonance: name line, `BR L product-names...` lines, blank line.
///
/// Resonances whose every channel was left unmapped are omitted.
pub fn render_decays(catalog: &Catalog, reduction: &Reduction) -> ExportResult<String> {
    let mut out = String::new();
    for particle in catalog.mass_ordered() {
        if particle.pid <= 0 || particle.stable {
            continue;
        }
        let channels = reduction.channels_of(particle.pid);
        if channels.is_empty() {
            continue;
        }
        out.push_str(&particle.name);
        out.push('\n');
        for channel in channels {
            let products = resolve_products(catalog, channel)?;
            let l = if channel.multibody_kept {
                0
            } else {
                channel_l(particle, &products)?
            };
            let mut fields = vec![channel.branching_ratio.to_string(), l.to_string()];
            fields.extend(products.iter().map(|product| product.name.clone()));
            out.push_str(&fields.join("\t"));
            out.push('\n');
        }
        out.push('\n');
    }
    Ok(out)
}

fn resolve_products<'a>(
    catalog: &'a Catalog,
    channel: &ReducedChannel,
) -> ExportResult<Vec<&'a Particle>> {
    channel
        .products
        .iter()
        .map(|pid| {
            catalog.get(*pid).ok_or(ExportError::UnknownParticle {
                mother: channel.mother,
                pid: *pid,
            })
        })
        .collect()
}

fn channel_l(mother: &Particle, products: &[&Particle]) -> ExportResult<u32> {
    let mismatch = || ExportError::SpinMismatch {
        mother: mother.pid,
        products: products.iter().map(|product| product.pid).collect(),
    };
    let [first, second] = products else {
        return Ok(0);
    };
    minimal_l(
        (mother.spin_doubled(), mother.parity),
        (first.spin_doubled(), first.parity),
        (second.spin_doubled(), second.parity),
    )
    .ok_or_else(mismatch)
}

/// Lowest orbital angular momentum for `mother -> first second`, spins
/// given doubled.
///
/// Returns `None` when the spins cannot couple at all (half-integer
/// mismatch or negative spin).
pub fn minimal_l(
    mother: (i32, Option<Parity>),
    first: (i32, Option<Parity>),
    second: (i32, Option<Parity>),
) -> Option<u32> {
    let (jm, pm) = mother;
    let (j1, p1) = first;
    let (j2, p2) = second;
    if jm < 0 || j1 < 0 || j2 < 0 || (jm + j1 + j2) % 2 != 0 {
        return None;
    }

    let spin_allows = |l: u32| {
        let two_l = 2 * l as i32;
        ((j1 - j2).abs()..=j1 + j2)
            .step_by(2)
            .any(|s| (s - two_l).abs() <= jm && jm <= s + two_l)
    };
    let parity_allows = |l: u32| match (pm, p1, p2) {
        (Some(pm), Some(p1), Some(p2)) => {
            let orbital = if l % 2 == 0 { 1 } else { -1 };
            pm.sign() == p1.sign() * p2.sign() * orbital
        }
        _ => true,
    };

    if let Some(l) = (0..=MAX_PARITY_L).find(|l| spin_allows(*l) && parity_allows(*l)) {
        return Some(l);
    }
    let spin_bound = ((jm + j1 + j2) / 2) as u32;
    (0..=spin_bound).find(|l| spin_allows(*l))
}

fn multiplet_name(members: &[&Particle]) -> String {
    let name = &members[0].name;
    if members.len() < 2 {
        return name.clone();
    }
    let stripped = CHARGE_SUFFIX.replace(name, "");
    if stripped.is_empty() {
        name.clone()
    } else {
        stripped.into_owned()
    }
}
