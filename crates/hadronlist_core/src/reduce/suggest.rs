//! Automatic intermediate-state candidates.
//!
//! For each 3-body channel every daughter pair is tried against the
//! two-body decay table; the lightest resonance decaying into the pair is
//! the candidate and the split with the lowest `m_resonance + m_spectator`
//! wins. 4-body channels are paired into two resonances the same way.
//! A split is only offered when its products are lighter than the mother.

use crate::model::catalog::Catalog;
use crate::model::decay::{multiset_key, DecayChannel};
use crate::model::particle::{Particle, Pid};
use crate::reduce::mapping::{ChannelMapping, IntermediateStates, Product};
use log::info;
use std::collections::BTreeMap;

const THREE_BODY_SPLITS: [(usize, usize, usize); 3] = [(0, 1, 2), (0, 2, 1), (1, 2, 0)];

/// Pairings of four daughters into two pairs.
const FOUR_BODY_PAIRINGS: [[(usize, usize); 2]; 3] = [
    [(0, 1), (2, 3)],
    [(0, 2), (1, 3)],
    [(0, 3), (1, 2)],
];

/// Builds a candidate mapping for the multi-body channels of particles
/// (`pid > 0`); antiparticles follow by conjugation.
///
/// Channels with more than four daughters, or without a split lighter
/// than the mother, are left out.
pub fn suggest_intermediates(catalog: &Catalog) -> IntermediateStates {
    let index = TwoBodyIndex::new(catalog);
    let mut channels = Vec::new();
    let mut skipped = 0usize;

    for (pid, decays) in catalog.decay_table() {
        let Some(mother) = catalog.get(*pid).filter(|mother| mother.pid > 0) else {
            continue;
        };
        for channel in decays.iter().filter(|channel| channel.is_multibody()) {
            let via = match channel.daughters.len() {
                3 => index.three_body_split(mother, channel),
                4 => index.four_body_split(mother, channel),
                _ => None,
            };
            match via {
                Some(via) => channels.push(ChannelMapping {
                    mother: mother.pid,
                    daughters: channel.daughters.clone(),
                    keep: false,
                    via,
                }),
                None => skipped += 1,
            }
        }
    }

    info!(
        "event=suggest_intermediates module=reduce status=ok mapped={} skipped={}",
        channels.len(),
        skipped
    );
    IntermediateStates { channels }
}

/// Known two-body mothers per unordered daughter pair, lightest first.
struct TwoBodyIndex<'a> {
    catalog: &'a Catalog,
    mothers: BTreeMap<Vec<Pid>, Vec<&'a Particle>>,
}

impl<'a> TwoBodyIndex<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        let mut mothers: BTreeMap<Vec<Pid>, Vec<&'a Particle>> = BTreeMap::new();
        for (pid, decays) in catalog.decay_table() {
            let Some(resonance) = catalog.get(*pid) else {
                continue;
            };
            for channel in decays.iter().filter(|channel| !channel.is_multibody()) {
                let known = mothers.entry(channel.daughter_key()).or_default();
                if !known.iter().any(|other| other.pid == resonance.pid) {
                    known.push(resonance);
                }
            }
        }
        for known in mothers.values_mut() {
            known.sort_by(|a, b| a.mass.total_cmp(&b.mass).then(a.pid.cmp(&b.pid)));
        }
        Self { catalog, mothers }
    }

    /// Lightest resonance decaying into `a b`, never `exclude` itself.
    fn resonance_for(&self, a: Pid, b: Pid, exclude: Pid) -> Option<&'a Particle> {
        self.mothers
            .get(&multiset_key(&[a, b]))?
            .iter()
            .copied()
            .find(|resonance| resonance.pid != exclude)
    }

    fn three_body_split(&self, mother: &Particle, channel: &DecayChannel) -> Option<Vec<Product>> {
        let d = &channel.daughters;
        let mut best: Option<(f64, Vec<Product>)> = None;
        for (first, second, spectator) in THREE_BODY_SPLITS {
            let Some(resonance) = self.resonance_for(d[first], d[second], mother.pid) else {
                continue;
            };
            let Some(spectator_particle) = self.catalog.get(d[spectator]) else {
                continue;
            };
            let cost = resonance.mass + spectator_particle.mass;
            if best.as_ref().is_some_and(|(known, _)| cost >= *known) {
                continue;
            }
            best = Some((
                cost,
                vec![
                    Product::Resonance {
                        pid: resonance.pid,
                        decays_to: vec![d[first], d[second]],
                    },
                    Product::Spectator(d[spectator]),
                ],
            ));
        }
        below_mother(best, mother)
    }

    fn four_body_split(&self, mother: &Particle, channel: &DecayChannel) -> Option<Vec<Product>> {
        let d = &channel.daughters;
        let mut best: Option<(f64, Vec<Product>)> = None;
        for [(a, b), (c, e)] in FOUR_BODY_PAIRINGS {
            let (Some(left), Some(right)) = (
                self.resonance_for(d[a], d[b], mother.pid),
                self.resonance_for(d[c], d[e], mother.pid),
            ) else {
                continue;
            };
            let cost = left.mass + right.mass;
            if best.as_ref().is_some_and(|(known, _)| cost >= *known) {
                continue;
            }
            best = Some((
                cost,
                vec![
                    Product::Resonance {
                        pid: left.pid,
                        decays_to: vec![d[a], d[b]],
                    },
                    Product::Resonance {
                        pid: right.pid,
                        decays_to: vec![d[c], d[e]],
                    },
                ],
            ));
        }
        below_mother(best, mother)
    }
}

fn below_mother(best: Option<(f64, Vec<Product>)>, mother: &Particle) -> Option<Vec<Product>> {
    best.filter(|(cost, _)| *cost < mother.mass)
        .map(|(_, via)| via)
}

#[cfg(test)]
mod tests {
    use super::suggest_intermediates;
    use crate::model::catalog::{Catalog, DecayTable};
    use crate::model::decay::DecayChannel;
    use crate::model::particle::{HalfInt, Particle};
    use crate::reduce::mapping::Product;
    use crate::reduce::{reduce_multibody, IntermediateStates};

    fn particle(pid: i32, mass: f64, baryon: i32, iz_doubled: i32, charge: i32) -> Particle {
        Particle {
            pid,
            name: format!("p{pid}"),
            mass,
            width: 0.0,
            spin_degeneracy: 1,
            baryon_number: baryon,
            strangeness: 0,
            charm: 0,
            bottom: 0,
            isospin: HalfInt::from_doubled(iz_doubled.abs()),
            isospin_z: HalfInt::from_doubled(iz_doubled),
            charge,
            stable: true,
            spin: None,
            parity: None,
        }
    }

    fn catalog(mother_mass: f64) -> Catalog {
        let mut decays = DecayTable::new();
        decays.insert(113, vec![DecayChannel::new(113, 1.0, vec![211, -211])]);
        decays.insert(2224, vec![DecayChannel::new(2224, 1.0, vec![2212, 211])]);
        decays.insert(2214, vec![DecayChannel::new(2214, 1.0, vec![2212, 111])]);
        decays.insert(
            12212,
            vec![
                DecayChannel::new(12212, 0.7, vec![2212, 111]),
                DecayChannel::new(12212, 0.3, vec![2212, 211, -211]),
            ],
        );
        Catalog::new(
            vec![
                particle(111, 0.135, 0, 0, 0),
                particle(211, 0.1396, 0, 2, 1),
                particle(-211, 0.1396, 0, -2, -1),
                particle(113, 0.775, 0, 0, 0),
                particle(2212, 0.938, 1, 1, 1),
                particle(2224, 1.232, 1, 3, 2),
                particle(2214, 1.232, 1, 1, 1),
                particle(12212, mother_mass, 1, 1, 1),
            ],
            decays,
        )
    }

    #[test]
    fn lightest_split_below_the_mother_is_suggested() {
        let states = suggest_intermediates(&catalog(1.44));
        assert_eq!(states.len(), 1);
        let mapping = &states.channels[0];
        assert_eq!(mapping.mother, 12212);
        // Δ++ π- (1.3716) is lighter than p ρ0 (1.713).
        assert_eq!(
            mapping.via,
            vec![
                Product::Resonance {
                    pid: 2224,
                    decays_to: vec![2212, 211],
                },
                Product::Spectator(-211),
            ]
        );
    }

    #[test]
    fn channels_without_a_mass_conserving_split_are_left_out() {
        let states = suggest_intermediates(&catalog(1.3));
        assert!(states.is_empty());
    }

    #[test]
    fn suggestions_are_accepted_by_the_reducer() {
        let catalog = catalog(1.44);
        let states = suggest_intermediates(&catalog);
        let text = states.to_json_pretty().unwrap();
        let reloaded = IntermediateStates::from_json_str(&text).unwrap();
        let reduction = reduce_multibody(&catalog, &reloaded).unwrap();
        assert!(reduction.unmapped.is_empty());
        assert_eq!(reduction.channels_of(12212)[1].products, vec![2224, -211]);
    }
}
