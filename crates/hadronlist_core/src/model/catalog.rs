//! In-memory hadron catalog: particles keyed by PID plus their decay tables.
//!
//! # Invariants
//! - `Particle::stable` always agrees with the catalog's decay table.
//! - Iteration order is deterministic (ascending PID, or ascending mass then
//!   PID for [`Catalog::mass_ordered`]).

use crate::model::decay::DecayChannel;
use crate::model::particle::{Charges, Particle, Pid};
use std::collections::BTreeMap;

/// Decay channels keyed by mother PID, in master-table order per mother.
pub type DecayTable = BTreeMap<Pid, Vec<DecayChannel>>;

/// Immutable particle/decay model shared by validation and every exporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    particles: BTreeMap<Pid, Particle>,
    decays: DecayTable,
}

impl Catalog {
    /// Builds a catalog and derives each particle's stable flag from `decays`.
    ///
    /// Later particles with an already used PID replace earlier ones; the
    /// master-table loader rejects duplicates before reaching this point.
    pub fn new(particles: impl IntoIterator<Item = Particle>, decays: DecayTable) -> Self {
        let decays: DecayTable = decays
            .into_iter()
            .filter(|(_, channels)| !channels.is_empty())
            .collect();
        let particles = particles
            .into_iter()
            .map(|mut particle| {
                particle.stable = !decays.contains_key(&particle.pid);
                (particle.pid, particle)
            })
            .collect();
        Self { particles, decays }
    }

    pub fn get(&self, pid: Pid) -> Option<&Particle> {
        self.particles.get(&pid)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.particles.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles in ascending PID order.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.values()
    }

    pub fn decay_table(&self) -> &DecayTable {
        &self.decays
    }

    pub fn decays_of(&self, pid: Pid) -> &[DecayChannel] {
        self.decays.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Particles sorted by ascending mass, ties broken by ascending PID.
    pub fn mass_ordered(&self) -> Vec<&Particle> {
        let mut ordered: Vec<&Particle> = self.particles.values().collect();
        ordered.sort_by(|a, b| a.mass.total_cmp(&b.mass).then(a.pid.cmp(&b.pid)));
        ordered
    }

    /// PID of the charge conjugate; self-conjugate species map to themselves.
    pub fn conjugate_pid(&self, pid: Pid) -> Pid {
        match self.particles.get(&pid) {
            Some(particle) if particle.is_self_conjugate() => pid,
            _ => -pid,
        }
    }

    /// Charge-conjugate channel: mother and every daughter conjugated.
    pub fn conjugate_channel(&self, channel: &DecayChannel) -> DecayChannel {
        DecayChannel::new(
            self.conjugate_pid(channel.mother),
            channel.branching_ratio,
            channel
                .daughters
                .iter()
                .map(|daughter| self.conjugate_pid(*daughter))
                .collect(),
        )
    }

    /// Summed charges of `pids`, or `None` when any PID is unknown.
    pub fn total_charges(&self, pids: &[Pid]) -> Option<Charges> {
        pids.iter()
            .map(|pid| self.get(*pid).map(Particle::charges))
            .sum()
    }

    /// Summed rest mass of `pids`, or `None` when any PID is unknown.
    pub fn total_mass(&self, pids: &[Pid]) -> Option<f64> {
        pids.iter().map(|pid| self.get(*pid).map(|p| p.mass)).sum()
    }

    /// Lightest total daughter mass over the channels of `pid`; `0` when stable.
    pub fn threshold(&self, pid: Pid) -> f64 {
        self.decays_of(pid)
            .iter()
            .filter_map(|channel| self.total_mass(&channel.daughters))
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, DecayTable};
    use crate::model::decay::DecayChannel;
    use crate::model::particle::{HalfInt, Particle};

    fn meson(pid: i32, name: &str, mass: f64, charge: i32) -> Particle {
        Particle {
            pid,
            name: name.to_string(),
            mass,
            width: 0.0,
            spin_degeneracy: 1,
            baryon_number: 0,
            strangeness: 0,
            charm: 0,
            bottom: 0,
            isospin: HalfInt::from_int(1),
            isospin_z: HalfInt::from_int(charge),
            charge,
            stable: false,
            spin: None,
            parity: None,
        }
    }

    fn sample() -> Catalog {
        let mut rho = meson(113, "ρ0", 0.775, 0);
        rho.width = 0.149;
        let mut decays = DecayTable::new();
        decays.insert(113, vec![DecayChannel::new(113, 1.0, vec![211, -211])]);
        Catalog::new(
            vec![
                meson(211, "π+", 0.13957, 1),
                meson(-211, "π-", 0.13957, -1),
                meson(111, "π0", 0.134977, 0),
                rho,
            ],
            decays,
        )
    }

    #[test]
    fn stable_flag_follows_decay_table() {
        let catalog = sample();
        assert!(catalog.get(211).unwrap().stable);
        assert!(!catalog.get(113).unwrap().stable);
    }

    #[test]
    fn mass_order_breaks_ties_by_pid() {
        let catalog = sample();
        let order: Vec<i32> = catalog.mass_ordered().iter().map(|p| p.pid).collect();
        assert_eq!(order, vec![111, -211, 211, 113]);
    }

    #[test]
    fn conjugation_keeps_self_conjugate_daughters() {
        let catalog = sample();
        let channel = DecayChannel::new(211, 1.0, vec![211, 111]);
        let conjugate = catalog.conjugate_channel(&channel);
        assert_eq!(conjugate.mother, -211);
        assert_eq!(conjugate.daughters, vec![-211, 111]);
    }

    #[test]
    fn threshold_and_totals_use_known_masses() {
        let catalog = sample();
        assert!((catalog.threshold(113) - 0.27914).abs() < 1e-12);
        assert_eq!(catalog.threshold(211), 0.0);
        assert_eq!(catalog.total_mass(&[211, 999]), None);
        assert_eq!(catalog.total_charges(&[211, -211]).unwrap().charge, 0);
    }
}
