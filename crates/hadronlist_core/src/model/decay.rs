//! Decay channel record.
//!
//! # Invariants
//! - A channel has between [`MIN_DAUGHTERS`] and [`MAX_DAUGHTERS`] daughters.
//! - Fixed-width encodings pad absent daughters with `0`.

use crate::model::particle::Pid;

pub const MIN_DAUGHTERS: usize = 2;
pub const MAX_DAUGHTERS: usize = 5;

/// One decay channel of a mother particle.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayChannel {
    pub mother: Pid,
    pub branching_ratio: f64,
    /// Daughter PIDs in master-table order.
    pub daughters: Vec<Pid>,
}

impl DecayChannel {
    pub fn new(mother: Pid, branching_ratio: f64, daughters: Vec<Pid>) -> Self {
        Self {
            mother,
            branching_ratio,
            daughters,
        }
    }

    pub fn multiplicity(&self) -> usize {
        self.daughters.len()
    }

    pub fn is_multibody(&self) -> bool {
        self.daughters.len() > MIN_DAUGHTERS
    }

    /// Daughters padded with `0` to the fixed five-slot layout.
    pub fn padded_daughters(&self) -> [Pid; MAX_DAUGHTERS] {
        let mut slots = [0; MAX_DAUGHTERS];
        for (slot, daughter) in slots.iter_mut().zip(&self.daughters) {
            *slot = *daughter;
        }
        slots
    }

    /// Order-independent key of the daughter multiset.
    pub fn daughter_key(&self) -> Vec<Pid> {
        multiset_key(&self.daughters)
    }
}

/// Sorted copy of a PID list, used to compare daughter multisets.
pub fn multiset_key(pids: &[Pid]) -> Vec<Pid> {
    let mut key = pids.to_vec();
    key.sort_unstable();
    key
}
