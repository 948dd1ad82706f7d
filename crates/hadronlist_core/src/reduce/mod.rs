//! Multi-body channel reduction for two-body-only consumers.
//!
//! # Responsibility
//! - Rewrite 3+ body channels as a two-body step through configured
//!   intermediate resonances, or keep them when configured to.
//! - Record channels with no mapping instead of guessing one.
//!
//! # Invariants
//! - Two-body channels pass through unchanged.
//! - Reduced channels with the same product multiset are merged.
//! - Ratios of a mother are renormalised after unmapped exclusions.

use crate::model::catalog::Catalog;
use crate::model::decay::{multiset_key, DecayChannel};
use crate::model::particle::Pid;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod mapping;
pub mod suggest;

pub use mapping::{ChannelMapping, IntermediateStates, MappingError, MappingResult, Product};
pub use suggest::suggest_intermediates;

use mapping::{MappingIndex, Resolution};

/// Channel as consumed by the SMASH decay export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedChannel {
    pub mother: Pid,
    pub branching_ratio: f64,
    /// Two PIDs, or the full daughter list for kept multi-body channels.
    pub products: Vec<Pid>,
    pub multibody_kept: bool,
}

/// Multi-body channel without a configured intermediate state.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmappedMultibody {
    pub mother: Pid,
    pub daughters: Vec<Pid>,
    pub branching_ratio: f64,
}

impl Display for UnmappedMultibody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[PDG {}] no intermediate state for {}-body channel {:?} (BR {})",
            self.mother,
            self.daughters.len(),
            self.daughters,
            self.branching_ratio
        )
    }
}

impl Error for UnmappedMultibody {}

/// Result of [`reduce_multibody`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reduction {
    /// Reduced channels per mother; mothers left without channels are absent.
    pub channels: BTreeMap<Pid, Vec<ReducedChannel>>,
    pub unmapped: Vec<UnmappedMultibody>,
}

impl Reduction {
    pub fn channels_of(&self, mother: Pid) -> &[ReducedChannel] {
        self.channels
            .get(&mother)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Reduces every channel of `catalog` using `states`.
///
/// # Errors
/// Returns [`MappingError`] when the configuration references unknown
/// particles or does not describe a valid two-body step.
pub fn reduce_multibody(
    catalog: &Catalog,
    states: &IntermediateStates,
) -> Result<Reduction, MappingError> {
    let index = MappingIndex::build(catalog, states)?;
    let mut reduction = Reduction::default();

    for (mother, channels) in catalog.decay_table() {
        let mut reduced: Vec<ReducedChannel> = Vec::with_capacity(channels.len());
        let mut excluded_any = false;
        for channel in channels {
            let Some(candidate) = reduce_channel(&index, channel) else {
                excluded_any = true;
                let record = UnmappedMultibody {
                    mother: *mother,
                    daughters: channel.daughters.clone(),
                    branching_ratio: channel.branching_ratio,
                };
                warn!(
                    "event=multibody_unmapped module=reduce status=warn detail=\"{}\"",
                    record
                );
                reduction.unmapped.push(record);
                continue;
            };
            let key = multiset_key(&candidate.products);
            match reduced
                .iter_mut()
                .find(|existing| multiset_key(&existing.products) == key)
            {
                Some(existing) => existing.branching_ratio += candidate.branching_ratio,
                None => reduced.push(candidate),
            }
        }

        if excluded_any {
            let sum: f64 = reduced.iter().map(|channel| channel.branching_ratio).sum();
            if sum > 0.0 {
                for channel in &mut reduced {
                    channel.branching_ratio /= sum;
                }
            }
        }
        if !reduced.is_empty() {
            reduction.channels.insert(*mother, reduced);
        }
    }

    info!(
        "event=reduce_multibody module=reduce status=ok mothers={} unmapped={}",
        reduction.channels.len(),
        reduction.unmapped.len()
    );
    Ok(reduction)
}

fn reduce_channel(index: &MappingIndex, channel: &DecayChannel) -> Option<ReducedChannel> {
    let (products, multibody_kept) = if !channel.is_multibody() {
        (channel.daughters.clone(), false)
    } else {
        match index.resolve(channel.mother, &channel.daughters)? {
            Resolution::Keep => (channel.daughters.clone(), true),
            Resolution::Via(pair) => (pair.to_vec(), false),
        }
    };
    Some(ReducedChannel {
        mother: channel.mother,
        branching_ratio: channel.branching_ratio,
        products,
        multibody_kept,
    })
}
