//! Intermediate-state mapping configuration.
//!
//! The mapping is a JSON document listing, per multi-body channel, either
//! `keep` (export as an explicit multi-body final state) or a `via` pair of
//! products:
//!
//! ```json
//! { "channels": [
//!   { "mother": 221, "daughters": [111, 111, 111], "keep": true },
//!   { "mother": 12112, "daughters": [2112, 211, -211],
//!     "via": [ { "resonance": { "pid": 113, "decays_to": [211, -211] } },
//!              { "spectator": 2112 } ] }
//! ] }
//! ```

use crate::model::catalog::Catalog;
use crate::model::decay::{multiset_key, MIN_DAUGHTERS};
use crate::model::particle::Pid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type MappingResult<T> = Result<T, MappingError>;

/// Mapping document: one entry per multi-body channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntermediateStates {
    #[serde(default)]
    pub channels: Vec<ChannelMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMapping {
    pub mother: Pid,
    pub daughters: Vec<Pid>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub keep: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub via: Vec<Product>,
}

/// One product of the first two-body step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// A daughter that leaves the decay unchanged.
    Spectator(Pid),
    /// An intermediate resonance and the daughters it decays into.
    Resonance { pid: Pid, decays_to: Vec<Pid> },
}

impl Product {
    /// PID appearing in the two-body step.
    pub fn pid(&self) -> Pid {
        match self {
            Self::Spectator(pid) | Self::Resonance { pid, .. } => *pid,
        }
    }

    /// Final-state daughters covered by this product.
    pub fn final_state(&self) -> &[Pid] {
        match self {
            Self::Spectator(pid) => std::slice::from_ref(pid),
            Self::Resonance { decays_to, .. } => decays_to,
        }
    }

    fn conjugate(&self, catalog: &Catalog) -> Self {
        match self {
            Self::Spectator(pid) => Self::Spectator(catalog.conjugate_pid(*pid)),
            Self::Resonance { pid, decays_to } => Self::Resonance {
                pid: catalog.conjugate_pid(*pid),
                decays_to: decays_to
                    .iter()
                    .map(|daughter| catalog.conjugate_pid(*daughter))
                    .collect(),
            },
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Invalid intermediate-state configuration.
#[derive(Debug)]
pub enum MappingError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    NotMultibody {
        mother: Pid,
        daughters: Vec<Pid>,
    },
    DuplicateMapping {
        mother: Pid,
        daughters: Vec<Pid>,
    },
    UnknownParticle {
        mother: Pid,
        pid: Pid,
    },
    /// Exactly one of `keep` and a two-product `via` must be given.
    AmbiguousMapping {
        mother: Pid,
        daughters: Vec<Pid>,
    },
    NotAPartition {
        mother: Pid,
        daughters: Vec<Pid>,
    },
    ResonanceCharges {
        mother: Pid,
        resonance: Pid,
    },
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to access intermediate states `{path}`: {source}")
            }
            Self::Json(err) => write!(f, "invalid intermediate states JSON: {err}"),
            Self::NotMultibody { mother, daughters } => write!(
                f,
                "[PDG {mother}] mapping for {daughters:?} needs at least 3 daughters"
            ),
            Self::DuplicateMapping { mother, daughters } => {
                write!(f, "[PDG {mother}] channel {daughters:?} is mapped twice")
            }
            Self::UnknownParticle { mother, pid } => {
                write!(f, "[PDG {mother}] mapping references unknown PDG ID {pid}")
            }
            Self::AmbiguousMapping { mother, daughters } => write!(
                f,
                "[PDG {mother}] mapping for {daughters:?} must set either `keep` or exactly two `via` products"
            ),
            Self::NotAPartition { mother, daughters } => write!(
                f,
                "[PDG {mother}] `via` products do not partition daughters {daughters:?}"
            ),
            Self::ResonanceCharges { mother, resonance } => write!(
                f,
                "[PDG {mother}] intermediate {resonance} does not carry the quantum numbers of its products"
            ),
        }
    }
}

impl Error for MappingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MappingError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl IntermediateStates {
    pub fn from_json_str(text: &str) -> MappingResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> MappingResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> MappingResult<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// How a multi-body channel reaches the SMASH decay list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Keep,
    Via([Pid; 2]),
}

/// Checked mappings keyed by `(mother, sorted daughters)`, conjugates included.
#[derive(Debug, Clone, Default)]
pub(crate) struct MappingIndex {
    entries: BTreeMap<(Pid, Vec<Pid>), Resolution>,
}

impl MappingIndex {
    /// Checks every mapping against `catalog` and adds the conjugated
    /// mapping for antiparticles that have no explicit entry.
    pub(crate) fn build(catalog: &Catalog, states: &IntermediateStates) -> MappingResult<Self> {
        let mut explicit = BTreeMap::new();
        for mapping in &states.channels {
            let resolution = check_mapping(catalog, mapping)?;
            let key = (mapping.mother, multiset_key(&mapping.daughters));
            if explicit.insert(key, resolution).is_some() {
                return Err(MappingError::DuplicateMapping {
                    mother: mapping.mother,
                    daughters: mapping.daughters.clone(),
                });
            }
        }

        let mut entries = explicit.clone();
        for mapping in &states.channels {
            let conjugate = conjugate_mapping(catalog, mapping);
            let key = (conjugate.mother, multiset_key(&conjugate.daughters));
            if explicit.contains_key(&key) || !catalog.contains(conjugate.mother) {
                continue;
            }
            let resolution = check_mapping(catalog, &conjugate)?;
            entries.insert(key, resolution);
        }
        Ok(Self { entries })
    }

    pub(crate) fn resolve(&self, mother: Pid, daughters: &[Pid]) -> Option<&Resolution> {
        self.entries.get(&(mother, multiset_key(daughters)))
    }
}

fn conjugate_mapping(catalog: &Catalog, mapping: &ChannelMapping) -> ChannelMapping {
    ChannelMapping {
        mother: catalog.conjugate_pid(mapping.mother),
        daughters: mapping
            .daughters
            .iter()
            .map(|daughter| catalog.conjugate_pid(*daughter))
            .collect(),
        keep: mapping.keep,
        via: mapping
            .via
            .iter()
            .map(|product| product.conjugate(catalog))
            .collect(),
    }
}

fn check_mapping(catalog: &Catalog, mapping: &ChannelMapping) -> MappingResult<Resolution> {
    let mother = mapping.mother;
    if mapping.daughters.len() <= MIN_DAUGHTERS {
        return Err(MappingError::NotMultibody {
            mother,
            daughters: mapping.daughters.clone(),
        });
    }
    let require_known = |pid: Pid| {
        if catalog.contains(pid) {
            Ok(())
        } else {
            Err(MappingError::UnknownParticle { mother, pid })
        }
    };
    require_known(mother)?;
    for daughter in &mapping.daughters {
        require_known(*daughter)?;
    }

    match (mapping.keep, mapping.via.as_slice()) {
        (true, []) => Ok(Resolution::Keep),
        (false, [first, second]) => {
            let covered: Vec<Pid> = first
                .final_state()
                .iter()
                .chain(second.final_state())
                .copied()
                .collect();
            if multiset_key(&covered) != multiset_key(&mapping.daughters) {
                return Err(MappingError::NotAPartition {
                    mother,
                    daughters: mapping.daughters.clone(),
                });
            }
            for product in [first, second] {
                if let Product::Resonance { pid, decays_to } = product {
                    require_known(*pid)?;
                    let carried = catalog.get(*pid).map(|resonance| resonance.charges());
                    if decays_to.len() < MIN_DAUGHTERS
                        || carried != catalog.total_charges(decays_to)
                    {
                        return Err(MappingError::ResonanceCharges {
                            mother,
                            resonance: *pid,
                        });
                    }
                }
            }
            Ok(Resolution::Via([first.pid(), second.pid()]))
        }
        _ => Err(MappingError::AmbiguousMapping {
            mother,
            daughters: mapping.daughters.clone(),
        }),
    }
}
