//! Validation findings: fatal violations and non-fatal warnings.

use crate::model::particle::{HalfInt, Pid};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A physical inconsistency that aborts the export.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    HyperchargeMismatch {
        pid: Pid,
        charge: i32,
        /// `2 * (I3 + (B + S + C + Bt) / 2)`.
        expected_doubled: i32,
    },
    NonPositiveMass {
        pid: Pid,
        mass: f64,
    },
    NegativeWidth {
        pid: Pid,
        width: f64,
    },
    InvalidDegeneracy {
        pid: Pid,
        degeneracy: u32,
        spin: Option<HalfInt>,
    },
    ConjugateMismatch {
        pid: Pid,
    },
    UnknownMother {
        mother: Pid,
    },
    UnknownDaughter {
        mother: Pid,
        daughter: Pid,
    },
    QuantumNumberMismatch {
        mother: Pid,
        daughters: Vec<Pid>,
        quantity: &'static str,
        mother_value: i32,
        daughter_sum: i32,
    },
    BranchingRatioOutOfRange {
        mother: Pid,
        daughters: Vec<Pid>,
        value: f64,
    },
    BranchingRatioSum {
        mother: Pid,
        sum: f64,
    },
    DuplicateChannel {
        mother: Pid,
        daughters: Vec<Pid>,
    },
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HyperchargeMismatch {
                pid,
                charge,
                expected_doubled,
            } => write!(
                f,
                "[PDG {pid}] charge {charge} violates Q = I3 + (B+S+C+Bt)/2 (expected {})",
                HalfInt::from_doubled(*expected_doubled)
            ),
            Self::NonPositiveMass { pid, mass } => {
                write!(f, "[PDG {pid}] mass must be positive, got {mass}")
            }
            Self::NegativeWidth { pid, width } => {
                write!(f, "[PDG {pid}] width must not be negative, got {width}")
            }
            Self::InvalidDegeneracy {
                pid,
                degeneracy,
                spin,
            } => match spin {
                Some(spin) => write!(
                    f,
                    "[PDG {pid}] degeneracy {degeneracy} does not match spin {spin}"
                ),
                None => write!(f, "[PDG {pid}] degeneracy must be positive, got {degeneracy}"),
            },
            Self::ConjugateMismatch { pid } => write!(
                f,
                "[PDG {pid}] listed antiparticle is not the conjugate of PDG {}",
                -pid
            ),
            Self::UnknownMother { mother } => {
                write!(f, "[PDG {mother}] decay channels listed for an unknown particle")
            }
            Self::UnknownDaughter { mother, daughter } => {
                write!(f, "[PDG {mother}] unknown daughter PDG ID {daughter}")
            }
            Self::QuantumNumberMismatch {
                mother,
                daughters,
                quantity,
                mother_value,
                daughter_sum,
            } => write!(
                f,
                "[PDG {mother}] {quantity} not conserved (mother {mother_value}, daughters {daughter_sum}) daughters={daughters:?}"
            ),
            Self::BranchingRatioOutOfRange {
                mother,
                daughters,
                value,
            } => write!(
                f,
                "[PDG {mother}] branching ratio {value} outside (0, 1] daughters={daughters:?}"
            ),
            Self::BranchingRatioSum { mother, sum } => {
                write!(f, "[PDG {mother}] sum of branching ratios = {sum:.6} (expected 1)")
            }
            Self::DuplicateChannel { mother, daughters } => {
                write!(f, "[PDG {mother}] channel {daughters:?} is listed twice")
            }
        }
    }
}

/// Fatal validation outcome carrying every violation found.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationError {
    pub violations: Vec<Violation>,
}

impl Display for ConservationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} physical inconsistencies found",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

impl Error for ConservationError {}

/// Channel dropped because its daughters outweigh the mother.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicExclusion {
    pub mother: Pid,
    pub daughters: Vec<Pid>,
    pub branching_ratio: f64,
    pub mother_mass: f64,
    pub daughter_mass: f64,
}

impl Display for KinematicExclusion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[PDG {}] channel {:?} dropped: daughter mass {} GeV exceeds mother mass {} GeV",
            self.mother, self.daughters, self.daughter_mass, self.mother_mass
        )
    }
}

/// Non-fatal finding reported alongside a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    KinematicExclusion(KinematicExclusion),
    MarginalThreshold {
        mother: Pid,
        daughters: Vec<Pid>,
        q_value: f64,
    },
    AllChannelsExcluded {
        mother: Pid,
    },
    WidthWithoutDecays {
        pid: Pid,
        width: f64,
    },
    DecaysWithoutWidth {
        pid: Pid,
    },
}

impl ValidationWarning {
    /// Stable event name used in log lines.
    pub const fn event(&self) -> &'static str {
        match self {
            Self::KinematicExclusion(_) => "channel_dropped",
            Self::MarginalThreshold { .. } => "channel_marginal",
            Self::AllChannelsExcluded { .. } => "all_channels_dropped",
            Self::WidthWithoutDecays { .. } => "width_without_decays",
            Self::DecaysWithoutWidth { .. } => "decays_without_width",
        }
    }
}

impl Display for ValidationWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KinematicExclusion(exclusion) => write!(f, "{exclusion}"),
            Self::MarginalThreshold {
                mother,
                daughters,
                q_value,
            } => write!(
                f,
                "[PDG {mother}] channel {daughters:?} is marginal: Q-value {q_value} GeV"
            ),
            Self::AllChannelsExcluded { mother } => write!(
                f,
                "[PDG {mother}] every channel was dropped; exported as stable"
            ),
            Self::WidthWithoutDecays { pid, width } => {
                write!(f, "[PDG {pid}] width {width} GeV but no decay channels")
            }
            Self::DecaysWithoutWidth { pid } => {
                write!(f, "[PDG {pid}] has decay channels but zero width")
            }
        }
    }
}
