//! Serializers for the exported hadron lists.
//!
//! # Responsibility
//! - Render a validated catalog into the text formats read by external codes.
//! - Keep every renderer pure: same input, byte-identical output.
//!
//! # Invariants
//! - Rows are ordered by ascending mass, ties by ascending PID.
//! - Floats use the shortest representation that reads back to the same
//!   value; integral values print without a decimal point.
//! - Rendering never touches the filesystem.

use crate::model::catalog::Catalog;
use crate::model::particle::Pid;
use crate::reduce::{MappingError, Reduction, UnmappedMultibody};
use crate::table::ParseError;
use crate::validate::ConservationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod mass_order;
pub mod smash;
pub mod spectrum;
pub mod thermal_fist;

pub type ExportResult<T> = Result<T, ExportError>;

/// Output formats, one file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExportFormat {
    FullMassOrder,
    FullMassOrderDecays,
    ThermalFistList,
    ThermalFistDecays,
    SmashParticles,
    SmashDecays,
}

impl ExportFormat {
    pub const ALL: [Self; 6] = [
        Self::FullMassOrder,
        Self::FullMassOrderDecays,
        Self::ThermalFistList,
        Self::ThermalFistDecays,
        Self::SmashParticles,
        Self::SmashDecays,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullMassOrder => "FULL_MASS_ORDER",
            Self::FullMassOrderDecays => "FULL_MASS_ORDER_DECAYS",
            Self::ThermalFistList => "THERMAL_FIST_LIST",
            Self::ThermalFistDecays => "THERMAL_FIST_DECAYS",
            Self::SmashParticles => "SMASH_PARTICLES",
            Self::SmashDecays => "SMASH_DECAYS",
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::FullMassOrder => "PDG21Plus_massorder.dat",
            Self::FullMassOrderDecays => "decays_PDG21Plus_massorder.dat",
            Self::ThermalFistList => "PDG21Plus_ThFIST.dat",
            Self::ThermalFistDecays => "decays_PDG21Plus_ThFIST.dat",
            Self::SmashParticles => "particles.txt",
            Self::SmashDecays => "decaymodes.txt",
        }
    }

    /// Whether the format needs the multi-body reduction.
    pub const fn is_smash(self) -> bool {
        matches!(self, Self::SmashParticles | Self::SmashDecays)
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    /// Accepts `FULL_MASS_ORDER`, `full-mass-order` and similar spellings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown format `{value}`; expected one of {}",
                    Self::ALL
                        .iter()
                        .map(|format| format.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Encoding of the Thermal-FIST statistics column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatisticsConvention {
    /// `0` boson, `1` fermion.
    #[default]
    ZeroOne,
    /// `-1` boson, `+1` fermion.
    Signed,
}

impl StatisticsConvention {
    pub const fn code(self, fermion: bool) -> i32 {
        match (self, fermion) {
            (_, true) => 1,
            (Self::ZeroOne, false) => 0,
            (Self::Signed, false) => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub statistics: StatisticsConvention,
}

#[derive(Debug)]
pub enum ExportError {
    MissingParity {
        pid: Pid,
    },
    UnknownParticle {
        mother: Pid,
        pid: Pid,
    },
    /// Daughter spins cannot couple to the mother spin for any `L`.
    SpinMismatch {
        mother: Pid,
        products: Vec<Pid>,
    },
    UnmappedMultibody(Vec<UnmappedMultibody>),
    Mapping(MappingError),
    Validation(ConservationError),
    Parse(ParseError),
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParity { pid } => {
                write!(f, "[PDG {pid}] SMASH particle export needs a parity")
            }
            Self::UnknownParticle { mother, pid } => {
                write!(f, "[PDG {mother}] decay product {pid} is not a known particle")
            }
            Self::SpinMismatch { mother, products } => write!(
                f,
                "[PDG {mother}] spins of {products:?} cannot couple to the mother spin"
            ),
            Self::UnmappedMultibody(records) => {
                write!(
                    f,
                    "{} multi-body channels have no intermediate state",
                    records.len()
                )?;
                for record in records {
                    write!(f, "\n  {record}")?;
                }
                Ok(())
            }
            Self::Mapping(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "failed to write `{path}`: {source}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mapping(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<MappingError> for ExportError {
    fn from(value: MappingError) -> Self {
        Self::Mapping(value)
    }
}

impl From<ConservationError> for ExportError {
    fn from(value: ConservationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ParseError> for ExportError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

/// Renders `format` from a validated catalog and its multi-body reduction.
///
/// Only the SMASH formats read `reduction`; unmapped channels are simply
/// absent from it.
pub fn export(
    catalog: &Catalog,
    reduction: &Reduction,
    format: ExportFormat,
    options: &ExportOptions,
) -> ExportResult<String> {
    match format {
        ExportFormat::FullMassOrder => Ok(mass_order::render_list(catalog)),
        ExportFormat::FullMassOrderDecays => Ok(mass_order::render_with_decays(catalog)),
        ExportFormat::ThermalFistList => Ok(thermal_fist::render_list(catalog, options.statistics)),
        ExportFormat::ThermalFistDecays => Ok(thermal_fist::render_decays(catalog)),
        ExportFormat::SmashParticles => smash::render_particles(catalog),
        ExportFormat::SmashDecays => smash::render_decays(catalog, reduction),
    }
}
