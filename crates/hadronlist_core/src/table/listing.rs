//! Readers for exported lists.
//!
//! Used to re-read our own mass-ordered output, to compare against older
//! reference lists (the 12-column PDG16+ layout has no `I_3` column), and to
//! check Thermal-FIST list/decay pairs produced elsewhere.

use crate::model::catalog::{Catalog, DecayTable};
use crate::model::decay::{DecayChannel, MAX_DAUGHTERS};
use crate::model::particle::{Charges, HalfInt, Particle, Pid};
use crate::table::{data_lines, ParseError, ParseResult, Row};

const MASS_ORDER_COLUMNS: usize = 13;
const MASS_ORDER_COLUMNS_WITHOUT_IZ: usize = 12;
const MASS_ORDER_DECAY_COLUMNS: usize = 3 + MAX_DAUGHTERS;

/// Parses a mass-ordered particle list (12 or 13 columns).
///
/// The spin and parity of the returned particles are unknown (`None`); the
/// stable flag follows the `NDecayChannels` column.
pub fn parse_mass_order(text: &str) -> ParseResult<Vec<Particle>> {
    let mut particles = Vec::new();
    for (line, raw) in data_lines(text) {
        let row = Row::columns(line, raw);
        match row.fields.len() {
            MASS_ORDER_DECAY_COLUMNS => continue,
            MASS_ORDER_COLUMNS | MASS_ORDER_COLUMNS_WITHOUT_IZ => {
                particles.push(parse_mass_order_particle(&row)?)
            }
            count => {
                return Err(ParseError::MalformedRow {
                    line,
                    message: format!("expected 12 or 13 columns, found {count}"),
                })
            }
        }
    }
    if particles.is_empty() {
        return Err(ParseError::NoRecords("particle"));
    }
    Ok(particles)
}

/// Parses a mass-ordered list whose particle rows are followed by their
/// decay rows (`mother, ndaughters, BR, d1..d5`).
pub fn parse_mass_order_decays(text: &str) -> ParseResult<Catalog> {
    let mut decays = DecayTable::new();
    for (line, raw) in data_lines(text) {
        let row = Row::columns(line, raw);
        if row.fields.len() != MASS_ORDER_DECAY_COLUMNS {
            continue;
        }
        let mother = row.pid_at(0, "mother")?;
        let count = row.i32_at(1, "ndaughters")?;
        let branching_ratio = row.f64_at(2, "branching ratio")?;
        let mut daughters = Vec::with_capacity(MAX_DAUGHTERS);
        for slot in 0..MAX_DAUGHTERS {
            let pid = row.pid_at(3 + slot, "daughter")?;
            if pid != 0 {
                daughters.push(pid);
            }
        }
        if usize::try_from(count).ok() != Some(daughters.len()) {
            return Err(ParseError::DaughterCount {
                line,
                mother,
                count: daughters.len(),
            });
        }
        decays
            .entry(mother)
            .or_default()
            .push(DecayChannel::new(mother, branching_ratio, daughters));
    }
    let particles = parse_mass_order(text)?;
    Ok(Catalog::new(particles, decays))
}

fn parse_mass_order_particle(row: &Row<'_>) -> ParseResult<Particle> {
    let has_iz = row.fields.len() == MASS_ORDER_COLUMNS;
    let shift = usize::from(has_iz);
    let baryon_number = row.i32_at(5, "B")?;
    let strangeness = row.i32_at(6, "S")?;
    let charm = row.i32_at(7, "Charm")?;
    let bottom = row.i32_at(8, "Bottom")?;
    let charge = row.i32_at(10 + shift, "Q")?;
    let isospin_z = if has_iz {
        row.half_at(10, "Iz")?
    } else {
        HalfInt::from_doubled(2 * charge - (baryon_number + strangeness + charm + bottom))
    };
    let degeneracy = row.i32_at(4, "SpinDeg")?;
    let channels = row.i32_at(11 + shift, "NDecayChannels")?;

    Ok(Particle {
        pid: row.pid_at(0, "PID")?,
        name: row.field(1).to_string(),
        mass: row.f64_at(2, "Mass")?,
        width: row.f64_at(3, "Width")?,
        spin_degeneracy: u32::try_from(degeneracy).map_err(|_| ParseError::InvalidNumber {
            line: row.line,
            column: "SpinDeg".to_string(),
            value: degeneracy.to_string(),
        })?,
        baryon_number,
        strangeness,
        charm,
        bottom,
        isospin: row.half_at(9, "Isospin")?,
        isospin_z,
        charge,
        stable: channels == 0,
        spin: None,
        parity: None,
    })
}

/// One row of a Thermal-FIST particle list.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalFistEntry {
    pub pid: Pid,
    pub name: String,
    pub stable: bool,
    pub mass: f64,
    pub degeneracy: i32,
    pub statistics: i32,
    /// Thermal-FIST lists carry no bottom column; `bottom` is always `0`.
    pub charges: Charges,
    pub width: f64,
    pub threshold: f64,
}

/// Parses a Thermal-FIST particle list.
///
/// Lines whose first token is not an integer (headers) are skipped, as are
/// comments and blank lines.
pub fn parse_thermal_fist_list(text: &str) -> ParseResult<Vec<ThermalFistEntry>> {
    let mut entries = Vec::new();
    for (line, raw) in data_lines(text) {
        let row = Row::columns(line, raw);
        if row.field(0).parse::<Pid>().is_err() {
            continue;
        }
        let pid = row.pid_at(0, "ID")?;
        if row.fields.len() < 10 {
            return Err(ParseError::MalformedRow {
                line,
                message: format!("malformed particle list line: `{}`", raw.trim()),
            });
        }
        let optional = |index: usize, column: &str| -> ParseResult<f64> {
            if row.field(index).is_empty() {
                Ok(0.0)
            } else {
                row.f64_at(index, column)
            }
        };
        entries.push(ThermalFistEntry {
            pid,
            name: row.field(1).to_string(),
            stable: row.i32_at(2, "Stable")? == 1,
            mass: row.f64_at(3, "Mass")?,
            degeneracy: row.i32_at(4, "Deg")?,
            statistics: row.i32_at(5, "Statistics")?,
            charges: Charges {
                baryon: row.i32_at(6, "B")?,
                charge: row.i32_at(7, "Q")?,
                strangeness: row.i32_at(8, "S")?,
                charm: row.i32_at(9, "Charm")?,
                bottom: 0,
            },
            width: optional(12, "Width")?,
            threshold: optional(13, "Threshold")?,
        });
    }
    if entries.is_empty() {
        return Err(ParseError::NoRecords("particle"));
    }
    Ok(entries)
}

/// Decay block of a Thermal-FIST decay file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayBlock {
    pub parent: Pid,
    /// Line of the parent PID.
    pub line: usize,
    pub channels: Vec<DecayChannel>,
}

/// Parses a Thermal-FIST decay file: `parent`, `n_channels`, then `n`
/// lines of `BR d1 d2 ...`. Text after `#` is ignored.
pub fn parse_thermal_fist_decays(text: &str) -> ParseResult<Vec<DecayBlock>> {
    let tokens: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(index, raw)| (index + 1, raw.split('#').next().unwrap_or("").trim()))
        .filter(|(_, content)| !content.is_empty())
        .collect();

    let mut blocks = Vec::new();
    let mut cursor = tokens.iter();
    while let Some((line, parent_text)) = cursor.next() {
        let parent = parent_text
            .parse::<Pid>()
            .ok()
            .filter(|pid| *pid != i32::MIN)
            .ok_or_else(|| ParseError::MalformedRow {
                line: *line,
                message: format!("expected PDG ID, got `{parent_text}`"),
            })?;
        let Some((count_line, count_text)) = cursor.next() else {
            return Err(ParseError::MalformedRow {
                line: *line,
                message: format!("missing number of channels after parent {parent}"),
            });
        };
        let count = count_text
            .parse::<usize>()
            .map_err(|_| ParseError::MalformedRow {
                line: *count_line,
                message: format!(
                    "expected integer number of channels after parent {parent}, got `{count_text}`"
                ),
            })?;

        let mut channels = Vec::with_capacity(count);
        for index in 1..=count {
            let Some((channel_line, channel_text)) = cursor.next() else {
                return Err(ParseError::MalformedRow {
                    line: *count_line,
                    message: format!("missing line for channel {index}/{count} of parent {parent}"),
                });
            };
            let row = Row::columns(*channel_line, channel_text);
            if row.fields.len() < 2 {
                return Err(ParseError::MalformedRow {
                    line: *channel_line,
                    message: format!(
                        "[PDG {parent}] channel {index}: must have BR and at least one daughter"
                    ),
                });
            }
            let branching_ratio = row.f64_at(0, "BR")?;
            let daughters = (1..row.fields.len())
                .map(|slot| row.pid_at(slot, "daughter"))
                .collect::<ParseResult<Vec<Pid>>>()?;
            channels.push(DecayChannel::new(parent, branching_ratio, daughters));
        }
        blocks.push(DecayBlock {
            parent,
            line: *line,
            channels,
        });
    }
    Ok(blocks)
}
