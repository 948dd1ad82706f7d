//! Master table loader.
//!
//! The master table is the spreadsheet of record exported as tab-separated
//! text with two sections:
//!
//! ```text
//! #! particles
//! ID  Name  Mass(GeV)  Width(GeV)  Degeneracy  Baryon no.  ...
//! #! decays
//! ID  Branching ratio  ID#1  ID#2  ID#3  ID#4  ID#5
//! ```
//!
//! # Invariants
//! - Columns are resolved by header name; their order is free.
//! - Decay rows of one mother are consecutive.
//! - Antiparticles missing from the particle section are derived, together
//!   with their conjugated decay channels.

use crate::model::catalog::{Catalog, DecayTable};
use crate::model::decay::{DecayChannel, MAX_DAUGHTERS, MIN_DAUGHTERS};
use crate::model::particle::{Parity, Particle, Pid};
use crate::table::{read_text, Header, ParseError, ParseResult, Row};
use log::debug;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

pub const PARTICLE_SECTION: &str = "particles";
pub const DECAY_SECTION: &str = "decays";

const SECTION_MARKER: &str = "#!";

pub const COL_ID: &str = "ID";
pub const COL_NAME: &str = "Name";
pub const COL_MASS: &str = "Mass(GeV)";
pub const COL_WIDTH: &str = "Width(GeV)";
pub const COL_DEGENERACY: &str = "Degeneracy";
pub const COL_BARYON: &str = "Baryon no.";
pub const COL_STRANGENESS: &str = "Strangeness no.";
pub const COL_CHARM: &str = "Charm no.";
pub const COL_BOTTOM: &str = "Bottom no.";
pub const COL_ISOSPIN: &str = "Isospin";
pub const COL_ISOSPIN_Z: &str = "I_3";
pub const COL_CHARGE: &str = "Electric charge";
pub const COL_SPIN: &str = "Spin";
pub const COL_PARITY: &str = "Parity";
pub const COL_BRANCHING_RATIO: &str = "Branching ratio";
pub const COL_DAUGHTERS: [&str; MAX_DAUGHTERS] = ["ID#1", "ID#2", "ID#3", "ID#4", "ID#5"];

/// Loads and parses a master table file.
pub fn load_master(path: &Path) -> ParseResult<Catalog> {
    let text = read_text(path)?;
    parse_master(&text)
}

/// Parses master table text into a catalog (antiparticles included).
pub fn parse_master(text: &str) -> ParseResult<Catalog> {
    let sections = split_sections(text)?;
    let particles = parse_particles(&sections.particles)?;
    let known: HashSet<Pid> = particles.iter().map(|p| p.pid).collect();
    let decays = parse_decays(&sections.decays, &known)?;
    Ok(complete_conjugates(particles, decays))
}

struct Sections<'a> {
    particles: Vec<(usize, &'a str)>,
    decays: Vec<(usize, &'a str)>,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Particles,
    Decays,
}

fn split_sections(text: &str) -> ParseResult<Sections<'_>> {
    let mut current = None;
    let mut seen = BTreeSet::new();
    let mut sections = Sections {
        particles: Vec::new(),
        decays: Vec::new(),
    };

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if let Some(name) = trimmed.strip_prefix(SECTION_MARKER) {
            let section = match name.trim().to_ascii_lowercase().as_str() {
                PARTICLE_SECTION => Section::Particles,
                DECAY_SECTION => Section::Decays,
                other => {
                    return Err(ParseError::MalformedRow {
                        line,
                        message: format!("unknown section `{other}`"),
                    })
                }
            };
            if !seen.insert(section) {
                return Err(ParseError::MalformedRow {
                    line,
                    message: format!("section `{}` declared twice", name.trim()),
                });
            }
            current = Some(section);
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let target = match current {
            Some(Section::Particles) => &mut sections.particles,
            Some(Section::Decays) => &mut sections.decays,
            None => {
                return Err(ParseError::MalformedRow {
                    line,
                    message: "data before the first section marker".to_string(),
                })
            }
        };
        target.push((line, raw.trim_end_matches('\r')));
    }

    if !seen.contains(&Section::Particles) {
        return Err(ParseError::MissingSection(PARTICLE_SECTION));
    }
    if !seen.contains(&Section::Decays) {
        return Err(ParseError::MissingSection(DECAY_SECTION));
    }
    Ok(sections)
}

struct ParticleColumns {
    id: usize,
    name: usize,
    mass: usize,
    width: usize,
    degeneracy: usize,
    baryon: usize,
    strangeness: usize,
    charm: usize,
    bottom: usize,
    isospin: usize,
    isospin_z: usize,
    charge: usize,
    spin: Option<usize>,
    parity: Option<usize>,
}

impl ParticleColumns {
    fn resolve(header: &Header) -> ParseResult<Self> {
        let require = |column| header.require(PARTICLE_SECTION, column);
        Ok(Self {
            id: require(COL_ID)?,
            name: require(COL_NAME)?,
            mass: require(COL_MASS)?,
            width: require(COL_WIDTH)?,
            degeneracy: require(COL_DEGENERACY)?,
            baryon: require(COL_BARYON)?,
            strangeness: require(COL_STRANGENESS)?,
            charm: require(COL_CHARM)?,
            bottom: require(COL_BOTTOM)?,
            isospin: require(COL_ISOSPIN)?,
            isospin_z: require(COL_ISOSPIN_Z)?,
            charge: require(COL_CHARGE)?,
            spin: header.index_of(COL_SPIN),
            parity: header.index_of(COL_PARITY),
        })
    }
}

fn parse_particles(lines: &[(usize, &str)]) -> ParseResult<Vec<Particle>> {
    let Some(((header_line, header_text), rows)) = lines.split_first() else {
        return Err(ParseError::MissingColumn {
            section: PARTICLE_SECTION,
            column: COL_ID,
        });
    };
    let header = Header::new(&Row::tab_separated(*header_line, header_text));
    let columns = ParticleColumns::resolve(&header)?;

    let mut seen = HashSet::new();
    let mut particles = Vec::with_capacity(rows.len());
    for (line, text) in rows {
        let row = Row::tab_separated(*line, text);
        if row.is_empty() {
            continue;
        }
        let particle = parse_particle_row(&row, &columns)?;
        if !seen.insert(particle.pid) {
            return Err(ParseError::DuplicatePid {
                line: row.line,
                pid: particle.pid,
            });
        }
        particles.push(particle);
    }
    Ok(particles)
}

fn parse_particle_row(row: &Row<'_>, columns: &ParticleColumns) -> ParseResult<Particle> {
    let degeneracy = row.i32_at(columns.degeneracy, COL_DEGENERACY)?;
    let spin_degeneracy = u32::try_from(degeneracy).map_err(|_| ParseError::InvalidNumber {
        line: row.line,
        column: COL_DEGENERACY.to_string(),
        value: row.field(columns.degeneracy).to_string(),
    })?;

    let spin = match columns.spin {
        Some(index) if !row.field(index).is_empty() => Some(row.half_at(index, COL_SPIN)?),
        _ => None,
    };
    let parity = match columns.parity.map(|index| row.field(index)) {
        Some(value) if !value.is_empty() => Some(Parity::from_symbol(value).ok_or_else(|| {
            ParseError::MalformedRow {
                line: row.line,
                message: format!("parity must be `+` or `-`, got `{value}`"),
            }
        })?),
        _ => None,
    };

    let name = row.field(columns.name);
    if name.is_empty() {
        return Err(ParseError::MalformedRow {
            line: row.line,
            message: "particle name is empty".to_string(),
        });
    }

    Ok(Particle {
        pid: row.pid_at(columns.id, COL_ID)?,
        name: name.to_string(),
        mass: row.f64_at(columns.mass, COL_MASS)?,
        width: row.f64_at(columns.width, COL_WIDTH)?,
        spin_degeneracy,
        baryon_number: row.i32_at(columns.baryon, COL_BARYON)?,
        strangeness: row.i32_at(columns.strangeness, COL_STRANGENESS)?,
        charm: row.i32_at(columns.charm, COL_CHARM)?,
        bottom: row.i32_at(columns.bottom, COL_BOTTOM)?,
        isospin: row.half_at(columns.isospin, COL_ISOSPIN)?,
        isospin_z: row.half_at(columns.isospin_z, COL_ISOSPIN_Z)?,
        charge: row.i32_at(columns.charge, COL_CHARGE)?,
        stable: true,
        spin,
        parity,
    })
}

fn parse_decays(lines: &[(usize, &str)], known: &HashSet<Pid>) -> ParseResult<DecayTable> {
    let mut table = DecayTable::new();
    let Some(((header_line, header_text), rows)) = lines.split_first() else {
        return Ok(table);
    };
    let header = Header::new(&Row::tab_separated(*header_line, header_text));
    let mother_column = header.require(DECAY_SECTION, COL_ID)?;
    let ratio_column = header.require(DECAY_SECTION, COL_BRANCHING_RATIO)?;
    let mut daughter_columns = Vec::with_capacity(MAX_DAUGHTERS);
    for (slot, column) in COL_DAUGHTERS.iter().enumerate() {
        match header.index_of(column) {
            Some(index) => daughter_columns.push((index, *column)),
            None if slot < MIN_DAUGHTERS => {
                return Err(ParseError::MissingColumn {
                    section: DECAY_SECTION,
                    column,
                })
            }
            None => {}
        }
    }

    let mut current: Option<Pid> = None;
    let mut finished = HashSet::new();
    for (line, text) in rows {
        let row = Row::tab_separated(*line, text);
        if row.is_empty() {
            continue;
        }
        let mother = row.pid_at(mother_column, COL_ID)?;
        if !known.contains(&mother) {
            return Err(ParseError::UnknownMother {
                line: row.line,
                mother,
            });
        }
        if current != Some(mother) {
            if finished.contains(&mother) {
                return Err(ParseError::SplitDecayBlock {
                    line: row.line,
                    mother,
                });
            }
            if let Some(previous) = current {
                finished.insert(previous);
            }
            current = Some(mother);
        }

        let branching_ratio = row.f64_at(ratio_column, COL_BRANCHING_RATIO)?;
        let daughters = parse_daughters(&row, mother, &daughter_columns)?;
        table
            .entry(mother)
            .or_default()
            .push(DecayChannel::new(mother, branching_ratio, daughters));
    }
    Ok(table)
}

fn parse_daughters(
    row: &Row<'_>,
    mother: Pid,
    columns: &[(usize, &'static str)],
) -> ParseResult<Vec<Pid>> {
    let mut daughters = Vec::with_capacity(columns.len());
    let mut gap = false;
    for (index, column) in columns {
        let value = row.field(*index);
        let pid = if value.is_empty() {
            0
        } else {
            row.pid_at(*index, column)?
        };
        if pid == 0 {
            gap = true;
            continue;
        }
        if gap {
            return Err(ParseError::DaughterGap {
                line: row.line,
                mother,
            });
        }
        daughters.push(pid);
    }
    if !(MIN_DAUGHTERS..=MAX_DAUGHTERS).contains(&daughters.len()) {
        return Err(ParseError::DaughterCount {
            line: row.line,
            mother,
            count: daughters.len(),
        });
    }
    Ok(daughters)
}

/// Adds antiparticles (and their conjugated channels) missing from the master.
fn complete_conjugates(mut particles: Vec<Particle>, mut decays: DecayTable) -> Catalog {
    let listed: HashSet<Pid> = particles.iter().map(|p| p.pid).collect();
    let derived: Vec<Particle> = particles
        .iter()
        .filter(|p| !p.is_self_conjugate() && !listed.contains(&-p.pid))
        .map(Particle::antiparticle)
        .collect();
    debug!(
        "event=antiparticles_derived module=table status=ok count={}",
        derived.len()
    );
    particles.extend(derived);

    let interim = Catalog::new(particles.iter().cloned(), decays.clone());
    let mut conjugated = DecayTable::new();
    for (mother, channels) in interim.decay_table() {
        let anti = interim.conjugate_pid(*mother);
        if anti == *mother || decays.contains_key(&anti) {
            continue;
        }
        conjugated.insert(
            anti,
            channels
                .iter()
                .map(|channel| interim.conjugate_channel(channel))
                .collect(),
        );
    }
    decays.extend(conjugated);
    Catalog::new(particles, decays)
}

#[cfg(test)]
mod tests {
    use super::parse_master;
    use crate::table::ParseError;

    const HEADER: &str = "ID\tName\tMass(GeV)\tWidth(GeV)\tDegeneracy\tBaryon no.\tStrangeness no.\tCharm no.\tBottom no.\tIsospin\tI_3\tElectric charge";

    fn master(particles: &[&str], decays: &[&str]) -> String {
        let mut text = format!("#! particles\n{HEADER}\n");
        for row in particles {
            text.push_str(row);
            text.push('\n');
        }
        text.push_str("#! decays\nID\tBranching ratio\tID#1\tID#2\tID#3\tID#4\tID#5\n");
        for row in decays {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    const PI_PLUS: &str = "211\tπ+\t0.13957\t0\t1\t0\t0\t0\t0\t1\t1\t1";
    const PI_ZERO: &str = "111\tπ0\t0.134977\t0\t1\t0\t0\t0\t0\t1\t0\t0";
    const RHO_PLUS: &str = "213\tρ+\t0.775\t0.149\t3\t0\t0\t0\t0\t1\t1\t1";

    #[test]
    fn derives_antiparticles_and_conjugated_channels() {
        let text = master(
            &[PI_PLUS, PI_ZERO, RHO_PLUS],
            &["213\t1\t211\t111\t0\t0\t0"],
        );
        let catalog = parse_master(&text).unwrap();
        assert!(catalog.contains(-211));
        assert!(catalog.contains(-213));
        assert!(!catalog.contains(-111));
        let anti_channels = catalog.decays_of(-213);
        assert_eq!(anti_channels.len(), 1);
        assert_eq!(anti_channels[0].daughters, vec![-211, 111]);
        assert!(!catalog.get(-213).unwrap().stable);
    }

    #[test]
    fn rejects_repeated_pid() {
        let text = master(&[PI_PLUS, PI_PLUS], &[]);
        let err = parse_master(&text).unwrap_err();
        assert!(matches!(err, ParseError::DuplicatePid { pid: 211, .. }));
    }

    #[test]
    fn rejects_non_numeric_mass() {
        let text = master(&["211\tπ+\theavy\t0\t1\t0\t0\t0\t0\t1\t1\t1"], &[]);
        let err = parse_master(&text).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { ref column, .. } if column == "Mass(GeV)"));
    }

    #[test]
    fn rejects_split_decay_block() {
        let text = master(
            &[PI_PLUS, PI_ZERO, RHO_PLUS, "113\tρ0\t0.775\t0.149\t3\t0\t0\t0\t0\t1\t0\t0"],
            &[
                "213\t0.5\t211\t111",
                "113\t1\t211\t-211",
                "213\t0.5\t211\t111",
            ],
        );
        let err = parse_master(&text).unwrap_err();
        assert!(matches!(err, ParseError::SplitDecayBlock { mother: 213, .. }));
    }

    #[test]
    fn rejects_single_daughter_and_gaps() {
        let single = master(&[PI_PLUS, RHO_PLUS], &["213\t1\t211\t0"]);
        assert!(matches!(
            parse_master(&single).unwrap_err(),
            ParseError::DaughterCount { count: 1, .. }
        ));

        let gap = master(&[PI_PLUS, PI_ZERO, RHO_PLUS], &["213\t1\t211\t0\t111"]);
        assert!(matches!(
            parse_master(&gap).unwrap_err(),
            ParseError::DaughterGap { mother: 213, .. }
        ));
    }

    #[test]
    fn rejects_pid_without_conjugate() {
        let text = master(&["-2147483648\tX\t1.0\t0\t1\t0\t0\t0\t0\t0\t0\t0"], &[]);
        let err = parse_master(&text).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { ref column, .. } if column == "ID"));
    }

    #[test]
    fn requires_both_sections() {
        let err = parse_master(&format!("#! particles\n{HEADER}\n{PI_PLUS}\n")).unwrap_err();
        assert!(matches!(err, ParseError::MissingSection("decays")));
    }
}
