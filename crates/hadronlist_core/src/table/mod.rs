//! Text table readers for the master table and the exported lists.
//!
//! # Responsibility
//! - Split tab-separated text into rows that remember their line numbers.
//! - Resolve header columns by name and convert fields into typed values.
//! - Report malformed input as [`ParseError`] with enough context to fix it.
//!
//! # Invariants
//! - Blank lines and `#` comment lines never produce rows.
//! - Numeric conversion never silently truncates (`1.5` is not an integer).

use crate::model::particle::{HalfInt, Pid};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod listing;
pub mod master;

pub type ParseResult<T> = Result<T, ParseError>;

/// Malformed master table or list file. Always fatal.
#[derive(Debug)]
pub enum ParseError {
    Io {
        path: String,
        source: std::io::Error,
    },
    MissingSection(&'static str),
    NoRecords(&'static str),
    MissingColumn {
        section: &'static str,
        column: &'static str,
    },
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
    InvalidHalfInteger {
        line: usize,
        column: String,
        value: String,
    },
    DuplicatePid {
        line: usize,
        pid: i32,
    },
    DaughterCount {
        line: usize,
        mother: i32,
        count: usize,
    },
    DaughterGap {
        line: usize,
        mother: i32,
    },
    SplitDecayBlock {
        line: usize,
        mother: i32,
    },
    UnknownMother {
        line: usize,
        mother: i32,
    },
    MalformedRow {
        line: usize,
        message: String,
    },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read `{path}`: {source}"),
            Self::MissingSection(section) => write!(f, "missing `#! {section}` section"),
            Self::NoRecords(kind) => write!(f, "no {kind} records found"),
            Self::MissingColumn { section, column } => {
                write!(f, "{section} section is missing required column `{column}`")
            }
            Self::InvalidNumber {
                line,
                column,
                value,
            } => write!(f, "line {line}: column `{column}` is not numeric: `{value}`"),
            Self::InvalidHalfInteger {
                line,
                column,
                value,
            } => write!(
                f,
                "line {line}: column `{column}` is not a multiple of 1/2: `{value}`"
            ),
            Self::DuplicatePid { line, pid } => write!(f, "line {line}: PID {pid} is repeated"),
            Self::DaughterCount {
                line,
                mother,
                count,
            } => write!(
                f,
                "line {line}: channel of {mother} has {count} daughters (expected 2 to 5)"
            ),
            Self::DaughterGap { line, mother } => write!(
                f,
                "line {line}: channel of {mother} fills a daughter slot after an empty one"
            ),
            Self::SplitDecayBlock { line, mother } => write!(
                f,
                "line {line}: decay rows of {mother} are not consecutive"
            ),
            Self::UnknownMother { line, mother } => write!(
                f,
                "line {line}: decay rows reference {mother}, which is not in the particle section"
            ),
            Self::MalformedRow { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reads a whole text file, mapping IO failures to [`ParseError::Io`].
pub fn read_text(path: &std::path::Path) -> ParseResult<String> {
    std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// One data line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub line: usize,
    pub fields: Vec<&'a str>,
}

impl<'a> Row<'a> {
    /// Splits a tab-separated line; fields are trimmed.
    pub fn tab_separated(line: usize, text: &'a str) -> Self {
        Self {
            line,
            fields: text.split('\t').map(str::trim).collect(),
        }
    }

    /// Splits on tabs when the line has any, otherwise on whitespace.
    /// Names may contain spaces, so tab-free splitting is only for legacy
    /// lists.
    pub fn columns(line: usize, text: &'a str) -> Self {
        if text.contains('\t') {
            Self::tab_separated(line, text)
        } else {
            Self::whitespace_separated(line, text)
        }
    }

    /// Splits a whitespace-separated line.
    pub fn whitespace_separated(line: usize, text: &'a str) -> Self {
        Self {
            line,
            fields: text.split_whitespace().collect(),
        }
    }

    /// Field at `index`, or the empty string when the row is short.
    pub fn field(&self, index: usize) -> &'a str {
        self.fields.get(index).copied().unwrap_or("")
    }

    pub fn f64_at(&self, index: usize, column: &str) -> ParseResult<f64> {
        parse_f64(self.line, column, self.field(index))
    }

    pub fn i32_at(&self, index: usize, column: &str) -> ParseResult<i32> {
        parse_i32(self.line, column, self.field(index))
    }

    pub fn pid_at(&self, index: usize, column: &str) -> ParseResult<Pid> {
        parse_pid(self.line, column, self.field(index))
    }

    pub fn half_at(&self, index: usize, column: &str) -> ParseResult<HalfInt> {
        parse_half(self.line, column, self.field(index))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|field| field.is_empty())
    }
}

/// Column names of a section, resolved by exact (trimmed) header text.
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    pub fn new(row: &Row<'_>) -> Self {
        Self {
            names: row.fields.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|name| name == column)
    }

    pub fn require(&self, section: &'static str, column: &'static str) -> ParseResult<usize> {
        self.index_of(column)
            .ok_or(ParseError::MissingColumn { section, column })
    }
}

/// Iterates over data lines, skipping blanks and `#` comments.
pub fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
}

pub fn parse_f64(line: usize, column: &str, value: &str) -> ParseResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            line,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Parses an integer, accepting spreadsheet renderings such as `1.0`.
pub fn parse_i32(line: usize, column: &str, value: &str) -> ParseResult<i32> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i32>() {
        return Ok(parsed);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.fract() == 0.0 && parsed.abs() <= f64::from(i32::MAX))
        .map(|parsed| parsed as i32)
        .ok_or_else(|| ParseError::InvalidNumber {
            line,
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Parses a PDG ID. `i32::MIN` has no conjugate and is rejected.
pub fn parse_pid(line: usize, column: &str, value: &str) -> ParseResult<Pid> {
    let pid = parse_i32(line, column, value)?;
    if pid == i32::MIN {
        return Err(ParseError::InvalidNumber {
            line,
            column: column.to_string(),
            value: value.to_string(),
        });
    }
    Ok(pid)
}

pub fn parse_half(line: usize, column: &str, value: &str) -> ParseResult<HalfInt> {
    let parsed = parse_f64(line, column, value)?;
    HalfInt::from_f64(parsed).ok_or_else(|| ParseError::InvalidHalfInteger {
        line,
        column: column.to_string(),
        value: value.to_string(),
    })
}
