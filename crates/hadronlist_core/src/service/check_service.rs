//! Consistency check for an existing Thermal-FIST list pair.
//!
//! # Responsibility
//! - Check a decay file against its particle list: known PIDs, branching
//!   ratios, conservation of Q (and optionally B, S, C), stable flags.
//! - Infer antiparticles by sign flip when only the particle is listed.
//!
//! # Invariants
//! - Every finding is collected; checking never stops at the first error.
//! - A stable parent with decays is a warning unless `strict_stable` is set.

use crate::model::particle::{Charges, Pid};
use crate::table::listing::{
    parse_thermal_fist_decays, parse_thermal_fist_list, DecayBlock, ThermalFistEntry,
};
use crate::table::{read_text, ParseError};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_ABS_TOL_BR: f64 = 5e-4;
pub const DEFAULT_REL_TOL_BR: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOptions {
    pub abs_tol_br: f64,
    pub rel_tol_br: f64,
    /// Report a stable parent with decays as an error instead of a warning.
    pub strict_stable: bool,
    /// Check B, S and C in addition to the electric charge.
    pub check_bscc: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            abs_tol_br: DEFAULT_ABS_TOL_BR,
            rel_tol_br: DEFAULT_REL_TOL_BR,
            strict_stable: false,
            check_bscc: true,
        }
    }
}

impl CheckOptions {
    /// `|sum - 1| <= max(abs, rel * max(1, |sum|))`.
    pub fn accepts_sum(&self, sum: f64) -> bool {
        (sum - 1.0).abs() <= self.abs_tol_br.max(self.rel_tol_br * sum.abs().max(1.0))
    }
}

/// One problem found by [`check_lists`]. Channels are numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckFinding {
    UnknownParent {
        parent: Pid,
    },
    StableWithDecays {
        parent: Pid,
    },
    BranchingRatioOutOfRange {
        parent: Pid,
        channel: usize,
        value: f64,
    },
    BranchingRatioSum {
        parent: Pid,
        sum: f64,
    },
    UnknownDaughters {
        parent: Pid,
        channel: usize,
        daughters: Vec<Pid>,
    },
    NotConserved {
        parent: Pid,
        channel: usize,
        quantity: &'static str,
        parent_value: i32,
        daughter_sum: i32,
    },
}

impl Display for CheckFinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownParent { parent } => {
                write!(f, "[PDG {parent}] parent not found in particle list")
            }
            Self::StableWithDecays { parent } => write!(
                f,
                "[PDG {parent}] has decays listed but is marked stable in particle list"
            ),
            Self::BranchingRatioOutOfRange {
                parent,
                channel,
                value,
            } => write!(f, "[PDG {parent}] channel {channel}: BR out of range: {value}"),
            Self::BranchingRatioSum { parent, sum } => {
                write!(f, "[PDG {parent}] sum of BRs = {sum:.6} (expected 1)")
            }
            Self::UnknownDaughters {
                parent,
                channel,
                daughters,
            } => write!(
                f,
                "[PDG {parent}] channel {channel}: unknown daughter PDG IDs {daughters:?}"
            ),
            Self::NotConserved {
                parent,
                channel,
                quantity,
                parent_value,
                daughter_sum,
            } => write!(
                f,
                "[PDG {parent}] channel {channel}: {quantity} not conserved (parent {parent_value}, daughters {daughter_sum})"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub errors: Vec<CheckFinding>,
    pub warnings: Vec<CheckFinding>,
    pub blocks: usize,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Unreadable or malformed input file.
#[derive(Debug)]
pub enum CheckError {
    ParticleList(ParseError),
    DecayTable(ParseError),
}

impl Display for CheckError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParticleList(err) => write!(f, "particle list parse error: {err}"),
            Self::DecayTable(err) => write!(f, "decay table parse error: {err}"),
        }
    }
}

impl Error for CheckError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ParticleList(err) | Self::DecayTable(err) => Some(err),
        }
    }
}

/// Reads both files and runs [`check_lists`].
pub fn check_files(
    particle_list: &Path,
    decay_table: &Path,
    options: &CheckOptions,
) -> Result<CheckReport, CheckError> {
    let entries = read_text(particle_list)
        .and_then(|text| parse_thermal_fist_list(&text))
        .map_err(CheckError::ParticleList)?;
    let blocks = read_text(decay_table)
        .and_then(|text| parse_thermal_fist_decays(&text))
        .map_err(CheckError::DecayTable)?;
    Ok(check_lists(&entries, &blocks, options))
}

struct Lookup<'a> {
    entries: BTreeMap<Pid, &'a ThermalFistEntry>,
}

impl<'a> Lookup<'a> {
    /// Charges of `pid`, conjugating the listed particle for antiparticles.
    fn charges(&self, pid: Pid) -> Option<Charges> {
        if let Some(entry) = self.entries.get(&pid) {
            return Some(entry.charges);
        }
        self.entries.get(&-pid).map(|entry| entry.charges.conjugate())
    }

    fn stable(&self, pid: Pid) -> Option<bool> {
        self.entries
            .get(&pid)
            .or_else(|| self.entries.get(&-pid))
            .map(|entry| entry.stable)
    }
}

/// Checks `blocks` against `entries` under `options`.
pub fn check_lists(
    entries: &[ThermalFistEntry],
    blocks: &[DecayBlock],
    options: &CheckOptions,
) -> CheckReport {
    let lookup = Lookup {
        entries: entries.iter().map(|entry| (entry.pid, entry)).collect(),
    };
    let mut report = CheckReport {
        blocks: blocks.len(),
        ..CheckReport::default()
    };

    for block in blocks {
        let parent = block.parent;
        match lookup.stable(parent) {
            Some(true) if !block.channels.is_empty() => {
                let finding = CheckFinding::StableWithDecays { parent };
                if options.strict_stable {
                    report.errors.push(finding);
                } else {
                    report.warnings.push(finding);
                }
            }
            Some(_) => {}
            None => report.errors.push(CheckFinding::UnknownParent { parent }),
        }

        let mut sum = 0.0;
        for (index, channel) in block.channels.iter().enumerate() {
            if !(0.0..=1.0).contains(&channel.branching_ratio) {
                report.errors.push(CheckFinding::BranchingRatioOutOfRange {
                    parent,
                    channel: index + 1,
                    value: channel.branching_ratio,
                });
            }
            sum += channel.branching_ratio;
        }
        if !options.accepts_sum(sum) {
            report
                .errors
                .push(CheckFinding::BranchingRatioSum { parent, sum });
        }

        let Some(parent_charges) = lookup.charges(parent) else {
            continue;
        };
        for (index, channel) in block.channels.iter().enumerate() {
            let unknown: Vec<Pid> = channel
                .daughters
                .iter()
                .copied()
                .filter(|daughter| lookup.charges(*daughter).is_none())
                .collect();
            if !unknown.is_empty() {
                report.errors.push(CheckFinding::UnknownDaughters {
                    parent,
                    channel: index + 1,
                    daughters: unknown,
                });
                continue;
            }
            let total: Charges = channel
                .daughters
                .iter()
                .filter_map(|daughter| lookup.charges(*daughter))
                .sum();
            for (quantity, parent_value, daughter_sum) in parent_charges.mismatches(&total) {
                if quantity != "electric charge" && !options.check_bscc {
                    continue;
                }
                report.errors.push(CheckFinding::NotConserved {
                    parent,
                    channel: index + 1,
                    quantity,
                    parent_value,
                    daughter_sum,
                });
            }
        }
    }

    for finding in &report.warnings {
        warn!("event=check_lists module=service status=warn detail=\"{finding}\"");
    }
    info!(
        "event=check_lists module=service status={} blocks={} errors={} warnings={}",
        if report.is_ok() { "ok" } else { "error" },
        report.blocks,
        report.errors.len(),
        report.warnings.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::{check_lists, CheckFinding, CheckOptions};
    use crate::table::listing::{parse_thermal_fist_decays, parse_thermal_fist_list};

    const LIST: &str = "\
211\tπ+\t1\t0.13957\t1\t0\t0\t1\t0\t0\t0\t0\t0\t0
111\tπ0\t1\t0.134977\t1\t0\t0\t0\t0\t0\t0\t0\t0\t0
2212\tp\t1\t0.938272\t2\t1\t1\t1\t0\t0\t0\t0\t0\t0
2112\tn\t1\t0.939565\t2\t1\t1\t0\t0\t0\t0\t0\t0\t0
2214\tΔ+\t0\t1.232\t4\t1\t1\t1\t0\t0\t0\t0\t0.117\t1.073249
";

    fn run(decays: &str, options: &CheckOptions) -> super::CheckReport {
        let entries = parse_thermal_fist_list(LIST).unwrap();
        let blocks = parse_thermal_fist_decays(decays).unwrap();
        check_lists(&entries, &blocks, options)
    }

    #[test]
    fn consistent_pair_passes() {
        let report = run(
            "2214\n2\n0.6\t2212\t111\n0.4\t2112\t211\n",
            &CheckOptions::default(),
        );
        assert!(report.is_ok(), "{:?}", report.errors);
        assert_eq!(report.blocks, 1);
    }

    #[test]
    fn antiparticle_blocks_use_sign_flipped_charges() {
        let report = run(
            "-2214\n1\n1\t-2212\t111\n",
            &CheckOptions::default(),
        );
        assert!(report.is_ok(), "{:?}", report.errors);
    }

    #[test]
    fn absolute_tolerance_applies_to_the_sum() {
        let report = run(
            "2214\n2\n0.6003\t2212\t111\n0.4\t2112\t211\n",
            &CheckOptions::default(),
        );
        assert!(report.is_ok());
        let report = run(
            "2214\n2\n0.61\t2212\t111\n0.4\t2112\t211\n",
            &CheckOptions::default(),
        );
        assert!(matches!(
            report.errors[0],
            CheckFinding::BranchingRatioSum { parent: 2214, .. }
        ));
    }

    #[test]
    fn baryon_check_can_be_disabled() {
        let decays = "2214\n1\n1\t211\t111\n";
        let report = run(decays, &CheckOptions::default());
        assert!(report
            .errors
            .iter()
            .any(|finding| matches!(finding, CheckFinding::NotConserved { quantity: "baryon number", .. })));

        let charge_only = CheckOptions {
            check_bscc: false,
            ..CheckOptions::default()
        };
        assert!(run(decays, &charge_only).is_ok());
    }

    #[test]
    fn stable_parent_with_decays_is_a_warning_unless_strict() {
        let decays = "2212\n1\n1\t2112\t211\n";
        let report = run(decays, &CheckOptions::default());
        assert!(report.is_ok());
        assert_eq!(
            report.warnings,
            vec![CheckFinding::StableWithDecays { parent: 2212 }]
        );

        let strict = CheckOptions {
            strict_stable: true,
            ..CheckOptions::default()
        };
        assert!(!run(decays, &strict).is_ok());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let report = run("9999\n1\n1\t211\t42\n", &CheckOptions::default());
        assert_eq!(
            report.errors,
            vec![CheckFinding::UnknownParent { parent: 9999 }]
        );
        let report = run("2214\n1\n1\t2212\t42\n", &CheckOptions::default());
        assert_eq!(
            report.errors,
            vec![CheckFinding::UnknownDaughters {
                parent: 2214,
                channel: 1,
                daughters: vec![42],
            }]
        );
    }
}
