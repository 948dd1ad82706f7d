//! Physical validation of a loaded catalog.
//!
//! # Responsibility
//! - Check every particle and channel, collecting all fatal violations.
//! - Drop kinematically forbidden channels with a warning instead of failing.
//! - Return a new, filtered catalog; the input is never mutated.
//!
//! # Invariants
//! - Quantum-number, branching-ratio and particle-property violations are
//!   always fatal and reported together.
//! - Retained channels of every mother conserve B, S, charm, bottom and
//!   charge and have `sum(daughter masses) <= mother mass`.
//! - Ratios are renormalised only for mothers that lost channels.

use crate::model::catalog::{Catalog, DecayTable};
use crate::model::decay::DecayChannel;
use crate::model::particle::{Particle, Pid};
use log::{info, warn};
use std::collections::BTreeSet;

mod violation;

pub use violation::{ConservationError, KinematicExclusion, ValidationWarning, Violation};

pub const DEFAULT_BR_TOLERANCE: f64 = 1e-6;
/// 1 MeV, in GeV.
pub const DEFAULT_MARGINAL_MARGIN: f64 = 0.001;

/// Tolerances applied by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    /// Relative tolerance on the per-mother branching-ratio sum.
    pub br_rel_tolerance: f64,
    /// Q-value (GeV) below which a kept channel is reported as marginal.
    pub marginal_margin: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            br_rel_tolerance: DEFAULT_BR_TOLERANCE,
            marginal_margin: DEFAULT_MARGINAL_MARGIN,
        }
    }
}

impl ValidationPolicy {
    /// `|sum - 1| <= tol * max(1, |sum|)`.
    pub fn accepts_sum(&self, sum: f64) -> bool {
        (sum - 1.0).abs() <= self.br_rel_tolerance * sum.abs().max(1.0)
    }
}

/// Catalog that passed validation, with kinematically forbidden channels removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedModel {
    pub catalog: Catalog,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidatedModel {
    pub fn kinematic_exclusions(&self) -> impl Iterator<Item = &KinematicExclusion> {
        self.warnings.iter().filter_map(|warning| match warning {
            ValidationWarning::KinematicExclusion(exclusion) => Some(exclusion),
            _ => None,
        })
    }
}

/// Validates `catalog` under `policy`.
///
/// # Errors
/// Returns [`ConservationError`] with every violation found when any
/// particle property, conservation law or branching-ratio rule is broken.
pub fn validate(
    catalog: &Catalog,
    policy: &ValidationPolicy,
) -> Result<ValidatedModel, ConservationError> {
    let mut violations = Vec::new();
    let mut warnings = Vec::new();

    for particle in catalog.particles() {
        check_particle(catalog, particle, &mut violations, &mut warnings);
    }

    let mut retained = DecayTable::new();
    for (mother_pid, channels) in catalog.decay_table() {
        let Some(mother) = catalog.get(*mother_pid) else {
            violations.push(Violation::UnknownMother { mother: *mother_pid });
            continue;
        };
        let kept = check_channels(catalog, mother, channels, policy, &mut violations, &mut warnings);
        if kept.is_empty() {
            warnings.push(ValidationWarning::AllChannelsExcluded { mother: mother.pid });
        } else {
            retained.insert(mother.pid, kept);
        }
    }

    if !violations.is_empty() {
        warn!(
            "event=validate module=validate status=error violations={}",
            violations.len()
        );
        return Err(ConservationError { violations });
    }

    for warning in &warnings {
        warn!(
            "event={} module=validate status=warn detail=\"{}\"",
            warning.event(),
            warning
        );
    }
    info!(
        "event=validate module=validate status=ok particles={} mothers={} warnings={}",
        catalog.len(),
        retained.len(),
        warnings.len()
    );

    Ok(ValidatedModel {
        catalog: Catalog::new(catalog.particles().cloned(), retained),
        warnings,
    })
}

fn check_particle(
    catalog: &Catalog,
    particle: &Particle,
    violations: &mut Vec<Violation>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let pid = particle.pid;
    if !particle.satisfies_hypercharge_relation() {
        violations.push(Violation::HyperchargeMismatch {
            pid,
            charge: particle.charge,
            expected_doubled: particle.hypercharge_charge_doubled(),
        });
    }
    if particle.mass <= 0.0 {
        violations.push(Violation::NonPositiveMass {
            pid,
            mass: particle.mass,
        });
    }
    if particle.width < 0.0 {
        violations.push(Violation::NegativeWidth {
            pid,
            width: particle.width,
        });
    }
    let degeneracy_matches_spin = match particle.spin {
        Some(spin) => i64::from(spin.doubled()) + 1 == i64::from(particle.spin_degeneracy),
        None => true,
    };
    if particle.spin_degeneracy == 0 || !degeneracy_matches_spin {
        violations.push(Violation::InvalidDegeneracy {
            pid,
            degeneracy: particle.spin_degeneracy,
            spin: particle.spin,
        });
    }
    if pid < 0 {
        if let Some(partner) = catalog.get(-pid) {
            if !particle.is_conjugate_of(partner) {
                violations.push(Violation::ConjugateMismatch { pid });
            }
        }
    }

    let has_decays = !catalog.decays_of(pid).is_empty();
    if !has_decays && particle.width > 0.0 {
        warnings.push(ValidationWarning::WidthWithoutDecays {
            pid,
            width: particle.width,
        });
    }
    if has_decays && particle.width == 0.0 {
        warnings.push(ValidationWarning::DecaysWithoutWidth { pid });
    }
}

/// Checks the channels of one mother and returns those kept for export.
fn check_channels(
    catalog: &Catalog,
    mother: &Particle,
    channels: &[DecayChannel],
    policy: &ValidationPolicy,
    violations: &mut Vec<Violation>,
    warnings: &mut Vec<ValidationWarning>,
) -> Vec<DecayChannel> {
    let mut seen = BTreeSet::new();
    let mut kept = Vec::with_capacity(channels.len());
    let mut dropped_any = false;
    let mut sum = 0.0;

    for channel in channels {
        sum += channel.branching_ratio;
        if !seen.insert(channel.daughter_key()) {
            violations.push(Violation::DuplicateChannel {
                mother: mother.pid,
                daughters: channel.daughters.clone(),
            });
        }
        if !(channel.branching_ratio > 0.0 && channel.branching_ratio <= 1.0) {
            violations.push(Violation::BranchingRatioOutOfRange {
                mother: mother.pid,
                daughters: channel.daughters.clone(),
                value: channel.branching_ratio,
            });
        }

        let unknown: Vec<Pid> = channel
            .daughters
            .iter()
            .copied()
            .filter(|daughter| !catalog.contains(*daughter))
            .collect();
        if !unknown.is_empty() {
            violations.extend(unknown.into_iter().map(|daughter| Violation::UnknownDaughter {
                mother: mother.pid,
                daughter,
            }));
            continue;
        }

        let (Some(total), Some(daughter_mass)) = (
            catalog.total_charges(&channel.daughters),
            catalog.total_mass(&channel.daughters),
        ) else {
            continue;
        };
        for (quantity, mother_value, daughter_sum) in mother.charges().mismatches(&total) {
            violations.push(Violation::QuantumNumberMismatch {
                mother: mother.pid,
                daughters: channel.daughters.clone(),
                quantity,
                mother_value,
                daughter_sum,
            });
        }

        if daughter_mass > mother.mass {
            dropped_any = true;
            warnings.push(ValidationWarning::KinematicExclusion(KinematicExclusion {
                mother: mother.pid,
                daughters: channel.daughters.clone(),
                branching_ratio: channel.branching_ratio,
                mother_mass: mother.mass,
                daughter_mass,
            }));
            continue;
        }
        let q_value = mother.mass - daughter_mass;
        if q_value < policy.marginal_margin {
            warnings.push(ValidationWarning::MarginalThreshold {
                mother: mother.pid,
                daughters: channel.daughters.clone(),
                q_value,
            });
        }
        kept.push(channel.clone());
    }

    if !policy.accepts_sum(sum) {
        violations.push(Violation::BranchingRatioSum {
            mother: mother.pid,
            sum,
        });
    }

    if dropped_any {
        renormalize(&mut kept);
    }
    kept
}

/// Rescales ratios so they sum to one. Empty or zero-sum lists are left as is.
pub fn renormalize(channels: &mut [DecayChannel]) {
    let sum: f64 = channels.iter().map(|channel| channel.branching_ratio).sum();
    if sum <= 0.0 {
        return;
    }
    for channel in channels {
        channel.branching_ratio /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::{renormalize, validate, ValidationPolicy, ValidationWarning, Violation};
    use crate::model::catalog::{Catalog, DecayTable};
    use crate::model::decay::DecayChannel;
    use crate::model::particle::{HalfInt, Particle};

    fn hadron(pid: i32, mass: f64, baryon: i32, iz_doubled: i32, charge: i32) -> Particle {
        Particle {
            pid,
            name: format!("h{pid}"),
            mass,
            width: 0.0,
            spin_degeneracy: 1,
            baryon_number: baryon,
            strangeness: 0,
            charm: 0,
            bottom: 0,
            isospin: HalfInt::from_doubled(iz_doubled.abs()),
            isospin_z: HalfInt::from_doubled(iz_doubled),
            charge,
            stable: true,
            spin: None,
            parity: None,
        }
    }

    fn catalog_with(channels: Vec<DecayChannel>) -> Catalog {
        let mut heavy = hadron(113, 0.775, 0, 0, 0);
        heavy.width = 0.149;
        let mut decays = DecayTable::new();
        decays.insert(113, channels);
        Catalog::new(
            vec![
                hadron(211, 0.13957, 0, 2, 1),
                hadron(-211, 0.13957, 0, -2, -1),
                hadron(111, 0.134977, 0, 0, 0),
                hadron(2212, 0.938272, 1, 1, 1),
                hadron(-2212, 0.938272, -1, -1, -1),
                heavy,
            ],
            decays,
        )
    }

    #[test]
    fn consistent_catalog_passes_without_warnings() {
        let catalog = catalog_with(vec![DecayChannel::new(113, 1.0, vec![211, -211])]);
        let model = validate(&catalog, &ValidationPolicy::default()).unwrap();
        assert!(model.warnings.is_empty());
        assert_eq!(model.catalog, catalog);
    }

    #[test]
    fn every_violation_is_collected() {
        let catalog = catalog_with(vec![
            DecayChannel::new(113, 0.5, vec![211, 111]),
            DecayChannel::new(113, 0.4, vec![211, -211]),
        ]);
        let err = validate(&catalog, &ValidationPolicy::default()).unwrap_err();
        assert!(err
            .violations
            .iter()
            .any(|v| matches!(v, Violation::QuantumNumberMismatch { quantity: "electric charge", .. })));
        assert!(err
            .violations
            .iter()
            .any(|v| matches!(v, Violation::BranchingRatioSum { mother: 113, .. })));
    }

    #[test]
    fn kinematically_forbidden_channel_is_dropped_and_rest_renormalized() {
        let catalog = catalog_with(vec![
            DecayChannel::new(113, 0.75, vec![211, -211]),
            DecayChannel::new(113, 0.25, vec![2212, -2212]),
        ]);
        let model = validate(&catalog, &ValidationPolicy::default()).unwrap();
        let channels = model.catalog.decays_of(113);
        assert_eq!(channels.len(), 1);
        assert!((channels[0].branching_ratio - 1.0).abs() < 1e-12);
        assert_eq!(model.kinematic_exclusions().count(), 1);
        // The input catalog is left untouched.
        assert_eq!(catalog.decays_of(113).len(), 2);
    }

    #[test]
    fn mother_losing_every_channel_becomes_stable() {
        let catalog = catalog_with(vec![DecayChannel::new(113, 1.0, vec![2212, -2212])]);
        let model = validate(&catalog, &ValidationPolicy::default()).unwrap();
        assert!(model.catalog.get(113).unwrap().stable);
        assert!(model
            .warnings
            .contains(&ValidationWarning::AllChannelsExcluded { mother: 113 }));
    }

    #[test]
    fn duplicate_channels_and_unknown_daughters_are_fatal() {
        let catalog = catalog_with(vec![
            DecayChannel::new(113, 0.5, vec![211, -211]),
            DecayChannel::new(113, 0.25, vec![-211, 211]),
            DecayChannel::new(113, 0.25, vec![111, 999]),
        ]);
        let err = validate(&catalog, &ValidationPolicy::default()).unwrap_err();
        assert!(err
            .violations
            .contains(&Violation::DuplicateChannel { mother: 113, daughters: vec![-211, 211] }));
        assert!(err
            .violations
            .contains(&Violation::UnknownDaughter { mother: 113, daughter: 999 }));
    }

    #[test]
    fn marginal_channels_are_kept_with_a_warning() {
        let catalog = catalog_with(vec![DecayChannel::new(113, 1.0, vec![211, -211])]);
        let policy = ValidationPolicy {
            marginal_margin: 0.6,
            ..ValidationPolicy::default()
        };
        let model = validate(&catalog, &policy).unwrap();
        assert_eq!(model.catalog.decays_of(113).len(), 1);
        assert!(matches!(
            model.warnings[0],
            ValidationWarning::MarginalThreshold { mother: 113, .. }
        ));
    }

    #[test]
    fn branching_ratio_sum_uses_relative_tolerance() {
        let policy = ValidationPolicy::default();
        assert!(policy.accepts_sum(1.0 + 5e-7));
        assert!(!policy.accepts_sum(1.01));
        let mut channels = vec![
            DecayChannel::new(1, 0.2, vec![2, 3]),
            DecayChannel::new(1, 0.2, vec![3, 3]),
        ];
        renormalize(&mut channels);
        assert!((channels[0].branching_ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn particle_property_violations_are_reported() {
        let mut broken = hadron(2212, 0.938272, 1, 1, 0);
        broken.spin = Some(HalfInt::from_doubled(1));
        broken.spin_degeneracy = 3;
        let catalog = Catalog::new(vec![broken], DecayTable::new());
        let err = validate(&catalog, &ValidationPolicy::default()).unwrap_err();
        assert!(matches!(
            err.violations[0],
            Violation::HyperchargeMismatch { pid: 2212, charge: 0, expected_doubled: 2 }
        ));
        assert!(matches!(
            err.violations[1],
            Violation::InvalidDegeneracy { pid: 2212, degeneracy: 3, .. }
        ));
    }
}
