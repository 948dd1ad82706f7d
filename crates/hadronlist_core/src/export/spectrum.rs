//! Mass spectrum table per hadron family.
//!
//! Families are selected with one representative charge state per
//! multiplet (e.g. neutral nucleons, negative Ξ), so each row lists one
//! mass per state.

use crate::model::catalog::Catalog;
use crate::model::particle::{HalfInt, Particle};

pub const SPECTRUM_FILE_NAME: &str = "mass_spectrum.dat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Nucleon,
    Delta,
    Kaon,
    Lambda,
    Sigma,
    Xi,
    Omega,
}

impl Family {
    pub const ALL: [Self; 7] = [
        Self::Nucleon,
        Self::Delta,
        Self::Kaon,
        Self::Lambda,
        Self::Sigma,
        Self::Xi,
        Self::Omega,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nucleon => "N",
            Self::Delta => "Δ",
            Self::Kaon => "K",
            Self::Lambda => "Λ",
            Self::Sigma => "Σ",
            Self::Xi => "Ξ",
            Self::Omega => "Ω",
        }
    }

    pub fn contains(self, particle: &Particle) -> bool {
        if particle.pid <= 0 {
            return false;
        }
        let baryon = particle.baryon_number != 0;
        let isospin = particle.isospin;
        let s = particle.strangeness;
        let q = particle.charge;
        match self {
            Self::Nucleon => baryon && q == 0 && isospin == HalfInt::from_doubled(1) && s == 0,
            Self::Delta => baryon && q == 0 && isospin == HalfInt::from_doubled(3) && s == 0,
            Self::Kaon => !baryon && s.abs() == 1 && q == 0,
            Self::Lambda => baryon && q == 0 && isospin == HalfInt::ZERO && s == -1,
            Self::Sigma => baryon && q == 0 && isospin == HalfInt::from_int(1) && s == -1,
            Self::Xi => baryon && q == -1 && isospin == HalfInt::from_doubled(1) && s.abs() == 2,
            Self::Omega => baryon && q == -1 && isospin == HalfInt::ZERO && s == -3,
        }
    }

    /// Masses of the family members, ascending.
    pub fn masses<'a>(self, particles: impl IntoIterator<Item = &'a Particle>) -> Vec<f64> {
        let mut masses: Vec<f64> = particles
            .into_iter()
            .filter(|particle| self.contains(particle))
            .map(|particle| particle.mass)
            .collect();
        masses.sort_by(f64::total_cmp);
        masses
    }
}

/// Tab-separated `Family Source Count Masses` rows; with `reference`, each
/// family gets a second row for the reference list.
pub fn render_spectrum(catalog: &Catalog, reference: Option<&[Particle]>) -> String {
    let mut out = String::from("# Family\tSource\tCount\tMasses[GeV]\n");
    for family in Family::ALL {
        push_row(&mut out, family, "current", &family.masses(catalog.particles()));
        if let Some(reference) = reference {
            push_row(&mut out, family, "reference", &family.masses(reference));
        }
    }
    out
}

fn push_row(out: &mut String, family: Family, source: &str, masses: &[f64]) {
    let joined = masses
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!(
        "{}\t{}\t{}\t{}\n",
        family.label(),
        source,
        masses.len(),
        joined
    ));
}
