//! Particle record and quantum-number helpers.
//!
//! # Responsibility
//! - Define the canonical hadron record read from the master table.
//! - Provide conjugation and the hypercharge (Gell-Mann–Nishijima) relation.
//!
//! # Invariants
//! - `pid` is unique across particles and antiparticles.
//! - The antiparticle negates every additive quantum number, `isospin_z`
//!   and `charge`, and carries `pid = -pid`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg};

/// PDG-style particle identifier. The sign separates particle and antiparticle.
pub type Pid = i32;

/// Exact half-integer value, stored doubled (`1/2` is stored as `1`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HalfInt(i32);

impl HalfInt {
    pub const ZERO: Self = Self(0);

    /// Builds a value from its doubled representation.
    pub const fn from_doubled(doubled: i32) -> Self {
        Self(doubled)
    }

    /// Builds an integer value.
    pub const fn from_int(value: i32) -> Self {
        Self(value * 2)
    }

    /// Converts a decimal reading (`0.5`, `-1.5`, `1.0`) into a half-integer.
    ///
    /// Returns `None` when the value is not a multiple of one half.
    pub fn from_f64(value: f64) -> Option<Self> {
        let doubled = value * 2.0;
        if !doubled.is_finite() || doubled.abs() > f64::from(i32::MAX) {
            return None;
        }
        let rounded = doubled.round();
        if (doubled - rounded).abs() > 1e-9 {
            return None;
        }
        Some(Self(rounded as i32))
    }

    pub const fn doubled(self) -> i32 {
        self.0
    }

    pub const fn is_integer(self) -> bool {
        self.0 % 2 == 0
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Neg for HalfInt {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Display for HalfInt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_integer() {
            return write!(f, "{}", self.0 / 2);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{}.5", self.0.abs() / 2)
    }
}

/// Intrinsic parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Positive,
    Negative,
}

impl Parity {
    /// Parses `+`, `-`, `+1`, `-1` and `1`.
    pub fn from_symbol(value: &str) -> Option<Self> {
        match value.trim() {
            "+" | "+1" | "1" => Some(Self::Positive),
            "-" | "-1" => Some(Self::Negative),
            _ => None,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Positive => "+",
            Self::Negative => "-",
        }
    }

    pub const fn sign(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    pub const fn from_sign(sign: i32) -> Self {
        if sign < 0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }
}

/// Additive conserved charges of a particle or of a set of particles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Charges {
    pub baryon: i32,
    pub strangeness: i32,
    pub charm: i32,
    pub bottom: i32,
    pub charge: i32,
}

impl Charges {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    pub fn conjugate(&self) -> Self {
        Self {
            baryon: -self.baryon,
            strangeness: -self.strangeness,
            charm: -self.charm,
            bottom: -self.bottom,
            charge: -self.charge,
        }
    }

    /// Field-by-field comparison, yielding `(quantity, expected, actual)`
    /// for every quantity that differs.
    pub fn mismatches(&self, other: &Self) -> Vec<(&'static str, i32, i32)> {
        [
            ("baryon number", self.baryon, other.baryon),
            ("strangeness", self.strangeness, other.strangeness),
            ("charm", self.charm, other.charm),
            ("bottom", self.bottom, other.bottom),
            ("electric charge", self.charge, other.charge),
        ]
        .into_iter()
        .filter(|(_, expected, actual)| expected != actual)
        .collect()
    }
}

impl Add for Charges {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            baryon: self.baryon + rhs.baryon,
            strangeness: self.strangeness + rhs.strangeness,
            charm: self.charm + rhs.charm,
            bottom: self.bottom + rhs.bottom,
            charge: self.charge + rhs.charge,
        }
    }
}

impl AddAssign for Charges {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Charges {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// One hadron species as listed in the master table.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pid: Pid,
    pub name: String,
    /// Pole mass in GeV.
    pub mass: f64,
    /// Total width in GeV; `0` for stable species.
    pub width: f64,
    /// `2J + 1`.
    pub spin_degeneracy: u32,
    pub baryon_number: i32,
    pub strangeness: i32,
    pub charm: i32,
    pub bottom: i32,
    pub isospin: HalfInt,
    pub isospin_z: HalfInt,
    pub charge: i32,
    /// True iff no decay channel is listed for this species.
    pub stable: bool,
    /// Declared spin `J`, when the master table carries it.
    pub spin: Option<HalfInt>,
    /// Intrinsic parity, when the master table carries it.
    pub parity: Option<Parity>,
}

impl Particle {
    pub fn charges(&self) -> Charges {
        Charges {
            baryon: self.baryon_number,
            strangeness: self.strangeness,
            charm: self.charm,
            bottom: self.bottom,
            charge: self.charge,
        }
    }

    /// `2 * (I3 + (B + S + C + Bt) / 2)`, the doubled charge implied by the
    /// hypercharge relation.
    pub fn hypercharge_charge_doubled(&self) -> i32 {
        self.isospin_z.doubled() + self.baryon_number + self.strangeness + self.charm + self.bottom
    }

    pub fn satisfies_hypercharge_relation(&self) -> bool {
        self.hypercharge_charge_doubled() == 2 * self.charge
    }

    /// Self-conjugate species (π⁰, η, ρ⁰, ...) have no separate antiparticle.
    pub fn is_self_conjugate(&self) -> bool {
        self.charges().is_zero() && self.isospin_z == HalfInt::ZERO
    }

    /// Doubled spin `2J`, from the declared spin or from the degeneracy.
    pub fn spin_doubled(&self) -> i32 {
        match self.spin {
            Some(spin) => spin.doubled(),
            None => self.spin_degeneracy as i32 - 1,
        }
    }

    pub fn is_fermion(&self) -> bool {
        self.spin_doubled() % 2 != 0
    }

    /// Builds the charge-conjugate record.
    ///
    /// Parity of a fermion flips under conjugation; boson parity is kept.
    pub fn antiparticle(&self) -> Self {
        let parity = match self.parity {
            Some(parity) if self.is_fermion() => Some(Parity::from_sign(-parity.sign())),
            other => other,
        };
        Self {
            pid: -self.pid,
            name: conjugate_name(&self.name, self.baryon_number != 0),
            mass: self.mass,
            width: self.width,
            spin_degeneracy: self.spin_degeneracy,
            baryon_number: -self.baryon_number,
            strangeness: -self.strangeness,
            charm: -self.charm,
            bottom: -self.bottom,
            isospin: self.isospin,
            isospin_z: -self.isospin_z,
            charge: -self.charge,
            stable: self.stable,
            spin: self.spin,
            parity,
        }
    }

    /// Whether `other` is an exact conjugate of `self` (mass, width,
    /// degeneracy, isospin and negated additive numbers).
    pub fn is_conjugate_of(&self, other: &Particle) -> bool {
        self.pid == -other.pid
            && self.charges() == other.charges().conjugate()
            && self.isospin_z == -other.isospin_z
            && self.isospin == other.isospin
            && self.mass == other.mass
            && self.width == other.width
            && self.spin_degeneracy == other.spin_degeneracy
    }
}

fn conjugate_name(name: &str, is_baryon: bool) -> String {
    let trimmed = name.trim_end_matches(['+', '-', '⁺', '⁻']);
    let marks: String = name[trimmed.len()..]
        .chars()
        .map(|c| match c {
            '+' => '-',
            '-' => '+',
            '⁺' => '⁻',
            '⁻' => '⁺',
            other => other,
        })
        .collect();
    if marks.is_empty() || is_baryon {
        format!("anti-{trimmed}{marks}")
    } else {
        format!("{trimmed}{marks}")
    }
}
