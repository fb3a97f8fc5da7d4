//! Shared types used across all decision models.

use crate::error::{GcError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identity of a B cell.
///
/// Replicas share receptor content with their parent but never its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub Uuid);

impl CellId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic identity from a counter, for reproducible runs and tests.
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(0, seed))
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A probability in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    pub const ZERO: Probability = Probability(0.0);
    pub const ONE: Probability = Probability(1.0);

    /// Validate `value` against [0, 1]; `field` names the offending setting.
    pub fn new(field: &str, value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(GcError::out_of_range(field, 0.0, 1.0, value));
        }
        Ok(Self(value))
    }

    /// Clamp an already-computed value into [0, 1]. NaN maps to zero.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `1 - p`.
    pub fn complement(self) -> Self {
        Self(1.0 - self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = GcError;

    fn try_from(value: f64) -> Result<Self> {
        Probability::new("probability", value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> f64 {
        p.0
    }
}

/// Where a cell leaves the active cycle to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compartment {
    /// Long-lived memory pool.
    Memory,
    /// Antibody-secreting plasma pool.
    Plasma,
    /// Readmission from an exported pool back into the cycle.
    Reentry,
}

impl std::fmt::Display for Compartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compartment::Memory => write!(f, "memory"),
            Compartment::Plasma => write!(f, "plasma"),
            Compartment::Reentry => write!(f, "re-entry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_rejects_out_of_range() {
        assert!(Probability::new("p", -0.01).is_err());
        assert!(Probability::new("p", 1.01).is_err());
        assert!(Probability::new("p", f64::NAN).is_err());
        assert_eq!(Probability::new("p", 0.25).unwrap().value(), 0.25);
    }

    #[test]
    fn probability_bounds_are_legal() {
        assert_eq!(Probability::new("p", 0.0).unwrap(), Probability::ZERO);
        assert_eq!(Probability::new("p", 1.0).unwrap(), Probability::ONE);
    }

    #[test]
    fn saturating_clamps() {
        assert_eq!(Probability::saturating(2.0), Probability::ONE);
        assert_eq!(Probability::saturating(-3.0), Probability::ZERO);
        assert_eq!(Probability::saturating(f64::NAN), Probability::ZERO);
    }

    #[test]
    fn complement_flips_bounds() {
        assert_eq!(Probability::ZERO.complement(), Probability::ONE);
        assert_eq!(Probability::saturating(0.25).complement().value(), 0.75);
    }

    #[test]
    fn seeded_ids_are_stable() {
        assert_eq!(CellId::from_seed(7), CellId::from_seed(7));
        assert_ne!(CellId::from_seed(7), CellId::from_seed(8));
        assert_ne!(CellId::new(), CellId::new());
    }
}
