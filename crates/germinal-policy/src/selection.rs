//! Compartment selection — routing survivors out of the active cycle.
//!
//! Memory, plasma and re-entry selection all have the same shape: an
//! optional deterministic gate on the cell, then an independent Bernoulli
//! trial. The gate is a pluggable predicate; the trial is only drawn for
//! cells the gate admits.

use germinal_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default memory selection probability.
pub const DEFAULT_MEMORY_PROBABILITY: f64 = 0.05;
/// Default plasma affinity threshold.
pub const DEFAULT_PLASMA_THRESHOLD: f64 = 0.0;
/// Default plasma selection probability.
pub const DEFAULT_PLASMA_PROBABILITY: f64 = 0.05;
/// Default re-entry selection probability.
pub const DEFAULT_REENTRY_PROBABILITY: f64 = 0.0;

/// Deterministic admission test applied before the Bernoulli trial.
pub trait SelectionGate {
    fn admits<C: BCell>(&self, cell: &C) -> bool;
}

/// Admits every cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unconditional;

impl SelectionGate for Unconditional {
    fn admits<C: BCell>(&self, _cell: &C) -> bool {
        true
    }
}

/// Admits cells whose best affinity is at or above a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffinityFloor(pub f64);

impl SelectionGate for AffinityFloor {
    fn admits<C: BCell>(&self, cell: &C) -> bool {
        cell.max_affinity() >= self.0
    }
}

/// Gate AND Bernoulli(probability), evaluated independently per cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy<G> {
    compartment: Compartment,
    gate: G,
    probability: Probability,
}

/// Memory selection: unconditional Bernoulli.
pub type MemorySelection = SelectionPolicy<Unconditional>;
/// Plasma selection: affinity floor, then Bernoulli.
pub type PlasmaSelection = SelectionPolicy<AffinityFloor>;
/// Re-entry selection: unconditional Bernoulli over exported cells.
pub type ReentrySelection = SelectionPolicy<Unconditional>;

impl SelectionPolicy<Unconditional> {
    pub fn memory(probability: f64) -> Result<Self> {
        Ok(Self {
            compartment: Compartment::Memory,
            gate: Unconditional,
            probability: Probability::new("selection.memory_probability", probability)?,
        })
    }

    pub fn reentry(probability: f64) -> Result<Self> {
        Ok(Self {
            compartment: Compartment::Reentry,
            gate: Unconditional,
            probability: Probability::new("selection.reentry_probability", probability)?,
        })
    }
}

impl SelectionPolicy<AffinityFloor> {
    pub fn plasma(affinity_threshold: f64, probability: f64) -> Result<Self> {
        if affinity_threshold.is_nan() {
            return Err(GcError::invalid_config(
                "selection.plasma_affinity_threshold",
                "NaN",
                "threshold must be a number",
            ));
        }
        Ok(Self {
            compartment: Compartment::Plasma,
            gate: AffinityFloor(affinity_threshold),
            probability: Probability::new("selection.plasma_probability", probability)?,
        })
    }

    pub fn affinity_threshold(&self) -> f64 {
        self.gate.0
    }
}

impl<G: SelectionGate> SelectionPolicy<G> {
    pub fn compartment(&self) -> Compartment {
        self.compartment
    }

    pub fn probability(&self) -> Probability {
        self.probability
    }

    /// Whether `cell` is selected into this policy's compartment.
    pub fn select<C: BCell>(&self, cell: &C, rng: &mut dyn RandomSource) -> bool {
        self.gate.admits(cell) && rng.accept(self.probability)
    }

    /// Split `cells` into `(selected, remaining)`, preserving input order.
    pub fn split<C: BCell>(&self, cells: Vec<C>, rng: &mut dyn RandomSource) -> (Vec<C>, Vec<C>) {
        let mut selected = Vec::new();
        let mut remaining = Vec::with_capacity(cells.len());
        for cell in cells {
            if self.select(&cell, rng) {
                selected.push(cell);
            } else {
                remaining.push(cell);
            }
        }
        debug!(
            compartment = %self.compartment,
            selected = selected.len(),
            remaining = remaining.len(),
            "compartment selection"
        );
        (selected, remaining)
    }
}

impl Default for MemorySelection {
    fn default() -> Self {
        Self {
            compartment: Compartment::Memory,
            gate: Unconditional,
            probability: Probability::saturating(DEFAULT_MEMORY_PROBABILITY),
        }
    }
}

impl Default for PlasmaSelection {
    fn default() -> Self {
        Self {
            compartment: Compartment::Plasma,
            gate: AffinityFloor(DEFAULT_PLASMA_THRESHOLD),
            probability: Probability::saturating(DEFAULT_PLASMA_PROBABILITY),
        }
    }
}
