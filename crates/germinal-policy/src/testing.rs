//! Minimal cell and epitope for unit tests.

use germinal_core::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct StubCell {
    id: CellId,
    quantity: f64,
    affinity: f64,
    receptor: u32,
    divisions: Option<u32>,
}

impl StubCell {
    pub fn new(quantity: f64, affinity: f64) -> Self {
        Self {
            id: CellId::new(),
            quantity,
            affinity,
            receptor: 0,
            divisions: None,
        }
    }

    pub fn with_quantity(quantity: f64) -> Self {
        Self::new(quantity, 0.0)
    }

    pub fn with_affinity(affinity: f64) -> Self {
        Self::new(0.0, affinity)
    }

    pub fn germline(receptor: u32) -> Self {
        Self {
            receptor,
            ..Self::new(0.0, 0.0)
        }
    }
}

impl BCell for StubCell {
    type Receptor = u32;

    fn id(&self) -> CellId {
        self.id
    }

    fn antigen_quantity(&self) -> f64 {
        self.quantity
    }

    fn max_affinity(&self) -> f64 {
        self.affinity
    }

    fn receptor(&self) -> &u32 {
        &self.receptor
    }

    fn division_count(&self) -> Option<u32> {
        self.divisions
    }

    fn set_division_count(&mut self, count: u32) {
        self.divisions = Some(count);
    }

    fn replicate(&self) -> Self {
        Self {
            id: CellId::new(),
            divisions: None,
            ..self.clone()
        }
    }
}

/// Binds with affinity 1.0 to the one receptor value it names, 0.0 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct StubEpitope(pub u32);

impl Affinity<u32> for StubEpitope {
    fn affinity(&self, receptor: &u32) -> f64 {
        if *receptor == self.0 {
            1.0
        } else {
            0.0
        }
    }
}
