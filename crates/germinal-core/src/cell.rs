//! The B-cell interface the decision models consume.
//!
//! The models never look inside a cell. They read one scalar at a time
//! (captured antigen, best affinity), write one field (division count),
//! and ask for copies. How a cell stores its receptor or computes its
//! affinity is the embedding simulation's business.

use crate::random::RandomSource;
use crate::types::CellId;

/// A B cell as seen by the decision layer.
pub trait BCell {
    /// Receptor descriptor presented to epitopes when testing affinity.
    type Receptor;

    /// Identity of this cell. Replicas get fresh identities.
    fn id(&self) -> CellId;

    /// Antigen internalized this cycle. Never negative.
    fn antigen_quantity(&self) -> f64;

    /// Highest affinity of this cell's receptor over the presented epitopes.
    fn max_affinity(&self) -> f64;

    /// The receptor this cell carries.
    fn receptor(&self) -> &Self::Receptor;

    /// Division count assigned before dark-zone expansion, if any.
    fn division_count(&self) -> Option<u32>;

    /// Assign the number of divisions this cell will undergo.
    fn set_division_count(&mut self, count: u32);

    /// A value copy with the same receptor content and a new identity.
    fn replicate(&self) -> Self
    where
        Self: Sized;
}

/// Factory for fresh germline-configuration candidates.
pub trait GermlineSource<C> {
    /// Draw one unmutated candidate cell.
    fn germline(&self, rng: &mut dyn RandomSource) -> C;
}

impl<C, F> GermlineSource<C> for F
where
    F: Fn(&mut dyn RandomSource) -> C,
{
    fn germline(&self, rng: &mut dyn RandomSource) -> C {
        self(rng)
    }
}
