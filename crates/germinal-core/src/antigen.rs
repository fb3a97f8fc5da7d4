//! Antigen pool — the epitopes presented to receptors.

use serde::{Deserialize, Serialize};

/// Binding strength between an epitope and a receptor.
pub trait Affinity<R: ?Sized> {
    fn affinity(&self, receptor: &R) -> f64;
}

/// An immutable set of epitopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntigenPool<E> {
    epitopes: Vec<E>,
}

impl<E> AntigenPool<E> {
    pub fn new(epitopes: Vec<E>) -> Self {
        Self { epitopes }
    }

    pub fn epitopes(&self) -> &[E] {
        &self.epitopes
    }

    pub fn len(&self) -> usize {
        self.epitopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epitopes.is_empty()
    }

    /// Best affinity of `receptor` over every epitope, or `None` for an empty pool.
    pub fn max_affinity<R: ?Sized>(&self, receptor: &R) -> Option<f64>
    where
        E: Affinity<R>,
    {
        self.epitopes
            .iter()
            .map(|e| e.affinity(receptor))
            .fold(None, |best, a| match best {
                Some(b) if b >= a => Some(b),
                _ => Some(a),
            })
    }

    /// Whether any single epitope binds `receptor` at or above `threshold`.
    ///
    /// Stops at the first epitope that binds.
    pub fn binds_any<R: ?Sized>(&self, receptor: &R, threshold: f64) -> bool
    where
        E: Affinity<R>,
    {
        self.epitopes.iter().any(|e| e.affinity(receptor) >= threshold)
    }
}

impl<E> FromIterator<E> for AntigenPool<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
