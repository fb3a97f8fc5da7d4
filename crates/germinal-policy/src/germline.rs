//! Germline activation — seeding the initial repertoire.
//!
//! Naive B cells only enter a germinal center if their germline receptor
//! binds the antigen at all. Activation models this by rejection sampling:
//! draw fresh germline candidates and keep the ones that bind some epitope
//! at or above the activation threshold. Each activated germline is then
//! replicated to seed the founding population at its intended multiplicity.
//!
//! The sampling loop is bounded by `ATTEMPTS_PER_GERMLINE * germline_count`
//! draws. Running out of attempts means the threshold is infeasible for the
//! candidate distribution; the partial repertoire is discarded.

use germinal_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Candidate draws allowed per requested germline.
pub const ATTEMPTS_PER_GERMLINE: u64 = 10_000;
/// Default activation affinity threshold.
pub const DEFAULT_AFFINITY_THRESHOLD: f64 = 0.0;
/// Default number of activated germlines.
pub const DEFAULT_GERMLINE_COUNT: usize = 50;
/// Default replicas per activated germline.
pub const DEFAULT_REPLICATION_FACTOR: usize = 40;

/// Affinity-gated rejection sampling plus replication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GermlineActivation {
    affinity_threshold: f64,
    germline_count: usize,
    replication_factor: usize,
}

impl Default for GermlineActivation {
    fn default() -> Self {
        Self {
            affinity_threshold: DEFAULT_AFFINITY_THRESHOLD,
            germline_count: DEFAULT_GERMLINE_COUNT,
            replication_factor: DEFAULT_REPLICATION_FACTOR,
        }
    }
}

impl GermlineActivation {
    pub fn new(
        affinity_threshold: f64,
        germline_count: i64,
        replication_factor: i64,
    ) -> Result<Self> {
        if affinity_threshold.is_nan() {
            return Err(GcError::invalid_config(
                "germline.affinity_threshold",
                "NaN",
                "threshold must be a number",
            ));
        }
        Ok(Self {
            affinity_threshold,
            germline_count: positive("germline.count", germline_count)?,
            replication_factor: positive("germline.replication_factor", replication_factor)?,
        })
    }

    pub fn affinity_threshold(&self) -> f64 {
        self.affinity_threshold
    }

    pub fn germline_count(&self) -> usize {
        self.germline_count
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Total candidate draws allowed before activation gives up.
    pub fn attempt_budget(&self) -> u64 {
        ATTEMPTS_PER_GERMLINE.saturating_mul(self.germline_count as u64)
    }

    /// Size of the founding population after replication.
    pub fn founder_count(&self) -> usize {
        self.germline_count.saturating_mul(self.replication_factor)
    }

    /// Draw germline candidates until `germline_count` distinct cells bind
    /// some epitope in `pool` at or above the threshold.
    ///
    /// Cells are deduplicated by identity. Returns the activated cells in
    /// acceptance order, or an error if the attempt budget runs out.
    pub fn activate<C, E, S>(
        &self,
        pool: &AntigenPool<E>,
        source: &S,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<C>>
    where
        C: BCell,
        E: Affinity<C::Receptor>,
        S: GermlineSource<C> + ?Sized,
    {
        if pool.is_empty() {
            return Err(GcError::EmptyAntigenPool);
        }

        let budget = self.attempt_budget();
        let mut seen = HashSet::with_capacity(self.germline_count);
        let mut activated = Vec::with_capacity(self.germline_count);
        let mut attempts = 0u64;

        while activated.len() < self.germline_count {
            if attempts >= budget {
                warn!(
                    target_count = self.germline_count,
                    threshold = self.affinity_threshold,
                    accepted = activated.len(),
                    attempts,
                    "germline activation exhausted its attempt budget"
                );
                return Err(GcError::GermlineExhausted {
                    target: self.germline_count,
                    threshold: self.affinity_threshold,
                    attempts,
                    accepted: activated.len(),
                });
            }
            attempts += 1;

            let candidate = source.germline(rng);
            if pool.binds_any(candidate.receptor(), self.affinity_threshold)
                && seen.insert(candidate.id())
            {
                activated.push(candidate);
            }
        }

        info!(
            germlines = activated.len(),
            attempts,
            threshold = self.affinity_threshold,
            "germline activation complete"
        );
        Ok(activated)
    }

    /// `replication_factor` independent copies of every germline.
    pub fn replicate<C: BCell>(&self, germlines: &[C]) -> Vec<C> {
        let founders: Vec<C> = germlines
            .iter()
            .flat_map(|g| (0..self.replication_factor).map(move |_| g.replicate()))
            .collect();
        debug!(
            germlines = germlines.len(),
            founders = founders.len(),
            "germline replication"
        );
        founders
    }
}

fn positive(field: &str, value: i64) -> Result<usize> {
    if value < 1 {
        return Err(GcError::out_of_range(field, 1.0, usize::MAX as f64, value as f64));
    }
    usize::try_from(value)
        .map_err(|_| GcError::invalid_config(field, value.to_string(), "too large"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubCell, StubEpitope};

    /// Candidates carry a receptor drawn uniformly from 0..10.
    fn stub_source(rng: &mut dyn RandomSource) -> StubCell {
        StubCell::germline(rng.below(10) as u32)
    }

    #[test]
    fn activates_exactly_the_requested_count() {
        let policy = GermlineActivation::new(0.5, 5, 3).unwrap();
        let pool = AntigenPool::new(vec![StubEpitope(7), StubEpitope(2)]);
        let mut rng = SimRng::seeded(42);
        let germlines: Vec<StubCell> = policy.activate(&pool, &stub_source, &mut rng).unwrap();

        assert_eq!(germlines.len(), 5);
        let ids: HashSet<_> = germlines.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), 5);
        assert!(germlines
            .iter()
            .all(|c| c.receptor() == &7 || c.receptor() == &2));
    }

    #[test]
    fn replication_yields_distinct_identities() {
        let policy = GermlineActivation::new(0.5, 5, 3).unwrap();
        let pool = AntigenPool::new(vec![StubEpitope(4)]);
        let mut rng = SimRng::seeded(7);
        let germlines: Vec<StubCell> = policy.activate(&pool, &stub_source, &mut rng).unwrap();
        let founders = policy.replicate(&germlines);

        assert_eq!(founders.len(), 15);
        let ids: HashSet<_> = founders.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), 15);
        let germline_ids: HashSet<_> = germlines.iter().map(|c| c.id()).collect();
        assert!(ids.is_disjoint(&germline_ids));
        assert!(founders.iter().all(|c| c.receptor() == &4));
        assert_eq!(policy.founder_count(), 15);
    }

    #[test]
    fn infeasible_threshold_exhausts_budget() {
        let policy = GermlineActivation::new(2.0, 2, 1).unwrap();
        let pool = AntigenPool::new(vec![StubEpitope(1)]);
        let mut rng = SimRng::seeded(1);
        let err = policy
            .activate::<StubCell, _, _>(&pool, &stub_source, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            GcError::GermlineExhausted {
                target: 2,
                threshold: 2.0,
                attempts: 20_000,
                accepted: 0,
            }
        );
    }

    #[test]
    fn empty_pool_fails_fast() {
        let policy = GermlineActivation::default();
        let pool: AntigenPool<StubEpitope> = AntigenPool::new(vec![]);
        let mut rng = SimRng::seeded(1);
        let err = policy
            .activate::<StubCell, _, _>(&pool, &stub_source, &mut rng)
            .unwrap_err();
        assert_eq!(err, GcError::EmptyAntigenPool);
    }

    #[test]
    fn budget_scales_with_count() {
        let policy = GermlineActivation::new(0.0, 50, 40).unwrap();
        assert_eq!(policy.attempt_budget(), 500_000);
    }

    #[test]
    fn counts_must_be_positive() {
        assert!(GermlineActivation::new(0.0, 0, 40).is_err());
        assert!(GermlineActivation::new(0.0, 50, 0).is_err());
        assert!(GermlineActivation::new(0.0, -3, 40).is_err());
        assert!(GermlineActivation::new(f64::NAN, 5, 5).is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let policy = GermlineActivation::default();
        assert_eq!(policy.affinity_threshold(), 0.0);
        assert_eq!(policy.germline_count(), 50);
        assert_eq!(policy.replication_factor(), 40);
    }
}
