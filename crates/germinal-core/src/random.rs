//! Random source — the single stream of chance behind every stochastic decision.
//!
//! A simulation run owns exactly one generator. Policies borrow it mutably
//! for the duration of a call and never keep it, so two runs with two
//! generators never interfere, and one seed reproduces one run.

use crate::types::Probability;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws, Bernoulli trials and stochastic rounding.
///
/// Only `uniform` is required; the trial and rounding primitives are derived
/// from it so that alternative generators stay consistent.
pub trait RandomSource {
    /// Uniform draw in [0, 1).
    fn uniform(&mut self) -> f64;

    /// Bernoulli trial: true with probability `p`.
    fn accept(&mut self, p: Probability) -> bool {
        self.uniform() < p.value()
    }

    /// Stochastic rounding of `x` to floor(x) or ceil(x).
    ///
    /// Ceil is chosen with probability equal to the fractional part of `x`,
    /// so the long-run mean of the output equals `x`. Integers round to
    /// themselves without consuming a draw.
    fn discretize(&mut self, x: f64) -> i64 {
        let floor = x.floor();
        let fraction = x - floor;
        if fraction > 0.0 && self.uniform() < fraction {
            floor as i64 + 1
        } else {
            floor as i64
        }
    }

    /// Uniform integer in `0..n`. Returns 0 when `n` is 0.
    fn below(&mut self, n: usize) -> usize {
        ((self.uniform() * n as f64) as usize).min(n.saturating_sub(1))
    }
}

/// The run-owned generator.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: StdRng,
}

impl SimRng {
    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Derive an independent child generator, for handing one to each of
    /// several concurrent runs started from a single master seed.
    pub fn fork(&mut self) -> SimRng {
        SimRng::seeded(self.inner.gen())
    }
}

impl RandomSource for SimRng {
    fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn accept(&mut self, p: Probability) -> bool {
        self.inner.gen_bool(p.value())
    }
}
