//! Reference bit-string B-cell model.
//!
//! Receptors and epitopes are fixed-width bit strings. Binding is shape
//! complementarity: affinity is the fraction of positions where receptor
//! and epitope differ. This is enough to drive the decision layer end to
//! end, from germline activation through repeated cycles, without a
//! structural affinity model.

use crate::config::RunConfig;
use crate::cycle::CycleHooks;
use germinal_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A fixed-width receptor bit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitReceptor {
    bits: u64,
    width: u32,
}

impl BitReceptor {
    /// `width` is clamped to 1..=64; bits above it are dropped.
    pub fn new(bits: u64, width: u32) -> Self {
        let width = width.clamp(1, 64);
        Self {
            bits: bits & mask(width),
            width,
        }
    }

    /// Each bit drawn independently with probability one half.
    pub fn random(width: u32, rng: &mut dyn RandomSource) -> Self {
        let width = width.clamp(1, 64);
        let bits = (0..width).fold(0u64, |acc, i| {
            if rng.accept(Probability::saturating(0.5)) {
                acc | (1 << i)
            } else {
                acc
            }
        });
        Self::new(bits, width)
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Flip each bit independently with probability `rate`. Returns the
    /// number of bits flipped.
    pub fn mutate(&mut self, rate: Probability, rng: &mut dyn RandomSource) -> u32 {
        let mut flipped = 0;
        for i in 0..self.width {
            if rng.accept(rate) {
                self.bits ^= 1 << i;
                flipped += 1;
            }
        }
        flipped
    }
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A fixed-width epitope bit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitEpitope(pub BitReceptor);

impl BitEpitope {
    pub fn random(width: u32, rng: &mut dyn RandomSource) -> Self {
        Self(BitReceptor::random(width, rng))
    }
}

impl Affinity<BitReceptor> for BitEpitope {
    /// Fraction of complementary positions over the shorter width.
    fn affinity(&self, receptor: &BitReceptor) -> f64 {
        let width = self.0.width.min(receptor.width);
        let differing = ((self.0.bits ^ receptor.bits) & mask(width)).count_ones();
        differing as f64 / width as f64
    }
}

/// A random antigen pool of `count` epitopes.
pub fn random_pool(
    count: usize,
    width: u32,
    rng: &mut dyn RandomSource,
) -> AntigenPool<BitEpitope> {
    (0..count).map(|_| BitEpitope::random(width, rng)).collect()
}

/// A B cell carrying a bit-string receptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitCell {
    id: CellId,
    receptor: BitReceptor,
    antigen_quantity: f64,
    max_affinity: f64,
    divisions: Option<u32>,
    /// Number of dark-zone passes since germline.
    pub generation: u32,
}

impl BitCell {
    pub fn new(receptor: BitReceptor) -> Self {
        Self {
            id: CellId::new(),
            receptor,
            antigen_quantity: 0.0,
            max_affinity: 0.0,
            divisions: None,
            generation: 0,
        }
    }

    pub fn set_antigen_quantity(&mut self, quantity: f64) {
        self.antigen_quantity = quantity.max(0.0);
    }

    pub fn set_max_affinity(&mut self, affinity: f64) {
        self.max_affinity = affinity;
    }
}

impl BCell for BitCell {
    type Receptor = BitReceptor;

    fn id(&self) -> CellId {
        self.id
    }

    fn antigen_quantity(&self) -> f64 {
        self.antigen_quantity
    }

    fn max_affinity(&self) -> f64 {
        self.max_affinity
    }

    fn receptor(&self) -> &BitReceptor {
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

/// Draws naive cells with uniformly random receptors of a fixed width.
#[derive(Debug, Clone, Copy)]
pub struct BitGermlines {
    pub width: u32,
}

impl GermlineSource<BitCell> for BitGermlines {
    fn germline(&self, rng: &mut dyn RandomSource) -> BitCell {
        BitCell::new(BitReceptor::random(self.width, rng))
    }
}

/// Antigen capture and proliferation for [`BitCell`] populations.
#[derive(Debug, Clone)]
pub struct BitHooks {
    pool: AntigenPool<BitEpitope>,
    antigen_density: f64,
    mutation_rate: Probability,
    population_cap: usize,
}

impl BitHooks {
    pub fn new(
        pool: AntigenPool<BitEpitope>,
        antigen_density: f64,
        mutation_rate: f64,
        population_cap: usize,
    ) -> Result<Self> {
        Ok(Self {
            pool,
            antigen_density: antigen_density.max(0.0),
            mutation_rate: Probability::new("run.mutation_rate", mutation_rate)?,
            population_cap: population_cap.max(1),
        })
    }

    /// Hooks with a random antigen pool sized by `config`.
    pub fn from_config(config: &RunConfig, rng: &mut dyn RandomSource) -> Result<Self> {
        config.validate()?;
        let pool = random_pool(config.epitopes, config.receptor_bits, rng);
        Self::new(pool, config.antigen_density, config.mutation_rate, config.population_cap)
    }

    pub fn pool(&self) -> &AntigenPool<BitEpitope> {
        &self.pool
    }
}

impl CycleHooks<BitCell> for BitHooks {
    /// Capture scales with the best affinity, with multiplicative noise
    /// uniform in [0.5, 1.5).
    fn capture_antigen(&mut self, cells: &mut [BitCell], rng: &mut dyn RandomSource) {
        for cell in cells.iter_mut() {
            let affinity = self.pool.max_affinity(&cell.receptor).unwrap_or(0.0);
            cell.set_max_affinity(affinity);
            let noise = 0.5 + rng.uniform();
            cell.set_antigen_quantity(self.antigen_density * affinity * noise);
        }
    }

    /// Each cell yields `2^d` mutated daughters. When the total exceeds the
    /// cap, a uniform sample of daughter slots is drawn first and only the
    /// sampled daughters are built.
    fn proliferate(&mut self, cells: Vec<BitCell>, rng: &mut dyn RandomSource) -> Vec<BitCell> {
        let broods: Vec<usize> = cells
            .iter()
            .map(|c| 1usize << c.division_count().unwrap_or(0).min(MAX_DIVISIONS))
            .collect();
        let total: usize = broods.iter().sum();

        let mut daughters = Vec::with_capacity(total.min(self.population_cap));
        if total <= self.population_cap {
            for (cell, &brood) in cells.iter().zip(&broods) {
                for _ in 0..brood {
                    daughters.push(self.daughter(cell, rng));
                }
            }
            return daughters;
        }

        // Walk the sorted slots against the cumulative brood sizes.
        let slots = sample_slots(total, self.population_cap, rng);
        let mut slots = slots.into_iter().peekable();
        let mut end = 0;
        for (cell, &brood) in cells.iter().zip(&broods) {
            end += brood;
            while slots.next_if(|&slot| slot < end).is_some() {
                daughters.push(self.daughter(cell, rng));
            }
        }
        daughters
    }
}

/// Division counts above this are treated as this many.
const MAX_DIVISIONS: u32 = 16;

impl BitHooks {
    fn daughter(&self, parent: &BitCell, rng: &mut dyn RandomSource) -> BitCell {
        let mut daughter = parent.replicate();
        daughter.generation = parent.generation + 1;
        daughter.receptor.mutate(self.mutation_rate, rng);
        daughter
    }
}

/// `k` distinct indices drawn uniformly from `0..n`, in ascending order.
///
/// Floyd's algorithm: `k` draws regardless of `n`.
fn sample_slots(n: usize, k: usize, rng: &mut dyn RandomSource) -> BTreeSet<usize> {
    let mut chosen = BTreeSet::new();
    for j in n - k..n {
        let t = rng.below(j + 1);
        if !chosen.insert(t) {
            chosen.insert(j);
        }
    }
    chosen
}
