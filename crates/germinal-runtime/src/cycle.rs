//! Germinal center — one run of the affinity-maturation cycle.
//!
//! The decision models supply every transition's condition; this module
//! applies them in order. Each cycle:
//! 1. Antigen capture (external hook) updates each cell's quantity and affinity
//! 2. BCR signaling removes cells without a survival signal
//! 3. Plasma selection exports survivors above the plasma affinity floor
//! 4. Memory selection exports a random share of the rest
//! 5. Re-entry selection readmits cells from the memory compartment
//! 6. Division counts are assigned to every cell still in the cycle
//! 7. Dark-zone expansion (external hook) produces the next population
//!
//! A `GerminalCenter` owns its generator. Several centers can share one
//! `Arc<PolicySet>` and run on separate threads without affecting each
//! other's results.

use crate::policy_set::PolicySet;
use germinal_core::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// The machinery outside the decision layer: antigen capture in the light
/// zone and proliferation in the dark zone.
pub trait CycleHooks<C> {
    /// Set captured antigen and best affinity on every cell.
    fn capture_antigen(&mut self, cells: &mut [C], rng: &mut dyn RandomSource);

    /// Expand cells according to their assigned division counts.
    fn proliferate(&mut self, cells: Vec<C>, rng: &mut dyn RandomSource) -> Vec<C>;
}

/// What happened in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    /// Cells that entered the light zone.
    pub entered: usize,
    pub apoptotic: usize,
    pub plasma_exported: usize,
    pub memory_exported: usize,
    pub reentered: usize,
    /// Cells that received a division count.
    pub dividing: usize,
    pub total_divisions: u64,
    /// Mean best affinity over the cells that entered.
    pub mean_affinity: f64,
    /// Highest best affinity over the cells that entered.
    pub max_affinity: f64,
    /// Active population after dark-zone expansion.
    pub population: usize,
}

/// Summary of a germinal center's current state.
#[derive(Debug, Clone, Serialize)]
pub struct CenterStats {
    pub cycle: u64,
    pub population: usize,
    pub memory_cells: usize,
    pub plasma_cells: usize,
}

/// One simulation run.
pub struct GerminalCenter<C> {
    policies: Arc<PolicySet>,
    rng: SimRng,
    population: Vec<C>,
    memory: Vec<C>,
    plasma: Vec<C>,
    cycle: u64,
}

impl<C: BCell> GerminalCenter<C> {
    pub fn new(policies: Arc<PolicySet>, rng: SimRng) -> Self {
        Self {
            policies,
            rng,
            population: Vec::new(),
            memory: Vec::new(),
            plasma: Vec::new(),
            cycle: 0,
        }
    }

    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    pub fn population(&self) -> &[C] {
        &self.population
    }

    pub fn memory_cells(&self) -> &[C] {
        &self.memory
    }

    pub fn plasma_cells(&self) -> &[C] {
        &self.plasma
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn stats(&self) -> CenterStats {
        CenterStats {
            cycle: self.cycle,
            population: self.population.len(),
            memory_cells: self.memory.len(),
            plasma_cells: self.plasma.len(),
        }
    }

    /// Activate and replicate the founding repertoire.
    ///
    /// Replaces the active population. On failure the center is untouched.
    pub fn seed<E, S>(&mut self, pool: &AntigenPool<E>, source: &S) -> Result<usize>
    where
        E: Affinity<C::Receptor>,
        S: GermlineSource<C> + ?Sized,
    {
        let germline = &self.policies.germline;
        let activated = germline.activate(pool, source, &mut self.rng)?;
        self.population = germline.replicate(&activated);
        info!(founders = self.population.len(), "germinal center seeded");
        Ok(self.population.len())
    }

    /// Whether no further cycle can change anything: the active population
    /// is empty and no exported memory cell can re-enter.
    pub fn is_extinct(&self) -> bool {
        self.population.is_empty()
            && (self.memory.is_empty() || self.policies.reentry.probability() == Probability::ZERO)
    }

    /// Run one light-zone / dark-zone cycle.
    ///
    /// Exports are committed only once division succeeds. On a division
    /// error no cell leaves: every survivor returns to the active population
    /// and readmitted cells go back to the memory pool. Apoptotic cells stay
    /// removed and the cycle counter does not advance.
    pub fn run_cycle<H: CycleHooks<C>>(&mut self, hooks: &mut H) -> Result<CycleReport> {
        let policies = Arc::clone(&self.policies);
        let rng: &mut dyn RandomSource = &mut self.rng;

        let mut entering = std::mem::take(&mut self.population);
        hooks.capture_antigen(&mut entering, rng);
        let entered = entering.len();
        let (mean_affinity, max_affinity) = affinity_summary(&entering);

        let (survivors, apoptotic) = policies.signaling.partition(entering, rng);

        let (plasma, survivors) = policies.plasma.split(survivors, rng);
        let (memory, mut remaining) = policies.memory.split(survivors, rng);

        // Re-entry draws from cells exported in earlier cycles only.
        let exported = std::mem::take(&mut self.memory);
        let (readmitted, still_exported) = policies.reentry.split(exported, rng);
        let reentered = readmitted.len();
        let continuing = remaining.len();
        remaining.extend(readmitted);

        if let Err(e) = policies.division.assign_division_counts(&mut remaining, rng) {
            let readmitted = remaining.split_off(continuing);
            self.memory = still_exported;
            self.memory.extend(readmitted);
            self.population = plasma.into_iter().chain(memory).chain(remaining).collect();
            return Err(e);
        }

        let plasma_exported = plasma.len();
        let memory_exported = memory.len();
        self.plasma.extend(plasma);
        self.memory = still_exported;
        self.memory.extend(memory);

        let dividing = remaining.len();
        let total_divisions: u64 = remaining
            .iter()
            .filter_map(C::division_count)
            .map(u64::from)
            .sum();
        debug!(dividing, total_divisions, "division counts assigned");

        self.population = hooks.proliferate(remaining, rng);
        self.cycle += 1;

        let report = CycleReport {
            cycle: self.cycle,
            entered,
            apoptotic: apoptotic.len(),
            plasma_exported,
            memory_exported,
            reentered,
            dividing,
            total_divisions,
            mean_affinity,
            max_affinity,
            population: self.population.len(),
        };
        info!(
            cycle = report.cycle,
            entered = report.entered,
            apoptotic = report.apoptotic,
            plasma = report.plasma_exported,
            memory = report.memory_exported,
            population = report.population,
            mean_affinity = report.mean_affinity,
            "cycle complete"
        );
        Ok(report)
    }

    /// Run up to `cycles` cycles, stopping early once the center is extinct.
    pub fn run<H: CycleHooks<C>>(
        &mut self,
        cycles: usize,
        hooks: &mut H,
    ) -> Result<Vec<CycleReport>> {
        self.run_with(cycles, hooks, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_report` after every cycle.
    pub fn run_with<H, F>(
        &mut self,
        cycles: usize,
        hooks: &mut H,
        mut on_report: F,
    ) -> Result<Vec<CycleReport>>
    where
        H: CycleHooks<C>,
        F: FnMut(&CycleReport),
    {
        let mut reports = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            if self.is_extinct() {
                info!(cycle = self.cycle, "population extinct, stopping");
                break;
            }
            let report = self.run_cycle(hooks)?;
            on_report(&report);
            reports.push(report);
        }
        Ok(reports)
    }
}

fn affinity_summary<C: BCell>(cells: &[C]) -> (f64, f64) {
    if cells.is_empty() {
        return (0.0, 0.0);
    }
    let (sum, max) = cells
        .iter()
        .map(C::max_affinity)
        .fold((0.0, f64::NEG_INFINITY), |(s, m), a| (s + a, m.max(a)));
    (sum / cells.len() as f64, max)
}
