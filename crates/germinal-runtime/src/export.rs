//! Run summaries — aggregate cycle reports for printing or JSON export.

use crate::cycle::{CenterStats, CycleReport};
use germinal_core::error::{GcError, Result};
use serde::Serialize;

/// Totals over a sequence of cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub cycles: usize,
    pub total_apoptotic: usize,
    pub total_plasma: usize,
    pub total_memory: usize,
    pub total_reentered: usize,
    /// Mean affinity entering the first cycle.
    pub initial_mean_affinity: f64,
    /// Mean affinity entering the last cycle.
    pub final_mean_affinity: f64,
    /// Best affinity seen in any cycle.
    pub peak_affinity: f64,
    pub final_population: usize,
    pub memory_cells: usize,
    pub plasma_cells: usize,
}

impl RunSummary {
    /// Change in mean affinity from the first to the last cycle.
    pub fn affinity_gain(&self) -> f64 {
        self.final_mean_affinity - self.initial_mean_affinity
    }
}

/// Summarize `reports` together with the center's final state.
pub fn summarize(reports: &[CycleReport], stats: &CenterStats) -> RunSummary {
    let first = reports.first();
    let last = reports.last();
    RunSummary {
        cycles: reports.len(),
        total_apoptotic: reports.iter().map(|r| r.apoptotic).sum(),
        total_plasma: reports.iter().map(|r| r.plasma_exported).sum(),
        total_memory: reports.iter().map(|r| r.memory_exported).sum(),
        total_reentered: reports.iter().map(|r| r.reentered).sum(),
        initial_mean_affinity: first.map_or(0.0, |r| r.mean_affinity),
        final_mean_affinity: last.map_or(0.0, |r| r.mean_affinity),
        peak_affinity: reports
            .iter()
            .map(|r| r.max_affinity)
            .fold(0.0f64, f64::max),
        final_population: stats.population,
        memory_cells: stats.memory_cells,
        plasma_cells: stats.plasma_cells,
    }
}

/// Reports and summary as one pretty-printed JSON document.
pub fn to_json(reports: &[CycleReport], summary: &RunSummary) -> Result<String> {
    #[derive(Serialize)]
    struct Document<'a> {
        cycles: &'a [CycleReport],
        summary: &'a RunSummary,
    }

    serde_json::to_string_pretty(&Document {
        cycles: reports,
        summary,
    })
    .map_err(|e| GcError::Parse(e.to_string()))
}
