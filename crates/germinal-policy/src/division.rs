//! Dark-zone division — how many times each positively selected cell divides.
//!
//! Two models:
//!
//! - **Fixed count**: every cell divides the same configured number of times.
//! - **Mean capture ratio**: a cell's expected division count depends on how
//!   much antigen it captured relative to the population mean. Cells at the
//!   mean divide twice on average; the curve is compressed below the mean
//!   and stretched above it:
//!
//!   ```text
//!   R <= 1:  2 + tanh(3 (R - 1))
//!   R >  1:  2 + 3 tanh(R - 1)
//!   ```
//!
//!   The continuous expectation is turned into an integer by stochastic
//!   rounding, so the population keeps the expected total.
//!
//! The mean is a barrier: it is computed over the whole input population
//! before any cell is assigned.

use germinal_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Legal range for the configured maximum division count.
pub const MAX_DIVISION_COUNT_RANGE: (i64, i64) = (3, 6);

/// Division count expected for a cell at the population mean.
pub const BASELINE_DIVISIONS: f64 = 2.0;

/// Continuous expected division count for a capture ratio.
///
/// Fails on negative ratios; those can only come from a defect upstream.
pub fn expected_division_count(ratio: f64) -> Result<f64> {
    if ratio < 0.0 || ratio.is_nan() {
        return Err(GcError::NegativeCaptureRatio(ratio));
    }
    let shifted = ratio - 1.0;
    let expected = if ratio <= 1.0 {
        BASELINE_DIVISIONS + (3.0 * shifted).tanh()
    } else {
        BASELINE_DIVISIONS + 3.0 * shifted.tanh()
    };
    Ok(expected)
}

/// Arithmetic mean of captured antigen over `cells`. Zero for an empty slice.
pub fn mean_antigen_quantity<C: BCell>(cells: &[C]) -> f64 {
    if cells.is_empty() {
        return 0.0;
    }
    cells.iter().map(C::antigen_quantity).sum::<f64>() / cells.len() as f64
}

/// Every cell divides the same number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedCountDivision {
    count: u32,
}

impl FixedCountDivision {
    pub fn new(count: i64) -> Result<Self> {
        let count = u32::try_from(count).map_err(|_| {
            GcError::out_of_range("division.fixed_count", 0.0, u32::MAX as f64, count as f64)
        })?;
        Ok(Self { count })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn assign<C: BCell>(&self, cells: &mut [C]) {
        for cell in cells.iter_mut() {
            cell.set_division_count(self.count);
        }
    }
}

/// Division count driven by antigen capture relative to the population mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeanCaptureRatioDivision {
    max_division_count: u32,
}

impl MeanCaptureRatioDivision {
    /// `max_division_count` must lie in [3, 6].
    ///
    /// The response curve uses fixed coefficients; the configured maximum
    /// is validated and reported but does not scale the curve.
    pub fn new(max_division_count: i64) -> Result<Self> {
        let (min, max) = MAX_DIVISION_COUNT_RANGE;
        if !(min..=max).contains(&max_division_count) {
            return Err(GcError::out_of_range(
                "division.max_count",
                min as f64,
                max as f64,
                max_division_count as f64,
            ));
        }
        Ok(Self {
            max_division_count: max_division_count as u32,
        })
    }

    pub fn max_division_count(&self) -> u32 {
        self.max_division_count
    }

    pub fn assign<C: BCell>(&self, cells: &mut [C], rng: &mut dyn RandomSource) -> Result<()> {
        // Captures are non-negative; a negative one would hide behind the
        // zero-mean shortcut or flip sign against a negative mean.
        if let Some(bad) = cells
            .iter()
            .map(C::antigen_quantity)
            .find(|q| *q < 0.0 || q.is_nan())
        {
            return Err(GcError::NegativeCaptureRatio(bad));
        }

        let mean = mean_antigen_quantity(cells);
        debug!(cells = cells.len(), mean, "mean antigen capture");

        // The expectations are computed before any cell is touched, so a
        // bad ratio leaves the population unassigned.
        let expectations = cells
            .iter()
            .map(|cell| expected_division_count(capture_ratio(cell.antigen_quantity(), mean)))
            .collect::<Result<Vec<f64>>>()?;

        for (cell, expected) in cells.iter_mut().zip(expectations) {
            let count = rng.discretize(expected).max(0) as u32;
            cell.set_division_count(count);
        }
        Ok(())
    }
}

/// Capture ratio against the population mean.
///
/// With zero mean capture every cell sits at the mean, ratio 1.
fn capture_ratio(quantity: f64, mean: f64) -> f64 {
    if mean == 0.0 {
        1.0
    } else {
        quantity / mean
    }
}

/// Configured division model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DivisionModel {
    FixedCount,
    MeanCaptureRatio,
}

impl DivisionModel {
    pub const NAMES: [&'static str; 2] = ["fixed-count", "mean-capture-ratio"];

    pub fn name(self) -> &'static str {
        match self {
            DivisionModel::FixedCount => Self::NAMES[0],
            DivisionModel::MeanCaptureRatio => Self::NAMES[1],
        }
    }
}

impl FromStr for DivisionModel {
    type Err = GcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fixed-count" => Ok(DivisionModel::FixedCount),
            "mean-capture-ratio" => Ok(DivisionModel::MeanCaptureRatio),
            _ => Err(GcError::unknown_variant("division.model", s, &Self::NAMES)),
        }
    }
}

/// The division policy of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivisionPolicy {
    FixedCount(FixedCountDivision),
    MeanCaptureRatio(MeanCaptureRatioDivision),
}

impl DivisionPolicy {
    pub fn fixed_count(count: i64) -> Result<Self> {
        FixedCountDivision::new(count).map(Self::FixedCount)
    }

    pub fn mean_capture_ratio(max_division_count: i64) -> Result<Self> {
        MeanCaptureRatioDivision::new(max_division_count).map(Self::MeanCaptureRatio)
    }

    pub fn model(&self) -> DivisionModel {
        match self {
            DivisionPolicy::FixedCount(_) => DivisionModel::FixedCount,
            DivisionPolicy::MeanCaptureRatio(_) => DivisionModel::MeanCaptureRatio,
        }
    }

    /// Assign a division count to every cell in `cells`.
    ///
    /// Counts already present are overwritten.
    pub fn assign_division_counts<C: BCell>(
        &self,
        cells: &mut [C],
        rng: &mut dyn RandomSource,
    ) -> Result<()> {
        match self {
            DivisionPolicy::FixedCount(fixed) => {
                fixed.assign(cells);
                Ok(())
            }
            DivisionPolicy::MeanCaptureRatio(ratio) => ratio.assign(cells, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubCell;

    #[test]
    fn expected_count_is_two_at_mean() {
        assert_eq!(expected_division_count(1.0).unwrap(), 2.0);
    }

    #[test]
    fn expected_count_is_continuous_at_mean() {
        let below = expected_division_count(1.0 - 1e-9).unwrap();
        let above = expected_division_count(1.0 + 1e-9).unwrap();
        assert!((below - 2.0).abs() < 1e-6);
        assert!((above - 2.0).abs() < 1e-6);
    }

    #[test]
    fn expected_count_strictly_increasing() {
        let mut previous = expected_division_count(0.0).unwrap();
        for i in 1..=400 {
            let r = i as f64 * 0.01;
            let current = expected_division_count(r).unwrap();
            assert!(current > previous, "not increasing at r={r}");
            previous = current;
        }
    }

    #[test]
    fn expected_count_bounded() {
        for r in [0.0, 0.001, 0.5, 1.0, 2.0, 10.0, 1e6] {
            let e = expected_division_count(r).unwrap();
            assert!(e > 1.0 - 1e-9 && e < 5.0 + 1e-9, "r={r} e={e}");
        }
        // tanh(-3) floor
        let floor = expected_division_count(0.0).unwrap();
        assert!((floor - (2.0 + (-3.0_f64).tanh())).abs() < 1e-12);
    }

    #[test]
    fn negative_ratio_rejected() {
        assert_eq!(
            expected_division_count(-0.1),
            Err(GcError::NegativeCaptureRatio(-0.1))
        );
        assert!(expected_division_count(f64::NAN).is_err());
    }

    #[test]
    fn fixed_count_ignores_quantity() {
        let policy = DivisionPolicy::fixed_count(3).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells: Vec<_> = [0.0, 1.0, 50.0]
            .iter()
            .map(|&q| StubCell::with_quantity(q))
            .collect();
        policy.assign_division_counts(&mut cells, &mut rng).unwrap();
        assert!(cells.iter().all(|c| c.division_count() == Some(3)));
    }

    #[test]
    fn fixed_count_zero_is_legal() {
        let policy = DivisionPolicy::fixed_count(0).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells = vec![StubCell::with_quantity(1.0)];
        policy.assign_division_counts(&mut cells, &mut rng).unwrap();
        assert_eq!(cells[0].division_count(), Some(0));
    }

    #[test]
    fn range_validation() {
        assert!(DivisionPolicy::fixed_count(-1).is_err());
        assert!(DivisionPolicy::mean_capture_ratio(2).is_err());
        assert!(DivisionPolicy::mean_capture_ratio(7).is_err());
        for max in 3..=6 {
            assert!(DivisionPolicy::mean_capture_ratio(max).is_ok());
        }
    }

    #[test]
    fn uniform_capture_divides_twice() {
        let policy = DivisionPolicy::mean_capture_ratio(6).unwrap();
        let mut rng = SimRng::seeded(8);
        let mut cells: Vec<_> = (0..50).map(|_| StubCell::with_quantity(4.0)).collect();
        policy.assign_division_counts(&mut cells, &mut rng).unwrap();
        assert!(cells.iter().all(|c| c.division_count() == Some(2)));
    }

    #[test]
    fn zero_capture_population_divides_twice() {
        let policy = DivisionPolicy::mean_capture_ratio(4).unwrap();
        let mut rng = SimRng::seeded(8);
        let mut cells: Vec<_> = (0..10).map(|_| StubCell::with_quantity(0.0)).collect();
        policy.assign_division_counts(&mut cells, &mut rng).unwrap();
        assert!(cells.iter().all(|c| c.division_count() == Some(2)));
    }

    #[test]
    fn high_capture_divides_more_on_average() {
        let policy = DivisionPolicy::mean_capture_ratio(6).unwrap();
        let mut rng = SimRng::seeded(12);
        let mut totals = [0u64; 2];
        for _ in 0..2000 {
            let mut cells = vec![StubCell::with_quantity(0.5), StubCell::with_quantity(1.5)];
            policy.assign_division_counts(&mut cells, &mut rng).unwrap();
            totals[0] += cells[0].division_count().unwrap() as u64;
            totals[1] += cells[1].division_count().unwrap() as u64;
        }
        // Mean is 1.0, so the ratios are 0.5 and 1.5.
        let low = totals[0] as f64 / 2000.0;
        let high = totals[1] as f64 / 2000.0;
        let expected_low = expected_division_count(0.5).unwrap();
        let expected_high = expected_division_count(1.5).unwrap();
        assert!((low - expected_low).abs() < 0.05, "low={low}");
        assert!((high - expected_high).abs() < 0.05, "high={high}");
    }

    #[test]
    fn negative_quantity_fails_before_assignment() {
        let policy = DivisionPolicy::mean_capture_ratio(5).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells = vec![StubCell::with_quantity(2.0), StubCell::with_quantity(-1.0)];
        let err = policy.assign_division_counts(&mut cells, &mut rng).unwrap_err();
        assert!(matches!(err, GcError::NegativeCaptureRatio(_)));
        assert!(cells.iter().all(|c| c.division_count().is_none()));
    }

    #[test]
    fn negative_quantity_rejected_at_zero_mean() {
        let policy = DivisionPolicy::mean_capture_ratio(5).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells = vec![StubCell::with_quantity(1.0), StubCell::with_quantity(-1.0)];
        let err = policy.assign_division_counts(&mut cells, &mut rng).unwrap_err();
        assert_eq!(err, GcError::NegativeCaptureRatio(-1.0));
        assert!(cells.iter().all(|c| c.division_count().is_none()));
    }

    #[test]
    fn negative_quantity_rejected_at_negative_mean() {
        let policy = DivisionPolicy::mean_capture_ratio(5).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells = vec![StubCell::with_quantity(-2.0), StubCell::with_quantity(-1.0)];
        let err = policy.assign_division_counts(&mut cells, &mut rng).unwrap_err();
        assert_eq!(err, GcError::NegativeCaptureRatio(-2.0));
        assert!(cells.iter().all(|c| c.division_count().is_none()));
    }

    #[test]
    fn nan_quantity_rejected() {
        let policy = DivisionPolicy::mean_capture_ratio(4).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells = vec![StubCell::with_quantity(f64::NAN)];
        assert!(policy.assign_division_counts(&mut cells, &mut rng).is_err());
    }

    #[test]
    fn assignment_overwrites_previous_count() {
        let policy = DivisionPolicy::fixed_count(1).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells = vec![StubCell::with_quantity(1.0)];
        cells[0].set_division_count(4);
        policy.assign_division_counts(&mut cells, &mut rng).unwrap();
        assert_eq!(cells[0].division_count(), Some(1));
    }

    #[test]
    fn empty_population_is_a_no_op() {
        let policy = DivisionPolicy::mean_capture_ratio(3).unwrap();
        let mut rng = SimRng::seeded(1);
        let mut cells: Vec<StubCell> = Vec::new();
        policy.assign_division_counts(&mut cells, &mut rng).unwrap();
    }

    #[test]
    fn model_names_parse() {
        assert_eq!("fixed-count".parse::<DivisionModel>().unwrap(), DivisionModel::FixedCount);
        assert_eq!(
            "mean_capture_ratio".parse::<DivisionModel>().unwrap(),
            DivisionModel::MeanCaptureRatio
        );
        assert!("poisson".parse::<DivisionModel>().is_err());
    }
}
