//! BCR signaling — who dies after antigen capture.
//!
//! Apoptosis is the default fate in the light zone. A cell survives only if
//! antigen capture delivered a strong enough survival signal. Two families
//! of models decide this:
//!
//! - **Threshold** models read one scalar from the cell (best affinity or
//!   captured quantity) and kill everything strictly below a cutoff.
//! - **Langmuir** model treats captured quantity as occupancy on a
//!   saturating isotherm: survival probability `Q / (1 + Q)`.
//!
//! None of the models keep state between calls, so cells may be evaluated
//! in any order.

use germinal_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// The scalar a threshold model reads from each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Characteristic {
    /// Best affinity over presented epitopes.
    Affinity,
    /// Antigen internalized this cycle.
    Quantity,
}

impl Characteristic {
    /// Read this characteristic from `cell`.
    pub fn extract<C: BCell>(self, cell: &C) -> f64 {
        match self {
            Characteristic::Affinity => cell.max_affinity(),
            Characteristic::Quantity => cell.antigen_quantity(),
        }
    }
}

/// Deterministic cutoff on one characteristic value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSignaling {
    pub characteristic: Characteristic,
    pub threshold: f64,
}

impl ThresholdSignaling {
    pub fn new(characteristic: Characteristic, threshold: f64) -> Result<Self> {
        if threshold.is_nan() {
            return Err(GcError::invalid_config(
                "signaling.threshold",
                "NaN",
                "threshold must be a number",
            ));
        }
        Ok(Self {
            characteristic,
            threshold,
        })
    }

    /// Dies iff the extracted value is strictly below the threshold.
    pub fn apoptose<C: BCell>(&self, cell: &C) -> bool {
        self.characteristic.extract(cell) < self.threshold
    }
}

/// Langmuir-isotherm survival signal on captured antigen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangmuirSignaling;

impl LangmuirSignaling {
    /// Probability of receiving a survival signal: `Q / (1 + Q)`.
    ///
    /// Negative quantities are treated as zero capture.
    pub fn survival_probability(quantity: f64) -> Probability {
        let q = quantity.max(0.0);
        if q.is_infinite() {
            return Probability::ONE;
        }
        Probability::saturating(q / (1.0 + q))
    }

    /// Probability of apoptosis: `1 / (1 + Q)`.
    pub fn apoptosis_probability(quantity: f64) -> Probability {
        Self::survival_probability(quantity).complement()
    }

    /// One Bernoulli draw at the apoptosis probability.
    pub fn apoptose<C: BCell>(&self, cell: &C, rng: &mut dyn RandomSource) -> bool {
        rng.accept(Self::apoptosis_probability(cell.antigen_quantity()))
    }
}

/// Configured signaling model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalingModel {
    AffinityThreshold,
    QuantityThreshold,
    QuantityLangmuir,
}

impl SignalingModel {
    pub const NAMES: [&'static str; 3] =
        ["affinity-threshold", "quantity-threshold", "quantity-langmuir"];

    pub fn name(self) -> &'static str {
        match self {
            SignalingModel::AffinityThreshold => Self::NAMES[0],
            SignalingModel::QuantityThreshold => Self::NAMES[1],
            SignalingModel::QuantityLangmuir => Self::NAMES[2],
        }
    }
}

impl FromStr for SignalingModel {
    type Err = GcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "affinity-threshold" => Ok(SignalingModel::AffinityThreshold),
            "quantity-threshold" => Ok(SignalingModel::QuantityThreshold),
            "quantity-langmuir" => Ok(SignalingModel::QuantityLangmuir),
            _ => Err(GcError::unknown_variant("signaling.model", s, &Self::NAMES)),
        }
    }
}

/// The signaling policy of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SignalingPolicy {
    Threshold(ThresholdSignaling),
    Langmuir(LangmuirSignaling),
}

impl SignalingPolicy {
    pub fn affinity_threshold(threshold: f64) -> Result<Self> {
        ThresholdSignaling::new(Characteristic::Affinity, threshold).map(Self::Threshold)
    }

    pub fn quantity_threshold(threshold: f64) -> Result<Self> {
        ThresholdSignaling::new(Characteristic::Quantity, threshold).map(Self::Threshold)
    }

    pub fn quantity_langmuir() -> Self {
        Self::Langmuir(LangmuirSignaling)
    }

    pub fn model(&self) -> SignalingModel {
        match self {
            SignalingPolicy::Threshold(t) => match t.characteristic {
                Characteristic::Affinity => SignalingModel::AffinityThreshold,
                Characteristic::Quantity => SignalingModel::QuantityThreshold,
            },
            SignalingPolicy::Langmuir(_) => SignalingModel::QuantityLangmuir,
        }
    }

    /// Whether `cell` dies this cycle. Threshold models never draw from `rng`.
    pub fn apoptose<C: BCell>(&self, cell: &C, rng: &mut dyn RandomSource) -> bool {
        match self {
            SignalingPolicy::Threshold(t) => t.apoptose(cell),
            SignalingPolicy::Langmuir(l) => l.apoptose(cell, rng),
        }
    }

    /// Split `cells` into `(survivors, apoptotic)`, preserving input order.
    pub fn partition<C: BCell>(
        &self,
        cells: Vec<C>,
        rng: &mut dyn RandomSource,
    ) -> (Vec<C>, Vec<C>) {
        let mut survivors = Vec::with_capacity(cells.len());
        let mut apoptotic = Vec::new();
        for cell in cells {
            if self.apoptose(&cell, rng) {
                apoptotic.push(cell);
            } else {
                survivors.push(cell);
            }
        }
        debug!(
            model = self.model().name(),
            survivors = survivors.len(),
            apoptotic = apoptotic.len(),
            "BCR signaling"
        );
        (survivors, apoptotic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubCell;

    #[test]
    fn affinity_threshold_is_strict() {
        let policy = SignalingPolicy::affinity_threshold(0.5).unwrap();
        let mut rng = SimRng::seeded(1);
        assert!(policy.apoptose(&StubCell::with_affinity(0.49), &mut rng));
        assert!(!policy.apoptose(&StubCell::with_affinity(0.5), &mut rng));
        assert!(!policy.apoptose(&StubCell::with_affinity(0.9), &mut rng));
    }

    #[test]
    fn quantity_threshold_reads_quantity_only() {
        let policy = SignalingPolicy::quantity_threshold(2.0).unwrap();
        let mut rng = SimRng::seeded(1);
        // High affinity does not rescue a cell that captured little.
        let cell = StubCell::new(1.0, 100.0);
        assert!(policy.apoptose(&cell, &mut rng));
        assert!(!policy.apoptose(&StubCell::new(2.0, -5.0), &mut rng));
    }

    #[test]
    fn langmuir_curve_points() {
        assert_eq!(LangmuirSignaling::apoptosis_probability(0.0), Probability::ONE);
        assert_eq!(LangmuirSignaling::apoptosis_probability(1.0).value(), 0.5);
        assert_eq!(LangmuirSignaling::survival_probability(0.0), Probability::ZERO);
        assert_eq!(LangmuirSignaling::survival_probability(1.0).value(), 0.5);
        let p = LangmuirSignaling::apoptosis_probability(3.0).value();
        assert!((p - 0.25).abs() < 1e-12);
        assert_eq!(
            LangmuirSignaling::survival_probability(f64::INFINITY),
            Probability::ONE
        );
    }

    #[test]
    fn langmuir_probabilities_are_complementary() {
        for q in [0.0, 0.1, 0.7, 1.0, 4.2, 100.0] {
            let s = LangmuirSignaling::survival_probability(q).value();
            let a = LangmuirSignaling::apoptosis_probability(q).value();
            assert!((s + a - 1.0).abs() < 1e-12, "q={q}");
        }
    }

    #[test]
    fn langmuir_zero_capture_always_dies() {
        let policy = SignalingPolicy::quantity_langmuir();
        let mut rng = SimRng::seeded(4);
        let cell = StubCell::with_quantity(0.0);
        assert!((0..500).all(|_| policy.apoptose(&cell, &mut rng)));
    }

    #[test]
    fn langmuir_frequency_matches_isotherm() {
        let policy = SignalingPolicy::quantity_langmuir();
        let mut rng = SimRng::seeded(21);
        let cell = StubCell::with_quantity(1.0);
        let n = 20_000;
        let deaths = (0..n).filter(|_| policy.apoptose(&cell, &mut rng)).count();
        let freq = deaths as f64 / n as f64;
        assert!((freq - 0.5).abs() < 5.0 * 0.5 / (n as f64).sqrt(), "freq={freq}");
    }

    #[test]
    fn partition_keeps_every_cell() {
        let policy = SignalingPolicy::quantity_threshold(1.0).unwrap();
        let mut rng = SimRng::seeded(2);
        let cells: Vec<_> = [0.5, 1.0, 1.5, 0.0]
            .iter()
            .map(|&q| StubCell::with_quantity(q))
            .collect();
        let (alive, dead) = policy.partition(cells, &mut rng);
        assert_eq!(alive.len(), 2);
        assert_eq!(dead.len(), 2);
        assert!(alive.iter().all(|c| c.antigen_quantity() >= 1.0));
    }

    #[test]
    fn model_names_parse() {
        for name in SignalingModel::NAMES {
            let model: SignalingModel = name.parse().unwrap();
            assert_eq!(model.name(), name);
        }
        assert_eq!(
            "Quantity_Langmuir".parse::<SignalingModel>().unwrap(),
            SignalingModel::QuantityLangmuir
        );
        assert!("hill".parse::<SignalingModel>().unwrap_err().is_config());
    }

    #[test]
    fn nan_threshold_rejected() {
        assert!(SignalingPolicy::affinity_threshold(f64::NAN).is_err());
    }
}
