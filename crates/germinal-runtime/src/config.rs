//! Simulation configuration loaded from `germinal.toml`.
//!
//! Each decision model has its own section. Optional keys fall back to the
//! documented defaults; required keys are left as `None` after parsing and
//! reported as missing when the policies are built, so every configuration
//! problem surfaces as a [`ConfigError`](germinal_core::error::ConfigError)
//! naming the dotted key.
//!
//! ```toml
//! [signaling]
//! model = "quantity-langmuir"
//!
//! [division]
//! model = "mean-capture-ratio"
//! max_count = 6
//! ```

use germinal_core::error::{GcError, Result};
use germinal_policy::germline::{
    DEFAULT_AFFINITY_THRESHOLD, DEFAULT_GERMLINE_COUNT, DEFAULT_REPLICATION_FACTOR,
};
use germinal_policy::selection::{
    DEFAULT_MEMORY_PROBABILITY, DEFAULT_PLASMA_PROBABILITY, DEFAULT_PLASMA_THRESHOLD,
    DEFAULT_REENTRY_PROBABILITY,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GcConfig {
    #[serde(default)]
    pub signaling: SignalingConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub division: DivisionConfig,
    #[serde(default)]
    pub germline: GermlineConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// `[signaling]` — apoptosis after antigen capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalingConfig {
    /// One of `affinity-threshold`, `quantity-threshold`, `quantity-langmuir`. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Required for `affinity-threshold`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity_threshold: Option<f64>,
    /// Required for `quantity-threshold`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_threshold: Option<f64>,
}

/// `[selection]` — memory, plasma and re-entry gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    #[serde(default = "default_memory_probability")]
    pub memory_probability: f64,
    #[serde(default = "default_plasma_threshold")]
    pub plasma_affinity_threshold: f64,
    #[serde(default = "default_plasma_probability")]
    pub plasma_probability: f64,
    #[serde(default = "default_reentry_probability")]
    pub reentry_probability: f64,
}

/// `[division]` — dark-zone division counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DivisionConfig {
    /// One of `fixed-count`, `mean-capture-ratio`. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Required for `fixed-count`; non-negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_count: Option<i64>,
    /// Required for `mean-capture-ratio`; in [3, 6].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<i64>,
}

/// `[germline]` — founding repertoire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GermlineConfig {
    #[serde(default = "default_germline_threshold")]
    pub affinity_threshold: f64,
    #[serde(default = "default_germline_count")]
    pub count: i64,
    #[serde(default = "default_replication_factor")]
    pub replication_factor: i64,
}

/// `[run]` — driver settings for the bundled reference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Seed for the run's generator; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_cycles")]
    pub cycles: usize,
    /// Active population is thinned to this size after proliferation.
    #[serde(default = "default_population_cap")]
    pub population_cap: usize,
    /// Receptor width in bits, 1 to 64.
    #[serde(default = "default_receptor_bits")]
    pub receptor_bits: u32,
    /// Number of epitopes in the antigen pool.
    #[serde(default = "default_epitopes")]
    pub epitopes: usize,
    /// Per-bit flip probability for each daughter cell.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Antigen captured by a cell with perfect affinity.
    #[serde(default = "default_antigen_density")]
    pub antigen_density: f64,
}

// Default value functions
fn default_memory_probability() -> f64 { DEFAULT_MEMORY_PROBABILITY }
fn default_plasma_threshold() -> f64 { DEFAULT_PLASMA_THRESHOLD }
fn default_plasma_probability() -> f64 { DEFAULT_PLASMA_PROBABILITY }
fn default_reentry_probability() -> f64 { DEFAULT_REENTRY_PROBABILITY }
fn default_germline_threshold() -> f64 { DEFAULT_AFFINITY_THRESHOLD }
fn default_germline_count() -> i64 { DEFAULT_GERMLINE_COUNT as i64 }
fn default_replication_factor() -> i64 { DEFAULT_REPLICATION_FACTOR as i64 }
fn default_cycles() -> usize { 10 }
fn default_population_cap() -> usize { 5000 }
fn default_receptor_bits() -> u32 { 32 }
fn default_epitopes() -> usize { 4 }
fn default_mutation_rate() -> f64 { 0.01 }
fn default_antigen_density() -> f64 { 4.0 }

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            memory_probability: default_memory_probability(),
            plasma_affinity_threshold: default_plasma_threshold(),
            plasma_probability: default_plasma_probability(),
            reentry_probability: default_reentry_probability(),
        }
    }
}

impl Default for GermlineConfig {
    fn default() -> Self {
        Self {
            affinity_threshold: default_germline_threshold(),
            count: default_germline_count(),
            replication_factor: default_replication_factor(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            cycles: default_cycles(),
            population_cap: default_population_cap(),
            receptor_bits: default_receptor_bits(),
            epitopes: default_epitopes(),
            mutation_rate: default_mutation_rate(),
            antigen_density: default_antigen_density(),
        }
    }
}

impl RunConfig {
    /// Range checks for the driver settings.
    pub fn validate(&self) -> Result<()> {
        if !(1..=64).contains(&self.receptor_bits) {
            let bits = self.receptor_bits as f64;
            return Err(GcError::out_of_range("run.receptor_bits", 1.0, 64.0, bits));
        }
        if self.epitopes == 0 {
            return Err(GcError::invalid_config(
                "run.epitopes",
                "0",
                "antigen pool needs at least one epitope",
            ));
        }
        if self.population_cap == 0 {
            return Err(GcError::invalid_config("run.population_cap", "0", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(GcError::out_of_range("run.mutation_rate", 0.0, 1.0, self.mutation_rate));
        }
        if !(self.antigen_density >= 0.0 && self.antigen_density.is_finite()) {
            return Err(GcError::invalid_config(
                "run.antigen_density",
                self.antigen_density.to_string(),
                "must be a finite non-negative number",
            ));
        }
        Ok(())
    }
}

impl GcConfig {
    /// A complete, valid configuration to start from.
    pub fn template() -> Self {
        Self {
            signaling: SignalingConfig {
                model: Some("quantity-langmuir".to_string()),
                ..SignalingConfig::default()
            },
            division: DivisionConfig {
                model: Some("mean-capture-ratio".to_string()),
                max_count: Some(6),
                ..DivisionConfig::default()
            },
            run: RunConfig {
                seed: Some(42),
                ..RunConfig::default()
            },
            ..GcConfig::default()
        }
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GcError::Parse(e.to_string()))
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GcError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GcError::Parse(e.to_string()))
    }

    /// The template configuration as TOML text.
    pub fn default_toml() -> Result<String> {
        Self::template().to_toml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_keys_take_defaults() {
        let config = GcConfig::from_toml_str(
            r#"
            [signaling]
            model = "quantity-langmuir"

            [division]
            model = "fixed-count"
            fixed_count = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.selection, SelectionConfig::default());
        assert_eq!(config.germline.count, 50);
        assert_eq!(config.germline.replication_factor, 40);
        assert_eq!(config.selection.memory_probability, 0.05);
        assert_eq!(config.selection.reentry_probability, 0.0);
        assert_eq!(config.division.fixed_count, Some(2));
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = GcConfig::from_toml_str("[selection]\nmemory_prob = 0.1\n").unwrap_err();
        assert!(matches!(err, GcError::Parse(_)));
    }

    #[test]
    fn template_round_trips() {
        let text = GcConfig::default_toml().unwrap();
        let parsed = GcConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, GcConfig::template());
    }

    #[test]
    fn run_validation() {
        assert!(RunConfig::default().validate().is_ok());
        let bad_bits = RunConfig { receptor_bits: 65, ..RunConfig::default() };
        assert!(bad_bits.validate().is_err());
        let bad_rate = RunConfig { mutation_rate: 1.5, ..RunConfig::default() };
        assert!(bad_rate.validate().is_err());
        let no_epitopes = RunConfig { epitopes: 0, ..RunConfig::default() };
        assert!(no_epitopes.validate().is_err());
    }
}
