//! The immutable policy bundle of a simulation run.
//!
//! A `PolicySet` is built once, on one thread, from a [`GcConfig`]. Every
//! range check happens here, so a bad configuration aborts before any
//! cell is simulated. The bundle is then shared read-only, typically in an
//! `Arc`, by as many runs as the process wants; each run brings its own
//! random generator.

use crate::config::{DivisionConfig, GcConfig, SignalingConfig};
use germinal_core::error::{GcError, Result};
use germinal_policy::prelude::*;
use serde::Serialize;
use tracing::info;

/// One validated instance of every decision model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySet {
    pub signaling: SignalingPolicy,
    pub memory: MemorySelection,
    pub plasma: PlasmaSelection,
    pub reentry: ReentrySelection,
    pub division: DivisionPolicy,
    pub germline: GermlineActivation,
}

impl PolicySet {
    /// Build and validate every policy from `config`.
    pub fn from_config(config: &GcConfig) -> Result<Self> {
        let selection = &config.selection;
        let germline = &config.germline;

        let policies = Self {
            signaling: signaling_policy(&config.signaling)?,
            memory: SelectionPolicy::memory(selection.memory_probability)?,
            plasma: SelectionPolicy::plasma(
                selection.plasma_affinity_threshold,
                selection.plasma_probability,
            )?,
            reentry: SelectionPolicy::reentry(selection.reentry_probability)?,
            division: division_policy(&config.division)?,
            germline: GermlineActivation::new(
                germline.affinity_threshold,
                germline.count,
                germline.replication_factor,
            )?,
        };

        info!(
            signaling = policies.signaling.model().name(),
            division = policies.division.model().name(),
            germlines = policies.germline.germline_count(),
            "policy set built"
        );
        Ok(policies)
    }
}

fn signaling_policy(config: &SignalingConfig) -> Result<SignalingPolicy> {
    let model: SignalingModel = config
        .model
        .as_deref()
        .ok_or_else(|| GcError::missing_field("signaling.model"))?
        .parse()?;

    match model {
        SignalingModel::AffinityThreshold => {
            let threshold = config
                .affinity_threshold
                .ok_or_else(|| GcError::missing_field("signaling.affinity_threshold"))?;
            SignalingPolicy::affinity_threshold(threshold)
        }
        SignalingModel::QuantityThreshold => {
            let threshold = config
                .quantity_threshold
                .ok_or_else(|| GcError::missing_field("signaling.quantity_threshold"))?;
            SignalingPolicy::quantity_threshold(threshold)
        }
        SignalingModel::QuantityLangmuir => Ok(SignalingPolicy::quantity_langmuir()),
    }
}

fn division_policy(config: &DivisionConfig) -> Result<DivisionPolicy> {
    let model: DivisionModel = config
        .model
        .as_deref()
        .ok_or_else(|| GcError::missing_field("division.model"))?
        .parse()?;

    match model {
        DivisionModel::FixedCount => {
            let count = config
                .fixed_count
                .ok_or_else(|| GcError::missing_field("division.fixed_count"))?;
            DivisionPolicy::fixed_count(count)
        }
        DivisionModel::MeanCaptureRatio => {
            let max = config
                .max_count
                .ok_or_else(|| GcError::missing_field("division.max_count"))?;
            DivisionPolicy::mean_capture_ratio(max)
        }
    }
}
