//! Germinal Policy Prelude — convenient imports for common usage.
//!
//! ```rust
//! use germinal_policy::prelude::*;
//! ```

pub use crate::division::{
    expected_division_count, DivisionModel, DivisionPolicy, FixedCountDivision,
    MeanCaptureRatioDivision,
};
pub use crate::germline::GermlineActivation;
pub use crate::selection::{
    AffinityFloor, MemorySelection, PlasmaSelection, ReentrySelection, SelectionGate,
    SelectionPolicy, Unconditional,
};
pub use crate::signaling::{
    Characteristic, LangmuirSignaling, SignalingModel, SignalingPolicy, ThresholdSignaling,
};

// Re-export from core
pub use germinal_core::prelude::*;
