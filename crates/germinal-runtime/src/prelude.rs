//! Germinal Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use germinal_runtime::prelude::*;
//! ```

pub use crate::bitstring::{random_pool, BitCell, BitEpitope, BitGermlines, BitHooks, BitReceptor};
pub use crate::config::GcConfig;
pub use crate::cycle::{CenterStats, CycleHooks, CycleReport, GerminalCenter};
pub use crate::export::{summarize, RunSummary};
pub use crate::policy_set::PolicySet;

// Re-export from policy
pub use germinal_policy::prelude::*;
