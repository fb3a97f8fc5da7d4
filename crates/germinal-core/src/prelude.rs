//! Germinal Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use germinal_core::prelude::*;
//! ```

pub use crate::antigen::{Affinity, AntigenPool};
pub use crate::cell::{BCell, GermlineSource};
pub use crate::random::{RandomSource, SimRng};
pub use crate::types::{CellId, Compartment, Probability};

pub use crate::error::{ConfigError, GcError, Result};
