//! # Germinal Core
//!
//! Core traits and types for the germinal-center decision layer.
//!
//! The germinal-center reaction alternates light-zone selection with
//! dark-zone proliferation. This crate defines what the decision models
//! need from the rest of a simulation, and nothing more:
//!
//! - **BCell** — captured antigen, best affinity, receptor, division count, replication
//! - **Affinity / AntigenPool** — epitopes and how strongly they bind a receptor
//! - **RandomSource** — Bernoulli trials and stochastic rounding from one run-owned stream
//! - **Probability** — a validated scalar in [0, 1]
//!
//! ## Quick Start
//!
//! ```rust
//! use germinal_core::prelude::*;
//!
//! let p = Probability::new("memory.probability", 0.05).unwrap();
//! let mut rng = SimRng::seeded(42);
//! let _ = rng.accept(p);
//! ```

pub mod antigen;
pub mod cell;
pub mod error;
pub mod prelude;
pub mod random;
pub mod types;
