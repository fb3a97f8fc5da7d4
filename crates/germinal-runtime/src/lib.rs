//! # Germinal Runtime
//!
//! Configuration, the per-run policy bundle, and the cycle orchestrator.
//!
//! A run is built in three explicit steps:
//! 1. Load a [`GcConfig`](config::GcConfig) from TOML
//! 2. Build one immutable [`PolicySet`](policy_set::PolicySet); all validation happens here
//! 3. Create a [`GerminalCenter`](cycle::GerminalCenter) with its own generator,
//!    seed it, and run cycles
//!
//! The [`bitstring`] module provides a small reference cell model so the
//! whole pipeline can run without an external affinity model.

pub mod bitstring;
pub mod config;
pub mod cycle;
pub mod export;
pub mod policy_set;
pub mod prelude;
