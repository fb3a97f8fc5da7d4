//! # Germinal Policy
//!
//! The stochastic decision models behind every B-cell fate transition in a
//! germinal-center cycle:
//!
//! - **Signaling** — apoptosis or survival after antigen capture
//! - **Selection** — memory, plasma and re-entry compartment gates
//! - **Division** — how many times each survivor divides in the dark zone
//! - **Germline** — activating and replicating the founding repertoire
//!
//! Every policy holds only immutable configuration validated at
//! construction, and draws all of its chance from a caller-supplied
//! [`RandomSource`](germinal_core::random::RandomSource).

pub mod division;
pub mod germline;
pub mod prelude;
pub mod selection;
pub mod signaling;

#[cfg(test)]
pub(crate) mod testing;
