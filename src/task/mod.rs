//! Task lifecycle management.
//!
//! This module owns the task state machine: validated field mutations, the
//! status transition table, auto-completion from progress, blocking, soft
//! deletion and the per-field audit history every mutation produces. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
