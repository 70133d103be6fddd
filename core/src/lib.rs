//! Case assignment engine.
//!
//! Classifies pending cases, applies per-staff exclusion or expertise
//! rules, allocates each case under a configurable policy, and explains
//! every decision. Batches are single-threaded and sequential.

pub mod allocator;
pub mod case;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod intake;
pub mod reasoning;
pub mod resolver;
pub mod rng;
pub mod roster;
pub mod snapshot;
pub mod types;
