//! Configuration management.
//!
//! This module provides the YAML configuration loader, the typed training
//! configuration read by the companion binary and the parallelism policy shared
//! by the fixed filters.

pub mod parallel;
pub mod yaml;

pub use parallel::ParallelPolicy;
pub use yaml::{TrainingConfig, dump_yaml, load_yaml};
