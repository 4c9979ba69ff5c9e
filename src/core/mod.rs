//! The core module of the crate.
//!
//! This module contains the fundamental components shared by every helper:
//! - Configuration management
//! - Error handling
//! - Argument validation
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod config;
pub mod errors;
pub mod validation;

pub use config::{ParallelPolicy, TrainingConfig, dump_yaml, load_yaml};
pub use errors::{ImageProcessError, ProcessingStage, SrError, SrResult};
pub use validation::{validate_positive, validate_same_length, validate_same_shape};
