//! Error handling for the crate.

mod types;

pub use types::{ImageProcessError, ProcessingStage, SrError, SrResult};
