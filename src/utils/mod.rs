//! Utility functions for super-resolution training and inference.
//!
//! This module provides image loading helpers, the training log, the timer,
//! training curve plots and logging setup.

pub mod image;
pub mod timer;
pub mod training_log;
#[cfg(feature = "visualization")]
pub mod visualization;

pub use image::{array_to_image, load_image, load_normalized, to_normalized_array};
pub use timer::Timer;
pub use training_log::{LOG_FILE_NAME, TrainingLog, append_line};
#[cfg(feature = "visualization")]
pub use visualization::{LOSS_GRAPH_NAME, PSNR_GRAPH_NAME, plot_loss_down, plot_psnr};

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber writing to stderr.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
