//! Shared parallel processing configuration types.

use serde::{Deserialize, Serialize};

/// Configuration for parallel processing behavior in the fixed filters.
///
/// Depthwise convolution runs every (batch, channel) plane independently; the
/// policy decides when it is worth handing those planes to rayon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for parallel processing.
    /// If None, rayon will use the default thread pool size (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Number of planes at or below which filtering stays sequential.
    /// Default: 4
    #[serde(default = "ParallelPolicy::default_plane_threshold")]
    pub plane_threshold: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the plane threshold.
    pub fn with_plane_threshold(mut self, threshold: usize) -> Self {
        self.plane_threshold = threshold;
        self
    }

    /// Returns true when `planes` independent planes should be processed in parallel.
    pub fn use_parallel(&self, planes: usize) -> bool {
        planes > self.plane_threshold
    }

    /// Install the global rayon thread pool with the configured number of threads.
    ///
    /// Call once at application startup before any parallel processing occurs.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the thread pool was successfully configured
    /// - `Ok(false)` if `max_threads` is None (no configuration needed)
    /// - `Err` if the thread pool has already been initialized
    pub fn install_global_thread_pool(&self) -> Result<bool, rayon::ThreadPoolBuildError> {
        if let Some(num_threads) = self.max_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn default_plane_threshold() -> usize {
        4
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            plane_threshold: Self::default_plane_threshold(),
        }
    }
}
