//! YAML configuration loading.
//!
//! The loader takes the configuration path from the caller. [`dump_yaml`] reads a
//! file without any schema and prints its contents to stdout, which is handy when
//! inspecting an experiment directory; [`load_yaml`] deserializes into any serde type, typically
//! [`TrainingConfig`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::ParallelPolicy;
use crate::core::errors::SrError;
use crate::processors::gaussian::DEFAULT_SIGMA_SCALE;

/// Reads a YAML file and deserializes it into `T`.
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SrError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading yaml configuration");
    let reader = BufReader::new(File::open(path)?);
    let value = serde_yaml::from_reader(reader)?;
    Ok(value)
}

/// Reads a YAML file without a schema, prints its contents and returns them.
pub fn dump_yaml(path: impl AsRef<Path>) -> Result<serde_yaml::Value, SrError> {
    let path = path.as_ref();
    let value: serde_yaml::Value = load_yaml(path)?;
    let text = render_yaml(&value)?;
    info!(path = %path.display(), "loaded configuration");
    println!("{text}");
    Ok(value)
}

fn render_yaml(value: &serde_yaml::Value) -> Result<String, SrError> {
    Ok(serde_yaml::to_string(value)?.trim_end().to_string())
}

/// Settings shared by the helpers of a training or inference run.
///
/// Every field has a default so partial files are accepted. Keys that are not
/// recognised are kept in [`TrainingConfig::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Square patch edge used for tiled inference.
    pub patch_size: usize,
    /// Step between neighbouring patches.
    pub stride: usize,
    /// Super-resolution scale factor.
    pub scale: usize,
    /// Maximum pixel value of the tensors (1.0 or 255.0).
    pub rgb_range: f32,
    /// Ratio between Gaussian sigma and patch edge for blending.
    pub sigma_scale: f64,
    /// Root directory holding experiment outputs.
    pub experiment_dir: PathBuf,
    /// Experiment name, used as a subdirectory of `experiment_dir`.
    pub name: String,
    /// Parallelism used by the fixed filters.
    pub parallel: ParallelPolicy,
    /// Remaining keys of the file.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            patch_size: 96,
            stride: 64,
            scale: 4,
            rgb_range: 1.0,
            sigma_scale: DEFAULT_SIGMA_SCALE,
            experiment_dir: PathBuf::from("experiments"),
            name: "default".to_string(),
            parallel: ParallelPolicy::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl TrainingConfig {
    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SrError> {
        let config: Self = load_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the numeric fields.
    pub fn validate(&self) -> Result<(), SrError> {
        if self.patch_size == 0 {
            return Err(SrError::invalid_field(
                "patch_size",
                "a positive integer",
                "0",
            ));
        }
        if self.stride == 0 {
            return Err(SrError::invalid_field("stride", "a positive integer", "0"));
        }
        if self.scale == 0 {
            return Err(SrError::invalid_field("scale", "a positive integer", "0"));
        }
        if !(self.rgb_range.is_finite() && self.rgb_range > 0.0) {
            return Err(SrError::invalid_field(
                "rgb_range",
                "a positive finite number",
                self.rgb_range.to_string(),
            ));
        }
        if !(self.sigma_scale.is_finite() && self.sigma_scale > 0.0) {
            return Err(SrError::invalid_field(
                "sigma_scale",
                "a positive finite number",
                self.sigma_scale.to_string(),
            ));
        }
        Ok(())
    }

    /// Directory that receives the training log and plots.
    pub fn run_dir(&self) -> PathBuf {
        self.experiment_dir.join(&self.name)
    }
}
