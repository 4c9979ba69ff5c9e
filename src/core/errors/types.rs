//! Core error types for the super-resolution helpers.
//!
//! This module defines the error enums shared by every component of the crate:
//! the main [`SrError`] enum, the [`ImageProcessError`] enum for geometry problems
//! and the [`ProcessingStage`] enum used to tag where a failure happened.

use thiserror::Error;

/// Errors that can occur during image geometry operations.
#[derive(Debug, Error)]
pub enum ImageProcessError {
    /// The patch size is invalid (e.g., zero).
    #[error("Invalid patch size")]
    InvalidPatchSize,
    /// The stride is invalid (e.g., zero).
    #[error("Invalid stride")]
    InvalidStride,
    /// The input image is smaller than the requested patch.
    #[error(
        "Input image ({image_height}, {image_width}) smaller than the patch size ({patch_height}, {patch_width})",
        image_height = image_size.0,
        image_width = image_size.1,
        patch_height = patch_size.0,
        patch_width = patch_size.1
    )]
    ImageTooSmall {
        /// The actual size of the image as (height, width).
        image_size: (usize, usize),
        /// The requested patch size as (height, width).
        patch_size: (usize, usize),
    },
    /// The patch coordinates are out of bounds.
    #[error("Patch coordinates are out of bounds")]
    PatchOutOfBounds,
}

/// Enum representing the stage in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred while enumerating or stitching patches.
    Patching,
    /// Error occurred while rendering a plot.
    Plotting,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Patching => write!(f, "patching"),
            ProcessingStage::Plotting => write!(f, "plotting"),
        }
    }
}

/// Enum representing the errors returned by this crate.
#[derive(Error, Debug)]
pub enum SrError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from tensor operations with detailed context.
    #[error(
        "tensor operation '{operation}' failed: expected shape {expected_shape:?}, got {actual_shape:?}"
    )]
    TensorOperation {
        /// The tensor operation that failed.
        operation: String,
        /// The expected tensor shape.
        expected_shape: Vec<usize>,
        /// The actual tensor shape.
        actual_shape: Vec<usize>,
    },

    /// Error from basic tensor operations (fallback for ndarray errors).
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type SrResult<T> = Result<T, SrError>;

impl From<image::ImageError> for SrError {
    /// Converts an image::ImageError to SrError::ImageLoad.
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<serde_yaml::Error> for SrError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::ConfigError {
            message: format!("yaml: {error}"),
        }
    }
}

impl From<ImageProcessError> for SrError {
    /// Converts an ImageProcessError to SrError::Processing.
    fn from(error: ImageProcessError) -> Self {
        Self::Processing {
            kind: ProcessingStage::Patching,
            context: "patch geometry rejected".to_string(),
            source: Box::new(error),
        }
    }
}

impl SrError {
    /// Creates an invalid-input error from any message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error with context and details.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use sr_kit::core::errors::SrError;
    /// let err = SrError::config_error_detailed("gaussian kernel", "sigma must be positive");
    /// assert!(matches!(err, SrError::ConfigError { .. }));
    /// ```
    pub fn config_error_detailed(context: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ConfigError {
            message: format!("{}: {}", context.into(), details.into()),
        }
    }

    /// Creates a configuration error for invalid field values.
    ///
    /// # Arguments
    ///
    /// * `field` - The name of the field with an invalid value
    /// * `expected` - Description of what was expected
    /// * `actual` - Description of what was actually provided
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ConfigError {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }

    /// Creates a tensor shape mismatch error.
    pub fn tensor_shape_mismatch(
        operation: impl Into<String>,
        expected_shape: &[usize],
        actual_shape: &[usize],
    ) -> Self {
        Self::TensorOperation {
            operation: operation.into(),
            expected_shape: expected_shape.to_vec(),
            actual_shape: actual_shape.to_vec(),
        }
    }

    /// Wraps an error raised by a rendering backend.
    pub fn plotting_error(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Plotting,
            context: context.into(),
            source: Box::new(source),
        }
    }
}
