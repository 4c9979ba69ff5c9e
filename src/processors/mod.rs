//! Numeric processors for super-resolution pipelines.
//!
//! This module provides the building blocks used around a super-resolution model:
//! patch enumeration and stitching, Gaussian blending weights, fixed depthwise
//! filters, PSNR, quantization and value normalization.

pub mod gaussian;
pub mod kernels;
pub mod metrics;
pub mod normalization;
pub mod patch_grid;
pub mod quantize;
pub mod stitch;
pub mod types;

pub use gaussian::{DEFAULT_SIGMA_SCALE, gaussian_importance_map};
pub use kernels::{DepthwiseConv2d, average_kernel, gaussian_kernel};
pub use metrics::{PsnrConfig, SHAVE_MARGIN, calc_psnr, calc_psnr_with};
pub use normalization::Normalize;
pub use patch_grid::{PatchGrid, load_patch_grid, patch_grid};
pub use quantize::{quantize, quantize_residual};
pub use stitch::PatchStitcher;
pub use types::{PatchBox, QuantizeMode};
