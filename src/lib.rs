//! # sr-kit
//!
//! Helpers used around an image super-resolution model during training and
//! tiled inference.
//!
//! - [`processors::patch_grid`] splits an image into overlapping patches whose last
//!   row and column sit flush with the image edge.
//! - [`processors::PatchStitcher`] blends patch predictions back together using
//!   the Gaussian importance map from [`processors::gaussian_importance_map`].
//! - [`processors::gaussian_kernel`] and [`processors::average_kernel`] build
//!   fixed depthwise filters.
//! - [`processors::calc_psnr`], [`processors::quantize`] and
//!   [`processors::Normalize`] cover evaluation and value handling.
//! - [`utils::TrainingLog`], [`utils::Timer`] and the plots in
//!   `utils::visualization` support the training loop.
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array3;
//! use sr_kit::processors::{PatchStitcher, patch_grid};
//!
//! # fn main() -> Result<(), sr_kit::core::SrError> {
//! let image = Array3::<f32>::from_elem((48, 64, 3), 0.5);
//! let boxes = patch_grid(48, 64, 32, 24)?;
//! let mut stitcher = PatchStitcher::new(48, 64, 3, 32)?;
//! for b in &boxes {
//!     // A real pipeline would run the model on the patch here.
//!     stitcher.add(b, b.slice(&image)?)?;
//! }
//! let restored = stitcher.finish();
//! assert_eq!(restored.dim(), image.dim());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod processors;
pub mod utils;

pub use crate::core::{SrError, SrResult};
