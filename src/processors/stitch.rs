//! Blending of overlapping patch predictions.
//!
//! Each patch is multiplied by a Gaussian importance map and summed into an output
//! buffer, while the map itself is summed into a weight buffer. Dividing the two at
//! the end gives a seamless weighted average in overlapping regions.

use ndarray::{Array2, Array3, ArrayView3, Axis, Ix2, s};
use tracing::debug;

use crate::core::errors::SrError;
use crate::core::validation::{validate_positive, validate_same_shape};
use crate::processors::gaussian::{DEFAULT_SIGMA_SCALE, gaussian_importance_map};
use crate::processors::types::PatchBox;

/// Accumulates patch predictions into a full-size image.
#[derive(Debug, Clone)]
pub struct PatchStitcher {
    scale: usize,
    importance: Array2<f32>,
    sum: Array3<f32>,
    weights: Array2<f32>,
}

impl PatchStitcher {
    /// Creates a stitcher for an output of `height` by `width` pixels with
    /// `channels` channels, receiving square patches of `patch_size` pixels.
    ///
    /// Sizes are in output coordinates. When boxes come from a low-resolution grid,
    /// use [`PatchStitcher::with_scale`].
    pub fn new(
        height: usize,
        width: usize,
        channels: usize,
        patch_size: usize,
    ) -> Result<Self, SrError> {
        Self::with_sigma_scale(height, width, channels, patch_size, DEFAULT_SIGMA_SCALE)
    }

    /// Same as [`PatchStitcher::new`] with an explicit Gaussian sigma scale.
    pub fn with_sigma_scale(
        height: usize,
        width: usize,
        channels: usize,
        patch_size: usize,
        sigma_scale: f64,
    ) -> Result<Self, SrError> {
        validate_positive(channels, "channels")?;
        let importance = gaussian_importance_map(&[patch_size, patch_size], sigma_scale)?
            .into_dimensionality::<Ix2>()?;
        Ok(Self {
            scale: 1,
            importance,
            sum: Array3::zeros((height, width, channels)),
            weights: Array2::zeros((height, width)),
        })
    }

    /// Sets the factor applied to incoming boxes.
    ///
    /// With a scale of 4, a box `0..24` on the low-resolution grid lands on
    /// `0..96` of the output. The patch size given at construction must already be
    /// the scaled size.
    pub fn with_scale(mut self, scale: usize) -> Result<Self, SrError> {
        validate_positive(scale, "scale")?;
        self.scale = scale;
        Ok(self)
    }

    /// Adds one patch prediction located at `patch_box`.
    pub fn add(&mut self, patch_box: &PatchBox, patch: ArrayView3<f32>) -> Result<(), SrError> {
        let target = patch_box.scaled(self.scale);
        let (height, width, channels) = self.sum.dim();
        target.check_bounds(height, width)?;

        let (ph, pw) = self.importance.dim();
        validate_same_shape(&[ph, pw, channels], patch.shape(), "stitch patch")?;
        validate_same_shape(
            &[ph, pw],
            &[target.height(), target.width()],
            "stitch patch box",
        )?;

        let region = s![target.x_left..target.x_right, target.y_up..target.y_down];
        let mut sum = self
            .sum
            .slice_mut(s![target.x_left..target.x_right, target.y_up..target.y_down, ..]);
        for (mut out_channel, in_channel) in sum
            .axis_iter_mut(Axis(2))
            .zip(patch.axis_iter(Axis(2)))
        {
            out_channel.zip_mut_with(&(&in_channel * &self.importance), |acc, v| *acc += v);
        }
        self.weights
            .slice_mut(region)
            .zip_mut_with(&self.importance, |acc, w| *acc += w);
        Ok(())
    }

    /// Divides the accumulated predictions by the accumulated weights.
    ///
    /// Pixels that no patch touched are left at zero.
    pub fn finish(self) -> Array3<f32> {
        let Self {
            mut sum, weights, ..
        } = self;
        let uncovered = weights.iter().filter(|&&w| w == 0.0).count();
        if uncovered > 0 {
            debug!(uncovered, "stitched output has pixels without patches");
        }
        for mut channel in sum.axis_iter_mut(Axis(2)) {
            channel.zip_mut_with(&weights, |v, &w| {
                if w > 0.0 {
                    *v /= w;
                }
            });
        }
        sum
    }
}
