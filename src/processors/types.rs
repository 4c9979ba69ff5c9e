//! Types used in patch processing operations
//!
//! This module defines the value types shared by patch enumeration, stitching and
//! quantization.
use std::str::FromStr;

use ndarray::{Array3, ArrayView3, s};
use serde::{Deserialize, Serialize};

use crate::core::errors::{ImageProcessError, SrError};

/// A rectangular patch of an image.
///
/// `x_left..x_right` spans the first (height) axis of the image array and
/// `y_up..y_down` the second (width) axis. Both ranges are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchBox {
    /// First row of the patch.
    pub x_left: usize,
    /// One past the last row of the patch.
    pub x_right: usize,
    /// First column of the patch.
    pub y_up: usize,
    /// One past the last column of the patch.
    pub y_down: usize,
}

impl PatchBox {
    /// Creates a box from its four bounds.
    pub fn new(x_left: usize, x_right: usize, y_up: usize, y_down: usize) -> Self {
        Self {
            x_left,
            x_right,
            y_up,
            y_down,
        }
    }

    /// Extent along the height axis.
    pub fn height(&self) -> usize {
        self.x_right.saturating_sub(self.x_left)
    }

    /// Extent along the width axis.
    pub fn width(&self) -> usize {
        self.y_down.saturating_sub(self.y_up)
    }

    /// Returns the box with every bound multiplied by `scale`.
    pub fn scaled(&self, scale: usize) -> Self {
        Self::new(
            self.x_left * scale,
            self.x_right * scale,
            self.y_up * scale,
            self.y_down * scale,
        )
    }

    /// Checks that the box lies inside an image of the given size.
    pub fn check_bounds(&self, height: usize, width: usize) -> Result<(), ImageProcessError> {
        if self.x_left >= self.x_right || self.y_up >= self.y_down {
            return Err(ImageProcessError::PatchOutOfBounds);
        }
        if self.x_right > height || self.y_down > width {
            return Err(ImageProcessError::PatchOutOfBounds);
        }
        Ok(())
    }

    /// Borrows the region of an HWC image covered by this box.
    pub fn slice<'a>(&self, image: &'a Array3<f32>) -> Result<ArrayView3<'a, f32>, SrError> {
        let (height, width, _) = image.dim();
        self.check_bounds(height, width)?;
        Ok(image.slice(s![self.x_left..self.x_right, self.y_up..self.y_down, ..]))
    }
}

impl From<PatchBox> for [usize; 4] {
    fn from(b: PatchBox) -> Self {
        [b.x_left, b.x_right, b.y_up, b.y_down]
    }
}

/// How pixel values are snapped to the 8-bit grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizeMode {
    /// Return the quantized values.
    #[default]
    Hard,
    /// Return `input + residual`, where the residual `quantized - input` is a
    /// constant from the point of view of gradient computation.
    StraightThrough,
}

/// Implementation of FromStr trait for QuantizeMode to parse the mode from CLI input
impl FromStr for QuantizeMode {
    type Err = SrError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "hard" => Ok(QuantizeMode::Hard),
            "ste" | "straight_through" | "fake" => Ok(QuantizeMode::StraightThrough),
            other => Err(SrError::invalid_input(format!(
                "unknown quantize mode '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_box_extent() {
        let b = PatchBox::new(4, 20, 8, 24);
        assert_eq!(b.height(), 16);
        assert_eq!(b.width(), 16);
        assert_eq!(<[usize; 4]>::from(b), [4, 20, 8, 24]);
        assert_eq!(b.scaled(2), PatchBox::new(8, 40, 16, 48));
    }

    #[test]
    fn test_slice_rejects_out_of_bounds() {
        let image = Array3::<f32>::zeros((10, 10, 3));
        assert!(PatchBox::new(0, 4, 0, 4).slice(&image).is_ok());
        assert!(PatchBox::new(8, 12, 0, 4).slice(&image).is_err());
        assert!(PatchBox::new(4, 4, 0, 4).slice(&image).is_err());
    }

    #[test]
    fn test_slice_view_has_patch_shape() {
        let image = Array3::<f32>::from_shape_fn((6, 8, 1), |(h, w, _)| (h * 8 + w) as f32);
        let view = PatchBox::new(2, 4, 3, 6).slice(&image).unwrap();
        assert_eq!(view.dim(), (2, 3, 1));
        assert_eq!(view[[0, 0, 0]], 19.0);
    }

    #[test]
    fn test_quantize_mode_from_str() {
        assert_eq!("hard".parse::<QuantizeMode>().unwrap(), QuantizeMode::Hard);
        assert_eq!(
            "fake".parse::<QuantizeMode>().unwrap(),
            QuantizeMode::StraightThrough
        );
        assert!("round".parse::<QuantizeMode>().is_err());
    }
}
