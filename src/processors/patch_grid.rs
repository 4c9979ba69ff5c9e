//! Sliding-window patch enumeration.
//!
//! Large images are processed as overlapping square patches. Patches advance by
//! `stride` along each axis, and the last patch on an axis is moved back so that
//! it ends exactly at the image edge instead of running past it.

use std::path::Path;

use ndarray::Array3;
use tracing::debug;

use crate::core::errors::{ImageProcessError, SrError};
use crate::processors::types::PatchBox;
use crate::utils::image::load_normalized;

/// An image split into overlapping patches.
#[derive(Debug, Clone)]
pub struct PatchGrid {
    /// The image as an HWC array with values in `[0, 1]`.
    pub image: Array3<f32>,
    /// The file name without directory or extension.
    pub name: String,
    /// Patch boxes in row-major order.
    pub boxes: Vec<PatchBox>,
}

/// Number of patch positions along an axis of `extent` pixels.
///
/// Equals `1 + ceil((extent - patch_size) / stride)`; the caller guarantees
/// `patch_size <= extent` and `stride > 0`.
fn positions(extent: usize, patch_size: usize, stride: usize) -> usize {
    1 + (extent - patch_size).div_ceil(stride)
}

/// Enumerates the patch boxes covering an image of `height` by `width` pixels.
///
/// Boxes are produced row-major: the outer loop walks the height axis (`x`) and
/// the inner loop the width axis (`y`). Every box is `patch_size` on a side.
///
/// # Errors
///
/// Returns an error when `patch_size` or `stride` is zero, or when `patch_size`
/// exceeds either image dimension.
pub fn patch_grid(
    height: usize,
    width: usize,
    patch_size: usize,
    stride: usize,
) -> Result<Vec<PatchBox>, SrError> {
    if patch_size == 0 {
        return Err(ImageProcessError::InvalidPatchSize.into());
    }
    if stride == 0 {
        return Err(ImageProcessError::InvalidStride.into());
    }
    if patch_size > height || patch_size > width {
        return Err(ImageProcessError::ImageTooSmall {
            image_size: (height, width),
            patch_size: (patch_size, patch_size),
        }
        .into());
    }

    let num_x = positions(height, patch_size, stride);
    let num_y = positions(width, patch_size, stride);

    let mut boxes = Vec::with_capacity(num_x * num_y);
    for x_p in 0..num_x {
        let (x_left, x_right) = if x_p == num_x - 1 {
            (height - patch_size, height)
        } else {
            (x_p * stride, x_p * stride + patch_size)
        };
        for y_p in 0..num_y {
            let (y_up, y_down) = if y_p == num_y - 1 {
                (width - patch_size, width)
            } else {
                (y_p * stride, y_p * stride + patch_size)
            };
            boxes.push(PatchBox::new(x_left, x_right, y_up, y_down));
        }
    }

    debug!(height, width, patch_size, stride, num_x, num_y, "enumerated patch grid");
    Ok(boxes)
}

/// Loads an image from `path` and enumerates its patch boxes.
pub fn load_patch_grid(
    path: impl AsRef<Path>,
    patch_size: usize,
    stride: usize,
) -> Result<PatchGrid, SrError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let image = load_normalized(path)?;
    let (height, width, _) = image.dim();
    let boxes = patch_grid(height, width, patch_size, stride)?;
    Ok(PatchGrid { image, name, boxes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_count_and_size() {
        let boxes = patch_grid(100, 70, 32, 24).unwrap();
        // 1 + ceil(68 / 24) = 4, 1 + ceil(38 / 24) = 3
        assert_eq!(boxes.len(), 12);
        assert!(boxes.iter().all(|b| b.height() == 32 && b.width() == 32));
    }

    #[test]
    fn test_row_major_order() {
        let boxes = patch_grid(64, 64, 32, 32).unwrap();
        let corners: Vec<(usize, usize)> = boxes.iter().map(|b| (b.x_left, b.y_up)).collect();
        assert_eq!(corners, vec![(0, 0), (0, 32), (32, 0), (32, 32)]);
    }

    #[test]
    fn test_last_patch_flush_with_far_edge() {
        let boxes = patch_grid(50, 45, 16, 12).unwrap();
        let last = boxes.last().unwrap();
        assert_eq!(last.x_right, 50);
        assert_eq!(last.y_down, 45);
        assert_eq!(last.x_left, 34);
        assert_eq!(last.y_up, 29);
    }

    #[test]
    fn test_union_covers_image() {
        let (height, width) = (37, 53);
        let boxes = patch_grid(height, width, 10, 7).unwrap();
        let mut covered = vec![vec![false; width]; height];
        for b in &boxes {
            for row in covered.iter_mut().take(b.x_right).skip(b.x_left) {
                for cell in row.iter_mut().take(b.y_down).skip(b.y_up) {
                    *cell = true;
                }
            }
        }
        assert!(covered.iter().flatten().all(|&c| c));
    }

    #[test]
    fn test_patch_equal_to_image_gives_one_box() {
        let boxes = patch_grid(16, 16, 16, 8).unwrap();
        assert_eq!(boxes, vec![PatchBox::new(0, 16, 0, 16)]);
    }

    #[test]
    fn test_oversized_patch_rejected() {
        let err = patch_grid(20, 40, 32, 8).unwrap_err();
        assert!(matches!(err, SrError::Processing { .. }));
        assert!(patch_grid(40, 20, 32, 8).is_err());
    }

    #[test]
    fn test_zero_stride_or_patch_rejected() {
        assert!(patch_grid(20, 20, 0, 8).is_err());
        assert!(patch_grid(20, 20, 8, 0).is_err());
    }

    #[test]
    fn test_load_patch_grid_reads_name_and_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_001.png");
        image::RgbImage::from_pixel(40, 30, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let grid = load_patch_grid(&path, 16, 8).unwrap();
        assert_eq!(grid.name, "frame_001");
        assert_eq!(grid.image.dim(), (30, 40, 3));
        assert!(grid.image.iter().all(|&v| v == 1.0));
        assert_eq!(grid.boxes.len(), 3 * 4);
    }

    #[test]
    fn test_load_patch_grid_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_patch_grid(dir.path().join("missing.png"), 8, 8).is_err());
    }
}
