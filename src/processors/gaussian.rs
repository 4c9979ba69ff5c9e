//! Gaussian importance maps for blending overlapping patches.
//!
//! Predictions near the border of a patch are less reliable than those at its
//! centre, so tiled inference weights each patch by a Gaussian bump before summing
//! overlapping regions. The map produced here is strictly positive so that the
//! accumulated weights can always be divided by.

use ndarray::{ArrayD, IxDyn};
use tracing::debug;

use crate::core::errors::SrError;

/// Default ratio between the Gaussian sigma and the patch edge.
pub const DEFAULT_SIGMA_SCALE: f64 = 1.0 / 8.0;

/// Number of standard deviations after which the Gaussian is truncated.
const TRUNCATE: f64 = 4.0;

/// Builds a Gaussian importance map with the shape of `patch_size`.
///
/// A unit impulse at the centre (`size / 2` on every axis) is filtered with a
/// separable Gaussian whose standard deviation is `size * sigma_scale` on each
/// axis. The filter is truncated at `floor(4 * sigma + 0.5)` samples and the
/// impulse is zero-padded, so entries beyond that radius are zero before the
/// final fix-up. The map is scaled so that its maximum is `1.0`, then every entry
/// that is exactly zero is replaced with the smallest non-zero entry.
///
/// # Errors
///
/// Returns [`SrError::InvalidInput`] if `patch_size` is empty or contains a zero,
/// or if `sigma_scale` is not a positive finite number.
pub fn gaussian_importance_map(
    patch_size: &[usize],
    sigma_scale: f64,
) -> Result<ArrayD<f32>, SrError> {
    if patch_size.is_empty() || patch_size.contains(&0) {
        return Err(SrError::invalid_input(format!(
            "patch size must have positive extents, got {patch_size:?}"
        )));
    }
    if !(sigma_scale.is_finite() && sigma_scale > 0.0) {
        return Err(SrError::invalid_input(format!(
            "sigma scale must be a positive finite number, got {sigma_scale}"
        )));
    }

    // Filtering an impulse with a separable kernel yields the outer product of the
    // per-axis kernels centred on the impulse. The per-axis normalisation cancels
    // once the peak is scaled to one.
    let profiles: Vec<Vec<f64>> = patch_size
        .iter()
        .map(|&size| axis_profile(size, size as f64 * sigma_scale))
        .collect();

    let mut map = ArrayD::<f32>::zeros(IxDyn(patch_size));
    for (index, value) in map.indexed_iter_mut() {
        let weight: f64 = profiles
            .iter()
            .enumerate()
            .map(|(axis, profile)| profile[index[axis]])
            .product();
        *value = weight as f32;
    }

    let max = map.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        map.mapv_inplace(|v| v / max);
    }

    let min_nonzero = map
        .iter()
        .copied()
        .filter(|&v| v != 0.0)
        .fold(f32::INFINITY, f32::min);
    if min_nonzero.is_finite() {
        map.mapv_inplace(|v| if v == 0.0 { min_nonzero } else { v });
    }

    debug!(
        shape = ?patch_size,
        sigma_scale,
        min = min_nonzero,
        "built gaussian importance map"
    );
    Ok(map)
}

/// Gaussian weights along one axis relative to the centre sample `size / 2`.
fn axis_profile(size: usize, sigma: f64) -> Vec<f64> {
    let center = (size / 2) as f64;
    let radius = (TRUNCATE * sigma + 0.5).floor();
    let two_sigma_sq = 2.0 * sigma * sigma;
    (0..size)
        .map(|i| {
            let d = i as f64 - center;
            if d.abs() > radius {
                0.0
            } else {
                (-(d * d) / two_sigma_sq).exp()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_shape_matches_patch_size() {
        let map = gaussian_importance_map(&[16, 24], DEFAULT_SIGMA_SCALE).unwrap();
        assert_eq!(map.shape(), &[16, 24]);

        let volume = gaussian_importance_map(&[4, 6, 8], DEFAULT_SIGMA_SCALE).unwrap();
        assert_eq!(volume.shape(), &[4, 6, 8]);
    }

    #[test]
    fn test_peak_is_one_at_center() {
        let map = gaussian_importance_map(&[32, 32], DEFAULT_SIGMA_SCALE).unwrap();
        assert_abs_diff_eq!(map[[16, 16]], 1.0, epsilon = 1e-6);
        let max = map.iter().copied().fold(f32::MIN, f32::max);
        assert_abs_diff_eq!(max, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_all_entries_strictly_positive() {
        // sigma = 2 truncates at radius 8, so the border starts out at zero.
        let map = gaussian_importance_map(&[32, 32], 1.0 / 16.0).unwrap();
        assert!(map.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_truncated_entries_take_the_minimum() {
        let map = gaussian_importance_map(&[32, 32], 1.0 / 16.0).unwrap();
        let min = map.iter().copied().fold(f32::INFINITY, f32::min);
        // Corner lies beyond the truncation radius on both axes.
        assert_eq!(map[[0, 0]], min);
        assert_eq!(map[[0, 31]], min);
    }

    #[test]
    fn test_profile_is_symmetric_around_center() {
        let map = gaussian_importance_map(&[33], 0.25).unwrap();
        for offset in 1..=16 {
            assert_abs_diff_eq!(map[[16 - offset]], map[[16 + offset]], epsilon = 1e-7);
        }
    }

    #[test]
    fn test_single_pixel_patch() {
        let map = gaussian_importance_map(&[1, 1], DEFAULT_SIGMA_SCALE).unwrap();
        assert_eq!(map[[0, 0]], 1.0);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(gaussian_importance_map(&[], DEFAULT_SIGMA_SCALE).is_err());
        assert!(gaussian_importance_map(&[8, 0], DEFAULT_SIGMA_SCALE).is_err());
        assert!(gaussian_importance_map(&[8, 8], 0.0).is_err());
        assert!(gaussian_importance_map(&[8, 8], f64::NAN).is_err());
    }
}
