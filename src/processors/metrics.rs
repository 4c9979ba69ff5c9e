//! Image fidelity metrics.

use ndarray::{ArrayD, ArrayView, Axis, Dimension, IxDyn, Slice, Zip};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::errors::SrError;
use crate::core::validation::validate_same_shape;

/// Extra pixels shaved on top of the scale factor in the default mode.
pub const SHAVE_MARGIN: usize = 6;

/// ITU-R BT.601 luma coefficients for RGB in `[0, 256)`.
const LUMA_COEFFS: [f32; 3] = [65.738, 129.057, 25.064];

/// Options for [`calc_psnr_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsnrConfig {
    /// Maximum pixel value of the inputs.
    pub rgb_range: f32,
    /// Score only the luma of RGB inputs and shave `scale` pixels instead of
    /// `scale + 6`. This is the usual protocol for benchmark datasets.
    pub luminance: bool,
}

impl Default for PsnrConfig {
    fn default() -> Self {
        Self {
            rgb_range: 1.0,
            luminance: false,
        }
    }
}

/// Computes the PSNR between a super-resolved image and its reference.
///
/// The last two axes are treated as height and width; `scale + 6` pixels are
/// removed from each of their ends before the mean squared error is taken. A
/// reference holding a single element is a placeholder and scores `0.0`.
/// Identical inputs score `f64::INFINITY`.
pub fn calc_psnr<D: Dimension>(
    sr: ArrayView<f32, D>,
    hr: ArrayView<f32, D>,
    scale: usize,
    rgb_range: f32,
) -> Result<f64, SrError> {
    calc_psnr_with(
        sr,
        hr,
        scale,
        PsnrConfig {
            rgb_range,
            ..PsnrConfig::default()
        },
    )
}

/// Same as [`calc_psnr`] with explicit options.
///
/// In luminance mode the axis before height is treated as the channel axis; when
/// it has three channels the difference is projected onto luma first.
pub fn calc_psnr_with<D: Dimension>(
    sr: ArrayView<f32, D>,
    hr: ArrayView<f32, D>,
    scale: usize,
    config: PsnrConfig,
) -> Result<f64, SrError> {
    if hr.len() == 1 {
        return Ok(0.0);
    }
    validate_same_shape(hr.shape(), sr.shape(), "psnr")?;
    if !(config.rgb_range.is_finite() && config.rgb_range > 0.0) {
        return Err(SrError::invalid_input(format!(
            "rgb_range must be a positive finite number, got {}",
            config.rgb_range
        )));
    }
    let ndim = hr.ndim();
    if ndim < 2 {
        return Err(SrError::invalid_input(format!(
            "psnr needs at least two dimensions, got {ndim}"
        )));
    }

    let mut diff: ArrayD<f32> = ArrayD::zeros(IxDyn(hr.shape()));
    Zip::from(&mut diff)
        .and(&sr.into_dyn())
        .and(&hr.into_dyn())
        .for_each(|d, &s, &h| *d = (s - h) / config.rgb_range);

    let shave = if config.luminance {
        if ndim >= 3 && diff.shape()[ndim - 3] > 1 {
            diff = to_luma(diff, ndim - 3)?;
        }
        scale
    } else {
        scale + SHAVE_MARGIN
    };

    let spatial_from = diff.ndim() - 2;
    let (height, width) = (diff.shape()[spatial_from], diff.shape()[spatial_from + 1]);
    if height <= 2 * shave || width <= 2 * shave {
        return Err(SrError::invalid_input(format!(
            "image {height}x{width} has no pixels left after shaving {shave} from each edge"
        )));
    }

    let valid = diff.slice_each_axis(|desc| {
        if desc.axis.index() >= spatial_from {
            Slice::from(shave..desc.len - shave)
        } else {
            Slice::from(..)
        }
    });
    let mse = valid.iter().map(|&v| f64::from(v) * f64::from(v)).sum::<f64>() / valid.len() as f64;
    if mse == 0.0 {
        warn!("psnr of identical images is infinite");
    }
    Ok(-10.0 * mse.log10())
}

fn to_luma(diff: ArrayD<f32>, channel_axis: usize) -> Result<ArrayD<f32>, SrError> {
    let channels = diff.shape()[channel_axis];
    if channels != LUMA_COEFFS.len() {
        return Err(SrError::invalid_input(format!(
            "luminance psnr expects 3 channels, got {channels}"
        )));
    }
    let mut luma = ArrayD::zeros(diff.index_axis(Axis(channel_axis), 0).raw_dim());
    for (plane, coeff) in diff.axis_iter(Axis(channel_axis)).zip(LUMA_COEFFS) {
        luma.scaled_add(coeff / 256.0, &plane);
    }
    Ok(luma)
}
