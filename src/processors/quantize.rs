//! Pixel quantization to the 8-bit grid.

use ndarray::{Array, ArrayView, Dimension, Zip};

use crate::core::errors::SrError;
use crate::processors::types::QuantizeMode;

fn pixel_range(rgb_range: f32) -> Result<f32, SrError> {
    if !(rgb_range.is_finite() && rgb_range > 0.0) {
        return Err(SrError::invalid_input(format!(
            "rgb_range must be a positive finite number, got {rgb_range}"
        )));
    }
    Ok(255.0 / rgb_range)
}

/// Snaps values in `[0, rgb_range]` to the nearest of the 256 levels of an 8-bit
/// image, clamping anything outside the range. Exact halves round to the even
/// level.
///
/// In [`QuantizeMode::StraightThrough`] the result is computed as
/// `img + (quantized - img)`. The forward value is the quantized image; an
/// autodiff engine consuming [`quantize_residual`] can hold the residual constant
/// so that gradients pass through as if quantization were the identity.
pub fn quantize<D: Dimension>(
    img: ArrayView<f32, D>,
    rgb_range: f32,
    mode: QuantizeMode,
) -> Result<Array<f32, D>, SrError> {
    let range = pixel_range(rgb_range)?;
    let snap = move |v: f32| (v * range).clamp(0.0, 255.0).round_ties_even() / range;
    match mode {
        QuantizeMode::Hard => Ok(img.mapv(snap)),
        QuantizeMode::StraightThrough => {
            let residual = img.mapv(|v| snap(v) - v);
            let mut out = img.to_owned();
            out += &residual;
            Ok(out)
        }
    }
}

/// Returns `quantized - img`, the term that is detached from the gradient graph
/// in straight-through quantization.
pub fn quantize_residual<D: Dimension>(
    img: ArrayView<f32, D>,
    rgb_range: f32,
) -> Result<Array<f32, D>, SrError> {
    let quantized = quantize(img.view(), rgb_range, QuantizeMode::Hard)?;
    let mut residual = quantized;
    Zip::from(&mut residual)
        .and(&img)
        .for_each(|r, &v| *r -= v);
    Ok(residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};

    #[test]
    fn test_hard_quantization_lands_on_grid() {
        let img = Array1::linspace(-0.2, 1.2, 97);
        let out = quantize(img.view(), 1.0, QuantizeMode::Hard).unwrap();
        for &v in out.iter() {
            assert!((0.0..=1.0).contains(&v));
            let level = v * 255.0;
            assert_abs_diff_eq!(level, level.round(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_hard_quantization_clamps() {
        let img = array![-1.0f32, 0.4, 300.0];
        let out = quantize(img.view(), 255.0, QuantizeMode::Hard).unwrap();
        assert_eq!(out, array![0.0f32, 0.0, 255.0]);
    }

    #[test]
    fn test_halves_round_to_even_level() {
        let img = array![0.5f32, 1.5, 2.5, 253.5];
        let out = quantize(img.view(), 255.0, QuantizeMode::Hard).unwrap();
        assert_eq!(out, array![0.0f32, 2.0, 2.0, 254.0]);

        let ste = quantize(img.view(), 255.0, QuantizeMode::StraightThrough).unwrap();
        assert_eq!(ste, out);
    }

    #[test]
    fn test_straight_through_matches_hard_forward() {
        let img = array![[0.1234f32, 0.9], [0.4999, 0.75]];
        let hard = quantize(img.view(), 1.0, QuantizeMode::Hard).unwrap();
        let ste = quantize(img.view(), 1.0, QuantizeMode::StraightThrough).unwrap();
        for (a, b) in hard.iter().zip(ste.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_residual_is_quantized_minus_input() {
        let img = array![0.3f32, 0.0, 1.0];
        let residual = quantize_residual(img.view(), 1.0).unwrap();
        let hard = quantize(img.view(), 1.0, QuantizeMode::Hard).unwrap();
        for ((r, h), v) in residual.iter().zip(hard.iter()).zip(img.iter()) {
            assert_abs_diff_eq!(*r, h - v, epsilon = 1e-7);
        }
        assert_eq!(residual[1], 0.0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let img = array![0.5f32];
        assert!(quantize(img.view(), 0.0, QuantizeMode::Hard).is_err());
        assert!(quantize_residual(img.view(), f32::NAN).is_err());
    }
}
