//! Affine value normalization.
//!
//! This module maps tensors between value ranges, most commonly between the
//! `[-1, 1]` range used by generator outputs and the `[0, 1]` range of images.

use ndarray::{Array, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

use crate::core::errors::SrError;

/// Affine remap parameters.
///
/// The forward direction computes `value * mul + add`, the reverse direction
/// `(value + add) * mul`. The defaults (`mul = 0.5`, `add = 0.5`) map `[-1, 1]`
/// onto `[0, 1]`; [`Normalize::inverse`] yields the parameters whose reverse
/// direction undoes this forward direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalize {
    /// Multiplicative factor.
    pub mul: f32,
    /// Additive offset.
    pub add: f32,
}

impl Default for Normalize {
    fn default() -> Self {
        Self { mul: 0.5, add: 0.5 }
    }
}

impl Normalize {
    /// Creates a normalizer with the given factor and offset.
    pub fn new(mul: f32, add: f32) -> Result<Self, SrError> {
        if !mul.is_finite() || !add.is_finite() {
            return Err(SrError::ConfigError {
                message: format!("mul and add must be finite, got mul={mul}, add={add}"),
            });
        }
        Ok(Self { mul, add })
    }

    /// Parameters whose reverse direction undoes this forward direction.
    ///
    /// # Errors
    ///
    /// Returns an error if `mul` is zero.
    pub fn inverse(&self) -> Result<Self, SrError> {
        if self.mul == 0.0 {
            return Err(SrError::ConfigError {
                message: "cannot invert a normalization with mul = 0".to_string(),
            });
        }
        Ok(Self {
            mul: 1.0 / self.mul,
            add: -self.add,
        })
    }

    /// Applies `value * mul + add` to a scalar.
    pub fn forward_value(&self, value: f32) -> f32 {
        value * self.mul + self.add
    }

    /// Applies `(value + add) * mul` to a scalar.
    pub fn reverse_value(&self, value: f32) -> f32 {
        (value + self.add) * self.mul
    }

    /// Applies the forward direction elementwise.
    pub fn forward<S, D>(&self, input: &ArrayBase<S, D>) -> Array<f32, D>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        input.mapv(|v| self.forward_value(v))
    }

    /// Applies the reverse direction elementwise.
    pub fn reverse<S, D>(&self, input: &ArrayBase<S, D>) -> Array<f32, D>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        input.mapv(|v| self.reverse_value(v))
    }

    /// Maps every input with the same parameters, preserving order.
    pub fn apply_all<S, D>(&self, inputs: &[ArrayBase<S, D>], reverse: bool) -> Vec<Array<f32, D>>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        inputs
            .iter()
            .map(|input| {
                if reverse {
                    self.reverse(input)
                } else {
                    self.forward(input)
                }
            })
            .collect()
    }
}
