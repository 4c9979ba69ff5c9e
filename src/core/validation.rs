//! Shared argument validation helpers.
//!
//! Each helper returns an [`SrError`] describing the offending argument so that
//! callers can propagate it with `?`.

use crate::core::errors::SrError;

/// Ensures `value` is strictly positive.
pub fn validate_positive<T>(value: T, name: &str) -> Result<(), SrError>
where
    T: PartialOrd + Default + std::fmt::Display + Copy,
{
    if value <= T::default() {
        return Err(SrError::invalid_input(format!(
            "{name} must be greater than 0, got {value}"
        )));
    }
    Ok(())
}

/// Ensures two slices have the same length.
pub fn validate_same_length<A, B>(
    a: &[A],
    b: &[B],
    name_a: &str,
    name_b: &str,
) -> Result<(), SrError> {
    if a.len() != b.len() {
        return Err(SrError::invalid_input(format!(
            "{name_a} and {name_b} must have the same length, got {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Ensures two tensor shapes are identical.
pub fn validate_same_shape(
    expected: &[usize],
    actual: &[usize],
    operation: &str,
) -> Result<(), SrError> {
    if expected != actual {
        return Err(SrError::tensor_shape_mismatch(operation, expected, actual));
    }
    Ok(())
}
