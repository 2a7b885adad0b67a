//! Floor-and-offset correction for the target's first channel.

use ndarray::ArrayViewMut2;

use crate::error::{Error, Result};

/// Shift every value down by `epsilon`, flooring the result at zero.
///
/// NaN samples stay NaN.
pub fn apply_correction(mut plane: ArrayViewMut2<'_, f32>, epsilon: f32) {
    plane.mapv_inplace(|value| floor_offset(value, epsilon));
}

/// Check that `epsilon` is a usable correction offset.
///
/// # Errors
///
/// Returns an error if `epsilon` is negative, NaN or infinite.
pub fn validate_epsilon(epsilon: f32) -> Result<()> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(Error::InvalidParameter {
            name: "epsilon".to_string(),
            reason: format!("must be a finite value >= 0.0, got {epsilon}"),
        });
    }

    Ok(())
}

#[inline]
fn floor_offset(value: f32, epsilon: f32) -> f32 {
    let shifted = value - epsilon;
    if shifted < 0.0 {
        0.0
    } else {
        shifted
    }
}
