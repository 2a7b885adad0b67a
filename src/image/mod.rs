//! EXR channel extraction and correction.

mod correct;
mod load;

pub use correct::{apply_correction, validate_epsilon};
pub use load::{read_channels, ChannelPlanes};

use std::path::Path;

use ndarray::{Array3, Axis};

use crate::error::Result;

/// Channel stack in CHW format (channels, height, width).
/// Always holds exactly two channels.
pub type ChannelTensor = Array3<f32>;

/// Network input: R and G planes, in that order.
pub type InputTensor = ChannelTensor;

/// Network target: corrected B plane followed by the raw A plane.
pub type TargetTensor = ChannelTensor;

/// File suffix recognized as a source image.
pub const SOURCE_EXTENSION: &str = ".exr";

/// Default offset subtracted from the first target channel.
pub const DEFAULT_EPSILON: f32 = 0.01;

/// Channels stacked into the input tensor.
pub const INPUT_CHANNELS: [&str; 2] = ["R", "G"];

/// Channels stacked into the target tensor.
pub const TARGET_CHANNELS: [&str; 2] = ["B", "A"];

/// Every channel a source file must provide.
pub const REQUIRED_CHANNELS: [&str; 4] = ["R", "G", "B", "A"];

/// Extract the input and target tensors from an EXR file.
///
/// The file's R and G channels become the input tensor, B and A the target
/// tensor, both shaped `(2, height, width)`. The first target channel is
/// then shifted down by `epsilon` and floored at zero; the second is left
/// untouched.
///
/// # Errors
///
/// Returns an error if `epsilon` is negative or not finite, if the file
/// cannot be decoded, if a required channel is missing, or if a channel does
/// not match the declared data window.
pub fn extract<P: AsRef<Path>>(path: P, epsilon: f32) -> Result<(InputTensor, TargetTensor)> {
    validate_epsilon(epsilon)?;

    let planes = read_channels(path.as_ref(), &REQUIRED_CHANNELS)?;

    let input = planes.stack(INPUT_CHANNELS)?;
    let mut target = planes.stack(TARGET_CHANNELS)?;

    apply_correction(target.index_axis_mut(Axis(0), 0), epsilon);

    Ok((input, target))
}
