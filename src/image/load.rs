//! EXR decoding utilities.

use std::path::{Path, PathBuf};

use exr::prelude::*;
use ndarray::Array3;

use crate::error::{Error, Result};

use super::ChannelTensor;

/// Named channel planes decoded from one EXR file.
///
/// Each plane holds `width * height` samples in row-major order, top row
/// first.
#[derive(Debug, Clone)]
pub struct ChannelPlanes {
    path: PathBuf,
    /// Data window width.
    pub width: usize,
    /// Data window height.
    pub height: usize,
    planes: Vec<(&'static str, Vec<f32>)>,
}

impl ChannelPlanes {
    /// Samples of the named channel, if it was decoded.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.planes
            .iter()
            .find(|(plane, _)| *plane == name)
            .map(|(_, samples)| samples.as_slice())
    }

    /// Stack two named planes into a `(2, height, width)` tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if either plane was not decoded or does not hold
    /// exactly `width * height` samples.
    pub fn stack(&self, names: [&'static str; 2]) -> Result<ChannelTensor> {
        let plane_len = self.width * self.height;
        let mut data = Vec::with_capacity(2 * plane_len);

        for name in names {
            let samples = self.get(name).ok_or_else(|| Error::MissingChannel {
                path: self.path.clone(),
                channel: name,
            })?;
            check_plane_len(&self.path, name, samples, plane_len)?;
            data.extend_from_slice(samples);
        }

        let actual = data.len();
        Array3::from_shape_vec((2, self.height, self.width), data).map_err(|_| Error::Shape {
            path: self.path.clone(),
            channel: names[0],
            expected: 2 * plane_len,
            actual,
        })
    }
}

/// Decode the named channels of an EXR file.
///
/// Reads the first valid layer at its largest resolution level. Width and
/// height come from the layer's data window. Half-float and integer samples
/// are widened to `f32`.
///
/// # Errors
///
/// Returns an error if the file cannot be decoded, if a requested channel is
/// missing, or if a channel's sample count differs from the data window area.
pub fn read_channels(path: &Path, names: &[&'static str]) -> Result<ChannelPlanes> {
    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_file(path)
        .map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let layer = image.layer_data;
    let width = layer.size.width();
    let height = layer.size.height();

    tracing::debug!(
        "Decoded {} ({width}x{height} at {:?}, {} channels)",
        path.display(),
        layer.attributes.layer_position,
        layer.channel_data.list.len()
    );

    let mut channels = layer.channel_data.list.into_vec();
    let mut planes = Vec::with_capacity(names.len());

    for &name in names {
        let index = channels
            .iter()
            .position(|channel| channel.name.eq(name))
            .ok_or_else(|| Error::MissingChannel {
                path: path.to_path_buf(),
                channel: name,
            })?;

        let samples = samples_to_f32(channels.swap_remove(index).sample_data);

        check_plane_len(path, name, &samples, width * height)?;

        planes.push((name, samples));
    }

    Ok(ChannelPlanes {
        path: path.to_path_buf(),
        width,
        height,
        planes,
    })
}

/// Reject a plane whose sample count differs from the data window area.
fn check_plane_len(
    path: &Path,
    channel: &'static str,
    samples: &[f32],
    expected: usize,
) -> Result<()> {
    if samples.len() != expected {
        return Err(Error::Shape {
            path: path.to_path_buf(),
            channel,
            expected,
            actual: samples.len(),
        });
    }

    Ok(())
}

/// Widen flat samples to `f32`.
#[allow(clippy::cast_precision_loss)]
fn samples_to_f32(samples: FlatSamples) -> Vec<f32> {
    match samples {
        FlatSamples::F16(values) => values.into_iter().map(f16::to_f32).collect(),
        FlatSamples::F32(values) => values,
        FlatSamples::U32(values) => values.into_iter().map(|v| v as f32).collect(),
    }
}
