//! EXR fixture writers shared by the unit tests.

use std::path::Path;

use exr::prelude::*;
use smallvec::SmallVec;

/// Write a single-layer EXR file with `f32` channels at the origin.
pub fn write_exr(path: &Path, width: usize, height: usize, channels: &[(&str, Vec<f32>)]) {
    write_exr_at(path, (0, 0), width, height, channels);
}

/// Write a single-layer EXR file whose data window starts at `position`.
pub fn write_exr_at(
    path: &Path,
    position: (i32, i32),
    width: usize,
    height: usize,
    channels: &[(&str, Vec<f32>)],
) {
    let list = channels
        .iter()
        .map(|(name, values)| AnyChannel::new(*name, FlatSamples::F32(values.clone())))
        .collect();

    write_layer(path, position, width, height, list);
}

/// Write a single-layer EXR file with half-float channels.
pub fn write_exr_f16(path: &Path, width: usize, height: usize, channels: &[(&str, Vec<f32>)]) {
    let list = channels
        .iter()
        .map(|(name, values)| {
            let halves = values.iter().copied().map(f16::from_f32).collect();
            AnyChannel::new(*name, FlatSamples::F16(halves))
        })
        .collect();

    write_layer(path, (0, 0), width, height, list);
}

/// Write an RGBA file with distinct, deterministic values in every channel.
#[allow(clippy::cast_precision_loss)]
pub fn write_rgba(path: &Path, width: usize, height: usize) {
    let n = width * height;
    let plane = |scale: f32, offset: f32| {
        (0..n)
            .map(|i| (i as f32).mul_add(scale, offset))
            .collect::<Vec<_>>()
    };

    write_exr(
        path,
        width,
        height,
        &[
            ("R", plane(1.0, 0.0)),
            ("G", plane(1.0, 1000.0)),
            ("B", plane(0.001, 0.0)),
            ("A", plane(0.0, 1.0)),
        ],
    );
}

fn write_layer(
    path: &Path,
    position: (i32, i32),
    width: usize,
    height: usize,
    list: SmallVec<[AnyChannel<FlatSamples>; 4]>,
) {
    let mut attributes = LayerAttributes::named("fixture");
    attributes.layer_position = Vec2(position.0, position.1);

    let layer = Layer::new(
        (width, height),
        attributes,
        Encoding::FAST_LOSSLESS,
        AnyChannels::sort(list),
    );

    Image::from_layer(layer)
        .write()
        .to_file(path)
        .expect("write EXR fixture");
}
