//! Record loading utilities.

use std::fs;
use std::path::Path;

use ndarray::Array3;
use safetensors::{Dtype, SafeTensors};

use crate::error::{Error, Result};
use crate::image::ChannelTensor;

use super::{TrainingPair, INPUT_KEY, TARGET_KEY};

/// Load a training pair from a record file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if it does not
/// hold exactly the `input` and `target` entries, or if either entry is not
/// a `(2, H, W)` `F32` tensor of the same shape as the other.
pub fn load_pair<P: AsRef<Path>>(path: P) -> Result<TrainingPair> {
    let path = path.as_ref();
    let buffer = fs::read(path).map_err(|source| Error::RecordRead {
        path: path.to_path_buf(),
        source,
    })?;

    let tensors = SafeTensors::deserialize(&buffer).map_err(|source| Error::RecordLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let mut names: Vec<&str> = tensors.names().into_iter().map(String::as_str).collect();
    names.sort_unstable();
    if names != [INPUT_KEY, TARGET_KEY] {
        return Err(invalid(path, format!("expected entries [input, target], found {names:?}")));
    }

    let input = read_tensor(&tensors, INPUT_KEY, path)?;
    let target = read_tensor(&tensors, TARGET_KEY, path)?;

    if input.shape() != target.shape() {
        return Err(invalid(
            path,
            format!(
                "input shape {:?} does not match target shape {:?}",
                input.shape(),
                target.shape()
            ),
        ));
    }

    Ok(TrainingPair::new(input, target))
}

fn read_tensor(tensors: &SafeTensors<'_>, key: &str, path: &Path) -> Result<ChannelTensor> {
    let view = tensors.tensor(key).map_err(|source| Error::RecordLoad {
        path: path.to_path_buf(),
        source,
    })?;

    if view.dtype() != Dtype::F32 {
        return Err(invalid(path, format!("{key} has dtype {:?}, expected F32", view.dtype())));
    }

    let &[channels, height, width] = view.shape() else {
        let shape = view.shape();
        return Err(invalid(path, format!("{key} has shape {shape:?}, expected [2, H, W]")));
    };
    if channels != 2 {
        return Err(invalid(path, format!("{key} has {channels} channels, expected 2")));
    }

    let data = view
        .data()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Array3::from_shape_vec((channels, height, width), data)
        .map_err(|err| invalid(path, format!("{key}: {err}")))
}

fn invalid(path: &Path, reason: String) -> Error {
    Error::InvalidRecord {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::record::save_pair;
    use safetensors::tensor::TensorView;

    fn write_raw(path: &Path, entries: &[(&str, Vec<usize>)]) {
        let buffers: Vec<Vec<u8>> = entries
            .iter()
            .map(|(_, shape)| vec![0u8; shape.iter().product::<usize>() * 4])
            .collect();
        let views: Vec<(&str, TensorView<'_>)> = entries
            .iter()
            .zip(&buffers)
            .map(|((name, shape), bytes)| {
                (*name, TensorView::new(Dtype::F32, shape.clone(), bytes).unwrap())
            })
            .collect();
        safetensors::serialize_to_file(views, &None::<HashMap<String, String>>, path).unwrap();
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.pt");
        #[allow(clippy::cast_precision_loss)]
        let input = Array3::from_shape_fn((2, 2, 3), |(c, y, x)| (c + y * 3 + x) as f32);
        #[allow(clippy::cast_precision_loss)]
        let target = Array3::from_shape_fn((2, 2, 3), |(c, _, x)| {
            if c == 0 {
                0.0
            } else {
                0.5 * x as f32
            }
        });
        let pair = TrainingPair::new(input, target);

        save_pair(&pair, &path).unwrap();
        let loaded = load_pair(&path).unwrap();

        assert_eq!(loaded, pair);
        assert_eq!(loaded.dims(), (2, 3));
    }

    #[test]
    fn test_rejects_extra_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.pt");
        write_raw(
            &path,
            &[
                ("input", vec![2, 1, 1]),
                ("target", vec![2, 1, 1]),
                ("mask", vec![2, 1, 1]),
            ],
        );

        assert!(matches!(load_pair(&path), Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn test_rejects_wrong_channel_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pt");
        write_raw(&path, &[("input", vec![3, 1, 1]), ("target", vec![3, 1, 1])]);

        assert!(matches!(load_pair(&path), Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn test_rejects_mismatched_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mismatch.pt");
        write_raw(&path, &[("input", vec![2, 2, 2]), ("target", vec![2, 1, 4])]);

        assert!(matches!(load_pair(&path), Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn test_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.pt");
        fs::write(&path, b"xx").unwrap();

        assert!(matches!(load_pair(&path), Err(Error::RecordLoad { .. })));
    }

    #[test]
    fn test_missing_record_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.pt");

        let err = load_pair(&path).unwrap_err();

        assert!(matches!(&err, Error::RecordRead { path: p, .. } if *p == path));
        assert!(err.to_string().contains("absent.pt"));
    }
}
