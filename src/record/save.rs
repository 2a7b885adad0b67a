//! Record saving utilities.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use safetensors::tensor::TensorView;
use safetensors::Dtype;

use crate::error::{Error, Result};
use crate::image::ChannelTensor;

use super::{TrainingPair, INPUT_KEY, TARGET_KEY};

/// Save a training pair as a record file.
///
/// Both tensors are stored as little-endian `F32` with their `(2, H, W)`
/// shapes. The record is first written next to `path` under a temporary
/// name and then renamed into place, so `path` never holds a partial record.
/// Saving the same pair twice produces identical bytes.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized or written.
pub fn save_pair<P: AsRef<Path>>(pair: &TrainingPair, path: P) -> Result<()> {
    let path = path.as_ref();

    let input_bytes = tensor_to_bytes(&pair.input);
    let target_bytes = tensor_to_bytes(&pair.target);

    let save_error = |source| Error::RecordSave {
        path: path.to_path_buf(),
        source,
    };

    let input = TensorView::new(Dtype::F32, pair.input.shape().to_vec(), &input_bytes)
        .map_err(save_error)?;
    let target = TensorView::new(Dtype::F32, pair.target.shape().to_vec(), &target_bytes)
        .map_err(save_error)?;

    // A single metadata entry keeps the header byte-stable across runs.
    let metadata = Some(HashMap::from([("format".to_string(), "pt".to_string())]));

    let temp_path = temp_path_for(path);
    let entries = [(INPUT_KEY, input), (TARGET_KEY, target)];
    if let Err(source) = safetensors::serialize_to_file(entries, &metadata, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(save_error(source));
    }

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::RecordWrite {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Flatten a tensor into little-endian bytes in logical (row-major) order.
fn tensor_to_bytes(tensor: &ChannelTensor) -> Vec<u8> {
    tensor.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Sibling path used while a record is being written.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn sample_pair() -> TrainingPair {
        #[allow(clippy::cast_precision_loss)]
        let input = Array3::from_shape_fn((2, 3, 4), |(c, y, x)| (c * 100 + y * 10 + x) as f32);
        let target = Array3::from_elem((2, 3, 4), 0.5);
        TrainingPair::new(input, target)
    }

    #[test]
    fn test_tensor_to_bytes_order() {
        let tensor = Array3::from_shape_vec((2, 1, 1), vec![1.0_f32, 2.0]).unwrap();

        let bytes = tensor_to_bytes(&tensor);

        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0_f32.to_le_bytes());
        assert_eq!(&bytes[4..], &2.0_f32.to_le_bytes());
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("out/scene_001.pt")),
            PathBuf::from("out/scene_001.pt.tmp")
        );
    }

    #[test]
    fn test_save_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.pt");
        let second = dir.path().join("second.pt");
        let pair = sample_pair();

        save_pair(&pair, &first).unwrap();
        save_pair(&pair, &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.pt");

        save_pair(&sample_pair(), &path).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("scene.pt")]);
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("scene.pt");

        assert!(save_pair(&sample_pair(), &path).is_err());
    }

    #[test]
    fn test_rename_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.pt");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"").unwrap();

        let err = save_pair(&sample_pair(), &path).unwrap_err();

        assert!(matches!(&err, Error::RecordWrite { path: p, .. } if *p == path));
        assert!(err.to_string().contains("scene.pt"));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("scene.pt")]);
    }
}
