//! Source file discovery and output naming.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::image::SOURCE_EXTENSION;
use crate::record::RECORD_EXTENSION;

/// List the source images directly inside `dir`, sorted by file name.
///
/// A source image is a regular file whose name ends with `.exr`, matched
/// case-sensitively. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns an error if the directory or one of its entries cannot be read.
pub fn list_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir_error = |source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let name = entry.file_name();

        if !name.to_string_lossy().ends_with(SOURCE_EXTENSION) {
            continue;
        }

        let path = entry.path();
        if !path.is_file() {
            tracing::debug!("Ignoring non-file entry {}", path.display());
            continue;
        }

        files.push((name, path));
    }

    files.sort_by(|(a, _), (b, _)| a.cmp(b));

    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Path of the record written for `source` inside `output_dir`.
///
/// The trailing `.exr` of the file name is replaced by `.pt`.
#[must_use]
pub fn record_path(source: &Path, output_dir: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(SOURCE_EXTENSION).unwrap_or(&name);

    output_dir.join(format!("{stem}{RECORD_EXTENSION}"))
}
