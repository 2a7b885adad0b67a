//! Custom error types for exrpair.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the exrpair library.
#[derive(Error, Debug)]
pub enum Error {
    /// The source file is missing, unreadable or not a valid EXR container.
    #[error("failed to decode EXR file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: exr::error::Error,
    },

    /// A required channel is absent from the source file.
    #[error("EXR file {path} has no channel named {channel:?}")]
    MissingChannel { path: PathBuf, channel: &'static str },

    /// A decoded channel does not cover the declared data window.
    #[error("channel {channel:?} in {path} has {actual} samples, expected {expected}")]
    Shape {
        path: PathBuf,
        channel: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Failed to write a training record.
    #[error("failed to save record to {path}: {source}")]
    RecordSave {
        path: PathBuf,
        #[source]
        source: safetensors::SafeTensorError,
    },

    /// Failed to move a finished record into place.
    #[error("failed to write record to {path}: {source}")]
    RecordWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a training record from disk.
    #[error("failed to read record from {path}: {source}")]
    RecordRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a training record.
    #[error("failed to load record from {path}: {source}")]
    RecordLoad {
        path: PathBuf,
        #[source]
        source: safetensors::SafeTensorError,
    },

    /// A record parsed but does not hold a valid input/target pair.
    #[error("invalid record {path}: {reason}")]
    InvalidRecord { path: PathBuf, reason: String },

    /// Failed to list an input directory.
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the output directory.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is confined to a single source file.
    ///
    /// Decode and shape failures qualify; filesystem failures on the output
    /// side or while listing directories do not.
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::MissingChannel { .. } | Self::Shape { .. }
        )
    }
}

/// Result type alias for exrpair operations.
pub type Result<T> = std::result::Result<T, Error>;
