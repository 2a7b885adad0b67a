//! Batch conversion of EXR directories into training records.

mod batch;
mod discover;

pub use batch::{run, BatchReport, Config, ErrorPolicy, Preprocessor, SkippedFile};
pub use discover::{list_sources, record_path};
