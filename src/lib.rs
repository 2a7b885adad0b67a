//! # exrpair
//!
//! Converts directories of RGBA `OpenEXR` renders into paired training records.
//!
//! Every source image yields one record holding two `(2, height, width)` `f32`
//! tensors: `input` stacks the R and G channels, `target` stacks the B and A
//! channels. The first target channel is shifted down by a small epsilon and
//! floored at zero to cancel the renderer's floating-point bias.
//!
//! ## Example
//!
//! ```no_run
//! use exrpair::{Config, ErrorPolicy, Preprocessor};
//!
//! # fn main() -> exrpair::Result<()> {
//! let config = Config {
//!     on_error: ErrorPolicy::Skip,
//!     ..Config::new(["data_noise_a", "data_noise_b"], "processed_data_noise_all")
//! };
//!
//! let report = Preprocessor::new(config)?.run()?;
//! println!("{} records written", report.written.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod pipeline;
pub mod record;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use image::extract;
pub use pipeline::{run, BatchReport, Config, ErrorPolicy, Preprocessor};
pub use record::{load_pair, save_pair, TrainingPair};
