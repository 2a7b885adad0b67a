//! Directory batch driver.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};
use crate::image::{self, DEFAULT_EPSILON};
use crate::record::{self, TrainingPair};

use super::discover::{list_sources, record_path};

/// What to do when a source file cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the batch at the first failing file.
    #[default]
    Halt,
    /// Log the failing file, record it in the report and continue.
    ///
    /// Only decode and shape failures are skipped. Filesystem errors always
    /// stop the batch.
    Skip,
}

/// Configuration for a preprocessing batch.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directories scanned for `.exr` files, processed in this order.
    pub input_dirs: Vec<PathBuf>,

    /// Directory receiving one `.pt` record per source file.
    pub output_dir: PathBuf,

    /// Offset subtracted from the first target channel before flooring at zero.
    pub epsilon: f32,

    /// Failure handling for individual source files.
    pub on_error: ErrorPolicy,

    /// Whether to draw a progress bar per input directory.
    pub show_progress: bool,
}

impl Config {
    /// Create a configuration with default epsilon, halting on errors.
    #[must_use]
    pub fn new<I, P>(input_dirs: I, output_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            input_dirs: input_dirs.into_iter().map(Into::into).collect(),
            output_dir: output_dir.into(),
            epsilon: DEFAULT_EPSILON,
            on_error: ErrorPolicy::Halt,
            show_progress: false,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.input_dirs.is_empty() {
            return Err(Error::InvalidParameter {
                name: "input_dirs".to_string(),
                reason: "at least one input directory is required".to_string(),
            });
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::InvalidParameter {
                name: "output_dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        image::validate_epsilon(self.epsilon)
    }
}

/// A source file left out of the batch under [`ErrorPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// The source image.
    pub path: PathBuf,
    /// Rendered error that caused the skip.
    pub reason: String,
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records written, in processing order.
    pub written: Vec<PathBuf>,
    /// Source files skipped, in processing order.
    pub skipped: Vec<SkippedFile>,
}

/// Converts directories of EXR renders into training records.
pub struct Preprocessor {
    config: Config,
}

impl Preprocessor {
    /// Create a new preprocessor with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::debug!("Initializing preprocessor with config: {config:?}");

        Ok(Self { config })
    }

    /// The configuration this preprocessor runs with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Convert a single EXR file into a record at `output_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or saving fails.
    pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        output_path: Q,
    ) -> Result<()> {
        let source = source.as_ref();
        let output_path = output_path.as_ref();

        let (input, target) = image::extract(source, self.config.epsilon)?;
        let pair = TrainingPair::new(input, target);

        record::save_pair(&pair, output_path)?;

        let (height, width) = pair.dims();
        tracing::debug!(
            "Wrote {} ({width}x{height}) from {}",
            output_path.display(),
            source.display()
        );

        Ok(())
    }

    /// Process every input directory in order.
    ///
    /// The output directory and its parents are created if missing. Files in
    /// each directory are processed in file name order.
    ///
    /// # Errors
    ///
    /// Returns the first error under [`ErrorPolicy::Halt`]. Under
    /// [`ErrorPolicy::Skip`] only filesystem errors are returned.
    pub fn run(&self) -> Result<BatchReport> {
        let output_dir = &self.config.output_dir;

        fs::create_dir_all(output_dir).map_err(|source| Error::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        let mut report = BatchReport::default();

        for input_dir in &self.config.input_dirs {
            self.run_directory(input_dir, &mut report)?;
        }

        tracing::info!(
            "Wrote {} records to {} ({} skipped)",
            report.written.len(),
            output_dir.display(),
            report.skipped.len()
        );

        Ok(report)
    }

    fn run_directory(&self, input_dir: &Path, report: &mut BatchReport) -> Result<()> {
        let files = list_sources(input_dir)?;

        tracing::info!("Found {} EXR files in {}", files.len(), input_dir.display());

        let pb = self.progress_bar(files.len() as u64, input_dir);

        for source in &files {
            let output_path = record_path(source, &self.config.output_dir);

            match self.process_file(source, &output_path) {
                Ok(()) => report.written.push(output_path),
                Err(err) if self.config.on_error == ErrorPolicy::Skip && err.is_source_error() => {
                    pb.suspend(|| tracing::warn!("Skipping {}: {err}", source.display()));
                    report.skipped.push(SkippedFile {
                        path: source.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    pb.abandon();
                    return Err(err);
                }
            }

            pb.inc(1);
        }

        pb.finish();
        Ok(())
    }

    fn progress_bar(&self, len: u64, input_dir: &Path) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .expect("valid template")
                .progress_chars("#>-"),
        );
        pb.set_message(format!("Processing {}", input_dir.display()));
        pb
    }
}

/// Convert every `.exr` file in `input_dirs` into a record in `output_dir`.
///
/// Uses [`ErrorPolicy::Halt`] and no progress display.
///
/// # Errors
///
/// Returns the first error encountered.
pub fn run<I, P>(input_dirs: I, output_dir: impl Into<PathBuf>, epsilon: f32) -> Result<BatchReport>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let config = Config {
        epsilon,
        ..Config::new(input_dirs, output_dir)
    };

    Preprocessor::new(config)?.run()
}
