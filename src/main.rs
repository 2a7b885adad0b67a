//! `exrpair` CLI - Convert EXR renders into input/target training records.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exrpair::{Config, ErrorPolicy, Preprocessor};

/// Convert directories of RGBA EXR files into `.pt` training records.
#[derive(Parser, Debug)]
#[command(name = "exrpair")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input directories, processed in the order given.
    #[arg(value_name = "INPUT_DIR", required = true)]
    input_dirs: Vec<PathBuf>,

    /// Output directory for the records. Created if missing.
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Offset subtracted from the B channel before flooring at zero.
    #[arg(short, long, default_value = "0.01", value_name = "FLOAT")]
    epsilon: f32,

    /// Skip files that fail to decode instead of stopping the batch.
    #[arg(long)]
    skip_errors: bool,

    /// Disable progress bars.
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("exrpair={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let config = Config {
        epsilon: args.epsilon,
        on_error: if args.skip_errors {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Halt
        },
        show_progress: !args.no_progress,
        ..Config::new(&args.input_dirs, &args.output)
    };

    let preprocessor = Preprocessor::new(config).context("Invalid configuration")?;

    let report = preprocessor
        .run()
        .context("Failed to preprocess EXR files")?;

    println!(
        "Successfully wrote {} records to {}",
        report.written.len(),
        args.output.display()
    );

    if !report.skipped.is_empty() {
        println!("Skipped {} files:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    Ok(())
}
