//! SSVEP Evaluation Application
//!
//! Command-line entry point for the offline SSVEP evaluation.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate all configured subjects with the study defaults
//! ssvep --config study.json evaluate
//!
//! # Offline criterion, non-overlapping windows, two window lengths
//! ssvep evaluate --criterion offline --segmenting nooverlap --window-lengths 2,4
//!
//! # Write a synthetic protocol-following recording
//! ssvep synth --output synthetic.csv
//!
//! # Print the effective configuration
//! ssvep show-config
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ssvep_core::{Criterion, Method, Segmenting};
use ssvep_native::{Evaluation, EvaluationConfig, SyntheticRecording};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// SSVEP Evaluation Application
#[derive(Parser, Debug)]
#[command(name = "ssvep")]
#[command(author, version, about = "Offline SSVEP classifier evaluation", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON configuration file (missing fields use the defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the evaluation and write one report per window length
    Evaluate {
        /// Directory holding the recordings
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory receiving the reports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Window lengths in seconds, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        window_lengths: Option<Vec<f64>>,

        /// Window segmenting: sliding or nooverlap
        #[arg(long)]
        segmenting: Option<Segmenting>,

        /// Decision criterion: offline or pseudoon
        #[arg(long)]
        criterion: Option<Criterion>,

        /// Classification method: cca or psda
        #[arg(short, long)]
        method: Option<Method>,
    },

    /// Generate a synthetic recording following the configured protocol
    Synth {
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Amplitude of the evoked response
        #[arg(long, default_value = "1.0")]
        amplitude: f64,

        /// Scale of the background activity
        #[arg(long, default_value = "0.5")]
        noise: f64,
    },

    /// Print the effective configuration as JSON
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("SSVEP evaluation v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            EvaluationConfig::load(path)?
        }
        None => EvaluationConfig::default(),
    };

    match cli.command {
        Commands::Evaluate {
            data_dir,
            output_dir,
            window_lengths,
            segmenting,
            criterion,
            method,
        } => {
            let mut config = config;
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(lengths) = window_lengths {
                config.window_lengths_s = lengths;
            }
            if let Some(segmenting) = segmenting {
                config.segmenting = segmenting;
            }
            if let Some(criterion) = criterion {
                config.criterion = criterion;
            }
            if let Some(method) = method {
                config.method = method;
            }
            run_evaluation(config)?;
        }
        Commands::Synth { output, amplitude, noise } => {
            run_synth(&config, &output, amplitude, noise)?;
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Run the batch evaluation
fn run_evaluation(config: EvaluationConfig) -> anyhow::Result<()> {
    if config.subjects.is_empty() {
        warn!("No subjects configured; pass --config with a \"subjects\" list");
    }

    info!(
        "Method {} / {} / {} on {} subject(s)",
        config.method.label(),
        config.segmenting.name(),
        config.criterion.name(),
        config.subjects.len()
    );

    let reports = Evaluation::new(config)?.run()?;
    for report in &reports {
        info!("{} s: {} rows -> {}", report.window_s, report.rows.len(), report.path.display());
    }

    Ok(())
}

/// Write a synthetic recording
fn run_synth(
    config: &EvaluationConfig,
    output: &std::path::Path,
    amplitude: f64,
    noise: f64,
) -> anyhow::Result<()> {
    let generator = SyntheticRecording::new(config, amplitude, noise);
    info!(
        "Generating {:.0} s of synthetic data ({} channels at {} Hz)",
        generator.duration_s(),
        config.montage.len(),
        config.sample_rate_hz
    );

    let recording = generator.generate()?;
    recording.write_csv(output)?;

    info!("Wrote {} ({} samples)", output.display(), recording.samples());
    Ok(())
}
