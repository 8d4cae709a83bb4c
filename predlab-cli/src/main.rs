//! PredLab CLI — validate a prediction corpus before it is consumed downstream.
//!
//! Commands:
//! - `validate` — scan a data directory, write the reports, gate on success rate
//! - `check` — validate a single file and print its result as JSON
//! - `config` — print the default configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use predlab_core::FileValidator;
use predlab_runner::{
    passes_gate, ready_for_release, scan_corpus, ReportEmitter, ValidatorConfig,
};

#[derive(Parser)]
#[command(
    name = "predlab",
    about = "PredLab CLI — prediction corpus validator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every prediction file in a directory and write the reports.
    Validate {
        /// Directory holding `<TICKER>_ohlcv_prediction.json` files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory for the JSON, text, and CSV reports.
        #[arg(long, default_value = "reports")]
        reports_dir: PathBuf,

        /// Worker threads (0 = one per CPU core).
        #[arg(long)]
        workers: Option<usize>,

        /// Exit non-zero when the success rate is below this percentage.
        #[arg(long)]
        min_success_rate: Option<f64>,

        /// Path to a TOML config file. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check every candle and Monte Carlo path instead of sampling.
        #[arg(long, default_value_t = false)]
        full_scan: bool,

        /// Candles and Monte Carlo paths sampled per file.
        #[arg(long)]
        sample_size: Option<usize>,

        /// Validate at most this many files, in file-name order.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Validate a single file and print its result as JSON.
    Check {
        /// Path to a prediction file.
        file: PathBuf,

        /// Check every candle and Monte Carlo path instead of sampling.
        #[arg(long, default_value_t = false)]
        full_scan: bool,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Validate {
            data_dir,
            reports_dir,
            workers,
            min_success_rate,
            config,
            full_scan,
            sample_size,
            limit,
        } => {
            let overrides = Overrides {
                workers,
                min_success_rate,
                full_scan,
                sample_size,
                limit,
            };
            run_validate(&data_dir, &reports_dir, config.as_deref(), overrides)
        }
        Commands::Check { file, full_scan } => run_check(&file, full_scan),
        Commands::Config => run_print_config(),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

/// Command-line values that take precedence over the config file.
struct Overrides {
    workers: Option<usize>,
    min_success_rate: Option<f64>,
    full_scan: bool,
    sample_size: Option<usize>,
    limit: Option<usize>,
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<ValidatorConfig> {
    let mut config = match path {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ValidatorConfig::default(),
    };

    if let Some(workers) = overrides.workers {
        config.scan.workers = workers;
    }
    if let Some(rate) = overrides.min_success_rate {
        config.gate.min_success_rate = rate;
    }
    if overrides.full_scan {
        config.pipeline.full_scan = true;
    }
    if let Some(n) = overrides.sample_size {
        config.pipeline.candle_sample = n;
        config.pipeline.monte_carlo_sample = n;
    }
    if overrides.limit.is_some() {
        config.scan.limit = overrides.limit;
    }
    config.validate().context("Invalid command-line overrides")?;
    tracing::debug!(?config, "effective configuration");
    Ok(config)
}

/// Returns whether the corpus cleared the gate.
fn run_validate(
    data_dir: &Path,
    reports_dir: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
) -> Result<bool> {
    let config = load_config(config_path, overrides)?;
    let output = scan_corpus(data_dir, &config, None, None)
        .with_context(|| format!("Failed to scan {}", data_dir.display()))?;
    let report = &output.report;

    let paths = ReportEmitter::new(reports_dir)?.emit(report, &output.results, &config.gate)?;

    println!(
        "Validated {} files: {} valid, {} invalid ({:.2}% success)",
        report.total_files, report.valid_files, report.invalid_files, report.success_rate
    );
    if ready_for_release(report, &config.gate) {
        println!("Corpus is READY for downstream consumption");
    } else {
        println!("Corpus is NOT READY for downstream consumption");
    }
    println!("Report:  {}", paths.report_json.display());
    println!("Summary: {}", paths.summary_txt.display());
    println!("Files:   {}", paths.file_table.display());

    let passed = passes_gate(report, &config.gate);
    if !passed {
        tracing::error!(
            valid = report.valid_files,
            total = report.total_files,
            min_success_rate = config.gate.min_success_rate,
            cancelled = report.cancelled,
            "corpus failed the release gate"
        );
    }
    Ok(passed)
}

/// Returns whether the file is valid.
fn run_check(file: &Path, full_scan: bool) -> Result<bool> {
    let mut config = ValidatorConfig::default();
    config.pipeline.full_scan = full_scan;
    let outcome = FileValidator::new(config.validation_policy()).validate_path(file);
    if !outcome.result.valid {
        tracing::warn!(
            file = %file.display(),
            errors = outcome.result.errors.len(),
            "file failed validation"
        );
    }

    let json = serde_json::to_string_pretty(&outcome.result)
        .context("Failed to serialize file result")?;
    println!("{json}");
    Ok(outcome.result.valid)
}

fn run_print_config() -> Result<bool> {
    print!("{}", ValidatorConfig::default().to_toml()?);
    Ok(true)
}
