//! Corpus scanner: discover prediction files, validate them in parallel,
//! then fold the outcomes into a report.
//!
//! Validation runs on a private Rayon pool sized from the config. The fold
//! runs afterwards on the calling thread in file-name order, which keeps the
//! report independent of the worker count.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;

use predlab_core::{FileOutcome, FileResult, FileValidator};

use crate::aggregate::{Aggregator, CorpusReport};
use crate::config::ValidatorConfig;

/// Log a progress line every this many files.
const PROGRESS_EVERY: usize = 100;

/// Errors that stop a scan before any file is validated.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("data directory {0} does not exist or is not a directory")]
    NotADirectory(String),
    #[error("read data directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Progress snapshot passed to the caller's callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
}

/// Finished report plus every per-file result, in file-name order.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub report: CorpusReport,
    pub results: Vec<FileResult>,
}

/// Files in `dir` whose names end with `suffix`, sorted by name.
pub fn discover_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.display().to_string()));
    }
    let read_err = |source| ScanError::ReadDir {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix) && name.len() > suffix.len());
        if matches {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Validate every prediction file under `data_dir` and build the corpus report.
///
/// - `progress`: optional callback, invoked from worker threads after each file.
/// - `cancel`: optional flag checked before each file. Once set, remaining
///   files are skipped and the report is marked `cancelled`; it still covers
///   every file that was processed.
pub fn scan_corpus(
    data_dir: &Path,
    config: &ValidatorConfig,
    progress: Option<&(dyn Fn(&ScanProgress) + Sync)>,
    cancel: Option<&AtomicBool>,
) -> Result<ScanOutput, ScanError> {
    let mut files = discover_files(data_dir, &config.scan.file_suffix)?;
    let discovered = files.len();
    if let Some(limit) = config.scan.limit {
        files.truncate(limit);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.scan.workers)
        .thread_name(|i| format!("predlab-worker-{i}"))
        .build()?;

    tracing::info!(
        data_dir = %data_dir.display(),
        discovered,
        scheduled = files.len(),
        workers = pool.current_num_threads(),
        "corpus scan started"
    );

    let validator = FileValidator::new(config.validation_policy());
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let outcomes: Vec<Option<FileOutcome>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    return None;
                }
                let outcome = validator.validate_path(path);
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_EVERY == 0 {
                    tracing::info!(processed = done, total, "scan progress");
                }
                if let Some(cb) = progress {
                    cb(&ScanProgress {
                        processed: done,
                        total,
                    });
                }
                Some(outcome)
            })
            .collect()
    });

    let mut aggregator = Aggregator::new(data_dir.display().to_string(), config.aggregate.clone());
    aggregator.set_discovered(discovered as u64);

    let mut results = Vec::with_capacity(outcomes.len());
    for outcome in outcomes.into_iter().flatten() {
        aggregator.fold_outcome(&outcome);
        results.push(outcome.result);
    }

    let skipped = total - results.len();
    if skipped > 0 || cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        aggregator.mark_cancelled();
        tracing::warn!(
            processed = results.len(),
            skipped,
            "corpus scan cancelled, report is partial"
        );
    }

    let report = aggregator.finish(chrono::Utc::now(), &config.gate);
    tracing::info!(
        total = report.total_files,
        valid = report.valid_files,
        invalid = report.invalid_files,
        hard_errors = report.hard_errors,
        success_rate = report.success_rate,
        "corpus scan finished"
    );

    Ok(ScanOutput { report, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn discovery_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in [
            "MSFT_ohlcv_prediction.json",
            "AAPL_ohlcv_prediction.json",
            "notes.txt",
            "_ohlcv_prediction.json",
            "AAPL_ohlcv_prediction.json.bak",
        ] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let files = discover_files(dir.path(), "_ohlcv_prediction.json").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["AAPL_ohlcv_prediction.json", "MSFT_ohlcv_prediction.json"]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = discover_files(Path::new("/nonexistent/predlab"), "_x.json").unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }
}
