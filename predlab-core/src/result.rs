//! Per-file validation output.
//!
//! Workers produce a [`FileOutcome`] per file and never touch the corpus
//! report; the reducer folds the outcomes afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::RecordFormat;

/// Verdict for one file. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub file_name: String,
    pub detected_format: RecordFormat,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// The file could not be read or parsed at all.
    #[serde(default)]
    pub fatal: bool,
}

impl FileResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Monte Carlo path-count check for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonteCarloCheck {
    /// Declared run count equals the number of paths.
    Consistent,
    Inconsistent,
    /// Paths or declared run count absent.
    #[default]
    Missing,
}

/// Confidence band completeness for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandCheck {
    /// All five percentiles present with one entry per forecast day.
    Complete,
    Incomplete,
    #[default]
    Missing,
}

/// Fields the aggregator needs, pulled out of the record by the worker.
///
/// Any field that is absent or fails its typed decode stays `None` and is
/// simply not counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub file_size: u64,
    /// BLAKE3 hex digest of the raw file bytes.
    pub content_hash: String,
    pub last_close: Option<f64>,
    pub predicted_close: Option<f64>,
    pub avg_volume: Option<f64>,
    pub confidence: Option<f64>,
    pub price_change_percent: Option<f64>,
    pub volatility: Option<f64>,
    pub completeness: Option<f64>,
    pub chart_ready: Option<bool>,
    pub model_type: Option<String>,
    pub direction: Option<String>,
    pub historical_start: Option<NaiveDate>,
    pub historical_end: Option<NaiveDate>,
    pub prediction_start: Option<NaiveDate>,
    pub prediction_end: Option<NaiveDate>,
    pub monte_carlo: MonteCarloCheck,
    pub bands: BandCheck,
}

/// Everything a worker hands to the reducer for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub result: FileResult,
    pub metrics: FileMetrics,
}

impl FileOutcome {
    /// Outcome for a file that never got past reading or parsing.
    pub fn fatal(file_name: &str, error: String, metrics: FileMetrics) -> Self {
        Self {
            result: FileResult {
                file_name: file_name.to_string(),
                detected_format: RecordFormat::Unrecognized,
                valid: false,
                errors: vec![error],
                warnings: Vec::new(),
                fatal: true,
            },
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_outcome_is_invalid() {
        let outcome = FileOutcome::fatal(
            "BAD_ohlcv_prediction.json",
            "Parse Error: expected value at line 1 column 1".into(),
            FileMetrics::default(),
        );
        assert!(!outcome.result.valid);
        assert!(outcome.result.fatal);
        assert_eq!(outcome.result.error_count(), 1);
        assert_eq!(outcome.metrics.monte_carlo, MonteCarloCheck::Missing);
    }

    #[test]
    fn fatal_flag_defaults_when_absent() {
        let json = r#"{"file_name":"A","detected_format":"current","valid":true,"errors":[],"warnings":[]}"#;
        let result: FileResult = serde_json::from_str(json).unwrap();
        assert!(!result.fatal);
        assert_eq!(result.detected_format, RecordFormat::Current);
    }
}
