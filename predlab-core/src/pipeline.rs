//! File validation pipeline: bytes in, [`FileOutcome`] out.
//!
//! Read and parse are the only fatal stages. Once a record parses, the
//! pipeline classifies it once, runs the schema contract and then the
//! format-specific invariant checks, collecting everything it finds.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::checks::{
    bands_complete, validate_candlestick, validate_confidence_bands, validate_monte_carlo_path,
    validate_summary_stats, validate_ticker_info, CheckOutcome,
};
use crate::decode;
use crate::domain::{classify, Candlestick, RecordFormat};
use crate::result::{BandCheck, FileMetrics, FileOutcome, FileResult, MonteCarloCheck};
use crate::schema;
use crate::violation::{Violation, Warning};

/// Naming convention for prediction files: `<TICKER>_ohlcv_prediction.json`.
pub const FILE_SUFFIX: &str = "_ohlcv_prediction.json";

/// Ticker embedded in a prediction file name.
pub fn ticker_from_file_name(file_name: &str) -> &str {
    file_name
        .strip_suffix(FILE_SUFFIX)
        .or_else(|| file_name.strip_suffix(".json"))
        .unwrap_or(file_name)
}

/// How much of each file to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationPolicy {
    /// Candles checked from the head of each candle array; `None` checks all.
    pub candle_sample: Option<usize>,
    /// Monte Carlo paths checked from the head; `None` checks all.
    pub monte_carlo_sample: Option<usize>,
    /// Bound on read + parse per file; `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
    /// Larger files are rejected before any byte is parsed; `None` reads anything.
    pub max_file_bytes: Option<u64>,
}

/// Default size cap: far above any real prediction file.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 256 * 1024 * 1024;

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            candle_sample: Some(3),
            monte_carlo_sample: Some(3),
            read_timeout: Some(Duration::from_secs(30)),
            max_file_bytes: Some(DEFAULT_MAX_FILE_BYTES),
        }
    }
}

impl ValidationPolicy {
    /// Inspect every candle and every path.
    pub fn full_scan() -> Self {
        Self {
            candle_sample: None,
            monte_carlo_sample: None,
            ..Self::default()
        }
    }
}

/// Raw file bytes reduced to what the pipeline needs.
struct Loaded {
    size: u64,
    content_hash: String,
    record: Result<Value, Violation>,
}

impl Loaded {
    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            size: bytes.len() as u64,
            content_hash: blake3::hash(bytes).to_hex().to_string(),
            record: serde_json::from_slice(bytes).map_err(|e| Violation::Parse(e.to_string())),
        }
    }

    /// Read at most `cap` bytes; one byte more means the file is too large.
    fn read(path: &Path, cap: Option<u64>) -> Result<Self, Violation> {
        let io = |e: std::io::Error| Violation::Io(e.to_string());
        let file = File::open(path).map_err(io)?;
        let mut bytes = Vec::new();
        match cap {
            Some(cap) => {
                file.take(cap.saturating_add(1))
                    .read_to_end(&mut bytes)
                    .map_err(io)?;
                if bytes.len() as u64 > cap {
                    return Err(Violation::Io(format!(
                        "file exceeds the {cap}-byte size limit"
                    )));
                }
            }
            None => {
                let mut file = file;
                file.read_to_end(&mut bytes).map_err(io)?;
            }
        }
        Ok(Self::from_bytes(&bytes))
    }
}

/// Paths that differ between the two known layouts.
struct Layout {
    root: &'static str,
    predicted: &'static str,
    monte_carlo: &'static [&'static str],
}

const LEGACY_LAYOUT: Layout = Layout {
    root: "chart_data",
    predicted: "predicted_candlesticks",
    monte_carlo: &["monte_carlo_paths", "monte_carlo_simulations"],
};

const CURRENT_LAYOUT: Layout = Layout {
    root: "data",
    predicted: "predictions",
    monte_carlo: &["monte_carlo_paths"],
};

fn layout(format: RecordFormat) -> Option<&'static Layout> {
    match format {
        RecordFormat::Legacy => Some(&LEGACY_LAYOUT),
        RecordFormat::Current => Some(&CURRENT_LAYOUT),
        RecordFormat::Unrecognized => None,
    }
}

/// Stateless per-file validator. Cheap to clone and safe to share across
/// worker threads.
#[derive(Debug, Clone, Default)]
pub struct FileValidator {
    policy: ValidationPolicy,
}

impl FileValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Validate one file on disk. Never panics; read and parse failures come
    /// back as a fatal outcome for this file only.
    pub fn validate_path(&self, path: &Path) -> FileOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let cap = self.policy.max_file_bytes;
        let loaded = match self.policy.read_timeout {
            Some(timeout) => load_with_timeout(path, cap, timeout),
            None => Loaded::read(path, cap),
        };
        match loaded {
            Ok(loaded) => self.validate_loaded(&file_name, loaded),
            Err(violation) => {
                tracing::debug!(file = %file_name, error = %violation, "file could not be loaded");
                FileOutcome::fatal(&file_name, violation.to_string(), FileMetrics::default())
            }
        }
    }

    /// Validate an in-memory file body.
    pub fn validate_bytes(&self, file_name: &str, bytes: &[u8]) -> FileOutcome {
        self.validate_loaded(file_name, Loaded::from_bytes(bytes))
    }

    fn validate_loaded(&self, file_name: &str, loaded: Loaded) -> FileOutcome {
        let mut outcome = match loaded.record {
            Ok(record) => self.validate_record(file_name, &record),
            Err(violation) => {
                tracing::debug!(file = %file_name, error = %violation, "file failed to parse");
                FileOutcome::fatal(file_name, violation.to_string(), FileMetrics::default())
            }
        };
        outcome.metrics.file_size = loaded.size;
        outcome.metrics.content_hash = loaded.content_hash;
        outcome
    }

    /// Validate an already parsed record.
    pub fn validate_record(&self, file_name: &str, record: &Value) -> FileOutcome {
        let format = classify(record);
        let mut checks = CheckOutcome::default();
        let mut metrics = FileMetrics::default();

        if format == RecordFormat::Unrecognized {
            checks.error(Violation::UnrecognizedFormat);
        }
        checks
            .errors
            .extend(schema::missing_fields(record, format, file_name));

        if let Some(info) = record.get("ticker_info") {
            checks.merge(validate_ticker_info(info, ticker_from_file_name(file_name)));
        }
        if let Some(stats) = record.get("summary_stats") {
            checks.merge(validate_summary_stats(stats));
        }
        extract_summary_metrics(record, &mut metrics);

        if let Some(layout) = layout(format) {
            self.check_layout(record, layout, &mut checks, &mut metrics);
        }

        FileOutcome {
            result: FileResult {
                file_name: file_name.to_string(),
                detected_format: format,
                valid: checks.valid(),
                errors: checks.errors.iter().map(ToString::to_string).collect(),
                warnings: checks.warnings.iter().map(ToString::to_string).collect(),
                fatal: false,
            },
            metrics,
        }
    }

    fn check_layout(
        &self,
        record: &Value,
        layout: &Layout,
        checks: &mut CheckOutcome,
        metrics: &mut FileMetrics,
    ) {
        let Some(raw_section) = record.get(layout.root) else {
            return;
        };
        let Some(section) = checks.take(decode::object(raw_section, layout.root)) else {
            return;
        };

        let historical_path = decode::join(layout.root, "historical_candlesticks");
        let historical =
            self.check_candles(section.get("historical_candlesticks"), &historical_path, checks);
        if let Some(candles) = historical {
            (metrics.historical_start, metrics.historical_end) = date_span(candles, &historical_path);
        }

        let predicted_path = decode::join(layout.root, layout.predicted);
        let predicted = self.check_candles(section.get(layout.predicted), &predicted_path, checks);
        if let Some(candles) = predicted {
            if candles.is_empty() {
                checks.warn(Warning::EmptyPredictions {
                    path: predicted_path.clone(),
                });
            }
            (metrics.prediction_start, metrics.prediction_end) = date_span(candles, &predicted_path);
        }

        let horizon = forecast_horizon(record, layout, predicted.map(<[Value]>::len));

        let declared_runs =
            decode::lookup(record, "ticker_info.monte_carlo_runs").and_then(Value::as_u64);
        let paths = layout
            .monte_carlo
            .iter()
            .find_map(|key| section.get(*key).map(|v| (decode::join(layout.root, key), v)));
        let path_count = paths.and_then(|(path, value)| {
            let paths = checks.take(decode::array(value, &path))?;
            for (i, sim) in head(paths, self.policy.monte_carlo_sample) {
                let expected = horizon.or_else(|| sim.as_array().map(Vec::len)).unwrap_or(0);
                checks.merge(validate_monte_carlo_path(sim, expected, &decode::index(&path, i)));
            }
            Some(paths.len())
        });
        metrics.monte_carlo = match (declared_runs, path_count) {
            (Some(declared), Some(actual)) if declared == actual as u64 => MonteCarloCheck::Consistent,
            (Some(declared), Some(actual)) => {
                checks.warn(Warning::MonteCarloMismatch { declared, actual });
                MonteCarloCheck::Inconsistent
            }
            _ => MonteCarloCheck::Missing,
        };

        let bands_path = decode::join(layout.root, "confidence_bands");
        metrics.bands = match (section.get("confidence_bands"), horizon) {
            (None, _) => BandCheck::Missing,
            (Some(bands), Some(horizon)) => {
                checks.merge(validate_confidence_bands(bands, horizon, &bands_path));
                if bands_complete(bands, horizon) {
                    BandCheck::Complete
                } else {
                    BandCheck::Incomplete
                }
            }
            (Some(bands), None) => {
                checks.take(decode::object(bands, &bands_path));
                BandCheck::Incomplete
            }
        };
    }

    /// Type-check a candle array and validate its sampled head.
    fn check_candles<'a>(
        &self,
        value: Option<&'a Value>,
        path: &str,
        checks: &mut CheckOutcome,
    ) -> Option<&'a [Value]> {
        let candles = checks.take(decode::array(value?, path))?;
        for (i, candle) in head(candles, self.policy.candle_sample) {
            checks.merge(validate_candlestick(candle, &decode::index(path, i)));
        }
        Some(candles)
    }
}

/// Read and parse on a helper thread, waiting at most `timeout`.
///
/// An expired read is abandoned, not cancelled: the helper keeps running
/// until its read and parse finish, and its result is dropped. The size cap
/// bounds how much work such a thread can still do.
fn load_with_timeout(path: &Path, cap: Option<u64>, timeout: Duration) -> Result<Loaded, Violation> {
    let (tx, rx) = mpsc::channel();
    let owned = path.to_path_buf();
    thread::Builder::new()
        .name("predlab-load".into())
        .spawn(move || {
            // The receiver is gone once the deadline passes.
            let _ = tx.send(Loaded::read(&owned, cap));
        })
        .map_err(|e| Violation::Io(format!("could not start reader thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(loaded) => loaded,
        Err(RecvTimeoutError::Timeout) => Err(Violation::Parse(format!(
            "timed out after {}s reading or parsing",
            timeout.as_secs_f64()
        ))),
        Err(RecvTimeoutError::Disconnected) => {
            Err(Violation::Io("reader thread exited without a result".into()))
        }
    }
}

fn head(items: &[Value], limit: Option<usize>) -> impl Iterator<Item = (usize, &Value)> {
    items.iter().enumerate().take(limit.unwrap_or(usize::MAX))
}

/// Dates of the first and last candles, when they decode cleanly.
fn date_span(
    candles: &[Value],
    path: &str,
) -> (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>) {
    let date_at = |i: usize| {
        candles
            .get(i)
            .and_then(|c| Candlestick::from_value(c, &decode::index(path, i)).ok())
            .map(|c| c.date)
    };
    match candles.len() {
        0 => (None, None),
        n => (date_at(0), date_at(n - 1)),
    }
}

/// Forecast length: `ticker_info.prediction_days`, then
/// `<root>.metadata.prediction_days`, then the predicted candle count.
fn forecast_horizon(record: &Value, layout: &Layout, predicted_len: Option<usize>) -> Option<usize> {
    let declared = |path: &str| {
        decode::lookup(record, path)
            .and_then(Value::as_u64)
            .filter(|days| *days > 0)
            .and_then(|days| usize::try_from(days).ok())
    };
    declared("ticker_info.prediction_days")
        .or_else(|| declared(&format!("{}.metadata.prediction_days", layout.root)))
        .or(predicted_len)
}

fn extract_summary_metrics(record: &Value, metrics: &mut FileMetrics) {
    let number = |path: &str| {
        decode::lookup(record, path)
            .and_then(|v| decode::number(v, path).ok())
    };
    metrics.last_close = number("summary_stats.last_close");
    metrics.predicted_close = number("summary_stats.predicted_close");
    metrics.avg_volume = number("summary_stats.avg_volume");
    metrics.confidence = number("summary_stats.confidence");
    metrics.price_change_percent = number("summary_stats.price_change_percent");
    metrics.volatility = number("summary_stats.volatility");
    metrics.completeness = number("summary_stats.data_quality.completeness");
    metrics.chart_ready =
        decode::lookup(record, "summary_stats.data_quality.chart_ready").and_then(Value::as_bool);
    metrics.direction = decode::lookup(record, "summary_stats.direction")
        .and_then(Value::as_str)
        .map(str::to_string);
    metrics.model_type = decode::lookup(record, "ticker_info.model_type")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;
    use serde_json::json;

    fn validator() -> FileValidator {
        FileValidator::default()
    }

    #[test]
    fn ticker_is_taken_from_file_name() {
        assert_eq!(ticker_from_file_name("AAPL_ohlcv_prediction.json"), "AAPL");
        assert_eq!(ticker_from_file_name("BRK-B_ohlcv_prediction.json"), "BRK-B");
        assert_eq!(ticker_from_file_name("odd.json"), "odd");
        assert_eq!(ticker_from_file_name("noext"), "noext");
    }

    #[test]
    fn sample_current_record_is_valid() {
        let record = sample::current_record("AAPL");
        let outcome = validator().validate_record(&sample::file_name("AAPL"), &record);
        assert!(outcome.result.valid, "{:?}", outcome.result.errors);
        assert!(outcome.result.warnings.is_empty(), "{:?}", outcome.result.warnings);
        assert_eq!(outcome.result.detected_format, RecordFormat::Current);
        assert_eq!(outcome.metrics.monte_carlo, MonteCarloCheck::Consistent);
        assert_eq!(outcome.metrics.bands, BandCheck::Complete);
        assert_eq!(outcome.metrics.model_type.as_deref(), Some("kronos-transformer"));
        assert!(outcome.metrics.historical_start < outcome.metrics.historical_end);
        assert!(outcome.metrics.historical_end < outcome.metrics.prediction_start);
    }

    #[test]
    fn sample_legacy_record_is_valid() {
        let record = sample::legacy_record("MSFT");
        let outcome = validator().validate_record(&sample::file_name("MSFT"), &record);
        assert!(outcome.result.valid, "{:?}", outcome.result.errors);
        assert_eq!(outcome.result.detected_format, RecordFormat::Legacy);
        assert_eq!(outcome.metrics.bands, BandCheck::Missing);
    }

    #[test]
    fn unparsable_bytes_are_a_fatal_parse_error() {
        let outcome = validator().validate_bytes("X_ohlcv_prediction.json", b"not json at all");
        assert!(!outcome.result.valid);
        assert!(outcome.result.fatal);
        assert!(outcome.result.errors[0].starts_with("Parse Error"));
        assert_eq!(outcome.metrics.file_size, 15);
        assert_eq!(outcome.metrics.content_hash.len(), 64);
    }

    #[test]
    fn unrecognized_record_is_invalid_but_not_fatal() {
        let outcome = validator().validate_bytes("X_ohlcv_prediction.json", b"[1, 2, 3]");
        assert!(!outcome.result.valid);
        assert!(!outcome.result.fatal);
        assert_eq!(outcome.result.detected_format, RecordFormat::Unrecognized);
        assert!(outcome.result.errors[0].starts_with("Unrecognized Format"));
    }

    #[test]
    fn symbol_mismatch_is_reported() {
        let record = sample::current_record("AAPL");
        let outcome = validator().validate_record("MSFT_ohlcv_prediction.json", &record);
        assert!(!outcome.result.valid);
        assert!(outcome
            .result
            .errors
            .iter()
            .any(|e| e.starts_with("Ticker Info Error: ticker_info.symbol")));
    }

    #[test]
    fn run_count_mismatch_is_a_warning() {
        let record = sample::current_record_with("AAPL", 5, 10);
        let mut record = record;
        let paths = record["data"]["monte_carlo_paths"].as_array_mut().unwrap();
        paths.truncate(7);
        let outcome = validator().validate_record("AAPL_ohlcv_prediction.json", &record);
        assert!(outcome.result.valid, "{:?}", outcome.result.errors);
        assert_eq!(outcome.metrics.monte_carlo, MonteCarloCheck::Inconsistent);
        assert_eq!(
            outcome.result.warnings,
            vec!["Monte Carlo Mismatch: monte_carlo_runs is 10 but 7 paths are present"]
        );
    }

    #[test]
    fn sampling_skips_defects_past_the_head() {
        let mut record = sample::current_record("AAPL");
        record["data"]["historical_candlesticks"][10]["high"] = json!(0.01);
        let sampled = validator().validate_record("AAPL_ohlcv_prediction.json", &record);
        assert!(sampled.result.valid);

        let full = FileValidator::new(ValidationPolicy::full_scan())
            .validate_record("AAPL_ohlcv_prediction.json", &record);
        assert!(!full.result.valid);
        assert!(full
            .result
            .errors
            .iter()
            .all(|e| e.contains("data.historical_candlesticks[10]")));
    }

    #[test]
    fn empty_predictions_warn() {
        let mut record = sample::legacy_record("MSFT");
        record["chart_data"]["predicted_candlesticks"] = json!([]);
        let outcome = validator().validate_record("MSFT_ohlcv_prediction.json", &record);
        assert!(outcome
            .result
            .warnings
            .iter()
            .any(|w| w.starts_with("Empty Predictions")));
    }

    #[test]
    fn horizon_falls_back_to_metadata_then_prediction_count() {
        let mut record = sample::current_record_with("AAPL", 4, 2);
        record["ticker_info"]
            .as_object_mut()
            .unwrap()
            .remove("prediction_days");
        assert_eq!(forecast_horizon(&record, &CURRENT_LAYOUT, Some(9)), Some(4));
        record["data"]["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("prediction_days");
        assert_eq!(forecast_horizon(&record, &CURRENT_LAYOUT, Some(9)), Some(9));
        assert_eq!(forecast_horizon(&record, &CURRENT_LAYOUT, None), None);
    }

    #[test]
    fn short_band_is_incomplete() {
        let mut record = sample::current_record("AAPL");
        record["data"]["confidence_bands"]["p90"]
            .as_array_mut()
            .unwrap()
            .pop();
        let outcome = validator().validate_record("AAPL_ohlcv_prediction.json", &record);
        assert!(!outcome.result.valid);
        assert_eq!(outcome.metrics.bands, BandCheck::Incomplete);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let outcome = validator().validate_path(Path::new("/nonexistent/ZZZ_ohlcv_prediction.json"));
        assert!(outcome.result.fatal);
        assert_eq!(outcome.result.file_name, "ZZZ_ohlcv_prediction.json");
        assert!(outcome.result.errors[0].starts_with("IO Error"));
    }
}
