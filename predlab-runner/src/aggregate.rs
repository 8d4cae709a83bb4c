//! Corpus report and the single-threaded fold that builds it.
//!
//! Workers never touch the report. The scanner collects every `FileOutcome`
//! first and then folds them in file-name order, so counters cannot race and
//! floating-point sums come out bit-identical whatever the worker count.
//!
//! Counts, pattern tallies, offenders, and the fingerprint do not depend on
//! fold order: `first_seen` is the smallest file name that hit a pattern, and
//! the fingerprint hashes files sorted by name.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use predlab_core::violation::category_of;
use predlab_core::{BandCheck, FileMetrics, FileOutcome, FileResult, MonteCarloCheck, RecordFormat};

use crate::config::{AggregateConfig, GateConfig};
use crate::recommend::{recommend, Recommendation};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Round a percentage to 2 decimals for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage rounded to 2 decimals; 0 when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

/// Streaming count/sum/min/max; `avg` is filled in when the report is finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericStat {
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

impl NumericStat {
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    fn observe_opt(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.observe(value);
        }
    }

    fn finish(&mut self) {
        self.avg = (self.count > 0).then(|| self.sum / self.count as f64);
    }
}

/// Earliest and latest date seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

impl DateSpan {
    pub fn observe(&mut self, date: NaiveDate) {
        self.earliest = Some(self.earliest.map_or(date, |d| d.min(date)));
        self.latest = Some(self.latest.map_or(date, |d| d.max(date)));
    }

    fn observe_opt(&mut self, date: Option<NaiveDate>) {
        if let Some(date) = date {
            self.observe(date);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCounts {
    pub legacy: u64,
    pub current: u64,
    pub unrecognized: u64,
}

impl FormatCounts {
    fn bump(&mut self, format: RecordFormat) {
        match format {
            RecordFormat::Legacy => self.legacy += 1,
            RecordFormat::Current => self.current += 1,
            RecordFormat::Unrecognized => self.unrecognized += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloTally {
    pub consistent: u64,
    pub inconsistent: u64,
    pub missing: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandTally {
    pub complete: u64,
    pub incomplete: u64,
    pub missing: u64,
}

/// How often one error or warning category occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTally {
    /// Total messages in this category.
    pub occurrences: u64,
    /// Files with at least one message in this category.
    pub files: u64,
    /// Smallest file name that produced the category; the first one a
    /// name-ordered scan meets.
    pub first_seen: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub chart_ready_files: u64,
    pub chart_ready_pct: f64,
    /// Files reporting 100% completeness.
    pub fully_complete_files: u64,
    pub fully_complete_pct: f64,
    pub completeness: NumericStat,
}

/// Aggregate over one scan run. Finished once, then persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub data_dir: String,
    /// BLAKE3 over the (file name, content hash) pairs in fold order.
    pub corpus_fingerprint: String,
    /// Files matching the naming convention, before any limit.
    pub discovered_files: u64,
    /// The scan stopped early; counts cover processed files only.
    pub cancelled: bool,

    pub total_files: u64,
    pub valid_files: u64,
    pub invalid_files: u64,
    pub files_with_warnings: u64,
    pub total_errors: u64,
    pub total_warnings: u64,
    /// Files that could not be read or parsed at all.
    pub hard_errors: u64,
    pub success_rate: f64,
    pub formats: FormatCounts,

    pub file_size: NumericStat,
    pub last_close: NumericStat,
    pub predicted_close: NumericStat,
    pub avg_volume: NumericStat,
    pub confidence: NumericStat,
    pub price_change_percent: NumericStat,
    pub volatility: NumericStat,
    pub historical_dates: DateSpan,
    pub prediction_dates: DateSpan,
    pub data_quality: DataQuality,

    pub monte_carlo_paths: MonteCarloTally,
    pub confidence_bands: BandTally,
    pub model_types: BTreeMap<String, u64>,
    pub directions: BTreeMap<String, u64>,

    pub error_patterns: BTreeMap<String, PatternTally>,
    pub warning_patterns: BTreeMap<String, PatternTally>,
    /// Files over the error threshold, most errors first.
    pub worst_offenders: Vec<FileResult>,
    pub recommendations: Vec<Recommendation>,
}

impl CorpusReport {
    fn empty(data_dir: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: DateTime::<Utc>::default(),
            data_dir,
            corpus_fingerprint: String::new(),
            discovered_files: 0,
            cancelled: false,
            total_files: 0,
            valid_files: 0,
            invalid_files: 0,
            files_with_warnings: 0,
            total_errors: 0,
            total_warnings: 0,
            hard_errors: 0,
            success_rate: 0.0,
            formats: FormatCounts::default(),
            file_size: NumericStat::default(),
            last_close: NumericStat::default(),
            predicted_close: NumericStat::default(),
            avg_volume: NumericStat::default(),
            confidence: NumericStat::default(),
            price_change_percent: NumericStat::default(),
            volatility: NumericStat::default(),
            historical_dates: DateSpan::default(),
            prediction_dates: DateSpan::default(),
            data_quality: DataQuality::default(),
            monte_carlo_paths: MonteCarloTally::default(),
            confidence_bands: BandTally::default(),
            model_types: BTreeMap::new(),
            directions: BTreeMap::new(),
            error_patterns: BTreeMap::new(),
            warning_patterns: BTreeMap::new(),
            worst_offenders: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Error patterns ordered by files desc, then first-seen file name.
    pub fn top_error_patterns(&self) -> Vec<(&str, &PatternTally)> {
        ranked(&self.error_patterns)
    }

    pub fn top_warning_patterns(&self) -> Vec<(&str, &PatternTally)> {
        ranked(&self.warning_patterns)
    }

    pub fn mixed_formats(&self) -> bool {
        self.formats.legacy > 0 && self.formats.current > 0
    }
}

fn ranked(table: &BTreeMap<String, PatternTally>) -> Vec<(&str, &PatternTally)> {
    let mut rows: Vec<(&str, &PatternTally)> =
        table.iter().map(|(k, v)| (k.as_str(), v)).collect();
    rows.sort_by(|a, b| {
        b.1.files
            .cmp(&a.1.files)
            .then_with(|| a.1.first_seen.cmp(&b.1.first_seen))
            .then_with(|| a.0.cmp(b.0))
    });
    rows
}

fn tally_patterns(table: &mut BTreeMap<String, PatternTally>, messages: &[String], file: &str) {
    let mut counted: Vec<&str> = Vec::new();
    for message in messages {
        let category = category_of(message);
        let entry = table
            .entry(category.to_string())
            .or_insert_with(|| PatternTally {
                occurrences: 0,
                files: 0,
                first_seen: file.to_string(),
            });
        if file < entry.first_seen.as_str() {
            entry.first_seen = file.to_string();
        }
        entry.occurrences += 1;
        if !counted.contains(&category) {
            entry.files += 1;
            counted.push(category);
        }
    }
}

/// BLAKE3 over `name \0 hash \n` lines sorted by file name.
fn corpus_fingerprint(files: &mut [(String, String)]) -> String {
    files.sort();
    let mut hasher = blake3::Hasher::new();
    for (name, hash) in files.iter() {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
        hasher.update(hash.as_bytes());
        hasher.update(&[b'\n']);
    }
    hasher.finalize().to_hex().to_string()
}

/// Offender order: most errors first, then file name.
fn offender_order(a: &FileResult, b: &FileResult) -> std::cmp::Ordering {
    b.errors
        .len()
        .cmp(&a.errors.len())
        .then_with(|| a.file_name.cmp(&b.file_name))
}

/// Folds file outcomes into a [`CorpusReport`].
pub struct Aggregator {
    report: CorpusReport,
    config: AggregateConfig,
    /// (file name, content hash), hashed in name order by `finish`.
    fingerprint: Vec<(String, String)>,
}

impl Aggregator {
    pub fn new(data_dir: impl Into<String>, config: AggregateConfig) -> Self {
        Self {
            report: CorpusReport::empty(data_dir.into()),
            config,
            fingerprint: Vec::new(),
        }
    }

    /// Files matching the naming convention, before any limit was applied.
    pub fn set_discovered(&mut self, discovered: u64) {
        self.report.discovered_files = discovered;
    }

    pub fn mark_cancelled(&mut self) {
        self.report.cancelled = true;
    }

    pub fn fold_outcome(&mut self, outcome: &FileOutcome) {
        self.fold(&outcome.result, &outcome.metrics);
    }

    /// Add one file to the report.
    pub fn fold(&mut self, result: &FileResult, metrics: &FileMetrics) {
        let report = &mut self.report;
        report.total_files += 1;
        if result.valid {
            report.valid_files += 1;
        } else {
            report.invalid_files += 1;
        }
        if !result.warnings.is_empty() {
            report.files_with_warnings += 1;
        }
        if result.fatal {
            report.hard_errors += 1;
        }
        report.total_errors += result.errors.len() as u64;
        report.total_warnings += result.warnings.len() as u64;
        report.formats.bump(result.detected_format);

        tally_patterns(&mut report.error_patterns, &result.errors, &result.file_name);
        tally_patterns(&mut report.warning_patterns, &result.warnings, &result.file_name);

        report.file_size.observe(metrics.file_size as f64);
        report.last_close.observe_opt(metrics.last_close);
        report.predicted_close.observe_opt(metrics.predicted_close);
        report.avg_volume.observe_opt(metrics.avg_volume);
        report.confidence.observe_opt(metrics.confidence);
        report.price_change_percent.observe_opt(metrics.price_change_percent);
        report.volatility.observe_opt(metrics.volatility);
        report.historical_dates.observe_opt(metrics.historical_start);
        report.historical_dates.observe_opt(metrics.historical_end);
        report.prediction_dates.observe_opt(metrics.prediction_start);
        report.prediction_dates.observe_opt(metrics.prediction_end);

        let quality = &mut report.data_quality;
        if metrics.chart_ready == Some(true) {
            quality.chart_ready_files += 1;
        }
        if let Some(completeness) = metrics.completeness {
            quality.completeness.observe(completeness);
            if completeness >= 100.0 {
                quality.fully_complete_files += 1;
            }
        }

        match metrics.monte_carlo {
            MonteCarloCheck::Consistent => report.monte_carlo_paths.consistent += 1,
            MonteCarloCheck::Inconsistent => report.monte_carlo_paths.inconsistent += 1,
            MonteCarloCheck::Missing => report.monte_carlo_paths.missing += 1,
        }
        match metrics.bands {
            BandCheck::Complete => report.confidence_bands.complete += 1,
            BandCheck::Incomplete => report.confidence_bands.incomplete += 1,
            BandCheck::Missing => report.confidence_bands.missing += 1,
        }
        if let Some(model) = &metrics.model_type {
            *report.model_types.entry(model.clone()).or_insert(0) += 1;
        }
        if let Some(direction) = &metrics.direction {
            *report.directions.entry(direction.clone()).or_insert(0) += 1;
        }

        if result.errors.len() > self.config.offender_error_threshold {
            let offenders = &mut report.worst_offenders;
            offenders.push(result.clone());
            if offenders.len() > self.config.offender_sample_size {
                offenders.sort_by(offender_order);
                offenders.truncate(self.config.offender_sample_size);
            }
        }

        self.fingerprint
            .push((result.file_name.clone(), metrics.content_hash.clone()));
    }

    /// Number of files folded so far.
    pub fn folded(&self) -> u64 {
        self.report.total_files
    }

    /// Compute averages, rates, and recommendations.
    pub fn finish(mut self, generated_at: DateTime<Utc>, gate: &GateConfig) -> CorpusReport {
        let report = &mut self.report;
        report.generated_at = generated_at;
        report.corpus_fingerprint = corpus_fingerprint(&mut self.fingerprint);
        report.success_rate = percent(report.valid_files, report.total_files);

        for stat in [
            &mut report.file_size,
            &mut report.last_close,
            &mut report.predicted_close,
            &mut report.avg_volume,
            &mut report.confidence,
            &mut report.price_change_percent,
            &mut report.volatility,
            &mut report.data_quality.completeness,
        ] {
            stat.finish();
        }
        report.data_quality.chart_ready_pct =
            percent(report.data_quality.chart_ready_files, report.total_files);
        report.data_quality.fully_complete_pct =
            percent(report.data_quality.fully_complete_files, report.total_files);

        report.worst_offenders.sort_by(offender_order);
        report.recommendations = recommend(report, gate);
        self.report
    }
}
