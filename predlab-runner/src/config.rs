//! Validator configuration, loaded from TOML.
//!
//! Every section is optional; missing keys take the defaults below, so an
//! empty file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use predlab_core::pipeline::{ValidationPolicy, FILE_SUFFIX};

/// Errors from loading or checking a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub scan: ScanConfig,
    pub pipeline: PipelineConfig,
    pub aggregate: AggregateConfig,
    pub gate: GateConfig,
}

/// Which files to validate and how many workers to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File name suffix that marks a prediction file.
    pub file_suffix: String,
    /// Worker threads; 0 means one per CPU core.
    pub workers: usize,
    /// Validate at most this many files (in file-name order).
    pub limit: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            file_suffix: FILE_SUFFIX.to_string(),
            workers: 0,
            limit: None,
        }
    }
}

/// Per-file sampling and timeout policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub candle_sample: usize,
    pub monte_carlo_sample: usize,
    /// Check every candle and every Monte Carlo path; overrides the samples.
    pub full_scan: bool,
    /// Read + parse budget per file in seconds; 0 disables the timeout.
    pub read_timeout_secs: u64,
    /// Files above this many MiB are rejected unread; 0 disables the cap.
    pub max_file_mb: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            candle_sample: 3,
            monte_carlo_sample: 3,
            full_scan: false,
            read_timeout_secs: 30,
            max_file_mb: 256,
        }
    }
}

/// Worst offender sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Files with strictly more errors than this are offenders.
    pub offender_error_threshold: usize,
    /// At most this many offenders are kept in the report.
    pub offender_sample_size: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            offender_error_threshold: 5,
            offender_sample_size: 25,
        }
    }
}

/// Release gate and recommendation thresholds (percentages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Below this success rate the CLI exits non-zero and a HIGH
    /// recommendation is raised.
    pub min_success_rate: f64,
    /// Success rate needed for the "ready for downstream consumption" verdict.
    pub ready_success_rate: f64,
    /// An error pattern is systemic when it hits more than this share of files.
    pub pattern_share_pct: f64,
    pub max_pattern_recommendations: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_success_rate: 95.0,
            ready_success_rate: 85.0,
            pattern_share_pct: 1.0,
            max_pattern_recommendations: 3,
        }
    }
}

impl ValidatorConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and check a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values no scan could honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let percentages = [
            ("gate.min_success_rate", self.gate.min_success_rate),
            ("gate.ready_success_rate", self.gate.ready_success_rate),
            ("gate.pattern_share_pct", self.gate.pattern_share_pct),
        ];
        for (name, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 100], got {value}"
                )));
            }
        }
        if !self.pipeline.full_scan
            && (self.pipeline.candle_sample == 0 || self.pipeline.monte_carlo_sample == 0)
        {
            return Err(ConfigError::Invalid(
                "pipeline sample sizes must be at least 1 (use full_scan to check everything)"
                    .into(),
            ));
        }
        if self.scan.file_suffix.is_empty() {
            return Err(ConfigError::Invalid("scan.file_suffix must not be empty".into()));
        }
        if self.scan.limit == Some(0) {
            return Err(ConfigError::Invalid("scan.limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Sampling and timeout policy handed to each worker.
    pub fn validation_policy(&self) -> ValidationPolicy {
        let sample = |n: usize| (!self.pipeline.full_scan).then_some(n);
        ValidationPolicy {
            candle_sample: sample(self.pipeline.candle_sample),
            monte_carlo_sample: sample(self.pipeline.monte_carlo_sample),
            read_timeout: (self.pipeline.read_timeout_secs > 0)
                .then(|| Duration::from_secs(self.pipeline.read_timeout_secs)),
            max_file_bytes: (self.pipeline.max_file_mb > 0)
                .then(|| self.pipeline.max_file_mb.saturating_mul(1024 * 1024)),
        }
    }
}
