//! Validation findings.
//!
//! A [`Violation`] flips a file to invalid; a [`Warning`] is a quality signal
//! that never affects validity. Both render as `"<Category>: <detail>"`, and
//! the category prefix is what corpus-level frequency tables are keyed on.

use thiserror::Error;

/// An error found while validating a prediction file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("Parse Error: {0}")]
    Parse(String),

    #[error("IO Error: {0}")]
    Io(String),

    #[error("Unrecognized Format: neither `chart_data` nor `data.predictions` is present")]
    UnrecognizedFormat,

    /// A required key from the per-format schema is absent.
    #[error("Missing Field: {path} (in {file})")]
    MissingRequired { file: String, path: String },

    /// A key needed by an invariant check is absent from a nested construct.
    #[error("Missing Field: {path}")]
    MissingField { path: String },

    #[error("Type Error: {path} must be {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid Date: {path} = {value} ({reason})")]
    InvalidDate {
        path: String,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid Timestamp: {path} = {value} ({reason})")]
    InvalidTimestamp {
        path: String,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid OHLC: {path} {detail}")]
    Ohlc { path: String, detail: String },

    #[error("Invalid Price: {path} = {value} must be positive")]
    NonPositivePrice { path: String, value: f64 },

    #[error("Invalid Volume: {path} = {value} ({reason})")]
    Volume {
        path: String,
        value: String,
        reason: &'static str,
    },

    #[error("Monte Carlo Error: {path} {detail}")]
    MonteCarlo { path: String, detail: String },

    #[error("Confidence Band Error: {path} {detail}")]
    ConfidenceBand { path: String, detail: String },

    #[error("Ticker Info Error: {path} {detail}")]
    TickerInfo { path: String, detail: String },

    #[error("Summary Stats Error: {path} {detail}")]
    SummaryStats { path: String, detail: String },
}

impl Violation {
    /// Coarse category used for corpus-wide frequency tables.
    pub fn category(&self) -> &'static str {
        match self {
            Violation::Parse(_) => "Parse Error",
            Violation::Io(_) => "IO Error",
            Violation::UnrecognizedFormat => "Unrecognized Format",
            Violation::MissingRequired { .. } | Violation::MissingField { .. } => "Missing Field",
            Violation::WrongType { .. } => "Type Error",
            Violation::InvalidDate { .. } => "Invalid Date",
            Violation::InvalidTimestamp { .. } => "Invalid Timestamp",
            Violation::Ohlc { .. } => "Invalid OHLC",
            Violation::NonPositivePrice { .. } => "Invalid Price",
            Violation::Volume { .. } => "Invalid Volume",
            Violation::MonteCarlo { .. } => "Monte Carlo Error",
            Violation::ConfidenceBand { .. } => "Confidence Band Error",
            Violation::TickerInfo { .. } => "Ticker Info Error",
            Violation::SummaryStats { .. } => "Summary Stats Error",
        }
    }

    /// True when the file could not be read or parsed at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Violation::Parse(_) | Violation::Io(_))
    }
}

/// A quality signal that does not affect validity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("Monte Carlo Mismatch: monte_carlo_runs is {declared} but {actual} paths are present")]
    MonteCarloMismatch { declared: u64, actual: usize },

    #[error("Ambiguous Direction: price_change is 0 but direction is {direction}")]
    AmbiguousDirection { direction: String },

    #[error("Empty Predictions: {path} is empty (model prediction failure)")]
    EmptyPredictions { path: String },
}

impl Warning {
    pub fn category(&self) -> &'static str {
        match self {
            Warning::MonteCarloMismatch { .. } => "Monte Carlo Mismatch",
            Warning::AmbiguousDirection { .. } => "Ambiguous Direction",
            Warning::EmptyPredictions { .. } => "Empty Predictions",
        }
    }
}

/// Category of a rendered finding: the text before the first `:`.
pub fn category_of(message: &str) -> &str {
    match message.split_once(':') {
        Some((head, _)) => head.trim(),
        None => message.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_prefix_matches_category() {
        let samples = vec![
            Violation::Parse("expected value at line 1 column 1".into()),
            Violation::Io("permission denied".into()),
            Violation::UnrecognizedFormat,
            Violation::MissingRequired {
                file: "AAPL_ohlcv_prediction.json".into(),
                path: "data.predictions".into(),
            },
            Violation::MissingField {
                path: "data.predictions[0].close".into(),
            },
            Violation::WrongType {
                path: "summary_stats.confidence".into(),
                expected: "a number",
                found: "string".into(),
            },
            Violation::InvalidDate {
                path: "date".into(),
                value: "\"2025-13-01\"".into(),
                reason: "month out of range",
            },
            Violation::Ohlc {
                path: "c".into(),
                detail: "high 1 is below low 2".into(),
            },
            Violation::NonPositivePrice {
                path: "c.open".into(),
                value: -1.0,
            },
            Violation::ConfidenceBand {
                path: "b".into(),
                detail: "is missing".into(),
            },
        ];
        for violation in samples {
            let message = violation.to_string();
            assert_eq!(category_of(&message), violation.category(), "{message}");
        }

        let warning = Warning::MonteCarloMismatch {
            declared: 10,
            actual: 7,
        };
        assert_eq!(category_of(&warning.to_string()), warning.category());
    }

    #[test]
    fn only_parse_and_io_are_fatal() {
        assert!(Violation::Parse("x".into()).is_fatal());
        assert!(Violation::Io("x".into()).is_fatal());
        assert!(!Violation::UnrecognizedFormat.is_fatal());
    }

    #[test]
    fn category_of_message_without_colon() {
        assert_eq!(category_of("  something odd "), "something odd");
    }
}
