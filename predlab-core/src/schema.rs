//! Required-key contract for each record format.
//!
//! Presence only: types and values are judged by the invariant checks. Every
//! absent key yields its own `Missing Field` violation so a file's full defect
//! list surfaces in one pass.

use serde_json::Value;

use crate::decode;
use crate::domain::RecordFormat;
use crate::violation::Violation;

/// One required entry in a format's key list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A dotted path that must resolve.
    Key(&'static str),
    /// At least one of these dotted paths must resolve.
    AnyOf(&'static [&'static str]),
}

impl Requirement {
    /// Name used in the error message.
    pub fn label(&self) -> String {
        match self {
            Requirement::Key(path) => (*path).to_string(),
            Requirement::AnyOf(paths) => paths.join(" | "),
        }
    }

    fn satisfied_by(&self, record: &Value) -> bool {
        match self {
            Requirement::Key(path) => decode::lookup(record, path).is_some(),
            Requirement::AnyOf(paths) => paths.iter().any(|p| decode::lookup(record, p).is_some()),
        }
    }
}

pub const LEGACY_REQUIRED: &[Requirement] = &[
    Requirement::Key("ticker_info"),
    Requirement::Key("chart_data"),
    Requirement::Key("chart_data.historical_candlesticks"),
    Requirement::AnyOf(&[
        "chart_data.predicted_candlesticks",
        "chart_data.predicted_ohlcv_summary",
    ]),
    Requirement::Key("summary_stats"),
];

pub const CURRENT_REQUIRED: &[Requirement] = &[
    Requirement::Key("ticker_info"),
    Requirement::Key("data"),
    Requirement::Key("data.metadata"),
    Requirement::Key("data.historical_candlesticks"),
    Requirement::Key("data.predictions"),
    Requirement::Key("data.monte_carlo_paths"),
    Requirement::Key("data.confidence_bands"),
    Requirement::Key("summary_stats"),
];

pub const UNRECOGNIZED_REQUIRED: &[Requirement] = &[
    Requirement::Key("ticker_info"),
    Requirement::Key("summary_stats"),
];

/// Keys required inside a nested object, checked only when the parent is an
/// object. A missing parent is already reported by the top-level list.
pub const NESTED_REQUIRED: &[(&str, &[Requirement])] = &[
    (
        "ticker_info",
        &[
            Requirement::Key("symbol"),
            Requirement::AnyOf(&["last_update", "generated_at"]),
            Requirement::Key("model_type"),
            Requirement::Key("lookback_days"),
            Requirement::Key("prediction_days"),
            Requirement::Key("monte_carlo_runs"),
        ],
    ),
    (
        "summary_stats",
        &[
            Requirement::Key("last_close"),
            Requirement::Key("predicted_close"),
            Requirement::Key("price_change"),
            Requirement::Key("price_change_percent"),
            Requirement::Key("direction"),
            Requirement::Key("confidence"),
            Requirement::Key("volatility"),
            Requirement::Key("avg_volume"),
            Requirement::Key("data_quality"),
        ],
    ),
    (
        "summary_stats.data_quality",
        &[
            Requirement::Key("completeness"),
            Requirement::Key("historical_days"),
            Requirement::Key("chart_ready"),
        ],
    ),
];

/// Top-level required keys for a format.
pub fn required_fields(format: RecordFormat) -> &'static [Requirement] {
    match format {
        RecordFormat::Legacy => LEGACY_REQUIRED,
        RecordFormat::Current => CURRENT_REQUIRED,
        RecordFormat::Unrecognized => UNRECOGNIZED_REQUIRED,
    }
}

/// Every required key absent from `record`, top-level list first, then the
/// nested lists in order.
pub fn missing_fields(record: &Value, format: RecordFormat, file_name: &str) -> Vec<Violation> {
    let missing = |path: String| Violation::MissingRequired {
        file: file_name.to_string(),
        path,
    };

    let mut errors: Vec<Violation> = required_fields(format)
        .iter()
        .filter(|req| !req.satisfied_by(record))
        .map(|req| missing(req.label()))
        .collect();

    for (parent, fields) in NESTED_REQUIRED {
        let Some(node) = decode::lookup(record, parent).filter(|v| v.is_object()) else {
            continue;
        };
        errors.extend(
            fields
                .iter()
                .filter(|req| !req.satisfied_by(node))
                .map(|req| match req {
                    Requirement::Key(key) => missing(decode::join(parent, key)),
                    Requirement::AnyOf(keys) => missing(
                        keys.iter()
                            .map(|key| decode::join(parent, key))
                            .collect::<Vec<_>>()
                            .join(" | "),
                    ),
                }),
        );
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(errors: &[Violation]) -> Vec<String> {
        errors
            .iter()
            .map(|e| match e {
                Violation::MissingRequired { path, .. } => path.clone(),
                other => panic!("unexpected violation {other}"),
            })
            .collect()
    }

    #[test]
    fn every_missing_key_is_reported() {
        let record = json!({"data": {"predictions": []}});
        let errors = missing_fields(&record, RecordFormat::Current, "AAPL_ohlcv_prediction.json");
        assert_eq!(
            paths(&errors),
            vec![
                "ticker_info",
                "data.metadata",
                "data.historical_candlesticks",
                "data.monte_carlo_paths",
                "data.confidence_bands",
                "summary_stats"
            ]
        );
        assert_eq!(
            errors[0].to_string(),
            "Missing Field: ticker_info (in AAPL_ohlcv_prediction.json)"
        );
    }

    #[test]
    fn legacy_accepts_either_prediction_key() {
        let base = json!({
            "ticker_info": {},
            "chart_data": {"historical_candlesticks": [], "predicted_ohlcv_summary": {}},
            "summary_stats": {}
        });
        let errors = missing_fields(&base, RecordFormat::Legacy, "X");
        assert!(!paths(&errors)
            .iter()
            .any(|p| p.starts_with("chart_data.predicted")));

        let record = json!({"ticker_info": {}, "chart_data": {"historical_candlesticks": []}});
        let errors = missing_fields(&record, RecordFormat::Legacy, "X");
        assert!(paths(&errors).contains(
            &"chart_data.predicted_candlesticks | chart_data.predicted_ohlcv_summary".to_string()
        ));
        assert!(paths(&errors).contains(&"summary_stats".to_string()));
    }

    #[test]
    fn nested_keys_checked_only_under_object_parents() {
        let record = json!({
            "ticker_info": {"symbol": "AAPL", "model_type": "m", "lookback_days": 1,
                            "prediction_days": 1, "monte_carlo_runs": 0},
            "summary_stats": "broken"
        });
        let errors = missing_fields(&record, RecordFormat::Unrecognized, "X");
        assert_eq!(
            paths(&errors),
            vec!["ticker_info.last_update | ticker_info.generated_at"]
        );
    }

    #[test]
    fn data_quality_keys_are_required() {
        let record = json!({
            "ticker_info": {"symbol": "A", "generated_at": "2025-01-01T00:00:00", "model_type": "m",
                            "lookback_days": 1, "prediction_days": 1, "monte_carlo_runs": 0},
            "summary_stats": {"last_close": 1, "predicted_close": 1, "price_change": 0,
                              "price_change_percent": 0, "direction": "Neutral", "confidence": 1,
                              "volatility": 0, "avg_volume": 1, "data_quality": {"completeness": 100}}
        });
        let errors = missing_fields(&record, RecordFormat::Unrecognized, "X");
        assert_eq!(
            paths(&errors),
            vec![
                "summary_stats.data_quality.historical_days",
                "summary_stats.data_quality.chart_ready"
            ]
        );
    }

    #[test]
    fn non_object_record_misses_everything() {
        let errors = missing_fields(&json!([1, 2]), RecordFormat::Unrecognized, "X");
        assert_eq!(paths(&errors), vec!["ticker_info", "summary_stats"]);
    }
}
