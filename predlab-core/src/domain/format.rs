//! Schema variant detection.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode;

/// The two historical schema variants, plus everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// `chart_data` layout with `predicted_candlesticks` or `predicted_ohlcv_summary`.
    Legacy,
    /// `data` layout with `predictions`, `monte_carlo_paths`, `confidence_bands`.
    Current,
    Unrecognized,
}

impl RecordFormat {
    pub fn label(self) -> &'static str {
        match self {
            RecordFormat::Legacy => "legacy",
            RecordFormat::Current => "current",
            RecordFormat::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a parsed record. Total: any JSON value maps to exactly one variant.
///
/// `chart_data` takes precedence, so a transitional file carrying both
/// layouts is validated as Legacy.
pub fn classify(record: &Value) -> RecordFormat {
    if record.get("chart_data").is_some() {
        RecordFormat::Legacy
    } else if decode::lookup(record, "data.predictions").is_some() {
        RecordFormat::Current
    } else {
        RecordFormat::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chart_data_means_legacy() {
        assert_eq!(classify(&json!({"chart_data": {}})), RecordFormat::Legacy);
    }

    #[test]
    fn data_predictions_means_current() {
        assert_eq!(
            classify(&json!({"data": {"predictions": []}})),
            RecordFormat::Current
        );
    }

    #[test]
    fn data_without_predictions_is_unrecognized() {
        assert_eq!(
            classify(&json!({"data": {"historical_candlesticks": []}})),
            RecordFormat::Unrecognized
        );
    }

    #[test]
    fn non_objects_are_unrecognized() {
        for value in [json!(null), json!(3), json!("chart_data"), json!([{"chart_data": 1}])] {
            assert_eq!(classify(&value), RecordFormat::Unrecognized);
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RecordFormat::Current).unwrap(),
            "\"current\""
        );
    }
}
