//! Percentile confidence band checks.

use serde_json::Value;

use super::{validate_date_format, CheckOutcome};
use crate::decode;
use crate::violation::Violation;

/// Percentile labels in ascending order.
pub const PERCENTILES: [&str; 5] = ["p10", "p25", "p50", "p75", "p90"];

/// Check all five percentile bands over the forecast horizon.
///
/// Each band must be an array of `expected_len` entries, each either
/// `{date, value}` or a bare number. Values must be positive and, at every
/// index, non-decreasing from p10 to p90. Entry dates are validated
/// independently of the ordering check.
pub fn validate_confidence_bands(bands: &Value, expected_len: usize, path: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let Some(obj) = outcome.take(decode::object(bands, path)) else {
        return outcome;
    };

    let mut columns: Vec<Option<Vec<Option<f64>>>> = Vec::with_capacity(PERCENTILES.len());
    for label in PERCENTILES {
        let band_path = decode::join(path, label);
        let Some(raw) = obj.get(label) else {
            outcome.error(Violation::ConfidenceBand {
                path: band_path,
                detail: "is missing".into(),
            });
            columns.push(None);
            continue;
        };
        let Some(entries) = outcome.take(decode::array(raw, &band_path)) else {
            columns.push(None);
            continue;
        };
        if entries.len() != expected_len {
            outcome.error(Violation::ConfidenceBand {
                path: band_path.clone(),
                detail: format!("has {} entries, expected {expected_len}", entries.len()),
            });
        }
        let values = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| band_value(entry, &decode::index(&band_path, i), &mut outcome))
            .collect();
        columns.push(Some(values));
    }

    let width = columns.iter().flatten().map(Vec::len).max().unwrap_or(0);
    for i in 0..width {
        let mut previous: Option<(&str, f64)> = None;
        for (label, column) in PERCENTILES.iter().zip(&columns) {
            let Some(value) = column.as_ref().and_then(|c| c.get(i).copied().flatten()) else {
                continue;
            };
            if let Some((prev_label, prev)) = previous {
                if value < prev {
                    outcome.error(Violation::ConfidenceBand {
                        path: decode::index(path, i),
                        detail: format!(
                            "ordering violation: {label} ({value}) is below {prev_label} ({prev})"
                        ),
                    });
                }
            }
            previous = Some((*label, value));
        }
    }
    outcome
}

fn band_value(entry: &Value, path: &str, outcome: &mut CheckOutcome) -> Option<f64> {
    let raw = match entry {
        Value::Object(obj) => {
            if let Some(date) = outcome.take(decode::field(obj, path, "date")) {
                outcome.merge(validate_date_format(date, &decode::join(path, "date")));
            }
            outcome.take(decode::field(obj, path, "value"))?
        }
        Value::Number(_) => entry,
        other => {
            outcome.error(decode::wrong_type(
                path,
                "an object with date and value, or a number",
                other,
            ));
            return None;
        }
    };
    let value_path = match entry {
        Value::Object(_) => decode::join(path, "value"),
        _ => path.to_string(),
    };
    let value = outcome.take(decode::number(raw, &value_path))?;
    if value <= 0.0 {
        outcome.error(Violation::NonPositivePrice {
            path: value_path,
            value,
        });
    }
    Some(value)
}

/// True when all five bands are arrays of exactly `expected_len` entries.
pub fn bands_complete(bands: &Value, expected_len: usize) -> bool {
    PERCENTILES.iter().all(|label| {
        bands
            .get(*label)
            .and_then(Value::as_array)
            .is_some_and(|entries| entries.len() == expected_len)
    })
}
