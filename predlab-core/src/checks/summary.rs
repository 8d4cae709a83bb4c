//! `summary_stats` value checks.

use serde_json::{Map, Value};

use super::CheckOutcome;
use crate::decode;
use crate::violation::{Violation, Warning};

const ROOT: &str = "summary_stats";

fn path(key: &str) -> String {
    decode::join(ROOT, key)
}

fn read_number(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
    outcome: &mut CheckOutcome,
) -> Option<f64> {
    let raw = obj.get(key)?;
    outcome.take(decode::number(raw, &decode::join(parent, key)))
}

fn range_error(path: String, value: f64, range: &str) -> Violation {
    Violation::SummaryStats {
        path,
        detail: format!("{value} is outside {range}"),
    }
}

/// Check the semantic consistency of `summary_stats`.
///
/// Direction must agree with the sign of `price_change`: positive needs
/// `"Bullish"`, negative needs `"Bearish"`. A zero change accepts any known
/// direction but is flagged with an `Ambiguous Direction` warning.
pub fn validate_summary_stats(stats: &Value) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let Some(obj) = outcome.take(decode::object(stats, ROOT)) else {
        return outcome;
    };

    for key in ["last_close", "predicted_close"] {
        if let Some(price) = read_number(obj, ROOT, key, &mut outcome) {
            if price <= 0.0 {
                outcome.error(Violation::NonPositivePrice {
                    path: path(key),
                    value: price,
                });
            }
        }
    }

    let price_change = read_number(obj, ROOT, "price_change", &mut outcome);
    read_number(obj, ROOT, "price_change_percent", &mut outcome);

    if let Some(raw) = obj.get("direction") {
        if let Some(direction) = outcome.take(decode::string(raw, &path("direction"))) {
            check_direction(direction, price_change, &mut outcome);
        }
    }

    if let Some(confidence) = read_number(obj, ROOT, "confidence", &mut outcome) {
        if !(0.0..=100.0).contains(&confidence) {
            outcome.error(range_error(path("confidence"), confidence, "[0, 100]"));
        }
    }

    if let Some(volatility) = read_number(obj, ROOT, "volatility", &mut outcome) {
        if volatility < 0.0 {
            outcome.error(Violation::SummaryStats {
                path: path("volatility"),
                detail: format!("must not be negative, found {volatility}"),
            });
        }
    }

    if let Some(avg_volume) = read_number(obj, ROOT, "avg_volume", &mut outcome) {
        if avg_volume <= 0.0 {
            outcome.error(Violation::SummaryStats {
                path: path("avg_volume"),
                detail: format!("must be positive, found {avg_volume}"),
            });
        }
    }

    if let Some(raw) = obj.get("data_quality") {
        check_data_quality(raw, &mut outcome);
    }
    outcome
}

fn check_direction(direction: &str, price_change: Option<f64>, outcome: &mut CheckOutcome) {
    if !matches!(direction, "Bullish" | "Bearish" | "Neutral") {
        outcome.error(Violation::SummaryStats {
            path: path("direction"),
            detail: format!("{direction:?} is not one of Bullish, Bearish, Neutral"),
        });
        return;
    }
    let Some(change) = price_change else {
        return;
    };
    let expected = if change > 0.0 {
        "Bullish"
    } else if change < 0.0 {
        "Bearish"
    } else {
        outcome.warn(Warning::AmbiguousDirection {
            direction: direction.to_string(),
        });
        return;
    };
    if direction != expected {
        outcome.error(Violation::SummaryStats {
            path: path("direction"),
            detail: format!("{direction:?} contradicts price_change {change}, expected {expected:?}"),
        });
    }
}

fn check_data_quality(raw: &Value, outcome: &mut CheckOutcome) {
    let parent = path("data_quality");
    let Some(obj) = outcome.take(decode::object(raw, &parent)) else {
        return;
    };

    if let Some(completeness) = read_number(obj, &parent, "completeness", outcome) {
        if !(0.0..=100.0).contains(&completeness) {
            outcome.error(range_error(
                decode::join(&parent, "completeness"),
                completeness,
                "[0, 100]",
            ));
        }
    }

    if let Some(raw) = obj.get("historical_days") {
        let days_path = decode::join(&parent, "historical_days");
        if let Some(days) = outcome.take(decode::integer(raw, &days_path)) {
            if days < 0 {
                outcome.error(Violation::SummaryStats {
                    path: days_path,
                    detail: format!("must not be negative, found {days}"),
                });
            }
        }
    }

    if let Some(raw) = obj.get("chart_ready") {
        outcome.take(decode::boolean(raw, &decode::join(&parent, "chart_ready")));
    }
}
