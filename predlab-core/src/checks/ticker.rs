//! `ticker_info` value checks.
//!
//! Presence of the required keys is the schema validator's job; these checks
//! only judge the values that are there.

use serde_json::Value;

use super::{validate_timestamp, CheckOutcome};
use crate::decode;
use crate::violation::Violation;

const ROOT: &str = "ticker_info";

/// Check `ticker_info` against the ticker embedded in the source file name.
pub fn validate_ticker_info(info: &Value, expected_symbol: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let Some(obj) = outcome.take(decode::object(info, ROOT)) else {
        return outcome;
    };
    let path = |key: &str| decode::join(ROOT, key);

    if let Some(raw) = obj.get("symbol") {
        if let Some(symbol) = outcome.take(decode::string(raw, &path("symbol"))) {
            if symbol != expected_symbol {
                outcome.error(Violation::TickerInfo {
                    path: path("symbol"),
                    detail: format!("{symbol:?} does not match file ticker {expected_symbol:?}"),
                });
            }
        }
    }

    for key in ["last_update", "generated_at"] {
        if let Some(raw) = obj.get(key) {
            outcome.merge(validate_timestamp(raw, &path(key)));
        }
    }

    if let Some(raw) = obj.get("model_type") {
        if let Some(model) = outcome.take(decode::string(raw, &path("model_type"))) {
            if model.trim().is_empty() {
                outcome.error(Violation::TickerInfo {
                    path: path("model_type"),
                    detail: "must not be empty".into(),
                });
            }
        }
    }

    for key in ["lookback_days", "prediction_days"] {
        if let Some(raw) = obj.get(key) {
            if let Some(days) = outcome.take(decode::integer(raw, &path(key))) {
                if days <= 0 {
                    outcome.error(Violation::TickerInfo {
                        path: path(key),
                        detail: format!("must be a positive integer, found {days}"),
                    });
                }
            }
        }
    }

    if let Some(raw) = obj.get("monte_carlo_runs") {
        if let Some(runs) = outcome.take(decode::integer(raw, &path("monte_carlo_runs"))) {
            if runs < 0 {
                outcome.error(Violation::TickerInfo {
                    path: path("monte_carlo_runs"),
                    detail: format!("must not be negative, found {runs}"),
                });
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> Value {
        json!({
            "symbol": "AAPL",
            "last_update": "2025-10-03T16:00:00.000123",
            "model_type": "kronos-transformer",
            "lookback_days": 120,
            "prediction_days": 5,
            "monte_carlo_runs": 10
        })
    }

    #[test]
    fn matching_info_passes() {
        let outcome = validate_ticker_info(&info(), "AAPL");
        assert!(outcome.valid(), "{:?}", outcome.errors);
    }

    #[test]
    fn symbol_must_match_file() {
        let outcome = validate_ticker_info(&info(), "MSFT");
        assert_eq!(
            outcome.errors[0].to_string(),
            "Ticker Info Error: ticker_info.symbol \"AAPL\" does not match file ticker \"MSFT\""
        );
    }

    #[test]
    fn reports_every_bad_value() {
        let mut value = info();
        value["last_update"] = json!("2025-10-03 16:00");
        value["lookback_days"] = json!(0);
        value["prediction_days"] = json!("5");
        value["monte_carlo_runs"] = json!(-1);
        value["model_type"] = json!("");
        let outcome = validate_ticker_info(&value, "AAPL");
        let categories: Vec<&str> = outcome.errors.iter().map(|e| e.category()).collect();
        assert_eq!(
            categories,
            vec![
                "Invalid Timestamp",
                "Ticker Info Error",
                "Ticker Info Error",
                "Type Error",
                "Ticker Info Error"
            ]
        );
    }

    #[test]
    fn generated_at_is_accepted_in_place_of_last_update() {
        let mut value = info();
        value.as_object_mut().unwrap().remove("last_update");
        value["generated_at"] = json!("2025-10-03T20:15:42.918273");
        assert!(validate_ticker_info(&value, "AAPL").valid());
    }

    #[test]
    fn zero_monte_carlo_runs_is_allowed() {
        let mut value = info();
        value["monte_carlo_runs"] = json!(0);
        assert!(validate_ticker_info(&value, "AAPL").valid());
    }
}
