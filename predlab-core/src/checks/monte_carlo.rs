//! Monte Carlo path shape checks.

use serde_json::Value;

use super::{validate_candlestick, CheckOutcome};
use crate::decode;
use crate::violation::Violation;

/// Check one simulated path: an array of exactly `expected_len` steps, each a
/// full candlestick or a bare positive close (legacy numeric paths).
pub fn validate_monte_carlo_path(value: &Value, expected_len: usize, path: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let Some(steps) = outcome.take(decode::array(value, path)) else {
        return outcome;
    };

    if steps.len() != expected_len {
        outcome.error(Violation::MonteCarlo {
            path: path.to_string(),
            detail: format!("has {} steps, expected {expected_len}", steps.len()),
        });
    }

    for (i, step) in steps.iter().enumerate() {
        let step_path = decode::index(path, i);
        match step {
            Value::Object(_) => outcome.merge(validate_candlestick(step, &step_path)),
            Value::Number(_) => {
                if let Some(close) = outcome.take(decode::number(step, &step_path)) {
                    if close <= 0.0 {
                        outcome.error(Violation::NonPositivePrice {
                            path: step_path,
                            value: close,
                        });
                    }
                }
            }
            other => outcome.error(decode::wrong_type(
                &step_path,
                "a candlestick or a positive number",
                other,
            )),
        }
    }
    outcome
}
