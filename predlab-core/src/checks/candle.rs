//! OHLC ordering and candlestick checks.

use serde_json::Value;

use super::{validate_date_format, CheckOutcome};
use crate::decode;
use crate::violation::Violation;

/// Check price positivity and OHLC ordering, enumerating every breach.
pub fn validate_ohlc(candle: &Value, path: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let obj = match decode::object(candle, path) {
        Ok(obj) => obj,
        Err(violation) => {
            outcome.error(violation);
            return outcome;
        }
    };

    let mut price = |key: &str| -> Option<f64> {
        let value = outcome.take(decode::field(obj, path, key))?;
        let price = outcome.take(decode::number(value, &decode::join(path, key)))?;
        if price <= 0.0 {
            outcome.error(Violation::NonPositivePrice {
                path: decode::join(path, key),
                value: price,
            });
        }
        Some(price)
    };
    let open = price("open");
    let high = price("high");
    let low = price("low");
    let close = price("close");

    let mut breach = |detail: String| {
        outcome.error(Violation::Ohlc {
            path: path.to_string(),
            detail,
        })
    };
    if let (Some(h), Some(o)) = (high, open) {
        if h < o {
            breach(format!("high {h} is below open {o}"));
        }
    }
    if let (Some(h), Some(c)) = (high, close) {
        if h < c {
            breach(format!("high {h} is below close {c}"));
        }
    }
    if let (Some(l), Some(o)) = (low, open) {
        if l > o {
            breach(format!("low {l} is above open {o}"));
        }
    }
    if let (Some(l), Some(c)) = (low, close) {
        if l > c {
            breach(format!("low {l} is above close {c}"));
        }
    }
    if let (Some(h), Some(l)) = (high, low) {
        if h < l {
            breach(format!("high {h} is below low {l}"));
        }
    }
    outcome
}

/// Date, OHLC and volume checks for one candle.
///
/// Volume must be a non-negative whole number; `1200.0` is accepted because
/// upstream writers emit volumes as floats.
pub fn validate_candlestick(candle: &Value, path: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let obj = match decode::object(candle, path) {
        Ok(obj) => obj,
        Err(violation) => {
            outcome.error(violation);
            return outcome;
        }
    };

    if let Some(date) = outcome.take(decode::field(obj, path, "date")) {
        outcome.merge(validate_date_format(date, &decode::join(path, "date")));
    }

    outcome.merge(validate_ohlc(candle, path));

    let volume_path = decode::join(path, "volume");
    if let Some(raw) = outcome.take(decode::field(obj, path, "volume")) {
        if let Some(volume) = outcome.take(decode::number(raw, &volume_path)) {
            let reason = if volume < 0.0 {
                Some("must not be negative")
            } else if volume.fract() != 0.0 {
                Some("must be a whole number")
            } else {
                None
            };
            if let Some(reason) = reason {
                outcome.error(Violation::Volume {
                    path: volume_path,
                    value: raw.to_string(),
                    reason,
                });
            }
        }
    }
    outcome
}
