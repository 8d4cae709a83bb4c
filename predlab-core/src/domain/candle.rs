//! Candlestick — one trading period's OHLCV tuple.

use chrono::NaiveDate;
use serde_json::Value;

use crate::checks::{self, CheckOutcome};
use crate::decode;
use crate::violation::Violation;

static NULL: Value = Value::Null;

/// OHLCV candle as it appears in historical, predicted, and Monte Carlo arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Candlestick {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candlestick {
    /// Decode a candle from JSON, running the full candlestick check first.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, Vec<Violation>> {
        let outcome = checks::validate_candlestick(value, path);
        if !outcome.valid() {
            return Err(outcome.errors);
        }
        let mut decoded = CheckOutcome::default();
        let obj = value.as_object();
        let get = |key: &str| obj.and_then(|o| o.get(key)).unwrap_or(&NULL);

        let date = decoded.take(
            decode::string(get("date"), &decode::join(path, "date")).and_then(|s| {
                checks::parse_date(s).map_err(|reason| Violation::InvalidDate {
                    path: decode::join(path, "date"),
                    value: get("date").to_string(),
                    reason,
                })
            }),
        );
        let open = decoded.take(decode::number(get("open"), &decode::join(path, "open")));
        let high = decoded.take(decode::number(get("high"), &decode::join(path, "high")));
        let low = decoded.take(decode::number(get("low"), &decode::join(path, "low")));
        let close = decoded.take(decode::number(get("close"), &decode::join(path, "close")));
        let volume = decoded.take(decode::number(get("volume"), &decode::join(path, "volume")));

        match (date, open, high, low, close, volume) {
            (Some(date), Some(open), Some(high), Some(low), Some(close), Some(volume)) => Ok(Self {
                date,
                open,
                high,
                low,
                close,
                volume: volume as u64,
            }),
            _ => Err(decoded.errors),
        }
    }
}
