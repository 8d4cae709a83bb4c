//! Deterministic well-formed prediction records.
//!
//! Used by tests and benchmarks across the workspace; every record built here
//! passes full-scan validation for the file named by [`file_name`].

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

use crate::checks::PERCENTILES;
use crate::pipeline::FILE_SUFFIX;

const HISTORY_DAYS: usize = 20;
const BAND_OFFSETS: [f64; 5] = [-4.0, -2.0, 0.0, 2.0, 4.0];

/// `<symbol>_ohlcv_prediction.json`
pub fn file_name(symbol: &str) -> String {
    format!("{symbol}{FILE_SUFFIX}")
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default()
}

fn day(i: usize) -> String {
    (start_date() + Duration::days(i as i64))
        .format("%Y-%m-%d")
        .to_string()
}

fn close_at(i: usize) -> f64 {
    100.0 + i as f64 * 0.5
}

fn candle(i: usize, close: f64) -> Value {
    json!({
        "date": day(i),
        "open": close - 0.5,
        "high": close + 1.0,
        "low": close - 1.5,
        "close": close,
        "volume": 1_000_000
    })
}

fn history() -> Vec<Value> {
    (0..HISTORY_DAYS).map(|i| candle(i, close_at(i))).collect()
}

fn forecast(prediction_days: usize, shift: f64) -> Vec<Value> {
    (HISTORY_DAYS..HISTORY_DAYS + prediction_days)
        .map(|i| candle(i, close_at(i) + shift))
        .collect()
}

fn ticker_info(symbol: &str, prediction_days: usize, runs: usize) -> Value {
    json!({
        "symbol": symbol,
        "last_update": "2025-06-30T16:00:00.123456",
        "model_type": "kronos-transformer",
        "lookback_days": HISTORY_DAYS,
        "prediction_days": prediction_days,
        "monte_carlo_runs": runs
    })
}

fn summary_stats(prediction_days: usize) -> Value {
    let last_close = close_at(HISTORY_DAYS - 1);
    let predicted_close = close_at(HISTORY_DAYS + prediction_days - 1);
    let price_change = predicted_close - last_close;
    json!({
        "last_close": last_close,
        "predicted_close": predicted_close,
        "price_change": price_change,
        "price_change_percent": price_change / last_close * 100.0,
        "direction": "Bullish",
        "confidence": 72.5,
        "volatility": 18.4,
        "avg_volume": 1_250_000.0,
        "data_quality": {
            "completeness": 100.0,
            "historical_days": HISTORY_DAYS,
            "chart_ready": true
        }
    })
}

fn confidence_bands(prediction_days: usize) -> Value {
    let mut bands = serde_json::Map::new();
    for (label, offset) in PERCENTILES.iter().zip(BAND_OFFSETS) {
        let entries: Vec<Value> = (HISTORY_DAYS..HISTORY_DAYS + prediction_days)
            .map(|i| json!({"date": day(i), "value": close_at(i) + offset}))
            .collect();
        bands.insert((*label).to_string(), Value::Array(entries));
    }
    Value::Object(bands)
}

/// Current-format record with a 5-day horizon and 10 Monte Carlo runs.
pub fn current_record(symbol: &str) -> Value {
    current_record_with(symbol, 5, 10)
}

/// Current-format record with the given horizon (at least 1) and run count.
pub fn current_record_with(symbol: &str, prediction_days: usize, runs: usize) -> Value {
    let paths: Vec<Value> = (0..runs)
        .map(|r| Value::Array(forecast(prediction_days, r as f64 * 0.25)))
        .collect();
    json!({
        "ticker_info": ticker_info(symbol, prediction_days, runs),
        "data": {
            "metadata": {
                "prediction_days": prediction_days,
                "lookback_days": HISTORY_DAYS,
                "generated_at": "2025-06-30T16:05:12"
            },
            "historical_candlesticks": history(),
            "predictions": forecast(prediction_days, 0.0),
            "monte_carlo_paths": paths,
            "confidence_bands": confidence_bands(prediction_days)
        },
        "summary_stats": summary_stats(prediction_days)
    })
}

/// Legacy-format record: `chart_data` with numeric Monte Carlo simulations.
pub fn legacy_record(symbol: &str) -> Value {
    let prediction_days = 5;
    let runs = 4;
    let simulations: Vec<Value> = (0..runs)
        .map(|r| {
            (HISTORY_DAYS..HISTORY_DAYS + prediction_days)
                .map(|i| json!(close_at(i) + r as f64))
                .collect()
        })
        .collect();
    json!({
        "ticker_info": ticker_info(symbol, prediction_days, runs),
        "chart_data": {
            "historical_candlesticks": history(),
            "predicted_candlesticks": forecast(prediction_days, 0.0),
            "monte_carlo_simulations": simulations
        },
        "summary_stats": summary_stats(prediction_days)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FileValidator, ValidationPolicy};

    #[test]
    fn records_pass_full_scan() {
        let validator = FileValidator::new(ValidationPolicy::full_scan());
        let records = [
            current_record("SPY"),
            legacy_record("SPY"),
            current_record_with("SPY", 1, 0),
        ];
        for record in records {
            let outcome = validator.validate_record(&file_name("SPY"), &record);
            assert!(outcome.result.valid, "{:?}", outcome.result.errors);
        }
    }

    #[test]
    fn dates_are_consecutive_strings() {
        assert_eq!(day(0), "2025-06-02");
        assert_eq!(day(29), "2025-07-01");
    }
}
