//! Invariant checks.
//!
//! Each predicate is stateless and total over arbitrary JSON: it collects
//! every violation it can find for its construct instead of stopping at the
//! first one, and never panics on malformed input.

mod bands;
mod candle;
mod dates;
mod monte_carlo;
mod summary;
mod ticker;

pub use bands::{bands_complete, validate_confidence_bands, PERCENTILES};
pub use candle::{validate_candlestick, validate_ohlc};
pub use dates::{parse_date, parse_timestamp, validate_date_format, validate_timestamp};
pub use monte_carlo::validate_monte_carlo_path;
pub use summary::validate_summary_stats;
pub use ticker::validate_ticker_info;

use crate::violation::{Violation, Warning};

/// Result of one or more checks: every error and warning found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutcome {
    pub errors: Vec<Violation>,
    pub warnings: Vec<Warning>,
}

impl CheckOutcome {
    /// True when no errors were found. Warnings do not count.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, violation: Violation) {
        self.errors.push(violation);
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: CheckOutcome) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Record the error of a failed decode and hand back the value otherwise.
    pub fn take<T>(&mut self, result: Result<T, Violation>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(violation) => {
                self.errors.push(violation);
                None
            }
        }
    }
}
