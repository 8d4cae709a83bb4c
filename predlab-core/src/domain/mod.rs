//! Domain types for prediction records

pub mod candle;
pub mod format;

pub use candle::Candlestick;
pub use format::{classify, RecordFormat};
