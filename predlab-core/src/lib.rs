//! PredLab Core — record model, format detection, schema contract, invariant
//! checks, and the per-file validation pipeline.
//!
//! Everything here is a pure function of one file's contents:
//! - Domain types (candlesticks, record formats)
//! - Format classification, run once per record
//! - Required-key contract per format
//! - Stateless invariant predicates that collect every violation
//! - `FileValidator`, which turns bytes into a `FileOutcome`
//!
//! Corpus scanning, aggregation, and reporting live in `predlab-runner`.

pub mod checks;
pub mod decode;
pub mod domain;
pub mod pipeline;
pub mod result;
pub mod sample;
pub mod schema;
pub mod violation;

pub use checks::CheckOutcome;
pub use domain::{classify, Candlestick, RecordFormat};
pub use pipeline::{FileValidator, ValidationPolicy, FILE_SUFFIX};
pub use result::{BandCheck, FileMetrics, FileOutcome, FileResult, MonteCarloCheck};
pub use violation::{Violation, Warning};
