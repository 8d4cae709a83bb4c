//! Report rendering and persistence.
//!
//! Rendering is pure: the JSON document, text summary, and per-file table are
//! deterministic functions of a finished report. [`ReportEmitter`] only
//! writes them out.

mod emitter;
mod export;
mod summary;

pub use emitter::{EmittedPaths, ReportEmitter, FILE_TABLE_NAME, REPORT_JSON_NAME, SUMMARY_TXT_NAME};
pub use export::{export_file_table_csv, import_json, render_json};
pub use summary::render_summary;
