//! Structured exports: the JSON report and the per-file CSV table.

use anyhow::{bail, Context, Result};

use predlab_core::FileResult;

use crate::aggregate::{CorpusReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a finished report to pretty JSON.
pub fn render_json(report: &CorpusReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize CorpusReport to JSON")
}

/// Deserialize a report, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<CorpusReport> {
    let report: CorpusReport =
        serde_json::from_str(json).context("failed to deserialize CorpusReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per file.
///
/// Columns: file_name, format, valid, fatal, error_count, warning_count,
/// first_error
pub fn export_file_table_csv(results: &[FileResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "file_name",
        "format",
        "valid",
        "fatal",
        "error_count",
        "warning_count",
        "first_error",
    ])?;

    for r in results {
        wtr.write_record([
            r.file_name.as_str(),
            r.detected_format.label(),
            if r.valid { "true" } else { "false" },
            if r.fatal { "true" } else { "false" },
            &r.errors.len().to_string(),
            &r.warnings.len().to_string(),
            r.errors.first().map(String::as_str).unwrap_or(""),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
