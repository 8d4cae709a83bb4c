//! Writes the report artifacts into the reports directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use predlab_core::FileResult;

use super::export::{export_file_table_csv, render_json};
use super::summary::render_summary;
use crate::aggregate::CorpusReport;
use crate::config::GateConfig;

pub const REPORT_JSON_NAME: &str = "validation-report.json";
pub const SUMMARY_TXT_NAME: &str = "validation-summary.txt";
pub const FILE_TABLE_NAME: &str = "validation-files.csv";

/// Paths written by [`ReportEmitter::emit`].
#[derive(Debug, Clone)]
pub struct EmittedPaths {
    pub report_json: PathBuf,
    pub summary_txt: PathBuf,
    pub file_table: PathBuf,
}

/// Owns the output directory. Artifacts are overwritten on each emit.
#[derive(Debug, Clone)]
pub struct ReportEmitter {
    output_dir: PathBuf,
}

impl ReportEmitter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create reports directory {}", output_dir.display())
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn emit(
        &self,
        report: &CorpusReport,
        results: &[FileResult],
        gate: &GateConfig,
    ) -> Result<EmittedPaths> {
        let report_json = self.output_dir.join(REPORT_JSON_NAME);
        write(&report_json, &render_json(report)?)?;

        let summary_txt = self.output_dir.join(SUMMARY_TXT_NAME);
        write(&summary_txt, &render_summary(report, gate))?;

        let file_table = self.output_dir.join(FILE_TABLE_NAME);
        write(&file_table, &export_file_table_csv(results)?)?;

        tracing::info!(dir = %self.output_dir.display(), "reports written");
        Ok(EmittedPaths {
            report_json,
            summary_txt,
            file_table,
        })
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
