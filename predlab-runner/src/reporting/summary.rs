//! Human-readable text summary.

use crate::aggregate::{CorpusReport, DateSpan, NumericStat};
use crate::config::GateConfig;
use crate::gate::{readiness_blockers, ready_for_release};

/// Patterns and offenders listed in the summary.
const LIST_LIMIT: usize = 10;

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn stat_line(label: &str, stat: &NumericStat) -> String {
    format!(
        "  {label:<22} min {}  avg {}  max {}  (n={})\n",
        opt(stat.min),
        opt(stat.avg),
        opt(stat.max),
        stat.count
    )
}

fn span_line(label: &str, span: &DateSpan) -> String {
    match (span.earliest, span.latest) {
        (Some(first), Some(last)) => format!("  {label:<22} {first} .. {last}\n"),
        _ => format!("  {label:<22} n/a\n"),
    }
}

fn heading(title: &str) -> String {
    format!("\n{title}\n{}\n", "-".repeat(title.len()))
}

/// Render the text summary. File-level outcomes come first; corpus-level
/// recommendations are kept in their own closing section.
pub fn render_summary(report: &CorpusReport, gate: &GateConfig) -> String {
    let title = "Prediction Corpus Validation Summary";
    let mut out = format!("{title}\n{}\n", "=".repeat(title.len()));
    out.push_str(&format!(
        "Generated:          {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Data directory:     {}\n", report.data_dir));
    out.push_str(&format!("Corpus fingerprint: {}\n", report.corpus_fingerprint));
    if report.cancelled {
        out.push_str("Scan status:        CANCELLED (partial report)\n");
    } else {
        out.push_str("Scan status:        complete\n");
    }

    out.push_str(&heading("File Outcomes"));
    out.push_str(&format!(
        "  Total files:          {} (discovered {})\n",
        report.total_files, report.discovered_files
    ));
    out.push_str(&format!("  Valid files:          {}\n", report.valid_files));
    out.push_str(&format!("  Invalid files:        {}\n", report.invalid_files));
    out.push_str(&format!("  Files with warnings:  {}\n", report.files_with_warnings));
    out.push_str(&format!("  Success rate:         {:.2}%\n", report.success_rate));

    out.push_str(&heading("Format Breakdown"));
    out.push_str(&format!("  Current:       {}\n", report.formats.current));
    out.push_str(&format!("  Legacy:        {}\n", report.formats.legacy));
    out.push_str(&format!("  Unrecognized:  {}\n", report.formats.unrecognized));

    out.push_str(&heading("Data Quality"));
    let quality = &report.data_quality;
    out.push_str(&format!(
        "  Chart ready:           {} ({:.2}%)\n",
        quality.chart_ready_files, quality.chart_ready_pct
    ));
    out.push_str(&format!(
        "  100% complete:         {} ({:.2}%)\n",
        quality.fully_complete_files, quality.fully_complete_pct
    ));
    out.push_str(&stat_line("Completeness (%)", &quality.completeness));
    out.push_str(&format!(
        "  Monte Carlo paths:     {} consistent, {} inconsistent, {} missing\n",
        report.monte_carlo_paths.consistent,
        report.monte_carlo_paths.inconsistent,
        report.monte_carlo_paths.missing
    ));
    out.push_str(&format!(
        "  Confidence bands:      {} complete, {} incomplete, {} missing\n",
        report.confidence_bands.complete,
        report.confidence_bands.incomplete,
        report.confidence_bands.missing
    ));
    out.push_str(&stat_line("Last close", &report.last_close));
    out.push_str(&stat_line("Predicted close", &report.predicted_close));
    out.push_str(&stat_line("Avg volume", &report.avg_volume));
    out.push_str(&stat_line("Confidence", &report.confidence));
    out.push_str(&stat_line("File size (bytes)", &report.file_size));
    out.push_str(&span_line("Historical dates", &report.historical_dates));
    out.push_str(&span_line("Prediction dates", &report.prediction_dates));

    out.push_str(&heading("Errors and Warnings"));
    out.push_str(&format!("  Total errors:    {}\n", report.total_errors));
    out.push_str(&format!("  Total warnings:  {}\n", report.total_warnings));
    out.push_str(&format!(
        "  Hard errors:     {} (files that could not be read or parsed)\n",
        report.hard_errors
    ));
    let errors = report.top_error_patterns();
    if !errors.is_empty() {
        out.push_str("  Top error patterns:\n");
        for (category, tally) in errors.iter().take(LIST_LIMIT) {
            out.push_str(&format!(
                "    - {category}: {} files, {} occurrences\n",
                tally.files, tally.occurrences
            ));
        }
    }
    let warnings = report.top_warning_patterns();
    if !warnings.is_empty() {
        out.push_str("  Top warning patterns:\n");
        for (category, tally) in warnings.iter().take(LIST_LIMIT) {
            out.push_str(&format!(
                "    - {category}: {} files, {} occurrences\n",
                tally.files, tally.occurrences
            ));
        }
    }
    if !report.worst_offenders.is_empty() {
        out.push_str("  Worst offenders:\n");
        for offender in report.worst_offenders.iter().take(LIST_LIMIT) {
            out.push_str(&format!(
                "    - {}: {} errors\n",
                offender.file_name,
                offender.errors.len()
            ));
        }
    }

    out.push_str(&heading("Verdict"));
    if ready_for_release(report, gate) {
        out.push_str("  Verdict: READY for downstream consumption\n");
    } else {
        out.push_str("  Verdict: NOT READY for downstream consumption\n");
        for blocker in readiness_blockers(report, gate) {
            out.push_str(&format!("    - {blocker}\n"));
        }
    }

    out.push_str(&heading("Corpus Recommendations"));
    if report.recommendations.is_empty() {
        out.push_str("  None\n");
    }
    for (i, rec) in report.recommendations.iter().enumerate() {
        out.push_str(&format!(
            "  {}. [{}] {}\n     {}\n     Action: {}\n",
            i + 1,
            rec.priority.label(),
            rec.issue,
            rec.description,
            rec.action
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::config::AggregateConfig;
    use chrono::{DateTime, Utc};
    use predlab_core::{FileMetrics, FileOutcome};

    #[test]
    fn summary_lists_outcomes_before_recommendations() {
        let mut agg = Aggregator::new("/data", AggregateConfig::default());
        agg.fold_outcome(&FileOutcome::fatal(
            "BAD_ohlcv_prediction.json",
            "Parse Error: eof".into(),
            FileMetrics::default(),
        ));
        let gate = GateConfig::default();
        let report = agg.finish(DateTime::<Utc>::default(), &gate);
        let text = render_summary(&report, &gate);

        assert!(text.contains("Generated:          1970-01-01 00:00:00 UTC"));
        assert!(text.contains("Success rate:         0.00%"));
        assert!(text.contains("Hard errors:     1"));
        assert!(text.contains("- Parse Error: 1 files, 1 occurrences"));
        assert!(text.contains("Verdict: NOT READY for downstream consumption"));
        let outcomes = text.find("File Outcomes").unwrap();
        let recs = text.find("Corpus Recommendations").unwrap();
        assert!(outcomes < recs);
        assert!(text.contains("[HIGH] Low validation success rate"));
    }

    #[test]
    fn empty_stats_render_as_na() {
        assert_eq!(
            stat_line("x", &NumericStat::default()),
            format!("  {:<22} min n/a  avg n/a  max n/a  (n=0)\n", "x")
        );
    }
}
