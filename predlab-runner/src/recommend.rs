//! Corpus-level recommendations derived from a finished report.

use serde::{Deserialize, Serialize};

use crate::aggregate::CorpusReport;
use crate::config::GateConfig;
use crate::gate::meets_rate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub issue: String,
    pub description: String,
    pub action: String,
}

impl Recommendation {
    fn new(priority: Priority, issue: &str, description: String, action: &str) -> Self {
        Self {
            priority,
            issue: issue.to_string(),
            description,
            action: action.to_string(),
        }
    }
}

/// Threshold rules over the report, HIGH first. Rule order is kept within a
/// priority, so the output is a pure function of the report and the gate.
pub fn recommend(report: &CorpusReport, gate: &GateConfig) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if !meets_rate(report.valid_files, report.total_files, gate.min_success_rate) {
        out.push(Recommendation::new(
            Priority::High,
            "Low validation success rate",
            format!(
                "{} of {} files passed validation ({:.2}%), below the {:.2}% gate",
                report.valid_files, report.total_files, report.success_rate, gate.min_success_rate
            ),
            "Regenerate or repair the invalid files before release",
        ));
    }

    if report.monte_carlo_paths.inconsistent > 0 {
        out.push(Recommendation::new(
            Priority::Medium,
            "Monte Carlo path count mismatch",
            format!(
                "{} files declare a monte_carlo_runs count that differs from the paths present",
                report.monte_carlo_paths.inconsistent
            ),
            "Check the simulation step of the prediction pipeline",
        ));
    }

    if report.confidence_bands.incomplete > 0 {
        out.push(Recommendation::new(
            Priority::Medium,
            "Incomplete confidence bands",
            format!(
                "{} files have missing percentiles or band lengths that differ from the forecast horizon",
                report.confidence_bands.incomplete
            ),
            "Recompute percentile bands over the full forecast horizon",
        ));
    }

    let cutoff = report.total_files as f64 * gate.pattern_share_pct / 100.0;
    for (category, tally) in report
        .top_error_patterns()
        .into_iter()
        .filter(|(_, tally)| tally.files as f64 > cutoff)
        .take(gate.max_pattern_recommendations)
    {
        out.push(Recommendation::new(
            Priority::High,
            &format!("Systemic error: {category}"),
            format!(
                "{} files ({} occurrences) report {category}, first seen in {}",
                tally.files, tally.occurrences, tally.first_seen
            ),
            "Fix the generator stage that produces this error class",
        ));
    }

    if report.mixed_formats() {
        out.push(Recommendation::new(
            Priority::Medium,
            "Mixed formats",
            format!(
                "{} legacy and {} current format files are present",
                report.formats.legacy, report.formats.current
            ),
            "Migrate legacy chart_data files to the current data layout",
        ));
    }

    out.sort_by_key(|r| r.priority);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::config::AggregateConfig;
    use chrono::{DateTime, Utc};
    use predlab_core::{FileMetrics, FileResult, MonteCarloCheck, RecordFormat};

    fn file(name: &str, format: RecordFormat, errors: &[&str]) -> FileResult {
        FileResult {
            file_name: name.into(),
            detected_format: format,
            valid: errors.is_empty(),
            errors: errors.iter().map(|s| s.to_string()).collect(),
            warnings: Vec::new(),
            fatal: false,
        }
    }

    fn finish(agg: Aggregator) -> CorpusReport {
        agg.finish(DateTime::<Utc>::default(), &GateConfig::default())
    }

    #[test]
    fn clean_corpus_has_no_recommendations() {
        let mut agg = Aggregator::new("d", AggregateConfig::default());
        for i in 0..10 {
            let metrics = FileMetrics {
                monte_carlo: MonteCarloCheck::Consistent,
                ..FileMetrics::default()
            };
            agg.fold(&file(&format!("F{i}"), RecordFormat::Current, &[]), &metrics);
        }
        assert!(finish(agg).recommendations.is_empty());
    }

    #[test]
    fn rules_fire_and_high_comes_first() {
        let mut agg = Aggregator::new("d", AggregateConfig::default());
        let mismatch = FileMetrics {
            monte_carlo: MonteCarloCheck::Inconsistent,
            ..FileMetrics::default()
        };
        agg.fold(&file("A", RecordFormat::Legacy, &[]), &mismatch);
        agg.fold(&file("B", RecordFormat::Current, &["Invalid OHLC: x"]), &FileMetrics::default());
        let report = finish(agg);

        let issues: Vec<(Priority, &str)> = report
            .recommendations
            .iter()
            .map(|r| (r.priority, r.issue.as_str()))
            .collect();
        assert_eq!(
            issues,
            vec![
                (Priority::High, "Low validation success rate"),
                (Priority::High, "Systemic error: Invalid OHLC"),
                (Priority::Medium, "Monte Carlo path count mismatch"),
                (Priority::Medium, "Mixed formats"),
            ]
        );
    }

    #[test]
    fn pattern_rules_are_capped_and_tie_broken() {
        let mut agg = Aggregator::new("d", AggregateConfig::default());
        let metrics = FileMetrics::default();
        agg.fold(&file("A", RecordFormat::Current, &["Zeta: 1", "Type Error: 1"]), &metrics);
        agg.fold(&file("B", RecordFormat::Current, &["Alpha: 1", "Type Error: 2"]), &metrics);
        agg.fold(&file("C", RecordFormat::Current, &["Beta: 1"]), &metrics);
        agg.fold(&file("D", RecordFormat::Current, &["Gamma: 1"]), &metrics);
        let report = finish(agg);

        let patterns: Vec<&str> = report
            .recommendations
            .iter()
            .filter_map(|r| r.issue.strip_prefix("Systemic error: "))
            .collect();
        // Type Error hits two files; the single-file ties go by first-seen file
        assert_eq!(patterns, vec!["Type Error", "Zeta", "Alpha"]);
    }

    #[test]
    fn priority_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        assert_eq!(Priority::Medium.label(), "MEDIUM");
    }
}
