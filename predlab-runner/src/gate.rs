//! Release gate and readiness verdict.

use crate::aggregate::CorpusReport;
use crate::config::GateConfig;

/// Exact `valid / total >= pct / 100` on the raw counts.
///
/// `success_rate` is rounded for display and must not decide the gate.
/// Thresholds are honoured to 0.01 percentage points. An empty corpus only
/// meets a zero threshold.
pub fn meets_rate(valid: u64, total: u64, pct: f64) -> bool {
    let basis_points = (pct * 100.0).round().max(0.0) as u128;
    u128::from(valid) * 10_000 >= basis_points * u128::from(total) && (total > 0 || basis_points == 0)
}

/// True when the corpus clears the CI gate (`min_success_rate`).
pub fn passes_gate(report: &CorpusReport, gate: &GateConfig) -> bool {
    !report.cancelled && meets_rate(report.valid_files, report.total_files, gate.min_success_rate)
}

/// "Ready for downstream consumption": success rate at or above
/// `ready_success_rate` and no file that failed to read or parse.
pub fn ready_for_release(report: &CorpusReport, gate: &GateConfig) -> bool {
    !report.cancelled
        && meets_rate(report.valid_files, report.total_files, gate.ready_success_rate)
        && report.hard_errors == 0
}

/// Why the corpus is not ready, empty when it is.
pub fn readiness_blockers(report: &CorpusReport, gate: &GateConfig) -> Vec<String> {
    let mut blockers = Vec::new();
    if report.cancelled {
        blockers.push("scan was cancelled before every file was validated".to_string());
    }
    if !meets_rate(report.valid_files, report.total_files, gate.ready_success_rate) {
        blockers.push(format!(
            "success rate {:.2}% is below {:.2}%",
            report.success_rate, gate.ready_success_rate
        ));
    }
    if report.hard_errors > 0 {
        blockers.push(format!(
            "{} files could not be read or parsed",
            report.hard_errors
        ));
    }
    blockers
}
