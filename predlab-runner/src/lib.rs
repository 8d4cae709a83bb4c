//! PredLab Runner — corpus scanning, aggregation, gating, report emission.
//!
//! This crate builds on `predlab-core` to provide:
//! - Layered TOML configuration with CLI-friendly overrides
//! - Parallel corpus scan with cancellation and progress reporting
//! - Deterministic single-threaded aggregation into a `CorpusReport`
//! - Corpus-level recommendations and the release gate
//! - JSON, text, and CSV report artifacts

pub mod aggregate;
pub mod config;
pub mod gate;
pub mod recommend;
pub mod reporting;
pub mod scanner;

pub use aggregate::{
    Aggregator, BandTally, CorpusReport, DataQuality, DateSpan, FormatCounts, MonteCarloTally,
    NumericStat, PatternTally, SCHEMA_VERSION,
};
pub use config::{
    AggregateConfig, ConfigError, GateConfig, PipelineConfig, ScanConfig, ValidatorConfig,
};
pub use gate::{meets_rate, passes_gate, readiness_blockers, ready_for_release};
pub use recommend::{recommend, Priority, Recommendation};
pub use reporting::{render_json, render_summary, EmittedPaths, ReportEmitter};
pub use scanner::{discover_files, scan_corpus, ScanError, ScanOutput, ScanProgress};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn corpus_report_is_send_sync() {
        assert_send::<CorpusReport>();
        assert_sync::<CorpusReport>();
    }

    #[test]
    fn aggregator_is_send_sync() {
        assert_send::<Aggregator>();
        assert_sync::<Aggregator>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ValidatorConfig>();
        assert_sync::<ValidatorConfig>();
        assert_send::<ScanProgress>();
        assert_sync::<ScanProgress>();
    }

    #[test]
    fn scan_output_is_send_sync() {
        assert_send::<ScanOutput>();
        assert_sync::<ScanOutput>();
    }
}
