//! Criterion benchmarks for the per-file validation path.
//!
//! Benchmarks:
//! 1. Full pipeline on an in-memory current-format file, sampled vs full scan
//! 2. Confidence band validation across horizons
//! 3. Format classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use predlab_core::checks::validate_confidence_bands;
use predlab_core::domain::classify;
use predlab_core::pipeline::{FileValidator, ValidationPolicy};
use predlab_core::sample;

// ── 1. Pipeline ──────────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_pipeline");
    let name = sample::file_name("SPY");

    for &runs in &[10usize, 100] {
        let bytes = serde_json::to_vec(&sample::current_record_with("SPY", 5, runs))
            .unwrap_or_default();
        let sampled = FileValidator::new(ValidationPolicy::default());
        let full = FileValidator::new(ValidationPolicy::full_scan());

        group.bench_with_input(BenchmarkId::new("sampled", runs), &bytes, |b, bytes| {
            b.iter(|| sampled.validate_bytes(&name, black_box(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("full_scan", runs), &bytes, |b, bytes| {
            b.iter(|| full.validate_bytes(&name, black_box(bytes)))
        });
    }

    group.finish();
}

// ── 2. Confidence bands ──────────────────────────────────────────────

fn bench_bands(c: &mut Criterion) {
    let mut group = c.benchmark_group("confidence_bands");

    for &days in &[5usize, 30, 90] {
        let record = sample::current_record_with("SPY", days, 0);
        let bands = record["data"]["confidence_bands"].clone();
        group.bench_with_input(BenchmarkId::from_parameter(days), &bands, |b, bands| {
            b.iter(|| validate_confidence_bands(black_box(bands), days, "data.confidence_bands"))
        });
    }

    group.finish();
}

// ── 3. Classification ────────────────────────────────────────────────

fn bench_classify(c: &mut Criterion) {
    let current = sample::current_record("SPY");
    let legacy = sample::legacy_record("SPY");
    c.bench_function("classify_current_and_legacy", |b| {
        b.iter(|| (classify(black_box(&current)), classify(black_box(&legacy))))
    });
}

criterion_group!(benches, bench_pipeline, bench_bands, bench_classify);
criterion_main!(benches);
