//! Exposition benchmarks
//!
//! Measures count parsing and text formatting for scrape-sized sample sets.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use wanguard_exporter::collector::emit_or_zero;
use wanguard_exporter::exposition::{Desc, PrometheusFormatter, SampleSink};

/// Build a sink shaped like an announcements scrape with `n` items
fn announcement_samples(n: usize) -> SampleSink {
    let active = Desc::gauge("wanguard_announcement_active", "Active announcements", &["count"]);
    let finished = Desc::gauge(
        "wanguard_announcement_finished",
        "Finished announcements",
        &["count"],
    );

    let mut sink = SampleSink::new();
    for i in 0..n {
        let key = i.to_string();
        let done = (i / 2).to_string();
        emit_or_zero(&mut sink, &active, &key, &[&key]);
        emit_or_zero(&mut sink, &finished, &done, &[&key]);
    }
    sink
}

fn benchmark_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_or_zero");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("announcements", size), &size, |b, &n| {
            b.iter(|| announcement_samples(n))
        });
    }

    group.finish();
}

fn benchmark_format(c: &mut Criterion) {
    let formatter = PrometheusFormatter::new();
    let mut group = c.benchmark_group("format");

    for size in [10, 100, 1000] {
        let samples = announcement_samples(size).into_samples();
        group.bench_with_input(BenchmarkId::new("announcements", size), &samples, |b, s| {
            b.iter(|| formatter.format(s))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_emit, benchmark_format);
criterion_main!(benches);
