use criterion::{Criterion, criterion_group, criterion_main};
use mcprobe::{Endpoint, Probe, discovery, endpoint, ping, stats::StatLine};
use std::hint::black_box;
use std::time::Duration;

fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("stat_line", |b| {
        b.iter(|| black_box(StatLine::parse(black_box("STAT curr_connections 10"))))
    });

    group.bench_function("endpoints", |b| {
        b.iter(|| black_box(endpoint::parse(black_box("11211, 11212,10.0.0.5:11211,cache-1:11300"))))
    });

    group.bench_function("discovery_json", |b| {
        let endpoints = endpoint::parse("11211,11212,10.0.0.5:11211");
        b.iter(|| {
            let entries = discovery::format(black_box(&endpoints));
            black_box(discovery::LldDocument::new(&entries).to_json())
        })
    });

    group.bench_function("ping_expected_response", |b| {
        b.iter(|| black_box(ping::expected_response(black_box("20240101120000"))))
    });

    group.finish();
}

fn refused_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("refused");

    // Measures the failure path: nothing listens on port 1
    let probe = Probe::new(Endpoint::local(1), Duration::from_millis(100));
    let rt = tokio::runtime::Runtime::new().unwrap();

    group.bench_function("stat_connection_refused", |b| {
        b.iter(|| rt.block_on(async { black_box(probe.stat("uptime").await) }))
    });

    group.bench_function("ping_connection_refused", |b| {
        b.iter(|| rt.block_on(async { black_box(probe.ping().await) }))
    });

    group.finish();
}

criterion_group!(benches, parse_benchmark, refused_benchmark);
criterion_main!(benches);
