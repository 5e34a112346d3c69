//! Criterion benchmarks for dual_stream_logger

use chrono::Local;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dual_stream_logger::appenders::{BufferPolicy, BufferedSink};
use dual_stream_logger::core::{JsonEncoder, LogRecord, RecordEncoder, TextEncoder};
use dual_stream_logger::prelude::*;
use dual_stream_logger::{Appender, EncoderOptions, FilterPipeline};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn bench_config(dir: &TempDir) -> Config {
    Config::default()
        .with_log_dir(dir.path())
        .with_app_name("bench")
        .with_console(false)
        .with_flush_interval(Duration::ZERO)
}

fn sample_record() -> LogRecord {
    LogRecord::new(
        Local::now(),
        LogLevel::Info,
        "request served",
        attrs![
            "method" => "GET",
            "path" => "/api/v1/orders",
            "status" => 200,
            "latency_ms" => 12.5,
        ],
    )
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let record = sample_record();
    let text = TextEncoder::new(EncoderOptions::default());
    let json = JsonEncoder::new(EncoderOptions::default());
    let grouped = text
        .with_attributes(attrs!["service" => "orders"])
        .with_group("http");

    group.bench_function("text", |b| {
        b.iter(|| black_box(text.encode(black_box(&record))));
    });

    group.bench_function("json", |b| {
        b.iter(|| black_box(json.encode(black_box(&record))));
    });

    group.bench_function("text_with_group", |b| {
        b.iter(|| black_box(grouped.encode(black_box(&record))));
    });

    group.finish();
}

// ============================================================================
// Filter Pipeline Benchmarks
// ============================================================================

fn bench_filter_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_pipeline");
    group.throughput(Throughput::Elements(1));

    let record = sample_record();
    let empty = FilterPipeline::new(&FilterConfig::new());
    let full = FilterPipeline::new(
        &FilterConfig::new()
            .with_condition(level_condition(LogLevel::Info))
            .with_field_filter("path", mask_field("***"))
            .with_regex_filter(r"\d{3,}", "#")
            .with_rate_limit(LogLevel::Info, u64::MAX, Duration::from_secs(1)),
    );

    group.bench_function("no_filters", |b| {
        b.iter(|| black_box(empty.evaluate(LogLevel::Info, &record.message, &record.attributes)));
    });

    group.bench_function("all_filters", |b| {
        b.iter(|| black_box(full.evaluate(LogLevel::Info, &record.message, &record.attributes)));
    });

    group.finish();
}

// ============================================================================
// Buffered Sink Benchmarks
// ============================================================================

fn bench_buffered_sink(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_sink");
    let line = TextEncoder::new(EncoderOptions::default())
        .encode(&sample_record())
        .unwrap_or_default();
    group.throughput(Throughput::Bytes(line.len() as u64));

    let buffered = BufferedSink::new(
        "sink",
        io::sink(),
        BufferPolicy {
            flush_interval: Duration::ZERO,
            ..BufferPolicy::default()
        },
    )
    .unwrap();
    let unbuffered = BufferedSink::new("sink", io::sink(), BufferPolicy::unbuffered()).unwrap();

    group.bench_function("buffered", |b| {
        b.iter(|| buffered.append(LogLevel::Info, black_box(&line)));
    });

    group.bench_function("unbuffered", |b| {
        b.iter(|| unbuffered.append(LogLevel::Info, black_box(&line)));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let dir = TempDir::new().unwrap();
    let logger = Logger::new(bench_config(&dir)).unwrap();
    let json_dir = TempDir::new().unwrap();
    let json_logger = Logger::new(bench_config(&json_dir).with_json_format(true)).unwrap();

    group.bench_function("info_text", |b| {
        b.iter(|| logger.info(black_box("Info message"), attrs!["n" => 1]));
    });

    group.bench_function("info_json", |b| {
        b.iter(|| json_logger.info(black_box("Info message"), attrs!["n" => 1]));
    });

    group.bench_function("warn_dual_stream", |b| {
        b.iter(|| logger.warn(black_box("Warn message"), attrs!["n" => 1]));
    });

    group.finish();
    logger.close().unwrap();
    json_logger.close().unwrap();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let dir = TempDir::new().unwrap();
    let logger = Logger::new(bench_config(&dir).with_level(LogLevel::Error)).unwrap();

    group.bench_function("filtered_out", |b| {
        b.iter(|| logger.debug(black_box("Filtered message"), []));
    });

    group.bench_function("is_enabled", |b| {
        b.iter(|| black_box(logger.is_enabled(LogLevel::Debug)));
    });

    group.finish();
    logger.close().unwrap();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");
    group.sample_size(20);

    let dir = TempDir::new().unwrap();
    let logger = Arc::new(Logger::new(bench_config(&dir)).unwrap());

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 100) as u64));
        group.bench_function(format!("{}_threads", threads), |b| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let logger = Arc::clone(&logger);
                        thread::spawn(move || {
                            for i in 0..100 {
                                logger.info("concurrent", attrs!["thread" => t, "seq" => i]);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            });
        });
    }

    group.finish();
    logger.close().unwrap();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_encoding,
    bench_filter_pipeline,
    bench_buffered_sink,
    bench_logging,
    bench_level_filtering,
    bench_concurrent_logging
);

criterion_main!(benches);
