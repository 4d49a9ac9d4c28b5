//! Criterion benchmarks for blob encode and decode.
//!
//! Run with:
//!   cargo bench --bench blob
//!
//! Measures a representative workload — 10 metrics × 100 points of regular
//! one-second telemetry — across every compression variant, plus random
//! access and full iteration on the decoded view.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use mebo::{
    metric_id, Compression, EncoderConfig, NumericDecoder, NumericEncoder, TimestampEncoding,
};

const METRICS: u64 = 10;
const POINTS: i64 = 100;

fn encode_blob(compression: Compression) -> Vec<u8> {
    let config = EncoderConfig::new()
        .timestamps(TimestampEncoding::Delta)
        .compression(compression);
    let mut enc = NumericEncoder::new(0, config).unwrap();
    for m in 0..METRICS {
        enc.start_metric_name(&format!("host.cpu.{m}"), POINTS as usize)
            .unwrap();
        for i in 0..POINTS {
            enc.add_point(i * 1_000_000, 20.0 + ((i * 7 + m as i64) % 13) as f64)
                .unwrap();
        }
        enc.end_metric().unwrap();
    }
    enc.finish().unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("blob_encode");
    let raw_payload = (METRICS as u64) * (POINTS as u64) * 16;

    for compression in [
        Compression::None,
        Compression::Zstd,
        Compression::S2,
        Compression::Lz4,
    ] {
        group.throughput(Throughput::Bytes(raw_payload));
        group.bench_with_input(
            BenchmarkId::new("encode", compression),
            &compression,
            |b, &compression| b.iter(|| encode_blob(black_box(compression))),
        );
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("blob_decode");
    let raw_payload = (METRICS as u64) * (POINTS as u64) * 16;

    for compression in [
        Compression::None,
        Compression::Zstd,
        Compression::S2,
        Compression::Lz4,
    ] {
        let blob = encode_blob(compression);

        // Full decode + iteration of every point.
        group.throughput(Throughput::Bytes(raw_payload));
        group.bench_with_input(
            BenchmarkId::new("decode_iterate_all", compression),
            &blob,
            |b, blob| {
                b.iter(|| {
                    let view = NumericDecoder::new(blob).unwrap();
                    let mut sum = 0.0;
                    for m in 0..METRICS {
                        for (_, point) in view.all(metric_id(&format!("host.cpu.{m}"))) {
                            sum += point.value;
                        }
                    }
                    black_box(sum)
                })
            },
        );

        // Random access against a warm view (columns already materialized).
        let view = NumericDecoder::new(&blob).unwrap();
        let id = metric_id("host.cpu.3");
        group.bench_with_input(
            BenchmarkId::new("value_at_warm", compression),
            &view,
            |b, view| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for i in 0..POINTS as usize {
                        sum += view.value_at(black_box(id), i).unwrap();
                    }
                    black_box(sum)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
