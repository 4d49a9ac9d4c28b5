//! E2E Suite 01: numeric blobs.
//!
//! Validates the full encode → bytes → decode path for `f64` blobs:
//! - wire layout of the header and index for the simplest blob
//! - round-trip equality across every timestamp-encoding × compression pair
//! - single-point boundary behavior
//! - random access vs iteration agreement on larger blobs

use mebo::{
    metric_id, Compression, EncoderConfig, NumericDecoder, NumericEncoder, TimestampEncoding,
};

// ─────────────────────────────────────────────────────────────────────────────
// Simplest blob: one metric, raw timestamps, no compression
// ─────────────────────────────────────────────────────────────────────────────

fn simple_blob() -> Vec<u8> {
    let mut enc = NumericEncoder::new(1_000_000, EncoderConfig::new()).unwrap();
    enc.start_metric_id(0x1111, 3).unwrap();
    enc.add_point(1_000_000, 1.5).unwrap();
    enc.add_point(1_000_100, 2.5).unwrap();
    enc.add_point(1_000_200, 3.5).unwrap();
    enc.end_metric().unwrap();
    enc.finish().unwrap()
}

#[test]
fn simple_blob_wire_layout() {
    let blob = simple_blob();

    // Header: magic "MEBO" little-endian, version 1, no flags.
    assert_eq!(&blob[..4], &0x4D45_424Fu32.to_le_bytes());
    assert_eq!(blob[4], 1);
    assert_eq!(blob[5], 0);
    // metric_count at offset 10.
    assert_eq!(&blob[10..14], &1u32.to_le_bytes());
    // start_time_us at offset 14.
    assert_eq!(&blob[14..22], &1_000_000i64.to_le_bytes());

    // Index entry starts right after the 34-byte header.
    assert_eq!(&blob[34..42], &0x1111u64.to_le_bytes());
    assert_eq!(&blob[42..46], &3u32.to_le_bytes()); // point_count
    assert_eq!(&blob[46..50], &0u32.to_le_bytes()); // ts_offset
    assert_eq!(&blob[50..54], &24u32.to_le_bytes()); // ts_length: 3 × 8
    assert_eq!(&blob[54..58], &24u32.to_le_bytes()); // val_offset
    assert_eq!(&blob[58..62], &24u32.to_le_bytes()); // val_length: 3 × 8

    // Uncompressed, untagged: header + one entry + 48 payload bytes.
    assert_eq!(blob.len(), 34 + 28 + 48);
}

#[test]
fn simple_blob_roundtrip_exact() {
    let blob = simple_blob();
    let view = NumericDecoder::new(&blob).unwrap();

    assert_eq!(view.metric_count(), 1);
    assert!(view.contains(0x1111));

    let points: Vec<_> = view.all(0x1111).map(|(_, p)| (p.timestamp, p.value)).collect();
    assert_eq!(
        points,
        [(1_000_000, 1.5), (1_000_100, 2.5), (1_000_200, 3.5)]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Full configuration matrix round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn roundtrip_across_all_configurations() {
    let metrics: Vec<(String, Vec<(i64, f64)>)> = (0..4u64)
        .map(|m| {
            let points = (0..50i64)
                .map(|i| (1_000_000 + m as i64 * 7 + i * 250, (m as f64) * 100.0 + i as f64 * 0.5))
                .collect();
            (format!("series.{m}"), points)
        })
        .collect();

    for ts_encoding in [TimestampEncoding::Raw, TimestampEncoding::Delta] {
        for compression in [
            Compression::None,
            Compression::Zstd,
            Compression::S2,
            Compression::Lz4,
        ] {
            let config = EncoderConfig::new()
                .timestamps(ts_encoding)
                .compression(compression);
            let mut enc = NumericEncoder::new(1_000_000, config).unwrap();
            for (name, points) in &metrics {
                enc.start_metric_name(name, points.len()).unwrap();
                for &(ts, v) in points {
                    enc.add_point(ts, v).unwrap();
                }
                enc.end_metric().unwrap();
            }
            let blob = enc.finish().unwrap();

            let view = NumericDecoder::new(&blob).unwrap();
            assert_eq!(view.metric_count(), metrics.len());
            for (name, points) in &metrics {
                let id = metric_id(name);
                let decoded: Vec<_> =
                    view.all(id).map(|(_, p)| (p.timestamp, p.value)).collect();
                assert_eq!(
                    &decoded, points,
                    "{ts_encoding:?}/{compression} must round-trip {name}"
                );
            }
        }
    }
}

#[test]
fn delta_zstd_undercuts_raw_payload() {
    // 10 metrics × 100 points, timestamps one second apart.
    let config = EncoderConfig::new()
        .timestamps(TimestampEncoding::Delta)
        .compression(Compression::Zstd);
    let mut enc = NumericEncoder::new(0, config).unwrap();
    for m in 0..10u64 {
        enc.start_metric_id(0x1000 + m, 100).unwrap();
        for i in 0..100i64 {
            enc.add_point(i * 1_000_000, 20.0 + (i % 5) as f64).unwrap();
        }
        enc.end_metric().unwrap();
    }
    let blob = enc.finish().unwrap();

    let raw_payload = 10 * 100 * 16;
    assert!(
        blob.len() < raw_payload,
        "blob {} must be smaller than the raw payload {raw_payload}",
        blob.len()
    );

    let view = NumericDecoder::new(&blob).unwrap();
    for m in 0..10u64 {
        let decoded: Vec<_> = view
            .all(0x1000 + m)
            .map(|(_, p)| (p.timestamp, p.value))
            .collect();
        let expected: Vec<_> = (0..100i64)
            .map(|i| (i * 1_000_000, 20.0 + (i % 5) as f64))
            .collect();
        assert_eq!(decoded, expected);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Boundary: one metric, one point
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn single_point_blob_boundaries() {
    let mut enc = NumericEncoder::new(500, EncoderConfig::new()).unwrap();
    enc.start_metric_id(0xAB, 1).unwrap();
    enc.add_point(500, 42.0).unwrap();
    enc.end_metric().unwrap();
    let blob = enc.finish().unwrap();

    let view = NumericDecoder::new(&blob).unwrap();
    assert_eq!(view.point_count(0xAB), Some(1));
    assert_eq!(view.timestamp_at(0xAB, 0), Some(500));
    assert_eq!(view.value_at(0xAB, 0), Some(42.0));
    assert_eq!(view.timestamp_at(0xAB, 1), None);
    assert_eq!(view.value_at(0xAB, 1), None);
    assert_eq!(view.all(0xAB).count(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Re-encode stability
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_then_reencode_is_byte_identical() {
    let config = EncoderConfig::new()
        .timestamps(TimestampEncoding::Delta)
        .compression(Compression::Lz4);
    let build = |points: &[(i64, f64)]| {
        let mut enc = NumericEncoder::new(1_000, config).unwrap();
        enc.start_metric_id(9, points.len()).unwrap();
        for &(ts, v) in points {
            enc.add_point(ts, v).unwrap();
        }
        enc.end_metric().unwrap();
        enc.finish().unwrap()
    };

    let original: Vec<(i64, f64)> = (0..64).map(|i| (1_000 + i * 10, i as f64)).collect();
    let blob = build(&original);

    // Read everything back out and feed it through a fresh encoder.
    let view = NumericDecoder::new(&blob).unwrap();
    let recovered: Vec<(i64, f64)> = view.all(9).map(|(_, p)| (p.timestamp, p.value)).collect();
    assert_eq!(recovered, original);
    assert_eq!(build(&recovered), blob);
}
