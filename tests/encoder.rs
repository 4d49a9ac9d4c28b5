// Unit tests for src/blob/encoder.rs — the builder state machine, exercised
// through the public API.

use mebo::{
    metric_id, Compression, EncodeError, EncoderConfig, NumericDecoder, NumericEncoder,
    TextEncoder, TimestampEncoding,
};

#[test]
fn start_requires_positive_count() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    assert_eq!(enc.start_metric_id(1, 0), Err(EncodeError::InvalidCount));
    assert_eq!(enc.start_metric_name("m", 0), Err(EncodeError::InvalidCount));
}

#[test]
fn empty_name_is_rejected() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    assert_eq!(
        enc.start_metric_name("", 1),
        Err(EncodeError::InvalidMetricName)
    );
}

#[test]
fn duplicate_id_is_a_hash_collision() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_id(0x1111, 1).unwrap();
    enc.add_point(1, 1.0).unwrap();
    enc.end_metric().unwrap();
    assert_eq!(
        enc.start_metric_id(0x1111, 1),
        Err(EncodeError::HashCollision)
    );
}

#[test]
fn duplicate_name_is_already_started() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_name("cpu", 1).unwrap();
    enc.add_point(1, 1.0).unwrap();
    enc.end_metric().unwrap();
    assert_eq!(
        enc.start_metric_name("cpu", 1),
        Err(EncodeError::MetricAlreadyStarted)
    );
}

#[test]
fn start_while_metric_open_is_rejected() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_id(1, 2).unwrap();
    assert_eq!(enc.start_metric_id(2, 1), Err(EncodeError::MetricStillOpen));
}

#[test]
fn point_operations_require_an_open_metric() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    assert_eq!(enc.add_point(1, 1.0), Err(EncodeError::NoMetricOpen));
    assert_eq!(enc.end_metric(), Err(EncodeError::NoMetricOpen));
}

#[test]
fn too_many_points_is_rejected_at_the_boundary() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_id(1, 1).unwrap();
    enc.add_point(1, 1.0).unwrap();
    assert_eq!(enc.add_point(2, 2.0), Err(EncodeError::TooManyPoints));
}

#[test]
fn undercount_blocks_end_metric_until_fed() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_id(1, 3).unwrap();
    enc.add_point(1, 1.0).unwrap();
    enc.add_point(2, 2.0).unwrap();
    assert_eq!(enc.end_metric(), Err(EncodeError::PointCountMismatch));
    enc.add_point(3, 3.0).unwrap();
    enc.end_metric().unwrap();
    enc.finish().unwrap();
}

#[test]
fn finish_on_empty_blob_is_rejected() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    assert_eq!(enc.finish(), Err(EncodeError::EmptyBlob));
}

#[test]
fn every_operation_fails_after_finish() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_id(1, 1).unwrap();
    enc.add_point(1, 1.0).unwrap();
    enc.end_metric().unwrap();
    let blob = enc.finish().unwrap();
    assert!(!blob.is_empty());

    assert_eq!(enc.finish(), Err(EncodeError::AlreadyFinished));
    assert_eq!(enc.start_metric_id(2, 1), Err(EncodeError::AlreadyFinished));
    assert_eq!(
        enc.start_metric_name("x", 1),
        Err(EncodeError::AlreadyFinished)
    );
    assert_eq!(enc.add_point(1, 1.0), Err(EncodeError::AlreadyFinished));
    assert_eq!(enc.end_metric(), Err(EncodeError::AlreadyFinished));
}

#[test]
fn delta_rejects_backwards_timestamps_only() {
    let config = EncoderConfig::new().timestamps(TimestampEncoding::Delta);
    let mut enc = NumericEncoder::new(1_000, config).unwrap();
    enc.start_metric_id(1, 3).unwrap();
    // First point may precede the blob anchor.
    enc.add_point(900, 1.0).unwrap();
    assert_eq!(enc.add_point(899, 2.0), Err(EncodeError::TimestampBackwards));
    // Equal timestamps are legal (zero delta).
    enc.add_point(900, 2.0).unwrap();
    enc.add_point(901, 3.0).unwrap();
    enc.end_metric().unwrap();
    enc.finish().unwrap();
}

#[test]
fn raw_mode_accepts_backwards_timestamps() {
    let mut enc = NumericEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_id(1, 2).unwrap();
    enc.add_point(100, 1.0).unwrap();
    enc.add_point(50, 2.0).unwrap();
    enc.end_metric().unwrap();
    let blob = enc.finish().unwrap();

    let view = NumericDecoder::new(&blob).unwrap();
    assert_eq!(view.timestamp_at(1, 1), Some(50));
}

#[test]
fn numeric_config_with_tags_is_invalid() {
    assert_eq!(
        NumericEncoder::new(0, EncoderConfig::new().with_tags()).err(),
        Some(EncodeError::InvalidConfig)
    );
}

#[test]
fn text_encoder_accepts_tag_config() {
    let mut enc = TextEncoder::new(0, EncoderConfig::new().with_tags()).unwrap();
    enc.start_metric_name("m", 1).unwrap();
    enc.add_point(1, b"v", b"t").unwrap();
    enc.end_metric().unwrap();
    enc.finish().unwrap();
}

#[test]
fn compressed_blob_is_smaller_for_regular_series() {
    // 10 metrics x 100 points, one second apart: delta + zstd must beat the
    // raw uncompressed payload by a wide margin.
    let raw_payload = 10 * 100 * 16; // 8-byte timestamp + 8-byte value each

    let config = EncoderConfig::new()
        .timestamps(TimestampEncoding::Delta)
        .compression(Compression::Zstd);
    let mut enc = NumericEncoder::new(1_000_000, config).unwrap();
    for m in 0..10u64 {
        enc.start_metric_name(&format!("metric.{m}"), 100).unwrap();
        for i in 0..100i64 {
            enc.add_point(1_000_000 + i * 1_000_000, i as f64).unwrap();
        }
        enc.end_metric().unwrap();
    }
    let blob = enc.finish().unwrap();
    assert!(
        blob.len() < raw_payload,
        "blob {} should undercut raw payload {raw_payload}",
        blob.len()
    );

    // And it still round-trips.
    let view = NumericDecoder::new(&blob).unwrap();
    assert_eq!(view.metric_count(), 10);
    assert_eq!(
        view.timestamp_at(metric_id("metric.9"), 99),
        Some(1_000_000 + 99 * 1_000_000)
    );
}
