//! E2E Suite 02: text blobs.
//!
//! Validates the byte-string value column and the optional tag column:
//! - round-trip with tags across compression variants
//! - the `has_tags` header flag
//! - empty values and empty tags
//! - shared-prefix parity with numeric blobs

use mebo::{
    metric_id, Compression, EncoderConfig, NumericEncoder, TextDecoder, TextEncoder,
    TimestampEncoding,
};

// ─────────────────────────────────────────────────────────────────────────────
// Tagged round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn tagged_blob_roundtrip_with_s2() {
    // 3 metrics × 5 points with growing values and per-point tags.
    let values: [&[u8]; 5] = [b"a", b"bb", b"ccc", b"dddd", b"eeeee"];
    let tags: [&[u8]; 5] = [b"t0", b"t1", b"t2", b"t3", b"t4"];

    let config = EncoderConfig::new()
        .compression(Compression::S2)
        .with_tags();
    let mut enc = TextEncoder::new(0, config).unwrap();
    for m in 0..3u32 {
        enc.start_metric_name(&format!("text.{m}"), 5).unwrap();
        for i in 0..5usize {
            enc.add_point((m as i64) * 100 + i as i64, values[i], tags[i])
                .unwrap();
        }
        enc.end_metric().unwrap();
    }
    let blob = enc.finish().unwrap();

    // has_tags is bit 1 of the flags byte.
    assert_eq!(blob[5] & 0b10, 0b10);

    let view = TextDecoder::new(&blob).unwrap();
    assert!(view.has_tags());
    assert_eq!(view.metric_count(), 3);

    for m in 0..3u32 {
        let id = metric_id(&format!("text.{m}"));
        for i in 0..5usize {
            assert_eq!(view.value_at(id, i), Some(values[i]));
            assert_eq!(view.tag_at(id, i), Some(tags[i]));
        }
        let points: Vec<_> = view.all(id).collect();
        assert_eq!(points.len(), 5);
        for (index, point) in points {
            assert_eq!(point.value, values[index]);
            assert_eq!(point.tag, Some(tags[index]));
        }
        let collected_tags: Vec<_> = view.all_tags(id).collect();
        assert_eq!(collected_tags, tags);
    }
}

#[test]
fn empty_values_and_tags_roundtrip() {
    let config = EncoderConfig::new().with_tags();
    let mut enc = TextEncoder::new(0, config).unwrap();
    enc.start_metric_name("sparse", 3).unwrap();
    enc.add_point(1, b"", b"").unwrap();
    enc.add_point(2, b"x", b"").unwrap();
    enc.add_point(3, b"", b"tag").unwrap();
    enc.end_metric().unwrap();
    let blob = enc.finish().unwrap();

    let view = TextDecoder::new(&blob).unwrap();
    let id = metric_id("sparse");
    assert_eq!(view.value_at(id, 0), Some(&b""[..]));
    assert_eq!(view.tag_at(id, 0), Some(&b""[..]));
    assert_eq!(view.value_at(id, 1), Some(&b"x"[..]));
    assert_eq!(view.tag_at(id, 1), Some(&b""[..]));
    assert_eq!(view.value_at(id, 2), Some(&b""[..]));
    assert_eq!(view.tag_at(id, 2), Some(&b"tag"[..]));
}

#[test]
fn text_roundtrip_across_all_configurations() {
    let points: Vec<(i64, Vec<u8>)> = (0..40i64)
        .map(|i| (i * 3, format!("value-{i:03}").into_bytes()))
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
            let mut enc = TextEncoder::new(0, config).unwrap();
            enc.start_metric_name("events", points.len()).unwrap();
            for (ts, v) in &points {
                enc.add_point(*ts, v, b"").unwrap();
            }
            enc.end_metric().unwrap();
            let blob = enc.finish().unwrap();

            let view = TextDecoder::new(&blob).unwrap();
            let id = metric_id("events");
            let decoded: Vec<(i64, Vec<u8>)> = view
                .all(id)
                .map(|(_, p)| (p.timestamp, p.value.to_vec()))
                .collect();
            assert_eq!(
                decoded, points,
                "{ts_encoding:?}/{compression} must round-trip text values"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Variant parity
// ─────────────────────────────────────────────────────────────────────────────

/// Everything before the value columns is shared machinery: for identical
/// configuration and identical timestamps, the header of a text blob and a
/// numeric blob differ only in flag bits that were actually requested.
#[test]
fn shared_header_prefix_matches_numeric_variant() {
    let timestamps = [10i64, 20, 30];

    let mut num = NumericEncoder::new(5, EncoderConfig::new()).unwrap();
    num.start_metric_id(0x77, 3).unwrap();
    for &ts in &timestamps {
        num.add_point(ts, 0.0).unwrap();
    }
    num.end_metric().unwrap();
    let numeric_blob = num.finish().unwrap();

    let mut text = TextEncoder::new(5, EncoderConfig::new()).unwrap();
    text.start_metric_id(0x77, 3).unwrap();
    for &ts in &timestamps {
        text.add_point(ts, b"", b"").unwrap();
    }
    text.end_metric().unwrap();
    let text_blob = text.finish().unwrap();

    // Identical header and identical index entry except column lengths, plus
    // an identical timestamp column.
    assert_eq!(numeric_blob[..34], text_blob[..34]);
    assert_eq!(numeric_blob[34..54], text_blob[34..54]);
    let ts_column = 34 + 28;
    assert_eq!(
        numeric_blob[ts_column..ts_column + 24],
        text_blob[ts_column..ts_column + 24]
    );
}
