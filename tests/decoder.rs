// Unit tests for src/blob/decoder.rs — lookup policy, accessor/iterator
// agreement, lazy decompression, and concurrent reads.

use mebo::{
    metric_id, Compression, EncoderConfig, NumericDecoder, NumericEncoder, TextDecoder,
    TextEncoder, TimestampEncoding,
};

fn two_metric_blob(compression: Compression) -> Vec<u8> {
    let config = EncoderConfig::new()
        .timestamps(TimestampEncoding::Delta)
        .compression(compression);
    let mut enc = NumericEncoder::new(1_000_000, config).unwrap();
    enc.start_metric_name("alpha", 3).unwrap();
    enc.add_point(1_000_000, 1.5).unwrap();
    enc.add_point(1_000_100, 2.5).unwrap();
    enc.add_point(1_000_200, 3.5).unwrap();
    enc.end_metric().unwrap();
    enc.start_metric_name("beta", 2).unwrap();
    enc.add_point(1_000_050, -1.0).unwrap();
    enc.add_point(1_000_150, -2.0).unwrap();
    enc.end_metric().unwrap();
    enc.finish().unwrap()
}

#[test]
fn blob_level_getters() {
    let blob = two_metric_blob(Compression::S2);
    let view = NumericDecoder::new(&blob).unwrap();
    assert_eq!(view.metric_count(), 2);
    assert_eq!(view.start_time(), 1_000_000);
    assert_eq!(view.timestamp_encoding(), TimestampEncoding::Delta);
    assert_eq!(view.compression(), Compression::S2);
    assert!(!view.has_tags());
    assert!(!view.has_collision());
}

#[test]
fn contains_and_point_count() {
    let blob = two_metric_blob(Compression::None);
    let view = NumericDecoder::new(&blob).unwrap();
    assert!(view.contains(metric_id("alpha")));
    assert!(view.contains(metric_id("beta")));
    assert!(!view.contains(0xDEAD));
    assert_eq!(view.point_count(metric_id("alpha")), Some(3));
    assert_eq!(view.point_count(metric_id("beta")), Some(2));
    assert_eq!(view.point_count(0xDEAD), None);
}

#[test]
fn out_of_range_and_unknown_are_none_not_errors() {
    let blob = two_metric_blob(Compression::None);
    let view = NumericDecoder::new(&blob).unwrap();
    let alpha = metric_id("alpha");

    assert_eq!(view.timestamp_at(alpha, 2), Some(1_000_200));
    assert_eq!(view.timestamp_at(alpha, 3), None);
    assert_eq!(view.value_at(alpha, 3), None);
    assert_eq!(view.timestamp_at(0xDEAD, 0), None);
    assert_eq!(view.value_at(0xDEAD, 0), None);
    assert_eq!(view.all(0xDEAD).count(), 0);
    assert_eq!(view.all_timestamps(0xDEAD).count(), 0);
    assert_eq!(view.all_values(0xDEAD).count(), 0);
}

#[test]
fn iterators_agree_with_accessors() {
    for compression in [
        Compression::None,
        Compression::Zstd,
        Compression::S2,
        Compression::Lz4,
    ] {
        let blob = two_metric_blob(compression);
        let view = NumericDecoder::new(&blob).unwrap();
        for name in ["alpha", "beta"] {
            let id = metric_id(name);
            let count = view.point_count(id).unwrap();
            let points: Vec<_> = view.all(id).collect();
            assert_eq!(points.len(), count);
            for (index, point) in points {
                assert_eq!(view.timestamp_at(id, index), Some(point.timestamp));
                assert_eq!(view.value_at(id, index), Some(point.value));
                assert_eq!(point.tag, None);
            }
            let timestamps: Vec<_> = view.all_timestamps(id).collect();
            let values: Vec<_> = view.all_values(id).collect();
            assert_eq!(timestamps.len(), count);
            assert_eq!(values.len(), count);
        }
    }
}

#[test]
fn iterators_are_restartable() {
    let blob = two_metric_blob(Compression::Lz4);
    let view = NumericDecoder::new(&blob).unwrap();
    let id = metric_id("alpha");
    let first: Vec<_> = view.all_timestamps(id).collect();
    let second: Vec<_> = view.all_timestamps(id).collect();
    assert_eq!(first, second);
}

#[test]
fn view_is_shareable_across_threads() {
    // First touch of each column happens concurrently; the once-init cache
    // must hand every thread the same decompressed bytes.
    let blob = two_metric_blob(Compression::Zstd);
    let view = NumericDecoder::new(&blob).unwrap();
    let alpha = metric_id("alpha");
    let beta = metric_id("beta");

    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for _ in 0..8 {
            handles.push(scope.spawn(|| {
                let a: Vec<_> = view.all(alpha).map(|(_, p)| (p.timestamp, p.value)).collect();
                let b: Vec<_> = view.all(beta).map(|(_, p)| (p.timestamp, p.value)).collect();
                (a, b)
            }));
        }
        let expected_a = vec![(1_000_000, 1.5), (1_000_100, 2.5), (1_000_200, 3.5)];
        let expected_b = vec![(1_000_050, -1.0), (1_000_150, -2.0)];
        for handle in handles {
            let (a, b) = handle.join().unwrap();
            assert_eq!(a, expected_a);
            assert_eq!(b, expected_b);
        }
    });
}

#[test]
fn tag_accessors_on_untagged_text_blob() {
    let mut enc = TextEncoder::new(0, EncoderConfig::new()).unwrap();
    enc.start_metric_name("m", 2).unwrap();
    enc.add_point(1, b"a", b"").unwrap();
    enc.add_point(2, b"b", b"").unwrap();
    enc.end_metric().unwrap();
    let blob = enc.finish().unwrap();

    let view = TextDecoder::new(&blob).unwrap();
    let id = metric_id("m");
    assert_eq!(view.tag_at(id, 0), None);
    assert_eq!(view.all_tags(id).count(), 0);
    // Values are still there.
    assert_eq!(view.value_at(id, 1), Some(&b"b"[..]));
}

#[test]
fn slot_accessors_mirror_id_accessors() {
    let blob = two_metric_blob(Compression::None);
    let view = NumericDecoder::new(&blob).unwrap();
    let beta = metric_id("beta");
    let slot = view.slot_of(beta).unwrap();
    assert_eq!(view.metric_id_at(slot), Some(beta));
    assert_eq!(view.timestamp_at_slot(slot, 1), view.timestamp_at(beta, 1));
    assert_eq!(view.value_at_slot(slot, 0), view.value_at(beta, 0));
    assert_eq!(view.point_count_at_slot(slot), Some(2));
    // No name table on a collision-free blob.
    assert_eq!(view.name_at(slot), None);
    assert_eq!(view.slot_of_name("beta"), None);
}
