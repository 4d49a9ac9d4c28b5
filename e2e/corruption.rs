//! E2E Suite 04: damaged blobs.
//!
//! Structural damage must fail `decode` with a corruption error; damage
//! that only shows up inside a compressed column must surface lazily as
//! absent data (accessors return `None`, iterators stop early), never as a
//! panic or fabricated points.

use mebo::{
    metric_id, Compression, DecodeError, EncoderConfig, NumericDecoder, NumericEncoder,
};

fn healthy_blob(compression: Compression) -> Vec<u8> {
    let config = EncoderConfig::new().compression(compression);
    let mut enc = NumericEncoder::new(1_000_000, config).unwrap();
    enc.start_metric_name("good.metric", 4).unwrap();
    for i in 0..4i64 {
        enc.add_point(1_000_000 + i * 100, i as f64).unwrap();
    }
    enc.end_metric().unwrap();
    enc.finish().unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Structural damage: decode must fail up front
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn flipped_magic_byte_is_corrupt() {
    let mut blob = healthy_blob(Compression::None);
    blob[0] ^= 0xFF;
    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::CorruptPayload(_))
    ));
}

#[test]
fn truncated_payload_is_corrupt() {
    let mut blob = healthy_blob(Compression::None);
    blob.pop();
    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::CorruptPayload(_))
    ));
}

#[test]
fn unknown_version_is_reported_with_its_value() {
    let mut blob = healthy_blob(Compression::None);
    blob[4] = 7;
    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::UnsupportedVersion(7))
    ));
}

#[test]
fn unknown_enum_bytes_are_corrupt() {
    for (offset, bad) in [(6u8, 9u8), (7, 9), (8, 9)] {
        let mut blob = healthy_blob(Compression::None);
        blob[offset as usize] = bad;
        assert!(
            matches!(
                NumericDecoder::new(&blob),
                Err(DecodeError::CorruptPayload(_))
            ),
            "byte {offset} = {bad} must be rejected"
        );
    }
}

#[test]
fn reserved_bits_are_corrupt() {
    let mut blob = healthy_blob(Compression::None);
    blob[5] |= 0b0100_0000;
    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::CorruptPayload(_))
    ));

    let mut blob = healthy_blob(Compression::None);
    blob[9] = 0xAA;
    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::CorruptPayload(_))
    ));
}

#[test]
fn inputs_shorter_than_a_header_are_corrupt() {
    let blob = healthy_blob(Compression::None);
    for len in [0, 1, 4, 33] {
        assert!(
            matches!(
                NumericDecoder::new(&blob[..len]),
                Err(DecodeError::CorruptPayload(_))
            ),
            "{len}-byte prefix must be rejected"
        );
    }
}

#[test]
fn oversized_column_region_is_corrupt() {
    let mut blob = healthy_blob(Compression::None);
    // Inflate the first entry's ts_length (offset 34 + 16) past the payload.
    blob[50..54].copy_from_slice(&0xFFFFu32.to_le_bytes());
    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::CorruptPayload(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Column damage: decode succeeds, reads come back empty
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn damaged_compressed_column_reads_as_absent() {
    let mut blob = healthy_blob(Compression::Zstd);
    let id = metric_id("good.metric");

    // Overwrite the start of the timestamp column (first region of the
    // payload) so the zstd frame header is destroyed while every length in
    // the index stays intact.
    let payload_offset = u32::from_le_bytes(blob[22..26].try_into().unwrap()) as usize;
    for byte in &mut blob[payload_offset..payload_offset + 4] {
        *byte = 0xFF;
    }

    let view = NumericDecoder::new(&blob).unwrap();
    assert_eq!(view.timestamp_at(id, 0), None);
    assert_eq!(view.all(id).count(), 0);
    assert_eq!(view.all_timestamps(id).count(), 0);
    // The value column is untouched and still readable.
    assert_eq!(view.value_at(id, 3), Some(3.0));
    assert_eq!(view.all_values(id).count(), 4);
}
