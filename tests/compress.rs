// Unit tests for src/compress.rs — the uniform compression bracket.
//
// Every variant must round-trip arbitrary column bytes, map empty input to
// empty output, be deterministic on a given input, and reject garbage on
// decompression instead of fabricating bytes.

use mebo::compress::Compression;
use mebo::DecodeError;

const ALL: [Compression; 4] = [
    Compression::None,
    Compression::Zstd,
    Compression::S2,
    Compression::Lz4,
];

fn sample_column() -> Vec<u8> {
    // Repetitive enough that every real backend shrinks it.
    let mut data = Vec::new();
    for i in 0..512i64 {
        data.extend_from_slice(&(1_000_000 + i * 100).to_le_bytes());
    }
    data
}

#[test]
fn roundtrip_every_variant() {
    let data = sample_column();
    for variant in ALL {
        let compressed = variant.compress(&data).unwrap();
        let restored = variant.decompress(&compressed, data.len()).unwrap();
        assert_eq!(restored, data, "{variant} roundtrip");
    }
}

#[test]
fn none_is_identity() {
    let data = sample_column();
    assert_eq!(Compression::None.compress(&data).unwrap(), data);
    assert_eq!(Compression::None.decompress(&data, 0).unwrap(), data);
}

#[test]
fn real_backends_shrink_repetitive_input() {
    let data = sample_column();
    for variant in [Compression::Zstd, Compression::S2, Compression::Lz4] {
        let compressed = variant.compress(&data).unwrap();
        assert!(
            compressed.len() < data.len(),
            "{variant}: {} >= {}",
            compressed.len(),
            data.len()
        );
    }
}

#[test]
fn empty_input_maps_to_empty_output() {
    for variant in ALL {
        assert!(variant.compress(&[]).unwrap().is_empty(), "{variant}");
        assert!(variant.decompress(&[], 0).unwrap().is_empty(), "{variant}");
    }
}

#[test]
fn compression_is_deterministic() {
    let data = sample_column();
    for variant in ALL {
        assert_eq!(
            variant.compress(&data).unwrap(),
            variant.compress(&data).unwrap(),
            "{variant} must produce identical bytes on identical input"
        );
    }
}

#[test]
fn incompressible_input_still_roundtrips() {
    // A pseudo-random byte soup; backends may expand it but must restore it.
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let data: Vec<u8> = (0..4096)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect();
    for variant in ALL {
        let compressed = variant.compress(&data).unwrap();
        assert_eq!(variant.decompress(&compressed, data.len()).unwrap(), data);
    }
}

#[test]
fn garbage_is_rejected_by_real_backends() {
    let garbage = [0xFFu8; 32];
    for variant in [Compression::Zstd, Compression::S2] {
        assert!(
            matches!(
                variant.decompress(&garbage, 0),
                Err(DecodeError::CorruptPayload(_))
            ),
            "{variant} must reject garbage"
        );
    }
}

#[test]
fn lz4_rejects_lying_size_prefix() {
    let data = sample_column();
    let mut compressed = Compression::Lz4.compress(&data).unwrap();
    // The first four bytes carry the declared decompressed size; bump it so
    // it no longer matches the actual stream.
    compressed[0] = compressed[0].wrapping_add(1);
    assert!(matches!(
        Compression::Lz4.decompress(&compressed, data.len()),
        Err(DecodeError::CorruptPayload(_))
    ));
}

#[test]
fn truncated_compressed_data_is_rejected() {
    let data = sample_column();
    for variant in [Compression::Zstd, Compression::Lz4] {
        let mut compressed = variant.compress(&data).unwrap();
        compressed.truncate(compressed.len() / 2);
        assert!(
            variant.decompress(&compressed, data.len()).is_err(),
            "{variant} must reject a truncated stream"
        );
    }
}

#[test]
fn wire_values_are_stable() {
    assert_eq!(Compression::None.as_wire(), 0);
    assert_eq!(Compression::Zstd.as_wire(), 1);
    assert_eq!(Compression::S2.as_wire(), 2);
    assert_eq!(Compression::Lz4.as_wire(), 3);
    for variant in ALL {
        assert_eq!(Compression::from_wire(variant.as_wire()), Some(variant));
    }
    assert_eq!(Compression::from_wire(4), None);
}
