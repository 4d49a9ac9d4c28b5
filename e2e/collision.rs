//! E2E Suite 03: hash-collision blobs.
//!
//! Two distinct names hashing to one id must both survive: the blob grows a
//! name table, the collision flag is set, and each metric stays reachable by
//! id + position. Real xxhash-64 collisions cannot be manufactured from
//! short fixture names, so this suite assembles the colliding blob through
//! the public wire-layout writers and validates the decoder against it (the
//! encoder-side collision path is covered by the in-module encoder tests).

use mebo::blob::header::{write_name_table, Header, IndexEntry};
use mebo::blob::types::{
    TimestampEncoding, ValueEncoding, FLAG_HAS_COLLISION, HEADER_SIZE, INDEX_ENTRY_SIZE,
};
use mebo::{Compression, DecodeError, NumericDecoder};

const COLLIDING_ID: u64 = 0x5EED_5EED_5EED_5EED;

/// Hand-assemble a two-metric blob whose metrics share one id, with a name
/// table disambiguating them positionally.
fn colliding_blob() -> Vec<u8> {
    let mut name_table = Vec::new();
    write_name_table(&mut name_table, &["request.count", "request.bytes"]);

    let index_end = HEADER_SIZE + 2 * INDEX_ENTRY_SIZE;
    let header = Header {
        flags: FLAG_HAS_COLLISION,
        timestamp_encoding: TimestampEncoding::Raw,
        value_encoding: ValueEncoding::Raw,
        compression: Compression::None,
        metric_count: 2,
        start_time_us: 0,
        payload_offset: (index_end + name_table.len()) as u32,
        name_table_offset: index_end as u32,
        name_table_len: name_table.len() as u32,
    };

    let entries = [
        IndexEntry {
            metric_id: COLLIDING_ID,
            point_count: 1,
            ts_offset: 0,
            ts_length: 8,
            val_offset: 8,
            val_length: 8,
            ..IndexEntry::default()
        },
        IndexEntry {
            metric_id: COLLIDING_ID,
            point_count: 2,
            ts_offset: 16,
            ts_length: 16,
            val_offset: 32,
            val_length: 16,
            ..IndexEntry::default()
        },
    ];

    let mut blob = Vec::new();
    header.write_to(&mut blob);
    for entry in &entries {
        entry.write_to(&mut blob, false);
    }
    blob.extend_from_slice(&name_table);
    // Metric 0: one point.
    blob.extend_from_slice(&100i64.to_le_bytes());
    blob.extend_from_slice(&1.5f64.to_le_bytes());
    // Metric 1: two points.
    blob.extend_from_slice(&200i64.to_le_bytes());
    blob.extend_from_slice(&300i64.to_le_bytes());
    blob.extend_from_slice(&2.5f64.to_le_bytes());
    blob.extend_from_slice(&3.5f64.to_le_bytes());
    blob
}

#[test]
fn collision_flag_and_name_table_are_visible() {
    let blob = colliding_blob();
    assert_eq!(blob[5] & 0b01, 0b01);

    let view = NumericDecoder::new(&blob).unwrap();
    assert!(view.has_collision());
    assert_eq!(view.metric_count(), 2);
    assert_eq!(view.name_at(0), Some("request.count"));
    assert_eq!(view.name_at(1), Some("request.bytes"));
    assert_eq!(view.name_at(2), None);
}

#[test]
fn both_metrics_are_retrievable_by_id_and_position() {
    let blob = colliding_blob();
    let view = NumericDecoder::new(&blob).unwrap();

    // The id resolves to the first slot carrying it.
    assert!(view.contains(COLLIDING_ID));
    assert_eq!(view.slot_of(COLLIDING_ID), Some(0));
    assert_eq!(view.timestamp_at(COLLIDING_ID, 0), Some(100));
    assert_eq!(view.value_at(COLLIDING_ID, 0), Some(1.5));

    // The second metric is reached through its name and slot.
    let slot = view.slot_of_name("request.bytes").unwrap();
    assert_eq!(slot, 1);
    assert_eq!(view.metric_id_at(slot), Some(COLLIDING_ID));
    assert_eq!(view.point_count_at_slot(slot), Some(2));
    assert_eq!(view.timestamp_at_slot(slot, 1), Some(300));
    assert_eq!(view.value_at_slot(slot, 1), Some(3.5));

    let points: Vec<_> = view
        .all_at_slot(slot)
        .map(|(_, p)| (p.timestamp, p.value))
        .collect();
    assert_eq!(points, [(200, 2.5), (300, 3.5)]);
}

#[test]
fn duplicate_id_without_collision_flag_is_corrupt() {
    let mut blob = colliding_blob();
    // Strip the collision flag and splice the name table out, leaving two
    // entries with the same id and no way to tell them apart.
    blob[5] &= !FLAG_HAS_COLLISION;
    let header = Header::parse(&blob).unwrap();
    let table_start = header.name_table_offset as usize;
    let table_end = table_start + header.name_table_len as usize;
    blob.drain(table_start..table_end);

    // Rewrite the now-dangling header fields.
    let payload_offset = table_start as u32;
    blob[22..26].copy_from_slice(&payload_offset.to_le_bytes());
    blob[26..30].copy_from_slice(&0u32.to_le_bytes());
    blob[30..34].copy_from_slice(&0u32.to_le_bytes());

    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::CorruptPayload("duplicate metric id"))
    ));
}

#[test]
fn collision_flag_without_name_table_is_corrupt() {
    let mut blob = colliding_blob();
    // Zero the name-table length while keeping the flag.
    blob[30..34].copy_from_slice(&0u32.to_le_bytes());
    assert!(matches!(
        NumericDecoder::new(&blob),
        Err(DecodeError::CorruptPayload(_))
    ));
}
