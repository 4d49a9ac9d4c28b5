//! Blob decoder: parse the header and index, then serve random access and
//! iteration over a complete byte slice.
//!
//! The decoded view borrows the input bytes and is immutable. Column bytes
//! are decompressed lazily on first touch per metric per column and cached
//! through a once-init cell, so concurrent readers share one decompressed
//! buffer and never observe a partial write. Under `Compression::None`
//! columns are served zero-copy straight from the input slice.

use core::marker::PhantomData;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::blob::header::{parse_name_table, Header, IndexEntry};
use crate::blob::iter::{PointIter, TimestampIter, ValueIter};
use crate::blob::types::{DecodeError, TimestampEncoding, HEADER_SIZE};
use crate::column::{timestamp_at, BytesCodec, Cursor, F64Codec, TimestampCursor, ValueCodec};
use crate::compress::Compression;
use crate::hash::MetricId;

/// Decoded view over a numeric blob.
pub type NumericDecoder<'a> = Decoder<'a, F64Codec>;

/// Decoded view over a text blob.
pub type TextDecoder<'a> = Decoder<'a, BytesCodec>;

/// Which of a metric's columns is being addressed.
#[derive(Clone, Copy)]
enum Col {
    Ts,
    Val,
    Tag,
}

/// Lazily-populated decompression cells for one metric.
///
/// `None` inside a populated cell records that decompression failed; the
/// metric then reads as truncated rather than being retried.
#[derive(Debug, Default)]
struct ColumnCache {
    ts: OnceLock<Option<Vec<u8>>>,
    val: OnceLock<Option<Vec<u8>>>,
    tag: OnceLock<Option<Vec<u8>>>,
}

/// Shared decoder core, parameterized over the value column codec.
///
/// Use through the [`NumericDecoder`] and [`TextDecoder`] aliases. The view
/// is safe to share across threads; all accessors take `&self`.
#[derive(Debug)]
pub struct Decoder<'a, C: ValueCodec> {
    header: Header,
    entries: Vec<IndexEntry>,
    names: Vec<&'a str>,
    by_id: HashMap<MetricId, usize>,
    payload: &'a [u8],
    cache: Vec<ColumnCache>,
    _codec: PhantomData<C>,
}

impl<'a, C: ValueCodec> Decoder<'a, C> {
    /// Decode a complete blob, validating magic, version, flags, index
    /// bounds, and the name table before any column is touched.
    pub fn new(data: &'a [u8]) -> Result<Self, DecodeError> {
        let header = Header::parse(data)?;
        let metric_count = header.metric_count as usize;
        if metric_count == 0 {
            return Err(DecodeError::CorruptPayload("blob has no metrics"));
        }

        let index_end = metric_count
            .checked_mul(header.index_entry_size())
            .and_then(|len| len.checked_add(HEADER_SIZE))
            .ok_or(DecodeError::CorruptPayload("index size overflow"))?;
        let payload_offset = header.payload_offset as usize;
        if payload_offset > data.len() {
            return Err(DecodeError::CorruptPayload("payload offset out of bounds"));
        }

        // The writer lays regions out back to back; any gap or overlap
        // between index, name table, and payload is structural damage.
        let name_table_offset = header.name_table_offset as usize;
        let name_table_len = header.name_table_len as usize;
        if header.has_collision() {
            if name_table_offset != index_end
                || name_table_len == 0
                || name_table_offset + name_table_len != payload_offset
            {
                return Err(DecodeError::CorruptPayload("name table region inconsistent"));
            }
        } else {
            if name_table_offset != 0 || name_table_len != 0 {
                return Err(DecodeError::CorruptPayload("unexpected name table"));
            }
            if index_end != payload_offset {
                return Err(DecodeError::CorruptPayload("index does not reach payload"));
            }
        }

        let payload = &data[payload_offset..];
        let mut entries = Vec::with_capacity(metric_count);
        for i in 0..metric_count {
            let offset = HEADER_SIZE + i * header.index_entry_size();
            let entry = IndexEntry::parse(data, offset, header.has_tags())
                .ok_or(DecodeError::CorruptPayload("index truncated"))?;
            if entry.point_count == 0 {
                return Err(DecodeError::CorruptPayload("metric with zero points"));
            }
            for (region_offset, region_len) in [
                (entry.ts_offset, entry.ts_length),
                (entry.val_offset, entry.val_length),
                (entry.tag_offset, entry.tag_length),
            ] {
                let end = u64::from(region_offset) + u64::from(region_len);
                if end > payload.len() as u64 {
                    return Err(DecodeError::CorruptPayload("column region out of bounds"));
                }
            }
            entries.push(entry);
        }

        let names = if header.has_collision() {
            parse_name_table(
                &data[name_table_offset..name_table_offset + name_table_len],
                metric_count,
            )?
        } else {
            Vec::new()
        };

        let mut by_id = HashMap::with_capacity(metric_count);
        for (slot, entry) in entries.iter().enumerate() {
            if by_id.contains_key(&entry.metric_id) {
                if !header.has_collision() {
                    return Err(DecodeError::CorruptPayload("duplicate metric id"));
                }
            } else {
                by_id.insert(entry.metric_id, slot);
            }
        }

        let cache = (0..metric_count).map(|_| ColumnCache::default()).collect();
        Ok(Decoder {
            header,
            entries,
            names,
            by_id,
            payload,
            cache,
            _codec: PhantomData,
        })
    }

    // ─── Blob-level getters ──────────────────────────────────────────────────

    #[inline]
    pub fn metric_count(&self) -> usize {
        self.entries.len()
    }

    /// The blob's timestamp anchor, microseconds since the Unix epoch.
    #[inline]
    pub fn start_time(&self) -> i64 {
        self.header.start_time_us
    }

    #[inline]
    pub fn timestamp_encoding(&self) -> TimestampEncoding {
        self.header.timestamp_encoding
    }

    #[inline]
    pub fn compression(&self) -> Compression {
        self.header.compression
    }

    #[inline]
    pub fn has_tags(&self) -> bool {
        self.header.has_tags()
    }

    #[inline]
    pub fn has_collision(&self) -> bool {
        self.header.has_collision()
    }

    // ─── Metric lookup ───────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, id: MetricId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Index slot for `id`. On a collision blob, ids map to the first slot
    /// that carries them; later duplicates are reached positionally.
    #[inline]
    pub fn slot_of(&self, id: MetricId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Index slot for a metric name (collision blobs only — other blobs
    /// carry no names).
    pub fn slot_of_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&n| n == name)
    }

    pub fn metric_id_at(&self, slot: usize) -> Option<MetricId> {
        self.entries.get(slot).map(|e| e.metric_id)
    }

    /// Metric name at `slot`, when the blob carries a name table.
    pub fn name_at(&self, slot: usize) -> Option<&'a str> {
        self.names.get(slot).copied()
    }

    pub fn point_count(&self, id: MetricId) -> Option<usize> {
        self.point_count_at_slot(self.slot_of(id)?)
    }

    pub fn point_count_at_slot(&self, slot: usize) -> Option<usize> {
        self.entries.get(slot).map(|e| e.point_count as usize)
    }

    // ─── Random access ───────────────────────────────────────────────────────

    /// Timestamp of point `index` of metric `id`; `None` when the id is
    /// unknown or the index is out of range.
    pub fn timestamp_at(&self, id: MetricId, index: usize) -> Option<i64> {
        self.timestamp_at_slot(self.slot_of(id)?, index)
    }

    pub fn timestamp_at_slot(&self, slot: usize, index: usize) -> Option<i64> {
        let entry = self.entries.get(slot)?;
        if index >= entry.point_count as usize {
            return None;
        }
        let bytes = self.column(slot, Col::Ts)?;
        timestamp_at(
            bytes,
            self.header.timestamp_encoding,
            self.header.start_time_us,
            index,
        )
    }

    /// Value of point `index` of metric `id`; same out-of-range policy as
    /// [`timestamp_at`](Self::timestamp_at). O(1) for fixed-width value
    /// columns, a forward scan otherwise.
    pub fn value_at(&self, id: MetricId, index: usize) -> Option<C::Out<'_>> {
        self.value_at_slot(self.slot_of(id)?, index)
    }

    pub fn value_at_slot(&self, slot: usize, index: usize) -> Option<C::Out<'_>> {
        let entry = self.entries.get(slot)?;
        if index >= entry.point_count as usize {
            return None;
        }
        let bytes = self.column(slot, Col::Val)?;
        C::decode_at(bytes, index)
    }

    // ─── Iteration ───────────────────────────────────────────────────────────

    /// Iterate metric `id`'s points as `(index, point)` pairs. Unknown ids
    /// yield an empty iterator.
    pub fn all(&self, id: MetricId) -> PointIter<'_, C> {
        match self.slot_of(id) {
            Some(slot) => self.all_at_slot(slot),
            None => PointIter::empty(),
        }
    }

    pub fn all_at_slot(&self, slot: usize) -> PointIter<'_, C> {
        let Some(entry) = self.entries.get(slot) else {
            return PointIter::empty();
        };
        let Some(ts) = self.column(slot, Col::Ts) else {
            return PointIter::empty();
        };
        let Some(val) = self.column(slot, Col::Val) else {
            return PointIter::empty();
        };
        let tag = if self.header.has_tags() {
            match self.column(slot, Col::Tag) {
                Some(bytes) => Some(Cursor::new(bytes)),
                None => return PointIter::empty(),
            }
        } else {
            None
        };
        PointIter::new(
            TimestampCursor::new(ts, self.header.timestamp_encoding, self.header.start_time_us),
            Cursor::new(val),
            tag,
            entry.point_count as usize,
        )
    }

    /// Iterate metric `id`'s timestamps.
    pub fn all_timestamps(&self, id: MetricId) -> TimestampIter<'_> {
        let Some(slot) = self.slot_of(id) else {
            return TimestampIter::empty();
        };
        let Some(entry) = self.entries.get(slot) else {
            return TimestampIter::empty();
        };
        let Some(bytes) = self.column(slot, Col::Ts) else {
            return TimestampIter::empty();
        };
        TimestampIter::new(
            TimestampCursor::new(bytes, self.header.timestamp_encoding, self.header.start_time_us),
            entry.point_count as usize,
        )
    }

    /// Iterate metric `id`'s values.
    pub fn all_values(&self, id: MetricId) -> ValueIter<'_, C> {
        let Some(slot) = self.slot_of(id) else {
            return ValueIter::empty();
        };
        let Some(entry) = self.entries.get(slot) else {
            return ValueIter::empty();
        };
        let Some(bytes) = self.column(slot, Col::Val) else {
            return ValueIter::empty();
        };
        ValueIter::new(Cursor::new(bytes), entry.point_count as usize)
    }

    // ─── Column materialization ──────────────────────────────────────────────

    /// Bytes of one decompressed column, decompressing and caching on first
    /// touch. Zero-copy under `Compression::None`.
    fn column(&self, slot: usize, col: Col) -> Option<&[u8]> {
        let entry = self.entries.get(slot)?;
        let (offset, len) = match col {
            Col::Ts => (entry.ts_offset, entry.ts_length),
            Col::Val => (entry.val_offset, entry.val_length),
            Col::Tag => {
                if !self.header.has_tags() {
                    return None;
                }
                (entry.tag_offset, entry.tag_length)
            }
        };
        let raw = self
            .payload
            .get(offset as usize..offset as usize + len as usize)?;
        if self.header.compression == Compression::None {
            return Some(raw);
        }
        let cache = self.cache.get(slot)?;
        let cell = match col {
            Col::Ts => &cache.ts,
            Col::Val => &cache.val,
            Col::Tag => &cache.tag,
        };
        let hint = self.decompressed_size_hint(entry, col);
        cell.get_or_init(|| self.header.compression.decompress(raw, hint).ok())
            .as_deref()
    }

    /// Expected decompressed length when the column width is known up front.
    fn decompressed_size_hint(&self, entry: &IndexEntry, col: Col) -> usize {
        let n = entry.point_count as usize;
        match col {
            Col::Ts => match self.header.timestamp_encoding {
                TimestampEncoding::Raw => n * 8,
                TimestampEncoding::Delta => 0,
            },
            Col::Val => C::FIXED_ELEM.map_or(0, |width| n * width),
            Col::Tag => 0,
        }
    }
}

impl<'a> Decoder<'a, BytesCodec> {
    /// Tag of point `index` of metric `id`; `None` on untagged blobs.
    pub fn tag_at(&self, id: MetricId, index: usize) -> Option<&[u8]> {
        self.tag_at_slot(self.slot_of(id)?, index)
    }

    pub fn tag_at_slot(&self, slot: usize, index: usize) -> Option<&[u8]> {
        let entry = self.entries.get(slot)?;
        if index >= entry.point_count as usize {
            return None;
        }
        let bytes = self.column(slot, Col::Tag)?;
        BytesCodec::decode_at(bytes, index)
    }

    /// Iterate metric `id`'s tags. Empty on untagged blobs.
    pub fn all_tags(&self, id: MetricId) -> ValueIter<'_, BytesCodec> {
        let Some(slot) = self.slot_of(id) else {
            return ValueIter::empty();
        };
        let Some(entry) = self.entries.get(slot) else {
            return ValueIter::empty();
        };
        let Some(bytes) = self.column(slot, Col::Tag) else {
            return ValueIter::empty();
        };
        ValueIter::new(Cursor::new(bytes), entry.point_count as usize)
    }
}
