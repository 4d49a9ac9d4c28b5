//! Blob header, index entries, and the optional name table.
//!
//! Wire layout, all little-endian:
//!
//! ```text
//!     Blob := Header || Index || NameTable? || Payload
//!
//!     Header (34 bytes fixed):
//!       magic          u32   = 0x4D45424F ("MEBO")
//!       version        u8    = 1
//!       flags          u8    (bit0 has_collision, bit1 has_tags)
//!       ts_encoding    u8    (0 raw, 1 delta)
//!       value_encoding u8    (0 raw)
//!       compression    u8    (0 none, 1 zstd, 2 s2, 3 lz4)
//!       reserved       u8    = 0
//!       metric_count   u32
//!       start_time_us  i64
//!       payload_offset u32   (absolute, from blob start)
//!       name_tbl_off   u32   (absolute; 0 when absent)
//!       name_tbl_len   u32   (0 when absent)
//!
//!     Index entry (28 bytes, +8 when has_tags):
//!       metric_id      u64
//!       point_count    u32
//!       ts_offset      u32   (relative to payload)
//!       ts_length      u32   (post-compression)
//!       val_offset     u32
//!       val_length     u32
//!       tag_offset     u32   (only when has_tags)
//!       tag_length     u32   (only when has_tags)
//!
//!     NameTable (only when has_collision):
//!       metric_count × [varint length][utf-8 bytes], in index order
//! ```

use crate::blob::types::{
    DecodeError, TimestampEncoding, ValueEncoding, FLAG_HAS_COLLISION, FLAG_HAS_TAGS, FLAG_MASK,
    HEADER_SIZE, INDEX_ENTRY_SIZE, INDEX_ENTRY_SIZE_TAGGED, MAGIC, VERSION,
};
use crate::compress::Compression;
use crate::endian::{put_i64_le, put_u32_le, put_u64_le, read_i64_le, read_u32_le, read_u64_le};
use crate::hash::MetricId;
use crate::varint::{put_uvarint, read_uvarint};

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed (or to-be-written) fixed blob header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub flags: u8,
    pub timestamp_encoding: TimestampEncoding,
    pub value_encoding: ValueEncoding,
    pub compression: Compression,
    pub metric_count: u32,
    pub start_time_us: i64,
    pub payload_offset: u32,
    pub name_table_offset: u32,
    pub name_table_len: u32,
}

impl Header {
    #[inline]
    pub fn has_collision(&self) -> bool {
        self.flags & FLAG_HAS_COLLISION != 0
    }

    #[inline]
    pub fn has_tags(&self) -> bool {
        self.flags & FLAG_HAS_TAGS != 0
    }

    /// Index entry width implied by the tag flag.
    #[inline]
    pub fn index_entry_size(&self) -> usize {
        if self.has_tags() {
            INDEX_ENTRY_SIZE_TAGGED
        } else {
            INDEX_ENTRY_SIZE
        }
    }

    /// Append the fixed [`HEADER_SIZE`] bytes to `dst`.
    pub fn write_to(&self, dst: &mut Vec<u8>) {
        put_u32_le(dst, MAGIC);
        dst.push(VERSION);
        dst.push(self.flags);
        dst.push(self.timestamp_encoding.as_wire());
        dst.push(self.value_encoding.as_wire());
        dst.push(self.compression.as_wire());
        dst.push(0); // reserved
        put_u32_le(dst, self.metric_count);
        put_i64_le(dst, self.start_time_us);
        put_u32_le(dst, self.payload_offset);
        put_u32_le(dst, self.name_table_offset);
        put_u32_le(dst, self.name_table_len);
    }

    /// Parse and validate the fixed header at the start of `src`.
    pub fn parse(src: &[u8]) -> Result<Header, DecodeError> {
        if src.len() < HEADER_SIZE {
            return Err(DecodeError::CorruptPayload("blob shorter than header"));
        }
        if read_u32_le(src, 0) != Some(MAGIC) {
            return Err(DecodeError::CorruptPayload("bad magic"));
        }
        let version = src[4];
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let flags = src[5];
        if flags & !FLAG_MASK != 0 {
            return Err(DecodeError::CorruptPayload("reserved flag bits set"));
        }
        let timestamp_encoding = TimestampEncoding::from_wire(src[6])
            .ok_or(DecodeError::CorruptPayload("unknown timestamp encoding"))?;
        let value_encoding = ValueEncoding::from_wire(src[7])
            .ok_or(DecodeError::CorruptPayload("unknown value encoding"))?;
        let compression = Compression::from_wire(src[8])
            .ok_or(DecodeError::CorruptPayload("unknown compression"))?;
        if src[9] != 0 {
            return Err(DecodeError::CorruptPayload("reserved byte set"));
        }
        // All reads below are within HEADER_SIZE, checked above.
        let metric_count = read_u32_le(src, 10).unwrap_or(0);
        let start_time_us = read_i64_le(src, 14).unwrap_or(0);
        let payload_offset = read_u32_le(src, 22).unwrap_or(0);
        let name_table_offset = read_u32_le(src, 26).unwrap_or(0);
        let name_table_len = read_u32_le(src, 30).unwrap_or(0);

        Ok(Header {
            flags,
            timestamp_encoding,
            value_encoding,
            compression,
            metric_count,
            start_time_us,
            payload_offset,
            name_table_offset,
            name_table_len,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Index entries
// ─────────────────────────────────────────────────────────────────────────────

/// One metric's directory entry: id, point count, and column byte regions.
///
/// Offsets are relative to the payload region; lengths are post-compression.
/// `tag_offset`/`tag_length` are zero on untagged blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexEntry {
    pub metric_id: MetricId,
    pub point_count: u32,
    pub ts_offset: u32,
    pub ts_length: u32,
    pub val_offset: u32,
    pub val_length: u32,
    pub tag_offset: u32,
    pub tag_length: u32,
}

impl IndexEntry {
    /// Append this entry to `dst` (28 or 36 bytes depending on `has_tags`).
    pub fn write_to(&self, dst: &mut Vec<u8>, has_tags: bool) {
        put_u64_le(dst, self.metric_id);
        put_u32_le(dst, self.point_count);
        put_u32_le(dst, self.ts_offset);
        put_u32_le(dst, self.ts_length);
        put_u32_le(dst, self.val_offset);
        put_u32_le(dst, self.val_length);
        if has_tags {
            put_u32_le(dst, self.tag_offset);
            put_u32_le(dst, self.tag_length);
        }
    }

    /// Parse one entry at `offset`, or `None` if `src` is cut short.
    pub fn parse(src: &[u8], offset: usize, has_tags: bool) -> Option<IndexEntry> {
        let metric_id = read_u64_le(src, offset)?;
        let point_count = read_u32_le(src, offset + 8)?;
        let ts_offset = read_u32_le(src, offset + 12)?;
        let ts_length = read_u32_le(src, offset + 16)?;
        let val_offset = read_u32_le(src, offset + 20)?;
        let val_length = read_u32_le(src, offset + 24)?;
        let (tag_offset, tag_length) = if has_tags {
            (read_u32_le(src, offset + 28)?, read_u32_le(src, offset + 32)?)
        } else {
            (0, 0)
        };
        Some(IndexEntry {
            metric_id,
            point_count,
            ts_offset,
            ts_length,
            val_offset,
            val_length,
            tag_offset,
            tag_length,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Name table
// ─────────────────────────────────────────────────────────────────────────────

/// Append the name table: one `[varint length][utf-8]` entry per metric, in
/// index order.
pub fn write_name_table<S: AsRef<str>>(dst: &mut Vec<u8>, names: &[S]) {
    for name in names {
        let bytes = name.as_ref().as_bytes();
        put_uvarint(dst, bytes.len() as u64);
        dst.extend_from_slice(bytes);
    }
}

/// Parse exactly `count` names out of `bytes`.
///
/// The table must be fully consumed; trailing bytes, truncation, or invalid
/// UTF-8 fail with [`DecodeError::CorruptPayload`].
pub fn parse_name_table(bytes: &[u8], count: usize) -> Result<Vec<&str>, DecodeError> {
    let mut names = Vec::with_capacity(count);
    let mut pos = 0usize;
    for _ in 0..count {
        let (len, n) = read_uvarint(&bytes[pos..])
            .ok_or(DecodeError::CorruptPayload("name table truncated"))?;
        pos += n;
        let len = usize::try_from(len)
            .map_err(|_| DecodeError::CorruptPayload("name table length overflow"))?;
        let end = pos
            .checked_add(len)
            .filter(|&e| e <= bytes.len())
            .ok_or(DecodeError::CorruptPayload("name table truncated"))?;
        let name = core::str::from_utf8(&bytes[pos..end])
            .map_err(|_| DecodeError::CorruptPayload("name table is not utf-8"))?;
        names.push(name);
        pos = end;
    }
    if pos != bytes.len() {
        return Err(DecodeError::CorruptPayload("name table has trailing bytes"));
    }
    Ok(names)
}
