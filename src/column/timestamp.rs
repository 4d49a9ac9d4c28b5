//! Timestamp column codec: raw fixed-width or zig-zag varint deltas.
//!
//! Raw stores each microsecond timestamp as 8 little-endian bytes with O(1)
//! random access. Delta stores `timestamps[0] − start_time` followed by
//! consecutive differences as zig-zag varints; the first delta may be
//! negative (points may precede the blob anchor), every later delta must be
//! non-negative. Random access under delta scans forward from byte 0.

use crate::blob::types::{EncodeError, TimestampEncoding};
use crate::endian::{put_i64_le, read_i64_le};
use crate::varint::{put_ivarint, read_ivarint};

/// Append-only timestamp column for one open metric.
///
/// The buffer is reused across metrics: [`reset`](Self::reset) clears length
/// but keeps capacity.
#[derive(Debug)]
pub struct TimestampEncoder {
    encoding: TimestampEncoding,
    start_time_us: i64,
    buf: Vec<u8>,
    prev: i64,
    count: usize,
}

impl TimestampEncoder {
    pub fn new(encoding: TimestampEncoding, start_time_us: i64) -> Self {
        TimestampEncoder {
            encoding,
            start_time_us,
            buf: Vec::new(),
            prev: 0,
            count: 0,
        }
    }

    /// Append one timestamp.
    ///
    /// In delta mode a timestamp earlier than its predecessor fails with
    /// [`EncodeError::TimestampBackwards`] and leaves the column unchanged.
    pub fn push(&mut self, timestamp_us: i64) -> Result<(), EncodeError> {
        match self.encoding {
            TimestampEncoding::Raw => put_i64_le(&mut self.buf, timestamp_us),
            TimestampEncoding::Delta => {
                let anchor = if self.count == 0 { self.start_time_us } else { self.prev };
                let delta = timestamp_us.wrapping_sub(anchor);
                if self.count > 0 && delta < 0 {
                    return Err(EncodeError::TimestampBackwards);
                }
                put_ivarint(&mut self.buf, delta);
            }
        }
        self.prev = timestamp_us;
        self.count += 1;
        Ok(())
    }

    /// Encoded column length so far.
    #[inline]
    pub fn len_in_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Sealed column bytes, ready for the compression stage.
    #[inline]
    pub fn finish(&self) -> &[u8] {
        &self.buf
    }

    /// Clear for the next metric, keeping the buffer's capacity.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.prev = 0;
        self.count = 0;
    }
}

/// Sequential decoder over one decompressed timestamp column.
///
/// Yields absolute microsecond timestamps. Stops (returns `None`) at the end
/// of the column, on a truncated varint, or on a negative non-first delta.
#[derive(Debug, Clone)]
pub struct TimestampCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    encoding: TimestampEncoding,
    start_time_us: i64,
    running: i64,
    index: usize,
}

impl<'a> TimestampCursor<'a> {
    pub fn new(bytes: &'a [u8], encoding: TimestampEncoding, start_time_us: i64) -> Self {
        TimestampCursor {
            bytes,
            pos: 0,
            encoding,
            start_time_us,
            running: 0,
            index: 0,
        }
    }
}

impl Iterator for TimestampCursor<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        match self.encoding {
            TimestampEncoding::Raw => {
                let ts = read_i64_le(self.bytes, self.pos)?;
                self.pos += 8;
                self.index += 1;
                Some(ts)
            }
            TimestampEncoding::Delta => {
                let (delta, n) = read_ivarint(&self.bytes[self.pos..])?;
                if self.index > 0 && delta < 0 {
                    // Monotonicity is an encoder invariant; a negative delta
                    // here means the column is damaged.
                    return None;
                }
                self.pos += n;
                let anchor = if self.index == 0 { self.start_time_us } else { self.running };
                self.running = anchor.wrapping_add(delta);
                self.index += 1;
                Some(self.running)
            }
        }
    }
}

/// Random access into a decompressed timestamp column.
///
/// O(1) for raw, forward scan for delta.
pub fn timestamp_at(
    bytes: &[u8],
    encoding: TimestampEncoding,
    start_time_us: i64,
    index: usize,
) -> Option<i64> {
    match encoding {
        TimestampEncoding::Raw => read_i64_le(bytes, index.checked_mul(8)?),
        TimestampEncoding::Delta => {
            TimestampCursor::new(bytes, encoding, start_time_us).nth(index)
        }
    }
}
