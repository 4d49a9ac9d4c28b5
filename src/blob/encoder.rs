//! Blob encoder: a builder driven `start_metric → add_point × n →
//! end_metric`, repeated per metric, then `finish`.
//!
//! The encoder is a small state machine, `Open → MetricOpen → Open → … →
//! Finished`. Column buffers are owned by the encoder and reused across
//! metrics; a metric's columns are sealed and compressed at `end_metric`, so
//! `finish` only lays out header, index, optional name table, and the
//! already-compressed payload.

use core::marker::PhantomData;

use crate::blob::header::{write_name_table, Header, IndexEntry};
use crate::blob::types::{
    EncodeError, EncoderConfig, FLAG_HAS_COLLISION, FLAG_HAS_TAGS, HEADER_SIZE,
};
use crate::collision::CollisionTracker;
use crate::column::{BytesCodec, F64Codec, TimestampEncoder, ValueCodec};
use crate::hash::{metric_id, MetricId};

/// Encoder for numeric blobs (`f64` values, no tags).
pub type NumericEncoder = Encoder<F64Codec>;

/// Encoder for text blobs (byte-string values, optional per-point tags).
pub type TextEncoder = Encoder<BytesCodec>;

/// A metric whose columns have been sealed and compressed.
#[derive(Debug)]
struct SealedMetric {
    id: MetricId,
    point_count: u32,
    ts: Vec<u8>,
    val: Vec<u8>,
    tag: Option<Vec<u8>>,
}

/// The currently open metric, if any.
#[derive(Debug, Clone, Copy)]
struct OpenMetric {
    id: MetricId,
    declared: usize,
    added: usize,
}

/// How metrics in this blob are identified. Mixing modes within one blob is
/// rejected: a name table can only be built when every metric has a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentityMode {
    Unset,
    ById,
    ByName,
}

/// Shared encoder core, parameterized over the value column codec.
///
/// Use through the [`NumericEncoder`] and [`TextEncoder`] aliases.
#[derive(Debug)]
pub struct Encoder<C: ValueCodec> {
    config: EncoderConfig,
    start_time_us: i64,
    tracker: CollisionTracker,
    mode: IdentityMode,
    sealed: Vec<SealedMetric>,
    open: Option<OpenMetric>,
    ts_col: TimestampEncoder,
    val_col: Vec<u8>,
    tag_col: Vec<u8>,
    finished: bool,
    _codec: PhantomData<C>,
}

impl Encoder<F64Codec> {
    /// Create a numeric blob encoder anchored at `start_time_us`
    /// (microseconds since the Unix epoch).
    ///
    /// Numeric blobs have no tag column; a configuration requesting tags is
    /// rejected with [`EncodeError::InvalidConfig`].
    pub fn new(start_time_us: i64, config: EncoderConfig) -> Result<Self, EncodeError> {
        if config.has_tags {
            return Err(EncodeError::InvalidConfig);
        }
        Ok(Self::with_config(start_time_us, config))
    }

    /// Append one `(timestamp, value)` point to the open metric.
    pub fn add_point(&mut self, timestamp_us: i64, value: f64) -> Result<(), EncodeError> {
        self.push_point(timestamp_us, value, b"")
    }
}

impl Encoder<BytesCodec> {
    /// Create a text blob encoder anchored at `start_time_us`.
    pub fn new(start_time_us: i64, config: EncoderConfig) -> Result<Self, EncodeError> {
        Ok(Self::with_config(start_time_us, config))
    }

    /// Append one `(timestamp, value, tag)` point to the open metric.
    ///
    /// The tag is encoded only when the blob was configured with tags;
    /// otherwise it is ignored. Pass `b""` for an absent tag.
    pub fn add_point(
        &mut self,
        timestamp_us: i64,
        value: &[u8],
        tag: &[u8],
    ) -> Result<(), EncodeError> {
        self.push_point(timestamp_us, value, tag)
    }
}

impl<C: ValueCodec> Encoder<C> {
    fn with_config(start_time_us: i64, config: EncoderConfig) -> Self {
        Encoder {
            config,
            start_time_us,
            tracker: CollisionTracker::new(),
            mode: IdentityMode::Unset,
            sealed: Vec::new(),
            open: None,
            ts_col: TimestampEncoder::new(config.timestamp_encoding, start_time_us),
            val_col: Vec::new(),
            tag_col: Vec::new(),
            finished: false,
            _codec: PhantomData,
        }
    }

    /// The blob's timestamp anchor.
    #[inline]
    pub fn start_time(&self) -> i64 {
        self.start_time_us
    }

    /// Metrics sealed so far.
    #[inline]
    pub fn metric_count(&self) -> usize {
        self.sealed.len()
    }

    /// Open a metric identified by a precomputed id, declaring its exact
    /// point count.
    pub fn start_metric_id(&mut self, id: MetricId, point_count: usize) -> Result<(), EncodeError> {
        self.check_can_start(point_count)?;
        if self.mode == IdentityMode::ByName {
            // A bare id cannot be checked against tracked names.
            return Err(EncodeError::HashCollision);
        }
        self.tracker.track_id(id)?;
        self.mode = IdentityMode::ById;
        self.begin(id, point_count);
        Ok(())
    }

    /// Open a metric identified by name (hashed with xxhash-64, seed 0),
    /// declaring its exact point count.
    ///
    /// A hash collision between distinct names is accepted; the finished
    /// blob then carries a name table for disambiguation.
    pub fn start_metric_name(&mut self, name: &str, point_count: usize) -> Result<(), EncodeError> {
        self.check_can_start(point_count)?;
        if self.mode == IdentityMode::ById {
            // Earlier metrics have no names; the name table would be partial.
            return Err(EncodeError::InvalidMetricName);
        }
        self.start_named(name, metric_id(name), point_count)
    }

    /// Shared tail of the named start path. Split out so collision handling
    /// can be exercised with a forced hash.
    fn start_named(
        &mut self,
        name: &str,
        id: MetricId,
        point_count: usize,
    ) -> Result<(), EncodeError> {
        self.tracker.track_name(name, id)?;
        self.mode = IdentityMode::ByName;
        self.begin(id, point_count);
        Ok(())
    }

    fn check_can_start(&self, point_count: usize) -> Result<(), EncodeError> {
        if self.finished {
            return Err(EncodeError::AlreadyFinished);
        }
        if self.open.is_some() {
            return Err(EncodeError::MetricStillOpen);
        }
        if point_count == 0 {
            return Err(EncodeError::InvalidCount);
        }
        Ok(())
    }

    fn begin(&mut self, id: MetricId, declared: usize) {
        self.ts_col.reset();
        self.val_col.clear();
        self.tag_col.clear();
        self.open = Some(OpenMetric { id, declared, added: 0 });
    }

    fn push_point(
        &mut self,
        timestamp_us: i64,
        value: C::In<'_>,
        tag: &[u8],
    ) -> Result<(), EncodeError> {
        if self.finished {
            return Err(EncodeError::AlreadyFinished);
        }
        let open = self.open.as_mut().ok_or(EncodeError::NoMetricOpen)?;
        if open.added == open.declared {
            return Err(EncodeError::TooManyPoints);
        }
        self.ts_col.push(timestamp_us)?;
        C::encode(&mut self.val_col, value);
        if self.config.has_tags {
            BytesCodec::encode(&mut self.tag_col, tag);
        }
        open.added += 1;
        Ok(())
    }

    /// Seal the open metric: compress its columns and append it to the blob.
    ///
    /// Fails with [`EncodeError::PointCountMismatch`] if fewer points were
    /// added than declared; the metric stays open so the caller can finish
    /// feeding it.
    pub fn end_metric(&mut self) -> Result<(), EncodeError> {
        if self.finished {
            return Err(EncodeError::AlreadyFinished);
        }
        let open = self.open.ok_or(EncodeError::NoMetricOpen)?;
        if open.added < open.declared {
            return Err(EncodeError::PointCountMismatch);
        }
        let compression = self.config.compression;
        let ts = compression.compress(self.ts_col.finish())?;
        let val = compression.compress(&self.val_col)?;
        let tag = if self.config.has_tags {
            Some(compression.compress(&self.tag_col)?)
        } else {
            None
        };
        self.sealed.push(SealedMetric {
            id: open.id,
            point_count: open.added as u32,
            ts,
            val,
            tag,
        });
        self.open = None;
        Ok(())
    }

    /// Assemble the finished blob: `header || index || name_table? || payload`.
    ///
    /// The encoder transitions to its terminal state; every later call on it
    /// fails with [`EncodeError::AlreadyFinished`].
    pub fn finish(&mut self) -> Result<Vec<u8>, EncodeError> {
        if self.finished {
            return Err(EncodeError::AlreadyFinished);
        }
        if self.open.is_some() {
            return Err(EncodeError::MetricStillOpen);
        }
        if self.sealed.is_empty() {
            return Err(EncodeError::EmptyBlob);
        }
        self.finished = true;

        let has_tags = self.config.has_tags;
        let has_collision = self.tracker.has_collision();

        let mut name_table = Vec::new();
        if has_collision {
            write_name_table(&mut name_table, self.tracker.names());
        }

        // Directory with cumulative payload-relative offsets, region order
        // [ts][val][tag?] per metric, metrics in insertion order.
        let mut entries = Vec::with_capacity(self.sealed.len());
        let mut payload_len = 0usize;
        for m in &self.sealed {
            let ts_offset = payload_len as u32;
            payload_len += m.ts.len();
            let val_offset = payload_len as u32;
            payload_len += m.val.len();
            let (tag_offset, tag_length) = match &m.tag {
                Some(tag) => {
                    let off = payload_len as u32;
                    payload_len += tag.len();
                    (off, tag.len() as u32)
                }
                None => (0, 0),
            };
            entries.push(IndexEntry {
                metric_id: m.id,
                point_count: m.point_count,
                ts_offset,
                ts_length: m.ts.len() as u32,
                val_offset,
                val_length: m.val.len() as u32,
                tag_offset,
                tag_length,
            });
        }

        let entry_size = if has_tags {
            crate::blob::types::INDEX_ENTRY_SIZE_TAGGED
        } else {
            crate::blob::types::INDEX_ENTRY_SIZE
        };
        let index_len = self.sealed.len() * entry_size;
        let name_table_offset = if has_collision {
            (HEADER_SIZE + index_len) as u32
        } else {
            0
        };
        let payload_offset = (HEADER_SIZE + index_len + name_table.len()) as u32;

        let mut flags = 0u8;
        if has_collision {
            flags |= FLAG_HAS_COLLISION;
        }
        if has_tags {
            flags |= FLAG_HAS_TAGS;
        }
        let header = Header {
            flags,
            timestamp_encoding: self.config.timestamp_encoding,
            value_encoding: self.config.value_encoding,
            compression: self.config.compression,
            metric_count: self.sealed.len() as u32,
            start_time_us: self.start_time_us,
            payload_offset,
            name_table_offset,
            name_table_len: name_table.len() as u32,
        };

        let mut out = Vec::with_capacity(payload_offset as usize + payload_len);
        header.write_to(&mut out);
        for entry in &entries {
            entry.write_to(&mut out, has_tags);
        }
        out.extend_from_slice(&name_table);
        for m in &self.sealed {
            out.extend_from_slice(&m.ts);
            out.extend_from_slice(&m.val);
            if let Some(tag) = &m.tag {
                out.extend_from_slice(tag);
            }
        }
        Ok(out)
    }
}
