//! Blob wire constants, per-blob configuration, and error types.

use core::fmt;

use crate::compress::Compression;

// ─────────────────────────────────────────────────────────────────────────────
// Wire constants
// ─────────────────────────────────────────────────────────────────────────────

/// Blob magic, "MEBO" read as a big-endian u32 and stored little-endian.
pub const MAGIC: u32 = 0x4D45_424F;

/// Current (and only) wire format version.
pub const VERSION: u8 = 1;

/// Fixed header length in bytes.
pub const HEADER_SIZE: usize = 34;

/// Index entry length for untagged blobs.
pub const INDEX_ENTRY_SIZE: usize = 28;

/// Index entry length when the blob carries a tag column.
pub const INDEX_ENTRY_SIZE_TAGGED: usize = 36;

/// Header flag bit: a name table follows the index.
pub const FLAG_HAS_COLLISION: u8 = 0b0000_0001;

/// Header flag bit: every metric carries a tag column (text blobs only).
pub const FLAG_HAS_TAGS: u8 = 0b0000_0010;

/// All defined flag bits; the rest of the byte is reserved and must be zero.
pub const FLAG_MASK: u8 = FLAG_HAS_COLLISION | FLAG_HAS_TAGS;

// ─────────────────────────────────────────────────────────────────────────────
// Column encoding selectors
// ─────────────────────────────────────────────────────────────────────────────

/// Timestamp column encoding, stored in the header as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TimestampEncoding {
    /// Fixed 8-byte little-endian `i64` per point; O(1) random access.
    #[default]
    Raw = 0,
    /// Zig-zag varint deltas anchored on the blob's start time.
    Delta = 1,
}

impl TimestampEncoding {
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TimestampEncoding::Raw),
            1 => Some(TimestampEncoding::Delta),
            _ => None,
        }
    }

    #[inline]
    pub fn as_wire(self) -> u8 {
        self as u8
    }
}

/// Value column encoding. Only raw exists in version 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ValueEncoding {
    #[default]
    Raw = 0,
}

impl ValueEncoding {
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ValueEncoding::Raw),
            _ => None,
        }
    }

    #[inline]
    pub fn as_wire(self) -> u8 {
        self as u8
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoder configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Per-blob encoder options.
///
/// Every field has a conservative default: raw timestamps, raw values, no
/// compression, no tags. Setters chain so a configuration reads as a single
/// expression:
///
/// ```
/// use mebo::{Compression, EncoderConfig, TimestampEncoding};
///
/// let config = EncoderConfig::new()
///     .timestamps(TimestampEncoding::Delta)
///     .compression(Compression::Zstd);
/// assert!(!config.has_tags);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderConfig {
    pub timestamp_encoding: TimestampEncoding,
    pub value_encoding: ValueEncoding,
    pub compression: Compression,
    /// Emit a per-point tag column. Text blobs only; rejected by the numeric
    /// encoder's constructor.
    pub has_tags: bool,
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, encoding: TimestampEncoding) -> Self {
        self.timestamp_encoding = encoding;
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_tags(mut self) -> Self {
        self.has_tags = true;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while building a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// `start_metric_name` with an empty name, or a named start on a blob
    /// already keyed by precomputed ids.
    InvalidMetricName,
    /// Exact `(name, hash)` pair was already started in this blob.
    MetricAlreadyStarted,
    /// Precomputed id repeats (or an id start on a name-keyed blob).
    HashCollision,
    /// Declared point count of zero.
    InvalidCount,
    /// Delta-encoded timestamps must be monotonic non-decreasing per metric.
    TimestampBackwards,
    /// More points added than declared at `start_metric`.
    TooManyPoints,
    /// `end_metric` before the declared point count was reached.
    PointCountMismatch,
    /// `finish` on a blob with no metrics.
    EmptyBlob,
    /// Any operation after `finish`.
    AlreadyFinished,
    /// `add_point` or `end_metric` with no metric open.
    NoMetricOpen,
    /// `finish` while a metric is still open.
    MetricStillOpen,
    /// Constructor rejected the configuration (e.g. tags on a numeric blob).
    InvalidConfig,
    /// A compression backend failed to seal a column.
    CompressionFailed,
}

impl EncodeError {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeError::InvalidMetricName => "invalid metric name",
            EncodeError::MetricAlreadyStarted => "metric already started",
            EncodeError::HashCollision => "metric id hash collision",
            EncodeError::InvalidCount => "declared point count must be at least 1",
            EncodeError::TimestampBackwards => "timestamp moves backwards in delta encoding",
            EncodeError::TooManyPoints => "more points than declared",
            EncodeError::PointCountMismatch => "fewer points than declared",
            EncodeError::EmptyBlob => "blob contains no metrics",
            EncodeError::AlreadyFinished => "encoder already finished",
            EncodeError::NoMetricOpen => "no metric open",
            EncodeError::MetricStillOpen => "a metric is still open",
            EncodeError::InvalidConfig => "invalid encoder configuration",
            EncodeError::CompressionFailed => "compression backend failed",
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for EncodeError {}

/// Errors raised while decoding a blob. Both are fatal for the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Version byte is not [`VERSION`]; carries the value found.
    UnsupportedVersion(u8),
    /// Structural damage: bad magic, inconsistent lengths, regions out of
    /// bounds, or a compression backend rejecting a column.
    CorruptPayload(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnsupportedVersion(v) => write!(f, "unsupported blob version {v}"),
            DecodeError::CorruptPayload(reason) => write!(f, "corrupt blob: {reason}"),
        }
    }
}

impl std::error::Error for DecodeError {}
