//! Mebo — a compact columnar encoding for short-horizon time-series blobs.
//!
//! A blob packs a group of metrics, each a bounded sequence of
//! `(timestamp, value[, tag])` points, into one self-contained little-endian
//! byte payload:
//!
//! ```text
//!     Blob := Header || Index || NameTable? || Payload
//! ```
//!
//! Metrics are identified by the xxhash-64 of their name (seed 0); rare hash
//! collisions are survived by emitting a name table. Per-metric columns are
//! sealed independently, optionally delta-encoded (timestamps) and
//! compressed (zstd, snappy, or lz4), and looked up in O(1) through the
//! index. Decoding borrows the input slice; columns decompress lazily on
//! first touch and the view is safe to share across threads.
//!
//! Encode with [`NumericEncoder`] / [`TextEncoder`], decode with
//! [`NumericDecoder`] / [`TextDecoder`]:
//!
//! ```
//! use mebo::{metric_id, EncoderConfig, NumericDecoder, NumericEncoder};
//!
//! let mut enc = NumericEncoder::new(1_000_000, EncoderConfig::new())?;
//! enc.start_metric_name("cpu.user", 2)?;
//! enc.add_point(1_000_000, 0.25)?;
//! enc.add_point(1_000_100, 0.75)?;
//! enc.end_metric()?;
//! let blob = enc.finish()?;
//!
//! let view = NumericDecoder::new(&blob)?;
//! assert_eq!(view.value_at(metric_id("cpu.user"), 1), Some(0.75));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod blob;
pub mod collision;
pub mod column;
pub mod compress;
pub mod endian;
pub mod hash;
pub mod varint;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for numeric (`f64`) blobs.
pub use blob::encoder::NumericEncoder;
/// Builder for text (byte-string, optionally tagged) blobs.
pub use blob::encoder::TextEncoder;

/// Decoded view over a numeric blob.
pub use blob::decoder::NumericDecoder;
/// Decoded view over a text blob.
pub use blob::decoder::TextDecoder;

/// Per-blob encoder options (timestamp encoding, compression, tags).
pub use blob::types::EncoderConfig;

/// Errors raised while building a blob.
pub use blob::types::EncodeError;
/// Errors raised while decoding a blob.
pub use blob::types::DecodeError;

/// Timestamp column encoding selector.
pub use blob::types::TimestampEncoding;
/// Value column encoding selector (raw only in version 1).
pub use blob::types::ValueEncoding;

/// Per-blob compression variant.
pub use compress::Compression;

/// One decoded point, as yielded by the point iterator.
pub use blob::iter::Point;

/// 64-bit metric identifier.
pub use hash::MetricId;
/// Hash a metric name to its wire identity (xxhash-64, seed 0).
pub use hash::metric_id;

/// Duplicate-hash tracking used by the encoder; public for callers that
/// pre-validate metric sets before encoding.
pub use collision::CollisionTracker;
