//! Blob assembly and disassembly.
//!
//! This module contains the wire-facing core: header and index layout, the
//! encoder state machine, and the decoded view with its accessors and
//! iterators.

pub mod decoder;
pub mod encoder;
pub mod header;
pub mod iter;
pub mod types;

// Re-export the most important public API items at the module level.
pub use decoder::{Decoder, NumericDecoder, TextDecoder};
pub use encoder::{Encoder, NumericEncoder, TextEncoder};
pub use iter::{Point, PointIter, TagIter, TimestampIter, ValueIter};
pub use types::{
    DecodeError, EncodeError, EncoderConfig, TimestampEncoding, ValueEncoding, HEADER_SIZE,
    INDEX_ENTRY_SIZE, INDEX_ENTRY_SIZE_TAGGED, MAGIC, VERSION,
};
