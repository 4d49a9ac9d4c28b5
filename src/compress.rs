//! Uniform compression bracket over sealed column bytes.
//!
//! Exactly one variant is selected per blob and applied to every column of
//! every metric. The adaptor is a narrow seam: the backends are consumed
//! through one `compress`/`decompress` pair, each variant is deterministic
//! on a given input, empty input maps to empty output, and a backend
//! decode failure surfaces as [`DecodeError::CorruptPayload`].

use core::fmt;

use crate::blob::types::{DecodeError, EncodeError};

/// Zstd level used for every blob. Fixed so that output bytes are stable
/// across encodes of the same input.
const ZSTD_LEVEL: i32 = 3;

/// Per-blob compression variant, stored in the header as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Compression {
    /// Identity: column bytes are stored as-is.
    #[default]
    None = 0,
    Zstd = 1,
    /// Snappy-family backend (raw block format).
    S2 = 2,
    Lz4 = 3,
}

impl Compression {
    /// Decode the header byte, `None` for unknown values.
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Compression::None),
            1 => Some(Compression::Zstd),
            2 => Some(Compression::S2),
            3 => Some(Compression::Lz4),
            _ => None,
        }
    }

    /// The header byte for this variant.
    #[inline]
    pub fn as_wire(self) -> u8 {
        self as u8
    }

    /// Compress one sealed column.
    pub fn compress(self, input: &[u8]) -> Result<Vec<u8>, EncodeError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Compression::None => Ok(input.to_vec()),
            Compression::Zstd => zstd::stream::encode_all(input, ZSTD_LEVEL)
                .map_err(|_| EncodeError::CompressionFailed),
            Compression::S2 => snap::raw::Encoder::new()
                .compress_vec(input)
                .map_err(|_| EncodeError::CompressionFailed),
            Compression::Lz4 => Ok(lz4_flex::block::compress_prepend_size(input)),
        }
    }

    /// Decompress one column region.
    ///
    /// `size_hint` is the expected decompressed length when the caller knows
    /// it (fixed-width columns); it only pre-sizes the output buffer.
    pub fn decompress(self, input: &[u8], size_hint: usize) -> Result<Vec<u8>, DecodeError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Compression::None => {
                let mut out = Vec::with_capacity(input.len().max(size_hint));
                out.extend_from_slice(input);
                Ok(out)
            }
            Compression::Zstd => {
                let mut out = Vec::with_capacity(size_hint);
                zstd::stream::copy_decode(input, &mut out)
                    .map_err(|_| DecodeError::CorruptPayload("zstd backend rejected column"))?;
                Ok(out)
            }
            Compression::S2 => snap::raw::Decoder::new()
                .decompress_vec(input)
                .map_err(|_| DecodeError::CorruptPayload("snappy backend rejected column")),
            Compression::Lz4 => lz4_flex::block::decompress_size_prepended(input)
                .map_err(|_| DecodeError::CorruptPayload("lz4 backend rejected column")),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Compression::None => "none",
            Compression::Zstd => "zstd",
            Compression::S2 => "s2",
            Compression::Lz4 => "lz4",
        })
    }
}
