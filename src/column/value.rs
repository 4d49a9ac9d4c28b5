//! Numeric value column: raw 8-byte little-endian IEEE-754 doubles.

use super::{Cursor, ValueCodec};
use crate::endian::{put_f64_le, read_f64_le};

/// Fixed-width `f64` value codec; O(1) random access.
#[derive(Debug, Clone, Copy)]
pub struct F64Codec;

impl ValueCodec for F64Codec {
    type In<'v> = f64;
    type Out<'a> = f64;

    const FIXED_ELEM: Option<usize> = Some(8);

    #[inline]
    fn encode(buf: &mut Vec<u8>, value: f64) {
        put_f64_le(buf, value);
    }

    #[inline]
    fn decode_next<'a>(cursor: &mut Cursor<'a>) -> Option<f64> {
        let bytes = cursor.take(8)?;
        read_f64_le(bytes, 0)
    }

    #[inline]
    fn decode_at(bytes: &[u8], index: usize) -> Option<f64> {
        read_f64_le(bytes, index.checked_mul(8)?)
    }
}
