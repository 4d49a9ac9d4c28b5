//! Text value and tag columns: `[varint length][bytes]` concatenations.
//!
//! An empty value or tag is a single `varint(0)` byte. Random access scans
//! forward; there is no stride index.

use super::{Cursor, ValueCodec};
use crate::varint::put_uvarint;

/// Variable-width byte-string codec shared by text values and tags.
#[derive(Debug, Clone, Copy)]
pub struct BytesCodec;

impl ValueCodec for BytesCodec {
    type In<'v> = &'v [u8];
    type Out<'a> = &'a [u8];

    const FIXED_ELEM: Option<usize> = None;

    #[inline]
    fn encode(buf: &mut Vec<u8>, value: &[u8]) {
        put_uvarint(buf, value.len() as u64);
        buf.extend_from_slice(value);
    }

    #[inline]
    fn decode_next<'a>(cursor: &mut Cursor<'a>) -> Option<&'a [u8]> {
        let len = cursor.read_uvarint()?;
        let len = usize::try_from(len).ok()?;
        cursor.take(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_roundtrip() {
        let mut buf = Vec::new();
        for v in [&b"a"[..], b"bb", b"", b"dddd"] {
            BytesCodec::encode(&mut buf, v);
        }

        let mut cur = Cursor::new(&buf);
        assert_eq!(BytesCodec::decode_next(&mut cur), Some(&b"a"[..]));
        assert_eq!(BytesCodec::decode_next(&mut cur), Some(&b"bb"[..]));
        assert_eq!(BytesCodec::decode_next(&mut cur), Some(&b""[..]));
        assert_eq!(BytesCodec::decode_next(&mut cur), Some(&b"dddd"[..]));
        assert_eq!(BytesCodec::decode_next(&mut cur), None);
    }

    #[test]
    fn empty_entry_is_one_byte() {
        let mut buf = Vec::new();
        BytesCodec::encode(&mut buf, b"");
        assert_eq!(buf, [0]);
    }

    #[test]
    fn random_access_scans_forward() {
        let mut buf = Vec::new();
        for v in [&b"x"[..], b"yy", b"zzz"] {
            BytesCodec::encode(&mut buf, v);
        }
        assert_eq!(BytesCodec::decode_at(&buf, 0), Some(&b"x"[..]));
        assert_eq!(BytesCodec::decode_at(&buf, 2), Some(&b"zzz"[..]));
        assert_eq!(BytesCodec::decode_at(&buf, 3), None);
    }

    #[test]
    fn truncated_entry_is_none() {
        let mut buf = Vec::new();
        BytesCodec::encode(&mut buf, b"hello");
        buf.pop();
        let mut cur = Cursor::new(&buf);
        assert_eq!(BytesCodec::decode_next(&mut cur), None);
    }

    #[test]
    fn oversized_length_prefix_is_none() {
        // Length prefix claims far more bytes than the column holds.
        let mut buf = Vec::new();
        put_uvarint(&mut buf, u64::MAX);
        let mut cur = Cursor::new(&buf);
        assert_eq!(BytesCodec::decode_next(&mut cur), None);
    }
}
