//! Lazy iteration over a decoded metric.
//!
//! Iterators are cursor objects borrowing the decoded column bytes; each
//! `next` decodes one element. They are finite (bounded by the metric's
//! point count) and terminate early — yielding nothing further — when a
//! column turns out to be truncated or damaged, treating the blob as cut
//! short. Restart by asking the decoder for a fresh iterator.

use core::marker::PhantomData;

use crate::column::{BytesCodec, Cursor, TimestampCursor, ValueCodec};

/// One decoded point. `tag` is `None` on blobs without a tag column.
pub struct Point<'d, C: ValueCodec> {
    pub timestamp: i64,
    pub value: C::Out<'d>,
    pub tag: Option<&'d [u8]>,
}

/// Iterator over a metric's points, yielding `(index, point)` pairs.
pub struct PointIter<'d, C: ValueCodec> {
    ts: Option<TimestampCursor<'d>>,
    val: Cursor<'d>,
    tag: Option<Cursor<'d>>,
    remaining: usize,
    index: usize,
    _codec: PhantomData<C>,
}

impl<'d, C: ValueCodec> PointIter<'d, C> {
    pub(crate) fn new(
        ts: TimestampCursor<'d>,
        val: Cursor<'d>,
        tag: Option<Cursor<'d>>,
        count: usize,
    ) -> Self {
        PointIter {
            ts: Some(ts),
            val,
            tag,
            remaining: count,
            index: 0,
            _codec: PhantomData,
        }
    }

    /// An iterator that yields nothing, used for unknown metrics.
    pub(crate) fn empty() -> Self {
        PointIter {
            ts: None,
            val: Cursor::new(&[]),
            tag: None,
            remaining: 0,
            index: 0,
            _codec: PhantomData,
        }
    }
}

impl<'d, C: ValueCodec> Iterator for PointIter<'d, C> {
    type Item = (usize, Point<'d, C>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let timestamp = self.ts.as_mut()?.next()?;
        let value = C::decode_next(&mut self.val)?;
        let tag = match &mut self.tag {
            Some(cursor) => Some(BytesCodec::decode_next(cursor)?),
            None => None,
        };
        self.remaining -= 1;
        let index = self.index;
        self.index += 1;
        Some((index, Point { timestamp, value, tag }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Iterator over a metric's timestamps (microseconds since the epoch).
pub struct TimestampIter<'d> {
    cursor: Option<TimestampCursor<'d>>,
    remaining: usize,
}

impl<'d> TimestampIter<'d> {
    pub(crate) fn new(cursor: TimestampCursor<'d>, count: usize) -> Self {
        TimestampIter {
            cursor: Some(cursor),
            remaining: count,
        }
    }

    pub(crate) fn empty() -> Self {
        TimestampIter {
            cursor: None,
            remaining: 0,
        }
    }
}

impl Iterator for TimestampIter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.remaining == 0 {
            return None;
        }
        let ts = self.cursor.as_mut()?.next()?;
        self.remaining -= 1;
        Some(ts)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Iterator over a metric's values.
pub struct ValueIter<'d, C: ValueCodec> {
    cursor: Option<Cursor<'d>>,
    remaining: usize,
    _codec: PhantomData<C>,
}

/// Iterator over a metric's tags (text blobs with tags only).
pub type TagIter<'d> = ValueIter<'d, BytesCodec>;

impl<'d, C: ValueCodec> ValueIter<'d, C> {
    pub(crate) fn new(cursor: Cursor<'d>, count: usize) -> Self {
        ValueIter {
            cursor: Some(cursor),
            remaining: count,
            _codec: PhantomData,
        }
    }

    pub(crate) fn empty() -> Self {
        ValueIter {
            cursor: None,
            remaining: 0,
            _codec: PhantomData,
        }
    }
}

impl<'d, C: ValueCodec> Iterator for ValueIter<'d, C> {
    type Item = C::Out<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = C::decode_next(self.cursor.as_mut()?)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
