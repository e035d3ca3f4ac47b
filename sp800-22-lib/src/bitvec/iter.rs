//! Iterators over a [BitVec].

use crate::bitvec::BitVec;
use std::iter::FusedIterator;

/// Iterator over all bits of a [BitVec], see [BitVec::iter].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    data: &'a BitVec<'a>,
    front: usize,
    back: usize,
}

impl<'a> Iter<'a> {
    pub(super) fn new(data: &'a BitVec<'a>) -> Self {
        Self {
            data,
            front: 0,
            back: data.len_bit(),
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        let bit = self.data.bit(self.front);
        self.front += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;
        Some(self.data.bit(self.back))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// Iterator over complete chunks of a [BitVec], see [BitVec::chunks_exact].
#[derive(Clone, Debug)]
pub struct ChunksExact<'a> {
    data: &'a BitVec<'a>,
    chunk_len: usize,
    current: usize,
    count: usize,
}

impl<'a> ChunksExact<'a> {
    pub(super) fn new(data: &'a BitVec<'a>, chunk_len: usize) -> Self {
        assert_ne!(chunk_len, 0, "chunk length must be non-zero");

        Self {
            data,
            chunk_len,
            current: 0,
            count: data.len_bit() / chunk_len,
        }
    }

    /// The bits that are not part of any chunk.
    pub fn remainder(&self) -> BitVec<'a> {
        let start = self.count * self.chunk_len;
        self.data.slice(start..self.data.len_bit())
    }
}

impl<'a> Iterator for ChunksExact<'a> {
    type Item = BitVec<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.count {
            return None;
        }

        let start = self.current * self.chunk_len;
        self.current += 1;
        Some(self.data.slice(start..(start + self.chunk_len)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.count - self.current;
        (len, Some(len))
    }
}

impl ExactSizeIterator for ChunksExact<'_> {}

impl FusedIterator for ChunksExact<'_> {}
