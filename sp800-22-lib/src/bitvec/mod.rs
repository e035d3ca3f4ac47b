//! Everything needed to store the data to test.
//!
//! A [BitVec] is a read-only view on a byte buffer. Bits are ordered MSB first within each byte,
//! i.e. bit index 0 is the MSB of the first byte. Sub-sequences (see [BitVec::slice]) borrow the
//! same buffer and never copy it.

use rayon::prelude::*;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use std::ops::Range;

pub mod iter;

use iter::{ChunksExact, Iter};

/// How many bits a byte has
const BYTE_SIZE: usize = u8::BITS as usize;

/// A list of bits, tightly packed - used in all tests
#[derive(Clone)]
pub struct BitVec<'a> {
    // data storage, MSB of bytes[0] is the first bit of the storage
    bytes: Cow<'a, [u8]>,
    // index of the first bit of this view inside `bytes`
    offset: usize,
    // count of bits in this view
    len_bit: usize,
}

impl BitVec<'_> {
    /// How many bits the Vec contains
    #[inline]
    pub fn len_bit(&self) -> usize {
        self.len_bit
    }

    /// If the BitVec contains no bits at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len_bit == 0
    }

    /// Returns the bit at the given index.
    ///
    /// Panics if `idx >= self.len_bit()`.
    #[inline]
    pub fn bit(&self, idx: usize) -> bool {
        assert!(
            idx < self.len_bit,
            "bit index {idx} out of range for a BitVec of length {}",
            self.len_bit
        );
        let pos = self.offset + idx;
        (self.bytes[pos / BYTE_SIZE] >> (BYTE_SIZE - 1 - pos % BYTE_SIZE)) & 1 == 1
    }

    /// Returns the bit at the given index as 0 or 1.
    ///
    /// Panics if `idx >= self.len_bit()`.
    #[inline]
    pub fn value(&self, idx: usize) -> u8 {
        self.bit(idx) as u8
    }

    /// Returns the polarity of the bit at the given index: `-1` for a 0, `+1` for a 1.
    ///
    /// Panics if `idx >= self.len_bit()`.
    #[inline]
    pub fn polarity(&self, idx: usize) -> i8 {
        if self.bit(idx) {
            1
        } else {
            -1
        }
    }

    /// Returns `len` bits starting at `start` as an unsigned integer, with the bit at `start`
    /// as the most significant one.
    ///
    /// Panics if the range exceeds the BitVec or if `len > usize::BITS`.
    pub fn bits_as_usize(&self, start: usize, len: usize) -> usize {
        assert!(len <= usize::BITS as usize, "cannot extract {len} bits into a usize");
        assert!(
            start + len <= self.len_bit,
            "bit range {start}..{} out of range for a BitVec of length {}",
            start + len,
            self.len_bit
        );

        (start..start + len).fold(0, |value, idx| (value << 1) | (self.bit(idx) as usize))
    }

    /// Returns a view of the given bit range, sharing the underlying storage.
    ///
    /// Panics if the range is out of bounds or reversed.
    pub fn slice(&self, range: Range<usize>) -> BitVec<'_> {
        assert!(
            range.start <= range.end && range.end <= self.len_bit,
            "bit range {range:?} out of range for a BitVec of length {}",
            self.len_bit
        );

        BitVec {
            bytes: Cow::Borrowed(&*self.bytes),
            offset: self.offset + range.start,
            len_bit: range.end - range.start,
        }
    }

    /// Count of bits with value 1.
    pub fn count_ones(&self) -> usize {
        if self.len_bit == 0 {
            return 0;
        }

        let first = self.offset;
        let end = self.offset + self.len_bit;
        let first_full_byte = first.div_ceil(BYTE_SIZE);
        let end_full_byte = end / BYTE_SIZE;

        if first_full_byte >= end_full_byte {
            // no full byte in between, look at every bit
            return self.iter().filter(|&bit| bit).count();
        }

        // bits before the first full byte
        let head = (0..(first_full_byte * BYTE_SIZE - first))
            .filter(|&idx| self.bit(idx))
            .count();
        // full bytes
        let middle = self.bytes[first_full_byte..end_full_byte]
            .par_iter()
            .map(|byte| byte.count_ones() as usize)
            .sum::<usize>();
        // bits after the last full byte
        let tail_start = end_full_byte * BYTE_SIZE - first;
        let tail = (tail_start..self.len_bit)
            .filter(|&idx| self.bit(idx))
            .count();

        head + middle + tail
    }

    /// Count of bits with value 0.
    pub fn count_zeros(&self) -> usize {
        self.len_bit - self.count_ones()
    }

    /// Iterate over all bits.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Iterate over all complete chunks with exactly `chunk_len` bits. The remainder is not
    /// part of the iteration.
    ///
    /// Panics if `chunk_len == 0`.
    pub fn chunks_exact(&self, chunk_len: usize) -> ChunksExact<'_> {
        ChunksExact::new(self, chunk_len)
    }

    /// Parallel version of [Self::chunks_exact].
    ///
    /// Panics if `chunk_len == 0`.
    pub fn par_chunks_exact(
        &self,
        chunk_len: usize,
    ) -> impl IndexedParallelIterator<Item = BitVec<'_>> + '_ {
        assert_ne!(chunk_len, 0, "chunk length must be non-zero");

        let count = self.len_bit / chunk_len;
        (0..count)
            .into_par_iter()
            .map(move |i| self.slice((i * chunk_len)..((i + 1) * chunk_len)))
    }

    /// Returns the underlying bytes, if this view starts at a byte boundary.
    /// The last byte may contain bits that are not part of this view.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if self.offset % BYTE_SIZE != 0 {
            return None;
        }

        let start = self.offset / BYTE_SIZE;
        let end = (self.offset + self.len_bit).div_ceil(BYTE_SIZE);
        Some(&self.bytes[start..end])
    }

    /// Copy the view into a new, owned BitVec.
    pub fn into_owned(self) -> BitVec<'static> {
        match self.bytes {
            Cow::Owned(bytes) => BitVec {
                bytes: Cow::Owned(bytes),
                offset: self.offset,
                len_bit: self.len_bit,
            },
            Cow::Borrowed(bytes) => {
                let start = self.offset / BYTE_SIZE;
                let end = (self.offset + self.len_bit).div_ceil(BYTE_SIZE);
                BitVec {
                    bytes: Cow::Owned(bytes[start..end].to_vec()),
                    offset: self.offset % BYTE_SIZE,
                    len_bit: self.len_bit,
                }
            }
        }
    }
}

impl BitVec<'static> {
    /// Creates a [BitVec] from a string, with the ASCII char "0" mapping to 0 and "1" mapping to 1.
    /// No other character is allowed.
    pub fn from_ascii_str(value: &str) -> Option<Self> {
        if !value.bytes().all(|char| char == b'0' || char == b'1') {
            return None;
        }

        Some(Self::from_ascii_str_lossy(value))
    }

    /// Creates a [BitVec] from a string, with the ASCII char "0" mapping to 0 and "1" mapping to 1.
    /// Any other character is ignored.
    pub fn from_ascii_str_lossy(value: &str) -> Self {
        Self::from_ascii_str_lossy_internal(value, None)
    }

    /// Creates a [BitVec] from a string, with the ASCII char "0" mapping to 0 and "1" mapping to 1.
    /// Any other character is ignored.
    /// A maximum of `max_length` valid bits are read (not counting any invalid characters).
    pub fn from_ascii_str_lossy_with_max_length(value: &str, max_length: usize) -> Self {
        Self::from_ascii_str_lossy_internal(value, Some(max_length))
    }

    fn from_ascii_str_lossy_internal(value: &str, max_length: Option<usize>) -> Self {
        let mut bytes = Vec::with_capacity(value.len().div_ceil(BYTE_SIZE));
        let mut len_bit = 0_usize;

        for char in value.bytes().filter(|char| *char == b'0' || *char == b'1') {
            if max_length.is_some_and(|max| len_bit >= max) {
                break;
            }

            if len_bit % BYTE_SIZE == 0 {
                bytes.push(0);
            }

            if char == b'1' {
                // there is always at least 1 byte in the vec
                if let Some(byte) = bytes.last_mut() {
                    *byte |= 1 << (BYTE_SIZE - 1 - len_bit % BYTE_SIZE);
                }
            }

            len_bit += 1;
        }

        Self {
            bytes: Cow::Owned(bytes),
            offset: 0,
            len_bit,
        }
    }
}

impl<'a> BitVec<'a> {
    /// Creates a [BitVec] borrowing the given bytes, each containing 8 values.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            len_bit: bytes.len() * BYTE_SIZE,
            bytes: Cow::Borrowed(bytes),
            offset: 0,
        }
    }

    /// Crop the BitVec to the passed bit length. This operation does nothing
    /// if the previous length is smaller than the new length.
    pub fn crop(&mut self, new_bit_len: usize) {
        self.len_bit = self.len_bit.min(new_bit_len);
    }
}

// conversion functions
impl From<Vec<u8>> for BitVec<'static> {
    /// Creates a [BitVec] from a [Vec] of bytes, each containing 8 values.
    fn from(value: Vec<u8>) -> Self {
        Self {
            len_bit: value.len() * BYTE_SIZE,
            bytes: Cow::Owned(value),
            offset: 0,
        }
    }
}

impl<'a> From<&'a [u8]> for BitVec<'a> {
    /// Creates a [BitVec] from a slice of bytes, each containing 8 values.
    fn from(value: &'a [u8]) -> Self {
        Self::from_bytes(value)
    }
}

impl From<&[bool]> for BitVec<'static> {
    /// Creates a [BitVec] from a slice of booleans, each boolean representing one bit.
    fn from(value: &[bool]) -> Self {
        let bytes = value
            .chunks(BYTE_SIZE)
            .map(|chunk| {
                // [0] = MSB
                chunk
                    .iter()
                    .enumerate()
                    .fold(0_u8, |byte, (i, &bit)| byte | ((bit as u8) << (BYTE_SIZE - i - 1)))
            })
            .collect::<Vec<_>>();

        Self {
            bytes: Cow::Owned(bytes),
            offset: 0,
            len_bit: value.len(),
        }
    }
}

impl Debug for BitVec<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const SHOWN_BITS: usize = 64;

        let shown = self
            .iter()
            .take(SHOWN_BITS)
            .map(|bit| if bit { '1' } else { '0' })
            .collect::<String>();
        let ellipsis = if self.len_bit > SHOWN_BITS { "..." } else { "" };

        write!(f, "BitVec({} bits: {shown}{ellipsis})", self.len_bit)
    }
}

impl PartialEq for BitVec<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len_bit == other.len_bit && self.iter().eq(other.iter())
    }
}

impl Eq for BitVec<'_> {}
