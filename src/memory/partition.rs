//! Striping policy: which shard owns which element, word or bit.
//!
//! Elements are striped round-robin by index: element `i` lives on shard
//! `i % P` at local offset `i / P`.
//!
//! Bitmaps use one fixed layout, blocked 64-bit words dealt round-robin:
//! bit `i` belongs to global word `i / 64` with mask `1 << (i % 64)`, and
//! global word `w` lives on shard `w % P` at local word `w / P`. No other bit
//! layout exists in this crate.

use crate::error::{Error, Result};

/// Bits per bitmap word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Location of an element: owning shard and offset inside that shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Owning shard.
    pub shard: usize,
    /// Offset within the shard's local storage.
    pub offset: usize,
}

/// Location of a bit: owning shard, local word index and the bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitSlot {
    /// Owning shard.
    pub shard: usize,
    /// Word index within the shard's local words.
    pub word: usize,
    /// Single-bit mask within the word.
    pub mask: u64,
}

/// Round-robin striping over a fixed number of shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partitioning {
    shards: usize,
}

impl Partitioning {
    /// Creates a partitioning over `shards` shards.
    ///
    /// # Panics
    /// Panics if `shards == 0`.
    pub fn new(shards: usize) -> Self {
        assert!(shards != 0, "partitioning needs at least one shard");
        Self { shards }
    }

    /// Fallible constructor for configuration paths.
    pub fn try_new(shards: usize) -> Result<Self> {
        if shards == 0 {
            return Err(Error::InvalidConfig("partitions must be >= 1".into()));
        }
        Ok(Self { shards })
    }

    /// One shard per available hardware thread.
    pub fn per_core() -> Self {
        let shards = std::thread::available_parallelism().map_or(1, usize::from);
        Self { shards }
    }

    /// Number of shards.
    #[inline(always)]
    pub fn shards(&self) -> usize {
        self.shards
    }

    /// Owning shard of element `index`.
    #[inline(always)]
    pub fn owner(&self, index: usize) -> usize {
        index % self.shards
    }

    /// Locates element `index`.
    #[inline(always)]
    pub fn locate(&self, index: usize) -> Slot {
        Slot {
            shard: index % self.shards,
            offset: index / self.shards,
        }
    }

    /// Inverse of [`locate`](Self::locate).
    #[inline(always)]
    pub fn global(&self, shard: usize, offset: usize) -> usize {
        offset * self.shards + shard
    }

    /// Number of elements of an `n`-element striped container owned by `shard`.
    #[inline]
    pub fn local_len(&self, shard: usize, n: usize) -> usize {
        debug_assert!(shard < self.shards);
        n / self.shards + usize::from(shard < n % self.shards)
    }

    /// Largest per-shard element count for an `n`-element container.
    #[inline]
    pub fn max_local_len(&self, n: usize) -> usize {
        n.div_ceil(self.shards)
    }

    /// Number of bitmap words needed for `bits` bits.
    #[inline]
    pub fn words_for(bits: usize) -> usize {
        bits.div_ceil(WORD_BITS)
    }

    /// Number of bitmap words owned by `shard` for a `bits`-bit bitmap.
    #[inline]
    pub fn local_words(&self, shard: usize, bits: usize) -> usize {
        self.local_len(shard, Self::words_for(bits))
    }

    /// Locates bit `bit` under the blocked-word layout.
    #[inline(always)]
    pub fn locate_bit(&self, bit: usize) -> BitSlot {
        let global_word = bit >> 6;
        let Slot { shard, offset } = self.locate(global_word);
        BitSlot {
            shard,
            word: offset,
            mask: 1u64 << (bit & 63),
        }
    }

    /// Global bit index of bit `bit` in local word `word` of `shard`.
    #[inline(always)]
    pub fn global_bit(&self, shard: usize, word: usize, bit: usize) -> usize {
        debug_assert!(bit < WORD_BITS);
        (self.global(shard, word) << 6) | bit
    }
}

impl Default for Partitioning {
    fn default() -> Self {
        Self::per_core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_and_global_are_inverse() {
        let p = Partitioning::new(3);
        for i in 0..100 {
            let s = p.locate(i);
            assert!(s.shard < 3);
            assert_eq!(p.global(s.shard, s.offset), i);
        }
    }

    #[test]
    fn local_lengths_cover_every_element() {
        for shards in 1..8 {
            let p = Partitioning::new(shards);
            for n in 0..40 {
                let total: usize = (0..shards).map(|s| p.local_len(s, n)).sum();
                assert_eq!(total, n);
                for i in 0..n {
                    let s = p.locate(i);
                    assert!(s.offset < p.local_len(s.shard, n));
                }
                assert_eq!(
                    (0..shards).map(|s| p.local_len(s, n)).max().unwrap_or(0),
                    p.max_local_len(n)
                );
            }
        }
    }

    #[test]
    fn bit_layout_is_word_blocked_round_robin() {
        let p = Partitioning::new(4);
        // Bits 0..64 share global word 0 on shard 0.
        assert_eq!(p.locate_bit(0), BitSlot { shard: 0, word: 0, mask: 1 });
        assert_eq!(p.locate_bit(63).shard, 0);
        assert_eq!(p.locate_bit(64), BitSlot { shard: 1, word: 0, mask: 1 });
        assert_eq!(p.locate_bit(4 * 64 + 5), BitSlot { shard: 0, word: 1, mask: 1 << 5 });
        for bit in 0..2000 {
            let s = p.locate_bit(bit);
            assert_eq!(p.global_bit(s.shard, s.word, s.mask.trailing_zeros() as usize), bit);
            assert!(s.word < p.local_words(s.shard, 2000));
        }
    }

    #[test]
    fn zero_shards_is_rejected() {
        assert!(Partitioning::try_new(0).is_err());
        assert_eq!(Partitioning::try_new(2).unwrap().shards(), 2);
    }
}
