//! Striped atomic bitmap.
//!
//! Storage is a [`StripedArray`] of 64-bit words using the blocked-word layout
//! from [`Partitioning::locate_bit`]. `set_bit` is an atomic OR at the owning
//! shard, so concurrent callers may set different bits of one word. `get_bit`
//! and `clear` are plain operations.

use core::sync::atomic::AtomicU64;

use rayon::prelude::*;

use crate::error::Result;
use crate::memory::{BitSlot, Partitioning, RemoteAtomic, StripedArray};

/// A bit set over `[0, len_bits)` striped across shards.
pub struct StripedBitmap {
    bits: usize,
    words: StripedArray<AtomicU64>,
}

impl StripedBitmap {
    /// Creates a bitmap with `bits` bits, all cleared.
    pub fn new(bits: usize, partitioning: Partitioning) -> Result<Self> {
        let words = StripedArray::try_from_fn(
            "bitmap_words",
            Partitioning::words_for(bits),
            partitioning,
            |_| AtomicU64::new(0),
        )?;
        Ok(Self { bits, words })
    }

    /// Number of bits.
    #[inline]
    pub fn len_bits(&self) -> usize {
        self.bits
    }

    /// The striping of words over shards.
    #[inline]
    pub fn partitioning(&self) -> Partitioning {
        self.words.partitioning()
    }

    /// Zeroes every word, each shard clearing its own words in parallel.
    pub fn clear(&self) {
        self.words.par_shards().for_each(|(_, words)| {
            for w in words {
                w.remote_write(0);
            }
        });
    }

    #[inline(always)]
    fn word(&self, bit: usize) -> (&AtomicU64, u64) {
        assert!(bit < self.bits, "bit {bit} out of bounds for {}", self.bits);
        let BitSlot { shard, word, mask } = self.partitioning().locate_bit(bit);
        (&self.words.shard(shard)[word], mask)
    }

    /// Sets `bit` with an atomic OR at its owning shard.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn set_bit(&self, bit: usize) {
        let (word, mask) = self.word(bit);
        word.remote_or(mask);
    }

    /// Returns whether `bit` is set.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn get_bit(&self, bit: usize) -> bool {
        let (word, mask) = self.word(bit);
        (word.read() & mask) != 0
    }

    /// Exchanges the backing storage of two bitmaps, one pointer per shard.
    ///
    /// # Panics
    /// Panics if the bitmaps differ in size or striping.
    pub fn swap(&mut self, other: &mut Self) {
        assert_eq!(self.bits, other.bits, "swap between bitmaps of different size");
        self.words.swap_storage(&mut other.words);
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words
            .par_shards()
            .map(|(_, words)| {
                words
                    .iter()
                    .map(|w| w.read().count_ones() as usize)
                    .sum::<usize>()
            })
            .sum()
    }

    /// Parallel iterator over the indices of set bits, each shard scanning its
    /// own words. Order is unspecified.
    pub fn par_ones(&self) -> impl ParallelIterator<Item = usize> + '_ {
        let partitioning = self.partitioning();
        self.words.par_shards().flat_map_iter(move |(shard, words)| {
            words.iter().enumerate().flat_map(move |(word, w)| {
                Ones(w.read()).map(move |bit| partitioning.global_bit(shard, word, bit))
            })
        })
    }
}

/// Iterates the positions of set bits in a word, lowest first.
struct Ones(u64);

impl Iterator for Ones {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}
