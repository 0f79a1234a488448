//! Element-striped arrays: one owned allocation per shard.

use rayon::prelude::*;

use super::{Partitioning, Slot};
use crate::error::{try_boxed_slice, Result};

/// An array of `len` elements striped round-robin over the shards of a
/// [`Partitioning`].
///
/// The coordinator owns a fixed-size array of per-shard sub-arrays; there is no
/// aliasing between shards.
pub struct StripedArray<T> {
    partitioning: Partitioning,
    len: usize,
    shards: Box<[Box<[T]>]>,
}

impl<T> StripedArray<T> {
    /// Allocates a striped array whose element `i` is `f(i)`.
    ///
    /// `site` names the allocation in [`Error::OutOfMemory`](crate::Error::OutOfMemory).
    pub fn try_from_fn(
        site: &'static str,
        len: usize,
        partitioning: Partitioning,
        mut f: impl FnMut(usize) -> T,
    ) -> Result<Self> {
        let p = partitioning.shards();
        let shards = try_boxed_slice(site, p, |_| Box::default())?;
        let mut out = Self {
            partitioning,
            len,
            shards,
        };
        for shard in 0..p {
            let local = partitioning.local_len(shard, len);
            out.shards[shard] =
                try_boxed_slice(site, local, |offset| f(partitioning.global(shard, offset)))?;
        }
        Ok(out)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The striping policy.
    #[inline]
    pub fn partitioning(&self) -> Partitioning {
        self.partitioning
    }

    /// Element `index`, read at its home shard.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> &T {
        assert!(index < self.len, "index {index} out of bounds for {}", self.len);
        let Slot { shard, offset } = self.partitioning.locate(index);
        &self.shards[shard][offset]
    }

    /// The elements owned by `shard`, in local-offset order.
    #[inline]
    pub fn shard(&self, shard: usize) -> &[T] {
        &self.shards[shard]
    }

    /// Iterates `(shard, elements)` pairs.
    pub fn shards(&self) -> impl ExactSizeIterator<Item = (usize, &[T])> + '_ {
        self.shards.iter().map(|s| &**s).enumerate()
    }

    /// Iterates `(global_index, element)` in shard-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.shards().flat_map(move |(shard, elems)| {
            elems
                .iter()
                .enumerate()
                .map(move |(offset, e)| (self.partitioning.global(shard, offset), e))
        })
    }

    /// Converts every element, keeping the striping.
    pub fn try_map<U>(self, site: &'static str, mut f: impl FnMut(T) -> U) -> Result<StripedArray<U>> {
        let Self {
            partitioning,
            len,
            shards,
        } = self;
        let mut out = Vec::new();
        out.try_reserve_exact(shards.len()).map_err(|_| crate::Error::OutOfMemory {
            site,
            bytes: shards.len() * core::mem::size_of::<Box<[U]>>(),
        })?;
        for local in shards.into_vec() {
            let mut converted = Vec::new();
            converted
                .try_reserve_exact(local.len())
                .map_err(|_| crate::Error::OutOfMemory {
                    site,
                    bytes: local.len() * core::mem::size_of::<U>(),
                })?;
            converted.extend(local.into_vec().into_iter().map(&mut f));
            out.push(converted.into_boxed_slice());
        }
        Ok(StripedArray {
            partitioning,
            len,
            shards: out.into_boxed_slice(),
        })
    }

    /// Swaps the per-shard storage of two arrays with the same shape.
    ///
    /// This exchanges `P` pointers; no element is copied.
    pub fn swap_storage(&mut self, other: &mut Self) {
        assert_eq!(self.len, other.len, "swap between arrays of different length");
        assert_eq!(self.partitioning, other.partitioning, "swap across partitionings");
        for (a, b) in self.shards.iter_mut().zip(other.shards.iter_mut()) {
            core::mem::swap(a, b);
        }
    }
}

impl<T: Sync> StripedArray<T> {
    /// Parallel iterator over `(shard, elements)`, one task subtree per shard.
    pub fn par_shards(&self) -> impl IndexedParallelIterator<Item = (usize, &[T])> + '_ {
        self.shards[..].par_iter().map(|s| &**s).enumerate()
    }
}
