//! Values replicated once per shard.

use crossbeam_utils::CachePadded;

use super::{Partitioning, RemoteAtomic};

/// One independently mutable copy of `T` per shard.
///
/// Copies are cache-padded: each shard's copy is written by tasks running over
/// that shard's data and must not share a line with its neighbours.
pub struct Replicated<T> {
    copies: Box<[CachePadded<T>]>,
}

impl<T> Replicated<T> {
    /// Broadcast-initialises one copy per shard.
    pub fn broadcast(partitioning: Partitioning, mut f: impl FnMut(usize) -> T) -> Self {
        let copies = (0..partitioning.shards())
            .map(|shard| CachePadded::new(f(shard)))
            .collect();
        Self { copies }
    }

    /// The copy owned by `shard`.
    #[inline(always)]
    pub fn local(&self, shard: usize) -> &T {
        &self.copies[shard]
    }

    /// Number of copies.
    #[inline]
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    /// Always `false`: a partitioning has at least one shard.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    /// Iterates every copy in shard order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.copies.iter().map(|c| &**c)
    }
}

impl<A> Replicated<A>
where
    A: RemoteAtomic,
    A::Value: core::iter::Sum<A::Value>,
{
    /// Logical value: the sum of every shard's partial value.
    pub fn sum(&self) -> A::Value {
        self.iter().map(RemoteAtomic::read).sum()
    }

    /// Stores `value` into every copy.
    pub fn fill(&self, value: A::Value) {
        for c in self.iter() {
            c.remote_write(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::AtomicI64;

    use super::*;

    #[test]
    fn sum_folds_partials() {
        let r = Replicated::broadcast(Partitioning::new(4), |_| AtomicI64::new_cell(0));
        assert_eq!(r.len(), 4);
        r.local(0).remote_add(3);
        r.local(3).remote_add(4);
        assert_eq!(r.sum(), 7);
        r.fill(1);
        assert_eq!(r.sum(), 4);
    }
}
