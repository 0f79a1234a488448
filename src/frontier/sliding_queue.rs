//! Per-shard sliding queue.
//!
//! Each shard owns an append-only buffer, a write cursor and the current
//! window `[head, tail)`. A window is one BFS level:
//! - `push_back(v)` reserves a slot with fetch-and-add on the cursor of `v`'s
//!   home shard, so an insertion is always local to the vertex it stores.
//! - `slide_window()` turns everything appended since the last slide into the
//!   new window, on every shard in lockstep.
//!
//! Windows are contiguous, non-overlapping and increasing. A vertex is queued
//! at most once per traversal and only on its home shard, so each shard's
//! capacity is the number of vertices it owns.

use core::ops::Range;
use core::sync::atomic::AtomicUsize;

use crossbeam_utils::CachePadded;
use rayon::prelude::*;

use crate::error::{try_boxed_slice, Result};
use crate::memory::{Partitioning, RemoteAtomic};

struct QueueShard {
    buffer: Box<[AtomicUsize]>,
    cursor: CachePadded<AtomicUsize>,
    head: usize,
    tail: usize,
}

impl QueueShard {
    #[inline]
    fn window(&self) -> &[AtomicUsize] {
        &self.buffer[self.head..self.tail]
    }
}

/// A level-windowed queue of vertex ids with one buffer per shard.
pub struct SlidingQueue {
    partitioning: Partitioning,
    shards: Box<[QueueShard]>,
    levels: usize,
}

impl SlidingQueue {
    /// Creates an empty queue able to hold each of `num_vertices` ids once.
    pub fn new(num_vertices: usize, partitioning: Partitioning) -> Result<Self> {
        let mut shards = Vec::with_capacity(partitioning.shards());
        for shard in 0..partitioning.shards() {
            let capacity = partitioning.local_len(shard, num_vertices);
            shards.push(QueueShard {
                buffer: try_boxed_slice("sliding_queue", capacity, |_| AtomicUsize::new(0))?,
                cursor: CachePadded::new(AtomicUsize::new(0)),
                head: 0,
                tail: 0,
            });
        }
        Ok(Self {
            partitioning,
            shards: shards.into_boxed_slice(),
            levels: 0,
        })
    }

    /// The striping used to route ids to shards.
    #[inline]
    pub fn partitioning(&self) -> Partitioning {
        self.partitioning
    }

    /// Appends `v` to its home shard. Safe to call concurrently.
    ///
    /// The id becomes visible to readers at the next [`slide_window`](Self::slide_window).
    ///
    /// # Panics
    /// Panics if the home shard is full, i.e. `v` was queued twice.
    #[inline]
    pub fn push_back(&self, v: usize) {
        let shard = &self.shards[self.partitioning.owner(v)];
        let pos = shard.cursor.atomic_fetch_add(1);
        assert!(
            pos < shard.buffer.len(),
            "sliding queue overflow on shard {} pushing {v}",
            self.partitioning.owner(v)
        );
        shard.buffer[pos].remote_write(v);
    }

    /// Makes everything appended since the previous slide the current window.
    pub fn slide_window(&mut self) {
        for shard in self.shards.iter_mut() {
            shard.head = shard.tail;
            shard.tail = shard.cursor.read();
        }
        self.levels += 1;
    }

    /// Empties every shard and forgets all windows.
    pub fn reset(&mut self) {
        for shard in self.shards.iter_mut() {
            shard.cursor.remote_write(0);
            shard.head = 0;
            shard.tail = 0;
        }
        self.levels = 0;
    }

    /// `true` if the current window is empty on every shard.
    pub fn all_empty(&self) -> bool {
        self.shards.iter().all(|s| s.head == s.tail)
    }

    /// Size of the current window summed over shards.
    pub fn combined_size(&self) -> usize {
        self.shards.iter().map(|s| s.tail - s.head).sum()
    }

    /// Number of windows slid since the last reset.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Buffer positions of `shard`'s current window.
    pub fn window_range(&self, shard: usize) -> Range<usize> {
        let s = &self.shards[shard];
        s.head..s.tail
    }

    /// Ids in `shard`'s current window.
    pub fn window(&self, shard: usize) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.shards[shard].window().iter().map(RemoteAtomic::read)
    }

    /// Parallel iterator over the current window of every shard.
    ///
    /// Shards are processed as independent task subtrees; inside a shard the
    /// window is split on demand by idle workers, which absorbs degree skew.
    pub fn par_items(&self) -> impl ParallelIterator<Item = usize> + '_ {
        self.shards[..]
            .par_iter()
            .flat_map(|s| s.window().par_iter().map(RemoteAtomic::read))
    }

    /// Applies `f` to every id in the current window.
    pub fn forall_items<F>(&self, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        self.par_items().for_each(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_set(q: &SlidingQueue) -> Vec<usize> {
        let mut v: Vec<usize> = q.par_items().collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn windows_advance_in_lockstep() {
        let mut q = SlidingQueue::new(10, Partitioning::new(3)).unwrap();
        assert!(q.all_empty());

        q.push_back(4);
        q.push_back(0);
        // Not visible until the slide.
        assert!(q.all_empty());
        q.slide_window();
        assert_eq!(window_set(&q), vec![0, 4]);
        assert_eq!(q.combined_size(), 2);

        q.push_back(9);
        q.push_back(5);
        q.push_back(1);
        q.slide_window();
        assert_eq!(window_set(&q), vec![1, 5, 9]);
        assert_eq!(q.levels(), 2);

        q.slide_window();
        assert!(q.all_empty());
        assert_eq!(q.combined_size(), 0);
    }

    #[test]
    fn items_land_on_home_shard() {
        let mut q = SlidingQueue::new(12, Partitioning::new(4)).unwrap();
        for v in [0, 5, 7, 8, 11] {
            q.push_back(v);
        }
        q.slide_window();
        assert_eq!(q.window(0).collect::<Vec<_>>(), vec![0, 8]);
        assert_eq!(q.window(1).collect::<Vec<_>>(), vec![5]);
        assert_eq!(q.window(2).count(), 0);
        let mut three: Vec<usize> = q.window(3).collect();
        three.sort_unstable();
        assert_eq!(three, vec![7, 11]);
        assert_eq!(q.window_range(0), 0..2);
    }

    #[test]
    fn concurrent_push_keeps_every_item() {
        let mut q = SlidingQueue::new(5000, Partitioning::new(4)).unwrap();
        (0..5000usize).into_par_iter().for_each(|v| q.push_back(v));
        q.slide_window();
        assert_eq!(q.combined_size(), 5000);
        assert_eq!(window_set(&q), (0..5000).collect::<Vec<_>>());
    }

    #[test]
    fn reset_empties_everything() {
        let mut q = SlidingQueue::new(4, Partitioning::new(2)).unwrap();
        q.push_back(1);
        q.slide_window();
        q.reset();
        assert!(q.all_empty());
        assert_eq!(q.levels(), 0);
        // Capacity is reusable after a reset.
        q.push_back(1);
        q.push_back(3);
        q.slide_window();
        assert_eq!(q.combined_size(), 2);
    }

    #[test]
    #[should_panic(expected = "sliding queue overflow")]
    fn double_push_overflows_home_shard() {
        let q = SlidingQueue::new(1, Partitioning::new(1)).unwrap();
        q.push_back(0);
        q.push_back(0);
    }
}
