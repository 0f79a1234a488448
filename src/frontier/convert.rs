//! Conversion between the queue and bitmap frontier representations.
//!
//! `queue_to_bitmap` costs `O(|frontier|)`; `bitmap_to_queue` scans every
//! word, `O(V / 64)` plus one push per set bit. Over a given vertex set the
//! two are inverse up to queue order.

use rayon::prelude::*;

use super::{SlidingQueue, StripedBitmap};

/// Sets the bit of every id in the queue's current window.
///
/// The bitmap is not cleared first.
pub fn queue_to_bitmap(queue: &SlidingQueue, bitmap: &StripedBitmap) {
    queue.forall_items(|v| bitmap.set_bit(v));
}

/// Appends every set id to the queue's home shard of that id.
///
/// The ids are not visible in a window until the caller slides the queue.
pub fn bitmap_to_queue(bitmap: &StripedBitmap, queue: &SlidingQueue) {
    bitmap.par_ones().for_each(|v| queue.push_back(v));
}
