//! Frontier representations for level-synchronous traversal.
//!
//! - [`SlidingQueue`]: per-shard append-only buffers with one window per level;
//!   cheap when the frontier is small.
//! - [`StripedBitmap`]: one bit per vertex; cheap membership tests when the
//!   frontier is large.
//! - [`convert`]: exact conversion between the two.

pub mod bitmap;
pub mod convert;
pub mod sliding_queue;

pub use bitmap::StripedBitmap;
pub use convert::{bitmap_to_queue, queue_to_bitmap};
pub use sliding_queue::SlidingQueue;
