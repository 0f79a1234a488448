//! Partitioned memory model.
//!
//! Everything the graph and traversal code stores is owned by exactly one shard
//! (a "partition" of memory). Containers here make that ownership explicit:
//! - [`Partitioning`]: the single `(shard, offset) = locate(index)` policy for
//!   element-striped data, plus the fixed bitmap word layout.
//! - [`StripedArray`]: one owned allocation per shard, addressed by global index.
//! - [`Replicated`]: one independently mutable copy per shard.
//! - [`RemoteAtomic`]: read-modify-write operations executed at the owning shard.
//!
//! On shared-memory hardware a remote operation is an ordinary atomic on the
//! owner's allocation. Only per-address ordering is relied upon.

pub mod atomic;
pub mod partition;
pub mod replicated;
pub mod striped;

pub use atomic::RemoteAtomic;
pub use partition::{BitSlot, Partitioning, Slot, WORD_BITS};
pub use replicated::Replicated;
pub use striped::StripedArray;
