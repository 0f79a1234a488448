//! # `shardgraph` - Partitioned Graph Traversal Engine
//!
//! A shared-memory rendition of a partitioned global address space: every
//! per-vertex array is striped across `P` shards, cross-shard updates are
//! expressed as remote atomics or deferred writes, and a direction-optimizing
//! breadth-first search runs on top.
//!
//! ## Layers
//!
//! 1. **Memory** ([`memory`]): [`Partitioning`] fixes the round-robin layout
//!    (`shard = i % P`, `offset = i / P`). [`StripedArray`] holds one owned
//!    slice per shard, [`Replicated`] one cache-padded copy per shard, and
//!    [`RemoteAtomic`] is the fire-and-forget / CAS vocabulary over the
//!    standard atomics.
//! 2. **Flow control** ([`flow`]): a caller-owned [`FlowControl`] context.
//!    Inside [`FlowControl::unacknowledged`] writes are routed to the home
//!    shard's mailbox without confirmation; leaving the region drains every
//!    mailbox and runs a barrier, after which all writes are visible.
//! 3. **Graph** ([`graph`]): three-pass distributed CSR construction from an
//!    [`EdgeList`] into an immutable [`Graph`].
//! 4. **Frontier** ([`frontier`]): the sparse [`SlidingQueue`], the dense
//!    [`StripedBitmap`], and conversions between them.
//! 5. **Traversal** ([`bfs`]): [`HybridBfs`] with four [`Algorithm`]s, the
//!    Beamer switch policy, and a serial validation oracle in [`bfs::check`].
//!
//! ## Concurrency model
//!
//! Fork/join on rayon. Each shard's data is processed by tasks spawned for
//! that shard; shards only interact through atomics or mailboxes. Writes to
//! the same address resolve as last-write-wins (deferred writes) or
//! first-CAS-wins (claims). No traversal step holds a lock across a join.
//!
//! ## Example
//!
//! ```rust
//! use shardgraph::{Algorithm, BfsParams, EdgeList, FlowControl, Graph, HybridBfs, Partitioning};
//!
//! // A 5-cycle on two shards.
//! let edges = EdgeList::from_pairs(5, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
//! let partitioning = Partitioning::new(2);
//! let graph = Graph::from_edge_list_with(&edges, partitioning)?;
//!
//! let mut flow = FlowControl::new(partitioning);
//! let mut bfs = HybridBfs::new(&graph)?;
//! let stats = bfs.run(&mut flow, Algorithm::BeamerHybrid, 0, &BfsParams::default())?;
//!
//! assert_eq!(bfs.depths(), vec![0, 1, 2, 2, 1]);
//! assert!(bfs.check(0));
//! assert_eq!(stats.vertices_visited, 5);
//! # Ok::<(), shardgraph::Error>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod bfs;
pub mod config;
pub mod error;
pub mod flow;
pub mod frontier;
pub mod graph;
pub mod memory;

pub use bfs::{Algorithm, BfsParams, BfsStats, HybridBfs};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use flow::{FlowControl, FlowStats, Outbox, WriteBatch};
pub use frontier::{bitmap_to_queue, queue_to_bitmap, SlidingQueue, StripedBitmap};
pub use graph::{EdgeList, Graph, GraphStats};
pub use memory::{Partitioning, RemoteAtomic, Replicated, StripedArray};

// Compile-time layout assertions.
const _: () = {
    use core::mem;
    use core::sync::atomic::{AtomicI64, AtomicU64};

    // A bitmap word is exactly one 64-bit atomic.
    assert!(memory::WORD_BITS == 64);
    assert!(mem::size_of::<AtomicU64>() * 8 == memory::WORD_BITS);

    // Parent cells hold either a vertex id or a negative degree.
    assert!(mem::size_of::<AtomicI64>() == mem::size_of::<i64>());

    // A partitioning is a plain shard count.
    assert!(mem::size_of::<Partitioning>() == mem::size_of::<usize>());
};
