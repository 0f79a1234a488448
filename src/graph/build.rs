//! Construction protocol for [`Graph`].
//!
//! Three passes over the edge list, every one of them a set of remote atomic
//! operations against the owning shards:
//!
//! 1. **Degree counting**: both endpoints of every edge get a remote increment.
//! 2. **Storage sizing**: each shard sums the degrees of the vertices it owns;
//!    every shard then gets a block of the *maximum* per-shard size, so one
//!    uniform allocation per shard replaces one allocation per vertex.
//! 3. **Placement and fill**: every vertex with edges bump-allocates its region
//!    from its home shard's `next_edge_storage` cursor and zeroes its degree;
//!    a second scan of the edge list inserts both directions of every edge,
//!    using the degree counter as the insertion cursor. When the scan ends each
//!    counter is back at the vertex's degree.
//!
//! Neighbor order inside a region depends on the interleaving of the fill.

use core::sync::atomic::AtomicUsize;

use rayon::prelude::*;
use tracing::{debug, info};

use super::{EdgeList, Graph};
use crate::error::{try_boxed_slice, Result};
use crate::memory::{Partitioning, RemoteAtomic, Replicated, StripedArray};

pub(super) fn from_edge_list(list: &EdgeList, partitioning: Partitioning) -> Result<Graph> {
    list.validate()?;
    let n = list.num_vertices;
    let m = list.num_edges();
    let p = partitioning.shards();

    // Pass 1: degree counting.
    let degree =
        StripedArray::try_from_fn("vertex_out_degree", n, partitioning, |_| AtomicUsize::new(0))?;
    list.src
        .par_iter()
        .zip(list.dst.par_iter())
        .for_each(|(&u, &v)| {
            degree.get(u).remote_add(1);
            degree.get(v).remote_add(1);
        });
    debug!(vertices = n, edges = m, "counted degrees");

    // Pass 2: storage sizing.
    let required: Vec<usize> = degree
        .par_shards()
        .map(|(_, local)| local.iter().map(RemoteAtomic::read).sum::<usize>())
        .collect();
    let block_len = required.iter().copied().max().unwrap_or(0);
    let mut blocks = Vec::with_capacity(p);
    for _ in 0..p {
        blocks.push(try_boxed_slice("edge_storage", block_len, |_| AtomicUsize::new(0))?);
    }
    debug!(block_len, shards = p, "sized edge storage");

    // Pass 3a: placement.
    let next_edge_storage = Replicated::broadcast(partitioning, |_| AtomicUsize::new(0));
    let offset =
        StripedArray::try_from_fn("vertex_edge_offset", n, partitioning, |_| AtomicUsize::new(0))?;
    (0..n).into_par_iter().for_each(|v| {
        let d = degree.get(v).read();
        if d > 0 {
            let home = partitioning.owner(v);
            let start = next_edge_storage.local(home).atomic_fetch_add(d);
            offset.get(v).remote_write(start);
            degree.get(v).remote_write(0);
        }
    });

    // Pass 3b: fill.
    let insert = |u: usize, w: usize| {
        let pos = degree.get(u).atomic_fetch_add(1);
        let slot = offset.get(u).read() + pos;
        blocks[partitioning.owner(u)][slot].remote_write(w);
    };
    list.src
        .par_iter()
        .zip(list.dst.par_iter())
        .for_each(|(&u, &v)| {
            insert(u, v);
            insert(v, u);
        });
    debug!("filled edge blocks");

    let used: Box<[usize]> = next_edge_storage.iter().map(RemoteAtomic::read).collect();
    debug_assert_eq!(&*used, &required[..]);

    let degree = degree.try_map("vertex_out_degree", RemoteAtomic::into_value)?;
    let offset = offset.try_map("vertex_edge_offset", RemoteAtomic::into_value)?;
    let mut frozen = Vec::with_capacity(p);
    for block in blocks {
        frozen.push(try_boxed_slice("edge_storage", block.len(), |i| block[i].read())?);
    }

    info!(
        vertices = n,
        edges = m,
        shards = p,
        block_len,
        "constructed sharded graph"
    );

    Ok(Graph::from_parts(
        partitioning,
        m,
        degree,
        offset,
        frozen.into_boxed_slice(),
        used,
    ))
}
