//! The immutable sharded CSR graph.
//!
//! Per-vertex `degree` and `offset` are striped like vertex ids. The edges of
//! vertex `v` occupy `blocks[owner(v)][offset(v)..offset(v) + degree(v)]`: a
//! contiguous region of one per-shard block, all on `v`'s home shard.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `from_edge_list` | \(O(n + m)\) | Three parallel passes of remote atomics |
//! | `out_neighbors` | \(O(1)\) | Borrowed slice of the home shard's block |
//! | `out_degree` | \(O(1)\) | |
//! | `has_edge` | \(O(d)\) / \(O(\log d)\) | Binary search once sorted |
//! | `sort_edge_lists` | \(O(m \log d)\) | Parallel over shards and vertices |

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::memory::{Partitioning, StripedArray};

use super::EdgeList;

/// Shape and storage figures of a constructed graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Number of vertices.
    pub num_vertices: usize,
    /// Number of undirected edges.
    pub num_edges: usize,
    /// Largest vertex degree.
    pub max_degree: usize,
    /// Number of shards.
    pub shards: usize,
    /// Uniform per-shard block length, in neighbor slots.
    pub block_len: usize,
    /// Neighbor slots in use, per shard.
    pub used_per_shard: Vec<usize>,
    /// Allocated but unused neighbor slots over all shards.
    pub wasted_slots: usize,
}

/// An undirected graph stored as per-shard CSR blocks.
pub struct Graph {
    partitioning: Partitioning,
    num_edges: usize,
    degree: StripedArray<usize>,
    offset: StripedArray<usize>,
    blocks: Box<[Box<[usize]>]>,
    used: Box<[usize]>,
    sorted: bool,
}

impl Graph {
    /// Builds a graph with one shard per available hardware thread.
    pub fn from_edge_list(list: &EdgeList) -> Result<Self> {
        Self::from_edge_list_with(list, Partitioning::per_core())
    }

    /// Builds a graph striped over `partitioning`.
    ///
    /// # Errors
    /// [`Error::VertexOutOfRange`](crate::Error::VertexOutOfRange) or
    /// [`Error::MalformedEdgeList`](crate::Error::MalformedEdgeList) for a bad
    /// edge list; [`Error::OutOfMemory`](crate::Error::OutOfMemory) if storage
    /// cannot be allocated. No partial graph is returned.
    pub fn from_edge_list_with(list: &EdgeList, partitioning: Partitioning) -> Result<Self> {
        super::build::from_edge_list(list, partitioning)
    }

    pub(super) fn from_parts(
        partitioning: Partitioning,
        num_edges: usize,
        degree: StripedArray<usize>,
        offset: StripedArray<usize>,
        blocks: Box<[Box<[usize]>]>,
        used: Box<[usize]>,
    ) -> Self {
        Self {
            partitioning,
            num_edges,
            degree,
            offset,
            blocks,
            used,
            sorted: false,
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.degree.len()
    }

    /// Number of undirected edges in the input (each stored twice).
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// The striping of vertices over shards.
    #[inline]
    pub fn partitioning(&self) -> Partitioning {
        self.partitioning
    }

    /// Degree of `v`.
    ///
    /// # Panics
    /// Panics if `v >= num_vertices()`.
    #[inline(always)]
    pub fn out_degree(&self, v: usize) -> usize {
        *self.degree.get(v)
    }

    /// Neighbors of `v`, borrowed from `v`'s home shard.
    ///
    /// # Panics
    /// Panics if `v >= num_vertices()`.
    #[inline(always)]
    pub fn out_neighbors(&self, v: usize) -> &[usize] {
        let start = *self.offset.get(v);
        let end = start + *self.degree.get(v);
        &self.blocks[self.partitioning.owner(v)][start..end]
    }

    /// Degrees of the vertices owned by `shard`, in local order.
    #[inline]
    pub fn shard_degrees(&self, shard: usize) -> &[usize] {
        self.degree.shard(shard)
    }

    /// Checks whether `u` and `v` are adjacent.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        let nbrs = self.out_neighbors(u);
        if self.sorted {
            nbrs.binary_search(&v).is_ok()
        } else {
            nbrs.contains(&v)
        }
    }

    /// `true` once [`sort_edge_lists`](Self::sort_edge_lists) has run.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Uniform per-shard block length.
    pub fn shard_block_len(&self) -> usize {
        self.blocks.first().map_or(0, |b| b.len())
    }

    /// Largest vertex degree.
    pub fn max_degree(&self) -> usize {
        self.degree
            .par_shards()
            .map(|(_, d)| d.iter().copied().max().unwrap_or(0))
            .max()
            .unwrap_or(0)
    }

    /// Sorts every vertex's neighbor list ascending.
    ///
    /// Each shard sorts its own regions; regions are disjoint slices of the
    /// shard's block, so they are split off and sorted in parallel.
    pub fn sort_edge_lists(&mut self) {
        let Self {
            degree,
            offset,
            blocks,
            ..
        } = self;
        let (degree, offset) = (&*degree, &*offset);
        blocks[..]
            .par_iter_mut()
            .enumerate()
            .for_each(|(shard, block)| {
                let mut regions: Vec<(usize, usize)> = offset
                    .shard(shard)
                    .iter()
                    .zip(degree.shard(shard))
                    .filter(|&(_, &d)| d > 0)
                    .map(|(&o, &d)| (o, d))
                    .collect();
                regions.sort_unstable();
                let mut rest: &mut [usize] = &mut block[..];
                let mut cursor = 0;
                let mut slices = Vec::with_capacity(regions.len());
                for (start, len) in regions {
                    let (_, tail) = core::mem::take(&mut rest).split_at_mut(start - cursor);
                    let (region, tail) = tail.split_at_mut(len);
                    slices.push(region);
                    rest = tail;
                    cursor = start + len;
                }
                slices.into_par_iter().for_each(|s| s.sort_unstable());
            });
        self.sorted = true;
    }

    /// Shape and storage figures.
    pub fn stats(&self) -> GraphStats {
        let block_len = self.shard_block_len();
        let used_per_shard = self.used.to_vec();
        let wasted_slots = used_per_shard.iter().map(|&u| block_len - u).sum();
        GraphStats {
            num_vertices: self.num_vertices(),
            num_edges: self.num_edges,
            max_degree: self.max_degree(),
            shards: self.partitioning.shards(),
            block_len,
            used_per_shard,
            wasted_slots,
        }
    }
}
