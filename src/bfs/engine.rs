//! Traversal state and the direction-switching driver.

use core::sync::atomic::AtomicI64;
use std::io::Write;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, info_span};

use super::{check, Algorithm, BfsParams, BfsStats};
use crate::error::{Error, Result};
use crate::flow::FlowControl;
use crate::frontier::{bitmap_to_queue, queue_to_bitmap, SlidingQueue, StripedBitmap};
use crate::graph::Graph;
use crate::memory::{RemoteAtomic, Replicated, StripedArray};

/// Parent value of an unvisited vertex of degree `degree`.
///
/// The encoding doubles as the vertex's scout contribution: `-encoding` is
/// the number of edges the vertex brings into the frontier (at least one).
#[inline(always)]
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn unvisited(degree: usize) -> i64 {
    if degree == 0 {
        -1
    } else {
        -(degree as i64)
    }
}

/// Reusable state for breadth-first traversals of one graph.
///
/// Allocated once; every [`run`](Self::run) starts with [`clear`](Self::clear).
pub struct HybridBfs<'g> {
    pub(super) graph: &'g Graph,
    pub(super) parent: StripedArray<AtomicI64>,
    pub(super) new_parent: StripedArray<AtomicI64>,
    pub(super) queue: SlidingQueue,
    pub(super) frontier: StripedBitmap,
    pub(super) next_frontier: StripedBitmap,
    pub(super) scout_count: Replicated<AtomicI64>,
    source: Option<usize>,
}

impl<'g> HybridBfs<'g> {
    /// Allocates traversal state striped like `graph`.
    ///
    /// # Errors
    /// [`Error::OutOfMemory`] if any per-vertex array cannot be allocated.
    pub fn new(graph: &'g Graph) -> Result<Self> {
        let n = graph.num_vertices();
        let p = graph.partitioning();
        let mut bfs = Self {
            graph,
            parent: StripedArray::try_from_fn("parent", n, p, |_| AtomicI64::new(-1))?,
            new_parent: StripedArray::try_from_fn("new_parent", n, p, |_| AtomicI64::new(-1))?,
            queue: SlidingQueue::new(n, p)?,
            frontier: StripedBitmap::new(n, p)?,
            next_frontier: StripedBitmap::new(n, p)?,
            scout_count: Replicated::broadcast(p, |_| AtomicI64::new(0)),
            source: None,
        };
        bfs.clear();
        Ok(bfs)
    }

    /// The graph being traversed.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Resets every per-traversal structure.
    pub fn clear(&mut self) {
        let graph = self.graph;
        self.parent.par_shards().for_each(|(shard, cells)| {
            for (cell, &d) in cells.iter().zip(graph.shard_degrees(shard)) {
                cell.remote_write(unvisited(d));
            }
        });
        self.new_parent.par_shards().for_each(|(_, cells)| {
            for cell in cells {
                cell.remote_write(-1);
            }
        });
        self.queue.reset();
        self.frontier.clear();
        self.next_frontier.clear();
        self.scout_count.fill(0);
        self.source = None;
    }

    /// Runs one traversal from `source`.
    ///
    /// # Errors
    /// - [`Error::VertexOutOfRange`] if `source >= num_vertices`.
    /// - [`Error::InvalidConfig`] if `flow` fences a different number of shards
    ///   than the graph uses, or `alpha`/`beta` are not positive.
    pub fn run(
        &mut self,
        flow: &mut FlowControl,
        algorithm: Algorithm,
        source: usize,
        params: &BfsParams,
    ) -> Result<BfsStats> {
        let n = self.graph.num_vertices();
        if source >= n {
            return Err(Error::VertexOutOfRange {
                vertex: source,
                num_vertices: n,
            });
        }
        if flow.partitioning() != self.graph.partitioning() {
            return Err(Error::InvalidConfig(format!(
                "flow control fences {} shards but the graph has {}",
                flow.partitioning().shards(),
                self.graph.partitioning().shards()
            )));
        }
        if params.alpha < 1 || params.beta < 1 || params.grain == 0 {
            return Err(Error::InvalidConfig(format!(
                "alpha, beta and grain must be positive, got {params:?}"
            )));
        }

        let span = info_span!("bfs", %algorithm, source);
        let _enter = span.enter();
        let started = Instant::now();

        self.clear();
        self.source = Some(source);
        #[allow(clippy::cast_possible_wrap)]
        self.parent.get(source).remote_write(source as i64);
        self.queue.push_back(source);
        self.queue.slide_window();

        let mut stats = BfsStats {
            algorithm,
            source,
            top_down_steps: 0,
            bottom_up_steps: 0,
            vertices_visited: 0,
            traversed_edges: 0,
            elapsed_secs: 0.0,
        };

        if algorithm.is_hybrid() {
            self.run_direction_optimizing(flow, algorithm, params, &mut stats);
        } else {
            while !self.queue.all_empty() {
                self.top_down(flow, algorithm);
                self.queue.slide_window();
                stats.top_down_steps += 1;
            }
        }

        stats.elapsed_secs = started.elapsed().as_secs_f64();
        stats.vertices_visited = self.count_visited();
        stats.traversed_edges = self.count_num_traversed_edges();
        info!(
            steps = stats.steps(),
            top_down = stats.top_down_steps,
            bottom_up = stats.bottom_up_steps,
            visited = stats.vertices_visited,
            edges = stats.traversed_edges,
            elapsed = stats.elapsed_secs,
            "bfs complete"
        );
        Ok(stats)
    }

    /// Beamer's switch policy.
    #[allow(clippy::cast_possible_wrap)]
    fn run_direction_optimizing(
        &mut self,
        flow: &mut FlowControl,
        algorithm: Algorithm,
        params: &BfsParams,
        stats: &mut BfsStats,
    ) {
        let n = self.graph.num_vertices();
        let source = self.source.unwrap_or_default();
        let awake_threshold = n / params.beta as usize;
        let mut edges_to_check = 2 * self.graph.num_edges() as i64;
        let mut scout_count = self.graph.out_degree(source) as i64;

        while !self.queue.all_empty() {
            if scout_count > edges_to_check / params.alpha {
                debug!(scout_count, edges_to_check, "switching to bottom-up");
                self.frontier.clear();
                queue_to_bitmap(&self.queue, &self.frontier);
                let mut awake_count = self.queue.combined_size();
                loop {
                    let old_awake_count = awake_count;
                    awake_count = self.bottom_up(params.grain);
                    stats.bottom_up_steps += 1;
                    if awake_count < old_awake_count && awake_count <= awake_threshold {
                        break;
                    }
                }
                debug!(awake_count, "switching to top-down");
                bitmap_to_queue(&self.frontier, &self.queue);
                self.queue.slide_window();
                scout_count = 1;
            } else {
                edges_to_check -= scout_count;
                scout_count = self.top_down(flow, algorithm);
                self.queue.slide_window();
                stats.top_down_steps += 1;
            }
        }
    }

    /// One top-down step in the variant's style; returns the scout count.
    fn top_down(&self, flow: &mut FlowControl, algorithm: Algorithm) -> i64 {
        let frontier = self.queue.combined_size();
        let scout = if algorithm.uses_remote_writes() {
            self.top_down_remote_writes(flow)
        } else {
            self.top_down_claim()
        };
        debug!(direction = "top_down", frontier, scout, "step");
        scout
    }

    fn bottom_up(&mut self, grain: usize) -> usize {
        let awake = self.bottom_up_step(grain);
        debug!(direction = "bottom_up", awake, "step");
        awake
    }

    /// Parent of `v` after the last traversal, using the unvisited encoding
    /// for vertices that were not reached.
    pub fn parent(&self, v: usize) -> i64 {
        self.parent.get(v).read()
    }

    /// The whole parent array in vertex order.
    pub fn parents(&self) -> Vec<i64> {
        let mut out = vec![0i64; self.graph.num_vertices()];
        for (v, cell) in self.parent.iter() {
            out[v] = cell.read();
        }
        out
    }

    /// Depth of every vertex in the last tree, `-1` if unreached.
    ///
    /// Returns an empty vector if no traversal has run since the last clear.
    pub fn depths(&self) -> Vec<i64> {
        match self.source {
            Some(source) => check::tree_depths(&self.parents(), source),
            None => Vec::new(),
        }
    }

    /// Validates the last tree against an independent serial BFS.
    pub fn check(&self, source: usize) -> bool {
        if source >= self.graph.num_vertices() {
            return false;
        }
        check::check_parents(self.graph, source, &self.parents())
    }

    fn count_visited(&self) -> usize {
        self.parent
            .par_shards()
            .map(|(_, cells)| cells.iter().filter(|c| c.read() >= 0).count())
            .sum()
    }

    /// Sum of the degrees of visited vertices, halved for the undirected
    /// double count.
    pub fn count_num_traversed_edges(&self) -> u64 {
        let graph = self.graph;
        let total: u64 = self
            .parent
            .par_shards()
            .map(|(shard, cells)| {
                cells
                    .iter()
                    .zip(graph.shard_degrees(shard))
                    .filter(|(c, _)| c.read() >= 0)
                    .map(|(_, &d)| d as u64)
                    .sum::<u64>()
            })
            .sum();
        total / 2
    }

    /// Writes one `vertex parent` line per visited vertex, in vertex order.
    pub fn print_tree(&self, out: &mut impl Write) -> std::io::Result<()> {
        for (v, p) in self.parents().into_iter().enumerate() {
            if p >= 0 {
                writeln!(out, "{v} {p}")?;
            }
        }
        Ok(())
    }
}
