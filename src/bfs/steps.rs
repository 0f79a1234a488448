//! The three step kinds: top-down by remote writes, top-down by claims, and
//! bottom-up.

use rayon::prelude::*;

use super::engine::unvisited;
use super::HybridBfs;
use crate::flow::FlowControl;
use crate::memory::RemoteAtomic;

impl HybridBfs<'_> {
    /// Top-down step with deferred remote writes.
    ///
    /// Fan-out: with acknowledgements disabled, every frontier vertex `src`
    /// sends `new_parent[dst] = src` to each neighbor's home shard. The writes
    /// have no dependencies on each other, so none is confirmed individually;
    /// closing the region drains them all behind one barrier.
    ///
    /// Scan: every shard claims its own vertices with `parent < 0` and
    /// `new_parent >= 0`. The scout contribution is read from the old parent
    /// value, which encodes the degree.
    #[allow(clippy::cast_possible_wrap)]
    pub(super) fn top_down_remote_writes(&self, flow: &mut FlowControl) -> i64 {
        let graph = self.graph;
        let queue = &self.queue;
        let new_parent = &self.new_parent;

        flow.unacknowledged(|batch| {
            queue.par_items().for_each_init(
                || batch.outbox(),
                |out, src| {
                    for &dst in graph.out_neighbors(src) {
                        out.write(new_parent, dst, src as i64);
                    }
                },
            );
        });

        let partitioning = graph.partitioning();
        self.scout_count.fill(0);
        self.parent.par_shards().for_each(|(shard, cells)| {
            let proposals = new_parent.shard(shard);
            let degrees = graph.shard_degrees(shard);
            let scout: i64 = cells
                .par_iter()
                .zip(proposals.par_iter())
                .enumerate()
                .map(|(offset, (cell, proposal))| {
                    let old = cell.read();
                    let proposed = proposal.read();
                    if old >= 0 || proposed < 0 {
                        return 0;
                    }
                    debug_assert_eq!(old, unvisited(degrees[offset]));
                    cell.remote_write(proposed);
                    queue.push_back(partitioning.global(shard, offset));
                    -old
                })
                .sum();
            self.scout_count.local(shard).remote_add(scout);
        });
        self.scout_count.sum()
    }

    /// Top-down step where each edge claims its target with a CAS.
    ///
    /// A vertex can only move from a negative parent to a non-negative one, so
    /// a failed CAS means another frontier vertex won; exactly one winner pushes
    /// the vertex and credits its degree to the vertex's home shard.
    #[allow(clippy::cast_possible_wrap)]
    pub(super) fn top_down_claim(&self) -> i64 {
        let graph = self.graph;
        let partitioning = graph.partitioning();
        let parent = &self.parent;
        let queue = &self.queue;
        let scout_count = &self.scout_count;

        scout_count.fill(0);
        queue.forall_items(|src| {
            for &dst in graph.out_neighbors(src) {
                let cell = parent.get(dst);
                let mut current = cell.read();
                while current < 0 {
                    match cell.atomic_cas(current, src as i64) {
                        Ok(previous) => {
                            queue.push_back(dst);
                            scout_count.local(partitioning.owner(dst)).remote_add(-previous);
                            break;
                        }
                        Err(observed) => current = observed,
                    }
                }
            }
        });
        scout_count.sum()
    }

    /// Bottom-up step; returns the number of vertices it visited.
    ///
    /// Every unvisited vertex searches its neighbors for a member of the
    /// current frontier. Neighbor lists longer than `grain` are split into
    /// parallel sub-ranges; the search yields at most one parent, so each
    /// vertex is claimed and counted once no matter how many sub-ranges match.
    /// The frontier bitmaps are swapped at the end.
    #[allow(clippy::cast_possible_wrap)]
    pub(super) fn bottom_up_step(&mut self, grain: usize) -> usize {
        self.next_frontier.clear();
        let graph = self.graph;
        let partitioning = graph.partitioning();
        let frontier = &self.frontier;
        let next = &self.next_frontier;

        let awake: usize = self
            .parent
            .par_shards()
            .map(|(shard, cells)| {
                cells
                    .par_iter()
                    .enumerate()
                    .filter(|(offset, cell)| {
                        if cell.read() >= 0 {
                            return false;
                        }
                        let v = partitioning.global(shard, *offset);
                        let nbrs = graph.out_neighbors(v);
                        let found = if nbrs.len() > grain {
                            nbrs.par_chunks(grain).find_map_any(|chunk| {
                                chunk.iter().copied().find(|&u| frontier.get_bit(u))
                            })
                        } else {
                            nbrs.iter().copied().find(|&u| frontier.get_bit(u))
                        };
                        match found {
                            Some(u) => {
                                cell.remote_write(u as i64);
                                next.set_bit(v);
                                true
                            }
                            None => false,
                        }
                    })
                    .count()
            })
            .sum();

        self.frontier.swap(&mut self.next_frontier);
        awake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfs::{Algorithm, BfsParams};
    use crate::frontier::queue_to_bitmap;
    use crate::graph::{EdgeList, Graph};
    use crate::memory::Partitioning;

    #[test]
    fn bottom_up_finds_next_level_once() {
        // Hub 0 joined to 1..=4; 5 hangs off both 1 and 2.
        let el = EdgeList::from_pairs(6, [(0, 1), (0, 2), (0, 3), (0, 4), (1, 5), (2, 5)]);
        let p = Partitioning::new(2);
        let g = Graph::from_edge_list_with(&el, p).unwrap();
        let mut bfs = HybridBfs::new(&g).unwrap();
        bfs.parent.get(0).remote_write(0);
        bfs.queue.push_back(0);
        bfs.queue.slide_window();
        queue_to_bitmap(&bfs.queue, &bfs.frontier);

        assert_eq!(bfs.bottom_up_step(1024), 4);
        for v in 1..=4 {
            assert_eq!(bfs.parent(v), 0);
            assert!(bfs.frontier.get_bit(v));
        }
        assert!(!bfs.frontier.get_bit(0));

        // 5 sees two frontier neighbors but is counted once.
        assert_eq!(bfs.bottom_up_step(1024), 1);
        assert!(bfs.parent(5) == 1 || bfs.parent(5) == 2);
        assert_eq!(bfs.bottom_up_step(1024), 0);
    }

    #[test]
    fn bottom_up_splits_long_neighbor_lists() {
        // Vertex 0 has 300 neighbors; only 299 is in the frontier.
        let el = EdgeList::from_pairs(301, (1..=300).map(|v| (0, v)));
        let p = Partitioning::new(3);
        let g = Graph::from_edge_list_with(&el, p).unwrap();
        let mut bfs = HybridBfs::new(&g).unwrap();
        bfs.parent.get(299).remote_write(299);
        bfs.frontier.set_bit(299);
        assert_eq!(bfs.bottom_up_step(8), 1);
        assert_eq!(bfs.parent(0), 299);
    }

    #[test]
    fn remote_write_step_uses_flow_control_once() {
        let el = EdgeList::from_pairs(4, [(0, 1), (0, 2), (0, 3)]);
        let p = Partitioning::new(2);
        let g = Graph::from_edge_list_with(&el, p).unwrap();
        let mut bfs = HybridBfs::new(&g).unwrap();
        let mut flow = FlowControl::new(p);
        bfs.run(&mut flow, Algorithm::RemoteWrites, 0, &BfsParams::default())
            .unwrap();
        let stats = flow.stats();
        // Level 0 expands the hub, level 1 expands the leaves.
        assert_eq!(stats.regions, 2);
        assert_eq!(stats.deferred_writes, 3 + 3);
        assert_eq!(flow.ack_epoch(0), 2);
        assert_eq!(flow.ack_epoch(1), 2);
    }
}
