//! Serial reference traversal and parent-tree validation.

use std::collections::VecDeque;

use tracing::warn;

use crate::graph::Graph;

/// Depth of every vertex from `source` by a plain FIFO traversal; `-1` marks
/// vertices that cannot be reached.
///
/// # Panics
/// If `source` is not a vertex of `graph`.
pub fn serial_depths(graph: &Graph, source: usize) -> Vec<i64> {
    let mut depth = vec![-1i64; graph.num_vertices()];
    let mut queue = VecDeque::new();
    depth[source] = 0;
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        for &v in graph.out_neighbors(u) {
            if depth[v] < 0 {
                depth[v] = depth[u] + 1;
                queue.push_back(v);
            }
        }
    }
    depth
}

/// Depth of every vertex in the tree described by `parents`, or `-1` where
/// the parent chain does not reach `source`.
///
/// Chains are walked once and memoized, so the cost is linear in the number
/// of vertices. A cycle among the parent links yields `-1` for every vertex
/// on it.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn tree_depths(parents: &[i64], source: usize) -> Vec<i64> {
    const PENDING: i64 = -2;
    let n = parents.len();
    let mut depth = vec![i64::MIN; n];
    if source < n {
        depth[source] = 0;
    }
    let mut chain = Vec::new();
    for start in 0..n {
        let mut v = start;
        // Walk up until a vertex with a known answer, a root, or a loop.
        let resolved = loop {
            if depth[v] != i64::MIN {
                break if depth[v] == PENDING { -1 } else { depth[v] };
            }
            let p = parents[v];
            if p < 0 || p as usize >= n || p as usize == v {
                depth[v] = -1;
                break -1;
            }
            depth[v] = PENDING;
            chain.push(v);
            v = p as usize;
        };
        let mut d = resolved;
        while let Some(u) = chain.pop() {
            d = if d < 0 { -1 } else { d + 1 };
            depth[u] = d;
        }
    }
    depth
}

/// Checks a parent array produced by a traversal from `source`.
///
/// The tree is accepted when every vertex is reached exactly when the serial
/// traversal reaches it, the source is its own parent, and every other
/// reached vertex hangs off a real edge whose parent sits one level higher.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn check_parents(graph: &Graph, source: usize, parents: &[i64]) -> bool {
    let n = graph.num_vertices();
    if parents.len() != n || source >= n {
        warn!(len = parents.len(), n, source, "parent array does not match graph");
        return false;
    }
    if parents[source] != source as i64 {
        warn!(source, parent = parents[source], "source is not its own parent");
        return false;
    }
    let expected = serial_depths(graph, source);
    let actual = tree_depths(parents, source);
    let mut ok = true;
    for v in 0..n {
        if (expected[v] >= 0) != (parents[v] >= 0) {
            warn!(v, expected = expected[v], parent = parents[v], "reachability mismatch");
            ok = false;
            continue;
        }
        if v == source || parents[v] < 0 {
            continue;
        }
        let u = parents[v] as usize;
        if u >= n || !graph.out_neighbors(u).contains(&v) {
            warn!(v, parent = parents[v], "parent is not a neighbor");
            ok = false;
        } else if actual[v] != expected[v] {
            warn!(v, expected = expected[v], actual = actual[v], "vertex at wrong depth");
            ok = false;
        }
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeList;
    use crate::memory::Partitioning;

    fn path(n: usize) -> Graph {
        let el = EdgeList::from_pairs(n, (1..n).map(|v| (v - 1, v)));
        Graph::from_edge_list_with(&el, Partitioning::new(2)).unwrap()
    }

    #[test]
    fn serial_depths_on_path_with_isolated_tail() {
        let el = EdgeList::from_pairs(5, [(0, 1), (1, 2), (2, 3)]);
        let g = Graph::from_edge_list_with(&el, Partitioning::new(3)).unwrap();
        assert_eq!(serial_depths(&g, 1), vec![1, 0, 1, 2, -1]);
    }

    #[test]
    fn tree_depths_follow_parent_chains() {
        assert_eq!(tree_depths(&[0, 0, 1, 2, -3], 0), vec![0, 1, 2, 3, -1]);
        // Out-of-order chain.
        assert_eq!(tree_depths(&[1, 3, 1, 3], 3), vec![2, 1, 2, 0]);
    }

    #[test]
    fn tree_depths_break_cycles() {
        assert_eq!(tree_depths(&[0, 2, 1, 1], 0), vec![0, -1, -1, -1]);
    }

    #[test]
    fn accepts_a_valid_tree() {
        let g = path(4);
        assert!(check_parents(&g, 0, &[0, 0, 1, 2]));
        assert!(check_parents(&g, 2, &[1, 2, 2, 2]));
    }

    #[test]
    fn rejects_bad_trees() {
        let g = path(4);
        // Non-edge parent.
        assert!(!check_parents(&g, 0, &[0, 0, 0, 2]));
        // Unreached vertex.
        assert!(!check_parents(&g, 0, &[0, 0, 1, -1]));
        // Source not its own parent.
        assert!(!check_parents(&g, 0, &[1, 0, 1, 2]));
        // Wrong length.
        assert!(!check_parents(&g, 0, &[0, 0]));
    }
}
