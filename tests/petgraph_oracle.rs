use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use shardgraph::{Algorithm, BfsParams, EdgeList, FlowControl, Graph, HybridBfs, Partitioning};

/// Unit-weight shortest paths from petgraph, `-1` for unreachable vertices.
fn oracle_depths(el: &EdgeList, source: usize) -> Vec<i64> {
    let mut g = UnGraph::<(), ()>::new_undirected();
    let nodes: Vec<NodeIndex> = (0..el.num_vertices).map(|_| g.add_node(())).collect();
    for (u, v) in el.iter() {
        g.add_edge(nodes[u], nodes[v], ());
    }
    let dist = dijkstra(&g, nodes[source], None, |_| 1i64);
    nodes.iter().map(|n| dist.get(n).copied().unwrap_or(-1)).collect()
}

/// Deterministic pseudo-random graph with a handful of components.
fn scrambled(n: usize, m: usize, seed: u64) -> EdgeList {
    let mut state = seed;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut el = EdgeList::new(n);
    for _ in 0..m {
        let u = (next() % n as u64) as usize;
        let v = (next() % n as u64) as usize;
        el.push(u, v);
    }
    el
}

#[test]
fn depths_match_petgraph_on_scrambled_graphs() {
    for (n, m, seed) in [(50, 40, 1), (200, 400, 7), (500, 3000, 42), (1000, 900, 99)] {
        let el = scrambled(n, m, seed);
        for shards in [1, 3, 8] {
            let p = Partitioning::new(shards);
            let g = Graph::from_edge_list_with(&el, p).unwrap();
            let mut flow = FlowControl::new(p);
            let mut bfs = HybridBfs::new(&g).unwrap();
            for source in [0, n / 2, n - 1] {
                let expected = oracle_depths(&el, source);
                for algorithm in Algorithm::ALL {
                    bfs.run(&mut flow, algorithm, source, &BfsParams::default())
                        .unwrap();
                    assert_eq!(
                        bfs.depths(),
                        expected,
                        "n={n} m={m} P={shards} source={source} {algorithm}"
                    );
                }
            }
        }
    }
}

#[test]
fn sorted_graph_traverses_identically() {
    let el = scrambled(300, 1200, 5);
    let p = Partitioning::new(4);
    let mut g = Graph::from_edge_list_with(&el, p).unwrap();
    g.sort_edge_lists();
    let mut flow = FlowControl::new(p);
    let mut bfs = HybridBfs::new(&g).unwrap();
    bfs.run(&mut flow, Algorithm::BeamerHybrid, 17, &BfsParams::default())
        .unwrap();
    assert_eq!(bfs.depths(), oracle_depths(&el, 17));
    assert!(bfs.check(17));
}
