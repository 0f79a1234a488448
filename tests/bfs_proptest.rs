use proptest::prelude::*;
use rayon::prelude::*;
use shardgraph::bfs::check::serial_depths;
use shardgraph::{
    bitmap_to_queue, queue_to_bitmap, Algorithm, BfsParams, EdgeList, FlowControl, Graph, HybridBfs,
    Partitioning, SlidingQueue, StripedBitmap,
};
use std::collections::BTreeSet;

fn edge_list() -> impl Strategy<Value = EdgeList> {
    (1usize..64).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..160)
            .prop_map(move |pairs| EdgeList::from_pairs(n, pairs))
    })
}

fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop_oneof![
        Just(Algorithm::RemoteWrites),
        Just(Algorithm::MigratingThreads),
        Just(Algorithm::RemoteWritesHybrid),
        Just(Algorithm::BeamerHybrid),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn construction_stores_every_endpoint(el in edge_list(), shards in 1usize..6) {
        let g = Graph::from_edge_list_with(&el, Partitioning::new(shards)).unwrap();
        let mut expected = vec![Vec::new(); el.num_vertices];
        for (u, v) in el.iter() {
            expected[u].push(v);
            expected[v].push(u);
        }
        for (v, mut want) in expected.into_iter().enumerate() {
            want.sort_unstable();
            let mut got = g.out_neighbors(v).to_vec();
            got.sort_unstable();
            prop_assert_eq!(g.out_degree(v), want.len());
            prop_assert_eq!(got, want, "vertex {}", v);
        }
        let stats = g.stats();
        prop_assert_eq!(stats.used_per_shard.iter().sum::<usize>(), 2 * el.num_edges());
        prop_assert_eq!(stats.block_len, stats.used_per_shard.iter().copied().max().unwrap_or(0));
    }

    #[test]
    fn traversal_matches_serial_reachability(
        el in edge_list(),
        shards in 1usize..6,
        algorithm in algorithm(),
        pick in any::<prop::sample::Index>(),
    ) {
        let p = Partitioning::new(shards);
        let g = Graph::from_edge_list_with(&el, p).unwrap();
        let source = pick.index(el.num_vertices);
        let mut flow = FlowControl::new(p);
        let mut bfs = HybridBfs::new(&g).unwrap();
        let stats = bfs.run(&mut flow, algorithm, source, &BfsParams::default()).unwrap();

        let expected = serial_depths(&g, source);
        prop_assert!(bfs.check(source));
        prop_assert_eq!(bfs.depths(), expected.clone());
        prop_assert_eq!(stats.vertices_visited, expected.iter().filter(|&&d| d >= 0).count());
        for v in 0..el.num_vertices {
            if expected[v] < 0 {
                let d = g.out_degree(v).max(1) as i64;
                prop_assert_eq!(bfs.parent(v), -d);
            }
        }
        prop_assert!(flow.acks_enabled());
    }

    #[test]
    fn variants_agree_on_depths(
        el in edge_list(),
        shards in 1usize..5,
        alpha in 1i64..20,
        beta in 1i64..24,
        pick in any::<prop::sample::Index>(),
    ) {
        let p = Partitioning::new(shards);
        let g = Graph::from_edge_list_with(&el, p).unwrap();
        let source = pick.index(el.num_vertices);
        let params = BfsParams::new(alpha, beta);
        let mut flow = FlowControl::new(p);
        let mut bfs = HybridBfs::new(&g).unwrap();

        bfs.run(&mut flow, Algorithm::RemoteWrites, source, &params).unwrap();
        let reference = bfs.depths();
        for algorithm in [Algorithm::MigratingThreads, Algorithm::RemoteWritesHybrid, Algorithm::BeamerHybrid] {
            bfs.run(&mut flow, algorithm, source, &params).unwrap();
            prop_assert_eq!(bfs.depths(), reference.clone(), "{}", algorithm);
        }
    }

    #[test]
    fn queue_and_bitmap_conversions_preserve_the_set(
        n in 1usize..300,
        shards in 1usize..6,
        raw in proptest::collection::btree_set(0usize..300, 0..120),
    ) {
        let p = Partitioning::new(shards);
        let set: BTreeSet<usize> = raw.into_iter().filter(|&v| v < n).collect();

        let mut queue = SlidingQueue::new(n, p).unwrap();
        for &v in &set {
            queue.push_back(v);
        }
        queue.slide_window();
        prop_assert_eq!(queue.combined_size(), set.len());

        let bitmap = StripedBitmap::new(n, p).unwrap();
        queue_to_bitmap(&queue, &bitmap);
        prop_assert_eq!(bitmap.count_ones(), set.len());
        let ones: BTreeSet<usize> = (0..n).filter(|&v| bitmap.get_bit(v)).collect();
        prop_assert_eq!(&ones, &set);

        let mut back = SlidingQueue::new(n, p).unwrap();
        bitmap_to_queue(&bitmap, &back);
        back.slide_window();
        let items: BTreeSet<usize> = back.par_items().collect::<Vec<_>>().into_iter().collect();
        prop_assert_eq!(&items, &set);
        prop_assert_eq!(back.combined_size(), set.len());
    }
}
