use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shardgraph::{Algorithm, BfsParams, FlowControl, Graph, HybridBfs, Partitioning};

mod common;

fn bench_bfs_variants(c: &mut Criterion) {
    let edges = common::kronecker(14, 16, 0x5eed);
    let params = BfsParams::default();

    let mut group = c.benchmark_group("bfs");
    group.sample_size(20);
    group.throughput(Throughput::Elements(edges.num_edges() as u64));

    for shards in [1, 2, 4, 8] {
        let p = Partitioning::new(shards);
        let graph = Graph::from_edge_list_with(&edges, p).unwrap();
        let mut bfs = HybridBfs::new(&graph).unwrap();
        let mut flow = FlowControl::new(p);
        // Start from the highest-degree vertex so the traversal covers the
        // giant component.
        let source = (0..graph.num_vertices())
            .max_by_key(|&v| graph.out_degree(v))
            .unwrap_or(0);

        for algorithm in Algorithm::ALL {
            group.bench_with_input(BenchmarkId::new(algorithm.name(), shards), &source, |b, &s| {
                b.iter(|| black_box(bfs.run(&mut flow, algorithm, s, &params).unwrap()));
            });
        }
    }
    group.finish();
}

fn bench_switch_parameters(c: &mut Criterion) {
    let edges = common::kronecker(13, 16, 7);
    let p = Partitioning::per_core();
    let graph = Graph::from_edge_list_with(&edges, p).unwrap();
    let mut bfs = HybridBfs::new(&graph).unwrap();
    let mut flow = FlowControl::new(p);

    let mut group = c.benchmark_group("bfs_alpha");
    group.sample_size(20);
    for alpha in [2, 8, 15, 32, 128] {
        let params = BfsParams::new(alpha, 18);
        group.bench_with_input(BenchmarkId::from_parameter(alpha), &params, |b, params| {
            b.iter(|| black_box(bfs.run(&mut flow, Algorithm::BeamerHybrid, 0, params).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bfs_variants, bench_switch_parameters);
criterion_main!(benches);
