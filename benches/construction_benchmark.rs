use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shardgraph::{Graph, Partitioning, SlidingQueue, StripedBitmap};

mod common;

fn bench_construction(c: &mut Criterion) {
    let edges = common::kronecker(15, 16, 11);

    let mut group = c.benchmark_group("construction");
    group.sample_size(10);
    group.throughput(Throughput::Elements(edges.num_edges() as u64));
    for shards in [1, 2, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::new("from_edge_list", shards), &shards, |b, &s| {
            b.iter(|| black_box(Graph::from_edge_list_with(&edges, Partitioning::new(s)).unwrap()));
        });
    }
    group.bench_function("sort_edge_lists", |b| {
        b.iter_batched(
            || Graph::from_edge_list_with(&edges, Partitioning::per_core()).unwrap(),
            |mut g| {
                g.sort_edge_lists();
                g
            },
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_frontier_conversion(c: &mut Criterion) {
    let n = 1 << 20;
    let p = Partitioning::per_core();
    let mut queue = SlidingQueue::new(n, p).unwrap();
    for v in (0..n).step_by(3) {
        queue.push_back(v);
    }
    queue.slide_window();
    let bitmap = StripedBitmap::new(n, p).unwrap();
    shardgraph::queue_to_bitmap(&queue, &bitmap);

    let mut group = c.benchmark_group("frontier");
    group.throughput(Throughput::Elements(queue.combined_size() as u64));
    group.bench_function("queue_to_bitmap", |b| {
        b.iter(|| {
            bitmap.clear();
            shardgraph::queue_to_bitmap(&queue, &bitmap);
        });
    });
    group.bench_function("bitmap_to_queue", |b| {
        let mut target = SlidingQueue::new(n, p).unwrap();
        b.iter(|| {
            target.reset();
            shardgraph::bitmap_to_queue(&bitmap, &target);
            target.slide_window();
            black_box(target.combined_size())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_construction, bench_frontier_conversion);
criterion_main!(benches);
