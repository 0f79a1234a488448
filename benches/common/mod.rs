use shardgraph::EdgeList;

/// Kronecker-style generator: each edge picks one quadrant per bit level
/// with probabilities (0.57, 0.19, 0.19, 0.05), as in the Graph500 inputs.
pub fn kronecker(scale: u32, edge_factor: usize, seed: u64) -> EdgeList {
    let n = 1usize << scale;
    let mut state = seed | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state % 100
    };
    let mut el = EdgeList::new(n);
    for _ in 0..n * edge_factor {
        let (mut u, mut v) = (0usize, 0usize);
        for _ in 0..scale {
            let r = next();
            let (bu, bv) = match r {
                0..=56 => (0, 0),
                57..=75 => (0, 1),
                76..=94 => (1, 0),
                _ => (1, 1),
            };
            u = (u << 1) | bu;
            v = (v << 1) | bv;
        }
        el.push(u, v);
    }
    el
}
