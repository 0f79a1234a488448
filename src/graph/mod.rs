//! Sharded CSR graph.
//!
//! - `edge_list`: the construction input (parallel `src`/`dst` arrays)
//! - `build`: the multi-pass atomic construction protocol
//! - `csr`: the immutable [`Graph`] and its queries

mod build;
pub mod csr;
pub mod edge_list;

pub use csr::{Graph, GraphStats};
pub use edge_list::EdgeList;
