//! Direction-optimizing breadth-first search over a sharded graph.
//!
//! The engine ([`HybridBfs`]) alternates between two traversal directions:
//! - **top-down** (push): expand the queue window, either by deferred remote
//!   writes drained once per step, or by claiming each neighbor with a CAS;
//! - **bottom-up** (pull): every unvisited vertex looks for a parent in the
//!   frontier bitmap.
//!
//! The hybrid variants switch direction from live statistics: the scout count
//! (edges about to be explored) against the edges left unchecked, and the
//! awake count (vertices found by the last bottom-up step) against `V / beta`.

mod algorithm;
pub mod check;
mod engine;
mod stats;
mod steps;

pub use algorithm::Algorithm;
pub use engine::HybridBfs;
pub use stats::BfsStats;

use serde::{Deserialize, Serialize};

/// Tuning knobs of the direction switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfsParams {
    /// Switch to bottom-up once `scout_count > edges_to_check / alpha`.
    pub alpha: i64,
    /// Stay bottom-up while the awake count exceeds `num_vertices / beta`.
    pub beta: i64,
    /// Neighbor lists longer than this are searched in parallel sub-ranges
    /// during bottom-up steps.
    pub grain: usize,
}

impl Default for BfsParams {
    fn default() -> Self {
        Self {
            alpha: 15,
            beta: 18,
            grain: 1024,
        }
    }
}

impl BfsParams {
    /// Creates parameters with the given `alpha` and `beta`.
    pub fn new(alpha: i64, beta: i64) -> Self {
        Self {
            alpha,
            beta,
            ..Self::default()
        }
    }
}
