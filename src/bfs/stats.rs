use serde::Serialize;

use super::Algorithm;

/// Summary of one completed traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BfsStats {
    /// Variant that ran.
    pub algorithm: Algorithm,
    /// Root of the tree.
    pub source: usize,
    /// Top-down steps executed.
    pub top_down_steps: usize,
    /// Bottom-up steps executed.
    pub bottom_up_steps: usize,
    /// Vertices with a parent after the traversal, the source included.
    pub vertices_visited: usize,
    /// Undirected edges incident to visited vertices.
    pub traversed_edges: u64,
    /// Wall-clock time of the traversal.
    pub elapsed_secs: f64,
}

impl BfsStats {
    /// Levels processed, in either direction.
    pub fn steps(&self) -> usize {
        self.top_down_steps + self.bottom_up_steps
    }

    /// Traversed edges per second.
    #[allow(clippy::cast_precision_loss)]
    pub fn teps(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.traversed_edges as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}
