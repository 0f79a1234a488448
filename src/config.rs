//! Engine configuration loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid configuration:
//!
//! ```json
//! { "partitions": 8, "algorithm": "remote_writes_hybrid", "alpha": 14 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bfs::{Algorithm, BfsParams, BfsStats, HybridBfs};
use crate::error::{Error, Result};
use crate::flow::FlowControl;
use crate::graph::{EdgeList, Graph};
use crate::memory::Partitioning;

/// Knobs for graph construction and traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of shards; defaults to the available hardware parallelism.
    pub partitions: usize,
    /// Top-down to bottom-up switch divisor.
    pub alpha: i64,
    /// Bottom-up to top-down switch divisor.
    pub beta: i64,
    /// Traversal variant.
    pub algorithm: Algorithm,
    /// Sort each neighbor list after construction.
    pub sort_edge_lists: bool,
    /// Parallel search threshold for long neighbor lists.
    pub grain: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let params = BfsParams::default();
        Self {
            partitions: Partitioning::per_core().shards(),
            alpha: params.alpha,
            beta: params.beta,
            algorithm: Algorithm::default(),
            sort_edge_lists: false,
            grain: params.grain,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// [`Error::Config`] for malformed JSON or unknown fields,
    /// [`Error::InvalidConfig`] if [`validate`](Self::validate) rejects it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    /// [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that every knob is in range.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(Error::InvalidConfig("partitions must be >= 1".into()));
        }
        if self.alpha < 1 {
            return Err(Error::InvalidConfig(format!("alpha must be >= 1, got {}", self.alpha)));
        }
        if self.beta < 1 {
            return Err(Error::InvalidConfig(format!("beta must be >= 1, got {}", self.beta)));
        }
        if self.grain == 0 {
            return Err(Error::InvalidConfig("grain must be >= 1".into()));
        }
        Ok(())
    }

    /// The shard layout this configuration asks for.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] if `partitions` is zero.
    pub fn partitioning(&self) -> Result<Partitioning> {
        Partitioning::try_new(self.partitions)
    }

    /// The direction-switch parameters.
    pub fn params(&self) -> BfsParams {
        BfsParams {
            alpha: self.alpha,
            beta: self.beta,
            grain: self.grain,
        }
    }

    /// Builds a graph over the configured shards, sorting neighbor lists when
    /// `sort_edge_lists` is set.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] for zero partitions, otherwise as
    /// [`Graph::from_edge_list_with`].
    pub fn build_graph(&self, edges: &EdgeList) -> Result<Graph> {
        let mut graph = Graph::from_edge_list_with(edges, self.partitioning()?)?;
        if self.sort_edge_lists {
            graph.sort_edge_lists();
            debug!("sorted edge lists");
        }
        Ok(graph)
    }

    /// Runs the configured algorithm with the configured switch parameters.
    ///
    /// # Errors
    /// As [`HybridBfs::run`].
    pub fn traverse(
        &self,
        bfs: &mut HybridBfs<'_>,
        flow: &mut FlowControl,
        source: usize,
    ) -> Result<BfsStats> {
        bfs.run(flow, self.algorithm, source, &self.params())
    }
}
