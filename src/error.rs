//! Error types shared by graph construction, traversal state and configuration.

/// Errors returned by `shardgraph`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A fallible reservation failed while allocating graph or traversal storage.
    #[error("out of memory allocating {bytes} bytes for {site}")]
    OutOfMemory {
        /// Which structure was being allocated.
        site: &'static str,
        /// Requested size in bytes.
        bytes: usize,
    },

    /// A vertex id was outside `[0, num_vertices)`.
    #[error("vertex {vertex} out of range for {num_vertices} vertices")]
    VertexOutOfRange {
        /// Offending vertex id.
        vertex: usize,
        /// Number of vertices in the graph.
        num_vertices: usize,
    },

    /// The edge list violates its contract.
    #[error("malformed edge list: {0}")]
    MalformedEdgeList(String),

    /// Configuration values were rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for `shardgraph` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Allocates a boxed slice of `len` elements produced by `f`, reporting failure
/// as [`Error::OutOfMemory`] instead of aborting.
pub(crate) fn try_boxed_slice<T>(
    site: &'static str,
    len: usize,
    mut f: impl FnMut(usize) -> T,
) -> Result<Box<[T]>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Error::OutOfMemory {
        site,
        bytes: len.saturating_mul(core::mem::size_of::<T>()),
    })?;
    v.extend((0..len).map(&mut f));
    Ok(v.into_boxed_slice())
}
