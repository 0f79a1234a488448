//! Edge-list input for graph construction.

use crate::error::{Error, Result};

/// An undirected edge list: edge `i` connects `src[i]` and `dst[i]`.
///
/// Each undirected edge appears once; construction stores both directions.
/// Duplicate removal is the producer's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    /// Number of vertices; ids are `0..num_vertices`.
    pub num_vertices: usize,
    /// Source endpoint of each edge.
    pub src: Vec<usize>,
    /// Destination endpoint of each edge.
    pub dst: Vec<usize>,
}

impl EdgeList {
    /// Creates an empty edge list over `num_vertices` vertices.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            src: Vec::new(),
            dst: Vec::new(),
        }
    }

    /// Builds an edge list from `(src, dst)` pairs.
    pub fn from_pairs(num_vertices: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let (src, dst) = pairs.into_iter().unzip();
        Self {
            num_vertices,
            src,
            dst,
        }
    }

    /// Appends one edge.
    pub fn push(&mut self, src: usize, dst: usize) {
        self.src.push(src);
        self.dst.push(dst);
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// Iterates `(src, dst)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, usize)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    /// Checks the structural contract: equal-length endpoint arrays, ids in range,
    /// and vertex ids representable in a parent array.
    pub fn validate(&self) -> Result<()> {
        if self.src.len() != self.dst.len() {
            return Err(Error::MalformedEdgeList(format!(
                "src has {} entries but dst has {}",
                self.src.len(),
                self.dst.len()
            )));
        }
        if i64::try_from(self.num_vertices).is_err() {
            return Err(Error::MalformedEdgeList(format!(
                "{} vertices do not fit a signed parent encoding",
                self.num_vertices
            )));
        }
        let n = self.num_vertices;
        if let Some(&vertex) = self.src.iter().chain(&self.dst).find(|&&v| v >= n) {
            return Err(Error::VertexOutOfRange {
                vertex,
                num_vertices: n,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_splits_endpoints() {
        let el = EdgeList::from_pairs(3, [(0, 1), (1, 2)]);
        assert_eq!(el.src, vec![0, 1]);
        assert_eq!(el.dst, vec![1, 2]);
        assert_eq!(el.num_edges(), 2);
        assert!(el.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_endpoint() {
        let el = EdgeList::from_pairs(2, [(0, 2)]);
        assert!(matches!(
            el.validate(),
            Err(Error::VertexOutOfRange { vertex: 2, num_vertices: 2 })
        ));
    }

    #[test]
    fn validate_rejects_length_mismatch() {
        let mut el = EdgeList::new(3);
        el.push(0, 1);
        el.dst.pop();
        assert!(matches!(el.validate(), Err(Error::MalformedEdgeList(_))));
    }
}
