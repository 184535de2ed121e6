//! Unordered edges and oriented arcs

use super::NodeId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An unordered pair of nodes
///
/// The endpoints are stored sorted, so `Edge::new(a, b) == Edge::new(b, a)`.
/// All topology comparisons go through this type.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge<N> {
    lo: N,
    hi: N,
}

impl<N: NodeId> Edge<N> {
    /// Create an edge between two nodes
    pub fn new(a: N, b: N) -> Self {
        if a <= b {
            Edge { lo: a, hi: b }
        } else {
            Edge { lo: b, hi: a }
        }
    }

    /// Both endpoints, smaller one first
    pub fn endpoints(&self) -> (&N, &N) {
        (&self.lo, &self.hi)
    }

    /// Check whether the edge touches a node
    pub fn contains(&self, node: &N) -> bool {
        &self.lo == node || &self.hi == node
    }

    /// The endpoint opposite to `node`
    pub fn other(&self, node: &N) -> Option<&N> {
        if &self.lo == node {
            Some(&self.hi)
        } else if &self.hi == node {
            Some(&self.lo)
        } else {
            None
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Edge<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.lo, self.hi)
    }
}

/// An oriented arc `(tail, head)`
///
/// Orientation only matters to flow computations. Isomorphism and
/// enumeration never look at it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Arc<N> {
    /// Start of the arc
    pub tail: N,
    /// End of the arc
    pub head: N,
}

impl<N: NodeId> Arc<N> {
    /// Create an arc from `tail` to `head`
    pub fn new(tail: N, head: N) -> Self {
        Arc { tail, head }
    }

    /// The same arc with opposite orientation
    pub fn reversed(&self) -> Self {
        Arc {
            tail: self.head.clone(),
            head: self.tail.clone(),
        }
    }

    /// Forget the orientation
    pub fn edge(&self) -> Edge<N> {
        Edge::new(self.tail.clone(), self.head.clone())
    }
}

impl<N: NodeId> From<(N, N)> for Arc<N> {
    fn from((tail, head): (N, N)) -> Self {
        Arc { tail, head }
    }
}

impl<N: fmt::Debug> fmt::Debug for Arc<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}->{:?}", self.tail, self.head)
    }
}

#[derive(Deserialize)]
struct RawEdge<N> {
    lo: N,
    hi: N,
}

impl<'de, N: NodeId + Deserialize<'de>> Deserialize<'de> for Edge<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawEdge::<N>::deserialize(deserializer)?;
        Ok(Edge::new(raw.lo, raw.hi))
    }
}
