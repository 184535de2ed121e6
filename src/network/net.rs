//! Networks as node sets with arcs

use super::{Arc, Edge, NodeId};
use crate::{GeonetError, Result};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A network over node identifiers of type `N`
///
/// - Arcs keep the orientation they were given with, for flow computations
/// - Topology queries (degree, neighbors, equality) treat arcs as unordered edges
/// - Algorithms on trees assume the arcs form a connected acyclic graph;
///   this is not enforced, use [`Net::is_tree`] to check
#[derive(Clone)]
pub struct Net<N: NodeId> {
    nodes: BTreeSet<N>,
    arcs: Vec<Arc<N>>,
    adjacency: BTreeMap<N, BTreeSet<N>>,
}

impl<N: NodeId> Net<N> {
    /// Create a network from nodes and arcs
    ///
    /// Fails if an arc names a node outside `nodes`, is a self-loop, or
    /// repeats an edge already present in either orientation.
    pub fn new<A>(nodes: impl IntoIterator<Item = N>, arcs: impl IntoIterator<Item = A>) -> Result<Self>
    where
        A: Into<Arc<N>>,
    {
        let nodes: BTreeSet<N> = nodes.into_iter().collect();
        let mut adjacency: BTreeMap<N, BTreeSet<N>> =
            nodes.iter().map(|n| (n.clone(), BTreeSet::new())).collect();
        let mut stored = Vec::new();

        for arc in arcs {
            let arc = arc.into();
            for end in [&arc.tail, &arc.head] {
                if !nodes.contains(end) {
                    return Err(GeonetError::UnknownNode(format!("{:?}", end)));
                }
            }
            if arc.tail == arc.head {
                return Err(GeonetError::InvalidTree(format!(
                    "Self-loop at {:?}",
                    arc.tail
                )));
            }
            if !adjacency
                .get_mut(&arc.tail)
                .map_or(false, |adj| adj.insert(arc.head.clone()))
            {
                return Err(GeonetError::InvalidTree(format!(
                    "Duplicate edge {:?}",
                    arc.edge()
                )));
            }
            if let Some(adj) = adjacency.get_mut(&arc.head) {
                adj.insert(arc.tail.clone());
            }
            stored.push(arc);
        }

        Ok(Net {
            nodes,
            arcs: stored,
            adjacency,
        })
    }

    /// Create a network without nodes
    pub fn empty() -> Self {
        Net {
            nodes: BTreeSet::new(),
            arcs: Vec::new(),
            adjacency: BTreeMap::new(),
        }
    }

    /// Iterate over nodes in increasing order
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.iter()
    }

    /// Arcs with their original orientation
    pub fn arcs(&self) -> &[Arc<N>] {
        &self.arcs
    }

    /// The unordered edge set
    pub fn edges(&self) -> BTreeSet<Edge<N>> {
        self.arcs.iter().map(Arc::edge).collect()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.arcs.len()
    }

    /// Check if a node belongs to the network
    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    /// Number of incident edges (0 for unknown nodes)
    pub fn degree(&self, node: &N) -> usize {
        self.adjacency.get(node).map_or(0, BTreeSet::len)
    }

    /// Adjacent nodes regardless of arc orientation, in increasing order
    pub fn neighbors<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + 'a {
        self.adjacency.get(node).into_iter().flatten()
    }

    /// Nodes of degree 1
    pub fn leaves(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.iter().filter(move |n| self.degree(n) == 1)
    }

    /// Copy of this network with one new node joined to `parent`
    pub fn graft_leaf(&self, parent: &N, leaf: N) -> Result<Self> {
        if !self.contains(parent) {
            return Err(GeonetError::UnknownNode(format!("{:?}", parent)));
        }
        if self.contains(&leaf) {
            return Err(GeonetError::DuplicateNode(format!("{:?}", leaf)));
        }

        let mut grown = self.clone();
        grown.nodes.insert(leaf.clone());
        grown
            .adjacency
            .insert(leaf.clone(), BTreeSet::from([parent.clone()]));
        if let Some(adj) = grown.adjacency.get_mut(parent) {
            adj.insert(leaf.clone());
        }
        grown.arcs.push(Arc::new(parent.clone(), leaf));
        Ok(grown)
    }

    /// Rename every node through an injective mapping
    pub fn relabel<M: NodeId>(&self, rename: impl Fn(&N) -> M) -> Result<Net<M>> {
        let nodes: Vec<M> = self.nodes.iter().map(&rename).collect();
        let distinct: BTreeSet<&M> = nodes.iter().collect();
        if distinct.len() != nodes.len() {
            return Err(GeonetError::DuplicateNode(
                "Renaming is not injective".to_string(),
            ));
        }
        let arcs: Vec<Arc<M>> = self
            .arcs
            .iter()
            .map(|a| Arc::new(rename(&a.tail), rename(&a.head)))
            .collect();
        Net::new(nodes, arcs)
    }

    /// Export as an undirected `petgraph` graph
    pub fn to_petgraph(&self) -> UnGraph<N, ()> {
        let mut graph = UnGraph::with_capacity(self.node_count(), self.edge_count());
        let index: BTreeMap<&N, NodeIndex> = self
            .nodes
            .iter()
            .map(|n| (n, graph.add_node(n.clone())))
            .collect();
        for arc in &self.arcs {
            graph.add_edge(index[&arc.tail], index[&arc.head], ());
        }
        graph
    }

    /// Check that the edges form a connected acyclic graph
    ///
    /// The network without nodes counts as a tree.
    pub fn is_tree(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        self.edge_count() + 1 == self.node_count()
            && connected_components(&self.to_petgraph()) == 1
    }
}

impl<N: NodeId> PartialEq for Net<N> {
    fn eq(&self, other: &Self) -> bool {
        // adjacency determines the unordered edge set
        self.nodes == other.nodes && self.adjacency == other.adjacency
    }
}

impl<N: NodeId> Eq for Net<N> {}

impl<N: NodeId> Default for Net<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<N: NodeId> fmt::Debug for Net<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("nodes", &self.nodes)
            .field("edges", &self.edges())
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct RawNet<N> {
    nodes: Vec<N>,
    arcs: Vec<Arc<N>>,
}

impl<N: NodeId + Serialize> Serialize for Net<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RawNet {
            nodes: self.nodes.iter().cloned().collect(),
            arcs: self.arcs.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de, N: NodeId + Deserialize<'de>> Deserialize<'de> for Net<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawNet::<N>::deserialize(deserializer)?;
        Net::new(raw.nodes, raw.arcs).map_err(serde::de::Error::custom)
    }
}
