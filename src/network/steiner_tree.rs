//! Steiner trees: networks with fixed terminal positions

use super::{Arc, Net, NodeId};
use crate::{GeonetError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// A point in the plane
pub type Position = (f64, f64);

/// A tree whose terminals carry fixed positions
///
/// A node is a terminal exactly when it has a position; every other node is
/// a Steiner node. Equality compares the node set, the unordered edge set and
/// the terminal positions.
#[derive(Clone, Debug, PartialEq)]
pub struct SteinerTree<N: NodeId> {
    net: Net<N>,
    positions: BTreeMap<N, Position>,
}

impl<N: NodeId> SteinerTree<N> {
    /// Create a Steiner tree from nodes, arcs and terminal positions
    pub fn new<A>(
        nodes: impl IntoIterator<Item = N>,
        arcs: impl IntoIterator<Item = A>,
        positions: BTreeMap<N, Position>,
    ) -> Result<Self>
    where
        A: Into<Arc<N>>,
    {
        Self::from_net(Net::new(nodes, arcs)?, positions)
    }

    /// Attach terminal positions to an existing network
    pub fn from_net(net: Net<N>, positions: BTreeMap<N, Position>) -> Result<Self> {
        if let Some(stray) = positions.keys().find(|n| !net.contains(n)) {
            return Err(GeonetError::UnknownNode(format!("{:?}", stray)));
        }
        Ok(SteinerTree { net, positions })
    }

    /// The underlying network
    pub fn net(&self) -> &Net<N> {
        &self.net
    }

    /// Iterate over all nodes in increasing order
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.net.nodes()
    }

    /// Arcs with their original orientation
    pub fn arcs(&self) -> &[Arc<N>] {
        self.net.arcs()
    }

    /// Number of incident edges
    pub fn degree(&self, node: &N) -> usize {
        self.net.degree(node)
    }

    /// Adjacent nodes in increasing order
    pub fn neighbors<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + 'a {
        self.net.neighbors(node)
    }

    /// Check if a node has a fixed position
    pub fn is_terminal(&self, node: &N) -> bool {
        self.positions.contains_key(node)
    }

    /// Check if a node is a free junction
    pub fn is_steiner(&self, node: &N) -> bool {
        self.net.contains(node) && !self.is_terminal(node)
    }

    /// Terminals in increasing order
    pub fn terminal_nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.positions.keys()
    }

    /// Steiner nodes in increasing order
    pub fn steiner_nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.net.nodes().filter(move |n| !self.is_terminal(n))
    }

    /// Number of terminals
    pub fn terminal_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of Steiner nodes
    pub fn steiner_count(&self) -> usize {
        self.net.node_count() - self.positions.len()
    }

    /// Position of a terminal
    pub fn position(&self, node: &N) -> Result<Position> {
        match self.positions.get(node) {
            Some(&pos) => Ok(pos),
            None if self.net.contains(node) => {
                Err(GeonetError::NotATerminal(format!("{:?}", node)))
            }
            None => Err(GeonetError::UnknownNode(format!("{:?}", node))),
        }
    }

    /// All terminal positions
    pub fn terminal_positions(&self) -> &BTreeMap<N, Position> {
        &self.positions
    }

    /// Terminal positions completed with the given Steiner positions
    pub fn merge_positions(&self, steiner_positions: &BTreeMap<N, Position>) -> BTreeMap<N, Position> {
        let mut all = steiner_positions.clone();
        all.extend(self.positions.iter().map(|(n, p)| (n.clone(), *p)));
        all
    }

    /// Check whether the tree is a full Steiner topology
    ///
    /// Three criteria are applied:
    /// 1. the number of Steiner nodes equals the number of terminals - 2
    /// 2. Steiner nodes have degree 3
    /// 3. terminals have degree 1 and are joined to a Steiner node
    ///
    /// With fewer than three terminals and no Steiner nodes the tree is full.
    pub fn is_full_steiner_topology(&self) -> bool {
        let terminals = self.terminal_count();
        let steiners = self.steiner_count();

        if terminals < 3 && steiners == 0 {
            return true;
        }
        if steiners + 2 != terminals {
            return false;
        }
        if self.steiner_nodes().any(|s| self.degree(s) != 3) {
            return false;
        }
        self.terminal_nodes().all(|t| {
            let mut around = self.neighbors(t);
            match (around.next(), around.next()) {
                (Some(n), None) => self.is_steiner(n),
                _ => false,
            }
        })
    }

    /// Rename every node through an injective mapping, keeping positions
    pub fn relabel<M: NodeId>(&self, rename: impl Fn(&N) -> M) -> Result<SteinerTree<M>> {
        let net = self.net.relabel(&rename)?;
        let positions = self
            .positions
            .iter()
            .map(|(n, p)| (rename(n), *p))
            .collect();
        SteinerTree::from_net(net, positions)
    }
}

#[derive(Serialize, Deserialize)]
struct RawSteinerTree<N: NodeId> {
    net: Net<N>,
    positions: BTreeMap<N, Position>,
}

impl<N: NodeId + Serialize> Serialize for SteinerTree<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RawSteinerTree {
            net: self.net.clone(),
            positions: self.positions.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de, N: NodeId + Deserialize<'de>> Deserialize<'de> for SteinerTree<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawSteinerTree::<N>::deserialize(deserializer)?;
        SteinerTree::from_net(raw.net, raw.positions).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star() -> SteinerTree<char> {
        let positions = BTreeMap::from([('a', (0.0, 0.0)), ('b', (1.0, 0.0)), ('c', (0.0, 1.0))]);
        SteinerTree::new("abcs".chars(), [('a', 's'), ('b', 's'), ('c', 's')], positions).unwrap()
    }

    #[test]
    fn test_roles() {
        let tree = star();
        assert!(tree.is_terminal(&'a'));
        assert!(tree.is_steiner(&'s'));
        assert!(!tree.is_steiner(&'x'));
        assert_eq!(tree.steiner_nodes().copied().collect::<Vec<_>>(), vec!['s']);
        assert_eq!(tree.terminal_nodes().count(), 3);
    }

    #[test]
    fn test_position_lookup() {
        let tree = star();
        assert_eq!(tree.position(&'b').unwrap(), (1.0, 0.0));
        assert!(matches!(tree.position(&'s'), Err(GeonetError::NotATerminal(_))));
        assert!(matches!(tree.position(&'q'), Err(GeonetError::UnknownNode(_))));
    }

    #[test]
    fn test_positions_must_name_nodes() {
        let positions = BTreeMap::from([('z', (0.0, 0.0))]);
        let result = SteinerTree::new("ab".chars(), [('a', 'b')], positions);
        assert!(matches!(result, Err(GeonetError::UnknownNode(_))));
    }

    #[test]
    fn test_full_topology() {
        assert!(star().is_full_steiner_topology());

        let path = SteinerTree::new(
            "abc".chars(),
            [('a', 'b'), ('b', 'c')],
            BTreeMap::from([('a', (0.0, 0.0)), ('b', (1.0, 0.0)), ('c', (2.0, 0.0))]),
        )
        .unwrap();
        assert!(!path.is_full_steiner_topology());

        let pair = SteinerTree::new(
            "ab".chars(),
            [('a', 'b')],
            BTreeMap::from([('a', (0.0, 0.0)), ('b', (1.0, 0.0))]),
        )
        .unwrap();
        assert!(pair.is_full_steiner_topology());
    }

    #[test]
    fn test_terminal_next_to_terminal_is_not_full() {
        // terminal b sits between a and s
        let positions = BTreeMap::from([
            ('a', (0.0, 0.0)),
            ('b', (1.0, 0.0)),
            ('c', (2.0, 0.0)),
            ('d', (3.0, 0.0)),
        ]);
        let tree = SteinerTree::new(
            "abcdst".chars(),
            [('a', 'b'), ('b', 's'), ('c', 's'), ('s', 't'), ('d', 't')],
            positions,
        )
        .unwrap();
        assert!(!tree.is_full_steiner_topology());
    }

    #[test]
    fn test_equality_and_merge() {
        let tree = star();
        let flipped = SteinerTree::new(
            "abcs".chars(),
            [('s', 'a'), ('s', 'b'), ('s', 'c')],
            tree.terminal_positions().clone(),
        )
        .unwrap();
        assert_eq!(tree, flipped);

        let merged = tree.merge_positions(&BTreeMap::from([('s', (0.2, 0.2))]));
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[&'s'], (0.2, 0.2));

        let moved = tree.relabel(|n| n.to_ascii_uppercase()).unwrap();
        assert_ne!(moved.position(&'A').unwrap(), (1.0, 0.0));
        assert_eq!(moved.position(&'B').unwrap(), (1.0, 0.0));
    }
}
