//! Canonical labels of rooted full Steiner trees

use crate::network::{NodeId, SteinerTree};
use crate::{GeonetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Structural fingerprint of a full Steiner tree rooted at its smallest terminal
///
/// Leaves carry terminal identifiers and every Steiner node becomes a pair of
/// its two children. The derived order puts every leaf before every pair,
/// compares leaves by identifier and pairs lexicographically; [`Label::pair`]
/// stores the smaller child first, so swapping two subtrees never changes
/// the label.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label<N> {
    /// A terminal
    Leaf(N),
    /// A Steiner node with its two subtrees, smaller one first
    Pair(Box<Label<N>>, Box<Label<N>>),
}

impl<N: Ord> Label<N> {
    /// Create a leaf label
    pub fn leaf(node: N) -> Self {
        Label::Leaf(node)
    }

    /// Create a pair label with children in canonical order
    pub fn pair(a: Label<N>, b: Label<N>) -> Self {
        if a <= b {
            Label::Pair(Box::new(a), Box::new(b))
        } else {
            Label::Pair(Box::new(b), Box::new(a))
        }
    }

    /// Check if the label is a single terminal
    pub fn is_leaf(&self) -> bool {
        matches!(self, Label::Leaf(_))
    }

    /// Terminal identifiers from left to right
    pub fn leaves(&self) -> Vec<&N> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(label) = stack.pop() {
            match label {
                Label::Leaf(n) => out.push(n),
                Label::Pair(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
            }
        }
        out
    }

    /// Number of pairs, i.e. Steiner nodes below the root terminal
    pub fn pair_count(&self) -> usize {
        match self {
            Label::Leaf(_) => 0,
            Label::Pair(a, b) => 1 + a.pair_count() + b.pair_count(),
        }
    }

    /// Rename the terminals, restoring canonical child order
    pub fn map<M: Ord>(&self, rename: &impl Fn(&N) -> M) -> Label<M> {
        match self {
            Label::Leaf(n) => Label::Leaf(rename(n)),
            Label::Pair(a, b) => Label::pair(a.map(rename), b.map(rename)),
        }
    }
}

impl<N: fmt::Display> fmt::Display for Label<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Leaf(n) => write!(f, "{}", n),
            Label::Pair(a, b) => write!(f, "({}, {})", a, b),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Label<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Leaf(n) => write!(f, "{:?}", n),
            Label::Pair(a, b) => write!(f, "({:?}, {:?})", a, b),
        }
    }
}

/// Compute the canonical label of a full Steiner tree
///
/// The tree is rooted at its smallest terminal and labeled bottom-up in
/// reverse breadth-first order: terminals label themselves, a Steiner node
/// pairs the labels of its two children. The result is the label of the
/// root's neighbor. Two full Steiner trees over the same terminals get equal
/// labels exactly when they are isomorphic as terminal-labeled trees.
///
/// A tree with a single terminal and nothing else is labeled by that
/// terminal. Trees where a Steiner node does not have exactly two children,
/// or a terminal is not a leaf, are rejected.
pub fn label_fst<N: NodeId>(tree: &SteinerTree<N>) -> Result<Label<N>> {
    let root = tree
        .terminal_nodes()
        .next()
        .ok_or_else(|| GeonetError::InvalidTree("Tree has no terminal".to_string()))?;

    let mut around_root = tree.neighbors(root);
    let top = match (around_root.next(), around_root.next()) {
        (None, _) if tree.net().node_count() == 1 => return Ok(Label::Leaf(root.clone())),
        (Some(top), None) => top,
        _ => {
            return Err(GeonetError::InvalidTree(format!(
                "Root terminal {:?} must have exactly one neighbor",
                root
            )))
        }
    };

    // breadth-first order below the root, with parents
    let mut order: Vec<(&N, &N)> = Vec::with_capacity(tree.net().node_count());
    let mut queue = VecDeque::from([(top, root)]);
    while let Some((node, parent)) = queue.pop_front() {
        order.push((node, parent));
        if order.len() > tree.net().node_count() {
            return Err(GeonetError::InvalidTree("Tree contains a cycle".to_string()));
        }
        for child in tree.neighbors(node).filter(|&c| c != parent) {
            queue.push_back((child, node));
        }
    }

    let mut labels: HashMap<&N, Label<N>> = HashMap::with_capacity(order.len());
    for &(node, parent) in order.iter().rev() {
        let mut children = tree.neighbors(node).filter(|&c| c != parent);
        let label = match (children.next(), children.next(), children.next()) {
            (None, _, _) if tree.is_terminal(node) => Label::Leaf(node.clone()),
            (Some(a), Some(b), None) if tree.is_steiner(node) => {
                match (labels.remove(a), labels.remove(b)) {
                    (Some(la), Some(lb)) => Label::pair(la, lb),
                    _ => {
                        return Err(GeonetError::InvalidTree(format!(
                            "Cycle through {:?}",
                            node
                        )))
                    }
                }
            }
            _ => {
                return Err(GeonetError::InvalidTree(format!(
                    "Node {:?} is neither a terminal leaf nor a binary Steiner node",
                    node
                )))
            }
        };
        labels.insert(node, label);
    }

    labels
        .remove(top)
        .ok_or_else(|| GeonetError::InvalidTree("Unlabeled root neighbor".to_string()))
}
