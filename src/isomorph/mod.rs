//! Isomorphism testing for unrooted trees
//!
//! Both trees are labeled from the leaves inward, one layer of peripheral
//! nodes per round, in the manner of Fampa et al., "A specialized
//! branch-and-bound algorithm for the Euclidean Steiner tree problem in
//! n-space". A round compares the multisets of neighbor labels found in each
//! tree and stops at the first difference. Only the nodes carrying the
//! smallest tentative label are committed per round, so the labels of both
//! trees stay in lockstep. The number of rounds is bounded by the tree depth.
//!
//! The test is exact for trees only. General graphs are rejected by cheap
//! size checks in the cases that matter here, but no claim is made beyond
//! trees.

use crate::network::{Net, NodeId, SteinerTree};
use std::collections::HashMap;

/// Trait for comparing tree shapes up to renaming of nodes
pub trait TreeIsomorphism {
    /// Check if both trees have the same shape
    fn is_isomorphic(&self, other: &Self) -> bool;
}

impl<N: NodeId> TreeIsomorphism for Net<N> {
    fn is_isomorphic(&self, other: &Self) -> bool {
        are_isomorphic(self, other)
    }
}

impl<N: NodeId> TreeIsomorphism for SteinerTree<N> {
    /// Compares topology only; terminal roles and positions are ignored
    fn is_isomorphic(&self, other: &Self) -> bool {
        are_isomorphic(self.net(), other.net())
    }
}

/// Check isomorphism of two (undirected) trees
///
/// The trees may use different identifier types, which makes it possible to
/// compare a tree against a renamed copy of itself.
pub fn are_isomorphic<N: NodeId, M: NodeId>(first: &Net<N>, second: &Net<M>) -> bool {
    if first.node_count() != second.node_count() || first.edge_count() != second.edge_count() {
        return false;
    }
    if first.edge_count() == 0 {
        return true;
    }

    let mut left = Peeling::new(first);
    let mut right = Peeling::new(second);

    // begin by labeling all leaves the same
    let mut label = 1;
    if left.label_leaves(label) != right.label_leaves(label) {
        return false;
    }
    label += 1;

    loop {
        let next_left = left.frontier();
        let next_right = right.frontier();
        if next_left.len() != next_right.len() {
            return false;
        }
        if next_left.is_empty() {
            return true;
        }

        let tent_left = left.tentative(next_left);
        let tent_right = right.tentative(next_right);
        if tent_left
            .iter()
            .zip(&tent_right)
            .any(|((l, _), (r, _))| l != r)
        {
            return false;
        }

        let smallest = &tent_left[0].0;
        left.commit(&tent_left, smallest, label);
        right.commit(&tent_right, smallest, label);
        label += 1;
    }
}

/// Labeling progress on one tree
struct Peeling<'a, N: NodeId> {
    net: &'a Net<N>,
    labels: HashMap<&'a N, u32>,
}

impl<'a, N: NodeId> Peeling<'a, N> {
    fn new(net: &'a Net<N>) -> Self {
        Peeling {
            net,
            labels: HashMap::with_capacity(net.node_count()),
        }
    }

    /// Label every leaf, returning the number of leaves
    fn label_leaves(&mut self, label: u32) -> usize {
        let leaves: Vec<&'a N> = self.net.leaves().collect();
        for &leaf in &leaves {
            self.labels.insert(leaf, label);
        }
        leaves.len()
    }

    /// Unlabeled nodes with at most one unlabeled neighbor
    fn frontier(&self) -> Vec<&'a N> {
        self.net
            .nodes()
            .filter(|n| !self.labels.contains_key(n))
            .filter(|n| {
                self.net
                    .neighbors(n)
                    .filter(|m| !self.labels.contains_key(m))
                    .count()
                    <= 1
            })
            .collect()
    }

    /// Sorted multisets of labeled-neighbor labels, sorted across the frontier
    fn tentative(&self, frontier: Vec<&'a N>) -> Vec<(Vec<u32>, &'a N)> {
        let mut tentative: Vec<(Vec<u32>, &'a N)> = frontier
            .into_iter()
            .map(|n| {
                let mut around: Vec<u32> = self
                    .net
                    .neighbors(n)
                    .filter_map(|m| self.labels.get(m).copied())
                    .collect();
                around.sort_unstable();
                (around, n)
            })
            .collect();
        tentative.sort_by(|(a, _), (b, _)| a.cmp(b));
        tentative
    }

    /// Label the leading run of nodes whose tentative label is `smallest`
    fn commit(&mut self, tentative: &[(Vec<u32>, &'a N)], smallest: &[u32], label: u32) {
        for &(_, n) in tentative.iter().take_while(|(t, _)| t.as_slice() == smallest) {
            self.labels.insert(n, label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn net(nodes: &str, arcs: &[(char, char)]) -> Net<char> {
        Net::new(nodes.chars(), arcs.iter().copied()).unwrap()
    }

    fn graphs() -> Vec<Net<char>> {
        vec![
            net("", &[]),
            net("a", &[]),
            net("ab", &[]),
            net("ab", &[('a', 'b')]),
            net("abc", &[('a', 'b')]),
            net("abc", &[('a', 'b'), ('a', 'c')]),
            net("abcd", &[('a', 'b'), ('c', 'd')]),
            net("abcd", &[('a', 'b'), ('b', 'c'), ('c', 'd')]),
            net("abcd", &[('a', 'b'), ('a', 'c'), ('a', 'd')]),
            net("abcde", &[('a', 'b'), ('b', 'c'), ('c', 'd'), ('d', 'e')]),
            net("abcde", &[('a', 'b'), ('a', 'c'), ('a', 'd'), ('a', 'e')]),
            net("abcde", &[('a', 'b'), ('a', 'c'), ('a', 'e'), ('d', 'e')]),
        ]
    }

    #[test]
    fn test_non_isomorphic_cases() {
        let graphs = graphs();
        for (i, g1) in graphs.iter().enumerate() {
            for g2 in &graphs[i + 1..] {
                assert!(!g1.is_isomorphic(g2), "{:?} vs {:?}", g1, g2);
            }
        }
    }

    #[test]
    fn test_rename_is_isomorphic() {
        for g in graphs() {
            let upper = g.relabel(|n| n.to_ascii_uppercase()).unwrap();
            assert!(are_isomorphic(&g, &upper));
            assert!(g.is_isomorphic(&g));
        }
    }

    #[test]
    fn test_same_degree_sequence_different_shape() {
        // same degree sequence, branching at different depths
        let near = net(
            "abcdefg",
            &[('a', 'b'), ('a', 'c'), ('a', 'd'), ('d', 'e'), ('e', 'f'), ('f', 'g')],
        );
        let far = net(
            "abcdefg",
            &[('a', 'b'), ('b', 'c'), ('c', 'd'), ('c', 'e'), ('e', 'f'), ('f', 'g')],
        );
        assert!(!near.is_isomorphic(&far));
    }

    #[test]
    fn test_steiner_trees_compare_topology() {
        use std::collections::BTreeMap;

        let positions = BTreeMap::from([('a', (0.0, 0.0)), ('b', (1.0, 0.0)), ('c', (0.0, 1.0))]);
        let star = SteinerTree::new("abcs".chars(), [('a', 's'), ('b', 's'), ('c', 's')], positions).unwrap();
        let other = SteinerTree::new(
            "xyzw".chars(),
            [('w', 'x'), ('w', 'y'), ('w', 'z')],
            BTreeMap::from([('x', (5.0, 5.0))]),
        )
        .unwrap();
        assert!(star.is_isomorphic(&other));
    }

    proptest! {
        #[test]
        fn renaming_preserves_isomorphism(size in 1usize..14, seed in any::<u64>(), shift in 1usize..1000) {
            let tree = crate::utils::random_skeleton_seeded(size, seed).unwrap();
            let renamed = tree.relabel(|n| format!("n{}", n * shift + 7)).unwrap();
            prop_assert!(are_isomorphic(&tree, &renamed));
            prop_assert!(are_isomorphic(&renamed, &tree));
        }

        #[test]
        fn isomorphism_is_symmetric(size in 1usize..10, a in any::<u64>(), b in any::<u64>()) {
            let first = crate::utils::random_skeleton_seeded(size, a).unwrap();
            let second = crate::utils::random_skeleton_seeded(size, b).unwrap();
            prop_assert_eq!(first.is_isomorphic(&second), second.is_isomorphic(&first));
        }
    }
}
