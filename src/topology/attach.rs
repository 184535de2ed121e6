//! Attaching terminals to skeleton trees

use crate::network::{Arc, Net, NodeId, Position, SteinerTree};
use crate::skeleton::MAX_DEGREE;
use crate::{GeonetError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Precomputed slots of one skeleton, ready to receive terminal orders
///
/// Every skeleton node needs `3 - degree` terminals to become a full Steiner
/// node. Slots are filled from the front of a terminal order, nodes with the
/// fewest skeleton neighbors first: degree-1 nodes take two terminals each,
/// then degree-2 nodes one each. (The single-node skeleton of three terminals
/// takes all three.)
#[derive(Clone, Debug)]
pub struct AttachmentPlan<'a, N: NodeId> {
    skeleton_arcs: Vec<Arc<N>>,
    slots: Vec<(N, usize)>,
    steiner_ids: &'a [N],
    positions: &'a BTreeMap<N, Position>,
}

impl<'a, N: NodeId> AttachmentPlan<'a, N> {
    /// Prepare a skeleton for attachment
    ///
    /// `steiner_ids[i]` names skeleton node `i`. The identifiers must be
    /// distinct and disjoint from the terminals in `positions`.
    pub fn new(
        skeleton: &Net<usize>,
        steiner_ids: &'a [N],
        positions: &'a BTreeMap<N, Position>,
    ) -> Result<Self> {
        if steiner_ids.len() != skeleton.node_count() {
            return Err(GeonetError::SteinerIdCount {
                terminals: positions.len(),
                expected: skeleton.node_count(),
                actual: steiner_ids.len(),
            });
        }
        check_disjoint(steiner_ids, positions)?;

        let name = |i: &usize| -> Result<N> {
            steiner_ids
                .get(*i)
                .cloned()
                .ok_or_else(|| GeonetError::UnknownNode(format!("skeleton node {}", i)))
        };

        let skeleton_arcs = skeleton
            .arcs()
            .iter()
            .map(|a| -> Result<Arc<N>> { Ok(Arc::new(name(&a.tail)?, name(&a.head)?)) })
            .collect::<Result<Vec<_>>>()?;

        let mut slots = Vec::with_capacity(skeleton.node_count());
        for degree in 0..MAX_DEGREE {
            for node in skeleton.nodes().filter(|n| skeleton.degree(n) == degree) {
                slots.push((name(node)?, MAX_DEGREE - degree));
            }
        }

        let open: usize = slots.iter().map(|(_, free)| free).sum();
        if open != positions.len() {
            return Err(GeonetError::InvalidTree(format!(
                "Skeleton has {} open slots for {} terminals",
                open,
                positions.len()
            )));
        }

        Ok(AttachmentPlan {
            skeleton_arcs,
            slots,
            steiner_ids,
            positions,
        })
    }

    /// Number of terminals an order must contain
    pub fn terminal_count(&self) -> usize {
        self.positions.len()
    }

    /// Build the full tree for one terminal order
    pub fn attach(&self, order: &[N]) -> Result<SteinerTree<N>> {
        if order.len() != self.terminal_count() {
            return Err(GeonetError::InvalidTree(format!(
                "Terminal order has {} entries, expected {}",
                order.len(),
                self.terminal_count()
            )));
        }

        let mut arcs = self.skeleton_arcs.clone();
        let mut remaining = order.iter();
        for (steiner, free) in &self.slots {
            for terminal in remaining.by_ref().take(*free) {
                arcs.push(Arc::new(terminal.clone(), steiner.clone()));
            }
        }

        let nodes = order.iter().chain(self.steiner_ids).cloned();
        let net = Net::new(nodes, arcs)?;
        SteinerTree::from_net(net, self.positions.clone())
    }
}

/// Attach terminals in the given order to a skeleton
pub fn attach_terminals<N: NodeId>(
    skeleton: &Net<usize>,
    order: &[N],
    steiner_ids: &[N],
    positions: &BTreeMap<N, Position>,
) -> Result<SteinerTree<N>> {
    AttachmentPlan::new(skeleton, steiner_ids, positions)?.attach(order)
}

/// Check that Steiner identifiers are distinct and not used by terminals
pub(crate) fn check_disjoint<N: NodeId>(steiner_ids: &[N], positions: &BTreeMap<N, Position>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in steiner_ids {
        if positions.contains_key(id) || !seen.insert(id) {
            return Err(GeonetError::DuplicateNode(format!("{:?}", id)));
        }
    }
    Ok(())
}

/// n! for small n
pub(crate) fn factorial(n: usize) -> u64 {
    (1..=n as u64).product()
}

/// The `index`-th permutation of `items` in lexicographic order of positions
///
/// Decodes `index` in the factorial number system, so that any slice of the
/// permutation space can be generated independently of the rest.
pub(crate) fn nth_permutation<T: Clone>(items: &[T], mut index: u64) -> Vec<T> {
    debug_assert!(index < factorial(items.len()), "permutation index {} out of range", index);
    let mut pool: Vec<&T> = items.iter().collect();
    let mut out = Vec::with_capacity(items.len());
    for remaining in (1..=items.len()).rev() {
        let block = factorial(remaining - 1);
        let pick = (index / block) as usize;
        index %= block;
        out.push(pool.remove(pick).clone());
    }
    out
}
