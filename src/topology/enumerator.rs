//! Enumeration of all full Steiner topologies for a terminal set

use super::attach::{check_disjoint, factorial, nth_permutation, AttachmentPlan};
use super::label::{label_fst, Label};
use crate::config::EnumerationConfig;
use crate::network::{Arc, NodeId, Position, SteinerTree};
use crate::skeleton::SkeletonTable;
use crate::{GeonetError, Result};
use rayon::prelude::*;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct full Steiner topologies keyed by canonical label
pub type TopologySet<N> = BTreeMap<Label<N>, SteinerTree<N>>;

/// Best candidate per label so far, with its candidate index
type Seen<N> = BTreeMap<Label<N>, (u64, SteinerTree<N>)>;

/// Identifier types that can name Steiner nodes on their own
pub trait FreshIds: NodeId {
    /// `count` identifiers not contained in `taken`
    fn fresh_ids(taken: &BTreeSet<Self>, count: usize) -> Vec<Self>;
}

impl FreshIds for String {
    /// `_0`, `_1`, ... skipping names already in use
    fn fresh_ids(taken: &BTreeSet<Self>, count: usize) -> Vec<Self> {
        (0u64..)
            .map(|i| format!("_{}", i))
            .filter(|id| !taken.contains(id))
            .take(count)
            .collect()
    }
}

macro_rules! fresh_int_ids {
    ($($t:ty),*) => {
        $(
            impl FreshIds for $t {
                /// Consecutive values above the largest identifier in use
                fn fresh_ids(taken: &BTreeSet<Self>, count: usize) -> Vec<Self> {
                    let start = taken
                        .iter()
                        .next_back()
                        .and_then(|m| m.checked_add(1))
                        .unwrap_or(0);
                    (start..=<$t>::MAX)
                        .chain(<$t>::MIN..start)
                        .filter(|id| !taken.contains(id))
                        .take(count)
                        .collect()
                }
            }
        )*
    };
}

fresh_int_ids!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl FreshIds for char {
    /// Code points above the largest character in use
    fn fresh_ids(taken: &BTreeSet<Self>, count: usize) -> Vec<Self> {
        let start = taken.iter().next_back().map_or(0, |&m| m as u32 + 1);
        (start..=char::MAX as u32)
            .chain(0..start)
            .filter_map(char::from_u32)
            .filter(|id| !taken.contains(id))
            .take(count)
            .collect()
    }
}

/// Number of (skeleton, permutation) candidates, if it fits the index type
fn candidate_count(terminals: usize, classes: usize) -> Result<u64> {
    (classes as u64)
        .checked_mul(factorial(terminals))
        .ok_or(GeonetError::TooManyTerminals {
            terminals,
            limit: terminals - 1,
        })
}

/// Enumerates full Steiner topologies, caching skeletons between calls
///
/// Candidates are all pairs of a skeleton representative with `n - 2` nodes
/// and a permutation of the `n` terminals. Every candidate is built and
/// labeled; no symmetric slot assignment is skipped upfront, so the work is
/// `classes * n!` regardless of how many candidates collapse onto one label.
/// When several candidates share a label, the one with the smallest
/// candidate index (skeleton first, then permutation in lexicographic order)
/// is kept, in parallel runs as well as sequential ones.
#[derive(Clone, Debug)]
pub struct TopologyEnumerator {
    config: EnumerationConfig,
    skeletons: SkeletonTable,
}

impl TopologyEnumerator {
    /// Create an enumerator with validated settings
    pub fn new(config: EnumerationConfig) -> Result<Self> {
        config.validate().map_err(GeonetError::InvalidConfig)?;
        Ok(TopologyEnumerator {
            config,
            skeletons: SkeletonTable::new(),
        })
    }

    /// Settings in use
    pub fn config(&self) -> &EnumerationConfig {
        &self.config
    }

    /// Skeleton table covering at least `size` nodes
    pub fn skeletons(&mut self, size: usize) -> Result<&SkeletonTable> {
        self.skeletons.extend_to(size, &self.config)?;
        Ok(&self.skeletons)
    }

    /// Enumerate topologies, naming Steiner nodes automatically
    pub fn enumerate<N: FreshIds>(&mut self, positions: &BTreeMap<N, Position>) -> Result<TopologySet<N>> {
        let taken: BTreeSet<N> = positions.keys().cloned().collect();
        let ids = N::fresh_ids(&taken, positions.len().saturating_sub(2));
        self.enumerate_with_ids(positions, &ids)
    }

    /// Enumerate topologies with the given Steiner node names
    ///
    /// Exactly `terminals - 2` identifiers are required (none for fewer than
    /// three terminals), all distinct and different from every terminal.
    pub fn enumerate_with_ids<N: NodeId>(
        &mut self,
        positions: &BTreeMap<N, Position>,
        steiner_ids: &[N],
    ) -> Result<TopologySet<N>> {
        let terminals = positions.len();
        if terminals > self.config.max_terminals {
            return Err(GeonetError::TooManyTerminals {
                terminals,
                limit: self.config.max_terminals,
            });
        }
        let expected = terminals.saturating_sub(2);
        if steiner_ids.len() != expected {
            return Err(GeonetError::SteinerIdCount {
                terminals,
                expected,
                actual: steiner_ids.len(),
            });
        }
        check_disjoint(steiner_ids, positions)?;

        if terminals < 3 {
            return degenerate_topologies(positions);
        }

        let size = terminals - 2;
        self.skeletons.extend_to(size, &self.config)?;
        let plans = self
            .skeletons
            .representatives(size)
            .iter()
            .map(|skeleton| AttachmentPlan::new(skeleton, steiner_ids, positions))
            .collect::<Result<Vec<_>>>()?;

        let order: Vec<N> = positions.keys().cloned().collect();
        let per_plan = factorial(terminals);
        let total = candidate_count(terminals, plans.len())?;

        let candidate = |index: u64| -> Result<(Label<N>, SteinerTree<N>)> {
            let plan = &plans[(index / per_plan) as usize];
            let tree = plan.attach(&nth_permutation(&order, index % per_plan))?;
            Ok((label_fst(&tree)?, tree))
        };

        let seen: Seen<N> = if self.config.use_parallel(total as usize) {
            (0..total)
                .into_par_iter()
                .map(|index| candidate(index).map(|(label, tree)| (index, label, tree)))
                .try_fold(Seen::new, |mut seen, item| {
                    let (index, label, tree) = item?;
                    keep_first(&mut seen, label, index, tree);
                    Ok::<_, GeonetError>(seen)
                })
                .try_reduce(Seen::new, |mut merged, part| {
                    for (label, (index, tree)) in part {
                        keep_first(&mut merged, label, index, tree);
                    }
                    Ok(merged)
                })?
        } else {
            let mut seen = Seen::new();
            for index in 0..total {
                let (label, tree) = candidate(index)?;
                keep_first(&mut seen, label, index, tree);
            }
            seen
        };

        tracing::info!(
            terminals,
            skeletons = plans.len(),
            candidates = total,
            topologies = seen.len(),
            "enumerated full Steiner topologies"
        );
        Ok(seen.into_iter().map(|(label, (_, tree))| (label, tree)).collect())
    }
}

impl Default for TopologyEnumerator {
    fn default() -> Self {
        TopologyEnumerator {
            config: EnumerationConfig::default(),
            skeletons: SkeletonTable::new(),
        }
    }
}

/// Record a candidate unless an earlier one already holds its label
fn keep_first<N: NodeId>(seen: &mut Seen<N>, label: Label<N>, index: u64, tree: SteinerTree<N>) {
    match seen.entry(label) {
        Entry::Vacant(slot) => {
            slot.insert((index, tree));
        }
        Entry::Occupied(mut slot) => {
            if index < slot.get().0 {
                slot.insert((index, tree));
            }
        }
    }
}

/// The single tree without Steiner nodes for fewer than three terminals
fn degenerate_topologies<N: NodeId>(positions: &BTreeMap<N, Position>) -> Result<TopologySet<N>> {
    let terminals: Vec<N> = positions.keys().cloned().collect();
    let arcs: Vec<Arc<N>> = match terminals.as_slice() {
        [a, b] => vec![Arc::new(a.clone(), b.clone())],
        _ => Vec::new(),
    };
    if terminals.is_empty() {
        return Ok(TopologySet::new());
    }

    let tree = SteinerTree::new(terminals, arcs, positions.clone())?;
    let label = label_fst(&tree)?;
    Ok(TopologySet::from([(label, tree)]))
}

/// Enumerate every full Steiner topology for the given terminals
///
/// Steiner nodes are named by [`FreshIds`] and default settings are used.
pub fn enumerate_full_trees<N: FreshIds>(positions: &BTreeMap<N, Position>) -> Result<TopologySet<N>> {
    enumerate_full_trees_with(positions, None, &EnumerationConfig::default())
}

/// Enumerate every full Steiner topology with optional Steiner names and explicit settings
pub fn enumerate_full_trees_with<N: FreshIds>(
    positions: &BTreeMap<N, Position>,
    steiner_ids: Option<&[N]>,
    config: &EnumerationConfig,
) -> Result<TopologySet<N>> {
    let mut enumerator = TopologyEnumerator::new(config.clone())?;
    match steiner_ids {
        Some(ids) => enumerator.enumerate_with_ids(positions, ids),
        None => enumerator.enumerate(positions),
    }
}
