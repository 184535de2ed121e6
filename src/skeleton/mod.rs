//! Enumeration of Steiner-only skeleton trees
//!
//! A skeleton is the subtree spanned by the Steiner nodes of a full Steiner
//! topology. Every Steiner node ends up with degree 3, so skeletons are
//! exactly the trees of maximum degree 3. The table below holds one
//! representative per isomorphism class for each node count, grown one size
//! at a time: every representative of size k-1 is extended by a leaf at each
//! node with a free slot, and a candidate is kept only if it is isomorphic to
//! none of the representatives accepted so far.
//!
//! The class counts follow 1, 1, 1, 2, 2, 4, 6, 11, 18, 37 for sizes 1..10.
//! Acceptance costs O(classes^2) isomorphism tests per size; this is inherent
//! to exhaustive enumeration and limits practical use to about 12 terminals.

use crate::config::EnumerationConfig;
use crate::isomorph::TreeIsomorphism;
use crate::network::Net;
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Maximum degree of a node in a skeleton (and of a Steiner node overall)
pub const MAX_DEGREE: usize = 3;

/// Representatives of skeleton classes, indexed by size
///
/// The trees live in one arena; `sizes[k - 1]` is the arena range holding
/// the representatives with `k` nodes. Nodes of a size-k skeleton are
/// numbered `0..k`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SkeletonTable {
    trees: Vec<Net<usize>>,
    sizes: Vec<Range<usize>>,
}

impl SkeletonTable {
    /// Create a table without any sizes
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest size enumerated so far (0 for an empty table)
    pub fn max_size(&self) -> usize {
        self.sizes.len()
    }

    /// Number of classes with `size` nodes (0 outside the enumerated range)
    pub fn class_count(&self, size: usize) -> usize {
        self.representatives(size).len()
    }

    /// Class counts for every enumerated size
    pub fn class_counts(&self) -> BTreeMap<usize, usize> {
        self.sizes
            .iter()
            .enumerate()
            .map(|(i, range)| (i + 1, range.len()))
            .collect()
    }

    /// Representatives with `size` nodes
    pub fn representatives(&self, size: usize) -> &[Net<usize>] {
        match size.checked_sub(1).and_then(|i| self.sizes.get(i)) {
            Some(range) => &self.trees[range.clone()],
            None => &[],
        }
    }

    /// Iterate over `(size, representatives)` pairs in increasing size
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Net<usize>])> + '_ {
        (1..=self.max_size()).map(move |size| (size, self.representatives(size)))
    }

    /// Grow the table until it covers `size`
    pub fn extend_to(&mut self, size: usize, config: &EnumerationConfig) -> Result<()> {
        while self.max_size() < size {
            self.grow(config)?;
        }
        Ok(())
    }

    /// Add the next size to the table
    fn grow(&mut self, config: &EnumerationConfig) -> Result<()> {
        let size = self.max_size() + 1;
        let start = self.trees.len();

        if size == 1 {
            self.trees.push(Net::new([0], Vec::<(usize, usize)>::new())?);
            self.sizes.push(start..self.trees.len());
            tracing::debug!(size, classes = 1, "seeded skeleton table");
            return Ok(());
        }

        let parents = self.representatives(size - 1);
        let candidates: Vec<Net<usize>> = if config.use_parallel(parents.len()) {
            parents
                .par_iter()
                .map(|p| extensions(p, size - 1))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect()
        } else {
            parents
                .iter()
                .map(|p| extensions(p, size - 1))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect()
        };
        let candidate_count = candidates.len();

        let mut accepted: Vec<Net<usize>> = Vec::new();
        for candidate in candidates {
            let known = if config.use_parallel(accepted.len()) {
                accepted.par_iter().any(|r| r.is_isomorphic(&candidate))
            } else {
                accepted.iter().any(|r| r.is_isomorphic(&candidate))
            };
            if !known {
                accepted.push(candidate);
            }
        }

        tracing::debug!(
            size,
            candidates = candidate_count,
            classes = accepted.len(),
            "enumerated skeleton classes"
        );
        self.trees.extend(accepted);
        self.sizes.push(start..self.trees.len());
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawSkeletonTable {
    trees: Vec<Net<usize>>,
    sizes: Vec<Range<usize>>,
}

impl RawSkeletonTable {
    /// Ranges must tile the arena in size order; a size-k tree has nodes `0..k`
    fn check(&self) -> std::result::Result<(), String> {
        let mut next = 0;
        for (i, range) in self.sizes.iter().enumerate() {
            let size = i + 1;
            if range.start != next || range.end < range.start || range.end > self.trees.len() {
                return Err(format!("Size {} has range {:?}, expected to start at {}", size, range, next));
            }
            for tree in &self.trees[range.clone()] {
                let numbered = tree.nodes().copied().eq(0..size);
                if !numbered || !tree.is_tree() || tree.nodes().any(|n| tree.degree(n) > MAX_DEGREE) {
                    return Err(format!("Malformed skeleton of size {}: {:?}", size, tree));
                }
            }
            next = range.end;
        }
        if next != self.trees.len() {
            return Err(format!("{} trees but ranges end at {}", self.trees.len(), next));
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for SkeletonTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawSkeletonTable::deserialize(deserializer)?;
        raw.check().map_err(serde::de::Error::custom)?;
        Ok(SkeletonTable {
            trees: raw.trees,
            sizes: raw.sizes,
        })
    }
}

/// All trees obtained by joining node `leaf` to a node with a free slot
fn extensions(parent: &Net<usize>, leaf: usize) -> Result<Vec<Net<usize>>> {
    parent
        .nodes()
        .filter(|n| parent.degree(n) < MAX_DEGREE)
        .map(|n| parent.graft_leaf(n, leaf))
        .collect()
}

/// Enumerate skeleton classes for every size up to `internal_node_count`
pub fn enumerate_skeletons(internal_node_count: usize) -> Result<SkeletonTable> {
    enumerate_skeletons_with(internal_node_count, &EnumerationConfig::default())
}

/// Enumerate skeleton classes with explicit settings
pub fn enumerate_skeletons_with(internal_node_count: usize, config: &EnumerationConfig) -> Result<SkeletonTable> {
    let mut table = SkeletonTable::new();
    table.extend_to(internal_node_count, config)?;
    Ok(table)
}
