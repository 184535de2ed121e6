//! # Geonet: topology enumeration for tree-shaped networks
//!
//! This library enumerates every structurally distinct full Steiner topology
//! for a set of terminals. Each topology is a tree in which free junctions
//! ("Steiner nodes") have degree 3 and terminals have degree 1. The geometric
//! and cost optimization of those topologies is left to pluggable solvers.
//!
//! ## Features
//!
//! - **Network model**: trees over arbitrary ordered identifiers, terminals with fixed positions
//! - **Tree isomorphism**: exact peel-inward labeling for unrooted trees
//! - **Skeleton enumeration**: one representative per class of max-degree-3 trees
//! - **Topology enumeration**: terminal attachment with canonical nested-pair labels
//! - **Optimization seam**: traits for flow, layout and geometry collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Tree and network data structures
pub mod network;

/// Isomorphism testing for unrooted trees
pub mod isomorph;

/// Enumeration of Steiner-only skeleton trees
pub mod skeleton;

/// Terminal attachment, canonical labels and full topology enumeration
pub mod topology;

/// Enumeration settings
pub mod config;

/// Cost-ranking of topologies through external solvers
pub mod optimization;

/// Utility functions and helpers
pub mod utils;

// Re-export commonly used types
pub use config::EnumerationConfig;
pub use isomorph::{are_isomorphic, TreeIsomorphism};
pub use network::{Arc, Edge, Net, NodeId, Position, SteinerTree};
pub use skeleton::{enumerate_skeletons, SkeletonTable};
pub use topology::{enumerate_full_trees, label_fst, Label, TopologyEnumerator};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum GeonetError {
    /// Structural problem with a tree or network
    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    /// An arc or query refers to a node that is not part of the network
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A position was requested for a Steiner node
    #[error("Node {0} is not a terminal")]
    NotATerminal(String),

    /// The same identifier was used for two different nodes
    #[error("Duplicate node identifier: {0}")]
    DuplicateNode(String),

    /// Explicit Steiner identifiers do not match the terminal count
    #[error("Expected {expected} Steiner identifiers for {terminals} terminals, got {actual}")]
    SteinerIdCount {
        /// Number of terminals
        terminals: usize,
        /// Required number of Steiner identifiers (terminals - 2)
        expected: usize,
        /// Number of identifiers supplied
        actual: usize,
    },

    /// The terminal count exceeds the configured enumeration limit
    #[error("{terminals} terminals exceed the enumeration limit of {limit}")]
    TooManyTerminals {
        /// Number of terminals
        terminals: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Invalid configuration or problem instance
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by an external solver
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, GeonetError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        config::EnumerationConfig,
        isomorph::{are_isomorphic, TreeIsomorphism},
        network::{Arc, Edge, Net, NodeId, Position, SteinerTree},
        skeleton::{enumerate_skeletons, SkeletonTable},
        topology::{enumerate_full_trees, enumerate_full_trees_with, label_fst, FreshIds, Label, TopologyEnumerator},
        GeonetError, Result,
    };
}
