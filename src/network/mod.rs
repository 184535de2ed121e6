//! Tree and network data structures

mod edge;
mod net;
mod steiner_tree;

use std::fmt::Debug;
use std::hash::Hash;

pub use edge::{Arc, Edge};
pub use net::Net;
pub use steiner_tree::{Position, SteinerTree};

/// Identifier of a network node
///
/// Any totally ordered, hashable symbol qualifies: strings, characters and
/// integers are all used in practice.
pub trait NodeId: Clone + Ord + Hash + Debug + Send + Sync {}

impl<T: Clone + Ord + Hash + Debug + Send + Sync> NodeId for T {}
