//! Full Steiner topologies built from skeletons
//!
//! A full topology over `n >= 3` terminals has exactly `n - 2` Steiner nodes
//! of degree 3. Its Steiner nodes span a skeleton with `n - 2` nodes, and the
//! terminals hang off the skeleton's free slots. Enumerating skeleton classes
//! and then every way to fill their slots reaches every full topology;
//! canonical labels collapse the duplicates.

mod attach;
mod enumerator;
mod label;

pub use attach::{attach_terminals, AttachmentPlan};
pub use enumerator::{enumerate_full_trees, enumerate_full_trees_with, FreshIds, TopologyEnumerator, TopologySet};
pub use label::{label_fst, Label};
