//! Utility functions for Geonet

use crate::network::Net;
use crate::skeleton::MAX_DEGREE;
use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Save object to JSON file
pub fn save_json<T: Serialize>(obj: &T, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(obj)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Load object from JSON file
pub fn load_json<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let obj = serde_json::from_str(&contents)?;
    Ok(obj)
}

/// Generate a random skeleton tree with `size` nodes and degree at most 3
///
/// Nodes are numbered `0..size`; every new node is joined to a uniformly
/// chosen earlier node that still has a free slot.
pub fn random_skeleton<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Net<usize>> {
    let mut degree = vec![0usize; size];
    let mut arcs = Vec::with_capacity(size.saturating_sub(1));

    for node in 1..size {
        let open: Vec<usize> = (0..node).filter(|&n| degree[n] < MAX_DEGREE).collect();
        // a tree always has a leaf, so `open` is never empty
        let parent = open[rng.gen_range(0..open.len())];
        degree[parent] += 1;
        degree[node] += 1;
        arcs.push((parent, node));
    }

    Net::new(0..size, arcs)
}

/// Reproducible variant of [`random_skeleton`]
pub fn random_skeleton_seeded(size: usize, seed: u64) -> Result<Net<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    random_skeleton(size, &mut rng)
}

/// Timing utilities
pub mod timing {
    use std::time::Instant;

    /// Simple timer, reported through `tracing` when dropped
    pub struct Timer {
        start: Instant,
        name: String,
    }

    impl Timer {
        /// Start new timer
        pub fn new(name: &str) -> Self {
            Timer {
                start: Instant::now(),
                name: name.to_string(),
            }
        }

        /// Get elapsed time in seconds
        pub fn elapsed(&self) -> f32 {
            self.start.elapsed().as_secs_f32()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            tracing::info!(elapsed = self.elapsed(), "{} finished", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isomorph::are_isomorphic;

    #[test]
    fn test_random_skeleton() {
        for size in 1..=12 {
            let tree = random_skeleton_seeded(size, size as u64).unwrap();
            assert_eq!(tree.node_count(), size);
            assert!(tree.is_tree());
            assert!(tree.nodes().all(|n| tree.degree(n) <= MAX_DEGREE));
        }
        assert_eq!(random_skeleton_seeded(0, 1).unwrap().node_count(), 0);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = random_skeleton_seeded(9, 42).unwrap();
        let b = random_skeleton_seeded(9, 42).unwrap();
        assert_eq!(a, b);
        assert!(are_isomorphic(&a, &b));
    }

    #[test]
    fn test_json_serialization() {
        let tree = random_skeleton_seeded(6, 3).unwrap();
        let path = std::env::temp_dir().join("geonet_test_skeleton.json");

        save_json(&tree, &path).unwrap();
        let loaded: Net<usize> = load_json(&path).unwrap();

        assert_eq!(tree, loaded);

        // Clean up
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_timer() {
        let timer = timing::Timer::new("noop");
        assert!(timer.elapsed() >= 0.0);
    }
}
