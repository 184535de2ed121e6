//! Enumeration configuration

use serde::{Deserialize, Serialize};

/// Default limit on the number of terminals
///
/// Terminal permutations grow factorially and skeleton classes grow
/// combinatorially, so exhaustive enumeration is only practical for small
/// instances.
pub const DEFAULT_MAX_TERMINALS: usize = 12;

/// Configuration for skeleton and topology enumeration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    /// Largest terminal count accepted before enumeration is refused
    pub max_terminals: usize,
    /// Spread candidate generation over the rayon thread pool
    pub parallel: bool,
    /// Minimum number of candidates before going parallel
    pub parallel_threshold: usize,
}

impl EnumerationConfig {
    /// Single-threaded enumeration
    pub fn sequential() -> Self {
        EnumerationConfig {
            parallel: false,
            ..Self::default()
        }
    }

    /// Parallel enumeration with the default threshold
    pub fn parallel() -> Self {
        EnumerationConfig {
            parallel: true,
            ..Self::default()
        }
    }

    /// Set the terminal limit
    pub fn with_max_terminals(mut self, max_terminals: usize) -> Self {
        self.max_terminals = max_terminals;
        self
    }

    /// Set the parallel threshold
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Whether a batch of `candidates` should run in parallel
    pub fn use_parallel(&self, candidates: usize) -> bool {
        self.parallel && candidates > self.parallel_threshold
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_terminals == 0 {
            return Err("Terminal limit must be positive".to_string());
        }

        // n! permutations must stay addressable by a u64 index
        if self.max_terminals > 20 {
            return Err(format!(
                "Terminal limit {} exceeds the largest enumerable count of 20",
                self.max_terminals
            ));
        }

        if self.parallel && self.parallel_threshold == 0 {
            return Err("Parallel threshold must be positive".to_string());
        }

        Ok(())
    }
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        EnumerationConfig {
            max_terminals: DEFAULT_MAX_TERMINALS,
            parallel: true,
            parallel_threshold: 64,
        }
    }
}
