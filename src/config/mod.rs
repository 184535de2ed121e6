//! Settings for topology enumeration

mod enumeration_config;

pub use enumeration_config::{EnumerationConfig, DEFAULT_MAX_TERMINALS};
