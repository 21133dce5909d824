//! Configuration module for HashBench
//!
//! Provides algorithm identifiers, CLI arguments with environment
//! defaults, size parsing, and the runtime hashing config.

mod settings;

pub use settings::*;
