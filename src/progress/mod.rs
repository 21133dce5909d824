//! Progress reporting module
//!
//! Progress bars for benchmark runs and multi-file hashing, with
//! throughput display.

mod reporter;

pub use reporter::*;
