//! Hash benchmarking harness
//!
//! Times file hashing under different block-size policies, constant block
//! sizes and algorithms, on seeded generated files, and verifies that every
//! run over the same file produced the same digest.

mod data;
mod report;
mod suite;
mod timer;

pub use data::*;
pub use report::*;
pub use suite::*;
pub use timer::*;
