//! # HashBench - Streaming File Hashing
//!
//! HashBench hashes files of any size by reading them block by block into an
//! incremental digest, and benchmarks how algorithms and block-read
//! strategies compare.
//!
//! ## Features
//!
//! - **Streaming**: memory use bounded by the block size, not the file size
//! - **Pluggable algorithms by name**: SHA-1, SHA-256, SHA-512, MD5,
//!   XXHash32, XXHash64, XXHash3, BLAKE3
//! - **Block-size policies**: constant, doubling, doubling with a cap; the
//!   digest never depends on the policy
//! - **Digest alphabets**: hex, decimal, base 26, base 36
//! - **Benchmarks**: policies, constant block sizes, and algorithms across
//!   file sizes, with digest agreement checked on every run
//!
//! ## Quick Start
//!
//! ```no_run
//! use hashbench::config::HashAlgorithm;
//! use hashbench::hash::hash_file;
//! use std::path::Path;
//!
//! let result = hash_file(Path::new("/data/big.iso"), HashAlgorithm::Blake3).unwrap();
//! println!("{} ({} bytes)", result.hash, result.size);
//! ```
//!
//! ## Choosing a Policy
//!
//! ```no_run
//! use hashbench::hash::{Alphabet, BlockSizePolicy, StreamingFileHasher};
//! use std::path::Path;
//!
//! // Resolved by name; "sha999" would fail here, before any I/O.
//! let hasher = StreamingFileHasher::from_names(
//!     "xx64",
//!     BlockSizePolicy::doubling_capped(1 << 20, 16 << 20),
//! )
//! .unwrap()
//! .with_alphabet(Alphabet::Alpha);
//!
//! let result = hasher.hash(Path::new("/data/big.iso")).unwrap();
//! println!("{} in {} reads", result.hash, result.blocks);
//! ```
//!
//! ## Benchmarking
//!
//! ```no_run
//! use hashbench::bench::{default_policies, BenchSuite, DataGenerator, Timer};
//! use hashbench::config::HashAlgorithm;
//! use hashbench::progress::ProgressReporter;
//! use std::path::Path;
//!
//! let dir = Path::new("/tmp/hashbench");
//! let mut generator = DataGenerator::new(0, 1 << 20, 8).unwrap();
//! let path = generator.write_file(dir, 64).unwrap();
//!
//! let progress = ProgressReporter::hidden();
//! let suite = BenchSuite::new(Timer::new(4, 2).unwrap(), &progress);
//! let report = suite
//!     .compare_policies(&path, HashAlgorithm::Xx64, &default_policies(1 << 20, 16 << 20))
//!     .unwrap();
//! println!("{}", report);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bench;
pub mod config;
pub mod error;
pub mod hash;
pub mod progress;

// Re-export commonly used types
pub use config::{HashAlgorithm, HashConfig};
pub use error::{HashBenchError, Result};
pub use hash::{BlockSizePolicy, HashResult, StreamingFileHasher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use hashbench::prelude::*;
    //! ```

    pub use crate::bench::{BenchSuite, DataGenerator, Report, Timer};
    pub use crate::config::{HashAlgorithm, HashConfig, OutputFormat};
    pub use crate::error::{HashBenchError, Result};
    pub use crate::hash::{
        hash_bytes, hash_file, hash_file_by_name, Alphabet, BlockSizePolicy, HashResult,
        StreamingFileHasher,
    };
    pub use crate::progress::ProgressReporter;
}
