//! Hash computation module
//!
//! Streams files block by block into an incremental digest. The algorithm is
//! chosen by name from a fixed set (SHA-1/256/512, MD5, XXHash32/64/3,
//! BLAKE3) and the block-size policy only affects I/O chunking, never the
//! resulting digest.

mod digest;
mod hasher;
mod policy;
mod stream;

pub use digest::*;
pub use hasher::*;
pub use policy::*;
pub use stream::*;
