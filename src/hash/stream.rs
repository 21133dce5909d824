//! Streaming file hashing
//!
//! Files are read block by block and each block is absorbed into the hasher
//! in file order, so memory use is bounded by the largest block the policy
//! requests rather than by the file size.

use super::digest::{Alphabet, Digest};
use super::hasher::Hasher;
use super::policy::{BlockSizePolicy, DEFAULT_MAX_BLOCK_SIZE};
use crate::config::HashAlgorithm;
use crate::error::{HashBenchError, IoResultExt, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Largest buffer reserved before a block is read
const MAX_RESERVE: usize = DEFAULT_MAX_BLOCK_SIZE;

/// Outcome of hashing one file or stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResult {
    /// The hash algorithm used
    pub algorithm: HashAlgorithm,
    /// Digest rendered in the requested alphabet
    pub hash: String,
    /// Bytes absorbed
    pub size: u64,
    /// Non-empty reads performed
    pub blocks: u64,
}

impl HashResult {
    /// Create a new hash result
    pub fn new(algorithm: HashAlgorithm, hash: String, size: u64, blocks: u64) -> Self {
        Self {
            algorithm,
            hash,
            size,
            blocks,
        }
    }

    /// Same algorithm and same digest text
    pub fn verify(&self, other: &HashResult) -> bool {
        self.algorithm == other.algorithm && self.hash == other.hash
    }
}

impl std::fmt::Display for HashResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

/// Hashes whole files by streaming them through an incremental digest.
///
/// Construction validates the block-size policy, so a hasher that exists can
/// always make progress. Each call to [`hash`](Self::hash) owns its own file
/// handle and accumulator; nothing is shared between calls, which makes one
/// hasher safe to use from many threads at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingFileHasher {
    algorithm: HashAlgorithm,
    policy: BlockSizePolicy,
    alphabet: Alphabet,
}

impl StreamingFileHasher {
    /// Create a hasher, rejecting policies with a zero or inverted block size
    pub fn new(algorithm: HashAlgorithm, policy: BlockSizePolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            algorithm,
            policy,
            alphabet: Alphabet::default(),
        })
    }

    /// Create a hasher from an algorithm name.
    ///
    /// The name is resolved before the policy is validated, and both happen
    /// before any file is touched.
    pub fn from_names(algorithm: &str, policy: BlockSizePolicy) -> Result<Self> {
        let algorithm: HashAlgorithm = algorithm.parse()?;
        Self::new(algorithm, policy)
    }

    /// Render digests in `alphabet` instead of hex
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Algorithm in use
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Block-size policy in use
    pub fn policy(&self) -> BlockSizePolicy {
        self.policy
    }

    /// Output alphabet in use
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Hash the full contents of the file at `path`
    pub fn hash(&self, path: &Path) -> Result<HashResult> {
        let digest = self.digest_file(path)?;
        Ok(self.render(digest))
    }

    /// Hash the file at `path`, rendering with `alphabet` for this call only
    pub fn hash_with_alphabet(&self, path: &Path, alphabet: Alphabet) -> Result<HashResult> {
        self.with_alphabet(alphabet).hash(path)
    }

    /// Hash everything `reader` yields until EOF
    pub fn hash_reader<R: Read>(&self, reader: R) -> Result<HashResult> {
        let digest = self
            .absorb(reader, None)
            .map_err(|e| HashBenchError::read(PathBuf::new(), e))?;
        Ok(self.render(digest))
    }

    /// Recompute the digest of `path` and compare it with `expected`.
    ///
    /// Hex comparisons ignore case.
    pub fn verify(&self, path: &Path, expected: &str) -> Result<bool> {
        let actual = self.hash(path)?;
        let expected = expected.trim();
        Ok(match self.alphabet {
            Alphabet::Hex => actual.hash.eq_ignore_ascii_case(expected),
            _ => actual.hash == expected,
        })
    }

    fn digest_file(&self, path: &Path) -> Result<StreamDigest> {
        let file = File::open(path).with_path(path)?;
        let size_hint = file.metadata().ok().map(|m| m.len());

        tracing::debug!(
            path = %path.display(),
            algorithm = %self.algorithm,
            policy = %self.policy,
            "hashing file"
        );

        // `file` is dropped on every path out of here, error or not.
        let digest = self
            .absorb(file, size_hint)
            .map_err(|e| HashBenchError::read(path, e))?;

        tracing::debug!(
            path = %path.display(),
            bytes = digest.size,
            blocks = digest.blocks,
            "finished hashing"
        );
        Ok(digest)
    }

    fn absorb<R: Read>(&self, mut reader: R, size_hint: Option<u64>) -> std::io::Result<StreamDigest> {
        let mut hasher = Hasher::new(self.algorithm);
        let mut block_size = self.policy.initial();
        let mut buffer = Vec::new();
        let mut size = 0u64;
        let mut blocks = 0u64;

        loop {
            let remaining = size_hint.map(|total| total.saturating_sub(size));
            let bytes_read = read_block(&mut reader, &mut buffer, block_size, remaining)?;
            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
            size += bytes_read as u64;
            blocks += 1;
            tracing::trace!(block = blocks, bytes = bytes_read, "absorbed block");

            block_size = self.policy.next_block_size(block_size);
        }

        Ok(StreamDigest {
            digest: hasher.finalize(),
            size,
            blocks,
        })
    }

    fn render(&self, digest: StreamDigest) -> HashResult {
        HashResult::new(
            self.algorithm,
            digest.digest.encode(self.alphabet),
            digest.size,
            digest.blocks,
        )
    }
}

struct StreamDigest {
    digest: Digest,
    size: u64,
    blocks: u64,
}

/// Fill `buffer` with up to `block_size` bytes, stopping early only at EOF.
///
/// Interrupted reads are retried by `read_to_end`. The up-front reservation
/// is the smaller of the block, the remaining file length when known, and
/// `MAX_RESERVE`; `read_to_end` grows the buffer past that as data arrives.
fn read_block<R: Read>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
    block_size: usize,
    remaining: Option<u64>,
) -> std::io::Result<usize> {
    buffer.clear();
    let left = remaining
        .map(|left| usize::try_from(left.saturating_add(1)).unwrap_or(usize::MAX))
        .unwrap_or(usize::MAX);
    let wanted = block_size.min(left).min(MAX_RESERVE);
    buffer.reserve(wanted);
    reader.by_ref().take(block_size as u64).read_to_end(buffer)
}

/// Compute hash of a file with the default constant 64 KiB policy
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<HashResult> {
    StreamingFileHasher::new(algorithm, BlockSizePolicy::default())?.hash(path)
}

/// Resolve `algorithm` by name, validate `policy`, then hash `path`
pub fn hash_file_by_name(path: &Path, algorithm: &str, policy: BlockSizePolicy) -> Result<HashResult> {
    StreamingFileHasher::from_names(algorithm, policy)?.hash(path)
}

/// Compute hash of data in memory
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> HashResult {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    let blocks = u64::from(!data.is_empty());
    HashResult::new(algorithm, hasher.finalize().to_hex(), data.len() as u64, blocks)
}

/// Verify file integrity against a previously computed hex result
pub fn verify_file(path: &Path, expected: &HashResult) -> Result<bool> {
    let actual = hash_file(path, expected.algorithm)?;
    Ok(actual.verify(expected))
}

/// Hash many files on the rayon pool, one independent call per file.
///
/// Results come back in the same order as `paths`.
pub fn hash_files_parallel(paths: &[&Path], hasher: &StreamingFileHasher) -> Vec<Result<HashResult>> {
    paths.par_iter().map(|path| hasher.hash(path)).collect()
}
