//! Seeded test-file generation for benchmarks
//!
//! Files are built from a small pool of random chunks so large files can be
//! written quickly while still having varied content. Same seed, same files.

use crate::config::HashAlgorithm;
use crate::error::{HashBenchError, IoResultExt, Result};
use crate::hash::Hasher;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Characters chunks and file names are drawn from
const HEX_DIGITS: &[u8] = b"0123456789abcdefABCDEF";

/// Length of a generated file name, before the extension
const NAME_LEN: usize = 16;

/// Chunks in the pool
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Size of each pooled chunk (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Writes files made of randomly chosen pooled chunks
pub struct DataGenerator {
    rng: StdRng,
    pool: Vec<Vec<u8>>,
}

impl DataGenerator {
    /// Build a pool of `pool_size` chunks of `chunk_size` random hex digits
    pub fn new(seed: u64, chunk_size: usize, pool_size: usize) -> Result<Self> {
        if chunk_size == 0 || pool_size == 0 {
            return Err(HashBenchError::invalid(
                "chunk size and pool size must be positive",
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let pool = (0..pool_size)
            .map(|_| random_hex(&mut rng, chunk_size))
            .collect();

        Ok(Self { rng, pool })
    }

    /// Size of each chunk in bytes
    pub fn chunk_size(&self) -> usize {
        self.pool.first().map_or(0, Vec::len)
    }

    /// Write a file of `num_chunks` pooled chunks into `dir`.
    ///
    /// The name is 16 random hex digits; the extension is the first four hex
    /// characters of the content's XXHash64, so identical content always gets
    /// the same extension.
    pub fn write_file(&mut self, dir: &Path, num_chunks: usize) -> Result<PathBuf> {
        let stem = String::from_utf8(random_hex(&mut self.rng, NAME_LEN))
            .map_err(|e| HashBenchError::invalid(e.to_string()))?;
        let staging = dir.join(format!("{}.partial", stem));

        let mut content_hash = Hasher::new(HashAlgorithm::Xx64);
        {
            let file = File::create(&staging).with_path(&staging)?;
            let mut writer = BufWriter::new(file);
            for _ in 0..num_chunks {
                let chunk = self
                    .pool
                    .choose(&mut self.rng)
                    .ok_or_else(|| HashBenchError::invalid("empty chunk pool"))?;
                writer.write_all(chunk).with_path(&staging)?;
                content_hash.update(chunk);
            }
            writer.flush().with_path(&staging)?;
        }

        let ext: String = content_hash.finalize().to_hex().chars().take(4).collect();
        let path = dir.join(format!("{}.{}", stem, ext));
        std::fs::rename(&staging, &path).with_path(&path)?;

        tracing::info!(
            path = %path.display(),
            bytes = num_chunks as u64 * self.chunk_size() as u64,
            "wrote benchmark file"
        );
        Ok(path)
    }
}

fn random_hex(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len)
        .map(|_| HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())])
        .collect()
}

/// Where benchmark files are written
pub enum ScratchDir {
    /// A caller-chosen directory, left in place
    Provided(PathBuf),
    /// A temporary directory, deleted on drop
    Temp(TempDir),
}

impl ScratchDir {
    /// Use `dir` when given (creating it if needed), otherwise a fresh temp dir
    pub fn new(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).with_path(dir)?;
                Ok(Self::Provided(dir.to_path_buf()))
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("hashbench-")
                    .tempdir()
                    .with_path(std::env::temp_dir())?;
                Ok(Self::Temp(temp))
            }
        }
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        match self {
            Self::Provided(path) => path,
            Self::Temp(temp) => temp.path(),
        }
    }
}
