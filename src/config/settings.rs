//! Configuration settings for HashBench
//!
//! Defines the supported algorithms, CLI arguments, and the runtime
//! configuration a hashing run is built from.

use crate::error::{HashBenchError, Result};
use crate::hash::{Alphabet, BlockSizePolicy, PolicyKind, StreamingFileHasher};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// HashBench - streaming file hashing and hash benchmarking
#[derive(Parser, Debug, Clone)]
#[command(name = "hashbench")]
#[command(author = "HashBench Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hash large files block by block, and benchmark how to do it fastest")]
#[command(long_about = r#"
HashBench streams files through an incremental digest without loading them
into memory, and measures how algorithms and block-read strategies compare.

Algorithms: sha1, sha256, sha512, md5, xx32, xx64, xxh3, blake3

Examples:
  hashbench hash big.iso                          # xx64, 64K constant blocks
  hashbench hash big.iso -a blake3 -b 1M          # BLAKE3, 1 MiB blocks
  hashbench hash *.bin --policy capped --parallel # doubling blocks, many files
  hashbench bench-policies --chunks 600           # compare block policies
  hashbench bench-algorithms --scales 5..10       # compare algorithms
"#)]
pub struct CliArgs {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Show progress bars during benchmarks
    #[arg(short = 'p', long, global = true)]
    pub progress: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Hash one or more files
    #[command(name = "hash")]
    Hash {
        /// Files to hash
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        hashing: HashingArgs,

        /// Hash files concurrently on a thread pool
        #[arg(long)]
        parallel: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check a file against an expected digest
    #[command(name = "verify")]
    Verify {
        /// File to check
        path: PathBuf,

        /// Expected digest, in the chosen alphabet
        expected: String,

        #[command(flatten)]
        hashing: HashingArgs,
    },

    /// List supported algorithms
    #[command(name = "algorithms")]
    Algorithms,

    /// Compare constant, doubling and capped block policies on one file
    #[command(name = "bench-policies")]
    BenchPolicies {
        #[command(flatten)]
        bench: BenchArgs,

        /// Algorithm to time
        #[arg(short, long, default_value = "xx64")]
        algorithm: String,

        /// Initial block size for every policy
        #[arg(long, default_value = "1M", value_name = "SIZE")]
        initial: String,

        /// Cap for the capped policy
        #[arg(long, default_value = "16M", value_name = "SIZE")]
        max: String,
    },

    /// Find the fastest constant block size for one file
    #[command(name = "bench-blocksize")]
    BenchBlocksize {
        #[command(flatten)]
        bench: BenchArgs,

        /// Algorithm to time
        #[arg(short, long, default_value = "xx64")]
        algorithm: String,

        /// Smallest block size tried, as a power of two
        #[arg(long, default_value = "16")]
        min_power: u32,

        /// Largest block size tried (exclusive), as a power of two
        #[arg(long, default_value = "24")]
        max_power: u32,
    },

    /// Compare algorithms across growing file sizes
    #[command(name = "bench-algorithms")]
    BenchAlgorithms {
        #[command(flatten)]
        bench: BenchArgs,

        /// File sizes to try, as a range of powers of two in chunks (e.g. 5..10)
        #[arg(long, default_value = "5..10", value_name = "RANGE")]
        scales: String,

        /// Algorithms to compare
        #[arg(long, value_delimiter = ',', default_value = "sha1,sha512,xx32,xx64,blake3")]
        algorithms: Vec<String>,

        /// Algorithm every other one is compared against
        #[arg(long, default_value = "xx64")]
        reference: String,
    },
}

/// Options shared by commands that hash files
#[derive(Args, Debug, Clone)]
pub struct HashingArgs {
    /// Hash algorithm
    #[arg(short, long, default_value = "xx64", env = "HASHBENCH_ALGORITHM")]
    pub algorithm: String,

    /// Initial block size per read (e.g., 64K, 1M)
    #[arg(
        short = 'b',
        long,
        default_value = "64K",
        value_name = "SIZE",
        env = "HASHBENCH_BLOCK_SIZE",
        allow_hyphen_values = true
    )]
    pub block_size: String,

    /// How the block size evolves between reads
    #[arg(long, value_enum, default_value = "constant")]
    pub policy: PolicyKind,

    /// Cap for the capped policy
    #[arg(long, value_name = "SIZE", allow_hyphen_values = true)]
    pub max_block_size: Option<String>,

    /// Digest alphabet (hex, dec, abc, alphanum)
    #[arg(long, default_value = "hex")]
    pub base: String,
}

/// Options shared by benchmark commands
#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Directory for generated test files (a temporary one if omitted)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Number of chunks in the generated file
    #[arg(long, default_value = "64", value_name = "NUM")]
    pub chunks: usize,

    /// Size of each generated chunk
    #[arg(long, default_value = "1M", value_name = "SIZE")]
    pub chunk_size: String,

    /// Timed runs per candidate
    #[arg(long, default_value = "4", value_name = "NUM")]
    pub iterations: usize,

    /// Fastest runs averaged into the reported time
    #[arg(long, default_value = "2", value_name = "NUM")]
    pub best_of: usize,

    /// Seed for generated data
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Hash algorithm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1 - legacy cryptographic (160-bit)
    Sha1,
    /// SHA-256 - standard cryptographic (256-bit)
    Sha256,
    /// SHA-512 - standard cryptographic (512-bit)
    Sha512,
    /// MD5 - legacy, non-secure (128-bit)
    Md5,
    /// XXHash32 - fast, non-cryptographic (32-bit)
    Xx32,
    /// XXHash64 - fast, non-cryptographic (64-bit)
    #[default]
    Xx64,
    /// XXHash3 - ultra fast, non-cryptographic (128-bit)
    Xxh3,
    /// BLAKE3 - fast and cryptographically secure (256-bit)
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm
    pub const ALL: [HashAlgorithm; 8] = [
        Self::Sha1,
        Self::Sha256,
        Self::Sha512,
        Self::Md5,
        Self::Xx32,
        Self::Xx64,
        Self::Xxh3,
        Self::Blake3,
    ];

    /// Get the output size in bytes
    pub fn output_size(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
            Self::Md5 => 16,
            Self::Xx32 => 4,
            Self::Xx64 => 8,
            Self::Xxh3 => 16,
            Self::Blake3 => 32,
        }
    }

    /// Canonical lowercase identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Md5 => "md5",
            Self::Xx32 => "xx32",
            Self::Xx64 => "xx64",
            Self::Xxh3 => "xxh3",
            Self::Blake3 => "blake3",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
            Self::Md5 => "MD5",
            Self::Xx32 => "XXHash32",
            Self::Xx64 => "XXHash64",
            Self::Xxh3 => "XXHash3",
            Self::Blake3 => "BLAKE3",
        }
    }

    /// Whether the algorithm is meant to resist deliberate collisions
    pub fn is_cryptographic(&self) -> bool {
        matches!(self, Self::Sha256 | Self::Sha512 | Self::Blake3)
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            "md5" => Ok(Self::Md5),
            "xx32" | "xxh32" | "xxhash32" => Ok(Self::Xx32),
            "xx64" | "xxh64" | "xxhash64" => Ok(Self::Xx64),
            "xxh3" | "xxh128" | "xxhash3" => Ok(Self::Xxh3),
            "blake3" => Ok(Self::Blake3),
            _ => Err(HashBenchError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Output format for reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Runtime configuration for a hashing run, derived from CLI args
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HashConfig {
    /// Hash algorithm
    pub algorithm: HashAlgorithm,
    /// Block-size policy
    pub policy: BlockSizePolicy,
    /// Digest alphabet
    pub alphabet: Alphabet,
}

impl HashConfig {
    /// Build a config from CLI arguments.
    ///
    /// Checks run in a fixed order: algorithm name, alphabet, then block
    /// sizes. No file is opened here.
    pub fn from_cli(args: &HashingArgs) -> Result<Self> {
        let algorithm: HashAlgorithm = args.algorithm.parse()?;
        let alphabet: Alphabet = args.base.parse()?;
        let initial = parse_block_size(&args.block_size)?;
        let max = args
            .max_block_size
            .as_deref()
            .map(parse_block_size)
            .transpose()?;
        let policy = BlockSizePolicy::from_parts(args.policy, initial, max)?;

        Ok(Self {
            algorithm,
            policy,
            alphabet,
        })
    }

    /// Hasher configured from this config
    pub fn hasher(&self) -> Result<StreamingFileHasher> {
        Ok(StreamingFileHasher::new(self.algorithm, self.policy)?.with_alphabet(self.alphabet))
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase().replace("IB", "B");

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("TB") || size.ends_with('T') {
        let num = size.trim_end_matches(|c| c == 'T' || c == 'B');
        (num, 1024u64 * 1024 * 1024 * 1024)
    } else if size.ends_with("GB") || size.ends_with('G') {
        let num = size.trim_end_matches(|c| c == 'G' || c == 'B');
        (num, 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        let num = size.trim_end_matches(|c| c == 'M' || c == 'B');
        (num, 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        let num = size.trim_end_matches(|c| c == 'K' || c == 'B');
        (num, 1024u64)
    } else if size.ends_with('B') {
        let num = size.trim_end_matches('B');
        (num, 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num < 0.0 {
        return Err(format!("Size must not be negative: {}", num_str.trim()));
    }

    Ok((num * multiplier as f64) as u64)
}

/// Parse a block size; zero, negative and malformed values are invalid arguments
pub fn parse_block_size(size: &str) -> Result<usize> {
    let bytes = parse_size(size)
        .map_err(|e| HashBenchError::invalid(format!("block size '{}': {}", size, e)))?;
    if bytes == 0 {
        return Err(HashBenchError::invalid(format!(
            "block size '{}': must be positive",
            size
        )));
    }
    usize::try_from(bytes)
        .map_err(|_| HashBenchError::invalid(format!("block size '{}': too large", size)))
}

/// Parse a half-open power range such as `5..10`
pub fn parse_scale_range(range: &str) -> Result<std::ops::Range<u32>> {
    let (start, end) = range
        .split_once("..")
        .ok_or_else(|| HashBenchError::config(format!("expected START..END, got '{}'", range)))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| HashBenchError::config(format!("invalid scale '{}' in '{}'", s, range)))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if start >= end {
        return Err(HashBenchError::config(format!("empty scale range '{}'", range)));
    }
    Ok(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashing_args(algorithm: &str, block_size: &str) -> HashingArgs {
        HashingArgs {
            algorithm: algorithm.to_string(),
            block_size: block_size.to_string(),
            policy: PolicyKind::Constant,
            max_block_size: None,
            base: "hex".to_string(),
        }
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("64KiB").unwrap(), 64 * 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1mib").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("1.5G").unwrap(), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert!(parse_size("-1").is_err());
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_parse_block_size_rejects_non_positive() {
        assert_eq!(parse_block_size("64K").unwrap(), 65536);
        for bad in ["0", "-1", "-64K", "0B"] {
            let err = parse_block_size(bad).unwrap_err();
            assert!(matches!(err, HashBenchError::InvalidArgument(_)), "{}", bad);
        }
    }

    #[test]
    fn test_hash_algorithm_names() {
        for algorithm in HashAlgorithm::ALL {
            assert_eq!(algorithm.id().parse::<HashAlgorithm>().unwrap(), algorithm);
        }
        assert_eq!("XXH64".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Xx64);
        assert_eq!("sha-512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert_eq!(HashAlgorithm::Xxh3.output_size(), 16);
        assert_eq!(HashAlgorithm::Blake3.name(), "BLAKE3");

        let err = "sha999".parse::<HashAlgorithm>().unwrap_err();
        assert!(matches!(err, HashBenchError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_config_check_order() {
        // Unknown algorithm wins over a bad block size.
        let err = HashConfig::from_cli(&hashing_args("sha999", "-1")).unwrap_err();
        assert!(matches!(err, HashBenchError::UnsupportedAlgorithm(_)));

        let err = HashConfig::from_cli(&hashing_args("sha1", "-1")).unwrap_err();
        assert!(matches!(err, HashBenchError::InvalidArgument(_)));
    }

    #[test]
    fn test_config_from_cli() {
        let mut args = hashing_args("blake3", "1M");
        args.policy = PolicyKind::Capped;
        args.max_block_size = Some("8M".to_string());
        args.base = "abc".to_string();

        let config = HashConfig::from_cli(&args).unwrap();
        assert_eq!(config.algorithm, HashAlgorithm::Blake3);
        assert_eq!(config.policy, BlockSizePolicy::doubling_capped(1 << 20, 8 << 20));
        assert_eq!(config.alphabet, Alphabet::Alpha);
        assert_eq!(config.hasher().unwrap().alphabet(), Alphabet::Alpha);
    }

    #[test]
    fn test_cli_parses() {
        let args = CliArgs::try_parse_from([
            "hashbench", "-v", "hash", "a.bin", "b.bin", "-a", "sha256", "-b", "1M", "--policy", "doubling",
        ])
        .unwrap();
        assert_eq!(args.verbose, 1);
        match args.command {
            Commands::Hash { paths, hashing, parallel, .. } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(hashing.algorithm, "sha256");
                assert_eq!(hashing.policy, PolicyKind::Doubling);
                assert!(!parallel);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_names_resolve_through_from_str() {
        let args = CliArgs::try_parse_from([
            "hashbench", "verify", "a.bin", "00", "-a", "XXH64", "--base", "36",
        ])
        .unwrap();
        let Commands::Verify { hashing, .. } = args.command else {
            panic!("expected verify");
        };
        let config = HashConfig::from_cli(&hashing).unwrap();
        assert_eq!(config.algorithm, HashAlgorithm::Xx64);
        assert_eq!(config.alphabet, Alphabet::AlphaNum);

        // unknown names get past clap and fail with the crate's own error
        let args = CliArgs::try_parse_from(["hashbench", "hash", "a.bin", "-a", "sha999", "-b", "0"])
            .unwrap();
        let Commands::Hash { hashing, .. } = args.command else {
            panic!("expected hash");
        };
        let err = HashConfig::from_cli(&hashing).unwrap_err();
        assert!(matches!(err, HashBenchError::UnsupportedAlgorithm(ref name) if name == "sha999"));
    }

    #[test]
    fn test_parse_scale_range() {
        assert_eq!(parse_scale_range("5..10").unwrap(), 5..10);
        assert!(parse_scale_range("10..5").is_err());
        assert!(parse_scale_range("5-10").is_err());
    }
}
