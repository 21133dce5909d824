//! Block-size policies for streaming reads
//!
//! A policy decides how many bytes the next read asks for. It only changes
//! how a file is chunked on its way into the hasher, never which bytes the
//! hasher sees, so every policy yields the same digest for the same file.

use crate::error::{HashBenchError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default initial block size for file hashing (64 KiB)
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Default cap for the doubling-with-cap policy (16 MiB)
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// Policy selector as exposed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Same block size for every read
    #[default]
    Constant,
    /// Block size doubles after every read, without bound
    Doubling,
    /// Block size doubles after every read, clamped to a maximum
    Capped,
}

/// How the block size evolves from one read to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockSizePolicy {
    /// Every read requests `size` bytes
    Constant {
        /// Block size in bytes
        size: usize,
    },
    /// First read requests `initial` bytes, each later read twice the previous
    Doubling {
        /// First block size in bytes
        initial: usize,
    },
    /// Like `Doubling`, but never above `max`
    Capped {
        /// First block size in bytes
        initial: usize,
        /// Largest block size in bytes
        max: usize,
    },
}

impl Default for BlockSizePolicy {
    fn default() -> Self {
        Self::Constant {
            size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl BlockSizePolicy {
    /// Constant block size
    pub fn constant(size: usize) -> Self {
        Self::Constant { size }
    }

    /// Unbounded doubling from `initial`
    pub fn doubling(initial: usize) -> Self {
        Self::Doubling { initial }
    }

    /// Doubling from `initial`, clamped to `max`
    pub fn doubling_capped(initial: usize, max: usize) -> Self {
        Self::Capped { initial, max }
    }

    /// Build a policy from its CLI pieces.
    ///
    /// `max` is only consulted for [`PolicyKind::Capped`], where it falls
    /// back to [`DEFAULT_MAX_BLOCK_SIZE`] (or `initial`, if that is larger).
    pub fn from_parts(kind: PolicyKind, initial: usize, max: Option<usize>) -> Result<Self> {
        let policy = match kind {
            PolicyKind::Constant => Self::constant(initial),
            PolicyKind::Doubling => Self::doubling(initial),
            PolicyKind::Capped => {
                Self::doubling_capped(initial, max.unwrap_or(DEFAULT_MAX_BLOCK_SIZE.max(initial)))
            }
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Which kind of policy this is
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Constant { .. } => PolicyKind::Constant,
            Self::Doubling { .. } => PolicyKind::Doubling,
            Self::Capped { .. } => PolicyKind::Capped,
        }
    }

    /// Block size of the first read
    pub fn initial(&self) -> usize {
        match *self {
            Self::Constant { size } => size,
            Self::Doubling { initial } | Self::Capped { initial, .. } => initial,
        }
    }

    /// Upper bound on any block this policy can request, if it has one
    pub fn max(&self) -> Option<usize> {
        match *self {
            Self::Constant { size } => Some(size),
            Self::Doubling { .. } => None,
            Self::Capped { max, .. } => Some(max),
        }
    }

    /// Reject policies that cannot make progress or contradict themselves
    pub fn validate(&self) -> Result<()> {
        if self.initial() == 0 {
            return Err(HashBenchError::invalid("block size must be positive"));
        }
        if let Self::Capped { initial, max } = *self {
            if max < initial {
                return Err(HashBenchError::invalid(format!(
                    "max block size {} is smaller than initial block size {}",
                    max, initial
                )));
            }
        }
        Ok(())
    }

    /// Size of the read that follows a read of `current` bytes
    pub fn next_block_size(&self, current: usize) -> usize {
        match *self {
            Self::Constant { .. } => current,
            Self::Doubling { .. } => current.saturating_mul(2),
            Self::Capped { max, .. } => current.saturating_mul(2).min(max),
        }
    }

    /// Short human-readable label, used in benchmark reports
    pub fn label(&self) -> String {
        use humansize::{format_size, BINARY};
        match *self {
            Self::Constant { size } => format!("constant {}", format_size(size as u64, BINARY)),
            Self::Doubling { initial } => {
                format!("doubling from {}", format_size(initial as u64, BINARY))
            }
            Self::Capped { initial, max } => format!(
                "doubling from {} capped at {}",
                format_size(initial as u64, BINARY),
                format_size(max as u64, BINARY)
            ),
        }
    }
}

impl std::fmt::Display for BlockSizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
