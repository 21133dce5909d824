//! Error types for HashBench
//!
//! Every failure a hashing call or benchmark run can produce is a variant of
//! [`HashBenchError`]. Nothing is retried internally; errors surface to the
//! caller as soon as they happen.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for HashBench operations
#[derive(Error, Debug)]
pub enum HashBenchError {
    /// I/O error while reading or writing a file
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File or directory not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hash algorithm name not in the supported set
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Digest alphabet name not in the supported set
    #[error("Unsupported digest alphabet: {0}")]
    UnsupportedAlphabet(String),

    /// Invalid argument (block sizes, benchmark parameters)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Two runs over the same bytes produced different digests
    #[error("Digest mismatch in '{label}': expected {expected}, got {actual}")]
    DigestMismatch {
        /// Run that disagreed
        label: String,
        /// Digest of the first run
        expected: String,
        /// Digest of this run
        actual: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Report serialization error
    #[error("Report error: {0}")]
    ReportError(String),
}

impl HashBenchError {
    /// Create an I/O error with path context.
    ///
    /// `NotFound` and `PermissionDenied` kinds are promoted to their
    /// dedicated variants so callers can match on them directly.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// Create a read error that keeps the raw I/O kind, whatever it is
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a digest mismatch error
    pub fn mismatch(
        label: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::DigestMismatch {
            label: label.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Whether a caller-side retry policy could reasonably try again.
    ///
    /// Only transient I/O qualifies; argument and lookup errors never change
    /// between attempts.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Check if this error is a permission issue
    pub fn is_permission_error(&self) -> bool {
        match self {
            Self::PermissionDenied(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::NotFound(path) | Self::PermissionDenied(path) => {
                Some(path)
            }
            _ => None,
        }
    }
}

/// Result type alias for HashBench operations
pub type Result<T> = std::result::Result<T, HashBenchError>;

impl From<std::io::Error> for HashBenchError {
    fn from(err: std::io::Error) -> Self {
        HashBenchError::io(PathBuf::new(), err)
    }
}

impl From<serde_json::Error> for HashBenchError {
    fn from(err: serde_json::Error) -> Self {
        HashBenchError::ReportError(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| HashBenchError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_io_error_kind_promotion() {
        let err = HashBenchError::io("/missing", std::io::Error::new(ErrorKind::NotFound, "gone"));
        assert!(matches!(err, HashBenchError::NotFound(_)));

        let err = HashBenchError::io(
            "/locked",
            std::io::Error::new(ErrorKind::PermissionDenied, "nope"),
        );
        assert!(err.is_permission_error());

        let err = HashBenchError::io("/disk", std::io::Error::new(ErrorKind::Other, "bad sector"));
        assert!(matches!(err, HashBenchError::Io { .. }));
        assert_eq!(err.path().unwrap(), &PathBuf::from("/disk"));
    }

    #[test]
    fn test_read_error_keeps_kind() {
        let err = HashBenchError::read("/f", std::io::Error::new(ErrorKind::NotFound, "vanished"));
        assert!(matches!(err, HashBenchError::Io { .. }));
    }

    #[test]
    fn test_retryable() {
        let transient = HashBenchError::read("/f", std::io::Error::new(ErrorKind::Interrupted, "eintr"));
        assert!(transient.is_retryable());

        assert!(!HashBenchError::UnsupportedAlgorithm("sha999".into()).is_retryable());
        assert!(!HashBenchError::invalid("block size must be positive").is_retryable());
    }

    #[test]
    fn test_mismatch_message() {
        let err = HashBenchError::mismatch("doubling", "abc", "def");
        assert_eq!(
            err.to_string(),
            "Digest mismatch in 'doubling': expected abc, got def"
        );
    }
}
