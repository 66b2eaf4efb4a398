// Centralized error handling module
// Every engine operation reports failures through HashError

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for the hashing engine
/// Messages carry the offending path (when there is one) and a suggestion line
#[derive(Debug, Error)]
pub enum HashError {
    /// Algorithm name matched neither a built-in nor a registered factory
    #[error("Unsupported hash algorithm: {algorithm}\nSuggestion: Use `hashkit list` to see available algorithms")]
    UnsupportedAlgorithm { algorithm: String },

    /// Output format is not one of raw/hex/base64
    #[error("Invalid output format: {format}\nSuggestion: Use one of hex, base64 or raw")]
    InvalidFormat { format: String },

    /// Expected checksum could not be decoded
    #[error("Invalid checksum '{expected}': {reason}\nSuggestion: Provide a hex digest, optionally prefixed with '<algorithm>:'")]
    InvalidHashFormat { expected: String, reason: String },

    /// Digest was computed but differs from the expected value
    #[error("Checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// I/O or container parsing failure while computing a digest
    #[error("Failed {operation} {}: {source}\nSuggestion: {}", display_path(.path), suggestion(.source))]
    HashingFailed {
        path: Option<PathBuf>,
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Command line input that cannot be turned into engine calls
    #[error("Invalid arguments: {message}\nSuggestion: Run with --help to see usage information")]
    InvalidArguments { message: String },

    /// Configuration file missing or malformed
    #[error("Configuration error in {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, HashError>;

impl HashError {
    /// Wrap an io::Error with the operation that failed and the path involved
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<&Path>) -> Self {
        HashError::HashingFailed {
            path: path.map(Path::to_path_buf),
            operation: operation.to_string(),
            source: err,
        }
    }

    /// Path the failure refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            HashError::ChecksumMismatch { path, .. } | HashError::Config { path, .. } => Some(path),
            HashError::HashingFailed { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// True for failures that happened while reading input rather than comparing it
    pub fn is_hashing_failure(&self) -> bool {
        matches!(self, HashError::HashingFailed { .. })
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("for {}", p.display()),
        None => "for <input>".to_string(),
    }
}

fn suggestion(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound => "Check that the path is correct and the file exists",
        io::ErrorKind::PermissionDenied => "Check file permissions or run with appropriate privileges",
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            "Check that the file is readable and not corrupted"
        }
        _ => "Check that the file is readable",
    }
}
