// Verification module
// Compares computed digests against expected checksums

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use subtle::ConstantTimeEq;
use tracing::{debug, info};

use super::batch::BatchProcessor;
use super::error::{HashError, Result};
use super::hash::HashComputer;
use super::path_utils;

/// A file paired with the checksum it is expected to have
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileChecksum {
    pub path: PathBuf,
    /// Hex digest, optionally prefixed with "<algorithm>:"
    pub expected_hash: String,
}

impl FileChecksum {
    pub fn new(path: impl Into<PathBuf>, expected_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected_hash: expected_hash.into(),
        }
    }
}

/// A validation that did not pass
#[derive(Debug)]
pub struct ValidationFailure {
    pub path: PathBuf,
    pub error: HashError,
}

/// Engine for validating files against expected checksums
#[derive(Clone, Default)]
pub struct ChecksumValidator {
    processor: BatchProcessor,
}

impl ChecksumValidator {
    pub fn new(processor: BatchProcessor) -> Self {
        Self { processor }
    }

    fn computer(&self) -> &HashComputer {
        self.processor.computer()
    }

    /// Hash `path` and compare it with `expected_hash` in constant time
    ///
    /// A leading "<algorithm>:" on the expected value is stripped first.
    /// Undecodable hex, or a decoded length that does not match the digest
    /// length, is `InvalidHashFormat`; any other difference is `ChecksumMismatch`.
    pub fn validate_file_checksum(&self, path: &Path, expected_hash: &str, algorithm: &str) -> Result<()> {
        let actual = self.computer().hash_file(path, algorithm)?;
        let expected = decode_expected(expected_hash, algorithm)?;

        if expected.len() != actual.len() {
            return Err(HashError::InvalidHashFormat {
                expected: expected_hash.to_string(),
                reason: format!(
                    "expected {} bytes for {}, got {}",
                    actual.len(),
                    algorithm.to_lowercase(),
                    expected.len()
                ),
            });
        }

        if bool::from(expected.ct_eq(&actual)) {
            debug!(path = %path.display(), "checksum ok");
            Ok(())
        } else {
            Err(HashError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected: hex::encode(&expected),
                actual: hex::encode(&actual),
            })
        }
    }

    /// Validate many files on the shared worker pool
    ///
    /// Only failures are returned; an empty vector means every file matched.
    pub fn validate_files_in_parallel(
        &self,
        checksums: &[FileChecksum],
        algorithm: &str,
        workers: usize,
    ) -> Vec<ValidationFailure> {
        let outcomes = self.processor.run_tracked(
            checksums.to_vec(),
            workers,
            |checksum| {
                let outcome =
                    self.validate_file_checksum(&checksum.path, &checksum.expected_hash, algorithm);
                (checksum.path, outcome)
            },
            |(path, outcome): &(PathBuf, Result<()>)| (path.clone(), outcome.is_err()),
        );

        let failures: Vec<ValidationFailure> = outcomes
            .into_iter()
            .filter_map(|(path, outcome)| outcome.err().map(|error| ValidationFailure { path, error }))
            .collect();
        info!(
            files = checksums.len(),
            failed = failures.len(),
            "batch validation complete"
        );
        failures
    }
}

/// Strip an optional "<algorithm>:" prefix and hex-decode the rest
pub fn decode_expected(expected_hash: &str, algorithm: &str) -> Result<Vec<u8>> {
    let trimmed = expected_hash.trim();
    let digits = match trimmed.split_once(':') {
        Some((prefix, rest)) if prefix.eq_ignore_ascii_case(algorithm) => rest,
        _ => trimmed,
    };
    hex::decode(digits).map_err(|e| HashError::InvalidHashFormat {
        expected: expected_hash.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a coreutils-style checksum manifest
///
/// Accepts `<hex>  <path>` and `<hex> *<path>` lines; blank lines and lines
/// starting with '#' are skipped.
pub fn parse_checksum_list<R: BufRead>(reader: R) -> Result<Vec<FileChecksum>> {
    let mut checksums = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| HashError::from_io_error(e, "reading checksum list", None))?;
        // Only the line terminator is stripped; file names may end in spaces
        let entry = line.strip_suffix('\r').unwrap_or(&line).trim_start();
        if entry.trim_end().is_empty() || entry.starts_with('#') {
            continue;
        }

        let (hash, rest) = entry
            .split_once(char::is_whitespace)
            .ok_or_else(|| HashError::InvalidHashFormat {
                expected: entry.to_string(),
                reason: format!("line {line_number}: expected '<hash>  <path>'"),
            })?;
        // Exactly one mode marker: ' ' for text, '*' for binary
        let path = rest.strip_prefix([' ', '*']).unwrap_or(rest);
        if path.is_empty() {
            return Err(HashError::InvalidHashFormat {
                expected: entry.to_string(),
                reason: format!("line {line_number}: missing file path"),
            });
        }

        checksums.push(FileChecksum::new(path_utils::parse_manifest_path(path), hash));
    }
    Ok(checksums)
}

/// Load a manifest file, resolving relative entries against its directory
pub fn load_checksum_list(path: &Path) -> Result<Vec<FileChecksum>> {
    let file = File::open(path)
        .map_err(|e| HashError::from_io_error(e, "opening checksum list", Some(path)))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut checksums = parse_checksum_list(BufReader::new(file)).map_err(|e| match e {
        HashError::HashingFailed {
            path: None,
            operation,
            source,
        } => HashError::HashingFailed {
            path: Some(path.to_path_buf()),
            operation,
            source,
        },
        other => other,
    })?;
    for checksum in &mut checksums {
        checksum.path = path_utils::resolve_path(&checksum.path, base_dir);
    }
    Ok(checksums)
}
