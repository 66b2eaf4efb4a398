// Hashing engine
// Algorithm registry, incremental and one-shot hashing, output formatting,
// composite (directory/archive) digests, batch hashing and validation

pub mod algorithm;
pub mod batch;
pub mod composite;
pub mod error;
pub mod format;
pub mod hash;
pub mod hasher;
pub mod path_utils;
pub mod pool;
pub mod registry;
pub mod verify;
pub mod wildcard;

// Re-export commonly used types for convenience
pub use algorithm::{Algorithm, Hasher};
pub use batch::{
    BatchError, BatchHashResult, BatchProcessor, BatchProgress, FileHashResult,
    FormattedBatchResult, FormattedFileResult,
};
pub use composite::{ArchiveKind, CompositeHasher};
pub use error::{HashError, Result};
pub use format::{FormattedDigest, Options, OutputFormat, format_digest};
pub use hash::{HashComputer, HashResult};
pub use hasher::IncrementalHasher;
pub use registry::{AlgorithmInfo, DigestFactory, HashRegistry};
pub use verify::{ChecksumValidator, FileChecksum, ValidationFailure};

use std::io::Read;
use std::path::{Path, PathBuf};

// Convenience entry points over the process-wide registry

pub fn hash_bytes(data: &[u8], algorithm: &str) -> Result<Vec<u8>> {
    HashComputer::new().hash_bytes(data, algorithm)
}

pub fn hash_string(text: &str, algorithm: &str) -> Result<Vec<u8>> {
    HashComputer::new().hash_string(text, algorithm)
}

pub fn hash_reader<R: Read>(reader: R, algorithm: &str) -> Result<Vec<u8>> {
    HashComputer::new().hash_reader(reader, algorithm)
}

pub fn hash_file(path: &Path, algorithm: &str) -> Result<Vec<u8>> {
    HashComputer::new().hash_file(path, algorithm)
}

pub fn hash_dir(root: &Path, algorithm: &str, recursive: bool) -> Result<Vec<u8>> {
    CompositeHasher::default().hash_dir(root, algorithm, recursive)
}

pub fn hash_archive_file(path: &Path, algorithm: &str) -> Result<Vec<u8>> {
    CompositeHasher::default().hash_archive_file(path, algorithm)
}

pub fn hash_files_in_parallel(paths: &[PathBuf], algorithm: &str, workers: usize) -> BatchHashResult {
    BatchProcessor::default().hash_files_in_parallel(paths, algorithm, workers)
}

pub fn hash_files_in_parallel_with_options(
    paths: &[PathBuf],
    algorithm: &str,
    options: &Options,
) -> FormattedBatchResult {
    BatchProcessor::new(HashComputer::new().with_buffer_size(options.buffer_size))
        .hash_files_in_parallel_with_options(paths, algorithm, options)
}

pub fn validate_file_checksum(path: &Path, expected_hash: &str, algorithm: &str) -> Result<()> {
    ChecksumValidator::default().validate_file_checksum(path, expected_hash, algorithm)
}

pub fn validate_files_in_parallel(
    checksums: &[FileChecksum],
    algorithm: &str,
    workers: usize,
) -> Vec<ValidationFailure> {
    ChecksumValidator::default().validate_files_in_parallel(checksums, algorithm, workers)
}
