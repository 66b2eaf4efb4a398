// Batch hashing module
// Hashes many independent files on a bounded worker pool

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use super::error::HashError;
use super::format::{self, FormattedDigest, Options};
use super::hash::HashComputer;
use super::pool;

/// Outcome of hashing one input path
#[derive(Debug)]
pub struct FileHashResult {
    pub path: PathBuf,
    pub algorithm: String,
    pub digest: Result<Vec<u8>, HashError>,
}

impl FileHashResult {
    pub fn is_ok(&self) -> bool {
        self.digest.is_ok()
    }

    pub fn error(&self) -> Option<&HashError> {
        self.digest.as_ref().err()
    }

    /// Digest bytes, empty when hashing failed
    pub fn digest_bytes(&self) -> &[u8] {
        self.digest.as_deref().unwrap_or(&[])
    }
}

/// A failed item seen through its batch result
#[derive(Debug, Clone, Copy)]
pub struct BatchError<'a> {
    pub path: &'a Path,
    pub error: &'a HashError,
}

impl fmt::Display for BatchError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// One result per input path, in completion order
#[derive(Debug, Default)]
pub struct BatchHashResult {
    pub results: Vec<FileHashResult>,
}

impl BatchHashResult {
    /// Failed items, borrowed from `results`
    pub fn errors(&self) -> Vec<BatchError<'_>> {
        self.results
            .iter()
            .filter_map(|result| {
                result.error().map(|error| BatchError {
                    path: &result.path,
                    error,
                })
            })
            .collect()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &FileHashResult> {
        self.results.iter().filter(|result| result.is_ok())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Outcome of hashing and formatting one input path
#[derive(Debug)]
pub struct FormattedFileResult {
    pub path: PathBuf,
    pub algorithm: String,
    pub digest: Result<FormattedDigest, HashError>,
}

#[derive(Debug, Default)]
pub struct FormattedBatchResult {
    pub results: Vec<FormattedFileResult>,
}

impl FormattedBatchResult {
    pub fn errors(&self) -> Vec<BatchError<'_>> {
        self.results
            .iter()
            .filter_map(|result| {
                result.digest.as_ref().err().map(|error| BatchError {
                    path: &result.path,
                    error,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Progress information emitted after each finished file
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub path: PathBuf,
    pub failed: bool,
}

/// Type alias for progress callback function
pub type ProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;

/// Hashes or validates many files concurrently
#[derive(Clone, Default)]
pub struct BatchProcessor {
    computer: HashComputer,
    progress_callback: Option<ProgressCallback>,
}

impl BatchProcessor {
    pub fn new(computer: HashComputer) -> Self {
        Self {
            computer,
            progress_callback: None,
        }
    }

    /// Set a progress callback function
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(BatchProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn computer(&self) -> &HashComputer {
        &self.computer
    }

    /// Hash every path on `workers` threads (0 means one per CPU)
    ///
    /// A failing file is recorded in its own result and never stops the others.
    pub fn hash_files_in_parallel(
        &self,
        paths: &[PathBuf],
        algorithm: &str,
        workers: usize,
    ) -> BatchHashResult {
        let algorithm = algorithm.to_lowercase();
        let results = self.run_tracked(
            paths.to_vec(),
            workers,
            |path| {
                let digest = self.computer.hash_file(&path, &algorithm);
                if let Err(ref e) = digest {
                    debug!(path = %path.display(), error = %e, "failed to hash file");
                }
                FileHashResult {
                    path,
                    algorithm: algorithm.clone(),
                    digest,
                }
            },
            |result: &FileHashResult| (result.path.clone(), !result.is_ok()),
        );

        let batch = BatchHashResult { results };
        info!(
            files = batch.len(),
            failed = batch.errors().len(),
            algorithm = %algorithm,
            "batch hash complete"
        );
        batch
    }

    /// Same pooled computation, then every success is rendered per the options
    pub fn hash_files_in_parallel_with_options(
        &self,
        paths: &[PathBuf],
        algorithm: &str,
        options: &Options,
    ) -> FormattedBatchResult {
        let batch = self.hash_files_in_parallel(paths, algorithm, options.workers);
        let results = batch
            .results
            .into_iter()
            .map(|result| FormattedFileResult {
                digest: result
                    .digest
                    .map(|bytes| format::format_digest(bytes, &result.algorithm, options)),
                path: result.path,
                algorithm: result.algorithm,
            })
            .collect();
        FormattedBatchResult { results }
    }

    /// Run items through the pool, reporting progress after each one
    pub(crate) fn run_tracked<T, R, W, D>(
        &self,
        items: Vec<T>,
        workers: usize,
        work: W,
        describe: D,
    ) -> Vec<R>
    where
        T: Send,
        R: Send,
        W: Fn(T) -> R + Sync,
        D: Fn(&R) -> (PathBuf, bool) + Sync,
    {
        let total = items.len();
        let completed = AtomicUsize::new(0);
        let callback = self.progress_callback.as_ref();

        pool::run(items, workers, work, |result| {
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(callback) = callback {
                let (path, failed) = describe(result);
                callback(BatchProgress {
                    completed: done,
                    total,
                    path,
                    failed,
                });
            }
        })
    }
}

// Tests live in tests/hash/batch_tests.rs
