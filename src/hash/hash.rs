// Hash computation module
// One-shot helpers for strings, byte buffers, readers and files

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use tracing::debug;

use super::algorithm::Hasher;
use super::error::{HashError, Result};
use super::format::{self, DEFAULT_BUFFER_SIZE, FormattedDigest, Options};
use super::registry::HashRegistry;

// Files in this size range are memory mapped instead of read through a buffer
const MMAP_THRESHOLD: u64 = 2 * 1024 * 1024 * 1024; // 2GB

/// Result of a hash computation under one algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashResult {
    pub algorithm: String,
    pub digest: Vec<u8>,
}

impl HashResult {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

/// Hash computer with streaming I/O
///
/// Carries no state between calls besides the registry handle and buffer size,
/// so one instance can be shared by any number of threads.
#[derive(Clone)]
pub struct HashComputer {
    registry: Arc<HashRegistry>,
    buffer_size: usize,
    use_mmap: bool,
}

impl HashComputer {
    /// Create a HashComputer over the process-wide registry
    pub fn new() -> Self {
        Self::with_registry(HashRegistry::global())
    }

    pub fn with_registry(registry: Arc<HashRegistry>) -> Self {
        Self {
            registry,
            buffer_size: DEFAULT_BUFFER_SIZE,
            use_mmap: true,
        }
    }

    /// Set the read buffer size (a zero size falls back to the default)
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = if buffer_size == 0 { DEFAULT_BUFFER_SIZE } else { buffer_size };
        self
    }

    /// Disable memory mapping, forcing buffered reads for every file
    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn registry(&self) -> &Arc<HashRegistry> {
        &self.registry
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn hash_bytes(&self, data: &[u8], algorithm: &str) -> Result<Vec<u8>> {
        let mut hasher = self.registry.new_digest(algorithm)?;
        hasher.update(data);
        Ok(hasher.sum())
    }

    /// Hash the UTF-8 bytes of a string
    pub fn hash_string(&self, text: &str, algorithm: &str) -> Result<Vec<u8>> {
        self.hash_bytes(text.as_bytes(), algorithm)
    }

    /// Stream a reader through the digest until EOF
    pub fn hash_reader<R: Read>(&self, reader: R, algorithm: &str) -> Result<Vec<u8>> {
        let mut hashers = [self.registry.new_digest(algorithm)?];
        self.stream_into(reader, &mut hashers, None)?;
        Ok(hashers[0].sum())
    }

    /// Hash a file, memory mapping it when possible
    pub fn hash_file(&self, path: &Path, algorithm: &str) -> Result<Vec<u8>> {
        let mut hashers = [self.registry.new_digest(algorithm)?];
        self.feed_file(path, &mut hashers)?;
        Ok(hashers[0].sum())
    }

    /// Hash a file and render the digest per the options
    pub fn hash_file_formatted(
        &self,
        path: &Path,
        algorithm: &str,
        options: &Options,
    ) -> Result<FormattedDigest> {
        let bytes = self.hash_file(path, algorithm)?;
        Ok(format::format_digest(bytes, algorithm, options))
    }

    /// Compute several digests for a single file in one read pass
    pub fn hash_file_multi(&self, path: &Path, algorithms: &[String]) -> Result<Vec<HashResult>> {
        let mut hashers = algorithms
            .iter()
            .map(|algorithm| self.registry.new_digest(algorithm))
            .collect::<Result<Vec<_>>>()?;

        self.feed_file(path, &mut hashers)?;

        Ok(algorithms
            .iter()
            .zip(hashers)
            .map(|(algorithm, hasher)| HashResult {
                algorithm: algorithm.to_lowercase(),
                digest: hasher.sum(),
            })
            .collect())
    }

    fn feed_file(&self, path: &Path, hashers: &mut [Box<dyn Hasher>]) -> Result<()> {
        let file = File::open(path)
            .map_err(|e| HashError::from_io_error(e, "opening", Some(path)))?;

        let metadata = file
            .metadata()
            .map_err(|e| HashError::from_io_error(e, "reading metadata of", Some(path)))?;
        if metadata.is_dir() {
            return Err(HashError::from_io_error(
                io::Error::new(io::ErrorKind::InvalidInput, "is a directory"),
                "reading",
                Some(path),
            ));
        }

        let file_size = metadata.len();
        if self.use_mmap && file_size > 0 && file_size < MMAP_THRESHOLD {
            // SAFETY: read-only map dropped before return; assumes the file is
            // not truncated while being hashed.
            match unsafe { Mmap::map(&file) } {
                Ok(mmap) => {
                    for hasher in hashers.iter_mut() {
                        hasher.update(&mmap[..]);
                    }
                    return Ok(());
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "mmap failed, falling back to buffered read");
                }
            }
        }

        self.stream_into(file, hashers, Some(path))
    }

    fn stream_into<R: Read>(
        &self,
        mut reader: R,
        hashers: &mut [Box<dyn Hasher>],
        path: Option<&Path>,
    ) -> Result<()> {
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io_error(e, "reading", path)),
            };
            for hasher in hashers.iter_mut() {
                hasher.update(&buffer[..bytes_read]);
            }
        }
        Ok(())
    }
}

impl Default for HashComputer {
    fn default() -> Self {
        Self::new()
    }
}

// Tests for the one-shot helpers live in tests/hash/hash_tests.rs
