// Incremental hasher
// Owns one digest state plus the algorithm name it was created with

use std::fmt;
use std::io;

use super::algorithm::Hasher;
use super::error::Result;
use super::format::{self, OutputFormat};
use super::registry::HashRegistry;

/// Stateful digest wrapper with write/sum/reset semantics
///
/// Sums are snapshots: taking one does not end the computation, and two sums
/// without an intervening write return the same bytes.
pub struct IncrementalHasher {
    algorithm: String,
    digest: Box<dyn Hasher>,
}

impl IncrementalHasher {
    /// Create a hasher through the process-wide registry
    pub fn new(algorithm: &str) -> Result<Self> {
        HashRegistry::global().new_hasher(algorithm)
    }

    pub(crate) fn from_parts(algorithm: String, digest: Box<dyn Hasher>) -> Self {
        Self { algorithm, digest }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn output_size(&self) -> usize {
        self.digest.output_size()
    }

    pub fn write(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    pub fn sum_raw(&self) -> Vec<u8> {
        self.digest.sum()
    }

    pub fn sum_hex(&self) -> String {
        format::encode(&self.digest.sum(), OutputFormat::Hex)
    }

    pub fn sum_base64(&self) -> String {
        format::encode(&self.digest.sum(), OutputFormat::Base64)
    }

    pub fn reset(&mut self) {
        self.digest.reset();
    }
}

impl io::Write for IncrementalHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.digest.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for IncrementalHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalHasher")
            .field("algorithm", &self.algorithm)
            .field("output_size", &self.digest.output_size())
            .finish()
    }
}
