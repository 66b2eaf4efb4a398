// Built-in digest algorithms
// Wraps the RustCrypto, BLAKE3 and XXH3 implementations behind one trait

use std::fmt;
use std::str::FromStr;

use sha2::Digest;
use xxhash_rust::xxh3::Xxh3;

use super::error::HashError;

/// Incremental digest state produced by a registry factory
///
/// `sum` must not consume or disturb the state: callers may keep writing
/// after taking a snapshot.
pub trait Hasher: Send {
    /// Feed more bytes into the digest
    fn update(&mut self, data: &[u8]);

    /// Digest of everything written so far
    fn sum(&self) -> Vec<u8>;

    /// Return to the algorithm's initial state
    fn reset(&mut self);

    /// Get the output size in bytes
    fn output_size(&self) -> usize;
}

/// Adapter for every RustCrypto `Digest` implementation
pub struct DigestWrapper<D>(D);

impl<D: Digest + Clone + Send> DigestWrapper<D> {
    pub fn new() -> Self {
        Self(D::new())
    }
}

impl<D: Digest + Clone + Send> Default for DigestWrapper<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest + Clone + Send> Hasher for DigestWrapper<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.clone().finalize().to_vec()
    }

    fn reset(&mut self) {
        self.0 = D::new();
    }

    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

// BLAKE3 wrapper
//
// update_rayon spreads large inputs across the rayon pool; small writes
// take the sequential path inside the blake3 crate.
pub struct Blake3Wrapper(blake3::Hasher);

impl Hasher for Blake3Wrapper {
    fn update(&mut self, data: &[u8]) {
        if data.len() >= BLAKE3_RAYON_THRESHOLD {
            self.0.update_rayon(data);
        } else {
            self.0.update(data);
        }
    }

    fn sum(&self) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn reset(&mut self) {
        self.0.reset();
    }

    fn output_size(&self) -> usize {
        blake3::OUT_LEN
    }
}

const BLAKE3_RAYON_THRESHOLD: usize = 128 * 1024;

// XXH3 wrapper (64-bit non-cryptographic hash)
pub struct Xxh3Wrapper(Xxh3);

impl Hasher for Xxh3Wrapper {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.digest().to_be_bytes().to_vec()
    }

    fn reset(&mut self) {
        self.0.reset();
    }

    fn output_size(&self) -> usize {
        8
    }
}

// XXH128 wrapper (128-bit non-cryptographic hash)
pub struct Xxh128Wrapper(Xxh3);

impl Hasher for Xxh128Wrapper {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.digest128().to_be_bytes().to_vec()
    }

    fn reset(&mut self) {
        self.0.reset();
    }

    fn output_size(&self) -> usize {
        16
    }
}

/// Closed set of algorithms available without registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_512,
    Blake2b,
    Blake2s,
    Blake3,
    Xxh3,
    Xxh128,
}

impl Algorithm {
    pub const ALL: [Algorithm; 13] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha3_256,
        Algorithm::Sha3_512,
        Algorithm::Blake2b,
        Algorithm::Blake2s,
        Algorithm::Blake3,
        Algorithm::Xxh3,
        Algorithm::Xxh128,
    ];

    /// Look up a built-in by (already lower-cased) name or alias
    pub fn from_name(name: &str) -> Option<Self> {
        let algorithm = match name {
            "md5" => Algorithm::Md5,
            "sha1" | "sha-1" => Algorithm::Sha1,
            "sha224" | "sha-224" => Algorithm::Sha224,
            "sha256" | "sha-256" => Algorithm::Sha256,
            "sha384" | "sha-384" => Algorithm::Sha384,
            "sha512" | "sha-512" => Algorithm::Sha512,
            "sha3-256" | "sha3_256" => Algorithm::Sha3_256,
            "sha3-512" | "sha3_512" => Algorithm::Sha3_512,
            "blake2b" | "blake2b-512" => Algorithm::Blake2b,
            "blake2s" | "blake2s-256" => Algorithm::Blake2s,
            "blake3" => Algorithm::Blake3,
            "xxh3" => Algorithm::Xxh3,
            "xxh128" => Algorithm::Xxh128,
            _ => return None,
        };
        Some(algorithm)
    }

    /// Canonical lower-case name
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
            Algorithm::Sha3_256 => "sha3-256",
            Algorithm::Sha3_512 => "sha3-512",
            Algorithm::Blake2b => "blake2b",
            Algorithm::Blake2s => "blake2s",
            Algorithm::Blake3 => "blake3",
            Algorithm::Xxh3 => "xxh3",
            Algorithm::Xxh128 => "xxh128",
        }
    }

    /// Fresh digest state for this algorithm
    pub fn new_hasher(self) -> Box<dyn Hasher> {
        match self {
            Algorithm::Md5 => Box::new(DigestWrapper::<md5::Md5>::new()),
            Algorithm::Sha1 => Box::new(DigestWrapper::<sha1::Sha1>::new()),
            Algorithm::Sha224 => Box::new(DigestWrapper::<sha2::Sha224>::new()),
            Algorithm::Sha256 => Box::new(DigestWrapper::<sha2::Sha256>::new()),
            Algorithm::Sha384 => Box::new(DigestWrapper::<sha2::Sha384>::new()),
            Algorithm::Sha512 => Box::new(DigestWrapper::<sha2::Sha512>::new()),
            Algorithm::Sha3_256 => Box::new(DigestWrapper::<sha3::Sha3_256>::new()),
            Algorithm::Sha3_512 => Box::new(DigestWrapper::<sha3::Sha3_512>::new()),
            Algorithm::Blake2b => Box::new(DigestWrapper::<blake2::Blake2b512>::new()),
            Algorithm::Blake2s => Box::new(DigestWrapper::<blake2::Blake2s256>::new()),
            Algorithm::Blake3 => Box::new(Blake3Wrapper(blake3::Hasher::new())),
            Algorithm::Xxh3 => Box::new(Xxh3Wrapper(Xxh3::new())),
            Algorithm::Xxh128 => Box::new(Xxh128Wrapper(Xxh3::new())),
        }
    }

    pub fn output_bits(self) -> usize {
        match self {
            Algorithm::Xxh3 => 64,
            Algorithm::Md5 | Algorithm::Xxh128 => 128,
            Algorithm::Sha1 => 160,
            Algorithm::Sha224 => 224,
            Algorithm::Sha256 | Algorithm::Sha3_256 | Algorithm::Blake2s | Algorithm::Blake3 => 256,
            Algorithm::Sha384 => 384,
            Algorithm::Sha512 | Algorithm::Sha3_512 | Algorithm::Blake2b => 512,
        }
    }

    /// Kept for compatibility and fingerprinting only
    pub fn is_insecure(self) -> bool {
        matches!(self, Algorithm::Md5 | Algorithm::Sha1)
    }

    pub fn is_cryptographic(self) -> bool {
        !matches!(self, Algorithm::Xxh3 | Algorithm::Xxh128)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::from_name(&s.to_lowercase()).ok_or_else(|| HashError::UnsupportedAlgorithm {
            algorithm: s.to_string(),
        })
    }
}
