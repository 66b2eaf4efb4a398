// Hash algorithm registry
// Resolves case-insensitive algorithm names to digest factories

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::{debug, warn};

use super::algorithm::{Algorithm, Hasher};
use super::error::{HashError, Result};
use super::hasher::IncrementalHasher;

/// Zero-argument constructor for a fresh, independent digest state
pub type DigestFactory = Arc<dyn Fn() -> Box<dyn Hasher> + Send + Sync>;

/// Information about a hash algorithm
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlgorithmInfo {
    pub name: String,
    pub output_bits: usize,
    pub cryptographic: bool,
    pub insecure: bool,
    pub builtin: bool,
}

/// Registry for hash algorithms
///
/// Built-ins always win lookup; custom factories are consulted only when the
/// built-in set misses. Lookups share a read lock, registration takes the
/// write lock.
pub struct HashRegistry {
    custom: RwLock<HashMap<String, DigestFactory>>,
}

static GLOBAL: OnceLock<Arc<HashRegistry>> = OnceLock::new();

impl HashRegistry {
    pub fn new() -> Self {
        Self {
            custom: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide default instance for call sites that do not inject one
    pub fn global() -> Arc<HashRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(HashRegistry::new())))
    }

    /// Register a custom factory, replacing any previous one under the same name
    pub fn register<F>(&self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Hasher> + Send + Sync + 'static,
    {
        let key = name.to_lowercase();
        if Algorithm::from_name(&key).is_some() {
            warn!(algorithm = %key, "custom factory registered under a built-in name; the built-in keeps precedence");
        }
        let mut custom = self.custom.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if custom.insert(key.clone(), Arc::new(factory)).is_some() {
            debug!(algorithm = %key, "replaced custom digest factory");
        }
    }

    /// Resolve a name to a factory
    pub fn resolve(&self, name: &str) -> Result<DigestFactory> {
        let key = name.to_lowercase();
        if let Some(algorithm) = Algorithm::from_name(&key) {
            return Ok(Arc::new(move || algorithm.new_hasher()));
        }
        self.lookup_custom(&key)
            .ok_or_else(|| HashError::UnsupportedAlgorithm {
                algorithm: name.to_string(),
            })
    }

    /// Create a fresh digest state for the named algorithm
    pub fn new_digest(&self, name: &str) -> Result<Box<dyn Hasher>> {
        let key = name.to_lowercase();
        if let Some(algorithm) = Algorithm::from_name(&key) {
            return Ok(algorithm.new_hasher());
        }
        match self.lookup_custom(&key) {
            Some(factory) => Ok(factory()),
            None => Err(HashError::UnsupportedAlgorithm {
                algorithm: name.to_string(),
            }),
        }
    }

    /// Wrap a fresh digest state in an IncrementalHasher
    pub fn new_hasher(&self, name: &str) -> Result<IncrementalHasher> {
        let digest = self.new_digest(name)?;
        Ok(IncrementalHasher::from_parts(name.to_lowercase(), digest))
    }

    pub fn is_supported(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        Algorithm::from_name(&key).is_some() || self.lookup_custom(&key).is_some()
    }

    /// List built-in algorithms followed by custom registrations (sorted)
    pub fn list_algorithms(&self) -> Vec<AlgorithmInfo> {
        let mut infos: Vec<AlgorithmInfo> = Algorithm::ALL
            .iter()
            .map(|algorithm| AlgorithmInfo {
                name: algorithm.name().to_string(),
                output_bits: algorithm.output_bits(),
                cryptographic: algorithm.is_cryptographic(),
                insecure: algorithm.is_insecure(),
                builtin: true,
            })
            .collect();

        let custom = self.custom.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<&String> = custom
            .keys()
            .filter(|name| Algorithm::from_name(name).is_none())
            .collect();
        names.sort();
        for name in names {
            let output_size = custom[name]().output_size();
            infos.push(AlgorithmInfo {
                name: name.clone(),
                output_bits: output_size * 8,
                cryptographic: false,
                insecure: false,
                builtin: false,
            });
        }
        infos
    }

    fn lookup_custom(&self, key: &str) -> Option<DigestFactory> {
        let custom = self.custom.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        custom.get(key).cloned()
    }
}

impl Default for HashRegistry {
    fn default() -> Self {
        Self::new()
    }
}
