// Wildcard pattern expansion module
// Turns command line file arguments into batch input paths

use std::collections::HashSet;
use std::path::PathBuf;

use super::error::{HashError, Result};

/// Check if a string contains wildcard characters
pub fn contains_wildcard(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Expand one argument into paths, sorted for stable output
///
/// Arguments without wildcard characters are returned untouched, even if the
/// file does not exist: the batch reports missing files per item.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    if !contains_wildcard(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let paths = glob::glob(pattern).map_err(|e| HashError::InvalidArguments {
        message: format!("Invalid glob pattern '{pattern}': {e}"),
    })?;

    let mut matches = paths
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| HashError::InvalidArguments {
            message: format!("Error reading glob pattern '{pattern}': {e}"),
        })?;
    matches.retain(|path| !path.is_dir());

    if matches.is_empty() {
        return Err(HashError::InvalidArguments {
            message: format!("No files match pattern '{pattern}'"),
        });
    }
    matches.sort();
    Ok(matches)
}

/// Expand every argument, dropping duplicates while keeping first-seen order
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for pattern in patterns {
        for path in expand_pattern(pattern.as_ref())? {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

// Tests live in tests/hash/utility_tests.rs
