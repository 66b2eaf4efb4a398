// Path normalization utilities for cross-platform path handling
// Composite digests key entries by '/'-separated relative paths so the
// result does not depend on the platform separator

use std::path::{Component, Path, PathBuf};

/// Build the composite-digest key for a path relative to the collection root
///
/// Components are joined with '/' on every platform. Non-UTF-8 components are
/// converted lossily.
pub fn entry_key(relative: &Path) -> String {
    let mut key = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(&part.to_string_lossy());
        }
    }
    key
}

/// Normalize a path string by handling both forward and backward slashes
/// Converts all path separators to the platform-specific separator
pub fn normalize_path_string(path_str: &str) -> String {
    if cfg!(windows) {
        path_str.replace('/', "\\")
    } else {
        path_str.replace('\\', "/")
    }
}

/// Parse a path from a checksum manifest line, handling mixed separators
pub fn parse_manifest_path(path_str: &str) -> PathBuf {
    PathBuf::from(normalize_path_string(path_str))
}

/// Resolve a manifest path against the manifest's directory
/// Absolute paths are kept as-is
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        clean_path(&base_dir.join(path))
    }
}

/// Clean a path by removing redundant components like "." and ".."
/// This provides a normalized form without requiring the path to exist
pub fn clean_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                    continue;
                }
                components.push(component);
            }
            _ => components.push(component),
        }
    }

    let result: PathBuf = components.into_iter().collect();
    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}
