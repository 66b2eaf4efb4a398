// Tests for utility modules: wildcard, path_utils

use std::fs;
use std::path::{Path, PathBuf};

use hashkit::hash::HashError;
use hashkit::hash::path_utils::{clean_path, entry_key, normalize_path_string, resolve_path};
use hashkit::hash::wildcard::{contains_wildcard, expand_pattern, expand_patterns};
use tempfile::tempdir;

// ============ Wildcard Tests ============

#[test]
fn test_contains_wildcard() {
    assert!(contains_wildcard("*.txt"));
    assert!(contains_wildcard("file?.bin"));
    assert!(contains_wildcard("[ab].rs"));
    assert!(!contains_wildcard("plain/file.txt"));
}

#[test]
fn test_expand_pattern_no_wildcard() {
    let result = expand_pattern("file.txt").unwrap();
    assert_eq!(result, vec![PathBuf::from("file.txt")]);
}

#[test]
fn test_expand_pattern_no_matches() {
    let dir = tempdir().unwrap();
    let pattern = dir.path().join("nonexistent*.txt").to_string_lossy().to_string();
    match expand_pattern(&pattern) {
        Err(HashError::InvalidArguments { message }) => assert!(message.contains("No files match pattern")),
        other => panic!("Expected InvalidArguments error, got {other:?}"),
    }
}

#[test]
fn test_expand_pattern_with_matches_skips_directories() {
    let dir = tempdir().unwrap();
    for name in ["test_wildcard_2.txt", "test_wildcard_1.txt", "test_wildcard_3.txt"] {
        fs::write(dir.path().join(name), b"test").unwrap();
    }
    fs::create_dir(dir.path().join("test_wildcard_dir.txt")).unwrap();

    let pattern = dir.path().join("test_wildcard_*.txt").to_string_lossy().to_string();
    let result = expand_pattern(&pattern).unwrap();

    assert_eq!(
        result,
        vec![
            dir.path().join("test_wildcard_1.txt"),
            dir.path().join("test_wildcard_2.txt"),
            dir.path().join("test_wildcard_3.txt"),
        ]
    );
}

#[test]
fn test_expand_patterns_deduplicates() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, b"a").unwrap();

    let literal = file.to_string_lossy().to_string();
    let pattern = dir.path().join("*.txt").to_string_lossy().to_string();
    let result = expand_patterns(&[literal, pattern]).unwrap();
    assert_eq!(result, vec![file]);
}

// ============ Path Utils Tests ============

#[test]
fn test_entry_key_uses_forward_slashes() {
    let relative: PathBuf = ["dir", "sub", "file.txt"].iter().collect();
    assert_eq!(entry_key(&relative), "dir/sub/file.txt");
    assert_eq!(entry_key(Path::new("./top.txt")), "top.txt");
}

#[test]
fn test_normalize_path_string_backward_slash() {
    let result = normalize_path_string("path\\to\\file.txt");
    if cfg!(windows) {
        assert_eq!(result, "path\\to\\file.txt");
    } else {
        assert_eq!(result, "path/to/file.txt");
    }
}

#[cfg(unix)]
#[test]
fn test_resolve_path_relative() {
    let result = resolve_path(Path::new("subdir/file.txt"), Path::new("/base/dir"));
    assert_eq!(result, PathBuf::from("/base/dir/subdir/file.txt"));

    let absolute = resolve_path(Path::new("/etc/hosts"), Path::new("/base/dir"));
    assert_eq!(absolute, PathBuf::from("/etc/hosts"));
}

#[test]
fn test_clean_path() {
    assert_eq!(clean_path(Path::new("./path/./to/./file.txt")), PathBuf::from("path/to/file.txt"));
    assert_eq!(clean_path(Path::new("path/to/../file.txt")), PathBuf::from("path/file.txt"));
}
