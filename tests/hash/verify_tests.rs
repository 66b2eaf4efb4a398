// Tests for checksum validation
// Single-file checks, batch checks and manifest loading

use std::fs;
use std::path::{Path, PathBuf};

use hashkit::hash::verify::load_checksum_list;
use hashkit::hash::{self, FileChecksum, HashError};
use tempfile::tempdir;

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
const WORLD_SHA256: &str = "486ea46224d1bb4fb680f34f7c9ad96a8f24ec88be73ea8e5a6c65260e9cb8a7";

fn create_test_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// Flip one hex digit without changing the length
fn mutate(hex_digest: &str) -> String {
    let mut chars: Vec<char> = hex_digest.chars().collect();
    chars[10] = if chars[10] == '0' { '1' } else { '0' };
    chars.into_iter().collect()
}

#[test]
fn test_validate_accepts_computed_digest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.txt");
    create_test_file(&path, b"hello");

    for algorithm in ["md5", "sha256", "blake2s", "xxh128"] {
        let digest = hex::encode(hash::hash_file(&path, algorithm).unwrap());
        hash::validate_file_checksum(&path, &digest, algorithm).unwrap();
        hash::validate_file_checksum(&path, &digest.to_uppercase(), algorithm).unwrap();
    }
}

#[test]
fn test_validate_accepts_prefixed_expected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.txt");
    create_test_file(&path, b"hello");

    hash::validate_file_checksum(&path, &format!("sha256:{HELLO_SHA256}"), "sha256").unwrap();
    hash::validate_file_checksum(&path, &format!("SHA256:{HELLO_SHA256}\n"), "SHA256").unwrap();
}

#[test]
fn test_single_digit_change_is_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.txt");
    create_test_file(&path, b"hello");

    let tampered = mutate(HELLO_SHA256);
    match hash::validate_file_checksum(&path, &tampered, "sha256") {
        Err(HashError::ChecksumMismatch { path: p, expected, actual }) => {
            assert_eq!(p, path);
            assert_eq!(expected, tampered);
            assert_eq!(actual, HELLO_SHA256);
        }
        other => panic!("Expected ChecksumMismatch, got {other:?}"),
    }
}

#[test]
fn test_short_expected_is_invalid_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.txt");
    create_test_file(&path, b"hello");

    assert!(matches!(
        hash::validate_file_checksum(&path, "0000", "sha256"),
        Err(HashError::InvalidHashFormat { .. })
    ));
}

#[test]
fn test_non_hex_expected_is_invalid_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.txt");
    create_test_file(&path, b"hello");

    let mut bad = HELLO_SHA256.to_string();
    bad.replace_range(0..1, "g");
    assert!(matches!(
        hash::validate_file_checksum(&path, &bad, "sha256"),
        Err(HashError::InvalidHashFormat { .. })
    ));
}

#[test]
fn test_validate_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    assert!(matches!(
        hash::validate_file_checksum(&path, HELLO_SHA256, "sha256"),
        Err(HashError::HashingFailed { .. })
    ));
}

#[test]
fn test_validate_files_in_parallel_reports_only_failures() {
    let dir = tempdir().unwrap();
    let hello = dir.path().join("file1.txt");
    let world = dir.path().join("file2.txt");
    create_test_file(&hello, b"hello");
    create_test_file(&world, b"world");

    let checksums = vec![
        FileChecksum::new(&hello, HELLO_SHA256),
        FileChecksum::new(&world, WORLD_SHA256),
        FileChecksum::new(dir.path().join("file3.txt"), WORLD_SHA256),
        FileChecksum::new(&world, mutate(WORLD_SHA256)),
    ];

    for workers in [0, 1, 3] {
        let failures = hash::validate_files_in_parallel(&checksums, "sha256", workers);
        assert_eq!(failures.len(), 2, "workers = {workers}");
        assert!(failures.iter().any(|f| matches!(f.error, HashError::HashingFailed { .. })));
        assert!(failures.iter().any(|f| f.path == world && matches!(f.error, HashError::ChecksumMismatch { .. })));
    }
}

#[test]
fn test_validate_all_matching() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..8).map(|i| dir.path().join(format!("f{i}"))).collect();
    let checksums: Vec<FileChecksum> = paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            create_test_file(path, format!("payload {i}").as_bytes());
            FileChecksum::new(path, hex::encode(hash::hash_file(path, "sha3-256").unwrap()))
        })
        .collect();

    assert!(hash::validate_files_in_parallel(&checksums, "sha3-256", 4).is_empty());
}

#[test]
fn test_load_checksum_list_resolves_relative_paths() {
    let dir = tempdir().unwrap();
    create_test_file(&dir.path().join("file1.txt"), b"hello");
    create_test_file(&dir.path().join("sub/file2.txt"), b"world");

    let manifest = dir.path().join("SHA256SUMS");
    fs::write(
        &manifest,
        format!("# checksums\n{HELLO_SHA256}  file1.txt\n{WORLD_SHA256} *sub/../sub/file2.txt\n"),
    )
    .unwrap();

    let checksums = load_checksum_list(&manifest).unwrap();
    assert_eq!(checksums.len(), 2);
    assert_eq!(checksums[0].path, dir.path().join("file1.txt"));
    assert_eq!(checksums[1].path, dir.path().join("sub").join("file2.txt"));
    assert!(hash::validate_files_in_parallel(&checksums, "sha256", 0).is_empty());
}

#[test]
fn test_load_missing_checksum_list() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("nope.sums");
    match load_checksum_list(&manifest) {
        Err(e @ HashError::HashingFailed { .. }) => assert_eq!(e.path(), Some(manifest.as_path())),
        other => panic!("Expected HashingFailed, got {other:?}"),
    }
}
