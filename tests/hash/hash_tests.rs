// Tests for the registry, incremental hasher, one-shot helpers and formatter

use std::fs;
use std::io::Write;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hashkit::hash::algorithm::DigestWrapper;
use hashkit::hash::{
    self, FormattedDigest, HashComputer, HashError, HashRegistry, Options, OutputFormat,
    format_digest,
};
use tempfile::{NamedTempFile, tempdir};

#[test]
fn test_hash_string_known_vectors() {
    assert_eq!(
        hex::encode(hash::hash_string("", "sha256").unwrap()),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        hex::encode(hash::hash_string("hello", "sha256").unwrap()),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(
        hex::encode(hash::hash_string("hello world", "md5").unwrap()),
        "5eb63bbbe01eeed093cb22bb8f5acdc3"
    );
    assert_eq!(
        hex::encode(hash::hash_string("hello world", "sha1").unwrap()),
        "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    );
}

#[test]
fn test_hash_bytes_is_deterministic() {
    let computer = HashComputer::new();
    let data = vec![7u8; 10_000];
    for algorithm in ["md5", "sha256", "sha3-512", "blake2b", "blake3", "xxh3", "xxh128"] {
        let first = computer.hash_bytes(&data, algorithm).unwrap();
        let second = computer.hash_bytes(&data, algorithm).unwrap();
        assert_eq!(first, second, "{algorithm}");
    }
}

#[test]
fn test_registry_case_insensitivity() {
    let computer = HashComputer::new();
    let lower = computer.hash_string("abc", "sha256").unwrap();
    assert_eq!(computer.hash_string("abc", "SHA256").unwrap(), lower);
    assert_eq!(computer.hash_string("abc", "Sha256").unwrap(), lower);
}

#[test]
fn test_unsupported_algorithm_error() {
    let result = hash::hash_string("text", "invalid_algorithm");
    match result {
        Err(HashError::UnsupportedAlgorithm { algorithm }) => assert_eq!(algorithm, "invalid_algorithm"),
        _ => panic!("Expected UnsupportedAlgorithm error"),
    }
}

#[test]
fn test_injected_registry_with_custom_algorithm() {
    let registry = Arc::new(HashRegistry::new());
    registry.register("Fingerprint", || Box::new(DigestWrapper::<sha2::Sha224>::new()));
    let computer = HashComputer::with_registry(Arc::clone(&registry));

    let digest = computer.hash_string("hello", "fingerprint").unwrap();
    assert_eq!(digest.len(), 28);

    // The process-wide registry never saw the registration
    assert!(HashComputer::new().hash_string("hello", "fingerprint").is_err());
}

#[test]
fn test_hash_file_matches_hash_bytes() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"hello world").unwrap();
    file.flush().unwrap();

    let digest = hash::hash_file(file.path(), "sha256").unwrap();
    assert_eq!(
        hex::encode(digest),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
}

#[test]
fn test_buffered_and_mapped_reads_agree() {
    let mut file = NamedTempFile::new().unwrap();
    let chunk = vec![b'a'; 1024];
    for _ in 0..300 {
        file.write_all(&chunk).unwrap();
    }
    file.flush().unwrap();

    let mapped = HashComputer::new().hash_file(file.path(), "blake3").unwrap();
    let buffered = HashComputer::new()
        .with_mmap(false)
        .with_buffer_size(4096)
        .hash_file(file.path(), "blake3")
        .unwrap();
    assert_eq!(mapped, buffered);
    assert_eq!(mapped, blake3::hash(&vec![b'a'; 300 * 1024]).as_bytes().to_vec());
}

#[test]
fn test_empty_file() {
    let file = NamedTempFile::new().unwrap();
    assert_eq!(
        hex::encode(hash::hash_file(file.path(), "md5").unwrap()),
        "d41d8cd98f00b204e9800998ecf8427e"
    );
}

#[test]
fn test_hash_reader_streams_small_buffers() {
    let data = vec![42u8; 100_000];
    let computer = HashComputer::new().with_buffer_size(7);
    assert_eq!(
        computer.hash_reader(&data[..], "sha512").unwrap(),
        computer.hash_bytes(&data, "sha512").unwrap()
    );
}

#[test]
fn test_file_not_found_is_hashing_failure() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nonexistent_file.txt");
    match hash::hash_file(&missing, "sha256") {
        Err(e @ HashError::HashingFailed { .. }) => {
            assert_eq!(e.path(), Some(missing.as_path()));
            assert!(e.to_string().contains("nonexistent_file.txt"));
        }
        _ => panic!("Expected HashingFailed"),
    }
}

#[test]
fn test_hashing_a_directory_fails() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        hash::hash_file(dir.path(), "sha256"),
        Err(HashError::HashingFailed { .. })
    ));
}

#[test]
fn test_hash_file_multi_single_pass() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.bin");
    fs::write(&path, b"test data").unwrap();

    let computer = HashComputer::new();
    let algorithms = vec!["md5".to_string(), "SHA256".to_string()];
    let results = computer.hash_file_multi(&path, &algorithms).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].algorithm, "md5");
    assert_eq!(results[1].algorithm, "sha256");
    assert_eq!(results[0].digest, computer.hash_bytes(b"test data", "md5").unwrap());
    assert_eq!(results[1].to_hex(), hex::encode(computer.hash_bytes(b"test data", "sha256").unwrap()));
}

#[test]
fn test_hash_file_formatted_with_prefix() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty");
    fs::write(&path, b"").unwrap();

    let options = Options {
        format: OutputFormat::Base64,
        prefix: true,
        ..Options::default()
    };
    let out = HashComputer::new().hash_file_formatted(&path, "SHA256", &options).unwrap();
    assert_eq!(
        out,
        FormattedDigest::Base64("sha256:47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=".to_string())
    );
}

#[test]
fn test_format_round_trip() {
    let digest = hash::hash_string("round trip", "sha3-256").unwrap();

    let hex_out = format_digest(digest.clone(), "sha3-256", &Options::default());
    assert_eq!(hex::decode(hex_out.as_bytes()).unwrap(), digest);

    let b64_options = Options {
        format: OutputFormat::Base64,
        ..Options::default()
    };
    let b64_out = format_digest(digest.clone(), "sha3-256", &b64_options);
    assert_eq!(STANDARD.decode(b64_out.as_bytes()).unwrap(), digest);

    let raw_options = Options {
        format: OutputFormat::Raw,
        ..Options::default()
    };
    assert_eq!(format_digest(digest.clone(), "sha3-256", &raw_options).as_bytes(), &digest[..]);
}

#[test]
fn test_incremental_hasher_through_global_registry() {
    let mut hasher = hash::IncrementalHasher::new("Blake3").unwrap();
    hasher.write(b"hello ");
    hasher.write(b"world");
    assert_eq!(hasher.sum_raw(), blake3::hash(b"hello world").as_bytes().to_vec());
    assert_eq!(hasher.algorithm(), "blake3");
    assert_eq!(hasher.output_size(), 32);
}
