// Composite hashing module
// Deterministic digests over directories and archives
//
// Entries are collected, sorted by name (byte-wise, then by payload) and
// folded into one running digest as `name ++ payload`. Directories contribute the digest of
// each file as payload, archives contribute the entry content itself.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::error::{HashError, Result};
use super::hash::HashComputer;
use super::path_utils;

/// Container formats understood by the archive hasher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Detect the format from the file name extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else {
            None
        }
    }
}

// Lives only for the duration of one archive digest
struct ArchiveEntry {
    name: String,
    content: Vec<u8>,
}

/// Computes one digest for a whole directory tree or archive
#[derive(Clone, Default)]
pub struct CompositeHasher {
    computer: HashComputer,
}

impl CompositeHasher {
    pub fn new(computer: HashComputer) -> Self {
        Self { computer }
    }

    /// Hash every regular file under `root`
    ///
    /// Without `recursive` only the files directly inside `root` take part and
    /// subdirectories are skipped. Any unreadable entry aborts the whole digest.
    pub fn hash_dir(&self, root: &Path, algorithm: &str, recursive: bool) -> Result<Vec<u8>> {
        let mut aggregate = self.computer.registry().new_digest(algorithm)?;

        let metadata = fs::metadata(root)
            .map_err(|e| HashError::from_io_error(e, "reading directory", Some(root)))?;
        if !metadata.is_dir() {
            return Err(HashError::from_io_error(
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
                "reading directory",
                Some(root),
            ));
        }

        let files = if recursive {
            collect_files_recursive(root)?
        } else {
            collect_files_flat(root)?
        };
        debug!(root = %root.display(), files = files.len(), recursive, "hashing directory");

        let mut digests = files
            .into_par_iter()
            .map(|(key, path)| {
                self.computer
                    .hash_file(&path, algorithm)
                    .map(|digest| (key, digest))
            })
            .collect::<Result<Vec<_>>>()?;

        // Lossy keys can collide; the digest breaks the tie
        digests.sort_unstable();

        for (key, digest) in &digests {
            aggregate.update(key.as_bytes());
            aggregate.update(digest);
        }
        Ok(aggregate.sum())
    }

    /// Hash the file entries of an archive read from `reader`
    pub fn hash_archive<R: Read + Seek>(
        &self,
        reader: R,
        kind: ArchiveKind,
        algorithm: &str,
    ) -> Result<Vec<u8>> {
        let mut aggregate = self.computer.registry().new_digest(algorithm)?;

        let mut entries = match kind {
            ArchiveKind::Zip => read_zip_entries(reader),
            ArchiveKind::Tar => read_tar_entries(reader),
            ArchiveKind::TarGz => read_tar_entries(GzDecoder::new(reader)),
        }
        .map_err(|e| HashError::from_io_error(e, "reading archive", None))?;

        // Duplicate names are ordered by content
        entries.sort_unstable_by(|a, b| {
            (a.name.as_bytes(), &a.content).cmp(&(b.name.as_bytes(), &b.content))
        });
        debug!(entries = entries.len(), ?kind, "hashing archive");

        for entry in &entries {
            aggregate.update(entry.name.as_bytes());
            aggregate.update(&entry.content);
        }
        Ok(aggregate.sum())
    }

    /// Open an archive file, detect its format and hash it
    pub fn hash_archive_file(&self, path: &Path, algorithm: &str) -> Result<Vec<u8>> {
        let kind = ArchiveKind::from_path(path).ok_or_else(|| {
            HashError::from_io_error(
                io::Error::new(io::ErrorKind::InvalidInput, "unrecognized archive extension"),
                "detecting archive format of",
                Some(path),
            )
        })?;
        let file = File::open(path)
            .map_err(|e| HashError::from_io_error(e, "opening archive", Some(path)))?;

        self.hash_archive(BufReader::new(file), kind, algorithm)
            .map_err(|e| match e {
                HashError::HashingFailed {
                    path: None,
                    operation,
                    source,
                } => HashError::HashingFailed {
                    path: Some(path.to_path_buf()),
                    operation,
                    source,
                },
                other => other,
            })
    }
}

fn collect_files_flat(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(root).map_err(|e| HashError::from_io_error(e, "reading directory", Some(root)))?;

    for entry in entries {
        let entry =
            entry.map_err(|e| HashError::from_io_error(e, "reading directory entry in", Some(root)))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| HashError::from_io_error(e, "reading file type of", Some(&path)))?;

        // Subdirectories, symlinks and special files do not take part
        if !file_type.is_file() {
            continue;
        }
        files.push((entry.file_name().to_string_lossy().into_owned(), path));
    }
    Ok(files)
}

fn collect_files_recursive(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .parallelism(Parallelism::RayonNewPool(0))
        .skip_hidden(false)
        .follow_links(false)
    {
        let entry = entry
            .map_err(|e| HashError::from_io_error(io::Error::other(e), "walking directory", Some(root)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(&path);
        files.push((path_utils::entry_key(relative), path.clone()));
    }
    Ok(files)
}

fn read_zip_entries<R: Read + Seek>(reader: R) -> io::Result<Vec<ArchiveEntry>> {
    let mut archive = zip::ZipArchive::new(reader).map_err(io::Error::other)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(io::Error::other)?;
        let name = file.name().to_string();
        if file.is_dir() || name.ends_with('/') {
            continue;
        }
        // The declared size is untrusted; let read_to_end grow the buffer
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        entries.push(ArchiveEntry { name, content });
    }
    Ok(entries)
}

fn read_tar_entries<R: Read>(reader: R) -> io::Result<Vec<ArchiveEntry>> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_type = entry.header().entry_type();
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if entry_type.is_dir() || name.ends_with('/') {
            continue;
        }
        if !entry_type.is_file() {
            warn!(name = %name, ?entry_type, "skipping non-regular tar entry");
            continue;
        }
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        entries.push(ArchiveEntry { name, content });
    }
    Ok(entries)
}
