//! Filesystem backend: one file per key.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::StorageBackend;
use crate::error::{Result, StoreError};

const TEMP_SUFFIX: &str = ".tmp";

/// Longest hex run used as a single path component.
const SEGMENT_LEN: usize = 128;

/// Marks a directory holding the rest of a long key.
const SEGMENT_DIR_SUFFIX: &str = ".d";

/// Stores each blob as a file under `root`.
///
/// File names are the hex-encoded key, so arbitrary page ids never escape
/// the directory. Keys whose hex form is longer than [`SEGMENT_LEN`] are
/// split into nested `<hex>.d` directories to stay under file name limits.
/// Each write goes to its own temp file that is synced and then renamed over
/// the target, so concurrent writers and readers of one key never see a
/// half-written blob.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    /// Open (and create if needed) a storage directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: root.clone(),
            source: e,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let encoded = hex::encode(key);
        let mut path = self.root.clone();
        let mut rest = encoded.as_str();
        while rest.len() > SEGMENT_LEN {
            let (head, tail) = rest.split_at(SEGMENT_LEN);
            path.push(format!("{head}{SEGMENT_DIR_SUFFIX}"));
            rest = tail;
        }
        path.push(rest);
        path
    }
}

/// Walk `dir`, decoding file names (prefixed by the hex of enclosing
/// segment directories) back into keys.
fn collect_keys(dir: &Path, encoded: &str, prefix: &str, keys: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::Io {
        operation: "read",
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| StoreError::Io {
            operation: "read",
            path: dir.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.ends_with(TEMP_SUFFIX) {
            continue;
        }
        let is_dir = entry.file_type().is_ok_and(|kind| kind.is_dir());
        if is_dir {
            if let Some(segment) = name.strip_suffix(SEGMENT_DIR_SUFFIX)
                && is_hex(segment)
            {
                let nested = format!("{encoded}{segment}");
                collect_keys(&entry.path(), &nested, prefix, keys)?;
            }
            continue;
        }
        // Foreign files in the directory are not ours; skip them.
        let Some(key) = hex::decode(format!("{encoded}{name}"))
            .ok()
            .and_then(|raw| String::from_utf8(raw).ok())
        else {
            continue;
        };
        if key.starts_with(prefix) {
            keys.push(key);
        }
    }
    Ok(())
}

/// A long key's segment directory may be missing or shadowed by a file.
fn is_absent(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

fn is_hex(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_hexdigit())
}

impl StorageBackend for DirectoryBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(StoreError::Io {
                operation: "read",
                path,
                source: e,
            }),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let dir = path.parent().unwrap_or(&self.root).to_path_buf();
        if dir != self.root {
            fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
                operation: "create directory",
                path: dir.clone(),
                source: e,
            })?;
        }

        // Dropping the temp file on any error path below removes it.
        let mut temp = tempfile::Builder::new()
            .prefix(".")
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&dir)
            .map_err(|e| StoreError::Io {
                operation: "create",
                path: dir.clone(),
                source: e,
            })?;

        temp.write_all(bytes).map_err(|e| StoreError::Io {
            operation: "write",
            path: temp.path().to_path_buf(),
            source: e,
        })?;

        temp.as_file().sync_all().map_err(|e| StoreError::Io {
            operation: "sync",
            path: temp.path().to_path_buf(),
            source: e,
        })?;

        let temp_path = temp.path().to_path_buf();
        persist(temp, &path).map_err(|e| StoreError::AtomicWriteFailed {
            temp_path,
            target_path: path.clone(),
            source: e,
        })?;

        tracing::trace!(key, bytes = bytes.len(), "wrote blob");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if is_absent(&e) => Ok(()),
            Err(e) => Err(StoreError::Io {
                operation: "remove",
                path,
                source: e,
            }),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        collect_keys(&self.root, "", prefix, &mut keys)?;
        keys.sort();
        Ok(keys)
    }
}

fn persist(temp: NamedTempFile, path: &Path) -> std::io::Result<()> {
    temp.persist(path).map(drop).map_err(|e| e.error)
}
