//! In-process backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::StorageBackend;
use crate::error::{Result, StoreError};

/// Map-backed storage for ephemeral sessions and tests.
///
/// An optional byte quota mimics browser storage limits: a write that would
/// push the total above it fails with [`StoreError::QuotaExceeded`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(quota),
        }
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        reason: "memory backend lock poisoned".to_string(),
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(_, blob)| blob.len())
                .sum();
            let available = quota.saturating_sub(used);
            if bytes.len() > available {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    requested: bytes.len(),
                    available,
                });
            }
        }
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read("a").unwrap(), None);
        backend.write("a", b"1").unwrap();
        assert_eq!(backend.read("a").unwrap(), Some(b"1".to_vec()));
        backend.remove("a").unwrap();
        backend.remove("a").unwrap();
        assert_eq!(backend.read("a").unwrap(), None);
    }

    #[test]
    fn test_quota_counts_overwrites_once() {
        let backend = MemoryBackend::with_quota(8);
        backend.write("a", b"12345").unwrap();
        backend.write("a", b"1234567").unwrap();
        let err = backend.write("b", b"12").unwrap_err();
        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                available: 1,
                requested: 2,
                ..
            }
        ));
        assert_eq!(backend.used_bytes(), 7);
    }

    #[test]
    fn test_keys_filter_by_prefix() {
        let backend = MemoryBackend::new();
        backend.write("page/b", b"").unwrap();
        backend.write("page/a", b"").unwrap();
        backend.write("manifest", b"").unwrap();
        assert_eq!(backend.keys("page/").unwrap(), vec!["page/a", "page/b"]);
    }
}
