//! In-memory storage backend.
//!
//! Used by tests and by runs that should not touch disk. An optional byte
//! quota makes writes fail the way a full disk would.

use std::collections::BTreeMap;

use hackertrace_types::error::{HackerError, Result};

use crate::Storage;

/// A key-value store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once the total stored bytes would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            quota: Some(bytes),
        }
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_excluding(key) + key.len() + value.len();
            if needed > quota {
                return Err(HackerError::Storage(format!(
                    "quota exceeded: {needed} > {quota} bytes"
                )));
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_is_none() {
        let s = MemoryStorage::new();
        assert!(s.get_item("k").unwrap().is_none());
    }

    #[test]
    fn set_then_get() {
        let mut s = MemoryStorage::new();
        s.set_item("k", "v").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn overwrite_replaces() {
        let mut s = MemoryStorage::new();
        s.set_item("k", "one").unwrap();
        s.set_item("k", "two").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn remove_item() {
        let mut s = MemoryStorage::new();
        s.set_item("k", "v").unwrap();
        s.remove_item("k").unwrap();
        assert!(s.get_item("k").unwrap().is_none());
        // Removing again is fine.
        s.remove_item("k").unwrap();
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let mut s = MemoryStorage::with_quota(10);
        s.set_item("k", "1234").unwrap();
        let err = s.set_item("k2", "123456789").unwrap_err();
        assert!(matches!(err, HackerError::Storage(_)));
        assert!(s.get_item("k2").unwrap().is_none());
    }

    #[test]
    fn quota_counts_replacement_not_sum() {
        let mut s = MemoryStorage::with_quota(10);
        s.set_item("k", "12345678").unwrap();
        s.set_item("k", "87654321").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("87654321"));
    }
}
