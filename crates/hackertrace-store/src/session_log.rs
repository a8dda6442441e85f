//! Append-only, size-capped session logs.

use std::marker::PhantomData;

use hackertrace_types::error::Result;

use crate::Storage;
use crate::session::SessionRecord;

/// One keyed log of records, most recent first.
///
/// The whole log is stored as a single JSON array under `key`. When the
/// serialized array would exceed `cap_bytes`, the oldest records are dropped
/// until it fits.
#[derive(Debug, Clone)]
pub struct SessionLog<T> {
    key: String,
    cap_bytes: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: SessionRecord> SessionLog<T> {
    pub fn new(key: impl Into<String>, cap_bytes: usize) -> Self {
        Self {
            key: key.into(),
            cap_bytes,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All records, most recent first. Unreadable or corrupt data reads as empty.
    pub fn list(&self, storage: &dyn Storage) -> Vec<T> {
        match self.try_list(storage) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Discarding unreadable log {}: {e}", self.key);
                Vec::new()
            },
        }
    }

    /// Find a record by id.
    pub fn get(&self, storage: &dyn Storage, id: &str) -> Option<T> {
        self.list(storage).into_iter().find(|r| r.id() == id)
    }

    /// Whether `id` is already used in this log.
    pub fn contains(&self, storage: &dyn Storage, id: &str) -> bool {
        self.list(storage).iter().any(|r| r.id() == id)
    }

    /// Prepend a record. Returns whether it was persisted.
    ///
    /// Write failures are logged and swallowed; the log is left as it was.
    pub fn save(&self, storage: &mut dyn Storage, record: T) -> bool {
        match self.try_save(storage, record) {
            Ok(persisted) => persisted,
            Err(e) => {
                log::warn!("Failed to persist to {}: {e}", self.key);
                false
            },
        }
    }

    fn try_list(&self, storage: &dyn Storage) -> Result<Vec<T>> {
        match storage.get_item(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    fn try_save(&self, storage: &mut dyn Storage, record: T) -> Result<bool> {
        let mut records = self.list(storage);
        records.insert(0, record);
        match encode_capped(&mut records, self.cap_bytes)? {
            Some(json) => {
                storage.set_item(&self.key, &json)?;
                Ok(true)
            },
            None => {
                log::warn!(
                    "Record exceeds the {} byte cap of {}; not persisted",
                    self.cap_bytes,
                    self.key
                );
                Ok(false)
            },
        }
    }
}

/// Serialize `records` as a JSON array no larger than `cap` bytes, dropping
/// records from the tail (oldest) as needed. Returns `None` when even the
/// newest record alone does not fit.
pub(crate) fn encode_capped<T: SessionRecord>(
    records: &mut Vec<T>,
    cap: usize,
) -> Result<Option<String>> {
    let sizes = records
        .iter()
        .map(|r| serde_json::to_string(r).map(|s| s.len()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    // "[" + items joined by "," + "]"
    let mut total = 2 + sizes.iter().sum::<usize>() + sizes.len().saturating_sub(1);
    let mut keep = records.len();
    while keep > 0 && total > cap {
        keep -= 1;
        total -= sizes[keep] + usize::from(keep > 0);
    }
    if keep == 0 {
        return Ok(None);
    }
    if keep < records.len() {
        log::info!("Dropping {} oldest records to stay under cap", records.len() - keep);
        records.truncate(keep);
    }
    Ok(Some(serde_json::to_string(records)?))
}
