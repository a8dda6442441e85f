//! Local session persistence.
//!
//! A [`Storage`] backend holds string values by key. Two [`SessionLog`]s sit
//! on top of it, one for terminal transcripts and one for typing runs, each
//! an append-only JSON array with a serialized-size cap. Persistence is
//! lossy by policy: failures are logged and the store behaves as empty.

pub mod export;
pub mod file;
pub mod memory;
pub mod session;
mod session_log;

use hackertrace_types::config::DEFAULT_STORE_CAP_BYTES;
use hackertrace_types::error::Result;

pub use export::{ExportFormat, write_export};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use session::{
    LogSession, SessionRecord, TimelineSample, TypingMode, TypingSession, format_timestamp,
    generate_id, now_millis,
};
pub use session_log::SessionLog;

/// Key of the terminal transcript log.
pub const SESSIONS_KEY: &str = "hackertrace.sessions.v1";

/// Key of the typing run log.
pub const TYPING_KEY: &str = "hackertrace.typing.v1";

/// A string key-value backend.
pub trait Storage {
    /// Read a value, `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// Storage backend plus both session logs.
pub struct SessionStore {
    storage: Box<dyn Storage>,
    sessions: SessionLog<LogSession>,
    typing: SessionLog<TypingSession>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn Storage>, cap_bytes: usize) -> Self {
        Self {
            storage,
            sessions: SessionLog::new(SESSIONS_KEY, cap_bytes),
            typing: SessionLog::new(TYPING_KEY, cap_bytes),
        }
    }

    /// A store backed by [`MemoryStorage`] with the default cap.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()), DEFAULT_STORE_CAP_BYTES)
    }

    // -- Terminal transcripts --

    pub fn save_session(&mut self, session: LogSession) -> bool {
        let id = session.id.clone();
        let saved = self.sessions.save(self.storage.as_mut(), session);
        if saved {
            log::info!("Saved session {id}");
        }
        saved
    }

    pub fn list_sessions(&self) -> Vec<LogSession> {
        self.sessions.list(self.storage.as_ref())
    }

    pub fn get_session(&self, id: &str) -> Option<LogSession> {
        self.sessions.get(self.storage.as_ref(), id)
    }

    /// A fresh id not yet used in the transcript log.
    pub fn new_session_id(&self, rng: &mut dyn rand::RngCore) -> String {
        fresh_id(rng, |id| self.sessions.contains(self.storage.as_ref(), id))
    }

    // -- Typing runs --

    pub fn save_typing(&mut self, session: TypingSession) -> bool {
        let id = session.id.clone();
        let saved = self.typing.save(self.storage.as_mut(), session);
        if saved {
            log::info!("Saved typing session {id}");
        }
        saved
    }

    pub fn list_typing(&self) -> Vec<TypingSession> {
        self.typing.list(self.storage.as_ref())
    }

    pub fn get_typing(&self, id: &str) -> Option<TypingSession> {
        self.typing.get(self.storage.as_ref(), id)
    }

    /// A fresh id not yet used in the typing log.
    pub fn new_typing_id(&self, rng: &mut dyn rand::RngCore) -> String {
        fresh_id(rng, |id| self.typing.contains(self.storage.as_ref(), id))
    }
}

fn fresh_id(rng: &mut dyn rand::RngCore, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id(rng);
        if !taken(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeMap;

    fn log_session(id: &str) -> LogSession {
        LogSession {
            id: id.to_string(),
            user_id: Some("demo".into()),
            created_at: 1_700_000_000_000,
            lines: vec!["$ whoami".into(), "anonymous@net @ hackertrace".into()],
            meta: BTreeMap::from([("source".to_string(), serde_json::json!("delhi"))]),
        }
    }

    fn typing_session(id: &str) -> TypingSession {
        TypingSession {
            id: id.to_string(),
            created_at: 1_700_000_000_000,
            mode: TypingMode::Time { duration_sec: 60 },
            prompt: "trace kernel".into(),
            wpm: 50,
            raw_wpm: 55,
            accuracy: 96,
            correct: 24,
            incorrect: 1,
            timeline: Vec::new(),
            mistakes: BTreeMap::from([('k', 1)]),
        }
    }

    #[test]
    fn save_list_roundtrip_keeps_all_fields() {
        let mut store = SessionStore::in_memory();
        assert!(store.save_session(log_session("one")));
        let list = store.list_sessions();
        assert_eq!(list.first(), Some(&log_session("one")));
    }

    #[test]
    fn missing_id_is_absent_not_error() {
        let store = SessionStore::in_memory();
        assert!(store.get_session("ghost").is_none());
        assert!(store.get_typing("ghost").is_none());
    }

    #[test]
    fn logs_are_independent() {
        let mut store = SessionStore::in_memory();
        store.save_session(log_session("shared"));
        store.save_typing(typing_session("shared"));
        store.save_typing(typing_session("t2"));
        assert_eq!(store.list_sessions().len(), 1);
        assert_eq!(store.list_typing().len(), 2);
        assert_eq!(store.list_typing()[0].id, "t2");
        assert_eq!(store.get_typing("shared").unwrap(), typing_session("shared"));
    }

    #[test]
    fn fresh_ids_avoid_collisions() {
        let mut store = SessionStore::in_memory();
        let mut rng = StdRng::seed_from_u64(1);
        let first = store.new_session_id(&mut rng);
        store.save_session(log_session(&first));
        // Same seed would reproduce `first`; the store must skip it.
        let mut rng = StdRng::seed_from_u64(1);
        let second = store.new_session_id(&mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn quota_failure_degrades_to_empty() {
        let mut store = SessionStore::new(Box::new(MemoryStorage::with_quota(8)), 1_500_000);
        assert!(!store.save_session(log_session("one")));
        assert!(store.list_sessions().is_empty());
    }

    #[test]
    fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SessionStore::new(
                Box::new(FileStorage::open(dir.path()).unwrap()),
                1_500_000,
            );
            store.save_session(log_session("disk"));
        }
        let store = SessionStore::new(Box::new(FileStorage::open(dir.path()).unwrap()), 1_500_000);
        assert_eq!(store.get_session("disk").unwrap(), log_session("disk"));
    }
}
