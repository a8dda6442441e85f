//! Persisted session records.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated session ids.
pub const ID_LEN: usize = 6;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A record stored in a [`SessionLog`](crate::SessionLog).
pub trait SessionRecord: Serialize + serde::de::DeserializeOwned + Clone {
    /// Opaque identifier, unique within its log.
    fn id(&self) -> &str;
}

/// A saved terminal transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSession {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub lines: Vec<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl SessionRecord for LogSession {
    fn id(&self) -> &str {
        &self.id
    }
}

/// How a typing run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypingMode {
    /// Fixed time budget.
    Time {
        #[serde(rename = "durationSec")]
        duration_sec: u32,
    },
    /// Fixed prompt length; ends when the prompt is typed.
    Words {
        #[serde(rename = "wordCount")]
        word_count: usize,
    },
}

impl TypingMode {
    /// Number of words to draw for this mode's prompt.
    pub fn prompt_words(&self) -> usize {
        match self {
            Self::Words { word_count } => *word_count,
            Self::Time { .. } => 50,
        }
    }
}

impl Default for TypingMode {
    fn default() -> Self {
        Self::Words { word_count: 30 }
    }
}

/// One per-second speed sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSample {
    /// Whole seconds since the run started.
    pub t: u64,
    /// Characters per second at that point.
    pub cps: f64,
}

/// A completed typing run. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSession {
    pub id: String,
    pub created_at: i64,
    pub mode: TypingMode,
    pub prompt: String,
    pub wpm: u32,
    pub raw_wpm: u32,
    /// Percentage, 0-100.
    pub accuracy: u32,
    pub correct: usize,
    pub incorrect: usize,
    #[serde(default)]
    pub timeline: Vec<TimelineSample>,
    /// Expected character -> number of mismatches.
    #[serde(default)]
    pub mistakes: BTreeMap<char, u32>,
}

impl SessionRecord for TypingSession {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Generate a short random base-36 id.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render an epoch-millisecond timestamp in local time.
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => millis.to_string(),
    }
}
