//! Runtime configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HackerError, Result};
use crate::profile::{Plan, Profile};

/// Environment variable naming a config file when no path is given.
pub const CONFIG_ENV: &str = "HACKERTRACE_CONFIG";

/// Default serialized-size cap for each session log (~1.5 MB).
pub const DEFAULT_STORE_CAP_BYTES: usize = 1_500_000;

/// Top-level configuration (`hackertrace.toml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HackerConfig {
    /// Directory holding the persisted session logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory that `export` writes into.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Serialized-size cap applied to each session log.
    #[serde(default = "default_store_cap")]
    pub store_cap_bytes: usize,
    /// Base URL of the real-trace service. `None` keeps traces synthetic.
    #[serde(default)]
    pub trace_endpoint: Option<String>,
    /// Lower bound of the per-character reveal delay.
    #[serde(default = "default_reveal_min")]
    pub reveal_min_ms: u32,
    /// Upper bound (exclusive) of the per-character reveal delay.
    #[serde(default = "default_reveal_max")]
    pub reveal_max_ms: u32,
    /// City every trace starts from.
    #[serde(default = "default_source_city")]
    pub source_city: String,
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// The `[profile]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_profile_id")]
    pub id: String,
    #[serde(default = "default_profile_name")]
    pub name: String,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub achievements: Vec<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".hackertrace")
}
fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_store_cap() -> usize {
    DEFAULT_STORE_CAP_BYTES
}
fn default_reveal_min() -> u32 {
    12
}
fn default_reveal_max() -> u32 {
    22
}
fn default_source_city() -> String {
    "delhi".to_string()
}
fn default_profile_id() -> String {
    "demo".to_string()
}
fn default_profile_name() -> String {
    "anonymous@net".to_string()
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            id: default_profile_id(),
            name: default_profile_name(),
            plan: Plan::Free,
            achievements: Vec::new(),
        }
    }
}

impl From<ProfileConfig> for Profile {
    fn from(cfg: ProfileConfig) -> Self {
        Profile {
            id: cfg.id,
            name: cfg.name,
            plan: cfg.plan,
            achievements: cfg.achievements,
        }
    }
}

impl Default for HackerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
            store_cap_bytes: default_store_cap(),
            trace_endpoint: None,
            reveal_min_ms: default_reveal_min(),
            reveal_max_ms: default_reveal_max(),
            source_city: default_source_city(),
            profile: ProfileConfig::default(),
        }
    }
}

impl HackerConfig {
    /// Parse a config from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Resolve the config: explicit path, then `HACKERTRACE_CONFIG`, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::from_file(p);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => Self::from_file(Path::new(&p)),
            _ => Ok(Self::default()),
        }
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.store_cap_bytes == 0 {
            return Err(HackerError::Config(
                "store_cap_bytes must be positive".to_string(),
            ));
        }
        if self.reveal_min_ms > self.reveal_max_ms {
            return Err(HackerError::Config(format!(
                "reveal_min_ms ({}) exceeds reveal_max_ms ({})",
                self.reveal_min_ms, self.reveal_max_ms
            )));
        }
        if self.source_city.trim().is_empty() {
            return Err(HackerError::Config("source_city is empty".to_string()));
        }
        Ok(())
    }

    /// The configured profile.
    pub fn profile(&self) -> Profile {
        self.profile.clone().into()
    }
}
