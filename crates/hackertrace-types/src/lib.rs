//! Foundation types for hackertrace.
//!
//! Shared by every other crate in the workspace: the error type and
//! `Result` alias, runtime configuration, display mode flags, and user
//! profiles with their subscription plan.

pub mod config;
pub mod error;
pub mod profile;

pub use config::HackerConfig;
pub use error::{HackerError, Result};
pub use profile::{Mode, Plan, Profile, effective_plan};
