//! Typing-speed trainer.
//!
//! [`compute_metrics`] compares a prompt against typed text, [`to_wpm`]
//! turns a character count and elapsed time into words per minute, and
//! [`TypingRun`] drives one run from first keystroke to a saved
//! [`TypingSession`](hackertrace_store::TypingSession).

pub mod metrics;
pub mod prompt;
pub mod run;

pub use metrics::{Metrics, compute_metrics, to_wpm, top_mistakes};
pub use prompt::{CORPUS, generate_prompt};
pub use run::{InputOutcome, LiveStats, TypingRun};
