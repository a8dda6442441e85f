//! Lifecycle of one typing run: start on first keystroke, sample speed once
//! per tick, finalize exactly once.

use std::collections::VecDeque;

use hackertrace_store::{TimelineSample, TypingMode, TypingSession};
use hackertrace_types::error::{HackerError, Result};

use crate::metrics::{compute_metrics, to_wpm};

/// Timeline samples kept per run.
pub const MAX_TIMELINE: usize = 120;

/// Rounded live readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStats {
    pub wpm: u32,
    pub accuracy: u32,
}

/// What an input event did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Keep typing.
    Continue,
    /// Words mode: the prompt has been typed in full.
    PromptComplete,
    /// The run was already finished; input ignored.
    Ignored,
}

/// A typing run in progress.
#[derive(Debug, Clone)]
pub struct TypingRun {
    mode: TypingMode,
    prompt: String,
    typed: String,
    started_at: Option<i64>,
    timeline: VecDeque<TimelineSample>,
    finished: bool,
}

fn round_u32(v: f64) -> u32 {
    v.round().max(0.0) as u32
}

impl TypingRun {
    pub fn new(mode: TypingMode, prompt: impl Into<String>) -> Self {
        Self {
            mode,
            prompt: prompt.into(),
            typed: String::new(),
            started_at: None,
            timeline: VecDeque::new(),
            finished: false,
        }
    }

    pub fn mode(&self) -> TypingMode {
        self.mode
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn timeline(&self) -> impl Iterator<Item = &TimelineSample> {
        self.timeline.iter()
    }

    fn elapsed_ms(&self, now_ms: i64) -> u64 {
        self.started_at
            .map_or(0, |start| now_ms.saturating_sub(start).max(0) as u64)
    }

    /// Start the clock now if it is not running yet. For front ends that
    /// only see whole lines rather than the first keystroke.
    pub fn start(&mut self, now_ms: i64) {
        if self.started_at.is_none() && !self.finished {
            self.started_at = Some(now_ms);
        }
    }

    /// Replace the typed text. The first non-empty input starts the clock.
    pub fn input(&mut self, text: &str, now_ms: i64) -> InputOutcome {
        if self.finished {
            return InputOutcome::Ignored;
        }
        if self.started_at.is_none() && !text.is_empty() {
            log::debug!("Typing run started");
            self.started_at = Some(now_ms);
        }
        self.typed = text.to_string();
        match self.mode {
            TypingMode::Words { .. } if text.trim() == self.prompt.trim() => {
                InputOutcome::PromptComplete
            },
            _ => InputOutcome::Continue,
        }
    }

    /// Periodic sample (once per second). Returns `true` when a timed run
    /// has used up its duration.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        if self.finished || self.started_at.is_none() {
            return false;
        }
        let elapsed = self.elapsed_ms(now_ms);
        let secs = elapsed / 1000;
        let typed = self.typed.chars().count();
        self.timeline.push_back(TimelineSample {
            t: secs,
            cps: typed as f64 / secs.max(1) as f64,
        });
        while self.timeline.len() > MAX_TIMELINE {
            self.timeline.pop_front();
        }
        match self.mode {
            TypingMode::Time { duration_sec } => secs >= u64::from(duration_sec),
            TypingMode::Words { .. } => false,
        }
    }

    /// Rounded WPM and accuracy for display.
    pub fn live_stats(&self, now_ms: i64) -> LiveStats {
        if self.started_at.is_none() {
            return LiveStats {
                wpm: 0,
                accuracy: 100,
            };
        }
        let elapsed = self.elapsed_ms(now_ms);
        let metrics = compute_metrics(&self.prompt, &self.typed);
        LiveStats {
            wpm: round_u32(to_wpm(self.typed.chars().count(), elapsed)),
            accuracy: round_u32(metrics.accuracy),
        }
    }

    /// Finalize the run into a session record. Succeeds at most once.
    pub fn finish(&mut self, id: String, now_ms: i64) -> Result<TypingSession> {
        if self.finished {
            return Err(HackerError::AlreadyFinished);
        }
        if self.started_at.is_none() {
            return Err(HackerError::NotStarted);
        }
        let elapsed = self.elapsed_ms(now_ms);
        let metrics = compute_metrics(&self.prompt, &self.typed);
        let raw_wpm = to_wpm(self.typed.chars().count(), elapsed);
        let wpm = to_wpm(metrics.correct, elapsed);
        self.finished = true;

        Ok(TypingSession {
            id,
            created_at: now_ms,
            mode: self.mode,
            prompt: self.prompt.clone(),
            wpm: round_u32(wpm),
            raw_wpm: round_u32(raw_wpm),
            accuracy: round_u32(metrics.accuracy),
            correct: metrics.correct,
            incorrect: metrics.incorrect,
            timeline: self.timeline.iter().copied().collect(),
            mistakes: metrics.mistakes,
        })
    }
}
