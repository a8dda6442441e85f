//! Character-by-character reveal of queued output lines.

use std::collections::VecDeque;

use rand::{Rng, RngCore};

/// Chance a newly revealed line is flagged for a glitch effect.
pub const GLITCH_PROBABILITY: f64 = 0.08;

/// Per-character delay bounds in milliseconds, upper bound exclusive.
pub const DEFAULT_MIN_DELAY_MS: u32 = 12;
pub const DEFAULT_MAX_DELAY_MS: u32 = 22;

/// What a queued line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Plain,
    /// Part of the trace with this sequence number; completion advances
    /// that trace's progress.
    Trace(u32),
}

/// A line on screen, possibly still being revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownLine {
    pub text: String,
    pub glitch: bool,
}

/// Progress report from [`RevealQueue::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    /// A new line appeared (empty so far).
    LineStarted { glitch: bool },
    /// One more character of the current line.
    Char(char),
    /// The current line is fully revealed.
    LineFinished { tag: LineTag },
}

struct Current {
    chars: Vec<char>,
    revealed: usize,
    wait_ms: u64,
    tag: LineTag,
}

/// Pending lines plus the lines already on screen.
pub struct RevealQueue {
    pending: VecDeque<(String, LineTag)>,
    current: Option<Current>,
    shown: Vec<ShownLine>,
    budget_ms: u64,
    min_delay_ms: u32,
    max_delay_ms: u32,
}

impl RevealQueue {
    pub fn new() -> Self {
        Self::with_delays(DEFAULT_MIN_DELAY_MS, DEFAULT_MAX_DELAY_MS)
    }

    /// Queue with custom per-character delay bounds. Inverted bounds are
    /// swapped.
    pub fn with_delays(min_ms: u32, max_ms: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
            shown: Vec::new(),
            budget_ms: 0,
            min_delay_ms: min_ms.min(max_ms),
            max_delay_ms: min_ms.max(max_ms),
        }
    }

    /// Queue a line behind everything already pending.
    pub fn push(&mut self, line: impl Into<String>, tag: LineTag) {
        self.pending.push_back((line.into(), tag));
    }

    /// Nothing pending and no line mid-reveal.
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// Everything on screen, the last entry possibly partial.
    pub fn shown(&self) -> &[ShownLine] {
        &self.shown
    }

    /// Drop pending and shown lines.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
        self.shown.clear();
        self.budget_ms = 0;
    }

    fn char_delay(&self, rng: &mut dyn RngCore) -> u64 {
        if self.max_delay_ms > self.min_delay_ms {
            u64::from(rng.gen_range(self.min_delay_ms..self.max_delay_ms))
        } else {
            u64::from(self.min_delay_ms)
        }
    }

    /// Spend `dt_ms` of wall time revealing characters.
    pub fn advance(&mut self, dt_ms: u64, rng: &mut dyn RngCore) -> Vec<RevealEvent> {
        self.budget_ms = self.budget_ms.saturating_add(dt_ms);
        let mut events = Vec::new();
        loop {
            if self.current.is_none() {
                let Some((text, tag)) = self.pending.pop_front() else {
                    self.budget_ms = 0;
                    break;
                };
                let glitch = rng.gen_bool(GLITCH_PROBABILITY);
                self.shown.push(ShownLine {
                    text: String::new(),
                    glitch,
                });
                self.current = Some(Current {
                    chars: text.chars().collect(),
                    revealed: 0,
                    wait_ms: 0,
                    tag,
                });
                events.push(RevealEvent::LineStarted { glitch });
            }
            let Some(cur) = self.current.as_ref() else {
                break;
            };
            if self.budget_ms < cur.wait_ms {
                break;
            }
            self.budget_ms -= cur.wait_ms;

            if cur.revealed == cur.chars.len() {
                events.push(RevealEvent::LineFinished { tag: cur.tag });
                self.current = None;
                continue;
            }
            let delay = self.char_delay(rng);
            let Some(cur) = self.current.as_mut() else {
                break;
            };
            let c = cur.chars[cur.revealed];
            cur.revealed += 1;
            cur.wait_ms = delay;
            if let Some(line) = self.shown.last_mut() {
                line.text.push(c);
            }
            events.push(RevealEvent::Char(c));
        }
        events
    }

    /// Reveal everything now.
    pub fn flush(&mut self, rng: &mut dyn RngCore) -> Vec<RevealEvent> {
        let mut events = Vec::new();
        while !self.is_idle() {
            events.extend(self.advance(u64::MAX / 2, rng));
        }
        events
    }
}

impl Default for RevealQueue {
    fn default() -> Self {
        Self::new()
    }
}
