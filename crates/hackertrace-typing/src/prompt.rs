//! Prompt generation.

use rand::Rng;
use rand::seq::SliceRandom;

/// Words prompts are drawn from. `cipher` appears twice and is drawn twice as often.
pub const CORPUS: &[&str] = &[
    "trace", "kernel", "packet", "glitch", "cipher", "matrix", "neon", "daemon", "socket",
    "quantum", "vector", "router", "payload", "entropy", "proxy", "buffer", "stream", "opcode",
    "thread", "cipher",
];

/// Default prompt length in words.
pub const DEFAULT_WORDS: usize = 30;

/// `words` corpus words drawn uniformly with replacement, space-separated.
pub fn generate_prompt<R: Rng + ?Sized>(words: usize, rng: &mut R) -> String {
    (0..words)
        .filter_map(|_| CORPUS.choose(&mut *rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}
