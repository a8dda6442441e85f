//! Typing trainer front end.
//!
//! Input arrives a line at a time from a reader thread. The clock starts
//! when the prompt is shown; lines are appended to the typed text with a
//! single space between them. A words run ends once the prompt is typed, a
//! time run when its duration is used up, and either ends early on EOF.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use hackertrace_store::{SessionStore, TypingMode, TypingSession, now_millis};
use hackertrace_terminal::{Flow, Scheduler};
use hackertrace_typing::{InputOutcome, TypingRun, generate_prompt, top_mistakes};

const POLL_MS: u64 = 50;
const SAMPLE_MS: u64 = 1000;
const QUIT: &str = "/quit";
const SHOWN_MISTAKES: usize = 5;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Finished,
    Aborted,
}

struct Trainer<'a> {
    run: TypingRun,
    typed: String,
    lines: Receiver<String>,
    out: &'a mut dyn Write,
    clock: fn() -> i64,
    ending: Option<Ending>,
}

impl Trainer<'_> {
    fn accept(&mut self, line: &str) -> io::Result<()> {
        if line.trim() == QUIT {
            self.ending = Some(Ending::Aborted);
            return Ok(());
        }
        if !self.typed.is_empty() {
            self.typed.push(' ');
        }
        self.typed.push_str(line);
        let now = (self.clock)();
        if self.run.input(&self.typed, now) == InputOutcome::PromptComplete {
            self.ending = Some(Ending::Finished);
            return Ok(());
        }
        let stats = self.run.live_stats(now);
        writeln!(self.out, "  {} wpm | {}% accuracy", stats.wpm, stats.accuracy)?;
        self.out.flush()
    }
}

fn poll(trainer: &mut Trainer<'_>) -> Flow {
    loop {
        match trainer.lines.try_recv() {
            Ok(line) => {
                if let Err(e) = trainer.accept(&line) {
                    log::warn!("Trainer output failed: {e}");
                    trainer.ending = Some(Ending::Aborted);
                }
                if trainer.ending.is_some() {
                    return Flow::Done;
                }
            },
            Err(TryRecvError::Empty) => return Flow::Continue,
            Err(TryRecvError::Disconnected) => {
                trainer.ending = Some(if trainer.typed.is_empty() {
                    Ending::Aborted
                } else {
                    Ending::Finished
                });
                return Flow::Done;
            },
        }
    }
}

fn sample(trainer: &mut Trainer<'_>) -> Flow {
    if trainer.ending.is_some() {
        return Flow::Done;
    }
    if trainer.run.tick((trainer.clock)()) {
        trainer.ending = Some(Ending::Finished);
        return Flow::Done;
    }
    Flow::Continue
}

fn summary(session: &TypingSession) -> Vec<String> {
    let mut lines = vec![
        format!("WPM: {}  (raw {})", session.wpm, session.raw_wpm),
        format!(
            "ACCURACY: {}%  ({} correct, {} incorrect)",
            session.accuracy, session.correct, session.incorrect
        ),
    ];
    let top = top_mistakes(&session.mistakes, SHOWN_MISTAKES);
    if !top.is_empty() {
        let list = top
            .iter()
            .map(|(c, n)| format!("'{c}' x{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("MISSED: {list}"));
    }
    lines.push(format!("Saved typing run {}", session.id));
    lines
}

/// Run one typing session on stdin/stdout and save the result.
pub fn run(store: &mut SessionStore, mode: TypingMode) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    let stdout = io::stdout();
    let mut rng = StdRng::from_entropy();
    let prompt = generate_prompt(mode.prompt_words(), &mut rng);
    run_with(store, mode, prompt, rx, &mut stdout.lock(), &mut rng, now_millis)
}

fn run_with(
    store: &mut SessionStore,
    mode: TypingMode,
    prompt: String,
    lines: Receiver<String>,
    out: &mut dyn Write,
    rng: &mut StdRng,
    clock: fn() -> i64,
) -> Result<()> {
    match mode {
        TypingMode::Words { word_count } => writeln!(out, "Type these {word_count} words:")?,
        TypingMode::Time { duration_sec } => {
            writeln!(out, "Type for {duration_sec} seconds:")?;
        },
    }
    writeln!(out, "\n{prompt}\n")?;
    writeln!(out, "(Enter submits a line, {QUIT} gives up)")?;
    out.flush()?;

    let mut run = TypingRun::new(mode, prompt);
    run.start(clock());
    let mut trainer = Trainer {
        run,
        typed: String::new(),
        lines,
        out,
        clock,
        ending: None,
    };

    let mut sched: Scheduler<Trainer<'_>> = Scheduler::new();
    sched.every(POLL_MS, poll);
    sched.every(SAMPLE_MS, sample);
    let mut last = Instant::now();
    while trainer.ending.is_none() {
        thread::sleep(Duration::from_millis(POLL_MS));
        let now = Instant::now();
        let dt = now.duration_since(last).as_millis() as u64;
        last = now;
        sched.advance(&mut trainer, dt);
    }
    sched.cancel_all();

    if trainer.ending == Some(Ending::Aborted) {
        writeln!(trainer.out, "Run abandoned.")?;
        return Ok(());
    }
    let id = store.new_typing_id(rng);
    let session = trainer.run.finish(id, clock())?;
    store.save_typing(session.clone());
    writeln!(trainer.out)?;
    for line in summary(&session) {
        writeln!(trainer.out, "{line}")?;
    }
    Ok(())
}
