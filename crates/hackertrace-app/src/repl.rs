//! Line-oriented terminal loop.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use hackertrace_terminal::{ActiveTrace, Flow, RevealEvent, Scheduler, Terminal};
use hackertrace_trace::{distance_km, great_circle_path};

/// Reveal step, roughly one display frame.
const FRAME_MS: u64 = 16;

/// Waypoints printed for a finished route, endpoints included.
const ROUTE_SEGMENTS: usize = 4;

struct Screen<'a> {
    term: &'a mut Terminal,
    out: &'a mut dyn Write,
    error: Option<io::Error>,
}

fn write_events(out: &mut dyn Write, events: &[RevealEvent]) -> io::Result<()> {
    for event in events {
        match event {
            RevealEvent::LineStarted { .. } => {},
            RevealEvent::Char(c) => write!(out, "{c}")?,
            RevealEvent::LineFinished { .. } => writeln!(out)?,
        }
    }
    out.flush()
}

fn frame(screen: &mut Screen<'_>) -> Flow {
    let events = screen.term.tick(FRAME_MS);
    if let Err(e) = write_events(&mut *screen.out, &events) {
        screen.error = Some(e);
        return Flow::Done;
    }
    if screen.term.is_idle() {
        Flow::Done
    } else {
        Flow::Continue
    }
}

/// Print everything pending, typed out in real time unless `instant`.
fn drain(term: &mut Terminal, out: &mut dyn Write, instant: bool) -> io::Result<()> {
    if instant {
        let events = term.flush();
        return write_events(out, &events);
    }
    let mut screen = Screen {
        term,
        out,
        error: None,
    };
    let mut sched: Scheduler<Screen<'_>> = Scheduler::new();
    sched.every(FRAME_MS, frame);
    while !sched.is_empty() {
        thread::sleep(Duration::from_millis(FRAME_MS));
        sched.advance(&mut screen, FRAME_MS);
    }
    match screen.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn route_summary(trace: &ActiveTrace) -> [String; 2] {
    let (a, b) = (trace.source.coordinates, trace.destination.coordinates);
    let waypoints = great_circle_path(a, b, ROUTE_SEGMENTS)
        .iter()
        .map(|[lon, lat]| format!("({lat:.1}, {lon:.1})"))
        .collect::<Vec<_>>()
        .join(" -> ");
    [
        format!(
            "ROUTE: {} -> {} ({:.0} km)",
            trace.source.label,
            trace.destination.label,
            distance_km(a, b)
        ),
        format!("PATH: {waypoints}"),
    ]
}

fn prompt(term: &Terminal) -> &'static str {
    if term.mode().real { "[real] > " } else { "> " }
}

/// Run the terminal on stdin/stdout until EOF or `exit`.
pub fn run(term: &mut Terminal, instant: bool) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(term, stdin.lock(), &mut stdout.lock(), instant)
}

/// Run the terminal over arbitrary input and output.
///
/// `!!` repeats the previous command. A line ending in a tab prints its
/// completion instead of running.
pub fn run_with(
    term: &mut Terminal,
    input: impl BufRead,
    out: &mut dyn Write,
    instant: bool,
) -> Result<()> {
    let mut reported_trace = None;
    drain(term, out, instant)?;
    write!(out, "{}", prompt(term))?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        if let Some(partial) = line.strip_suffix('\t') {
            match term.complete(partial) {
                Some(completed) => writeln!(out, "{completed}")?,
                None => writeln!(out, "(no completion)")?,
            }
        } else {
            match line.trim() {
                "exit" | "quit" => break,
                "!!" => match term.history_prev() {
                    Some(previous) => term.submit(&previous),
                    None => writeln!(out, "(no history)")?,
                },
                other => term.submit(other),
            }
            drain(term, out, instant)?;

            if let Some(trace) = term.trace()
                && trace.progress.is_complete()
                && reported_trace != Some(trace.seq)
            {
                reported_trace = Some(trace.seq);
                for line in route_summary(trace) {
                    writeln!(out, "{line}")?;
                }
            }
        }
        write!(out, "{}", prompt(term))?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}
