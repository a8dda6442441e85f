//! The interactive terminal: input handling, output queue, and side effects
//! the commands only signal.

use std::path::PathBuf;

use hackertrace_store::{ExportFormat, SessionStore, now_millis, write_export};
use hackertrace_trace::{City, HttpTraceFeed, TraceFeed, TraceProgress, city_names, resolve_city};
use hackertrace_types::error::{HackerError, Result};
use hackertrace_types::{HackerConfig, Mode, Profile};
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::commands::builtin_registry;
use crate::interpreter::{CommandOutput, CommandRegistry, Environment, parse_command};
use crate::reveal::{LineTag, RevealEvent, RevealQueue, ShownLine};

/// Lines printed once at startup.
pub const BOOT_LINES: [&str; 4] = [
    "BOOT SEQUENCE INITIATED...",
    "CALIBRATING OPTICAL MATRIX... OK",
    "LINKING SAT-NET NODES... OK",
    "READY.",
];

const TRACE_COMMAND: &str = "trace-route";
const MAX_HISTORY: usize = 100;

/// A trace whose output is being revealed.
#[derive(Debug, Clone)]
pub struct ActiveTrace {
    pub seq: u32,
    pub source: &'static City,
    pub destination: &'static City,
    pub progress: TraceProgress,
}

/// Terminal session state.
pub struct Terminal {
    registry: CommandRegistry,
    mode: Mode,
    profile: Option<Profile>,
    store: SessionStore,
    feed: Option<Box<dyn TraceFeed>>,
    source: &'static City,
    export_dir: PathBuf,
    rng: Box<dyn RngCore>,
    clock: fn() -> i64,
    reveal: RevealQueue,
    /// Every line queued since the last clear.
    transcript: Vec<String>,
    history: Vec<String>,
    history_index: Option<usize>,
    trace: Option<ActiveTrace>,
    trace_seq: u32,
    booted: bool,
}

impl Terminal {
    /// Terminal over `store` with builtin commands, default reveal timing,
    /// Delhi as trace source, and exports written to the working directory.
    pub fn new(store: SessionStore, profile: Option<Profile>) -> Self {
        Self {
            registry: builtin_registry(),
            mode: Mode::default(),
            profile,
            store,
            feed: None,
            source: &hackertrace_trace::CITIES[0],
            export_dir: PathBuf::from("."),
            rng: Box::new(StdRng::from_entropy()),
            clock: now_millis,
            reveal: RevealQueue::new(),
            transcript: Vec::new(),
            history: Vec::new(),
            history_index: None,
            trace: None,
            trace_seq: 0,
            booted: false,
        }
    }

    /// Terminal configured from `config`: its profile, source city, reveal
    /// timing, export directory and, if set, the real-trace endpoint.
    pub fn from_config(config: &HackerConfig, store: SessionStore) -> Result<Self> {
        let source = resolve_city(&config.source_city).map_err(|_| {
            HackerError::Config(format!(
                "unknown source_city {:?}; expected one of {}",
                config.source_city,
                city_names()
            ))
        })?;
        let mut term = Self::new(store, Some(config.profile()))
            .with_source(source)
            .with_export_dir(config.export_dir.clone())
            .with_reveal(RevealQueue::with_delays(
                config.reveal_min_ms,
                config.reveal_max_ms,
            ));
        if let Some(endpoint) = &config.trace_endpoint {
            term = term.with_feed(Box::new(HttpTraceFeed::new(endpoint)?));
        }
        Ok(term)
    }

    pub fn with_feed(mut self, feed: Box<dyn TraceFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_source(mut self, source: &'static City) -> Self {
        self.source = source;
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reveal(mut self, reveal: RevealQueue) -> Self {
        self.reveal = reveal;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    // -- Accessors --

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Lines on screen, the last possibly partial.
    pub fn lines(&self) -> &[ShownLine] {
        self.reveal.shown()
    }

    /// Every line queued since the last clear, including unrevealed ones.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// The current or most recent trace.
    pub fn trace(&self) -> Option<&ActiveTrace> {
        self.trace.as_ref()
    }

    /// Nothing left to reveal.
    pub fn is_idle(&self) -> bool {
        self.reveal.is_idle()
    }

    // -- Output --

    fn enqueue<I, S>(&mut self, lines: I, tag: LineTag)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            let line = line.into();
            self.transcript.push(line.clone());
            self.reveal.push(line, tag);
        }
    }

    fn clear(&mut self) {
        self.reveal.clear();
        self.transcript.clear();
        self.trace = None;
    }

    /// Advance the reveal by `dt_ms`.
    pub fn tick(&mut self, dt_ms: u64) -> Vec<RevealEvent> {
        let events = self.reveal.advance(dt_ms, self.rng.as_mut());
        self.apply(&events);
        if let Some(trace) = &mut self.trace {
            trace.progress.tick(u32::try_from(dt_ms).unwrap_or(u32::MAX));
        }
        events
    }

    /// Reveal everything pending at once.
    pub fn flush(&mut self) -> Vec<RevealEvent> {
        let events = self.reveal.flush(self.rng.as_mut());
        self.apply(&events);
        if let Some(trace) = &mut self.trace {
            trace.progress.tick(u32::MAX);
        }
        events
    }

    fn apply(&mut self, events: &[RevealEvent]) {
        let Some(trace) = &mut self.trace else {
            return;
        };
        for event in events {
            if let RevealEvent::LineFinished {
                tag: LineTag::Trace(seq),
            } = event
                && *seq == trace.seq
                && !trace.progress.is_complete()
            {
                trace.progress.advance();
                if trace.progress.is_complete() {
                    log::info!(
                        "Trace {} -> {} complete",
                        trace.source.name,
                        trace.destination.name
                    );
                }
            }
        }
    }

    // -- Input --

    /// Print the boot banner. Only the first call has an effect.
    pub fn boot(&mut self) {
        if self.booted {
            return;
        }
        self.booted = true;
        self.enqueue(BOOT_LINES, LineTag::Plain);
    }

    /// Queue a stored session's lines. Returns `false` if `id` is unknown.
    pub fn replay_on_start(&mut self, id: &str) -> bool {
        match self.store.get_session(id) {
            Some(session) => {
                self.enqueue([format!("Replaying session {id}...")], LineTag::Plain);
                self.enqueue(session.lines, LineTag::Plain);
                true
            },
            None => {
                log::warn!("No session {id} to replay");
                false
            },
        }
    }

    /// Run one line of input. Blank input is ignored.
    pub fn submit(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        self.history.push(input.to_string());
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
        self.history_index = None;
        self.enqueue([format!("$ {input}")], LineTag::Plain);

        let parsed = parse_command(input);
        if parsed.name.is_empty() {
            return;
        }
        let now_ms = (self.clock)();
        let mut env = Environment {
            mode: &mut self.mode,
            profile: self.profile.as_ref(),
            store: &mut self.store,
            transcript: &self.transcript,
            feed: self.feed.as_deref(),
            source: self.source,
            rng: self.rng.as_mut(),
            now_ms,
        };
        let result = self.registry.dispatch(&parsed.name, &parsed.args, &mut env);

        match result {
            Ok(CommandOutput::Lines(lines)) => self.enqueue(lines, LineTag::Plain),
            Ok(CommandOutput::None) => {},
            Ok(CommandOutput::Clear) => self.clear(),
            Ok(CommandOutput::Export { id, format }) => self.export(&id, format),
            Ok(CommandOutput::Trace { destination, lines }) => {
                self.start_trace(destination, lines);
            },
            Err(e) => {
                log::debug!("'{}' failed: {e}", parsed.name);
                self.enqueue([format!("ERROR: {e}")], LineTag::Plain);
            },
        }
    }

    fn export(&mut self, id: &str, format: ExportFormat) {
        let Some(session) = self.store.get_session(id) else {
            let err = HackerError::NotFound(id.to_string());
            self.enqueue([format!("ERROR: {err}")], LineTag::Plain);
            return;
        };
        match write_export(&self.export_dir, &session, format) {
            Ok(_) => self.enqueue([format!("Exported {id} as {format}.")], LineTag::Plain),
            Err(e) => {
                log::warn!("Export of {id} failed: {e}");
                self.enqueue([format!("ERROR: {e}")], LineTag::Plain);
            },
        }
    }

    fn start_trace(&mut self, destination: &'static City, lines: Vec<String>) {
        self.trace_seq = self.trace_seq.wrapping_add(1);
        log::info!(
            "Trace {} -> {} started ({} lines)",
            self.source.name,
            destination.name,
            lines.len()
        );
        self.trace = Some(ActiveTrace {
            seq: self.trace_seq,
            source: self.source,
            destination,
            progress: TraceProgress::new(lines.len()),
        });
        self.enqueue(lines, LineTag::Trace(self.trace_seq));
    }

    // -- History and completion --

    /// Step back through history. Stops at the oldest entry.
    pub fn history_prev(&mut self) -> Option<String> {
        if self.history.is_empty() {
            return None;
        }
        let next = match self.history_index {
            None => self.history.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.history_index = Some(next);
        Some(self.history[next].clone())
    }

    /// Step forward through history. Past the newest entry the input is
    /// emptied and browsing ends.
    pub fn history_next(&mut self) -> Option<String> {
        let i = self.history_index?;
        let next = i + 1;
        if next >= self.history.len() {
            self.history_index = None;
            return Some(String::new());
        }
        self.history_index = Some(next);
        Some(self.history[next].clone())
    }

    /// Tab completion for the input line.
    ///
    /// Blank input and prefixes of `trace-route` complete to the command;
    /// after it, a city prefix completes to the first matching city in
    /// catalog order. Other
    /// input completes to a command name when exactly one matches.
    pub fn complete(&self, input: &str) -> Option<String> {
        let trimmed = input.trim().to_lowercase();
        if trimmed.is_empty() || TRACE_COMMAND.starts_with(&trimmed) {
            return Some(format!("{TRACE_COMMAND} "));
        }
        if let Some(after) = trimmed.strip_prefix(TRACE_COMMAND) {
            let after = after.trim_start();
            return hackertrace_trace::CITIES
                .iter()
                .map(|c| c.name)
                .find(|n| n.starts_with(after))
                .map(|name| format!("{TRACE_COMMAND} {name}"));
        }
        if trimmed.contains(char::is_whitespace) {
            return None;
        }
        match self.registry.completions(&trimmed).as_slice() {
            [only] => Some(format!("{only} ")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackertrace_types::Plan;

    const T0: i64 = 1_700_000_000_000;

    fn fixed_clock() -> i64 {
        T0
    }

    fn terminal(plan: Option<Plan>) -> Terminal {
        let profile = plan.map(|plan| Profile {
            id: "u1".into(),
            name: "neo".into(),
            plan,
            achievements: Vec::new(),
        });
        Terminal::new(SessionStore::in_memory(), profile)
            .with_rng(Box::new(StdRng::seed_from_u64(42)))
            .with_clock(fixed_clock)
    }

    fn shown(term: &Terminal) -> Vec<String> {
        term.lines().iter().map(|l| l.text.clone()).collect()
    }

    fn last_line(term: &Terminal) -> &str {
        term.transcript().last().map(String::as_str).unwrap_or("")
    }

    #[test]
    fn boot_runs_once() {
        let mut term = terminal(None);
        term.boot();
        term.boot();
        term.flush();
        assert_eq!(shown(&term), BOOT_LINES.to_vec());
    }

    #[test]
    fn submit_echoes_and_runs() {
        let mut term = terminal(None);
        term.submit("  sudo  ");
        term.flush();
        assert_eq!(
            shown(&term),
            vec!["$ sudo", "sudo: permission denied. nice try."]
        );
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut term = terminal(None);
        term.submit("   ");
        assert!(term.transcript().is_empty());
        assert_eq!(term.history_prev(), None);
    }

    #[test]
    fn unknown_command_renders_error() {
        let mut term = terminal(None);
        term.submit("rm -rf /");
        assert_eq!(last_line(&term), "ERROR: Unknown command. Try: help");
    }

    #[test]
    fn unknown_city_renders_error() {
        let mut term = terminal(None);
        term.submit("trace-route mars");
        assert_eq!(
            last_line(&term),
            "ERROR: Unknown city: mars. Try: delhi, paris, tokyo, nyc, london, sydney"
        );
        assert!(term.trace().is_none());
    }

    #[test]
    fn mode_real_gate() {
        let mut term = terminal(None);
        term.submit("mode real");
        assert_eq!(
            last_line(&term),
            "MODE real is a Pro feature. Upgrade to enable."
        );
        assert!(!term.mode().real);

        let mut term = terminal(Some(Plan::Pro));
        term.submit("mode real");
        assert!(term.mode().real);
    }

    #[test]
    fn trace_progress_follows_reveal() {
        let mut term = terminal(None);
        term.submit("trace-route tokyo");
        let trace = term.trace().unwrap();
        assert_eq!(trace.destination.name, "tokyo");
        assert_eq!(trace.source.name, "delhi");
        assert_eq!(trace.progress.ratio(), 0.0);

        // Reveal the echo line and a little more; progress stays partial.
        term.tick(2_000);
        let partial = term.trace().unwrap().progress.ratio();
        assert!(partial > 0.0 && partial < 1.0, "{partial}");

        term.flush();
        let trace = term.trace().unwrap();
        assert!(trace.progress.is_complete());
        assert_eq!(trace.progress.ratio(), 1.0);
        assert_eq!(shown(&term).last().unwrap(), "TRACE COMPLETE.");
    }

    #[test]
    fn new_trace_resets_progress() {
        let mut term = terminal(None);
        term.submit("trace-route paris");
        term.submit("trace-route london");
        term.flush();
        let trace = term.trace().unwrap();
        assert_eq!(trace.destination.name, "london");
        assert!(trace.progress.is_complete());
    }

    #[test]
    fn clear_wipes_output() {
        let mut term = terminal(None);
        term.boot();
        term.flush();
        term.submit("trace-route paris");
        term.submit("clear");
        assert!(term.is_idle());
        assert!(term.lines().is_empty());
        assert!(term.transcript().is_empty());
        assert!(term.trace().is_none());
    }

    #[test]
    fn save_captures_transcript_then_replays() {
        let mut term = terminal(Some(Plan::Free));
        term.submit("cities");
        term.submit("save");
        let saved = last_line(&term).to_string();
        let id = saved.trim_start_matches("Saved session ").to_string();
        let session = term.store().get_session(&id).unwrap();
        assert_eq!(
            session.lines,
            vec![
                "$ cities",
                "CITIES: delhi, paris, tokyo, nyc, london, sydney",
                "$ save",
            ]
        );
        assert_eq!(session.created_at, T0);
        assert_eq!(session.user_id.as_deref(), Some("u1"));

        term.submit("clear");
        assert!(term.replay_on_start(&id));
        assert_eq!(term.transcript()[0], format!("Replaying session {id}..."));
        assert_eq!(term.transcript().len(), 4);
        assert!(!term.replay_on_start("nope00"));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(None).with_export_dir(dir.path());
        term.submit("help");
        term.submit("save");
        let id = last_line(&term)
            .trim_start_matches("Saved session ")
            .to_string();

        term.submit(&format!("export {id} json"));
        assert_eq!(last_line(&term), format!("Exported {id} as json."));
        let path = dir.path().join(format!("hackertrace-{id}.json"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("\"createdAt\""));

        term.submit(&format!("export {id}"));
        let txt = std::fs::read_to_string(dir.path().join(format!("hackertrace-{id}.txt"))).unwrap();
        assert!(txt.starts_with("$ help\nCommands:"));
    }

    #[test]
    fn export_unknown_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut term = terminal(None).with_export_dir(dir.path());
        term.submit("export ghost1");
        assert_eq!(last_line(&term), "ERROR: not found: ghost1");
    }

    #[test]
    fn history_navigation() {
        let mut term = terminal(None);
        assert_eq!(term.history_next(), None);
        term.submit("help");
        term.submit("cities");
        term.submit("whoami");
        assert_eq!(term.history_prev().as_deref(), Some("whoami"));
        assert_eq!(term.history_prev().as_deref(), Some("cities"));
        assert_eq!(term.history_prev().as_deref(), Some("help"));
        assert_eq!(term.history_prev().as_deref(), Some("help"));
        assert_eq!(term.history_next().as_deref(), Some("cities"));
        assert_eq!(term.history_next().as_deref(), Some("whoami"));
        assert_eq!(term.history_next().as_deref(), Some(""));
        assert_eq!(term.history_next(), None);
    }

    #[test]
    fn history_keeps_newest_entries() {
        let mut term = terminal(None);
        for i in 0..MAX_HISTORY + 5 {
            term.submit(&format!("cmd{i}"));
        }
        let mut oldest = None;
        for _ in 0..MAX_HISTORY + 10 {
            oldest = term.history_prev();
        }
        assert_eq!(oldest.as_deref(), Some("cmd5"));
        assert_eq!(term.history_next().as_deref(), Some("cmd6"));
    }

    #[test]
    fn tab_completion() {
        let term = terminal(None);
        assert_eq!(term.complete("").as_deref(), Some("trace-route "));
        assert_eq!(term.complete("tra").as_deref(), Some("trace-route "));
        assert_eq!(term.complete("trace-route").as_deref(), Some("trace-route "));
        assert_eq!(term.complete("trace-route ").as_deref(), Some("trace-route "));
        assert_eq!(
            term.complete("trace-route  p").as_deref(),
            Some("trace-route paris")
        );
        assert_eq!(
            term.complete("Trace-Route to").as_deref(),
            Some("trace-route tokyo")
        );
        assert_eq!(term.complete("trace-route x"), None);
        assert_eq!(term.complete("who").as_deref(), Some("whoami "));
        assert_eq!(term.complete("s"), None);
    }

    #[test]
    fn from_config_rejects_unknown_source() {
        let mut config = HackerConfig::default();
        config.source_city = "atlantis".into();
        assert!(matches!(
            Terminal::from_config(&config, SessionStore::in_memory()),
            Err(HackerError::Config(_))
        ));
    }

    #[test]
    fn from_config_applies_settings() {
        let mut config = HackerConfig::default();
        config.source_city = "London".into();
        config.profile.plan = Plan::Pro;
        let mut term = Terminal::from_config(&config, SessionStore::in_memory())
            .unwrap()
            .with_rng(Box::new(StdRng::seed_from_u64(1)));
        assert_eq!(term.profile().unwrap().plan, Plan::Pro);
        term.submit("trace-route paris");
        assert!(term.transcript().contains(&"SOURCE: London, UK".to_string()));
    }
}
