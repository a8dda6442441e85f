//! Command trait, registry, and dispatch logic.
//!
//! Input is split on whitespace only: no quoting, pipes, or variables. The
//! first token, lowercased, selects a command by name or alias.

use hackertrace_store::{ExportFormat, SessionStore};
use hackertrace_trace::{City, TraceFeed};
use hackertrace_types::error::{HackerError, Result};
use hackertrace_types::{Mode, Plan, Profile, effective_plan};
use rand::RngCore;

/// Output produced by a command.
#[derive(Debug, Clone)]
pub enum CommandOutput {
    /// Lines to append to the terminal.
    Lines(Vec<String>),
    /// Command produced no visible output.
    None,
    /// Signal to wipe pending and shown output.
    Clear,
    /// Signal to write a stored session to the export directory.
    Export { id: String, format: ExportFormat },
    /// Signal that a trace to `destination` began; `lines` are the preamble
    /// followed by the hops, and drive trace progress as they are revealed.
    Trace {
        destination: &'static City,
        lines: Vec<String>,
    },
}

impl CommandOutput {
    /// Convenience constructor for fixed text.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Lines(lines.into_iter().map(Into::into).collect())
    }
}

/// State and services handed to every command.
pub struct Environment<'a> {
    /// Display toggles. Commands may change them.
    pub mode: &'a mut Mode,
    /// Active profile; `None` is an anonymous free-tier user.
    pub profile: Option<&'a Profile>,
    /// Local session persistence.
    pub store: &'a mut SessionStore,
    /// Lines shown since the last clear, for `save`.
    pub transcript: &'a [String],
    /// Real-trace source, used only in real mode.
    pub feed: Option<&'a dyn TraceFeed>,
    /// Where every trace starts.
    pub source: &'static City,
    pub rng: &'a mut dyn RngCore,
    /// Wall clock, milliseconds since the Unix epoch.
    pub now_ms: i64,
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// Alternative names that resolve to this command.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ping <city>").
    fn usage(&self) -> &str;

    /// Command category for grouping.
    fn category(&self) -> &str {
        "general"
    }

    /// Plan needed to run the command with these arguments, if any.
    fn required_plan(&self, _args: &[&str]) -> Option<Plan> {
        None
    }

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// Lowercased first token; empty for blank input.
    pub name: String,
    pub args: Vec<&'a str>,
}

/// Split `input` into a lowercased command name and its arguments.
pub fn parse_command(input: &str) -> ParsedCommand<'_> {
    let mut parts = input.split_whitespace();
    let name = parts.next().map(str::to_lowercase).unwrap_or_default();
    ParsedCommand {
        name,
        args: parts.collect(),
    }
}

/// The line shown when a command needs a higher plan.
pub fn upgrade_message(name: &str, args: &[&str]) -> String {
    let mut what = name.to_uppercase();
    if let Some(first) = args.first() {
        what.push(' ');
        what.push_str(first);
    }
    format!("{what} is a Pro feature. Upgrade to enable.")
}

/// Ordered registry of commands with dispatch.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command. Replaces any existing command with the same name
    /// in place, so registration order is kept.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        match self.commands.iter().position(|c| c.name() == cmd.name()) {
            Some(i) => self.commands[i] = cmd,
            None => self.commands.push(cmd),
        }
    }

    /// Look up a command by name or alias, ignoring case.
    pub fn find(&self, name: &str) -> Option<&dyn Command> {
        let lower = name.to_lowercase();
        self.commands
            .iter()
            .find(|c| c.name() == lower || c.aliases().contains(&lower.as_str()))
            .map(|c| c.as_ref())
    }

    /// Run a resolved command, checking its plan requirement first.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[&str],
        env: &mut Environment<'_>,
    ) -> Result<CommandOutput> {
        let cmd = self
            .find(name)
            .ok_or_else(|| HackerError::UnknownCommand(name.to_string()))?;
        if let Some(required) = cmd.required_plan(args)
            && effective_plan(env.profile) < required
        {
            log::debug!("'{}' needs plan {required}", cmd.name());
            return Ok(CommandOutput::Lines(vec![upgrade_message(cmd.name(), args)]));
        }
        log::debug!("Dispatching '{}' with {} args", cmd.name(), args.len());
        cmd.execute(args, env)
    }

    /// Parse and dispatch a whole input line. Blank input does nothing.
    pub fn execute(&self, line: &str, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let parsed = parse_command(line);
        if parsed.name.is_empty() {
            return Ok(CommandOutput::None);
        }
        self.dispatch(&parsed.name, &parsed.args, env)
    }

    /// (name, description) pairs in registration order.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        self.commands
            .iter()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// Command names (not aliases) starting with `partial`.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let lower = partial.to_lowercase();
        self.commands
            .iter()
            .map(|c| c.name())
            .filter(|name| name.starts_with(&lower))
            .map(str::to_string)
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Owned state behind an [`Environment`] for command tests.
    pub struct Fixture {
        pub mode: Mode,
        pub profile: Option<Profile>,
        pub store: SessionStore,
        pub transcript: Vec<String>,
        pub rng: StdRng,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                mode: Mode::default(),
                profile: None,
                store: SessionStore::in_memory(),
                transcript: Vec::new(),
                rng: StdRng::seed_from_u64(7),
            }
        }

        pub fn with_plan(plan: Plan) -> Self {
            let mut f = Self::new();
            f.profile = Some(Profile {
                id: "u1".into(),
                name: "neo".into(),
                plan,
                achievements: Vec::new(),
            });
            f
        }

        pub fn run(&mut self, reg: &CommandRegistry, line: &str) -> Result<CommandOutput> {
            let mut env = Environment {
                mode: &mut self.mode,
                profile: self.profile.as_ref(),
                store: &mut self.store,
                transcript: &self.transcript,
                feed: None,
                source: hackertrace_trace::city("delhi").unwrap(),
                rng: &mut self.rng,
                now_ms: 1_700_000_000_000,
            };
            reg.execute(line, &mut env)
        }

        /// Run and unwrap visible lines.
        pub fn lines(&mut self, reg: &CommandRegistry, line: &str) -> Vec<String> {
            match self.run(reg, line).unwrap() {
                CommandOutput::Lines(l) => l,
                other => panic!("expected lines, got {other:?}"),
            }
        }
    }
}
