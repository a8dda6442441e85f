//! Session commands: save, sessions, replay, export, clear.

use std::collections::BTreeMap;

use hackertrace_store::{ExportFormat, LogSession, format_timestamp};
use hackertrace_types::error::{HackerError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

// ---------------------------------------------------------------------------
// save
// ---------------------------------------------------------------------------

struct SaveCmd;
impl Command for SaveCmd {
    fn name(&self) -> &str {
        "save"
    }
    fn description(&self) -> &str {
        "Save current session logs"
    }
    fn usage(&self) -> &str {
        "save"
    }
    fn category(&self) -> &str {
        "session"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let id = env.store.new_session_id(&mut *env.rng);
        let mut meta = BTreeMap::new();
        meta.insert("real".to_string(), serde_json::Value::Bool(env.mode.real));
        meta.insert("map3d".to_string(), serde_json::Value::Bool(env.mode.map3d));
        let session = LogSession {
            id: id.clone(),
            user_id: env.profile.map(|p| p.id.clone()),
            created_at: env.now_ms,
            lines: env.transcript.to_vec(),
            meta,
        };
        if !env.store.save_session(session) {
            log::warn!("Session {id} was not persisted");
        }
        Ok(CommandOutput::lines([format!("Saved session {id}")]))
    }
}

// ---------------------------------------------------------------------------
// sessions
// ---------------------------------------------------------------------------

struct SessionsCmd;
impl Command for SessionsCmd {
    fn name(&self) -> &str {
        "sessions"
    }
    fn description(&self) -> &str {
        "List saved sessions"
    }
    fn usage(&self) -> &str {
        "sessions"
    }
    fn category(&self) -> &str {
        "session"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let list = env.store.list_sessions();
        if list.is_empty() {
            return Ok(CommandOutput::lines(["No sessions."]));
        }
        let mut lines = vec!["SESSIONS:".to_string()];
        lines.extend(
            list.iter()
                .map(|s| format!("{} - {}", s.id, format_timestamp(s.created_at))),
        );
        Ok(CommandOutput::Lines(lines))
    }
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

struct ReplayCmd;
impl Command for ReplayCmd {
    fn name(&self) -> &str {
        "replay"
    }
    fn description(&self) -> &str {
        "Replay a session"
    }
    fn usage(&self) -> &str {
        "replay <id>"
    }
    fn category(&self) -> &str {
        "session"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let id = args
            .first()
            .ok_or_else(|| HackerError::usage(self.usage()))?;
        let session = env
            .store
            .get_session(id)
            .ok_or_else(|| HackerError::NotFound(id.to_string()))?;
        Ok(CommandOutput::Lines(session.lines))
    }
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

struct ExportCmd;
impl Command for ExportCmd {
    fn name(&self) -> &str {
        "export"
    }
    fn description(&self) -> &str {
        "Export a session as json or txt"
    }
    fn usage(&self) -> &str {
        "export <id> (json|txt)"
    }
    fn category(&self) -> &str {
        "session"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let id = args
            .first()
            .ok_or_else(|| HackerError::usage(self.usage()))?;
        let format = match args.get(1) {
            Some(f) => f.parse::<ExportFormat>()?,
            None => ExportFormat::default(),
        };
        Ok(CommandOutput::Export {
            id: id.to_string(),
            format,
        })
    }
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clear the terminal"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Clear)
    }
}

/// Register save, sessions, replay, export and clear.
pub fn register_session_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(SaveCmd));
    reg.register(Box::new(SessionsCmd));
    reg.register(Box::new(ReplayCmd));
    reg.register(Box::new(ExportCmd));
}
