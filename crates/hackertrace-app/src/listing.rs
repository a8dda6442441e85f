//! `hackertrace sessions`: both logs, newest first.

use std::io::{self, Write};

use hackertrace_store::{SessionStore, TypingMode, format_timestamp};

fn mode_label(mode: TypingMode) -> String {
    match mode {
        TypingMode::Time { duration_sec } => format!("{duration_sec}s"),
        TypingMode::Words { word_count } => format!("{word_count} words"),
    }
}

pub fn print_sessions(store: &SessionStore, out: &mut dyn Write) -> io::Result<()> {
    let sessions = store.list_sessions();
    if sessions.is_empty() {
        writeln!(out, "No sessions.")?;
    } else {
        writeln!(out, "SESSIONS:")?;
        for s in &sessions {
            writeln!(
                out,
                "{} - {} ({} lines)",
                s.id,
                format_timestamp(s.created_at),
                s.lines.len()
            )?;
        }
    }

    let runs = store.list_typing();
    if runs.is_empty() {
        writeln!(out, "No typing runs.")?;
    } else {
        writeln!(out, "TYPING:")?;
        for r in &runs {
            writeln!(
                out,
                "{} - {} - {} - {} wpm, {}%",
                r.id,
                format_timestamp(r.created_at),
                mode_label(r.mode),
                r.wpm,
                r.accuracy
            )?;
        }
    }
    Ok(())
}
