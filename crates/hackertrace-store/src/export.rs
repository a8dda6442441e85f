//! Session export to downloadable files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hackertrace_types::error::{HackerError, Result};

use crate::session::LogSession;

/// Export file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Newline-joined transcript lines.
    #[default]
    Txt,
    /// Pretty-printed JSON of the full record.
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = HackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            _ => Err(HackerError::usage("export <id> (json|txt)")),
        }
    }
}

/// File name for an exported session: `hackertrace-<id>.<ext>`.
pub fn file_name(id: &str, format: ExportFormat) -> String {
    format!("hackertrace-{id}.{}", format.extension())
}

/// Render a session in the given format.
pub fn render(session: &LogSession, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Txt => Ok(session.lines.join("\n")),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(session)?),
    }
}

/// Write an export into `dir`, returning the written path.
pub fn write_export(dir: &Path, session: &LogSession, format: ExportFormat) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(&session.id, format));
    std::fs::write(&path, render(session, format)?)?;
    log::info!("Exported session {} to {}", session.id, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample() -> LogSession {
        LogSession {
            id: "k3x9qa".into(),
            user_id: None,
            created_at: 1_700_000_000_000,
            lines: vec!["$ trace-route paris".into(), "TRACE COMPLETE.".into()],
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn parse_formats() {
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn file_names() {
        assert_eq!(file_name("abc", ExportFormat::Txt), "hackertrace-abc.txt");
        assert_eq!(file_name("abc", ExportFormat::Json), "hackertrace-abc.json");
    }

    #[test]
    fn render_txt_joins_lines() {
        assert_eq!(
            render(&sample(), ExportFormat::Txt).unwrap(),
            "$ trace-route paris\nTRACE COMPLETE."
        );
    }

    #[test]
    fn render_json_is_pretty_full_record() {
        let text = render(&sample(), ExportFormat::Json).unwrap();
        assert!(text.contains('\n'));
        let back: LogSession = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), &sample(), ExportFormat::Txt).unwrap();
        assert_eq!(path.file_name().unwrap(), "hackertrace-k3x9qa.txt");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.ends_with("TRACE COMPLETE."));
    }
}
