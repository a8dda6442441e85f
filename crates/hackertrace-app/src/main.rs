//! hackertrace command-line entry point.
//!
//! Runs the cinematic terminal on stdin/stdout (the default), the typing
//! trainer, or a listing of saved sessions. Settings come from
//! `hackertrace.toml` (see `--config` and `HACKERTRACE_CONFIG`).

mod listing;
mod repl;
mod trainer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hackertrace_store::{FileStorage, SessionStore, TypingMode};
use hackertrace_terminal::Terminal;
use hackertrace_types::HackerConfig;

#[derive(Parser)]
#[command(name = "hackertrace")]
#[command(version, about = "Cinematic hacker terminal and typing trainer", long_about = None)]
struct Cli {
    /// Config file (defaults to $HACKERTRACE_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print output at once instead of typing it out
    #[arg(long, global = true)]
    instant: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal (default)
    Terminal {
        /// Replay a saved session before the prompt
        #[arg(long)]
        session: Option<String>,
    },
    /// Typing-speed trainer
    Typing {
        /// Prompt length in words
        #[arg(long, conflicts_with = "seconds")]
        words: Option<usize>,
        /// Time limit in seconds
        #[arg(long)]
        seconds: Option<u32>,
    },
    /// List saved terminal sessions and typing runs
    Sessions,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = HackerConfig::load(cli.config.as_deref()).context("loading config")?;
    config.validate()?;

    let storage = FileStorage::open(&config.data_dir)
        .with_context(|| format!("opening {}", config.data_dir.display()))?;
    log::info!("Session data in {}", storage.root().display());
    let store = SessionStore::new(Box::new(storage), config.store_cap_bytes);

    match cli.command.unwrap_or(Commands::Terminal { session: None }) {
        Commands::Terminal { session } => {
            let mut term = Terminal::from_config(&config, store)?;
            term.boot();
            if let Some(id) = session
                && !term.replay_on_start(&id)
            {
                eprintln!("no saved session {id}");
            }
            repl::run(&mut term, cli.instant)?;
        },
        Commands::Typing { words, seconds } => {
            let mode = match (words, seconds) {
                (_, Some(duration_sec)) => TypingMode::Time { duration_sec },
                (Some(word_count), None) => TypingMode::Words { word_count },
                (None, None) => TypingMode::default(),
            };
            let mut store = store;
            trainer::run(&mut store, mode)?;
        },
        Commands::Sessions => {
            let stdout = std::io::stdout();
            listing::print_sessions(&store, &mut stdout.lock())?;
        },
    }

    Ok(())
}
