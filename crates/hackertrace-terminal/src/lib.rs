//! Command interpreter and terminal session for hackertrace.
//!
//! [`CommandRegistry`] resolves and dispatches commands; [`Terminal`] owns
//! the session state around it and performs the side effects commands
//! signal (clearing, exporting, starting a trace). Output is revealed one
//! character at a time by [`RevealQueue`], and front ends drive timing with
//! [`Scheduler`].

pub mod commands;
pub mod interpreter;
pub mod net_commands;
pub mod reveal;
pub mod scheduler;
pub mod session_commands;
pub mod terminal;

pub use commands::{builtin_registry, register_builtins};
pub use interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, ParsedCommand, parse_command,
};
pub use reveal::{LineTag, RevealEvent, RevealQueue, ShownLine};
pub use scheduler::{CancelToken, Flow, Scheduler};
pub use terminal::{ActiveTrace, BOOT_LINES, Terminal};
