// CLI module
// Public interface for the chat REPL

mod args;
mod commands;
pub mod display;
pub mod input;
mod progress;
mod session;

pub use args::Args;
pub use commands::{format_help, Command};
pub use input::{open_stdin, LineSource, PipedInput};
pub use progress::{thinking_label, Spinner};
pub use session::{Session, SessionOptions, SessionState, Transition, TurnRunner};
