// Turn module
// One chat turn: preamble, child process, and response classification

mod error;
mod executor;
pub mod preamble;
mod response;
mod types;

pub use error::TurnError;
pub use executor::{NoProgress, ProgressSink, RemoteTarget, TurnExecutor};
pub use response::{ParsedResponse, ResponseMeta};
pub use types::{ThinkingLevel, TurnMode, TurnOutput, TurnRequest, TurnResult};
