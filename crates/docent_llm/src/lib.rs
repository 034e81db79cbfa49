//! Streamed chat completions, grounded in a [`Session`].
//!
//! [`Session`]: docent_conversation::Session

pub mod catalog;
mod error;
pub mod event;
pub mod provider;
mod turn;

pub use error::{Error, ErrorKind};
pub use event::{Event, FinishReason, Reply, Usage};
pub use provider::{EventStream, Provider};
pub use turn::{TurnOptions, run_turn};

pub(crate) type Result<T> = std::result::Result<T, Error>;
