//! The document-grounded conversation assembler.
//!
//! A [`Session`] owns the transcript of a single chat and the text of the
//! most recently uploaded document. Submitting a query yields the
//! [`OutboundPayload`] to send to a model; the document text only ever
//! appears in that payload, never in the stored transcript.

mod context;
mod instructions;
mod session;
mod turn;

pub use context::{DocumentContext, with_context};
pub use instructions::{DEFAULT_PERSONA, Instructions};
pub use session::{OutboundPayload, Session};
pub use turn::{Role, Transcript, Turn};
