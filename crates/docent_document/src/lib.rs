//! Plain-text extraction from uploaded PDF documents.
//!
//! The extractor only ever sees the raw bytes of an upload. Staging the
//! upload on disk (if at all) is the caller's concern.

mod error;
mod extract;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use error::{Error, ErrorKind};
pub use extract::{DEFAULT_MIN_TEXT_LEN, Extractor, preview, validate_text};

pub(crate) type Result<T> = std::result::Result<T, Error>;
