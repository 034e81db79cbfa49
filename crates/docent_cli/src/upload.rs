//! Reading user-supplied documents into a [`Session`].

use std::fs;

use camino::Utf8Path;
use docent_conversation::Session;
use docent_document::Extractor;
use tracing::{debug, warn};

use crate::Result;

/// Extract the PDF at `path` and make it the active document of `session`.
///
/// Returns the number of extracted characters. On failure the session keeps
/// its previous document.
pub(crate) fn upload(session: &mut Session, extractor: &Extractor, path: &Utf8Path) -> Result<usize> {
    let bytes = fs::read(path)?;
    debug!(path = path.as_str(), size = bytes.len(), "Read document.");

    let text = extractor.extract(&bytes).inspect_err(|error| {
        warn!(path = path.as_str(), %error, "Document rejected.");
    })?;

    let chars = text.chars().count();
    session.record_upload(&text)?;

    Ok(chars)
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
