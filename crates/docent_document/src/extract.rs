use std::{
    any::Any,
    borrow::Cow,
    panic::{AssertUnwindSafe, catch_unwind},
};

use lopdf::Document;
use tracing::{debug, trace, warn};

use crate::{Error, Result};

/// The minimum number of characters a document must yield, after trimming,
/// to count as having a text layer.
pub const DEFAULT_MIN_TEXT_LEN: usize = 5;

/// Extracts the text layer of a PDF document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extractor {
    min_text_len: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TEXT_LEN)
    }
}

impl Extractor {
    #[must_use]
    pub fn new(min_text_len: usize) -> Self {
        Self { min_text_len }
    }

    #[must_use]
    pub fn min_text_len(&self) -> usize {
        self.min_text_len
    }

    /// Extract the trimmed text of every page, in page order.
    ///
    /// Pages whose text cannot be decoded are skipped. No partial text is
    /// returned on failure.
    pub fn extract(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::ParseFailed("empty input".to_owned()));
        }

        let document = guarded(|| Document::load_mem(bytes))??;
        let pages = document.get_pages();
        debug!(
            size = bytes.len(),
            pages = pages.len(),
            "Loaded PDF document."
        );

        let mut text = String::new();
        for number in pages.keys() {
            match guarded(|| document.extract_text(&[*number]))? {
                Ok(page) => {
                    trace!(page = number, len = page.len(), "Extracted page text.");
                    text.push_str(&page);
                }
                Err(error) => {
                    warn!(page = number, %error, "Skipping page without decodable text.");
                }
            }
        }

        validate_text(&text, self.min_text_len).map(ToOwned::to_owned)
    }
}

/// Run a parser call, turning a panic on malformed input into
/// [`Error::ParseFailed`].
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|panic| {
        let message = panic_message(&*panic);
        warn!(%message, "PDF parser panicked.");

        Error::ParseFailed(message)
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "malformed document".to_owned())
}

/// Trim `text` and check that at least `min_text_len` characters remain.
pub fn validate_text(text: &str, min_text_len: usize) -> Result<&str> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();

    if len < min_text_len {
        debug!(len, min_text_len, "Document text below threshold.");
        return Err(Error::NoTextFound);
    }

    Ok(trimmed)
}

/// The first `max_chars` characters of `text`.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => Cow::Owned(text[..end].to_owned()),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
