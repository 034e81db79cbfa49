/// The text of the most recently uploaded document, if any.
///
/// Only ever replaced, never merged or cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext(Option<String>);

impl DocumentContext {
    #[must_use]
    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.as_deref().is_none_or(str::is_empty)
    }

    pub(crate) fn replace(&mut self, text: String) -> Option<String> {
        self.0.replace(text)
    }
}

/// Prefix `query` with the text of `document`.
#[must_use]
pub fn with_context(document: &str, query: &str) -> String {
    format!("Context Document:\n{document}\n\nUser Query: {query}")
}
