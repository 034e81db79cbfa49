use docent_document::{DEFAULT_MIN_TEXT_LEN, validate_text};
use tracing::{debug, trace};

use crate::{DocumentContext, Instructions, Role, Transcript, Turn, with_context};

/// The state of a single chat.
#[derive(Debug, Clone)]
pub struct Session {
    transcript: Transcript,
    document: DocumentContext,
    min_text_len: usize,
}

impl Session {
    /// Start a session with only the system turn and no document.
    #[must_use]
    pub fn initialize(instructions: &Instructions) -> Self {
        Self {
            transcript: Transcript::new(instructions.render()),
            document: DocumentContext::default(),
            min_text_len: DEFAULT_MIN_TEXT_LEN,
        }
    }

    /// Set the minimum length of an accepted upload.
    #[must_use]
    pub fn with_min_text_len(mut self, min_text_len: usize) -> Self {
        self.min_text_len = min_text_len;
        self
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn document(&self) -> &DocumentContext {
        &self.document
    }

    /// Make `text` the active document.
    ///
    /// Text shorter than the minimum length is rejected, and the previously
    /// active document, if any, stays in place.
    pub fn record_upload(&mut self, text: &str) -> Result<(), docent_document::Error> {
        let text = validate_text(text, self.min_text_len)?;

        debug!(len = text.len(), "Replacing document context.");
        self.document.replace(text.to_owned());

        Ok(())
    }

    /// Append `query` as a user turn and build the payload to send.
    ///
    /// When a document is active, the last payload entry carries the
    /// document ahead of the query. The transcript keeps the query as-is.
    pub fn submit(&mut self, query: impl Into<String>) -> OutboundPayload {
        let query = query.into();
        self.transcript.push(Turn::user(query.as_str()));

        let mut turns = self.transcript.to_vec();
        if let Some(document) = self.document.get().filter(|d| !d.is_empty())
            && let Some(last) = turns.last_mut()
        {
            trace!(document_len = document.len(), "Adding document context to query.");
            last.content = with_context(document, &query);
        }

        OutboundPayload(turns)
    }

    /// Append the fully streamed reply to the transcript.
    ///
    /// Only call this once the model stream has completed successfully.
    pub fn complete_assistant_turn(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::assistant(text));
    }

    /// All turns except the system turn, in transcript order.
    pub fn visible_history(&self) -> impl Iterator<Item = &Turn> + Clone {
        self.transcript.iter().filter(|t| t.role != Role::System)
    }
}

/// The exact sequence of turns sent to a model for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPayload(Vec<Turn>);

impl OutboundPayload {
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    #[must_use]
    pub fn into_turns(self) -> Vec<Turn> {
        self.0
    }

    /// The system turn, if present.
    #[must_use]
    pub fn system(&self) -> Option<&Turn> {
        self.0.iter().find(|t| t.role == Role::System)
    }

    /// All non-system turns, in order.
    pub fn messages(&self) -> impl Iterator<Item = &Turn> {
        self.0.iter().filter(|t| t.role != Role::System)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Turn>> for OutboundPayload {
    fn from(turns: Vec<Turn>) -> Self {
        Self(turns)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
