//! Streamed completion events.

/// A single event in a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A piece of the reply text.
    Chunk(String),

    /// Token counts for the request, as reported by the provider.
    Usage(Usage),

    /// The model stopped generating.
    Finished(FinishReason),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Completed,
    MaxTokens,
    Other(String),
}

/// The accumulated result of a completion stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub usage: Option<Usage>,
    pub finish_reason: Option<FinishReason>,
}

impl Reply {
    /// Fold `event` into the reply.
    ///
    /// Later usage reports replace earlier ones.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Chunk(text) => self.content.push_str(&text),
            Event::Usage(usage) => self.usage = Some(usage),
            Event::Finished(reason) => self.finish_reason = Some(reason),
        }
    }
}

impl FromIterator<Event> for Reply {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        let mut reply = Self::default();
        for event in iter {
            reply.apply(event);
        }
        reply
    }
}
