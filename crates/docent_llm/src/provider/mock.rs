//! Mock provider for exercising chat flows without real API calls.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_stream::stream;
use async_trait::async_trait;
use docent_config::{model::Name, parameters::ParametersConfig};
use docent_conversation::OutboundPayload;

use super::{EventStream, Provider};
use crate::{
    Error, Result,
    event::{Event, FinishReason, Usage},
};

/// A scripted outcome of a single stream item.
#[derive(Debug, Clone, PartialEq)]
pub enum MockItem {
    Event(Event),

    /// Fail the stream with a [`Error::Stream`] carrying this message.
    Fail(String),
}

/// A scripted failure of the initial request.
#[derive(Debug, Clone, PartialEq)]
pub enum MockFailure {
    Rejected { code: u16, message: String },
    Network(String),
}

impl From<&MockFailure> for Error {
    fn from(failure: &MockFailure) -> Self {
        match failure.clone() {
            MockFailure::Rejected { code, message } => Self::Api { code, message },
            MockFailure::Network(message) => Self::Stream(message),
        }
    }
}

/// A mock LLM provider.
///
/// Every request receives the same scripted stream. Received payloads are
/// recorded and can be inspected with [`MockProvider::requests`].
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    items: Vec<MockItem>,
    failure: Option<MockFailure>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<OutboundPayload>>>,
}

impl MockProvider {
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            items: events.into_iter().map(MockItem::Event).collect(),
            ..Default::default()
        }
    }

    /// Stream `content` as a single chunk.
    #[must_use]
    pub fn with_message(content: &str) -> Self {
        Self::with_chunked_message(&[content])
    }

    /// Stream each of `chunks` in order, followed by usage and a finish
    /// event.
    #[must_use]
    pub fn with_chunked_message(chunks: &[&str]) -> Self {
        let mut events = Vec::with_capacity(chunks.len() + 2);
        for &chunk in chunks {
            events.push(Event::Chunk(chunk.to_owned()));
        }

        let output_tokens = u32::try_from(chunks.len()).unwrap_or(u32::MAX);
        events.push(Event::Usage(Usage {
            input_tokens: 10,
            output_tokens,
            total_tokens: 10 + output_tokens,
        }));
        events.push(Event::Finished(FinishReason::Completed));

        Self::new(events)
    }

    /// Stream `chunks`, then fail.
    #[must_use]
    pub fn with_stream_error(chunks: &[&str], message: &str) -> Self {
        let mut items: Vec<_> = chunks
            .iter()
            .map(|c| MockItem::Event(Event::Chunk((*c).to_owned())))
            .collect();
        items.push(MockItem::Fail(message.to_owned()));

        Self {
            items,
            ..Default::default()
        }
    }

    /// Fail before streaming anything.
    #[must_use]
    pub fn failing(failure: MockFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    /// Wait `delay` before every stream item.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The payloads received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<OutboundPayload> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn chat_completion_stream(
        &self,
        _model: &Name,
        _parameters: &ParametersConfig,
        payload: &OutboundPayload,
    ) -> Result<EventStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(payload.clone());
        }

        if let Some(failure) = &self.failure {
            return Err(failure.into());
        }

        let items = self.items.clone();
        let delay = self.delay;

        Ok(Box::pin(stream! {
            for item in items {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }

                match item {
                    MockItem::Event(event) => yield Ok(event),
                    MockItem::Fail(message) => {
                        yield Err(Error::Stream(message));
                        break;
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use docent_conversation::Turn;
    use futures::TryStreamExt as _;
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn parameters() -> ParametersConfig {
        ParametersConfig {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }

    #[test(tokio::test)]
    async fn test_mock_records_requests() {
        let provider = MockProvider::with_chunked_message(&["a", "b"]);
        let payload = OutboundPayload::from(vec![Turn::user("Q")]);
        let model: Name = "mock".parse().unwrap();

        let reply = provider
            .chat_completion(&model, &parameters(), &payload)
            .await
            .unwrap();

        assert_eq!(reply.content, "ab");
        assert_eq!(reply.usage.map(|u| u.output_tokens), Some(2));
        assert_eq!(reply.finish_reason, Some(FinishReason::Completed));
        assert_eq!(provider.requests(), vec![payload]);
    }

    #[test(tokio::test)]
    async fn test_mock_stream_error() {
        let provider = MockProvider::with_stream_error(&["partial"], "connection reset");
        let payload = OutboundPayload::from(vec![Turn::user("Q")]);
        let model: Name = "mock".parse().unwrap();

        let result: Result<Vec<Event>> = provider
            .chat_completion_stream(&model, &parameters(), &payload)
            .await
            .unwrap()
            .try_collect()
            .await;

        assert_eq!(result, Err(Error::Stream("connection reset".to_owned())));
    }

    #[test(tokio::test)]
    async fn test_mock_failure() {
        let provider = MockProvider::failing(MockFailure::Rejected {
            code: 400,
            message: "nope".to_owned(),
        });
        let payload = OutboundPayload::from(vec![Turn::user("Q")]);
        let model: Name = "mock".parse().unwrap();

        let error = provider
            .chat_completion(&model, &parameters(), &payload)
            .await
            .unwrap_err();

        assert_eq!(error, Error::Api {
            code: 400,
            message: "nope".to_owned(),
        });
        assert_eq!(provider.requests().len(), 1);
    }
}
