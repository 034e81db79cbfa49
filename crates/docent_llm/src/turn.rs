use std::time::Duration;

use docent_config::{model::Name, parameters::ParametersConfig};
use docent_conversation::Session;
use futures::StreamExt as _;
use tracing::{debug, info, warn};

use crate::{Error, Event, Provider, Reply, Result};

/// Options for a single [`run_turn`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnOptions {
    /// Give up when no stream item arrives within this duration.
    pub idle_timeout: Option<Duration>,
}

/// Submit `query` to `session` and stream the model's reply.
///
/// Every text chunk is passed to `on_chunk` as it arrives. The reply is
/// appended to the transcript only after the stream completed without error.
/// On failure the user turn stays in the transcript, without a reply.
pub async fn run_turn(
    provider: &dyn Provider,
    model: &Name,
    parameters: &ParametersConfig,
    session: &mut Session,
    query: impl Into<String>,
    options: TurnOptions,
    mut on_chunk: impl FnMut(&str),
) -> Result<Reply> {
    let payload = session.submit(query);
    debug!(%model, turns = payload.len(), "Submitting query.");

    let result = async {
        let mut stream = provider
            .chat_completion_stream(model, parameters, &payload)
            .await?;

        let mut reply = Reply::default();
        loop {
            let next = match options.idle_timeout {
                Some(timeout) => tokio::time::timeout(timeout, stream.next())
                    .await
                    .map_err(|_| Error::Timeout(timeout))?,
                None => stream.next().await,
            };

            let Some(event) = next else {
                break;
            };

            let event = event?;
            if let Event::Chunk(text) = &event {
                on_chunk(text);
            }
            reply.apply(event);
        }

        Ok::<_, Error>(reply)
    }
    .await;

    match result {
        Ok(reply) => {
            info!(
                len = reply.content.len(),
                usage = ?reply.usage,
                finish_reason = ?reply.finish_reason,
                "Reply completed."
            );
            session.complete_assistant_turn(reply.content.clone());
            Ok(reply)
        }
        Err(error) => {
            warn!(%error, kind = ?error.kind(), "Reply failed, transcript left without reply.");
            Err(error)
        }
    }
}

#[cfg(test)]
#[path = "turn_tests.rs"]
mod tests;
