pub mod google;
pub mod mock;
pub mod openai;
mod sse;

use std::{env, pin::Pin};

use async_trait::async_trait;
use docent_config::{
    model::{Name, ProviderId},
    parameters::ParametersConfig,
    providers::ProvidersConfig,
};
use docent_conversation::OutboundPayload;
use futures::{Stream, StreamExt as _};
use google::Google;
use openai::Openai;
use tracing::debug;

use crate::{
    Error, Result,
    event::{Event, Reply},
};

pub type EventStream = Pin<Box<dyn Stream<Item = Result<Event>> + Send>>;

#[async_trait]
pub trait Provider: std::fmt::Debug + Send + Sync {
    /// Start a streamed completion for `payload`.
    ///
    /// Errors returned here happen before any output was produced. Errors in
    /// the stream happen after.
    async fn chat_completion_stream(
        &self,
        model: &Name,
        parameters: &ParametersConfig,
        payload: &OutboundPayload,
    ) -> Result<EventStream>;

    /// Perform a completion and wait for the full reply.
    async fn chat_completion(
        &self,
        model: &Name,
        parameters: &ParametersConfig,
        payload: &OutboundPayload,
    ) -> Result<Reply> {
        let mut stream = self
            .chat_completion_stream(model, parameters, payload)
            .await?;

        let mut reply = Reply::default();
        while let Some(event) = stream.next().await {
            reply.apply(event?);
        }

        Ok(reply)
    }
}

/// Build the provider for `id` from its configuration.
///
/// An explicit `api_key` takes precedence over the configured environment
/// variable.
pub fn get_provider(
    id: ProviderId,
    config: &ProvidersConfig,
    api_key: Option<String>,
) -> Result<Box<dyn Provider>> {
    let provider: Box<dyn Provider> = match id {
        ProviderId::Google => Box::new(Google::try_from_config(&config.google, api_key)?),
        ProviderId::Openai => Box::new(Openai::try_from_config(&config.openai, api_key)?),
    };

    Ok(provider)
}

/// Find the API key for `provider`.
///
/// Blank values are treated as absent.
pub(crate) fn resolve_credential(
    provider: ProviderId,
    env_var: &str,
    explicit: Option<String>,
) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        debug!(%provider, "Using explicitly provided API key.");
        return Ok(key);
    }

    env::var(env_var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .inspect(|_| debug!(%provider, env_var, "Using API key from environment."))
        .ok_or_else(|| Error::MissingCredential {
            provider,
            env: env_var.to_owned(),
        })
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
