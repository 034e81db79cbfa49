use async_stream::stream;
use async_trait::async_trait;
use backon::ExponentialBuilder;
use docent_config::{
    model::{Name, ProviderId},
    parameters::ParametersConfig,
    providers::OpenaiConfig,
};
use docent_conversation::OutboundPayload;
use futures::StreamExt as _;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{EventStream, Provider, resolve_credential, sse};
use crate::{
    Error, Result,
    event::{Event, FinishReason, Usage},
};

static PROVIDER: ProviderId = ProviderId::Openai;

/// Any OpenAI-compatible `chat/completions` endpoint.
///
/// This includes `LiteLLM` proxies, which route model names such as
/// `gemini/gemini-2.0-flash-001` to the matching upstream provider.
#[derive(Debug, Clone)]
pub struct Openai {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    backoff: ExponentialBuilder,
}

impl Openai {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.openai.com/v1".to_owned(),
            api_key,
            backoff: sse::default_backoff(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn try_from_config(config: &OpenaiConfig, api_key: Option<String>) -> Result<Self> {
        let api_key = resolve_credential(PROVIDER, &config.api_key_env, api_key)?;

        Ok(Self::new(api_key).with_base_url(config.base_url.clone()))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", self.api_key)
                .parse()
                .map_err(|e| Error::Config(format!("Invalid API key header format: {e}")))?,
        );

        Ok(headers)
    }
}

#[async_trait]
impl Provider for Openai {
    async fn chat_completion_stream(
        &self,
        model: &Name,
        parameters: &ParametersConfig,
        payload: &OutboundPayload,
    ) -> Result<EventStream> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = request(model, parameters, payload);

        debug!(%model, turns = payload.len(), "Requesting chat completion.");
        let mut lines = sse::post(&self.http, &url, &self.headers()?, &body, self.backoff).await?;

        Ok(Box::pin(stream! {
            let mut usage = None;
            let mut finish_reason = None;
            let mut done = false;

            while let Some(data) = lines.next().await {
                let chunk = match data {
                    Ok(sse::Data::Done) => {
                        done = true;
                        break;
                    }
                    Ok(sse::Data::Payload(data)) => parse_chunk(&data),
                    Err(error) => Err(error),
                };

                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(error) => {
                        yield Err(error);
                        return;
                    }
                };

                if let Some(completion_usage) = chunk.usage {
                    usage = Some(Usage::from(completion_usage));
                }

                for choice in chunk.choices {
                    if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                        yield Ok(Event::Chunk(content));
                    }

                    if let Some(reason) = choice.finish_reason {
                        finish_reason = Some(map_finish_reason(&reason));
                    }
                }
            }

            // A stream closed without `[DONE]` or a finish reason was cut off.
            if !done && finish_reason.is_none() {
                warn!("Chat completion stream ended before completion.");
                yield Err(Error::Stream("stream ended before completion".to_owned()));
                return;
            }

            if let Some(usage) = usage {
                yield Ok(Event::Usage(usage));
            }

            trace!(?finish_reason, "Chat completion stream ended.");
            yield Ok(Event::Finished(finish_reason.unwrap_or(FinishReason::Completed)));
        }))
    }
}

fn request<'a>(
    model: &'a Name,
    parameters: &ParametersConfig,
    payload: &'a OutboundPayload,
) -> Request<'a> {
    Request {
        model: model.as_str(),
        messages: payload
            .turns()
            .iter()
            .map(|turn| Message {
                role: turn.role.as_str(),
                content: &turn.content,
            })
            .collect(),
        stream: true,
        stream_options: StreamOptions {
            include_usage: true,
        },
        temperature: parameters.temperature,
        top_p: parameters.top_p,
        max_tokens: parameters.max_output_tokens,
    }
}

fn parse_chunk(data: &str) -> Result<Chunk> {
    let chunk: Chunk = serde_json::from_str(data)?;

    match chunk.error {
        Some(error) => Err(error.into_error()),
        None => Ok(chunk),
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Completed,
        "length" => FinishReason::MaxTokens,
        other => FinishReason::Other(other.to_owned()),
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    stream_options: StreamOptions,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<CompletionUsage>,
    error: Option<sse::ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl From<CompletionUsage> for Usage {
    fn from(usage: CompletionUsage) -> Self {
        Self {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
