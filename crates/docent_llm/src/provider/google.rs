use async_stream::stream;
use async_trait::async_trait;
use backon::ExponentialBuilder;
use docent_config::{
    model::{Name, ProviderId},
    parameters::ParametersConfig,
    providers::GoogleConfig,
};
use docent_conversation::{OutboundPayload, Role};
use futures::StreamExt as _;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{EventStream, Provider, resolve_credential, sse};
use crate::{
    Error, Result,
    event::{Event, FinishReason, Usage},
};

static PROVIDER: ProviderId = ProviderId::Google;

/// Google Gemini, through the `generativelanguage` REST API.
#[derive(Debug, Clone)]
pub struct Google {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    backoff: ExponentialBuilder,
}

impl Google {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_owned(),
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

    pub fn try_from_config(config: &GoogleConfig, api_key: Option<String>) -> Result<Self> {
        let api_key = resolve_credential(PROVIDER, &config.api_key_env, api_key)?;

        Ok(Self::new(api_key).with_base_url(config.base_url.clone()))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            sse::GOOG_API_KEY,
            self.api_key
                .parse()
                .map_err(|e| Error::Config(format!("Invalid API key header format: {e}")))?,
        );

        Ok(headers)
    }
}

#[async_trait]
impl Provider for Google {
    async fn chat_completion_stream(
        &self,
        model: &Name,
        parameters: &ParametersConfig,
        payload: &OutboundPayload,
    ) -> Result<EventStream> {
        let url = format!(
            "{}/models/{model}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/')
        );
        let body = request(parameters, payload);

        debug!(%model, turns = payload.len(), "Requesting Gemini completion.");
        let mut lines = sse::post(&self.http, &url, &self.headers()?, &body, self.backoff).await?;

        Ok(Box::pin(stream! {
            let mut usage = None;
            let mut finish_reason = None;

            while let Some(data) = lines.next().await {
                let response = match data {
                    Ok(sse::Data::Done) => continue,
                    Ok(sse::Data::Payload(data)) => parse_response(&data),
                    Err(error) => Err(error),
                };

                let response = match response {
                    Ok(response) => response,
                    Err(error) => {
                        yield Err(error);
                        return;
                    }
                };

                if let Some(metadata) = response.usage_metadata {
                    usage = Some(Usage::from(metadata));
                }

                for candidate in response.candidates {
                    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
                    for text in parts.into_iter().filter_map(|p| p.text) {
                        if !text.is_empty() {
                            yield Ok(Event::Chunk(text));
                        }
                    }

                    if let Some(reason) = candidate.finish_reason {
                        finish_reason = Some(map_finish_reason(&reason));
                    }
                }
            }

            // Gemini marks the last response with a finish reason.
            let Some(finish_reason) = finish_reason else {
                warn!("Gemini stream ended before completion.");
                yield Err(Error::Stream("stream ended before completion".to_owned()));
                return;
            };

            if let Some(usage) = usage {
                yield Ok(Event::Usage(usage));
            }

            trace!(?finish_reason, "Gemini stream ended.");
            yield Ok(Event::Finished(finish_reason));
        }))
    }
}

fn request<'a>(parameters: &ParametersConfig, payload: &'a OutboundPayload) -> Request<'a> {
    let system_instruction = payload.system().map(|turn| SystemInstruction {
        parts: vec![Part {
            text: &turn.content,
        }],
    });

    let contents = payload
        .messages()
        .map(|turn| Content {
            role: match turn.role {
                Role::Assistant => "model",
                Role::User | Role::System => "user",
            },
            parts: vec![Part {
                text: &turn.content,
            }],
        })
        .collect();

    Request {
        system_instruction,
        contents,
        generation_config: GenerationConfig {
            temperature: parameters.temperature,
            top_p: parameters.top_p,
            top_k: parameters.top_k,
            max_output_tokens: parameters.max_output_tokens,
        },
    }
}

fn parse_response(data: &str) -> Result<Response> {
    let response: Response = serde_json::from_str(data)?;

    match response.error {
        Some(error) => Err(error.into_error()),
        None => Ok(response),
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Completed,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        other => FinishReason::Other(other.to_owned()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<sse::ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl From<UsageMetadata> for Usage {
    fn from(metadata: UsageMetadata) -> Self {
        Self {
            input_tokens: metadata.prompt_token_count,
            output_tokens: metadata.candidates_token_count,
            total_tokens: metadata.total_token_count,
        }
    }
}

#[cfg(test)]
#[path = "google_tests.rs"]
mod tests;
