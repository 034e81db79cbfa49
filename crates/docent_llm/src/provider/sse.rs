//! Server-sent event transport shared by the HTTP providers.

use std::{collections::HashMap, io, pin::Pin, time::Duration};

use backon::{ExponentialBuilder, Retryable as _};
use futures::{Stream, TryStreamExt as _, future};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::{
    codec::{FramedRead, LinesCodec},
    io::StreamReader,
};
use tracing::{error, trace, warn};

use crate::{Error, Result};

/// The `data` payloads of an event stream.
pub(super) type DataStream = Pin<Box<dyn Stream<Item = Result<Data>> + Send>>;

/// A `data:` field of an event stream.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Data {
    /// A JSON payload.
    Payload(String),

    /// The OpenAI `[DONE]` marker, sent after the last payload.
    Done,
}

/// Header carrying the Gemini API key.
pub(super) const GOOG_API_KEY: &str = "x-goog-api-key";

/// The backoff used when the initial request fails with a transient error.
pub(super) fn default_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(3)
}

/// Send `body` to `url`, and stream back the event data.
///
/// Only establishing the stream is retried. Once the response status is
/// accepted, errors are returned through the stream.
pub(super) async fn post<B: Serialize + Sync + ?Sized>(
    http: &reqwest::Client,
    url: &str,
    headers: &HeaderMap,
    body: &B,
    backoff: ExponentialBuilder,
) -> Result<DataStream> {
    let response = (|| send(http, url, headers, body))
        .retry(backoff)
        .sleep(tokio::time::sleep)
        .when(Error::is_transient)
        .notify(|error, delay| warn!(%error, ?delay, "Request failed. Retrying."))
        .await?;

    let bytes = response.bytes_stream().map_err(io::Error::other);
    let lines = FramedRead::new(StreamReader::new(bytes), LinesCodec::new())
        .map_err(|error| Error::Stream(error.to_string()))
        .try_filter_map(|line| future::ready(Ok(parse_data_line(&line))));

    Ok(Box::pin(lines))
}

async fn send<B: Serialize + Sync + ?Sized>(
    http: &reqwest::Client,
    url: &str,
    headers: &HeaderMap,
    body: &B,
) -> Result<reqwest::Response> {
    trace!(%url, headers = ?redacted(headers), "Triggering request.");
    let response = http
        .post(url)
        .headers(headers.clone())
        .json(body)
        .send()
        .await?;

    trace!(
        status = response.status().as_u16(),
        content_length = response.content_length().unwrap_or_default(),
        content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap_or_default()),
        "Received response."
    );

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let code = status.as_u16();
        let body = response.text().await?;

        error!(status = code, body, "Unexpected response.");

        return Err(Error::Api {
            code,
            message: error_message(&body).unwrap_or(body),
        });
    }

    Ok(response)
}

/// Extract the payload of a `data:` line.
///
/// Comments, other fields and blank lines yield nothing.
pub(super) fn parse_data_line(line: &str) -> Option<Data> {
    match line.strip_prefix("data:")?.trim() {
        "" => None,
        "[DONE]" => Some(Data::Done),
        data => Some(Data::Payload(data.to_owned())),
    }
}

/// An error object, as returned by both Gemini and OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
pub(super) struct ApiError {
    #[serde(default)]
    pub code: Option<Value>,
    pub message: String,
}

impl ApiError {
    pub(super) fn into_error(self) -> Error {
        let code = self
            .code
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(500);

        Error::Api {
            code,
            message: self.message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// The human-readable message in an error response body, if any.
///
/// Gemini wraps the error object in an array on streaming endpoints.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        value => value,
    };

    serde_json::from_value::<ErrorEnvelope>(value)
        .ok()
        .map(|e| e.error.message)
}

fn redacted(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| {
            if k == AUTHORIZATION || k.as_str() == GOOG_API_KEY {
                return (k.to_string(), "[REDACTED]".to_owned());
            }

            (k.to_string(), v.to_str().unwrap_or_default().to_owned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_data_line() {
        let cases = vec![
            (r#"data: {"a":1}"#, Some(Data::Payload(r#"{"a":1}"#.to_owned()))),
            (r#"data:{"a":1}"#, Some(Data::Payload(r#"{"a":1}"#.to_owned()))),
            ("data: [DONE]", Some(Data::Done)),
            ("data:", None),
            ("", None),
            (": keep-alive", None),
            ("event: message", None),
        ];

        for (line, expected) in cases {
            assert_eq!(parse_data_line(line), expected, "{line:?}");
        }
    }

    #[test]
    fn test_error_message() {
        let gemini = r#"[{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}]"#;
        let openai = r#"{"error":{"message":"Incorrect API key provided.","type":"invalid_request_error","code":"invalid_api_key"}}"#;

        assert_eq!(error_message(gemini).as_deref(), Some("API key not valid."));
        assert_eq!(
            error_message(openai).as_deref(),
            Some("Incorrect API key provided.")
        );
        assert_eq!(error_message("Bad Gateway"), None);
    }

    #[test]
    fn test_api_error_code() {
        let error: ApiError = serde_json::from_str(r#"{"code":429,"message":"slow down"}"#).unwrap();
        assert_eq!(error.into_error(), Error::Api {
            code: 429,
            message: "slow down".to_owned()
        });

        let error: ApiError =
            serde_json::from_str(r#"{"code":"server_error","message":"oops"}"#).unwrap();
        assert_eq!(error.into_error(), Error::Api {
            code: 500,
            message: "oops".to_owned()
        });
    }

    #[test]
    fn test_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer secret".parse().unwrap());
        headers.insert(GOOG_API_KEY, "secret".parse().unwrap());
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());

        let redacted = redacted(&headers);

        assert_eq!(redacted["authorization"], "[REDACTED]");
        assert_eq!(redacted["x-goog-api-key"], "[REDACTED]");
        assert_eq!(redacted["content-type"], "application/json");
    }
}
