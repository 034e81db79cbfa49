use std::time::Duration;

use docent_config::model::ProviderId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing API key for {provider}, set the `{env}` environment variable")]
    MissingCredential { provider: ProviderId, env: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("no response from model for {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    Config(String),
}

/// How a completion failed, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider refused or could not understand the request.
    ProviderRejected,

    /// The provider could not be reached, or stopped responding.
    NetworkFailure,

    /// No API key is available for the provider.
    MissingCredential,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::Request(_) | Self::Stream(_) | Self::Timeout(_) => ErrorKind::NetworkFailure,
            Self::Api { .. } | Self::Json(_) | Self::Config(_) => ErrorKind::ProviderRejected,
        }
    }

    /// Whether the request may succeed when sent again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(error) => error.is_timeout() || error.is_connect(),
            Self::Api { code, .. } => matches!(code, 408 | 429 | 500 | 502 | 503 | 504),
            Self::Stream(_)
            | Self::Timeout(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::MissingCredential { .. } => false,
        }
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        let cases = vec![
            (
                Error::MissingCredential {
                    provider: ProviderId::Google,
                    env: "GOOGLE_API_KEY".to_owned(),
                },
                ErrorKind::MissingCredential,
            ),
            (
                Error::Api {
                    code: 400,
                    message: "bad".to_owned(),
                },
                ErrorKind::ProviderRejected,
            ),
            (Error::Stream("eof".to_owned()), ErrorKind::NetworkFailure),
            (
                Error::Timeout(Duration::from_secs(1)),
                ErrorKind::NetworkFailure,
            ),
            (Error::Config("header".to_owned()), ErrorKind::ProviderRejected),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn test_is_transient() {
        for code in [408, 429, 500, 502, 503, 504] {
            let error = Error::Api {
                code,
                message: String::new(),
            };
            assert!(error.is_transient(), "{code}");
        }

        for code in [400, 401, 403, 404] {
            let error = Error::Api {
                code,
                message: String::new(),
            };
            assert!(!error.is_transient(), "{code}");
        }

        assert!(!Error::Stream("reset".to_owned()).is_transient());
    }

    #[test]
    fn test_missing_credential_message() {
        let error = Error::MissingCredential {
            provider: ProviderId::Openai,
            env: "OPENAI_API_KEY".to_owned(),
        };

        assert_eq!(
            error.to_string(),
            "missing API key for openai, set the `OPENAI_API_KEY` environment variable"
        );
    }
}
