//! Assistant configuration.

use std::time::Duration;

use schematic::Config;

use crate::{Result, model::ModelId};

/// The model selected when none is configured.
pub const DEFAULT_MODEL: &str = "google/gemini-1.5-flash-001";

/// Assistant-specific configuration.
#[derive(Debug, Clone, Config)]
#[config(rename_all = "snake_case")]
pub struct AssistantConfig {
    /// The model to chat with, as `provider/name`.
    #[setting(default = "google/gemini-1.5-flash-001", env = "DOCENT_MODEL")]
    pub model: String,

    /// Replaces the built-in tutor persona in the system instructions.
    #[setting(env = "DOCENT_PERSONA")]
    pub persona: Option<String>,

    /// Extra rules listed in the system instructions.
    pub rules: Vec<String>,

    /// Seconds to wait for the next streamed chunk before giving up on a
    /// reply. Zero disables the timeout.
    #[setting(default = 60, env = "DOCENT_STREAM_TIMEOUT_SECS")]
    pub stream_timeout_secs: u64,
}

impl AssistantConfig {
    /// Parse the configured model identifier.
    pub fn model_id(&self) -> Result<ModelId> {
        self.model.parse().map_err(Into::into)
    }

    #[must_use]
    pub fn stream_timeout(&self) -> Option<Duration> {
        (self.stream_timeout_secs > 0).then(|| Duration::from_secs(self.stream_timeout_secs))
    }
}
