//! Provider configuration.

use schematic::Config;

/// LLM provider configurations.
#[derive(Debug, Clone, Config)]
#[config(rename_all = "snake_case")]
pub struct ProvidersConfig {
    #[setting(nested)]
    pub google: GoogleConfig,

    #[setting(nested)]
    pub openai: OpenaiConfig,
}

/// Google API configuration.
#[derive(Debug, Clone, Config)]
#[config(rename_all = "snake_case")]
pub struct GoogleConfig {
    /// Environment variable that contains the API key.
    #[setting(default = "GOOGLE_API_KEY")]
    pub api_key_env: String,

    /// The base URL to use for API requests.
    #[setting(
        default = "https://generativelanguage.googleapis.com/v1beta",
        env = "DOCENT_GOOGLE_BASE_URL"
    )]
    pub base_url: String,
}

/// Openai-compatible API configuration.
#[derive(Debug, Clone, Config)]
#[config(rename_all = "snake_case")]
pub struct OpenaiConfig {
    /// Environment variable that contains the API key.
    #[setting(default = "OPENAI_API_KEY")]
    pub api_key_env: String,

    /// The base URL to use for API requests.
    #[setting(default = "https://api.openai.com/v1", env = "DOCENT_OPENAI_BASE_URL")]
    pub base_url: String,
}
