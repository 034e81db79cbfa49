//! Layered application configuration.
//!
//! Values are resolved from, in increasing order of precedence: built-in
//! defaults, the user configuration file, a project `docent.toml` (or an
//! explicit path), and `DOCENT_*` environment variables. Command-line
//! overrides are applied by the caller on the resolved [`AppConfig`].

pub mod assistant;
pub mod document;
mod error;
pub mod fs;
pub mod model;
pub mod parameters;
pub mod providers;

use assistant::{AssistantConfig, PartialAssistantConfig};
use document::{DocumentConfig, PartialDocumentConfig};
use parameters::{ParametersConfig, PartialParametersConfig};
use providers::{PartialProvidersConfig, ProvidersConfig};
use schematic::Config;

pub use error::Error;
pub use fs::{load, user_config_path};

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// The complete application configuration.
#[derive(Debug, Clone, Config)]
#[config(rename_all = "snake_case")]
pub struct AppConfig {
    /// Assistant configuration.
    #[setting(nested)]
    pub assistant: AssistantConfig,

    /// Generation parameters sent with every completion request.
    #[setting(nested)]
    pub parameters: ParametersConfig,

    /// Provider configuration.
    #[setting(nested)]
    pub providers: ProvidersConfig,

    /// Document extraction configuration.
    #[setting(nested)]
    pub document: DocumentConfig,
}
