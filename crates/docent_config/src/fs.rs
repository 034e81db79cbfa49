//! Configuration file discovery and loading.

use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use schematic::ConfigLoader;
use tracing::{debug, info, trace};

use crate::{AppConfig, Error, Result};

/// Application name for configuration file storage paths.
const APPLICATION: &str = "docent";

/// File name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "docent.toml";

/// Commented configuration written by `docent init`.
///
/// Every value matches the built-in default.
pub const CONFIG_TEMPLATE: &str = r#"# docent configuration.
#
# Values set here override the user configuration file, and are overridden by
# `DOCENT_*` environment variables and command-line flags.

[assistant]
# The model to chat with, as `provider/name`. Run `docent models` for a list.
model = "google/gemini-1.5-flash-001"

# Replace the built-in tutor persona.
# persona = "Your name is ..."

# Extra rules the assistant must follow.
rules = []

# Seconds to wait for the next streamed chunk. Zero disables the timeout.
stream_timeout_secs = 60

[parameters]
temperature = 0.7
top_p = 0.95
top_k = 40
max_output_tokens = 8192

[providers.google]
api_key_env = "GOOGLE_API_KEY"
base_url = "https://generativelanguage.googleapis.com/v1beta"

[providers.openai]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"

[document]
min_text_len = 5
preview_len = 200
"#;

/// Path to the user configuration file, if a home directory can be found.
#[must_use]
pub fn user_config_path() -> Option<Utf8PathBuf> {
    ProjectDirs::from("", "", APPLICATION)
        .map(|p| p.config_dir().join("config.toml"))
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

/// Load the configuration for a session started in `directory`.
///
/// The user configuration file is always considered. If `explicit` is given
/// it must exist, and replaces the lookup of [`PROJECT_CONFIG_FILE`] in
/// `directory`.
pub fn load(explicit: Option<&Utf8Path>, directory: &Utf8Path) -> Result<AppConfig> {
    let mut paths = vec![];
    paths.extend(user_config_path());

    match explicit {
        Some(path) if !path.is_file() => return Err(Error::NotFound(path.to_path_buf())),
        Some(path) => paths.push(path.to_path_buf()),
        None => paths.push(directory.join(PROJECT_CONFIG_FILE)),
    }

    load_files(&paths)
}

/// Merge the given files, in order, on top of the defaults.
///
/// Missing files are skipped.
pub fn load_files(paths: &[Utf8PathBuf]) -> Result<AppConfig> {
    let mut loader = ConfigLoader::<AppConfig>::new();

    for path in paths {
        if !path.is_file() {
            trace!(path = path.as_str(), "No configuration file.");
            continue;
        }

        info!(path = path.as_str(), "Found configuration file.");
        loader.file(path.as_std_path())?;
    }

    let config = loader.load()?.config;
    debug!(?config, "Loaded configuration.");

    Ok(config)
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
