//! Model identifiers.

use std::{fmt, str::FromStr};

use schematic::ConfigEnum;
use serde::{Deserialize, Serialize};

/// A fully qualified model identifier, written as `provider/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub provider: ProviderId,
    pub name: Name,
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.name)
    }
}

impl FromStr for ModelId {
    type Err = ModelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, name) = s
            .split_once('/')
            .map(|(p, n)| (p.trim(), n.trim()))
            .ok_or_else(|| ModelIdError::Format(s.to_owned()))?;

        Ok(Self {
            provider: ProviderId::from_str(provider)
                .map_err(|_| ModelIdError::Provider(provider.to_owned()))?,
            name: Name::from_str(name)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelIdError {
    #[error("expected `provider/name`, got `{0}`")]
    Format(String),

    #[error("unknown provider `{0}`, expected one of: google, openai")]
    Provider(String),

    #[error("invalid model name `{0}`")]
    Name(String),
}

/// The list of supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ConfigEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Google Gemini provider. See: <https://ai.google.dev/gemini-api/docs>.
    #[default]
    Google,

    /// Any OpenAI-compatible chat completions endpoint, including `LiteLLM`
    /// proxies. See: <https://platform.openai.com/docs/api-reference/chat>.
    Openai,
}

/// A model name, as understood by its provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Name(String);

impl Name {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for Name {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for Name {
    type Error = ModelIdError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::from_str(name.as_str())
    }
}

impl FromStr for Name {
    type Err = ModelIdError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.is_empty()
            || name.chars().any(|c| {
                !(c.is_numeric()
                    || c.is_ascii_alphabetic()
                    || c == '-'
                    || c == '_'
                    || c == '.'
                    || c == ':'
                    || c == '/')
            })
        {
            return Err(ModelIdError::Name(name.to_owned()));
        }

        Ok(Self(name.to_owned()))
    }
}
