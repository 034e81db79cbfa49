mod ask;
mod chat;
mod extract;
mod init;
mod models;

use std::{fmt, num::NonZeroI32};

use comfy_table::Row;
use docent_llm::Usage;
use serde_json::Value;

use crate::Ctx;

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Write a default `docent.toml` to the current directory.
    Init(init::Init),

    /// Chat interactively, optionally about a PDF document.
    #[command(visible_alias = "c")]
    Chat(chat::Chat),

    /// Ask a single question and print the reply.
    #[command(visible_alias = "a")]
    Ask(ask::Ask),

    /// Extract and preview the text of a PDF document.
    Extract(extract::Extract),

    /// List the models available for selection.
    Models(models::Models),
}

impl Commands {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Output {
        match self {
            Commands::Chat(args) => args.run(ctx).await,
            Commands::Ask(args) => args.run(ctx).await,
            Commands::Extract(args) => args.run(ctx),
            Commands::Models(args) => Ok(args.run(ctx)),
            Commands::Init(args) => args.run(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Init(_) => "init",
            Commands::Chat(_) => "chat",
            Commands::Ask(_) => "ask",
            Commands::Extract(_) => "extract",
            Commands::Models(_) => "models",
        }
    }
}

pub(crate) type Output = std::result::Result<Success, Error>;

const FAILURE: NonZeroI32 = NonZeroI32::new(1).unwrap();

/// The type of output that should be printed to the screen.
#[derive(Debug)]
pub(crate) enum Success {
    /// The command was successful.
    Ok,

    /// Single message to be printed to the screen.
    Message(String),

    /// List of details to be printed in a table.
    Table { header: Row, rows: Vec<Row> },

    /// Details of a single item to be printed.
    Details {
        title: Option<String>,
        rows: Vec<Row>,
    },

    /// JSON value to be printed.
    Json(Value),
}

impl From<String> for Success {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<Value> for Success {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Render token usage as a single line.
pub(crate) fn usage_line(usage: &Usage) -> String {
    format!(
        "tokens: {} in, {} out, {} total",
        usage.input_tokens, usage.output_tokens, usage.total_tokens
    )
}

#[derive(Debug, thiserror::Error)]
pub(crate) struct Error {
    /// The error code.
    ///
    /// Used to exit the CLI with a specific exit code. This is usually `1`.
    pub(super) code: NonZeroI32,

    /// The optional error message to be displayed to the user.
    pub(super) message: Option<String>,

    /// Metadata to be displayed to the user.
    pub(super) metadata: Vec<(String, Value)>,
}

impl Error {
    /// The value of the metadata entry `key`, if any.
    #[cfg(test)]
    pub(crate) fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message.as_deref().unwrap_or_default())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        (1, error, vec![]).into()
    }
}

impl From<(i32, String, Vec<(String, Value)>)> for Error {
    fn from((code, message, metadata): (i32, String, Vec<(String, Value)>)) -> Self {
        Self {
            code: NonZeroI32::new(code).unwrap_or(FAILURE),
            message: Some(message),
            metadata,
        }
    }
}

impl From<(i32, Vec<(String, Value)>)> for Error {
    fn from((code, mut metadata): (i32, Vec<(String, Value)>)) -> Self {
        let message = metadata
            .iter()
            .position(|(k, _)| k == "message")
            .and_then(|i| metadata.remove(i).1.as_str().map(ToString::to_string))
            .unwrap_or_else(|| "Application error".to_owned());

        (code, message, metadata).into()
    }
}

impl From<Vec<(&'static str, String)>> for Error {
    fn from(metadata: Vec<(&'static str, String)>) -> Self {
        let metadata = metadata
            .into_iter()
            .map(|(k, v)| (k.to_owned(), Value::String(v)))
            .collect::<Vec<_>>();

        (1, metadata).into()
    }
}

impl From<crate::error::Error> for Error {
    fn from(error: crate::error::Error) -> Self {
        use crate::error::Error::*;

        let metadata: Vec<(&str, String)> = match error {
            Command(error) => return error,
            Config(error) => return error.into(),
            Document(error) => return error.into(),
            Llm(error) => return error.into(),
            Io(error) => return error.into(),
            Exists(path) => [
                ("message", "File already exists".into()),
                ("path", path.to_string()),
                ("hint", "Pass `--force` to overwrite it.".into()),
            ]
            .into(),
        };

        Self::from(metadata)
    }
}

fn with_cause(
    mut error: &dyn std::error::Error,
    message: impl Into<String>,
) -> Vec<(&'static str, String)> {
    let mut causes = vec![("message", message.into()), ("", format!("{error:#}"))];
    while let Some(cause) = error.source() {
        error = cause;
        causes.push(("", format!("{error:#}")));
    }

    causes
}

macro_rules! impl_from_error {
    ($error:ty, $message:expr) => {
        impl From<$error> for Error {
            fn from(error: $error) -> Self {
                with_cause(&error, $message).into()
            }
        }
    };
}

impl_from_error!(docent_config::Error, "Config error");
impl_from_error!(std::io::Error, "IO error");

impl From<docent_document::Error> for Error {
    fn from(error: docent_document::Error) -> Self {
        use docent_document::Error::*;

        let metadata: Vec<(&str, String)> = match error {
            NoTextFound => [
                ("message", "No text found in document".into()),
                (
                    "hint",
                    "The document might only contain scanned images.".into(),
                ),
            ]
            .into(),
            ParseFailed(error) => [
                ("message", "Document could not be read as a PDF".into()),
                ("error", error),
            ]
            .into(),
        };

        Self::from(metadata)
    }
}

impl From<docent_llm::Error> for Error {
    fn from(error: docent_llm::Error) -> Self {
        use docent_llm::Error::*;

        let metadata: Vec<(&str, String)> = match error {
            MissingCredential { provider, env } => [
                ("message", format!("Missing API key for {provider}")),
                (
                    "hint",
                    format!("Set the `{env}` environment variable, or pass `--api-key`."),
                ),
            ]
            .into(),
            Request(error) => with_cause(&error, "Model provider could not be reached"),
            Api { code, message } => [
                ("message", "Model provider rejected the request".into()),
                ("status", code.to_string()),
                ("error", message),
            ]
            .into(),
            Stream(error) => [
                ("message", "Connection to the model provider failed".into()),
                ("error", error),
            ]
            .into(),
            Timeout(timeout) => [
                ("message", "Model provider stopped responding".into()),
                ("timeout", format!("{}s", timeout.as_secs())),
            ]
            .into(),
            Json(error) => with_cause(&error, "Invalid response from model provider"),
            Config(error) => [("message", "Invalid request".into()), ("error", error)].into(),
        };

        Self::from(metadata)
    }
}
