use std::io;

use camino::Utf8PathBuf;

use crate::cmd;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// CLI Error types
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Command error: {0}")]
    Command(#[from] cmd::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] docent_config::Error),

    #[error("Document error: {0}")]
    Document(#[from] docent_document::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] docent_llm::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File already exists: {0}")]
    Exists(Utf8PathBuf),
}
