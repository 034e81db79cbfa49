use camino::Utf8PathBuf;

use crate::model::ModelIdError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schematic error: {0}")]
    Schematic(#[from] schematic::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file not found: {0}")]
    NotFound(Utf8PathBuf),

    #[error("Invalid model: {0}")]
    ModelId(#[from] ModelIdError),
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
