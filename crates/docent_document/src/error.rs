/// Reasons a document yields no usable text.
///
/// Both variants are recoverable at the upload boundary: the user is told
/// what happened and any previously loaded document stays active.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document opened fine, but its text layer is (nearly) empty.
    ///
    /// This is what image-only scans look like.
    #[error("no text content found in the document, it might only contain images")]
    NoTextFound,

    /// The bytes could not be read as a PDF document.
    #[error("failed to parse document: {0}")]
    ParseFailed(String),
}

/// The classification of an [`Error`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoTextFound,
    ParseFailed,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoTextFound => ErrorKind::NoTextFound,
            Self::ParseFailed(_) => ErrorKind::ParseFailed,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(error: lopdf::Error) -> Self {
        Self::ParseFailed(error.to_string())
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
