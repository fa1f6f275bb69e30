use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    #[error("index not found: {0}")]
    IndexNotFound(String),
    #[error("collection already exists: {0}")]
    CollectionAlreadyExists(String),
    #[error("index already exists: {0}")]
    IndexAlreadyExists(String),
    #[error("unsupported field: {0}")]
    UnsupportedField(String),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`CoreError`], independent of which entity failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    UnsupportedField,
    Malformed,
    Io,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DocumentNotFound(_) | Self::CollectionNotFound(_) | Self::IndexNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::CollectionAlreadyExists(_) | Self::IndexAlreadyExists(_) => {
                ErrorKind::AlreadyExists
            }
            Self::UnsupportedField(_) => ErrorKind::UnsupportedField,
            Self::Malformed(_) => ErrorKind::Malformed,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
