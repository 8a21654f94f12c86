use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No record found for currency '{0}'")]
    RecordNotFound(String),

    #[error("Cannot edit '{name}': no scanned record for this currency")]
    MissingRecord { name: String },

    #[error("Cannot encode value for '{name}': {message}")]
    Encoding { name: String, message: String },

    #[error("Edits for '{first}' and '{second}' overlap at bytes {start:#x}..{end:#x}")]
    Conflict {
        first: String,
        second: String,
        start: usize,
        end: usize,
    },

    #[error(
        "Record for '{name}' would change size by {delta} byte(s); enclosing length prefixes are not rewritten"
    )]
    OuterLengthMismatch { name: String, delta: isize },

    #[error("Record for '{name}' no longer matches the buffer at offset {offset:#x}")]
    StaleRecord { name: String, offset: usize },

    #[error("No offset known for '{0}'; supply its actual value first")]
    MissingOffset(String),

    #[error("Envelope decode error: {0}")]
    Envelope(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Currency this error refers to, if any
    pub fn currency(&self) -> Option<&str> {
        match self {
            Error::RecordNotFound(name) | Error::MissingOffset(name) => Some(name),
            Error::MissingRecord { name }
            | Error::Encoding { name, .. }
            | Error::OuterLengthMismatch { name, .. }
            | Error::StaleRecord { name, .. } => Some(name),
            Error::Conflict { first, .. } => Some(first),
            Error::Envelope(_) | Error::Io(_) | Error::Json(_) => None,
        }
    }
}
