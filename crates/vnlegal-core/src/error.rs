//! Error types for VnLegal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate content: hash={0}")]
    DuplicateContent(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("LLM unavailable")]
    LlmUnavailable,

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-readable tag, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Storage(_) => "storage",
            Error::Database(_) => "database",
            Error::NotFound(_) => "not_found",
            Error::DuplicateContent(_) => "duplicate_content",
            Error::UnsupportedFile(_) => "unsupported_file",
            Error::Extraction(_) => "extraction",
            Error::Ingest(_) => "ingest",
            Error::LlmUnavailable => "llm_unavailable",
            Error::Inference(_) => "inference",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Config(_) => "config",
            Error::Http(_) => "http",
            Error::Internal(_) => "internal",
        }
    }

    /// Whether the error was caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::DuplicateContent(_)
                | Error::UnsupportedFile(_)
                | Error::Extraction(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Error::NotFound("doc 3".into()).kind(), "not_found");
        assert_eq!(Error::LlmUnavailable.kind(), "llm_unavailable");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(Error::from(io).kind(), "io");
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::UnsupportedFile(".png".into()).is_client_error());
        assert!(Error::DuplicateContent("abc".into()).is_client_error());
        assert!(!Error::Database("locked".into()).is_client_error());
        assert!(!Error::Inference("timeout".into()).is_client_error());
    }

    #[test]
    fn test_display() {
        let e = Error::DuplicateContent("ff00".into());
        assert_eq!(e.to_string(), "Duplicate content: hash=ff00");
    }
}
