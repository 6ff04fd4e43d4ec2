use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Spreadsheet not found or has no accessible sheets: {0}")]
    NotFound(String),

    #[error("Failed to load sheet '{title}': {message}")]
    SheetFetch { title: String, message: String },

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Caller-visible classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    /// Attach a sheet title to a collaborator failure.
    pub fn for_sheet(self, title: &str) -> Self {
        match self {
            Error::SheetFetch { .. } => self,
            other => Error::SheetFetch {
                title: title.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(Error::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::Fetch("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(Error::Timeout("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_for_sheet_wraps_message() {
        let err = Error::Fetch("HTTP 500".into()).for_sheet("Gestantes");
        assert_eq!(
            err,
            Error::SheetFetch {
                title: "Gestantes".into(),
                message: "Fetch error: HTTP 500".into(),
            }
        );
        assert_eq!(err.to_string(), "Failed to load sheet 'Gestantes': Fetch error: HTTP 500");
    }
}
