use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    // Catalog errors
    #[error("No photos in folder '{0}'")]
    EmptyFolder(String),

    #[error("Cannot read photo collection at {path}: {source}")]
    CatalogUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Photo not found: {0}")]
    PhotoNotFound(PathBuf),

    #[error("Invalid name '{0}': must be a single path component")]
    InvalidName(String),

    // Metadata errors
    #[error("Rating unavailable for {path}: {reason}")]
    RatingUnavailable { path: PathBuf, reason: String },

    // Move errors
    #[error("Failed to move {path} to the rejected collection: {source}")]
    MoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Session errors
    #[error("No review session is active")]
    NotReviewing,

    #[error("A review session is already active for '{0}'")]
    SessionActive(String),

    #[error("Already at the first photo")]
    NoPreviousPhoto,

    #[error("No saved session to resume")]
    NoCheckpoint,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    // Generic errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TriageError {
    /// Errors the user can recover from by picking another folder or repeating the action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TriageError::EmptyFolder(_)
                | TriageError::MoveFailed { .. }
                | TriageError::NoPreviousPhoto
                | TriageError::InvalidName(_)
        )
    }
}

/// Result type for phototriage operations.
pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(TriageError::EmptyFolder("2024".to_string()).is_recoverable());
        assert!(TriageError::NoPreviousPhoto.is_recoverable());
        assert!(
            TriageError::MoveFailed {
                path: PathBuf::from("a.jpg"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .is_recoverable()
        );
        assert!(
            !TriageError::CatalogUnavailable {
                path: PathBuf::from("/photos"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TriageError::EmptyFolder("2024".to_string());
        assert_eq!(err.to_string(), "No photos in folder '2024'");
        assert_eq!(
            TriageError::InvalidName("../etc".to_string()).to_string(),
            "Invalid name '../etc': must be a single path component"
        );
    }
}
