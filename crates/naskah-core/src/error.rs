//! Error types for the naskah content layer.

use thiserror::Error;

/// Result type alias using naskah's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for naskah operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Mutation target does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generative service invoked without a configured credential
    #[error("Generative service unavailable: no API key configured")]
    Unavailable,

    /// Generative request failed in transit
    #[error("Generative request failed: {0}")]
    Transport(String),

    /// Generative output failed shape validation
    #[error("Malformed generative response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("manuscript 42".to_string());
        assert_eq!(err.to_string(), "Not found: manuscript 42");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("page must be >= 1".to_string());
        assert_eq!(err.to_string(), "Invalid input: page must be >= 1");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing base URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing base URL");
    }

    #[test]
    fn test_error_display_serialization() {
        let err = Error::Serialization("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_error_display_unavailable() {
        let err = Error::Unavailable;
        assert_eq!(
            err.to_string(),
            "Generative service unavailable: no API key configured"
        );
    }

    #[test]
    fn test_error_display_transport() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Generative request failed: connection refused"
        );
    }

    #[test]
    fn test_error_display_malformed_response() {
        let err = Error::MalformedResponse("unexpected response shape".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed generative response: unexpected response shape"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        let result = get_result();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::Unavailable;
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Unavailable"));
    }
}
