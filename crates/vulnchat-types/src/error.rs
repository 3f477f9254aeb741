use thiserror::Error;

use crate::llm::LlmError;

/// Errors from in-memory session state operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid turn: {0}")]
    InvalidTurn(String),

    #[error("an exchange is already in flight for this session")]
    ExchangeInFlight,
}

/// Errors from the stream relay.
///
/// All variants are terminal for the exchange: nothing is appended and
/// nothing is persisted. Retry is the caller's decision; the relay never
/// retries on its own.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no API key available; provide one per request or set the provider key in the environment")]
    MissingCredential,

    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors from submitting a turn to a conversation.
///
/// Combines in-memory session rejections with the ownership checks applied
/// when the submission targets an existing conversation.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from durable store operations.
///
/// Read paths surface absence as `Ok(None)`, never as an error. Owner-scoped
/// write paths surface absence as `Unauthorized` so callers cannot probe for
/// record existence.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("not authorized for this record")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::InvalidTurn("turn content must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid turn: turn content must not be empty"
        );
    }

    #[test]
    fn test_relay_error_wraps_llm_error() {
        let err: RelayError = LlmError::Stream("connection reset".to_string()).into();
        assert_eq!(err.to_string(), "stream error: connection reset");
        assert!(matches!(err, RelayError::Provider(_)));
    }

    #[test]
    fn test_relay_error_wraps_session_error() {
        let err: RelayError = SessionError::InvalidTurn("empty".to_string()).into();
        assert!(matches!(err, RelayError::Session(_)));
    }

    #[test]
    fn test_submit_error_wraps_both_domains() {
        let err: SubmitError = SessionError::ExchangeInFlight.into();
        assert!(matches!(err, SubmitError::Session(_)));
        let err: SubmitError = RepositoryError::Unauthorized.into();
        assert!(matches!(err, SubmitError::Repository(_)));
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
        assert_eq!(
            RepositoryError::Unauthorized.to_string(),
            "not authorized for this record"
        );
    }
}
