//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use vulnchat_types::error::{RelayError, RepositoryError, SessionError, SubmitError};
use vulnchat_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session state errors (invalid turn, exchange in flight).
    Session(SessionError),
    /// Relay errors (missing credential, provider failure).
    Relay(RelayError),
    /// Durable store errors (ownership, queries).
    Repository(RepositoryError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Session(e) => AppError::Session(e),
            SubmitError::Repository(e) => AppError::Repository(e),
        }
    }
}

impl AppError {
    fn status_code_and_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Session(SessionError::InvalidTurn(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_TURN", msg.clone())
            }
            AppError::Session(SessionError::ExchangeInFlight) => (
                StatusCode::CONFLICT,
                "EXCHANGE_IN_FLIGHT",
                "An exchange is already in flight for this session".to_string(),
            ),
            AppError::Relay(RelayError::MissingCredential) => (
                StatusCode::BAD_REQUEST,
                "MISSING_CREDENTIAL",
                "API key is missing. Provide an OpenAI API key.".to_string(),
            ),
            AppError::Relay(RelayError::Provider(LlmError::AuthenticationFailed)) => (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_AUTH_FAILED",
                "The provider rejected the API key".to_string(),
            ),
            AppError::Relay(e) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.to_string()),
            AppError::Repository(RepositoryError::Unauthorized) => (
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
                "Not authorized for this record".to_string(),
            ),
            AppError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found".to_string())
            }
            AppError::Repository(RepositoryError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_code_and_message();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_mismatch_maps_to_forbidden() {
        let err = AppError::Repository(RepositoryError::Unauthorized);
        let (status, code, _) = err.status_code_and_message();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "UNAUTHORIZED");
    }

    #[test]
    fn test_missing_credential_maps_to_bad_request() {
        let err = AppError::Relay(RelayError::MissingCredential);
        let (status, code, _) = err.status_code_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "MISSING_CREDENTIAL");
    }

    #[test]
    fn test_in_flight_exchange_maps_to_conflict() {
        let err = AppError::Session(SessionError::ExchangeInFlight);
        let (status, code, _) = err.status_code_and_message();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "EXCHANGE_IN_FLIGHT");
    }

    #[test]
    fn test_provider_failure_maps_to_bad_gateway() {
        let err = AppError::Relay(RelayError::Provider(LlmError::Stream(
            "connection reset".to_string(),
        )));
        let (status, code, _) = err.status_code_and_message();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "PROVIDER_ERROR");
    }
}
