//! Facade error types

use l10_common::api::ErrorResponse;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced to the meeting UI
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FacadeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    /// Network failure, timeout or server error; retrying may succeed
    #[error("Service unavailable: {0}")]
    Transient(String),

    /// Response did not match the expected wire format
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation needs a joined session
    #[error("No meeting session joined")]
    NoSession,
}

impl FacadeError {
    /// Text suitable for showing to the person running the meeting
    pub fn user_message(&self) -> String {
        match self {
            FacadeError::NotFound(_) => {
                "Meeting session not found. Please refresh the page.".to_string()
            }
            FacadeError::InvalidState(msg) => {
                format!("The meeting timer changed in the meantime: {}. Refreshing.", msg)
            }
            FacadeError::Conflict(_) => {
                "A meeting for this team is already running. Joining it instead.".to_string()
            }
            FacadeError::Permission(_) => {
                "You do not have access to this meeting.".to_string()
            }
            FacadeError::Transient(_) => {
                "Could not reach the meeting service. Check your connection and try again."
                    .to_string()
            }
            FacadeError::Protocol(_) => {
                "Unexpected response from the meeting service. Please refresh the page."
                    .to_string()
            }
            FacadeError::NoSession => "No meeting in progress. Start or join a meeting first.".to_string(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, FacadeError::Transient(_))
    }

    /// Map a failed HTTP response to an error
    ///
    /// The `{"error": {"code", "message"}}` body decides the variant; the
    /// status code is the fallback when the body is missing or unreadable.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => (Some(parsed.error.code), parsed.error.message),
            Err(_) => (None, format!("HTTP {}: {}", status.as_u16(), body.trim())),
        };

        match code.as_deref() {
            Some("NOT_FOUND") => FacadeError::NotFound(message),
            Some("INVALID_STATE") => FacadeError::InvalidState(message),
            Some("CONFLICT") => FacadeError::Conflict(message),
            Some("FORBIDDEN") => FacadeError::Permission(message),
            Some("BAD_REQUEST") => FacadeError::Protocol(message),
            _ if status.is_server_error() => FacadeError::Transient(message),
            _ => match status {
                StatusCode::NOT_FOUND => FacadeError::NotFound(message),
                StatusCode::CONFLICT => FacadeError::Conflict(message),
                StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                    FacadeError::Permission(message)
                }
                StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                    FacadeError::Transient(message)
                }
                _ => FacadeError::Protocol(message),
            },
        }
    }
}

impl From<reqwest::Error> for FacadeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FacadeError::Protocol(err.to_string())
        } else {
            FacadeError::Transient(err.to_string())
        }
    }
}

pub type FacadeResult<T> = Result<T, FacadeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_to_variants() {
        let body = r#"{"error":{"code":"INVALID_STATE","message":"Session is already paused"}}"#;
        assert_eq!(
            FacadeError::from_response(StatusCode::CONFLICT, body),
            FacadeError::InvalidState("Session is already paused".to_string())
        );

        let body = r#"{"error":{"code":"CONFLICT","message":"exists"}}"#;
        assert!(matches!(
            FacadeError::from_response(StatusCode::CONFLICT, body),
            FacadeError::Conflict(_)
        ));

        let body = r#"{"error":{"code":"FORBIDDEN","message":"no"}}"#;
        assert!(matches!(
            FacadeError::from_response(StatusCode::FORBIDDEN, body),
            FacadeError::Permission(_)
        ));
    }

    #[test]
    fn test_status_fallback_without_error_body() {
        assert!(matches!(
            FacadeError::from_response(StatusCode::BAD_GATEWAY, "<html>"),
            FacadeError::Transient(_)
        ));
        assert!(matches!(
            FacadeError::from_response(StatusCode::NOT_FOUND, ""),
            FacadeError::NotFound(_)
        ));
        assert!(matches!(
            FacadeError::from_response(StatusCode::UNPROCESSABLE_ENTITY, "bad"),
            FacadeError::Protocol(_)
        ));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            FacadeError::NotFound("x".into()).user_message(),
            "Meeting session not found. Please refresh the page."
        );
        assert!(FacadeError::Transient("timeout".into()).is_transient());
        assert!(!FacadeError::NoSession.is_transient());
    }
}
