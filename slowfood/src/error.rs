//! Error types for the SlowFood client library.

use reqwest::StatusCode;

/// Result alias used across the library.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Everything that can go wrong between the client and the platform API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the bearer token (401/403), or no token was stored.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not what the endpoint promises.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local file access failed: the persisted token or an upload.
    #[error("local file error: {0}")]
    Storage(#[from] std::io::Error),

    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The AI endpoint answered with `success: false`.
    #[error("assistant error: {0}")]
    Assistant(String),
}

impl ClientError {
    /// Whether this error means the stored token is no longer trusted.
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Build the error for a non-success response, pulling `message` from a
    /// JSON body when the server sent one.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| body.trim().to_string());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Unauthorized(message)
        } else {
            Self::Status { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_from_json_body() {
        let err = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Title is required"}"#,
        );
        match err {
            ClientError::Status { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Title is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unauthorized_statuses() {
        assert!(ClientError::from_status(StatusCode::UNAUTHORIZED, "").is_auth());
        assert!(ClientError::from_status(StatusCode::FORBIDDEN, "nope").is_auth());
        assert!(!ClientError::from_status(StatusCode::NOT_FOUND, "").is_auth());
    }
}
