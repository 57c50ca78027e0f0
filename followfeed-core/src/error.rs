//! Errors surfaced by an [`ActivityClient`](crate::ActivityClient).

use thiserror::Error;

/// Error type for the remote activity client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The platform rejected the username/password pair.
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    /// The cached session cookie is missing, expired, or was revoked.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if the server said so.
        retry_after: Option<u64>,
    },

    /// The platform answered with an error status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Transport-level failure (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The login observer failed to persist the new settings.
    #[error("Failed to persist session settings: {0}")]
    Persistence(String),
}

impl ClientError {
    /// Returns true if a fresh login could recover from this error.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired(_))
    }

    /// Returns true if the platform refused the login attempt itself.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::LoginRejected(_) | ClientError::Api { .. })
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ClientError::SessionExpired("cookie".into()).is_session_expired());
        assert!(!ClientError::SessionExpired("cookie".into()).is_rejection());

        assert!(ClientError::LoginRejected("bad password".into()).is_rejection());
        assert!(
            ClientError::Api {
                status: 400,
                message: "checkpoint".into()
            }
            .is_rejection()
        );

        assert!(!ClientError::Http("connect".into()).is_rejection());
        assert!(!ClientError::Persistence("disk".into()).is_session_expired());
    }

    #[test]
    fn test_json_error_maps_to_invalid_response() {
        let err: ClientError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
