//! Fetch error types.

use followfeed_core::ClientError;
use followfeed_store::StoreError;
use thiserror::Error;

// ============================================================================
// Session Error
// ============================================================================

/// Fatal failures while establishing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The settings file exists but cannot be used.
    #[error("Cannot resume session: {0}")]
    SettingsCorrupt(#[source] StoreError),

    /// The platform rejected the login.
    #[error("{0}")]
    CredentialsRejected(#[source] ClientError),

    /// Authentication failed for any other reason.
    #[error("Unexpected authentication failure: {0}")]
    Unexpected(#[source] ClientError),

    /// The authenticated account's id could not be resolved.
    #[error("Failed to look up user id for {username}: {source}")]
    UserLookup {
        /// Account that was looked up.
        username: String,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },
}

impl SessionError {
    /// Returns true if the failure is a credential rejection.
    pub fn is_credentials_rejected(&self) -> bool {
        matches!(self, SessionError::CredentialsRejected(_))
    }
}

// ============================================================================
// Fetch Error
// ============================================================================

/// Error raised by the fetcher when truncation is disabled.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A page request failed.
    #[error("Fetching activity page {page} failed: {source}")]
    PageFailed {
        /// 1-based page number.
        page: usize,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },
}
