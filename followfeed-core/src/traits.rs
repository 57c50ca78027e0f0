//! Trait definitions for Followfeed.
//!
//! [`ActivityClient`] is the narrow seam to the private social API. The
//! session manager and the fetcher only ever talk to this trait, so any
//! implementation (the bundled HTTP client, a test double) can be swapped
//! in.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{ActivityPage, Credentials, SessionState, UserId};

// ============================================================================
// Login Observer
// ============================================================================

/// Receives the client's settings snapshot after every successful fresh login.
#[async_trait]
pub trait LoginObserver: Send + Sync {
    /// Called once the client holds a new authenticated session.
    async fn on_login(&self, settings: &SessionState) -> Result<(), ClientError>;
}

// ============================================================================
// Auth Request
// ============================================================================

/// Parameters of a single [`ActivityClient::authenticate`] call.
pub struct AuthRequest<'a> {
    /// Account credentials.
    pub credentials: &'a Credentials,
    /// Cached settings to resume from. `None` forces a fresh login.
    pub cached_settings: Option<SessionState>,
    /// Device identity to reuse on a fresh login.
    pub device_id: Option<String>,
    /// Notified after a fresh login succeeds.
    pub on_login: Option<&'a dyn LoginObserver>,
}

impl<'a> AuthRequest<'a> {
    /// A fresh login with a newly generated device identity.
    pub fn login(credentials: &'a Credentials) -> Self {
        Self {
            credentials,
            cached_settings: None,
            device_id: None,
            on_login: None,
        }
    }

    /// Resume from cached settings; no network round trip is expected.
    pub fn resume(credentials: &'a Credentials, settings: SessionState) -> Self {
        Self {
            credentials,
            cached_settings: Some(settings),
            device_id: None,
            on_login: None,
        }
    }

    /// Reuse a known device identity.
    #[must_use]
    pub fn with_device_id(mut self, device_id: Option<String>) -> Self {
        self.device_id = device_id;
        self
    }

    /// Attach a login observer.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn LoginObserver) -> Self {
        self.on_login = Some(observer);
        self
    }

    /// Returns true if this request resumes cached settings.
    pub fn is_resume(&self) -> bool {
        self.cached_settings.is_some()
    }
}

// ============================================================================
// Activity Client
// ============================================================================

/// The remote API capabilities the core flow consumes.
#[async_trait]
pub trait ActivityClient: Send + Sync {
    /// Authenticates, either by resuming cached settings or by a fresh login.
    ///
    /// Resuming a session that is no longer valid must fail with
    /// [`ClientError::SessionExpired`]. A fresh login must notify
    /// `request.on_login` before returning.
    async fn authenticate(&mut self, request: AuthRequest<'_>) -> Result<(), ClientError>;

    /// Resolves the numeric id of `username`.
    async fn lookup_user_id(&self, username: &str) -> Result<UserId, ClientError>;

    /// Fetches one page of the following-activity feed.
    async fn fetch_activity_page(&self, cursor: Option<&str>)
    -> Result<ActivityPage, ClientError>;

    /// Snapshot of the current session settings, suitable for persisting.
    fn settings(&self) -> SessionState;
}
