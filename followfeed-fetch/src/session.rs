//! Session lifecycle.
//!
//! [`SessionManager::establish`] turns an unauthenticated client into a
//! [`Session`]:
//!
//! ```text
//! NoSession ──(no settings file)──────────────► fresh login ─┐
//!     │                                                       │
//!     └─(settings file)─► SessionLoaded ──(resume ok)────────┼─► Authenticated
//!                              │                              │
//!                              └─(expired)─► Expired ─► fresh login (same device id)
//!
//! any rejection / unexpected error ─► FatalAuthFailure
//! ```
//!
//! Every fresh login carries the [`CredentialStore`] as login observer, so
//! the new settings are written to disk before the client returns.

use followfeed_core::{ActivityClient, AuthRequest, ClientError, Credentials, UserId};
use followfeed_store::{CredentialStore, StoreError};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::error::SessionError;

// ============================================================================
// Session Phase
// ============================================================================

/// Where the manager is in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing loaded yet.
    #[default]
    NoSession,
    /// Cached settings were read from disk.
    SessionLoaded,
    /// The client holds a usable session.
    Authenticated,
    /// The cached session was rejected; a fresh login is in progress.
    Expired,
    /// Authentication failed for good.
    FatalAuthFailure,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoSession => "no session",
            Self::SessionLoaded => "session loaded",
            Self::Authenticated => "authenticated",
            Self::Expired => "expired",
            Self::FatalAuthFailure => "fatal auth failure",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Session
// ============================================================================

/// An authenticated client together with the resolved account id.
#[derive(Debug)]
pub struct Session<C> {
    client: C,
    user_id: UserId,
    device_id: Option<String>,
    phase: SessionPhase,
    resumed: bool,
}

impl<C: ActivityClient> Session<C> {
    /// The authenticated client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Numeric id of the logged-in account.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Device identity in use.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Phase the manager was in when the session was handed out.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True if cached settings were reused without a fresh login.
    pub fn was_resumed(&self) -> bool {
        self.resumed
    }
}

// ============================================================================
// Session Manager
// ============================================================================

/// Loads or creates the authenticated session.
#[derive(Debug)]
pub struct SessionManager {
    credentials: Credentials,
    store: CredentialStore,
    phase: SessionPhase,
}

impl SessionManager {
    /// Creates a manager for `credentials`, caching settings in `store`.
    pub fn new(credentials: Credentials, store: CredentialStore) -> Self {
        Self {
            credentials,
            store,
            phase: SessionPhase::NoSession,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Authenticates `client` and resolves the account id.
    #[instrument(skip(self, client), fields(username = %self.credentials.username))]
    pub async fn establish<C: ActivityClient>(
        &mut self,
        mut client: C,
    ) -> Result<Session<C>, SessionError> {
        self.phase = SessionPhase::NoSession;

        let cached = match self.store.load().await {
            Ok(settings) => Some(settings),
            Err(StoreError::NotFound(path)) => {
                info!("Unable to find file: {}", path.display());
                None
            }
            Err(e) => {
                self.phase = SessionPhase::FatalAuthFailure;
                debug!(error = %e, "Settings file unusable");
                return Err(SessionError::SettingsCorrupt(e));
            }
        };

        let resumed = match cached {
            None => {
                self.login(&mut client, None).await?;
                false
            }
            Some(settings) => {
                self.transition(SessionPhase::SessionLoaded);
                info!("Reusing settings: {}", self.store.path().display());

                let device_id = settings.device_id().map(str::to_owned);
                let result = client
                    .authenticate(AuthRequest::resume(&self.credentials, settings))
                    .await;

                match result {
                    Ok(()) => true,
                    Err(e) if e.is_session_expired() => {
                        self.transition(SessionPhase::Expired);
                        warn!(error = %e, device_id = ?device_id, "Cached session expired, logging in again");
                        self.login(&mut client, device_id).await?;
                        false
                    }
                    Err(e) => return Err(self.fail(e)),
                }
            }
        };

        self.transition(SessionPhase::Authenticated);

        let username = self.credentials.username.clone();
        let user_id = client
            .lookup_user_id(&username)
            .await
            .map_err(|source| SessionError::UserLookup { username, source })?;

        let device_id = client.settings().device_id().map(str::to_owned);
        info!(user_id = %user_id, resumed, "Session established");

        Ok(Session {
            client,
            user_id,
            device_id,
            phase: self.phase,
            resumed,
        })
    }

    /// Fresh login, persisting the new settings through the store.
    async fn login<C: ActivityClient>(
        &mut self,
        client: &mut C,
        device_id: Option<String>,
    ) -> Result<(), SessionError> {
        debug!(reuse_device = device_id.is_some(), "Logging in");

        let request = AuthRequest::login(&self.credentials)
            .with_device_id(device_id)
            .with_observer(&self.store);
        let result = client.authenticate(request).await;

        result.map_err(|e| self.fail(e))
    }

    fn fail(&mut self, e: ClientError) -> SessionError {
        self.transition(SessionPhase::FatalAuthFailure);
        debug!(error = %e, "Authentication failed");
        if e.is_rejection() {
            SessionError::CredentialsRejected(e)
        } else {
            SessionError::Unexpected(e)
        }
    }

    fn transition(&mut self, next: SessionPhase) {
        debug!(from = %self.phase, to = %next, "Session phase");
        self.phase = next;
    }
}
