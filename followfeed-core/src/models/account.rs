//! Account identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials for the authenticated account.
///
/// The password is optional: a cached session can be resumed without it,
/// only a fresh login needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login username.
    pub username: String,
    /// Login password.
    pub password: Option<String>,
}

impl Credentials {
    /// Creates credentials with a password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    /// Creates credentials that can only resume a cached session.
    pub fn without_password(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
        }
    }

    /// Returns true if a fresh login is possible.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Numeric identifier of an account on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
