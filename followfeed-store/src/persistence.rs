//! Session settings persistence.
//!
//! [`CredentialStore`] owns the settings file: it loads the cached
//! session on start-up and rewrites it every time the client performs a
//! fresh login.

use async_trait::async_trait;
use followfeed_core::{ClientError, LoginObserver, SessionState};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::codec::{decode_state, encode_state};
use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "settings";

/// Returns the default configuration directory.
///
/// - Linux: `~/.config/followfeed`
/// - macOS: `~/Library/Application Support/followfeed`
/// - Windows: `%APPDATA%\followfeed`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("followfeed"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets owner-only permissions (0o600) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Sibling temp file used for atomic writes (`settings` -> `settings.tmp`).
fn temp_path_for(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => {
            let mut tmp = OsString::from(name);
            tmp.push(".tmp");
            path.with_file_name(tmp)
        }
        None => path.with_extension("tmp"),
    }
}

/// Writes `contents` atomically with owner-only permissions.
async fn write_secure(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(path = %parent.display(), "Creating directory");
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, contents).await?;
    set_restrictive_permissions(&temp_path).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

// ============================================================================
// Credential Store
// ============================================================================

/// Reads and writes the cached session settings file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the settings file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the cached session.
    ///
    /// Fails with [`StoreError::NotFound`] when there is no file and with
    /// [`StoreError::Corrupt`] when the file is not valid JSON or a tagged
    /// value cannot be decoded.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<SessionState, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let document: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e))?;
        let state = decode_state(document).map_err(|e| self.corrupt(e))?;

        debug!(fields = state.len(), "Settings loaded");
        Ok(state)
    }

    /// Saves `state`, overwriting the file.
    ///
    /// Encoding happens before the file is touched, so an unserializable
    /// value leaves any previous file intact.
    #[instrument(skip(self, state), fields(path = %self.path.display()))]
    pub async fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        let document = encode_state(state)?;
        let json = serde_json::to_string_pretty(&document)?;

        write_secure(&self.path, &json).await?;

        info!("SAVED: {}", self.path.display());
        Ok(())
    }

    fn corrupt(&self, reason: impl ToString) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl LoginObserver for CredentialStore {
    async fn on_login(&self, settings: &SessionState) -> Result<(), ClientError> {
        self.save(settings)
            .await
            .map_err(|e| ClientError::Persistence(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_dir() {
        let path = default_config_dir();
        assert!(!path.as_os_str().is_empty());
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(temp_path_for(Path::new("settings")), PathBuf::from("settings.tmp"));
        assert_eq!(
            temp_path_for(Path::new("/var/lib/ff/settings.json")),
            PathBuf::from("/var/lib/ff/settings.json.tmp")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("settings"));
        store.save(&SessionState::new()).await.unwrap();

        let metadata = tokio::fs::metadata(store.path()).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "File should have 0600 permissions");
    }
}
