//! Persistence round-trip and edge case tests.
//!
//! Tests the settings file lifecycle: missing, saved, reloaded, corrupt.

use followfeed_core::{ClientError, LoginObserver, SessionState, SettingValue};
use std::collections::BTreeMap;
use tempfile::TempDir;
use tracing_test::traced_test;

use crate::error::StoreError;
use crate::persistence::CredentialStore;

fn sample_state() -> SessionState {
    let mut headers = BTreeMap::new();
    headers.insert("x-ig-capabilities".to_string(), SettingValue::from("3brTvw=="));

    let mut state = SessionState::new();
    state.insert("device_id", "android-0123456789abcdef");
    state.insert("uuid", "6f1f2c3a-1111-4222-8333-944445555666");
    state.insert("cookie", SettingValue::Bytes(b"sessionid=abc; csrftoken=def".to_vec()));
    state.insert("cookie_expiry", 1_900_000_000_i64);
    state.insert("headers", SettingValue::Object(headers));
    state
}

// ============================================================================
// Load
// ============================================================================

#[tokio::test]
async fn test_load_missing_file_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));

    let err = store.load().await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!store.exists());
}

#[tokio::test]
async fn test_load_invalid_json_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings");
    tokio::fs::write(&path, "{\"device_id\": ").await.unwrap();

    let err = CredentialStore::new(&path).load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "got {err}");
}

#[tokio::test]
async fn test_load_bad_bytes_tag_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings");
    tokio::fs::write(&path, r#"{"cookie": {"__class__": "bytes", "__value__": "%%%"}}"#)
        .await
        .unwrap();

    let err = CredentialStore::new(&path).load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[tokio::test]
async fn test_load_file_written_by_mime_encoder() {
    // base64 output wrapped at 76 columns with a trailing newline.
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings");
    tokio::fs::write(
        &path,
        r#"{"device_id": "android-abc", "cookie": {"__class__": "bytes", "__value__": "c2Vzc2lvbmlkPWFiYw==\n"}}"#,
    )
    .await
    .unwrap();

    let state = CredentialStore::new(&path).load().await.unwrap();
    assert_eq!(state.device_id(), Some("android-abc"));
    assert_eq!(
        state.get("cookie").and_then(SettingValue::as_bytes),
        Some(&b"sessionid=abc"[..])
    );
}

// ============================================================================
// Save
// ============================================================================

#[tokio::test]
async fn test_save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));
    let state = sample_state();

    store.save(&state).await.unwrap();
    let loaded = store.load().await.unwrap();

    assert_eq!(loaded, state);
    assert_eq!(
        loaded.get("cookie").and_then(SettingValue::as_bytes),
        Some(&b"sessionid=abc; csrftoken=def"[..])
    );
}

#[tokio::test]
#[traced_test]
async fn test_save_logs_confirmation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings");
    let store = CredentialStore::new(&path);

    store.save(&sample_state()).await.unwrap();

    assert!(logs_contain(&format!("SAVED: {}", path.display())));
}

#[tokio::test]
#[traced_test]
async fn test_failed_save_logs_no_confirmation() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));
    let mut state = SessionState::new();
    state.insert("ratio", SettingValue::Float(f64::INFINITY));

    assert!(store.save(&state).await.is_err());
    assert!(!logs_contain("SAVED:"));
}

#[tokio::test]
async fn test_save_writes_tagged_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));
    store.save(&sample_state()).await.unwrap();

    let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["cookie"]["__class__"], "bytes");
    assert!(doc["cookie"]["__value__"].is_string());
    assert_eq!(doc["device_id"], "android-0123456789abcdef");
}

#[tokio::test]
async fn test_save_overwrites_previous_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));
    store.save(&sample_state()).await.unwrap();

    let mut replacement = SessionState::new();
    replacement.insert("device_id", "android-ffffffffffffffff");
    store.save(&replacement).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, replacement);
    assert!(!temp_dir.path().join("settings.tmp").exists());
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("deeply").join("nested").join("settings"));

    store.save(&sample_state()).await.unwrap();
    assert!(store.exists());
}

#[tokio::test]
async fn test_save_unserializable_keeps_old_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));
    store.save(&sample_state()).await.unwrap();

    let mut bad = sample_state();
    bad.insert("skew", f64::INFINITY);
    let err = store.save(&bad).await.unwrap_err();
    assert!(matches!(err, StoreError::Unserializable { .. }));

    assert_eq!(store.load().await.unwrap(), sample_state());
}

#[tokio::test]
async fn test_save_into_unwritable_location_fails() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    tokio::fs::write(&blocker, "file, not a directory").await.unwrap();

    let store = CredentialStore::new(blocker.join("settings"));
    let err = store.save(&sample_state()).await.unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
}

// ============================================================================
// Login Observer
// ============================================================================

#[tokio::test]
async fn test_login_observer_persists_settings() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));

    store.on_login(&sample_state()).await.unwrap();
    assert_eq!(store.load().await.unwrap(), sample_state());
}

#[tokio::test]
async fn test_login_observer_maps_failures() {
    let temp_dir = TempDir::new().unwrap();
    let store = CredentialStore::new(temp_dir.path().join("settings"));

    let mut bad = SessionState::new();
    bad.insert("skew", f64::NAN);
    let err = store.on_login(&bad).await.unwrap_err();
    assert!(matches!(err, ClientError::Persistence(_)));
}
