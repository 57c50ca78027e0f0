// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Followfeed Store
//!
//! Local persistence for Followfeed.
//!
//! This crate provides:
//!
//! - **CredentialStore**: load/save of the cached session settings file
//! - **Codec**: the tagged encoding that lets binary values survive JSON
//! - **AppConfig**: optional JSON configuration file
//!
//! ## Usage
//!
//! ```ignore
//! use followfeed_store::{CredentialStore, StoreError};
//!
//! let store = CredentialStore::new("settings");
//! match store.load().await {
//!     Ok(state) => println!("resuming, device {:?}", state.device_id()),
//!     Err(StoreError::NotFound(_)) => println!("no cached session"),
//!     Err(e) => return Err(e),
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod persistence;

pub use codec::{decode_state, decode_value, encode_state, encode_value};
pub use config::{ApiConfig, AppConfig};
pub use error::StoreError;
pub use persistence::{CredentialStore, DEFAULT_SETTINGS_FILE, default_config_dir};
#[cfg(test)]
mod persistence_tests;
