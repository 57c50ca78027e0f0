// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Followfeed Core
//!
//! Core types, models, and traits shared by the Followfeed crates.
//!
//! - Session state (the cached credential bundle) and its value model
//! - Raw feed entries as delivered by the activity endpoint
//! - Normalized activity records emitted to the user
//! - The [`ActivityClient`] collaborator trait and its error taxonomy
//!
//! ## Key Types
//!
//! - [`SessionState`] / [`SettingValue`] - persisted session settings
//! - [`RawActivityEntry`] / [`ActivityPage`] - one page of the feed
//! - [`ActivityRecord`] - a matched, formatted activity
//! - [`Credentials`] / [`UserId`] - account identity

pub mod error;
pub mod models;
pub mod traits;

pub use error::ClientError;

pub use models::{
    // Account
    Credentials,
    UserId,
    // Session
    DEVICE_ID_KEY,
    SessionState,
    SettingValue,
    // Activity
    ActivityArgs,
    ActivityPage,
    ActivityRecord,
    RawActivityEntry,
};

pub use traits::{ActivityClient, AuthRequest, LoginObserver};
