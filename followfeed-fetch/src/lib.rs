// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Followfeed Fetch
//!
//! The session lifecycle and the activity pipeline:
//!
//! ```text
//! load-or-create session -> authenticate -> paginate feed -> filter -> emit
//! ```
//!
//! - [`session::SessionManager`] - resumes or creates an authenticated session
//! - [`pager::ActivityFetcher`] - walks the feed cursor until it runs out
//! - [`filter`] - keeps entries acted by the target user and formats them
//! - [`client::HttpActivityClient`] - the bundled [`ActivityClient`] over HTTP
//!
//! ## Example
//!
//! ```ignore
//! use followfeed_fetch::{ActivityFetcher, HttpActivityClient, SessionManager, filter_activities};
//! use followfeed_store::{ApiConfig, CredentialStore};
//!
//! let client = HttpActivityClient::new(&ApiConfig::default())?;
//! let mut manager = SessionManager::new(credentials, CredentialStore::new("settings"));
//! let session = manager.establish(client).await?;
//!
//! let harvest = ActivityFetcher::new().fetch_all(session.client()).await?;
//! let records = filter_activities(&harvest.entries, "alice");
//! ```
//!
//! [`ActivityClient`]: followfeed_core::ActivityClient

pub mod client;
pub mod error;
pub mod filter;
pub mod pager;
pub mod session;

pub use client::HttpActivityClient;
pub use error::{FetchError, SessionError};
pub use filter::{TIME_FORMAT, filter_activities, filter_activities_in};
pub use pager::{ActivityFetcher, FeedHarvest, PageErrorPolicy};
pub use session::{Session, SessionManager, SessionPhase};
