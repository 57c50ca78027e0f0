//! Domain models for Followfeed.
//!
//! ## Submodules
//!
//! - [`account`] - Login credentials and numeric account ids
//! - [`session`] - Cached session settings (SessionState, SettingValue)
//! - [`activity`] - Raw feed entries, pages, and formatted records

mod account;
mod activity;
mod session;

pub use account::{Credentials, UserId};
pub use activity::{ActivityArgs, ActivityPage, ActivityRecord, RawActivityEntry};
pub use session::{DEVICE_ID_KEY, SessionState, SettingValue};
