//! Activity feed pagination.
//!
//! The feed is walked strictly in order: the first request carries no
//! cursor, each following request carries the cursor returned by the
//! previous page, and the walk ends on the first page without a cursor.
//!
//! A failing page ends the walk. Under the default
//! [`PageErrorPolicy::Truncate`] the entries gathered so far are returned
//! as if the feed had ended, with the reason recorded in
//! [`FeedHarvest::stopped_early`].

use followfeed_core::{ActivityClient, RawActivityEntry};
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;

// ============================================================================
// Policy
// ============================================================================

/// What to do when a page request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageErrorPolicy {
    /// Stop and return what was gathered so far.
    #[default]
    Truncate,
    /// Stop and return the error.
    Fail,
}

// ============================================================================
// Harvest
// ============================================================================

/// Entries gathered from the feed.
#[derive(Debug, Clone, Default)]
pub struct FeedHarvest {
    /// Entries in arrival order across all pages.
    pub entries: Vec<RawActivityEntry>,
    /// Number of pages successfully fetched.
    pub pages: usize,
    /// Why the walk stopped before the feed ended, if it did.
    pub stopped_early: Option<String>,
}

impl FeedHarvest {
    /// Returns true if a page error truncated the result.
    pub fn is_partial(&self) -> bool {
        self.stopped_early.is_some()
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Walks the following-activity feed until it is exhausted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityFetcher {
    policy: PageErrorPolicy,
}

impl ActivityFetcher {
    /// Creates a fetcher that truncates on page errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher with an explicit error policy.
    pub fn with_policy(policy: PageErrorPolicy) -> Self {
        Self { policy }
    }

    /// Fetches every page, concatenating entries in arrival order.
    ///
    /// Only returns `Err` under [`PageErrorPolicy::Fail`].
    #[instrument(skip(self, client), fields(policy = ?self.policy))]
    pub async fn fetch_all<C>(&self, client: &C) -> Result<FeedHarvest, FetchError>
    where
        C: ActivityClient + ?Sized,
    {
        let mut harvest = FeedHarvest::default();
        let mut cursor: Option<String> = None;

        loop {
            let page_number = harvest.pages + 1;
            debug!(page = page_number, cursor = ?cursor, "Fetching activity page");

            let page = match client.fetch_activity_page(cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => match self.policy {
                    PageErrorPolicy::Truncate => {
                        warn!(
                            page = page_number,
                            error = %e,
                            kept = harvest.entries.len(),
                            "Activity page failed, returning partial results"
                        );
                        harvest.stopped_early = Some(e.to_string());
                        break;
                    }
                    PageErrorPolicy::Fail => {
                        return Err(FetchError::PageFailed {
                            page: page_number,
                            source: e,
                        });
                    }
                },
            };

            harvest.pages = page_number;
            debug!(
                page = page_number,
                entries = page.entries.len(),
                last = page.is_last(),
                "Activity page received"
            );
            harvest.entries.extend(page.entries);

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(
            pages = harvest.pages,
            entries = harvest.entries.len(),
            partial = harvest.is_partial(),
            "Activity feed fetched"
        );
        Ok(harvest)
    }
}
