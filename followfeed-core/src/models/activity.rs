//! Feed entry and activity record types.
//!
//! - [`RawActivityEntry`] - one story from the "following" activity feed
//! - [`ActivityPage`] - a page of entries plus the continuation cursor
//! - [`ActivityRecord`] - a matched entry, normalized for output

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Raw Feed Entries
// ============================================================================

/// One raw story from the activity feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawActivityEntry {
    /// Story payload.
    pub args: ActivityArgs,

    /// Platform story type code.
    #[serde(default)]
    pub story_type: Option<u32>,
}

/// Payload of a feed story.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityArgs {
    /// Free text, starting with the acting username.
    #[serde(default)]
    pub text: String,

    /// Epoch seconds. `None` when the key is absent or unusable; only a
    /// matched story needs one.
    #[serde(default, deserialize_with = "deserialize_epoch_seconds")]
    pub timestamp: Option<i64>,

    /// Media attached to the story. `Some(Value::Null)` when the key is
    /// present with a null value, `None` when the key is absent.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub media: Option<Value>,
}

impl RawActivityEntry {
    /// Builds an entry without media.
    pub fn new(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            args: ActivityArgs {
                text: text.into(),
                timestamp: Some(timestamp),
                media: None,
            },
            story_type: None,
        }
    }

    /// Attaches a media payload.
    #[must_use]
    pub fn with_media(mut self, media: Value) -> Self {
        self.args.media = Some(media);
        self
    }

    /// The first whitespace-delimited token of the text.
    pub fn acting_username(&self) -> Option<&str> {
        self.args.text.split_whitespace().next()
    }
}

/// Accepts integers, floats (truncated) and integer strings. Anything else
/// becomes `None` instead of failing the whole page.
fn deserialize_epoch_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ============================================================================
// Activity Page
// ============================================================================

/// One page of the activity feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPage {
    /// Entries in the order the endpoint returned them.
    pub entries: Vec<RawActivityEntry>,
    /// Cursor for the next page; `None` when the feed is exhausted.
    pub next_cursor: Option<String>,
}

impl ActivityPage {
    /// Creates a page.
    pub fn new(entries: Vec<RawActivityEntry>, next_cursor: Option<String>) -> Self {
        Self {
            entries,
            next_cursor,
        }
    }

    /// Returns true if this is the last page.
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

// ============================================================================
// Activity Record
// ============================================================================

/// A feed entry that matched the target username, ready for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// The full story text, verbatim.
    pub activity: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub time: String,
    /// Media payload, omitted when the story had none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
}
