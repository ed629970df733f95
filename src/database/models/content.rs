use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One row in the management dashboard feed, projected down to display
/// columns and tagged with its originating content type.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedItem {
    pub id: Uuid,
    /// Human-facing content-type label ("Job", "Heritage Site", ...).
    pub content_type: String,
    /// Lower-cased type used for display filtering. Equals the content type
    /// for most kinds; initiatives substitute their `kind` sub-discriminator.
    pub display_type: String,
    pub title: String,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The merged dashboard feed. `failed_sources` names tables whose query
/// failed; their rows are simply missing rather than aborting the feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedResult {
    pub items: Vec<OwnedItem>,
    pub failed_sources: Vec<&'static str>,
}
