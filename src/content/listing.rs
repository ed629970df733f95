use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::content::registry::{creatable_types, ContentType};
use crate::content::ContentError;
use crate::database::models::content::{FeedResult, OwnedItem};
use crate::database::models::profile::Profile;
use crate::database::store::{ContentStore, Row};

/// Build the "my content" feed for the management dashboard: every table the
/// profile's role can publish to is queried for rows owned by that profile,
/// and the results merge into one created_at-descending sequence.
///
/// The per-table queries run concurrently, and one table failing does not
/// abort the rest: its name lands in `failed_sources` and the feed carries
/// the rows that did load.
pub async fn owned_content_feed(
    store: &dyn ContentStore,
    profile: &Profile,
) -> Result<FeedResult, ContentError> {
    let Some(role) = profile.role else {
        return Ok(FeedResult::default());
    };

    let types = creatable_types(role, profile.organization_subtype());
    let owner_value = Value::String(profile.id.to_string());

    let queries = types.iter().map(|content_type| {
        let owner_value = owner_value.clone();
        async move {
            let owner_column = content_type.owner_column().as_str();
            let mut projection = vec!["id", "title", "status", "created_at"];
            if *content_type == ContentType::Initiative {
                projection.push("kind");
            }
            let result = store
                .select_where(
                    content_type.table(),
                    &[(owner_column, owner_value)],
                    &projection,
                    Some("created_at"),
                )
                .await;
            (*content_type, result)
        }
    });

    let mut feed = FeedResult::default();
    for (content_type, result) in futures::future::join_all(queries).await {
        match result {
            Ok(rows) => {
                for row in rows {
                    if let Some(item) = row_to_item(content_type, &row) {
                        feed.items.push(item);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(table = content_type.table(), error = %e, "feed query failed");
                feed.failed_sources.push(content_type.table());
            }
        }
    }

    feed.items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(feed)
}

/// Project one stored row into a feed item. Rows missing their display
/// columns are skipped rather than failing the whole feed.
fn row_to_item(content_type: ContentType, row: &Row) -> Option<OwnedItem> {
    let id = row
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let title = row.get("title").and_then(|v| v.as_str())?.to_string();
    let created_at = row
        .get("created_at")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))?;
    let status = row
        .get("status")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    // Initiatives display as their sub-kind; everything else as its label.
    let display_type = if content_type == ContentType::Initiative {
        row.get("kind")
            .and_then(|v| v.as_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| content_type.label().to_lowercase())
    } else {
        content_type.label().to_lowercase()
    };

    Some(OwnedItem {
        id,
        content_type: content_type.label().to_string(),
        display_type,
        title,
        status,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::submission::create_content;
    use crate::database::models::profile::Role;
    use crate::testing::{organization_profile, MemoryStore};
    use serde_json::Map;

    fn text_fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[tokio::test]
    async fn feed_merges_tables_newest_first() {
        let store = MemoryStore::new();
        let ngo = organization_profile(Role::Ngo, "Coastal Trust");

        create_content(
            &store,
            &ngo,
            "Job",
            &text_fields(&[("title", "Field officer"), ("location", "Berbera")]),
        )
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        create_content(
            &store,
            &ngo,
            "Initiative",
            &text_fields(&[("title", "Mangrove grant"), ("kind", "Grant")]),
        )
        .await
        .unwrap();

        let feed = owned_content_feed(&store, &ngo).await.unwrap();
        assert!(feed.failed_sources.is_empty());
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].title, "Mangrove grant");
        assert_eq!(feed.items[0].display_type, "grant");
        assert_eq!(feed.items[1].title, "Field officer");
        assert_eq!(feed.items[1].display_type, "job");
    }

    #[tokio::test]
    async fn feed_only_contains_the_callers_rows() {
        let store = MemoryStore::new();
        let mine = organization_profile(Role::Company, "Acme");
        let theirs = organization_profile(Role::Company, "Rival");

        create_content(
            &store,
            &mine,
            "Job",
            &text_fields(&[("title", "Mine"), ("location", "Hargeisa")]),
        )
        .await
        .unwrap();
        create_content(
            &store,
            &theirs,
            "Job",
            &text_fields(&[("title", "Theirs"), ("location", "Hargeisa")]),
        )
        .await
        .unwrap();

        let feed = owned_content_feed(&store, &mine).await.unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].title, "Mine");
    }

    #[tokio::test]
    async fn one_failing_table_still_yields_the_rest() {
        let store = MemoryStore::new();
        let ngo = organization_profile(Role::Ngo, "Coastal Trust");

        create_content(
            &store,
            &ngo,
            "Job",
            &text_fields(&[("title", "Field officer"), ("location", "Berbera")]),
        )
        .await
        .unwrap();
        create_content(
            &store,
            &ngo,
            "Initiative",
            &text_fields(&[("title", "Mangrove grant"), ("kind", "Grant")]),
        )
        .await
        .unwrap();

        store.fail_table("initiatives");

        let feed = owned_content_feed(&store, &ngo).await.unwrap();
        assert_eq!(feed.failed_sources, vec!["initiatives"]);
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].title, "Field officer");
    }

    #[tokio::test]
    async fn incomplete_profile_gets_an_empty_feed() {
        let store = MemoryStore::new();
        let mut profile = organization_profile(Role::Company, "Acme");
        profile.role = None;

        let feed = owned_content_feed(&store, &profile).await.unwrap();
        assert!(feed.items.is_empty());
    }
}
