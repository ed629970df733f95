use uuid::Uuid;

use crate::content::registry::{creatable_types, ContentType};
use crate::content::ContentError;
use crate::database::models::profile::Role;
use crate::database::store::ContentStore;

/// Whether a (role, organization subtype) pair may create the given kind.
/// The creation UI filters its options with this; the normalizer enforces it
/// again on the server.
pub fn can_create(role: Role, subtype: Option<&str>, content_type: ContentType) -> bool {
    creatable_types(role, subtype).contains(&content_type)
}

/// Verify that `user_id` owns row `id` in the table behind `content_type`.
/// The owner column comes from the registry; nothing here re-derives the
/// rule. A missing row and a row owned by someone else are reported
/// identically, so a caller probing foreign ids learns nothing.
pub async fn assert_owner(
    store: &dyn ContentStore,
    user_id: Uuid,
    content_type: ContentType,
    id: Uuid,
) -> Result<(), ContentError> {
    let owner_column = content_type.owner_column().as_str();
    let row = store
        .select_by_id(content_type.table(), id, &["id", owner_column])
        .await?;

    let owner = row
        .as_ref()
        .and_then(|r| r.get(owner_column))
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok());

    match owner {
        Some(found) if found == user_id => Ok(()),
        Some(_) => {
            tracing::debug!(%id, table = content_type.table(), "ownership check failed");
            Err(ContentError::NotFound)
        }
        None => Err(ContentError::NotFound),
    }
}

/// Hard delete, gated by the ownership check. No tombstone, no undo.
pub async fn delete_content(
    store: &dyn ContentStore,
    user_id: Uuid,
    label: &str,
    id: Uuid,
) -> Result<(), ContentError> {
    let content_type = ContentType::from_label(label)?;
    assert_owner(store, user_id, content_type, id).await?;

    let affected = store.delete(content_type.table(), id).await?;
    if affected == 0 {
        return Err(ContentError::NotFound);
    }
    tracing::info!(%id, table = content_type.table(), "content deleted");
    Ok(())
}
