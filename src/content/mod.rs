pub mod listing;
pub mod ownership;
pub mod registry;
pub mod sanitize;
pub mod slug;
pub mod submission;

use crate::database::store::StoreError;

/// Errors from the content subsystem. `NotFound` covers both a missing row
/// and a row owned by someone else; callers cannot tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    #[error("{0}")]
    Validation(String),

    #[error("Your profile is not allowed to publish {0} content")]
    NotPermitted(&'static str),

    #[error("Content not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
