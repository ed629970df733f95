use serde::{Deserialize, Serialize};

use crate::content::ContentError;
use crate::database::models::profile::Role;

/// Which column on a content row identifies the owning profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerColumn {
    OrganizationId,
    AuthorId,
}

impl OwnerColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerColumn::OrganizationId => "organization_id",
            OwnerColumn::AuthorId => "author_id",
        }
    }
}

/// The content kinds this system stores, one table each. This enum is the
/// single authority for label -> table -> owner column routing; call sites
/// must not re-derive any of these mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Job,
    Program,
    Service,
    Initiative,
    Idea,
    HeritageSite,
    Gallery,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Job,
        ContentType::Program,
        ContentType::Service,
        ContentType::Initiative,
        ContentType::Idea,
        ContentType::HeritageSite,
        ContentType::Gallery,
    ];

    /// Parse a human-facing label ("Job", "Heritage Site", ...) or its
    /// snake_case form. Unknown or blank input is an error, never a default.
    pub fn from_label(label: &str) -> Result<Self, ContentError> {
        let normalized = label.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "job" => Ok(ContentType::Job),
            "program" => Ok(ContentType::Program),
            "service" => Ok(ContentType::Service),
            "initiative" => Ok(ContentType::Initiative),
            "idea" => Ok(ContentType::Idea),
            "heritage site" => Ok(ContentType::HeritageSite),
            "gallery" => Ok(ContentType::Gallery),
            _ => Err(ContentError::UnknownContentType(label.to_string())),
        }
    }

    /// Human-facing label used in forms and feed items.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Job => "Job",
            ContentType::Program => "Program",
            ContentType::Service => "Service",
            ContentType::Initiative => "Initiative",
            ContentType::Idea => "Idea",
            ContentType::HeritageSite => "Heritage Site",
            ContentType::Gallery => "Gallery",
        }
    }

    /// Storage table for this content kind.
    pub fn table(&self) -> &'static str {
        match self {
            ContentType::Job => "jobs",
            ContentType::Program => "programs",
            ContentType::Service => "services",
            ContentType::Initiative => "initiatives",
            ContentType::Idea => "ideas",
            ContentType::HeritageSite => "heritage_sites",
            ContentType::Gallery => "galleries",
        }
    }

    /// Ownership column rule: ideas and heritage sites belong to an author,
    /// everything else to an organization.
    pub fn owner_column(&self) -> OwnerColumn {
        match self {
            ContentType::Idea | ContentType::HeritageSite => OwnerColumn::AuthorId,
            _ => OwnerColumn::OrganizationId,
        }
    }

    /// Tables whose rows carry a URL slug derived from the title at creation.
    pub fn has_slug(&self) -> bool {
        matches!(
            self,
            ContentType::Job | ContentType::Idea | ContentType::HeritageSite
        )
    }

    /// Fields that must be present and non-empty on submission.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ContentType::Job => &["title", "location"],
            ContentType::Program => &["title"],
            ContentType::Service => &["title"],
            ContentType::Initiative => &["title", "kind"],
            ContentType::Idea => &["title", "description"],
            ContentType::HeritageSite => &["title", "location"],
            ContentType::Gallery => &["title"],
        }
    }

    /// Defaults applied on create when the submitter left them out. Heritage
    /// sites go live as approved; there is no moderation queue in this system.
    pub fn default_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ContentType::Job => &[("status", "active")],
            ContentType::HeritageSite => &[("status", "approved")],
            _ => &[],
        }
    }
}

/// Sub-discriminator on initiatives. Selects which optional columns are
/// meaningful (venue, event_datetime, funding_amount, end_date); columns for
/// other kinds stay null and are never erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitiativeKind {
    Project,
    Event,
    Grant,
    Tender,
    Announcement,
}

impl InitiativeKind {
    pub fn from_label(label: &str) -> Result<Self, ContentError> {
        match label.trim().to_lowercase().as_str() {
            "project" => Ok(InitiativeKind::Project),
            "event" => Ok(InitiativeKind::Event),
            "grant" => Ok(InitiativeKind::Grant),
            "tender" => Ok(InitiativeKind::Tender),
            "announcement" => Ok(InitiativeKind::Announcement),
            other => Err(ContentError::Validation(format!(
                "Unknown initiative kind: {}",
                other
            ))),
        }
    }

    /// Lower-cased form, stored in the `kind` column and reused as the
    /// display type in the dashboard feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            InitiativeKind::Project => "project",
            InitiativeKind::Event => "event",
            InitiativeKind::Grant => "grant",
            InitiativeKind::Tender => "tender",
            InitiativeKind::Announcement => "announcement",
        }
    }
}

/// Permission registry: which content kinds a (role, organization subtype)
/// pair may create. Heritage sites are open to everyone; the subtype is
/// accepted for signature parity with the callers but does not currently
/// narrow any set.
pub fn creatable_types(role: Role, _subtype: Option<&str>) -> &'static [ContentType] {
    match role {
        Role::Individual => &[ContentType::Idea, ContentType::HeritageSite],
        Role::Company => &[
            ContentType::Job,
            ContentType::Service,
            ContentType::Gallery,
            ContentType::HeritageSite,
        ],
        Role::University => &[
            ContentType::Job,
            ContentType::Program,
            ContentType::Gallery,
            ContentType::HeritageSite,
        ],
        Role::Ngo | Role::Government => &[
            ContentType::Job,
            ContentType::Initiative,
            ContentType::Gallery,
            ContentType::HeritageSite,
        ],
        Role::Other | Role::Organization => &[
            ContentType::Job,
            ContentType::Gallery,
            ContentType::HeritageSite,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_all_known_labels() {
        assert_eq!(ContentType::from_label("Job").unwrap(), ContentType::Job);
        assert_eq!(
            ContentType::from_label("Heritage Site").unwrap(),
            ContentType::HeritageSite
        );
        assert_eq!(
            ContentType::from_label("heritage_site").unwrap(),
            ContentType::HeritageSite
        );
        assert_eq!(
            ContentType::from_label("  gallery ").unwrap(),
            ContentType::Gallery
        );
    }

    #[test]
    fn unknown_and_blank_labels_are_errors() {
        assert!(matches!(
            ContentType::from_label("Nonsense"),
            Err(ContentError::UnknownContentType(_))
        ));
        assert!(matches!(
            ContentType::from_label(""),
            Err(ContentError::UnknownContentType(_))
        ));
    }

    #[test]
    fn owner_column_rule_is_exhaustive() {
        for ct in ContentType::ALL {
            let col = ct.owner_column();
            match ct.table() {
                "ideas" | "heritage_sites" => assert_eq!(col, OwnerColumn::AuthorId),
                _ => assert_eq!(col, OwnerColumn::OrganizationId),
            }
        }
    }

    #[test]
    fn permission_registry_is_consistent_with_table_routing() {
        for role in [
            Role::Individual,
            Role::Company,
            Role::University,
            Role::Ngo,
            Role::Government,
            Role::Other,
            Role::Organization,
        ] {
            for ct in creatable_types(role, None) {
                // Every creatable label round-trips through the label parser
                // and resolves to a table with exactly one owner column.
                assert_eq!(ContentType::from_label(ct.label()).unwrap(), *ct);
                assert!(!ct.table().is_empty());
            }
        }
    }

    #[test]
    fn heritage_site_is_universally_creatable() {
        for role in [
            Role::Individual,
            Role::Company,
            Role::University,
            Role::Ngo,
            Role::Government,
            Role::Other,
            Role::Organization,
        ] {
            assert!(creatable_types(role, None).contains(&ContentType::HeritageSite));
        }
    }

    #[test]
    fn initiative_kind_parses_case_insensitively() {
        assert_eq!(
            InitiativeKind::from_label("Grant").unwrap(),
            InitiativeKind::Grant
        );
        assert_eq!(
            InitiativeKind::from_label("ANNOUNCEMENT").unwrap(),
            InitiativeKind::Announcement
        );
        assert!(InitiativeKind::from_label("party").is_err());
    }
}
