use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile not found")]
    NotFound,

    #[error("Unknown profile role: {0}")]
    UnknownRole(String),

    #[error("Complete onboarding before publishing content")]
    OnboardingIncomplete,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Profile discriminant. `Organization` is a legacy value still present on
/// old rows; it behaves like a generic organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Individual,
    Company,
    University,
    Ngo,
    Government,
    Other,
    Organization,
}

impl Role {
    pub fn from_str(value: &str) -> Result<Self, ProfileError> {
        match value.trim().to_lowercase().as_str() {
            "individual" => Ok(Role::Individual),
            "company" => Ok(Role::Company),
            "university" => Ok(Role::University),
            "ngo" => Ok(Role::Ngo),
            "government" => Ok(Role::Government),
            "other" => Ok(Role::Other),
            "organization" => Ok(Role::Organization),
            other => Err(ProfileError::UnknownRole(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Individual => "individual",
            Role::Company => "company",
            Role::University => "university",
            Role::Ngo => "ngo",
            Role::Government => "government",
            Role::Other => "other",
            Role::Organization => "organization",
        }
    }

    pub fn is_organization(&self) -> bool {
        !matches!(self, Role::Individual)
    }
}

/// The raw `profiles` row. The table is one wide schema: individual and
/// organization columns coexist, all nullable, with `role` deciding which
/// cluster is live. Decoding into [`Profile`] makes that tag explicit.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub slug: Option<String>,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,

    // Individual cluster
    pub full_name: Option<String>,
    pub professional_title: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Value>,
    pub resume_url: Option<String>,
    pub avatar_url: Option<String>,

    // Organization cluster
    pub organization_name: Option<String>,
    pub organization_subtype: Option<String>,
    pub employee_count: Option<i32>,
    pub year_founded: Option<i32>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndividualDetails {
    pub full_name: Option<String>,
    pub professional_title: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationDetails {
    pub name: Option<String>,
    pub subtype: Option<String>,
    pub employee_count: Option<i32>,
    pub year_founded: Option<i32>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Exactly one details cluster is live per profile, selected by role. Code
/// holding a `Profile` cannot reach the other cluster's fields by accident.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfileDetails {
    Individual(IndividualDetails),
    Organization(OrganizationDetails),
}

/// Decoded profile: the common envelope plus the role-tagged details.
/// `role`/`details` stay `None` until onboarding picks a side.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub role: Option<Role>,
    pub slug: Option<String>,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub details: Option<ProfileDetails>,
}

impl Profile {
    /// Name shown publicly and snapshotted onto organization-owned content.
    pub fn display_name(&self) -> &str {
        match &self.details {
            Some(ProfileDetails::Individual(d)) => {
                d.full_name.as_deref().unwrap_or(self.email.as_str())
            }
            Some(ProfileDetails::Organization(d)) => {
                d.name.as_deref().unwrap_or(self.email.as_str())
            }
            None => self.email.as_str(),
        }
    }

    pub fn organization_subtype(&self) -> Option<&str> {
        match &self.details {
            Some(ProfileDetails::Organization(d)) => d.subtype.as_deref(),
            _ => None,
        }
    }
}

impl TryFrom<ProfileRow> for Profile {
    type Error = ProfileError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = row.role.as_deref().map(Role::from_str).transpose()?;

        let details = match role {
            None => None,
            Some(Role::Individual) => Some(ProfileDetails::Individual(IndividualDetails {
                full_name: row.full_name,
                professional_title: row.professional_title,
                bio: row.bio,
                skills: decode_skills(row.skills),
                resume_url: row.resume_url,
                avatar_url: row.avatar_url,
            })),
            Some(_) => Some(ProfileDetails::Organization(OrganizationDetails {
                name: row.organization_name,
                subtype: row.organization_subtype,
                employee_count: row.employee_count,
                year_founded: row.year_founded,
                description: row.description,
                logo_url: row.logo_url,
                cover_image_url: row.cover_image_url,
            })),
        };

        Ok(Profile {
            id: row.id,
            email: row.email,
            role,
            slug: row.slug,
            onboarding_complete: row.onboarding_complete,
            created_at: row.created_at,
            details,
        })
    }
}

fn decode_skills(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_row() -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            email: "person@example.com".into(),
            password_hash: "x".into(),
            role: None,
            slug: None,
            onboarding_complete: false,
            created_at: Utc::now(),
            full_name: None,
            professional_title: None,
            bio: None,
            skills: None,
            resume_url: None,
            avatar_url: None,
            organization_name: None,
            organization_subtype: None,
            employee_count: None,
            year_founded: None,
            description: None,
            logo_url: None,
            cover_image_url: None,
        }
    }

    #[test]
    fn individual_row_decodes_to_individual_details() {
        let mut row = base_row();
        row.role = Some("individual".into());
        row.full_name = Some("Amina Jama".into());
        row.organization_name = Some("stale column".into());
        row.skills = Some(json!(["rust", "gis"]));

        let profile = Profile::try_from(row).unwrap();
        assert_eq!(profile.role, Some(Role::Individual));
        match profile.details.unwrap() {
            ProfileDetails::Individual(d) => {
                assert_eq!(d.full_name.as_deref(), Some("Amina Jama"));
                assert_eq!(d.skills, vec!["rust", "gis"]);
            }
            other => panic!("expected individual details, got {:?}", other),
        }
    }

    #[test]
    fn legacy_organization_role_is_accepted() {
        let mut row = base_row();
        row.role = Some("organization".into());
        row.organization_name = Some("Harbor Authority".into());

        let profile = Profile::try_from(row).unwrap();
        assert_eq!(profile.role, Some(Role::Organization));
        assert!(profile.role.unwrap().is_organization());
        assert_eq!(profile.display_name(), "Harbor Authority");
    }

    #[test]
    fn unknown_role_is_an_error() {
        let mut row = base_row();
        row.role = Some("robot".into());
        assert!(matches!(
            Profile::try_from(row),
            Err(ProfileError::UnknownRole(_))
        ));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let profile = Profile::try_from(base_row()).unwrap();
        assert_eq!(profile.display_name(), "person@example.com");
    }
}
