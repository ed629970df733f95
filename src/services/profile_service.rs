use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::content::sanitize::sanitize_rich_text;
use crate::content::slug::slugify;
use crate::database::manager::DatabaseManager;
use crate::database::models::profile::{Profile, ProfileError, ProfileRow, Role};

/// Role-specific data collected by the individual onboarding wizard.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct IndividualOnboarding {
    pub full_name: String,
    pub professional_title: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub avatar_url: Option<String>,
}

/// Role-specific data collected by the organization onboarding wizard.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OrganizationOnboarding {
    /// Organization kind: company, university, ngo, government, other.
    pub organization_type: String,
    pub organization_name: String,
    pub organization_subtype: Option<String>,
    pub employee_count: Option<i32>,
    pub year_founded: Option<i32>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Settings changes. A display-name change is the one event that recomputes
/// the profile slug.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SettingsUpdate {
    pub display_name: Option<String>,
    pub professional_title: Option<String>,
    pub bio: Option<String>,
    pub description: Option<String>,
    pub organization_subtype: Option<String>,
}

pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub async fn new() -> Result<Self, ProfileError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create the bare profile row at registration. Onboarding fills in the
    /// role-specific cluster later; until then the profile is gated.
    pub async fn register(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Profile, ProfileError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(ProfileError::Validation("Invalid email address".to_string()));
        }

        let id = Uuid::new_v4();
        let row = sqlx::query_as::<_, ProfileRow>(
            "INSERT INTO profiles (id, email, password_hash, onboarding_complete, created_at) \
             VALUES ($1, $2, $3, false, now()) RETURNING *",
        )
        .bind(id)
        .bind(&email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.code().as_deref() == Some("23505") {
                    return ProfileError::Validation(
                        "An account with this email already exists".to_string(),
                    );
                }
            }
            ProfileError::Store(e.into())
        })?;

        tracing::info!(%id, "profile registered");
        Profile::try_from(row)
    }

    pub async fn find_row_by_email(&self, email: &str) -> Result<Option<ProfileRow>, ProfileError> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(crate::database::store::StoreError::from)?;
        Ok(row)
    }

    pub async fn load(&self, user_id: Uuid) -> Result<Profile, ProfileError> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(crate::database::store::StoreError::from)?
            .ok_or(ProfileError::NotFound)?;
        Profile::try_from(row)
    }

    /// Load and require a finished profile; protected content operations
    /// redirect back to onboarding while this fails.
    pub async fn require_complete(&self, user_id: Uuid) -> Result<Profile, ProfileError> {
        let profile = self.load(user_id).await?;
        if !profile.onboarding_complete || profile.role.is_none() {
            return Err(ProfileError::OnboardingIncomplete);
        }
        Ok(profile)
    }

    pub async fn complete_individual_onboarding(
        &self,
        user_id: Uuid,
        input: IndividualOnboarding,
    ) -> Result<Profile, ProfileError> {
        let full_name = input.full_name.trim();
        if full_name.is_empty() {
            return Err(ProfileError::Validation("Full name is required".to_string()));
        }

        let slug = slugify(full_name);
        let bio = input.bio.as_deref().map(sanitize_rich_text);
        let skills = serde_json::json!(input.skills);

        sqlx::query(
            "UPDATE profiles SET role = 'individual', full_name = $2, professional_title = $3, \
             bio = $4, skills = $5, resume_url = $6, avatar_url = $7, slug = $8, \
             onboarding_complete = true WHERE id = $1",
        )
        .bind(user_id)
        .bind(full_name)
        .bind(&input.professional_title)
        .bind(&bio)
        .bind(&skills)
        .bind(&input.resume_url)
        .bind(&input.avatar_url)
        .bind(&slug)
        .execute(&self.pool)
        .await
        .map_err(crate::database::store::StoreError::from)?;

        tracing::info!(%user_id, %slug, "individual onboarding complete");
        self.load(user_id).await
    }

    pub async fn complete_organization_onboarding(
        &self,
        user_id: Uuid,
        input: OrganizationOnboarding,
    ) -> Result<Profile, ProfileError> {
        let role = Role::from_str(&input.organization_type).map_err(|_| {
            ProfileError::Validation(format!(
                "Unknown organization type: {}",
                input.organization_type
            ))
        })?;
        if !role.is_organization() {
            return Err(ProfileError::Validation(
                "Organization onboarding requires an organization type".to_string(),
            ));
        }
        let name = input.organization_name.trim();
        if name.is_empty() {
            return Err(ProfileError::Validation(
                "Organization name is required".to_string(),
            ));
        }

        let slug = slugify(name);
        let description = input.description.as_deref().map(sanitize_rich_text);

        sqlx::query(
            "UPDATE profiles SET role = $2, organization_name = $3, organization_subtype = $4, \
             employee_count = $5, year_founded = $6, description = $7, logo_url = $8, \
             cover_image_url = $9, slug = $10, onboarding_complete = true WHERE id = $1",
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(name)
        .bind(&input.organization_subtype)
        .bind(input.employee_count)
        .bind(input.year_founded)
        .bind(&description)
        .bind(&input.logo_url)
        .bind(&input.cover_image_url)
        .bind(&slug)
        .execute(&self.pool)
        .await
        .map_err(crate::database::store::StoreError::from)?;

        tracing::info!(%user_id, %slug, "organization onboarding complete");
        self.load(user_id).await
    }

    /// Apply settings changes. The slug is recomputed only when the display
    /// name actually changes; all other edits leave it untouched.
    pub async fn update_settings(
        &self,
        user_id: Uuid,
        update: SettingsUpdate,
    ) -> Result<Profile, ProfileError> {
        let profile = self.require_complete(user_id).await?;
        let Some(role) = profile.role else {
            return Err(ProfileError::OnboardingIncomplete);
        };

        if let Some(name) = update.display_name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(ProfileError::Validation("Name cannot be empty".to_string()));
            }
            if name != profile.display_name() {
                let slug = slugify(name);
                let column = if role == Role::Individual {
                    "full_name"
                } else {
                    "organization_name"
                };
                sqlx::query(&format!(
                    "UPDATE profiles SET {} = $2, slug = $3 WHERE id = $1",
                    column
                ))
                .bind(user_id)
                .bind(name)
                .bind(&slug)
                .execute(&self.pool)
                .await
                .map_err(crate::database::store::StoreError::from)?;
                tracing::info!(%user_id, %slug, "display name changed, slug recomputed");
            }
        }

        if role == Role::Individual {
            if let Some(title) = &update.professional_title {
                sqlx::query("UPDATE profiles SET professional_title = $2 WHERE id = $1")
                    .bind(user_id)
                    .bind(title)
                    .execute(&self.pool)
                    .await
                    .map_err(crate::database::store::StoreError::from)?;
            }
            if let Some(bio) = update.bio.as_deref() {
                sqlx::query("UPDATE profiles SET bio = $2 WHERE id = $1")
                    .bind(user_id)
                    .bind(sanitize_rich_text(bio))
                    .execute(&self.pool)
                    .await
                    .map_err(crate::database::store::StoreError::from)?;
            }
        } else {
            if let Some(description) = update.description.as_deref() {
                sqlx::query("UPDATE profiles SET description = $2 WHERE id = $1")
                    .bind(user_id)
                    .bind(sanitize_rich_text(description))
                    .execute(&self.pool)
                    .await
                    .map_err(crate::database::store::StoreError::from)?;
            }
            if let Some(subtype) = &update.organization_subtype {
                sqlx::query("UPDATE profiles SET organization_subtype = $2 WHERE id = $1")
                    .bind(user_id)
                    .bind(subtype)
                    .execute(&self.pool)
                    .await
                    .map_err(crate::database::store::StoreError::from)?;
            }
        }

        self.load(user_id).await
    }

    /// Completed profiles for the public directory, newest first.
    pub async fn list_public(
        &self,
        role_filter: Option<Role>,
    ) -> Result<Vec<Profile>, ProfileError> {
        let rows = match role_filter {
            Some(role) => {
                sqlx::query_as::<_, ProfileRow>(
                    "SELECT * FROM profiles WHERE onboarding_complete = true AND role = $1 \
                     ORDER BY created_at DESC",
                )
                .bind(role.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ProfileRow>(
                    "SELECT * FROM profiles WHERE onboarding_complete = true \
                     ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(crate::database::store::StoreError::from)?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Profile, ProfileError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM profiles WHERE slug = $1 AND onboarding_complete = true",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::database::store::StoreError::from)?
        .ok_or(ProfileError::NotFound)?;
        Profile::try_from(row)
    }

    /// Verify a login attempt; failures are uniform so probing emails learns
    /// nothing.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Profile, ProfileError> {
        let row = self.find_row_by_email(email).await?;
        let Some(row) = row else {
            return Err(ProfileError::Validation(
                "Invalid email or password".to_string(),
            ));
        };
        auth::verify_password(password, &row.password_hash).map_err(|_| {
            ProfileError::Validation("Invalid email or password".to_string())
        })?;
        Profile::try_from(row)
    }
}
