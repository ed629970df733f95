use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::content::ownership::{assert_owner, can_create};
use crate::content::registry::{ContentType, InitiativeKind, OwnerColumn};
use crate::content::sanitize::{is_rich_text_field, sanitize_rich_text};
use crate::content::slug::slugify;
use crate::content::ContentError;
use crate::database::models::profile::Profile;
use crate::database::record::Record;
use crate::database::store::ContentStore;

/// Form keys that never reach the store: the declared type itself and
/// framework-reserved keys.
const RESERVED_FIELDS: &[&str] = &["opportunity_type", "content_type", "_method", "_token"];

/// Whether a submission creates a fresh row or edits an existing one. Edits
/// reuse the same normalization but never re-derive the slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOp {
    Create,
    Update,
}

/// A sanitized, ownership-tagged record ready for a single-table write.
#[derive(Debug)]
pub struct NormalizedSubmission {
    pub content_type: ContentType,
    pub record: Record,
}

/// Convert raw submitted fields plus a declared type label into a record the
/// store can insert. Fails fast on unknown labels and re-checks the creation
/// permission here, server-side; option filtering in a client is a
/// convenience, not a boundary.
pub fn normalize_submission(
    profile: &Profile,
    label: &str,
    fields: &Map<String, Value>,
    op: SubmissionOp,
) -> Result<NormalizedSubmission, ContentError> {
    let content_type = ContentType::from_label(label)?;

    let role = profile
        .role
        .filter(|_| profile.onboarding_complete)
        .ok_or(ContentError::NotPermitted(content_type.label()))?;
    if !can_create(role, profile.organization_subtype(), content_type) {
        return Err(ContentError::NotPermitted(content_type.label()));
    }

    let mut record = Record::new();

    for (name, value) in fields {
        if RESERVED_FIELDS.contains(&name.as_str()) {
            continue;
        }
        match value {
            // Empty string means "not provided"; the key is dropped entirely.
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) => normalize_text_field(&mut record, content_type, name, s)?,
            Value::Array(items) => {
                let cleaned: Vec<Value> = items
                    .iter()
                    .filter(|v| !matches!(v, Value::String(s) if s.is_empty()))
                    .cloned()
                    .collect();
                record.set(name.clone(), Value::Array(cleaned));
            }
            Value::Null => continue,
            other => {
                record.set(name.clone(), other.clone());
            }
        }
    }

    let required = content_type.required_fields();
    record
        .validate_required_fields(required)
        .map_err(|e| ContentError::Validation(e.to_string()))?;

    if op == SubmissionOp::Create && content_type.has_slug() {
        if let Some(title) = record.get("title").and_then(|v| v.as_str()) {
            let slug = slugify(title);
            record.set_system_field("slug", Value::String(slug));
        }
    }

    match content_type.owner_column() {
        OwnerColumn::OrganizationId => {
            record.set_system_field("organization_id", Value::String(profile.id.to_string()));
            record.set_system_field(
                "organization_name",
                Value::String(profile.display_name().to_string()),
            );
        }
        OwnerColumn::AuthorId => {
            record.set_system_field("author_id", Value::String(profile.id.to_string()));
        }
    }

    if op == SubmissionOp::Create {
        for (key, value) in content_type.default_fields() {
            record.set_if_absent(key, Value::String((*value).to_string()));
        }
    }

    Ok(NormalizedSubmission {
        content_type,
        record,
    })
}

/// Field-level text transforms: tag splitting, URL fan-out, rich-text
/// sanitization, initiative kind and funding validation.
fn normalize_text_field(
    record: &mut Record,
    content_type: ContentType,
    name: &str,
    value: &str,
) -> Result<(), ContentError> {
    if name == "tags" {
        let tags: Vec<Value> = split_csv(value)
            .into_iter()
            .map(Value::String)
            .collect();
        record.set(name, Value::Array(tags));
        return Ok(());
    }

    if name.ends_with("_url") || name.ends_with("_images") {
        let urls = split_csv(value);
        let multi = name.ends_with("_images") || name.contains("gallery_images");
        if multi {
            record.set(
                name,
                Value::Array(urls.into_iter().map(Value::String).collect()),
            );
        } else {
            // Single-value fields keep the first upload only.
            match urls.into_iter().next() {
                Some(first) => record.set(name, Value::String(first)),
                None => record.set(name, Value::Null),
            };
        }
        return Ok(());
    }

    if is_rich_text_field(name) {
        record.set(name, Value::String(sanitize_rich_text(value)));
        return Ok(());
    }

    if content_type == ContentType::Initiative {
        if name == "kind" {
            let kind = InitiativeKind::from_label(value)?;
            record.set(name, Value::String(kind.as_str().to_string()));
            return Ok(());
        }
        if name == "funding_amount" {
            let amount: Decimal = value.trim().parse().map_err(|_| {
                ContentError::Validation(format!("Invalid funding amount: {}", value))
            })?;
            record.set(name, Value::String(amount.to_string()));
            return Ok(());
        }
    }

    record.set(name, Value::String(value.to_string()));
    Ok(())
}

/// Split on commas, trim whitespace, drop empty segments.
fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize and insert in one step. The store write is a single-table
/// insert; store errors surface to the caller unretried.
pub async fn create_content(
    store: &dyn ContentStore,
    profile: &Profile,
    label: &str,
    fields: &Map<String, Value>,
) -> Result<Uuid, ContentError> {
    let mut normalized = normalize_submission(profile, label, fields, SubmissionOp::Create)?;

    let id = Uuid::new_v4();
    normalized.record.set_id(id);
    normalized.record.set_created_at(Utc::now());

    let table = normalized.content_type.table();
    let inserted = store.insert(table, &normalized.record).await?;
    tracing::info!(%inserted, table, "content created");
    Ok(inserted)
}

/// Edit an existing row through the same normalization path, keyed by id.
/// The ownership check runs before the store is touched; slugs are not
/// re-derived on update.
pub async fn update_content(
    store: &dyn ContentStore,
    profile: &Profile,
    label: &str,
    id: Uuid,
    fields: &Map<String, Value>,
) -> Result<(), ContentError> {
    let content_type = ContentType::from_label(label)?;
    assert_owner(store, profile.id, content_type, id).await?;

    let normalized = normalize_submission(profile, label, fields, SubmissionOp::Update)?;
    let affected = store
        .update(content_type.table(), id, &normalized.record)
        .await?;
    if affected == 0 {
        return Err(ContentError::NotFound);
    }
    tracing::info!(%id, table = content_type.table(), "content updated");
    Ok(())
}

/// Accumulates validated field sets across the steps of a multi-step form.
/// Navigation state stays with the caller; this holds only domain data and
/// materializes the flat field map at submission time.
#[derive(Debug, Clone, Default)]
pub struct DraftBuilder {
    label: Option<String>,
    fields: Map<String, Value>,
}

impl DraftBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Merge one step's fields; later steps override earlier ones.
    pub fn merge_step(&mut self, step: Map<String, Value>) -> &mut Self {
        for (key, value) in step {
            self.fields.insert(key, value);
        }
        self
    }

    pub fn field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The declared label plus the flat field map, ready for normalization.
    pub fn build(self) -> Result<(String, Map<String, Value>), ContentError> {
        let label = self
            .label
            .ok_or_else(|| ContentError::Validation("No content type selected".to_string()))?;
        Ok((label, self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::profile::{
        IndividualDetails, OrganizationDetails, ProfileDetails, Role,
    };
    use serde_json::json;

    fn organization_profile(role: Role, name: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "org@example.com".into(),
            role: Some(role),
            slug: Some("org-abc123".into()),
            onboarding_complete: true,
            created_at: Utc::now(),
            details: Some(ProfileDetails::Organization(OrganizationDetails {
                name: Some(name.to_string()),
                ..Default::default()
            })),
        }
    }

    fn individual_profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "person@example.com".into(),
            role: Some(Role::Individual),
            slug: Some("amina-1a2b3c".into()),
            onboarding_complete: true,
            created_at: Utc::now(),
            details: Some(ProfileDetails::Individual(IndividualDetails {
                full_name: Some("Amina Jama".into()),
                ..Default::default()
            })),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn unknown_type_never_reaches_normalization() {
        let profile = organization_profile(Role::Company, "Acme");
        let err = normalize_submission(
            &profile,
            "Nonsense",
            &fields(&[("title", "x")]),
            SubmissionOp::Create,
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::UnknownContentType(_)));
    }

    #[test]
    fn creation_permission_is_rechecked_server_side() {
        let profile = individual_profile();
        let err = normalize_submission(
            &profile,
            "Job",
            &fields(&[("title", "Engineer"), ("location", "Hargeisa")]),
            SubmissionOp::Create,
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::NotPermitted("Job")));
    }

    #[test]
    fn incomplete_profile_cannot_publish() {
        let mut profile = individual_profile();
        profile.onboarding_complete = false;
        let err = normalize_submission(
            &profile,
            "Idea",
            &fields(&[("title", "x"), ("description", "y")]),
            SubmissionOp::Create,
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::NotPermitted(_)));
    }

    #[test]
    fn empty_string_fields_are_omitted_entirely() {
        let profile = organization_profile(Role::Company, "Acme");
        let normalized = normalize_submission(
            &profile,
            "Job",
            &fields(&[
                ("title", "Engineer"),
                ("location", "Hargeisa"),
                ("salary_range", ""),
            ]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert!(!normalized.record.contains("salary_range"));
    }

    #[test]
    fn tags_split_trim_and_drop_empties() {
        let profile = organization_profile(Role::Company, "Acme");
        let normalized = normalize_submission(
            &profile,
            "Job",
            &fields(&[
                ("title", "Engineer"),
                ("location", "Hargeisa"),
                ("tags", "a, b ,,c"),
            ]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(
            normalized.record.get("tags").unwrap(),
            &json!(["a", "b", "c"])
        );
    }

    #[test]
    fn single_url_field_keeps_first_only() {
        let profile = organization_profile(Role::Company, "Acme");
        let normalized = normalize_submission(
            &profile,
            "Service",
            &fields(&[("title", "Consulting"), ("logo_url", "https://x/1,https://x/2")]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(normalized.record.get("logo_url").unwrap(), &json!("https://x/1"));
    }

    #[test]
    fn multi_image_field_keeps_every_url() {
        let profile = organization_profile(Role::Company, "Acme");
        let normalized = normalize_submission(
            &profile,
            "Gallery",
            &fields(&[("title", "Campus"), ("gallery_images", "https://x/1,https://x/2")]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(
            normalized.record.get("gallery_images").unwrap(),
            &json!(["https://x/1", "https://x/2"])
        );
    }

    #[test]
    fn slug_bearing_types_get_distinct_slugs() {
        let profile = organization_profile(Role::Company, "Acme");
        let submit = || {
            normalize_submission(
                &profile,
                "Job",
                &fields(&[("title", "Senior Engineer"), ("location", "Berbera")]),
                SubmissionOp::Create,
            )
            .unwrap()
        };
        let a = submit();
        let b = submit();
        let slug_a = a.record.get("slug").unwrap().as_str().unwrap();
        let slug_b = b.record.get("slug").unwrap().as_str().unwrap();
        assert!(slug_a.starts_with("senior-engineer-"));
        assert_ne!(slug_a, slug_b);
        assert_eq!(a.record.get("title").unwrap(), &json!("Senior Engineer"));
    }

    #[test]
    fn update_does_not_rederive_the_slug() {
        let profile = organization_profile(Role::Company, "Acme");
        let normalized = normalize_submission(
            &profile,
            "Job",
            &fields(&[("title", "Renamed"), ("location", "Berbera")]),
            SubmissionOp::Update,
        )
        .unwrap();
        assert!(!normalized.record.contains("slug"));
    }

    #[test]
    fn ownership_column_follows_content_kind_not_role() {
        // An organization submitting an author-owned kind still gets author_id.
        let profile = organization_profile(Role::Ngo, "Coastal Trust");
        let normalized = normalize_submission(
            &profile,
            "Heritage Site",
            &fields(&[("title", "Old Lighthouse"), ("location", "Berbera")]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(
            normalized.record.get("author_id").unwrap(),
            &json!(profile.id.to_string())
        );
        assert!(!normalized.record.contains("organization_id"));
        assert!(!normalized.record.contains("organization_name"));
    }

    #[test]
    fn organization_owned_kinds_snapshot_the_name() {
        let profile = organization_profile(Role::University, "Coastal University");
        let normalized = normalize_submission(
            &profile,
            "Program",
            &fields(&[("title", "MSc Logistics")]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(
            normalized.record.get("organization_id").unwrap(),
            &json!(profile.id.to_string())
        );
        assert_eq!(
            normalized.record.get("organization_name").unwrap(),
            &json!("Coastal University")
        );
    }

    #[test]
    fn job_defaults_to_active_status() {
        let profile = organization_profile(Role::Company, "Acme");
        let normalized = normalize_submission(
            &profile,
            "Job",
            &fields(&[("title", "Engineer"), ("location", "Hargeisa")]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(normalized.record.get("status").unwrap(), &json!("active"));
    }

    #[test]
    fn heritage_site_defaults_to_approved() {
        let profile = individual_profile();
        let normalized = normalize_submission(
            &profile,
            "Heritage Site",
            &fields(&[("title", "Old Lighthouse"), ("location", "Berbera")]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(normalized.record.get("status").unwrap(), &json!("approved"));
    }

    #[test]
    fn rich_text_fields_are_sanitized() {
        let profile = individual_profile();
        let normalized = normalize_submission(
            &profile,
            "Idea",
            &fields(&[
                ("title", "Solar kiosk"),
                ("description", "<p>good</p><script>alert(1)</script>"),
            ]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(
            normalized.record.get("description").unwrap(),
            &json!("<p>good</p>")
        );
    }

    #[test]
    fn initiative_requires_a_valid_kind() {
        let profile = organization_profile(Role::Government, "Ministry of Ports");

        let missing = normalize_submission(
            &profile,
            "Initiative",
            &fields(&[("title", "Harbor upgrade")]),
            SubmissionOp::Create,
        )
        .unwrap_err();
        assert!(matches!(missing, ContentError::Validation(_)));

        let bogus = normalize_submission(
            &profile,
            "Initiative",
            &fields(&[("title", "Harbor upgrade"), ("kind", "party")]),
            SubmissionOp::Create,
        )
        .unwrap_err();
        assert!(matches!(bogus, ContentError::Validation(_)));

        let ok = normalize_submission(
            &profile,
            "Initiative",
            &fields(&[
                ("title", "Harbor upgrade"),
                ("kind", "Grant"),
                ("funding_amount", "250000.50"),
            ]),
            SubmissionOp::Create,
        )
        .unwrap();
        assert_eq!(ok.record.get("kind").unwrap(), &json!("grant"));
        assert_eq!(ok.record.get("funding_amount").unwrap(), &json!("250000.50"));
    }

    #[test]
    fn reserved_and_meta_fields_never_reach_the_record() {
        let profile = organization_profile(Role::Company, "Acme");
        let mut input = fields(&[
            ("title", "Engineer"),
            ("location", "Hargeisa"),
            ("opportunity_type", "Job"),
            ("_method", "POST"),
        ]);
        input.insert("organization_id".into(), json!("spoofed"));

        let normalized =
            normalize_submission(&profile, "Job", &input, SubmissionOp::Create).unwrap();
        assert!(!normalized.record.contains("opportunity_type"));
        assert!(!normalized.record.contains("_method"));
        assert_eq!(
            normalized.record.get("organization_id").unwrap(),
            &json!(profile.id.to_string())
        );
    }

    #[test]
    fn draft_builder_merges_steps_in_order() {
        let mut builder = DraftBuilder::new().content_type("Initiative");
        builder.merge_step(fields(&[("title", "Draft title"), ("kind", "Event")]));
        builder.merge_step(fields(&[("title", "Final title"), ("venue", "City hall")]));

        let (label, flat) = builder.build().unwrap();
        assert_eq!(label, "Initiative");
        assert_eq!(flat.get("title").unwrap(), &json!("Final title"));
        assert_eq!(flat.get("venue").unwrap(), &json!("City hall"));

        assert!(DraftBuilder::new().build().is_err());
    }
}
