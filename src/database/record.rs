use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Fields only the normalizer and store may set. Form input that names one of
/// these is ignored with a warning rather than trusted.
const SYSTEM_FIELDS: &[&str] = &[
    "id",
    "created_at",
    "organization_id",
    "organization_name",
    "author_id",
    "slug",
];

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
}

/// A dynamic row image: string-keyed field values bound for (or loaded from)
/// one content table. The submission normalizer builds one of these, the
/// store writes it as a single-table insert or update.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set a field from submitted input. System fields are ignored here;
    /// only the normalizer assigns them, via `set_system_field`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            tracing::warn!("ignoring attempt to set system field '{}' from input", key);
            return self;
        }
        self.fields.insert(key, value.into());
        self
    }

    /// Set a system-managed field (ownership, slug, timestamps, id).
    pub fn set_system_field(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn id(&self) -> Option<Uuid> {
        self.get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn set_id(&mut self, id: Uuid) -> &mut Self {
        self.set_system_field("id", Value::String(id.to_string()))
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get("created_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_created_at(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.set_system_field("created_at", Value::String(at.to_rfc3339()))
    }

    /// Every required field must be present, non-null, and non-blank.
    pub fn validate_required_fields(&self, fields: &[&str]) -> Result<(), RecordError> {
        for &field in fields {
            match self.get(field) {
                None | Some(Value::Null) => {
                    return Err(RecordError::MissingRequiredField(field.to_string()))
                }
                Some(Value::String(s)) if s.trim().is_empty() => {
                    return Err(RecordError::MissingRequiredField(field.to_string()))
                }
                Some(_) => continue,
            }
        }
        Ok(())
    }

    /// Set a field only if it has no value yet (used for per-type defaults).
    pub fn set_if_absent(&mut self, key: &str, value: Value) -> &mut Self {
        if !self.fields.contains_key(key) {
            self.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_cannot_set_system_fields() {
        let mut record = Record::new();
        record.set("organization_id", "intruder");
        record.set("title", "ok");
        assert!(record.get("organization_id").is_none());
        assert_eq!(record.get("title").unwrap(), &json!("ok"));
    }

    #[test]
    fn required_field_validation_rejects_blank_strings() {
        let mut record = Record::new();
        record.set("title", "   ");
        let err = record.validate_required_fields(&["title"]).unwrap_err();
        assert!(matches!(err, RecordError::MissingRequiredField(f) if f == "title"));
    }

    #[test]
    fn defaults_do_not_overwrite_submitted_values() {
        let mut record = Record::new();
        record.set("status", "draft");
        record.set_if_absent("status", Value::String("active".into()));
        assert_eq!(record.get("status").unwrap(), &json!("draft"));
    }
}
