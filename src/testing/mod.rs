use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::profile::{
    IndividualDetails, OrganizationDetails, Profile, ProfileDetails, Role,
};
use crate::database::record::Record;
use crate::database::store::{ContentStore, Row, StoreError};

/// In-memory `ContentStore` used by the unit tests: a map of table name to
/// rows, with per-table failure injection for exercising partial-tolerance
/// paths. Semantics mirror the Postgres store at the level the content
/// subsystem observes.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    failing: Mutex<HashSet<String>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent operation against `table` fails.
    pub fn fail_table(&self, table: &str) {
        self.failing.lock().unwrap().insert(table.to_string());
    }

    /// Number of store operations performed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check(&self, table: &str) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(table) {
            return Err(StoreError::Query(format!(
                "injected failure for table {}",
                table
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert(&self, table: &str, record: &Record) -> Result<Uuid, StoreError> {
        self.check(table)?;
        let id = record
            .id()
            .ok_or_else(|| StoreError::Query("insert without id".to_string()))?;
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(record.fields().clone());
        Ok(id)
    }

    async fn update(&self, table: &str, id: Uuid, record: &Record) -> Result<u64, StoreError> {
        self.check(table)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let id_value = Value::String(id.to_string());

        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.get("id") == Some(&id_value) {
                for (key, value) in record.fields() {
                    if key == "id" || key == "created_at" {
                        continue;
                    }
                    row.insert(key.clone(), value.clone());
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<u64, StoreError> {
        self.check(table)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let id_value = Value::String(id.to_string());
        let before = rows.len();
        rows.retain(|row| row.get("id") != Some(&id_value));
        Ok((before - rows.len()) as u64)
    }

    async fn select_where(
        &self,
        table: &str,
        eq: &[(&str, Value)],
        projection: &[&str],
        order_desc: Option<&str>,
    ) -> Result<Vec<Row>, StoreError> {
        self.check(table)?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| eq.iter().all(|(col, val)| row.get(*col) == Some(val)))
                    .map(|row| project(row, projection))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(column) = order_desc {
            rows.sort_by_key(|row| std::cmp::Reverse(sort_key(row, column)));
        }
        Ok(rows)
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: Uuid,
        projection: &[&str],
    ) -> Result<Option<Row>, StoreError> {
        let rows = self
            .select_where(
                table,
                &[("id", Value::String(id.to_string()))],
                projection,
                None,
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

fn project(row: &Row, projection: &[&str]) -> Row {
    if projection.is_empty() {
        return row.clone();
    }
    projection
        .iter()
        .filter_map(|col| row.get(*col).map(|v| (col.to_string(), v.clone())))
        .collect()
}

fn sort_key(row: &Row, column: &str) -> (Option<DateTime<Utc>>, String) {
    let raw = row
        .get(column)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let parsed = DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc));
    (parsed, raw)
}

/// A completed organization profile for tests.
pub fn organization_profile(role: Role, name: &str) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        role: Some(role),
        slug: Some(format!("{}-test", name.to_lowercase().replace(' ', "-"))),
        onboarding_complete: true,
        created_at: Utc::now(),
        details: Some(ProfileDetails::Organization(OrganizationDetails {
            name: Some(name.to_string()),
            ..Default::default()
        })),
    }
}

/// A completed individual profile for tests.
pub fn individual_profile(full_name: &str) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
        role: Some(Role::Individual),
        slug: Some(format!("{}-test", full_name.to_lowercase().replace(' ', "-"))),
        onboarding_complete: true,
        created_at: Utc::now(),
        details: Some(ProfileDetails::Individual(IndividualDetails {
            full_name: Some(full_name.to_string()),
            ..Default::default()
        })),
    }
}
