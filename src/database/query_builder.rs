use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use uuid::Uuid;

use crate::database::record::Record;
use crate::database::store::StoreError;

/// A rendered SQL statement plus its parameters, tagged with the column each
/// parameter binds to so the executor can pick a typed encoding.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<(String, Value)>,
}

/// Assembles the handful of statement shapes this system needs: insert,
/// update-by-id, delete-by-id, and equality-filtered selects with a column
/// projection. Table and column names are validated identifiers; values are
/// always bound parameters.
pub struct QueryBuilder {
    table: String,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { table })
    }

    pub fn insert(&self, record: &Record) -> SqlResult {
        let mut columns = Vec::with_capacity(record.len());
        let mut placeholders = Vec::with_capacity(record.len());
        let mut params = Vec::with_capacity(record.len());

        for (i, (column, value)) in record.fields().iter().enumerate() {
            columns.push(format!("\"{}\"", column));
            placeholders.push(format!("${}", i + 1));
            params.push((column.clone(), value.clone()));
        }

        let query = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING id",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );

        SqlResult { query, params }
    }

    /// UPDATE ... WHERE id = $1. The row identity and creation timestamp are
    /// never part of the SET list.
    pub fn update(&self, id: Uuid, record: &Record) -> SqlResult {
        let mut sets = Vec::new();
        let mut params = vec![("id".to_string(), Value::String(id.to_string()))];

        for (column, value) in record.fields() {
            if column == "id" || column == "created_at" {
                continue;
            }
            params.push((column.clone(), value.clone()));
            sets.push(format!("\"{}\" = ${}", column, params.len()));
        }

        let query = format!(
            "UPDATE \"{}\" SET {} WHERE id = $1",
            self.table,
            sets.join(", ")
        );

        SqlResult { query, params }
    }

    pub fn delete(&self, id: Uuid) -> SqlResult {
        SqlResult {
            query: format!("DELETE FROM \"{}\" WHERE id = $1", self.table),
            params: vec![("id".to_string(), Value::String(id.to_string()))],
        }
    }

    /// SELECT with equality predicates and an optional descending order.
    /// The inner query is wrapped in `row_to_json` so rows come back as JSON
    /// objects regardless of the table's concrete schema.
    pub fn select(
        &self,
        eq: &[(&str, Value)],
        projection: &[&str],
        order_desc: Option<&str>,
    ) -> Result<SqlResult, StoreError> {
        for (column, _) in eq {
            validate_identifier(column)?;
        }
        for column in projection {
            validate_identifier(column)?;
        }

        let select_clause = if projection.is_empty() {
            "*".to_string()
        } else {
            projection
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut params = Vec::with_capacity(eq.len());
        let mut conditions = Vec::with_capacity(eq.len());
        for (column, value) in eq {
            params.push((column.to_string(), value.clone()));
            conditions.push(format!("\"{}\" = ${}", column, params.len()));
        }

        let order_clause = match order_desc {
            Some(column) => {
                validate_identifier(column)?;
                format!(" ORDER BY \"{}\" DESC", column)
            }
            None => String::new(),
        };

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT {} FROM \"{}\"{}{}) t",
            select_clause, self.table, where_clause, order_clause
        );

        Ok(SqlResult { query, params })
    }
}

/// Identifier rules shared by table and column names: non-empty, alphanumeric
/// or underscore, not starting with a digit.
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::Query(format!("Invalid identifier: {:?}", name)))
    }
}

/// Bind one parameter with a column-aware encoding: id columns bind as UUID,
/// `created_at` as a timestamp, `funding_amount` as a decimal; arrays and
/// objects bind as JSONB; scalars bind by JSON type.
pub fn bind_value<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    column: &str,
    value: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    if column == "id" || column.ends_with("_id") {
        if let Some(id) = value.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
            return q.bind(id);
        }
    }
    if column == "created_at" {
        if let Some(at) = value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            return q.bind(at.with_timezone(&chrono::Utc));
        }
    }
    if column == "funding_amount" {
        if let Some(amount) = value.as_str().and_then(|s| s.parse::<Decimal>().ok()) {
            return q.bind(amount);
        }
    }

    match value {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(value.clone()),
    }
}
