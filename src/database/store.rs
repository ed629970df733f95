use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row as SqlxRow};
use uuid::Uuid;

use crate::database::query_builder::{bind_value, QueryBuilder, SqlResult};
use crate::database::record::Record;

/// A row projected out of the store, keyed by column name.
pub type Row = Map<String, Value>;

/// Errors crossing the relational-store boundary. Messages surface to
/// callers verbatim; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The store primitives the content subsystem relies on: single-table
/// inserts, updates and deletes by id, and equality-filtered selects with a
/// column projection. Implemented for Postgres in production and by an
/// in-memory table map in tests.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert(&self, table: &str, record: &Record) -> Result<Uuid, StoreError>;

    async fn update(&self, table: &str, id: Uuid, record: &Record) -> Result<u64, StoreError>;

    async fn delete(&self, table: &str, id: Uuid) -> Result<u64, StoreError>;

    async fn select_where(
        &self,
        table: &str,
        eq: &[(&str, Value)],
        projection: &[&str],
        order_desc: Option<&str>,
    ) -> Result<Vec<Row>, StoreError>;

    async fn select_by_id(
        &self,
        table: &str,
        id: Uuid,
        projection: &[&str],
    ) -> Result<Option<Row>, StoreError>;
}

/// sqlx-backed store over the shared connection pool.
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn bound_query<'q>(
        sql: &'q SqlResult,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut q = sqlx::query(&sql.query);
        for (column, value) in &sql.params {
            q = bind_value(q, column, value);
        }
        q
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn insert(&self, table: &str, record: &Record) -> Result<Uuid, StoreError> {
        let sql = QueryBuilder::new(table)?.insert(record);
        let row = Self::bound_query(&sql).fetch_one(&self.pool).await?;
        let id: Uuid = row.try_get("id")?;
        Ok(id)
    }

    async fn update(&self, table: &str, id: Uuid, record: &Record) -> Result<u64, StoreError> {
        let sql = QueryBuilder::new(table)?.update(id, record);
        let result = Self::bound_query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<u64, StoreError> {
        let sql = QueryBuilder::new(table)?.delete(id);
        let result = Self::bound_query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn select_where(
        &self,
        table: &str,
        eq: &[(&str, Value)],
        projection: &[&str],
        order_desc: Option<&str>,
    ) -> Result<Vec<Row>, StoreError> {
        let sql = QueryBuilder::new(table)?.select(eq, projection, order_desc)?;
        let rows = Self::bound_query(&sql).fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let value: Value = row.try_get("row")?;
            match value {
                Value::Object(map) => out.push(map),
                other => {
                    return Err(StoreError::Query(format!(
                        "unexpected row shape from {}: {}",
                        table, other
                    )))
                }
            }
        }
        Ok(out)
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
