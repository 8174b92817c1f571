use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};
use tracing::{debug, instrument};

use crate::pipeline::Record;
use crate::source::{RowSource, SourceError};

const MAX_CONNECTIONS: u32 = 2;

/// Table and columns to page through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table: String,
    pub id_column: String,
    pub content_column: String,
    /// Filter out NULL and empty content in the query itself.
    pub skip_empty: bool,
}

impl TableSpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: "id".to_string(),
            content_column: "content".to_string(),
            skip_empty: false,
        }
    }

    fn validate(&self) -> Result<(), SourceError> {
        for name in [&self.table, &self.id_column, &self.content_column] {
            if !is_plain_identifier(name) {
                return Err(SourceError::InvalidIdentifier(name.clone()));
            }
        }
        Ok(())
    }

    /// Keyset page query. Only validated identifiers and integers are
    /// formatted in, so no placeholders are needed on either backend.
    pub fn page_query(&self, after_id: i64, limit: usize) -> String {
        let mut sql = format!(
            "SELECT {id} AS id, {content} AS content FROM {table} WHERE {id} > {after_id}",
            id = self.id_column,
            content = self.content_column,
            table = self.table,
        );
        if self.skip_empty {
            sql.push_str(&format!(
                " AND {content} IS NOT NULL AND {content} <> ''",
                content = self.content_column
            ));
        }
        sql.push_str(&format!(" ORDER BY {} LIMIT {}", self.id_column, limit));
        sql
    }
}

/// Keyset-paginated reads over any sqlx-supported database URL
/// (`postgres://` or `mysql://`).
#[derive(Debug, Clone)]
pub struct SqlRowSource {
    pool: AnyPool,
    spec: TableSpec,
}

impl SqlRowSource {
    pub async fn connect(database_url: &str, spec: TableSpec) -> Result<Self, SourceError> {
        spec.validate()?;
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        Ok(Self { pool, spec })
    }

    pub fn new(pool: AnyPool, spec: TableSpec) -> Result<Self, SourceError> {
        spec.validate()?;
        Ok(Self { pool, spec })
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RowSource for SqlRowSource {
    #[instrument(skip(self), fields(table = %self.spec.table))]
    async fn next_batch(&self, after_id: i64, limit: usize) -> Result<Vec<Record>, SourceError> {
        let sql = self.spec.page_query(after_id, limit);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "fetched page");

        rows.iter()
            .map(|row| -> Result<Record, SourceError> {
                Ok(Record {
                    id: row.try_get::<i64, _>("id")?,
                    raw_content: row.try_get::<Option<String>, _>("content")?,
                })
            })
            .collect()
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
