//! Relational backend: catalog introspection and write-result normalization.
//!
//! Introspection only sees the `public` schema. Tables in other namespaces are
//! invisible to `get_postgres_schema`.

pub mod convert;
pub mod postgres;

use crate::error::DbsError;
use crate::record::{message_record, Record, RecordStream};
use crate::schema::relational::{normalize, RawColumnRow};
use crate::schema::RelationalSchema;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};

pub use postgres::PostgresStore;

pub const DDL_SUCCESS_MESSAGE: &str = "DDL executed successfully";

#[async_trait]
pub trait SqlBackend: Send + Sync {
    /// Column/constraint join over the catalog, fixed to the `public` schema.
    async fn fetch_column_catalog(&self) -> Result<Vec<RawColumnRow>, DbsError>;

    async fn run_query(&self, text: &str) -> Result<RecordStream, DbsError>;

    /// Startup health check.
    async fn ping(&self) -> Result<(), DbsError>;
}

/// Single catalog query, then a synchronous fold over the buffered rows.
pub async fn introspect(backend: &dyn SqlBackend) -> Result<RelationalSchema, DbsError> {
    let rows = backend.fetch_column_catalog().await?;
    Ok(normalize(rows))
}

/// Appends `RETURNING *` to INSERT/UPDATE/DELETE statements that lack a returning
/// clause, dropping a trailing `;` first. Other statements are returned unchanged.
pub fn prepare_write_statement(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let returning_candidate = ["insert", "update", "delete"]
        .iter()
        .any(|verb| lowered.starts_with(verb));

    if !returning_candidate || lowered.contains("returning") {
        return text.to_string();
    }

    let statement = text.trim_end();
    let statement = statement.strip_suffix(';').unwrap_or(statement).trim_end();
    format!("{} RETURNING *", statement)
}

/// Substitutes a single DDL success record for a write that produced no rows.
pub fn ensure_non_empty(mut inner: RecordStream) -> impl Stream<Item = Result<Record, DbsError>> {
    try_stream! {
        let mut empty = true;
        while let Some(record) = inner.next().await {
            let record = record?;
            empty = false;
            yield record;
        }
        if empty {
            yield message_record(DDL_SUCCESS_MESSAGE);
        }
    }
}
