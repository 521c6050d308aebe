//! PostgreSQL implementation of [`SqlBackend`] using a SQLx pool.

use super::convert::row_to_record;
use super::SqlBackend;
use crate::error::DbsError;
use crate::record::{Record, RecordStream};
use crate::schema::relational::RawColumnRow;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use tracing::info;

const GET_SCHEMA_QUERY: &str = "SELECT cols.table_name::text AS table_name, \
    cols.column_name::text AS column_name, \
    cols.data_type::text AS data_type, \
    cols.is_nullable::text AS is_nullable, \
    cols.column_default::text AS column_default, \
    tc.constraint_type::text AS constraint_type, \
    kcu.constraint_name::text AS constraint_name, \
    ccu.table_name::text AS foreign_table, \
    ccu.column_name::text AS foreign_column \
    FROM information_schema.columns cols \
    LEFT JOIN information_schema.key_column_usage kcu \
        ON cols.table_name = kcu.table_name AND cols.column_name = kcu.column_name \
    LEFT JOIN information_schema.table_constraints tc \
        ON tc.constraint_name = kcu.constraint_name AND tc.table_name = cols.table_name \
    LEFT JOIN information_schema.constraint_column_usage ccu \
        ON ccu.constraint_name = tc.constraint_name \
    WHERE cols.table_schema = 'public' \
    ORDER BY cols.table_name, cols.ordinal_position";

pub struct PostgresStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DbsError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        Ok(Self { pool })
    }
}

fn catalog_row(row: &PgRow) -> Result<RawColumnRow, DbsError> {
    let is_nullable: Option<String> = row.try_get("is_nullable")?;
    Ok(RawColumnRow {
        table: row.try_get("table_name")?,
        column: row.try_get("column_name")?,
        data_type: row.try_get("data_type")?,
        nullable: is_nullable.is_some_and(|v| v.eq_ignore_ascii_case("YES")),
        default_value: row.try_get("column_default")?,
        constraint_type: row.try_get("constraint_type")?,
        constraint_name: row.try_get("constraint_name")?,
        foreign_table: row.try_get("foreign_table")?,
        foreign_column: row.try_get("foreign_column")?,
    })
}

fn stream_records(pool: PgPool, text: String) -> impl Stream<Item = Result<Record, DbsError>> {
    try_stream! {
        let mut rows = sqlx::query(&text).fetch(&pool);
        while let Some(row) = rows.try_next().await? {
            yield row_to_record(&row);
        }
    }
}

#[async_trait]
impl SqlBackend for PostgresStore {
    async fn fetch_column_catalog(&self) -> Result<Vec<RawColumnRow>, DbsError> {
        let rows = sqlx::query(GET_SCHEMA_QUERY).fetch_all(&self.pool).await?;
        rows.iter().map(catalog_row).collect()
    }

    async fn run_query(&self, text: &str) -> Result<RecordStream, DbsError> {
        Ok(Box::pin(stream_records(self.pool.clone(), text.to_string())))
    }

    async fn ping(&self) -> Result<(), DbsError> {
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        if one != 1 {
            return Err(DbsError::StartupConnectivity {
                backend: "postgres",
                reason: format!("unexpected result from SELECT 1: {}", one),
            });
        }
        info!("Database connection verified via SELECT 1.");
        Ok(())
    }
}
