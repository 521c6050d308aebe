use crate::auth::{AccessPolicy, EntryPoint};
use crate::classifier::Dialect;
use crate::config::AccessMode;
use crate::error::DbsError;
use crate::graph::{self, GraphBackend};
use crate::record::RecordStream;
use crate::schema::{GraphSchema, RelationalSchema};
use crate::sql::{self, SqlBackend};
use std::sync::Arc;
use tracing::info;

/// Owns the configured backends and the access policy, and runs every
/// caller-invoked operation: gate, classify, execute.
#[derive(Clone)]
pub struct DbsEngine {
    graph: Option<Arc<dyn GraphBackend>>,
    sql: Option<Arc<dyn SqlBackend>>,
    policy: AccessPolicy,
}

impl DbsEngine {
    pub fn new(mode: AccessMode) -> Self {
        Self {
            graph: None,
            sql: None,
            policy: AccessPolicy::new(mode),
        }
    }

    pub fn with_graph(mut self, backend: Arc<dyn GraphBackend>) -> Self {
        self.graph = Some(backend);
        self
    }

    pub fn with_sql(mut self, backend: Arc<dyn SqlBackend>) -> Self {
        self.sql = Some(backend);
        self
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn has_graph(&self) -> bool {
        self.graph.is_some()
    }

    pub fn has_sql(&self) -> bool {
        self.sql.is_some()
    }

    fn graph_backend(&self) -> Result<&Arc<dyn GraphBackend>, DbsError> {
        self.graph
            .as_ref()
            .ok_or_else(|| DbsError::Configuration("Neo4j is not configured.".to_string()))
    }

    fn sql_backend(&self) -> Result<&Arc<dyn SqlBackend>, DbsError> {
        self.sql
            .as_ref()
            .ok_or_else(|| DbsError::Configuration("PostgreSQL is not configured.".to_string()))
    }

    /// Runs the health check of every configured backend.
    pub async fn verify_connections(&self) -> Result<(), DbsError> {
        if let Some(graph) = &self.graph {
            graph.ping().await.map_err(|e| DbsError::StartupConnectivity {
                backend: "neo4j",
                reason: e.to_string(),
            })?;
        }
        if let Some(sql) = &self.sql {
            sql.ping().await.map_err(|e| DbsError::StartupConnectivity {
                backend: "postgres",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    pub async fn get_graph_schema(&self) -> Result<GraphSchema, DbsError> {
        let backend = self.graph_backend()?;
        info!("Fetching Neo4j schema structure...");
        graph::introspect(backend.as_ref()).await
    }

    pub async fn get_relational_schema(&self) -> Result<RelationalSchema, DbsError> {
        let backend = self.sql_backend()?;
        info!("Fetching PostgreSQL schema structure...");
        sql::introspect(backend.as_ref()).await
    }

    pub async fn execute_graph_query(
        &self,
        entry: EntryPoint,
        text: &str,
    ) -> Result<RecordStream, DbsError> {
        let backend = self.graph_backend()?;
        log_execution(entry, text);
        self.policy.authorize(entry, Dialect::Cypher, text)?;
        backend.run_query(text).await
    }

    /// On the write entry point, DML gains a `RETURNING *` clause and an empty
    /// result becomes a single DDL success record.
    pub async fn execute_sql_query(
        &self,
        entry: EntryPoint,
        text: &str,
    ) -> Result<RecordStream, DbsError> {
        let backend = self.sql_backend()?;
        log_execution(entry, text);
        self.policy.authorize(entry, Dialect::Sql, text)?;

        match entry {
            // Applies to every statement here, including DROP/ALTER which classify as reads.
            EntryPoint::Write => {
                let statement = sql::prepare_write_statement(text);
                let rows = backend.run_query(&statement).await?;
                Ok(Box::pin(sql::ensure_non_empty(rows)))
            }
            EntryPoint::Read => backend.run_query(text).await,
        }
    }
}

fn log_execution(entry: EntryPoint, text: &str) {
    match entry {
        EntryPoint::Read => info!("Executing read query: {}", text),
        EntryPoint::Write => info!("Executing write query: {}", text),
    }
}
