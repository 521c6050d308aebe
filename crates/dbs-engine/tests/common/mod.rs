#![allow(dead_code)]

use async_trait::async_trait;
use dbs_core::error::DbsError;
use dbs_core::graph::GraphBackend;
use dbs_core::record::{Record, RecordStream};
use dbs_core::schema::graph::EdgeRow;
use dbs_core::schema::relational::RawColumnRow;
use dbs_core::sql::SqlBackend;
use futures::stream;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn rows_stream(rows: Vec<Record>) -> RecordStream {
    Box::pin(stream::iter(rows.into_iter().map(Ok)))
}

/// In-memory relational backend that remembers every statement it was asked to run.
#[derive(Default)]
pub struct MockSql {
    pub catalog: Vec<RawColumnRow>,
    pub rows: Vec<Record>,
    pub executed: Mutex<Vec<String>>,
    pub fail_queries: bool,
}

impl MockSql {
    pub fn returning(rows: Vec<Record>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlBackend for MockSql {
    async fn fetch_column_catalog(&self) -> Result<Vec<RawColumnRow>, DbsError> {
        Ok(self.catalog.clone())
    }

    async fn run_query(&self, text: &str) -> Result<RecordStream, DbsError> {
        self.executed.lock().unwrap().push(text.to_string());
        if self.fail_queries {
            return Err(DbsError::Backend("relation \"t\" does not exist".to_string()));
        }
        Ok(rows_stream(self.rows.clone()))
    }

    async fn ping(&self) -> Result<(), DbsError> {
        Ok(())
    }
}

/// In-memory graph backend.
#[derive(Default)]
pub struct MockGraph {
    pub labels: Vec<String>,
    pub keys: HashMap<String, Vec<Vec<String>>>,
    pub edges: Vec<EdgeRow>,
    pub failing_label: Option<String>,
    pub failing_edges: bool,
    pub rows: Vec<Record>,
    pub executed: Mutex<Vec<String>>,
    pub ping_fails: bool,
}

impl MockGraph {
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphBackend for MockGraph {
    async fn fetch_labels(&self) -> Result<Vec<String>, DbsError> {
        Ok(self.labels.clone())
    }

    async fn fetch_node_keys(&self, label: &str) -> Result<Vec<Vec<String>>, DbsError> {
        if self.failing_label.as_deref() == Some(label) {
            return Err(DbsError::Backend(format!("lookup failed for {}", label)));
        }
        Ok(self.keys.get(label).cloned().unwrap_or_default())
    }

    async fn fetch_edge_tuples(&self) -> Result<Vec<EdgeRow>, DbsError> {
        if self.failing_edges {
            return Err(DbsError::Backend("relationship scan failed".to_string()));
        }
        Ok(self.edges.clone())
    }

    async fn run_query(&self, text: &str) -> Result<RecordStream, DbsError> {
        self.executed.lock().unwrap().push(text.to_string());
        Ok(rows_stream(self.rows.clone()))
    }

    async fn ping(&self) -> Result<(), DbsError> {
        if self.ping_fails {
            return Err(DbsError::Backend("connection refused".to_string()));
        }
        Ok(())
    }
}
