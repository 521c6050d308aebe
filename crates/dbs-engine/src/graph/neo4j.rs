//! Neo4j implementation of [`GraphBackend`] over Bolt.

use super::GraphBackend;
use crate::error::DbsError;
use crate::record::{Record, RecordStream};
use crate::schema::graph::EdgeRow;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::Stream;
use neo4rs::{query, ConfigBuilder, Graph, Row};
use tracing::{debug, info};

const LABELS_QUERY: &str = "CALL db.labels() YIELD label RETURN label";

const EDGES_QUERY: &str = "MATCH (a)-[r]->(b) \
    WITH type(r) AS relType, keys(r) AS relProp, labels(a)[0] AS sourceLabel, labels(b)[0] AS targetLabel \
    RETURN DISTINCT relType, relProp, sourceLabel, targetLabel";

/// Connection settings for [`Neo4jStore::connect`].
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Clone)]
pub struct Neo4jStore {
    graph: Graph,
    database: String,
}

impl Neo4jStore {
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, DbsError> {
        let bolt = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .build()?;
        let graph = Graph::connect(bolt).await?;
        Ok(Self {
            graph,
            database: config.database.clone(),
        })
    }

    async fn fetch_all(&self, text: &str) -> Result<Vec<Row>, DbsError> {
        let mut result = self.graph.execute(query(text)).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

fn node_keys_query(label: &str) -> String {
    format!(
        "MATCH (n:`{}`) RETURN DISTINCT keys(n) AS props",
        label.replace('`', "``")
    )
}

fn stream_records(graph: Graph, text: String) -> impl Stream<Item = Result<Record, DbsError>> {
    try_stream! {
        let mut result = graph.execute(query(&text)).await?;
        while let Some(row) = result.next().await? {
            let record: Record = row.to()?;
            yield record;
        }
    }
}

#[async_trait]
impl GraphBackend for Neo4jStore {
    async fn fetch_labels(&self) -> Result<Vec<String>, DbsError> {
        self.fetch_all(LABELS_QUERY)
            .await?
            .iter()
            .map(|row| row.get::<String>("label").map_err(DbsError::from))
            .collect()
    }

    async fn fetch_node_keys(&self, label: &str) -> Result<Vec<Vec<String>>, DbsError> {
        debug!("Fetching property keys for label {}", label);
        self.fetch_all(&node_keys_query(label))
            .await?
            .iter()
            .map(|row| row.get::<Vec<String>>("props").map_err(DbsError::from))
            .collect()
    }

    async fn fetch_edge_tuples(&self) -> Result<Vec<EdgeRow>, DbsError> {
        self.fetch_all(EDGES_QUERY)
            .await?
            .iter()
            .map(|row| -> Result<EdgeRow, DbsError> {
                Ok(EdgeRow {
                    rel_type: row.get("relType")?,
                    properties: row.get("relProp")?,
                    source_label: row.get("sourceLabel")?,
                    target_label: row.get("targetLabel")?,
                })
            })
            .collect()
    }

    async fn run_query(&self, text: &str) -> Result<RecordStream, DbsError> {
        Ok(Box::pin(stream_records(self.graph.clone(), text.to_string())))
    }

    async fn ping(&self) -> Result<(), DbsError> {
        let rows = self.fetch_all("RETURN 1 AS ok").await?;
        let ok: i64 = match rows.first() {
            Some(row) => row.get("ok")?,
            None => 0,
        };
        if ok != 1 {
            return Err(DbsError::StartupConnectivity {
                backend: "neo4j",
                reason: format!("unexpected result from RETURN 1: {}", ok),
            });
        }
        info!("Successfully connected to Neo4j database: {}", self.database);
        Ok(())
    }
}
