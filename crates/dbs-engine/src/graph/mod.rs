//! Graph backend: metadata fetching, concurrent introspection, query execution.

pub mod neo4j;

use crate::error::DbsError;
use crate::record::RecordStream;
use crate::schema::graph::{fold_edges, fold_node, EdgeRow};
use crate::schema::{GraphNode, GraphSchema};
use async_trait::async_trait;
use futures::future::{try_join, try_join_all};

pub use neo4j::Neo4jStore;

#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// All node labels known to the database.
    async fn fetch_labels(&self) -> Result<Vec<String>, DbsError>;

    /// The distinct key lists present on nodes carrying `label`.
    async fn fetch_node_keys(&self, label: &str) -> Result<Vec<Vec<String>>, DbsError>;

    async fn fetch_edge_tuples(&self) -> Result<Vec<EdgeRow>, DbsError>;

    async fn run_query(&self, text: &str) -> Result<RecordStream, DbsError>;

    /// Startup health check.
    async fn ping(&self) -> Result<(), DbsError>;
}

/// Builds the graph schema. Nodes and edges are fetched concurrently, with one
/// key lookup per label; any failure fails the whole call. Node order is unspecified.
pub async fn introspect(backend: &dyn GraphBackend) -> Result<GraphSchema, DbsError> {
    let (nodes, edges) = try_join(fetch_nodes(backend), backend.fetch_edge_tuples()).await?;
    Ok(GraphSchema {
        nodes,
        edges: fold_edges(edges),
    })
}

async fn fetch_nodes(backend: &dyn GraphBackend) -> Result<Vec<GraphNode>, DbsError> {
    let labels = backend.fetch_labels().await?;
    try_join_all(labels.into_iter().map(|label| async move {
        let keys = backend.fetch_node_keys(&label).await?;
        Ok::<_, DbsError>(fold_node(label, keys))
    }))
    .await
}
