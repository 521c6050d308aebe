use super::{GraphEdge, GraphNode};

/// One distinct `(relType, relProps, sourceLabel, targetLabel)` row from the edge query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRow {
    pub rel_type: String,
    pub properties: Vec<String>,
    pub source_label: Option<String>,
    pub target_label: Option<String>,
}

/// Folds the distinct key lists observed on nodes of `label` into one node entry.
pub fn fold_node(label: String, key_rows: Vec<Vec<String>>) -> GraphNode {
    GraphNode {
        label,
        properties: key_rows.into_iter().flatten().collect(),
    }
}

/// One edge per row. Rows are already distinct, so nothing is merged.
pub fn fold_edges(rows: Vec<EdgeRow>) -> Vec<GraphEdge> {
    rows.into_iter()
        .map(|row| GraphEdge {
            name: row.rel_type,
            properties: row.properties.into_iter().collect(),
            source_label: row.source_label,
            target_label: row.target_label,
        })
        .collect()
}
