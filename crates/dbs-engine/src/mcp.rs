use crate::auth::EntryPoint;
use crate::error::DbsError;
use crate::record::collect_records;
use crate::server::DbsEngine;
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for the query tools.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GraphSchema,
    GraphQuery(EntryPoint),
    SqlSchema,
    SqlQuery(EntryPoint),
}

impl Operation {
    fn entry_point(self) -> Option<EntryPoint> {
        match self {
            Operation::GraphQuery(entry) | Operation::SqlQuery(entry) => Some(entry),
            Operation::GraphSchema | Operation::SqlSchema => None,
        }
    }

    fn input_schema(self) -> Value {
        match self.entry_point() {
            Some(_) => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": self.query_description() }
                },
                "required": ["query"]
            }),
            None => json!({ "type": "object", "properties": {} }),
        }
    }

    fn query_description(self) -> &'static str {
        match self {
            Operation::GraphQuery(_) => "The Cypher query to execute",
            _ => "The SQL query to execute",
        }
    }
}

/// A statically registered tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub operation: Operation,
}

pub const TOOLS: &[ToolDefinition] = &[
    ToolDefinition {
        name: "get_neo4j_schema",
        description: "Get the structure of the Neo4j database schema, including nodes and edges. \
            Returns a list of nodes with their labels and properties, and edges with their names, \
            properties, and source/target node labels.",
        operation: Operation::GraphSchema,
    },
    ToolDefinition {
        name: "execute_neo4j_read_query",
        description: "Executes a read query on the Neo4j database and returns the result as a list of maps.",
        operation: Operation::GraphQuery(EntryPoint::Read),
    },
    ToolDefinition {
        name: "execute_neo4j_write_query",
        description: "Executes a write query on the Neo4j database and returns the result as a list of maps.",
        operation: Operation::GraphQuery(EntryPoint::Write),
    },
    ToolDefinition {
        name: "get_postgres_schema",
        description: "Get the structure of the PostgreSQL database (public schema), including tables, \
            columns, foreign keys and other constraints.",
        operation: Operation::SqlSchema,
    },
    ToolDefinition {
        name: "execute_postgres_read_query",
        description: "Executes a read query on the PostgreSQL database and returns the result as a list of maps.",
        operation: Operation::SqlQuery(EntryPoint::Read),
    },
    ToolDefinition {
        name: "execute_postgres_write_query",
        description: "Executes a write query on the PostgreSQL database and returns the affected rows as a list of maps.",
        operation: Operation::SqlQuery(EntryPoint::Write),
    },
];

/// The MCP tool layer.
/// Wraps the engine and exposes it through the registration table above.
pub struct McpServer {
    engine: Arc<DbsEngine>,
    validators: HashMap<&'static str, JSONSchema>,
}

impl McpServer {
    pub fn new(engine: Arc<DbsEngine>) -> Result<Self, DbsError> {
        let mut validators = HashMap::new();
        for tool in TOOLS {
            let schema = tool.operation.input_schema();
            let compiled = JSONSchema::compile(&schema).map_err(|e| {
                DbsError::Configuration(format!("invalid input schema for {}: {}", tool.name, e))
            })?;
            validators.insert(tool.name, compiled);
        }

        let server = Self { engine, validators };
        info!("Loaded {} tools", server.visible_tools().count());
        Ok(server)
    }

    pub fn engine(&self) -> &DbsEngine {
        &self.engine
    }

    fn is_visible(&self, tool: &ToolDefinition) -> bool {
        let configured = match tool.operation {
            Operation::GraphSchema | Operation::GraphQuery(_) => self.engine.has_graph(),
            Operation::SqlSchema | Operation::SqlQuery(_) => self.engine.has_sql(),
        };
        if !configured {
            return false;
        }
        match tool.operation.entry_point() {
            Some(entry) => {
                let visible = self.engine.policy().is_visible(entry);
                if !visible {
                    debug!("{:?} mode is disabled, filtering out {}", entry, tool.name);
                }
                visible
            }
            None => true,
        }
    }

    fn visible_tools(&self) -> impl Iterator<Item = &'static ToolDefinition> + '_ {
        TOOLS.iter().filter(|tool| self.is_visible(tool))
    }

    /// Lists the tools available under the current configuration.
    pub fn list_tools(&self) -> Vec<Value> {
        self.visible_tools()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.operation.input_schema(),
                })
            })
            .collect()
    }

    /// Validates the arguments and dispatches a tool call. Hidden tools are not found.
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<Value, DbsError> {
        let tool = self
            .visible_tools()
            .find(|tool| tool.name == tool_name)
            .ok_or_else(|| DbsError::ToolNotFound(tool_name.to_string()))?;

        self.validate(tool, &arguments)?;

        match tool.operation {
            Operation::GraphSchema => to_value(self.engine.get_graph_schema().await?),
            Operation::SqlSchema => to_value(self.engine.get_relational_schema().await?),
            Operation::GraphQuery(entry) => {
                let params = parse_query(arguments)?;
                let rows = self.engine.execute_graph_query(entry, &params.query).await?;
                to_value(collect_records(rows).await?)
            }
            Operation::SqlQuery(entry) => {
                let params = parse_query(arguments)?;
                let rows = self.engine.execute_sql_query(entry, &params.query).await?;
                to_value(collect_records(rows).await?)
            }
        }
    }

    fn validate(&self, tool: &ToolDefinition, arguments: &Value) -> Result<(), DbsError> {
        let Some(validator) = self.validators.get(tool.name) else {
            return Ok(());
        };
        if let Err(errors) = validator.validate(arguments) {
            let message = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
            return Err(DbsError::InvalidArguments(message));
        }
        Ok(())
    }
}

fn parse_query(arguments: Value) -> Result<QueryParams, DbsError> {
    serde_json::from_value(arguments).map_err(|e| DbsError::InvalidArguments(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, DbsError> {
    serde_json::to_value(value).map_err(|e| DbsError::Backend(format!("failed to encode result: {}", e)))
}
