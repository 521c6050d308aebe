//! Schema introspection and access-gated query execution over Neo4j and
//! PostgreSQL, exposed as MCP tools.

pub mod auth;
pub mod classifier;
pub mod config;
pub mod error;
pub mod graph;
pub mod mcp;
pub mod mcp_stdio;
pub mod mcp_types;
pub mod record;
pub mod schema;
pub mod server;
pub mod sql;

pub use error::{DbsError, Result};
