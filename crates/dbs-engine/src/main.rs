use anyhow::Context;
use clap::Parser;
use dbs_core::config::Settings;
use dbs_core::graph::neo4j::{Neo4jConfig, Neo4jStore};
use dbs_core::mcp::McpServer;
use dbs_core::mcp_stdio::run_mcp_stdio;
use dbs_core::server::DbsEngine;
use dbs_core::sql::PostgresStore;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::parse();
    if !settings.has_backend() {
        anyhow::bail!("no backend configured: set NEO4J_URI and/or DATABASE_URL");
    }

    let mode = settings.access_mode();
    info!(
        read_enabled = mode.read_enabled,
        write_enabled = mode.write_enabled,
        "Starting dbs-mcp (stdio mode)"
    );

    let mut engine = DbsEngine::new(mode);

    if let Some(uri) = &settings.neo4j_uri {
        let config = Neo4jConfig {
            uri: uri.clone(),
            user: settings.neo4j_user.clone(),
            password: settings.neo4j_password.clone(),
            database: settings.neo4j_database.clone(),
        };
        let store = Neo4jStore::connect(&config)
            .await
            .with_context(|| format!("failed to create Neo4j client for {}", uri))?;
        engine = engine.with_graph(Arc::new(store));
    }

    if let Some(url) = &settings.database_url {
        let store = match PostgresStore::connect(url, settings.max_connections).await {
            Ok(store) => store,
            Err(e) => {
                error!("Error verifying database connection: {}", e);
                std::process::exit(1);
            }
        };
        engine = engine.with_sql(Arc::new(store));
    }

    // Fail fast, no retries.
    if let Err(e) = engine.verify_connections().await {
        error!("{}", e);
        std::process::exit(1);
    }

    let server = McpServer::new(Arc::new(engine))?;
    run_mcp_stdio(Arc::new(server)).await
}
