use clap::{ArgAction, Parser};

/// Read/write enablement, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMode {
    pub read_enabled: bool,
    pub write_enabled: bool,
}

impl Default for AccessMode {
    fn default() -> Self {
        Self {
            read_enabled: true,
            write_enabled: false,
        }
    }
}

impl AccessMode {
    pub fn new(read_enabled: bool, write_enabled: bool) -> Self {
        Self {
            read_enabled,
            write_enabled,
        }
    }
}

/// Command line and environment settings for the `dbs-mcp` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "dbs-mcp", version, about = "MCP server for Neo4j and PostgreSQL")]
pub struct Settings {
    /// Expose and allow read queries
    #[arg(long, env = "DBS_READ_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub read_enabled: bool,

    /// Expose and allow write queries
    #[arg(long, env = "DBS_WRITE_ENABLED", default_value_t = false, action = ArgAction::Set)]
    pub write_enabled: bool,

    /// Bolt URI of the Neo4j server; the graph tools are disabled without it
    #[arg(long, env = "NEO4J_URI")]
    pub neo4j_uri: Option<String>,

    #[arg(long, env = "NEO4J_USER", default_value = "neo4j")]
    pub neo4j_user: String,

    #[arg(long, env = "NEO4J_PASSWORD", default_value = "", hide_env_values = true)]
    pub neo4j_password: String,

    #[arg(long, env = "NEO4J_DATABASE", default_value = "neo4j")]
    pub neo4j_database: String,

    /// PostgreSQL connection URL; the relational tools are disabled without it
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DBS_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

impl Settings {
    pub fn access_mode(&self) -> AccessMode {
        AccessMode::new(self.read_enabled, self.write_enabled)
    }

    pub fn has_backend(&self) -> bool {
        self.neo4j_uri.is_some() || self.database_url.is_some()
    }
}
