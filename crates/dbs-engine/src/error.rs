use thiserror::Error;

/// Errors surfaced by the engine and the tool layer.
#[derive(Debug, Error)]
pub enum DbsError {
    /// An operation was invoked while its governing mode flag (or backend) is disabled.
    #[error("{0}")]
    Configuration(String),

    /// A read entry point received a write statement.
    #[error("{0}")]
    PolicyViolation(String),

    /// The store rejected or failed the query.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("failed to verify {backend} connection: {reason}")]
    StartupConnectivity { backend: &'static str, reason: String },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),
}

impl DbsError {
    pub fn read_disabled() -> Self {
        DbsError::Configuration("Read mode is not enabled in the configuration.".to_string())
    }

    pub fn write_disabled() -> Self {
        DbsError::Configuration("Write mode is not enabled in the configuration.".to_string())
    }

    pub fn write_on_read_entry_point() -> Self {
        DbsError::PolicyViolation(
            "The provided query is a write query, but this method only supports read queries."
                .to_string(),
        )
    }
}

impl From<neo4rs::Error> for DbsError {
    fn from(e: neo4rs::Error) -> Self {
        DbsError::Backend(e.to_string())
    }
}

impl From<neo4rs::DeError> for DbsError {
    fn from(e: neo4rs::DeError) -> Self {
        DbsError::Backend(e.to_string())
    }
}

impl From<sqlx::Error> for DbsError {
    fn from(e: sqlx::Error) -> Self {
        DbsError::Backend(e.to_string())
    }
}

pub type Result<T, E = DbsError> = std::result::Result<T, E>;
