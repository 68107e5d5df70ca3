use sea_orm::DbErr;
use thiserror::Error;

/// Failures raised by the test session itself.
///
/// Errors produced by the caller's code never pass through this type; they
/// are returned to the caller unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("failed to connect to test database: {source}")]
    Connection {
        #[source]
        source: DbErr,
    },
    #[error("failed to begin transaction: {source}")]
    Begin {
        #[source]
        source: DbErr,
    },
    #[error("failed to roll back transaction: {source}")]
    Rollback {
        #[source]
        source: DbErr,
    },
    #[error("failed to close connection: {source}")]
    Release {
        #[source]
        source: DbErr,
    },
}

impl SessionError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// The underlying driver error, if this failure came from the database.
    pub fn db_err(&self) -> Option<&DbErr> {
        match self {
            SessionError::Config { .. } => None,
            SessionError::Connection { source }
            | SessionError::Begin { source }
            | SessionError::Rollback { source }
            | SessionError::Release { source } => Some(source),
        }
    }
}
