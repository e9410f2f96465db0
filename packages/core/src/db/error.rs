//! Storage errors for the libsql content store

use std::path::PathBuf;
use thiserror::Error;

/// Failures below the service layer
///
/// Missing nodes and bad indices are not storage errors; the services report
/// those through `ContentServiceError`.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Cannot open content database at {path}: {source}")]
    Open {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Table or index creation failed
    #[error("Content schema setup failed: {0}")]
    Schema(String),

    #[error("Access denied to content database directory for {path}")]
    AccessDenied { path: PathBuf },

    #[error("Cannot create content database directory: {0}")]
    CreateDirectory(#[from] std::io::Error),

    #[error("libsql: {0}")]
    Libsql(#[from] libsql::Error),

    /// A single statement failed; `context` names the statement
    #[error("Statement failed: {context}")]
    Statement { context: String },

    /// `BEGIN` or `COMMIT` of a write batch failed; the batch was rolled back
    #[error("Write batch {stage} failed: {reason}")]
    Batch { stage: &'static str, reason: String },

    /// Row in `content` or `property` that does not map onto the model
    #[error("Corrupt {table} row: {context}")]
    CorruptRow { table: &'static str, context: String },
}

impl DatabaseError {
    pub fn open(path: PathBuf, source: libsql::Error) -> Self {
        Self::Open { path, source }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn access_denied(path: PathBuf) -> Self {
        Self::AccessDenied { path }
    }

    pub fn statement(context: impl Into<String>) -> Self {
        Self::Statement {
            context: context.into(),
        }
    }

    pub fn batch(stage: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Batch {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn corrupt_row(table: &'static str, context: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_part() {
        let err = DatabaseError::batch("commit", "database is locked");
        assert_eq!(err.to_string(), "Write batch commit failed: database is locked");

        let err = DatabaseError::corrupt_row("content", "Invalid id 'x'");
        assert_eq!(err.to_string(), "Corrupt content row: Invalid id 'x'");
    }
}
