use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid sql identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("malformed dump: {0}")]
    Dump(String),
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether reading the same batch again may succeed.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
            ),
            Self::Io { .. } => true,

            Self::Json { .. } => false,
            Self::InvalidIdentifier(_) => false,
            Self::Charset(_) => false,
            Self::Dump(_) => false,
        }
    }
}
