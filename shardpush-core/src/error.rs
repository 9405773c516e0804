use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build archive {archive}: {source}")]
    Compress {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ShardError>;
