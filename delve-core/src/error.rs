use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DelveError {
    #[error("Root path is empty")]
    EmptyRoot,

    #[error("Path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("No item type selected (files, folders or symlinks)")]
    NoItemTypeSelected,

    #[error("Invalid name pattern {pattern:?}: {source}")]
    InvalidNamePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DelveError>;
