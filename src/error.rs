//! Error types
//!
//! None of these reach the player except `CatalogError::NoWorldsLoaded`;
//! everything else is logged and degraded at the module boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("world {world_id} word data is not valid JSON: {source}")]
    Parse {
        world_id: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("world {world_id} failed to load: {reason}")]
    Fetch { world_id: u32, reason: String },
    #[error("no world word data could be loaded")]
    NoWorldsLoaded,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("stored value under '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageIdError {
    #[error("malformed stage id '{0}' (expected \"world-stage\")")]
    Malformed(String),
}
