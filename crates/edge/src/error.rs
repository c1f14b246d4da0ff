// crates/edge/src/error.rs

use serve::Error as ServeError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("serve error: {0}")]
    Serve(#[from] ServeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
