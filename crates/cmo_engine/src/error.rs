//! Error types for override operations.
//!
//! All fallible functions in this crate return [`Result<T>`]. Only invalid
//! configuration and unresolvable output templates are fatal. A module without
//! an override, or a compilation without loader state, is not an error and is
//! handled by the keep/drop policy instead.

use crate::graph::{ChunkId, ModuleId};
use cmo_options::ConfigError;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The options passed to the engine are invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A template placeholder had no value to substitute.
    #[error("Path variable {placeholder} not implemented in this context: {template}")]
    TemplateResolution {
        placeholder: String,
        template: String,
    },

    /// A chunk handle does not belong to the compilation.
    #[error("Unknown chunk: {0}")]
    UnknownChunk(ChunkId),

    /// A module handle does not belong to the compilation.
    #[error("Unknown module: {0}")]
    UnknownModule(ModuleId),

    /// Filesystem I/O failed (reading loader state).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse loader state.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for errors raised by renderers and other collaborators.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
