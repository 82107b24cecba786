use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::HashFunction;

/// Errors raised while loading or validating override options.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("option 'overrides' must list at least one override name")]
    MissingOverrides,

    #[error("override name at position {index} is empty")]
    EmptyOverrideName { index: usize },

    #[error("override '{0}' is listed more than once")]
    DuplicateOverride(String),

    #[error("option 'standaloneOverridesOutputPath' is required when 'standalone' is true")]
    MissingStandaloneOutputPath,

    #[error("hashDigestLength {length} is out of range for {function} (expected 1..={max})")]
    InvalidDigestLength {
        function: HashFunction,
        length: usize,
        max: usize,
    },

    #[error("unsupported options file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
