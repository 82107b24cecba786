use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Options file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Pass the path to an override.config.json or override.config.toml file with --config")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid override options")]
    #[diagnostic(
        code(config::invalid),
        help("'overrides' must list unique names, and 'standalone' requires 'standaloneOverridesOutputPath'")
    )]
    InvalidConfig {
        #[source]
        source: cmo_options::ConfigError,
    },

    #[error("Module graph snapshot not found: {path}")]
    #[diagnostic(
        code(snapshot::not_found),
        help("Make sure the file exists and the path is correct")
    )]
    SnapshotNotFound { path: PathBuf },

    #[error("Module graph snapshot could not be parsed")]
    #[diagnostic(
        code(snapshot::parse_error),
        help("Check the snapshot for JSON syntax errors and missing fields")
    )]
    SnapshotParseError {
        #[source]
        source: serde_json::Error,
    },

    #[error("{owner} references {kind} index {index}, but the snapshot only has {len}")]
    #[diagnostic(
        code(snapshot::dangling_index),
        help("Indices in 'modules', 'groups' and 'order' are positions in the top-level arrays")
    )]
    DanglingIndex {
        owner: String,
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Override build failed")]
    #[diagnostic(code(build::engine))]
    Engine {
        #[source]
        source: cmo_engine::Error,
    },

    #[error("Directory creation failed")]
    #[diagnostic(
        code(fs::create_dir_failed),
        help("Check file permissions and available disk space")
    )]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn snapshot_not_found(path: PathBuf) -> Self {
        Self::SnapshotNotFound { path }
    }

    pub fn dangling_index(owner: String, kind: &'static str, index: usize, len: usize) -> Self {
        Self::DanglingIndex {
            owner,
            kind,
            index,
            len,
        }
    }

    pub fn directory_creation_failed(path: PathBuf, source: std::io::Error) -> Self {
        Self::DirectoryCreationFailed { path, source }
    }
}

impl From<cmo_options::ConfigError> for CliError {
    fn from(source: cmo_options::ConfigError) -> Self {
        Self::InvalidConfig { source }
    }
}

impl From<cmo_engine::Error> for CliError {
    fn from(source: cmo_engine::Error) -> Self {
        match source {
            cmo_engine::Error::Config(source) => Self::InvalidConfig { source },
            source => Self::Engine { source },
        }
    }
}
