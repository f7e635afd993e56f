use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GvmError {
    #[error("Either the environment variable 'GVM_ROOT' or 'gvm_root' option is required")]
    MissingRoot,

    #[error("version option is required")]
    MissingVersion,

    #[error("alias option is required")]
    MissingAlias,

    #[error("Unsupported parameters: {0}")]
    UnsupportedParameters(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Failed to read arguments file {path}: {source}")]
    ArgsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty command line")]
    EmptyCommand,
}

impl GvmError {
    /// True for errors detected before any process is started.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GvmError::MissingRoot
                | GvmError::MissingVersion
                | GvmError::MissingAlias
                | GvmError::UnsupportedParameters(_)
                | GvmError::InvalidParameters(_)
                | GvmError::ArgsFile { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GvmError>;
