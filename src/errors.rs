use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting or validating artifacts.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Filesystem I/O error attributed to a specific path.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Invalid configuration (file contents or option combination).
    #[error("config error: {message}")]
    Config { message: String },

    /// A source tree could not be acquired.
    #[error("source error: {message}")]
    Source { message: String },
}

impl ConvertError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for `Result<T, ConvertError>`.
pub type Result<T> = std::result::Result<T, ConvertError>;
