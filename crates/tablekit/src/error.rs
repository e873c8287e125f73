//! Error types.
//!
//! Only construction and configuration can fail. Bad cell data, unknown sort
//! columns and unknown filter kinds never produce errors; they degrade to an
//! empty cell, a zero sort key or a no-op.

use std::io;

use thiserror::Error;

/// Errors surfaced by the table engine.
///
/// | Variant | Meaning |
/// |---------|---------|
/// | [`ContainerNotFound`](Error::ContainerNotFound) | Caller bug: the mount point does not exist |
/// | [`Config`](Error::Config) | A table configuration is inconsistent |
/// | [`Io`](Error::Io) | Reading a configuration or data file failed |
/// | [`Json`](Error::Json) / [`Toml`](Error::Toml) / [`Yaml`](Error::Yaml) | A file did not parse |
#[derive(Error, Debug)]
pub enum Error {
    /// The container id could not be resolved.
    #[error("container not found: {0:?}")]
    ContainerNotFound(String),

    /// Invalid table configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while loading a file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// JSON parse error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML parse error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for table engine operations.
pub type Result<T> = std::result::Result<T, Error>;
