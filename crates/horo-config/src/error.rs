use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML export failed: {0}")]
    TomlExport(#[from] toml::ser::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] horo_core::HoroError),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("document has no [request] section")]
    MissingRequest,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
