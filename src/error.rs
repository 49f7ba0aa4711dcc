use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no metadata record found in {path}")]
    MissingMetadata { path: PathBuf },

    #[error("invalid metadata in {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("example index {index} does not exist (catalog has {len})")]
    UnknownIndex { index: i64, len: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid ignore pattern: {0}")]
    Glob(#[from] globset::Error),
}
