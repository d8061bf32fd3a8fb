use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("required settings file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    DeserializeError(#[from] toml::de::Error),

    #[error("environment separator must not be empty")]
    EmptySeparator,
}
