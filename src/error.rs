use std::path::PathBuf;

use thiserror::Error;

use crate::resolve::Diagnostics;
use crate::settings::SettingsError;

/// Top-level error type for the constforge library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(
        "configuration could not be resolved ({count} error(s)):\n{diagnostics}",
        count = .0.len(),
        diagnostics = .0
    )]
    Resolution(Diagnostics),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<Diagnostics> for Error {
    fn from(diagnostics: Diagnostics) -> Self {
        Error::Resolution(diagnostics)
    }
}
