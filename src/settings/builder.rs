use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::env::load_env_vars;
use super::{Settings, SettingsError};

/// A settings source in the loading pipeline.
#[derive(Debug)]
enum SettingsSource {
    File { path: PathBuf, required: bool },
    Env { prefix: String, separator: String },
}

/// Builder for loading [`Settings`] from TOML files and the environment.
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones. Nested tables are merged recursively; other values are
/// replaced entirely. Anything left unset keeps its default.
///
/// ```no_run
/// use constforge::Settings;
///
/// let settings = Settings::builder()
///     .with_file("constforge.toml", false)
///     .with_env("CONSTFORGE", "__")
///     .build()?;
/// # Ok::<(), constforge::SettingsError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct SettingsBuilder {
    sources: Vec<SettingsSource>,
}

impl SettingsBuilder {
    /// Adds a TOML file. A missing file is an error only when `required` is set.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(SettingsSource::File {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Reads variables named `{prefix}{separator}{section}{separator}{key}`.
    ///
    /// Path segments are lowercased and values are coerced to boolean,
    /// integer, float or string, in that order.
    pub fn with_env(mut self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.sources.push(SettingsSource::Env {
            prefix: prefix.into(),
            separator: separator.into(),
        });
        self
    }

    pub fn build(self) -> Result<Settings, SettingsError> {
        let mut merged = toml::Table::new();

        for source in self.sources {
            match source {
                SettingsSource::File { path, required } => {
                    if let Some(layer) = read_layer(&path, required)? {
                        overlay(&mut merged, layer);
                    }
                }
                SettingsSource::Env { prefix, separator } => {
                    load_env_vars(&mut merged, &prefix, &separator)?;
                }
            }
        }

        let value = toml::Value::Table(merged);
        value.try_into().map_err(SettingsError::DeserializeError)
    }
}

/// Reads one TOML layer. A missing optional file is not an error.
fn read_layer(path: &Path, required: bool) -> Result<Option<toml::Table>, SettingsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "no settings file");
            return Ok(None);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(SettingsError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let layer = toml::from_str(&contents).map_err(|source| SettingsError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded settings file");
    Ok(Some(layer))
}

/// Lays `layer` over `base`: tables merge key by key, anything else replaces.
fn overlay(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match value {
            toml::Value::Table(nested) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => overlay(existing, nested),
                _ => {
                    base.insert(key, toml::Value::Table(nested));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}
