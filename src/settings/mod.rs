//! Settings of the tool itself, as opposed to the documents it processes.

mod builder;
mod env;
mod error;

use std::path::PathBuf;

use serde::Deserialize;

use crate::resolve::OverridePosition;

pub use builder::SettingsBuilder;
pub use error::SettingsError;

/// Environment prefix read by the command line tool.
pub const ENV_PREFIX: &str = "CONSTFORGE";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub output: OutputSettings,
    pub render: RenderSettings,
    pub resolve: ResolveSettings,
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Base directory that target output paths are joined onto.
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Indent width for targets that don't set their own.
    pub indent: usize,
    /// Whether to emit the "Generated with" line.
    pub header: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            indent: 4,
            header: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveSettings {
    pub override_position: OverridePosition,
}
