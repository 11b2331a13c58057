//! Widget configuration with TOML preset support.
//!
//! Rendering options handed to the engine and the URL templates of every
//! remote call live here. Options serialize to/from TOML so a deployment
//! can point the widget at mirrors or mocks without recompiling.

mod endpoints;
mod viewer;

use std::path::Path;

pub use endpoints::EndpointOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use viewer::{ColorScheme, Quality, RenderMode, SlabMode, ViewerOptions};

use crate::error::StructviewError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[viewer]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Scene construction options.
    pub viewer: ViewerOptions,
    /// Remote endpoint templates.
    pub endpoints: EndpointOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, StructviewError> {
        let content =
            std::fs::read_to_string(path).map_err(StructviewError::Io)?;
        toml::from_str(&content)
            .map_err(|e| StructviewError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), StructviewError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StructviewError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StructviewError::Io)?;
        }
        std::fs::write(path, content).map_err(StructviewError::Io)
    }
}
