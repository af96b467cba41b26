//! # Run Configuration
//!
//! Options read by the resolver. Loaded once per run from YAML and never
//! mutated while schemas are being resolved.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Renames applied to a generated type after its name is sanitized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassOverride {
    /// Replacement type name.
    pub class_name: Option<String>,
    /// Replacement module name.
    pub module_name: Option<String>,
}

/// Generator configuration consumed by the resolution core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// When `false`, a schema `title` is used verbatim as the type name.
    /// When `true`, nested titles are still prefixed with their parent's name.
    pub use_path_prefixes_for_title_model_names: bool,
    /// Prepended to identifiers that would otherwise be invalid.
    pub field_prefix: String,
    /// Keyed by the sanitized type name.
    pub class_overrides: IndexMap<String, ClassOverride>,
    /// Guard against pathological schema nesting.
    pub max_nesting_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_path_prefixes_for_title_model_names: true,
            field_prefix: "field_".to_string(),
            class_overrides: IndexMap::new(),
            max_nesting_depth: 64,
        }
    }
}

impl Config {
    /// Parses a configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    /// Reads and parses a YAML configuration file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
