#![deny(missing_docs)]

//! # Components Adapter
//!
//! Converts a parsed `utoipa` components block into resolver schema nodes.

use crate::error::{AppError, AppResult};
use crate::oas::schema::SchemaNode;
use indexmap::IndexMap;
use utoipa::openapi::{Components, OpenApi};

/// Collects `components.schemas` as raw schema nodes, keyed by component name.
pub fn schemas_from_components(components: &Components) -> AppResult<IndexMap<String, SchemaNode>> {
    let mut schemas = IndexMap::new();
    for (name, ref_or) in &components.schemas {
        let raw = serde_json::to_value(ref_or).map_err(|e| {
            AppError::General(format!("Failed to serialize schema '{}': {}", name, e))
        })?;
        let node: SchemaNode = serde_json::from_value(raw).map_err(|e| {
            AppError::General(format!("Failed to read schema '{}': {}", name, e))
        })?;
        schemas.insert(name.clone(), node);
    }
    Ok(schemas)
}

/// Collects the component schemas of a whole document.
///
/// A document without components yields an empty map.
pub fn schemas_from_openapi(openapi: &OpenApi) -> AppResult<IndexMap<String, SchemaNode>> {
    match openapi.components.as_ref() {
        Some(components) => schemas_from_components(components),
        None => Ok(IndexMap::new()),
    }
}
