#![deny(missing_docs)]

//! # CDD Client Core
//!
//! Resolves the component schemas of an OpenAPI document into a registry of
//! generated client types: models with merged, conflict-free fields, enums,
//! extra-field policies and the import tokens a code emitter needs.

/// Shared error types.
pub mod error;

/// Run configuration.
pub mod config;

/// Identifier sanitizing.
pub mod naming;

/// OpenAPI schema input.
pub mod oas;

/// Schema resolution.
pub mod properties;

pub use config::{ClassOverride, Config};
pub use error::{AppError, AppResult, ResolveError};
pub use naming::{Class, ClassName, FieldName};
pub use oas::{ReferencePath, Schema, SchemaNode};
pub use properties::{
    resolve_openapi, resolve_schemas, AdditionalProperties, ModelType, Property, PropertyKind,
    Registry, Resolution,
};
