//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace, and the
//! `ResolveError` values produced while resolving component schemas.

use crate::oas::schema::SchemaNode;
use derive_more::{Display, From};

/// A failure to resolve one schema into a generated type.
///
/// Errors are returned as values so that the caller can skip the failing
/// schema and keep everything the registry already holds.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ResolveError {
    /// Two schemas derived the same generated type name.
    #[display("Attempted to generate duplicate models with name \"{name}\"")]
    DuplicateTypeName {
        /// The colliding type name.
        name: String,
        /// The schema that lost the collision.
        data: Option<Box<SchemaNode>>,
    },

    /// A reference points at nothing, or at a model that has not been populated yet.
    #[display("Unresolved reference {reference}: {detail}")]
    UnresolvedReference {
        /// The raw `$ref` string.
        reference: String,
        /// What was missing.
        detail: String,
        /// The offending node.
        data: Option<Box<SchemaNode>>,
    },

    /// A reference that does not point into the current document.
    #[display("Remote references such as {reference} are not supported yet.")]
    InvalidReference {
        /// The raw `$ref` string.
        reference: String,
    },

    /// `allOf` over something that is not an object schema.
    #[display("Cannot take allOf a non-object ({reference})")]
    InvalidComposition {
        /// The raw `$ref` string of the composed member.
        reference: String,
        /// The offending node.
        data: Option<Box<SchemaNode>>,
    },

    /// Two properties sharing a raw name could not be merged.
    #[display("Found conflicting properties named {name} when creating {owner}: {detail}")]
    PropertyMergeConflict {
        /// Raw property name.
        name: String,
        /// The type being built.
        owner: String,
        /// Why the merge failed.
        detail: String,
    },

    /// Two distinct raw names still share a field identifier after forced disambiguation.
    #[display("Conflicting property names in {owner}: properties {first} and {second} have the same field name")]
    NamingConflict {
        /// First raw property name.
        first: String,
        /// Second raw property name.
        second: String,
        /// The type being built.
        owner: String,
    },

    /// The `additionalProperties` schema cannot describe extra fields.
    #[display("Invalid additionalProperties for {owner}: {detail}")]
    InvalidAdditionalFieldsSpec {
        /// The type being built.
        owner: String,
        /// Why it was rejected.
        detail: String,
    },

    /// A schema node the property dispatcher cannot turn into a property.
    #[display("Invalid schema {name}: {detail}")]
    InvalidSchema {
        /// Raw name of the property or component.
        name: String,
        /// Why it was rejected.
        detail: String,
        /// The offending node.
        data: Option<Box<SchemaNode>>,
    },

    /// Schema nesting went deeper than `Config::max_nesting_depth`.
    #[display("Schema nesting for {name} exceeds the maximum depth of {depth}")]
    RecursionLimit {
        /// Raw name of the property being resolved when the limit hit.
        name: String,
        /// The configured limit.
        depth: usize,
    },
}

impl ResolveError {
    /// The raw `$ref` carried by the offending node, if the error has one.
    pub fn offending_reference(&self) -> Option<&str> {
        let data = match self {
            ResolveError::DuplicateTypeName { data, .. }
            | ResolveError::UnresolvedReference { data, .. }
            | ResolveError::InvalidComposition { data, .. }
            | ResolveError::InvalidSchema { data, .. } => data.as_deref(),
            _ => None,
        };
        match data {
            Some(SchemaNode::Reference(reference)) => Some(reference.reference.as_str()),
            _ => None,
        }
    }
}

impl std::error::Error for ResolveError {}

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Run configuration could not be read.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Schema resolution failure.
    #[display("Resolve Error: {_0}")]
    Resolve(ResolveError),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
