#![deny(missing_docs)]

//! # Schema Resolution
//!
//! - **registry**: Resolution state and the type-name uniqueness map.
//! - **model**: Two-phase model declaration and population.
//! - **compose**: Field composition over `properties` and `allOf`.
//! - **conflict**: Field identifier disambiguation.
//! - **additional**: The extra-fields policy.
//! - **imports**: Eager and lazy dependency tokens.
//! - **property**: Resolved property variants.
//! - **dispatch**: Schema node to property resolution.
//! - **merge**: Merging redeclared properties.
//! - **document**: Whole-document orchestration.

pub mod additional;
pub mod compose;
pub mod conflict;
pub mod dispatch;
pub mod document;
pub mod imports;
pub mod merge;
pub mod model;
pub mod property;
pub mod registry;

pub use additional::{resolve_additional_properties, AdditionalProperties};
pub use compose::{compose_properties, ComposedProperties};
pub use conflict::resolve_naming_conflict;
pub use dispatch::property_from_data;
pub use document::{resolve_openapi, resolve_schemas, Resolution};
pub use imports::ImportSet;
pub use merge::merge_properties;
pub use model::{declare_model, model_class_string, process_model, ModelType, Scope};
pub use property::{EnumLiteral, EnumType, EnumValue, ModelRef, Property, PropertyKind};
pub use registry::{Checkpoint, GeneratedType, ModelId, Registry, RootKey, Roots};
