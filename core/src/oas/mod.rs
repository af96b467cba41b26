#![deny(missing_docs)]

//! # OpenAPI Schema Input
//!
//! - **schema**: Raw schema node model.
//! - **reference**: `$ref` parsing into canonical pointers.
//! - **components**: Adapter from `utoipa` components.

pub mod components;
pub mod reference;
pub mod schema;

pub use components::{schemas_from_components, schemas_from_openapi};
pub use reference::ReferencePath;
pub use schema::{AdditionalFields, DataType, Reference, Schema, SchemaNode, SchemaType};
