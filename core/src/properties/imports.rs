//! # Import Tokens
//!
//! Dependency tokens attached to generated types. The resolver treats them as
//! opaque strings: it only deduplicates them and removes self references.

use crate::naming::Class;
use indexmap::IndexSet;

/// Ordered, deduplicated set of import tokens.
pub type ImportSet = IndexSet<String>;

/// Marker type for fields that may be absent.
pub const UNSET_IMPORT: &str = "crate::types::Unset";

/// Narrowing helper used when decoding dynamically typed values into a model.
pub const CAST_IMPORT: &str = "crate::types::cast";

/// Binary payload wrapper.
pub const FILE_IMPORT: &str = "crate::types::File";

/// Calendar date scalar.
pub const DATE_IMPORT: &str = "chrono::NaiveDate";

/// Timestamp scalar.
pub const DATETIME_IMPORT: &str = "chrono::DateTime";

/// UUID scalar.
pub const UUID_IMPORT: &str = "uuid::Uuid";

/// The token naming a generated type from its own defining module.
pub fn self_reference_token(class: &Class) -> String {
    format!("crate::models::{}::{}", class.module_name, class.name)
}

/// Drops every token equal to `class`'s self reference.
pub fn without_self_reference(tokens: ImportSet, class: &Class) -> ImportSet {
    let own = self_reference_token(class);
    tokens.into_iter().filter(|token| *token != own).collect()
}
