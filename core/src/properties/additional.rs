//! # Additional Fields
//!
//! Collapses the `additionalProperties` keyword into a closed policy.
//!
//! | keyword                      | policy      |
//! |------------------------------|-------------|
//! | absent, `true`, `{}`         | `Any`       |
//! | `false`                      | `Forbidden` |
//! | any other schema / reference | `Typed`     |

use crate::config::Config;
use crate::error::ResolveError;
use crate::naming::ClassName;
use crate::oas::schema::{AdditionalFields, SchemaNode};
use crate::properties::dispatch::property_from_data;
use crate::properties::model::Scope;
use crate::properties::property::{Property, PropertyKind};
use crate::properties::registry::{Registry, Roots};

/// Raw name given to typed extra-field values.
pub const ADDITIONAL_PROPERTY_NAME: &str = "AdditionalProperty";

/// What a generated type does with fields it does not declare.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// No extra fields are allowed.
    Forbidden,
    /// Extra fields of any type are kept.
    Any,
    /// Extra fields must resolve to this property.
    Typed(Box<Property>),
}

/// Resolves the extra-fields policy of `class_name`.
pub fn resolve_additional_properties(
    spec: Option<&AdditionalFields>,
    registry: &mut Registry,
    class_name: &ClassName,
    config: &Config,
    roots: &Roots,
) -> Result<AdditionalProperties, ResolveError> {
    let node = match spec {
        None | Some(AdditionalFields::Bool(true)) => return Ok(AdditionalProperties::Any),
        Some(AdditionalFields::Bool(false)) => return Ok(AdditionalProperties::Forbidden),
        Some(AdditionalFields::Schema(SchemaNode::Schema(schema))) if schema.is_empty() => {
            return Ok(AdditionalProperties::Any)
        }
        Some(AdditionalFields::Schema(node)) => node,
    };

    let scope = Scope {
        config,
        parent_name: Some(class_name.as_str()),
        roots,
        reference: None,
    };
    // Required in the sense that a present value is never the unset marker.
    let property = property_from_data(node, registry, ADDITIONAL_PROPERTY_NAME, true, scope, true)?;
    if property.kind == PropertyKind::None {
        return Err(ResolveError::InvalidAdditionalFieldsSpec {
            owner: class_name.to_string(),
            detail: "extra fields restricted to null cannot carry values".to_string(),
        });
    }
    Ok(AdditionalProperties::Typed(Box::new(property)))
}
