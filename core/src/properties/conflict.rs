//! # Naming Conflicts
//!
//! Separates two properties whose raw names differ but sanitize to the same
//! field identifier.

use crate::config::Config;
use crate::error::ResolveError;
use crate::naming::ClassName;
use crate::properties::property::Property;

/// Forces both properties to recompute their identifiers without snake-casing.
///
/// Fails with `NamingConflict` when the forced identifiers are still equal.
pub fn resolve_naming_conflict(
    first: &mut Property,
    second: &mut Property,
    owner: &ClassName,
    config: &Config,
) -> Result<(), ResolveError> {
    first.set_field_name(config, true);
    second.set_field_name(config, true);
    if first.field_name == second.field_name {
        return Err(ResolveError::NamingConflict {
            first: first.name.clone(),
            second: second.name.clone(),
            owner: owner.to_string(),
        });
    }
    Ok(())
}
