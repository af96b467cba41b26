//! # Property Merging
//!
//! Combines two properties that share a raw name, as happens when `allOf`
//! members redeclare a field. The result must satisfy both declarations;
//! `first` is the earlier declaration and `second` overrides documentation.

use crate::properties::property::{Property, PropertyKind};
use std::mem::discriminant;

/// Merges `second` into `first`, or explains why they are incompatible.
pub fn merge_properties(first: &Property, second: &Property) -> Result<Property, String> {
    match (&first.kind, &second.kind) {
        (_, PropertyKind::Any) => merge_common_attributes(first.clone(), &[second]),
        // Keep the concrete type of `second` but the declaration order of both.
        (PropertyKind::Any, _) => merge_common_attributes(second.clone(), &[first, second]),
        (PropertyKind::Enum(_), _) | (_, PropertyKind::Enum(_)) => merge_with_enum(first, second),
        _ => {
            if let Some(merged) = merge_same_type(first, second) {
                return merged;
            }
            if let Some(merged) = merge_numeric(first, second) {
                return merged;
            }
            if let Some(merged) = merge_string_with_format(first, second) {
                return merged;
            }
            Err(format!(
                "{} can't be merged with {}",
                first.kind, second.kind
            ))
        }
    }
}

fn merge_same_type(first: &Property, second: &Property) -> Option<Result<Property, String>> {
    if discriminant(&first.kind) != discriminant(&second.kind) {
        return None;
    }
    if first == second {
        return Some(Ok(first.clone()));
    }
    let mut base = first.clone();
    if let (PropertyKind::List(a), PropertyKind::List(b)) = (&first.kind, &second.kind) {
        match merge_properties(a, b) {
            Ok(inner) => base.kind = PropertyKind::List(Box::new(inner)),
            Err(detail) => return Some(Err(format!("can't merge list properties: {}", detail))),
        }
    }
    Some(merge_common_attributes(base, &[second]))
}

fn merge_numeric(first: &Property, second: &Property) -> Option<Result<Property, String>> {
    match (&first.kind, &second.kind) {
        (PropertyKind::Integer, PropertyKind::Integer | PropertyKind::Float) => {
            Some(merge_common_attributes(first.clone(), &[second]))
        }
        // Integer is the narrower type, so it becomes the base.
        (PropertyKind::Float, PropertyKind::Integer) => {
            Some(merge_common_attributes(second.clone(), &[first, second]))
        }
        _ => None,
    }
}

fn is_formatted_string(kind: &PropertyKind) -> bool {
    matches!(
        kind,
        PropertyKind::Date | PropertyKind::DateTime | PropertyKind::Uuid | PropertyKind::File
    )
}

fn merge_string_with_format(
    first: &Property,
    second: &Property,
) -> Option<Result<Property, String>> {
    match (&first.kind, &second.kind) {
        (PropertyKind::String, kind) if is_formatted_string(kind) => {
            Some(merge_common_attributes(second.clone(), &[first, second]))
        }
        (kind, PropertyKind::String) if is_formatted_string(kind) => {
            Some(merge_common_attributes(first.clone(), &[second]))
        }
        _ => None,
    }
}

fn merge_with_enum(first: &Property, second: &Property) -> Result<Property, String> {
    if let (PropertyKind::Enum(a), PropertyKind::Enum(b)) = (&first.kind, &second.kind) {
        // The narrower value list satisfies both declarations.
        let narrowed = if a.is_subset_of(b) {
            a.clone()
        } else if b.is_subset_of(a) {
            b.clone()
        } else {
            return Err(
                "can't redefine an enum property with incompatible lists of values".to_string(),
            );
        };
        let mut base = first.clone();
        base.kind = PropertyKind::Enum(narrowed);
        return merge_common_attributes(base, &[second]);
    }

    let (enum_prop, other) = match &first.kind {
        PropertyKind::Enum(_) => (first, second),
        _ => (second, first),
    };
    let PropertyKind::Enum(enum_type) = &enum_prop.kind else {
        return Err(format!("{} can't be merged with {}", first.kind, second.kind));
    };
    let compatible = match other.kind {
        PropertyKind::Integer => enum_type.is_integer(),
        PropertyKind::String => !enum_type.is_integer(),
        _ => false,
    };
    if compatible {
        merge_common_attributes(enum_prop.clone(), &[first, second])
    } else {
        let value_type = if enum_type.is_integer() { "int" } else { "str" };
        Err(format!(
            "can't combine enum of type {} with {}",
            value_type, other.kind
        ))
    }
}

/// Applies `overrides` in order on top of `base`.
///
/// `required` is sticky once set. A later `default`, `description` or
/// `example` replaces an earlier one; an absent value never does.
fn merge_common_attributes(base: Property, overrides: &[&Property]) -> Result<Property, String> {
    let mut current = base;
    for other in overrides {
        if let Some(default) = &other.default {
            if !current.kind.accepts_default(default) {
                return Err(format!(
                    "default {} is not valid for {}",
                    default, current.kind
                ));
            }
            current.default = Some(default.clone());
        }
        current.required = current.required || other.required;
        if other.description.as_deref().is_some_and(|d| !d.is_empty()) {
            current.description = other.description.clone();
        }
        if other.example.is_some() {
            current.example = other.example.clone();
        }
    }
    Ok(current)
}
