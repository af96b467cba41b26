//! # Property Composition
//!
//! Walks an object schema's own `properties` and its `allOf` members and
//! produces the merged, partitioned field lists of the generated type.
//!
//! `allOf` references contribute the already-populated fields of the
//! referenced model, required ones first. Inline `allOf` members are
//! flattened into the schema's own fields. Every field goes through a
//! conflict-aware add that merges same-named fields and separates distinct
//! names that collide after sanitizing.

use crate::config::Config;
use crate::error::ResolveError;
use crate::naming::ClassName;
use crate::oas::reference::ReferencePath;
use crate::oas::schema::{Schema, SchemaNode};
use crate::properties::conflict::resolve_naming_conflict;
use crate::properties::dispatch::property_from_data;
use crate::properties::imports::ImportSet;
use crate::properties::merge::merge_properties;
use crate::properties::model::Scope;
use crate::properties::property::{Property, PropertyKind};
use crate::properties::registry::{Registry, RootKey, Roots};
use indexmap::IndexMap;
use std::collections::HashSet;

/// The composed fields and import tokens of one model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedProperties {
    /// Required fields, first-seen order.
    pub required: Vec<Property>,
    /// Optional fields, first-seen order.
    pub optional: Vec<Property>,
    /// Union of the fields' eager tokens.
    pub eager_imports: ImportSet,
    /// Union of the fields' lazy tokens.
    pub lazy_imports: ImportSet,
}

/// Accumulates properties by raw name, keeping first-seen order.
struct PropertyAccumulator<'a> {
    properties: IndexMap<String, Property>,
    owner: &'a ClassName,
    config: &'a Config,
}

impl<'a> PropertyAccumulator<'a> {
    fn new(owner: &'a ClassName, config: &'a Config) -> Self {
        Self {
            properties: IndexMap::new(),
            owner,
            config,
        }
    }

    fn add(&mut self, property: Property) -> Result<(), ResolveError> {
        let mut merged = match self.properties.get(&property.name) {
            Some(existing) => merge_properties(existing, &property).map_err(|detail| {
                ResolveError::PropertyMergeConflict {
                    name: property.name.clone(),
                    owner: self.owner.to_string(),
                    detail,
                }
            })?,
            None => property,
        };

        for other in self.properties.values_mut() {
            if other.name == merged.name || other.field_name != merged.field_name {
                continue;
            }
            resolve_naming_conflict(&mut merged, other, self.owner, self.config)?;
        }

        self.properties.insert(merged.name.clone(), merged);
        Ok(())
    }

    fn finish(self) -> ComposedProperties {
        let mut composed = ComposedProperties::default();
        for property in self.properties.into_values() {
            composed.eager_imports.extend(property.eager_imports());
            composed.lazy_imports.extend(property.lazy_imports());
            if property.required {
                composed.required.push(property);
            } else {
                composed.optional.push(property);
            }
        }
        composed
    }
}

/// Composes the fields of the type `class_name` from `schema`.
pub fn compose_properties(
    schema: &Schema,
    registry: &mut Registry,
    class_name: &ClassName,
    config: &Config,
    roots: &Roots,
) -> Result<ComposedProperties, ResolveError> {
    let mut required_set: HashSet<&str> = schema.required.iter().map(String::as_str).collect();
    let mut unprocessed: Vec<(&str, &SchemaNode)> = schema
        .properties
        .iter()
        .map(|(name, node)| (name.as_str(), node))
        .collect();
    let mut accumulator = PropertyAccumulator::new(class_name, config);

    for member in &schema.all_of {
        match member {
            SchemaNode::Reference(reference) => {
                let path = ReferencePath::parse(&reference.reference)?;
                for property in inherited_properties(registry, &path, &reference.reference, member)? {
                    accumulator.add(property)?;
                }
                registry.add_dependency(&RootKey::Reference(path), class_name);
            }
            SchemaNode::Schema(inline) => {
                unprocessed.extend(
                    inline
                        .properties
                        .iter()
                        .map(|(name, node)| (name.as_str(), node)),
                );
                required_set.extend(inline.required.iter().map(String::as_str));
            }
        }
    }

    let scope = Scope {
        config,
        parent_name: Some(class_name.as_str()),
        roots,
        reference: None,
    };
    for (name, node) in unprocessed {
        let required = required_set.contains(name);
        let property = property_from_data(node, registry, name, required, scope, true)?;
        accumulator.add(property)?;
    }

    Ok(accumulator.finish())
}

/// The populated fields of the model behind an `allOf` reference, required first.
fn inherited_properties(
    registry: &Registry,
    path: &ReferencePath,
    raw: &str,
    member: &SchemaNode,
) -> Result<Vec<Property>, ResolveError> {
    let property =
        registry
            .lookup_by_reference(path)
            .ok_or_else(|| ResolveError::UnresolvedReference {
                reference: raw.to_string(),
                detail: format!("Reference {} not found", raw),
                data: Some(Box::new(member.clone())),
            })?;
    let PropertyKind::Model(model_ref) = &property.kind else {
        return Err(ResolveError::InvalidComposition {
            reference: raw.to_string(),
            data: Some(Box::new(member.clone())),
        });
    };
    let model = registry.model(model_ref.id);
    match (
        model.and_then(|m| m.required_properties()),
        model.and_then(|m| m.optional_properties()),
    ) {
        (Some(required), Some(optional)) => Ok(required.iter().chain(optional).cloned().collect()),
        _ => Err(ResolveError::UnresolvedReference {
            reference: raw.to_string(),
            detail: format!(
                "Reference {} in allOf was not processed",
                model_ref.class.name
            ),
            data: Some(Box::new(member.clone())),
        }),
    }
}
