//! # Property Dispatch
//!
//! Resolves any schema node into a typed `Property`. Object schemas are
//! handed to the model resolver; everything else maps onto one of the
//! closed `PropertyKind` variants.

use crate::error::ResolveError;
use crate::naming::{pascal_case, Class};
use crate::oas::reference::ReferencePath;
use crate::oas::schema::{DataType, Schema, SchemaNode, SchemaType};
use crate::properties::model::{declare_model, Scope};
use crate::properties::property::{EnumLiteral, EnumType, EnumValue, Property, PropertyKind};
use crate::properties::registry::{Registry, RootKey};
use heck::ToShoutySnakeCase;
use serde_json::Value;

/// Resolves `node` into a property named `name`.
///
/// `populate_now` is forwarded to the model resolver for object schemas
/// reached directly or through list items and union members.
pub fn property_from_data(
    node: &SchemaNode,
    registry: &mut Registry,
    name: &str,
    required: bool,
    scope: Scope<'_>,
    populate_now: bool,
) -> Result<Property, ResolveError> {
    registry.enter(name, scope.config.max_nesting_depth)?;
    let result = match node {
        SchemaNode::Reference(reference) => {
            property_from_reference(&reference.reference, node, registry, name, required, scope)
        }
        SchemaNode::Schema(schema) => {
            property_from_schema(schema, registry, name, required, scope, populate_now)
        }
    };
    registry.leave();
    result
}

fn property_from_reference(
    raw: &str,
    node: &SchemaNode,
    registry: &mut Registry,
    name: &str,
    required: bool,
    scope: Scope<'_>,
) -> Result<Property, ResolveError> {
    let path = ReferencePath::parse(raw)?;
    let existing =
        registry
            .lookup_by_reference(&path)
            .ok_or_else(|| ResolveError::UnresolvedReference {
                reference: raw.to_string(),
                detail: "Could not find reference in parsed models or enums".to_string(),
                data: Some(Box::new(node.clone())),
            })?;

    let mut property = existing.clone();
    property.name = name.to_string();
    property.required = required;
    property.set_field_name(scope.config, false);

    let root = RootKey::Reference(path);
    for ancestor in scope.roots {
        if let RootKey::Class(class_name) = ancestor {
            registry.add_dependency(&root, class_name);
        }
    }
    Ok(property)
}

/// The raw `$ref` of a composition whose only member is a reference.
fn single_reference(schema: &Schema) -> Option<(&SchemaNode, &str)> {
    let mut members = schema
        .all_of
        .iter()
        .chain(&schema.any_of)
        .chain(&schema.one_of);
    match (members.next(), members.next()) {
        (Some(member), None) if schema.properties.is_empty() => match member {
            SchemaNode::Reference(reference) => Some((member, reference.reference.as_str())),
            SchemaNode::Schema(_) => None,
        },
        _ => None,
    }
}

fn property_from_schema(
    schema: &Schema,
    registry: &mut Registry,
    name: &str,
    required: bool,
    scope: Scope<'_>,
    populate_now: bool,
) -> Result<Property, ResolveError> {
    if let Some((member, raw)) = single_reference(schema) {
        let mut property = property_from_reference(raw, member, registry, name, required, scope)?;
        if schema.default.is_some() {
            property.default = checked_default(schema, &property.kind, name)?;
        }
        if schema.description.is_some() {
            property.description = schema.description.clone();
        }
        return Ok(property);
    }

    if let Some(values) = &schema.enum_values {
        return enum_property(values, schema, registry, name, required, scope);
    }

    let types = schema.types();
    if !schema.any_of.is_empty() || !schema.one_of.is_empty() || types.len() > 1 {
        return union_property(schema, &types, registry, name, required, scope, populate_now);
    }

    let kind = match types.first() {
        Some(DataType::String) => string_kind(schema.format.as_deref()),
        Some(DataType::Number) => PropertyKind::Float,
        Some(DataType::Integer) => PropertyKind::Integer,
        Some(DataType::Boolean) => PropertyKind::Boolean,
        Some(DataType::Null) => PropertyKind::None,
        Some(DataType::Array) => {
            let items = schema
                .items
                .as_ref()
                .ok_or_else(|| ResolveError::InvalidSchema {
                    name: name.to_string(),
                    detail: "Array property must have items defined".to_string(),
                    data: Some(Box::new(SchemaNode::inline(schema.clone()))),
                })?;
            let inner = property_from_data(
                items,
                registry,
                &format!("{}_item", name),
                true,
                scope.nested(),
                populate_now,
            )?;
            PropertyKind::List(Box::new(inner))
        }
        Some(DataType::Object) => {
            PropertyKind::Model(declare_model(schema, registry, name, scope, populate_now)?)
        }
        None if !schema.all_of.is_empty() || !schema.properties.is_empty() => {
            PropertyKind::Model(declare_model(schema, registry, name, scope, populate_now)?)
        }
        None => PropertyKind::Any,
    };

    let default = checked_default(schema, &kind, name)?;
    let mut property = Property::new(name, required, kind, scope.config).with_docs(schema);
    property.default = default;
    Ok(property)
}

fn string_kind(format: Option<&str>) -> PropertyKind {
    match format {
        Some("date") => PropertyKind::Date,
        Some("date-time") => PropertyKind::DateTime,
        Some("uuid") => PropertyKind::Uuid,
        Some("binary") => PropertyKind::File,
        _ => PropertyKind::String,
    }
}

/// The schema's default, if `kind` accepts it.
fn checked_default(
    schema: &Schema,
    kind: &PropertyKind,
    name: &str,
) -> Result<Option<Value>, ResolveError> {
    match &schema.default {
        Some(default) if !kind.accepts_default(default) => Err(ResolveError::InvalidSchema {
            name: name.to_string(),
            detail: format!("Invalid default {} for {}", default, kind),
            data: Some(Box::new(SchemaNode::inline(schema.clone()))),
        }),
        default => Ok(default.clone()),
    }
}

fn union_property(
    schema: &Schema,
    types: &[DataType],
    registry: &mut Registry,
    name: &str,
    required: bool,
    scope: Scope<'_>,
    populate_now: bool,
) -> Result<Property, ResolveError> {
    let mut members: Vec<SchemaNode> = schema
        .any_of
        .iter()
        .chain(&schema.one_of)
        .cloned()
        .collect();
    if members.is_empty() {
        // One variant per listed type, each otherwise identical to the union.
        members = types
            .iter()
            .map(|data_type| {
                SchemaNode::inline(Schema {
                    schema_type: Some(SchemaType::Single(*data_type)),
                    nullable: false,
                    default: None,
                    ..schema.clone()
                })
            })
            .collect();
    }

    let mut variants = Vec::new();
    for (i, member) in members.iter().enumerate() {
        let variant = property_from_data(
            member,
            registry,
            &format!("{}_type_{}", name, i),
            true,
            scope.nested(),
            populate_now,
        )?;
        match variant.kind {
            PropertyKind::Union(inner) => variants.extend(inner),
            _ => variants.push(variant),
        }
    }
    if schema.nullable && !variants.iter().any(|v| v.kind == PropertyKind::None) {
        variants.push(Property::new(
            &format!("{}_type_{}", name, variants.len()),
            true,
            PropertyKind::None,
            scope.config,
        ));
    }

    let kind = PropertyKind::Union(variants);
    let default = checked_default(schema, &kind, name)?;
    let mut property = Property::new(name, required, kind, scope.config).with_docs(schema);
    property.default = default;
    Ok(property)
}

fn enum_property(
    values: &[Value],
    schema: &Schema,
    registry: &mut Registry,
    name: &str,
    required: bool,
    scope: Scope<'_>,
) -> Result<Property, ResolveError> {
    let invalid = |detail: &str| ResolveError::InvalidSchema {
        name: name.to_string(),
        detail: detail.to_string(),
        data: Some(Box::new(SchemaNode::inline(schema.clone()))),
    };

    let mut nullable = schema.types().contains(&DataType::Null);
    let mut literals: Vec<EnumLiteral> = Vec::new();
    for value in values {
        let literal = match value {
            Value::Null => {
                nullable = true;
                continue;
            }
            Value::String(s) => EnumLiteral::Str(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => EnumLiteral::Int(i),
                None => return Err(invalid("Enum values must be strings or integers")),
            },
            _ => return Err(invalid("Enum values must be strings or integers")),
        };
        if !literals.contains(&literal) {
            literals.push(literal);
        }
    }

    if literals.is_empty() {
        if !nullable {
            return Err(invalid("No values provided for enum"));
        }
        let mut property =
            Property::new(name, required, PropertyKind::None, scope.config).with_docs(schema);
        property.default = checked_default(schema, &PropertyKind::None, name)?;
        return Ok(property);
    }
    let integer = matches!(literals[0], EnumLiteral::Int(_));
    if literals
        .iter()
        .any(|l| matches!(l, EnumLiteral::Int(_)) != integer)
    {
        return Err(invalid("Enum values must all be the same type"));
    }

    let mut members: Vec<EnumValue> = Vec::with_capacity(literals.len());
    for (i, literal) in literals.into_iter().enumerate() {
        let key = enum_key(&literal, i);
        if members.iter().any(|m| m.key == key) {
            return Err(invalid(&format!("Duplicate key {} in enum", key)));
        }
        members.push(EnumValue {
            key,
            value: literal,
        });
    }

    let title = schema.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(name);
    let class_string = match scope.parent_name.filter(|p| !p.is_empty()) {
        Some(parent) => format!("{}{}", pascal_case(parent), pascal_case(title)),
        None => title.to_string(),
    };
    let enum_type = EnumType {
        class: Class::from_string(&class_string, scope.config),
        values: members,
    };
    registry.register_enum(&enum_type)?;

    let enum_kind = PropertyKind::Enum(enum_type);
    let kind = if nullable {
        PropertyKind::Union(vec![
            Property::new(&format!("{}_type_0", name), true, enum_kind, scope.config),
            Property::new(
                &format!("{}_type_1", name),
                true,
                PropertyKind::None,
                scope.config,
            ),
        ])
    } else {
        enum_kind
    };
    let default = checked_default(schema, &kind, name)?;
    let mut property = Property::new(name, required, kind, scope.config).with_docs(schema);
    property.default = default;
    Ok(property)
}

/// Constant name of an enum member.
fn enum_key(literal: &EnumLiteral, position: usize) -> String {
    match literal {
        EnumLiteral::Int(i) if *i < 0 => format!("VALUE_NEGATIVE_{}", i.unsigned_abs()),
        EnumLiteral::Int(i) => format!("VALUE_{}", i),
        EnumLiteral::Str(s) if s.starts_with(char::is_alphabetic) => {
            let key = s.to_shouty_snake_case();
            if key.is_empty() {
                format!("VALUE_{}", position)
            } else {
                key
            }
        }
        EnumLiteral::Str(_) => format!("VALUE_{}", position),
    }
}
