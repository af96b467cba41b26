#![deny(missing_docs)]

//! # Schema Nodes
//!
//! The raw schema model handed to the resolver by the schema provider.
//! Deserializes from the OpenAPI / JSON Schema object shape.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// A raw schema node: either a reference or an inline schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    /// A `$ref` pointer.
    Reference(Reference),
    /// An inline schema.
    Schema(Box<Schema>),
}

impl SchemaNode {
    /// Wraps an inline schema.
    pub fn inline(schema: Schema) -> Self {
        SchemaNode::Schema(Box::new(schema))
    }

    /// Builds a reference node.
    pub fn reference(reference: impl Into<String>) -> Self {
        SchemaNode::Reference(Reference {
            reference: reference.into(),
        })
    }
}

/// A `$ref` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reference {
    /// The raw reference string.
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// The primitive JSON Schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `null`
    Null,
}

/// The `type` keyword: a single type or a list of types.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `type: string`
    Single(DataType),
    /// `type: [string, "null"]`
    Multiple(Vec<DataType>),
}

/// The raw `additionalProperties` keyword.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalFields {
    /// `additionalProperties: true | false`
    Bool(bool),
    /// `additionalProperties: { ... }`
    Schema(SchemaNode),
}

/// An inline schema object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    /// Display title; preferred over the referencing name when naming types.
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// The `type` keyword.
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// The `format` keyword.
    pub format: Option<String>,
    /// Declared fields, in document order.
    pub properties: IndexMap<String, SchemaNode>,
    /// Names of required fields.
    pub required: Vec<String>,
    /// Composition members.
    pub all_of: Vec<SchemaNode>,
    /// `anyOf` members.
    pub any_of: Vec<SchemaNode>,
    /// `oneOf` members.
    pub one_of: Vec<SchemaNode>,
    /// Array item schema.
    pub items: Option<SchemaNode>,
    /// Policy for fields not listed in `properties`.
    pub additional_properties: Option<AdditionalFields>,
    /// Allowed values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    /// Default value.
    pub default: Option<Value>,
    /// Example value.
    pub example: Option<Value>,
    /// OpenAPI 3.0 nullability.
    pub nullable: bool,
}

impl Schema {
    /// `true` when no constraining keyword is set.
    pub fn is_empty(&self) -> bool {
        *self == Schema::default()
    }

    /// The declared types, with `null` appended for `nullable: true`.
    pub fn types(&self) -> Vec<DataType> {
        let mut types = match &self.schema_type {
            Some(SchemaType::Single(data_type)) => vec![*data_type],
            Some(SchemaType::Multiple(list)) => {
                let mut unique = Vec::new();
                for data_type in list {
                    if !unique.contains(data_type) {
                        unique.push(*data_type);
                    }
                }
                unique
            }
            None => Vec::new(),
        };
        if self.nullable && !types.is_empty() && !types.contains(&DataType::Null) {
            types.push(DataType::Null);
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_object_schema() {
        let yaml = r#"
title: Pet
type: object
required: [id]
properties:
  id: { type: integer }
  owner: { $ref: '#/components/schemas/Owner' }
additionalProperties: false
"#;
        let node: SchemaNode = serde_yaml::from_str(yaml).unwrap();
        let SchemaNode::Schema(schema) = node else {
            panic!("Expected inline schema")
        };
        assert_eq!(schema.title.as_deref(), Some("Pet"));
        assert_eq!(schema.required, vec!["id"]);
        let keys: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(keys, ["id", "owner"]);
        assert_eq!(
            schema.properties["owner"],
            SchemaNode::reference("#/components/schemas/Owner")
        );
        assert_eq!(
            schema.additional_properties,
            Some(AdditionalFields::Bool(false))
        );
    }

    #[test]
    fn test_types_with_nullable_and_lists() {
        let schema: Schema = serde_yaml::from_str("type: string\nnullable: true").unwrap();
        assert_eq!(schema.types(), vec![DataType::String, DataType::Null]);

        let schema: Schema = serde_yaml::from_str("type: [integer, 'null']").unwrap();
        assert_eq!(schema.types(), vec![DataType::Integer, DataType::Null]);
    }

    #[test]
    fn test_empty_schema() {
        let schema: Schema = serde_yaml::from_str("{}").unwrap();
        assert!(schema.is_empty());
        let schema: Schema = serde_yaml::from_str("type: string").unwrap();
        assert!(!schema.is_empty());
    }
}
