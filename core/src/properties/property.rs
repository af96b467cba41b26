#![deny(missing_docs)]

//! # Properties
//!
//! The closed set of property variants a schema node can resolve to, and the
//! per-variant capabilities the resolver relies on (default checking, import
//! tokens, diagnostics).

use crate::config::Config;
use crate::naming::{Class, FieldName};
use crate::oas::schema::Schema;
use crate::properties::imports::{
    self_reference_token, ImportSet, CAST_IMPORT, DATETIME_IMPORT, DATE_IMPORT, FILE_IMPORT,
    UNSET_IMPORT, UUID_IMPORT,
};
use crate::properties::registry::ModelId;
use serde_json::Value;
use std::fmt;

/// A handle to a generated model, stable for the lifetime of its registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRef {
    /// Arena handle into the registry.
    pub id: ModelId,
    /// Identity of the referenced model.
    pub class: Class,
}

/// A literal enum value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumLiteral {
    /// String member.
    Str(String),
    /// Integer member.
    Int(i64),
}

impl EnumLiteral {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (EnumLiteral::Str(s), Value::String(v)) => s == v,
            (EnumLiteral::Int(i), Value::Number(n)) => n.as_i64() == Some(*i),
            _ => false,
        }
    }
}

/// One generated enum member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Generated constant name, e.g. `AVAILABLE`.
    pub key: String,
    /// The literal value.
    pub value: EnumLiteral,
}

/// A generated enum type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    /// Identity of the generated enum.
    pub class: Class,
    /// Members in declaration order.
    pub values: Vec<EnumValue>,
}

impl EnumType {
    /// `true` when the enum holds integer members.
    pub fn is_integer(&self) -> bool {
        matches!(
            self.values.first(),
            Some(EnumValue {
                value: EnumLiteral::Int(_),
                ..
            })
        )
    }

    /// `true` when every member of `self` is also a member of `other`.
    pub fn is_subset_of(&self, other: &EnumType) -> bool {
        self.values.iter().all(|value| other.values.contains(value))
    }
}

/// The variant of a resolved property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// A generated model.
    Model(ModelRef),
    /// A generated enum.
    Enum(EnumType),
    /// One of several properties.
    Union(Vec<Property>),
    /// A homogeneous list.
    List(Box<Property>),
    /// `string`
    String,
    /// `string` / `date`
    Date,
    /// `string` / `date-time`
    DateTime,
    /// `string` / `uuid`
    Uuid,
    /// `string` / `binary`
    File,
    /// `integer`
    Integer,
    /// `number`
    Float,
    /// `boolean`
    Boolean,
    /// Any JSON value.
    Any,
    /// `null`
    None,
}

impl PropertyKind {
    /// Whether `value` is an acceptable default for this variant.
    pub fn accepts_default(&self, value: &Value) -> bool {
        match self {
            PropertyKind::Model(_) => false,
            PropertyKind::Enum(enum_type) => enum_type.values.iter().any(|v| v.value.matches(value)),
            PropertyKind::Union(variants) => {
                variants.iter().any(|variant| variant.kind.accepts_default(value))
            }
            PropertyKind::List(_) => value.is_array(),
            PropertyKind::String
            | PropertyKind::Date
            | PropertyKind::DateTime
            | PropertyKind::Uuid
            | PropertyKind::File => value.is_string(),
            PropertyKind::Integer => value.is_i64() || value.is_u64(),
            PropertyKind::Float => value.is_number(),
            PropertyKind::Boolean => value.is_boolean(),
            PropertyKind::Any => true,
            PropertyKind::None => value.is_null(),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Model(model) => write!(f, "{}", model.class.name),
            PropertyKind::Enum(enum_type) => write!(f, "{}", enum_type.class.name),
            PropertyKind::Union(variants) => {
                let names: Vec<String> = variants.iter().map(|v| v.kind.to_string()).collect();
                write!(f, "Union[{}]", names.join(", "))
            }
            PropertyKind::List(inner) => write!(f, "List[{}]", inner.kind),
            PropertyKind::String => f.write_str("str"),
            PropertyKind::Date => f.write_str("date"),
            PropertyKind::DateTime => f.write_str("datetime"),
            PropertyKind::Uuid => f.write_str("uuid"),
            PropertyKind::File => f.write_str("File"),
            PropertyKind::Integer => f.write_str("int"),
            PropertyKind::Float => f.write_str("float"),
            PropertyKind::Boolean => f.write_str("bool"),
            PropertyKind::Any => f.write_str("Any"),
            PropertyKind::None => f.write_str("None"),
        }
    }
}

/// A resolved field of a generated type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Raw schema-level name.
    pub name: String,
    /// Sanitized field identifier.
    pub field_name: FieldName,
    /// Whether the owning type requires the field.
    pub required: bool,
    /// Default value.
    pub default: Option<Value>,
    /// Description.
    pub description: Option<String>,
    /// Example value.
    pub example: Option<Value>,
    /// Variant payload.
    pub kind: PropertyKind,
}

impl Property {
    /// Creates a property with the default identifier policy and no documentation.
    pub fn new(name: &str, required: bool, kind: PropertyKind, config: &Config) -> Self {
        Self {
            name: name.to_string(),
            field_name: FieldName::new(name, &config.field_prefix, false),
            required,
            default: None,
            description: None,
            example: None,
            kind,
        }
    }

    /// Copies `description` and `example` from the schema that produced the property.
    pub fn with_docs(mut self, schema: &Schema) -> Self {
        self.description = schema.description.clone();
        self.example = schema.example.clone();
        self
    }

    /// Recomputes the field identifier from the raw name.
    pub fn set_field_name(&mut self, config: &Config, skip_snake_case: bool) {
        self.field_name = FieldName::new(&self.name, &config.field_prefix, skip_snake_case);
    }

    /// Tokens needed wherever this property is declared.
    pub fn eager_imports(&self) -> ImportSet {
        let mut imports = ImportSet::new();
        if !self.required {
            imports.insert(UNSET_IMPORT.to_string());
        }
        match &self.kind {
            PropertyKind::Model(_) => {
                imports.insert(CAST_IMPORT.to_string());
            }
            PropertyKind::Enum(enum_type) => {
                imports.insert(self_reference_token(&enum_type.class));
            }
            PropertyKind::Union(variants) => {
                for variant in variants {
                    imports.extend(variant.eager_imports());
                }
            }
            PropertyKind::List(inner) => {
                imports.extend(inner.eager_imports());
                imports.insert(CAST_IMPORT.to_string());
            }
            PropertyKind::Date => {
                imports.insert(DATE_IMPORT.to_string());
            }
            PropertyKind::DateTime => {
                imports.insert(DATETIME_IMPORT.to_string());
            }
            PropertyKind::Uuid => {
                imports.insert(UUID_IMPORT.to_string());
            }
            PropertyKind::File => {
                imports.insert(FILE_IMPORT.to_string());
            }
            PropertyKind::String
            | PropertyKind::Integer
            | PropertyKind::Float
            | PropertyKind::Boolean
            | PropertyKind::Any
            | PropertyKind::None => {}
        }
        imports
    }

    /// Tokens that may be bound late, breaking reference cycles between models.
    pub fn lazy_imports(&self) -> ImportSet {
        match &self.kind {
            PropertyKind::Model(model) => [self_reference_token(&model.class)].into_iter().collect(),
            PropertyKind::Union(variants) => {
                variants.iter().flat_map(Property::lazy_imports).collect()
            }
            PropertyKind::List(inner) => inner.lazy_imports(),
            _ => ImportSet::new(),
        }
    }
}
