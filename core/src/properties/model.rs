#![deny(missing_docs)]

//! # Model Resolver
//!
//! Builds one generated model from an object schema in two phases:
//!
//! 1. **Declare**: derive the type identity and roots and register the model.
//! 2. **Populate**: compose its properties, additional-fields policy and
//!    import sets. Runs immediately, or later through `process_model` for
//!    models declared ahead of their dependencies.
//!
//! Consumers always reach a model's payload through the registry.

use crate::config::Config;
use crate::error::ResolveError;
use crate::naming::{pascal_case, Class, ClassName};
use crate::oas::reference::ReferencePath;
use crate::oas::schema::{Schema, SchemaNode};
use crate::properties::additional::{resolve_additional_properties, AdditionalProperties};
use crate::properties::compose::compose_properties;
use crate::properties::imports::{without_self_reference, ImportSet};
use crate::properties::property::{ModelRef, Property};
use crate::properties::registry::{GeneratedType, ModelId, Registry, RootKey, Roots};
use tracing::debug;

/// Where a property is being resolved from.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Run configuration.
    pub config: &'a Config,
    /// Name of the enclosing generated type, used to prefix nested type names.
    pub parent_name: Option<&'a str>,
    /// Ancestors that caused this resolution.
    pub roots: &'a Roots,
    /// Component path of the schema itself, when it is a document-level schema.
    pub reference: Option<&'a ReferencePath>,
}

impl<'a> Scope<'a> {
    /// The same scope for a node nested below the current one.
    pub fn nested(self) -> Self {
        Self {
            reference: None,
            ..self
        }
    }
}

/// Everything population computes for a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPayload {
    required_properties: Vec<Property>,
    optional_properties: Vec<Property>,
    additional_properties: AdditionalProperties,
    eager_imports: ImportSet,
    lazy_imports: ImportSet,
}

/// A generated model type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelType {
    class_info: Class,
    reference: Option<ReferencePath>,
    data: Schema,
    roots: Roots,
    payload: Option<ModelPayload>,
}

impl ModelType {
    /// A declared, unpopulated model.
    pub fn new(
        class_info: Class,
        reference: Option<ReferencePath>,
        data: Schema,
        roots: Roots,
    ) -> Self {
        Self {
            class_info,
            reference,
            data,
            roots,
            payload: None,
        }
    }

    /// Type identity.
    pub fn class_info(&self) -> &Class {
        &self.class_info
    }

    /// Component path, for document-level schemas.
    pub fn reference(&self) -> Option<&ReferencePath> {
        self.reference.as_ref()
    }

    /// The schema the model was declared from.
    pub fn data(&self) -> &Schema {
        &self.data
    }

    /// Ancestors that caused this model, including its own name.
    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    /// `true` once population has run.
    pub fn is_populated(&self) -> bool {
        self.payload.is_some()
    }

    /// Required fields in first-seen order; `None` until populated.
    pub fn required_properties(&self) -> Option<&[Property]> {
        self.payload
            .as_ref()
            .map(|p| p.required_properties.as_slice())
    }

    /// Optional fields in first-seen order; `None` until populated.
    pub fn optional_properties(&self) -> Option<&[Property]> {
        self.payload
            .as_ref()
            .map(|p| p.optional_properties.as_slice())
    }

    /// Extra-fields policy; `None` means not yet specified.
    pub fn additional_properties(&self) -> Option<&AdditionalProperties> {
        self.payload.as_ref().map(|p| &p.additional_properties)
    }

    /// Tokens the model's module must bind eagerly.
    pub fn eager_imports(&self) -> Option<&ImportSet> {
        self.payload.as_ref().map(|p| &p.eager_imports)
    }

    /// Tokens the model's module may bind late.
    pub fn lazy_imports(&self) -> Option<&ImportSet> {
        self.payload.as_ref().map(|p| &p.lazy_imports)
    }

    /// The schema wrapped as a node, for error context.
    pub fn source_node(&self) -> SchemaNode {
        SchemaNode::inline(self.data.clone())
    }

    fn set_payload(
        &mut self,
        required_properties: Vec<Property>,
        optional_properties: Vec<Property>,
        additional_properties: AdditionalProperties,
        eager_imports: ImportSet,
        lazy_imports: ImportSet,
    ) {
        self.payload = Some(ModelPayload {
            required_properties,
            optional_properties,
            additional_properties,
            eager_imports: without_self_reference(eager_imports, &self.class_info),
            lazy_imports: without_self_reference(lazy_imports, &self.class_info),
        });
    }

    fn is_redeclaration_of(&self, other: &ModelType) -> bool {
        self.class_info == other.class_info
            && self.reference == other.reference
            && self.roots == other.roots
            && self.data == other.data
    }
}

/// Derives the candidate type name of an object schema.
///
/// A title wins outright unless path prefixes are forced. Otherwise the
/// title (or the referencing name) is prefixed with the PascalCased parent;
/// without a parent it is used as-is.
pub fn model_class_string(
    schema: &Schema,
    name: &str,
    parent_name: Option<&str>,
    config: &Config,
) -> String {
    let title = schema.title.as_deref().filter(|t| !t.is_empty());
    if let (Some(title), false) = (title, config.use_path_prefixes_for_title_model_names) {
        return title.to_string();
    }
    let title = title.unwrap_or(name);
    match parent_name.filter(|p| !p.is_empty()) {
        Some(parent) => format!("{}{}", pascal_case(parent), pascal_case(title)),
        None => title.to_string(),
    }
}

/// Declares a model for `schema`, populating it right away when `populate_now` is set.
///
/// Models declared without population are queued on the registry for `process_model`.
pub fn declare_model(
    schema: &Schema,
    registry: &mut Registry,
    name: &str,
    scope: Scope<'_>,
    populate_now: bool,
) -> Result<ModelRef, ResolveError> {
    let class_string = model_class_string(schema, name, scope.parent_name, scope.config);
    let class_info = Class::from_string(&class_string, scope.config);
    let mut model_roots = scope.roots.clone();
    model_roots.insert(RootKey::Class(class_info.name.clone()));

    let mut model = ModelType::new(
        class_info.clone(),
        scope.reference.cloned(),
        schema.clone(),
        model_roots,
    );

    if let Some(id) = populated_redeclaration(registry, &model) {
        debug!(class = %class_info.name, "reusing identical model declaration");
        return Ok(ModelRef {
            id,
            class: class_info,
        });
    }

    // Name collisions surface on registration, after population.
    if populate_now {
        populate(&mut model, registry, scope.config)?;
        for root in scope.roots {
            registry.add_dependency(root, &class_info.name);
        }
    }

    let id = registry.register_model(model)?;
    if !populate_now {
        registry.enqueue(id);
    }
    debug!(class = %class_info.name, populated = populate_now, "declared model");
    Ok(ModelRef {
        id,
        class: class_info,
    })
}

/// The populated model `model` re-declares under the same ancestry, if any.
fn populated_redeclaration(registry: &Registry, model: &ModelType) -> Option<ModelId> {
    match registry.class(model.class_info.name.as_str())? {
        GeneratedType::Model(id) => registry
            .model(*id)
            .filter(|previous| previous.is_populated() && previous.is_redeclaration_of(model))
            .map(|_| *id),
        GeneratedType::Enum(_) => None,
    }
}

/// Populates an already-declared model, overwriting only its payload.
pub fn process_model(
    id: ModelId,
    registry: &mut Registry,
    config: &Config,
) -> Result<(), ResolveError> {
    let mut model = registry
        .model(id)
        .cloned()
        .ok_or_else(|| ResolveError::UnresolvedReference {
            reference: format!("model #{}", id.index()),
            detail: "Model handle is not registered".to_string(),
            data: None,
        })?;
    populate(&mut model, registry, config)?;
    debug!(class = %model.class_info.name, "populated model");
    if let Some(slot) = registry.model_mut(id) {
        *slot = model;
    }
    Ok(())
}

fn populate(
    model: &mut ModelType,
    registry: &mut Registry,
    config: &Config,
) -> Result<(), ResolveError> {
    let class_name: ClassName = model.class_info.name.clone();
    let composed = compose_properties(&model.data, registry, &class_name, config, &model.roots)?;
    let additional = resolve_additional_properties(
        model.data.additional_properties.as_ref(),
        registry,
        &class_name,
        config,
        &model.roots,
    )?;

    let mut eager_imports = composed.eager_imports;
    let mut lazy_imports = composed.lazy_imports;
    if let AdditionalProperties::Typed(property) = &additional {
        eager_imports.extend(property.eager_imports());
        lazy_imports.extend(property.lazy_imports());
    }

    model.set_payload(
        composed.required,
        composed.optional,
        additional,
        eager_imports,
        lazy_imports,
    );
    Ok(())
}
