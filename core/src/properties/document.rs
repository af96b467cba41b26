//! # Document Resolution
//!
//! Drives the resolver over every component schema of a document.
//!
//! Components are first declared in rounds so that references between them
//! resolve regardless of document order; declared models are then populated
//! in rounds so `allOf` parents are complete before their children. A round
//! repeats while it makes progress. Every failed attempt is rolled back, so
//! the registry only ever holds successful work.

use crate::config::Config;
use crate::error::{AppResult, ResolveError};
use crate::oas::components::schemas_from_openapi;
use crate::oas::reference::ReferencePath;
use crate::oas::schema::SchemaNode;
use crate::properties::dispatch::property_from_data;
use crate::properties::model::{process_model, ModelType, Scope};
use crate::properties::registry::{ModelId, Registry, RootKey, Roots};
use indexmap::IndexMap;
use tracing::{debug, warn};
use utoipa::openapi::OpenApi;

/// The outcome of resolving a document's component schemas.
#[derive(Debug)]
pub struct Resolution {
    /// Every successfully resolved type.
    pub registry: Registry,
    /// Schemas that could not be resolved, one error each.
    pub errors: Vec<ResolveError>,
}

impl Resolution {
    /// Populated models in declaration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelType> {
        self.registry
            .models()
            .map(|(_, model)| model)
            .filter(|model| model.is_populated())
    }
}

/// Resolves the `components.schemas` block of a parsed OpenAPI document.
pub fn resolve_openapi(openapi: &OpenApi, config: &Config) -> AppResult<Resolution> {
    let schemas = schemas_from_openapi(openapi)?;
    Ok(resolve_schemas(&schemas, config))
}

/// Resolves named component schemas into a registry of generated types.
pub fn resolve_schemas(schemas: &IndexMap<String, SchemaNode>, config: &Config) -> Resolution {
    let mut registry = Registry::new();
    let mut errors = declare_components(schemas, &mut registry, config);
    errors.extend(populate_models(&mut registry, config));
    for error in &errors {
        warn!(%error, "dropping schema");
    }
    Resolution { registry, errors }
}

fn declare_components(
    schemas: &IndexMap<String, SchemaNode>,
    registry: &mut Registry,
    config: &Config,
) -> Vec<ResolveError> {
    let mut errors = Vec::new();
    let mut remaining: Vec<(&str, &SchemaNode)> = Vec::new();
    for (name, node) in schemas {
        if let SchemaNode::Reference(_) = node {
            errors.push(ResolveError::InvalidSchema {
                name: name.clone(),
                detail: "Reference schemas are not supported.".to_string(),
                data: Some(Box::new(node.clone())),
            });
        } else {
            remaining.push((name.as_str(), node));
        }
    }

    let mut round = 0;
    while !remaining.is_empty() {
        round += 1;
        debug!(round, schemas = remaining.len(), "declaration round");
        let mut failed = Vec::new();
        let mut failures = Vec::new();
        for &(name, node) in &remaining {
            let path = ReferencePath::for_component(name);
            let roots: Roots = [RootKey::Reference(path.clone())].into_iter().collect();
            let scope = Scope {
                config,
                parent_name: None,
                roots: &roots,
                reference: Some(&path),
            };
            let checkpoint = registry.checkpoint();
            match property_from_data(node, registry, name, true, scope, false) {
                Ok(property) => registry.insert_reference(path, property),
                Err(error) => {
                    registry.rollback(checkpoint);
                    failed.push((name, node));
                    failures.push(error);
                }
            }
        }
        if failed.len() == remaining.len() {
            errors.extend(failures);
            break;
        }
        remaining = failed;
    }
    errors
}

fn populate_models(registry: &mut Registry, config: &Config) -> Vec<ResolveError> {
    let mut errors = Vec::new();
    let mut pending = registry.take_pending();
    let mut round = 0;
    while !pending.is_empty() {
        round += 1;
        debug!(round, models = pending.len(), "population round");
        let mut failed: Vec<ModelId> = Vec::new();
        let mut failures = Vec::new();
        for &id in &pending {
            let checkpoint = registry.checkpoint();
            let Err(error) = process_model(id, registry, config) else {
                continue;
            };
            registry.rollback(checkpoint);
            match recursive_all_of(registry, id, &error) {
                Some(recursive) => errors.push(recursive),
                None => {
                    failed.push(id);
                    failures.push(error);
                }
            }
        }
        let queued = registry.take_pending();
        if failed.len() == pending.len() && queued.is_empty() {
            errors.extend(failures);
            break;
        }
        pending = failed;
        pending.extend(queued);
    }
    errors
}

/// An `allOf` of the model's own reference can never succeed.
fn recursive_all_of(registry: &Registry, id: ModelId, error: &ResolveError) -> Option<ResolveError> {
    let model = registry.model(id)?;
    let own = model.reference()?;
    let offending = error.offending_reference()?;
    if ReferencePath::parse(offending).ok().as_ref() != Some(own) {
        return None;
    }
    Some(ResolveError::InvalidSchema {
        name: model.class_info().name.to_string(),
        detail: "Recursive allOf reference found".to_string(),
        data: Some(Box::new(SchemaNode::reference(offending))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(yaml: &str) -> IndexMap<String, SchemaNode> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_forward_references_resolve() {
        let resolution = resolve_schemas(
            &components(
                r#"
Pets:
  type: array
  items: { $ref: '#/components/schemas/Pet' }
Pet:
  type: object
  properties:
    owner: { $ref: '#/components/schemas/Owner' }
Owner:
  type: object
  properties:
    name: { type: string }
"#,
            ),
            &Config::default(),
        );
        assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
        let names: Vec<&str> = resolution
            .models()
            .map(|m| m.class_info().name.as_str())
            .collect();
        assert_eq!(names, ["Pet", "Owner"]);
        let pets = ReferencePath::for_component("Pets");
        assert!(resolution.registry.lookup_by_reference(&pets).is_some());
    }

    #[test]
    fn test_all_of_child_before_parent() {
        let resolution = resolve_schemas(
            &components(
                r#"
Dog:
  allOf:
    - $ref: '#/components/schemas/Animal'
    - properties:
        bark: { type: boolean }
Animal:
  type: object
  required: [name]
  properties:
    name: { type: string }
"#,
            ),
            &Config::default(),
        );
        assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
        let dog = resolution.registry.model_by_name("Dog").unwrap();
        let required: Vec<&str> = dog
            .required_properties()
            .unwrap()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(required, ["name"]);
    }

    #[test]
    fn test_reference_component_rejected() {
        let resolution = resolve_schemas(
            &components(
                r#"
Alias: { $ref: '#/components/schemas/Thing' }
Thing: { type: string }
"#,
            ),
            &Config::default(),
        );
        assert_eq!(resolution.errors.len(), 1);
        assert!(matches!(
            &resolution.errors[0],
            ResolveError::InvalidSchema { name, .. } if name == "Alias"
        ));
    }

    #[test]
    fn test_recursive_all_of_reported() {
        let resolution = resolve_schemas(
            &components(
                r#"
Loop:
  allOf:
    - $ref: '#/components/schemas/Loop'
  properties:
    x: { type: string }
"#,
            ),
            &Config::default(),
        );
        assert_eq!(resolution.errors.len(), 1);
        let ResolveError::InvalidSchema { name, detail, .. } = &resolution.errors[0] else {
            panic!("Expected invalid schema, got {:?}", resolution.errors[0])
        };
        assert_eq!(name, "Loop");
        assert_eq!(detail, "Recursive allOf reference found");
        assert_eq!(resolution.models().count(), 0);
    }

    #[test]
    fn test_self_alias_unresolved() {
        let resolution = resolve_schemas(
            &components(
                r#"
Alias:
  allOf:
    - $ref: '#/components/schemas/Alias'
"#,
            ),
            &Config::default(),
        );
        assert_eq!(resolution.errors.len(), 1);
        assert!(matches!(
            &resolution.errors[0],
            ResolveError::UnresolvedReference { reference, .. }
                if reference == "#/components/schemas/Alias"
        ));
        let alias = ReferencePath::for_component("Alias");
        assert!(resolution.registry.lookup_by_reference(&alias).is_none());
    }

    #[test]
    fn test_unresolvable_reference_keeps_other_work() {
        let resolution = resolve_schemas(
            &components(
                r#"
Broken:
  type: array
  items: { $ref: '#/components/schemas/Nowhere' }
Fine:
  type: object
  properties:
    id: { type: integer }
"#,
            ),
            &Config::default(),
        );
        assert_eq!(resolution.errors.len(), 1);
        assert_eq!(
            resolution.errors[0].offending_reference(),
            Some("#/components/schemas/Nowhere")
        );
        assert!(resolution.registry.model_by_name("Fine").is_some());
    }
}
