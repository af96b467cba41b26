use cdd_client_core::properties::additional::AdditionalProperties;
use cdd_client_core::properties::imports::{self_reference_token, CAST_IMPORT, UNSET_IMPORT};
use cdd_client_core::properties::model::process_model;
use cdd_client_core::properties::registry::GeneratedType;
use cdd_client_core::{
    resolve_openapi, resolve_schemas, Config, ModelType, PropertyKind, ReferencePath,
    ResolveError, SchemaNode,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::fs;
use utoipa::openapi::OpenApi;

fn components(yaml: &str) -> IndexMap<String, SchemaNode> {
    serde_yaml::from_str(yaml).unwrap()
}

fn required_names(model: &ModelType) -> Vec<String> {
    model
        .required_properties()
        .unwrap()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

fn optional_names(model: &ModelType) -> Vec<String> {
    model
        .optional_properties()
        .unwrap()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

#[test]
fn test_resolve_openapi_document() {
    let spec = r#"
openapi: 3.1.0
info:
  title: Pet Store
  version: 1.0.0
paths: {}
components:
  schemas:
    Pet:
      type: object
      required: [id, name]
      properties:
        id: { type: integer, format: int64 }
        name: { type: string }
        born: { type: string, format: date }
        owner: { $ref: '#/components/schemas/Owner' }
      additionalProperties: false
    Owner:
      type: object
      required: [name]
      properties:
        name: { type: string }
"#;
    let dir = tempfile::tempdir().unwrap();
    let spec_path = dir.path().join("openapi.yaml");
    fs::write(&spec_path, spec).unwrap();
    let openapi: OpenApi = serde_yaml::from_str(&fs::read_to_string(&spec_path).unwrap()).unwrap();

    let resolution = resolve_openapi(&openapi, &Config::default()).unwrap();
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);

    let mut names: Vec<&str> = resolution
        .models()
        .map(|m| m.class_info().name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Owner", "Pet"]);

    let pet = resolution.registry.model_by_name("Pet").unwrap();
    assert_eq!(required_names(pet), vec!["id", "name"]);
    assert_eq!(optional_names(pet), vec!["born", "owner"]);
    assert_eq!(
        pet.additional_properties(),
        Some(&AdditionalProperties::Forbidden)
    );

    let eager = pet.eager_imports().unwrap();
    assert!(eager.contains(UNSET_IMPORT));
    assert!(eager.contains(CAST_IMPORT));
    assert!(eager.contains("chrono::NaiveDate"));
    let lazy: Vec<&String> = pet.lazy_imports().unwrap().iter().collect();
    assert_eq!(lazy, vec!["crate::models::owner::Owner"]);

    let owner_path = ReferencePath::for_component("Owner");
    assert!(resolution.registry.dependencies()[&owner_path].contains("Pet"));
}

#[test]
fn test_duplicate_type_name() {
    let resolution = resolve_schemas(
        &components(
            r#"
Pet: { type: object }
pet: { type: object }
"#,
        ),
        &Config::default(),
    );
    assert_eq!(resolution.errors.len(), 1);
    assert!(matches!(
        &resolution.errors[0],
        ResolveError::DuplicateTypeName { name, .. } if name == "Pet"
    ));
    assert_eq!(resolution.models().count(), 1);
}

#[test]
fn test_composition_order_across_all_of() {
    let resolution = resolve_schemas(
        &components(
            r#"
Employee:
  allOf:
    - $ref: '#/components/schemas/Person'
    - type: object
      required: [age]
      properties:
        age: { type: integer }
        team: { type: string }
Person:
  type: object
  required: [id]
  properties:
    id: { type: string }
    nickname: { type: string }
"#,
        ),
        &Config::default(),
    );
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
    let employee = resolution.registry.model_by_name("Employee").unwrap();
    assert_eq!(required_names(employee), vec!["id", "age"]);
    assert_eq!(optional_names(employee), vec!["nickname", "team"]);
}

#[test]
fn test_additional_properties_policies() {
    let resolution = resolve_schemas(
        &components(
            r#"
Open: { type: object }
OpenTrue: { type: object, additionalProperties: true }
OpenEmpty: { type: object, additionalProperties: {} }
Closed: { type: object, additionalProperties: false }
Counts:
  type: object
  additionalProperties: { type: integer }
Nested:
  type: object
  additionalProperties:
    type: object
    properties:
      label: { type: string }
"#,
        ),
        &Config::default(),
    );
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
    let policy = |name: &str| {
        resolution
            .registry
            .model_by_name(name)
            .unwrap()
            .additional_properties()
            .cloned()
            .unwrap()
    };
    assert_eq!(policy("Open"), AdditionalProperties::Any);
    assert_eq!(policy("OpenTrue"), AdditionalProperties::Any);
    assert_eq!(policy("OpenEmpty"), AdditionalProperties::Any);
    assert_eq!(policy("Closed"), AdditionalProperties::Forbidden);

    let AdditionalProperties::Typed(counts) = policy("Counts") else {
        panic!("Expected typed policy")
    };
    assert_eq!(counts.kind, PropertyKind::Integer);
    assert!(counts.required);

    let AdditionalProperties::Typed(nested) = policy("Nested") else {
        panic!("Expected typed policy")
    };
    let PropertyKind::Model(model_ref) = &nested.kind else {
        panic!("Expected model")
    };
    assert_eq!(model_ref.class.name.as_str(), "NestedAdditionalProperty");
    let nested_model = resolution.registry.model(model_ref.id).unwrap();
    assert_eq!(optional_names(nested_model), vec!["label"]);
}

#[test]
fn test_self_reference_never_imported() {
    let resolution = resolve_schemas(
        &components(
            r#"
TreeNode:
  type: object
  properties:
    parent: { $ref: '#/components/schemas/TreeNode' }
    children:
      type: array
      items: { $ref: '#/components/schemas/TreeNode' }
"#,
        ),
        &Config::default(),
    );
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
    let node = resolution.registry.model_by_name("TreeNode").unwrap();
    let own = self_reference_token(node.class_info());
    assert_eq!(own, "crate::models::tree_node::TreeNode");
    assert!(!node.eager_imports().unwrap().contains(&own));
    assert!(!node.lazy_imports().unwrap().contains(&own));
    assert!(node.eager_imports().unwrap().contains(CAST_IMPORT));
}

#[test]
fn test_field_name_conflicts() {
    let resolution = resolve_schemas(
        &components(
            r#"
Forced:
  type: object
  properties:
    fooBar: { type: string }
    foo_bar: { type: integer }
Clashing:
  type: object
  properties:
    "foo$bar": { type: string }
    "foo!bar": { type: string }
"#,
        ),
        &Config::default(),
    );
    let forced = resolution.registry.model_by_name("Forced").unwrap();
    let fields: Vec<&str> = forced
        .optional_properties()
        .unwrap()
        .iter()
        .map(|p| p.field_name.as_str())
        .collect();
    assert_eq!(fields, vec!["fooBar", "foo_bar"]);

    assert_eq!(
        resolution.errors,
        vec![ResolveError::NamingConflict {
            first: "foo!bar".into(),
            second: "foo$bar".into(),
            owner: "Clashing".into(),
        }]
    );
    assert!(resolution
        .registry
        .model_by_name("Clashing")
        .is_some_and(|m| !m.is_populated()));
}

#[test]
fn test_reprocessing_is_idempotent() {
    let config = Config::default();
    let mut resolution = resolve_schemas(
        &components(
            r#"
Order:
  type: object
  required: [id, lines]
  properties:
    id: { type: string, format: uuid }
    lines:
      type: array
      items:
        type: object
        properties:
          sku: { type: string }
          quantity: { type: integer }
    status: { type: string, enum: [open, shipped] }
    note: { type: string }
"#,
        ),
        &config,
    );
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
    let (id, before) = resolution
        .registry
        .models()
        .find(|(_, m)| m.class_info().name.as_str() == "Order")
        .map(|(id, m)| (id, m.clone()))
        .unwrap();

    process_model(id, &mut resolution.registry, &config).unwrap();
    let after = resolution.registry.model(id).unwrap();
    assert_eq!(after, &before);
    assert_eq!(required_names(after), vec!["id", "lines"]);
    assert_eq!(optional_names(after), vec!["status", "note"]);
    assert!(matches!(
        resolution.registry.class("OrderStatus"),
        Some(GeneratedType::Enum(_))
    ));
    assert!(resolution.registry.model_by_name("OrderLinesItem").is_some());
}

#[test]
fn test_forward_reference_and_unpopulated_all_of() {
    let resolution = resolve_schemas(
        &components(
            r#"
Wrapper:
  type: object
  properties:
    target: { $ref: '#/components/schemas/Target' }
Target:
  type: object
  properties:
    value: { type: string }
"#,
        ),
        &Config::default(),
    );
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
    let wrapper = resolution.registry.model_by_name("Wrapper").unwrap();
    let target = &wrapper.optional_properties().unwrap()[0];
    let PropertyKind::Model(model_ref) = &target.kind else {
        panic!("Expected model")
    };
    assert!(resolution.registry.model(model_ref.id).unwrap().is_populated());

    let resolution = resolve_schemas(
        &components(
            r#"
Child:
  allOf:
    - $ref: '#/components/schemas/Parent'
  properties:
    toy: { type: string }
Parent:
  allOf:
    - $ref: '#/components/schemas/Child'
  properties:
    job: { type: string }
"#,
        ),
        &Config::default(),
    );
    let details: Vec<String> = resolution
        .errors
        .iter()
        .map(|error| match error {
            ResolveError::UnresolvedReference { detail, .. } => detail.clone(),
            other => panic!("Expected unresolved reference, got {other:?}"),
        })
        .collect();
    assert_eq!(
        details,
        vec![
            "Reference Parent in allOf was not processed",
            "Reference Child in allOf was not processed",
        ]
    );
    assert_eq!(resolution.models().count(), 0);
    assert!(resolution.registry.model_by_name("Child").is_some());
}

#[test]
fn test_nested_title_collision_across_components() {
    let config = Config {
        use_path_prefixes_for_title_model_names: false,
        ..Config::default()
    };
    let resolution = resolve_schemas(
        &components(
            r#"
A:
  type: object
  properties:
    tag:
      title: Label
      type: object
      properties:
        text: { type: string }
B:
  type: object
  properties:
    tag:
      title: Label
      type: object
      properties:
        text: { type: string }
"#,
        ),
        &config,
    );
    assert_eq!(resolution.errors.len(), 1);
    assert!(matches!(
        &resolution.errors[0],
        ResolveError::DuplicateTypeName { name, .. } if name == "Label"
    ));
    let names: Vec<&str> = resolution
        .models()
        .map(|m| m.class_info().name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "Label"]);
    assert!(resolution
        .registry
        .model_by_name("B")
        .is_some_and(|m| !m.is_populated()));
}

#[test]
fn test_config_overrides_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
use_path_prefixes_for_title_model_names: false
class_overrides:
  Pet:
    class_name: Animal
    module_name: animals
"#,
    )
    .unwrap();
    let config = Config::load(&config_path).unwrap();

    let resolution = resolve_schemas(
        &components(
            r#"
Pet:
  type: object
  properties:
    tag:
      title: Label
      type: object
      properties:
        text: { type: string }
"#,
        ),
        &config,
    );
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
    let animal = resolution.registry.model_by_name("Animal").unwrap();
    assert_eq!(animal.class_info().module_name.as_str(), "animals");
    assert!(resolution.registry.model_by_name("Label").is_some());
}
