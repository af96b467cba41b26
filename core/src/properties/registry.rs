#![deny(missing_docs)]

//! # Type Registry
//!
//! Resolution state for one document run:
//! - an arena of declared models, reached through stable `ModelId` handles,
//! - the uniqueness map from generated type name to model or enum,
//! - the map from component reference path to its resolved property,
//! - the dependency graph used to order emission,
//! - the queue of models declared but not yet populated.
//!
//! All collections are append-only, so a `Checkpoint` can undo a failed
//! attempt by truncation.

use crate::error::ResolveError;
use crate::naming::ClassName;
use crate::oas::reference::ReferencePath;
use crate::properties::model::ModelType;
use crate::properties::property::{EnumType, Property};
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

/// Arena handle of a declared model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(usize);

impl ModelId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the model in declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An ancestor that caused a type to be generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootKey {
    /// A document-level schema, by reference path.
    Reference(ReferencePath),
    /// A synthesized (nested) type, by name.
    Class(ClassName),
}

/// The set of roots of a type.
pub type Roots = IndexSet<RootKey>;

/// What a generated type name is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedType {
    /// A model in the arena.
    Model(ModelId),
    /// An enum.
    Enum(EnumType),
}

/// A restore point for `Registry::rollback`.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    models: usize,
    classes: usize,
    references: usize,
    pending: usize,
    dependencies: IndexMap<ReferencePath, IndexSet<ClassName>>,
}

/// Shared resolution state, threaded explicitly through every resolution step.
#[derive(Debug, Default)]
pub struct Registry {
    models: Vec<ModelType>,
    classes_by_name: IndexMap<ClassName, GeneratedType>,
    classes_by_reference: IndexMap<ReferencePath, Property>,
    dependencies: IndexMap<ReferencePath, IndexSet<ClassName>>,
    models_to_process: Vec<ModelId>,
    depth: usize,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model to the arena under its type name.
    ///
    /// Fails with `DuplicateTypeName` when the name is already bound.
    pub fn register_model(&mut self, model: ModelType) -> Result<ModelId, ResolveError> {
        let name = model.class_info().name.clone();
        if self.classes_by_name.contains_key(&name) {
            return Err(ResolveError::DuplicateTypeName {
                name: name.to_string(),
                data: Some(Box::new(model.source_node())),
            });
        }
        let id = ModelId::new(self.models.len());
        self.models.push(model);
        self.classes_by_name.insert(name, GeneratedType::Model(id));
        Ok(id)
    }

    /// Binds an enum under its type name. Re-registering identical values is a no-op.
    pub fn register_enum(&mut self, enum_type: &EnumType) -> Result<(), ResolveError> {
        match self.classes_by_name.get(&enum_type.class.name) {
            None => {
                self.classes_by_name.insert(
                    enum_type.class.name.clone(),
                    GeneratedType::Enum(enum_type.clone()),
                );
                Ok(())
            }
            Some(GeneratedType::Enum(existing)) if existing.values == enum_type.values => Ok(()),
            Some(GeneratedType::Enum(_)) => Err(ResolveError::InvalidSchema {
                name: enum_type.class.name.to_string(),
                detail: format!(
                    "Found conflicting enums named {} with incompatible values.",
                    enum_type.class.name
                ),
                data: None,
            }),
            Some(GeneratedType::Model(_)) => Err(ResolveError::DuplicateTypeName {
                name: enum_type.class.name.to_string(),
                data: None,
            }),
        }
    }

    /// Looks up what a generated type name is bound to.
    pub fn class(&self, name: &str) -> Option<&GeneratedType> {
        self.classes_by_name.get(name)
    }

    /// All generated type names, in registration order.
    pub fn class_names(&self) -> impl Iterator<Item = &ClassName> {
        self.classes_by_name.keys()
    }

    /// Dereferences a model handle.
    pub fn model(&self, id: ModelId) -> Option<&ModelType> {
        self.models.get(id.0)
    }

    pub(crate) fn model_mut(&mut self, id: ModelId) -> Option<&mut ModelType> {
        self.models.get_mut(id.0)
    }

    /// Finds a model by its generated type name.
    pub fn model_by_name(&self, name: &str) -> Option<&ModelType> {
        match self.classes_by_name.get(name) {
            Some(GeneratedType::Model(id)) => self.model(*id),
            _ => None,
        }
    }

    /// All models, in declaration order.
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &ModelType)> {
        self.models
            .iter()
            .enumerate()
            .map(|(index, model)| (ModelId::new(index), model))
    }

    /// Records the property a component reference path resolves to.
    pub fn insert_reference(&mut self, path: ReferencePath, property: Property) {
        self.classes_by_reference.insert(path, property);
    }

    /// The property a reference path resolves to, if it was registered.
    pub fn lookup_by_reference(&self, path: &ReferencePath) -> Option<&Property> {
        self.classes_by_reference.get(path)
    }

    /// Records that `root` caused `class` to exist.
    ///
    /// Only reference-path roots accumulate edges; bare type names denote
    /// nested reach and are ignored.
    pub fn add_dependency(&mut self, root: &RootKey, class: &ClassName) {
        if let RootKey::Reference(path) = root {
            trace!(root = %path, class = %class, "dependency edge");
            self.dependencies
                .entry(path.clone())
                .or_default()
                .insert(class.clone());
        }
    }

    /// Type names produced through each reference path.
    pub fn dependencies(&self) -> &IndexMap<ReferencePath, IndexSet<ClassName>> {
        &self.dependencies
    }

    /// Queues a declared model for population.
    pub fn enqueue(&mut self, id: ModelId) {
        if !self.models_to_process.contains(&id) {
            self.models_to_process.push(id);
        }
    }

    /// Drains the population queue.
    pub fn take_pending(&mut self) -> Vec<ModelId> {
        std::mem::take(&mut self.models_to_process)
    }

    /// Models waiting for population, in queue order.
    pub fn pending(&self) -> &[ModelId] {
        &self.models_to_process
    }

    /// Captures the current state so a failed attempt can be undone.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            models: self.models.len(),
            classes: self.classes_by_name.len(),
            references: self.classes_by_reference.len(),
            pending: self.models_to_process.len(),
            dependencies: self.dependencies.clone(),
        }
    }

    /// Drops everything added since `checkpoint`.
    ///
    /// Models populated after the checkpoint but declared before it keep
    /// their payload; population only happens on success.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.models.truncate(checkpoint.models);
        self.classes_by_name.truncate(checkpoint.classes);
        self.classes_by_reference.truncate(checkpoint.references);
        self.models_to_process.truncate(checkpoint.pending);
        self.dependencies = checkpoint.dependencies;
    }

    /// Enters one level of schema nesting.
    pub(crate) fn enter(&mut self, name: &str, max_depth: usize) -> Result<(), ResolveError> {
        if self.depth >= max_depth {
            return Err(ResolveError::RecursionLimit {
                name: name.to_string(),
                depth: max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves one level of schema nesting.
    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
