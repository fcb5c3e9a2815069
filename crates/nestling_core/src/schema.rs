//! Record type and relation declarations.

use std::sync::Arc;

use nestling_value::Value;

use crate::error::{ConfigError, CoreResult};

/// Keys that identify a record and can never be relation keys.
pub(crate) const RESERVED_KEYS: [&str; 2] = ["id", "cid"];

/// How many related records a relation embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// A single nested record.
    One,
    /// An ordered collection of nested records.
    Many,
}

/// A declared embedding from a record type to related records.
///
/// Relations are declared on the parent type and drive attribute routing:
/// a set against a relation key builds, merges, or reconciles nested
/// instances instead of storing the raw payload.
#[derive(Debug, Clone)]
pub struct Relation {
    /// Attribute key the relation is mounted at.
    pub key: String,
    /// One or many.
    pub cardinality: Cardinality,
    /// Record type of the nested instances.
    pub related: Arc<RecordType>,
    /// Collection type backing a many-relation; a generic collection of
    /// `related` elements is used when absent.
    pub collection: Option<Arc<CollectionType>>,
}

impl Relation {
    /// Creates a one-to-one relation.
    #[must_use]
    pub fn one(key: impl Into<String>, related: &Arc<RecordType>) -> Self {
        Self {
            key: key.into(),
            cardinality: Cardinality::One,
            related: Arc::clone(related),
            collection: None,
        }
    }

    /// Creates a one-to-many relation.
    #[must_use]
    pub fn many(key: impl Into<String>, related: &Arc<RecordType>) -> Self {
        Self {
            key: key.into(),
            cardinality: Cardinality::Many,
            related: Arc::clone(related),
            collection: None,
        }
    }

    /// Sets the collection type backing a many-relation.
    #[must_use]
    pub fn with_collection(mut self, collection: &Arc<CollectionType>) -> Self {
        self.collection = Some(Arc::clone(collection));
        self
    }

    /// Checks this relation's declaration against its owner type.
    ///
    /// Runs when the relation is first used by a set call. A relation may
    /// be declared in an unusable state; it only fails once exercised.
    pub(crate) fn validate(&self, type_name: &str) -> CoreResult<()> {
        if self.key.is_empty() || RESERVED_KEYS.contains(&self.key.as_str()) {
            return Err(ConfigError::reserved_relation_key(type_name, &self.key));
        }
        if let Some(collection) = &self.collection {
            let matches = Arc::ptr_eq(&collection.element, &self.related)
                || collection.element.name == self.related.name;
            if !matches {
                return Err(ConfigError::collection_element_mismatch(
                    &self.key,
                    &collection.name,
                    &self.related.name,
                    &collection.element.name,
                ));
            }
        }
        Ok(())
    }
}

/// A declared record type: a name, default attributes, and relations.
///
/// Types are immutable once built and shared behind `Arc`; every record
/// holds the type it was created from.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    defaults: Vec<(String, Value)>,
    relations: Vec<Relation>,
}

impl RecordType {
    /// Starts building a record type.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            defaults: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// The type's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default attribute values applied at construction.
    #[must_use]
    pub fn defaults(&self) -> &[(String, Value)] {
        &self.defaults
    }

    /// The declared relations, in declaration order.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Looks up the relation mounted at `key`.
    #[must_use]
    pub fn relation(&self, key: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.key == key)
    }

    /// Verifies that relation keys are unique.
    ///
    /// Runs at the head of every set call that touches a relation, so a
    /// broken declaration fails where it is used.
    pub(crate) fn check_relation_keys(&self) -> CoreResult<()> {
        for (index, relation) in self.relations.iter().enumerate() {
            if self.relations[..index].iter().any(|r| r.key == relation.key) {
                return Err(ConfigError::duplicate_relation_key(
                    &self.name,
                    &relation.key,
                ));
            }
        }
        Ok(())
    }
}

/// Builder for [`RecordType`].
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    defaults: Vec<(String, Value)>,
    relations: Vec<Relation>,
}

impl RecordTypeBuilder {
    /// Adds a default attribute value, applied when a construction payload
    /// omits the key.
    #[must_use]
    pub fn default_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.push((key.into(), value.into()));
        self
    }

    /// Declares a relation.
    #[must_use]
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Finishes the type.
    #[must_use]
    pub fn build(self) -> Arc<RecordType> {
        Arc::new(RecordType {
            name: self.name,
            defaults: self.defaults,
            relations: self.relations,
        })
    }
}

/// A declared collection type: a name and the element record type.
#[derive(Debug)]
pub struct CollectionType {
    name: String,
    element: Arc<RecordType>,
}

impl CollectionType {
    /// Creates a collection type for `element` records.
    #[must_use]
    pub fn new(name: impl Into<String>, element: &Arc<RecordType>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            element: Arc::clone(element),
        })
    }

    /// The collection type's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element record type.
    #[must_use]
    pub fn element(&self) -> &Arc<RecordType> {
        &self.element
    }
}
