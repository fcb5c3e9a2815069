//! Error types for nestling core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, ConfigError>;

/// Errors raised by misconfigured relation schemas.
///
/// These surface when a relation is first exercised by a set call, not
/// when the schema is built, so a record type can be assembled in steps.
/// Malformed *data* never produces an error; bad payload entries are
/// skipped or treated as empty.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two relations on the same record type share a key.
    #[error("duplicate relation key: {key:?} declared more than once on {type_name}")]
    DuplicateRelationKey {
        /// The record type declaring the relations.
        type_name: String,
        /// The key declared twice.
        key: String,
    },

    /// A relation key shadows an identity attribute.
    #[error("reserved relation key: {key:?} cannot be used as a relation on {type_name}")]
    ReservedRelationKey {
        /// The record type declaring the relation.
        type_name: String,
        /// The reserved key.
        key: String,
    },

    /// A many-relation's collection type holds a different element type
    /// than the relation's related type.
    #[error(
        "collection type {collection} holds {actual} elements, \
         but relation {key:?} relates to {expected}"
    )]
    CollectionElementMismatch {
        /// The key of the offending relation.
        key: String,
        /// The declared collection type.
        collection: String,
        /// The relation's related type.
        expected: String,
        /// The collection type's element type.
        actual: String,
    },
}

impl ConfigError {
    /// Creates a duplicate relation key error.
    pub fn duplicate_relation_key(type_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DuplicateRelationKey {
            type_name: type_name.into(),
            key: key.into(),
        }
    }

    /// Creates a reserved relation key error.
    pub fn reserved_relation_key(type_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ReservedRelationKey {
            type_name: type_name.into(),
            key: key.into(),
        }
    }

    /// Creates a collection element mismatch error.
    pub fn collection_element_mismatch(
        key: impl Into<String>,
        collection: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::CollectionElementMismatch {
            key: key.into(),
            collection: collection.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offending_key() {
        let err = ConfigError::duplicate_relation_key("Parent", "children");
        assert!(err.to_string().contains("children"));
        assert!(err.to_string().contains("Parent"));

        let err = ConfigError::reserved_relation_key("Parent", "id");
        assert!(err.to_string().contains("reserved"));

        let err = ConfigError::collection_element_mismatch("children", "TagList", "Child", "Tag");
        assert!(err.to_string().contains("TagList"));
        assert!(err.to_string().contains("Child"));
        assert!(err.to_string().contains("Tag"));
    }
}
