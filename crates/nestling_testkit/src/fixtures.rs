//! Standard record types and pre-built graphs.
//!
//! Provides the child/parent family used across the test suites, plus
//! scenario builders for populated graphs.

use std::sync::Arc;

use nestling_core::{Attrs, CollectionType, Record, RecordType, Relation, Value};

/// The child record type used across the test suite.
///
/// Defaults mirror a freshly created, never-saved model: a placeholder
/// title and a zero value.
pub fn child_type() -> Arc<RecordType> {
    RecordType::builder("Child")
        .default_attr("title", "Child Model")
        .default_attr("value", 0i64)
        .build()
}

/// A declared collection type over [`child_type`].
pub fn child_list_type(child: &Arc<RecordType>) -> Arc<CollectionType> {
    CollectionType::new("ChildList", child)
}

/// A parent type with a many-relation `children` backed by a declared
/// collection type, and a one-relation `child`.
pub fn parent_type(child: &Arc<RecordType>) -> Arc<RecordType> {
    let list = child_list_type(child);
    RecordType::builder("Parent")
        .relation(Relation::many("children", child).with_collection(&list))
        .relation(Relation::one("child", child))
        .build()
}

/// Builds the standard (child, parent) type pair.
pub fn family() -> (Arc<RecordType>, Arc<RecordType>) {
    let child = child_type();
    let parent = parent_type(&child);
    (child, parent)
}

/// An empty parent record of the standard family.
pub fn empty_parent() -> Record {
    let (_, parent) = family();
    Record::new(&parent, Attrs::new()).expect("standard family is well-declared")
}

/// A child payload map carrying an id and a title.
pub fn child_payload(id: i64, title: &str) -> Value {
    Value::object([
        ("id", Value::Int(id)),
        ("title", Value::Text(title.to_string())),
    ])
}

/// Pre-populated graph builders.
pub mod scenarios {
    use super::*;

    /// A parent whose `children` hold `count` members with ids
    /// `1..=count`.
    pub fn parent_with_children(count: usize) -> Record {
        let parent = empty_parent();
        let entries: Vec<Value> = (1..=count as i64)
            .map(|id| child_payload(id, &format!("child {id}")))
            .collect();
        parent
            .set("children", Value::Array(entries))
            .expect("standard family is well-declared");
        parent
    }

    /// A three-level graph: an account holding projects, each holding
    /// tasks.
    pub fn deep_graph(projects: usize, tasks_per_project: usize) -> Record {
        let task = RecordType::builder("Task").default_attr("done", false).build();
        let project = RecordType::builder("Project")
            .relation(Relation::many("tasks", &task))
            .build();
        let account = RecordType::builder("Account")
            .relation(Relation::many("projects", &project))
            .build();

        let projects: Vec<Value> = (1..=projects as i64)
            .map(|p| {
                let tasks: Vec<Value> = (1..=tasks_per_project as i64)
                    .map(|t| Value::object([("title", Value::Text(format!("task {p}.{t}")))]))
                    .collect();
                Value::object([
                    ("id", Value::Int(p)),
                    ("title", Value::Text(format!("project {p}"))),
                    ("tasks", Value::Array(tasks)),
                ])
            })
            .collect();

        let payload = Value::object([("projects", Value::Array(projects))]);
        Record::new(&account, Attrs::from(payload)).expect("graph types are well-declared")
    }
}
