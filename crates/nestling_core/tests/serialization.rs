//! Integration tests for recursive serialization and deep cloning.

use std::sync::Arc;

use nestling_core::{Attrs, Record, RecordType, Relation, Value};
use serde_json::json;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn child_type() -> Arc<RecordType> {
    RecordType::builder("Child")
        .default_attr("title", "Child Model")
        .default_attr("value", 0i64)
        .build()
}

fn parent_type(child: &Arc<RecordType>) -> Arc<RecordType> {
    RecordType::builder("Parent")
        .relation(Relation::many("children", child))
        .relation(Relation::one("child", child))
        .build()
}

#[test]
fn single_child_round_trips_with_its_cid() {
    let child = child_type();
    let record = Record::new(
        &child,
        Attrs::from(v(json!({ "title": "Single", "value": 10 }))),
    )
    .unwrap();

    let json = record.to_json();
    assert_eq!(json.get("title"), Some(&Value::from("Single")));
    assert_eq!(json.get("value"), Some(&Value::Int(10)));
    assert_eq!(json.get("cid"), Some(&Value::from(record.cid().to_string())));

    // Rebuilding from the output restores the identity.
    let rebuilt = Record::new(&child, Attrs::from(json)).unwrap();
    assert_eq!(rebuilt.cid(), record.cid());
    assert!(!rebuilt.ptr_eq(&record));
    assert_eq!(rebuilt.get_value("title"), Some(Value::from("Single")));
    assert_eq!(rebuilt.get_value("value"), Some(Value::Int(10)));
}

#[test]
fn graph_to_json_survives_a_rebuild() {
    let child = child_type();
    let ptype = parent_type(&child);
    let parent = Record::new(
        &ptype,
        Attrs::from(v(json!({
            "name": "graph",
            "children": [
                { "id": 1, "title": "one" },
                { "title": "unsaved" }
            ],
            "child": { "id": 9, "title": "nested" }
        }))),
    )
    .unwrap();

    let snapshot = parent.to_json();
    let rebuilt = Record::new(&ptype, Attrs::from(snapshot.clone())).unwrap();

    assert_eq!(rebuilt.to_json(), snapshot);
}

#[test]
fn nested_output_carries_every_cid() {
    let child = child_type();
    let parent = Record::new(
        &parent_type(&child),
        Attrs::from(v(json!({
            "children": [ { "title": "a" } ],
            "child": { "title": "b" }
        }))),
    )
    .unwrap();

    let json = parent.to_json();
    let member = parent.get_collection("children").unwrap().at(0).unwrap();
    let nested = parent.get_record("child").unwrap();

    let children = json.get("children").and_then(Value::as_array).unwrap();
    assert_eq!(
        children[0].get("cid"),
        Some(&Value::from(member.cid().to_string()))
    );
    assert_eq!(
        json.get("child").and_then(|c| c.get("cid")),
        Some(&Value::from(nested.cid().to_string()))
    );
}

#[test]
fn cleared_one_relation_serializes_to_null() {
    let child = child_type();
    let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();

    parent.set("child", v(json!({ "title": "soon gone" }))).unwrap();
    parent.set("child", Value::Null).unwrap();

    assert_eq!(parent.to_json().get("child"), Some(&Value::Null));
}

#[test]
fn plain_arrays_pass_through_untouched() {
    let rtype = RecordType::builder("Bare").build();
    let record = Record::new(
        &rtype,
        Attrs::from(v(json!({ "tags": ["a", null, "b"] }))),
    )
    .unwrap();

    // No relation on "tags": the array is plain data, nulls included.
    assert_eq!(
        record.to_json().get("tags"),
        Some(&v(json!(["a", null, "b"])))
    );
}

#[test]
fn output_keys_are_canonically_ordered() {
    let rtype = RecordType::builder("Bare").build();
    let record = Record::new(
        &rtype,
        Attrs::new().with("zeta", 1i64).with("alpha", 2i64),
    )
    .unwrap();

    let json = record.to_json();
    let keys: Vec<&str> = match &json {
        Value::Map(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
        other => panic!("expected a map, got {other:?}"),
    };
    assert_eq!(keys, vec!["alpha", "cid", "zeta"]);
}

#[test]
fn deep_clone_is_disjoint_with_equal_cids() {
    let child = child_type();
    let parent = Record::new(
        &parent_type(&child),
        Attrs::from(v(json!({
            "children": [ { "id": 1, "title": "one" }, { "title": "two" } ],
            "child": { "title": "nested" }
        }))),
    )
    .unwrap();

    let clone = parent.deep_clone().unwrap();

    assert!(!clone.ptr_eq(&parent));
    assert_eq!(clone.cid(), parent.cid());
    assert_eq!(clone.to_json(), parent.to_json());

    let children = parent.get_collection("children").unwrap();
    let cloned_children = clone.get_collection("children").unwrap();
    assert!(!cloned_children.ptr_eq(&children));
    for index in 0..children.len() {
        let original = children.at(index).unwrap();
        let copied = cloned_children.at(index).unwrap();
        assert!(!copied.ptr_eq(&original));
        assert_eq!(copied.cid(), original.cid());
    }

    let nested = parent.get_record("child").unwrap();
    let cloned_nested = clone.get_record("child").unwrap();
    assert!(!cloned_nested.ptr_eq(&nested));
    assert_eq!(cloned_nested.cid(), nested.cid());
}

#[test]
fn mutating_a_deep_clone_leaves_the_original_alone() {
    let child = child_type();
    let parent = Record::new(
        &parent_type(&child),
        Attrs::from(v(json!({ "children": [ { "title": "one" } ] }))),
    )
    .unwrap();
    let clone = parent.deep_clone().unwrap();

    clone
        .get_collection("children")
        .unwrap()
        .at(0)
        .unwrap()
        .set("title", "changed in clone")
        .unwrap();

    assert_eq!(
        parent
            .get_collection("children")
            .unwrap()
            .at(0)
            .unwrap()
            .get_value("title"),
        Some(Value::from("one"))
    );
}
