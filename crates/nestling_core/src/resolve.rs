//! Relation resolution: routes writes on relation keys into nested
//! records and collections.

use tracing::{debug, trace};

use nestling_value::Value;

use crate::collection::Collection;
use crate::error::CoreResult;
use crate::identity::Identity;
use crate::options::SetOptions;
use crate::record::Record;
use crate::schema::{Cardinality, Relation};
use crate::slot::{Attrs, Slot};

/// Shapes an incoming relation value can take.
enum RelationInput {
    /// An array of entries for a many-relation.
    Sequence(Vec<Value>),
    /// An existing record instance.
    Instance(Record),
    /// An existing collection instance.
    Members(Collection),
    /// A non-empty payload map.
    Payload(Value),
    /// Null, an empty map, or a scalar with no relational meaning.
    Blank,
}

fn classify(value: Slot) -> RelationInput {
    match value {
        Slot::Record(record) => RelationInput::Instance(record),
        Slot::Collection(collection) => RelationInput::Members(collection),
        Slot::Value(Value::Array(items)) => RelationInput::Sequence(items),
        Slot::Value(payload @ Value::Map(_)) if !payload.is_empty() => {
            RelationInput::Payload(payload)
        }
        Slot::Value(_) => RelationInput::Blank,
    }
}

/// Applies an incoming value to a relation key on `record`.
///
/// Returns whether the write counts as a change for the record's event
/// accounting. Emits the keyed event itself when it does; the caller
/// aggregates into the record-level `Changed` event.
pub(crate) fn set_relation(
    record: &Record,
    relation: &Relation,
    value: Slot,
    opts: SetOptions,
) -> CoreResult<bool> {
    let changed = match relation.cardinality {
        Cardinality::Many => set_many(record, relation, value, opts)?,
        Cardinality::One => set_one(record, relation, value, opts)?,
    };
    if changed && !opts.silent {
        record.emit_key_event(&relation.key, record.get(&relation.key));
    }
    Ok(changed)
}

/// Routes a write into the relation's backing collection, creating it on
/// first use.
///
/// Arrays and collection instances reconcile the full membership; a lone
/// payload or record instance is additive. Blank input leaves the
/// collection untouched and does not count as a change; everything else
/// does, because the write reached the backing collection even when the
/// membership came out the same.
fn set_many(record: &Record, relation: &Relation, value: Slot, opts: SetOptions) -> CoreResult<bool> {
    let collection = backing_collection(record, relation);
    match classify(value) {
        RelationInput::Sequence(items) => {
            debug!(key = %relation.key, entries = items.len(), "reconciling many-relation");
            let entries = items.into_iter().map(Slot::Value).collect();
            collection.set(entries, opts)?;
            Ok(true)
        }
        RelationInput::Members(other) => {
            debug!(key = %relation.key, entries = other.len(), "reconciling many-relation from collection");
            let entries = other.records().into_iter().map(Slot::Record).collect();
            collection.set(entries, opts)?;
            Ok(true)
        }
        RelationInput::Payload(payload) => {
            debug!(key = %relation.key, "additive write to many-relation");
            collection.add(vec![Slot::Value(payload)], opts)?;
            Ok(true)
        }
        RelationInput::Instance(incoming) => {
            debug!(key = %relation.key, cid = %incoming.cid(), "adding instance to many-relation");
            collection.add(vec![Slot::Record(incoming)], opts)?;
            Ok(true)
        }
        RelationInput::Blank => {
            trace!(key = %relation.key, "blank many-relation input ignored");
            Ok(false)
        }
    }
}

/// Applies a write to a one-relation slot.
///
/// When the incoming value carries the same identity as the current
/// nested record, it merges in place and the nested instance survives.
/// Anything else replaces the slot wholesale: a payload builds a fresh
/// record, an instance is adopted by reference, and any other shape
/// clears the slot to null. Replacement always counts as a change.
fn set_one(record: &Record, relation: &Relation, value: Slot, opts: SetOptions) -> CoreResult<bool> {
    if let Some(current) = record.get_record(&relation.key) {
        match &value {
            Slot::Value(payload @ Value::Map(_)) if !payload.is_empty() => {
                if Identity::of_payload(payload) == Some(current.identity()) {
                    trace!(key = %relation.key, cid = %current.cid(), "merging payload into one-relation");
                    return current.set_many_with(Attrs::from(payload.clone()), opts);
                }
            }
            Slot::Record(incoming) => {
                if incoming.identity() == current.identity() {
                    trace!(key = %relation.key, cid = %current.cid(), "merging instance into one-relation");
                    return current.set_many_with(Attrs::from(incoming.attributes()), opts);
                }
            }
            _ => {}
        }
    }

    let replacement = match classify(value) {
        RelationInput::Instance(incoming) => Some(incoming),
        RelationInput::Payload(payload) => {
            Some(Record::new(&relation.related, Attrs::from(payload))?)
        }
        RelationInput::Sequence(_) | RelationInput::Members(_) | RelationInput::Blank => None,
    };

    debug!(
        key = %relation.key,
        cleared = replacement.is_none(),
        "replacing one-relation slot"
    );
    let slot = replacement.map_or(Slot::Value(Value::Null), Slot::Record);
    record.write_slot_raw(&relation.key, slot);
    Ok(true)
}

/// Fetches the relation's backing collection, creating and storing it on
/// first use. The raw store bypasses routing so the factory cannot
/// recurse into itself.
fn backing_collection(record: &Record, relation: &Relation) -> Collection {
    if let Some(existing) = record.get_collection(&relation.key) {
        return existing;
    }
    let collection = match &relation.collection {
        Some(ctype) => Collection::new(ctype),
        None => Collection::of(&relation.related),
    };
    debug!(key = %relation.key, element = relation.related.name(), "created backing collection");
    record.write_slot_raw(&relation.key, Slot::Collection(collection.clone()));
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_feed::RecordEvent;
    use crate::schema::{CollectionType, RecordType};
    use std::sync::Arc;

    fn child_type() -> Arc<RecordType> {
        RecordType::builder("Child")
            .default_attr("title", "Child Model")
            .build()
    }

    fn parent_type(child: &Arc<RecordType>) -> Arc<RecordType> {
        RecordType::builder("Parent")
            .relation(Relation::many("children", child))
            .relation(Relation::one("favorite", child))
            .build()
    }

    #[test]
    fn many_relation_creates_backing_collection_once() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();

        parent
            .set("children", Value::Array(vec![Value::object([("title", Value::from("a"))])]))
            .unwrap();
        let first = parent.get_collection("children").unwrap();

        parent
            .set("children", Value::Array(vec![Value::object([("title", Value::from("b"))])]))
            .unwrap();
        let second = parent.get_collection("children").unwrap();

        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn declared_collection_type_is_used() {
        let child = child_type();
        let ctype = CollectionType::new("Children", &child);
        let parent = RecordType::builder("Parent")
            .relation(Relation::many("children", &child).with_collection(&ctype))
            .build();
        let record = Record::new(&parent, Attrs::new()).unwrap();

        record.set("children", Value::Array(Vec::new())).unwrap();

        let collection = record.get_collection("children").unwrap();
        assert_eq!(collection.collection_type().unwrap().name(), "Children");
    }

    #[test]
    fn lone_payload_is_additive() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();

        parent
            .set("children", Value::object([("title", Value::from("a"))]))
            .unwrap();
        parent
            .set("children", Value::object([("title", Value::from("b"))]))
            .unwrap();

        assert_eq!(parent.get_collection("children").unwrap().len(), 2);
    }

    #[test]
    fn one_relation_merges_on_matching_id() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();

        parent
            .set(
                "favorite",
                Value::object([("id", Value::Int(4)), ("title", Value::from("before"))]),
            )
            .unwrap();
        let nested = parent.get_record("favorite").unwrap();

        parent
            .set(
                "favorite",
                Value::object([("id", Value::Int(4)), ("title", Value::from("after"))]),
            )
            .unwrap();

        assert!(parent.get_record("favorite").unwrap().ptr_eq(&nested));
        assert_eq!(nested.get_value("title"), Some(Value::from("after")));
    }

    #[test]
    fn one_relation_replaces_on_different_id() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();

        parent
            .set("favorite", Value::object([("id", Value::Int(1))]))
            .unwrap();
        let before = parent.get_record("favorite").unwrap();

        parent
            .set("favorite", Value::object([("id", Value::Int(2))]))
            .unwrap();
        let after = parent.get_record("favorite").unwrap();

        assert!(!before.ptr_eq(&after));
    }

    #[test]
    fn one_relation_adopts_instances() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();
        let record = Record::new(&child, Attrs::new().with("title", "mine")).unwrap();

        parent.set("favorite", Slot::Record(record.clone())).unwrap();

        assert!(parent.get_record("favorite").unwrap().ptr_eq(&record));
    }

    #[test]
    fn null_clears_a_one_relation() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();
        parent
            .set("favorite", Value::object([("title", Value::from("a"))]))
            .unwrap();

        let changed = parent.set("favorite", Value::Null).unwrap();

        assert!(changed);
        assert!(parent.get_record("favorite").is_none());
        assert_eq!(parent.get("favorite"), Some(Slot::Value(Value::Null)));
    }

    #[test]
    fn blank_many_input_is_not_a_change() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();
        parent.set("children", Value::Array(Vec::new())).unwrap();
        let rx = parent.subscribe();

        parent.set("children", Value::Null).unwrap();

        assert_eq!(rx.try_iter().count(), 0);
        assert!(parent.get_collection("children").is_some());
    }

    #[test]
    fn relation_writes_emit_keyed_events() {
        let child = child_type();
        let parent = Record::new(&parent_type(&child), Attrs::new()).unwrap();
        let rx = parent.subscribe();

        parent
            .set("children", Value::Array(vec![Value::object([("title", Value::from("a"))])]))
            .unwrap();

        let events: Vec<RecordEvent> = rx.try_iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, RecordEvent::KeyChanged { key, .. } if key == "children")));
        assert!(events.iter().any(|e| matches!(e, RecordEvent::Changed { .. })));
    }
}
