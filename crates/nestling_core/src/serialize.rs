//! Recursive serialization of record graphs to plain values.

use nestling_value::Value;

use crate::collection::Collection;
use crate::record::Record;
use crate::slot::Slot;

/// Serializes a record and everything nested under it.
///
/// The output always carries the record's `cid`, overriding any stored
/// attribute of that name, so a later reconciliation of the payload can
/// find the instance it came from even before it has an id.
pub(crate) fn record_to_json(record: &Record) -> Value {
    let attrs = record.attributes();
    let mut pairs: Vec<(String, Value)> = Vec::with_capacity(attrs.len() + 1);
    for (key, slot) in attrs {
        pairs.push((key, slot_to_json(&slot)));
    }
    pairs.push(("cid".to_string(), Value::Text(record.cid().to_string())));
    Value::object(pairs)
}

/// Serializes collection members to an array, dropping entries that
/// serialize to nothing.
pub(crate) fn collection_to_json(collection: &Collection) -> Value {
    let items = collection
        .records()
        .iter()
        .map(record_to_json)
        .filter(|value| !is_blank(value))
        .collect();
    Value::Array(items)
}

fn slot_to_json(slot: &Slot) -> Value {
    match slot {
        Slot::Value(value) => value.clone(),
        Slot::Record(record) => record_to_json(record),
        Slot::Collection(collection) => collection_to_json(collection),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Map(entries) => entries.is_empty(),
        _ => false,
    }
}
