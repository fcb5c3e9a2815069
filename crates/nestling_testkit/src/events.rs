//! Helpers for asserting on change feeds.

use std::sync::mpsc::Receiver;

use nestling_core::{CollectionEvent, Record, RecordEvent};

/// Drains every event currently buffered on a receiver.
pub fn drain<E>(rx: &Receiver<E>) -> Vec<E> {
    rx.try_iter().collect()
}

/// The keys of per-key record events, in emission order.
pub fn changed_keys(events: &[RecordEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| event.key().map(str::to_string))
        .collect()
}

/// Number of record-level change events in a drained batch.
pub fn changed_count(events: &[RecordEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, RecordEvent::Changed { .. }))
        .count()
}

/// Splits collection events into (added, updated, removed) records.
pub fn split_collection_events(
    events: Vec<CollectionEvent>,
) -> (Vec<Record>, Vec<Record>, Vec<Record>) {
    let mut added = Vec::new();
    let mut updated = Vec::new();
    let mut removed = Vec::new();
    for event in events {
        match event {
            CollectionEvent::Added { record } => added.push(record),
            CollectionEvent::Updated { record } => updated.push(record),
            CollectionEvent::Removed { record } => removed.push(record),
        }
    }
    (added, updated, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use nestling_core::Value;

    #[test]
    fn drained_keys_follow_payload_order() {
        let parent = fixtures::empty_parent();
        let rx = parent.subscribe();

        parent
            .set_many(
                nestling_core::Attrs::new()
                    .with("name", "a")
                    .with("note", "b"),
            )
            .unwrap();

        let events = drain(&rx);
        assert_eq!(changed_keys(&events), vec!["name", "note"]);
        assert_eq!(changed_count(&events), 1);
    }

    #[test]
    fn collection_events_split_by_kind() {
        let parent = fixtures::scenarios::parent_with_children(2);
        let collection = parent.get_collection("children").unwrap();
        let rx = collection.subscribe();

        parent
            .set(
                "children",
                Value::Array(vec![
                    fixtures::child_payload(2, "kept and renamed"),
                    fixtures::child_payload(3, "new"),
                ]),
            )
            .unwrap();

        let (added, updated, removed) = split_collection_events(drain(&rx));
        assert_eq!(added.len(), 1);
        assert_eq!(updated.len(), 1);
        assert_eq!(removed.len(), 1);
        assert_eq!(added[0].get_value("id"), Some(Value::Int(3)));
        assert_eq!(removed[0].get_value("id"), Some(Value::Int(1)));
    }
}
