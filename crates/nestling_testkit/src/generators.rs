//! Property-based test generators using proptest.
//!
//! Provides strategies for generating payloads that maintain the
//! invariants reconciliation relies on, such as distinct ids within a
//! batch.

use nestling_core::{Cid, Value};
use proptest::prelude::*;

/// Strategy for generating valid cids.
pub fn cid_strategy() -> impl Strategy<Value = Cid> {
    prop::array::uniform16(any::<u8>()).prop_map(Cid::from_bytes)
}

/// Strategy for generating attribute keys.
///
/// Never yields `id` or `cid`; identity entries are generated
/// deliberately, not at random.
pub fn attr_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}")
        .expect("Invalid regex")
        .prop_filter("identity keys are generated separately", |key| {
            key != "id" && key != "cid"
        })
}

/// Strategy for generating scalar attribute values.
///
/// No floats: reconciliation compares attributes by structural equality.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        prop::string::string_regex("[a-zA-Z0-9 ]{0,16}")
            .expect("Invalid regex")
            .prop_map(Value::Text),
    ]
}

/// Strategy for a child payload map carrying a fixed id.
pub fn child_payload_strategy(id: i64) -> impl Strategy<Value = Value> {
    (
        prop::string::string_regex("[a-zA-Z ]{1,16}").expect("Invalid regex"),
        any::<i32>(),
    )
        .prop_map(move |(title, value)| {
            Value::object([
                ("id", Value::Int(id)),
                ("title", Value::Text(title)),
                ("value", Value::Int(i64::from(value))),
            ])
        })
}

/// Strategy for a batch of child payloads with distinct ids `1..=len`.
pub fn child_batch_strategy(max_len: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        (
            prop::string::string_regex("[a-zA-Z ]{1,16}").expect("Invalid regex"),
            any::<i32>(),
        ),
        0..=max_len,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, (title, value))| {
                Value::object([
                    ("id", Value::Int(index as i64 + 1)),
                    ("title", Value::Text(title)),
                    ("value", Value::Int(i64::from(value))),
                ])
            })
            .collect()
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use nestling_core::Identity;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_keys_never_collide_with_identity(key in attr_key_strategy()) {
            prop_assert!(key != "id");
            prop_assert!(key != "cid");
        }

        #[test]
        fn batches_carry_distinct_ids(batch in child_batch_strategy(8)) {
            for (index, payload) in batch.iter().enumerate() {
                prop_assert_eq!(payload.get("id"), Some(&Value::Int(index as i64 + 1)));
            }
        }

        #[test]
        fn reconciling_any_batch_twice_is_stable(batch in child_batch_strategy(8)) {
            let parent = fixtures::empty_parent();
            parent.set("children", Value::Array(batch.clone())).unwrap();
            let children = parent.get_collection("children").unwrap();
            let before: Vec<_> = children.records();

            parent.set("children", Value::Array(batch.clone())).unwrap();

            // Same ids: same instances, same order, nothing dropped.
            prop_assert_eq!(children.len(), batch.len());
            for (index, member) in children.records().iter().enumerate() {
                prop_assert!(member.ptr_eq(&before[index]));
            }
        }

        #[test]
        fn every_member_is_reachable_by_its_id(batch in child_batch_strategy(8)) {
            let parent = fixtures::empty_parent();
            parent.set("children", Value::Array(batch.clone())).unwrap();
            let children = parent.get_collection("children").unwrap();

            for index in 0..batch.len() {
                let id = Identity::Id((index as i64 + 1).into());
                prop_assert!(children.get(&id).is_some());
            }
        }

        #[test]
        fn plain_rewrites_of_equal_scalars_are_noops(
            key in attr_key_strategy(),
            value in scalar_strategy(),
        ) {
            let rtype = nestling_core::RecordType::builder("Bare").build();
            let record =
                nestling_core::Record::new(&rtype, nestling_core::Attrs::new()).unwrap();

            record.set(key.clone(), value.clone()).unwrap();
            let changed = record.set(key, value).unwrap();

            prop_assert!(!changed);
        }

        #[test]
        fn serialization_round_trips_identity(payload in child_payload_strategy(7)) {
            let child = fixtures::child_type();
            let record = nestling_core::Record::new(&child, nestling_core::Attrs::from(payload)).unwrap();
            let rebuilt =
                nestling_core::Record::new(&child, nestling_core::Attrs::from(record.to_json())).unwrap();

            prop_assert_eq!(rebuilt.cid(), record.cid());
            prop_assert_eq!(rebuilt.to_json(), record.to_json());
        }
    }
}
