//! Shared record handles.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use nestling_value::Value;

use crate::change_feed::{ChangeFeed, RecordEvent};
use crate::cid::Cid;
use crate::collection::Collection;
use crate::error::CoreResult;
use crate::identity::{IdValue, Identity};
use crate::options::SetOptions;
use crate::resolve;
use crate::schema::RecordType;
use crate::serialize;
use crate::slot::{Attrs, Slot};

struct RecordShared {
    /// Immutable client-side identity.
    cid: Cid,
    /// The type this record was created from.
    rtype: Arc<RecordType>,
    /// Attribute slots, keyed by attribute name.
    attributes: RwLock<BTreeMap<String, Slot>>,
    /// Change notifications.
    feed: ChangeFeed<RecordEvent>,
}

/// A record in a nested graph.
///
/// `Record` is a cheap-to-clone handle; clones share the same underlying
/// state, and equality compares handle identity, not attribute content.
/// Records carry their [`RecordType`], which routes set calls against a
/// declared relation key into nested records and collections instead of
/// storing the raw payload.
///
/// # Usage
///
/// ```rust,ignore
/// let child = RecordType::builder("Child")
///     .default_attr("title", "Child Model")
///     .build();
/// let parent_type = RecordType::builder("Parent")
///     .relation(Relation::many("children", &child))
///     .build();
///
/// let parent = Record::new(&parent_type, payload)?;
/// let children = parent.get_collection("children").unwrap();
/// ```
#[derive(Clone)]
pub struct Record {
    shared: Arc<RecordShared>,
}

impl Record {
    /// Creates a record of `rtype` from a construction payload.
    ///
    /// Type defaults fill in any key the payload omits, and the whole
    /// merged payload runs through the set pipeline, so relation keys
    /// build their nested instances immediately. A `cid` entry in the
    /// payload overrides the generated cid instead of being stored; this
    /// is what lets serialized records reconstruct with their identity
    /// intact.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when a relation
    /// touched by the payload is misdeclared. No record is produced in
    /// that case.
    pub fn new(rtype: &Arc<RecordType>, attrs: impl Into<Attrs>) -> CoreResult<Record> {
        let mut entries = attrs.into().into_entries();

        let mut cid = Cid::new();
        entries.retain(|(key, slot)| {
            if key == "cid" {
                if let Slot::Value(Value::Text(text)) = slot {
                    if let Some(parsed) = Cid::parse(text) {
                        cid = parsed;
                    }
                }
                return false;
            }
            true
        });

        let mut merged: Vec<(String, Slot)> = rtype
            .defaults()
            .iter()
            .filter(|(key, _)| !entries.iter().any(|(entry_key, _)| entry_key == key))
            .map(|(key, value)| (key.clone(), Slot::Value(value.clone())))
            .collect();
        merged.extend(entries);

        let record = Record {
            shared: Arc::new(RecordShared {
                cid,
                rtype: Arc::clone(rtype),
                attributes: RwLock::new(BTreeMap::new()),
                feed: ChangeFeed::new(),
            }),
        };
        record.set_many_with(Attrs::from(merged), SetOptions::default())?;
        Ok(record)
    }

    /// The record's client-side identity.
    #[must_use]
    pub fn cid(&self) -> Cid {
        self.shared.cid
    }

    /// The type this record was created from.
    #[must_use]
    pub fn record_type(&self) -> Arc<RecordType> {
        Arc::clone(&self.shared.rtype)
    }

    /// The server-assigned id, when the record has been persisted.
    #[must_use]
    pub fn id(&self) -> Option<IdValue> {
        self.shared
            .attributes
            .read()
            .get("id")
            .and_then(Slot::as_value)
            .and_then(IdValue::from_value)
    }

    /// Whether the record has never been persisted.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// The identity used to match this record during reconciliation:
    /// the id when persisted, the cid otherwise.
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.id().map_or(Identity::Cid(self.cid()), Identity::Id)
    }

    /// Returns the slot at `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Slot> {
        self.shared.attributes.read().get(key).cloned()
    }

    /// Returns the plain value at `key`, if the slot holds one.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<Value> {
        match self.get(key) {
            Some(Slot::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested record at `key`, if the slot holds one.
    #[must_use]
    pub fn get_record(&self, key: &str) -> Option<Record> {
        match self.get(key) {
            Some(Slot::Record(record)) => Some(record),
            _ => None,
        }
    }

    /// Returns the nested collection at `key`, if the slot holds one.
    #[must_use]
    pub fn get_collection(&self, key: &str) -> Option<Collection> {
        match self.get(key) {
            Some(Slot::Collection(collection)) => Some(collection),
            _ => None,
        }
    }

    /// Whether an attribute is present at `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.shared.attributes.read().contains_key(key)
    }

    /// Snapshot of all attributes in key order.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, Slot)> {
        self.shared
            .attributes
            .read()
            .iter()
            .map(|(key, slot)| (key.clone(), slot.clone()))
            .collect()
    }

    /// Sets a single attribute. See [`Record::set_many_with`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when `key` names a
    /// misdeclared relation.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Slot>) -> CoreResult<bool> {
        self.set_with(key, value, SetOptions::default())
    }

    /// Sets a single attribute with options.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when `key` names a
    /// misdeclared relation.
    pub fn set_with(
        &self,
        key: impl Into<String>,
        value: impl Into<Slot>,
        opts: SetOptions,
    ) -> CoreResult<bool> {
        self.set_many_with(Attrs::new().with(key, value), opts)
    }

    /// Sets a payload of attributes. See [`Record::set_many_with`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when the payload
    /// touches a misdeclared relation.
    pub fn set_many(&self, attrs: impl Into<Attrs>) -> CoreResult<bool> {
        self.set_many_with(attrs, SetOptions::default())
    }

    /// Sets a payload of attributes with options.
    ///
    /// Entries are processed in payload order. A key declared as a
    /// relation routes into the relation resolver, which builds, merges,
    /// or reconciles nested instances; any other key is written as a
    /// plain attribute, skipping the write when the value is unchanged.
    ///
    /// Per-key change events fire in payload order as entries are
    /// applied, followed by at most one record-level change event when
    /// anything changed. `opts.silent` suppresses all of them.
    ///
    /// Returns whether any entry changed the record.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when an entry
    /// touches a misdeclared relation. Entries already applied stay
    /// applied; the rest of the payload is abandoned.
    pub fn set_many_with(&self, attrs: impl Into<Attrs>, opts: SetOptions) -> CoreResult<bool> {
        let entries = attrs.into().into_entries();
        if entries.is_empty() {
            return Ok(false);
        }

        let rtype = Arc::clone(&self.shared.rtype);
        let mut keys_checked = false;
        let mut any_changed = false;

        for (key, value) in entries {
            match rtype.relation(&key) {
                Some(relation) => {
                    if !keys_checked {
                        rtype.check_relation_keys()?;
                        keys_checked = true;
                    }
                    relation.validate(rtype.name())?;
                    if resolve::set_relation(self, relation, value, opts)? {
                        any_changed = true;
                    }
                }
                None => {
                    if self.write_plain(&key, value, opts) {
                        any_changed = true;
                    }
                }
            }
        }

        if any_changed && !opts.silent {
            self.shared.feed.emit(RecordEvent::changed(self.cid()));
        }
        Ok(any_changed)
    }

    /// Removes the attribute at `key`. Returns whether it was present.
    pub fn unset(&self, key: &str) -> bool {
        self.unset_with(key, SetOptions::default())
    }

    /// Removes the attribute at `key` with options.
    pub fn unset_with(&self, key: &str, opts: SetOptions) -> bool {
        let removed = self.shared.attributes.write().remove(key).is_some();
        if removed && !opts.silent {
            self.shared
                .feed
                .emit(RecordEvent::key_changed(self.cid(), key, None));
            self.shared.feed.emit(RecordEvent::changed(self.cid()));
        }
        removed
    }

    /// Subscribes to this record's change events.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<RecordEvent> {
        self.shared.feed.subscribe()
    }

    /// Serializes the record and everything nested under it to plain
    /// data. The output always carries the record's `cid`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serialize::record_to_json(self)
    }

    /// Rebuilds an identical but fully disjoint copy of this record.
    ///
    /// The clone is constructed from [`Record::to_json`] output, so it
    /// shares no instances with the original at any nesting level while
    /// keeping every cid.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when the type's
    /// relations are misdeclared.
    pub fn deep_clone(&self) -> CoreResult<Record> {
        Record::new(&self.shared.rtype, Attrs::from(self.to_json()))
    }

    /// Whether two handles share the same underlying record.
    #[must_use]
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Writes a plain attribute, returning whether it changed.
    fn write_plain(&self, key: &str, value: Slot, opts: SetOptions) -> bool {
        let changed = {
            let mut attributes = self.shared.attributes.write();
            if attributes.get(key) == Some(&value) {
                false
            } else {
                attributes.insert(key.to_string(), value.clone());
                true
            }
        };
        if changed {
            trace!(cid = %self.cid(), key, "attribute written");
            if !opts.silent {
                self.shared
                    .feed
                    .emit(RecordEvent::key_changed(self.cid(), key, Some(value)));
            }
        }
        changed
    }

    /// Writes a slot without routing, comparison, or events.
    ///
    /// The collection factory stores a freshly built backing collection
    /// through this path; routing it through the set pipeline would
    /// re-enter the resolver for the same key.
    pub(crate) fn write_slot_raw(&self, key: &str, value: Slot) {
        self.shared
            .attributes
            .write()
            .insert(key.to_string(), value);
    }

    /// Emits a per-key change event on this record's feed.
    pub(crate) fn emit_key_event(&self, key: &str, value: Option<Slot>) {
        self.shared
            .feed
            .emit(RecordEvent::key_changed(self.cid(), key, value));
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type", &self.shared.rtype.name())
            .field("cid", &self.shared.cid)
            .finish_non_exhaustive()
    }
}
