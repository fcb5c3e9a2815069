//! Ordered record collections.

use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use nestling_value::Value;

use crate::change_feed::{ChangeFeed, CollectionEvent};
use crate::error::CoreResult;
use crate::identity::Identity;
use crate::options::SetOptions;
use crate::record::Record;
use crate::schema::{CollectionType, RecordType};
use crate::serialize;
use crate::slot::{Attrs, Slot};

struct CollectionShared {
    /// Declared collection type, when the relation named one.
    ctype: Option<Arc<CollectionType>>,
    /// Record type of the members.
    element: Arc<RecordType>,
    /// Members in order.
    members: RwLock<Vec<Record>>,
    /// Change notifications.
    feed: ChangeFeed<CollectionEvent>,
}

/// An ordered, identity-deduplicated collection of records.
///
/// Like [`Record`], a `Collection` is a cheap-to-clone handle sharing its
/// state across clones, with equality comparing handle identity.
///
/// Reconciliation ([`Collection::set`]) matches incoming entries to
/// current members by identity and merges instead of replacing, so
/// repeated payload deliveries keep stable member instances. No two
/// members ever share an identity.
#[derive(Clone)]
pub struct Collection {
    shared: Arc<CollectionShared>,
}

impl Collection {
    /// Creates an empty collection of a declared type.
    #[must_use]
    pub fn new(ctype: &Arc<CollectionType>) -> Collection {
        Collection {
            shared: Arc::new(CollectionShared {
                ctype: Some(Arc::clone(ctype)),
                element: Arc::clone(ctype.element()),
                members: RwLock::new(Vec::new()),
                feed: ChangeFeed::new(),
            }),
        }
    }

    /// Creates an empty generic collection bound to an element type.
    #[must_use]
    pub fn of(element: &Arc<RecordType>) -> Collection {
        Collection {
            shared: Arc::new(CollectionShared {
                ctype: None,
                element: Arc::clone(element),
                members: RwLock::new(Vec::new()),
                feed: ChangeFeed::new(),
            }),
        }
    }

    /// The declared collection type, when there is one.
    #[must_use]
    pub fn collection_type(&self) -> Option<Arc<CollectionType>> {
        self.shared.ctype.clone()
    }

    /// The record type of the members.
    #[must_use]
    pub fn element_type(&self) -> Arc<RecordType> {
        Arc::clone(&self.shared.element)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.members.read().len()
    }

    /// Whether the collection has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.members.read().is_empty()
    }

    /// The member at `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Record> {
        self.shared.members.read().get(index).cloned()
    }

    /// Snapshot of the members in order.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.shared.members.read().clone()
    }

    /// Finds the member with the given identity.
    #[must_use]
    pub fn get(&self, identity: &Identity) -> Option<Record> {
        self.shared
            .members
            .read()
            .iter()
            .find(|record| record.identity() == *identity)
            .cloned()
    }

    /// Whether this exact record instance is a member.
    #[must_use]
    pub fn contains(&self, record: &Record) -> bool {
        self.shared.members.read().iter().any(|m| m.ptr_eq(record))
    }

    /// Position of this exact record instance, if it is a member.
    #[must_use]
    pub fn index_of(&self, record: &Record) -> Option<usize> {
        self.shared.members.read().iter().position(|m| m.ptr_eq(record))
    }

    /// Reconciles the collection against incoming entries.
    ///
    /// Each entry is either a payload map or a record instance:
    /// - An entry matching a current member by identity (instance first,
    ///   then id, then cid) merges into that member in place.
    /// - An unmatched payload creates a fresh member of the element type;
    ///   an unmatched instance is adopted by reference.
    /// - Entries of any other shape are skipped.
    ///
    /// Duplicate identities within the input collapse onto one member.
    /// When `opts.remove` is set (the default), members absent from the
    /// input are removed and the final order is the input order; without
    /// it, current members keep their positions and new ones append.
    ///
    /// Subscribers receive `Added` events in membership order, then
    /// `Updated` for merged members that changed, then `Removed`; all
    /// suppressed by `opts.silent`, which also silences member merges.
    ///
    /// Returns whether membership, order, or any member changed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) when building or
    /// merging a member trips a misdeclared relation on the element
    /// type. Entries already applied stay applied.
    pub fn set(&self, entries: Vec<Slot>, opts: SetOptions) -> CoreResult<bool> {
        let existing = self.records();
        let mut resolved: Vec<Record> = Vec::new();
        let mut updated: Vec<Record> = Vec::new();

        for entry in entries {
            let record = match entry {
                Slot::Record(incoming) => {
                    match find_match(&existing, &resolved, &incoming.identity()) {
                        Some(member) => {
                            if !member.ptr_eq(&incoming)
                                && member.set_many_with(Attrs::from(incoming.attributes()), opts)?
                            {
                                updated.push(member.clone());
                            }
                            member
                        }
                        None => incoming,
                    }
                }
                Slot::Value(payload @ Value::Map(_)) if !payload.is_empty() => {
                    let identity = Identity::of_payload(&payload);
                    let matched = identity
                        .as_ref()
                        .and_then(|id| find_match(&existing, &resolved, id));
                    match matched {
                        Some(member) => {
                            if member.set_many_with(Attrs::from(payload), opts)? {
                                updated.push(member.clone());
                            }
                            member
                        }
                        None => Record::new(&self.shared.element, Attrs::from(payload))?,
                    }
                }
                other => {
                    trace!(entry = ?other, "skipped malformed collection entry");
                    continue;
                }
            };

            if !resolved.iter().any(|r| r.ptr_eq(&record)) {
                resolved.push(record);
            }
        }

        let final_members: Vec<Record> = if opts.remove {
            resolved
        } else {
            let mut kept = existing.clone();
            for record in resolved {
                if !kept.iter().any(|m| m.ptr_eq(&record)) {
                    kept.push(record);
                }
            }
            kept
        };

        let added: Vec<Record> = final_members
            .iter()
            .filter(|r| !existing.iter().any(|m| m.ptr_eq(r)))
            .cloned()
            .collect();
        let removed: Vec<Record> = existing
            .iter()
            .filter(|m| !final_members.iter().any(|r| r.ptr_eq(m)))
            .cloned()
            .collect();
        let order_changed = existing.len() != final_members.len()
            || existing
                .iter()
                .zip(final_members.iter())
                .any(|(a, b)| !a.ptr_eq(b));

        *self.shared.members.write() = final_members;

        let changed = !added.is_empty() || !removed.is_empty() || !updated.is_empty() || order_changed;
        if changed {
            debug!(
                collection = self.type_name(),
                added = added.len(),
                updated = updated.len(),
                removed = removed.len(),
                "reconciled collection"
            );
        }

        if changed && !opts.silent {
            let mut events = Vec::new();
            for record in added {
                events.push(CollectionEvent::Added { record });
            }
            for record in updated {
                events.push(CollectionEvent::Updated { record });
            }
            for record in removed {
                events.push(CollectionEvent::Removed { record });
            }
            self.shared.feed.emit_batch(events);
        }
        Ok(changed)
    }

    /// Adds entries without removing anyone: [`Collection::set`] with
    /// removal disabled.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::ConfigError) under the same
    /// conditions as [`Collection::set`].
    pub fn add(&self, entries: Vec<Slot>, opts: SetOptions) -> CoreResult<bool> {
        self.set(entries, opts.remove(false))
    }

    /// Removes this exact record instance. Returns whether it was a
    /// member.
    pub fn remove(&self, record: &Record) -> bool {
        self.remove_with(record, SetOptions::default())
    }

    /// Removes this exact record instance with options.
    pub fn remove_with(&self, record: &Record, opts: SetOptions) -> bool {
        let removed = {
            let mut members = self.shared.members.write();
            let before = members.len();
            members.retain(|m| !m.ptr_eq(record));
            members.len() != before
        };
        if removed && !opts.silent {
            self.shared.feed.emit(CollectionEvent::Removed {
                record: record.clone(),
            });
        }
        removed
    }

    /// Subscribes to this collection's change events.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<CollectionEvent> {
        self.shared.feed.subscribe()
    }

    /// Serializes the members to a plain array, dropping null or empty
    /// entries.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serialize::collection_to_json(self)
    }

    /// Whether two handles share the same underlying collection.
    #[must_use]
    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn type_name(&self) -> &str {
        self.shared
            .ctype
            .as_ref()
            .map_or("Collection", |ctype| ctype.name())
    }
}

/// Searches current members first, then entries already resolved in this
/// call, so duplicate identities within one input collapse.
fn find_match(existing: &[Record], resolved: &[Record], identity: &Identity) -> Option<Record> {
    existing
        .iter()
        .chain(resolved.iter())
        .find(|record| record.identity() == *identity)
        .cloned()
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Collection {}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("type", &self.type_name())
            .field("element", &self.shared.element.name())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
