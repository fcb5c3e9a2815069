//! Attribute slots and set-call payloads.

use nestling_value::Value;

use crate::collection::Collection;
use crate::record::Record;

/// A value held at an attribute key.
///
/// Attributes store either plain data, a nested record, or a nested
/// collection. The same type describes incoming set values, since
/// anything storable can also be assigned.
///
/// Equality is structural for plain values and handle identity for
/// records and collections: two slots holding different record instances
/// are unequal even when the instances carry equal attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Plain data.
    Value(Value),
    /// A nested record, held by reference.
    Record(Record),
    /// A nested collection, held by reference.
    Collection(Collection),
}

impl Slot {
    /// Get this slot as plain data, if it is.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Get this slot as a record, if it is one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Slot::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Get this slot as a collection, if it is one.
    #[must_use]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Slot::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Value(value)
    }
}

impl From<Record> for Slot {
    fn from(record: Record) -> Self {
        Slot::Record(record)
    }
}

impl From<Collection> for Slot {
    fn from(collection: Collection) -> Self {
        Slot::Collection(collection)
    }
}

impl From<bool> for Slot {
    fn from(b: bool) -> Self {
        Slot::Value(Value::Bool(b))
    }
}

impl From<i64> for Slot {
    fn from(n: i64) -> Self {
        Slot::Value(Value::Int(n))
    }
}

impl From<i32> for Slot {
    fn from(n: i32) -> Self {
        Slot::Value(Value::Int(i64::from(n)))
    }
}

impl From<f64> for Slot {
    fn from(f: f64) -> Self {
        Slot::Value(Value::Float(f))
    }
}

impl From<String> for Slot {
    fn from(s: String) -> Self {
        Slot::Value(Value::Text(s))
    }
}

impl From<&str> for Slot {
    fn from(s: &str) -> Self {
        Slot::Value(Value::Text(s.to_string()))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Slot {
    fn from(items: Vec<T>) -> Self {
        Slot::Value(Value::Array(items.into_iter().map(Into::into).collect()))
    }
}

/// Ordered attribute entries handed to a set call.
///
/// Entries keep the order the caller supplied them in; relation routing
/// and change notifications follow that order.
#[derive(Debug, Clone, Default)]
pub struct Attrs {
    entries: Vec<(String, Slot)>,
}

impl Attrs {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, keeping insertion order.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Slot>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Whether the payload has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Slot)> {
        self.entries
    }
}

impl From<Value> for Attrs {
    /// Converts a payload map into entries, in the map's (canonical) key
    /// order. Non-map values convert to an empty payload.
    fn from(value: Value) -> Self {
        let entries = match value {
            Value::Map(pairs) => pairs
                .into_iter()
                .map(|(key, value)| (key, Slot::Value(value)))
                .collect(),
            _ => Vec::new(),
        };
        Self { entries }
    }
}

impl From<Vec<(String, Slot)>> for Attrs {
    fn from(entries: Vec<(String, Slot)>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<Slot>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
