//! Record identity resolution.

use std::fmt;

use nestling_value::Value;

use crate::cid::Cid;

/// The value of a record's `id` attribute.
///
/// Server-assigned ids are either integers or strings; anything else in
/// the `id` attribute is treated as no id at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdValue {
    /// Numeric id.
    Int(i64),
    /// String id.
    Text(String),
}

impl IdValue {
    /// Extracts an id from an attribute value, if it is id-shaped.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(IdValue::Int(*n)),
            Value::Text(s) if !s.is_empty() => Some(IdValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Int(n) => write!(f, "{n}"),
            IdValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for IdValue {
    fn from(n: i64) -> Self {
        IdValue::Int(n)
    }
}

impl From<&str> for IdValue {
    fn from(s: &str) -> Self {
        IdValue::Text(s.to_string())
    }
}

impl From<String> for IdValue {
    fn from(s: String) -> Self {
        IdValue::Text(s)
    }
}

/// How a record is matched during reconciliation.
///
/// Persisted records match by id; records that have never been saved
/// match by cid. An id and a cid never compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Server-assigned identity.
    Id(IdValue),
    /// Client-side identity for unsaved records.
    Cid(Cid),
}

impl Identity {
    /// Extracts the identity carried by a payload map.
    ///
    /// An `id` entry wins over a `cid` entry; a payload with neither (or
    /// with junk in both) carries no identity and can only ever create a
    /// fresh record.
    #[must_use]
    pub fn of_payload(payload: &Value) -> Option<Self> {
        if let Some(id) = payload.get("id").and_then(IdValue::from_value) {
            return Some(Identity::Id(id));
        }
        payload
            .get("cid")
            .and_then(Value::as_text)
            .and_then(Cid::parse)
            .map(Identity::Cid)
    }
}

impl From<IdValue> for Identity {
    fn from(id: IdValue) -> Self {
        Identity::Id(id)
    }
}

impl From<Cid> for Identity {
    fn from(cid: Cid) -> Self {
        Identity::Cid(cid)
    }
}
