//! Client-side record identifier.

use std::fmt;
use uuid::Uuid;

/// Unique client-side identifier for a record.
///
/// Cids are 128-bit UUIDs that are:
/// - Assigned at construction, before any server-side id exists
/// - Immutable for the lifetime of the record
/// - Preserved across serialize/clone round trips
///
/// The textual form is the lowercase hex UUID prefixed with `c`, e.g.
/// `c67e5504410b1426f9247bb680e5fe0c8`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cid([u8; 16]);

impl Cid {
    /// Creates a cid from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a new random cid.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Creates a cid from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.into_bytes())
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Converts to a UUID.
    #[must_use]
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }

    /// Parses a cid from its textual form.
    ///
    /// Accepts the `c`-prefixed form produced by [`Display`](fmt::Display)
    /// as well as a bare UUID (with or without hyphens). Returns `None`
    /// when the text is not a valid cid.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(bare) = text.strip_prefix('c') {
            if let Ok(uuid) = Uuid::try_parse(bare) {
                return Some(Self::from_uuid(uuid));
            }
        }
        // A bare UUID may itself start with the hex digit `c`.
        Uuid::try_parse(text).ok().map(Self::from_uuid)
    }
}

impl Default for Cid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({self})")
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.to_uuid().simple())
    }
}

impl From<Uuid> for Cid {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<Cid> for Uuid {
    fn from(cid: Cid) -> Self {
        cid.to_uuid()
    }
}

impl From<[u8; 16]> for Cid {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}
