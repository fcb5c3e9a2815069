//! # Nestling Core
//!
//! Relation-aware record graphs for Nestling.
//!
//! This crate provides the engine that turns nested payload maps into
//! graphs of live record and collection instances:
//!
//! - Declarative relation schemas ([`RecordType`], [`Relation`])
//! - Identity-based reconciliation: repeated payload deliveries merge
//!   into existing instances instead of replacing them
//! - Change feeds on every record and collection, with per-key events
//! - Recursive serialization back to plain values, and deep cloning
//!   built on top of it
//!
//! ## Design Principles
//!
//! - Records and collections are cheap-to-clone handles over shared
//!   state; equality compares handle identity, never content
//! - A set call is the single write path: construction, merging, and
//!   reconciliation all run through it
//! - Matching prefers instance identity, then server id, then cid
//! - Malformed payload entries are skipped, never an error; errors are
//!   reserved for misdeclared schemas
//!
//! ## Example
//!
//! ```rust
//! use nestling_core::{Attrs, Record, RecordType, Relation, Value};
//!
//! let child = RecordType::builder("Child")
//!     .default_attr("title", "Child Model")
//!     .build();
//! let parent = RecordType::builder("Parent")
//!     .relation(Relation::many("children", &child))
//!     .build();
//!
//! let record = Record::new(&parent, Attrs::new()).unwrap();
//! record
//!     .set(
//!         "children",
//!         Value::Array(vec![Value::object([("title", Value::from("first"))])]),
//!     )
//!     .unwrap();
//! assert_eq!(record.get_collection("children").unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change_feed;
mod cid;
mod collection;
mod error;
mod identity;
mod options;
mod record;
mod resolve;
mod schema;
mod serialize;
mod slot;

pub use change_feed::{ChangeFeed, CollectionEvent, RecordEvent};
pub use cid::Cid;
pub use collection::Collection;
pub use error::{ConfigError, CoreResult};
pub use identity::{IdValue, Identity};
pub use options::SetOptions;
pub use record::Record;
pub use schema::{Cardinality, CollectionType, Relation, RecordType, RecordTypeBuilder};
pub use slot::{Attrs, Slot};

pub use nestling_value::Value;
