//! # Nestling Value
//!
//! Plain attribute values for nestling record graphs.
//!
//! This crate provides the dynamic [`Value`] type that record attributes
//! and incoming payloads are made of:
//! - JSON-shaped: null, booleans, integers, floats, text, arrays, maps
//! - Canonical maps: keys sorted, duplicates collapsed (last wins)
//! - Serde support plus direct conversions to and from [`serde_json::Value`]
//!
//! ## Usage
//!
//! ```
//! use nestling_value::Value;
//!
//! let payload = Value::object([
//!     ("title", Value::from("Child1")),
//!     ("value", Value::from(1i64)),
//! ]);
//!
//! assert_eq!(payload.get("title").and_then(Value::as_text), Some("Child1"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod de;
mod json;
mod ser;
mod value;

pub use value::Value;
