//! # Nestling Testkit
//!
//! Test utilities for nestling.
//!
//! This crate provides:
//! - Standard record-type fixtures and pre-built graphs
//! - Property-based test generators using proptest
//! - Helpers for asserting on change feeds
//!
//! ## Usage
//!
//! ```rust
//! use nestling_testkit::prelude::*;
//!
//! let parent = scenarios::parent_with_children(3);
//! let children = parent.get_collection("children").unwrap();
//! assert_eq!(children.len(), 3);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod events;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::events::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use events::*;
pub use fixtures::*;
pub use generators::*;
