//! # gridbook-opc
//!
//! Container boundary for the gridbook document model: a plain tagged-variant
//! markup tree, a named part store with typed relationships, and an explicit
//! registry of relation kinds.
//!
//! This crate has no spreadsheet knowledge. The document model keeps parts it
//! does not interpret in a [`Package`] so a round-tripping codec can write
//! them back unchanged, and codecs exchange sheet content with the model as
//! [`Node`] trees instead of schema-bound wrapper objects.

pub mod error;
pub mod node;
pub mod part;
pub mod registry;

pub use error::{Error, Result};
pub use node::{Element, Node};
pub use part::{Package, Part, PartName, Relationship, TargetMode};
pub use registry::{RelationKind, RelationSpec};
