//! Error types for gridbook-opc

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the container boundary
#[derive(Debug, Error)]
pub enum Error {
    /// Part name is not a normalized absolute container path
    #[error("Invalid part name: {0}")]
    InvalidPartName(String),

    /// No part stored under the given name
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Relationship id already used by the same source part
    #[error("Duplicate relationship id {id} on {source_part}")]
    DuplicateRelationshipId { source_part: String, id: String },

    /// No relationship with the given id on the source part
    #[error("Relationship not found: {id} on {source_part}")]
    RelationshipNotFound { source_part: String, id: String },
}
