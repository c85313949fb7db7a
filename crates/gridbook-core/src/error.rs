//! Error types for gridbook-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// The five stable failure categories every [`Error`] maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed reference, range, or name text
    Format,
    /// Handle or row/column/sheet index out of bounds
    Index,
    /// Invalid shift parameters or region conflicts
    Range,
    /// Operation on a value in the wrong state or wrong owner
    State,
    /// A feature combination the model cannot represent
    Unsupported,
}

/// Errors that can occur in gridbook-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Invalid defined name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Resource handle out of bounds for its table
    #[error("Invalid {table} handle: {handle}")]
    InvalidHandle {
        table: &'static str,
        handle: u32,
    },

    /// A style embeds a handle its table does not contain
    #[error("Dangling {table} handle {handle} embedded in style")]
    DanglingSubHandle {
        table: &'static str,
        handle: u32,
    },

    /// Row shift parameters out of range
    #[error("Cannot shift rows {start}..={end} by {delta}: {reason}")]
    InvalidShift {
        start: u32,
        end: u32,
        delta: i64,
        reason: &'static str,
    },

    /// Merged region must span at least two cells
    #[error("Merged region {0} must contain 2 or more cells")]
    SingleCellMerge(String),

    /// Merged region partially overlaps a multi-cell array formula
    #[error("Region {region} overlaps array formula range {array}")]
    ArrayFormulaConflict { region: String, array: String },

    /// Region overlaps an existing merged region
    #[error("Region {0} overlaps an existing merged region")]
    MergedRegionOverlap(String),

    /// Cell accessed as the wrong value type
    #[error("Invalid value type: expected {expected}, got {actual}")]
    InvalidValueType {
        expected: &'static str,
        actual: &'static str,
    },

    /// Row or cell does not belong to the sheet being mutated
    #[error("{0} is not owned by this sheet")]
    NotOwned(String),

    /// Removing part of a multi-cell array formula
    #[error("Cell {0} is part of a multi-cell array formula")]
    PartialArrayFormula(String),

    /// Shared formula group is not registered
    #[error("Shared formula group {0} is not registered")]
    UnknownSharedGroup(u32),

    /// Address lies outside a shared formula group's effective range
    #[error("Cell {addr} is outside shared formula group {group}")]
    OutsideSharedRange { group: u32, addr: String },

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Duplicate defined name in the same scope
    #[error("Name already exists in scope: {0}")]
    DuplicateName(String),

    /// Feature combination not representable
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Error from the container boundary
    #[error(transparent)]
    Container(#[from] gridbook_opc::Error),
}

impl Error {
    /// The category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidAddress(_)
            | Error::InvalidRange(_)
            | Error::InvalidSheetName(_)
            | Error::InvalidName(_) => ErrorCategory::Format,

            Error::RowOutOfBounds(..)
            | Error::ColumnOutOfBounds(..)
            | Error::SheetOutOfBounds(..)
            | Error::SheetNotFound(_)
            | Error::InvalidHandle { .. }
            | Error::DanglingSubHandle { .. } => ErrorCategory::Index,

            Error::InvalidShift { .. }
            | Error::SingleCellMerge(_)
            | Error::ArrayFormulaConflict { .. } => ErrorCategory::Range,

            Error::MergedRegionOverlap(_)
            | Error::InvalidValueType { .. }
            | Error::NotOwned(_)
            | Error::PartialArrayFormula(_)
            | Error::UnknownSharedGroup(_)
            | Error::OutsideSharedRange { .. }
            | Error::DuplicateSheetName(_)
            | Error::DuplicateName(_) => ErrorCategory::State,

            Error::Unsupported(_) => ErrorCategory::Unsupported,

            Error::Container(e) => match e {
                gridbook_opc::Error::InvalidPartName(_) => ErrorCategory::Format,
                gridbook_opc::Error::PartNotFound(_)
                | gridbook_opc::Error::RelationshipNotFound { .. } => ErrorCategory::Index,
                gridbook_opc::Error::DuplicateRelationshipId { .. } => ErrorCategory::State,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            Error::InvalidAddress("Q".into()).category(),
            ErrorCategory::Format
        );
        assert_eq!(
            Error::RowOutOfBounds(9, 5).category(),
            ErrorCategory::Index
        );
        assert_eq!(
            Error::SingleCellMerge("A1:A1".into()).category(),
            ErrorCategory::Range
        );
        assert_eq!(
            Error::InvalidValueType {
                expected: "number",
                actual: "string"
            }
            .category(),
            ErrorCategory::State
        );
        assert_eq!(
            Error::Unsupported("x".into()).category(),
            ErrorCategory::Unsupported
        );
    }

    #[test]
    fn test_display_carries_context() {
        let err = Error::InvalidShift {
            start: 2,
            end: 5,
            delta: -4,
            reason: "destination row below 0",
        };
        let msg = err.to_string();
        assert!(msg.contains("2..=5"));
        assert!(msg.contains("-4"));
    }
}
