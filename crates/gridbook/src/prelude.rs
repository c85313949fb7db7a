//! Prelude module - common imports for gridbook users
//!
//! ```rust
//! use gridbook::prelude::*;
//! ```

pub use crate::{
    // Measurement
    ApproxMeasurer,
    // Cell types
    Cell,
    CellAddress,
    CellError,
    CellRange,
    CellStyle,
    CellValue,
    Color,
    // Annotations
    Comment,
    // Error types
    Error,
    ErrorCategory,
    Fill,
    Font,
    Formula,
    FormulaKind,
    // Resource handles
    Handle,
    Hyperlink,
    HyperlinkKind,
    MissingCellPolicy,
    // Defined names
    NameScope,
    NamedRange,
    // Container boundary
    Package,
    Part,
    PartName,
    Result,
    // Main types
    Row,
    SharedStringTable,
    Sheet,
    ShiftOptions,
    StyleTable,
    TextMeasurer,
    Workbook,
    // Constants
    MAX_COLS,
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};
