//! # gridbook
//!
//! A mutable in-memory model of a spreadsheet document.
//!
//! Gridbook holds the parsed content of a zipped-XML workbook as plain Rust
//! data and keeps the cross-cutting state consistent while the document is
//! edited: strings and styles stay interned in shared tables, formulas and
//! defined names follow row moves, outline levels agree with hidden flags.
//! Reading and writing the container format itself is codec work and lives
//! outside this crate; parts the model does not interpret ride along in a
//! [`Package`] so a codec can write them back unchanged.
//!
//! ## Features
//!
//! - Workbook / sheet / row / cell aggregate with sparse, ordered storage
//! - Shared string and style tables with content-addressed handles
//! - A1 address and range parsing and formatting up to XFD1048576
//! - Row shifting that rewrites formulas, names, merges, and anchors
//! - Shared and array formula group bookkeeping
//! - Row and column outline grouping with collapse and expand
//! - Serial date conversion for the 1900 and 1904 date systems
//!
//! ## Example
//!
//! ```rust
//! use gridbook::prelude::*;
//!
//! // Build a small sheet
//! let mut workbook = Workbook::new();
//! workbook.add_sheet("Data").unwrap();
//!
//! workbook.set_cell_value(0, 0, 0, 42.0).unwrap();
//! workbook.set_cell_string(0, 0, 1, "answer").unwrap();
//! workbook.set_cell_formula(0, 1, 0, "A1*2").unwrap();
//!
//! // Move the formula down two rows; its reference still points at A1
//! workbook.shift_rows(0, 1, 1, 2).unwrap();
//!
//! let sheet = workbook.sheet(0).unwrap();
//! assert_eq!(sheet.cell(3, 0).unwrap().formula().unwrap().text, "A1*2");
//! ```

pub mod prelude;

// Re-export the document model
pub use gridbook_core::{
    // Address types
    column_to_letters,
    letters_to_column,
    CellAddress,
    CellRange,
    // Cell types
    Cell,
    CellError,
    CellValue,
    Formula,
    FormulaKind,
    // Conditional formatting types
    CfOperator,
    CfRuleType,
    ConditionalFormatRule,
    // Annotation types
    Comment,
    Hyperlink,
    HyperlinkKind,
    // Error types
    Error,
    ErrorCategory,
    Result,
    // Style types
    Alignment,
    Border,
    BorderEdge,
    CellStyle,
    Color,
    Fill,
    Font,
    HorizontalAlignment,
    LineStyle,
    PatternType,
    Protection,
    StyleTable,
    Underline,
    VerticalAlignment,
    // Resource tables and defined names
    Handle,
    NameScope,
    NamedRange,
    NamedRangeTable,
    ResourceTable,
    SharedStringTable,
    // Main types
    ColumnRecord,
    FreezePane,
    MissingCellPolicy,
    Row,
    SharedFormulaResolver,
    Sheet,
    ShiftOptions,
    Workbook,
    // Column sizing
    ApproxMeasurer,
    TextMeasurer,
    // Date helpers
    date_to_serial,
    datetime_to_serial,
    is_date_format,
    serial_to_date,
    serial_to_datetime,
    // Constants
    DEFAULT_COLUMN_WIDTH,
    DEFAULT_ROW_HEIGHT,
    MAX_COLS,
    MAX_COLUMN_WIDTH,
    MAX_OUTLINE_LEVEL,
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export the container boundary
pub use gridbook_opc::{
    Element, Node, Package, Part, PartName, RelationKind, RelationSpec, Relationship, TargetMode,
};
