//! # gridbook-core
//!
//! The mutable in-memory model of a spreadsheet document: a [`Workbook`] of
//! ordered [`Sheet`]s holding sparse rows and typed cells, with the
//! document-wide arenas (shared strings, styles, defined names) owned by the
//! workbook and reached by handle.
//!
//! The interesting parts are the algorithms that keep the model consistent
//! while it is edited: bulk row relocation that rewrites formula references,
//! merged regions, and defined names across every sheet; shared-formula
//! groups resolved lazily against a declared range; and row/column outline
//! grouping with collapse state. Parsing and serializing the container
//! format is a codec concern outside this crate; foreign container parts
//! pass through untouched via [`gridbook_opc`].

pub mod address;
pub mod cell;
pub mod column;
pub mod comment;
pub mod conditional_format;
pub mod dates;
pub mod error;
pub mod formula;
pub mod hyperlink;
pub mod measure;
pub mod named_range;
pub mod outline;
pub mod resource;
pub mod row;
pub mod shared_formula;
pub mod sheet;
pub mod shift;
pub mod style;
pub mod workbook;

pub use address::{column_to_letters, letters_to_column, CellAddress, CellRange};
pub use cell::{Cell, CellError, CellValue, Formula, FormulaKind};
pub use column::{ColumnRecord, DEFAULT_COLUMN_WIDTH};
pub use comment::Comment;
pub use conditional_format::{CfOperator, CfRuleType, ConditionalFormatRule};
pub use dates::{date_to_serial, datetime_to_serial, serial_to_date, serial_to_datetime};
pub use error::{Error, ErrorCategory, Result};
pub use hyperlink::{Hyperlink, HyperlinkKind};
pub use measure::{ApproxMeasurer, TextMeasurer};
pub use named_range::{NameScope, NamedRange, NamedRangeTable};
pub use outline::MAX_OUTLINE_LEVEL;
pub use resource::{Handle, ResourceTable, SharedStringTable};
pub use row::{MissingCellPolicy, Row, DEFAULT_ROW_HEIGHT};
pub use shared_formula::SharedFormulaResolver;
pub use sheet::{FreezePane, Sheet, MAX_COLUMN_WIDTH};
pub use shift::ShiftOptions;
pub use style::{
    is_date_format, Alignment, Border, BorderEdge, CellStyle, Color, Fill, Font,
    HorizontalAlignment, LineStyle, PatternType, Protection, StyleTable, Underline,
    VerticalAlignment,
};
pub use workbook::Workbook;

/// Hard row-count limit of the sheet grid
pub const MAX_ROWS: u32 = 1_048_576;

/// Hard column-count limit of the sheet grid
pub const MAX_COLS: u16 = 16_384;

/// Longest permitted sheet name, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;
