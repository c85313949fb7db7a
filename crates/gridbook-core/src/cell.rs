//! Cell values and formulas
//!
//! A cell's value is a tagged union; strings are stored as handles into the
//! workbook [`SharedStringTable`](crate::resource::SharedStringTable), so
//! there is no `From<&str>` conversion here. A formula sits next to the value
//! rather than replacing it: the value holds the last calculated result, the
//! way the container format keeps them side by side.

use std::fmt;

use crate::address::CellRange;
use crate::error::{Error, Result};
use crate::resource::{Handle, SharedStringTable};

/// The value stored in a cell
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Blank,

    /// Numeric value (all numbers stored as f64, including date serials)
    Number(f64),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Handle into the workbook shared string table
    String(Handle),

    /// Error value (#VALUE!, #REF!, etc.)
    Error(CellError),
}

impl CellValue {
    /// Check if the value is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Check if the value is an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            _ => None,
        }
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    /// Try to get the shared string handle
    pub fn as_string_handle(&self) -> Option<Handle> {
        match self {
            CellValue::String(h) => Some(*h),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Blank => "blank",
            CellValue::Number(_) => "number",
            CellValue::Boolean(_) => "boolean",
            CellValue::String(_) => "string",
            CellValue::Error(_) => "error",
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Spreadsheet error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// #NULL! - Incorrect range operator
    Null,
    /// #DIV/0! - Division by zero
    Div0,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #REF! - Invalid cell reference
    Ref,
    /// #NAME? - Unrecognized formula name
    Name,
    /// #NUM! - Invalid numeric value
    Num,
    /// #N/A - Value not available
    Na,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
        }
    }

    /// Parse an error string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#N/A" => Some(CellError::Na),
            _ => None,
        }
    }

    /// Get the numeric error code used by the binary cell record
    pub fn code(&self) -> u8 {
        match self {
            CellError::Null => 0x00,
            CellError::Div0 => 0x07,
            CellError::Value => 0x0F,
            CellError::Ref => 0x17,
            CellError::Name => 0x1D,
            CellError::Num => 0x24,
            CellError::Na => 0x2A,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a formula is attached to its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaKind {
    /// An ordinary single-cell formula
    Plain,
    /// Member of a shared formula group; the master text lives in the
    /// sheet's shared formula registry
    Shared { group: u32 },
    /// Member of an array formula; the text lives on the range's top-left cell
    Array { range: CellRange },
}

/// A cell formula
///
/// Shared followers carry an empty `text`; their effective text comes from
/// the group master.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    pub text: String,
    pub kind: FormulaKind,
}

impl Formula {
    /// Create a plain formula
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FormulaKind::Plain,
        }
    }

    /// Create a shared-group member formula
    pub fn shared(group: u32, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FormulaKind::Shared { group },
        }
    }

    /// Create an array formula member covering `range`
    pub fn array(range: CellRange, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FormulaKind::Array { range },
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.kind, FormulaKind::Shared { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, FormulaKind::Array { .. })
    }

    /// The covered range if this is an array formula member
    pub fn array_range(&self) -> Option<CellRange> {
        match self.kind {
            FormulaKind::Array { range } => Some(range),
            _ => None,
        }
    }
}

/// A single cell: value, optional formula, and style handle
///
/// For a formula cell the value holds the last calculated result (or stays
/// blank if it was never calculated).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    value: CellValue,
    formula: Option<Formula>,
    style: Handle,
}

impl Cell {
    /// Create a blank cell with the default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell holding a value
    pub fn with_value(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Replace the value, leaving any formula in place
    pub fn set_value(&mut self, value: impl Into<CellValue>) {
        self.value = value.into();
    }

    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    pub fn formula_mut(&mut self) -> Option<&mut Formula> {
        self.formula.as_mut()
    }

    pub fn set_formula(&mut self, formula: Formula) {
        self.formula = Some(formula);
    }

    /// Drop the formula, keeping the calculated value
    pub fn clear_formula(&mut self) -> Option<Formula> {
        self.formula.take()
    }

    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    pub fn style(&self) -> Handle {
        self.style
    }

    pub fn set_style(&mut self, style: Handle) {
        self.style = style;
    }

    /// Blank value and no formula; the style does not count
    pub fn is_blank(&self) -> bool {
        self.value.is_blank() && self.formula.is_none()
    }

    // === Typed accessors ===

    /// Read the value as a number; blank reads as 0.0
    pub fn numeric_value(&self) -> Result<f64> {
        match self.value {
            CellValue::Number(n) => Ok(n),
            CellValue::Blank => Ok(0.0),
            ref other => Err(Error::InvalidValueType {
                expected: "number",
                actual: other.type_name(),
            }),
        }
    }

    /// Read the value as a boolean; blank reads as false
    pub fn boolean_value(&self) -> Result<bool> {
        match self.value {
            CellValue::Boolean(b) => Ok(b),
            CellValue::Blank => Ok(false),
            ref other => Err(Error::InvalidValueType {
                expected: "boolean",
                actual: other.type_name(),
            }),
        }
    }

    /// Read the value as an error code
    pub fn error_value(&self) -> Result<CellError> {
        match self.value {
            CellValue::Error(e) => Ok(e),
            ref other => Err(Error::InvalidValueType {
                expected: "error",
                actual: other.type_name(),
            }),
        }
    }

    /// Read the shared string handle; blank reads as `None`
    ///
    /// Resolve the handle through the workbook string table.
    pub fn string_handle(&self) -> Result<Option<Handle>> {
        match self.value {
            CellValue::String(h) => Ok(Some(h)),
            CellValue::Blank => Ok(None),
            ref other => Err(Error::InvalidValueType {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }

    /// The value rendered for display, with string handles resolved
    /// through the workbook string table
    pub fn display_string(&self, strings: &SharedStringTable) -> Result<String> {
        Ok(match self.value {
            CellValue::Blank => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
            CellValue::String(h) => strings.get(h)?.to_string(),
            CellValue::Error(e) => e.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::CellAddress;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42), CellValue::Number(42.0));
        assert_eq!(CellValue::from(3.15), CellValue::Number(3.15));
        assert_eq!(CellValue::from(true), CellValue::Boolean(true));
        assert_eq!(
            CellValue::from(CellError::Ref),
            CellValue::Error(CellError::Ref)
        );
    }

    #[test]
    fn test_cell_value_as_number() {
        assert_eq!(CellValue::Number(42.0).as_number(), Some(42.0));
        assert_eq!(CellValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(CellValue::Boolean(false).as_number(), Some(0.0));
        assert_eq!(CellValue::String(3).as_number(), None);
        assert_eq!(CellValue::Blank.as_number(), None);
    }

    #[test]
    fn test_cell_error_display() {
        assert_eq!(CellError::Div0.to_string(), "#DIV/0!");
        assert_eq!(CellError::Value.to_string(), "#VALUE!");
        assert_eq!(CellError::Na.to_string(), "#N/A");
    }

    #[test]
    fn test_cell_error_parse() {
        assert_eq!(CellError::from_str("#DIV/0!"), Some(CellError::Div0));
        assert_eq!(CellError::from_str("#ref!"), Some(CellError::Ref));
        assert_eq!(CellError::from_str("invalid"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let cell = Cell::with_value(2.5);
        assert_eq!(cell.numeric_value().unwrap(), 2.5);

        let err = cell.boolean_value().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidValueType {
                expected: "boolean",
                actual: "number",
            }
        ));
    }

    #[test]
    fn test_blank_reads_as_zero_false_none() {
        let cell = Cell::new();
        assert_eq!(cell.numeric_value().unwrap(), 0.0);
        assert!(!cell.boolean_value().unwrap());
        assert_eq!(cell.string_handle().unwrap(), None);
        assert!(cell.error_value().is_err());
    }

    #[test]
    fn test_formula_next_to_value() {
        let mut cell = Cell::new();
        cell.set_formula(Formula::plain("SUM(A1:A3)"));
        cell.set_value(6.0);

        assert!(cell.has_formula());
        assert_eq!(cell.numeric_value().unwrap(), 6.0);

        let taken = cell.clear_formula().unwrap();
        assert_eq!(taken.text, "SUM(A1:A3)");
        assert_eq!(cell.numeric_value().unwrap(), 6.0);
    }

    #[test]
    fn test_array_formula_range() {
        let range = CellAddress::new(0, 0).to(CellAddress::new(2, 0));
        let f = Formula::array(range, "TRANSPOSE(B1:D1)");
        assert!(f.is_array());
        assert_eq!(f.array_range(), Some(range));
        assert!(!Formula::plain("A1").is_array());
    }
}
