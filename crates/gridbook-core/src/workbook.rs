//! Workbook aggregate
//!
//! The workbook owns the ordered sheet list and every document-wide arena:
//! the shared string table, the style table, and the defined-name table.
//! Sheets never hold arena references; conveniences that need both a sheet
//! and an arena live here, where the borrows can be split, and pass the
//! tables into sheet operations by reference.

use gridbook_opc::Package;

use crate::cell::{Cell, CellValue, Formula};
use crate::error::{Error, Result};
use crate::measure::TextMeasurer;
use crate::named_range::{NameScope, NamedRange, NamedRangeTable};
use crate::resource::SharedStringTable;
use crate::row::MissingCellPolicy;
use crate::sheet::Sheet;
use crate::shift::ShiftOptions;
use crate::style::{CellStyle, StyleTable};
use crate::MAX_SHEET_NAME_LEN;

/// Characters a sheet name may not contain
const FORBIDDEN_SHEET_NAME_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// The top-level document model
#[derive(Debug, Clone)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    strings: SharedStringTable,
    styles: StyleTable,
    named_ranges: NamedRangeTable,
    active_sheet: usize,
    date_1904: bool,
    missing_cell_policy: MissingCellPolicy,
    preserved: Package,
}

impl Workbook {
    /// Create an empty workbook with no sheets
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            strings: SharedStringTable::new(),
            styles: StyleTable::new(),
            named_ranges: NamedRangeTable::new(),
            active_sheet: 0,
            date_1904: false,
            missing_cell_policy: MissingCellPolicy::default(),
            preserved: Package::new(),
        }
    }

    fn check_sheet(&self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.sheets.len()));
        }
        Ok(())
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(name.to_string()));
        }
        if name.contains(FORBIDDEN_SHEET_NAME_CHARS) {
            return Err(Error::InvalidSheetName(name.to_string()));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(Error::InvalidSheetName(name.to_string()));
        }
        if self.sheet_index_of(name).is_some() {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }

    // === Sheets ===

    /// Append a sheet with a validated name
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        self.validate_sheet_name(name)?;
        let index = self.sheets.len();
        self.sheets.push(Sheet::new(name));
        Ok(&mut self.sheets[index])
    }

    /// Sheet by tab position
    pub fn sheet(&self, index: usize) -> Result<&Sheet> {
        self.sheets
            .get(index)
            .ok_or(Error::SheetOutOfBounds(index, self.sheets.len()))
    }

    pub fn sheet_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        let count = self.sheets.len();
        self.sheets
            .get_mut(index)
            .ok_or(Error::SheetOutOfBounds(index, count))
    }

    /// Sheet by name, matched case-insensitively
    pub fn sheet_by_name(&self, name: &str) -> Result<&Sheet> {
        match self.sheet_index_of(name) {
            Some(index) => Ok(&self.sheets[index]),
            None => Err(Error::SheetNotFound(name.to_string())),
        }
    }

    pub fn sheet_by_name_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        match self.sheet_index_of(name) {
            Some(index) => Ok(&mut self.sheets[index]),
            None => Err(Error::SheetNotFound(name.to_string())),
        }
    }

    /// Tab position of the named sheet, case-insensitive
    pub fn sheet_index_of(&self, name: &str) -> Option<usize> {
        let lowered = name.to_lowercase();
        self.sheets
            .iter()
            .position(|s| s.name().to_lowercase() == lowered)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Iterate sheets in tab order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Remove a sheet
    ///
    /// Names scoped to the removed sheet are dropped, the scopes of later
    /// sheets' names are renumbered, and the active-sheet index is fixed up.
    pub fn remove_sheet(&mut self, index: usize) -> Result<Sheet> {
        self.check_sheet(index)?;
        let sheet = self.sheets.remove(index);
        self.named_ranges.remove_sheet(index);
        if self.active_sheet > index {
            self.active_sheet -= 1;
        } else if self.active_sheet >= self.sheets.len() {
            self.active_sheet = self.sheets.len().saturating_sub(1);
        }
        Ok(sheet)
    }

    /// Duplicate a sheet under a new name
    ///
    /// Rows, cells, comments, merged regions, column records, and outline
    /// state are deep-copied. Style and string handles in the copy stay
    /// valid because both sheets share the workbook arenas. Names scoped to
    /// the source sheet are not copied.
    pub fn clone_sheet(&mut self, index: usize, new_name: &str) -> Result<&mut Sheet> {
        self.check_sheet(index)?;
        self.validate_sheet_name(new_name)?;
        let mut copy = self.sheets[index].clone();
        copy.set_name(new_name);
        let new_index = self.sheets.len();
        self.sheets.push(copy);
        Ok(&mut self.sheets[new_index])
    }

    // === Settings ===

    /// Index of the active sheet tab
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        self.check_sheet(index)?;
        self.active_sheet = index;
        Ok(())
    }

    /// Whether serial dates count from the 1904 epoch
    pub fn is_date_1904(&self) -> bool {
        self.date_1904
    }

    pub fn set_date_1904(&mut self, date_1904: bool) {
        self.date_1904 = date_1904;
    }

    /// Workbook-wide policy for reading missing cells
    pub fn missing_cell_policy(&self) -> MissingCellPolicy {
        self.missing_cell_policy
    }

    pub fn set_missing_cell_policy(&mut self, policy: MissingCellPolicy) {
        self.missing_cell_policy = policy;
    }

    // === Arenas ===

    /// The shared string table
    pub fn strings(&self) -> &SharedStringTable {
        &self.strings
    }

    pub fn strings_mut(&mut self) -> &mut SharedStringTable {
        &mut self.strings
    }

    /// The style table
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleTable {
        &mut self.styles
    }

    // === Defined names ===

    /// Define a name, failing on a duplicate within its scope
    pub fn define_name(&mut self, range: NamedRange) -> Result<()> {
        if let NameScope::Sheet(index) = range.scope {
            self.check_sheet(index)?;
        }
        self.named_ranges.define(range)
    }

    /// Resolve a name from a sheet's point of view
    ///
    /// The sheet's own scope wins over the workbook scope.
    pub fn named_range(&self, name: &str, current_sheet: usize) -> Option<&NamedRange> {
        self.named_ranges.get(name, current_sheet)
    }

    pub fn remove_name(&mut self, name: &str, scope: NameScope) -> Option<NamedRange> {
        self.named_ranges.remove(name, scope)
    }

    /// The defined-name table
    pub fn named_ranges(&self) -> &NamedRangeTable {
        &self.named_ranges
    }

    pub fn named_ranges_mut(&mut self) -> &mut NamedRangeTable {
        &mut self.named_ranges
    }

    // === Cell conveniences ===

    /// Write a typed value, creating the row and cell as needed
    pub fn set_cell_value(
        &mut self,
        sheet: usize,
        row: u32,
        col: u16,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        self.sheet_mut(sheet)?
            .cell_or_create(row, col)?
            .set_value(value.into());
        Ok(())
    }

    /// Write a string value through the shared string table
    pub fn set_cell_string(&mut self, sheet: usize, row: u32, col: u16, text: &str) -> Result<()> {
        self.check_sheet(sheet)?;
        let handle = self.strings.intern(text);
        self.sheets[sheet]
            .cell_or_create(row, col)?
            .set_value(CellValue::String(handle));
        Ok(())
    }

    /// Write an ordinary formula, creating the row and cell as needed
    pub fn set_cell_formula(
        &mut self,
        sheet: usize,
        row: u32,
        col: u16,
        formula: impl Into<String>,
    ) -> Result<()> {
        self.sheet_mut(sheet)?
            .cell_or_create(row, col)?
            .set_formula(Formula::plain(formula));
        Ok(())
    }

    /// Intern a style and apply it to a cell
    pub fn set_cell_style(
        &mut self,
        sheet: usize,
        row: u32,
        col: u16,
        style: CellStyle,
    ) -> Result<()> {
        self.check_sheet(sheet)?;
        let handle = self.styles.intern_style(style)?;
        self.sheets[sheet]
            .cell_or_create(row, col)?
            .set_style(handle);
        Ok(())
    }

    /// Read a cell under the workbook's missing-cell policy
    pub fn cell(&mut self, sheet: usize, row: u32, col: u16) -> Result<Option<&Cell>> {
        let policy = self.missing_cell_policy;
        self.sheet_mut(sheet)?.cell_with_policy(row, col, policy)
    }

    /// A cell's value rendered for display; a missing cell renders empty
    pub fn cell_display_string(&self, sheet: usize, row: u32, col: u16) -> Result<String> {
        self.check_sheet(sheet)?;
        match self.sheets[sheet].cell(row, col) {
            Some(cell) => cell.display_string(&self.strings),
            None => Ok(String::new()),
        }
    }

    /// Size a column on one sheet to fit its widest displayed value
    pub fn auto_size_column(
        &mut self,
        sheet: usize,
        col: u16,
        measurer: &dyn TextMeasurer,
    ) -> Result<()> {
        self.check_sheet(sheet)?;
        self.sheets[sheet].auto_size_column(col, &self.strings, &self.styles, measurer)
    }

    // === Row shifting ===

    /// Move rows `start..=end` on one sheet by a signed distance, copying
    /// row heights along
    pub fn shift_rows(&mut self, sheet: usize, start: u32, end: u32, delta: i64) -> Result<()> {
        self.shift_rows_with(sheet, start, end, delta, ShiftOptions::default())
    }

    /// Row move with explicit height handling
    pub fn shift_rows_with(
        &mut self,
        sheet: usize,
        start: u32,
        end: u32,
        delta: i64,
        options: ShiftOptions,
    ) -> Result<()> {
        crate::shift::shift_rows(
            &mut self.sheets,
            &mut self.named_ranges,
            sheet,
            start,
            end,
            delta,
            options,
        )
    }

    // === Preserved container parts ===

    /// Container parts the model does not interpret
    ///
    /// A round-tripping codec parks foreign parts here on load and writes
    /// them back unchanged on save.
    pub fn preserved(&self) -> &Package {
        &self.preserved
    }

    pub fn preserved_mut(&mut self) -> &mut Package {
        &mut self.preserved
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
