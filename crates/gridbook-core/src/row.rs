//! Rows and their cells
//!
//! A row owns its cells in a column-sorted map, so iteration is always
//! strictly ascending by column. Rows are sparse: a sheet only stores rows
//! that were explicitly created, and a row only stores cells that were
//! explicitly created. A blank cell that exists is different from a missing
//! one; [`MissingCellPolicy`] lets callers pick which distinction they want.

use std::collections::BTreeMap;

use crate::cell::{Cell, CellValue};
use crate::error::{Error, Result};
use crate::resource::Handle;
use crate::MAX_COLS;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// What a cell accessor does when the cell is missing or blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCellPolicy {
    /// Missing cells read as `None`; blank cells are returned as-is
    #[default]
    ReturnNullAndBlank,
    /// Missing cells and blank cells both read as `None`
    ReturnBlankAsNull,
    /// Missing cells are created blank and returned
    CreateNullAsBlank,
}

/// A row of cells plus row-level settings
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    row_num: u32,
    cells: BTreeMap<u16, Cell>,
    /// Custom height in points (None = sheet default)
    pub height: Option<f64>,
    /// Row is hidden
    pub hidden: bool,
    /// Outline/grouping level (0-7)
    pub outline_level: u8,
    /// Row is collapsed (in outline)
    pub collapsed: bool,
    /// Row-level style (None = no row style)
    pub style: Option<Handle>,
}

impl Row {
    /// Create an empty row with default settings
    pub fn new(row_num: u32) -> Self {
        Self {
            row_num,
            ..Self::default()
        }
    }

    /// The 0-based row number
    pub fn row_num(&self) -> u32 {
        self.row_num
    }

    /// Renumber the row; the sheet keeps its map key in sync
    pub(crate) fn set_row_num(&mut self, row_num: u32) {
        self.row_num = row_num;
    }

    // === Cells ===

    /// Create a blank cell at `col`, replacing any existing cell
    pub fn create_cell(&mut self, col: u16) -> Result<&mut Cell> {
        self.create_cell_with(col, CellValue::Blank)
    }

    /// Create a cell at `col` holding `value`, replacing any existing cell
    pub fn create_cell_with(
        &mut self,
        col: u16,
        value: impl Into<CellValue>,
    ) -> Result<&mut Cell> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        let slot = self.cells.entry(col).or_default();
        *slot = Cell::with_value(value);
        Ok(slot)
    }

    pub fn cell(&self, col: u16) -> Option<&Cell> {
        self.cells.get(&col)
    }

    pub fn cell_mut(&mut self, col: u16) -> Option<&mut Cell> {
        self.cells.get_mut(&col)
    }

    /// Get a cell under a [`MissingCellPolicy`]
    ///
    /// Takes `&mut self` because the create policy inserts a blank cell.
    pub fn cell_with_policy(
        &mut self,
        col: u16,
        policy: MissingCellPolicy,
    ) -> Result<Option<&Cell>> {
        match policy {
            MissingCellPolicy::ReturnNullAndBlank => Ok(self.cells.get(&col)),
            MissingCellPolicy::ReturnBlankAsNull => {
                Ok(self.cells.get(&col).filter(|c| !c.is_blank()))
            }
            MissingCellPolicy::CreateNullAsBlank => {
                if col >= MAX_COLS {
                    return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
                }
                Ok(Some(self.cells.entry(col).or_default()))
            }
        }
    }

    /// Remove the cell at `col`
    ///
    /// A member of a multi-cell array formula cannot be removed on its own;
    /// take the whole range down through the sheet's array-formula removal.
    pub fn remove_cell(&mut self, col: u16) -> Result<Option<Cell>> {
        if let Some(cell) = self.cells.get(&col) {
            if let Some(range) = cell.formula().and_then(|f| f.array_range()) {
                if range.cell_count() > 1 {
                    let addr = crate::address::CellAddress::new(self.row_num, col);
                    return Err(Error::PartialArrayFormula(addr.to_a1()));
                }
            }
        }
        Ok(self.cells.remove(&col))
    }

    /// Remove the cell without the array-formula guard
    pub(crate) fn remove_cell_unchecked(&mut self, col: u16) -> Option<Cell> {
        self.cells.remove(&col)
    }

    /// Iterate cells in ascending column order
    pub fn cells(&self) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells.iter().map(|(&col, cell)| (col, cell))
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = (u16, &mut Cell)> {
        self.cells.iter_mut().map(|(&col, cell)| (col, cell))
    }

    /// Lowest populated column, if any
    pub fn first_col_num(&self) -> Option<u16> {
        self.cells.keys().next().copied()
    }

    /// Highest populated column, if any
    pub fn last_col_num(&self) -> Option<u16> {
        self.cells.keys().next_back().copied()
    }

    /// Number of cells actually stored
    pub fn physical_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if this row has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.height.is_some()
            || self.hidden
            || self.outline_level > 0
            || self.collapsed
            || self.style.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cell_replaces() {
        let mut row = Row::new(0);
        row.create_cell_with(2, 1.0).unwrap();
        row.create_cell_with(2, 2.0).unwrap();

        assert_eq!(row.physical_cell_count(), 1);
        assert_eq!(row.cell(2).unwrap().numeric_value().unwrap(), 2.0);
    }

    #[test]
    fn test_create_cell_bounds() {
        let mut row = Row::new(0);
        assert!(row.create_cell(MAX_COLS - 1).is_ok());
        let err = row.create_cell(MAX_COLS).unwrap_err();
        assert!(matches!(err, Error::ColumnOutOfBounds(c, _) if c == MAX_COLS));
    }

    #[test]
    fn test_cells_iterate_ascending() {
        let mut row = Row::new(4);
        row.create_cell(9).unwrap();
        row.create_cell(1).unwrap();
        row.create_cell(5).unwrap();

        let cols: Vec<u16> = row.cells().map(|(c, _)| c).collect();
        assert_eq!(cols, vec![1, 5, 9]);
        assert_eq!(row.first_col_num(), Some(1));
        assert_eq!(row.last_col_num(), Some(9));
    }

    #[test]
    fn test_missing_cell_policy() {
        let mut row = Row::new(0);
        row.create_cell(0).unwrap(); // blank cell, present
        row.create_cell_with(1, 7.0).unwrap();

        // present blank vs missing
        assert!(row
            .cell_with_policy(0, MissingCellPolicy::ReturnNullAndBlank)
            .unwrap()
            .is_some());
        assert!(row
            .cell_with_policy(2, MissingCellPolicy::ReturnNullAndBlank)
            .unwrap()
            .is_none());

        // blank reported as absent
        assert!(row
            .cell_with_policy(0, MissingCellPolicy::ReturnBlankAsNull)
            .unwrap()
            .is_none());
        assert!(row
            .cell_with_policy(1, MissingCellPolicy::ReturnBlankAsNull)
            .unwrap()
            .is_some());

        // create synthesizes a blank cell
        assert!(row
            .cell_with_policy(3, MissingCellPolicy::CreateNullAsBlank)
            .unwrap()
            .is_some());
        assert_eq!(row.physical_cell_count(), 3);
    }

    #[test]
    fn test_remove_cell_guards_array_members() {
        use crate::address::CellAddress;
        use crate::cell::Formula;

        let mut row = Row::new(1);
        let range = CellAddress::new(1, 0).to(CellAddress::new(1, 2));
        for col in 0..3 {
            row.create_cell(col)
                .unwrap()
                .set_formula(Formula::array(range, ""));
        }

        let err = row.remove_cell(1).unwrap_err();
        assert!(matches!(err, Error::PartialArrayFormula(_)));
        assert_eq!(err.category(), crate::ErrorCategory::State);

        // single-cell array formulas come out normally
        let single = CellAddress::new(1, 5).to(CellAddress::new(1, 5));
        row.create_cell(5)
            .unwrap()
            .set_formula(Formula::array(single, "ROW()"));
        assert!(row.remove_cell(5).unwrap().is_some());
    }

    #[test]
    fn test_row_settings() {
        let mut row = Row::new(0);
        assert!(!row.has_custom_settings());
        row.outline_level = 2;
        assert!(row.has_custom_settings());
    }
}
