//! Sheet aggregate
//!
//! A sheet owns sparse row storage plus the per-sheet collections that hang
//! off it: column records, merged regions, array formula ranges, comments,
//! hyperlinks, conditional formats, and the shared formula registry. Style
//! and string data live in the workbook arenas and reach sheet operations
//! as borrowed parameters, so a sheet never holds a handle table of its own.

use std::collections::BTreeMap;

use crate::address::{CellAddress, CellRange};
use crate::cell::{Cell, CellValue, Formula, FormulaKind};
use crate::column::ColumnRecord;
use crate::comment::Comment;
use crate::conditional_format::ConditionalFormatRule;
use crate::error::{Error, Result};
use crate::hyperlink::Hyperlink;
use crate::measure::TextMeasurer;
use crate::outline::{self, ColumnOutline, RowOutline};
use crate::resource::{Handle, SharedStringTable};
use crate::row::{MissingCellPolicy, Row};
use crate::shared_formula::SharedFormulaResolver;
use crate::style::{Color, StyleTable};
use crate::{MAX_COLS, MAX_ROWS};

/// The widest a column can be set, in character units
pub const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Frozen header rows/columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreezePane {
    /// Rows frozen above the split
    pub row: u32,
    /// Columns frozen left of the split
    pub col: u16,
}

/// One sheet of a workbook
#[derive(Debug, Clone)]
pub struct Sheet {
    pub(crate) name: String,
    pub(crate) rows: BTreeMap<u32, Row>,
    pub(crate) columns: BTreeMap<u16, ColumnRecord>,
    pub(crate) merged_regions: Vec<CellRange>,
    pub(crate) array_formulas: Vec<CellRange>,
    pub(crate) comments: BTreeMap<(u32, u16), Comment>,
    pub(crate) comment_authors: Vec<String>,
    pub(crate) hyperlinks: Vec<Hyperlink>,
    pub(crate) conditional_formats: Vec<ConditionalFormatRule>,
    pub(crate) shared_formulas: SharedFormulaResolver,
    freeze_pane: Option<FreezePane>,
    default_row_height: f64,
    default_column_width: f64,
    visible: bool,
    selected: bool,
    tab_color: Option<Color>,
}

impl Sheet {
    /// Create an empty sheet with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
            columns: BTreeMap::new(),
            merged_regions: Vec::new(),
            array_formulas: Vec::new(),
            comments: BTreeMap::new(),
            comment_authors: Vec::new(),
            hyperlinks: Vec::new(),
            conditional_formats: Vec::new(),
            shared_formulas: SharedFormulaResolver::new(),
            freeze_pane: None,
            default_row_height: crate::row::DEFAULT_ROW_HEIGHT,
            default_column_width: crate::column::DEFAULT_COLUMN_WIDTH,
            visible: true,
            selected: false,
            tab_color: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn tab_color(&self) -> Option<Color> {
        self.tab_color
    }

    pub fn set_tab_color(&mut self, color: Option<Color>) {
        self.tab_color = color;
    }

    fn check_row(&self, row: u32) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        Ok(())
    }

    fn check_col(&self, col: u16) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }

    // === Rows ===

    /// Create a row, discarding any existing row at that number
    pub fn create_row(&mut self, row_num: u32) -> Result<&mut Row> {
        self.check_row(row_num)?;
        let row = self
            .rows
            .entry(row_num)
            .or_insert_with(|| Row::new(row_num));
        *row = Row::new(row_num);
        Ok(row)
    }

    pub fn row(&self, row_num: u32) -> Option<&Row> {
        self.rows.get(&row_num)
    }

    pub fn row_mut(&mut self, row_num: u32) -> Option<&mut Row> {
        self.rows.get_mut(&row_num)
    }

    /// Iterate existing rows in ascending row-number order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.rows.values_mut()
    }

    pub fn first_row_num(&self) -> Option<u32> {
        self.rows.keys().next().copied()
    }

    pub fn last_row_num(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Number of rows that physically exist
    pub fn physical_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Remove a row along with its comments and row-local hyperlinks
    pub fn remove_row(&mut self, row_num: u32) -> Result<Row> {
        let row = self
            .rows
            .remove(&row_num)
            .ok_or_else(|| Error::NotOwned(format!("Row {row_num}")))?;
        self.comments.retain(|&(r, _), _| r != row_num);
        self.hyperlinks
            .retain(|l| !(l.anchor.first_row() == row_num && l.anchor.last_row() == row_num));
        Ok(row)
    }

    /// Get row height, falling back to the sheet default
    pub fn row_height(&self, row_num: u32) -> f64 {
        self.rows
            .get(&row_num)
            .and_then(|r| r.height)
            .unwrap_or(self.default_row_height)
    }

    /// Set row height, creating the row if absent
    pub fn set_row_height(&mut self, row_num: u32, height: f64) -> Result<()> {
        self.check_row(row_num)?;
        self.rows
            .entry(row_num)
            .or_insert_with(|| Row::new(row_num))
            .height = Some(height);
        Ok(())
    }

    pub fn is_row_hidden(&self, row_num: u32) -> bool {
        self.rows.get(&row_num).map(|r| r.hidden).unwrap_or(false)
    }

    pub fn set_row_hidden(&mut self, row_num: u32, hidden: bool) -> Result<()> {
        self.check_row(row_num)?;
        self.rows
            .entry(row_num)
            .or_insert_with(|| Row::new(row_num))
            .hidden = hidden;
        Ok(())
    }

    pub fn default_row_height(&self) -> f64 {
        self.default_row_height
    }

    pub fn set_default_row_height(&mut self, height: f64) {
        self.default_row_height = height;
    }

    // === Cells ===

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.cell(col))
    }

    pub fn cell_mut(&mut self, row: u32, col: u16) -> Option<&mut Cell> {
        self.rows.get_mut(&row).and_then(|r| r.cell_mut(col))
    }

    /// Get the cell, creating the row and a blank cell as needed
    ///
    /// Unlike [`Row::create_cell`] an existing cell is returned as-is, not
    /// replaced.
    pub fn cell_or_create(&mut self, row: u32, col: u16) -> Result<&mut Cell> {
        self.check_row(row)?;
        let row_entry = self.rows.entry(row).or_insert_with(|| Row::new(row));
        if row_entry.cell(col).is_none() {
            row_entry.create_cell(col)?;
        }
        match row_entry.cell_mut(col) {
            Some(cell) => Ok(cell),
            None => Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1)),
        }
    }

    /// Policy-driven cell access; the create policy inserts a blank cell
    pub fn cell_with_policy(
        &mut self,
        row: u32,
        col: u16,
        policy: MissingCellPolicy,
    ) -> Result<Option<&Cell>> {
        match policy {
            MissingCellPolicy::CreateNullAsBlank => {
                self.check_row(row)?;
                self.rows
                    .entry(row)
                    .or_insert_with(|| Row::new(row))
                    .cell_with_policy(col, policy)
            }
            _ => match self.rows.get_mut(&row) {
                Some(r) => r.cell_with_policy(col, policy),
                None => Ok(None),
            },
        }
    }

    /// The effective formula text for a cell
    ///
    /// Shared-group members with no local text are materialized through the
    /// group master.
    pub fn cell_formula(&mut self, row: u32, col: u16) -> Result<Option<String>> {
        let formula = match self
            .rows
            .get(&row)
            .and_then(|r| r.cell(col))
            .and_then(|c| c.formula())
        {
            Some(f) => f.clone(),
            None => return Ok(None),
        };
        match formula.kind {
            FormulaKind::Shared { group } if formula.text.is_empty() => {
                let text = self
                    .shared_formulas
                    .formula_for(group, CellAddress::new(row, col))?;
                Ok(Some(text))
            }
            _ => Ok(Some(formula.text)),
        }
    }

    /// The sheet's shared formula registry
    pub fn shared_formulas(&self) -> &SharedFormulaResolver {
        &self.shared_formulas
    }

    pub fn shared_formulas_mut(&mut self) -> &mut SharedFormulaResolver {
        &mut self.shared_formulas
    }

    // === Merged regions ===

    /// Merge a range of at least two cells
    pub fn add_merged_region(&mut self, range: CellRange) -> Result<usize> {
        if range.cell_count() < 2 {
            return Err(Error::SingleCellMerge(range.to_string()));
        }
        for existing in &self.merged_regions {
            if range.overlaps(existing) {
                return Err(Error::MergedRegionOverlap(range.to_string()));
            }
        }
        // a merge may swallow an array formula whole but never cut into one
        for array in &self.array_formulas {
            if array.is_single_cell() {
                continue;
            }
            if range.overlaps(array) && !range.contains_range(array) {
                return Err(Error::ArrayFormulaConflict {
                    region: range.to_string(),
                    array: array.to_string(),
                });
            }
        }
        self.merged_regions.push(range);
        Ok(self.merged_regions.len() - 1)
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    pub fn remove_merged_region(&mut self, index: usize) -> Option<CellRange> {
        if index < self.merged_regions.len() {
            Some(self.merged_regions.remove(index))
        } else {
            None
        }
    }

    // === Array formulas ===

    /// Store an array formula over a range
    ///
    /// The text lives on the top-left cell; every covered cell carries the
    /// range descriptor.
    pub fn set_array_formula(&mut self, range: CellRange, formula: impl Into<String>) -> Result<()> {
        self.check_row(range.last_row())?;
        self.check_col(range.last_col())?;
        for existing in &self.array_formulas {
            if range.overlaps(existing) {
                return Err(Error::ArrayFormulaConflict {
                    region: range.to_string(),
                    array: existing.to_string(),
                });
            }
        }
        for merged in &self.merged_regions {
            if range.overlaps(merged) {
                return Err(Error::MergedRegionOverlap(range.to_string()));
            }
        }
        let text = formula.into();
        for row_num in range.first_row()..=range.last_row() {
            for col in range.first_col()..=range.last_col() {
                let is_master = row_num == range.first_row() && col == range.first_col();
                let cell = self.cell_or_create(row_num, col)?;
                let member_text = if is_master { text.clone() } else { String::new() };
                cell.set_formula(Formula::array(range, member_text));
            }
        }
        self.array_formulas.push(range);
        Ok(())
    }

    /// Clear the whole array formula containing the given cell
    pub fn remove_array_formula(&mut self, row: u32, col: u16) -> Result<CellRange> {
        let addr = CellAddress::new(row, col);
        let index = self
            .array_formulas
            .iter()
            .position(|r| r.contains(addr))
            .ok_or_else(|| Error::NotOwned(format!("Array formula cell {}", addr.to_a1())))?;
        let range = self.array_formulas.remove(index);
        for row_num in range.first_row()..=range.last_row() {
            for c in range.first_col()..=range.last_col() {
                if let Some(cell) = self.cell_mut(row_num, c) {
                    cell.clear_formula();
                    cell.set_value(CellValue::Blank);
                }
            }
        }
        Ok(range)
    }

    pub fn array_formula_ranges(&self) -> &[CellRange] {
        &self.array_formulas
    }

    // === Comments ===

    /// Attach a comment, tracking its author in first-use order
    pub fn set_comment(&mut self, row: u32, col: u16, comment: Comment) {
        if comment.has_author() && !self.comment_authors.contains(&comment.author) {
            self.comment_authors.push(comment.author.clone());
        }
        self.comments.insert((row, col), comment);
    }

    pub fn comment(&self, row: u32, col: u16) -> Option<&Comment> {
        self.comments.get(&(row, col))
    }

    pub fn remove_comment(&mut self, row: u32, col: u16) -> Option<Comment> {
        self.comments.remove(&(row, col))
    }

    /// Iterate comments in cell order
    pub fn comments(&self) -> impl Iterator<Item = ((u32, u16), &Comment)> {
        self.comments.iter().map(|(&k, v)| (k, v))
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Authors in first-use order
    pub fn comment_authors(&self) -> &[String] {
        &self.comment_authors
    }

    /// The author-list index used by the container format
    pub fn comment_author_index(&self, author: &str) -> Option<usize> {
        self.comment_authors.iter().position(|a| a == author)
    }

    // === Hyperlinks ===

    pub fn add_hyperlink(&mut self, link: Hyperlink) {
        self.hyperlinks.push(link);
    }

    pub fn hyperlinks(&self) -> &[Hyperlink] {
        &self.hyperlinks
    }

    /// The first hyperlink whose anchor covers the given cell
    pub fn hyperlink_at(&self, row: u32, col: u16) -> Option<&Hyperlink> {
        let addr = CellAddress::new(row, col);
        self.hyperlinks.iter().find(|l| l.anchor.contains(addr))
    }

    pub fn remove_hyperlink(&mut self, index: usize) -> Option<Hyperlink> {
        if index < self.hyperlinks.len() {
            Some(self.hyperlinks.remove(index))
        } else {
            None
        }
    }

    // === Conditional formatting ===

    pub fn add_conditional_format(&mut self, rule: ConditionalFormatRule) {
        self.conditional_formats.push(rule);
    }

    pub fn conditional_formats(&self) -> &[ConditionalFormatRule] {
        &self.conditional_formats
    }

    pub fn conditional_formats_mut(&mut self) -> &mut Vec<ConditionalFormatRule> {
        &mut self.conditional_formats
    }

    // === Columns ===

    pub fn column_width(&self, col: u16) -> f64 {
        self.columns
            .get(&col)
            .and_then(|c| c.width)
            .unwrap_or(self.default_column_width)
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        self.check_col(col)?;
        self.columns.entry(col).or_default().width = Some(width.min(MAX_COLUMN_WIDTH));
        Ok(())
    }

    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.columns.get(&col).map(|c| c.hidden).unwrap_or(false)
    }

    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) -> Result<()> {
        self.check_col(col)?;
        self.columns.entry(col).or_default().hidden = hidden;
        Ok(())
    }

    pub fn column_style(&self, col: u16) -> Option<Handle> {
        self.columns.get(&col).and_then(|c| c.style)
    }

    pub fn set_column_style(&mut self, col: u16, style: Handle) -> Result<()> {
        self.check_col(col)?;
        self.columns.entry(col).or_default().style = Some(style);
        Ok(())
    }

    pub fn column_record(&self, col: u16) -> Option<&ColumnRecord> {
        self.columns.get(&col)
    }

    /// Iterate column records in column order
    pub fn column_records(&self) -> impl Iterator<Item = (u16, &ColumnRecord)> {
        self.columns.iter().map(|(&c, rec)| (c, rec))
    }

    pub fn default_column_width(&self) -> f64 {
        self.default_column_width
    }

    pub fn set_default_column_width(&mut self, width: f64) {
        self.default_column_width = width;
    }

    /// Size a column to its widest displayed value
    ///
    /// Cells inside merged regions are skipped; a column with no displayable
    /// content is left alone.
    pub fn auto_size_column(
        &mut self,
        col: u16,
        strings: &SharedStringTable,
        styles: &StyleTable,
        measurer: &dyn TextMeasurer,
    ) -> Result<()> {
        self.check_col(col)?;
        let mut widest: f64 = 0.0;
        for (&row_num, row) in &self.rows {
            let cell = match row.cell(col) {
                Some(c) => c,
                None => continue,
            };
            let addr = CellAddress::new(row_num, col);
            if self.merged_regions.iter().any(|m| m.contains(addr)) {
                continue;
            }
            let text = cell.display_string(strings)?;
            if text.is_empty() {
                continue;
            }
            let font = styles.font(styles.style(cell.style())?.font)?;
            widest = widest.max(measurer.text_width(&text, font));
        }
        if widest > 0.0 {
            let record = self.columns.entry(col).or_default();
            record.width = Some(widest.min(MAX_COLUMN_WIDTH));
            record.best_fit = true;
        }
        Ok(())
    }

    // === Outline ===

    /// Deepen the outline grouping over a row range
    pub fn group_rows(&mut self, from: u32, to: u32) -> Result<()> {
        let (from, to) = (from.min(to), from.max(to));
        self.check_row(to)?;
        outline::group(&mut RowOutline(&mut self.rows), from, to);
        Ok(())
    }

    pub fn ungroup_rows(&mut self, from: u32, to: u32) -> Result<()> {
        let (from, to) = (from.min(to), from.max(to));
        self.check_row(to)?;
        outline::ungroup(&mut RowOutline(&mut self.rows), from, to);
        Ok(())
    }

    /// Collapse or expand the row group containing `row`
    pub fn set_row_group_collapsed(&mut self, row: u32, collapsed: bool) -> Result<()> {
        self.check_row(row)?;
        outline::set_group_collapsed(&mut RowOutline(&mut self.rows), row, collapsed);
        Ok(())
    }

    pub fn row_outline_level(&self, row: u32) -> u8 {
        self.rows.get(&row).map(|r| r.outline_level).unwrap_or(0)
    }

    pub fn group_columns(&mut self, from: u16, to: u16) -> Result<()> {
        let (from, to) = (from.min(to), from.max(to));
        self.check_col(to)?;
        outline::group(&mut ColumnOutline(&mut self.columns), from as u32, to as u32);
        Ok(())
    }

    pub fn ungroup_columns(&mut self, from: u16, to: u16) -> Result<()> {
        let (from, to) = (from.min(to), from.max(to));
        self.check_col(to)?;
        outline::ungroup(&mut ColumnOutline(&mut self.columns), from as u32, to as u32);
        Ok(())
    }

    pub fn set_column_group_collapsed(&mut self, col: u16, collapsed: bool) -> Result<()> {
        self.check_col(col)?;
        outline::set_group_collapsed(
            &mut ColumnOutline(&mut self.columns),
            col as u32,
            collapsed,
        );
        Ok(())
    }

    pub fn column_outline_level(&self, col: u16) -> u8 {
        self.columns.get(&col).map(|c| c.outline_level).unwrap_or(0)
    }

    // === Panes and extent ===

    /// Freeze header rows/columns; (0, 0) clears the pane
    pub fn set_freeze_pane(&mut self, row: u32, col: u16) {
        if row == 0 && col == 0 {
            self.freeze_pane = None;
        } else {
            self.freeze_pane = Some(FreezePane { row, col });
        }
    }

    pub fn freeze_pane(&self) -> Option<FreezePane> {
        self.freeze_pane
    }

    pub fn clear_freeze_pane(&mut self) {
        self.freeze_pane = None;
    }

    /// The rectangle spanning all populated cells
    pub fn dimension(&self) -> Option<CellRange> {
        let mut acc: Option<(u32, u32, u16, u16)> = None;
        for (&row_num, row) in &self.rows {
            let (first_col, last_col) = match (row.first_col_num(), row.last_col_num()) {
                (Some(f), Some(l)) => (f, l),
                _ => continue,
            };
            acc = Some(match acc {
                None => (row_num, row_num, first_col, last_col),
                Some((first_row, _, min_col, max_col)) => (
                    first_row,
                    row_num,
                    min_col.min(first_col),
                    max_col.max(last_col),
                ),
            });
        }
        acc.map(|(fr, lr, fc, lc)| CellRange::from_indices(fr, fc, lr, lc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::ApproxMeasurer;
    use crate::ErrorCategory;

    fn range(s: &str) -> CellRange {
        CellRange::parse(s).unwrap()
    }

    #[test]
    fn test_create_row_replaces_and_iterates_in_order() {
        let mut sheet = Sheet::new("Data");
        sheet.create_row(5).unwrap();
        sheet.create_row(1).unwrap();
        let row = sheet.create_row(3).unwrap();
        row.create_cell_with(0, 1.0).unwrap();

        let nums: Vec<u32> = sheet.rows().map(|r| r.row_num()).collect();
        assert_eq!(nums, vec![1, 3, 5]);
        assert_eq!(sheet.first_row_num(), Some(1));
        assert_eq!(sheet.last_row_num(), Some(5));
        assert_eq!(sheet.physical_row_count(), 3);

        // re-creating discards the old row's cells
        sheet.create_row(3).unwrap();
        assert!(sheet.cell(3, 0).is_none());
    }

    #[test]
    fn test_remove_row_cascades() {
        let mut sheet = Sheet::new("Data");
        sheet.create_row(2).unwrap();
        sheet.set_comment(2, 0, Comment::new("Ana", "note"));
        sheet.add_hyperlink(Hyperlink::new(
            range("A3"),
            "https://example.com",
            crate::hyperlink::HyperlinkKind::Url,
        ));
        sheet.add_hyperlink(Hyperlink::new(
            range("A1:A5"),
            "https://example.com/tall",
            crate::hyperlink::HyperlinkKind::Url,
        ));

        sheet.remove_row(2).unwrap();
        assert!(sheet.comment(2, 0).is_none());
        // only the link anchored entirely to row 2 goes away
        assert_eq!(sheet.hyperlinks().len(), 1);

        let err = sheet.remove_row(9).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::State);
    }

    #[test]
    fn test_cell_or_create_keeps_existing() {
        let mut sheet = Sheet::new("Data");
        let cell = sheet.cell_or_create(0, 0).unwrap();
        cell.set_style(7);

        let again = sheet.cell_or_create(0, 0).unwrap();
        assert_eq!(again.style(), 7);
    }

    #[test]
    fn test_cell_with_policy_creates_row_on_demand() {
        let mut sheet = Sheet::new("Data");
        assert!(sheet
            .cell_with_policy(4, 2, MissingCellPolicy::ReturnNullAndBlank)
            .unwrap()
            .is_none());
        assert!(sheet.row(4).is_none());

        let cell = sheet
            .cell_with_policy(4, 2, MissingCellPolicy::CreateNullAsBlank)
            .unwrap()
            .unwrap();
        assert!(cell.is_blank());
        assert!(sheet.row(4).is_some());
    }

    #[test]
    fn test_merged_region_rules() {
        let mut sheet = Sheet::new("Data");
        let err = sheet.add_merged_region(range("B2")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);

        sheet.add_merged_region(range("A1:B2")).unwrap();
        let err = sheet.add_merged_region(range("B2:C3")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::State);
        assert_eq!(sheet.merged_regions().len(), 1);

        sheet.add_merged_region(range("D4:E5")).unwrap();
        assert_eq!(sheet.remove_merged_region(1), Some(range("D4:E5")));
        assert_eq!(sheet.remove_merged_region(5), None);
    }

    #[test]
    fn test_merge_may_swallow_array_but_not_cut_it() {
        let mut sheet = Sheet::new("Data");
        sheet.set_array_formula(range("B2:C3"), "A1*2").unwrap();

        let err = sheet.add_merged_region(range("C3:D4")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);

        sheet.add_merged_region(range("A1:D4")).unwrap();
    }

    #[test]
    fn test_array_formula_lifecycle() {
        let mut sheet = Sheet::new("Data");
        sheet.set_array_formula(range("B2:C3"), "A1*2").unwrap();

        let master = sheet.cell(1, 1).unwrap().formula().unwrap();
        assert_eq!(master.text, "A1*2");
        assert_eq!(
            master.kind,
            FormulaKind::Array {
                range: range("B2:C3")
            }
        );
        let member = sheet.cell(2, 2).unwrap().formula().unwrap();
        assert!(member.text.is_empty());
        assert_eq!(
            member.kind,
            FormulaKind::Array {
                range: range("B2:C3")
            }
        );

        // clearing from any member clears the whole region
        let cleared = sheet.remove_array_formula(2, 1).unwrap();
        assert_eq!(cleared, range("B2:C3"));
        assert!(!sheet.cell(1, 1).unwrap().has_formula());
        assert!(sheet.cell(2, 2).unwrap().is_blank());
        assert!(sheet.array_formula_ranges().is_empty());

        let err = sheet.remove_array_formula(2, 1).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::State);
    }

    #[test]
    fn test_array_formula_rejects_overlap() {
        let mut sheet = Sheet::new("Data");
        sheet.set_array_formula(range("A1:B2"), "1+1").unwrap();
        let err = sheet.set_array_formula(range("B2:C3"), "2+2").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);

        sheet.add_merged_region(range("E5:F6")).unwrap();
        let err = sheet.set_array_formula(range("F6:G7"), "3+3").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::State);
    }

    #[test]
    fn test_comment_authors_track_first_use() {
        let mut sheet = Sheet::new("Data");
        sheet.set_comment(0, 0, Comment::new("Ana", "first"));
        sheet.set_comment(1, 0, Comment::new("Ben", "second"));
        sheet.set_comment(2, 0, Comment::new("Ana", "third"));
        sheet.set_comment(3, 0, Comment::new("", "anonymous"));

        assert_eq!(sheet.comment_authors(), ["Ana", "Ben"]);
        assert_eq!(sheet.comment_author_index("Ben"), Some(1));
        assert_eq!(sheet.comment_author_index("Cleo"), None);
        assert_eq!(sheet.comment_count(), 4);

        assert_eq!(sheet.remove_comment(1, 0).unwrap().text, "second");
        // removal never rewrites the author list
        assert_eq!(sheet.comment_authors(), ["Ana", "Ben"]);
    }

    #[test]
    fn test_hyperlink_anchor_lookup() {
        let mut sheet = Sheet::new("Data");
        sheet.add_hyperlink(
            Hyperlink::new(
                range("B2:C4"),
                "https://example.com",
                crate::hyperlink::HyperlinkKind::Url,
            )
            .with_tooltip("docs"),
        );

        assert!(sheet.hyperlink_at(2, 2).is_some());
        assert!(sheet.hyperlink_at(0, 0).is_none());
        assert_eq!(sheet.remove_hyperlink(0).unwrap().target, "https://example.com");
        assert!(sheet.remove_hyperlink(0).is_none());
    }

    #[test]
    fn test_column_width_defaults_and_cap() {
        let mut sheet = Sheet::new("Data");
        assert_eq!(sheet.column_width(3), crate::column::DEFAULT_COLUMN_WIDTH);

        sheet.set_column_width(3, 20.5).unwrap();
        assert_eq!(sheet.column_width(3), 20.5);

        sheet.set_column_width(3, 400.0).unwrap();
        assert_eq!(sheet.column_width(3), MAX_COLUMN_WIDTH);

        assert!(!sheet.is_column_hidden(3));
        sheet.set_column_hidden(3, true).unwrap();
        assert!(sheet.is_column_hidden(3));

        let err = sheet.set_column_width(MAX_COLS, 10.0).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Index);
    }

    #[test]
    fn test_row_height_defaults() {
        let mut sheet = Sheet::new("Data");
        assert_eq!(sheet.row_height(9), crate::row::DEFAULT_ROW_HEIGHT);
        sheet.set_row_height(9, 30.0).unwrap();
        assert_eq!(sheet.row_height(9), 30.0);

        sheet.set_default_row_height(12.0);
        assert_eq!(sheet.row_height(100), 12.0);
    }

    #[test]
    fn test_freeze_pane_zero_clears() {
        let mut sheet = Sheet::new("Data");
        sheet.set_freeze_pane(2, 1);
        assert_eq!(sheet.freeze_pane(), Some(FreezePane { row: 2, col: 1 }));

        sheet.set_freeze_pane(0, 0);
        assert_eq!(sheet.freeze_pane(), None);
    }

    #[test]
    fn test_dimension_spans_populated_cells() {
        let mut sheet = Sheet::new("Data");
        assert_eq!(sheet.dimension(), None);

        // a row with no cells does not extend the dimension
        sheet.create_row(0).unwrap();
        assert_eq!(sheet.dimension(), None);

        sheet.cell_or_create(1, 1).unwrap();
        sheet.cell_or_create(6, 3).unwrap();
        assert_eq!(sheet.dimension(), Some(range("B2:D7")));
    }

    #[test]
    fn test_auto_size_column() {
        let mut sheet = Sheet::new("Data");
        let mut strings = SharedStringTable::new();
        let styles = StyleTable::new();
        let handle = strings.intern("a longer label");

        sheet
            .cell_or_create(0, 1)
            .unwrap()
            .set_value(CellValue::String(handle));
        sheet
            .cell_or_create(1, 1)
            .unwrap()
            .set_value(CellValue::Number(3.5));
        // merged content is ignored for sizing
        sheet.add_merged_region(range("B5:C6")).unwrap();
        let wide = strings.intern("an extremely wide merged banner value");
        sheet
            .cell_or_create(4, 1)
            .unwrap()
            .set_value(CellValue::String(wide));

        sheet
            .auto_size_column(1, &strings, &styles, &ApproxMeasurer)
            .unwrap();
        let record = sheet.column_record(1).unwrap();
        assert_eq!(record.width, Some("a longer label".len() as f64 + 1.0));
        assert!(record.best_fit);

        // a column with nothing to show keeps no record
        sheet
            .auto_size_column(9, &strings, &styles, &ApproxMeasurer)
            .unwrap();
        assert!(sheet.column_record(9).is_none());
    }

    #[test]
    fn test_outline_delegation() {
        let mut sheet = Sheet::new("Data");
        sheet.group_rows(4, 2).unwrap();
        for r in 2..=4 {
            assert_eq!(sheet.row_outline_level(r), 1);
        }
        sheet.set_row_group_collapsed(3, true).unwrap();
        assert!(sheet.is_row_hidden(2));
        assert!(sheet.is_row_hidden(4));

        sheet.set_row_group_collapsed(3, false).unwrap();
        assert!(!sheet.is_row_hidden(3));

        sheet.ungroup_rows(2, 4).unwrap();
        assert_eq!(sheet.row_outline_level(3), 0);

        sheet.group_columns(1, 3).unwrap();
        assert_eq!(sheet.column_outline_level(2), 1);
        sheet.ungroup_columns(1, 3).unwrap();
        assert_eq!(sheet.column_outline_level(2), 0);
    }

    #[test]
    fn test_cell_formula_materializes_shared_members() {
        let mut sheet = Sheet::new("Data");
        sheet.shared_formulas_mut().register_master(
            0,
            CellAddress::parse("B1").unwrap(),
            range("B1:B3"),
            "A1*2",
        );
        sheet
            .cell_or_create(0, 1)
            .unwrap()
            .set_formula(Formula::shared(0, "A1*2"));
        sheet
            .cell_or_create(2, 1)
            .unwrap()
            .set_formula(Formula::shared(0, ""));

        assert_eq!(sheet.cell_formula(0, 1).unwrap().unwrap(), "A1*2");
        assert_eq!(sheet.cell_formula(2, 1).unwrap().unwrap(), "A3*2");
        assert_eq!(sheet.cell_formula(5, 5).unwrap(), None);
    }
}
