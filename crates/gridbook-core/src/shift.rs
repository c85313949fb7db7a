//! Bulk row relocation
//!
//! Shifting a window of rows runs three passes over the workbook: evict the
//! rows the destination overwrites, re-key the moved rows, then rewrite
//! everything that referenced them (formulas on every sheet, named ranges,
//! merged regions, conditional formats, hyperlink anchors). The passes are
//! not transactional, so every parameter is validated before the first
//! mutation.

use crate::address::{CellAddress, CellRange};
use crate::cell::{Formula, FormulaKind};
use crate::error::{Error, Result};
use crate::formula::{shift_formula_rows, RowShift};
use crate::named_range::NamedRangeTable;
use crate::sheet::Sheet;
use crate::MAX_ROWS;

/// Options for a row shift
#[derive(Debug, Clone, Copy)]
pub struct ShiftOptions {
    /// Moved rows keep their custom heights; otherwise they reset to the
    /// sheet default
    pub copy_height: bool,
    /// Reset leftover custom heights in the vacated source window. The
    /// sparse row store moves rows out wholesale, so nothing is left behind
    /// to reset; the flag exists for callers porting from dense-storage
    /// models.
    pub reset_height: bool,
}

impl Default for ShiftOptions {
    fn default() -> Self {
        Self {
            copy_height: true,
            reset_height: false,
        }
    }
}

/// Shift rows `start..=end` of one sheet by `delta`, fixing up the rest of
/// the workbook
pub(crate) fn shift_rows(
    sheets: &mut [Sheet],
    named_ranges: &mut NamedRangeTable,
    sheet_index: usize,
    start: u32,
    end: u32,
    delta: i64,
    options: ShiftOptions,
) -> Result<()> {
    if sheet_index >= sheets.len() {
        return Err(Error::SheetOutOfBounds(sheet_index, sheets.len()));
    }
    let invalid = |reason: &'static str| Error::InvalidShift {
        start,
        end,
        delta,
        reason,
    };
    if start > end {
        return Err(invalid("start is after end"));
    }
    if end >= MAX_ROWS {
        return Err(invalid("window exceeds the row limit"));
    }
    if delta == 0 {
        return Ok(());
    }
    let dest_first = start as i64 + delta;
    let dest_last = end as i64 + delta;
    if dest_first < 0 {
        return Err(invalid("destination row below 0"));
    }
    if dest_last >= MAX_ROWS as i64 {
        return Err(invalid("destination row beyond the row limit"));
    }
    check_array_regions(&sheets[sheet_index], start, end, delta, dest_first, dest_last)?;

    let shift = RowShift::new(start, end, delta);
    let sheet_name = sheets[sheet_index].name.clone();
    let (ow_first, ow_last) = overwritten_window(start, end, delta);

    // Pass 1: clear the overwritten part of the destination window
    evict(&mut sheets[sheet_index], ow_first, ow_last);

    // Pass 2: dissolve disturbed shared groups, then re-key the rows and
    // the things anchored to them
    {
        let sheet = &mut sheets[sheet_index];
        materialize_shared_formulas(sheet, start.min(dest_first as u32), end.max(dest_last as u32))?;
        move_rows(sheet, start, end, delta, options.copy_height);
        relocate_comments(sheet, start, end, delta);
        relocate_array_regions(sheet, start, end, delta, dest_first, dest_last);
    }

    // Pass 3: rewrite everything that referenced the moved rows
    update_merged_regions(&mut sheets[sheet_index], start, end, ow_first, ow_last, delta);
    update_hyperlinks(&mut sheets[sheet_index], &shift);
    for (idx, sheet) in sheets.iter_mut().enumerate() {
        update_sheet_references(sheet, &shift, &sheet_name, idx == sheet_index);
    }
    update_named_ranges(named_ranges, &shift, &sheet_name);
    Ok(())
}

/// The destination rows that are overwritten rather than vacated by the
/// moving window itself
fn overwritten_window(start: u32, end: u32, delta: i64) -> (u32, u32) {
    if delta > 0 {
        (
            (end as i64 + 1).max(start as i64 + delta) as u32,
            (end as i64 + delta) as u32,
        )
    } else {
        (
            (start as i64 + delta) as u32,
            (start as i64 - 1).min(end as i64 + delta) as u32,
        )
    }
}

/// A shift may carry an array formula whole or leave it alone, never cut it
fn check_array_regions(
    sheet: &Sheet,
    start: u32,
    end: u32,
    delta: i64,
    dest_first: i64,
    dest_last: i64,
) -> Result<()> {
    let invalid = |reason: &'static str| Error::InvalidShift {
        start,
        end,
        delta,
        reason,
    };
    for region in &sheet.array_formulas {
        let rf = region.first_row() as i64;
        let rl = region.last_row() as i64;
        let inside_src = start as i64 <= rf && rl <= end as i64;
        let overlaps_src = rf <= end as i64 && start as i64 <= rl;
        if overlaps_src && !inside_src {
            return Err(invalid("window splits an array formula"));
        }
        if inside_src {
            continue;
        }
        let inside_dest = dest_first <= rf && rl <= dest_last;
        let overlaps_dest = rf <= dest_last && dest_first <= rl;
        if overlaps_dest && !inside_dest {
            return Err(invalid("destination clips an array formula"));
        }
    }
    Ok(())
}

fn evict(sheet: &mut Sheet, first: u32, last: u32) {
    sheet.rows.retain(|&n, _| n < first || n > last);
    sheet.comments.retain(|&(row, _), _| row < first || row > last);
    sheet
        .hyperlinks
        .retain(|l| l.anchor.first_row() < first || l.anchor.last_row() > last);
}

/// Dissolve shared groups whose declared rows the shift disturbs, writing
/// each member's effective text onto its cell
fn materialize_shared_formulas(sheet: &mut Sheet, first: u32, last: u32) -> Result<()> {
    let touched = sheet.shared_formulas.groups_touching_rows(first, last);
    if touched.is_empty() {
        return Ok(());
    }
    let Sheet {
        rows,
        shared_formulas,
        ..
    } = sheet;
    for row in rows.values_mut() {
        let row_num = row.row_num();
        for (col, cell) in row.cells_mut() {
            let group = match cell.formula() {
                Some(f) => match f.kind {
                    FormulaKind::Shared { group } if touched.contains(&group) => group,
                    _ => continue,
                },
                None => continue,
            };
            let text = shared_formulas.formula_for(group, CellAddress::new(row_num, col))?;
            cell.set_formula(Formula::plain(text));
        }
    }
    for group in touched {
        shared_formulas.remove(group);
    }
    Ok(())
}

/// Re-key the window's rows; descending for a downward move so keys never
/// collide mid-walk
fn move_rows(sheet: &mut Sheet, start: u32, end: u32, delta: i64, copy_height: bool) {
    let mut moved: Vec<u32> = sheet.rows.range(start..=end).map(|(&n, _)| n).collect();
    if delta > 0 {
        moved.reverse();
    }
    for n in moved {
        if let Some(mut row) = sheet.rows.remove(&n) {
            let new_num = (n as i64 + delta) as u32;
            row.set_row_num(new_num);
            if !copy_height {
                row.height = None;
            }
            sheet.rows.insert(new_num, row);
        }
    }
}

fn relocate_comments(sheet: &mut Sheet, start: u32, end: u32, delta: i64) {
    let moved: Vec<(u32, u16)> = sheet
        .comments
        .keys()
        .filter(|&&(row, _)| start <= row && row <= end)
        .copied()
        .collect();
    let mut relocated = Vec::with_capacity(moved.len());
    for key in moved {
        if let Some(comment) = sheet.comments.remove(&key) {
            relocated.push((((key.0 as i64 + delta) as u32, key.1), comment));
        }
    }
    for (key, comment) in relocated {
        sheet.comments.insert(key, comment);
    }
}

/// Array regions travel with their rows; regions wholly inside the
/// overwritten window went away with the evicted rows
fn relocate_array_regions(
    sheet: &mut Sheet,
    start: u32,
    end: u32,
    delta: i64,
    dest_first: i64,
    dest_last: i64,
) {
    let mut moved: Vec<CellRange> = Vec::new();
    sheet.array_formulas.retain_mut(|region| {
        let rf = region.first_row();
        let rl = region.last_row();
        if start <= rf && rl <= end {
            *region = CellRange::from_indices(
                (rf as i64 + delta) as u32,
                region.first_col(),
                (rl as i64 + delta) as u32,
                region.last_col(),
            );
            moved.push(*region);
            true
        } else {
            !(dest_first <= rf as i64 && rl as i64 <= dest_last)
        }
    });
    for region in moved {
        for row_num in region.first_row()..=region.last_row() {
            for col in region.first_col()..=region.last_col() {
                if let Some(f) = sheet.cell_mut(row_num, col).and_then(|c| c.formula_mut()) {
                    if matches!(f.kind, FormulaKind::Array { .. }) {
                        f.kind = FormulaKind::Array { range: region };
                    }
                }
            }
        }
    }
}

/// A merged region wholly inside the window travels with it; one that
/// intersects the overwritten rows is destroyed; anything else stays put
fn update_merged_regions(
    sheet: &mut Sheet,
    start: u32,
    end: u32,
    ow_first: u32,
    ow_last: u32,
    delta: i64,
) {
    sheet.merged_regions.retain_mut(|region| {
        if start <= region.first_row() && region.last_row() <= end {
            *region = CellRange::from_indices(
                (region.first_row() as i64 + delta) as u32,
                region.first_col(),
                (region.last_row() as i64 + delta) as u32,
                region.last_col(),
            );
            true
        } else {
            region.last_row() < ow_first || ow_last < region.first_row()
        }
    });
}

fn update_hyperlinks(sheet: &mut Sheet, shift: &RowShift) {
    sheet
        .hyperlinks
        .retain_mut(|link| match shift.shift_range(&link.anchor) {
            Some(anchor) => {
                link.anchor = anchor;
                true
            }
            None => false,
        });
}

/// Rewrite one sheet's formulas, shared-group master texts, and conditional
/// formats for the move; region lists only change on the shifted sheet
fn update_sheet_references(
    sheet: &mut Sheet,
    shift: &RowShift,
    shifted_name: &str,
    on_shifted_sheet: bool,
) {
    for row in sheet.rows.values_mut() {
        for (_, cell) in row.cells_mut() {
            if let Some(f) = cell.formula_mut() {
                if f.text.is_empty() {
                    continue;
                }
                let (text, changed) =
                    shift_formula_rows(&f.text, *shift, shifted_name, on_shifted_sheet);
                if changed {
                    f.text = text;
                }
            }
        }
    }
    for text in sheet.shared_formulas.formulas_mut() {
        let (new_text, changed) = shift_formula_rows(text, *shift, shifted_name, on_shifted_sheet);
        if changed {
            *text = new_text;
        }
    }
    sheet.conditional_formats.retain_mut(|rule| {
        for formula in rule.formulas_mut() {
            let (text, changed) = shift_formula_rows(formula, *shift, shifted_name, on_shifted_sheet);
            if changed {
                *formula = text;
            }
        }
        if !on_shifted_sheet {
            return true;
        }
        let mut kept = Vec::with_capacity(rule.ranges.len());
        for range in &rule.ranges {
            if let Some(shifted) = shift.shift_range(range) {
                kept.push(shifted);
            }
        }
        rule.ranges = kept;
        !rule.ranges.is_empty()
    });
}

fn update_named_ranges(table: &mut NamedRangeTable, shift: &RowShift, shifted_name: &str) {
    for named in table.iter_mut() {
        let (text, changed) = shift_formula_rows(&named.refers_to, *shift, shifted_name, false);
        if changed {
            named.refers_to = text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::Comment;
    use crate::conditional_format::ConditionalFormatRule;
    use crate::hyperlink::{Hyperlink, HyperlinkKind};
    use crate::named_range::NamedRange;
    use crate::ErrorCategory;

    fn range(s: &str) -> CellRange {
        CellRange::parse(s).unwrap()
    }

    fn sheet_with_values(name: &str, rows: &[(u32, f64)]) -> Sheet {
        let mut sheet = Sheet::new(name);
        for &(row, value) in rows {
            sheet.cell_or_create(row, 0).unwrap().set_value(value);
        }
        sheet
    }

    fn value_at(sheet: &Sheet, row: u32) -> Option<f64> {
        sheet.cell(row, 0).map(|c| c.numeric_value().unwrap())
    }

    fn run(sheets: &mut [Sheet], start: u32, end: u32, delta: i64) -> Result<()> {
        let mut names = NamedRangeTable::new();
        shift_rows(sheets, &mut names, 0, start, end, delta, ShiftOptions::default())
    }

    #[test]
    fn test_shift_then_unshift_restores() {
        let mut sheets = vec![sheet_with_values("Data", &[(0, 10.0), (1, 11.0), (2, 12.0)])];
        sheets[0]
            .cell_or_create(0, 1)
            .unwrap()
            .set_formula(Formula::plain("A2*2"));

        run(&mut sheets, 0, 2, 5).unwrap();
        assert_eq!(value_at(&sheets[0], 5), Some(10.0));
        assert_eq!(value_at(&sheets[0], 7), Some(12.0));
        assert!(sheets[0].row(0).is_none());
        assert_eq!(sheets[0].row(5).unwrap().row_num(), 5);
        assert_eq!(
            sheets[0].cell(5, 1).unwrap().formula().unwrap().text,
            "A7*2"
        );

        run(&mut sheets, 5, 7, -5).unwrap();
        assert_eq!(value_at(&sheets[0], 0), Some(10.0));
        assert_eq!(value_at(&sheets[0], 1), Some(11.0));
        assert_eq!(value_at(&sheets[0], 2), Some(12.0));
        assert!(sheets[0].row(5).is_none());
        assert_eq!(
            sheets[0].cell(0, 1).unwrap().formula().unwrap().text,
            "A2*2"
        );
    }

    #[test]
    fn test_preconditions_leave_model_untouched() {
        let mut sheets = vec![sheet_with_values("Data", &[(0, 1.0), (3, 4.0)])];

        let err = run(&mut sheets, 5, 2, 1).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);

        let err = run(&mut sheets, 0, 3, -1).unwrap_err();
        assert!(matches!(err, Error::InvalidShift { reason, .. }
            if reason == "destination row below 0"));

        let err = run(&mut sheets, MAX_ROWS - 2, MAX_ROWS - 1, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidShift { .. }));

        let mut names = NamedRangeTable::new();
        let err =
            shift_rows(&mut sheets, &mut names, 7, 0, 1, 1, ShiftOptions::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Index);

        assert_eq!(value_at(&sheets[0], 0), Some(1.0));
        assert_eq!(value_at(&sheets[0], 3), Some(4.0));
    }

    #[test]
    fn test_delta_zero_is_a_noop() {
        let mut sheets = vec![sheet_with_values("Data", &[(0, 1.0)])];
        run(&mut sheets, 0, 0, 0).unwrap();
        assert_eq!(value_at(&sheets[0], 0), Some(1.0));
    }

    #[test]
    fn test_eviction_clears_overwritten_rows() {
        let mut sheets = vec![sheet_with_values("Data", &[(0, 1.0), (5, 50.0)])];
        sheets[0].set_comment(0, 0, Comment::new("Ana", "moving"));
        sheets[0].set_comment(5, 0, Comment::new("Ben", "doomed"));
        sheets[0].add_hyperlink(Hyperlink::new(
            range("A6"),
            "https://example.com/doomed",
            HyperlinkKind::Url,
        ));

        run(&mut sheets, 0, 0, 5).unwrap();

        assert_eq!(value_at(&sheets[0], 5), Some(1.0));
        assert!(sheets[0].row(0).is_none());
        assert_eq!(sheets[0].comment(5, 0).unwrap().text, "moving");
        assert!(sheets[0].hyperlinks().is_empty());
    }

    #[test]
    fn test_overlapping_window_moves_without_collisions() {
        let rows: Vec<(u32, f64)> = (0..5).map(|n| (n, n as f64)).collect();
        let mut sheets = vec![sheet_with_values("Data", &rows)];

        run(&mut sheets, 0, 4, 2).unwrap();

        assert!(sheets[0].row(0).is_none());
        assert!(sheets[0].row(1).is_none());
        for n in 0..5u32 {
            assert_eq!(value_at(&sheets[0], n + 2), Some(n as f64));
        }
    }

    #[test]
    fn test_heights_reset_unless_copied() {
        let mut sheets = vec![sheet_with_values("Data", &[(2, 1.0)])];
        sheets[0].set_row_height(2, 30.0).unwrap();
        run(&mut sheets, 2, 2, 3).unwrap();
        assert_eq!(sheets[0].row_height(5), 30.0);

        let mut sheets = vec![sheet_with_values("Data", &[(2, 1.0)])];
        sheets[0].set_row_height(2, 30.0).unwrap();
        let mut names = NamedRangeTable::new();
        let options = ShiftOptions {
            copy_height: false,
            reset_height: false,
        };
        shift_rows(&mut sheets, &mut names, 0, 2, 2, 3, options).unwrap();
        assert_eq!(sheets[0].row_height(5), crate::row::DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn test_formulas_rewritten_on_every_sheet() {
        let mut data = sheet_with_values("Data", &[(5, 9.0)]);
        data.cell_or_create(10, 1)
            .unwrap()
            .set_formula(Formula::plain("A1+A6"));
        let mut summary = Sheet::new("Summary");
        summary
            .cell_or_create(0, 0)
            .unwrap()
            .set_formula(Formula::plain("Data!A6*2"));
        summary
            .cell_or_create(1, 0)
            .unwrap()
            .set_formula(Formula::plain("A6+1"));
        let mut sheets = vec![data, summary];

        run(&mut sheets, 5, 5, 3).unwrap();

        assert_eq!(
            sheets[0].cell(10, 1).unwrap().formula().unwrap().text,
            "A1+A9"
        );
        assert_eq!(
            sheets[1].cell(0, 0).unwrap().formula().unwrap().text,
            "Data!A9*2"
        );
        // unqualified references on another sheet stay put
        assert_eq!(
            sheets[1].cell(1, 0).unwrap().formula().unwrap().text,
            "A6+1"
        );
    }

    #[test]
    fn test_named_ranges_follow_qualified_references() {
        let mut sheets = vec![sheet_with_values("Data", &[(5, 9.0)])];
        let mut names = NamedRangeTable::new();
        names
            .define(NamedRange::workbook_scope("Target", "Data!$A$6"))
            .unwrap();
        names
            .define(NamedRange::workbook_scope("Rate", "0.05"))
            .unwrap();

        shift_rows(&mut sheets, &mut names, 0, 5, 5, 3, ShiftOptions::default()).unwrap();

        assert_eq!(names.get("Target", 0).unwrap().refers_to, "Data!$A$9");
        assert_eq!(names.get("Rate", 0).unwrap().refers_to, "0.05");
    }

    #[test]
    fn test_merged_regions_travel_or_drop() {
        let mut sheets = vec![sheet_with_values("Data", &[(5, 1.0)])];
        sheets[0].add_merged_region(range("B6:C7")).unwrap();
        sheets[0].add_merged_region(range("A10:B11")).unwrap();
        sheets[0].add_merged_region(range("E1:F2")).unwrap();

        run(&mut sheets, 5, 6, 4).unwrap();

        assert_eq!(sheets[0].merged_regions(), [range("B10:C11"), range("E1:F2")]);
    }

    #[test]
    fn test_array_region_travels_with_its_rows() {
        let mut sheets = vec![Sheet::new("Data")];
        sheets[0].set_array_formula(range("B6:B7"), "A1*2").unwrap();

        run(&mut sheets, 5, 6, 3).unwrap();

        assert_eq!(sheets[0].array_formula_ranges(), [range("B9:B10")]);
        let master = sheets[0].cell(8, 1).unwrap().formula().unwrap();
        assert_eq!(master.text, "A1*2");
        assert_eq!(master.array_range(), Some(range("B9:B10")));
        let member = sheets[0].cell(9, 1).unwrap().formula().unwrap();
        assert_eq!(member.array_range(), Some(range("B9:B10")));
    }

    #[test]
    fn test_shift_rejects_cutting_array_formulas() {
        let mut sheets = vec![Sheet::new("Data")];
        sheets[0].set_array_formula(range("B6:B7"), "A1*2").unwrap();

        let err = run(&mut sheets, 5, 5, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidShift { reason, .. }
            if reason == "window splits an array formula"));

        let mut sheets = vec![sheet_with_values("Data", &[(0, 1.0)])];
        sheets[0].set_array_formula(range("B11:B12"), "A1*2").unwrap();
        let err = run(&mut sheets, 0, 0, 10).unwrap_err();
        assert!(matches!(err, Error::InvalidShift { reason, .. }
            if reason == "destination clips an array formula"));
    }

    #[test]
    fn test_destination_covering_whole_array_evicts_it() {
        let mut sheets = vec![sheet_with_values("Data", &[(0, 1.0), (1, 2.0)])];
        sheets[0].set_array_formula(range("B11:B12"), "A1*2").unwrap();

        run(&mut sheets, 0, 1, 10).unwrap();

        assert!(sheets[0].array_formula_ranges().is_empty());
        assert_eq!(value_at(&sheets[0], 10), Some(1.0));
        assert_eq!(value_at(&sheets[0], 11), Some(2.0));
    }

    #[test]
    fn test_shared_groups_dissolve_to_plain_text() {
        let mut sheets = vec![Sheet::new("Data")];
        let sheet = &mut sheets[0];
        sheet.shared_formulas_mut().register_master(
            3,
            CellAddress::parse("B1").unwrap(),
            range("B1:B3"),
            "A1*2",
        );
        sheet
            .cell_or_create(0, 1)
            .unwrap()
            .set_formula(Formula::shared(3, "A1*2"));
        sheet
            .cell_or_create(1, 1)
            .unwrap()
            .set_formula(Formula::shared(3, ""));
        sheet
            .cell_or_create(2, 1)
            .unwrap()
            .set_formula(Formula::shared(3, ""));

        run(&mut sheets, 1, 1, 5).unwrap();

        let sheet = &sheets[0];
        assert!(sheet.shared_formulas().is_empty());
        let master = sheet.cell(0, 1).unwrap().formula().unwrap();
        assert_eq!((master.kind, master.text.as_str()), (FormulaKind::Plain, "A1*2"));
        // the member moved to row 6 keeps tracking its own row's data
        let moved = sheet.cell(6, 1).unwrap().formula().unwrap();
        assert_eq!((moved.kind, moved.text.as_str()), (FormulaKind::Plain, "A7*2"));
        let stayed = sheet.cell(2, 1).unwrap().formula().unwrap();
        assert_eq!((stayed.kind, stayed.text.as_str()), (FormulaKind::Plain, "A3*2"));
    }

    #[test]
    fn test_conditional_formats_follow_and_collapse() {
        let mut sheets = vec![Sheet::new("Data")];
        sheets[0].add_conditional_format(
            ConditionalFormatRule::expression("A6>10").with_range(range("A6:A8")),
        );
        sheets[0].add_conditional_format(
            ConditionalFormatRule::cell_is_greater_than("5").with_range(range("A9")),
        );

        run(&mut sheets, 5, 7, 2).unwrap();

        // the rule whose only range sat in the overwritten window is gone
        let rules = sheets[0].conditional_formats();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].ranges, [range("A8:A10")]);
        assert_eq!(rules[0].formulas().collect::<Vec<_>>(), ["A8>10"]);
    }

    #[test]
    fn test_hyperlinks_move_and_drop() {
        let mut sheets = vec![Sheet::new("Data")];
        sheets[0].add_hyperlink(Hyperlink::new(
            range("A6:A7"),
            "https://example.com/a",
            HyperlinkKind::Url,
        ));
        sheets[0].add_hyperlink(Hyperlink::new(
            range("A8"),
            "https://example.com/b",
            HyperlinkKind::Url,
        ));

        run(&mut sheets, 5, 6, 2).unwrap();

        let links = sheets[0].hyperlinks();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].anchor, range("A8:A9"));
        assert_eq!(links[0].target, "https://example.com/a");
    }
}
