//! Row and column outline grouping
//!
//! Outline state lives on the row and column records themselves: a level
//! (0..=7), a hidden flag, and a collapsed flag carried by the sentinel
//! record immediately after a group. A run of grouped records is delimited
//! by index contiguity of *existing* records, so a gap breaks the run. One
//! engine implements the grouping and collapse walks for both axes through
//! a small store trait.

use std::collections::BTreeMap;

use crate::column::ColumnRecord;
use crate::row::Row;
use crate::{MAX_COLS, MAX_ROWS};

/// The deepest outline level a record can carry
pub const MAX_OUTLINE_LEVEL: u8 = 7;

/// Axis storage as the outline engine sees it
///
/// Indices address records that may or may not exist; `level`, `hidden`,
/// and `collapsed` return None for absent records.
pub(crate) trait OutlineStore {
    /// Largest index a record may occupy
    fn max_index(&self) -> u32;
    fn level(&self, index: u32) -> Option<u8>;
    fn hidden(&self, index: u32) -> Option<bool>;
    fn collapsed(&self, index: u32) -> Option<bool>;
    /// Set the level, creating the record if absent
    fn set_level(&mut self, index: u32, level: u8);
    /// Set the hidden flag on an existing record
    fn set_hidden(&mut self, index: u32, hidden: bool);
    /// Set the collapsed flag, creating the record if absent
    fn set_collapsed(&mut self, index: u32, collapsed: bool);
    /// Drop the record if it is level 0 with no other content
    fn prune_if_bare(&mut self, index: u32);
}

// === Engine ===

/// Raise the outline level of every record in `from..=to` by one,
/// creating missing records. Level saturates at [`MAX_OUTLINE_LEVEL`].
pub(crate) fn group(store: &mut impl OutlineStore, from: u32, to: u32) {
    for i in from..=to {
        let level = store.level(i).unwrap_or(0);
        store.set_level(i, (level + 1).min(MAX_OUTLINE_LEVEL));
    }
}

/// Lower the outline level of every existing record in `from..=to` by one,
/// pruning records left bare at level 0
pub(crate) fn ungroup(store: &mut impl OutlineStore, from: u32, to: u32) {
    for i in from..=to {
        if let Some(level) = store.level(i) {
            store.set_level(i, level.saturating_sub(1));
            store.prune_if_bare(i);
        }
    }
}

/// First index of the run of contiguous records at `index`'s level or deeper
fn find_run_start(store: &impl OutlineStore, index: u32, level: u8) -> u32 {
    let mut i = index;
    while i > 0 {
        match store.level(i - 1) {
            Some(prev) if prev >= level => i -= 1,
            _ => break,
        }
    }
    i
}

/// Last index of the run, inclusive
fn find_run_end(store: &impl OutlineStore, index: u32, level: u8) -> u32 {
    let mut i = index;
    while i < store.max_index() {
        match store.level(i + 1) {
            Some(next) if next >= level => i += 1,
            _ => break,
        }
    }
    i
}

/// Whether the group whose run ends at `run_end` is marked collapsed on
/// its sentinel
fn is_group_collapsed(store: &impl OutlineStore, run_end: u32) -> bool {
    store.collapsed(run_end + 1).unwrap_or(false)
}

/// Whether the run sits inside a still-hidden enclosing group
///
/// The neighbors just outside the run speak for the enclosing group; the
/// deeper-leveled side is the one that encloses.
fn hidden_by_parent(store: &impl OutlineStore, start: u32, end: u32) -> bool {
    let (end_level, end_hidden) = match (store.level(end + 1), store.hidden(end + 1)) {
        (Some(level), Some(hidden)) => (level, hidden),
        _ => (0, false),
    };
    let (start_level, start_hidden) = if start == 0 {
        (0, false)
    } else {
        match (store.level(start - 1), store.hidden(start - 1)) {
            (Some(level), Some(hidden)) => (level, hidden),
            _ => (0, false),
        }
    };
    if end_level > start_level {
        end_hidden
    } else {
        start_hidden
    }
}

fn collapse(store: &mut impl OutlineStore, index: u32) {
    let level = match store.level(index) {
        Some(level) => level,
        None => return,
    };
    let start = find_run_start(store, index, level);
    let end = find_run_end(store, index, level);
    for i in start..=end {
        store.set_hidden(i, true);
    }
    if end < store.max_index() {
        store.set_collapsed(end + 1, true);
    }
}

fn expand(store: &mut impl OutlineStore, index: u32) {
    let level = match store.level(index) {
        Some(level) => level,
        None => return,
    };
    if store.hidden(index) != Some(true) {
        return;
    }
    let start = find_run_start(store, index, level);
    let end = find_run_end(store, index, level);
    if !hidden_by_parent(store, start, end) {
        for i in start..=end {
            if store.level(i) == Some(level) {
                store.set_hidden(i, false);
            } else {
                // deeper member: leave it hidden when its own sub-group
                // is collapsed
                let sub_end = find_run_end(store, i, store.level(i).unwrap_or(level));
                if !is_group_collapsed(store, sub_end) {
                    store.set_hidden(i, false);
                }
            }
        }
    }
    if end < store.max_index() && store.collapsed(end + 1).is_some() {
        store.set_collapsed(end + 1, false);
    }
}

/// Collapse or expand the group containing `index`
pub(crate) fn set_group_collapsed(store: &mut impl OutlineStore, index: u32, collapsed: bool) {
    if collapsed {
        collapse(store, index);
    } else {
        expand(store, index);
    }
}

// === Axis stores ===

/// Row axis adapter over a sheet's row collection
pub(crate) struct RowOutline<'a>(pub &'a mut BTreeMap<u32, Row>);

impl OutlineStore for RowOutline<'_> {
    fn max_index(&self) -> u32 {
        MAX_ROWS - 1
    }

    fn level(&self, index: u32) -> Option<u8> {
        self.0.get(&index).map(|r| r.outline_level)
    }

    fn hidden(&self, index: u32) -> Option<bool> {
        self.0.get(&index).map(|r| r.hidden)
    }

    fn collapsed(&self, index: u32) -> Option<bool> {
        self.0.get(&index).map(|r| r.collapsed)
    }

    fn set_level(&mut self, index: u32, level: u8) {
        self.0.entry(index).or_insert_with(|| Row::new(index)).outline_level = level;
    }

    fn set_hidden(&mut self, index: u32, hidden: bool) {
        if let Some(row) = self.0.get_mut(&index) {
            row.hidden = hidden;
        }
    }

    fn set_collapsed(&mut self, index: u32, collapsed: bool) {
        self.0.entry(index).or_insert_with(|| Row::new(index)).collapsed = collapsed;
    }

    fn prune_if_bare(&mut self, index: u32) {
        if let Some(row) = self.0.get(&index) {
            if row.is_empty() && !row.has_custom_settings() {
                self.0.remove(&index);
            }
        }
    }
}

/// Column axis adapter over a sheet's column records
pub(crate) struct ColumnOutline<'a>(pub &'a mut BTreeMap<u16, ColumnRecord>);

impl OutlineStore for ColumnOutline<'_> {
    fn max_index(&self) -> u32 {
        MAX_COLS as u32 - 1
    }

    fn level(&self, index: u32) -> Option<u8> {
        self.0.get(&(index as u16)).map(|c| c.outline_level)
    }

    fn hidden(&self, index: u32) -> Option<bool> {
        self.0.get(&(index as u16)).map(|c| c.hidden)
    }

    fn collapsed(&self, index: u32) -> Option<bool> {
        self.0.get(&(index as u16)).map(|c| c.collapsed)
    }

    fn set_level(&mut self, index: u32, level: u8) {
        self.0.entry(index as u16).or_default().outline_level = level;
    }

    fn set_hidden(&mut self, index: u32, hidden: bool) {
        if let Some(col) = self.0.get_mut(&(index as u16)) {
            col.hidden = hidden;
        }
    }

    fn set_collapsed(&mut self, index: u32, collapsed: bool) {
        self.0.entry(index as u16).or_default().collapsed = collapsed;
    }

    fn prune_if_bare(&mut self, index: u32) {
        if let Some(col) = self.0.get(&(index as u16)) {
            if !col.has_custom_settings() {
                self.0.remove(&(index as u16));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_with_levels(levels: &[(u32, u8)]) -> BTreeMap<u32, Row> {
        let mut rows = BTreeMap::new();
        for &(index, level) in levels {
            let mut row = Row::new(index);
            row.outline_level = level;
            rows.insert(index, row);
        }
        rows
    }

    #[test]
    fn test_group_creates_rows_and_increments() {
        let mut rows = BTreeMap::new();
        group(&mut RowOutline(&mut rows), 2, 4);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[&2].outline_level, 1);
        assert_eq!(rows[&3].row_num(), 3);

        group(&mut RowOutline(&mut rows), 3, 3);
        assert_eq!(rows[&3].outline_level, 2);
        assert_eq!(rows[&2].outline_level, 1);
    }

    #[test]
    fn test_group_saturates_at_max_level() {
        let mut rows = BTreeMap::new();
        for _ in 0..10 {
            group(&mut RowOutline(&mut rows), 0, 0);
        }
        assert_eq!(rows[&0].outline_level, MAX_OUTLINE_LEVEL);
    }

    #[test]
    fn test_ungroup_prunes_bare_rows() {
        let mut rows = BTreeMap::new();
        group(&mut RowOutline(&mut rows), 1, 3);
        rows.get_mut(&2).unwrap().height = Some(30.0);

        ungroup(&mut RowOutline(&mut rows), 1, 3);

        // rows 1 and 3 are bare at level 0 and get dropped, row 2 keeps
        // its height
        assert!(!rows.contains_key(&1));
        assert!(!rows.contains_key(&3));
        assert_eq!(rows[&2].outline_level, 0);
        assert_eq!(rows[&2].height, Some(30.0));
    }

    #[test]
    fn test_collapse_hides_run_and_marks_sentinel() {
        let mut rows = rows_with_levels(&[(0, 0), (1, 0), (2, 1), (3, 1), (4, 1), (5, 0)]);
        set_group_collapsed(&mut RowOutline(&mut rows), 3, true);

        assert!(!rows[&1].hidden);
        assert!(rows[&2].hidden);
        assert!(rows[&3].hidden);
        assert!(rows[&4].hidden);
        assert!(rows[&5].collapsed);
        assert!(!rows[&5].hidden);
    }

    #[test]
    fn test_collapse_creates_missing_sentinel() {
        let mut rows = rows_with_levels(&[(2, 1), (3, 1)]);
        set_group_collapsed(&mut RowOutline(&mut rows), 2, true);

        assert!(rows[&2].hidden);
        assert!(rows[&3].hidden);
        let sentinel = &rows[&4];
        assert!(sentinel.collapsed);
        assert_eq!(sentinel.outline_level, 0);
    }

    #[test]
    fn test_gap_bounds_the_run() {
        // rows 2..=3 and 5..=6 hold separate level-1 groups split by the
        // missing row 4
        let mut rows = rows_with_levels(&[(2, 1), (3, 1), (5, 1), (6, 1)]);
        set_group_collapsed(&mut RowOutline(&mut rows), 2, true);

        assert!(rows[&2].hidden);
        assert!(rows[&3].hidden);
        assert!(rows[&4].collapsed);
        assert!(!rows[&5].hidden);
        assert!(!rows[&6].hidden);
    }

    #[test]
    fn test_expand_restores_hidden_and_sentinel() {
        let mut rows = rows_with_levels(&[(1, 0), (2, 1), (3, 1), (4, 0)]);
        set_group_collapsed(&mut RowOutline(&mut rows), 2, true);
        assert!(rows[&2].hidden && rows[&3].hidden && rows[&4].collapsed);

        set_group_collapsed(&mut RowOutline(&mut rows), 2, false);
        assert!(!rows[&2].hidden);
        assert!(!rows[&3].hidden);
        assert!(!rows[&4].collapsed);
    }

    #[test]
    fn test_expand_leaves_collapsed_subgroup_hidden() {
        // outer level-1 group over rows 1..=6 with an inner level-2 group
        // at rows 3..=4, inner collapsed first, then the whole thing
        let mut rows = rows_with_levels(&[
            (1, 1),
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 1),
            (6, 1),
            (7, 0),
        ]);
        set_group_collapsed(&mut RowOutline(&mut rows), 3, true);
        assert!(rows[&5].collapsed);
        set_group_collapsed(&mut RowOutline(&mut rows), 1, true);

        set_group_collapsed(&mut RowOutline(&mut rows), 1, false);

        assert!(!rows[&1].hidden);
        assert!(!rows[&2].hidden);
        assert!(rows[&3].hidden);
        assert!(rows[&4].hidden);
        assert!(!rows[&5].hidden);
        assert!(rows[&5].collapsed);
        assert!(!rows[&7].collapsed);
    }

    #[test]
    fn test_expand_inside_collapsed_parent_stays_hidden() {
        let mut rows = rows_with_levels(&[
            (1, 1),
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 1),
            (6, 0),
        ]);
        set_group_collapsed(&mut RowOutline(&mut rows), 3, true);
        set_group_collapsed(&mut RowOutline(&mut rows), 1, true);

        // expanding the inner group clears its sentinel but cannot unhide
        // rows the collapsed parent is holding down
        set_group_collapsed(&mut RowOutline(&mut rows), 3, false);

        assert!(rows[&3].hidden);
        assert!(rows[&4].hidden);
        assert!(!rows[&5].collapsed);
    }

    #[test]
    fn test_column_axis_uses_same_engine() {
        let mut cols = BTreeMap::new();
        group(&mut ColumnOutline(&mut cols), 0, 2);
        group(&mut ColumnOutline(&mut cols), 1, 1);
        assert_eq!(cols[&1].outline_level, 2);

        set_group_collapsed(&mut ColumnOutline(&mut cols), 0, true);
        assert!(cols[&0].hidden);
        assert!(cols[&2].hidden);
        assert!(cols[&3].collapsed);

        ungroup(&mut ColumnOutline(&mut cols), 0, 2);
        ungroup(&mut ColumnOutline(&mut cols), 1, 1);
        // level drops to zero but hidden flags keep the records alive
        assert!(cols.contains_key(&0));
        assert_eq!(cols[&1].outline_level, 0);
    }
}
