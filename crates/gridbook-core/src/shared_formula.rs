//! Shared formula groups
//!
//! A shared formula stores its text once, on a master cell, and every other
//! member of the group derives its own text by offsetting the master's
//! relative references. The resolver keeps the per-group records and hands
//! out translated text on demand.

use ahash::AHashMap;

use crate::address::{CellAddress, CellRange};
use crate::error::{Error, Result};
use crate::formula::translate_formula;

/// One registered shared formula group
#[derive(Debug, Clone)]
struct SharedGroup {
    master: CellAddress,
    declared: CellRange,
    formula: String,
    /// Declared range with its start clipped to the master, computed lazily
    effective: Option<CellRange>,
}

/// Registry of shared formula groups for one sheet
#[derive(Debug, Clone, Default)]
pub struct SharedFormulaResolver {
    groups: AHashMap<u32, SharedGroup>,
}

impl SharedFormulaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a group's master cell, declared range, and formula text
    ///
    /// Re-registering an existing id replaces the record.
    pub fn register_master(
        &mut self,
        group: u32,
        master: CellAddress,
        declared: CellRange,
        formula: impl Into<String>,
    ) {
        let record = SharedGroup {
            master,
            declared,
            formula: formula.into(),
            effective: None,
        };
        if self.groups.insert(group, record).is_some() {
            log::debug!("shared formula group {group} re-registered, replacing master");
        }
    }

    /// Forget a group
    pub fn remove(&mut self, group: u32) -> bool {
        self.groups.remove(&group).is_some()
    }

    pub fn contains(&self, group: u32) -> bool {
        self.groups.contains_key(&group)
    }

    /// The group's master cell address
    pub fn master(&self, group: u32) -> Result<CellAddress> {
        Ok(self.group(group)?.master)
    }

    /// The group's master formula text, untranslated
    pub fn master_formula(&self, group: u32) -> Result<&str> {
        Ok(self.group(group)?.formula.as_str())
    }

    /// The range the group actually covers
    ///
    /// Files in the wild sometimes declare a range whose corner lies above or
    /// left of the master cell; the start is clipped to the master on each
    /// axis. The end is never clipped, matching how such files behave when
    /// opened.
    pub fn effective_range(&mut self, group: u32) -> Result<CellRange> {
        let rec = self
            .groups
            .get_mut(&group)
            .ok_or(Error::UnknownSharedGroup(group))?;
        if let Some(cached) = rec.effective {
            return Ok(cached);
        }
        let declared = rec.declared;
        let master = rec.master;
        let clipped = CellRange {
            start: CellAddress::new(
                declared.start.row.max(master.row),
                declared.start.col.max(master.col),
            ),
            end: declared.end,
        };
        rec.effective = Some(clipped);
        Ok(clipped)
    }

    /// The formula text for a member cell, translated from the master
    pub fn formula_for(&mut self, group: u32, addr: CellAddress) -> Result<String> {
        let range = self.effective_range(group)?;
        if !range.contains(addr) {
            return Err(Error::OutsideSharedRange {
                group,
                addr: addr.to_a1(),
            });
        }
        let rec = &self.groups[&group];
        let d_row = addr.row as i64 - rec.master.row as i64;
        let d_col = addr.col as i64 - rec.master.col as i64;
        if d_row == 0 && d_col == 0 {
            return Ok(rec.formula.clone());
        }
        let (text, _) = translate_formula(&rec.formula, d_row, d_col);
        Ok(text)
    }

    pub fn group_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    /// Groups whose declared range or master cell touches rows
    /// `first..=last`, used by the row shifter to decide which groups to
    /// dissolve before a move
    pub(crate) fn groups_touching_rows(&self, first: u32, last: u32) -> Vec<u32> {
        self.groups
            .iter()
            .filter(|(_, rec)| {
                (rec.declared.first_row() <= last && first <= rec.declared.last_row())
                    || (first <= rec.master.row && rec.master.row <= last)
            })
            .map(|(&id, _)| id)
            .collect()
    }

    /// Mutable access to the master formula texts, for reference rewriting
    pub(crate) fn formulas_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.groups.values_mut().map(|rec| &mut rec.formula)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn group(&self, group: u32) -> Result<&SharedGroup> {
        self.groups.get(&group).ok_or(Error::UnknownSharedGroup(group))
    }
}
