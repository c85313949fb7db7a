//! Defined names
//!
//! A defined name binds an identifier to a reference expression, scoped
//! either to the whole workbook or to one sheet. Lookup follows the usual
//! precedence: the current sheet's scope first, then the workbook scope.
//! Names are case-insensitive.

use ahash::AHashMap;

use crate::address::CellAddress;
use crate::error::{Error, Result};

/// Scope of a defined name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameScope {
    /// Available throughout the workbook
    Workbook,
    /// Scoped to the sheet at this index
    Sheet(usize),
}

/// A defined name
///
/// `refers_to` is a reference expression kept as text:
/// `Sheet1!$A$1`, `Sheet1!$A$1:$D$10`, a constant like `0.0725`, or a
/// formula starting with `=`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedRange {
    pub name: String,
    pub scope: NameScope,
    pub refers_to: String,
    /// Optional description
    pub comment: Option<String>,
    /// Hidden from the UI name list
    pub hidden: bool,
}

impl NamedRange {
    pub fn new(name: impl Into<String>, refers_to: impl Into<String>, scope: NameScope) -> Self {
        Self {
            name: name.into(),
            scope,
            refers_to: refers_to.into(),
            comment: None,
            hidden: false,
        }
    }

    /// Create a workbook-scoped name
    pub fn workbook_scope(name: impl Into<String>, refers_to: impl Into<String>) -> Self {
        Self::new(name, refers_to, NameScope::Workbook)
    }

    /// Create a sheet-scoped name
    pub fn sheet_scope(
        name: impl Into<String>,
        refers_to: impl Into<String>,
        sheet_index: usize,
    ) -> Self {
        Self::new(name, refers_to, NameScope::Sheet(sheet_index))
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether `refers_to` is a formula (starts with `=`)
    pub fn is_formula(&self) -> bool {
        self.refers_to.starts_with('=')
    }

    /// The `refers_to` expression without a leading `=`
    pub fn expression(&self) -> &str {
        self.refers_to.strip_prefix('=').unwrap_or(&self.refers_to)
    }
}

/// Check that `name` is usable as a defined name
///
/// Rules: non-empty, starts with a letter, underscore, or backslash,
/// continues with letters, digits, `_`, `.`, `\`, or `?`, and does not
/// parse as a plain cell reference.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '\\' => {}
        _ => return Err(Error::InvalidName(name.to_string())),
    }
    for c in chars {
        if !(c.is_alphanumeric() || c == '_' || c == '.' || c == '\\' || c == '?') {
            return Err(Error::InvalidName(name.to_string()));
        }
    }
    if CellAddress::parse(name).is_ok() {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// The workbook's defined names, keyed for case-insensitive lookup
#[derive(Debug, Clone, Default)]
pub struct NamedRangeTable {
    names: AHashMap<(String, Option<usize>), NamedRange>,
}

impl NamedRangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str, scope: NameScope) -> (String, Option<usize>) {
        let idx = match scope {
            NameScope::Workbook => None,
            NameScope::Sheet(idx) => Some(idx),
        };
        (name.to_lowercase(), idx)
    }

    /// Define a new name
    ///
    /// Fails on invalid syntax or when the name already exists in the same
    /// scope (any letter case).
    pub fn define(&mut self, range: NamedRange) -> Result<()> {
        validate_name(&range.name)?;
        let key = Self::key(&range.name, range.scope);
        if self.names.contains_key(&key) {
            return Err(Error::DuplicateName(range.name));
        }
        self.names.insert(key, range);
        Ok(())
    }

    /// Define a name, replacing an existing one in the same scope
    pub fn define_or_update(&mut self, range: NamedRange) -> Result<()> {
        validate_name(&range.name)?;
        self.names.insert(Self::key(&range.name, range.scope), range);
        Ok(())
    }

    /// Resolve a name from a sheet's point of view
    ///
    /// The sheet's own scope wins over the workbook scope.
    pub fn get(&self, name: &str, current_sheet: usize) -> Option<&NamedRange> {
        self.names
            .get(&Self::key(name, NameScope::Sheet(current_sheet)))
            .or_else(|| self.names.get(&Self::key(name, NameScope::Workbook)))
    }

    /// Look a name up in one exact scope
    pub fn get_exact(&self, name: &str, scope: NameScope) -> Option<&NamedRange> {
        self.names.get(&Self::key(name, scope))
    }

    pub fn remove(&mut self, name: &str, scope: NameScope) -> Option<NamedRange> {
        self.names.remove(&Self::key(name, scope))
    }

    pub fn contains(&self, name: &str, scope: NameScope) -> bool {
        self.names.contains_key(&Self::key(name, scope))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedRange> {
        self.names.values()
    }

    /// Mutable iteration, used by the row shifter to rewrite references
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NamedRange> {
        self.names.values_mut()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names scoped to one sheet
    pub fn sheet_names(&self, sheet_index: usize) -> impl Iterator<Item = &NamedRange> {
        self.names
            .values()
            .filter(move |r| r.scope == NameScope::Sheet(sheet_index))
    }

    /// Drop names scoped to a removed sheet and renumber later scopes
    pub(crate) fn remove_sheet(&mut self, sheet_index: usize) {
        let old = std::mem::take(&mut self.names);
        for (_, mut range) in old {
            match range.scope {
                NameScope::Sheet(idx) if idx == sheet_index => continue,
                NameScope::Sheet(idx) if idx > sheet_index => {
                    range.scope = NameScope::Sheet(idx - 1);
                }
                _ => {}
            }
            self.names
                .insert(Self::key(&range.name, range.scope), range);
        }
    }
}
