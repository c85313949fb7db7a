//! Formula reference scanning and rewriting
//!
//! Formulas are stored as text. A single-pass scanner recognizes cell
//! references, rectangular areas, row spans, and column spans, each with an
//! optional sheet qualifier, while leaving string literals, function names,
//! numbers, and plain identifiers untouched. Row shifting and shared-formula
//! translation are both expressed as rewrites over the scanner's tokens.

use crate::address::{column_to_letters, letters_to_column, CellAddress, CellRange};
use crate::{MAX_COLS, MAX_ROWS};

/// The error literal written when a reference collapses
pub const REF_ERROR: &str = "#REF!";

// === Tokens ===

/// A reference recognized in formula text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefToken {
    /// Single cell reference (`B7`, `$C$2`)
    Cell(CellAddress),
    /// Rectangular area (`A1:B10`), normalized so start is top-left
    Area(CellAddress, CellAddress),
    /// Whole-row span (`3:7`), 0-based rows
    Rows {
        first: u32,
        last: u32,
        abs_first: bool,
        abs_last: bool,
    },
    /// Whole-column span (`A:C`), 0-based columns
    Cols {
        first: u16,
        last: u16,
        abs_first: bool,
        abs_last: bool,
    },
}

impl RefToken {
    fn write(&self, out: &mut String) {
        match *self {
            RefToken::Cell(a) => out.push_str(&a.to_a1()),
            RefToken::Area(s, e) => {
                out.push_str(&s.to_a1());
                out.push(':');
                out.push_str(&e.to_a1());
            }
            RefToken::Rows {
                first,
                last,
                abs_first,
                abs_last,
            } => {
                if abs_first {
                    out.push('$');
                }
                out.push_str(&(first + 1).to_string());
                out.push(':');
                if abs_last {
                    out.push('$');
                }
                out.push_str(&(last + 1).to_string());
            }
            RefToken::Cols {
                first,
                last,
                abs_first,
                abs_last,
            } => {
                if abs_first {
                    out.push('$');
                }
                out.push_str(&column_to_letters(first));
                out.push(':');
                if abs_last {
                    out.push('$');
                }
                out.push_str(&column_to_letters(last));
            }
        }
    }
}

/// What to do with a recognized reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefAction {
    /// Leave the reference as written
    Keep,
    /// Replace it with a rewritten reference
    Replace(RefToken),
    /// Replace it with the `#REF!` error literal
    Error,
}

// === Scanner ===

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Bytes consumed by the double-quoted string literal at the head of `s`
fn scan_string_literal(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    s.len()
}

/// Bytes consumed by the single-quoted name at the head of `s`, or None if
/// the quote never closes
fn scan_quoted_name(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

fn unquote_sheet(raw: &str) -> String {
    raw[1..raw.len() - 1].replace("''", "'")
}

/// Bytes in the identifier/number run at the head of `s`
fn scan_word(s: &str) -> usize {
    s.char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(s.len(), |(i, _)| i)
}

/// `$`? + letters at the head; no boundary check
fn match_column(s: &str) -> Option<(usize, u16, bool)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let abs = bytes.first() == Some(&b'$');
    if abs {
        i += 1;
    }
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    if i == start {
        return None;
    }
    let col = letters_to_column(&s[start..i]).ok()?;
    Some((i, col, abs))
}

/// `$`? + digits at the head; 1-based in text, 0-based out
fn match_row(s: &str) -> Option<(usize, u32, bool)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let abs = bytes.first() == Some(&b'$');
    if abs {
        i += 1;
    }
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return None;
    }
    let n: u64 = s[start..i].parse().ok()?;
    if n == 0 || n > MAX_ROWS as u64 {
        return None;
    }
    Some((i, (n - 1) as u32, abs))
}

/// True when the text after a candidate cannot extend it into an
/// identifier, a function call, or a sheet qualifier
fn is_reference_end(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) => !(is_word_char(c) || c == '(' || c == '!'),
    }
}

/// A full cell reference at the head of `s`, with the boundary rule applied
fn match_cell(s: &str) -> Option<(usize, CellAddress)> {
    let (col_len, col, abs_col) = match_column(s)?;
    let (row_len, row, abs_row) = match_row(&s[col_len..])?;
    let len = col_len + row_len;
    if is_reference_end(&s[len..]) {
        Some((len, CellAddress::with_flags(row, col, abs_row, abs_col)))
    } else {
        None
    }
}

/// Build an area token normalized per axis, `$` flags traveling with their
/// coordinates
fn area(a: CellAddress, b: CellAddress) -> RefToken {
    let (top, abs_top, bottom, abs_bottom) = if a.row <= b.row {
        (a.row, a.abs_row, b.row, b.abs_row)
    } else {
        (b.row, b.abs_row, a.row, a.abs_row)
    };
    let (left, abs_left, right, abs_right) = if a.col <= b.col {
        (a.col, a.abs_col, b.col, b.abs_col)
    } else {
        (b.col, b.abs_col, a.col, a.abs_col)
    };
    RefToken::Area(
        CellAddress::with_flags(top, left, abs_top, abs_left),
        CellAddress::with_flags(bottom, right, abs_bottom, abs_right),
    )
}

/// Cell, area, row-span, or column-span token at the head of `s`
fn match_reference(s: &str) -> Option<(usize, RefToken)> {
    if let Some((len1, start)) = match_cell(s) {
        if let Some(rest) = s[len1..].strip_prefix(':') {
            if let Some((len2, end)) = match_cell(rest) {
                return Some((len1 + 1 + len2, area(start, end)));
            }
        }
        return Some((len1, RefToken::Cell(start)));
    }
    if let Some((len1, first, abs_first)) = match_row(s) {
        let after = s[len1..].strip_prefix(':')?;
        let (len2, last, abs_last) = match_row(after)?;
        let total = len1 + 1 + len2;
        if !is_reference_end(&s[total..]) {
            return None;
        }
        let (first, abs_first, last, abs_last) = if first <= last {
            (first, abs_first, last, abs_last)
        } else {
            (last, abs_last, first, abs_first)
        };
        return Some((
            total,
            RefToken::Rows {
                first,
                last,
                abs_first,
                abs_last,
            },
        ));
    }
    if let Some((len1, first, abs_first)) = match_column(s) {
        let after = s[len1..].strip_prefix(':')?;
        let (len2, last, abs_last) = match_column(after)?;
        let total = len1 + 1 + len2;
        if !is_reference_end(&s[total..]) {
            return None;
        }
        let (first, abs_first, last, abs_last) = if first <= last {
            (first, abs_first, last, abs_last)
        } else {
            (last, abs_last, first, abs_first)
        };
        return Some((
            total,
            RefToken::Cols {
                first,
                last,
                abs_first,
                abs_last,
            },
        ));
    }
    None
}

fn emit<F>(
    out: &mut String,
    changed: &mut bool,
    raw: &str,
    ref_start: usize,
    sheet: Option<&str>,
    token: &RefToken,
    apply: &mut F,
) where
    F: FnMut(Option<&str>, &RefToken) -> RefAction,
{
    match apply(sheet, token) {
        RefAction::Keep => out.push_str(raw),
        RefAction::Replace(new_token) => {
            out.push_str(&raw[..ref_start]);
            new_token.write(out);
            *changed = true;
        }
        RefAction::Error => {
            log::debug!("reference '{raw}' collapsed to {REF_ERROR}");
            out.push_str(REF_ERROR);
            *changed = true;
        }
    }
}

/// Rewrite every reference in `formula` through `apply`
///
/// `apply` sees the reference's sheet qualifier (unquoted) and the parsed
/// token, and decides to keep, replace, or collapse it. Returns the
/// rewritten text plus a flag saying whether anything changed.
pub fn rewrite_references<F>(formula: &str, mut apply: F) -> (String, bool)
where
    F: FnMut(Option<&str>, &RefToken) -> RefAction,
{
    let mut out = String::with_capacity(formula.len());
    let mut changed = false;
    let mut pos = 0;

    while pos < formula.len() {
        let rest = &formula[pos..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };

        match c {
            '"' => {
                let len = scan_string_literal(rest);
                out.push_str(&rest[..len]);
                pos += len;
            }
            '\'' => match scan_quoted_name(rest) {
                Some(qlen) if rest[qlen..].starts_with('!') => {
                    if let Some((rlen, token)) = match_reference(&rest[qlen + 1..]) {
                        let sheet = unquote_sheet(&rest[..qlen]);
                        let raw = &rest[..qlen + 1 + rlen];
                        emit(
                            &mut out,
                            &mut changed,
                            raw,
                            qlen + 1,
                            Some(&sheet),
                            &token,
                            &mut apply,
                        );
                        pos += qlen + 1 + rlen;
                    } else {
                        out.push_str(&rest[..qlen + 1]);
                        pos += qlen + 1;
                    }
                }
                Some(qlen) => {
                    out.push_str(&rest[..qlen]);
                    pos += qlen;
                }
                None => {
                    out.push_str(rest);
                    pos = formula.len();
                }
            },
            '$' => {
                if let Some((rlen, token)) = match_reference(rest) {
                    emit(
                        &mut out,
                        &mut changed,
                        &rest[..rlen],
                        0,
                        None,
                        &token,
                        &mut apply,
                    );
                    pos += rlen;
                } else {
                    out.push(c);
                    pos += 1;
                }
            }
            c if c.is_alphanumeric() || c == '_' => {
                if let Some((rlen, token)) = match_reference(rest) {
                    emit(
                        &mut out,
                        &mut changed,
                        &rest[..rlen],
                        0,
                        None,
                        &token,
                        &mut apply,
                    );
                    pos += rlen;
                    continue;
                }
                let wlen = scan_word(rest);
                let after_word = &rest[wlen..];
                if after_word.starts_with('!') {
                    if let Some((rlen, token)) = match_reference(&after_word[1..]) {
                        let raw = &rest[..wlen + 1 + rlen];
                        emit(
                            &mut out,
                            &mut changed,
                            raw,
                            wlen + 1,
                            Some(&rest[..wlen]),
                            &token,
                            &mut apply,
                        );
                        pos += wlen + 1 + rlen;
                        continue;
                    }
                }
                out.push_str(&rest[..wlen]);
                pos += wlen;
            }
            _ => {
                out.push(c);
                pos += c.len_utf8();
            }
        }
    }
    (out, changed)
}

// === Row-move transform ===

/// A window of rows being moved by a signed amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShift {
    /// First moved row
    pub first: u32,
    /// Last moved row, inclusive
    pub last: u32,
    /// Signed move distance
    pub delta: i64,
}

enum RowAdjust {
    Unchanged,
    Moved(i64),
    Deleted,
}

enum AreaAdjust {
    Unchanged,
    Moved(i64, i64),
    Deleted,
}

impl RowShift {
    pub fn new(first: u32, last: u32, delta: i64) -> Self {
        Self { first, last, delta }
    }

    /// Apply the row-move transform to a rectangular range
    ///
    /// `None` means the destination window wiped the range out (or pushed it
    /// off the sheet).
    pub fn shift_range(&self, range: &CellRange) -> Option<CellRange> {
        match self.move_area(range.first_row(), range.last_row()) {
            AreaAdjust::Unchanged => Some(*range),
            AreaAdjust::Moved(f, l) => match (checked_row(f), checked_row(l)) {
                (Some(first), Some(last)) => Some(CellRange::from_indices(
                    first,
                    range.first_col(),
                    last,
                    range.last_col(),
                )),
                _ => None,
            },
            AreaAdjust::Deleted => None,
        }
    }

    fn dest_first(&self) -> i64 {
        self.first as i64 + self.delta
    }

    fn dest_last(&self) -> i64 {
        self.last as i64 + self.delta
    }

    /// Move transform for one referenced row
    fn move_row(&self, row: u32) -> RowAdjust {
        let r = row as i64;
        if self.first as i64 <= r && r <= self.last as i64 {
            // moved rows enclose the ref, it travels with them
            return RowAdjust::Moved(r + self.delta);
        }
        if self.dest_last() < r || r < self.dest_first() {
            return RowAdjust::Unchanged;
        }
        // destination rows overwrite the ref
        RowAdjust::Deleted
    }

    /// Move transform for an area's row extent
    fn move_area(&self, a_first: u32, a_last: u32) -> AreaAdjust {
        let af = a_first as i64;
        let al = a_last as i64;
        let sf = self.first as i64;
        let sl = self.last as i64;
        let n = self.delta;
        let df = self.dest_first();
        let dl = self.dest_last();

        if sf <= af && al <= sl {
            // moved rows enclose the area, it travels with them
            return AreaAdjust::Moved(af + n, al + n);
        }
        if af < sf && sl < al {
            // moved rows sit entirely inside the area; only a destination
            // overlapping the area's top or bottom edge changes it
            if df < af && af <= dl {
                return AreaAdjust::Moved(dl + 1, al);
            }
            if df <= al && al < dl {
                return AreaAdjust::Moved(af, df - 1);
            }
            return AreaAdjust::Unchanged;
        }
        if sf <= af && af <= sl {
            // moved rows include the area's top row but not its bottom
            if n < 0 {
                return AreaAdjust::Moved(af + n, al);
            }
            if df > al {
                return AreaAdjust::Unchanged;
            }
            let mut new_first = af + n;
            if dl < al {
                // bottom row is preserved, the top row moves simply
                return AreaAdjust::Moved(new_first, al);
            }
            let exposed_top = sl + 1;
            if df > exposed_top {
                // old top row moved deep into the area, exposing a new top
                new_first = exposed_top;
            }
            return AreaAdjust::Moved(new_first, al.max(dl));
        }
        if sf <= al && al <= sl {
            // moved rows include the area's bottom row but not its top
            if n > 0 {
                return AreaAdjust::Moved(af, al + n);
            }
            if dl < af {
                return AreaAdjust::Unchanged;
            }
            let mut new_last = al + n;
            if df > af {
                // top row is preserved, the bottom row moves simply
                return AreaAdjust::Moved(af, new_last);
            }
            let exposed_bottom = sf - 1;
            if dl < exposed_bottom {
                // old bottom row moved deep into the area, exposing a new bottom
                new_last = exposed_bottom;
            }
            return AreaAdjust::Moved(af.min(df), new_last);
        }
        // moved rows are disjoint from the area; only the destination matters
        if dl < af || al < df {
            return AreaAdjust::Unchanged;
        }
        if df <= af && al <= dl {
            return AreaAdjust::Deleted;
        }
        if af <= df && dl <= al {
            return AreaAdjust::Unchanged;
        }
        if df < af && af <= dl {
            return AreaAdjust::Moved(dl + 1, al);
        }
        if df <= al && al < dl {
            return AreaAdjust::Moved(af, df - 1);
        }
        AreaAdjust::Unchanged
    }
}

fn checked_row(r: i64) -> Option<u32> {
    if (0..MAX_ROWS as i64).contains(&r) {
        Some(r as u32)
    } else {
        None
    }
}

fn same_sheet(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Rewrite a formula for a window of rows moving on `shifted_sheet`
///
/// `on_shifted_sheet` says whether the formula itself lives on that sheet:
/// unqualified references are only touched when it does, while qualified
/// references are touched exactly when they name the shifted sheet.
pub fn shift_formula_rows(
    formula: &str,
    shift: RowShift,
    shifted_sheet: &str,
    on_shifted_sheet: bool,
) -> (String, bool) {
    rewrite_references(formula, |sheet, token| {
        let applies = match sheet {
            None => on_shifted_sheet,
            Some(name) => same_sheet(name, shifted_sheet),
        };
        if !applies {
            return RefAction::Keep;
        }
        match *token {
            RefToken::Cell(addr) => match shift.move_row(addr.row) {
                RowAdjust::Unchanged => RefAction::Keep,
                RowAdjust::Moved(r) => match checked_row(r) {
                    Some(row) => RefAction::Replace(RefToken::Cell(CellAddress::with_flags(
                        row,
                        addr.col,
                        addr.abs_row,
                        addr.abs_col,
                    ))),
                    None => RefAction::Error,
                },
                RowAdjust::Deleted => RefAction::Error,
            },
            RefToken::Area(s, e) => match shift.move_area(s.row, e.row) {
                AreaAdjust::Unchanged => RefAction::Keep,
                AreaAdjust::Moved(f, l) => match (checked_row(f), checked_row(l)) {
                    (Some(first), Some(last)) => RefAction::Replace(RefToken::Area(
                        CellAddress::with_flags(first, s.col, s.abs_row, s.abs_col),
                        CellAddress::with_flags(last, e.col, e.abs_row, e.abs_col),
                    )),
                    _ => RefAction::Error,
                },
                AreaAdjust::Deleted => RefAction::Error,
            },
            RefToken::Rows {
                first,
                last,
                abs_first,
                abs_last,
            } => match shift.move_area(first, last) {
                AreaAdjust::Unchanged => RefAction::Keep,
                AreaAdjust::Moved(f, l) => match (checked_row(f), checked_row(l)) {
                    (Some(first), Some(last)) => RefAction::Replace(RefToken::Rows {
                        first,
                        last,
                        abs_first,
                        abs_last,
                    }),
                    _ => RefAction::Error,
                },
                AreaAdjust::Deleted => RefAction::Error,
            },
            // whole-column spans have no row extent to move
            RefToken::Cols { .. } => RefAction::Keep,
        }
    })
}

// === Relative translation ===

fn translate_addr(a: CellAddress, d_row: i64, d_col: i64) -> Option<CellAddress> {
    let row = if a.abs_row {
        a.row as i64
    } else {
        a.row as i64 + d_row
    };
    let col = if a.abs_col {
        a.col as i64
    } else {
        a.col as i64 + d_col
    };
    if !(0..MAX_ROWS as i64).contains(&row) || !(0..MAX_COLS as i64).contains(&col) {
        return None;
    }
    Some(CellAddress::with_flags(
        row as u32,
        col as u16,
        a.abs_row,
        a.abs_col,
    ))
}

/// Offset every relative reference in a formula by `(d_row, d_col)`
///
/// Used to materialize a shared formula for a cell away from its group
/// master. `$`-absolute axes stay put. A relative axis pushed outside the
/// sheet collapses its reference to `#REF!`.
pub fn translate_formula(formula: &str, d_row: i64, d_col: i64) -> (String, bool) {
    rewrite_references(formula, |_, token| {
        let translated = match *token {
            RefToken::Cell(a) => translate_addr(a, d_row, d_col).map(RefToken::Cell),
            RefToken::Area(s, e) => {
                match (translate_addr(s, d_row, d_col), translate_addr(e, d_row, d_col)) {
                    (Some(s2), Some(e2)) => Some(area(s2, e2)),
                    _ => None,
                }
            }
            RefToken::Rows {
                first,
                last,
                abs_first,
                abs_last,
            } => {
                let f = if abs_first { first as i64 } else { first as i64 + d_row };
                let l = if abs_last { last as i64 } else { last as i64 + d_row };
                match (checked_row(f.min(l)), checked_row(f.max(l))) {
                    (Some(first), Some(last)) => Some(RefToken::Rows {
                        first,
                        last,
                        abs_first,
                        abs_last,
                    }),
                    _ => None,
                }
            }
            RefToken::Cols {
                first,
                last,
                abs_first,
                abs_last,
            } => {
                let f = if abs_first { first as i64 } else { first as i64 + d_col };
                let l = if abs_last { last as i64 } else { last as i64 + d_col };
                let (f, l) = (f.min(l), f.max(l));
                if !(0..MAX_COLS as i64).contains(&f) || !(0..MAX_COLS as i64).contains(&l) {
                    None
                } else {
                    Some(RefToken::Cols {
                        first: f as u16,
                        last: l as u16,
                        abs_first,
                        abs_last,
                    })
                }
            }
        };
        match translated {
            Some(t) if t != *token => RefAction::Replace(t),
            Some(_) => RefAction::Keep,
            None => RefAction::Error,
        }
    })
}
