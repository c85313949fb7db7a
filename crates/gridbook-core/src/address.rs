//! Cell addressing: A1-style references and ranges
//!
//! Rows are 0-based internally and 1-based in display; columns map to
//! letters as a base-26 numeral with no zero digit (A=0, Z=25, AA=26).
//! `$` markers survive a parse/format round trip.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A single cell reference (e.g. "B7", "$C$2")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index, 0-based
    pub row: u32,
    /// Column index, 0-based (A=0, XFD=16383)
    pub col: u16,
    /// `$` marker on the row
    pub abs_row: bool,
    /// `$` marker on the column
    pub abs_col: bool,
}

impl CellAddress {
    /// Relative reference at (row, col)
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            abs_row: false,
            abs_col: false,
        }
    }

    /// Fully absolute reference ($A$1 style)
    pub fn absolute(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            abs_row: true,
            abs_col: true,
        }
    }

    /// Reference with explicit `$` flags
    pub fn with_flags(row: u32, col: u16, abs_row: bool, abs_col: bool) -> Self {
        Self {
            row,
            col,
            abs_row,
            abs_col,
        }
    }

    /// Parse an A1-style reference
    ///
    /// # Examples
    /// ```
    /// use gridbook_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B7").unwrap();
    /// assert_eq!((addr.row, addr.col), (6, 1));
    ///
    /// let addr = CellAddress::parse("$D$4").unwrap();
    /// assert!(addr.abs_row && addr.abs_col);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty reference".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let abs_col = bytes.first() == Some(&b'$');
        if abs_col {
            pos += 1;
        }

        let letters_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == letters_start {
            return Err(Error::InvalidAddress(format!("no column letters in '{s}'")));
        }
        let col = letters_to_column(&s[letters_start..pos])?;

        let abs_row = bytes.get(pos) == Some(&b'$');
        if abs_row {
            pos += 1;
        }

        let digits = &s[pos..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!("no row number in '{s}'")));
        }
        let display_row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number overflow in '{s}'")))?;
        if display_row == 0 {
            return Err(Error::InvalidAddress(format!("row numbers start at 1: '{s}'")));
        }
        let row = display_row - 1;
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self {
            row,
            col,
            abs_row,
            abs_col,
        })
    }

    /// Parse a reference with an optional sheet qualifier
    ///
    /// Accepts `A1`, `Data!A1`, and `'P&L 2024'!A1` (doubled quotes escape a
    /// literal quote in the sheet name). Returns the sheet name separately.
    pub fn parse_qualified(s: &str) -> Result<(Option<String>, Self)> {
        let (sheet, rest) = split_sheet_qualifier(s.trim())?;
        Ok((sheet, Self::parse(rest)?))
    }

    /// Format back to A1 notation (the inverse of [`parse`](Self::parse))
    pub fn to_a1(&self) -> String {
        let mut out = String::new();
        if self.abs_col {
            out.push('$');
        }
        out.push_str(&column_to_letters(self.col));
        if self.abs_row {
            out.push('$');
        }
        out.push_str(&(self.row + 1).to_string());
        out
    }

    /// Same coordinates with both `$` flags cleared
    pub fn to_relative(&self) -> Self {
        Self::new(self.row, self.col)
    }

    /// Translate by a signed offset, `None` if the result leaves the sheet
    pub fn offset(&self, d_row: i64, d_col: i32) -> Option<Self> {
        let row = self.row as i64 + d_row;
        let col = self.col as i32 + d_col;
        if row < 0 || row >= MAX_ROWS as i64 || col < 0 || col >= MAX_COLS as i32 {
            return None;
        }
        Some(Self::with_flags(
            row as u32,
            col as u16,
            self.abs_row,
            self.abs_col,
        ))
    }

    /// Range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Column index to letters: 0 -> "A", 25 -> "Z", 26 -> "AA", 16383 -> "XFD"
pub fn column_to_letters(col: u16) -> String {
    let mut out = String::new();
    let mut n = col as u32 + 1;
    while n > 0 {
        n -= 1;
        out.insert(0, ((n % 26) as u8 + b'A') as char);
        n /= 26;
    }
    out
}

/// Column letters to index, case-insensitive
pub fn letters_to_column(letters: &str) -> Result<u16> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!("bad column letter '{c}'")));
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        if col > MAX_COLS as u32 {
            return Err(Error::ColumnOutOfBounds(
                col.min(u16::MAX as u32) as u16,
                MAX_COLS - 1,
            ));
        }
    }
    Ok((col - 1) as u16)
}

/// Split an optional `Sheet!` / `'Quoted sheet'!` qualifier off a reference
fn split_sheet_qualifier(s: &str) -> Result<(Option<String>, &str)> {
    if let Some(rest) = s.strip_prefix('\'') {
        // quoted sheet name, '' is an escaped quote
        let mut name = String::new();
        let mut chars = rest.char_indices();
        while let Some((_, c)) = chars.next() {
            if c != '\'' {
                name.push(c);
                continue;
            }
            match chars.next() {
                Some((_, '\'')) => name.push('\''),
                Some((bang, '!')) => return Ok((Some(name), &rest[bang + 1..])),
                _ => break,
            }
        }
        Err(Error::InvalidAddress(format!(
            "unterminated sheet name in '{s}'"
        )))
    } else if let Some(bang) = s.find('!') {
        let name = &s[..bang];
        if name.is_empty() {
            return Err(Error::InvalidAddress(format!("empty sheet name in '{s}'")));
        }
        Ok((Some(name.to_string()), &s[bang + 1..]))
    } else {
        Ok((None, s))
    }
}

/// A rectangular cell range (e.g. "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range, normalizing so start is the top-left corner
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        let (start_row, end_row) = if a.row <= b.row {
            (a.row, b.row)
        } else {
            (b.row, a.row)
        };
        let (start_col, end_col) = if a.col <= b.col {
            (a.col, b.col)
        } else {
            (b.col, a.col)
        };
        Self {
            start: CellAddress::with_flags(start_row, start_col, a.abs_row, a.abs_col),
            end: CellAddress::with_flags(end_row, end_col, b.abs_row, b.abs_col),
        }
    }

    /// Range from bare indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// One-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse "A1:B10" or a bare "A1" as a degenerate one-cell range
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.find(':') {
            Some(colon) => {
                let start = CellAddress::parse(&s[..colon])?;
                let end = CellAddress::parse(&s[colon + 1..])?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(CellAddress::parse(s)?)),
        }
    }

    /// Parse with an optional sheet qualifier on the whole range
    pub fn parse_qualified(s: &str) -> Result<(Option<String>, Self)> {
        let (sheet, rest) = split_sheet_qualifier(s.trim())?;
        Ok((sheet, Self::parse(rest)?))
    }

    pub fn first_row(&self) -> u32 {
        self.start.row
    }

    pub fn last_row(&self) -> u32 {
        self.end.row
    }

    pub fn first_col(&self) -> u16 {
        self.start.col
    }

    pub fn last_col(&self) -> u16 {
        self.end.col
    }

    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// True for a range spanning exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }

    /// Whether an address falls inside this range
    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Whether a whole row index intersects this range
    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.start.row && row <= self.end.row
    }

    /// Whether another range is fully inside this one
    pub fn contains_range(&self, other: &CellRange) -> bool {
        self.contains(other.start.to_relative()) && self.contains(other.end.to_relative())
    }

    /// Whether two ranges share any cell
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && self.end.row >= other.start.row
            && self.start.col <= other.end.col
            && self.end.col >= other.start.col
    }

    /// Intersection of two ranges, if any
    pub fn intersect(&self, other: &CellRange) -> Option<CellRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(CellRange::from_indices(
            self.start.row.max(other.start.row),
            self.start.col.max(other.start.col),
            self.end.row.min(other.end.row),
            self.end.col.min(other.end.col),
        ))
    }

    /// Iterate addresses row by row
    pub fn cells(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            row: self.start.row,
            col: self.start.col,
            done: false,
        }
    }

    /// Format as "A1:B10", or a bare address for a one-cell range
    pub fn to_a1(&self) -> String {
        if self.is_single_cell() {
            self.start.to_a1()
        } else {
            format!("{}:{}", self.start.to_a1(), self.end.to_a1())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over the addresses of a range, row-major
pub struct CellRangeIter {
    range: CellRange,
    row: u32,
    col: u16,
    done: bool,
}

impl Iterator for CellRangeIter {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let addr = CellAddress::new(self.row, self.col);
        if self.col < self.range.end.col {
            self.col += 1;
        } else if self.row < self.range.end.row {
            self.col = self.range.start.col;
            self.row += 1;
        } else {
            self.done = true;
        }
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let rows_left = (self.range.end.row - self.row) as u64;
        let remaining = rows_left * self.range.col_count() as u64
            + (self.range.end.col - self.col) as u64
            + 1;
        (remaining as usize, Some(remaining as usize))
    }
}

impl ExactSizeIterator for CellRangeIter {}
