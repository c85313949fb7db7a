//! The workbook style table
//!
//! Composes the font, fill, border, and cell-style resource tables and the
//! custom number-format registry. Interning a [`CellStyle`] validates the
//! sub-handles it embeds; cloning a style from another workbook deep-copies
//! the referenced records first so no handle crosses a workbook boundary.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::resource::{Handle, ResourceTable};
use crate::style::{builtin_format, Border, CellStyle, Fill, Font, FIRST_CUSTOM_FORMAT_ID};

/// Font, fill, border, and style tables for one workbook
#[derive(Debug, Clone)]
pub struct StyleTable {
    fonts: ResourceTable<Font>,
    fills: ResourceTable<Fill>,
    borders: ResourceTable<Border>,
    styles: ResourceTable<CellStyle>,
    /// Custom number formats by id (164+)
    number_formats: BTreeMap<u32, String>,
    next_format_id: u32,
}

impl StyleTable {
    /// Create a table with default font/fill/border/style records at handle 0
    pub fn new() -> Self {
        Self {
            fonts: ResourceTable::with_default("font", Font::default()),
            fills: ResourceTable::with_default("fill", Fill::default()),
            borders: ResourceTable::with_default("border", Border::default()),
            styles: ResourceTable::with_default("style", CellStyle::default()),
            number_formats: BTreeMap::new(),
            next_format_id: FIRST_CUSTOM_FORMAT_ID,
        }
    }

    // === Sub-tables ===

    /// Intern a font record
    pub fn intern_font(&mut self, font: Font) -> Handle {
        self.fonts.intern(font)
    }

    /// Intern a fill record
    pub fn intern_fill(&mut self, fill: Fill) -> Handle {
        self.fills.intern(fill)
    }

    /// Intern a border record
    pub fn intern_border(&mut self, border: Border) -> Handle {
        self.borders.intern(border)
    }

    pub fn font(&self, handle: Handle) -> Result<&Font> {
        self.fonts.get(handle)
    }

    pub fn fill(&self, handle: Handle) -> Result<&Fill> {
        self.fills.get(handle)
    }

    pub fn border(&self, handle: Handle) -> Result<&Border> {
        self.borders.get(handle)
    }

    // === Cell styles ===

    /// Intern a cell style, validating the sub-handles it embeds
    pub fn intern_style(&mut self, style: CellStyle) -> Result<Handle> {
        self.check_sub_handles(&style)?;
        Ok(self.styles.intern(style))
    }

    /// Replace a style in place, keeping its handle
    pub fn update_style(&mut self, handle: Handle, style: CellStyle) -> Result<()> {
        self.check_sub_handles(&style)?;
        self.styles.update(handle, style)
    }

    pub fn style(&self, handle: Handle) -> Result<&CellStyle> {
        self.styles.get(handle)
    }

    /// Whether a style handle is in range
    pub fn contains_style(&self, handle: Handle) -> bool {
        self.styles.contains(handle)
    }

    /// Number of unique cell styles (including the default at 0)
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Iterate styles with their handles, in insertion order
    pub fn styles(&self) -> impl Iterator<Item = (Handle, &CellStyle)> {
        self.styles.iter()
    }

    fn check_sub_handles(&self, style: &CellStyle) -> Result<()> {
        if !self.fonts.contains(style.font) {
            return Err(Error::DanglingSubHandle {
                table: "font",
                handle: style.font,
            });
        }
        if !self.fills.contains(style.fill) {
            return Err(Error::DanglingSubHandle {
                table: "fill",
                handle: style.fill,
            });
        }
        if !self.borders.contains(style.border) {
            return Err(Error::DanglingSubHandle {
                table: "border",
                handle: style.border,
            });
        }
        Ok(())
    }

    // === Number formats ===

    /// Register a custom number format, returning its id
    ///
    /// An already-registered format string returns the existing id.
    pub fn intern_number_format(&mut self, format: impl Into<String>) -> u32 {
        let format = format.into();
        if let Some(id) = crate::style::builtin_format_id(&format) {
            return id;
        }
        if let Some((&id, _)) = self.number_formats.iter().find(|(_, f)| **f == format) {
            return id;
        }
        let id = self.next_format_id;
        self.next_format_id += 1;
        self.number_formats.insert(id, format);
        id
    }

    /// Resolve a format id to its string (builtin or custom)
    pub fn number_format_string(&self, id: u32) -> Option<&str> {
        builtin_format(id).or_else(|| self.number_formats.get(&id).map(String::as_str))
    }

    /// Whether a style formats its value as a date or time
    pub fn is_date_style(&self, style: &CellStyle) -> bool {
        crate::style::is_date_format(
            style.number_format,
            self.number_format_string(style.number_format),
        )
    }

    // === Cross-workbook cloning ===

    /// Deep-copy a style from another workbook's table into this one
    ///
    /// The source style's font, fill, and border records are re-interned
    /// here, its number format re-registered, and the rebuilt style interned.
    pub fn clone_style_from(&mut self, src: &StyleTable, handle: Handle) -> Result<Handle> {
        let style = *src.style(handle)?;

        let font = self.fonts.intern(src.font(style.font)?.clone());
        let fill = self.fills.intern(*src.fill(style.fill)?);
        let border = self.borders.intern(src.border(style.border)?.clone());

        let number_format = match src.number_format_string(style.number_format) {
            Some(fmt) if style.number_format >= FIRST_CUSTOM_FORMAT_ID => {
                self.intern_number_format(fmt.to_string())
            }
            _ => style.number_format,
        };

        self.intern_style(CellStyle {
            font,
            fill,
            border,
            number_format,
            alignment: style.alignment,
            protection: style.protection,
        })
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}
