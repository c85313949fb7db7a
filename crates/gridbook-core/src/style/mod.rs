//! Cell styling
//!
//! Styles are split the way the container format stores them: [`Font`],
//! [`Fill`], and [`Border`] records live in their own resource tables, and a
//! [`CellStyle`] references them by handle next to its inline alignment,
//! protection, and number-format id. [`StyleTable`] owns the four tables and
//! keeps the embedded handles valid.

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
mod table;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{Border, BorderEdge, DiagonalDirection, LineStyle};
pub use color::Color;
pub use fill::{Fill, PatternType};
pub use font::{Font, Underline};
pub use number_format::{
    builtin_format, builtin_format_id, is_builtin_date_format, is_date_format,
    FIRST_CUSTOM_FORMAT_ID, GENERAL_FORMAT_ID,
};
pub use table::StyleTable;

use crate::resource::Handle;

/// A complete cell style: sub-table handles plus inline settings
///
/// Handle 0 in each sub-table is the default record, so
/// `CellStyle::default()` is the all-default style at handle 0 of a fresh
/// [`StyleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellStyle {
    /// Handle into the font table
    pub font: Handle,
    /// Handle into the fill table
    pub fill: Handle,
    /// Handle into the border table
    pub border: Handle,
    /// Number format id (builtin 0-49 or workbook-defined from 164)
    pub number_format: u32,
    pub alignment: Alignment,
    pub protection: Protection,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: Handle) -> Self {
        self.font = font;
        self
    }

    pub fn with_fill(mut self, fill: Handle) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_border(mut self, border: Handle) -> Self {
        self.border = border;
        self
    }

    pub fn with_number_format(mut self, id: u32) -> Self {
        self.number_format = id;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }
}

/// Cell protection flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Protection {
    /// Locked when the sheet is protected
    pub locked: bool,
    /// Formula hidden when the sheet is protected
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

impl Protection {
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            hidden: false,
        }
    }
}
