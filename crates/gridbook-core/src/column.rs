//! Column records

use crate::resource::Handle;

/// Default column width in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Per-column state, kept sparse by the sheet
///
/// A record exists only while at least one field differs from the default;
/// outline ungrouping prunes records that drop back to all defaults.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnRecord {
    /// Custom width in characters (None = sheet default)
    pub width: Option<f64>,
    /// Column is hidden
    pub hidden: bool,
    /// Outline/grouping level (0-7)
    pub outline_level: u8,
    /// Column is collapsed (in outline)
    pub collapsed: bool,
    /// Column-level style (None = no column style)
    pub style: Option<Handle>,
    /// Width was set by auto-sizing
    pub best_fit: bool,
}

impl ColumnRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this column has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.width.is_some()
            || self.hidden
            || self.outline_level > 0
            || self.collapsed
            || self.style.is_some()
            || self.best_fit
    }
}
