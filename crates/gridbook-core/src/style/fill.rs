//! Fill settings

use super::Color;

/// Cell background fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fill {
    /// No fill (transparent)
    #[default]
    None,

    /// Solid color fill
    Solid { color: Color },

    /// Pattern fill
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl Fill {
    /// Solid fill with the given color
    pub fn solid(color: Color) -> Self {
        Fill::Solid { color }
    }

    /// Pattern fill
    pub fn pattern(pattern: PatternType, foreground: Color, background: Color) -> Self {
        Fill::Pattern {
            pattern,
            foreground,
            background,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Fill::None)
    }
}

/// Fill pattern kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternType {
    Gray125,
    Gray0625,
    DarkGray,
    MediumGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
}
