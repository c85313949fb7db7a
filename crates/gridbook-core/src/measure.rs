//! Text width measurement
//!
//! Column auto-sizing needs the rendered width of cell text, which depends
//! on font metrics the model does not have. [`TextMeasurer`] is the seam a
//! host fills with real metrics; [`ApproxMeasurer`] is a font-metric-free
//! estimate for tests and headless use.

use crate::style::Font;

/// Font size the approximate measurer treats as one character unit per
/// character, in points
const BASE_FONT_SIZE: f64 = 11.0;

/// Measures rendered text width in character units of the default font
pub trait TextMeasurer {
    fn text_width(&self, text: &str, font: &Font) -> f64;
}

/// Width estimate with no font metrics: one unit per character, scaled
/// linearly by font size, plus one unit of cell padding
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasurer;

impl TextMeasurer for ApproxMeasurer {
    fn text_width(&self, text: &str, font: &Font) -> f64 {
        text.chars().count() as f64 * (font.size / BASE_FONT_SIZE) + 1.0
    }
}
