//! Builtin number formats and date-format detection
//!
//! The container format defines format ids 0-49 with fixed meanings; custom
//! formats are registered per workbook starting at id 164.

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// First id available for workbook-defined custom formats
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// The General format id
pub const GENERAL_FORMAT_ID: u32 = 0;

static BUILTIN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (5, "$#,##0_);($#,##0)"),
    (6, "$#,##0_);[Red]($#,##0)"),
    (7, "$#,##0.00_);($#,##0.00)"),
    (8, "$#,##0.00_);[Red]($#,##0.00)"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "m/d/yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0_);(#,##0)"),
    (38, "#,##0_);[Red](#,##0)"),
    (39, "#,##0.00_);(#,##0.00)"),
    (40, "#,##0.00_);[Red](#,##0.00)"),
    (41, "_(#,##0_);_((#,##0);_(\"-\"_);_(@_)"),
    (42, "_($#,##0_);_(($#,##0);_(\"-\"_);_(@_)"),
    (43, "_(#,##0.00_);_((#,##0.00);_(\"-\"??_);_(@_)"),
    (44, "_($#,##0.00_);_(($#,##0.00);_(\"-\"??_);_(@_)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mm:ss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

static BUILTIN_BY_ID: Lazy<AHashMap<u32, &'static str>> =
    Lazy::new(|| BUILTIN_FORMATS.iter().copied().collect());

/// The format string for a builtin id, if the id is defined
pub fn builtin_format(id: u32) -> Option<&'static str> {
    BUILTIN_BY_ID.get(&id).copied()
}

/// The builtin id for a format string, if any builtin matches exactly
pub fn builtin_format_id(format: &str) -> Option<u32> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, s)| *s == format)
        .map(|(id, _)| *id)
}

/// Whether a builtin id is one of the fixed date/time formats
pub fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// Whether a format id/string pair formats its number as a date or time
///
/// Builtin date ids answer directly; otherwise the format string is scanned
/// for date/time codes outside quoted literals, escapes, and bracket
/// sections (elapsed-time brackets like `[h]` do count as time codes).
pub fn is_date_format(id: u32, format: Option<&str>) -> bool {
    if is_builtin_date_format(id) {
        return true;
    }
    let Some(fmt) = format else {
        return false;
    };

    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                // quoted literal
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                // escaped or padding char
                chars.next();
            }
            '[' => {
                // bracket section: colors and conditions are skipped, but
                // elapsed-time codes [h] [m] [s] mean a time format
                let mut section = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    section.push(b);
                }
                if !section.is_empty()
                    && section.chars().all(|b| matches!(b, 'h' | 'm' | 's' | 'H' | 'M' | 'S'))
                {
                    return true;
                }
            }
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M' => return true,
            _ => {}
        }
    }
    false
}
