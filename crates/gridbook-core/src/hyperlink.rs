//! Cell hyperlinks

use crate::address::CellRange;

/// What a hyperlink points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HyperlinkKind {
    /// A web address
    Url,
    /// A mailto: address
    Email,
    /// A path on disk
    File,
    /// A cell reference inside this document
    Document,
}

/// A hyperlink anchored to a cell range
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hyperlink {
    /// The cells that activate the link
    pub anchor: CellRange,
    /// Target address, path, or in-document reference
    pub target: String,
    pub kind: HyperlinkKind,
    /// Optional hover text
    pub tooltip: Option<String>,
}

impl Hyperlink {
    pub fn new(anchor: CellRange, target: impl Into<String>, kind: HyperlinkKind) -> Self {
        Self {
            anchor,
            target: target.into(),
            kind,
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Whether the link resolves inside this document
    pub fn is_internal(&self) -> bool {
        self.kind == HyperlinkKind::Document
    }
}
