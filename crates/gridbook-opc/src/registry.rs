//! Relation-kind registry
//!
//! Every relationship kind the model understands is an enum variant with one
//! registry row: type URI, content type, default part-name template. Foreign
//! URIs classify as [`RelationKind::Unknown`] and are preserved rather than
//! dropped. Adding a kind means adding a variant and a row here.

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// The kinds of relationships the model understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Workbook,
    Worksheet,
    SharedStrings,
    Styles,
    Theme,
    Comments,
    Table,
    Drawing,
    Hyperlink,
    Image,
    CalcChain,
    CoreProperties,
    ExtendedProperties,
    /// A relationship type the registry has no row for
    Unknown,
}

/// One registry row for a relation kind
///
/// `content_type` and `default_path` are `None` for kinds that do not own a
/// part of their own (hyperlinks point outward; image types vary).
#[derive(Debug, Clone, Copy)]
pub struct RelationSpec {
    pub kind: RelationKind,
    pub type_uri: &'static str,
    pub content_type: Option<&'static str>,
    /// Template for new part names; `#` stands for a 1-based ordinal
    pub default_path: Option<&'static str>,
}

const OFFICE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

macro_rules! spec {
    ($kind:ident, $uri:expr, $ct:expr, $path:expr) => {
        RelationSpec {
            kind: RelationKind::$kind,
            type_uri: $uri,
            content_type: $ct,
            default_path: $path,
        }
    };
}

static REGISTRY: &[RelationSpec] = &[
    spec!(
        Workbook,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
        Some("/xl/workbook.xml")
    ),
    spec!(
        Worksheet,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"),
        Some("/xl/worksheets/sheet#.xml")
    ),
    spec!(
        SharedStrings,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings",
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"),
        Some("/xl/sharedStrings.xml")
    ),
    spec!(
        Styles,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"),
        Some("/xl/styles.xml")
    ),
    spec!(
        Theme,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme",
        Some("application/vnd.openxmlformats-officedocument.theme+xml"),
        Some("/xl/theme/theme#.xml")
    ),
    spec!(
        Comments,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments",
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml"),
        Some("/xl/comments#.xml")
    ),
    spec!(
        Table,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table",
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"),
        Some("/xl/tables/table#.xml")
    ),
    spec!(
        Drawing,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing",
        Some("application/vnd.openxmlformats-officedocument.drawing+xml"),
        Some("/xl/drawings/drawing#.xml")
    ),
    spec!(
        Hyperlink,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink",
        None,
        None
    ),
    spec!(
        Image,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image",
        None,
        Some("/xl/media/image#")
    ),
    spec!(
        CalcChain,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain",
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"),
        Some("/xl/calcChain.xml")
    ),
    spec!(
        CoreProperties,
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
        Some("application/vnd.openxmlformats-package.core-properties+xml"),
        Some("/docProps/core.xml")
    ),
    spec!(
        ExtendedProperties,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
        Some("application/vnd.openxmlformats-officedocument.extended-properties+xml"),
        Some("/docProps/app.xml")
    ),
];

static BY_URI: Lazy<AHashMap<&'static str, RelationKind>> = Lazy::new(|| {
    REGISTRY.iter().map(|s| (s.type_uri, s.kind)).collect()
});

impl RelationKind {
    /// The registry row for this kind, if it has one
    pub fn spec(self) -> Option<&'static RelationSpec> {
        REGISTRY.iter().find(|s| s.kind == self)
    }

    /// The relationship type URI for this kind
    pub fn type_uri(self) -> Option<&'static str> {
        self.spec().map(|s| s.type_uri)
    }

    /// The content type of parts this kind points at
    pub fn content_type(self) -> Option<&'static str> {
        self.spec().and_then(|s| s.content_type)
    }

    /// Default part-name template, `#` standing for a 1-based ordinal
    pub fn default_path(self) -> Option<&'static str> {
        self.spec().and_then(|s| s.default_path)
    }

    /// Instantiate the default path template with an ordinal
    pub fn path_for_index(self, index: usize) -> Option<String> {
        self.default_path()
            .map(|tpl| tpl.replace('#', &index.to_string()))
    }

    /// Classify a relationship type URI
    pub fn classify(uri: &str) -> RelationKind {
        match BY_URI.get(uri) {
            Some(kind) => *kind,
            None => {
                log::debug!("unrecognized relationship type: {uri}");
                RelationKind::Unknown
            }
        }
    }

    /// True when the URI belongs to one of the two standard namespaces
    pub fn is_standard_namespace(uri: &str) -> bool {
        uri.starts_with(OFFICE_REL) || uri.starts_with(PACKAGE_REL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_uris() {
        assert_eq!(
            RelationKind::classify(
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet"
            ),
            RelationKind::Worksheet
        );
        assert_eq!(
            RelationKind::classify(
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties"
            ),
            RelationKind::CoreProperties
        );
    }

    #[test]
    fn test_classify_unknown_uri() {
        assert_eq!(
            RelationKind::classify("http://example.com/relationships/custom"),
            RelationKind::Unknown
        );
    }

    #[test]
    fn test_uri_round_trip() {
        for spec in super::REGISTRY {
            assert_eq!(RelationKind::classify(spec.type_uri), spec.kind);
        }
    }

    #[test]
    fn test_unknown_has_no_spec() {
        assert!(RelationKind::Unknown.spec().is_none());
        assert!(RelationKind::Unknown.type_uri().is_none());
    }

    #[test]
    fn test_path_templates() {
        assert_eq!(
            RelationKind::Worksheet.path_for_index(3).as_deref(),
            Some("/xl/worksheets/sheet3.xml")
        );
        assert_eq!(
            RelationKind::Styles.path_for_index(1).as_deref(),
            Some("/xl/styles.xml")
        );
        assert_eq!(RelationKind::Hyperlink.path_for_index(1), None);
    }

    #[test]
    fn test_namespace_check() {
        assert!(RelationKind::is_standard_namespace(
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles"
        ));
        assert!(!RelationKind::is_standard_namespace("http://example.com/rel"));
    }
}
