//! Named parts and typed relationships
//!
//! A [`Package`] is the in-memory view of a container: parts keyed by
//! normalized name, each holding a parsed [`Node`] tree and a content type,
//! wired together by typed relationships. The document model stores parts it
//! does not interpret here so they survive a round trip untouched.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::registry::RelationKind;

/// A normalized absolute part name inside the container
///
/// Always begins with `/`, never ends with one, and contains no empty or `.`
/// / `..` segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartName(String);

impl PartName {
    /// Parse and normalize a part name
    pub fn new(name: &str) -> Result<Self> {
        let trimmed = name.strip_prefix('/').unwrap_or(name);
        if trimmed.is_empty() {
            return Err(Error::InvalidPartName(name.to_string()));
        }
        for segment in trimmed.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(Error::InvalidPartName(name.to_string()));
            }
        }
        Ok(Self(format!("/{trimmed}")))
    }

    /// The normalized name, including the leading slash
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment
    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a relationship target lives inside or outside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Internal,
    External,
}

/// A typed link from one part (or the package root) to a target
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub kind: RelationKind,
    pub target: String,
    pub mode: TargetMode,
}

/// A named part: content type plus parsed payload
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: PartName,
    pub content_type: String,
    pub root: Node,
}

impl Part {
    /// Create a part from its name, content type, and payload tree
    pub fn new(name: PartName, content_type: impl Into<String>, root: Node) -> Self {
        Self {
            name,
            content_type: content_type.into(),
            root,
        }
    }
}

/// An in-memory container package
///
/// Parts are kept sorted by name so iteration order is deterministic.
/// Relationship lists are per source part, with package-level relationships
/// held separately, and relationship ids are generated `rId1`, `rId2`, … per
/// source.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<PartName, Part>,
    relationships: BTreeMap<PartName, Vec<Relationship>>,
    package_relationships: Vec<Relationship>,
}

impl Package {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    // === Parts ===

    /// Insert or replace a part
    pub fn put_part(&mut self, part: Part) {
        self.parts.insert(part.name.clone(), part);
    }

    /// Look up a part by name
    pub fn part(&self, name: &PartName) -> Option<&Part> {
        self.parts.get(name)
    }

    /// Mutable part lookup
    pub fn part_mut(&mut self, name: &PartName) -> Option<&mut Part> {
        self.parts.get_mut(name)
    }

    /// The node tree for a part, failing if the part is absent
    pub fn part_tree(&self, name: &PartName) -> Result<&Node> {
        self.parts
            .get(name)
            .map(|p| &p.root)
            .ok_or_else(|| Error::PartNotFound(name.to_string()))
    }

    /// Remove a part and its outgoing relationships
    pub fn remove_part(&mut self, name: &PartName) -> Option<Part> {
        self.relationships.remove(name);
        self.parts.remove(name)
    }

    /// Iterate parts in name order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Number of stored parts
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    // === Relationships ===

    /// Add a relationship from a source part, generating the next free id
    pub fn add_relationship(
        &mut self,
        source: &PartName,
        kind: RelationKind,
        target: impl Into<String>,
        mode: TargetMode,
    ) -> &Relationship {
        let list = self.relationships.entry(source.clone()).or_default();
        let id = next_rel_id(list);
        list.push(Relationship {
            id,
            kind,
            target: target.into(),
            mode,
        });
        list.last().unwrap()
    }

    /// Add a relationship with a caller-chosen id
    pub fn add_relationship_with_id(
        &mut self,
        source: &PartName,
        id: impl Into<String>,
        kind: RelationKind,
        target: impl Into<String>,
        mode: TargetMode,
    ) -> Result<&Relationship> {
        let id = id.into();
        let list = self.relationships.entry(source.clone()).or_default();
        if list.iter().any(|r| r.id == id) {
            return Err(Error::DuplicateRelationshipId {
                source_part: source.to_string(),
                id,
            });
        }
        list.push(Relationship {
            id,
            kind,
            target: target.into(),
            mode,
        });
        Ok(list.last().unwrap())
    }

    /// Relationships whose source is the given part
    pub fn relationships(&self, source: &PartName) -> &[Relationship] {
        self.relationships
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Relationship on a source part by id
    pub fn relationship_by_id(&self, source: &PartName, id: &str) -> Result<&Relationship> {
        self.relationships(source)
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::RelationshipNotFound {
                source_part: source.to_string(),
                id: id.to_string(),
            })
    }

    /// Relationships of one kind on a source part
    pub fn relationships_by_kind<'a>(
        &'a self,
        source: &PartName,
        kind: RelationKind,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships(source)
            .iter()
            .filter(move |r| r.kind == kind)
    }

    /// First relationship of one kind on a source part
    pub fn find_target(&self, source: &PartName, kind: RelationKind) -> Option<&Relationship> {
        self.relationships_by_kind(source, kind).next()
    }

    /// Remove a relationship by id
    pub fn remove_relationship(&mut self, source: &PartName, id: &str) -> Result<Relationship> {
        let list = self
            .relationships
            .get_mut(source)
            .ok_or_else(|| Error::RelationshipNotFound {
                source_part: source.to_string(),
                id: id.to_string(),
            })?;
        let pos = list
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::RelationshipNotFound {
                source_part: source.to_string(),
                id: id.to_string(),
            })?;
        Ok(list.remove(pos))
    }

    /// Add a package-level relationship (source is the container root)
    pub fn add_package_relationship(
        &mut self,
        kind: RelationKind,
        target: impl Into<String>,
        mode: TargetMode,
    ) -> &Relationship {
        let id = next_rel_id(&self.package_relationships);
        self.package_relationships.push(Relationship {
            id,
            kind,
            target: target.into(),
            mode,
        });
        self.package_relationships.last().unwrap()
    }

    /// Package-level relationships
    pub fn package_relationships(&self) -> &[Relationship] {
        &self.package_relationships
    }
}

/// Smallest `rId{n}` not already used in the list
fn next_rel_id(list: &[Relationship]) -> String {
    let mut n = list.len() + 1;
    loop {
        let candidate = format!("rId{n}");
        if !list.iter().any(|r| r.id == candidate) {
            return candidate;
        }
        n += 1;
    }
}
