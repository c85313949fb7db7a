//! Interning resource tables
//!
//! A [`ResourceTable`] stores structurally-unique values and hands out stable
//! `u32` handles. Entries are appended and never removed; documents in this
//! format reference styles and strings by index, so a handle must stay valid
//! for the workbook's lifetime. Lookup is by 64-bit hash into bucket lists
//! with full equality verification, so a hash collision can never conflate
//! two distinct values.

use std::hash::{Hash, Hasher};

use ahash::AHashMap;

use crate::error::{Error, Result};

/// Index into a resource table, stable for the owning workbook's lifetime
pub type Handle = u32;

/// An append-only interning table
#[derive(Debug, Clone)]
pub struct ResourceTable<T> {
    name: &'static str,
    entries: Vec<T>,
    index: AHashMap<u64, Vec<Handle>>,
}

impl<T: Hash + Eq + Clone> ResourceTable<T> {
    /// Create an empty table; `name` appears in error messages
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Create a table seeded with a default entry at handle 0
    pub fn with_default(name: &'static str, default: T) -> Self {
        let mut table = Self::new(name);
        table.intern(default);
        table
    }

    fn hash_of(value: &T) -> u64 {
        let mut hasher = ahash::AHasher::default();
        value.hash(&mut hasher);
        hasher.finish()
    }

    /// Return the handle of a structurally-equal entry, or append the value
    pub fn intern(&mut self, value: T) -> Handle {
        let hash = Self::hash_of(&value);
        if let Some(bucket) = self.index.get(&hash) {
            for &handle in bucket {
                if self.entries[handle as usize] == value {
                    return handle;
                }
            }
        }

        let handle = self.entries.len() as Handle;
        self.entries.push(value);
        self.index.entry(hash).or_default().push(handle);
        handle
    }

    /// Look up an entry by handle
    pub fn get(&self, handle: Handle) -> Result<&T> {
        self.entries
            .get(handle as usize)
            .ok_or(Error::InvalidHandle {
                table: self.name,
                handle,
            })
    }

    /// Replace an entry in place, keeping its handle
    ///
    /// The hash index is rewritten for the entry. Later interns of the old
    /// value no longer find this handle.
    pub fn update(&mut self, handle: Handle, value: T) -> Result<()> {
        if handle as usize >= self.entries.len() {
            return Err(Error::InvalidHandle {
                table: self.name,
                handle,
            });
        }

        let old_hash = Self::hash_of(&self.entries[handle as usize]);
        if let Some(bucket) = self.index.get_mut(&old_hash) {
            bucket.retain(|&h| h != handle);
            if bucket.is_empty() {
                self.index.remove(&old_hash);
            }
        }

        let new_hash = Self::hash_of(&value);
        self.entries[handle as usize] = value;
        self.index.entry(new_hash).or_default().push(handle);
        Ok(())
    }

    /// Whether a handle is in range for this table
    pub fn contains(&self, handle: Handle) -> bool {
        (handle as usize) < self.entries.len()
    }

    /// Number of unique entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries with their handles, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.entries.iter().enumerate().map(|(i, v)| (i as Handle, v))
    }
}

/// The workbook's shared string table
///
/// Tracks the total number of intern calls next to the unique count; the
/// container format records both.
#[derive(Debug, Clone)]
pub struct SharedStringTable {
    table: ResourceTable<String>,
    total_count: u64,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self {
            table: ResourceTable::new("shared string"),
            total_count: 0,
        }
    }

    /// Intern a string, counting the reference
    pub fn intern(&mut self, text: impl Into<String>) -> Handle {
        self.total_count += 1;
        self.table.intern(text.into())
    }

    /// Resolve a handle to its string
    pub fn get(&self, handle: Handle) -> Result<&str> {
        self.table.get(handle).map(String::as_str)
    }

    /// Number of unique strings
    pub fn unique_count(&self) -> usize {
        self.table.len()
    }

    /// Number of intern calls over the table's lifetime
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Re-intern a string referenced by another document's table
    pub fn clone_string_from(&mut self, src: &SharedStringTable, handle: Handle) -> Result<Handle> {
        let text = src.get(handle)?;
        Ok(self.intern(text.to_string()))
    }

    /// Iterate unique strings with their handles, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &str)> {
        self.table.iter().map(|(h, s)| (h, s.as_str()))
    }
}

impl Default for SharedStringTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut table = ResourceTable::new("test");
        let a = table.intern("alpha".to_string());
        let b = table.intern("beta".to_string());
        let a2 = table.intern("alpha".to_string());

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_structural_equality_not_identity() {
        let mut table = ResourceTable::new("test");
        let s1 = String::from("shared");
        let s2 = format!("{}{}", "sha", "red");
        assert_eq!(table.intern(s1), table.intern(s2));
    }

    #[test]
    fn test_handles_are_insertion_ordered() {
        let mut table = ResourceTable::new("test");
        for (i, word) in ["a", "b", "c", "d"].iter().enumerate() {
            assert_eq!(table.intern(word.to_string()), i as Handle);
        }
        let collected: Vec<_> = table.iter().map(|(h, v)| (h, v.clone())).collect();
        assert_eq!(collected[2], (2, "c".to_string()));
    }

    #[test]
    fn test_get_out_of_range() {
        let table: ResourceTable<String> = ResourceTable::new("test");
        assert!(matches!(
            table.get(0),
            Err(Error::InvalidHandle { table: "test", handle: 0 })
        ));
    }

    #[test]
    fn test_with_default_seeds_handle_zero() {
        let table = ResourceTable::with_default("test", 0u64);
        assert_eq!(table.len(), 1);
        assert_eq!(*table.get(0).unwrap(), 0u64);
    }

    #[test]
    fn test_update_keeps_handle_and_reindexes() {
        let mut table = ResourceTable::new("test");
        let h = table.intern("old".to_string());
        table.update(h, "new".to_string()).unwrap();

        assert_eq!(table.get(h).unwrap(), "new");
        // interning the new value finds the updated entry
        assert_eq!(table.intern("new".to_string()), h);
        // the old value is gone from the index, so it appends
        let h2 = table.intern("old".to_string());
        assert_ne!(h, h2);
        assert!(table.update(99, "x".to_string()).is_err());
    }

    #[test]
    fn test_shared_string_counts() {
        let mut strings = SharedStringTable::new();
        let hello = strings.intern("hello");
        strings.intern("world");
        strings.intern("hello");

        assert_eq!(strings.unique_count(), 2);
        assert_eq!(strings.total_count(), 3);
        assert_eq!(strings.get(hello).unwrap(), "hello");
    }

    #[test]
    fn test_clone_string_across_tables() {
        let mut src = SharedStringTable::new();
        src.intern("padding");
        let h = src.intern("carried");

        let mut dst = SharedStringTable::new();
        let new_h = dst.clone_string_from(&src, h).unwrap();
        assert_eq!(dst.get(new_h).unwrap(), "carried");
        // handles are per-table, not shared
        assert_ne!(h, new_h);
    }
}
