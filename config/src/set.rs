//! Portage set containers
//!
//! A [`PortageSet`] is an ordered sequence of entries bound to its source
//! file. Entry order always equals source line order; callers may insert,
//! replace or remove entries before the set is written out.

use crate::entry::Entry;
use crate::error::{Result, SetError};
use crate::repo::PackageDatabase;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

/// A named, user-defined list of package atoms loaded from one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortageSet {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl PortageSet {
    /// Load and parse a set definition file
    ///
    /// Fails on the first malformed line; a set file either loads whole or
    /// not at all.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(SetError::NotFound(path));
        }

        let content = std::fs::read_to_string(&path)?;
        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            entries.push(Entry::parse(&path, idx + 1, line)?);
        }

        tracing::debug!(
            set = %path.display(),
            entries = entries.len(),
            "loaded set definition"
        );
        Ok(Self { path, entries })
    }

    /// Build a set from already-parsed entries
    pub fn from_entries(path: impl Into<PathBuf>, entries: Vec<Entry>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    /// The set name, derived from the source file name
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }

    /// The source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate every entry against the package database
    ///
    /// All entries are checked even after a failure so the user sees every
    /// problem in one run; returns true iff all entries passed.
    pub fn check(&self, db: &dyn PackageDatabase) -> bool {
        let mut all_valid = true;
        for entry in &self.entries {
            if !entry.check(db) {
                all_valid = false;
            }
        }
        all_valid
    }

    /// Entries in source order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate over entries in source order
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Get an entry by position
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Get a mutable entry by position
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    /// Insert an entry at a position, shifting the rest down
    pub fn insert(&mut self, index: usize, entry: Entry) {
        self.entries.insert(index, entry);
    }

    /// Remove and return the entry at a position
    pub fn remove(&mut self, index: usize) -> Entry {
        self.entries.remove(index)
    }

    /// Append an entry
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<usize> for PortageSet {
    type Output = Entry;

    fn index(&self, index: usize) -> &Entry {
        &self.entries[index]
    }
}

impl IndexMut<usize> for PortageSet {
    fn index_mut(&mut self, index: usize) -> &mut Entry {
        &mut self.entries[index]
    }
}

impl<'a> IntoIterator for &'a PortageSet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Destination, EntryStatus};
    use crate::repo::MemoryDatabase;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_set(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desktop");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_preserves_order_and_line_numbers() {
        let (_dir, path) = write_set("# editors\napp-editors/vim lua\n\n! app-shells/zsh\n");
        let set = PortageSet::load(&path).unwrap();

        assert_eq!(set.name(), "desktop");
        assert_eq!(set.len(), 4);
        let line_nos: Vec<usize> = set.iter().map(|e| e.line_no()).collect();
        assert_eq!(line_nos, [1, 2, 3, 4]);
        assert!(set[0].is_comment());
        assert!(set[2].is_comment());
    }

    #[test]
    fn test_load_no_phantom_trailing_entry() {
        let (_dir, path) = write_set("app-editors/vim\n");
        let set = PortageSet::load(&path).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_handles_crlf() {
        let (_dir, path) = write_set("app-editors/vim lua\r\n# done\r\n");
        let set = PortageSet::load(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].format(Destination::UseFlags), "app-editors/vim lua");
        assert_eq!(set[1].format(Destination::Sets), "# done");
    }

    #[test]
    fn test_load_missing_file() {
        let err = PortageSet::load("/no/such/set").unwrap_err();
        assert!(matches!(err, SetError::NotFound(_)));
    }

    #[test]
    fn test_load_aborts_on_malformed_line() {
        let (_dir, path) = write_set("app-editors/vim\n!\n");
        let err = PortageSet::load(&path).unwrap_err();
        assert!(matches!(err, SetError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_index_mutation() {
        let (_dir, path) = write_set("app-editors/vim\napp-shells/zsh\n");
        let mut set = PortageSet::load(&path).unwrap();

        let removed = set.remove(0);
        assert_eq!(set.len(), 1);
        set.insert(1, removed);
        assert_eq!(set[1].format(Destination::Sets), "app-editors/vim");

        if let Entry::EBuild(ebuild) = &mut set[0] {
            ebuild.status = EntryStatus::Skipped;
        }
        assert_eq!(set[0].format(Destination::Sets), "#app-shells/zsh (skipped)");
    }

    #[test]
    fn test_check_visits_every_entry() {
        let (_dir, path) = write_set("x/missing\napp-editors/vim\ny/also-missing\n");
        let set = PortageSet::load(&path).unwrap();

        let mut db = MemoryDatabase::new();
        db.insert("app-editors/vim-9.1", &["lua"]).unwrap();

        // Aggregated result is false, but valid entries are still checked
        assert!(!set.check(&db));
        assert!(set[1].check(&db));
    }
}
