use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

/// The files one synchronization run expects the manifest to reference.
///
/// Paths are workspace-relative and lexically normalized. Each path remembers
/// the scan root that produced it first; a second root producing the same
/// path is recorded in [`coalesced`](Self::coalesced) instead of being added
/// twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedFileSet {
    paths: BTreeMap<PathBuf, PathBuf>,
    coalesced: Vec<PathBuf>,
}

impl ExpectedFileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path produced by the scan root `root`
    ///
    /// Returns `false` when the path was already present.
    pub fn insert(&mut self, path: PathBuf, root: &Path) -> bool {
        match self.paths.entry(path) {
            Entry::Vacant(slot) => {
                slot.insert(root.to_path_buf());
                true
            }
            Entry::Occupied(slot) => {
                if slot.get() != root && !self.coalesced.contains(slot.key()) {
                    self.coalesced.push(slot.key().clone());
                }
                false
            }
        }
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains_key(path)
    }

    /// Scan root that first produced `path`
    #[must_use]
    pub fn origin(&self, path: &Path) -> Option<&Path> {
        self.paths.get(path).map(PathBuf::as_path)
    }

    /// Paths in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.keys().map(PathBuf::as_path)
    }

    /// Paths produced by more than one scan root
    #[must_use]
    pub fn coalesced(&self) -> &[PathBuf] {
        &self.coalesced
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<PathBuf> for ExpectedFileSet {
    /// Collects paths with no recorded origin
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path, Path::new(""));
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let mut set = ExpectedFileSet::new();
        assert!(set.insert("src/a.cpp".into(), Path::new("src")));
        assert!(!set.insert("src/a.cpp".into(), Path::new("src")));

        assert_eq!(set.len(), 1);
        assert!(set.coalesced().is_empty());
    }

    #[test]
    fn test_second_root_is_coalesced_once() {
        let mut set = ExpectedFileSet::new();
        set.insert("src/a.cpp".into(), Path::new("src"));
        set.insert("src/a.cpp".into(), Path::new("."));
        set.insert("src/a.cpp".into(), Path::new("."));

        assert_eq!(set.len(), 1);
        assert_eq!(set.coalesced(), &[PathBuf::from("src/a.cpp")]);
        assert_eq!(set.origin(Path::new("src/a.cpp")), Some(Path::new("src")));
    }

    #[test]
    fn test_iterates_sorted() {
        let set: ExpectedFileSet = ["b/z.cpp", "a/y.h", "b/a.mm"]
            .into_iter()
            .map(PathBuf::from)
            .collect();

        let paths: Vec<_> = set.iter().collect();
        assert_eq!(
            paths,
            vec![Path::new("a/y.h"), Path::new("b/a.mm"), Path::new("b/z.cpp")]
        );
    }
}
