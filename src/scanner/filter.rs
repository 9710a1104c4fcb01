use crate::config::ProfileConfig;
use crate::utils::paths::to_slash;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Include/exclude predicates shared by the scanner and the removal pass.
///
/// The same filter decides which files on disk are expected and which
/// manifest references the removal pass may inspect, so the two can never
/// disagree about what "tracked" means.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    extensions: BTreeSet<String>,
    exclude: Vec<String>,
    entry_points: HashSet<String>,
}

impl SourceFilter {
    #[must_use]
    pub fn new<I, E, P>(extensions: I, exclude: E, entry_points: P) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
            exclude: exclude.into_iter().filter(|s| !s.is_empty()).collect(),
            entry_points: entry_points.into_iter().collect(),
        }
    }

    /// Build the filter a profile describes
    #[must_use]
    pub fn from_profile(profile: &ProfileConfig) -> Self {
        Self::new(
            profile.normalized_extensions(),
            profile.exclude.iter().cloned(),
            profile.entry_points.iter().cloned(),
        )
    }

    /// Whether the file's extension is on the allow-list (case-sensitive)
    #[must_use]
    pub fn is_tracked_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(ext))
    }

    /// Whether the file name is a reserved entry point
    #[must_use]
    pub fn is_entry_point(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.entry_points.contains(name))
    }

    /// Whether any exclusion substring occurs in the `/`-separated path
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let slash = to_slash(path);
        self.exclude.iter().any(|needle| slash.contains(needle.as_str()))
    }

    /// Whether a scanned file belongs in the expected set
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        self.is_tracked_extension(path) && !self.is_entry_point(path) && !self.is_excluded(path)
    }
}
