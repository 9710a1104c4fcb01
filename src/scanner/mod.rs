//! Source scanner: expands a profile's scan roots into the expected file set.
//!
//! Each root is a directory plus a glob. The scanner walks the directory,
//! matches the glob against the `/`-separated path relative to the root, and
//! keeps the files the profile's [`SourceFilter`] accepts. The result is a
//! pure function of the filesystem and the profile.

/// Files expected by one synchronization run.
pub mod expected;

/// Extension, exclusion and entry-point predicates.
pub mod filter;

pub use expected::ExpectedFileSet;
pub use filter::SourceFilter;

use crate::config::ProfileConfig;
use crate::sync::SyncError;
use crate::utils::paths::{normalize_lexically, to_slash};
use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, info_span, trace};
use walkdir::WalkDir;

/// `*` stays within one directory, `**` spans any number of them.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled scan root
#[derive(Debug, Clone)]
struct CompiledRoot {
    /// Workspace-relative, normalized directory
    dir: PathBuf,
    pattern: Pattern,
}

/// Scanner for one profile's scan roots
pub struct SourceScanner {
    workspace_root: PathBuf,
    profile: String,
    roots: Vec<CompiledRoot>,
    filter: SourceFilter,
    follow_symlinks: bool,
}

impl SourceScanner {
    /// Create a scanner for `profile`, resolving roots against `workspace_root`
    ///
    /// # Errors
    ///
    /// Returns an error if a root's glob pattern is invalid.
    pub fn new(workspace_root: &Path, profile: &ProfileConfig, follow_symlinks: bool) -> Result<Self> {
        let roots = profile
            .roots
            .iter()
            .map(|root| {
                let pattern = Pattern::new(&root.pattern).with_context(|| {
                    format!(
                        "Invalid glob pattern '{}' in profile '{}'",
                        root.pattern, profile.name
                    )
                })?;
                Ok(CompiledRoot {
                    dir: normalize_lexically(&root.dir),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            workspace_root: workspace_root.to_path_buf(),
            profile: profile.name.clone(),
            roots,
            filter: SourceFilter::from_profile(profile),
            follow_symlinks,
        })
    }

    /// Expand every scan root into the expected file set
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ScanRootMissing`] if a root is not a directory,
    /// or an error if directory traversal fails.
    pub fn scan(&self) -> Result<ExpectedFileSet> {
        let _span = info_span!("scan", profile = %self.profile).entered();

        // Every root is checked before any is walked
        for root in &self.roots {
            let abs = self.workspace_root.join(&root.dir);
            if !abs.is_dir() {
                return Err(SyncError::ScanRootMissing {
                    profile: self.profile.clone(),
                    root: abs,
                }
                .into());
            }
        }

        let mut expected = ExpectedFileSet::new();
        for root in &self.roots {
            self.scan_root(root, &mut expected)?;
        }

        for path in expected.coalesced() {
            tracing::warn!(path = %to_slash(path), "path produced by more than one scan root");
        }
        debug!(files = expected.len(), "scan complete");

        Ok(expected)
    }

    fn scan_root(&self, root: &CompiledRoot, expected: &mut ExpectedFileSet) -> Result<()> {
        let abs_root = self.workspace_root.join(&root.dir);
        let mut matched = 0usize;

        let walker = WalkDir::new(&abs_root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(root, &abs_root, entry));

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to read directory entry in {}", abs_root.display()))?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&abs_root) else {
                continue;
            };
            if !root.pattern.matches_with(&to_slash(relative), MATCH_OPTIONS) {
                continue;
            }

            let path = normalize_lexically(&root.dir.join(relative));
            if !self.filter.accepts(&path) {
                trace!(path = %to_slash(&path), "filtered out");
                continue;
            }

            expected.insert(path, &root.dir);
            matched += 1;
        }

        debug!(root = %to_slash(&root.dir), matched, "scanned root");
        Ok(())
    }

    /// Directories whose path contains an exclusion substring are pruned;
    /// every file below them would be excluded anyway.
    fn is_excluded_dir(&self, root: &CompiledRoot, abs_root: &Path, entry: &walkdir::DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        entry
            .path()
            .strip_prefix(abs_root)
            .is_ok_and(|relative| self.filter.is_excluded(&root.dir.join(relative)))
    }
}
