//! Synchronization of one profile: scan, reconcile, persist.
//!
//! A run is linear and single-threaded. The scanner runs first and any
//! scan error aborts before the manifest is opened; the manifest is then
//! locked, loaded, reconciled and, when anything changed, saved atomically.

/// Categorized synchronization errors
pub mod errors;
/// Insertion pass
mod insertion;
/// Rules, report and the reconciler driving both passes
pub mod reconcile;
/// Removal pass
mod removal;

pub use errors::SyncError;
pub use reconcile::{ReconcileReport, ReconcileRules, Reconciler};

use crate::config::ProfileConfig;
use crate::lock::ManifestLock;
use crate::project::format;
use crate::scanner::{ExpectedFileSet, SourceScanner};
use crate::utils::paths::normalize_lexically;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// Options for a synchronization run
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute the edits without saving
    pub dry_run: bool,
}

/// Manifest text before and after a dry run
#[derive(Debug, Clone)]
pub struct ManifestPreview {
    pub before: String,
    pub after: String,
}

/// Result of synchronizing one profile
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub profile: String,
    /// Absolute manifest path
    pub manifest: PathBuf,
    /// Number of expected files found by the scanner
    pub expected_count: usize,
    pub report: ReconcileReport,
    /// Whether the manifest was written
    pub saved: bool,
    /// Only set for dry runs
    pub preview: Option<ManifestPreview>,
}

impl SyncOutcome {
    /// Whether the manifest already matched the source tree
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.report.is_noop()
    }
}

/// Synchronizes one profile's manifest with its scan roots.
pub struct Synchronizer {
    profile: String,
    manifest: PathBuf,
    scanner: SourceScanner,
    rules: ReconcileRules,
}

impl Synchronizer {
    /// Create a synchronizer for `profile` in the workspace at `workspace_root`
    ///
    /// # Errors
    ///
    /// Returns an error if a scan root's glob pattern is invalid.
    pub fn new(workspace_root: &Path, profile: &ProfileConfig, follow_symlinks: bool) -> Result<Self> {
        Ok(Self {
            profile: profile.name.clone(),
            manifest: workspace_root.join(normalize_lexically(&profile.manifest)),
            scanner: SourceScanner::new(workspace_root, profile, follow_symlinks)?,
            rules: ReconcileRules::for_profile(profile),
        })
    }

    /// Compute the expected file set without opening the manifest
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ScanRootMissing`] or a traversal error.
    pub fn scan(&self) -> Result<ExpectedFileSet> {
        self.scanner.scan()
    }

    /// Run one synchronization
    ///
    /// # Errors
    ///
    /// Returns the first [`SyncError`] (or I/O error) encountered; no
    /// partial result is saved.
    pub fn run(&self, options: SyncOptions) -> Result<SyncOutcome> {
        let _span = info_span!("sync", profile = %self.profile, dry_run = options.dry_run).entered();

        let expected = self.scan()?;

        if !self.manifest.is_file() {
            return Err(SyncError::ManifestNotFound {
                path: self.manifest.clone(),
            }
            .into());
        }
        let lock = if options.dry_run {
            None
        } else {
            Some(ManifestLock::acquire(&self.manifest)?)
        };

        let mut document = format::load(&self.manifest)?;
        let before = if options.dry_run {
            Some(format::to_toml_string(&document)?)
        } else {
            None
        };

        let report = Reconciler::new(&self.rules).reconcile(&mut document, &expected)?;

        let mut saved = false;
        let preview = match before {
            Some(before) => Some(ManifestPreview {
                before,
                after: format::to_toml_string(&document)?,
            }),
            None if report.is_noop() => {
                info!("manifest up to date, not saving");
                None
            }
            None => {
                format::save(&document, &self.manifest)?;
                saved = true;
                None
            }
        };

        if let Some(lock) = lock {
            lock.release()?;
        }

        info!(
            added = report.added.len(),
            removed = report.removed.len(),
            saved,
            "sync finished"
        );

        Ok(SyncOutcome {
            profile: self.profile.clone(),
            manifest: self.manifest.clone(),
            expected_count: expected.len(),
            report,
            saved,
            preview,
        })
    }
}
