//! Reconciliation of a project document against an expected file set.
//!
//! [`Reconciler::reconcile`] validates everything it can before touching the
//! document (target names, the designated root group's directory), then runs
//! the removal pass followed by the insertion pass.

use super::{SyncError, insertion, removal};
use crate::config::{ProfileConfig, RemovalScope, TargetMode, TargetSelection};
use crate::project::{ObjectId, ProjectDocument};
use crate::scanner::{ExpectedFileSet, SourceFilter};
use crate::utils::paths::{from_slash, normalize_lexically};
use anyhow::Result;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info_span};

/// Everything the reconciler needs to know about a profile.
#[derive(Debug, Clone)]
pub struct ReconcileRules {
    /// Workspace-relative directory holding the manifest
    pub manifest_dir: PathBuf,
    /// Group names from the main group down to the designated root group
    pub group_root: Vec<String>,
    pub filter: SourceFilter,
    pub targets: TargetSelection,
    pub removal_scope: RemovalScope,
    /// Workspace-relative scan-root directories
    pub scan_roots: Vec<PathBuf>,
}

impl ReconcileRules {
    #[must_use]
    pub fn for_profile(profile: &ProfileConfig) -> Self {
        let manifest = normalize_lexically(&profile.manifest);
        Self {
            manifest_dir: manifest.parent().map(Path::to_path_buf).unwrap_or_default(),
            group_root: profile.group_root.clone(),
            filter: SourceFilter::from_profile(profile),
            targets: profile.targets.clone(),
            removal_scope: profile.removal_scope,
            scan_roots: profile
                .roots
                .iter()
                .map(|root| normalize_lexically(&root.dir))
                .collect(),
        }
    }
}

/// Edits made (or, in a dry run, planned) by one reconciliation.
///
/// Every path is workspace-relative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Stale references removed
    pub removed: Vec<PathBuf>,
    /// Groups created, by resolved directory (virtual groups by name path)
    pub groups_created: Vec<PathBuf>,
    /// References inserted
    pub added: Vec<PathBuf>,
    /// Expected paths produced by more than one scan root
    pub coalesced: Vec<PathBuf>,
    /// Expected paths not inserted because an existing group on the way
    /// does not mirror its directory
    pub misplaced: Vec<PathBuf>,
}

impl ReconcileReport {
    /// Whether the document was left unchanged
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.groups_created.is_empty() && self.added.is_empty()
    }
}

/// Where the designated root group is, or will be.
#[derive(Debug)]
pub(crate) struct RootPlan {
    /// Deepest group of the `group_root` path that already exists
    pub existing: ObjectId,
    /// Names of the groups still to create below `existing`
    pub missing: Vec<String>,
    /// Workspace-relative directory of the designated root group
    pub dir: PathBuf,
}

/// Applies one profile's rules to a document.
pub struct Reconciler<'a> {
    rules: &'a ReconcileRules,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub const fn new(rules: &'a ReconcileRules) -> Self {
        Self { rules }
    }

    #[must_use]
    pub const fn rules(&self) -> &ReconcileRules {
        self.rules
    }

    /// Workspace-relative directory of the document's source root
    #[must_use]
    pub fn base_dir(&self, document: &ProjectDocument) -> PathBuf {
        normalize_lexically(&self.rules.manifest_dir.join(from_slash(document.source_root())))
    }

    /// Workspace-relative path a file reference resolves to
    #[must_use]
    pub fn full_path(&self, document: &ProjectDocument, id: &ObjectId) -> Option<PathBuf> {
        let resolved = document.resolve_file(id)?;
        Some(normalize_lexically(&self.base_dir(document).join(resolved)))
    }

    /// Workspace-relative directory a group resolves to
    #[must_use]
    pub fn group_dir(&self, document: &ProjectDocument, id: &ObjectId) -> Option<PathBuf> {
        let resolved = document.resolve_group(id)?;
        Some(normalize_lexically(&self.base_dir(document).join(resolved)))
    }

    /// Bring `document` in line with `expected`
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownTarget`] or [`SyncError::OutsideGroupRoot`]
    /// before any mutation, or an error if a document operation fails.
    pub fn reconcile(&self, document: &mut ProjectDocument, expected: &ExpectedFileSet) -> Result<ReconcileReport> {
        let _span = info_span!("reconcile", expected = expected.len()).entered();

        let targets = self.select_targets(document)?;
        let plan = self.plan_root(document);
        for path in expected.iter() {
            if relative_to_root(path, &plan.dir).is_none() {
                return Err(SyncError::OutsideGroupRoot {
                    path: path.to_path_buf(),
                    root: plan.dir.clone(),
                }
                .into());
            }
        }

        let mut report = ReconcileReport {
            removed: removal::remove_stale(self, document, expected),
            coalesced: expected.coalesced().to_vec(),
            ..ReconcileReport::default()
        };

        // Missing root groups are only created once something goes below them
        let existing = insertion::referenced_paths(self, document);
        if expected.iter().any(|path| !existing.contains(path)) {
            let root = self.ensure_root(document, plan, &mut report)?;
            insertion::insert_missing(self, document, expected, existing, &root, &targets, &mut report)?;
        }

        debug!(
            removed = report.removed.len(),
            added = report.added.len(),
            groups_created = report.groups_created.len(),
            "reconcile complete"
        );
        Ok(report)
    }

    /// Indices of the targets new references join, in declaration order
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownTarget`] for a name the document lacks.
    pub fn select_targets(&self, document: &ProjectDocument) -> Result<Vec<usize>> {
        let count = document.targets().len();
        let mut indices: Vec<usize> = match &self.rules.targets {
            TargetSelection::Mode(TargetMode::All) => (0..count).collect(),
            TargetSelection::Mode(TargetMode::First) => (0..count.min(1)).collect(),
            TargetSelection::Named(names) => names
                .iter()
                .map(|name| {
                    document.target_index(name).ok_or_else(|| SyncError::UnknownTarget {
                        name: name.clone(),
                        available: document.targets().iter().map(|t| t.name().to_string()).collect(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    pub(crate) fn plan_root(&self, document: &ProjectDocument) -> RootPlan {
        let mut existing = document.main_group().clone();
        let mut missing = Vec::new();

        for name in &self.rules.group_root {
            if missing.is_empty()
                && let Some(child) = document.child_group(&existing, name)
            {
                existing = child.clone();
            } else {
                missing.push(name.clone());
            }
        }

        // Groups still to create are virtual and add no path segment
        let dir = self
            .group_dir(document, &existing)
            .unwrap_or_else(|| self.base_dir(document));
        RootPlan { existing, missing, dir }
    }

    fn ensure_root(&self, document: &mut ProjectDocument, plan: RootPlan, report: &mut ReconcileReport) -> Result<ObjectId> {
        let mut current = plan.existing;
        let created_from = self.rules.group_root.len() - plan.missing.len();

        for (offset, name) in plan.missing.iter().enumerate() {
            current = document.new_group(&current, name, None)?;
            let names: PathBuf = self.rules.group_root[..=created_from + offset].iter().collect();
            debug!(group = %names.display(), "created virtual root group");
            report.groups_created.push(names);
        }
        Ok(current)
    }
}

/// `path` relative to `root`, when it lies strictly below it
pub(crate) fn relative_to_root<'p>(path: &'p Path, root: &Path) -> Option<&'p Path> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();
    let plain = components.all(|c| matches!(c, Component::Normal(_)));
    (plain && !relative.as_os_str().is_empty()).then_some(relative)
}
