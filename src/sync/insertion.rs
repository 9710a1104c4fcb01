use super::reconcile::relative_to_root;
use super::{ReconcileReport, Reconciler, SyncError};
use crate::project::{ObjectId, ProjectDocument};
use crate::scanner::ExpectedFileSet;
use crate::utils::paths::to_slash;
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Workspace-relative paths of every file reference in the document
pub(crate) fn referenced_paths(reconciler: &Reconciler<'_>, document: &ProjectDocument) -> HashSet<PathBuf> {
    document
        .file_references()
        .filter_map(|file| reconciler.full_path(document, file.id()))
        .collect()
}

/// Insert a reference for every expected path the document lacks.
///
/// `existing` holds the paths already referenced (see [`referenced_paths`]).
/// Directories below the designated root group are mirrored as groups,
/// creating any that are missing; existing groups are matched by exact name.
/// New references join every target in `targets`.
pub(crate) fn insert_missing(
    reconciler: &Reconciler<'_>,
    document: &mut ProjectDocument,
    expected: &ExpectedFileSet,
    mut existing: HashSet<PathBuf>,
    root: &ObjectId,
    targets: &[usize],
    report: &mut ReconcileReport,
) -> Result<()> {
    let root_dir = reconciler
        .group_dir(document, root)
        .unwrap_or_else(|| reconciler.base_dir(document));

    for path in expected.iter() {
        if existing.contains(path) {
            continue;
        }

        let Some(relative) = relative_to_root(path, &root_dir) else {
            return Err(SyncError::OutsideGroupRoot {
                path: path.to_path_buf(),
                root: root_dir,
            }
            .into());
        };
        let Some(file_name) = relative.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        // Descending into a namesake that does not mirror its directory would
        // add a reference resolving elsewhere, which the next removal pass
        // would delete again
        if let Some(group_dir) = non_mirroring_group(reconciler, document, root, &root_dir, relative) {
            warn!(
                path = %to_slash(path),
                group = %to_slash(&group_dir),
                "skipping file: existing group does not mirror its directory"
            );
            report.misplaced.push(path.to_path_buf());
            continue;
        }

        let group = descend_or_create(reconciler, document, root, &root_dir, relative, report)?;
        let id = document.new_file(&group, file_name)?;
        for &target in targets {
            document.add_to_compile_sources(target, &id)?;
        }

        debug!(path = %to_slash(path), "added reference");
        existing.insert(path.to_path_buf());
        report.added.push(path.to_path_buf());
    }

    Ok(())
}

/// Resolved directory of the first existing group along the walk to
/// `relative` that does not mirror its directory.
///
/// Groups created by the walk always mirror their directory, so only
/// groups that already exist need checking.
fn non_mirroring_group(
    reconciler: &Reconciler<'_>,
    document: &ProjectDocument,
    root: &ObjectId,
    root_dir: &Path,
    relative: &Path,
) -> Option<PathBuf> {
    let mut group = root;
    let mut dir = root_dir.to_path_buf();

    for component in relative.parent()?.iter() {
        let name = component.to_str()?;
        dir.push(name);

        let child = document.child_group(group, name)?;
        let child_dir = reconciler.group_dir(document, child)?;
        if child_dir != dir {
            return Some(child_dir);
        }
        group = child;
    }
    None
}

/// Walk the directory components of `relative` from `root`, creating
/// missing groups, and return the group the file belongs in.
fn descend_or_create(
    reconciler: &Reconciler<'_>,
    document: &mut ProjectDocument,
    root: &ObjectId,
    root_dir: &Path,
    relative: &Path,
    report: &mut ReconcileReport,
) -> Result<ObjectId> {
    let mut group = root.clone();
    let mut dir = root_dir.to_path_buf();

    let Some(parent) = relative.parent() else {
        return Ok(group);
    };

    for component in parent.iter() {
        let Some(name) = component.to_str() else {
            continue;
        };
        dir.push(name);

        if let Some(child) = document.child_group(&group, name) {
            group = child.clone();
            continue;
        }

        group = document.new_group(&group, name, Some(name))?;
        debug!(group = %to_slash(&dir), "created group");
        report.groups_created.push(
            reconciler
                .group_dir(document, &group)
                .unwrap_or_else(|| dir.clone()),
        );
    }

    Ok(group)
}
