use super::Reconciler;
use crate::config::RemovalScope;
use crate::project::{ObjectId, ProjectDocument};
use crate::scanner::ExpectedFileSet;
use crate::utils::paths::to_slash;
use std::path::PathBuf;
use tracing::debug;

/// Remove references whose files are no longer expected.
///
/// Only references with a tracked extension are inspected; entry points are
/// always kept. Under [`RemovalScope::Roots`] a reference must also resolve
/// below one of the profile's scan roots. Returns the removed paths, sorted.
pub(crate) fn remove_stale(
    reconciler: &Reconciler<'_>,
    document: &mut ProjectDocument,
    expected: &ExpectedFileSet,
) -> Vec<PathBuf> {
    let rules = reconciler.rules();

    let stale: Vec<(ObjectId, PathBuf)> = document
        .file_references()
        .filter_map(|file| Some((file.id().clone(), reconciler.full_path(document, file.id())?)))
        .filter(|(_, path)| rules.filter.is_tracked_extension(path))
        .filter(|(_, path)| !rules.filter.is_entry_point(path))
        .filter(|(_, path)| match rules.removal_scope {
            RemovalScope::Roots => rules.scan_roots.iter().any(|root| path.starts_with(root)),
            RemovalScope::Manifest => true,
        })
        .filter(|(_, path)| !expected.contains(path))
        .collect();

    let mut removed = Vec::with_capacity(stale.len());
    for (id, path) in stale {
        if document.remove_file(&id) {
            debug!(path = %to_slash(&path), "removed stale reference");
            removed.push(path);
        }
    }

    removed.sort();
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use crate::sync::ReconcileRules;
    use anyhow::Result;

    fn rules(scope: RemovalScope) -> ReconcileRules {
        let mut profile = ProfileConfig::new("mac", "App.srcproj").with_root("source_common", "**/*");
        profile.removal_scope = scope;
        ReconcileRules::for_profile(&profile)
    }

    /// main ─ source_common ─ {old.cpp, keep.cpp, main.cpp, icon.png}
    ///      └ source_mac ─ window.mm
    fn document() -> Result<ProjectDocument> {
        let mut doc = ProjectDocument::new("App", "");
        doc.add_target("App")?;
        let main = doc.main_group().clone();
        let common = doc.new_group(&main, "source_common", Some("source_common"))?;
        for name in ["old.cpp", "keep.cpp", "main.cpp", "icon.png"] {
            let id = doc.new_file(&common, name)?;
            doc.add_to_compile_sources(0, &id)?;
        }
        let mac = doc.new_group(&main, "source_mac", Some("source_mac"))?;
        doc.new_file(&mac, "window.mm")?;
        Ok(doc)
    }

    fn expected() -> ExpectedFileSet {
        [PathBuf::from("source_common/keep.cpp")].into_iter().collect()
    }

    #[test]
    fn test_removes_only_stale_tracked_references() -> Result<()> {
        let rules = rules(RemovalScope::Roots);
        let reconciler = Reconciler::new(&rules);
        let mut doc = document()?;

        let removed = remove_stale(&reconciler, &mut doc, &expected());

        assert_eq!(removed, vec![PathBuf::from("source_common/old.cpp")]);
        // Entry point, resource and out-of-scope references survive
        assert_eq!(doc.file_references().count(), 4);
        assert_eq!(doc.targets()[0].compile_sources().len(), 3);
        Ok(())
    }

    #[test]
    fn test_manifest_scope_reaches_every_reference() -> Result<()> {
        let rules = rules(RemovalScope::Manifest);
        let reconciler = Reconciler::new(&rules);
        let mut doc = document()?;

        let removed = remove_stale(&reconciler, &mut doc, &expected());

        assert_eq!(
            removed,
            vec![
                PathBuf::from("source_common/old.cpp"),
                PathBuf::from("source_mac/window.mm"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_second_pass_removes_nothing() -> Result<()> {
        let rules = rules(RemovalScope::Roots);
        let reconciler = Reconciler::new(&rules);
        let mut doc = document()?;

        remove_stale(&reconciler, &mut doc, &expected());
        assert!(remove_stale(&reconciler, &mut doc, &expected()).is_empty());
        Ok(())
    }
}
