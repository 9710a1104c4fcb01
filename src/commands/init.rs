use crate::SyncContext;
use crate::output;
use crate::project::{ProjectDocument, format};
use crate::utils::paths::{ensure_parent_dirs, normalize_lexically, relative_path, to_slash};
use anyhow::{Context, Result};
use std::path::Path;

/// Create an empty manifest for a profile
///
/// The manifest's source root points at the workspace root, the main group
/// is named after the manifest file, the profile's `group_root` groups are
/// created as virtual groups, and one empty target is declared per name.
///
/// # Errors
///
/// Returns an error if:
/// - The profile is unknown
/// - The manifest already exists and `force` is not set
/// - A target name is repeated
/// - The manifest cannot be written
pub fn execute(ctx: &SyncContext, profile: &str, targets: &[String], force: bool) -> Result<()> {
    let profile = ctx.profile(profile)?;
    let manifest_path = ctx.manifest_path(profile);
    let display = super::workspace_display(&ctx.workspace_root, &manifest_path);

    if manifest_path.exists() && !force {
        anyhow::bail!("Manifest {display} already exists (use --force to overwrite)");
    }

    let relative_manifest = normalize_lexically(&profile.manifest);
    let manifest_dir = relative_manifest.parent().unwrap_or_else(|| Path::new(""));
    let source_root = to_slash(&relative_path(manifest_dir, Path::new("")));

    let main_name = relative_manifest
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(profile.name.as_str());

    let mut document = ProjectDocument::new(main_name, &source_root);
    for target in targets {
        document.add_target(target)?;
    }

    let mut group = document.main_group().clone();
    for name in &profile.group_root {
        group = document.new_group(&group, name, None)?;
    }

    ensure_parent_dirs(&manifest_path)?;
    format::save(&document, &manifest_path)
        .with_context(|| format!("Failed to initialize manifest for profile '{}'", profile.name))?;

    output::success(&format!(
        "Created {display} with {} target{}",
        targets.len(),
        if targets.len() == 1 { "" } else { "s" }
    ));
    Ok(())
}
