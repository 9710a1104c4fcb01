use crate::SyncContext;
use crate::output;
use crate::sync::SyncOptions;
use anyhow::Result;

/// Dry-run the named profiles and report which manifests are out of date
///
/// Returns `true` when every manifest already matches its source tree.
///
/// # Errors
///
/// Returns an error if any profile fails to synchronize.
pub fn execute(ctx: &SyncContext, profiles: &[String]) -> Result<bool> {
    let mut up_to_date = true;

    for profile in ctx.select_profiles(profiles)? {
        let outcome = ctx
            .synchronizer(profile)?
            .run(SyncOptions { dry_run: true })?;
        let manifest = super::workspace_display(&ctx.workspace_root, &outcome.manifest);

        if outcome.is_up_to_date() {
            output::info(&format!("{}: {manifest} is up to date", outcome.profile));
            continue;
        }

        up_to_date = false;
        output::report_edits(&outcome.report, true);
        output::warning(&format!(
            "{}: {manifest} is out of date ({} to add, {} to remove)",
            outcome.profile,
            outcome.report.added.len(),
            outcome.report.removed.len()
        ));
    }

    Ok(up_to_date)
}
