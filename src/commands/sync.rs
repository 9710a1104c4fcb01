use crate::SyncContext;
use crate::diff::{config_from_output, generate_unified_diff};
use crate::output;
use crate::sync::{SyncOptions, SyncOutcome};
use anyhow::Result;
use std::io::{IsTerminal, Write};

/// Synchronize the named profiles (every profile when `profiles` is empty)
///
/// Profiles run one after another; the first failure aborts the command.
///
/// # Errors
///
/// Returns an error if:
/// - A profile name is unknown
/// - A scan root is missing
/// - A manifest is missing, malformed, or cannot be saved
/// - The reconciler rejects the profile (unknown target, file outside the root group)
pub fn execute(ctx: &SyncContext, profiles: &[String], dry_run: bool) -> Result<()> {
    let options = SyncOptions { dry_run };

    for profile in ctx.select_profiles(profiles)? {
        let outcome = ctx.synchronizer(profile)?.run(options)?;

        output::report_edits(&outcome.report, dry_run);
        if dry_run {
            print_preview(ctx, &outcome)?;
        }
        print_summary(ctx, &outcome, dry_run);
    }

    Ok(())
}

/// Write the manifest diff of a dry run to stdout
fn print_preview(ctx: &SyncContext, outcome: &SyncOutcome) -> Result<()> {
    let Some(preview) = &outcome.preview else {
        return Ok(());
    };

    let stdout = std::io::stdout();
    let config = config_from_output(&ctx.config.output, stdout.is_terminal());
    let label = super::workspace_display(&ctx.workspace_root, &outcome.manifest);

    let mut handle = stdout.lock();
    generate_unified_diff(&preview.before, &preview.after, &label, &config, &mut handle)?;
    handle.flush()?;
    Ok(())
}

fn print_summary(ctx: &SyncContext, outcome: &SyncOutcome, dry_run: bool) {
    let manifest = super::workspace_display(&ctx.workspace_root, &outcome.manifest);

    if outcome.is_up_to_date() {
        output::info(&format!(
            "{}: {manifest} is up to date ({} source files)",
            outcome.profile, outcome.expected_count
        ));
        return;
    }

    let report = &outcome.report;
    let summary = format!(
        "{}: {} added, {} removed, {} groups created",
        outcome.profile,
        report.added.len(),
        report.removed.len(),
        report.groups_created.len()
    );

    if dry_run {
        output::info(&format!("{summary} (dry run, {manifest} not saved)"));
    } else {
        output::success(&format!("{summary}; saved {manifest}"));
    }
}
