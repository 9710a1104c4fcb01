use crate::SyncContext;
use crate::project::format;
use crate::project::tree::render_tree;
use anyhow::Result;

/// Print a profile's manifest as an ASCII tree
///
/// # Errors
///
/// Returns an error if the profile is unknown or its manifest cannot be loaded.
pub fn execute(ctx: &SyncContext, profile: &str) -> Result<()> {
    let profile = ctx.profile(profile)?;
    let document = format::load(&ctx.manifest_path(profile))?;

    print!("{}", render_tree(&document));
    Ok(())
}
