use crate::SyncContext;
use crate::output;
use crate::utils::paths::to_slash;
use anyhow::Result;
use std::io::Write;

/// Print the expected file set of a profile, one workspace-relative path per line
///
/// # Errors
///
/// Returns an error if the profile is unknown, a scan root is missing, or
/// stdout cannot be written.
pub fn execute(ctx: &SyncContext, profile: &str) -> Result<()> {
    let profile = ctx.profile(profile)?;
    let expected = ctx.synchronizer(profile)?.scan()?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for path in expected.iter() {
        writeln!(handle, "{}", to_slash(path))?;
    }
    handle.flush()?;

    for path in expected.coalesced() {
        let origin = expected.origin(path).map(to_slash).unwrap_or_default();
        output::warning(&format!(
            "warning: {} is matched by more than one scan root (kept from {origin})",
            to_slash(path)
        ));
    }
    output::verbose(&format!("{} files", expected.len()));
    Ok(())
}
