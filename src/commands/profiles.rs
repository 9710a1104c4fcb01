use crate::SyncContext;
use crate::config::{TargetMode, TargetSelection};
use crate::utils::paths::to_slash;
use anyhow::Result;
use colored::Colorize;

/// List configured profiles with their manifests and scan roots
///
/// # Errors
///
/// This function currently never fails.
pub fn execute(ctx: &SyncContext) -> Result<()> {
    for profile in &ctx.config.profiles {
        let targets = match &profile.targets {
            TargetSelection::Mode(TargetMode::All) => "all targets".to_string(),
            TargetSelection::Mode(TargetMode::First) => "first target".to_string(),
            TargetSelection::Named(names) => names.join(", "),
        };

        println!(
            "{} {} ({targets})",
            profile.name.bold(),
            to_slash(&profile.manifest).dimmed()
        );
        for root in &profile.roots {
            println!("    {}/{}", to_slash(&root.dir), root.pattern);
        }
    }
    Ok(())
}
