//! Human-readable progress output for the srcsync CLI.
//!
//! Routine lines are dimmed, edits to a manifest are printed git-style
//! (`Added`, `Removed`, `Created group`), warnings are bold yellow. All of it
//! goes to stderr so stdout stays clean for `scan` listings and diffs.

use crate::sync::ReconcileReport;
use crate::utils::paths::to_slash;
use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.green());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a verbose debug message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a git-style action message with a bold verb and normal message.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{:>13} {}", verb.bold(), message);
}

/// Prints one line per manifest edit in a reconcile report.
///
/// Dry runs use the conditional form of each verb ("Would add").
pub fn report_edits(report: &ReconcileReport, dry_run: bool) {
    let verb = |past: &str, planned: &str| {
        if dry_run {
            planned.to_string()
        } else {
            past.to_string()
        }
    };

    for path in &report.removed {
        action(&verb("Removed", "Would remove"), &display(path));
    }
    for path in &report.groups_created {
        action(&verb("Created group", "Would create"), &format!("{}/", display(path)));
    }
    for path in &report.added {
        action(&verb("Added", "Would add"), &display(path));
    }
    for path in &report.coalesced {
        warning(&format!(
            "warning: {} is matched by more than one scan root; keeping a single reference",
            display(path)
        ));
    }
    for path in &report.misplaced {
        warning(&format!(
            "warning: {} skipped: an existing group on its path does not mirror its directory",
            display(path)
        ));
    }
}

/// Renders a workspace-relative path the same way on every platform.
fn display(path: &Path) -> String {
    to_slash(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_round_trip() {
        let levels = [Verbosity::Quiet, Verbosity::Normal, Verbosity::Verbose];
        for level in &levels {
            set_verbosity(*level);
            assert_eq!(get_verbosity(), *level);
        }
        set_verbosity(Verbosity::Normal);
    }

    #[test]
    fn test_display_uses_forward_slashes() {
        let path = Path::new("engine").join("net").join("socket.cpp");
        assert_eq!(display(&path), "engine/net/socket.cpp");
    }
}
