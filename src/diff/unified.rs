use anyhow::Result;
use colored::Colorize;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::io::Write;
use tracing::{Level, debug, span};

/// Configuration for unified diff generation
pub struct UnifiedDiffConfig {
    /// Number of context lines around changes (typically 3)
    pub context_lines: usize,
    /// Diff algorithm to use (Myers, Patience)
    pub algorithm: Algorithm,
    /// Whether to colorize the output
    pub colorize: bool,
}

/// Write a unified diff of a manifest before and after synchronization.
///
/// Produces Git-style output with `--- a/<label>` and `+++ b/<label>`
/// headers, `@@` hunk headers, and `-`/`+` lines colored red and green.
/// Nothing at all is written when the two texts are equal.
///
/// Returns the number of inserted plus deleted lines.
///
/// # Errors
///
/// Returns an error if writing to the output writer fails.
pub fn generate_unified_diff(
    before: &str,
    after: &str,
    label: &str,
    config: &UnifiedDiffConfig,
    writer: &mut dyn Write,
) -> Result<usize> {
    let span = span!(
        Level::DEBUG,
        "diff",
        manifest = label,
        algorithm = ?config.algorithm,
        context = config.context_lines
    );
    let _guard = span.enter();

    let diff = TextDiff::configure()
        .algorithm(config.algorithm)
        .diff_lines(before, after);

    let changed = diff
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .count();
    if changed == 0 {
        return Ok(0);
    }

    let headers = [format!("--- a/{label}"), format!("+++ b/{label}")];
    if config.colorize {
        writeln!(writer, "{}", headers[0].red())?;
        writeln!(writer, "{}", headers[1].green())?;
    } else {
        writeln!(writer, "{}\n{}", headers[0], headers[1])?;
    }

    for hunk in diff
        .unified_diff()
        .context_radius(config.context_lines)
        .iter_hunks()
    {
        let header = hunk.header().to_string();
        if config.colorize {
            writeln!(writer, "{}", header.cyan())?;
        } else {
            writeln!(writer, "{header}")?;
        }

        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete if config.colorize => format!("-{change}").red().to_string(),
                ChangeTag::Insert if config.colorize => format!("+{change}").green().to_string(),
                ChangeTag::Delete => format!("-{change}"),
                ChangeTag::Insert => format!("+{change}"),
                ChangeTag::Equal => format!(" {change}"),
            };

            write!(writer, "{line}")?;
            if change.missing_newline() {
                writeln!(writer)?;
            }
        }
    }

    debug!(changes = changed, "diff complete");
    Ok(changed)
}
