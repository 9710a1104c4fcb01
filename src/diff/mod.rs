//! Diff rendering for dry runs.
//!
//! A dry run never writes the manifest; instead it shows the difference
//! between the manifest as loaded and as it would be saved.

/// Unified diff generation for manifest text
pub mod unified;

pub use unified::{UnifiedDiffConfig, generate_unified_diff};

use crate::config::{DiffAlgorithm, OutputConfig};
use similar::Algorithm;

/// Convert `DiffAlgorithm` config enum to `similar::Algorithm`
#[must_use]
pub const fn config_to_algorithm(algo: DiffAlgorithm) -> Algorithm {
    match algo {
        DiffAlgorithm::Myers => Algorithm::Myers,
        DiffAlgorithm::Patience => Algorithm::Patience,
    }
}

/// Diff settings from the `[output]` section
#[must_use]
pub fn config_from_output(output: &OutputConfig, colorize: bool) -> UnifiedDiffConfig {
    UnifiedDiffConfig {
        context_lines: output.diff_context,
        algorithm: config_to_algorithm(output.diff_algorithm),
        colorize,
    }
}
