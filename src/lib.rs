#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # srcsync - keep a build-project manifest in sync with source directories
//!
//! srcsync scans configured source directories and brings a project
//! manifest (a tree of groups, file references and per-target compile
//! sources) in line with what is on disk: stale references are removed,
//! new files are inserted into groups mirroring their directories and
//! registered with the build targets, and the manifest is saved atomically.
//!
//! ## Architecture
//!
//! - [`scanner`]: expands scan roots into the expected file set
//! - [`project`]: the manifest document, its TOML format and tree rendering
//! - [`sync`]: the reconciler (removal and insertion passes) and run driver
//! - [`config`]: `srcsync.toml` parsing and validation
//! - [`commands`]: command implementations behind the CLI
//! - [`output`]: human-readable, verbosity-aware terminal output
//!
//! ## Example Usage
//!
//! ```no_run
//! use srcsync::SyncContext;
//! use srcsync::sync::SyncOptions;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = SyncContext::discover(None)?;
//! let profile = ctx.profile("ios")?;
//! let outcome = ctx.synchronizer(profile)?.run(SyncOptions::default())?;
//! println!("{} references added", outcome.report.added.len());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations behind the CLI.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Unified diffs of manifest text for dry runs.
pub mod diff;

/// Exclusive manifest locking for the duration of a run.
pub mod lock;

/// Output formatting for terminal display.
pub mod output;

/// Project manifest document model and on-disk format.
pub mod project;

/// Source directory scanning.
pub mod scanner;

/// Manifest reconciliation and synchronization runs.
pub mod sync;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use config::{Config, ProfileConfig};
use std::path::{Path, PathBuf};
use sync::{SyncError, Synchronizer};

/// Current version of the srcsync binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file name searched for in the workspace.
pub const CONFIG_FILE_NAME: &str = "srcsync.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "SRCSYNC_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SRCSYNC_LOG";

/// Central context for all srcsync operations.
///
/// Holds the loaded configuration and the workspace root every relative
/// path in it is resolved against (the directory holding the config file).
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Directory holding the configuration file.
    pub workspace_root: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: Config,
}

impl SyncContext {
    /// Locate and load the configuration
    ///
    /// An explicit path wins; otherwise `srcsync.toml` is searched for from
    /// the current directory upwards.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration file is found or it fails to load.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_config_path(path);
        }

        let cwd = std::env::current_dir().context("Could not determine current directory")?;
        let path = find_config(&cwd, dirs::home_dir().as_deref()).with_context(|| {
            format!(
                "No {CONFIG_FILE_NAME} found in {} or any parent directory (use --config or {CONFIG_ENV})",
                cwd.display()
            )
        })?;
        Self::from_config_path(&path)
    }

    /// Load the configuration at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or is invalid.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        let config_path = utils::paths::make_absolute(path)?;
        let config = Config::load(&config_path)?;

        // Unknown keys are warnings, not errors
        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            output::warning(&format!("Warning: Configuration validation failed: {e}"));
        }

        let workspace_root = config_path
            .parent()
            .map(Path::to_path_buf)
            .context("Configuration file has no parent directory")?;

        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    /// Look up a profile by name
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownProfile`] if no such profile is configured.
    pub fn profile(&self, name: &str) -> Result<&ProfileConfig> {
        self.config.profile(name).ok_or_else(|| {
            SyncError::UnknownProfile {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Resolve profile names, or every profile when `names` is empty
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownProfile`] for the first unknown name.
    pub fn select_profiles(&self, names: &[String]) -> Result<Vec<&ProfileConfig>> {
        if names.is_empty() {
            return Ok(self.config.profiles.iter().collect());
        }
        names.iter().map(|name| self.profile(name)).collect()
    }

    /// Create a synchronizer for one profile
    ///
    /// # Errors
    ///
    /// Returns an error if the profile's glob patterns are invalid.
    pub fn synchronizer(&self, profile: &ProfileConfig) -> Result<Synchronizer> {
        Synchronizer::new(&self.workspace_root, profile, self.config.scan.follow_symlinks)
    }

    /// Absolute manifest path of a profile
    #[must_use]
    pub fn manifest_path(&self, profile: &ProfileConfig) -> PathBuf {
        self.workspace_root
            .join(utils::paths::normalize_lexically(&profile.manifest))
    }
}

/// Search `start` and its ancestors for the configuration file
///
/// The search stops after the home directory, when it is an ancestor.
#[must_use]
pub fn find_config(start: &Path, home: Option<&Path>) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if home.is_some_and(|home| dir == home) {
            break;
        }
    }
    None
}
