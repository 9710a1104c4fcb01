pub mod parser;
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Extensions tracked when a profile does not list its own
pub const DEFAULT_EXTENSIONS: &[&str] = &["cpp", "h", "m", "mm", "inc"];

/// Entry-point file names skipped when a profile does not list its own
pub const DEFAULT_ENTRY_POINTS: &[&str] = &["main.cpp"];

/// Glob used for a scan root without an explicit pattern
pub const DEFAULT_PATTERN: &str = "**/*";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Synchronization profiles, one per manifest/platform pairing
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Context lines around changes in dry-run diffs
    #[serde(default = "default_diff_context")]
    pub diff_context: usize,
    #[serde(default)]
    pub diff_algorithm: DiffAlgorithm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
}

/// One synchronization run: which directories feed which manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub name: String,

    /// Manifest file, relative to the workspace root
    pub manifest: PathBuf,

    /// Group names below the main group under which directories are mirrored
    #[serde(default)]
    pub group_root: Vec<String>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Substrings that exclude a workspace-relative path from the scan
    #[serde(default)]
    pub exclude: Vec<String>,

    /// File names never added or removed
    #[serde(default = "default_entry_points")]
    pub entry_points: Vec<String>,

    #[serde(default)]
    pub targets: TargetSelection,

    #[serde(default)]
    pub removal_scope: RemovalScope,

    #[serde(default)]
    pub roots: Vec<ScanRoot>,
}

/// A directory plus the glob selecting files below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRoot {
    /// Directory, relative to the workspace root
    pub dir: PathBuf,
    /// Pattern matched against paths relative to `dir`
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

/// Which targets receive newly inserted references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSelection {
    Mode(TargetMode),
    Named(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Every target, in declaration order
    All,
    /// Only the first declared target
    First,
}

/// Which stale references the removal pass may delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemovalScope {
    /// References resolving below one of the profile's scan roots
    #[default]
    Roots,
    /// Every reference with a tracked extension
    Manifest,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            diff_context: default_diff_context(),
            diff_algorithm: DiffAlgorithm::default(),
        }
    }
}

impl Default for TargetSelection {
    fn default() -> Self {
        Self::Mode(TargetMode::All)
    }
}

impl ScanRoot {
    /// Create a scan root for `dir` with the given glob
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }
}

impl ProfileConfig {
    /// Create a profile with default filters and no scan roots
    pub fn new(name: impl Into<String>, manifest: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            manifest: manifest.into(),
            group_root: Vec::new(),
            extensions: default_extensions(),
            exclude: Vec::new(),
            entry_points: default_entry_points(),
            targets: TargetSelection::default(),
            removal_scope: RemovalScope::default(),
            roots: Vec::new(),
        }
    }

    /// Add a scan root (builder style)
    #[must_use]
    pub fn with_root(mut self, dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        self.roots.push(ScanRoot::new(dir, pattern));
        self
    }

    /// Tracked extensions without leading dots
    #[must_use]
    pub fn normalized_extensions(&self) -> BTreeSet<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

impl Config {
    /// Get a profile by name
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or cannot be read
    /// - The file contains invalid TOML
    /// - Validation fails (no profiles, duplicate names, bad globs, ...)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }
}

// Default functions for serde
fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect()
}

fn default_entry_points() -> Vec<String> {
    DEFAULT_ENTRY_POINTS.iter().map(|s| (*s).to_string()).collect()
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

const fn default_diff_context() -> usize {
    3
}
