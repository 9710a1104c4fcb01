//! Command-line interface definitions for srcsync.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes,
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for srcsync.
#[derive(Parser)]
#[command(
    name = "srcsync",
    version = crate::VERSION,
    about = "Keep a build-project manifest in sync with source directories",
    long_about = "Scans source directories and updates a project manifest: removes references to \
                  deleted files, mirrors new directories as groups, and registers new files with \
                  every build target"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: srcsync.toml in the current or a parent directory)
    #[arg(short, long, global = true, env = crate::CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize manifests with their source directories
    Sync {
        /// Profiles to synchronize (all profiles when omitted)
        profiles: Vec<String>,

        /// Show a diff of the manifest instead of saving it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Exit with status 1 when any manifest is out of date
    Check {
        /// Profiles to check (all profiles when omitted)
        profiles: Vec<String>,
    },

    /// List the source files a profile expects, one per line
    Scan {
        /// Profile name
        profile: String,
    },

    /// Show a profile's manifest as a tree of groups and files
    Tree {
        /// Profile name
        profile: String,
    },

    /// List configured profiles
    Profiles,

    /// Create an empty manifest for a profile
    Init {
        /// Profile name
        profile: String,

        /// Build target to declare (repeatable)
        #[arg(short, long = "target", value_name = "NAME", required = true)]
        targets: Vec<String>,

        /// Overwrite an existing manifest
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
