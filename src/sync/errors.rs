use std::fmt;
use std::path::PathBuf;

/// Categorized synchronization failures.
///
/// Every variant aborts the run. Variants raised before the reconciler
/// touches the document guarantee that the manifest on disk is unchanged;
/// [`SyncError::Save`] is the only one raised after mutation, and the atomic
/// save leaves the previous file in place.
#[derive(Debug)]
pub enum SyncError {
    /// A configured scan root does not exist or is not a directory
    ScanRootMissing {
        /// Profile the root belongs to
        profile: String,
        /// Resolved root directory
        root: PathBuf,
    },
    /// The manifest file does not exist
    ManifestNotFound {
        /// Manifest location
        path: PathBuf,
    },
    /// The manifest exists but cannot be read, parsed or validated
    ManifestMalformed {
        /// Manifest location
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
    /// An expected file does not lie below the designated root group's directory
    OutsideGroupRoot {
        /// Workspace-relative file path
        path: PathBuf,
        /// Directory the designated root group resolves to
        root: PathBuf,
    },
    /// A profile names a target the manifest does not declare
    UnknownTarget {
        /// Target name from the configuration
        name: String,
        /// Targets the manifest declares
        available: Vec<String>,
    },
    /// No profile with this name is configured
    UnknownProfile {
        /// Requested profile name
        name: String,
    },
    /// Serializing or writing the manifest failed
    Save {
        /// Manifest location
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },
}

impl SyncError {
    /// Get a short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::ScanRootMissing { .. } => "Scan Error",
            Self::ManifestNotFound { .. } | Self::ManifestMalformed { .. } => {
                "Manifest Load Error"
            }
            Self::OutsideGroupRoot { .. }
            | Self::UnknownTarget { .. }
            | Self::UnknownProfile { .. } => "Configuration Error",
            Self::Save { .. } => "Save Error",
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanRootMissing { profile, root } => write!(
                f,
                "Scan root {} of profile '{profile}' does not exist or is not a directory",
                root.display()
            ),
            Self::ManifestNotFound { path } => write!(
                f,
                "Manifest not found: {} (create one with 'srcsync init')",
                path.display()
            ),
            Self::ManifestMalformed { path, reason } => {
                write!(f, "Malformed manifest {}: {reason}", path.display())
            }
            Self::OutsideGroupRoot { path, root } => write!(
                f,
                "{} is outside the directory of the designated root group ({})",
                path.display(),
                if root.as_os_str().is_empty() {
                    ".".to_string()
                } else {
                    root.display().to_string()
                }
            ),
            Self::UnknownTarget { name, available } => {
                if available.is_empty() {
                    write!(f, "Unknown target '{name}': the manifest declares no targets")
                } else {
                    write!(
                        f,
                        "Unknown target '{name}' (available: {})",
                        available.join(", ")
                    )
                }
            }
            Self::UnknownProfile { name } => write!(f, "Unknown profile '{name}'"),
            Self::Save { path, reason } => {
                write!(f, "Failed to save manifest {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for SyncError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let scan = SyncError::ScanRootMissing {
            profile: "ios".into(),
            root: PathBuf::from("/work/source_ios"),
        };
        assert_eq!(scan.error_type(), "Scan Error");
        assert!(scan.to_string().contains("source_ios"));

        let missing = SyncError::ManifestNotFound {
            path: PathBuf::from("App.srcproj"),
        };
        assert_eq!(missing.error_type(), "Manifest Load Error");
    }

    #[test]
    fn test_unknown_target_lists_available() {
        let err = SyncError::UnknownTarget {
            name: "Tests".into(),
            available: vec!["App".into(), "AppMac".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown target 'Tests' (available: App, AppMac)"
        );
    }

    #[test]
    fn test_outside_group_root_renders_workspace_root_as_dot() {
        let err = SyncError::OutsideGroupRoot {
            path: PathBuf::from("../other/a.cpp"),
            root: PathBuf::new(),
        };
        assert!(err.to_string().ends_with("(.)"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = SyncError::UnknownProfile { name: "tv".into() }.into();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::UnknownProfile { .. })
        ));
    }
}
