use super::Config;
use crate::utils::read_text_file;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Upper bound for `output.diff_context`
const MAX_DIFF_CONTEXT: usize = 100;

/// Read, parse and validate a configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or fails
/// validation.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = read_text_file(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parse and validate configuration text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validation errors are returned directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.profiles.is_empty() {
        anyhow::bail!("At least one [[profiles]] entry is required");
    }

    if config.output.diff_context == 0 || config.output.diff_context > MAX_DIFF_CONTEXT {
        anyhow::bail!("output.diff_context must be between 1 and {MAX_DIFF_CONTEXT}");
    }

    let mut names = HashSet::new();
    for profile in &config.profiles {
        if profile.name.trim().is_empty() {
            anyhow::bail!("Profile names cannot be empty");
        }
        if !names.insert(profile.name.as_str()) {
            anyhow::bail!("Duplicate profile name: {}", profile.name);
        }
        if profile.manifest.as_os_str().is_empty() {
            anyhow::bail!("Profile '{}' has no manifest path", profile.name);
        }
        if profile.roots.is_empty() {
            anyhow::bail!("Profile '{}' has no [[profiles.roots]] entries", profile.name);
        }
        if profile.normalized_extensions().is_empty() {
            anyhow::bail!("Profile '{}' tracks no extensions", profile.name);
        }
        if let Some(bad) = profile.group_root.iter().find(|g| g.is_empty() || g.contains('/')) {
            anyhow::bail!(
                "Profile '{}' has an invalid group_root entry '{bad}' (one group name per entry)",
                profile.name
            );
        }
        for root in &profile.roots {
            glob::Pattern::new(&root.pattern).with_context(|| {
                format!(
                    "Profile '{}' has an invalid glob pattern '{}'",
                    profile.name, root.pattern
                )
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RemovalScope, TargetMode, TargetSelection};

    const MINIMAL: &str = r#"
[[profiles]]
name = "mac"
manifest = "prebuilt_mac/App.srcproj"

[[profiles.roots]]
dir = "source_common"
"#;

    #[test]
    fn test_minimal_config_gets_defaults() -> Result<()> {
        let config = parse_config_str(MINIMAL)?;
        let profile = &config.profiles[0];

        assert_eq!(profile.roots[0].pattern, "**/*");
        assert_eq!(profile.targets, TargetSelection::Mode(TargetMode::All));
        assert_eq!(profile.removal_scope, RemovalScope::Roots);
        assert_eq!(config.output.diff_context, 3);
        assert!(!config.scan.follow_symlinks);
        Ok(())
    }

    #[test]
    fn test_full_profile() -> Result<()> {
        let config = parse_config_str(
            r#"
[scan]
follow_symlinks = true

[output]
diff_context = 5
diff_algorithm = "patience"

[[profiles]]
name = "ios"
manifest = "prebuilt_ios/App/App.srcproj"
group_root = ["App"]
extensions = ["cpp", "h", "m", "mm", "inc"]
exclude = ["imgui"]
entry_points = ["main.cpp"]
targets = "first"
removal_scope = "manifest"

[[profiles.roots]]
dir = "source_common"
pattern = "**/*.cpp"

[[profiles.roots]]
dir = "source_ios"
"#,
        )?;

        let profile = config.profile("ios").unwrap();
        assert_eq!(profile.group_root, vec!["App".to_string()]);
        assert_eq!(profile.exclude, vec!["imgui".to_string()]);
        assert_eq!(profile.targets, TargetSelection::Mode(TargetMode::First));
        assert_eq!(profile.removal_scope, RemovalScope::Manifest);
        assert_eq!(profile.roots.len(), 2);
        assert!(config.scan.follow_symlinks);
        assert_eq!(config.output.diff_context, 5);
        Ok(())
    }

    #[test]
    fn test_rejects_empty_profiles() {
        let err = parse_config_str("[scan]\nfollow_symlinks = false\n").unwrap_err();
        assert!(err.to_string().contains("At least one"));
    }

    #[test]
    fn test_rejects_duplicate_profile_names() {
        let doubled = format!("{MINIMAL}\n{MINIMAL}");
        let err = parse_config_str(&doubled).unwrap_err();
        assert!(err.to_string().contains("Duplicate profile name"));
    }

    #[test]
    fn test_rejects_profile_without_roots() {
        let err = parse_config_str(
            "[[profiles]]\nname = \"mac\"\nmanifest = \"App.srcproj\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("no [[profiles.roots]]"));
    }

    #[test]
    fn test_rejects_invalid_glob() {
        let config = MINIMAL.replace("dir = \"source_common\"", "dir = \"src\"\npattern = \"[\"");
        let err = parse_config_str(&config).unwrap_err();
        assert!(err.to_string().contains("invalid glob pattern"));
    }

    #[test]
    fn test_rejects_multi_segment_group_root() {
        let config = MINIMAL.replace(
            "manifest = \"prebuilt_mac/App.srcproj\"",
            "manifest = \"prebuilt_mac/App.srcproj\"\ngroup_root = [\"App/Sources\"]",
        );
        let err = parse_config_str(&config).unwrap_err();
        assert!(err.to_string().contains("invalid group_root"));
    }

    #[test]
    fn test_rejects_out_of_range_diff_context() {
        for value in [0, 1000] {
            let config = format!("[output]\ndiff_context = {value}\n{MINIMAL}");
            assert!(parse_config_str(&config).is_err(), "diff_context = {value}");
        }
    }
}
