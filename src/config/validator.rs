use crate::output;
use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Flags configuration keys that srcsync does not recognize.
///
/// Unknown keys are almost always typos (`exlude`, `entry_point`) that would
/// otherwise be silently ignored by serde defaults.
pub struct ConfigValidator {
    /// Recognized top-level and section keys, dotted
    known_fields: HashSet<&'static str>,
    /// Recognized keys inside a `[[profiles]]` entry
    profile_fields: HashSet<&'static str>,
    /// Recognized keys inside a `[[profiles.roots]]` entry
    root_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "scan",
            "scan.follow_symlinks",
            "output",
            "output.diff_context",
            "output.diff_algorithm",
            "profiles",
        ]
        .into_iter()
        .collect();

        let profile_fields = [
            "name",
            "manifest",
            "group_root",
            "extensions",
            "exclude",
            "entry_points",
            "targets",
            "removal_scope",
            "roots",
        ]
        .into_iter()
        .collect();

        let root_fields = ["dir", "pattern"].into_iter().collect();

        Self {
            known_fields,
            profile_fields,
            root_fields,
        }
    }

    /// Collect the dotted paths of unknown keys in configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML
    pub fn unknown_fields(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Table = toml::from_str(content)?;
        let mut unknown = Vec::new();

        for (key, value) in &parsed {
            if key == "profiles" {
                self.check_profiles(value, &mut unknown);
                continue;
            }
            self.check_value(value, key, &mut unknown);
        }

        Ok(unknown)
    }

    /// Validate a configuration file and warn about unknown keys
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = crate::utils::read_text_file(config_path)?;
        let unknown = self.unknown_fields(&content)?;

        if !unknown.is_empty() {
            output::warning("Configuration warnings:");
            for field in &unknown {
                output::warning(&format!("  Unknown configuration field: {}", field.yellow()));
            }
        }

        Ok(())
    }

    /// Checks a section value (and its nested tables) against the known set
    fn check_value(&self, value: &toml::Value, key: &str, unknown: &mut Vec<String>) {
        if !self.known_fields.contains(key) {
            unknown.push(key.to_string());
            return;
        }

        if let toml::Value::Table(map) = value {
            for (child, child_value) in map {
                self.check_value(child_value, &format!("{key}.{child}"), unknown);
            }
        }
    }

    /// Checks every `[[profiles]]` entry and its `[[profiles.roots]]` entries
    fn check_profiles(&self, value: &toml::Value, unknown: &mut Vec<String>) {
        let toml::Value::Array(profiles) = value else {
            return;
        };

        for (index, profile) in profiles.iter().enumerate() {
            let toml::Value::Table(map) = profile else {
                continue;
            };
            let label = map
                .get("name")
                .and_then(toml::Value::as_str)
                .map_or_else(|| index.to_string(), ToString::to_string);

            for (key, field) in map {
                if !self.profile_fields.contains(key.as_str()) {
                    unknown.push(format!("profiles[{label}].{key}"));
                    continue;
                }
                if key == "roots"
                    && let toml::Value::Array(roots) = field
                {
                    for root in roots.iter().filter_map(toml::Value::as_table) {
                        for root_key in root.keys() {
                            if !self.root_fields.contains(root_key.as_str()) {
                                unknown.push(format!("profiles[{label}].roots.{root_key}"));
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
