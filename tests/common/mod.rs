#![allow(dead_code)]

use anyhow::Result;
use srcsync::SyncContext;
use srcsync::project::{ObjectId, ProjectDocument, format};
use srcsync::sync::{SyncOptions, SyncOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest shared by both profiles of [`TWO_PROFILE_CONFIG`]
pub const MANIFEST: &str = "prebuilt/App/App.srcproj";

/// Two profiles feeding one manifest from disjoint directories
pub const TWO_PROFILE_CONFIG: &str = r#"
[[profiles]]
name = "ios"
manifest = "prebuilt/App/App.srcproj"
group_root = ["App"]
exclude = ["imgui"]

[[profiles.roots]]
dir = "source/ios"

[[profiles]]
name = "mac"
manifest = "prebuilt/App/App.srcproj"
group_root = ["App"]
exclude = ["imgui"]

[[profiles.roots]]
dir = "source/mac"
"#;

/// Temporary workspace with a `srcsync.toml` at its root
pub struct Workspace {
    pub temp_dir: TempDir,
}

impl Workspace {
    /// Create a workspace with the given configuration text
    pub fn new(config: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join(srcsync::CONFIG_FILE_NAME), config)?;
        Ok(Self { temp_dir })
    }

    /// Workspace with [`TWO_PROFILE_CONFIG`], both source directories and
    /// an empty manifest whose `App` group mirrors `source/`
    pub fn two_profiles() -> Result<Self> {
        let workspace = Self::new(TWO_PROFILE_CONFIG)?;
        workspace.mkdir("source/ios")?;
        workspace.mkdir("source/mac")?;
        workspace.write_manifest(MANIFEST, &app_document(Some("source"))?)?;
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join(srcsync::CONFIG_FILE_NAME)
    }

    pub fn ctx(&self) -> Result<SyncContext> {
        SyncContext::from_config_path(&self.config_path())
    }

    pub fn mkdir(&self, relative: &str) -> Result<()> {
        fs::create_dir_all(self.path().join(relative))?;
        Ok(())
    }

    /// Create an empty file, and its parent directories
    pub fn touch(&self, relative: &str) -> Result<()> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "")?;
        Ok(())
    }

    pub fn remove(&self, relative: &str) -> Result<()> {
        fs::remove_file(self.path().join(relative))?;
        Ok(())
    }

    pub fn write_manifest(&self, relative: &str, document: &ProjectDocument) -> Result<()> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        format::save(document, &path)
    }

    pub fn load_manifest(&self, relative: &str) -> Result<ProjectDocument> {
        format::load(&self.path().join(relative))
    }

    pub fn manifest_text(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path().join(relative))?)
    }

    /// Run one profile
    pub fn sync(&self, profile: &str) -> Result<SyncOutcome> {
        self.run(profile, SyncOptions::default())
    }

    pub fn run(&self, profile: &str, options: SyncOptions) -> Result<SyncOutcome> {
        let ctx = self.ctx()?;
        let profile = ctx.profile(profile)?;
        ctx.synchronizer(profile)?.run(options)
    }
}

/// Manifest at `prebuilt/App/` pointing at the workspace root, with targets
/// `App` and `AppTests` and an `App` group anchored at `app_path`
pub fn app_document(app_path: Option<&str>) -> Result<ProjectDocument> {
    let mut document = ProjectDocument::new("App", "../..");
    document.add_target("App")?;
    document.add_target("AppTests")?;
    let main = document.main_group().clone();
    document.new_group(&main, "App", app_path)?;
    Ok(document)
}

/// Id of the group reached by following `names` from the main group
pub fn group_at(document: &ProjectDocument, names: &[&str]) -> Option<ObjectId> {
    let mut current = document.main_group().clone();
    for name in names {
        current = document.child_group(&current, name)?.clone();
    }
    Some(current)
}

/// Slash-separated workspace-relative paths every file reference resolves to
///
/// Assumes the manifest lives two directories below the workspace root with
/// `source_root = "../.."`, as [`app_document`] builds it.
pub fn resolved_paths(document: &ProjectDocument) -> Vec<String> {
    let mut paths: Vec<String> = document
        .file_references()
        .filter_map(|file| document.resolve_file(file.id()))
        .map(|path| srcsync::utils::paths::to_slash(&path))
        .collect();
    paths.sort();
    paths
}

/// Whether every target lists the reference resolving to `path`
pub fn in_every_target(document: &ProjectDocument, path: &str) -> bool {
    let Some(file) = document.file_references().find(|file| {
        document
            .resolve_file(file.id())
            .is_some_and(|resolved| srcsync::utils::paths::to_slash(&resolved) == path)
    }) else {
        return false;
    };
    document
        .targets()
        .iter()
        .all(|target| target.compile_sources().contains(file.id()))
}
