mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::Workspace;
use predicates::prelude::*;

const CONFIG: &str = r#"
[[profiles]]
name = "ios"
manifest = "prebuilt/App/App.srcproj"
group_root = ["App"]

[[profiles.roots]]
dir = "source/ios"
"#;

const MANIFEST: &str = "prebuilt/App/App.srcproj";

fn srcsync(workspace: &Workspace) -> Result<Command> {
    let mut cmd = Command::cargo_bin("srcsync")?;
    cmd.current_dir(workspace.path())
        .env("HOME", workspace.path())
        .env("NO_COLOR", "1")
        .env_remove(srcsync::CONFIG_ENV)
        .env_remove(srcsync::LOG_ENV);
    Ok(cmd)
}

/// Workspace with an initialized manifest and one source file
fn initialized() -> Result<Workspace> {
    let workspace = Workspace::new(CONFIG)?;
    workspace.touch("source/ios/engine/mesh.cpp")?;
    srcsync(&workspace)?
        .args(["init", "ios", "--target", "App", "--target", "AppTests"])
        .assert()
        .success();
    Ok(workspace)
}

#[test]
fn test_init_creates_manifest() -> Result<()> {
    let workspace = Workspace::new(CONFIG)?;

    srcsync(&workspace)?
        .args(["init", "ios", "-t", "App"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Created prebuilt/App/App.srcproj with 1 target"));

    let document = workspace.load_manifest(MANIFEST)?;
    assert_eq!(document.source_root(), "../..");
    assert_eq!(document.targets().len(), 1);
    assert!(common::group_at(&document, &["App"]).is_some());
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
    let workspace = initialized()?;

    srcsync(&workspace)?
        .args(["init", "ios", "-t", "App"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    srcsync(&workspace)?
        .args(["init", "ios", "-t", "App", "--force"])
        .assert()
        .success();
    assert_eq!(workspace.load_manifest(MANIFEST)?.targets().len(), 1);
    Ok(())
}

#[test]
fn test_sync_adds_and_reports() -> Result<()> {
    let workspace = initialized()?;

    srcsync(&workspace)?
        .arg("sync")
        .assert()
        .success()
        .stderr(predicate::str::contains("source/ios/engine/mesh.cpp"))
        .stderr(predicate::str::contains("1 added, 0 removed"));

    srcsync(&workspace)?
        .args(["sync", "ios"])
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));

    assert!(common::in_every_target(
        &workspace.load_manifest(MANIFEST)?,
        "source/ios/engine/mesh.cpp"
    ));
    Ok(())
}

#[test]
fn test_dry_run_prints_diff_without_saving() -> Result<()> {
    let workspace = initialized()?;
    let before = workspace.manifest_text(MANIFEST)?;

    srcsync(&workspace)?
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+++ b/prebuilt/App/App.srcproj"))
        .stdout(predicate::str::contains("mesh.cpp"))
        .stderr(predicate::str::contains("Would add"));

    assert_eq!(workspace.manifest_text(MANIFEST)?, before);
    Ok(())
}

#[test]
fn test_check_exit_status() -> Result<()> {
    let workspace = initialized()?;

    srcsync(&workspace)?
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of date"));

    srcsync(&workspace)?.arg("sync").assert().success();

    srcsync(&workspace)?.arg("check").assert().success();
    Ok(())
}

#[test]
fn test_scan_lists_expected_files() -> Result<()> {
    let workspace = initialized()?;
    workspace.touch("source/ios/engine/mesh.h")?;
    workspace.touch("source/ios/entry/main.cpp")?;
    workspace.touch("source/ios/docs.md")?;

    srcsync(&workspace)?
        .args(["scan", "ios"])
        .assert()
        .success()
        .stdout("source/ios/engine/mesh.cpp\nsource/ios/engine/mesh.h\n");
    Ok(())
}

#[test]
fn test_scan_names_origin_of_coalesced_path() -> Result<()> {
    let workspace = Workspace::new(
        r#"
[[profiles]]
name = "ios"
manifest = "prebuilt/App/App.srcproj"

[[profiles.roots]]
dir = "source/ios"

[[profiles.roots]]
dir = "source"
"#,
    )?;
    workspace.touch("source/ios/core/input.cpp")?;

    srcsync(&workspace)?
        .args(["scan", "ios"])
        .assert()
        .success()
        .stdout("source/ios/core/input.cpp\n")
        .stderr(predicate::str::contains(
            "source/ios/core/input.cpp is matched by more than one scan root (kept from source/ios)",
        ));
    Ok(())
}

#[test]
fn test_tree_renders_groups() -> Result<()> {
    let workspace = initialized()?;
    srcsync(&workspace)?.arg("sync").assert().success();

    srcsync(&workspace)?
        .args(["tree", "ios"])
        .assert()
        .success()
        .stdout(predicate::str::contains("engine/"))
        .stdout(predicate::str::contains("mesh.cpp"));
    Ok(())
}

#[test]
fn test_profiles_lists_configuration() -> Result<()> {
    let workspace = Workspace::new(CONFIG)?;

    srcsync(&workspace)?
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("ios"))
        .stdout(predicate::str::contains("source/ios/**/*"));
    Ok(())
}

#[test]
fn test_unknown_profile() -> Result<()> {
    let workspace = initialized()?;

    srcsync(&workspace)?
        .args(["sync", "tvos"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown profile 'tvos'"));
    Ok(())
}

#[test]
fn test_missing_manifest_is_reported() -> Result<()> {
    let workspace = Workspace::new(CONFIG)?;
    workspace.mkdir("source/ios")?;

    srcsync(&workspace)?
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest Load Error"))
        .stderr(predicate::str::contains("srcsync init"));
    Ok(())
}

#[test]
fn test_explicit_config_path() -> Result<()> {
    let workspace = initialized()?;
    let elsewhere = tempfile::TempDir::new()?;

    let mut cmd = Command::cargo_bin("srcsync")?;
    cmd.current_dir(elsewhere.path())
        .env("HOME", elsewhere.path())
        .env("NO_COLOR", "1")
        .env_remove(srcsync::LOG_ENV)
        .env(srcsync::CONFIG_ENV, workspace.config_path())
        .args(["scan", "ios"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source/ios/engine/mesh.cpp"));

    Command::cargo_bin("srcsync")?
        .current_dir(elsewhere.path())
        .env("HOME", elsewhere.path())
        .env_remove(srcsync::CONFIG_ENV)
        .arg("--config")
        .arg(workspace.config_path())
        .arg("profiles")
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_missing_config() -> Result<()> {
    let empty = tempfile::TempDir::new()?;

    Command::cargo_bin("srcsync")?
        .current_dir(empty.path())
        .env("HOME", empty.path())
        .env_remove(srcsync::CONFIG_ENV)
        .arg("profiles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No srcsync.toml found"));
    Ok(())
}

#[test]
fn test_completion() -> Result<()> {
    let empty = tempfile::TempDir::new()?;

    Command::cargo_bin("srcsync")?
        .current_dir(empty.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srcsync"));
    Ok(())
}
