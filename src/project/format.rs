//! On-disk TOML form of a project manifest.
//!
//! The record types mirror the file one to one; [`ProjectDocument`] converts
//! from and to them and owns every structural check. Objects are keyed by
//! identifier in `BTreeMap`s so serialization order is deterministic.

use super::{ObjectId, ProjectDocument, SourceTree};
use crate::sync::SyncError;
use crate::utils::hash::hash_bytes;
use crate::utils::{read_text_file, write_atomic};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info_span};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub version: u32,

    /// Project source root, `/`-separated and relative to the manifest's directory
    #[serde(default)]
    pub source_root: String,

    pub main_group: ObjectId,

    #[serde(default)]
    pub targets: Vec<TargetRecord>,

    #[serde(default)]
    pub groups: BTreeMap<ObjectId, GroupRecord>,

    #[serde(default)]
    pub files: BTreeMap<ObjectId, FileRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRecord {
    pub name: String,
    #[serde(default)]
    pub compile_sources: Vec<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "SourceTree::is_group")]
    pub source_tree: SourceTree,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ObjectId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default, skip_serializing_if = "SourceTree::is_group")]
    pub source_tree: SourceTree,
}

/// Open a manifest file
///
/// # Errors
///
/// Returns [`SyncError::ManifestNotFound`] if the file does not exist and
/// [`SyncError::ManifestMalformed`] if it cannot be read, parsed or fails
/// structural validation.
pub fn load(path: &Path) -> Result<ProjectDocument> {
    let _span = info_span!("load", manifest = %path.display()).entered();

    if !path.is_file() {
        return Err(SyncError::ManifestNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let malformed = |reason: String| SyncError::ManifestMalformed {
        path: path.to_path_buf(),
        reason,
    };

    let content = read_text_file(path).map_err(|e| malformed(format!("{e:#}")))?;
    let document = parse(&content).map_err(|e| malformed(format!("{e:#}")))?;

    debug!(
        groups = document.groups().count(),
        files = document.file_references().count(),
        targets = document.targets().len(),
        "manifest loaded"
    );
    Ok(document)
}

/// Parse manifest text into a validated document
///
/// # Errors
///
/// Returns an error if the text is not a valid manifest.
pub fn parse(content: &str) -> Result<ProjectDocument> {
    let record: ManifestRecord = toml::from_str(content)?;
    ProjectDocument::from_record(record)
}

/// Serialize a document to manifest text
///
/// # Errors
///
/// Returns an error if TOML serialization fails.
pub fn to_toml_string(document: &ProjectDocument) -> Result<String> {
    Ok(toml::to_string_pretty(&document.to_record())?)
}

/// Atomically write a document to `path`
///
/// # Errors
///
/// Returns [`SyncError::Save`] if serialization or the write fails.
pub fn save(document: &ProjectDocument, path: &Path) -> Result<()> {
    let _span = info_span!("persist", manifest = %path.display()).entered();

    let save_error = |e: anyhow::Error| SyncError::Save {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    };

    let content = to_toml_string(document).map_err(save_error)?;
    write_atomic(path, content.as_bytes()).map_err(save_error)?;

    debug!(bytes = content.len(), digest = %hash_bytes(content.as_bytes()), "manifest saved");
    Ok(())
}
