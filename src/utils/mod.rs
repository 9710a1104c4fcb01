//! Utility functions and helpers.
//!
//! - [`paths`]: lexical path normalization and `/`-separated rendering
//! - [`hash`]: xxHash3 digests used for object identifiers
//!
//! The functions at this level deal with reading and writing whole files:
//! manifests and configuration are read through [`read_text_file`] and
//! written through [`write_atomic`].

/// Stable hashing for object identifiers
pub mod hash;
/// Path manipulation and resolution utilities
pub mod paths;

use anyhow::{Context, Result};
use memmap2::MmapOptions;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Files at or above this size are memory-mapped instead of read into a buffer.
pub const MMAP_THRESHOLD: u64 = 1_048_576;

/// Reads a UTF-8 text file.
///
/// Small files are read normally; large files (project manifests of big
/// codebases) are memory-mapped and validated with SIMD UTF-8 checking.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_text_file(path: &Path) -> Result<String> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;

    if metadata.len() < MMAP_THRESHOLD {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    // SAFETY: the map is read-only and dropped before this function returns;
    // the manifest lock keeps other srcsync processes from truncating the file.
    let mmap = unsafe { MmapOptions::new().map(&file)? };

    let content = simdutf8::basic::from_utf8(&mmap)
        .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in {}: {e}", path.display()))?;

    Ok(content.to_owned())
}

/// Writes `contents` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory, is synced
/// to disk, and is then renamed over `path`. Readers observe either the old
/// file or the new one, never a partial write. Existing permissions are kept.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written, synced
/// or renamed into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    temp.write_all(contents)
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temporary file for {}", path.display()))?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    }

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
