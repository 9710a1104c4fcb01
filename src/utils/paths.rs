use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without touching the filesystem.
///
/// Leading `..` components of a relative path are kept, and `..` directly
/// below the root collapses into the root. An input made only of `.`
/// components yields an empty path.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    parts.iter().collect()
}

/// Renders a path with `/` separators regardless of platform.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();

    for component in path.components() {
        let part = match component {
            Component::Prefix(prefix) => {
                out.push_str(&prefix.as_os_str().to_string_lossy());
                continue;
            }
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::CurDir => ".".into(),
            Component::ParentDir => "..".into(),
            Component::Normal(name) => name.to_string_lossy(),
        };

        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }

    out
}

/// Builds a native path from a `/`-separated string.
///
/// Empty segments are dropped, so `"a//b/"` and `"a/b"` are the same path.
#[must_use]
pub fn from_slash(value: &str) -> PathBuf {
    let mut path = if value.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    };

    for segment in value.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }

    path
}

/// Computes the relative path leading from directory `from` to `to`.
///
/// Both paths are normalized lexically first; they must both be relative or
/// both be absolute for the result to be meaningful.
#[must_use]
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize_lexically(from);
    let to = normalize_lexically(to);

    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from_parts.len() {
        result.push("..");
    }
    for part in &to_parts[common..] {
        result.push(part.as_os_str());
    }

    result
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize_lexically(path))
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(normalize_lexically(&current_dir.join(path)))
    }
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create parent directories for {}", path.display())
        })?;
    }
    Ok(())
}
