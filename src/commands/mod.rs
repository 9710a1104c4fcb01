pub mod check;
pub mod init;
pub mod profiles;
pub mod scan;
pub mod sync;
pub mod tree;

use crate::utils::paths::to_slash;
use std::path::Path;

/// Render an absolute path relative to the workspace root for display.
pub(crate) fn workspace_display(workspace_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(workspace_root).unwrap_or(path);
    to_slash(relative)
}
