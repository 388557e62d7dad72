//! File system utility functions

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Directories a checkout must never be written into
const DANGEROUS_CLONE_DIRS: &[&str] = &[
    "~",
    "~/Downloads",
    "~/Documents",
    "~/Desktop",
    "/bin",
    "/usr/bin",
    "/etc",
    "/Applications",
    "/Library",
    "~/Library",
    "~/.config",
    "~/.ssh",
];

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;
    Ok(())
}

/// Expand a leading `~` or `$HOME` to the user's home directory
pub fn expand_home(path: &str) -> Option<PathBuf> {
    let rest = if path == "~" || path == "$HOME" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else if let Some(rest) = path.strip_prefix("$HOME/") {
        rest
    } else {
        return Some(PathBuf::from(path));
    };

    let home = PathBuf::from(env::var_os("HOME")?);
    Some(if rest.is_empty() { home } else { home.join(rest) })
}

/// Absolute form of `path`, expanding the home directory; no symlinks are resolved
pub fn absolute_path(path: &str) -> Option<PathBuf> {
    let expanded = expand_home(path)?;
    std::path::absolute(expanded).ok()
}

/// Whether checking out into `path` could overwrite user or system files
///
/// Paths that can not be resolved are not reported; git fails on them later
/// with a clearer message.
pub fn is_clone_dir_dangerous(path: &str) -> bool {
    let Some(clone_path) = absolute_path(path) else {
        return false;
    };

    DANGEROUS_CLONE_DIRS
        .iter()
        .filter_map(|dangerous| absolute_path(dangerous))
        .any(|dangerous| dangerous == clone_path)
}
