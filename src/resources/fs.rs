//! File-system helpers shared by resources.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Whether anything (including a dangling symlink) exists at `path`.
#[must_use]
pub fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Move a regular file, falling back to copy + delete when a rename crosses
/// filesystems.
///
/// # Errors
///
/// Returns an error if the file cannot be moved.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    ensure_parent_dir(to)?;
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)
        .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
    if let Err(e) = std::fs::remove_file(from) {
        let _ = std::fs::remove_file(to);
        return Err(e).with_context(|| format!("remove {}", from.display()));
    }
    Ok(())
}

/// Make `path` absolute by joining it onto the current directory.
///
/// # Errors
///
/// Returns an error if `path` is relative and the current directory cannot
/// be determined.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("determine current directory")?;
    Ok(cwd.join(path))
}

/// Compare two paths, first literally and then by canonical form.
///
/// `dunce` keeps Windows paths free of the `\\?\` prefix so both sides
/// canonicalize to the same spelling.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
