//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::fs::{ensure_parent_dir, occupied, same_file};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ConflictError;

/// A symlink at `target` pointing to `source`.
///
/// [`apply`](Applicable::apply) only ever creates a missing link; anything
/// already occupying `target` that is not this link is a [`ConflictError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkResource {
    /// The file the link points to.
    pub source: PathBuf,
    /// Where the link lives.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// The error [`apply`](Applicable::apply) returns for a conflicting target.
    #[must_use]
    pub fn conflict(&self, current: &str) -> ConflictError {
        ConflictError {
            target: self.target.display().to_string(),
            expected: self.source.display().to_string(),
            actual: current.to_string(),
        }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
            ResourceState::Incorrect { current } => Err(self.conflict(&current).into()),
            ResourceState::Missing => {
                ensure_parent_dir(&self.target)?;
                create_symlink(&self.source, &self.target)?;
                Ok(ResourceChange::Applied)
            }
        }
    }

    fn remove(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => {
                remove_symlink(&self.target)?;
                Ok(ResourceChange::Applied)
            }
            ResourceState::Missing => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Incorrect { current } => Ok(ResourceChange::Skipped {
                reason: format!("{} is {current}", self.target.display()),
            }),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
        }
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        let meta = match std::fs::symlink_metadata(&self.target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ResourceState::Missing);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading metadata: {}", self.target.display()));
            }
        };

        if !meta.file_type().is_symlink() {
            let current = if meta.is_dir() {
                "a directory"
            } else {
                "a regular file"
            };
            return Ok(ResourceState::Incorrect {
                current: current.to_string(),
            });
        }

        let dest = std::fs::read_link(&self.target)
            .with_context(|| format!("reading link: {}", self.target.display()))?;
        if points_to(&self.target, &dest, &self.source) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("a symlink to {}", dest.display()),
            })
        }
    }
}

/// Whether the link at `link` with destination `dest` resolves to `source`.
fn points_to(link: &Path, dest: &Path, source: &Path) -> bool {
    let absolute = if dest.is_relative() {
        link.parent().map_or_else(|| dest.to_path_buf(), |p| p.join(dest))
    } else {
        dest.to_path_buf()
    };
    same_file(&absolute, source)
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {} (enable Developer Mode or run as Administrator)",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}

/// Remove a symlink without following it.
///
/// On Windows, directory symlinks must be removed with `remove_dir`; the
/// raw `FILE_ATTRIBUTE_DIRECTORY` bit tells them apart because
/// `symlink_metadata().is_dir()` is `false` for any link.
fn remove_symlink(path: &Path) -> Result<()> {
    if !occupied(path) {
        return Ok(());
    }
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path).with_context(|| format!("removing link: {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("removing link: {}", path.display()))?;
    }
    Ok(())
}

fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
