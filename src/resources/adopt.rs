//! Moving files between the home directory and the dotfiles root.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::fs::{move_file, occupied, same_file};
use super::symlink::SymlinkResource;
use super::{Applicable, ResourceChange};
use crate::error::AdoptError;

/// A file that lives at `repo` inside the dotfiles root and is linked from
/// `home`.
///
/// [`apply`](Applicable::apply) starts tracking a plain home file (move it
/// into the root, link it back); [`remove`](Applicable::remove) reverses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Location in the home directory.
    pub home: PathBuf,
    /// Location inside the dotfiles root.
    pub repo: PathBuf,
}

impl TrackedFile {
    /// Validate that the absolute path `file` can be added to `root`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdoptError`] if `file` is not a regular file below `home`,
    /// already lives in the root, or its destination is taken.
    pub fn for_add(file: &Path, home: &Path, root: &Path) -> Result<Self, AdoptError> {
        let is_file = std::fs::symlink_metadata(file).is_ok_and(|m| m.file_type().is_file());
        if !is_file {
            return Err(AdoptError::NotRegularFile {
                path: file.display().to_string(),
            });
        }
        if relative_to(file, root).is_some() {
            return Err(AdoptError::AlreadyTracked {
                path: file.display().to_string(),
            });
        }
        let rel = relative_to(file, home).ok_or_else(|| AdoptError::OutsideHome {
            path: file.display().to_string(),
            home: home.display().to_string(),
        })?;
        let repo = root.join(rel);
        if occupied(&repo) {
            return Err(AdoptError::AlreadyTracked {
                path: repo.display().to_string(),
            });
        }
        Ok(Self {
            home: file.to_path_buf(),
            repo,
        })
    }

    /// Find the tracked file behind `file`, given either its home link or
    /// its location inside the root.
    ///
    /// # Errors
    ///
    /// Returns an [`AdoptError`] if `file` names a directory, or if there is
    /// no home symlink pointing at a file inside the root.
    pub fn for_remove(file: &Path, home: &Path, root: &Path) -> Result<Self, AdoptError> {
        let not_managed = || AdoptError::NotManaged {
            path: file.display().to_string(),
            root: root.display().to_string(),
        };

        let (home_path, repo) = if let Some(rel) = relative_to(file, root) {
            (home.join(rel), file.to_path_buf())
        } else {
            let meta = std::fs::symlink_metadata(file).map_err(|_| not_managed())?;
            if meta.is_dir() {
                return Err(AdoptError::IsDirectory {
                    path: file.display().to_string(),
                });
            }
            if !meta.file_type().is_symlink() {
                return Err(not_managed());
            }
            let dest = std::fs::read_link(file).map_err(|_| not_managed())?;
            let dest = match file.parent() {
                Some(parent) if dest.is_relative() => parent.join(dest),
                _ => dest,
            };
            let rel = relative_to(&dest, root).ok_or_else(not_managed)?;
            (file.to_path_buf(), root.join(rel))
        };

        if repo.is_dir() {
            return Err(AdoptError::IsDirectory {
                path: repo.display().to_string(),
            });
        }
        if !repo.is_file() {
            return Err(not_managed());
        }
        let linked = std::fs::symlink_metadata(&home_path).is_ok_and(|m| m.file_type().is_symlink())
            && std::fs::read_link(&home_path).is_ok_and(|dest| {
                let dest = match home_path.parent() {
                    Some(parent) if dest.is_relative() => parent.join(dest),
                    _ => dest,
                };
                same_file(&dest, &repo)
            });
        if !linked {
            return Err(AdoptError::NotManaged {
                path: home_path.display().to_string(),
                root: root.display().to_string(),
            });
        }
        Ok(Self {
            home: home_path,
            repo,
        })
    }

    fn link(&self) -> SymlinkResource {
        SymlinkResource::new(self.repo.clone(), self.home.clone())
    }
}

impl Applicable for TrackedFile {
    fn description(&self) -> String {
        format!("{} <-> {}", self.home.display(), self.repo.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        move_file(&self.home, &self.repo)?;
        if let Err(e) = self.link().apply() {
            // Put the file back so a failed link never loses it.
            move_file(&self.repo, &self.home)
                .with_context(|| format!("restoring {}", self.home.display()))?;
            return Err(e);
        }
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        std::fs::remove_file(&self.home)
            .with_context(|| format!("removing link: {}", self.home.display()))?;
        move_file(&self.repo, &self.home)?;
        Ok(ResourceChange::Applied)
    }
}

/// `path` relative to `base`, comparing canonical parents when the literal
/// prefix differs (e.g. `/tmp` vs `/private/tmp`).
fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(base) {
        return non_empty(rel);
    }
    let name = path.file_name()?;
    let parent = dunce::canonicalize(path.parent()?).ok()?;
    let base = dunce::canonicalize(base).ok()?;
    parent
        .join(name)
        .strip_prefix(&base)
        .ok()
        .and_then(non_empty)
}

fn non_empty(rel: &Path) -> Option<PathBuf> {
    (!rel.as_os_str().is_empty()).then(|| rel.to_path_buf())
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    struct Dirs {
        _tmp: tempfile::TempDir,
        home: PathBuf,
        root: PathBuf,
    }

    fn dirs() -> Dirs {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("home");
        let root = tmp.path().join("dotfiles");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&root).unwrap();
        Dirs {
            _tmp: tmp,
            home,
            root,
        }
    }

    #[test]
    fn add_moves_file_and_links_back() {
        let d = dirs();
        let file = d.home.join(".config/app/rc");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "setting=1").unwrap();

        let tracked = TrackedFile::for_add(&file, &d.home, &d.root).unwrap();
        assert_eq!(tracked.repo, d.root.join(".config/app/rc"));
        tracked.apply().unwrap();

        assert!(std::fs::symlink_metadata(&file).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "setting=1");
        assert!(tracked.repo.is_file());
    }

    #[test]
    fn add_rejects_symlinks_and_missing_files() {
        let d = dirs();
        let missing = d.home.join(".nope");
        assert!(matches!(
            TrackedFile::for_add(&missing, &d.home, &d.root),
            Err(AdoptError::NotRegularFile { .. })
        ));

        let real = d.home.join("real");
        std::fs::write(&real, "").unwrap();
        let link = d.home.join(".link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(matches!(
            TrackedFile::for_add(&link, &d.home, &d.root),
            Err(AdoptError::NotRegularFile { .. })
        ));
    }

    #[test]
    fn add_rejects_files_outside_home() {
        let d = dirs();
        let outside = d.home.parent().unwrap().join("elsewhere");
        std::fs::write(&outside, "").unwrap();
        assert!(matches!(
            TrackedFile::for_add(&outside, &d.home, &d.root),
            Err(AdoptError::OutsideHome { .. })
        ));
    }

    #[test]
    fn add_refuses_to_overwrite_tracked_file() {
        let d = dirs();
        let file = d.home.join(".bashrc");
        std::fs::write(&file, "new").unwrap();
        std::fs::write(d.root.join(".bashrc"), "old").unwrap();
        assert!(matches!(
            TrackedFile::for_add(&file, &d.home, &d.root),
            Err(AdoptError::AlreadyTracked { .. })
        ));
    }

    #[test]
    fn remove_restores_original_file() {
        let d = dirs();
        let file = d.home.join(".vimrc");
        std::fs::write(&file, "set nu").unwrap();
        TrackedFile::for_add(&file, &d.home, &d.root)
            .unwrap()
            .apply()
            .unwrap();

        let tracked = TrackedFile::for_remove(&file, &d.home, &d.root).unwrap();
        assert_eq!(tracked.repo, d.root.join(".vimrc"));
        tracked.remove().unwrap();

        let meta = std::fs::symlink_metadata(&file).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "set nu");
        assert!(!d.root.join(".vimrc").exists());
    }

    #[test]
    fn remove_accepts_path_inside_root() {
        let d = dirs();
        let file = d.home.join(".gitconfig");
        std::fs::write(&file, "[user]").unwrap();
        TrackedFile::for_add(&file, &d.home, &d.root)
            .unwrap()
            .apply()
            .unwrap();

        let tracked = TrackedFile::for_remove(&d.root.join(".gitconfig"), &d.home, &d.root).unwrap();
        assert_eq!(tracked.home, file);
    }

    #[test]
    fn remove_rejects_unlinked_and_directories() {
        let d = dirs();
        let plain = d.home.join(".profile");
        std::fs::write(&plain, "").unwrap();
        assert!(matches!(
            TrackedFile::for_remove(&plain, &d.home, &d.root),
            Err(AdoptError::NotManaged { .. })
        ));

        std::fs::create_dir_all(d.root.join(".config")).unwrap();
        assert!(matches!(
            TrackedFile::for_remove(&d.root.join(".config"), &d.home, &d.root),
            Err(AdoptError::IsDirectory { .. })
        ));
    }
}
