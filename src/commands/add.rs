//! Add command: start tracking a file from the home directory.
use anyhow::Result;
use std::path::Path;

use super::{resolve_home, resolve_root};
use crate::cli::GlobalOpts;
use crate::logging::{Log, Logger, Outcome};
use crate::resources::Applicable as _;
use crate::resources::adopt::TrackedFile;
use crate::resources::fs::absolute;

/// Run the add command.
///
/// # Errors
///
/// Returns an error if the root or home directory cannot be determined or
/// the file cannot be added.
pub fn run(global: &GlobalOpts, file: &Path, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    let home = resolve_home(global)?;
    execute(&root, &home, file, global.dry_run, log)?;
    Ok(())
}

/// Move `file` into `root` and leave a symlink in its place.
///
/// Relative paths are taken from the current directory.
///
/// # Errors
///
/// Returns an error if `file` is not a regular file inside `home`, is
/// already tracked, or cannot be moved or linked.
pub fn execute(
    root: &Path,
    home: &Path,
    file: &Path,
    dry_run: bool,
    log: &dyn Log,
) -> Result<TrackedFile> {
    let file = absolute(file)?;
    let tracked = TrackedFile::for_add(&file, home, root)?;
    let name = tracked.home.display().to_string();

    log.stage("Adding file");
    if dry_run {
        log.dry_run(&format!(
            "would move {} to {} and link it back",
            tracked.home.display(),
            tracked.repo.display()
        ));
        log.record(&name, Outcome::DryRun, None);
        return Ok(tracked);
    }

    tracked.apply()?;
    log.info(&format!("tracking {}", tracked.description()));
    log.record(&name, Outcome::Changed, None);
    Ok(tracked)
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::AdoptError;
    use crate::logging::{Level, MemoryLog};

    fn dirs() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        (tmp, root, home)
    }

    #[test]
    fn add_tracks_file() {
        let (_tmp, root, home) = dirs();
        std::fs::write(home.join(".tmux.conf"), "set -g mouse on").unwrap();
        let log = MemoryLog::new();
        let tracked = execute(&root, &home, &home.join(".tmux.conf"), false, &log).unwrap();
        assert_eq!(tracked.repo, root.join(".tmux.conf"));
        assert_eq!(
            std::fs::read_link(home.join(".tmux.conf")).unwrap(),
            root.join(".tmux.conf")
        );
        assert_eq!(log.counts().changed, 1);
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let (_tmp, root, home) = dirs();
        std::fs::write(home.join(".inputrc"), "").unwrap();
        let log = MemoryLog::new();
        execute(&root, &home, &home.join(".inputrc"), true, &log).unwrap();
        assert!(std::fs::symlink_metadata(home.join(".inputrc")).unwrap().is_file());
        assert!(!root.join(".inputrc").exists());
        assert_eq!(log.messages(Level::DryRun).len(), 1);
    }

    #[test]
    fn outside_home_is_rejected() {
        let (tmp, root, home) = dirs();
        let stray = tmp.path().join("stray");
        std::fs::write(&stray, "").unwrap();
        let err = execute(&root, &home, &stray, false, &MemoryLog::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdoptError>(),
            Some(AdoptError::OutsideHome { .. })
        ));
    }
}
