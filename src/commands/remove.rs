//! Remove command: stop tracking a file and put it back in the home directory.
use anyhow::Result;
use std::path::Path;

use super::{resolve_home, resolve_root};
use crate::cli::GlobalOpts;
use crate::logging::{Log, Logger, Outcome};
use crate::resources::Applicable as _;
use crate::resources::adopt::TrackedFile;
use crate::resources::fs::absolute;

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if the root or home directory cannot be determined or
/// the file cannot be removed.
pub fn run(global: &GlobalOpts, file: &Path, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    let home = resolve_home(global)?;
    execute(&root, &home, file, global.dry_run, log)?;
    Ok(())
}

/// Replace the home symlink for `file` with the tracked file itself.
///
/// `file` may name either the link in the home directory or the file
/// inside the dotfiles root.
///
/// # Errors
///
/// Returns an error if `file` is a directory, is not linked from the home
/// directory, or cannot be moved.
pub fn execute(
    root: &Path,
    home: &Path,
    file: &Path,
    dry_run: bool,
    log: &dyn Log,
) -> Result<TrackedFile> {
    let file = absolute(file)?;
    let tracked = TrackedFile::for_remove(&file, home, root)?;
    let name = tracked.home.display().to_string();

    log.stage("Removing file");
    if dry_run {
        log.dry_run(&format!(
            "would replace link {} with {}",
            tracked.home.display(),
            tracked.repo.display()
        ));
        log.record(&name, Outcome::DryRun, None);
        return Ok(tracked);
    }

    tracked.remove()?;
    log.info(&format!("restored {}", tracked.home.display()));
    log.record(&name, Outcome::Changed, None);
    Ok(tracked)
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::add;
    use crate::error::AdoptError;
    use crate::logging::MemoryLog;

    #[test]
    fn add_then_remove_restores_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(home.join(".config/nvim")).unwrap();
        let file = home.join(".config/nvim/init.lua");
        std::fs::write(&file, "vim.o.number = true").unwrap();

        let log = MemoryLog::new();
        add::execute(&root, &home, &file, false, &log).unwrap();
        execute(&root, &home, &file, false, &log).unwrap();

        assert!(std::fs::symlink_metadata(&file).unwrap().is_file());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "vim.o.number = true");
        assert!(!root.join(".config/nvim/init.lua").exists());
        assert_eq!(log.counts().changed, 2);
    }

    #[test]
    fn dry_run_keeps_link() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(home.join(".zshrc"), "").unwrap();
        add::execute(&root, &home, &home.join(".zshrc"), false, &MemoryLog::new()).unwrap();

        execute(&root, &home, &home.join(".zshrc"), true, &MemoryLog::new()).unwrap();
        assert!(
            std::fs::symlink_metadata(home.join(".zshrc"))
                .unwrap()
                .file_type()
                .is_symlink()
        );
    }

    #[test]
    fn unmanaged_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(home.join(".profile"), "").unwrap();
        let err = execute(
            &tmp.path().join("dotfiles"),
            &home,
            &home.join(".profile"),
            false,
            &MemoryLog::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdoptError>(),
            Some(AdoptError::NotManaged { .. })
        ));
    }
}
