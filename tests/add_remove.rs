#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `add` and `remove` commands.
//!
//! A file added from the home directory must be picked up by `apply` as a
//! regular link, and `remove` must restore the original layout.

mod common;

use common::{TestRepo, linux_box};
use dotfiles_linker::commands::{add, apply, remove, status};
use dotfiles_linker::error::AdoptError;
use dotfiles_linker::layout::Scope;
use dotfiles_linker::logging::MemoryLog;

#[test]
fn added_file_is_managed_by_apply() {
    let repo = TestRepo::new().with_home_file(".config/starship.toml", "add_newline = false");
    let file = repo.home().join(".config/starship.toml");

    add::execute(repo.root(), repo.home(), &file, false, &MemoryLog::new()).unwrap();

    assert_eq!(
        std::fs::read_to_string(repo.root().join(".config/starship.toml")).unwrap(),
        "add_newline = false"
    );
    let setup = repo.setup(linux_box());
    let summary = apply::execute(&setup, Scope::Regular, false, None, &MemoryLog::new()).unwrap();
    assert_eq!(summary.changed, 0);
    assert_eq!(summary.already_ok, 1);

    let report = status::collect(&setup, None, &MemoryLog::new()).unwrap();
    assert_eq!(report.managed.len(), 1);
}

#[test]
fn remove_accepts_path_inside_root() {
    let repo = TestRepo::new().with_file(".gitignore_global", "*.swp");
    apply::execute(
        &repo.setup(linux_box()),
        Scope::Regular,
        false,
        None,
        &MemoryLog::new(),
    )
    .unwrap();

    let tracked = remove::execute(
        repo.root(),
        repo.home(),
        &repo.root().join(".gitignore_global"),
        false,
        &MemoryLog::new(),
    )
    .unwrap();

    assert_eq!(tracked.home, repo.home().join(".gitignore_global"));
    assert!(repo.link_dest(".gitignore_global").is_none());
    assert_eq!(repo.read_home(".gitignore_global"), "*.swp");
    assert!(!repo.root().join(".gitignore_global").exists());
}

#[test]
fn adding_twice_is_rejected() {
    let repo = TestRepo::new().with_home_file(".curlrc", "silent");
    let file = repo.home().join(".curlrc");
    add::execute(repo.root(), repo.home(), &file, false, &MemoryLog::new()).unwrap();

    let err = add::execute(repo.root(), repo.home(), &file, false, &MemoryLog::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AdoptError>(),
        Some(AdoptError::NotRegularFile { .. })
    ));
    assert_eq!(repo.read_home(".curlrc"), "silent");
}

#[test]
fn directories_cannot_be_added() {
    let repo = TestRepo::new().with_home_file(".config/nvim/init.lua", "");
    let err = add::execute(
        repo.root(),
        repo.home(),
        &repo.home().join(".config/nvim"),
        false,
        &MemoryLog::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AdoptError>(),
        Some(AdoptError::NotRegularFile { .. })
    ));
}
