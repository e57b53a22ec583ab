// Shared helpers for integration tests.
//
// Provides a temporary dotfiles root and home directory side by side, with a
// fluent builder so each test can lay out files without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dotfiles_linker::commands::CommandSetup;
use dotfiles_linker::platform::Environment;

/// Environment of a plain Linux machine called `box`.
pub fn linux_box() -> Environment {
    Environment::new("Linux", "6.6.1-arch1-1", "box")
}

/// Environment of a WSL machine called `laptop`.
pub fn wsl_laptop() -> Environment {
    Environment::new("Linux", "5.15.90.1-microsoft-standard-WSL2", "laptop")
}

/// An isolated dotfiles root and home directory backed by a
/// [`tempfile::TempDir`].
pub struct TestRepo {
    tmp: tempfile::TempDir,
    root: PathBuf,
    home: PathBuf,
}

impl TestRepo {
    /// Create empty `dotfiles/` and `home/` directories.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&root).expect("create root");
        std::fs::create_dir_all(&home).expect("create home");
        Self { tmp, root, home }
    }

    /// The dotfiles root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// A path next to root and home, outside both.
    pub fn outside(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Write `content` to `rel` below the root, creating parents.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        write(&self.root.join(rel), content);
        self
    }

    /// Write `content` to `rel` below the home directory, creating parents.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write(&self.home.join(rel), content);
        self
    }

    /// Command setup for this repo as seen from `env`.
    pub fn setup(&self, env: Environment) -> CommandSetup {
        CommandSetup::from_parts(self.root.clone(), self.home.clone(), env).expect("setup")
    }

    /// Where the symlink at `rel` below home points, if it is one.
    pub fn link_dest(&self, rel: &str) -> Option<PathBuf> {
        std::fs::read_link(self.home.join(rel)).ok()
    }

    /// Contents of `rel` below home, following links.
    pub fn read_home(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home.join(rel)).expect("read home file")
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}
