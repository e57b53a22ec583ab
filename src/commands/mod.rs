//! Top-level subcommand orchestration.
pub mod add;
pub mod apply;
pub mod completions;
pub mod remove;
pub mod status;
pub mod version;

use anyhow::{Context as _, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::exec::SystemExecutor;
use crate::layout::{Layout, OVERRIDES_DIR};
use crate::logging::Log;
use crate::platform::Environment;
use crate::resources::fs::absolute;

/// Shared state produced by the common command setup sequence.
///
/// Resolves the root and home directories, loads `dotfiles.toml`, and
/// captures the [`Environment`] once so that every command sees the same
/// answers.
#[derive(Debug)]
pub struct CommandSetup {
    /// Root and home directories plus settings.
    pub layout: Layout,
    /// OS and host name override conditions are evaluated against.
    pub env: Environment,
}

impl CommandSetup {
    /// Resolve directories, load settings, and detect the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or home directory cannot be determined,
    /// `dotfiles.toml` is invalid, or the OS/host name is unavailable.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let root = resolve_root(global)?;
        let home = resolve_home(global)?;
        let env = Environment::detect(&SystemExecutor)?;
        let setup = Self::from_parts(root, home, env)?;
        log.debug(&format!("root: {}", setup.layout.root().display()));
        log.debug(&format!("home: {}", setup.layout.home().display()));
        log.debug(&format!("environment: {}", setup.env));
        Ok(setup)
    }

    /// Build a setup from already-known parts, loading settings from `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dotfiles.toml` is invalid.
    pub fn from_parts(root: PathBuf, home: PathBuf, env: Environment) -> Result<Self> {
        let settings = Settings::load(&root)?;
        Ok(Self {
            layout: Layout::new(root, home, settings),
            env,
        })
    }
}

/// Determine the dotfiles root directory.
///
/// In order: `--root`, `DOTFILES_ROOT`, the nearest ancestor of the running
/// executable that contains `overrides/`, the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("determine current directory")?;
    let exe = std::env::current_exe()
        .ok()
        .and_then(|p| dunce::canonicalize(p).ok());
    let root = root_from(
        global.root.as_deref(),
        std::env::var_os("DOTFILES_ROOT"),
        exe.as_deref(),
        &cwd,
    );
    absolute(&root)
}

fn root_from(
    explicit: Option<&Path>,
    from_env: Option<OsString>,
    exe: Option<&Path>,
    cwd: &Path,
) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }
    if let Some(root) = from_env.filter(|r| !r.is_empty()) {
        return PathBuf::from(root);
    }
    exe.and_then(|exe| exe.ancestors().skip(1).find(|dir| dir.join(OVERRIDES_DIR).is_dir()))
        .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf)
}

/// Determine the home directory: `--home`, else the user's home directory.
///
/// # Errors
///
/// Returns an error if no home directory is known.
pub fn resolve_home(global: &GlobalOpts) -> Result<PathBuf> {
    let home = match &global.home {
        Some(home) => home.clone(),
        None => dirs::home_dir().context("cannot determine home directory; use --home")?,
    };
    absolute(&home)
}
