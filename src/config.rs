//! Optional `dotfiles.toml` settings at the repository root.
//!
//! ```toml
//! ignore = ["LICENSE", "scripts"]   # extra top-level names never linked
//! bin_dir = ".local/bin"            # where bin/ is linked, relative to $HOME
//! link_self = true                  # link the running binary as <bin_dir>/dotfiles
//! ```
//!
//! A missing file yields [`Settings::default`].
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the settings file at the dotfiles root.
pub const SETTINGS_FILE: &str = "dotfiles.toml";

/// User-tunable behaviour of the linker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Extra top-level names excluded from regular linking.
    pub ignore: Vec<String>,
    /// Home-relative directory that `bin/` entries are linked into.
    pub bin_dir: PathBuf,
    /// Whether to link the running executable into [`bin_dir`](Self::bin_dir).
    pub link_self: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            bin_dir: PathBuf::from(".local/bin"),
            link_self: true,
        }
    }
}

impl Settings {
    /// Load `<root>/dotfiles.toml`, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, is not valid
    /// TOML, has unknown keys, or sets an unusable `bin_dir`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::InvalidSyntax { message, .. } => ConfigError::InvalidSyntax {
                file: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSyntax`] for malformed TOML or unknown
    /// keys and [`ConfigError::InvalidSetting`] for an unusable `bin_dir`.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
            file: SETTINGS_FILE.to_string(),
            message: e.message().to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let bin_dir_ok = !self.bin_dir.as_os_str().is_empty()
            && self
                .bin_dir
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !bin_dir_ok {
            return Err(ConfigError::InvalidSetting {
                key: "bin_dir".to_string(),
                message: format!(
                    "'{}' must be a relative path inside the home directory",
                    self.bin_dir.display()
                ),
            });
        }
        Ok(())
    }

    /// Whether a top-level entry named `name` was excluded by the user.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|i| i == name)
    }
}
