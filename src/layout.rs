//! Discovery of what the dotfiles root wants linked into the home directory.
//!
//! ```text
//! <root>/
//! ├── .bashrc                 -> ~/.bashrc                 (regular)
//! ├── .config/git/config      -> ~/.config/git/config      (regular)
//! ├── bin/tool                -> ~/.local/bin/tool         (bin)
//! └── overrides/
//!     ├── default@.gitconfig  -> ~/.gitconfig              (override)
//!     └── os.Darwin@.gitconfig
//! ```
use anyhow::{Context as _, Result, bail};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{SETTINGS_FILE, Settings};
use crate::overrides::{CandidateGroup, collect, resolve};
use crate::platform::Environment;
use crate::resources::fs::same_file;
use crate::resources::symlink::SymlinkResource;

/// Directory holding conditional variants.
pub const OVERRIDES_DIR: &str = "overrides";

/// Directory whose contents are linked into the executables directory.
pub const BIN_DIR: &str = "bin";

/// File name the running executable is linked as.
pub const SELF_NAME: &str = "dotfiles";

/// Top-level names that are never linked as regular files.
pub const RESERVED_NAMES: &[&str] = &[
    ".git",
    OVERRIDES_DIR,
    BIN_DIR,
    SETTINGS_FILE,
    ".gitignore",
    "README.md",
];

/// Which part of the layout to operate on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Scope {
    /// Regular files, bin files, the executable and overrides.
    #[default]
    All,
    /// Only resolved overrides.
    Overrides,
    /// Everything except overrides.
    Regular,
}

impl Scope {
    const fn includes_regular(self) -> bool {
        matches!(self, Self::All | Self::Regular)
    }

    const fn includes_overrides(self) -> bool {
        matches!(self, Self::All | Self::Overrides)
    }
}

/// Where a [`Link`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkOrigin {
    /// A plain file mirrored into the home directory.
    Regular,
    /// The winning candidate of an override group.
    Override,
    /// An entry of `bin/`.
    Bin,
    /// The running executable.
    SelfBinary,
}

impl fmt::Display for LinkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Regular => "regular",
            Self::Override => "override",
            Self::Bin => "bin",
            Self::SelfBinary => "self",
        })
    }
}

/// A desired symlink at `target` pointing to `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute path of the file the link points to.
    pub source: PathBuf,
    /// Absolute path inside the home directory.
    pub target: PathBuf,
    /// Which part of the layout produced the link.
    pub origin: LinkOrigin,
}

impl Link {
    /// The resource that creates or checks this link.
    #[must_use]
    pub fn resource(&self) -> SymlinkResource {
        SymlinkResource::new(self.source.clone(), self.target.clone())
    }
}

/// Everything a run should link, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Links sorted by target path.
    pub links: Vec<Link>,
    /// Override targets (absolute) that no candidate applied to.
    pub unmatched: Vec<PathBuf>,
}

/// A dotfiles root paired with the home directory it is linked into.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    home: PathBuf,
    settings: Settings,
}

impl Layout {
    /// Create a layout over `root`, linking into `home`.
    #[must_use]
    pub const fn new(root: PathBuf, home: PathBuf, settings: Settings) -> Self {
        Self {
            root,
            home,
            settings,
        }
    }

    /// The dotfiles root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The `overrides/` directory.
    #[must_use]
    pub fn overrides_dir(&self) -> PathBuf {
        self.root.join(OVERRIDES_DIR)
    }

    /// Where `bin/` entries and the executable are linked.
    #[must_use]
    pub fn bin_target_dir(&self) -> PathBuf {
        self.home.join(&self.settings.bin_dir)
    }

    /// Whether a top-level entry of the root is excluded from regular linking.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        RESERVED_NAMES.contains(&name) || self.settings.is_ignored(name)
    }

    /// Links for every regular file of the root.
    ///
    /// When `exe` lives inside the root, the top-level entry holding it
    /// (the binary itself, or e.g. a `target/` build tree) is left out.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read.
    pub fn regular_links(&self, exe: Option<&Path>) -> Result<Vec<Link>> {
        let exe_entry = exe.and_then(|e| self.top_level_entry(e));
        let mut links = Vec::new();
        for entry in read_sorted(&self.root)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.is_reserved(&name) || exe_entry.as_deref() == Some(name.as_str()) {
                continue;
            }
            let path = self.root.join(&name);
            for rel in walk_entry(&path, PathBuf::from(&name))? {
                links.push(Link {
                    source: self.root.join(&rel),
                    target: self.home.join(&rel),
                    origin: LinkOrigin::Regular,
                });
            }
        }
        Ok(links)
    }

    /// Name of the top-level entry of the root that contains `path`.
    fn top_level_entry(&self, path: &Path) -> Option<String> {
        let rel = path
            .strip_prefix(&self.root)
            .ok()
            .map(Path::to_path_buf)
            .or_else(|| {
                let root = dunce::canonicalize(&self.root).ok()?;
                let path = dunce::canonicalize(path).ok()?;
                path.strip_prefix(root).ok().map(Path::to_path_buf)
            });
        rel.and_then(|r| {
            r.components()
                .next()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
        })
    }

    /// Links for every file below `bin/`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read.
    pub fn bin_links(&self) -> Result<Vec<Link>> {
        let bin = self.root.join(BIN_DIR);
        let target_dir = self.bin_target_dir();
        Ok(walk(&bin)?
            .into_iter()
            .map(|rel| Link {
                source: bin.join(&rel),
                target: target_dir.join(&rel),
                origin: LinkOrigin::Bin,
            })
            .collect())
    }

    /// Link for the running executable, when enabled.
    ///
    /// Nothing is returned when the executable already lives at the link
    /// location as a real file.
    #[must_use]
    pub fn self_link(&self, exe: Option<&Path>) -> Option<Link> {
        if !self.settings.link_self {
            return None;
        }
        let exe = exe?;
        let target = self.bin_target_dir().join(SELF_NAME);
        let installed_here = std::fs::symlink_metadata(&target)
            .is_ok_and(|m| m.file_type().is_file())
            && same_file(exe, &target);
        if installed_here {
            return None;
        }
        Some(Link {
            source: exe.to_path_buf(),
            target,
            origin: LinkOrigin::SelfBinary,
        })
    }

    /// Parse every file name below `overrides/` and group them by target.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read or any file name is
    /// not a valid override name.
    pub fn override_groups(&self) -> Result<Vec<CandidateGroup>> {
        let files = walk(&self.overrides_dir())?;
        Ok(collect(files)?)
    }

    /// Resolve override groups for `env`.
    ///
    /// Returns the links of the winners and the absolute targets of groups
    /// nothing applied to.
    ///
    /// # Errors
    ///
    /// Returns an error on unreadable directories, malformed names, or
    /// ambiguous groups.
    pub fn override_links(&self, env: &Environment) -> Result<(Vec<Link>, Vec<PathBuf>)> {
        let groups = self.override_groups()?;
        let resolution = resolve(&groups, env)?;
        let overrides = self.overrides_dir();
        let links = resolution
            .iter()
            .map(|(target, source)| Link {
                source: overrides.join(source),
                target: self.home.join(target),
                origin: LinkOrigin::Override,
            })
            .collect();
        let unmatched = resolution
            .unmatched()
            .iter()
            .map(|t| self.home.join(t))
            .collect();
        Ok((links, unmatched))
    }

    /// Build the full plan for `scope`.
    ///
    /// Every override name is parsed and resolved before anything is
    /// returned, so a malformed name fails the run before any mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or resolution fails, or if two links
    /// with different sources claim the same target.
    pub fn plan(&self, scope: Scope, env: &Environment, exe: Option<&Path>) -> Result<Plan> {
        let mut links = Vec::new();
        let mut unmatched = Vec::new();

        if scope.includes_overrides() {
            let (resolved, missing) = self.override_links(env)?;
            links.extend(resolved);
            unmatched = missing;
        }
        if scope.includes_regular() {
            links.extend(self.regular_links(exe)?);
            links.extend(self.bin_links()?);
            links.extend(self.self_link(exe));
        }

        let mut by_target: BTreeMap<PathBuf, Link> = BTreeMap::new();
        for link in links {
            if let Some(existing) = by_target.get(&link.target) {
                if same_file(&existing.source, &link.source) {
                    continue;
                }
                bail!(
                    "{} is claimed by both {} and {}",
                    link.target.display(),
                    existing.source.display(),
                    link.source.display()
                );
            }
            by_target.insert(link.target.clone(), link);
        }

        Ok(Plan {
            links: by_target.into_values().collect(),
            unmatched,
        })
    }
}

/// Files below `dir`, relative to it and sorted. A missing `dir` is empty.
fn walk(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in read_sorted(dir)? {
        let name = PathBuf::from(entry.file_name());
        files.extend(walk_entry(&entry.path(), name)?);
    }
    Ok(files)
}

/// `rel` itself if `path` is a file, otherwise every file below it.
///
/// Symlinked directories are neither followed nor linked.
fn walk_entry(path: &Path, rel: PathBuf) -> Result<Vec<PathBuf>> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    let file_type = meta.file_type();

    if file_type.is_dir() {
        let mut files = Vec::new();
        for entry in read_sorted(path)? {
            files.extend(walk_entry(&entry.path(), rel.join(entry.file_name()))?);
        }
        return Ok(files);
    }
    if file_type.is_symlink() && path.is_dir() {
        return Ok(Vec::new());
    }
    Ok(vec![rel])
}

fn read_sorted(dir: &Path) -> Result<Vec<std::fs::DirEntry>> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory: {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading directory: {}", dir.display()))?;
    entries.sort_by_key(std::fs::DirEntry::file_name);
    Ok(entries)
}
