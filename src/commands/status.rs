//! Status command: report which planned links are in place.
use anyhow::{Context as _, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::layout::{Link, Scope};
use crate::logging::{Log, Logger, terminal_columns};
use crate::resources::{Resource as _, ResourceState};

/// Planned links split by whether they are in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Links that already point at their source.
    pub managed: Vec<Link>,
    /// Links that are missing or blocked, with the reason.
    pub unmanaged: Vec<(Link, String)>,
    /// Override targets no candidate applied to.
    pub unmatched: Vec<PathBuf>,
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if setup or planning fails.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let exe = std::env::current_exe()
        .ok()
        .and_then(|p| dunce::canonicalize(p).ok());
    let report = collect(&setup, exe.as_deref(), log)?;
    let text = render(
        &report,
        setup.layout.root(),
        setup.layout.home(),
        terminal_columns(),
    );
    print!("{text}");
    Ok(())
}

/// Check every link `apply all` would create, without changing anything.
///
/// # Errors
///
/// Returns an error if planning fails or a target cannot be inspected.
pub fn collect(setup: &CommandSetup, exe: Option<&Path>, log: &dyn Log) -> Result<StatusReport> {
    let plan = setup.layout.plan(Scope::All, &setup.env, exe)?;
    let mut report = StatusReport {
        unmatched: plan.unmatched,
        ..StatusReport::default()
    };
    for target in &report.unmatched {
        log.debug(&format!("unmanaged override: no candidate applies to {}", target.display()));
    }

    for link in plan.links {
        let state = link
            .resource()
            .current_state()
            .with_context(|| format!("checking {}", link.target.display()))?;
        match state {
            ResourceState::Correct => report.managed.push(link),
            ResourceState::Missing => report.unmanaged.push((link, "missing".to_string())),
            ResourceState::Incorrect { current } => report.unmanaged.push((link, current)),
            ResourceState::Invalid { reason } => report.unmanaged.push((link, reason)),
        }
    }
    Ok(report)
}

/// Render the report as up to two sections, each introduced by a
/// `width`-wide rule. Empty sections are left out.
///
/// Targets are shown relative to `home` (as `~/...`) and sources relative
/// to `root` where possible.
#[must_use]
pub fn render(report: &StatusReport, root: &Path, home: &Path, width: usize) -> String {
    let line = |link: &Link| {
        format!(
            "{} -> {}",
            shorten(&link.target, home, "~/"),
            shorten(&link.source, root, "")
        )
    };
    let rule = "─".repeat(width.max(1));

    let mut sections = Vec::new();
    if !report.managed.is_empty() {
        let mut out = format!("{rule}\nManaged ({})\n", report.managed.len());
        for link in &report.managed {
            let _ = writeln!(out, "  {}", line(link));
        }
        sections.push(out);
    }
    if !report.unmanaged.is_empty() {
        let mut out = format!("{rule}\nUnmanaged ({})\n", report.unmanaged.len());
        for (link, reason) in &report.unmanaged {
            let _ = writeln!(out, "  {} ({reason})", line(link));
        }
        sections.push(out);
    }
    sections.join("\n")
}

fn shorten(path: &Path, base: &Path, prefix: &str) -> String {
    path.strip_prefix(base).map_or_else(
        |_| path.display().to_string(),
        |rel| format!("{prefix}{}", rel.display()),
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::layout::LinkOrigin;
    use crate::logging::MemoryLog;
    use crate::platform::Environment;

    fn link(source: &str, target: &str) -> Link {
        Link {
            source: PathBuf::from(source),
            target: PathBuf::from(target),
            origin: LinkOrigin::Regular,
        }
    }

    #[test]
    fn render_sections() {
        let report = StatusReport {
            managed: vec![link("/dots/.bashrc", "/home/u/.bashrc")],
            unmanaged: vec![
                (
                    link("/dots/overrides/os.Linux@.gitconfig", "/home/u/.gitconfig"),
                    "missing".to_string(),
                ),
                (
                    link("/opt/dotfiles", "/home/u/.local/bin/dotfiles"),
                    "a regular file".to_string(),
                ),
            ],
            unmatched: Vec::new(),
        };
        insta::assert_snapshot!(
            render(&report, Path::new("/dots"), Path::new("/home/u"), 10),
            @r"
        ──────────
        Managed (1)
          ~/.bashrc -> .bashrc

        ──────────
        Unmanaged (2)
          ~/.gitconfig -> overrides/os.Linux@.gitconfig (missing)
          ~/.local/bin/dotfiles -> /opt/dotfiles (a regular file)
        "
        );
    }

    #[test]
    fn empty_sections_are_left_out() {
        let managed_only = StatusReport {
            managed: vec![link("/dots/.bashrc", "/home/u/.bashrc")],
            ..StatusReport::default()
        };
        assert_eq!(
            render(&managed_only, Path::new("/dots"), Path::new("/home/u"), 3),
            "───\nManaged (1)\n  ~/.bashrc -> .bashrc\n"
        );
        assert_eq!(
            render(&StatusReport::default(), Path::new("/dots"), Path::new("/home/u"), 3),
            ""
        );
    }

    #[cfg(unix)]
    #[test]
    fn collect_splits_by_state() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(root.join("overrides")).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        for name in [".bashrc", ".vimrc", ".zshrc", "overrides/hostname.other@.gitconfig"] {
            std::fs::write(root.join(name), "").unwrap();
        }
        std::os::unix::fs::symlink(root.join(".bashrc"), home.join(".bashrc")).unwrap();
        std::fs::write(home.join(".zshrc"), "local").unwrap();

        let setup = CommandSetup::from_parts(
            root.clone(),
            home.clone(),
            Environment::new("Linux", "", "box"),
        )
        .unwrap();
        let log = MemoryLog::new();
        let report = collect(&setup, None, &log).unwrap();

        assert_eq!(report.managed.len(), 1);
        assert_eq!(report.managed[0].target, home.join(".bashrc"));
        let reasons: Vec<&str> = report.unmanaged.iter().map(|(_, r)| r.as_str()).collect();
        assert_eq!(reasons, vec!["missing", "a regular file"]);
        assert_eq!(report.unmatched, vec![home.join(".gitconfig")]);
        assert!(log.contains("unmanaged override"));
        assert_eq!(std::fs::read_to_string(home.join(".zshrc")).unwrap(), "local");
    }
}
