//! Command-line interface definition.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::layout::Scope;

/// Top-level CLI entry point for the dotfiles linker.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles",
    about = "Symlink a dotfiles repository into $HOME with host and OS specific overrides",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override dotfiles root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Override the home directory links are created in
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create symlinks for regular files, bin entries and resolved overrides
    Apply(ApplyOpts),
    /// Move a file from $HOME into the dotfiles root and link it back
    Add {
        /// File to start tracking
        file: PathBuf,
    },
    /// Stop tracking a file: remove its link and move it back to $HOME
    Remove {
        /// Home link or tracked file inside the dotfiles root
        file: PathBuf,
    },
    /// Show which links are in place and which are missing
    Status,
    /// Evaluate condition expressions such as `os.Linux` or `host.box`
    Test(TestOpts),
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    /// Which part of the repository to link
    #[arg(value_enum, default_value_t = Scope::All)]
    pub scope: Scope,
}

/// Options for the `test` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct TestOpts {
    /// Expressions of the form `cond.Comp` (os, host, hostname) or `default`
    #[arg(required = true)]
    pub exprs: Vec<String>,

    /// Prefix each result with its expression
    #[arg(short, long)]
    pub explain: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn apply_defaults_to_all() {
        let cli = Cli::parse_from(["dotfiles", "apply"]);
        assert!(matches!(
            cli.command,
            Command::Apply(ApplyOpts { scope: Scope::All })
        ));
    }

    #[test]
    fn parse_apply_scopes() {
        let cli = Cli::parse_from(["dotfiles", "apply", "overrides"]);
        assert!(matches!(
            cli.command,
            Command::Apply(ApplyOpts {
                scope: Scope::Overrides
            })
        ));
        let cli = Cli::parse_from(["dotfiles", "apply", "regular"]);
        assert!(matches!(
            cli.command,
            Command::Apply(ApplyOpts {
                scope: Scope::Regular
            })
        ));
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(Cli::try_parse_from(["dotfiles", "apply", "everything"]).is_err());
    }

    #[test]
    fn parse_dry_run_short() {
        let cli = Cli::parse_from(["dotfiles", "-d", "apply"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dotfiles", "status", "--dry-run", "-v"]);
        assert!(cli.global.dry_run);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_and_home() {
        let cli = Cli::parse_from([
            "dotfiles",
            "--root",
            "/tmp/dotfiles",
            "--home",
            "/tmp/home",
            "status",
        ]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/dotfiles")));
        assert_eq!(cli.global.home, Some(PathBuf::from("/tmp/home")));
    }

    #[test]
    fn parse_add_and_remove() {
        let cli = Cli::parse_from(["dotfiles", "add", "~/.vimrc"]);
        assert!(matches!(cli.command, Command::Add { file } if file == PathBuf::from("~/.vimrc")));
        let cli = Cli::parse_from(["dotfiles", "remove", ".vimrc"]);
        assert!(matches!(cli.command, Command::Remove { .. }));
    }

    #[test]
    fn test_requires_an_expression() {
        assert!(Cli::try_parse_from(["dotfiles", "test"]).is_err());
        let cli = Cli::parse_from(["dotfiles", "test", "os.Linux", "host.box", "--explain"]);
        assert!(matches!(&cli.command, Command::Test(_)), "Expected Test command");
        if let Command::Test(opts) = cli.command {
            assert_eq!(opts.exprs, vec!["os.Linux", "host.box"]);
            assert!(opts.explain);
        }
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["dotfiles", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Command::Completions {
                shell: clap_complete::Shell::Bash
            }
        ));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotfiles", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
