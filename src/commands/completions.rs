//! Command: print a shell completion script.
use clap::CommandFactory as _;
use clap_complete::Shell;

use crate::cli::Cli;

/// Generate the completion script for `shell`.
#[must_use]
pub fn render(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut out = Vec::new();
    clap_complete::generate(shell, &mut cmd, name, &mut out);
    out
}

/// Write the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run(shell: Shell) -> std::io::Result<()> {
    use std::io::Write as _;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&render(shell))?;
    stdout.flush()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_subcommands() {
        let script = String::from_utf8(render(Shell::Bash)).unwrap();
        assert!(script.contains("dotfiles"));
        for sub in ["apply", "add", "remove", "status", "test"] {
            assert!(script.contains(sub), "missing {sub}");
        }
    }

    #[test]
    fn every_shell_renders() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!render(shell).is_empty());
        }
    }
}
