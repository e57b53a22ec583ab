//! `dotfiles` binary entry point.
use anyhow::Result;
use clap::Parser;

use dotfiles_linker::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    let command = match &args.command {
        cli::Command::Apply(_) => "apply",
        cli::Command::Add { .. } => "add",
        cli::Command::Remove { .. } => "remove",
        cli::Command::Status => "status",
        cli::Command::Test(_) => "test",
        cli::Command::Completions { shell } => return Ok(commands::completions::run(*shell)?),
        cli::Command::Version => {
            commands::version::run();
            return Ok(());
        }
    };
    logging::init_subscriber(args.verbose, command);
    let log = logging::Logger::new(command);

    match &args.command {
        cli::Command::Apply(opts) => commands::apply::run(&args.global, opts, &log),
        cli::Command::Add { file } => commands::add::run(&args.global, file, &log),
        cli::Command::Remove { file } => commands::remove::run(&args.global, file, &log),
        cli::Command::Status => commands::status::run(&args.global, &log),
        cli::Command::Test(opts) => commands::test::run(opts, &log),
        cli::Command::Completions { .. } | cli::Command::Version => Ok(()),
    }
}
