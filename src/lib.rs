//! Dotfiles linker.
//!
//! Mirrors a dotfiles repository into the home directory as symlinks.
//! Files under `overrides/` carry a condition in their name
//! (`hostname.box@.gitconfig`, `os.Darwin@.gitconfig`, `default@.gitconfig`)
//! and exactly one candidate per target is linked: hostname beats OS beats
//! default.
//!
//! The public API is organised into layers:
//!
//! - **[`overrides`]**: pure parsing and resolution of override names
//! - **[`layout`]**: discovery of what a repository wants linked where
//! - **[`resources`]**: idempotent `check + apply` filesystem primitives
//! - **[`commands`]**: subcommand orchestration (`apply`, `add`, `status`, ...)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod layout;
pub mod logging;
pub mod overrides;
pub mod platform;
pub mod resources;
