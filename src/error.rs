//! Domain-specific error types for the dotfiles linker.
//!
//! Internal modules return typed errors (e.g. [`ParseError`], [`ConflictError`])
//! while command handlers at the CLI boundary convert them to [`anyhow::Error`]
//! via the standard `?` operator.
//!
//! | type | raised by |
//! |---|---|
//! | [`ConfigError`] | `dotfiles.toml` loading |
//! | [`ParseError`] | malformed override names and expressions |
//! | [`ResolveError`] | ambiguous override groups |
//! | [`ConflictError`] | a target exists and is not our link |
//! | [`EnvironmentError`] | OS and hostname detection |
//! | [`AdoptError`] | `add` and `remove` preconditions |
//!
//! Every error is fatal for the run: none of them can succeed on retry
//! without the user fixing a file name or moving a file out of the way.

use thiserror::Error;

/// Errors that arise from loading `dotfiles.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file contains invalid TOML or unknown keys.
    #[error("Invalid settings in {file}: {message}")]
    InvalidSyntax {
        /// Path of the settings file.
        file: String,
        /// Parser message.
        message: String,
    },

    /// A setting has a value the linker cannot use.
    #[error("Invalid value for '{key}': {message}")]
    InvalidSetting {
        /// Name of the offending key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// An I/O error occurred while reading the settings file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors produced while parsing override file names or condition expressions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The name has a `cond.Comp@` prefix but `cond` is not a known condition.
    #[error(
        "invalid condition '{condition}' in override '{file}' (expected one of: os, host, hostname)"
    )]
    InvalidCondition {
        /// The raw file name or expression.
        file: String,
        /// The unrecognised condition token.
        condition: String,
    },

    /// The name matches neither `default@name` nor `cond.Comp@name`.
    #[error("no valid condition found in override '{file}' (expected cond.Comp@name or default@name)")]
    NoConditionFound {
        /// The raw file name.
        file: String,
    },

    /// A `test` expression is not of the form `cond.Comp`.
    #[error("invalid condition expression '{expr}' (expected cond.Comp or default)")]
    InvalidExpression {
        /// The raw expression.
        expr: String,
    },
}

/// Errors produced while selecting the best override of a group.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Two candidates of the winning rank both apply to the same target.
    #[error("ambiguous overrides for '{target}': '{first}' and '{second}' both match at {kind} level")]
    Ambiguous {
        /// Normalized target path (relative to `overrides/`).
        target: String,
        /// Lexically first competing candidate.
        first: String,
        /// Lexically second competing candidate.
        second: String,
        /// Condition kind shared by both candidates.
        kind: String,
    },
}

/// A symlink target is occupied by something that is not a link to our source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "refusing to replace {target}: expected a symlink to {expected}, found {actual}; move or delete it and try again"
)]
pub struct ConflictError {
    /// Path that would have been replaced.
    pub target: String,
    /// Source the target should link to.
    pub expected: String,
    /// Description of what currently occupies the target.
    pub actual: String,
}

/// Errors that arise while capturing the current environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// The operating system name could not be determined.
    #[error("cannot determine operating system name: {0}")]
    SystemUnavailable(String),

    /// The network host name could not be determined.
    #[error("cannot determine host name: {0}")]
    HostnameUnavailable(String),
}

/// Errors that arise from `add` and `remove` preconditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdoptError {
    /// The path is missing, a directory, or already a symlink.
    #[error("{path} is not a regular file")]
    NotRegularFile {
        /// Offending path.
        path: String,
    },

    /// Only files below the home directory can be tracked.
    #[error("{path} is not inside the home directory {home}")]
    OutsideHome {
        /// Offending path.
        path: String,
        /// Home directory in use.
        home: String,
    },

    /// The dotfiles root already contains a file at the destination.
    #[error("{path} is already tracked in the dotfiles root")]
    AlreadyTracked {
        /// Destination inside the dotfiles root.
        path: String,
    },

    /// The path does not resolve to a file inside the dotfiles root.
    #[error("{path} does not resolve into the dotfiles root {root} (is it added?)")]
    NotManaged {
        /// Offending path.
        path: String,
        /// Dotfiles root in use.
        root: String,
    },

    /// Directories cannot be removed from tracking.
    #[error("{path} is a directory; only files can be removed")]
    IsDirectory {
        /// Offending path.
        path: String,
    },
}
