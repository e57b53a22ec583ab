//! Parsing of override file names.
//!
//! Grammar:
//!
//! ```text
//! override-filename := "default@" name          ("default" is case-insensitive)
//!                    | cond "." comp "@" name    (cond, comp: ASCII letters)
//! cond              := "os" | "host" | "hostname" (case-insensitive)
//! ```
//!
//! Only the first `@` separates the prefix from the name; the name itself
//! may contain further `@` characters.
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::condition::{Condition, ConditionKind};
use crate::error::ParseError;
use crate::platform::Environment;

#[allow(clippy::expect_used)] // literal pattern
static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(?i:default)@(?P<name>.+)$").expect("valid regex"));

#[allow(clippy::expect_used)] // literal pattern
static CONDITIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<cond>[a-zA-Z]+)\.(?P<comp>[a-zA-Z]+)@(?P<name>.+)$")
        .expect("valid regex")
});

/// Structured form of one override file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverrideDescriptor {
    condition: Condition,
    target_name: String,
}

impl OverrideDescriptor {
    /// Build a descriptor from its parts.
    #[must_use]
    pub fn new(condition: Condition, target_name: impl Into<String>) -> Self {
        Self {
            condition,
            target_name: target_name.into(),
        }
    }

    /// The parsed condition.
    #[must_use]
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Shorthand for `condition().kind()`.
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        self.condition.kind()
    }

    /// Shorthand for `condition().comparison()`.
    #[must_use]
    pub fn comparison(&self) -> Option<&str> {
        self.condition.comparison()
    }

    /// File name the override is linked as, with the condition stripped.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Whether the condition holds in `env`.
    #[must_use]
    pub fn matches(&self, env: &Environment) -> bool {
        self.condition.evaluate(env)
    }
}

impl fmt::Display for OverrideDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.condition, self.target_name)
    }
}

impl FromStr for OverrideDescriptor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse one raw file name.
///
/// # Errors
///
/// Returns [`ParseError::InvalidCondition`] when the name has a
/// `cond.Comp@` prefix with an unknown `cond`, and
/// [`ParseError::NoConditionFound`] when it matches neither form.
pub fn parse(raw: &str) -> Result<OverrideDescriptor, ParseError> {
    if let Some(caps) = DEFAULT_RE.captures(raw) {
        return Ok(OverrideDescriptor::new(
            Condition::default_condition(),
            &caps["name"],
        ));
    }

    let Some(caps) = CONDITIONAL_RE.captures(raw) else {
        return Err(ParseError::NoConditionFound {
            file: raw.to_string(),
        });
    };

    let token = &caps["cond"];
    let kind = ConditionKind::from_token(token).ok_or_else(|| ParseError::InvalidCondition {
        file: raw.to_string(),
        condition: token.to_ascii_lowercase(),
    })?;

    Ok(OverrideDescriptor::new(
        Condition::conditional(kind, &caps["comp"]),
        &caps["name"],
    ))
}
