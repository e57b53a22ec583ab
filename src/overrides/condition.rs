//! Condition kinds, their specificity ranks, and the environment predicates.
use std::fmt;

use crate::error::ParseError;
use crate::platform::Environment;

/// What an override is conditioned on.
///
/// Variants are ordered by specificity through [`rank`](Self::rank), not by
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// Unconditional fallback (`default@name`).
    Default,
    /// Operating system (`os.Linux@name`).
    Os,
    /// Network host name (`host.box@name` or `hostname.box@name`).
    Hostname,
}

impl ConditionKind {
    /// Specificity used to break ties between matching candidates.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Os => 1,
            Self::Hostname => 2,
        }
    }

    /// Look up a conditional token (case-insensitive). `default` is not a
    /// conditional token and returns `None`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "os" => Some(Self::Os),
            "host" | "hostname" => Some(Self::Hostname),
            _ => None,
        }
    }

    /// Canonical spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Os => "os",
            Self::Hostname => "hostname",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition kind together with the value it compares against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    kind: ConditionKind,
    comparison: Option<String>,
}

impl Condition {
    /// The unconditional fallback.
    #[must_use]
    pub const fn default_condition() -> Self {
        Self {
            kind: ConditionKind::Default,
            comparison: None,
        }
    }

    /// A conditional on `kind` comparing against `comparison`.
    ///
    /// `kind` must not be [`ConditionKind::Default`]; use
    /// [`default_condition`](Self::default_condition) for that.
    #[must_use]
    pub fn conditional(kind: ConditionKind, comparison: impl Into<String>) -> Self {
        debug_assert!(kind != ConditionKind::Default);
        Self {
            kind,
            comparison: Some(comparison.into()),
        }
    }

    /// The condition kind.
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// The comparison value; `None` only for the default condition.
    #[must_use]
    pub fn comparison(&self) -> Option<&str> {
        self.comparison.as_deref()
    }

    /// Evaluate against `env`. The default condition is always true.
    #[must_use]
    pub fn evaluate(&self, env: &Environment) -> bool {
        match (self.kind, self.comparison.as_deref()) {
            (ConditionKind::Default, _) => true,
            (ConditionKind::Os, Some(comp)) => os_matches(comp, env),
            (ConditionKind::Hostname, Some(comp)) => hostname_matches(comp, env),
            (_, None) => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comparison {
            Some(comp) => write!(f, "{}.{comp}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// True if `comp` names the running OS, or is `WSL` under WSL.
#[must_use]
pub fn os_matches(comp: &str, env: &Environment) -> bool {
    env.has_os(comp)
}

/// True if `comp` is exactly the machine's host name.
#[must_use]
pub fn hostname_matches(comp: &str, env: &Environment) -> bool {
    comp == env.hostname()
}

/// Parse a standalone condition expression such as `os.Linux`,
/// `host.work-laptop` or `default`.
///
/// Unlike file names, the comparison value of an expression is not limited to
/// letters.
///
/// # Errors
///
/// Returns [`ParseError::InvalidCondition`] for an unknown condition token and
/// [`ParseError::InvalidExpression`] for anything not shaped like `cond.Comp`.
pub fn parse_expression(expr: &str) -> Result<Condition, ParseError> {
    let trimmed = expr.trim();
    if trimmed.eq_ignore_ascii_case("default") {
        return Ok(Condition::default_condition());
    }

    let invalid = || ParseError::InvalidExpression {
        expr: expr.to_string(),
    };
    let (token, comp) = trimmed.split_once('.').ok_or_else(invalid)?;
    if token.is_empty() || comp.is_empty() || !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    let kind = ConditionKind::from_token(token).ok_or_else(|| ParseError::InvalidCondition {
        file: expr.to_string(),
        condition: token.to_ascii_lowercase(),
    })?;
    Ok(Condition::conditional(kind, comp))
}
