//! Grouping of override candidates and selection of the best one per target.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::condition::ConditionKind;
use super::parse::{OverrideDescriptor, parse};
use crate::error::{ParseError, ResolveError};
use crate::platform::Environment;

/// One override file and its parsed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path of the override file, relative to the overrides directory.
    pub source: PathBuf,
    /// Parsed file name.
    pub descriptor: OverrideDescriptor,
}

impl Candidate {
    /// Parse the file name of `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the file name is not a valid override name
    /// (non-UTF-8 names are reported as [`ParseError::NoConditionFound`]).
    pub fn from_path(source: impl Into<PathBuf>) -> Result<Self, ParseError> {
        let source = source.into();
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ParseError::NoConditionFound {
                file: source.to_string_lossy().into_owned(),
            })?;
        let descriptor = parse(name)?;
        Ok(Self { source, descriptor })
    }

    /// Normalized target path: the parent directory joined with the
    /// condition-stripped name.
    #[must_use]
    pub fn target(&self) -> PathBuf {
        self.source
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(self.descriptor.target_name())
    }

    const fn kind(&self) -> ConditionKind {
        self.descriptor.kind()
    }

    /// Rank of this candidate on `env`, or `None` if its condition is false.
    ///
    /// The kind's rank comes first. Within the OS rank, a more specific OS
    /// identity (`WSL` over the plain system name) ranks higher.
    fn specificity(&self, env: &Environment) -> Option<(u8, usize)> {
        let rank = self.kind().rank();
        match (self.kind(), self.descriptor.comparison()) {
            (ConditionKind::Os, Some(comp)) => env.os_specificity(comp).map(|s| (rank, s)),
            _ if self.descriptor.matches(env) => Some((rank, 0)),
            _ => None,
        }
    }
}

/// All candidates that normalize to the same target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup {
    target: PathBuf,
    candidates: Vec<Candidate>,
}

impl CandidateGroup {
    /// Normalized target path shared by every candidate.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Candidates, sorted by source path.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Pick the winning candidate for `env`.
    ///
    /// A default candidate is taken only while nothing else has been chosen;
    /// a matching conditional replaces the current pick only if it is
    /// strictly more specific. On WSL, `os.WSL` is more specific than
    /// `os.Linux`. The result does not depend on candidate order.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Ambiguous`] when two eligible candidates are
    /// equally specific and nothing beats them.
    pub fn select(&self, env: &Environment) -> Result<Option<&Candidate>, ResolveError> {
        let mut best: Option<(&Candidate, (u8, usize))> = None;
        let mut tied: Option<&Candidate> = None;

        for candidate in &self.candidates {
            let Some(key) = candidate.specificity(env) else {
                continue;
            };
            match best {
                Some((_, k)) if key < k => {}
                Some((_, k)) if key == k => tied = Some(candidate),
                _ => {
                    best = Some((candidate, key));
                    tied = None;
                }
            }
        }

        let best = best.map(|(candidate, _)| candidate);
        if let (Some(a), Some(b)) = (best, tied) {
            let (first, second) = if a.source <= b.source { (a, b) } else { (b, a) };
            return Err(ResolveError::Ambiguous {
                target: self.target.display().to_string(),
                first: first.source.display().to_string(),
                second: second.source.display().to_string(),
                kind: a.kind().to_string(),
            });
        }
        Ok(best)
    }
}

/// Parse every path's file name and group the candidates by target.
///
/// Groups come back sorted by target path.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; no partial result is
/// produced.
pub fn collect<I, P>(paths: I) -> Result<Vec<CandidateGroup>, ParseError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let candidates = paths
        .into_iter()
        .map(Candidate::from_path)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(group(candidates))
}

/// Group already-parsed candidates by target path.
#[must_use]
pub fn group(candidates: impl IntoIterator<Item = Candidate>) -> Vec<CandidateGroup> {
    let mut groups: BTreeMap<PathBuf, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        groups.entry(candidate.target()).or_default().push(candidate);
    }
    groups
        .into_iter()
        .map(|(target, mut candidates)| {
            candidates.sort_by(|a, b| a.source.cmp(&b.source));
            CandidateGroup { target, candidates }
        })
        .collect()
}

/// Winning source per target, plus the targets nothing applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    chosen: BTreeMap<PathBuf, PathBuf>,
    unmatched: Vec<PathBuf>,
}

impl ResolutionResult {
    /// Source chosen for `target`, if any.
    #[must_use]
    pub fn get(&self, target: &Path) -> Option<&Path> {
        self.chosen.get(target).map(PathBuf::as_path)
    }

    /// `(target, source)` pairs in target order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.chosen
            .iter()
            .map(|(target, source)| (target.as_path(), source.as_path()))
    }

    /// Number of resolved targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// Whether no target resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Targets whose group had no matching candidate and no default.
    #[must_use]
    pub fn unmatched(&self) -> &[PathBuf] {
        &self.unmatched
    }
}

/// Select the winner of every group.
///
/// # Errors
///
/// Returns the first [`ResolveError`] from [`CandidateGroup::select`].
pub fn resolve(
    groups: &[CandidateGroup],
    env: &Environment,
) -> Result<ResolutionResult, ResolveError> {
    let mut result = ResolutionResult::default();
    for group in groups {
        match group.select(env)? {
            Some(winner) => {
                result
                    .chosen
                    .insert(group.target.clone(), winner.source.clone());
            }
            None => result.unmatched.push(group.target.clone()),
        }
    }
    Ok(result)
}
