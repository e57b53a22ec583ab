//! Core logging types: per-link outcomes and the [`Log`] trait.

/// What happened to a single link during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The link was created (or the file moved).
    Changed,
    /// The link was already in place.
    AlreadyOk,
    /// The link was not attempted (e.g. its source vanished).
    Skipped,
    /// Dry run; the change was only reported.
    DryRun,
    /// The change failed.
    Failed,
}

/// A recorded [`Outcome`] for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeEntry {
    /// What the outcome is about, usually a target path.
    pub name: String,
    /// What happened.
    pub outcome: Outcome,
    /// Optional detail (skip reason, error text).
    pub message: Option<String>,
}

/// Tally of recorded outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// [`Outcome::Changed`] entries.
    pub changed: usize,
    /// [`Outcome::AlreadyOk`] entries.
    pub already_ok: usize,
    /// [`Outcome::Skipped`] entries.
    pub skipped: usize,
    /// [`Outcome::DryRun`] entries.
    pub dry_run: usize,
    /// [`Outcome::Failed`] entries.
    pub failed: usize,
}

impl OutcomeCounts {
    /// Count the outcomes of `entries`.
    #[must_use]
    pub fn tally<'a>(entries: impl IntoIterator<Item = &'a OutcomeEntry>) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.outcome {
                Outcome::Changed => counts.changed += 1,
                Outcome::AlreadyOk => counts.already_ok += 1,
                Outcome::Skipped => counts.skipped += 1,
                Outcome::DryRun => counts.dry_run += 1,
                Outcome::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

/// Reporting interface handed to commands.
///
/// [`Logger`](super::logger::Logger) writes through `tracing`;
/// [`MemoryLog`](super::memory::MemoryLog) keeps everything in memory so
/// callers can assert on what was reported.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record the outcome of one link for the summary.
    fn record(&self, name: &str, outcome: Outcome, message: Option<&str>);
}
