//! In-memory [`Log`] implementation.
use std::sync::Mutex;

use super::types::{Log, Outcome, OutcomeCounts, OutcomeEntry};

/// Severity/kind of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Stage header.
    Stage,
    /// Informational message.
    Info,
    /// Debug message.
    Debug,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Dry-run action.
    DryRun,
}

/// A [`Log`] that keeps every message and outcome in memory.
///
/// Messages can be replayed into `tracing` later with
/// [`replay`](Self::replay), which is how a command's output can be
/// inspected before it reaches the console.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
    outcomes: Mutex<Vec<OutcomeEntry>>,
}

/// Implement the display methods of [`Log`] by capturing each message with
/// its [`Level`].
macro_rules! capture_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.push(Level::$level, msg);
            }
        )+
    };
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((level, msg.to_string()));
        }
    }

    /// Every captured message in order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Captured messages of one level, in order.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg)
            .collect()
    }

    /// Whether any captured message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, msg)| msg.contains(needle))
    }

    /// Every recorded outcome in order.
    #[must_use]
    pub fn outcomes(&self) -> Vec<OutcomeEntry> {
        self.outcomes.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Tally the recorded outcomes.
    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(&self.outcomes())
    }

    /// Send every captured message through `log`, in order.
    pub fn replay(&self, log: &dyn Log) {
        for (level, msg) in self.entries() {
            match level {
                Level::Stage => log.stage(&msg),
                Level::Info => log.info(&msg),
                Level::Debug => log.debug(&msg),
                Level::Warn => log.warn(&msg),
                Level::Error => log.error(&msg),
                Level::DryRun => log.dry_run(&msg),
            }
        }
    }
}

impl Log for MemoryLog {
    capture_log_methods!(
        stage => Stage,
        info => Info,
        debug => Debug,
        warn => Warn,
        error => Error,
        dry_run => DryRun,
    );

    fn record(&self, name: &str, outcome: Outcome, message: Option<&str>) {
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(OutcomeEntry {
                name: name.to_string(),
                outcome,
                message: message.map(String::from),
            });
        }
    }
}
