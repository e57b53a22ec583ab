//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, Outcome, OutcomeCounts, OutcomeEntry};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that reports through `tracing` and collects link outcomes.
///
/// Every message also lands in `$XDG_CACHE_HOME/dotfiles/<command>.log`
/// (default `~/.cache/dotfiles/<command>.log`) once
/// [`init_subscriber`](super::subscriber::init_subscriber) has run.
#[derive(Debug)]
pub struct Logger {
    outcomes: Mutex<Vec<OutcomeEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// written by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only with `-v`; always in the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record the outcome of one link.
    pub fn record(&self, name: &str, outcome: Outcome, message: Option<&str>) {
        if let Ok(mut guard) = self.outcomes.lock() {
            guard.push(OutcomeEntry {
                name: name.to_string(),
                outcome,
                message: message.map(String::from),
            });
        }
    }

    /// Return a copy of every recorded outcome.
    #[must_use]
    pub fn outcomes(&self) -> Vec<OutcomeEntry> {
        self.outcomes.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Tally the recorded outcomes.
    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        self.outcomes
            .lock()
            .map_or_else(|_| OutcomeCounts::default(), |g| OutcomeCounts::tally(g.iter()))
    }

    /// Log the skipped and failed entries, a one-line tally, and where the
    /// log file is. Nothing is printed when no outcome was recorded.
    pub fn print_summary(&self) {
        let outcomes = self.outcomes();
        if outcomes.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in &outcomes {
            let (icon, color) = match entry.outcome {
                Outcome::Skipped => ("○", "\x1b[33m"),
                Outcome::Failed => ("✗", "\x1b[31m"),
                Outcome::Changed | Outcome::AlreadyOk | Outcome::DryRun => continue,
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        let c = OutcomeCounts::tally(&outcomes);
        self.info(&format!(
            "\x1b[32m{} changed\x1b[0m, {} already ok, \x1b[37m{} dry-run\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[31m{} failed\x1b[0m",
            c.changed, c.already_ok, c.dry_run, c.skipped, c.failed
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, outcome: Outcome, message: Option<&str>) {
        self.record(name, outcome, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    fn log_contents(log: &Logger) -> String {
        fs::read_to_string(log.log_path().expect("log path")).unwrap()
    }

    #[test]
    fn logger_starts_empty() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.outcomes().is_empty());
        assert_eq!(log.counts(), OutcomeCounts::default());
    }

    #[test]
    fn record_keeps_order_and_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record("/home/u/.bashrc", Outcome::Changed, None);
        log.record("/home/u/.vimrc", Outcome::Skipped, Some("source missing"));
        let outcomes = log.outcomes();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name, "/home/u/.bashrc");
        assert_eq!(outcomes[1].message.as_deref(), Some("source missing"));
        assert_eq!(log.counts().skipped, 1);
    }

    #[test]
    fn record_via_trait() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record("via-trait", Outcome::AlreadyOk, None);
        assert_eq!(log.counts().already_ok, 1);
    }

    #[test]
    fn log_file_is_created() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().expect("log path should exist");
        assert!(path.exists(), "file layer should create the log file");
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = log_contents(&log);
        assert!(contents.contains("[debug]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn each_level_is_tagged_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("stage-marker");
        log.warn("warn-marker");
        log.error("error-marker");
        log.dry_run("dryrun-marker");
        let contents = log_contents(&log);
        assert!(contents.contains("==> stage-marker"));
        assert!(contents.contains("[warn] warn-marker"));
        assert!(contents.contains("[error] error-marker"));
        assert!(contents.contains("[dry run] dryrun-marker"));
    }

    #[test]
    fn summary_lists_problems_and_tally() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record("a", Outcome::Changed, None);
        log.record("b", Outcome::Failed, Some("conflict"));
        log.print_summary();
        let contents = log_contents(&log);
        assert!(contents.contains("==> Summary"));
        assert!(contents.contains("b (conflict)"));
        assert!(!contents.contains("✓ a"));
        assert!(contents.contains("1 changed, 0 already ok, 0 dry-run, 0 skipped, 1 failed"));
    }

    #[test]
    fn empty_summary_prints_nothing() {
        let (log, _tmp, _guard) = isolated_logger();
        log.print_summary();
        assert!(!log_contents(&log).contains("Summary"));
    }
}
