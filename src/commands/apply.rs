//! Apply command implementation.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::CommandSetup;
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::layout::{Link, Scope};
use crate::logging::{Log, Logger, Outcome};
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable as _, Resource as _, ResourceChange, ResourceState};

/// Counts reported at the end of an apply run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Links created (or that would be created in a dry run).
    pub changed: usize,
    /// Links already in place.
    pub already_ok: usize,
    /// Links whose source disappeared.
    pub skipped: usize,
}

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if setup fails, an override name is malformed or
/// ambiguous, or a target is occupied by something else.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let exe = std::env::current_exe()
        .ok()
        .and_then(|p| dunce::canonicalize(p).ok());
    let result = execute(&setup, opts.scope, global.dry_run, exe.as_deref(), log);
    log.print_summary();
    result.map(|_| ())
}

/// Plan and apply the links for `scope`.
///
/// Every target is checked before the first link is written, so a conflict
/// anywhere in the plan leaves the home directory untouched. Each link is
/// checked again right before it is written.
///
/// # Errors
///
/// Returns an error if planning fails or a target conflicts.
pub fn execute(
    setup: &CommandSetup,
    scope: Scope,
    dry_run: bool,
    exe: Option<&Path>,
    log: &dyn Log,
) -> Result<ApplySummary> {
    log.stage("Resolving links");
    let plan = setup.layout.plan(scope, &setup.env, exe)?;
    for target in &plan.unmatched {
        log.debug(&format!("no override applies to {}", target.display()));
    }
    log.info(&format!("{} links planned", plan.links.len()));

    log.stage("Checking targets");
    let checked = preflight(&plan.links, log)?;

    log.stage("Linking");
    let mut summary = ApplySummary::default();
    for (link, resource, state) in checked {
        let target = link.target.display().to_string();
        match state {
            ResourceState::Correct => {
                log.debug(&format!("ok: {target} (already linked)"));
                log.record(&target, Outcome::AlreadyOk, None);
                summary.already_ok += 1;
            }
            ResourceState::Invalid { reason } => {
                log.warn(&format!("skipping {target}: {reason}"));
                log.record(&target, Outcome::Skipped, Some(reason.as_str()));
                summary.skipped += 1;
            }
            ResourceState::Missing if dry_run => {
                log.dry_run(&format!("would link {}", resource.description()));
                log.record(&target, Outcome::DryRun, None);
                summary.changed += 1;
            }
            ResourceState::Missing => match link_one(&resource, log) {
                Ok(ResourceChange::Applied) => {
                    log.debug(&format!("linked {} ({})", resource.description(), link.origin));
                    log.record(&target, Outcome::Changed, None);
                    summary.changed += 1;
                }
                Ok(ResourceChange::AlreadyCorrect) => {
                    log.record(&target, Outcome::AlreadyOk, None);
                    summary.already_ok += 1;
                }
                Ok(ResourceChange::Skipped { reason }) => {
                    log.warn(&format!("skipping {target}: {reason}"));
                    log.record(&target, Outcome::Skipped, Some(reason.as_str()));
                    summary.skipped += 1;
                }
                Err(e) => {
                    log.record(&target, Outcome::Failed, Some(format!("{e:#}").as_str()));
                    return Err(e);
                }
            },
            ResourceState::Incorrect { current } => {
                return Err(resource.conflict(&current).into());
            }
        }
    }

    let verb = if dry_run { "would change" } else { "changed" };
    log.info(&format!(
        "{} {verb}, {} already ok, {} skipped",
        summary.changed, summary.already_ok, summary.skipped
    ));
    Ok(summary)
}

/// Check every link, failing on the first conflict.
fn preflight<'a>(
    links: &'a [Link],
    log: &dyn Log,
) -> Result<Vec<(&'a Link, SymlinkResource, ResourceState)>> {
    let mut checked = Vec::with_capacity(links.len());
    for link in links {
        let resource = link.resource();
        let state = resource
            .current_state()
            .with_context(|| format!("checking {}", link.target.display()))?;
        if let ResourceState::Incorrect { current } = &state {
            let target = link.target.display().to_string();
            log.error(&format!("{target} is {current}"));
            log.record(&target, Outcome::Failed, Some(current.as_str()));
            return Err(resource.conflict(current).into());
        }
        checked.push((link, resource, state));
    }
    Ok(checked)
}

fn link_one(resource: &SymlinkResource, log: &dyn Log) -> Result<ResourceChange> {
    let change = resource.apply();
    if let Err(e) = &change {
        log.error(&format!("{e:#}"));
    }
    change
}
