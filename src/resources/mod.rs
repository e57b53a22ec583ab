//! Idempotent filesystem primitives (check + apply pattern).
pub mod adopt;
pub mod fs;
pub mod symlink;

use anyhow::Result;

/// Minimal interface for resources that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the filesystem into the desired state.
    ///
    /// Implementations create parent directories as needed and must never
    /// overwrite data they do not own.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made, including when the
    /// target is occupied by something the resource does not own.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo a previous [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be removed, or if removal is
    /// not supported for this resource type.
    fn remove(&self) -> Result<ResourceChange> {
        anyhow::bail!(
            "operation 'remove' is not supported for resource '{}'",
            self.description()
        )
    }
}

/// State of a resource on disk.
///
/// # Examples
///
/// ```
/// use dotfiles_linker::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "a regular file".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(wrong.is_conflict());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the target.
    Missing,
    /// The target already matches the desired state.
    Correct,
    /// Something else occupies the target.
    Incorrect {
        /// What currently occupies the target.
        current: String,
    },
    /// The resource cannot be applied at all (e.g. its source vanished).
    Invalid {
        /// Why the resource cannot be applied.
        reason: String,
    },
}

impl ResourceState {
    /// Whether applying would have to replace something we do not own.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Incorrect { .. })
    }
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The filesystem was changed.
    Applied,
    /// Nothing to do.
    AlreadyCorrect,
    /// The resource was not applied.
    Skipped {
        /// Why the resource was skipped.
        reason: String,
    },
}

/// Resources that can inspect their own state before applying.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined (I/O failure other
    /// than "not found").
    fn current_state(&self) -> Result<ResourceState>;

    /// Whether [`apply`](Applicable::apply) would change the filesystem.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(self.current_state()?, ResourceState::Missing))
    }
}
