//! Host- and OS-conditional file variants.
//!
//! Files below `overrides/` encode a condition in their name
//! (`default@bashrc`, `os.Linux@bashrc`, `hostname.box@bashrc`). For every
//! target name at most one file is chosen, preferring hostname over OS over
//! default. Everything here is pure: no I/O, no logging.
pub mod condition;
pub mod parse;
pub mod resolve;

pub use condition::{Condition, ConditionKind, parse_expression};
pub use parse::{OverrideDescriptor, parse};
pub use resolve::{Candidate, CandidateGroup, ResolutionResult, collect, group, resolve};
