//! Resolution errors and their constructors.
//!
//! Every failure the engine can report is a [`ResolveError`]. Construct them
//! through the functions in this module so message wording stays in one place.
//!
//! # Retry Policy
//!
//! The no-such-path family ([`ResolveError::is_no_such_path`]) is what the
//! shrinking-context retry catches and accumulates. Everything else
//! (cycles, recursion limits, bind errors, host failures) propagates at once.

use std::fmt;

use weft_ir::{Entry, Path};

use crate::stacks::StackKind;

/// Result of a resolution step.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// A resolution failure.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// A bind path is empty or contains a malformed segment.
    #[error("`{path}` is not a path: {reason}")]
    NotAPath { path: Path, reason: &'static str },

    /// A bind target cannot be stored at the requested key.
    #[error("cannot bind `{path}`: {reason}")]
    NotAResolvable { path: Path, reason: &'static str },

    /// No candidate exists anywhere for the path.
    #[error("no such path `{path}`")]
    UnparseNoSuchPath { path: Path },

    /// A candidate was found, but resolving it failed in every context.
    #[error("`{path}` could not be resolved in any context{causes}")]
    TreeNoSuchPath { path: Path, causes: Causes },

    /// The path is already being resolved on this resolution chain.
    #[error("cycle detected while resolving `{path}`")]
    Cycle { path: Path },

    /// `execute` found no directive in a statement.
    #[error("no directive found in `{entry}`")]
    UnsupportedEntry { entry: String },

    /// A context stack was read while empty.
    #[error("context stack `{stack}` is empty")]
    EmptyStack { stack: StackKind },

    /// Too many nested resolutions are in progress.
    #[error("resolution nested deeper than {limit} levels")]
    RecursionLimit { limit: usize },

    /// Failure reported by a host function or directive.
    #[error("{message}")]
    Custom { message: String },
}

impl ResolveError {
    /// Whether this error means "nothing usable was found here".
    ///
    /// These are the errors the contextual retry catches and records.
    pub fn is_no_such_path(&self) -> bool {
        matches!(
            self,
            ResolveError::UnparseNoSuchPath { .. }
                | ResolveError::TreeNoSuchPath { .. }
                | ResolveError::EmptyStack { .. }
        )
    }
}

/// Deduplicated failure messages with occurrence counts.
///
/// Keeps the order in which distinct messages were first seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Causes {
    entries: Vec<(String, usize)>,
}

impl Causes {
    /// Record one occurrence of `error`.
    pub fn record(&mut self, error: &ResolveError) {
        let message = error.to_string();
        if let Some((_, count)) = self.entries.iter_mut().find(|(seen, _)| *seen == message) {
            *count += 1;
        } else {
            self.entries.push((message, 1));
        }
    }

    /// Distinct messages with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(message, count)| (message.as_str(), *count))
    }

    /// Number of distinct messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of recorded failures, duplicates included.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for Causes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (message, count) in &self.entries {
            write!(f, "\n  - {message}")?;
            if *count > 1 {
                write!(f, " (x{count})")?;
            }
        }
        Ok(())
    }
}

// Bind Errors

#[cold]
pub fn empty_path() -> ResolveError {
    ResolveError::NotAPath {
        path: Path::default(),
        reason: "a path needs at least one segment",
    }
}

#[cold]
pub fn malformed_segment(path: &[weft_ir::Key]) -> ResolveError {
    ResolveError::NotAPath {
        path: Path::from(path),
        reason: "segments must be non-empty and contain no `.` or whitespace",
    }
}

#[cold]
pub fn prototype_not_a_scope(path: &[weft_ir::Key]) -> ResolveError {
    ResolveError::NotAResolvable {
        path: Path::from(path),
        reason: "a prototype must be a scope",
    }
}

#[cold]
pub fn scope_inside_itself(path: &[weft_ir::Key]) -> ResolveError {
    ResolveError::NotAResolvable {
        path: Path::from(path),
        reason: "a scope cannot be bound inside itself",
    }
}

// Lookup Errors

#[cold]
pub fn no_such_path(path: &[weft_ir::Key]) -> ResolveError {
    ResolveError::UnparseNoSuchPath {
        path: Path::from(path),
    }
}

#[cold]
pub fn unresolvable_in_context(path: &[weft_ir::Key], causes: Causes) -> ResolveError {
    ResolveError::TreeNoSuchPath {
        path: Path::from(path),
        causes,
    }
}

#[cold]
pub fn cycle(path: &[weft_ir::Key]) -> ResolveError {
    ResolveError::Cycle {
        path: Path::from(path),
    }
}

#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> ResolveError {
    ResolveError::RecursionLimit { limit }
}

#[cold]
pub fn empty_stack(stack: StackKind) -> ResolveError {
    ResolveError::EmptyStack { stack }
}

// Dispatch Errors

#[cold]
pub fn unsupported_entry(entry: &Entry) -> ResolveError {
    ResolveError::UnsupportedEntry {
        entry: entry.to_string(),
    }
}

/// Failure raised by host code (built-in functions, directives, readers).
#[cold]
pub fn custom(message: impl Into<String>) -> ResolveError {
    ResolveError::Custom {
        message: message.into(),
    }
}
