//! Per-chain resolution state.
//!
//! A [`ResolutionContext`] is threaded by `&mut` through every resolution
//! call. It owns the state that must never be shared between independent
//! resolution chains: the set of paths currently being resolved (for cycle
//! detection) and the context stacks. The scope tree itself is shared; the
//! context is not.
//!
//! # Usage
//!
//! ```text
//! let mut ctx = ResolutionContext::builder()
//!     .max_depth(256)
//!     .source_dir("/etc/app")
//!     .build();
//! let value = scope.resolve(&mut ctx, &path, &Kwargs::default())?;
//! ```

use std::path::{Path as FsPath, PathBuf};

use rustc_hash::FxHashSet;
use weft_ir::{Key, Path};

use crate::errors::{cycle, recursion_limit_exceeded, ResolveResult};
use crate::guard::{CycleGuard, StackGuard};
use crate::resolvable::{Literal, Resolvable};
use crate::stacks::{ContextStacks, Monitor, StackKind};

/// Tunable limits for a resolution chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum number of nested in-progress resolutions.
    ///
    /// `None` leaves depth unbounded; deep recursion is then handled by
    /// growing the stack on demand.
    pub max_depth: Option<usize>,
}

/// State owned by one logical resolution chain.
#[derive(Debug)]
pub struct ResolutionContext {
    in_progress: FxHashSet<Path>,
    stacks: ContextStacks,
    options: ResolveOptions,
}

impl ResolutionContext {
    /// Create a context with default options and empty stacks.
    pub fn new() -> Self {
        ResolutionContext {
            in_progress: FxHashSet::default(),
            stacks: ContextStacks::new(),
            options: ResolveOptions::default(),
        }
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    #[inline]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    #[inline]
    pub fn stacks(&self) -> &ContextStacks {
        &self.stacks
    }

    /// Whether `path` is being resolved somewhere up this chain.
    pub fn is_resolving(&self, path: &[Key]) -> bool {
        self.in_progress.contains(path)
    }

    /// Number of resolutions currently in progress on this chain.
    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }

    /// Mark `path` as in progress until the returned guard drops.
    ///
    /// Fails with `Cycle` if the path is already in progress, or with
    /// `RecursionLimit` when the configured depth is reached. Nothing is
    /// recorded on failure.
    pub(crate) fn enter(&mut self, path: &[Key]) -> ResolveResult<CycleGuard<'_>> {
        if self.in_progress.contains(path) {
            return Err(cycle(path));
        }
        if let Some(limit) = self.options.max_depth {
            if self.in_progress.len() >= limit {
                return Err(recursion_limit_exceeded(limit));
            }
        }
        self.in_progress.insert(Path::from(path));
        Ok(CycleGuard::new(self, Path::from(path)))
    }

    pub(crate) fn leave(&mut self, path: &Path) {
        self.in_progress.remove(path);
    }

    // Context stacks

    /// Push a source directory until the returned guard drops.
    pub fn push_source_dir(&mut self, dir: impl Into<PathBuf>) -> StackGuard<'_> {
        self.stacks.source_dir.push(dir.into());
        StackGuard::new(self, StackKind::SourceDir)
    }

    /// Start a fresh indentation monitor until the returned guard drops.
    pub fn push_indent(&mut self) -> StackGuard<'_> {
        self.stacks.indent.push(Monitor::new());
        StackGuard::new(self, StackKind::Indent)
    }

    pub(crate) fn pop_stack(&mut self, kind: StackKind) {
        self.stacks.pop(kind);
    }

    /// Directory of the source currently being read.
    pub fn current_dir(&self) -> ResolveResult<&FsPath> {
        self.stacks.source_dir.head().map(PathBuf::as_path)
    }

    /// Feed emitted text to the innermost indentation monitor.
    pub fn feed_indent(&mut self, fragment: &str) -> ResolveResult<()> {
        self.stacks.indent.head_mut()?.feed(fragment);
        Ok(())
    }

    /// Indentation of the line under construction.
    pub fn current_indent(&self) -> ResolveResult<String> {
        Ok(self.stacks.indent.head()?.indent())
    }

    /// Head of a stack as a resolvable value.
    pub fn stack_head(&self, kind: StackKind) -> ResolveResult<Resolvable> {
        let text = match kind {
            StackKind::SourceDir => self.current_dir()?.display().to_string(),
            StackKind::Indent => self.current_indent()?,
        };
        Ok(Resolvable::Literal(Literal::text(text)))
    }
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ResolutionContext`].
#[derive(Clone, Debug, Default)]
pub struct ContextBuilder {
    options: ResolveOptions,
    source_dir: Option<PathBuf>,
    indent: bool,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of nested in-progress resolutions.
    #[must_use]
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.options.max_depth = Some(limit);
        self
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Seed the source directory stack with a base entry that no guard pops.
    #[must_use]
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Seed the indentation stack with a base monitor.
    #[must_use]
    pub fn with_indent(mut self) -> Self {
        self.indent = true;
        self
    }

    pub fn build(self) -> ResolutionContext {
        let mut ctx = ResolutionContext::new();
        ctx.options = self.options;
        if let Some(dir) = self.source_dir {
            ctx.stacks.source_dir.push(dir);
        }
        if self.indent {
            ctx.stacks.indent.push(Monitor::new());
        }
        ctx
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
