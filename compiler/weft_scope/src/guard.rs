//! RAII guards over [`ResolutionContext`] state.
//!
//! Every push onto the cycle set or a context stack is paired with a guard
//! that undoes it on drop, including during unwinding. Guards hold
//! `&mut ResolutionContext` and implement `Deref`/`DerefMut`, so nested work
//! runs through the guard exactly as it would through the context itself.
//!
//! # Usage
//!
//! ```text
//! {
//!     let mut inner = ctx.push_source_dir(dir);
//!     reader.read(&mut inner, &target, &file)?;
//! } // popped here, even on error or panic
//! ```

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use weft_ir::Path;

use crate::context::ResolutionContext;
use crate::stacks::StackKind;

/// Keeps a path marked as in progress while held.
pub struct CycleGuard<'ctx> {
    ctx: &'ctx mut ResolutionContext,
    path: Path,
}

impl<'ctx> CycleGuard<'ctx> {
    pub(crate) fn new(ctx: &'ctx mut ResolutionContext, path: Path) -> Self {
        CycleGuard { ctx, path }
    }

    /// The path this guard holds.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.ctx.leave(&self.path);
    }
}

impl Deref for CycleGuard<'_> {
    type Target = ResolutionContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for CycleGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

/// Pops one context stack entry when dropped.
pub struct StackGuard<'ctx> {
    ctx: &'ctx mut ResolutionContext,
    kind: StackKind,
}

impl<'ctx> StackGuard<'ctx> {
    pub(crate) fn new(ctx: &'ctx mut ResolutionContext, kind: StackKind) -> Self {
        StackGuard { ctx, kind }
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.ctx.pop_stack(self.kind);
    }
}

impl Deref for StackGuard<'_> {
    type Target = ResolutionContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for StackGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl ResolutionContext {
    /// Run `f` with `dir` pushed as the current source directory.
    ///
    /// The directory is popped when `f` returns, even on panic.
    pub fn with_source_dir<T, F>(&mut self, dir: impl Into<PathBuf>, f: F) -> T
    where
        F: FnOnce(&mut ResolutionContext) -> T,
    {
        let mut guard = self.push_source_dir(dir);
        f(&mut guard)
    }

    /// Run `f` with a fresh indentation monitor.
    pub fn with_indent<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ResolutionContext) -> T,
    {
        let mut guard = self.push_indent();
        f(&mut guard)
    }
}
