//! Reading external sources into a scope.
//!
//! Loading and parsing files is the host's job. This module only chooses the
//! target scope and keeps the source directory stack accurate while the
//! host's [`SourceReader`] runs, so `__dir__` and relative nested sources
//! resolve against the file being read.

use std::path::{Path as FsPath, PathBuf};

use weft_ir::Key;

use crate::context::ResolutionContext;
use crate::errors::ResolveResult;
use crate::scope::Scope;

/// Reads a source into a target scope.
pub trait SourceReader {
    fn read(&self, ctx: &mut ResolutionContext, target: &Scope, path: &FsPath)
        -> ResolveResult<()>;
}

impl<F> SourceReader for F
where
    F: Fn(&mut ResolutionContext, &Scope, &FsPath) -> ResolveResult<()>,
{
    fn read(
        &self,
        ctx: &mut ResolutionContext,
        target: &Scope,
        path: &FsPath,
    ) -> ResolveResult<()> {
        self(ctx, target, path)
    }
}

impl Scope {
    /// Read the source at `path` into the subscope at `prefix`.
    ///
    /// A relative `path` is taken relative to the directory of the source
    /// currently being read, if there is one.
    pub fn source<R>(
        &self,
        ctx: &mut ResolutionContext,
        prefix: &[Key],
        path: impl AsRef<FsPath>,
        reader: &R,
    ) -> ResolveResult<()>
    where
        R: SourceReader + ?Sized,
    {
        let target = self.get_or_create_subscope(prefix)?;
        let path = resolve_source_path(ctx, path.as_ref());
        let dir = path.parent().map(FsPath::to_path_buf).unwrap_or_default();
        tracing::debug!(path = %path.display(), target = %target.path(), "source");
        let mut guard = ctx.push_source_dir(dir);
        reader.read(&mut guard, &target, &path)
    }
}

fn resolve_source_path(ctx: &ResolutionContext, path: &FsPath) -> PathBuf {
    if path.is_relative() {
        if let Ok(dir) = ctx.current_dir() {
            return dir.join(path);
        }
    }
    path.to_path_buf()
}
