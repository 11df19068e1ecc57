//! Named LIFO stacks of dynamic state.
//!
//! The engine keeps a small family of stacks that track where an in-flight
//! operation currently is: the directory of the source being read, and the
//! indentation of the line being emitted. They live on the
//! [`ResolutionContext`](crate::ResolutionContext), never in globals, so two
//! resolution chains running side by side cannot observe each other's state.
//!
//! Pushes go through [`StackGuard`](crate::StackGuard) so every push is
//! popped on every exit path.

use std::fmt;
use std::path::PathBuf;

use crate::errors::{empty_stack, ResolveResult};

/// Which context stack a value lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackKind {
    /// Directory of the source currently being read.
    SourceDir,
    /// Indentation monitor of the line currently being emitted.
    Indent,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::SourceDir => f.write_str("source_dir"),
            StackKind::Indent => f.write_str("indent"),
        }
    }
}

/// A single LIFO stack tagged with its kind.
#[derive(Clone, Debug)]
pub struct ContextStack<T> {
    kind: StackKind,
    items: Vec<T>,
}

impl<T> ContextStack<T> {
    pub fn new(kind: StackKind) -> Self {
        ContextStack {
            kind,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// The most recently pushed value.
    pub fn head(&self) -> ResolveResult<&T> {
        self.items.last().ok_or_else(|| empty_stack(self.kind))
    }

    pub fn head_mut(&mut self) -> ResolveResult<&mut T> {
        let kind = self.kind;
        self.items.last_mut().ok_or_else(|| empty_stack(kind))
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.items.len()
    }
}

/// Tracks the text of the line under construction.
///
/// Feeding a fragment that contains a line break forgets everything before
/// the last break in it; fragments without a break are appended. The
/// indentation is the leading whitespace of what remains.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Monitor {
    fragments: Vec<String>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emitted fragment.
    pub fn feed(&mut self, fragment: &str) {
        if let Some(pos) = fragment.rfind('\n') {
            self.fragments.clear();
            let tail = &fragment[pos + 1..];
            if !tail.is_empty() {
                self.fragments.push(tail.to_owned());
            }
        } else if !fragment.is_empty() {
            self.fragments.push(fragment.to_owned());
        }
    }

    /// Leading whitespace of the current line.
    pub fn indent(&self) -> String {
        self.fragments
            .iter()
            .flat_map(|fragment| fragment.chars())
            .take_while(|c| c.is_whitespace())
            .collect()
    }

    /// Text accumulated since the last line break.
    pub fn line(&self) -> String {
        self.fragments.concat()
    }
}

/// All context stacks of one resolution chain.
#[derive(Clone, Debug)]
pub struct ContextStacks {
    pub source_dir: ContextStack<PathBuf>,
    pub indent: ContextStack<Monitor>,
}

impl ContextStacks {
    pub fn new() -> Self {
        ContextStacks {
            source_dir: ContextStack::new(StackKind::SourceDir),
            indent: ContextStack::new(StackKind::Indent),
        }
    }

    /// Pop the stack of the given kind.
    pub(crate) fn pop(&mut self, kind: StackKind) {
        let popped = match kind {
            StackKind::SourceDir => self.source_dir.pop().is_some(),
            StackKind::Indent => self.indent.pop().is_some(),
        };
        debug_assert!(popped, "pop of empty `{kind}` stack");
    }

    pub fn depth(&self, kind: StackKind) -> usize {
        match kind {
            StackKind::SourceDir => self.source_dir.depth(),
            StackKind::Indent => self.indent.depth(),
        }
    }
}

impl Default for ContextStacks {
    fn default() -> Self {
        Self::new()
    }
}
