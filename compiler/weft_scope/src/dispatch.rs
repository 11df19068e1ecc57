//! Directive dispatch over a parsed statement.
//!
//! Every word is looked up as a one-segment path. Among the words that
//! resolve to a directive, the highest precedence governs the statement; the
//! earliest such word wins a tie. The directive receives the words before it
//! as its prefix and the words after it as its suffix.

use smallvec::SmallVec;
use weft_ir::Entry;

use crate::context::ResolutionContext;
use crate::errors::{unsupported_entry, ResolveResult};
use crate::resolvable::{Directive, Kwargs, Precedence, Resolvable};
use crate::scope::Scope;

impl Scope {
    /// Find the governing directive of `entry` and invoke it.
    ///
    /// With no directive in the statement this fails with `UnsupportedEntry`,
    /// unless `lenient` is set, in which case the statement is ignored.
    pub fn execute(
        &self,
        ctx: &mut ResolutionContext,
        entry: &Entry,
        lenient: bool,
    ) -> ResolveResult<()> {
        let Some((directive, index)) = self.governing_directive(ctx, entry) else {
            if lenient {
                tracing::trace!(%entry, "no directive, skipped");
                return Ok(());
            }
            return Err(unsupported_entry(entry));
        };
        let prefix = entry.slice(0, index);
        let suffix = entry.slice(index + 1, entry.len());
        tracing::debug!(directive = %directive.name(), %prefix, %suffix, "dispatch");
        directive.invoke(ctx, self, &prefix, &suffix)
    }

    /// The directive that would govern `entry`, with its word index.
    pub fn governing_directive(
        &self,
        ctx: &mut ResolutionContext,
        entry: &Entry,
    ) -> Option<(Directive, usize)> {
        let kwargs = Kwargs::default();
        let mut best: Option<Precedence> = None;
        let mut candidates: SmallVec<[(Directive, usize); 2]> = SmallVec::new();
        for (index, word) in entry.iter().enumerate() {
            let Ok(Resolvable::Directive(directive)) =
                self.resolve(ctx, &[word.flatten()], &kwargs)
            else {
                continue;
            };
            let precedence = directive.precedence();
            match best {
                Some(current) if precedence < current => {}
                Some(current) if precedence == current => candidates.push((directive, index)),
                _ => {
                    best = Some(precedence);
                    candidates.clear();
                    candidates.push((directive, index));
                }
            }
        }
        candidates.into_iter().next()
    }
}
