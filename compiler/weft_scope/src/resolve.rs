//! Path resolution.
//!
//! Resolving a path happens in three steps:
//!
//! 1. **Scoring**: every ancestor that can see the head segment yields a
//!    candidate. For multi-segment paths the head is resolved against that
//!    ancestor and the tail is scored inside the scope it yields, so a
//!    function returning a scope can be walked into. A candidate's score is
//!    the list of ancestor distances taken at each segment.
//! 2. **Selection**: the lexicographically smallest score wins. Ties go to the
//!    candidate found first.
//! 3. **Contextual retry**: the winner is resolved against progressively less
//!    specific context scopes until one succeeds. No-such-path failures are
//!    collected; anything else aborts at once.
//!
//! The whole call runs under a cycle guard on the [`ResolutionContext`].

use smallvec::SmallVec;
use weft_ir::{Key, Path};

use crate::context::ResolutionContext;
use crate::errors::{no_such_path, unresolvable_in_context, Causes, ResolveResult};
use crate::resolvable::{Kwargs, Resolvable};
use crate::scope::Scope;
use crate::stack::ensure_sufficient_stack;

/// Ancestor distance at each segment of a path.
pub type Score = SmallVec<[usize; 4]>;

impl Scope {
    /// Resolve `path` from this scope.
    ///
    /// Fails with `Cycle` if the same path is already being resolved on this
    /// chain, `UnparseNoSuchPath` if nothing is bound at `path`, and
    /// `TreeNoSuchPath` if the best candidate could not be resolved in any
    /// context.
    #[tracing::instrument(level = "trace", skip_all, fields(path = %Path::from(path)))]
    pub fn resolve(
        &self,
        ctx: &mut ResolutionContext,
        path: &[Key],
        kwargs: &Kwargs,
    ) -> ResolveResult<Resolvable> {
        ensure_sufficient_stack(|| {
            let mut guard = ctx.enter(path)?;
            let candidate = self.best_candidate(&mut guard, path, kwargs)?;
            self.resolved_with_context(&mut guard, path, &candidate, kwargs)
        })
    }

    /// Every candidate for `path` with its score, in discovery order.
    ///
    /// Intermediate segments are resolved against the ancestor they were
    /// found in. One that fails with a no-such-path error, or yields
    /// something other than a scope, contributes no candidates; any other
    /// failure (a cycle, a host error) aborts scoring.
    pub fn score_candidates(
        &self,
        ctx: &mut ResolutionContext,
        path: &[Key],
        kwargs: &Kwargs,
    ) -> ResolveResult<Vec<(Score, Resolvable)>> {
        let Some((head, tail)) = path.split_first() else {
            return Ok(Vec::new());
        };
        let mut found = Vec::new();
        for (depth, ancestor) in self.ancestors().enumerate() {
            let Some(candidate) = ancestor.get_local_or_none(head) else {
                continue;
            };
            if tail.is_empty() {
                found.push((Score::from_slice(&[depth]), candidate));
                continue;
            }
            let inner = match candidate.resolve(ctx, &ancestor, kwargs) {
                Ok(Resolvable::Scope(inner)) => inner,
                Ok(_) => continue,
                Err(err) if err.is_no_such_path() => continue,
                Err(err) => return Err(err),
            };
            let nested = ensure_sufficient_stack(|| inner.score_candidates(ctx, tail, kwargs))?;
            for (sub_score, value) in nested {
                let mut score = Score::with_capacity(sub_score.len() + 1);
                score.push(depth);
                score.extend_from_slice(&sub_score);
                found.push((score, value));
            }
        }
        Ok(found)
    }

    fn best_candidate(
        &self,
        ctx: &mut ResolutionContext,
        path: &[Key],
        kwargs: &Kwargs,
    ) -> ResolveResult<Resolvable> {
        self.score_candidates(ctx, path, kwargs)?
            .into_iter()
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, candidate)| candidate)
            .ok_or_else(|| no_such_path(path))
    }

    /// Resolve `candidate` against each context scope in retry order.
    ///
    /// For every suffix `path[start..]`, the context paths are that suffix
    /// with its last segment dropped, then two dropped, down to the empty
    /// path. Each context path is looked up from this scope and then from
    /// each ancestor.
    fn resolved_with_context(
        &self,
        ctx: &mut ResolutionContext,
        path: &[Key],
        candidate: &Resolvable,
        kwargs: &Kwargs,
    ) -> ResolveResult<Resolvable> {
        let mut causes = Causes::default();
        for start in 0..path.len() {
            let suffix = &path[start..];
            for end in (0..suffix.len()).rev() {
                let context_path = &suffix[..end];
                for ancestor in self.ancestors() {
                    let Some(context) = ancestor.resolved_scope_or_none(context_path) else {
                        continue;
                    };
                    match candidate.resolve(ctx, &context, kwargs) {
                        Ok(value) => return Ok(value),
                        Err(err) if err.is_no_such_path() => {
                            tracing::debug!(
                                context = %context.path(),
                                error = %err,
                                "retrying in a less specific context"
                            );
                            causes.record(&err);
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }
        Err(unresolvable_in_context(path, causes))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
