//! Stack growth for resolution chains.
//!
//! Resolution is re-entrant. A function bound in a scope may resolve other
//! paths, which may call further functions. Scoring recurses once per path
//! segment and the contextual retry runs host code at every attempt. How
//! deep a chain goes is up to the document being resolved, not this crate,
//! so each level re-checks the remaining stack and grows it through
//! `stacker` when it runs low.
//!
//! `ResolveOptions::max_depth` bounds the chain logically; this only keeps an
//! unbounded chain from overflowing the native stack. On `wasm32` the closure
//! is called directly.

/// Remaining stack below which a new segment is allocated.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// Wraps every re-entrant step of resolution: [`Scope::resolve`] and the
/// per-segment recursion of [`Scope::score_candidates`].
///
/// [`Scope::resolve`]: crate::Scope::resolve
/// [`Scope::score_candidates`]: crate::Scope::score_candidates
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
