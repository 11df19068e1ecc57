//! Weft Scope - symbol resolution for the weft DSL.
//!
//! This crate resolves dotted paths against a tree of nested scopes and
//! dispatches parsed statements to the directive that governs them.
//!
//! # Architecture
//!
//! - `Scope`: shared tree node with ordered bindings and a weak parent link
//! - `prototype_scope`: path-keyed inheritance across tree branches
//! - `Scope::resolve`: candidate scoring, cycle guard, contextual retry
//! - `Scope::execute`: precedence-based directive dispatch
//! - `ResolutionContext`: per-chain cycle set and context stacks
//! - `Scope::root`: process-wide root holding the built-ins
//!
//! # Re-exports
//!
//! The path and statement types of `weft_ir` are re-exported so hosts only
//! need this crate.

mod context;
mod dispatch;
pub mod errors;
mod guard;
mod prelude;
mod prototype;
mod resolvable;
mod resolve;
mod scope;
mod source;
mod stack;
mod stacks;

use std::sync::Once;

pub use weft_ir::{Entry, Key, Name, Path, Word};

pub use context::{ContextBuilder, ResolutionContext, ResolveOptions};
pub use errors::{Causes, ResolveError, ResolveResult};
pub use guard::{CycleGuard, StackGuard};
pub use prototype::prototype_scope;
pub use resolvable::{
    Directive, DirectiveFn, Function, FunctionFn, Kwargs, Literal, Precedence, Resolvable,
    Stream,
};
pub use resolve::Score;
pub use scope::{Ancestors, Scope};
pub use source::SourceReader;
pub use stack::ensure_sufficient_stack;
pub use stacks::{ContextStack, ContextStacks, Monitor, StackKind};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Hosts call this once at startup; it is safe to call again. Output is
/// enabled with `RUST_LOG`, e.g. `RUST_LOG=weft_scope=debug` for
/// materialization, retries and dispatch, or `RUST_LOG=weft_scope=trace`
/// for a span per resolved path.
///
/// Installs the global subscriber, so it panics if the host has already
/// installed a different one.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
