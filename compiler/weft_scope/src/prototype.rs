//! Path-keyed prototype lookup.
//!
//! A scope may store a scope under [`Key::Prototype`]. Every descendant of
//! that scope then inherits from the node found by replaying its own
//! relative path inside the prototype. For example, when `a` holds
//! `<proto> -> T`, the scope `a.x.y` inherits from `T.x.y`.
//!
//! Lookups here read bindings directly and never go through fallback again,
//! so a prototype walk cannot recurse into itself.

use weft_ir::Key;

use crate::resolvable::Resolvable;
use crate::scope::Scope;

/// Find the scope `scope` inherits from, if any.
///
/// Walks upward collecting labels. At each step, the parent's own
/// `<proto>` binding (if a scope) is drilled with the collected path; the
/// first complete match wins. The walk stops at the root or at the first
/// unlabeled scope.
pub fn prototype_scope(scope: &Scope) -> Option<Scope> {
    let mut rev_path: Vec<Key> = Vec::new();
    let mut node = scope.clone();
    loop {
        let label = node.label()?.clone();
        rev_path.push(label);
        let parent = node.parent()?;
        if let Some(Resolvable::Scope(root)) = parent.get_direct(&Key::Prototype) {
            if let Some(found) = drill(&root, &rev_path) {
                return Some(found);
            }
        }
        node = parent;
    }
}

/// Replay `rev_path` backwards from `root`, requiring a scope at each step.
fn drill(root: &Scope, rev_path: &[Key]) -> Option<Scope> {
    rev_path.iter().rev().try_fold(root.clone(), |scope, key| {
        scope.get_direct(key)?.into_scope()
    })
}
