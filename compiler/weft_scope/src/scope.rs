//! The scope tree.
//!
//! A [`Scope`] is a cheap handle to a shared node. Nodes own their children
//! through their bindings; a child only holds a [`Weak`] link back to its
//! parent, so the tree has no reference-counted cycles.
//!
//! # Locking
//!
//! Each node's bindings sit behind their own `RwLock`. A lock is held only
//! for the duration of a single map operation: never while calling host code
//! and never while locking a second node. Operations that write after a read
//! (subscope creation, prototype materialization) re-check the key under the
//! write lock, so concurrent first reads agree on one child.

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::{FxBuildHasher, FxHashSet};
use weft_ir::{Key, Path};

use crate::errors::{
    empty_path, malformed_segment, prototype_not_a_scope, scope_inside_itself, ResolveResult,
};
use crate::prototype::prototype_scope;
use crate::resolvable::Resolvable;

/// Insertion-ordered bindings of one node.
pub(crate) type Bindings = IndexMap<Key, Resolvable, FxBuildHasher>;

pub(crate) struct ScopeNode {
    label: Option<Key>,
    parent: Option<Weak<ScopeNode>>,
    state: RwLock<ScopeState>,
}

#[derive(Default)]
struct ScopeState {
    bindings: Bindings,
    is_list: bool,
}

/// Handle to a node of the scope tree.
///
/// Cloning the handle shares the node. Equality is identity.
#[derive(Clone)]
pub struct Scope(Arc<ScopeNode>);

impl Scope {
    /// Create an unlabeled top-level scope whose parent is the root.
    pub fn new() -> Self {
        Scope::with_parent(&Scope::root(), None, false)
    }

    /// Create a scope with no parent at all.
    ///
    /// Lookups from a detached scope never reach the built-ins.
    pub fn detached() -> Self {
        Scope(Arc::new(ScopeNode {
            label: None,
            parent: None,
            state: RwLock::new(ScopeState::default()),
        }))
    }

    fn with_parent(parent: &Scope, label: Option<Key>, is_list: bool) -> Self {
        Scope(Arc::new(ScopeNode {
            label,
            parent: Some(Arc::downgrade(&parent.0)),
            state: RwLock::new(ScopeState {
                bindings: Bindings::default(),
                is_list,
            }),
        }))
    }

    /// Whether both handles point at the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The key this scope was created under, if any.
    pub fn label(&self) -> Option<&Key> {
        self.0.label.as_ref()
    }

    /// The enclosing scope, or `None` for a root or a detached node.
    pub fn parent(&self) -> Option<Scope> {
        self.0.parent.as_ref().and_then(Weak::upgrade).map(Scope)
    }

    /// This scope followed by each enclosing scope up to the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Whether this scope is the direct owner of `child`.
    fn owns(&self, child: &Scope) -> bool {
        child
            .0
            .parent
            .as_ref()
            .is_some_and(|parent| std::ptr::eq(parent.as_ptr(), Arc::as_ptr(&self.0)))
    }

    /// Labels from the outermost labeled ancestor down to this scope.
    pub fn path(&self) -> Path {
        let mut keys: Vec<Key> = self
            .ancestors()
            .map_while(|scope| scope.label().cloned())
            .collect();
        keys.reverse();
        Path::new(keys)
    }

    pub fn is_list(&self) -> bool {
        self.0.state.read().is_list
    }

    pub fn set_list(&self, is_list: bool) {
        self.0.state.write().is_list = is_list;
    }

    /// Number of local bindings, prototype entry included.
    pub fn len(&self) -> usize {
        self.0.state.read().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.state.read().bindings.is_empty()
    }

    /// Direct lookup in this node's own bindings. No inheritance.
    pub fn get_direct(&self, key: &Key) -> Option<Resolvable> {
        self.0.state.read().bindings.get(key).cloned()
    }

    /// Insert without path validation. Used to populate built-ins.
    pub(crate) fn insert_local(&self, key: Key, value: Resolvable) {
        self.0.state.write().bindings.insert(key, value);
    }

    /// Single-segment lookup: own bindings first, then the prototype.
    ///
    /// A composite found in the prototype is materialized on first read as a
    /// local copy of the template, nested `<proto>` entries included, so
    /// later writes to it never reach the prototype. Leaf values are shared
    /// with the prototype.
    pub fn get_local_or_none(&self, key: &Key) -> Option<Resolvable> {
        if let Some(value) = self.get_direct(key) {
            return Some(value);
        }
        if matches!(key, Key::Prototype) {
            return None;
        }
        let prototype = prototype_scope(self)?;
        match prototype.get_direct(key)? {
            Resolvable::Scope(template) => Some(Resolvable::Scope(self.materialize(key, &template))),
            leaf => Some(leaf),
        }
    }

    fn materialize(&self, key: &Key, template: &Scope) -> Scope {
        // Copied before locking this node; a racing reader's copy wins and
        // ours is dropped.
        let child = Scope::with_parent(self, Some(key.clone()), false);
        template.copy_bindings_into(&child);
        let mut state = self.0.state.write();
        if let Some(Resolvable::Scope(existing)) = state.bindings.get(key) {
            return existing.clone();
        }
        state
            .bindings
            .insert(key.clone(), Resolvable::Scope(child.clone()));
        drop(state);
        tracing::debug!(scope = %self.path(), %key, "materialized prototype child");
        child
    }

    /// Bind `value` at `path`, creating intermediate scopes.
    ///
    /// Overwrites any existing binding at the final segment.
    pub fn bind(&self, path: &[Key], value: impl Into<Resolvable>) -> ResolveResult<()> {
        let Some((last, init)) = path.split_last() else {
            return Err(empty_path());
        };
        if !path.iter().all(Key::is_permitted) {
            return Err(malformed_segment(path));
        }
        let value = value.into();
        if matches!(last, Key::Prototype) && value.as_scope().is_none() {
            return Err(prototype_not_a_scope(path));
        }
        let target = self.get_or_create_subscope(init)?;
        if let Some(scope) = value.as_scope() {
            if target.ancestors().any(|ancestor| ancestor.ptr_eq(scope)) {
                return Err(scope_inside_itself(path));
            }
        }
        target.insert_local(last.clone(), value);
        Ok(())
    }

    /// Walk `path`, reusing or creating a child scope at every segment.
    ///
    /// An empty path returns this scope. A leaf bound at a segment is
    /// replaced by a fresh child.
    pub fn get_or_create_subscope(&self, path: &[Key]) -> ResolveResult<Scope> {
        if !path.iter().all(Key::is_permitted) {
            return Err(malformed_segment(path));
        }
        let mut scope = self.clone();
        for key in path {
            scope = scope.subscope(key);
        }
        Ok(scope)
    }

    fn subscope(&self, key: &Key) -> Scope {
        if let Some(Resolvable::Scope(existing)) = self.get_local_or_none(key) {
            return existing;
        }
        let mut state = self.0.state.write();
        if let Some(Resolvable::Scope(existing)) = state.bindings.get(key) {
            return existing.clone();
        }
        let child = Scope::with_parent(self, Some(key.clone()), false);
        state
            .bindings
            .insert(key.clone(), Resolvable::Scope(child.clone()));
        child
    }

    /// Walk `path` from this scope, requiring a scope at every segment.
    pub fn resolved_scope_or_none(&self, path: &[Key]) -> Option<Scope> {
        path.iter().try_fold(self.clone(), |scope, key| {
            scope.get_local_or_none(key)?.into_scope()
        })
    }

    /// Local bindings followed by inherited ones that are not overridden.
    ///
    /// The prototype entry itself is never listed.
    pub fn items(&self) -> Vec<(Key, Resolvable)> {
        let mut items: Vec<(Key, Resolvable)> = self
            .0
            .state
            .read()
            .bindings
            .iter()
            .filter(|(key, _)| !matches!(key, Key::Prototype))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let Some(prototype) = prototype_scope(self) else {
            return items;
        };
        let local: FxHashSet<Key> = items.iter().map(|(key, _)| key.clone()).collect();
        let inherited: Vec<Key> = prototype
            .0
            .state
            .read()
            .bindings
            .keys()
            .filter(|key| !matches!(key, Key::Prototype) && !local.contains(*key))
            .cloned()
            .collect();
        for key in inherited {
            if let Some(value) = self.get_local_or_none(&key) {
                items.push((key, value));
            }
        }
        items
    }

    /// Keys of [`Scope::items`], in the same order.
    pub fn keys(&self) -> Vec<Key> {
        self.items().into_iter().map(|(key, _)| key).collect()
    }

    /// Structural copy of this subtree at the same position.
    ///
    /// Child scopes owned by the subtree are copied recursively; anything else
    /// (leaves, scopes referenced from elsewhere) is shared with the original.
    /// The copy is not bound anywhere.
    pub fn duplicate(&self) -> Scope {
        let copy = Scope(Arc::new(ScopeNode {
            label: self.0.label.clone(),
            parent: self.0.parent.clone(),
            state: RwLock::new(ScopeState::default()),
        }));
        self.copy_bindings_into(&copy);
        copy
    }

    /// Copy this subtree and bind the copy at `key` inside `parent`.
    pub fn duplicate_under(&self, parent: &Scope, key: Key) -> ResolveResult<Scope> {
        if !key.is_permitted() {
            return Err(malformed_segment(std::slice::from_ref(&key)));
        }
        let copy = Scope::with_parent(parent, Some(key.clone()), false);
        self.copy_bindings_into(&copy);
        parent.insert_local(key, Resolvable::Scope(copy.clone()));
        Ok(copy)
    }

    fn copy_bindings_into(&self, copy: &Scope) {
        let (source, is_list) = {
            let state = self.0.state.read();
            (state.bindings.clone(), state.is_list)
        };
        let mut bindings = Bindings::with_capacity_and_hasher(source.len(), FxBuildHasher);
        for (key, value) in source {
            let value = match value {
                Resolvable::Scope(child) if self.owns(&child) => {
                    let label = child.label().cloned();
                    let child_copy = Scope::with_parent(copy, label, false);
                    child.copy_bindings_into(&child_copy);
                    Resolvable::Scope(child_copy)
                }
                other => other,
            };
            bindings.insert(key, value);
        }
        let mut state = copy.0.state.write();
        state.bindings = bindings;
        state.is_list = is_list;
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .0
            .state
            .read()
            .bindings
            .keys()
            .map(ToString::to_string)
            .collect();
        f.debug_struct("Scope")
            .field("path", &self.path().to_string())
            .field("keys", &keys)
            .finish()
    }
}

/// Iterator over a scope and its enclosing scopes.
pub struct Ancestors {
    next: Option<Scope>,
}

impl Iterator for Ancestors {
    type Item = Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
