//! Weft IR - values shared between the parser and the resolver.
//!
//! The parser (not part of this workspace) turns raw text into [`Entry`]
//! statements made of [`Word`]s. The resolver consumes them by flattening
//! words into [`Key`] path segments and looking up [`Path`]s in a scope tree.
//!
//! # Design Philosophy
//!
//! - **Cheap clones**: [`Name`] is a shared `Arc<str>` handle, so keys and
//!   paths can be copied into diagnostics and cycle sets freely.
//! - **Closed segment kinds**: a path segment is a name, the `_` placeholder,
//!   or the internal prototype sentinel. Nothing else can appear in a [`Path`].

mod entry;
mod key;
mod name;

pub use entry::{Entry, Word};
pub use key::{Key, Path};
pub use name::Name;
