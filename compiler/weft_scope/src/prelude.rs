//! The root scope and its built-ins.
//!
//! The root is created on first use and shared by the whole process. Every
//! scope made with [`Scope::new`] chains to it, so built-ins are found by the
//! ordinary ancestor walk and can be shadowed like any other binding.

use std::sync::LazyLock;

use weft_ir::{Entry, Key, Path, Word};

use crate::context::ResolutionContext;
use crate::errors::{custom, empty_path, ResolveResult};
use crate::resolvable::{Directive, Kwargs, Literal, Precedence, Resolvable};
use crate::scope::Scope;
use crate::stacks::StackKind;

static ROOT: LazyLock<Scope> = LazyLock::new(build_root);

impl Scope {
    /// The process-wide root scope.
    pub fn root() -> Scope {
        ROOT.clone()
    }
}

fn build_root() -> Scope {
    let root = Scope::detached();
    let builtins = [
        ("true", Resolvable::Literal(Literal::Bool(true))),
        ("false", Resolvable::Literal(Literal::Bool(false))),
        ("null", Resolvable::Literal(Literal::Null)),
        ("__dir__", Resolvable::StackValue(StackKind::SourceDir)),
        ("__indent__", Resolvable::StackValue(StackKind::Indent)),
        (
            "=",
            Resolvable::Directive(Directive::new("=", Precedence::Assign, assign)),
        ),
        (
            "extends",
            Resolvable::Directive(Directive::new("extends", Precedence::Define, extends)),
        ),
    ];
    for (name, value) in builtins {
        root.insert_local(Key::name(name), value);
    }
    tracing::debug!(bindings = root.len(), "root scope initialized");
    root
}

/// Keys named by the words of an entry. Dotted words contribute one key per
/// segment, so `a.b` and `a b` name the same path.
fn entry_path(entry: &Entry) -> Vec<Key> {
    entry
        .iter()
        .flat_map(|word| match word {
            Word::Bare(_) => Path::parse(word.text()).into_keys(),
            Word::Quoted(_) => vec![word.flatten()],
        })
        .collect()
}

fn joined_text(entry: &Entry) -> Resolvable {
    let words: Vec<&str> = entry.iter().map(Word::text).collect();
    Resolvable::text(words.join(" "))
}

/// `target = value`
///
/// A single bare word that resolves binds what it resolves to, and a scope
/// is spread as a fresh copy. Anything else binds its text; nothing at all
/// binds `null`.
fn assign(
    ctx: &mut ResolutionContext,
    scope: &Scope,
    prefix: &Entry,
    suffix: &Entry,
) -> ResolveResult<()> {
    let target = entry_path(prefix);
    let value = match suffix.words() {
        [] => Resolvable::Literal(Literal::Null),
        [word @ Word::Bare(_)] => {
            let path = Path::parse(word.text());
            match scope.resolve(ctx, &path, &Kwargs::default()) {
                Ok(Resolvable::Scope(template)) => return spread(scope, &target, &template),
                Ok(value) => value,
                Err(err) if err.is_no_such_path() => Resolvable::text(word.text()),
                Err(err) => return Err(err),
            }
        }
        _ => joined_text(suffix),
    };
    scope.bind(&target, value)
}

fn spread(scope: &Scope, target: &[Key], template: &Scope) -> ResolveResult<()> {
    let Some((last, init)) = target.split_last() else {
        return Err(empty_path());
    };
    let parent = scope.get_or_create_subscope(init)?;
    template.duplicate_under(&parent, last.clone())?;
    Ok(())
}

/// `child extends template`
///
/// Records `template` as the prototype of `child` under the current scope's
/// `<proto>` entry.
fn extends(
    ctx: &mut ResolutionContext,
    scope: &Scope,
    prefix: &Entry,
    suffix: &Entry,
) -> ResolveResult<()> {
    let child = entry_path(prefix);
    if child.is_empty() {
        return Err(empty_path());
    }
    let template_path = entry_path(suffix);
    let template = match scope.resolve(ctx, &template_path, &Kwargs::default())? {
        Resolvable::Scope(template) => template,
        other => {
            return Err(custom(format!(
                "`{}` is a {}, only a scope can be extended",
                Path::new(template_path),
                other.kind_name()
            )))
        }
    };
    scope.get_or_create_subscope(&child)?;
    let mut proto_path = Vec::with_capacity(child.len() + 1);
    proto_path.push(Key::Prototype);
    proto_path.extend(child);
    scope.bind(&proto_path, template)
}
