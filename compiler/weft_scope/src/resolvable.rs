//! Values a scope can bind a name to.
//!
//! A [`Resolvable`] is resolved *against* a context scope chosen by the
//! resolution algorithm. Most variants resolve to themselves; a
//! [`Function`] is called with the context, and a stack value reads the head
//! of a context stack. Only [`Directive`]s carry a [`Precedence`].

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use weft_ir::{Entry, Name};

use crate::context::ResolutionContext;
use crate::errors::ResolveResult;
use crate::scope::Scope;
use crate::stacks::StackKind;

/// Keyword arguments forwarded to function callbacks.
pub type Kwargs = FxHashMap<Name, Resolvable>;

/// Signature of a host function.
pub type FunctionFn =
    dyn Fn(&mut ResolutionContext, &Scope, &Kwargs) -> ResolveResult<Resolvable> + Send + Sync;

/// Signature of a host directive: `(ctx, scope, prefix, suffix)`.
pub type DirectiveFn =
    dyn Fn(&mut ResolutionContext, &Scope, &Entry, &Entry) -> ResolveResult<()> + Send + Sync;

/// Ranking used to pick the governing directive of a statement.
///
/// Higher wins. Ties go to the earliest word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Precedence {
    /// Keyword-like directives that only apply when nothing else does.
    Word = 0,
    Call = 1,
    Concat = 2,
    Spread = 3,
    /// `=`
    Assign = 4,
    /// `extends`
    Define = 5,
    Import = 6,
}

/// Scalar constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Arc<str>),
}

impl Literal {
    /// Text literal.
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Literal::Text(text.into())
    }

    /// Returns the text if this is a `Text` literal.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Text(text) => f.write_str(text),
        }
    }
}

/// A named host function.
#[derive(Clone)]
pub struct Function {
    name: Name,
    call: Arc<FunctionFn>,
}

impl Function {
    /// Wrap a callback.
    pub fn new<F>(name: &str, call: F) -> Self
    where
        F: Fn(&mut ResolutionContext, &Scope, &Kwargs) -> ResolveResult<Resolvable>
            + Send
            + Sync
            + 'static,
    {
        Function {
            name: Name::from(name),
            call: Arc::new(call),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Call the function with `context` as the scope it was found for.
    pub fn call(
        &self,
        ctx: &mut ResolutionContext,
        context: &Scope,
        kwargs: &Kwargs,
    ) -> ResolveResult<Resolvable> {
        (self.call)(ctx, context, kwargs)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// A named host directive with its precedence.
#[derive(Clone)]
pub struct Directive {
    name: Name,
    precedence: Precedence,
    call: Arc<DirectiveFn>,
}

impl Directive {
    /// Wrap a callback.
    pub fn new<F>(name: &str, precedence: Precedence, call: F) -> Self
    where
        F: Fn(&mut ResolutionContext, &Scope, &Entry, &Entry) -> ResolveResult<()>
            + Send
            + Sync
            + 'static,
    {
        Directive {
            name: Name::from(name),
            precedence,
            call: Arc::new(call),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    #[inline]
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Invoke the directive with the words around it.
    pub fn invoke(
        &self,
        ctx: &mut ResolutionContext,
        scope: &Scope,
        prefix: &Entry,
        suffix: &Entry,
    ) -> ResolveResult<()> {
        (self.call)(ctx, scope, prefix, suffix)
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directive({}, {:?})", self.name, self.precedence)
    }
}

/// Shared, immutable sequence of text lines.
#[derive(Clone, Debug)]
pub struct Stream {
    lines: Arc<[Arc<str>]>,
}

impl Stream {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Stream {
            lines: lines.into_iter().map(Into::<Arc<str>>::into).collect(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| &**line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Anything a name can be bound to.
#[derive(Clone, Debug)]
pub enum Resolvable {
    Literal(Literal),
    Function(Function),
    Directive(Directive),
    Scope(Scope),
    /// Resolves to the head of a context stack.
    StackValue(StackKind),
    Stream(Stream),
}

impl Resolvable {
    /// Text literal shorthand.
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Resolvable::Literal(Literal::text(text))
    }

    /// Integer literal shorthand.
    pub fn int(n: i64) -> Self {
        Resolvable::Literal(Literal::Int(n))
    }

    /// The composite capability: only scopes can be walked into.
    #[inline]
    pub fn as_scope(&self) -> Option<&Scope> {
        match self {
            Resolvable::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    /// Consuming variant of [`Resolvable::as_scope`].
    pub fn into_scope(self) -> Option<Scope> {
        match self {
            Resolvable::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Resolvable::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            Resolvable::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    /// Resolve against `context`.
    pub fn resolve(
        &self,
        ctx: &mut ResolutionContext,
        context: &Scope,
        kwargs: &Kwargs,
    ) -> ResolveResult<Resolvable> {
        match self {
            Resolvable::Function(function) => function.call(ctx, context, kwargs),
            Resolvable::StackValue(kind) => ctx.stack_head(*kind),
            Resolvable::Literal(_)
            | Resolvable::Directive(_)
            | Resolvable::Scope(_)
            | Resolvable::Stream(_) => Ok(self.clone()),
        }
    }

    /// Short variant name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Resolvable::Literal(_) => "literal",
            Resolvable::Function(_) => "function",
            Resolvable::Directive(_) => "directive",
            Resolvable::Scope(_) => "scope",
            Resolvable::StackValue(_) => "stack value",
            Resolvable::Stream(_) => "stream",
        }
    }
}

/// Literals compare by value; everything else by identity.
impl PartialEq for Resolvable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Resolvable::Literal(a), Resolvable::Literal(b)) => a == b,
            (Resolvable::Function(a), Resolvable::Function(b)) => Arc::ptr_eq(&a.call, &b.call),
            (Resolvable::Directive(a), Resolvable::Directive(b)) => Arc::ptr_eq(&a.call, &b.call),
            (Resolvable::Scope(a), Resolvable::Scope(b)) => a.ptr_eq(b),
            (Resolvable::StackValue(a), Resolvable::StackValue(b)) => a == b,
            (Resolvable::Stream(a), Resolvable::Stream(b)) => Arc::ptr_eq(&a.lines, &b.lines),
            _ => false,
        }
    }
}

impl From<Literal> for Resolvable {
    fn from(literal: Literal) -> Self {
        Resolvable::Literal(literal)
    }
}

impl From<Scope> for Resolvable {
    fn from(scope: Scope) -> Self {
        Resolvable::Scope(scope)
    }
}

impl From<Function> for Resolvable {
    fn from(function: Function) -> Self {
        Resolvable::Function(function)
    }
}

impl From<Directive> for Resolvable {
    fn from(directive: Directive) -> Self {
        Resolvable::Directive(directive)
    }
}

impl From<Stream> for Resolvable {
    fn from(stream: Stream) -> Self {
        Resolvable::Stream(stream)
    }
}
