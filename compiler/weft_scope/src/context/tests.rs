use super::*;
use crate::errors::ResolveError;
use pretty_assertions::assert_eq;

#[test]
fn test_enter_twice_is_cycle() {
    let mut ctx = ResolutionContext::new();
    let path = Path::parse("a.b");
    let mut guard = ctx.enter(&path).unwrap();
    let err = guard.enter(&path).err().unwrap();
    assert_eq!(err, ResolveError::Cycle { path: path.clone() });
    assert!(!err.is_no_such_path());
}

#[test]
fn test_failed_enter_records_nothing() {
    let mut ctx = ResolutionContext::new();
    let path = Path::parse("a");
    let mut guard = ctx.enter(&path).unwrap();
    assert!(guard.enter(&path).is_err());
    assert_eq!(guard.depth(), 1);
}

#[test]
fn test_max_depth() {
    let mut ctx = ResolutionContext::builder().max_depth(2).build();
    assert_eq!(ctx.options().max_depth, Some(2));
    let mut first = ctx.enter(&Path::parse("a")).unwrap();
    let mut second = first.enter(&Path::parse("b")).unwrap();
    let err = second.enter(&Path::parse("c")).err().unwrap();
    assert_eq!(err, ResolveError::RecursionLimit { limit: 2 });
}

#[test]
fn test_default_options_unbounded() {
    let ctx = ResolutionContext::default();
    assert_eq!(ctx.options(), &ResolveOptions::default());
    assert_eq!(ctx.options().max_depth, None);
}

#[test]
fn test_builder_seeds_stacks() {
    let ctx = ResolutionContext::builder()
        .source_dir("/srv")
        .with_indent()
        .build();
    assert_eq!(ctx.current_dir().unwrap(), FsPath::new("/srv"));
    assert_eq!(ctx.current_indent().unwrap(), "");
}

#[test]
fn test_builder_options_replace() {
    let ctx = ResolutionContext::builder()
        .max_depth(4)
        .options(ResolveOptions { max_depth: None })
        .build();
    assert_eq!(ctx.options().max_depth, None);
}

#[test]
fn test_stack_head_source_dir() {
    let mut ctx = ResolutionContext::new();
    let err = ctx.stack_head(StackKind::SourceDir).unwrap_err();
    assert_eq!(
        err,
        ResolveError::EmptyStack {
            stack: StackKind::SourceDir
        }
    );

    let guard = ctx.push_source_dir("/etc/app");
    assert_eq!(
        guard.stack_head(StackKind::SourceDir).unwrap(),
        Resolvable::text("/etc/app")
    );
}

#[test]
fn test_stack_head_indent() {
    let mut ctx = ResolutionContext::new();
    let mut guard = ctx.push_indent();
    guard.feed_indent("list:\n  - ").unwrap();
    assert_eq!(
        guard.stack_head(StackKind::Indent).unwrap(),
        Resolvable::text("  ")
    );
}

#[test]
fn test_feed_indent_without_monitor() {
    let mut ctx = ResolutionContext::new();
    assert!(ctx.feed_indent("x").unwrap_err().is_no_such_path());
}

#[test]
fn test_nested_indent_monitors_are_independent() {
    let mut ctx = ResolutionContext::new();
    let mut outer = ctx.push_indent();
    outer.feed_indent("\n    ").unwrap();
    {
        let mut inner = outer.push_indent();
        inner.feed_indent("\n  ").unwrap();
        assert_eq!(inner.current_indent().unwrap(), "  ");
    }
    assert_eq!(outer.current_indent().unwrap(), "    ");
}
