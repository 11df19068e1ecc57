use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::*;
use crate::errors::{custom, no_such_path, ResolveError};
use crate::resolvable::{Function, Literal};
use crate::stacks::StackKind;

fn p(text: &str) -> Path {
    Path::parse(text)
}

fn resolve(scope: &Scope, text: &str) -> ResolveResult<Resolvable> {
    scope.resolve(&mut ResolutionContext::new(), &p(text), &Kwargs::default())
}

/// Function that resolves `target` from whatever context it is given.
fn forward(target: &'static str) -> Function {
    Function::new(target, move |ctx, context, kwargs| {
        context.resolve(ctx, &p(target), kwargs)
    })
}

#[test]
fn test_shadowing_prefers_nearest() {
    let doc = Scope::new();
    doc.bind(&p("a"), Resolvable::int(1)).unwrap();
    doc.bind(&p("child.a"), Resolvable::int(2)).unwrap();
    let child = doc.resolved_scope_or_none(&p("child")).unwrap();

    assert_eq!(resolve(&child, "a").unwrap(), Resolvable::int(2));
    assert_eq!(resolve(&doc, "a").unwrap(), Resolvable::int(1));
}

#[test]
fn test_lexical_lookup_reaches_ancestors_and_root() {
    let doc = Scope::new();
    doc.bind(&p("b"), Resolvable::text("outer")).unwrap();
    let deep = doc.get_or_create_subscope(&p("x.y.z")).unwrap();

    assert_eq!(resolve(&deep, "b").unwrap(), Resolvable::text("outer"));
    assert_eq!(
        resolve(&deep, "true").unwrap(),
        Resolvable::Literal(Literal::Bool(true))
    );
}

#[test]
fn test_shadowing_builtin() {
    let doc = Scope::new();
    doc.bind(&p("null"), Resolvable::text("not null")).unwrap();
    assert_eq!(resolve(&doc, "null").unwrap(), Resolvable::text("not null"));
    assert_eq!(
        resolve(&Scope::new(), "null").unwrap(),
        Resolvable::Literal(Literal::Null)
    );
}

#[test]
fn test_dotted_path_from_nested_scope() {
    let doc = Scope::new();
    doc.bind(&p("server.port"), Resolvable::int(80)).unwrap();
    let http = doc.get_or_create_subscope(&p("server.http")).unwrap();
    assert_eq!(resolve(&http, "server.port").unwrap(), Resolvable::int(80));
}

#[test]
fn test_scores_list_every_candidate() {
    let doc = Scope::new();
    doc.bind(&p("x.v"), Resolvable::int(1)).unwrap();
    doc.bind(&p("mid.x.v"), Resolvable::int(2)).unwrap();
    let leaf = doc.get_or_create_subscope(&p("mid.leaf")).unwrap();

    let scores: Vec<(Vec<usize>, Resolvable)> = leaf
        .score_candidates(&mut ResolutionContext::new(), &p("x.v"), &Kwargs::default())
        .unwrap()
        .into_iter()
        .map(|(score, value)| (score.to_vec(), value))
        .collect();
    assert_eq!(
        scores,
        vec![
            (vec![1, 0], Resolvable::int(2)),
            (vec![2, 0], Resolvable::int(1)),
        ]
    );
    assert_eq!(resolve(&leaf, "x.v").unwrap(), Resolvable::int(2));
}

#[test]
fn test_first_segment_depth_dominates() {
    let doc = Scope::new();
    doc.bind(&p("v"), Resolvable::int(9)).unwrap();
    doc.bind(&p("x.v"), Resolvable::int(1)).unwrap();
    doc.get_or_create_subscope(&p("mid.x")).unwrap();
    let leaf = doc.get_or_create_subscope(&p("mid.leaf")).unwrap();

    // mid.x is nearer than x, so its lexical view of `v` wins: [1, 2] < [2, 0].
    assert_eq!(resolve(&leaf, "x.v").unwrap(), Resolvable::int(9));
}

#[test]
fn test_absence() {
    let doc = Scope::new();
    doc.bind(&p("a.b"), Resolvable::int(1)).unwrap();
    for missing in ["nope", "a.c", "a.b.c"] {
        let err = resolve(&doc, missing).unwrap_err();
        assert_eq!(err, ResolveError::UnparseNoSuchPath { path: p(missing) });
    }
    let err = doc
        .resolve(&mut ResolutionContext::new(), &[], &Kwargs::default())
        .unwrap_err();
    assert!(err.is_no_such_path());
}

#[test]
fn test_function_called_with_enclosing_scope() {
    let doc = Scope::new();
    doc.bind(&p("cfg.name"), Resolvable::text("app")).unwrap();
    doc.bind(&p("cfg.greet"), forward("name")).unwrap();
    assert_eq!(resolve(&doc, "cfg.greet").unwrap(), Resolvable::text("app"));
}

#[test]
fn test_dotted_path_through_function_yielding_scope() {
    let doc = Scope::new();
    let real = doc.get_or_create_subscope(&p("real")).unwrap();
    real.bind(&p("x"), Resolvable::int(7)).unwrap();
    let cfg = {
        let real = real.clone();
        Function::new("cfg", move |_, _, _| Ok(Resolvable::Scope(real.clone())))
    };
    doc.bind(&p("cfg"), cfg).unwrap();

    assert!(resolve(&doc, "cfg").unwrap().as_scope().unwrap().ptr_eq(&real));
    assert_eq!(resolve(&doc, "cfg.x").unwrap(), Resolvable::int(7));
    assert_eq!(
        resolve(&doc, "cfg.y").unwrap_err(),
        ResolveError::UnparseNoSuchPath { path: p("cfg.y") }
    );
}

#[test]
fn test_intermediate_function_sees_its_ancestor() {
    let doc = Scope::new();
    doc.bind(&p("outer.inner.v"), Resolvable::text("found")).unwrap();
    doc.bind(&p("outer.pick"), forward("inner")).unwrap();
    let leaf = doc.get_or_create_subscope(&p("outer.leaf")).unwrap();

    // `pick` is found in `outer` and resolves `inner` from there.
    assert_eq!(resolve(&leaf, "pick.v").unwrap(), Resolvable::text("found"));
}

#[test]
fn test_intermediate_non_scope_is_skipped() {
    let doc = Scope::new();
    doc.bind(&p("a.v"), Resolvable::int(1)).unwrap();
    let inner = doc.get_or_create_subscope(&p("inner")).unwrap();
    inner.bind(&p("a"), Function::new("text", |_, _, _| Ok(Resolvable::text("leaf"))))
        .unwrap();
    inner
        .bind(&p("b"), Function::new("missing", |_, _, _| Err(no_such_path(&p("gone")))))
        .unwrap();

    // The nearer `a` yields a leaf, so the outer `a` scope supplies `v`.
    assert_eq!(resolve(&inner, "a.v").unwrap(), Resolvable::int(1));
    assert_eq!(
        resolve(&inner, "b.v").unwrap_err(),
        ResolveError::UnparseNoSuchPath { path: p("b.v") }
    );
}

#[test]
fn test_scoring_propagates_cycles_and_host_errors() {
    let doc = Scope::new();
    doc.bind(&p("loop"), forward("loop.x")).unwrap();
    doc.bind(
        &p("broken"),
        Function::new("broken", |_, _, _| Err(custom("backend down"))),
    )
    .unwrap();

    assert_eq!(
        resolve(&doc, "loop.x").unwrap_err(),
        ResolveError::Cycle { path: p("loop.x") }
    );
    assert_eq!(
        resolve(&doc, "broken.x").unwrap_err(),
        ResolveError::Custom {
            message: "backend down".to_owned()
        }
    );
}

#[test]
fn test_retry_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = {
        let seen = Arc::clone(&seen);
        Function::new("recorder", move |_, context, _| {
            let label = if context.parent().is_none() {
                "<root>".to_owned()
            } else if context.label().is_none() {
                "<doc>".to_owned()
            } else {
                context.path().to_string()
            };
            seen.lock().push(label);
            Err(no_such_path(&p("missing")))
        })
    };

    let doc = Scope::new();
    doc.bind(&p("a.b.f"), recorder).unwrap();
    doc.get_or_create_subscope(&p("b")).unwrap();

    let err = resolve(&doc, "a.b.f").unwrap_err();
    assert_eq!(
        *seen.lock(),
        vec!["a.b", "a", "<doc>", "<root>", "b", "<doc>", "<root>", "<doc>", "<root>"]
    );
    let (path, causes) = match err {
        ResolveError::TreeNoSuchPath { path, causes } => (path, causes),
        other => panic!("expected TreeNoSuchPath, got {other:?}"),
    };
    assert_eq!(path, p("a.b.f"));
    assert_eq!(causes.len(), 1);
    assert_eq!(causes.total(), 9);
    assert_eq!(
        causes.to_string(),
        "\n  - no such path `missing` (x9)"
    );
}

#[test]
fn test_retry_stops_at_first_supporting_context() {
    let doc = Scope::new();
    doc.bind(&p("a.b.lookup"), forward("marker")).unwrap();
    doc.bind(&p("a.marker"), Resolvable::text("from a")).unwrap();
    doc.bind(&p("marker"), Resolvable::text("from doc")).unwrap();

    // `a.b` has no marker of its own, but its lexical view reaches `a.marker`.
    assert_eq!(resolve(&doc, "a.b.lookup").unwrap(), Resolvable::text("from a"));
}

#[test]
fn test_host_errors_are_not_retried() {
    let calls = Arc::new(Mutex::new(0_usize));
    let failing = {
        let calls = Arc::clone(&calls);
        Function::new("failing", move |_, _, _| {
            *calls.lock() += 1;
            Err(custom("disk on fire"))
        })
    };
    let doc = Scope::new();
    doc.bind(&p("a.f"), failing).unwrap();

    let err = resolve(&doc, "a.f").unwrap_err();
    assert_eq!(
        err,
        ResolveError::Custom {
            message: "disk on fire".to_owned()
        }
    );
    assert_eq!(*calls.lock(), 1);
}

#[test]
fn test_stack_value_without_stack() {
    let doc = Scope::new();
    let err = resolve(&doc, "__dir__").unwrap_err();
    assert_eq!(
        err.to_string(),
        "`__dir__` could not be resolved in any context\n  - context stack `source_dir` is empty (x2)"
    );

    let mut ctx = ResolutionContext::builder().source_dir("/opt/site").build();
    assert_eq!(
        doc.resolve(&mut ctx, &p("__dir__"), &Kwargs::default())
            .unwrap(),
        Resolvable::text("/opt/site")
    );
    assert_eq!(ctx.stacks().depth(StackKind::SourceDir), 1);
}

#[test]
fn test_cycle_detected_and_cleared() {
    let doc = Scope::new();
    let maybe_loop = Function::new("a", |ctx, context, kwargs| {
        if kwargs.contains_key("recurse") {
            context.resolve(ctx, &p("a"), kwargs)
        } else {
            Ok(Resolvable::text("leaf"))
        }
    });
    doc.bind(&p("a"), maybe_loop).unwrap();

    let mut ctx = ResolutionContext::new();
    let mut kwargs = Kwargs::default();
    kwargs.insert("recurse".into(), Resolvable::Literal(Literal::Bool(true)));
    let err = doc.resolve(&mut ctx, &p("a"), &kwargs).unwrap_err();
    assert_eq!(err, ResolveError::Cycle { path: p("a") });
    assert_eq!(ctx.depth(), 0);

    assert_eq!(
        doc.resolve(&mut ctx, &p("a"), &Kwargs::default()).unwrap(),
        Resolvable::text("leaf")
    );
}

#[test]
fn test_mutual_cycle() {
    let doc = Scope::new();
    doc.bind(&p("a"), forward("b")).unwrap();
    doc.bind(&p("b"), forward("a")).unwrap();
    assert_eq!(
        resolve(&doc, "a").unwrap_err(),
        ResolveError::Cycle { path: p("a") }
    );
}

#[test]
fn test_same_path_in_sequence_is_not_a_cycle() {
    let doc = Scope::new();
    doc.bind(&p("x"), Resolvable::int(1)).unwrap();
    let twice = Function::new("twice", |ctx, context, kwargs| {
        let first = context.resolve(ctx, &p("x"), kwargs)?;
        let second = context.resolve(ctx, &p("x"), kwargs)?;
        Ok(Resolvable::from(Literal::Bool(first == second)))
    });
    doc.bind(&p("twice"), twice).unwrap();
    assert_eq!(
        resolve(&doc, "twice").unwrap(),
        Resolvable::Literal(Literal::Bool(true))
    );
}

#[test]
fn test_max_depth() {
    let doc = Scope::new();
    doc.bind(&p("n0"), forward("n1")).unwrap();
    doc.bind(&p("n1"), forward("n2")).unwrap();
    doc.bind(&p("n2"), forward("n3")).unwrap();
    doc.bind(&p("n3"), Resolvable::text("bottom")).unwrap();

    let mut shallow = ResolutionContext::builder().max_depth(3).build();
    assert_eq!(
        doc.resolve(&mut shallow, &p("n0"), &Kwargs::default())
            .unwrap_err(),
        ResolveError::RecursionLimit { limit: 3 }
    );

    let mut deep = ResolutionContext::builder().max_depth(4).build();
    assert_eq!(
        doc.resolve(&mut deep, &p("n0"), &Kwargs::default()).unwrap(),
        Resolvable::text("bottom")
    );
}

#[test]
fn test_prototype_inheritance_through_resolve() {
    let doc = Scope::new();
    let template = doc.get_or_create_subscope(&p("base")).unwrap();
    template.bind(&p("z.depth"), Resolvable::int(1)).unwrap();
    let c = doc.get_or_create_subscope(&p("x.y")).unwrap();
    doc.bind(&[Key::Prototype, Key::name("x"), Key::name("y")], template.clone())
        .unwrap();
    assert!(c.get_direct(&Key::name("z")).is_none());

    let z = resolve(&c, "z").unwrap().into_scope().unwrap();
    assert!(c.get_direct(&Key::name("z")).unwrap().as_scope().unwrap().ptr_eq(&z));

    z.bind(&p("depth"), Resolvable::int(2)).unwrap();
    assert_eq!(resolve(&c, "z.depth").unwrap(), Resolvable::int(2));
    assert_eq!(resolve(&doc, "base.z.depth").unwrap(), Resolvable::int(1));
}
