//! Least upper bound computation for conditional expressions and inference.

use std::collections::HashSet;

use crate::java::helpers::{instantiate_supertype, is_decl_subtype, supertype_closure};
use crate::subtype::primitive_widens;
use crate::{
    canonicalize_named, glb, make_intersection, type_sort_key, ClassId, ClassType, PrimitiveType,
    Type, TypeEnv, WildcardBound,
};

/// The most specific common supertype(s) of `types`.
///
/// `null` participates as bottom and never forces a choice. Where more than
/// one maximal common supertype survives with incompatible arguments the
/// result is an intersection (e.g. `Number & Comparable<?>`). Nested
/// argument positions use the least-containing-invocation rules; the
/// recursion over infinitely expanding F-bounded positions is fused to an
/// unbounded wildcard.
pub fn lub(env: &dyn TypeEnv, types: &[Type]) -> Type {
    let mut in_flight = HashSet::new();
    lub_inner(env, types, &mut in_flight)
}

fn lub_inner(env: &dyn TypeEnv, types: &[Type], in_flight: &mut HashSet<String>) -> Type {
    let mut ts: Vec<Type> = Vec::new();
    for ty in types {
        if *ty == Type::Null || ty.is_errorish() {
            continue;
        }
        let c = canonicalize_named(env, ty);
        if !ts.contains(&c) {
            ts.push(c);
        }
    }

    match ts.len() {
        0 => {
            return if types.iter().any(|t| *t == Type::Null) {
                Type::Null
            } else {
                Type::Unknown
            }
        }
        1 => return ts.into_iter().next().expect("len checked"),
        _ => {}
    }

    if ts.iter().any(|t| matches!(t, Type::Primitive(_))) {
        if ts.iter().all(|t| matches!(t, Type::Primitive(_))) {
            return primitive_lub(&ts);
        }
        return Type::class(env.well_known().object, vec![]);
    }

    // Guard against infinitely expanding argument positions
    // (`Comparable<? extends Comparable<...>>`).
    let mut keys: Vec<String> = ts.iter().map(|t| type_sort_key(env, t)).collect();
    keys.sort();
    let key = keys.join("|");
    if !in_flight.insert(key.clone()) {
        return Type::class(env.well_known().object, vec![]);
    }

    let out = lub_reference(env, &ts, in_flight);
    in_flight.remove(&key);
    out
}

fn lub_reference(env: &dyn TypeEnv, ts: &[Type], in_flight: &mut HashSet<String>) -> Type {
    if ts.iter().all(|t| matches!(t, Type::Array(_))) {
        let elems: Vec<Type> = ts
            .iter()
            .map(|t| match t {
                Type::Array(e) => (**e).clone(),
                _ => Type::Unknown,
            })
            .collect();
        if elems.iter().all(|e| e.is_reference()) {
            return Type::Array(Box::new(lub_inner(env, &elems, in_flight)));
        }
        let wk = env.well_known();
        return make_intersection(
            env,
            vec![
                Type::class(wk.cloneable, vec![]),
                Type::class(wk.serializable, vec![]),
            ],
        );
    }

    // Erased candidate set: declarations every input can be viewed as.
    let mut common: Vec<ClassId> = erased_supertype_decls(env, &ts[0]);
    for ty in &ts[1..] {
        let decls = erased_supertype_decls(env, ty);
        common.retain(|c| decls.contains(c));
    }
    if common.is_empty() {
        return Type::class(env.well_known().object, vec![]);
    }

    // Minimal candidates: drop anything another candidate is strictly below.
    let minimal: Vec<ClassId> = common
        .iter()
        .copied()
        .filter(|c| {
            !common
                .iter()
                .any(|d| d != c && is_decl_subtype(env, *d, *c) && !is_decl_subtype(env, *c, *d))
        })
        .collect();

    let mut results: Vec<Type> = minimal
        .iter()
        .map(|c| least_containing_invocation(env, *c, &ts, in_flight))
        .collect();
    results.sort_by_cached_key(|t| type_sort_key(env, t));
    results.dedup();

    make_intersection(env, results)
}

fn erased_supertype_decls(env: &dyn TypeEnv, ty: &Type) -> Vec<ClassId> {
    let mut out = Vec::new();
    for sup in supertype_closure(env, ty) {
        if let Type::Class(ClassType { def, .. }) = sup {
            if !out.contains(&def) {
                out.push(def);
            }
        }
    }
    out
}

/// Fold the relevant parameterized views of `decl` across all inputs into
/// one invocation that contains each of them.
fn least_containing_invocation(
    env: &dyn TypeEnv,
    decl: ClassId,
    ts: &[Type],
    in_flight: &mut HashSet<String>,
) -> Type {
    let arity = env
        .class(decl)
        .map(|d| d.type_params.len())
        .unwrap_or_default();
    if arity == 0 {
        return Type::class(decl, vec![]);
    }

    let mut views: Vec<Vec<Type>> = Vec::with_capacity(ts.len());
    for ty in ts {
        match instantiate_supertype(env, ty, decl) {
            Some(Type::Class(ClassType { args, .. })) if args.len() == arity => views.push(args),
            // Raw or unrecoverable view: the whole invocation degrades to raw.
            _ => return Type::class(decl, vec![]),
        }
    }

    let mut acc = views[0].clone();
    for view in &views[1..] {
        acc = acc
            .iter()
            .zip(view.iter())
            .map(|(a, b)| least_containing_argument(env, a, b, in_flight))
            .collect();
    }
    Type::class(decl, acc)
}

fn least_containing_argument(
    env: &dyn TypeEnv,
    a: &Type,
    b: &Type,
    in_flight: &mut HashSet<String>,
) -> Type {
    use WildcardBound::{Extends, Super, Unbounded};

    if a == b {
        return a.clone();
    }

    let out = match (a, b) {
        (Type::Wildcard(Unbounded), _) | (_, Type::Wildcard(Unbounded)) => {
            Type::Wildcard(Unbounded)
        }
        (Type::Wildcard(Extends(x)), Type::Wildcard(Extends(y))) => Type::Wildcard(Extends(
            Box::new(lub_inner(env, &[(**x).clone(), (**y).clone()], in_flight)),
        )),
        (Type::Wildcard(Super(x)), Type::Wildcard(Super(y))) => {
            Type::Wildcard(Super(Box::new(glb(env, x, y))))
        }
        (Type::Wildcard(Extends(x)), Type::Wildcard(Super(y)))
        | (Type::Wildcard(Super(y)), Type::Wildcard(Extends(x))) => {
            if x == y {
                (**x).clone()
            } else {
                Type::Wildcard(Unbounded)
            }
        }
        (Type::Wildcard(Extends(x)), concrete) | (concrete, Type::Wildcard(Extends(x))) => {
            Type::Wildcard(Extends(Box::new(lub_inner(
                env,
                &[(**x).clone(), concrete.clone()],
                in_flight,
            ))))
        }
        (Type::Wildcard(Super(x)), concrete) | (concrete, Type::Wildcard(Super(x))) => {
            Type::Wildcard(Super(Box::new(glb(env, x, concrete))))
        }
        (c1, c2) => Type::Wildcard(Extends(Box::new(lub_inner(
            env,
            &[c1.clone(), c2.clone()],
            in_flight,
        )))),
    };

    // `? extends Object` is just `?`.
    match out {
        Type::Wildcard(Extends(b)) if *b == Type::class(env.well_known().object, vec![]) => {
            Type::Wildcard(Unbounded)
        }
        other => other,
    }
}

fn primitive_lub(ts: &[Type]) -> Type {
    use PrimitiveType::*;
    for target in [Boolean, Byte, Short, Char, Int, Long, Float, Double] {
        let all_widen = ts.iter().all(|t| match t {
            Type::Primitive(p) => primitive_widens(*p, target),
            _ => false,
        });
        if all_widen {
            return Type::Primitive(target);
        }
    }
    Type::Unknown
}
