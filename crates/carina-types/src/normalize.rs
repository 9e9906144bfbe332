//! Deterministic type normalization helpers.
//!
//! Several algorithms (capture conversion, lub, receiver normalization)
//! produce sets of types whose source order is not meaningful: bound lists,
//! intersection members, interface lists. Everything that leaves this crate
//! is normalized through the helpers here so results do not depend on
//! declaration or iteration order.

use crate::{ClassKind, ClassType, Type, TypeEnv, WildcardBound};

/// Upgrade unresolved `Named` references to `Class` references wherever the
/// environment can resolve them, recursively.
pub fn canonicalize_named(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Named(name) => match env.lookup_class(name) {
            Some(id) => Type::class(id, vec![]),
            None => ty.clone(),
        },
        Type::Class(ClassType { def, args }) => Type::Class(ClassType {
            def: *def,
            args: args.iter().map(|a| canonicalize_named(env, a)).collect(),
        }),
        Type::Array(elem) => Type::Array(Box::new(canonicalize_named(env, elem))),
        Type::Wildcard(WildcardBound::Extends(b)) => Type::Wildcard(WildcardBound::Extends(
            Box::new(canonicalize_named(env, b)),
        )),
        Type::Wildcard(WildcardBound::Super(b)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(canonicalize_named(env, b))))
        }
        Type::Intersection(parts) => Type::Intersection(
            parts.iter().map(|p| canonicalize_named(env, p)).collect(),
        ),
        _ => ty.clone(),
    }
}

/// Ordering rank for intersection members and bound lists: the class
/// component sorts first (Java writes the class bound first), then
/// interfaces, then everything else, with errorish types last.
pub fn intersection_component_rank(env: &dyn TypeEnv, ty: &Type) -> u8 {
    match ty {
        Type::Class(ClassType { def, .. }) => match env.class(*def).map(|d| d.kind) {
            Some(ClassKind::Class) => 0,
            Some(ClassKind::Interface) => 1,
            None => 2,
        },
        Type::Array(_) => 2,
        Type::TypeVar(_) => 3,
        Type::Named(_) => 4,
        Type::Primitive(_) | Type::Wildcard(_) | Type::Intersection(_) | Type::Null | Type::Void => {
            5
        }
        Type::Unknown | Type::Error => 6,
    }
}

/// A stable, environment-independent-enough sort key. Not meant for display;
/// only for deterministic ordering of otherwise unordered type sets.
pub fn type_sort_key(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => format!("0:{}", p.name()),
        Type::Class(ClassType { def, args }) => {
            let name = env
                .class(*def)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| format!("#{}", def.0));
            if args.is_empty() {
                format!("1:{name}")
            } else {
                let keys: Vec<String> = args.iter().map(|a| type_sort_key(env, a)).collect();
                format!("1:{name}<{}>", keys.join(","))
            }
        }
        Type::Array(elem) => format!("2:{}[]", type_sort_key(env, elem)),
        Type::TypeVar(id) => {
            let name = env
                .type_param(*id)
                .map(|d| d.name.clone())
                .unwrap_or_default();
            format!("3:{name}${}", id.0)
        }
        Type::Wildcard(WildcardBound::Unbounded) => "4:?".to_string(),
        Type::Wildcard(WildcardBound::Extends(b)) => format!("4:?e{}", type_sort_key(env, b)),
        Type::Wildcard(WildcardBound::Super(b)) => format!("4:?s{}", type_sort_key(env, b)),
        Type::Intersection(parts) => {
            let keys: Vec<String> = parts.iter().map(|p| type_sort_key(env, p)).collect();
            format!("5:{}", keys.join("&"))
        }
        Type::Named(n) => format!("6:{n}"),
        Type::Null => "7:null".to_string(),
        Type::Void => "8:void".to_string(),
        Type::Unknown => "9:unknown".to_string(),
        Type::Error => "9:~error".to_string(),
    }
}

/// Normalize a list of types into an intersection: flatten nested
/// intersections, resolve names, drop duplicates and redundant supertypes,
/// and order members deterministically (class component first). A singleton
/// collapses to the member itself; an empty input becomes `Object`.
pub fn make_intersection(env: &dyn TypeEnv, parts: Vec<Type>) -> Type {
    let mut flat: Vec<Type> = Vec::new();
    let mut stack: Vec<Type> = parts;
    stack.reverse();
    while let Some(part) = stack.pop() {
        match canonicalize_named(env, &part) {
            Type::Intersection(inner) => {
                for p in inner.into_iter().rev() {
                    stack.push(p);
                }
            }
            other => flat.push(other),
        }
    }

    // Keep errorish members only when nothing real is present.
    if flat.iter().any(|t| !t.is_errorish()) {
        flat.retain(|t| !t.is_errorish());
    }

    let mut members: Vec<Type> = Vec::new();
    for part in flat {
        if !members.contains(&part) {
            members.push(part);
        }
    }

    // Drop members that are strict supertypes of another member.
    let mut kept: Vec<Type> = Vec::new();
    for (i, part) in members.iter().enumerate() {
        let redundant = members.iter().enumerate().any(|(j, other)| {
            if i == j {
                return false;
            }
            let other_below = crate::is_subtype(env, other, part);
            let part_below = crate::is_subtype(env, part, other);
            // Mutual subtyping (equivalent spellings): keep the first.
            (other_below && !part_below) || (other_below && part_below && j < i)
        });
        if !redundant {
            kept.push(part.clone());
        }
    }

    kept.sort_by_cached_key(|ty| (intersection_component_rank(env, ty), type_sort_key(env, ty)));

    match kept.len() {
        0 => Type::class(env.well_known().object, vec![]),
        1 => kept.into_iter().next().expect("len checked"),
        _ => Type::Intersection(kept),
    }
}

/// Greatest lower bound of two types: the more specific one when they are
/// related, their intersection otherwise.
pub fn glb(env: &dyn TypeEnv, a: &Type, b: &Type) -> Type {
    if a == b {
        return a.clone();
    }
    if a.is_errorish() {
        return b.clone();
    }
    if b.is_errorish() {
        return a.clone();
    }
    let a_below = crate::is_subtype(env, a, b);
    let b_below = crate::is_subtype(env, b, a);
    match (a_below, b_below) {
        (true, _) => a.clone(),
        (_, true) => b.clone(),
        _ => make_intersection(env, vec![a.clone(), b.clone()]),
    }
}

/// Split an already-normalized intersection back into a bound list.
pub(crate) fn into_bound_list(ty: Type) -> Vec<Type> {
    match ty {
        Type::Intersection(parts) => parts,
        other => vec![other],
    }
}
