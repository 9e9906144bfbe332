use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    canonicalize_named, substitute, type_sort_key, ClassId, ClassKind, ClassType, Type, TypeEnv,
    TypeVarId, WildcardBound,
};

/// Return `ty` viewed as `target` by walking the supertype graph and applying
/// type argument substitution along the way.
///
/// Missing class metadata returns `None` rather than panicking. When a type
/// variable or intersection can be viewed as `target` through more than one
/// component with *conflicting* instantiations, the view is ambiguous and the
/// result is `None`, deterministically (components are visited in sorted
/// order).
///
/// Example: `ArrayList<String>` viewed as `List` returns `List<String>`.
pub fn instantiate_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    let mut seen_type_vars = HashSet::new();
    instantiate_inner(env, ty, target, &mut seen_type_vars)
}

fn instantiate_inner(
    env: &dyn TypeEnv,
    ty: &Type,
    target: ClassId,
    seen_type_vars: &mut HashSet<TypeVarId>,
) -> Option<Type> {
    match ty {
        Type::Array(_) => {
            let wk = env.well_known();
            if target == wk.object || target == wk.cloneable || target == wk.serializable {
                return Some(Type::class(target, vec![]));
            }
            return None;
        }
        Type::Intersection(parts) => {
            let mut sorted: Vec<&Type> = parts.iter().collect();
            sorted.sort_by_cached_key(|t| {
                (
                    crate::intersection_component_rank(env, t),
                    type_sort_key(env, t),
                )
            });

            let mut out: Option<Type> = None;
            for part in sorted {
                let Some(found) = instantiate_inner(env, part, target, seen_type_vars) else {
                    continue;
                };
                out = match out {
                    None => Some(found),
                    Some(existing) => Some(merge_views(env, existing, found)?),
                };
            }
            return out;
        }
        Type::TypeVar(id) => {
            if !seen_type_vars.insert(*id) {
                return None;
            }

            let mut out: Option<Type> = None;
            if let Some(def) = env.type_param(*id) {
                let mut sorted: Vec<&Type> = def.upper_bounds.iter().collect();
                sorted.sort_by_cached_key(|t| {
                    (
                        crate::intersection_component_rank(env, t),
                        type_sort_key(env, t),
                    )
                });

                for bound in sorted {
                    let Some(found) = instantiate_inner(env, bound, target, seen_type_vars) else {
                        continue;
                    };
                    out = match out {
                        None => Some(found),
                        Some(existing) => match merge_views(env, existing, found) {
                            Some(merged) => Some(merged),
                            None => {
                                seen_type_vars.remove(id);
                                return None;
                            }
                        },
                    };
                }
            }

            seen_type_vars.remove(id);
            return out;
        }
        _ => {}
    }

    let ty = canonicalize_named(env, ty);
    let Type::Class(ClassType { def, args }) = ty else {
        return None;
    };

    for current in class_supertype_walk(env, def, args) {
        let Type::Class(ClassType { def, .. }) = &current else {
            continue;
        };
        if *def == target {
            return Some(current);
        }
    }
    None
}

fn merge_views(env: &dyn TypeEnv, a: Type, b: Type) -> Option<Type> {
    if a == b {
        return Some(a);
    }

    let a_score = placeholder_score(&a);
    let b_score = placeholder_score(&b);
    if a_score != b_score {
        return Some(if a_score < b_score { a } else { b });
    }

    let a_below = crate::is_subtype(env, &a, &b);
    let b_below = crate::is_subtype(env, &b, &a);
    match (a_below, b_below) {
        (true, false) => Some(a),
        (false, true) => Some(b),
        (true, true) => Some(a),
        (false, false) => None,
    }
}

fn placeholder_score(ty: &Type) -> usize {
    match ty {
        Type::Unknown | Type::Error => 1,
        Type::Array(elem) => placeholder_score(elem),
        Type::Class(ClassType { args, .. }) => args.iter().map(placeholder_score).sum(),
        Type::Wildcard(WildcardBound::Extends(b)) | Type::Wildcard(WildcardBound::Super(b)) => {
            placeholder_score(b)
        }
        Type::Intersection(parts) => parts.iter().map(placeholder_score).sum(),
        _ => 0,
    }
}

/// BFS over the supertype graph of one class instantiation, yielding every
/// visited instantiation (the start included) exactly once, in a
/// deterministic order.
///
/// Raw instantiations stay raw along the walk: type arguments of supertypes
/// cannot be recovered from a raw subtype reference.
pub(crate) fn class_supertype_walk(env: &dyn TypeEnv, def: ClassId, args: Vec<Type>) -> Vec<Type> {
    let mut out: Vec<Type> = Vec::new();
    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
    queue.push_back(Type::class(def, args));

    while let Some(current) = queue.pop_front() {
        let Type::Class(ClassType { def, args }) = current.clone() else {
            continue;
        };
        if !seen.insert((def, args.clone())) {
            continue;
        }
        out.push(current);

        let Some(class_def) = env.class(def) else {
            continue;
        };

        let raw = args.is_empty() && !class_def.type_params.is_empty();

        if raw {
            if let Some(sc) = &class_def.super_class {
                if let Some(raw_sc) = raw_class_of(env, sc) {
                    queue.push_back(raw_sc);
                }
            }
            let mut ifaces: Vec<Type> = class_def
                .interfaces
                .iter()
                .filter_map(|iface| raw_class_of(env, iface))
                .collect();
            ifaces.sort_by_cached_key(|t| type_sort_key(env, t));
            for iface in ifaces {
                queue.push_back(iface);
            }
            if class_def.kind == ClassKind::Interface {
                queue.push_back(Type::class(env.well_known().object, vec![]));
            }
            continue;
        }

        let mut subst: HashMap<TypeVarId, Type> =
            HashMap::with_capacity(class_def.type_params.len());
        for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
            subst.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
        }

        if let Some(sc) = &class_def.super_class {
            let sc = canonicalize_named(env, &substitute(env, sc, &subst));
            if matches!(sc, Type::Class(_)) {
                queue.push_back(sc);
            }
        }
        let mut ifaces: Vec<Type> = class_def
            .interfaces
            .iter()
            .map(|iface| canonicalize_named(env, &substitute(env, iface, &subst)))
            .filter(|iface| matches!(iface, Type::Class(_)))
            .collect();
        ifaces.sort_by_cached_key(|t| type_sort_key(env, t));
        for iface in ifaces {
            queue.push_back(iface);
        }

        // Every interface implicitly has Object as a supertype (JLS 4.10.2).
        if class_def.kind == ClassKind::Interface {
            queue.push_back(Type::class(env.well_known().object, vec![]));
        }
    }

    out
}

/// Every class-type instantiation `ty` can be viewed as, including itself
/// where applicable. Type variables contribute the closures of their bounds;
/// intersections the union of their parts.
pub(crate) fn supertype_closure(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let mut seen_vars = HashSet::new();
    let mut out = Vec::new();
    closure_into(env, ty, &mut seen_vars, &mut out);
    out
}

fn closure_into(
    env: &dyn TypeEnv,
    ty: &Type,
    seen_vars: &mut HashSet<TypeVarId>,
    out: &mut Vec<Type>,
) {
    match canonicalize_named(env, ty) {
        Type::Class(ClassType { def, args }) => {
            for t in class_supertype_walk(env, def, args) {
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
        Type::TypeVar(id) => {
            if !seen_vars.insert(id) {
                return;
            }
            if let Some(def) = env.type_param(id) {
                let mut sorted: Vec<Type> = def.upper_bounds.clone();
                sorted.sort_by_cached_key(|t| {
                    (
                        crate::intersection_component_rank(env, t),
                        type_sort_key(env, t),
                    )
                });
                for bound in &sorted {
                    closure_into(env, bound, seen_vars, out);
                }
            }
            seen_vars.remove(&id);
        }
        Type::Intersection(parts) => {
            for part in &parts {
                closure_into(env, part, seen_vars, out);
            }
        }
        Type::Array(_) => {
            let wk = env.well_known();
            for id in [wk.cloneable, wk.serializable, wk.object] {
                let t = Type::class(id, vec![]);
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
        _ => {}
    }
}

fn raw_class_of(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match canonicalize_named(env, ty) {
        Type::Class(ClassType { def, .. }) => Some(Type::class(def, vec![])),
        _ => None,
    }
}

/// The type of `receiver.getClass()`: `Class<? extends |receiver|>` where
/// `|receiver|` is the erasure of the receiver (JLS 4.3.2).
pub fn get_class_type(env: &dyn TypeEnv, receiver: &Type) -> Type {
    let erased = crate::erasure(env, receiver);
    let bound = if erased.is_reference() {
        erased
    } else {
        Type::class(env.well_known().object, vec![])
    };
    Type::class(
        env.well_known().runtime_class,
        vec![Type::Wildcard(WildcardBound::Extends(Box::new(bound)))],
    )
}

/// Raw-declaration subtyping: is `a`'s declaration below `b`'s in the
/// nominal hierarchy, ignoring type arguments entirely.
pub(crate) fn is_decl_subtype(env: &dyn TypeEnv, a: ClassId, b: ClassId) -> bool {
    if a == b {
        return true;
    }
    class_supertype_walk(env, a, vec![])
        .iter()
        .any(|t| matches!(t, Type::Class(ClassType { def, .. }) if *def == b))
}
