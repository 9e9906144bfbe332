//! Capture-aware substitution of type-variable bindings.

use std::collections::{HashMap, HashSet};

use crate::{glb, make_intersection, ClassType, Type, TypeEnv, TypeVarId, WildcardBound};

/// Apply `bindings` throughout `ty`.
///
/// A variable bound to a *wildcard* does not simply disappear into a bare
/// wildcard: the result is a derived wildcard that remembers the variable's
/// declared bound. Substituting an unbounded `?` for `T extends Foo` yields
/// `? extends Foo`; substituting `? extends A` yields `? extends glb(A, Foo)`.
/// F-bounded variables are expanded at most once per substitution so the
/// derived bound stays finite.
pub fn substitute(env: &dyn TypeEnv, ty: &Type, bindings: &HashMap<TypeVarId, Type>) -> Type {
    let mut expanding = HashSet::new();
    subst(env, ty, bindings, &mut expanding)
}

fn subst(
    env: &dyn TypeEnv,
    ty: &Type,
    bindings: &HashMap<TypeVarId, Type>,
    expanding: &mut HashSet<TypeVarId>,
) -> Type {
    match ty {
        Type::TypeVar(id) => match bindings.get(id) {
            None => ty.clone(),
            Some(Type::Wildcard(wb)) => derived_wildcard(env, *id, wb, bindings, expanding),
            Some(replacement) => replacement.clone(),
        },
        Type::Class(ClassType { def, args }) => Type::Class(ClassType {
            def: *def,
            args: args
                .iter()
                .map(|a| subst(env, a, bindings, expanding))
                .collect(),
        }),
        Type::Array(elem) => Type::Array(Box::new(subst(env, elem, bindings, expanding))),
        Type::Wildcard(WildcardBound::Extends(bound)) => Type::Wildcard(WildcardBound::Extends(
            Box::new(subst(env, bound, bindings, expanding)),
        )),
        Type::Wildcard(WildcardBound::Super(bound)) => Type::Wildcard(WildcardBound::Super(
            Box::new(subst(env, bound, bindings, expanding)),
        )),
        Type::Intersection(parts) => Type::Intersection(
            parts
                .iter()
                .map(|p| subst(env, p, bindings, expanding))
                .collect(),
        ),
        _ => ty.clone(),
    }
}

fn derived_wildcard(
    env: &dyn TypeEnv,
    var: TypeVarId,
    wildcard: &WildcardBound,
    bindings: &HashMap<TypeVarId, Type>,
    expanding: &mut HashSet<TypeVarId>,
) -> Type {
    // Re-entry through an F-bound: stop deriving and pass the wildcard
    // through unchanged.
    if !expanding.insert(var) {
        return Type::Wildcard(wildcard.clone());
    }

    let declared = declared_bound(env, var, bindings, expanding);
    let object = Type::class(env.well_known().object, vec![]);

    let out = match wildcard {
        WildcardBound::Unbounded => {
            if declared == object {
                Type::Wildcard(WildcardBound::Unbounded)
            } else {
                Type::Wildcard(WildcardBound::Extends(Box::new(declared)))
            }
        }
        WildcardBound::Extends(upper) => {
            let upper = subst(env, upper, bindings, expanding);
            Type::Wildcard(WildcardBound::Extends(Box::new(glb(env, &upper, &declared))))
        }
        WildcardBound::Super(lower) => {
            let lower = subst(env, lower, bindings, expanding);
            Type::Wildcard(WildcardBound::Super(Box::new(lower)))
        }
    };

    expanding.remove(&var);
    out
}

fn declared_bound(
    env: &dyn TypeEnv,
    var: TypeVarId,
    bindings: &HashMap<TypeVarId, Type>,
    expanding: &mut HashSet<TypeVarId>,
) -> Type {
    let Some(def) = env.type_param(var) else {
        return Type::class(env.well_known().object, vec![]);
    };
    let bounds: Vec<Type> = def
        .upper_bounds
        .iter()
        .map(|b| subst(env, b, bindings, expanding))
        .collect();
    make_intersection(env, bounds)
}

/// Whether `ty` mentions any of `vars` (used by inference to decide when a
/// default still contains unsolved variables).
pub(crate) fn mentions_any_var(ty: &Type, vars: &HashSet<TypeVarId>) -> bool {
    match ty {
        Type::TypeVar(id) => vars.contains(id),
        Type::Class(ClassType { args, .. }) => args.iter().any(|a| mentions_any_var(a, vars)),
        Type::Array(elem) => mentions_any_var(elem, vars),
        Type::Wildcard(WildcardBound::Extends(b)) | Type::Wildcard(WildcardBound::Super(b)) => {
            mentions_any_var(b, vars)
        }
        Type::Intersection(parts) => parts.iter().any(|p| mentions_any_var(p, vars)),
        _ => false,
    }
}
