//! Type erasure.

use std::collections::HashSet;

use crate::{
    intersection_component_rank, type_sort_key, ClassType, MethodDef, Type, TypeEnv, TypeVarId,
    WildcardBound,
};

/// The erasure of `ty`: type variables become the erasure of their leftmost
/// bound (class component first, `Object` when unbounded), parameterized
/// types lose their arguments, arrays erase element-wise. Substituting
/// arguments into a parameterized type never changes its erasure.
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    let mut seen = HashSet::new();
    erase(env, ty, &mut seen)
}

fn erase(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
    match ty {
        Type::Class(ClassType { def, .. }) => Type::class(*def, vec![]),
        Type::Array(elem) => Type::Array(Box::new(erase(env, elem, seen))),
        Type::TypeVar(id) => erase_type_var(env, *id, seen),
        Type::Wildcard(WildcardBound::Extends(bound)) => erase(env, bound, seen),
        Type::Wildcard(_) => Type::class(env.well_known().object, vec![]),
        Type::Intersection(parts) => {
            let mut sorted: Vec<&Type> = parts.iter().collect();
            sorted.sort_by_cached_key(|t| {
                (intersection_component_rank(env, t), type_sort_key(env, t))
            });
            match sorted.first() {
                Some(first) => erase(env, first, seen),
                None => Type::class(env.well_known().object, vec![]),
            }
        }
        Type::Named(name) => match env.lookup_class(name) {
            Some(id) => Type::class(id, vec![]),
            None => ty.clone(),
        },
        _ => ty.clone(),
    }
}

fn erase_type_var(env: &dyn TypeEnv, id: TypeVarId, seen: &mut HashSet<TypeVarId>) -> Type {
    if !seen.insert(id) {
        return Type::class(env.well_known().object, vec![]);
    }
    let out = match env.type_param(id) {
        Some(def) if !def.upper_bounds.is_empty() => {
            let mut sorted: Vec<&Type> = def.upper_bounds.iter().collect();
            sorted.sort_by_cached_key(|t| {
                (intersection_component_rank(env, t), type_sort_key(env, t))
            });
            erase(env, sorted[0], seen)
        }
        _ => Type::class(env.well_known().object, vec![]),
    };
    seen.remove(&id);
    out
}

/// The erased parameter list of a method, the key used for override and
/// name-clash detection.
pub fn erased_param_types(env: &dyn TypeEnv, method: &MethodDef) -> Vec<Type> {
    method.params.iter().map(|p| erasure(env, p)).collect()
}

/// A type is reifiable when it is fully available at runtime: primitives,
/// non-generic classes, raw types, unbounded-wildcard parameterizations, and
/// arrays of reifiable types.
pub fn is_reifiable(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Primitive(_) | Type::Null | Type::Void => true,
        Type::Class(ClassType { args, .. }) => args
            .iter()
            .all(|a| matches!(a, Type::Wildcard(WildcardBound::Unbounded))),
        Type::Array(elem) => is_reifiable(env, elem),
        Type::Named(name) => env.lookup_class(name).is_some(),
        Type::TypeVar(_) | Type::Wildcard(_) | Type::Intersection(_) => false,
        Type::Unknown | Type::Error => true,
    }
}
