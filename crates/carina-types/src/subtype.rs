//! Subtyping, wildcard containment, and the conversion checks built on them.

use std::collections::HashSet;

use crate::java::helpers::instantiate_supertype;
use crate::{
    canonicalize_named, erasure, format_type, is_reifiable, ClassType, Diagnostic, PrimitiveType,
    Span, Type, TypeEnv, TypeVarId, WildcardBound,
};

/// Reference subtyping: nominal hierarchy plus substitution along the walk,
/// with parameterized types invariant except through wildcard containment.
///
/// `Unknown` and `Error` are compatible with everything in both directions so
/// a failed sub-expression does not cascade into spurious errors.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let mut seen_vars = HashSet::new();
    subtype(env, sub, sup, &mut seen_vars)
}

fn subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type, seen_vars: &mut HashSet<TypeVarId>) -> bool {
    if sub == sup {
        return true;
    }
    if sub.is_errorish() || sup.is_errorish() {
        return true;
    }

    let sub = canonicalize_named(env, sub);
    let sup = canonicalize_named(env, sup);
    if sub == sup {
        return true;
    }

    match (&sub, &sup) {
        (Type::Null, t) => t.is_reference(),
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,

        // A type variable is below its upper bounds; anything is below a
        // variable with a fitting lower bound (captures of `? super`).
        (Type::TypeVar(id), _) => {
            if let Type::TypeVar(sup_id) = &sup {
                if let Some(lower) = env.type_param(*sup_id).and_then(|d| d.lower_bound.clone()) {
                    if subtype(env, &sub, &lower, seen_vars) {
                        return true;
                    }
                }
            }
            if !seen_vars.insert(*id) {
                return false;
            }
            let bounds = env
                .type_param(*id)
                .map(|d| d.upper_bounds.clone())
                .unwrap_or_default();
            let result = bounds.iter().any(|b| subtype(env, b, &sup, seen_vars));
            seen_vars.remove(id);
            result
        }
        (_, Type::TypeVar(id)) => {
            let Some(lower) = env.type_param(*id).and_then(|d| d.lower_bound.clone()) else {
                return false;
            };
            subtype(env, &sub, &lower, seen_vars)
        }

        (Type::Intersection(parts), _) => parts.iter().any(|p| subtype(env, p, &sup, seen_vars)),
        (_, Type::Intersection(parts)) => parts.iter().all(|p| subtype(env, &sub, p, seen_vars)),

        (Type::Array(sub_elem), Type::Array(sup_elem)) => match (&**sub_elem, &**sup_elem) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (a, b) if a.is_reference() && b.is_reference() => subtype(env, a, b, seen_vars),
            _ => false,
        },
        (Type::Array(_), Type::Class(ClassType { def, args })) => {
            let wk = env.well_known();
            args.is_empty() && (*def == wk.object || *def == wk.cloneable || *def == wk.serializable)
        }
        (Type::Class(_), Type::Array(_)) => false,

        // An extends-wildcard used as a type stands for its bound; this only
        // arises transiently, before capture conversion.
        (Type::Wildcard(WildcardBound::Extends(b)), _) => subtype(env, b, &sup, seen_vars),
        (Type::Wildcard(WildcardBound::Unbounded), _) => {
            let object = Type::class(env.well_known().object, vec![]);
            subtype(env, &object, &sup, seen_vars)
        }
        (Type::Wildcard(WildcardBound::Super(_)), _) => {
            let object = Type::class(env.well_known().object, vec![]);
            subtype(env, &object, &sup, seen_vars)
        }
        (_, Type::Wildcard(_)) => false,

        (Type::Class(_), Type::Class(ClassType { def: sup_def, args: sup_args })) => {
            let Some(Type::Class(ClassType { args: viewed_args, .. })) =
                instantiate_supertype(env, &sub, *sup_def)
            else {
                return false;
            };
            class_args_compatible(env, &viewed_args, sup_args, seen_vars)
        }

        _ => false,
    }
}

fn class_args_compatible(
    env: &dyn TypeEnv,
    sub_args: &[Type],
    sup_args: &[Type],
    seen_vars: &mut HashSet<TypeVarId>,
) -> bool {
    // A raw (or non-generic) supertype reference places no constraint on the
    // arguments; a raw subtype is not a subtype of a parameterized reference
    // (that conversion is unchecked, not subtyping).
    if sup_args.is_empty() {
        return true;
    }
    if sub_args.is_empty() {
        return false;
    }
    if sub_args.len() != sup_args.len() {
        return false;
    }
    sub_args
        .iter()
        .zip(sup_args.iter())
        .all(|(s, t)| contains_inner(env, t, s, seen_vars))
}

/// Wildcard containment (JLS 4.5.1): does type argument `outer` contain type
/// argument `inner`? Reflexive and transitive; `?` contains everything.
pub fn contains(env: &dyn TypeEnv, outer: &Type, inner: &Type) -> bool {
    let mut seen_vars = HashSet::new();
    contains_inner(env, outer, inner, &mut seen_vars)
}

fn contains_inner(
    env: &dyn TypeEnv,
    outer: &Type,
    inner: &Type,
    seen_vars: &mut HashSet<TypeVarId>,
) -> bool {
    if outer == inner {
        return true;
    }
    if outer.is_errorish() || inner.is_errorish() {
        return true;
    }
    let object = Type::class(env.well_known().object, vec![]);

    match outer {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(outer_bound)) => match inner {
            Type::Wildcard(WildcardBound::Extends(inner_bound)) => {
                subtype(env, inner_bound, outer_bound, seen_vars)
            }
            Type::Wildcard(WildcardBound::Unbounded) => {
                subtype(env, &object, outer_bound, seen_vars)
            }
            Type::Wildcard(WildcardBound::Super(_)) => **outer_bound == object,
            concrete => subtype(env, concrete, outer_bound, seen_vars),
        },
        Type::Wildcard(WildcardBound::Super(outer_bound)) => match inner {
            Type::Wildcard(WildcardBound::Super(inner_bound)) => {
                subtype(env, outer_bound, inner_bound, seen_vars)
            }
            Type::Wildcard(_) => false,
            concrete => subtype(env, outer_bound, concrete, seen_vars),
        },
        // Concrete arguments are invariant: only (canonical) equality counts.
        _ => canonicalize_named(env, outer) == canonicalize_named(env, inner),
    }
}

/// Assignability: subtyping plus identity/widening primitive conversion and
/// the unchecked raw escapes. Boxing is out of scope.
pub fn is_assignable(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    if is_subtype(env, from, to) {
        return true;
    }

    let from = canonicalize_named(env, from);
    let to = canonicalize_named(env, to);

    if let (Type::Primitive(a), Type::Primitive(b)) = (&from, &to) {
        return primitive_widens(*a, *b);
    }

    // Raw-to-parameterized: legal with an unchecked warning.
    if let (
        Type::Class(ClassType { def: from_def, .. }),
        Type::Class(ClassType { def: to_def, args: to_args }),
    ) = (&from, &to)
    {
        if from.is_raw(env) && !to_args.is_empty() {
            return instantiate_supertype(env, &Type::class(*from_def, vec![]), *to_def).is_some();
        }
    }

    false
}

pub(crate) fn primitive_widens(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (Byte, Short | Int | Long | Float | Double)
            | (Short, Int | Long | Float | Double)
            | (Char, Int | Long | Float | Double)
            | (Int, Long | Float | Double)
            | (Long, Float | Double)
            | (Float, Double)
    )
}

/// Assignment conversion classified for drivers: either it succeeds (maybe
/// with recoverable warnings) or it is incompatible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignmentCheck {
    Ok,
    OkWithWarnings(Vec<Diagnostic>),
    Incompatible(Diagnostic),
}

pub fn assignment_conversion(
    env: &dyn TypeEnv,
    from: &Type,
    to: &Type,
    span: Option<Span>,
) -> AssignmentCheck {
    if is_subtype(env, from, to) {
        return AssignmentCheck::Ok;
    }
    if is_assignable(env, from, to) {
        let from_c = canonicalize_named(env, from);
        if from_c.is_raw(env) {
            let message = format!(
                "Type safety: The expression of type {} needs unchecked conversion to conform to {}",
                format_type(env, from),
                format_type(env, to),
            );
            return AssignmentCheck::OkWithWarnings(vec![Diagnostic::warning(
                "unchecked", message, span,
            )]);
        }
        return AssignmentCheck::Ok;
    }
    let message = format!(
        "Type mismatch: cannot convert from {} to {}",
        format_type(env, from),
        format_type(env, to),
    );
    AssignmentCheck::Incompatible(Diagnostic::error("type-mismatch", message, span))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CastCheck {
    /// The cast is allowed; `warnings` carries unnecessary-cast and
    /// unchecked-cast findings.
    Allowed(Vec<Diagnostic>),
    Impossible(Diagnostic),
}

/// Cast conversion with the two generics-specific findings: a cast that is
/// already implied by subtyping is unnecessary, and a cast into a
/// non-reifiable parameterized type cannot be verified at runtime.
pub fn cast_conversion(
    env: &dyn TypeEnv,
    from: &Type,
    to: &Type,
    span: Option<Span>,
) -> CastCheck {
    let mut warnings = Vec::new();

    if is_subtype(env, from, to) {
        let message = format!(
            "Unnecessary cast from {} to {}",
            format_type(env, from),
            format_type(env, to),
        );
        warnings.push(Diagnostic::warning("unnecessary-cast", message, span));
        return CastCheck::Allowed(warnings);
    }

    let upcast = is_subtype(env, to, from);
    let erased_related = {
        let ef = erasure(env, from);
        let et = erasure(env, to);
        is_subtype(env, &ef, &et) || is_subtype(env, &et, &ef)
    };
    if !upcast && !erased_related {
        let message = format!(
            "Cannot cast from {} to {}",
            format_type(env, from),
            format_type(env, to),
        );
        return CastCheck::Impossible(Diagnostic::error("invalid-cast", message, span));
    }

    if !is_reifiable(env, to) {
        let message = format!(
            "Type safety: Unchecked cast from {} to {}",
            format_type(env, from),
            format_type(env, to),
        );
        warnings.push(Diagnostic::warning("unchecked", message, span));
    }
    CastCheck::Allowed(warnings)
}
