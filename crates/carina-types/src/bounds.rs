//! Bound checking: declaration sites, instantiation sites, and the
//! statement-level guards where generics interact with other language
//! features.
//!
//! All checks are pure validation: they return diagnostics by value and
//! never mutate the environment, so re-checking an accepted application is
//! free of side effects and yields no diagnostics (idempotence).

use std::collections::HashMap;

use crate::java::format::{
    format_type, format_type_args, format_type_param, generic_decl_name, simple_name,
};
use crate::java::helpers::supertype_closure;
use crate::{
    erasure, is_reifiable, is_subtype, substitute, ClassId, ClassKind, ClassType, Diagnostic,
    Span, TyContext, Type, TypeEnv, TypeVarId, WildcardBound,
};

/// Validate one parameterized reference `decl<args>`.
///
/// Every argument is checked against the corresponding parameter's bounds
/// *after* substituting all arguments simultaneously (bounds may reference
/// sibling parameters). Wildcard arguments participate through their capture
/// bounds.
pub fn check_type_application(
    env: &dyn TypeEnv,
    decl: ClassId,
    args: &[Type],
    span: Option<Span>,
) -> Vec<Diagnostic> {
    let Some(def) = env.class(decl) else {
        return vec![];
    };
    if args.is_empty() {
        // Raw reference or non-generic type: nothing to bound-check here.
        return vec![];
    }
    if def.type_params.is_empty() {
        let message = format!(
            "The type {} is not generic; it cannot be parameterized with arguments <{}>",
            simple_name(&def.name),
            format_type_args(env, args),
        );
        return vec![Diagnostic::error("not-generic", message, span)];
    }
    if def.type_params.len() != args.len() {
        let message = format!(
            "Incorrect number of arguments for type {}; it cannot be parameterized with arguments <{}>",
            generic_decl_name(env, decl),
            format_type_args(env, args),
        );
        return vec![Diagnostic::error("type-arity", message, span)];
    }

    let formals = def.type_params.clone();
    let decl_name = generic_decl_name(env, decl);

    let mut ctx = TyContext::new(env);
    let captured = ctx.capture_conversion(&Type::class(decl, args.to_vec()));
    let Type::Class(ClassType { args: captured_args, .. }) = captured else {
        return vec![];
    };
    let cenv: &dyn TypeEnv = &ctx;

    let map: HashMap<TypeVarId, Type> = formals
        .iter()
        .copied()
        .zip(captured_args.iter().cloned())
        .collect();

    let mut diagnostics = Vec::new();
    for (idx, formal) in formals.iter().enumerate() {
        let bounds = cenv
            .type_param(*formal)
            .map(|d| d.upper_bounds.clone())
            .unwrap_or_default();
        for bound in &bounds {
            let substituted = substitute(cenv, bound, &map);
            let ok = match &args[idx] {
                Type::Wildcard(WildcardBound::Unbounded) => true,
                Type::Wildcard(WildcardBound::Extends(wb)) => {
                    extends_wildcard_satisfies(cenv, wb, &substituted)
                }
                Type::Wildcard(WildcardBound::Super(lb)) => is_subtype(cenv, lb, &substituted),
                concrete => is_subtype(cenv, concrete, &substituted),
            };
            if !ok {
                let message = format!(
                    "Bound mismatch: The type {} is not a valid substitute for the bounded parameter <{}> of the type {}",
                    format_type(cenv, &args[idx]),
                    format_type_param(cenv, *formal),
                    decl_name,
                );
                diagnostics.push(Diagnostic::error("bound-mismatch", message, span));
                break;
            }
        }
    }
    diagnostics
}

/// An extends-wildcard argument satisfies a bound unless its explicit bound
/// and the substituted parameter bound are provably disjoint: related types
/// always satisfy, and unrelated types still satisfy when either side is an
/// interface (a subtype implementing both can exist).
fn extends_wildcard_satisfies(env: &dyn TypeEnv, wildcard_bound: &Type, bound: &Type) -> bool {
    if wildcard_bound.is_errorish() || bound.is_errorish() {
        return true;
    }
    if is_subtype(env, wildcard_bound, bound) || is_subtype(env, bound, wildcard_bound) {
        return true;
    }
    !(is_class_kind(env, wildcard_bound) && is_class_kind(env, bound))
}

fn is_class_kind(env: &dyn TypeEnv, ty: &Type) -> bool {
    match erasure(env, ty) {
        Type::Class(ClassType { def, .. }) => env
            .class(def)
            .map(|d| d.kind == ClassKind::Class)
            .unwrap_or(false),
        Type::Array(_) => true,
        _ => false,
    }
}

/// Validate a type parameter list at its declaration: duplicate names,
/// self/forward references in top-level bounds, and bound intersections
/// repeating an interface with conflicting arguments.
pub fn check_type_param_declarations(
    env: &dyn TypeEnv,
    params: &[TypeVarId],
    span: Option<Span>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let names: Vec<String> = params
        .iter()
        .map(|p| {
            env.type_param(*p)
                .map(|d| d.name.clone())
                .unwrap_or_default()
        })
        .collect();

    for (idx, name) in names.iter().enumerate() {
        if names[..idx].contains(name) {
            let message = format!("Duplicate type parameter {}", name);
            diagnostics.push(Diagnostic::error("duplicate-type-parameter", message, span));
        }
    }

    for (idx, param) in params.iter().enumerate() {
        let Some(def) = env.type_param(*param) else {
            continue;
        };

        for bound in &def.upper_bounds {
            let Type::TypeVar(referenced) = bound else {
                continue;
            };
            if referenced == param {
                let message = format!(
                    "The type parameter {} cannot be bounded by itself",
                    def.name
                );
                diagnostics.push(Diagnostic::error("type-parameter-cycle", message, span));
            } else if let Some(pos) = params.iter().position(|p| p == referenced) {
                if pos > idx {
                    let message = format!(
                        "Illegal forward reference to type parameter {}",
                        names[pos]
                    );
                    diagnostics.push(Diagnostic::error("forward-type-parameter", message, span));
                }
            }
        }

        diagnostics.extend(check_bound_intersection(env, &def.upper_bounds, span));
    }

    diagnostics
}

/// One bound intersection may not mention the same interface twice; twice
/// with different arguments is the implemented-more-than-once error.
fn check_bound_intersection(
    env: &dyn TypeEnv,
    bounds: &[Type],
    span: Option<Span>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut seen: HashMap<ClassId, Type> = HashMap::new();

    for bound in bounds {
        let Type::Class(ClassType { def, .. }) = bound else {
            continue;
        };
        let Some(class) = env.class(*def) else {
            continue;
        };
        if class.kind != ClassKind::Interface {
            continue;
        }
        match seen.get(def) {
            None => {
                seen.insert(*def, bound.clone());
            }
            Some(previous) if previous == bound => {
                let message = format!("Duplicate bound {}", format_type(env, bound));
                diagnostics.push(Diagnostic::error("duplicate-bound", message, span));
            }
            Some(previous) => {
                let message = format!(
                    "The interface {} cannot be implemented more than once with different arguments: {} and {}",
                    simple_name(&class.name),
                    format_type(env, previous),
                    format_type(env, bound),
                );
                diagnostics.push(Diagnostic::error("interface-reimplemented", message, span));
            }
        }
    }
    diagnostics
}

/// Validate a class declaration: its own parameter list, its supertype
/// references, the Throwable restriction, and conflicting interface
/// parameterizations anywhere in its inheritance lattice.
pub fn check_class_declaration(
    env: &dyn TypeEnv,
    class: ClassId,
    span: Option<Span>,
) -> Vec<Diagnostic> {
    let Some(def) = env.class(class) else {
        return vec![];
    };
    let mut diagnostics = Vec::new();

    if def.name == "java.lang.Object" && !def.type_params.is_empty() {
        diagnostics.push(Diagnostic::error(
            "object-generic",
            "The type java.lang.Object cannot be generic",
            span,
        ));
    }

    diagnostics.extend(check_type_param_declarations(env, &def.type_params, span));

    let supertypes: Vec<Type> = def
        .super_class
        .iter()
        .chain(def.interfaces.iter())
        .cloned()
        .collect();
    for sup in &supertypes {
        let Type::Class(ClassType { def: sup_def, args }) = sup else {
            continue;
        };
        if args.is_empty() {
            if sup.is_raw(env) {
                if let Some(sup_class) = env.class(*sup_def) {
                    let message = format!(
                        "{} is a raw type. References to generic type {} should be parameterized",
                        simple_name(&sup_class.name),
                        generic_decl_name(env, *sup_def),
                    );
                    diagnostics.push(Diagnostic::warning("raw-type", message, span));
                }
            }
            continue;
        }
        diagnostics.extend(check_type_application(env, *sup_def, args, span));
    }

    let self_args: Vec<Type> = def.type_params.iter().map(|p| Type::TypeVar(*p)).collect();
    let self_ty = Type::class(class, self_args);

    if !def.type_params.is_empty() {
        let throwable = env.well_known().throwable;
        let reaches_throwable = supertype_closure(env, &self_ty)
            .iter()
            .any(|t| matches!(t, Type::Class(ClassType { def, .. }) if *def == throwable));
        if reaches_throwable {
            let message = format!(
                "The generic class {} may not subclass java.lang.Throwable",
                generic_decl_name(env, class),
            );
            diagnostics.push(Diagnostic::error("generic-throwable", message, span));
        }
    }

    diagnostics.extend(check_interface_consistency(env, class, &self_ty, span));

    diagnostics
}

/// Walk the full inheritance lattice and reject two different
/// parameterizations of one interface. A raw path alongside a parameterized
/// path is legal (the relationship is merely unchecked).
fn check_interface_consistency(
    env: &dyn TypeEnv,
    class: ClassId,
    self_ty: &Type,
    span: Option<Span>,
) -> Vec<Diagnostic> {
    let mut instantiations: HashMap<ClassId, Vec<Vec<Type>>> = HashMap::new();

    for sup in supertype_closure(env, self_ty) {
        let Type::Class(ClassType { def, args }) = sup else {
            continue;
        };
        if def == class || args.is_empty() {
            continue;
        }
        let Some(sup_class) = env.class(def) else {
            continue;
        };
        if sup_class.kind != ClassKind::Interface {
            continue;
        }
        let entry = instantiations.entry(def).or_default();
        if !entry.contains(&args) {
            entry.push(args);
        }
    }

    let mut conflicts: Vec<(ClassId, Vec<Vec<Type>>)> = instantiations
        .into_iter()
        .filter(|(_, lists)| lists.len() > 1)
        .collect();
    conflicts.sort_by_key(|(def, _)| *def);

    let mut diagnostics = Vec::new();
    for (def, mut lists) in conflicts {
        let Some(iface) = env.class(def) else {
            continue;
        };
        lists.sort_by_cached_key(|args| format_type_args(env, args));
        let first = Type::class(def, lists[0].clone());
        let second = Type::class(def, lists[1].clone());
        let message = format!(
            "The interface {} cannot be implemented more than once with different arguments: {} and {}",
            simple_name(&iface.name),
            format_type(env, &first),
            format_type(env, &second),
        );
        diagnostics.push(Diagnostic::error("interface-reimplemented", message, span));
    }
    diagnostics
}

/// Catch formal parameters may name neither a type variable nor a
/// parameterized type.
pub fn check_catch_type(env: &dyn TypeEnv, ty: &Type, span: Option<Span>) -> Option<Diagnostic> {
    match ty {
        Type::TypeVar(id) => {
            let name = env
                .type_param(*id)
                .map(|d| d.name.clone())
                .unwrap_or_default();
            Some(Diagnostic::error(
                "generic-catch",
                format!("Cannot use the type parameter {} in a catch block", name),
                span,
            ))
        }
        Type::Class(ClassType { args, .. }) if !args.is_empty() => Some(Diagnostic::error(
            "generic-catch",
            format!(
                "Cannot use the parameterized type {} either in catch block or throws clause",
                format_type(env, ty)
            ),
            span,
        )),
        _ => None,
    }
}

/// Throws clauses accept type variables (`<T extends Exception> ... throws T`)
/// but not parameterized types.
pub fn check_throws_type(env: &dyn TypeEnv, ty: &Type, span: Option<Span>) -> Option<Diagnostic> {
    match ty {
        Type::Class(ClassType { args, .. }) if !args.is_empty() => Some(Diagnostic::error(
            "generic-catch",
            format!(
                "Cannot use the parameterized type {} either in catch block or throws clause",
                format_type(env, ty)
            ),
            span,
        )),
        _ => None,
    }
}

/// Array creation requires a reifiable element type; `new List<String>[n]`
/// is illegal while `new List<?>[n]` is fine.
pub fn check_array_creation(
    env: &dyn TypeEnv,
    element: &Type,
    span: Option<Span>,
) -> Option<Diagnostic> {
    if is_reifiable(env, element) {
        return None;
    }
    Some(Diagnostic::error(
        "generic-array",
        format!("Cannot create a generic array of {}", format_type(env, element)),
        span,
    ))
}

/// A class-level type variable is not in scope in static members.
pub fn check_static_type_variable_reference(
    env: &dyn TypeEnv,
    ty: &Type,
    span: Option<Span>,
) -> Option<Diagnostic> {
    let Type::TypeVar(id) = ty else {
        return None;
    };
    let name = env
        .type_param(*id)
        .map(|d| d.name.clone())
        .unwrap_or_default();
    Some(Diagnostic::error(
        "static-type-variable",
        format!("Cannot make a static reference to the non-static type {}", name),
        span,
    ))
}
