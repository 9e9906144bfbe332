//! Member resolution: methods, constructors, fields.
//!
//! Resolution is a pure function of the environment and the call description.
//! The outcome is an explicit ranking variant — found, ambiguous, or not
//! found with the diagnostics that explain why — so the tie-break rules
//! (most-specific selection, erasure clashes, bound re-checks) stay auditable
//! in isolation.

use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::erasure::erasure;
use crate::infer::infer_method_type_args;
use crate::java::format::{
    format_type, format_type_args, generic_decl_name, method_signature, simple_name,
};
use crate::java::helpers::{class_supertype_walk, get_class_type, is_decl_subtype};
use crate::{
    canonicalize_named, is_assignable, is_reifiable, is_subtype, substitute, type_sort_key,
    ClassId, ClassType, Diagnostic, FieldDef, Type, TypeEnv, TypeVarId, TypeWarning,
    UncheckedReason, WildcardBound,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CallKind {
    Instance,
    Static,
}

/// One method invocation to resolve. Argument types are the already-typed
/// argument expressions; `expected_return` is the target type when the call
/// sits in an assignment, return, or cast context.
#[derive(Clone, Debug)]
pub struct MethodCall<'a> {
    pub receiver: Type,
    pub call_kind: CallKind,
    pub name: &'a str,
    pub args: Vec<Type>,
    pub expected_return: Option<Type>,
    pub explicit_type_args: Vec<Type>,
}

/// A successfully resolved invocation: effective per-argument parameter
/// types (varargs already stretched), the substituted return type, and any
/// recoverable warnings the invocation carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedMethod {
    pub owner: ClassId,
    pub name: String,
    pub inferred_type_args: Vec<Type>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub used_varargs: bool,
    pub warnings: Vec<TypeWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MethodResolution {
    Found(ResolvedMethod),
    Ambiguous(Vec<ResolvedMethod>),
    NotFound(Vec<Diagnostic>),
}

/// A member method as seen through one receiver instantiation: the class
/// parameterization is already substituted in (or erased, for raw receivers).
#[derive(Clone, Debug)]
struct Candidate {
    owner: ClassId,
    type_params: Vec<TypeVarId>,
    params: Vec<Type>,
    return_type: Type,
    is_static: bool,
    is_varargs: bool,
    raw: bool,
    /// The raw receiver erased a method that was itself generic.
    raw_generic: bool,
}

pub(crate) fn resolve_method_call_impl(
    env: &dyn TypeEnv,
    call: &MethodCall<'_>,
    receiver_parts: Vec<Type>,
) -> MethodResolution {
    if call.name == "getClass"
        && call.call_kind == CallKind::Instance
        && call.args.is_empty()
        && call.explicit_type_args.is_empty()
    {
        // `x.getClass()` is covariant in the receiver: `Class<? extends |X|>`.
        return MethodResolution::Found(ResolvedMethod {
            owner: env.well_known().object,
            name: "getClass".to_string(),
            inferred_type_args: vec![],
            params: vec![],
            return_type: get_class_type(env, &call.receiver),
            is_static: false,
            is_varargs: false,
            used_varargs: false,
            warnings: vec![],
        });
    }

    let candidates = collect_candidates(env, &receiver_parts, call.name, call.call_kind);
    trace!(
        name = call.name,
        candidates = candidates.len(),
        "collected method candidates"
    );

    if candidates.is_empty() {
        let message = format!(
            "The method {}({}) is undefined for the type {}",
            call.name,
            format_type_args(env, &call.args),
            format_type(env, &call.receiver)
        );
        return MethodResolution::NotFound(vec![Diagnostic::error("undefined-method", message, None)]);
    }

    if let Some(clash) = same_erasure_clash(env, &candidates, call.name) {
        return MethodResolution::NotFound(vec![clash]);
    }

    let candidates = dedup_overridden(env, candidates);

    let mut failures: Vec<Diagnostic> = Vec::new();
    let mut applicable: Vec<ResolvedMethod> = Vec::new();

    for varargs_phase in [false, true] {
        for cand in &candidates {
            if varargs_phase && !cand.is_varargs {
                continue;
            }
            match try_candidate(env, cand, call, varargs_phase) {
                Ok(resolved) => {
                    if !applicable.contains(&resolved) {
                        applicable.push(resolved);
                    }
                }
                Err(Some(diag)) => {
                    if !failures.contains(&diag) {
                        failures.push(diag);
                    }
                }
                Err(None) => {}
            }
        }
        if !applicable.is_empty() {
            break;
        }
    }

    if applicable.is_empty() {
        failures.sort_by_key(|d| failure_priority(d.code));
        if failures.is_empty() {
            let message = format!(
                "The method {}({}) is undefined for the type {}",
                call.name,
                format_type_args(env, &call.args),
                format_type(env, &call.receiver)
            );
            failures.push(Diagnostic::error("undefined-method", message, None));
        }
        return MethodResolution::NotFound(failures);
    }

    pick_most_specific(env, applicable)
}

fn failure_priority(code: &str) -> u8 {
    match code {
        "bound-mismatch" => 0,
        "raw-method-witness" => 1,
        "not-generic-method" => 2,
        "type-arity" => 3,
        "not-applicable" => 4,
        _ => 5,
    }
}

fn collect_candidates(
    env: &dyn TypeEnv,
    receiver_parts: &[Type],
    name: &str,
    call_kind: CallKind,
) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();

    for part in receiver_parts {
        let (def, args) = match part {
            Type::Class(ClassType { def, args }) => (*def, args.clone()),
            // Array members resolve against Object.
            Type::Array(_) => (env.well_known().object, vec![]),
            _ => continue,
        };

        for inst in class_supertype_walk(env, def, args) {
            let Type::Class(ClassType { def, args }) = inst else {
                continue;
            };
            let Some(class_def) = env.class(def) else {
                continue;
            };
            let raw = args.is_empty() && !class_def.type_params.is_empty();

            let mut map: HashMap<TypeVarId, Type> = HashMap::new();
            if !raw {
                for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
                    map.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
                }
            }

            for m in &class_def.methods {
                if m.name != name {
                    continue;
                }
                if call_kind == CallKind::Static && !m.is_static {
                    continue;
                }

                let cand = if raw {
                    Candidate {
                        owner: def,
                        type_params: vec![],
                        params: m.params.iter().map(|p| erasure(env, p)).collect(),
                        return_type: erasure(env, &m.return_type),
                        is_static: m.is_static,
                        is_varargs: m.is_varargs,
                        raw: true,
                        raw_generic: !m.type_params.is_empty(),
                    }
                } else {
                    Candidate {
                        owner: def,
                        type_params: m.type_params.clone(),
                        params: m.params.iter().map(|p| substitute(env, p, &map)).collect(),
                        return_type: substitute(env, &m.return_type, &map),
                        is_static: m.is_static,
                        is_varargs: m.is_varargs,
                        raw: false,
                        raw_generic: false,
                    }
                };

                let duplicate = out.iter().any(|c| {
                    c.owner == cand.owner
                        && c.params == cand.params
                        && c.return_type == cand.return_type
                });
                if !duplicate {
                    out.push(cand);
                }
            }
        }
    }

    out
}

/// Two collected candidates with the same erasure, different signatures, and
/// unrelated declaring types are a compile error, not an overload pair.
fn same_erasure_clash(env: &dyn TypeEnv, candidates: &[Candidate], name: &str) -> Option<Diagnostic> {
    for (i, a) in candidates.iter().enumerate() {
        for b in candidates.iter().skip(i + 1) {
            if a.owner == b.owner || a.params == b.params {
                continue;
            }
            let a_erased: Vec<Type> = a.params.iter().map(|p| erasure(env, p)).collect();
            let b_erased: Vec<Type> = b.params.iter().map(|p| erasure(env, p)).collect();
            if a_erased != b_erased {
                continue;
            }
            let related =
                is_decl_subtype(env, a.owner, b.owner) || is_decl_subtype(env, b.owner, a.owner);
            if related {
                continue;
            }
            let message = format!(
                "Name clash: The method {} of type {} has the same erasure as {} of type {} but does not override it",
                method_signature(env, name, &a.params),
                owner_name(env, a.owner),
                method_signature(env, name, &b.params),
                owner_name(env, b.owner),
            );
            return Some(Diagnostic::error("name-clash", message, None));
        }
    }
    None
}

fn owner_name(env: &dyn TypeEnv, id: ClassId) -> String {
    env.class(id)
        .map(|d| simple_name(&d.name).to_string())
        .unwrap_or_else(|| format!("<class#{}>", id.0))
}

/// Keep the most-derived declaration of each override chain: candidates are
/// collected most-derived first, so the first of each erased signature wins.
fn dedup_overridden(env: &dyn TypeEnv, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();
    let mut seen: Vec<Vec<Type>> = Vec::new();
    for cand in candidates {
        let erased: Vec<Type> = cand.params.iter().map(|p| erasure(env, p)).collect();
        if seen.contains(&erased) {
            continue;
        }
        seen.push(erased);
        out.push(cand);
    }
    out
}

/// Returns `Err(Some(diag))` for failures worth reporting (bound mismatches,
/// illegal witnesses, inapplicable signatures) and `Err(None)` for silent
/// phase mismatches (wrong arity for this phase).
fn try_candidate(
    env: &dyn TypeEnv,
    cand: &Candidate,
    call: &MethodCall<'_>,
    varargs_phase: bool,
) -> Result<ResolvedMethod, Option<Diagnostic>> {
    let declared_params = cand.params.clone();

    let Some(effective) = stretch_params(&cand.params, cand.is_varargs, call.args.len(), varargs_phase)
    else {
        if cand.params.len() != call.args.len() && !cand.is_varargs {
            return Err(Some(not_applicable(env, cand, call, &declared_params)));
        }
        return Err(None);
    };

    if cand.raw_generic && !call.explicit_type_args.is_empty() {
        let message = format!(
            "The method {} of raw type {} is no longer generic; it cannot be parameterized with arguments <{}>",
            method_signature(env, call.name, &declared_params),
            owner_name(env, cand.owner),
            format_type_args(env, &call.explicit_type_args),
        );
        return Err(Some(Diagnostic::error("raw-method-witness", message, None)));
    }

    let mut effective = effective;
    let mut return_type = cand.return_type.clone();
    let mut inferred_type_args: Vec<Type> = Vec::new();

    if !cand.type_params.is_empty() {
        let map = if call.explicit_type_args.is_empty() {
            infer_method_type_args(
                env,
                &cand.type_params,
                &effective,
                &call.args,
                &cand.return_type,
                call.expected_return.as_ref(),
            )
        } else {
            if call.explicit_type_args.len() != cand.type_params.len() {
                let message = format!(
                    "Incorrect number of type arguments for generic method <{}>{} of type {}",
                    cand.type_params
                        .iter()
                        .map(|tp| env.type_param(*tp).map(|d| d.name.clone()).unwrap_or_default())
                        .collect::<Vec<_>>()
                        .join(", "),
                    method_signature(env, call.name, &declared_params),
                    owner_name(env, cand.owner),
                );
                return Err(Some(Diagnostic::error("type-arity", message, None)));
            }
            cand.type_params
                .iter()
                .copied()
                .zip(call.explicit_type_args.iter().cloned())
                .collect()
        };

        // Phase 3: the resolved arguments must satisfy the method's own
        // declared bounds; failing this is a bound mismatch, not a plain
        // inapplicability.
        for var in &cand.type_params {
            let Some(solution) = map.get(var) else {
                continue;
            };
            let Some(def) = env.type_param(*var) else {
                continue;
            };
            for bound in &def.upper_bounds {
                let substituted = substitute(env, bound, &map);
                if !is_subtype(env, solution, &substituted) {
                    let message = format!(
                        "Bound mismatch: The generic method {} of type {} is not applicable for the arguments ({}). The inferred type {} is not a valid substitute for the bounded parameter <{}>",
                        method_signature(env, call.name, &declared_params),
                        owner_name(env, cand.owner),
                        format_type_args(env, &call.args),
                        format_type(env, solution),
                        crate::format_type_param(env, *var),
                    );
                    return Err(Some(Diagnostic::error("bound-mismatch", message, None)));
                }
            }
        }

        inferred_type_args = cand
            .type_params
            .iter()
            .map(|v| map.get(v).cloned().unwrap_or(Type::Unknown))
            .collect();
        effective = effective.iter().map(|p| substitute(env, p, &map)).collect();
        return_type = substitute(env, &return_type, &map);
    } else if !call.explicit_type_args.is_empty() && !cand.raw_generic {
        let message = format!(
            "The method {} of type {} is not generic; it cannot be parameterized with arguments <{}>",
            method_signature(env, call.name, &declared_params),
            owner_name(env, cand.owner),
            format_type_args(env, &call.explicit_type_args),
        );
        return Err(Some(Diagnostic::error("not-generic-method", message, None)));
    }

    for (arg, param) in call.args.iter().zip(effective.iter()) {
        if !is_assignable(env, arg, param) {
            return Err(Some(not_applicable(env, cand, call, &declared_params)));
        }
    }

    let mut warnings = Vec::new();
    if cand.raw {
        warnings.push(TypeWarning::Unchecked(UncheckedReason::RawMemberAccess));
    }
    if varargs_phase {
        // Reifiability is judged on the declared parameter, before inference
        // narrowed it.
        if let Some(Type::Array(elem)) = cand.params.last() {
            if !is_reifiable(env, elem) {
                warnings.push(TypeWarning::Unchecked(UncheckedReason::UncheckedVarargs));
            }
        }
    }

    Ok(ResolvedMethod {
        owner: cand.owner,
        name: call.name.to_string(),
        inferred_type_args,
        params: effective,
        return_type,
        is_static: cand.is_static,
        is_varargs: cand.is_varargs,
        used_varargs: varargs_phase,
        warnings,
    })
}

/// The diagnostic a driver reports when resolution ends in
/// [`MethodResolution::Ambiguous`].
pub fn ambiguous_method_diagnostic(
    env: &dyn TypeEnv,
    name: &str,
    receiver: &Type,
    span: Option<crate::Span>,
) -> Diagnostic {
    let message = format!(
        "The method {} is ambiguous for the type {}",
        name,
        format_type(env, receiver),
    );
    Diagnostic::error("ambiguous-method", message, span)
}

fn not_applicable(
    env: &dyn TypeEnv,
    cand: &Candidate,
    call: &MethodCall<'_>,
    declared_params: &[Type],
) -> Diagnostic {
    let message = format!(
        "The method {} in the type {} is not applicable for the arguments ({})",
        method_signature(env, call.name, declared_params),
        owner_name(env, cand.owner),
        format_type_args(env, &call.args),
    );
    Diagnostic::error("not-applicable", message, None)
}

/// The effective per-argument formal types: identity in the fixed-arity
/// phase, last-parameter element stretching in the variable-arity phase.
fn stretch_params(
    params: &[Type],
    is_varargs: bool,
    arg_count: usize,
    varargs_phase: bool,
) -> Option<Vec<Type>> {
    if !varargs_phase {
        if params.len() == arg_count {
            return Some(params.to_vec());
        }
        return None;
    }
    if !is_varargs || params.is_empty() || arg_count < params.len() - 1 {
        return None;
    }
    let Type::Array(elem) = params.last().expect("params checked non-empty") else {
        return None;
    };
    let mut out: Vec<Type> = params[..params.len() - 1].to_vec();
    out.extend(std::iter::repeat_with(|| (**elem).clone()).take(arg_count - (params.len() - 1)));
    Some(out)
}

fn pick_most_specific(env: &dyn TypeEnv, mut applicable: Vec<ResolvedMethod>) -> MethodResolution {
    if applicable.len() == 1 {
        return MethodResolution::Found(applicable.pop().expect("len checked"));
    }

    let strictly_more_specific = |a: &ResolvedMethod, b: &ResolvedMethod| {
        a.params.len() == b.params.len()
            && a.params
                .iter()
                .zip(b.params.iter())
                .all(|(pa, pb)| is_subtype(env, pa, pb))
            && !b
                .params
                .iter()
                .zip(a.params.iter())
                .all(|(pb, pa)| is_subtype(env, pb, pa))
    };

    let maximal: Vec<ResolvedMethod> = applicable
        .iter()
        .filter(|a| !applicable.iter().any(|b| strictly_more_specific(b, a)))
        .cloned()
        .collect();

    match maximal.len() {
        0 => MethodResolution::Ambiguous(applicable),
        1 => MethodResolution::Found(maximal.into_iter().next().expect("len checked")),
        _ => {
            // Identical surviving signatures (the same inherited method seen
            // through equivalent paths) are not a real ambiguity.
            let first = &maximal[0];
            if maximal
                .iter()
                .all(|m| m.params == first.params && m.return_type == first.return_type)
            {
                return MethodResolution::Found(maximal.into_iter().next().expect("len checked"));
            }
            let mut sorted = maximal;
            sorted.sort_by_cached_key(|m| {
                (
                    m.owner,
                    m.params
                        .iter()
                        .map(|p| type_sort_key(env, p))
                        .collect::<Vec<_>>()
                        .join(","),
                )
            });
            MethodResolution::Ambiguous(sorted)
        }
    }
}

/// Resolve a field against `receiver` without capture conversion; the
/// capture-aware entry point is [`crate::TyContext::resolve_field`].
pub fn resolve_field(
    env: &dyn TypeEnv,
    receiver: &Type,
    name: &str,
    call_kind: CallKind,
) -> Option<FieldDef> {
    let mut parts = Vec::new();
    field_receiver_parts(env, receiver, &mut parts, 0);

    for part in parts {
        let (def, args) = match part {
            Type::Class(ClassType { def, args }) => (def, args),
            _ => continue,
        };
        for inst in class_supertype_walk(env, def, args) {
            let Type::Class(ClassType { def, args }) = inst else {
                continue;
            };
            let Some(class_def) = env.class(def) else {
                continue;
            };
            let raw = args.is_empty() && !class_def.type_params.is_empty();
            let mut map: HashMap<TypeVarId, Type> = HashMap::new();
            if !raw {
                for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
                    map.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
                }
            }

            for field in &class_def.fields {
                if field.name != name {
                    continue;
                }
                if call_kind == CallKind::Static && !field.is_static {
                    continue;
                }
                let ty = if raw {
                    erasure(env, &field.ty)
                } else {
                    substitute(env, &field.ty, &map)
                };
                return Some(FieldDef {
                    name: field.name.clone(),
                    ty,
                    is_static: field.is_static,
                    is_final: field.is_final,
                });
            }
        }
    }
    None
}

fn field_receiver_parts(env: &dyn TypeEnv, ty: &Type, parts: &mut Vec<Type>, depth: usize) {
    if depth > 16 {
        return;
    }
    match canonicalize_named(env, ty) {
        Type::TypeVar(id) => {
            let bounds = env
                .type_param(id)
                .map(|d| d.upper_bounds.clone())
                .unwrap_or_default();
            let mut real: Vec<Type> = bounds.iter().filter(|b| !b.is_errorish()).cloned().collect();
            if real.is_empty() {
                real = bounds;
            }
            real.sort_by_cached_key(|t| {
                (
                    crate::intersection_component_rank(env, t),
                    type_sort_key(env, t),
                )
            });
            for bound in &real {
                field_receiver_parts(env, bound, parts, depth + 1);
            }
        }
        Type::Intersection(members) => {
            for member in &members {
                field_receiver_parts(env, member, parts, depth + 1);
            }
        }
        Type::Wildcard(WildcardBound::Extends(b)) => field_receiver_parts(env, &b, parts, depth + 1),
        other => {
            if !parts.contains(&other) {
                parts.push(other);
            }
        }
    }
}

/// Resolve a constructor invocation of `class`, inferring the class type
/// arguments from the constructor arguments when none are supplied (diamond
/// style).
pub fn resolve_constructor_call(
    env: &dyn TypeEnv,
    class: ClassId,
    args: &[Type],
    explicit_type_args: Option<&[Type]>,
) -> MethodResolution {
    let Some(def) = env.class(class) else {
        return MethodResolution::NotFound(vec![Diagnostic::error(
            "undefined-type",
            format!("The constructor of type <class#{}> cannot be resolved", class.0),
            None,
        )]);
    };

    if let Some(type_args) = explicit_type_args {
        let bound_diags = crate::check_type_application(env, class, type_args, None);
        if bound_diags
            .iter()
            .any(|d| d.severity == crate::Severity::Error)
        {
            return MethodResolution::NotFound(bound_diags);
        }
    }

    let class_vars = def.type_params.clone();
    if let Some(type_args) = explicit_type_args {
        if type_args.len() != class_vars.len() {
            let message = format!(
                "Incorrect number of arguments for type {}; it cannot be parameterized with arguments <{}>",
                generic_decl_name(env, class),
                format_type_args(env, type_args),
            );
            return MethodResolution::NotFound(vec![Diagnostic::error("type-arity", message, None)]);
        }
    }
    let ctors: Vec<crate::ConstructorDef> = def
        .constructors
        .iter()
        .filter(|c| c.is_accessible)
        .cloned()
        .collect();

    let mut failures: Vec<Diagnostic> = Vec::new();
    let mut applicable: Vec<ResolvedMethod> = Vec::new();

    for varargs_phase in [false, true] {
        for ctor in &ctors {
            if varargs_phase && !ctor.is_varargs {
                continue;
            }
            let Some(effective) =
                stretch_params(&ctor.params, ctor.is_varargs, args.len(), varargs_phase)
            else {
                continue;
            };

            let map: HashMap<TypeVarId, Type> = match explicit_type_args {
                Some(type_args) => class_vars
                    .iter()
                    .copied()
                    .zip(type_args.iter().cloned())
                    .collect(),
                None if class_vars.is_empty() => HashMap::new(),
                None => infer_method_type_args(
                    env,
                    &class_vars,
                    &effective,
                    args,
                    &Type::class(class, class_vars.iter().map(|v| Type::TypeVar(*v)).collect()),
                    None,
                ),
            };

            let effective: Vec<Type> =
                effective.iter().map(|p| substitute(env, p, &map)).collect();

            let mut ok = true;
            for (arg, param) in args.iter().zip(effective.iter()) {
                if !is_assignable(env, arg, param) {
                    let message = format!(
                        "The constructor {}({}) is not applicable for the arguments ({})",
                        simple_name(&def.name),
                        format_type_args(env, &ctor.params),
                        format_type_args(env, args),
                    );
                    let diag = Diagnostic::error("not-applicable", message, None);
                    if !failures.contains(&diag) {
                        failures.push(diag);
                    }
                    ok = false;
                    break;
                }
            }
            if !ok {
                continue;
            }

            // Inferred class arguments must satisfy the class's own bounds.
            let mut bound_ok = true;
            for var in &class_vars {
                let Some(solution) = map.get(var) else {
                    continue;
                };
                let Some(var_def) = env.type_param(*var) else {
                    continue;
                };
                for bound in &var_def.upper_bounds {
                    let substituted = substitute(env, bound, &map);
                    if !is_subtype(env, solution, &substituted) {
                        let message = format!(
                            "Bound mismatch: The type {} is not a valid substitute for the bounded parameter <{}> of the type {}",
                            format_type(env, solution),
                            crate::format_type_param(env, *var),
                            generic_decl_name(env, class),
                        );
                        let diag = Diagnostic::error("bound-mismatch", message, None);
                        if !failures.contains(&diag) {
                            failures.push(diag);
                        }
                        bound_ok = false;
                    }
                }
            }
            if !bound_ok {
                continue;
            }

            let type_args: Vec<Type> = class_vars
                .iter()
                .map(|v| map.get(v).cloned().unwrap_or(Type::Unknown))
                .collect();
            let return_type = Type::class(class, type_args.clone());

            let mut warnings = Vec::new();
            if varargs_phase {
                if let Some(Type::Array(elem)) = ctor.params.last() {
                    if !is_reifiable(env, elem) {
                        warnings.push(TypeWarning::Unchecked(UncheckedReason::UncheckedVarargs));
                    }
                }
            }

            let resolved = ResolvedMethod {
                owner: class,
                name: "<init>".to_string(),
                inferred_type_args: type_args,
                params: effective,
                return_type,
                is_static: false,
                is_varargs: ctor.is_varargs,
                used_varargs: varargs_phase,
                warnings,
            };
            if !applicable.contains(&resolved) {
                applicable.push(resolved);
            }
        }
        if !applicable.is_empty() {
            break;
        }
    }

    if applicable.is_empty() {
        failures.sort_by_key(|d| failure_priority(d.code));
        if failures.is_empty() {
            let message = format!(
                "The constructor {}({}) is undefined",
                simple_name(&def.name),
                format_type_args(env, args),
            );
            failures.push(Diagnostic::error("undefined-constructor", message, None));
        }
        return MethodResolution::NotFound(failures);
    }

    pick_most_specific(env, applicable)
}
