//! Type-argument inference for generic method and constructor invocations.
//!
//! Three phases, kept separate so failures are attributable: constraint
//! generation from the argument types (plus the expected/target type when the
//! call site has one), per-variable resolution, and the caller's bound
//! re-check. This module performs the first two; the bound re-check lives
//! with resolution so its diagnostic can name the candidate.

use std::collections::{HashMap, HashSet};

use crate::java::helpers::instantiate_supertype;
use crate::subst::mentions_any_var;
use crate::{
    canonicalize_named, glb, lub, make_intersection, substitute, ClassType, Type, TypeEnv,
    TypeVarId, WildcardBound,
};

#[derive(Debug, Default)]
struct Constraints {
    /// `arg <: var`: the variable must be at least each of these.
    lower: Vec<Type>,
    /// `var = ty`: produced by invariant positions.
    equal: Vec<Type>,
    /// `var <: ty`: produced by the expected-return context.
    upper: Vec<Type>,
}

struct InferenceState {
    vars: Vec<TypeVarId>,
    var_set: HashSet<TypeVarId>,
    constraints: HashMap<TypeVarId, Constraints>,
}

impl InferenceState {
    fn new(vars: &[TypeVarId]) -> Self {
        Self {
            vars: vars.to_vec(),
            var_set: vars.iter().copied().collect(),
            constraints: vars.iter().map(|v| (*v, Constraints::default())).collect(),
        }
    }

    fn is_var(&self, id: TypeVarId) -> bool {
        self.var_set.contains(&id)
    }

    fn lower(&mut self, id: TypeVarId, ty: Type) {
        if ty.is_errorish() || ty == Type::Null {
            return;
        }
        if let Some(c) = self.constraints.get_mut(&id) {
            c.lower.push(ty);
        }
    }

    fn equal(&mut self, id: TypeVarId, ty: Type) {
        if ty.is_errorish() {
            return;
        }
        if let Some(c) = self.constraints.get_mut(&id) {
            c.equal.push(ty);
        }
    }

    fn upper(&mut self, id: TypeVarId, ty: Type) {
        if ty.is_errorish() {
            return;
        }
        if let Some(c) = self.constraints.get_mut(&id) {
            c.upper.push(ty);
        }
    }
}

/// Infer bindings for `vars` from `args <: params`, and from
/// `return_type <: expected` when an expected type is present. Variables left
/// unconstrained default to their declared bounds.
///
/// Inference itself never fails; whether the result satisfies the declared
/// bounds is the caller's re-check.
pub(crate) fn infer_method_type_args(
    env: &dyn TypeEnv,
    vars: &[TypeVarId],
    params: &[Type],
    args: &[Type],
    return_type: &Type,
    expected: Option<&Type>,
) -> HashMap<TypeVarId, Type> {
    let mut st = InferenceState::new(vars);

    for (arg, param) in args.iter().zip(params.iter()) {
        constrain_actual_to_formal(env, &mut st, arg, param);
    }
    if let Some(expected) = expected {
        constrain_formal_to_actual(env, &mut st, expected, return_type);
    }

    solve(env, st)
}

/// Record constraints implied by `actual <: formal` where only `formal` may
/// mention inference variables.
fn constrain_actual_to_formal(env: &dyn TypeEnv, st: &mut InferenceState, actual: &Type, formal: &Type) {
    match formal {
        Type::TypeVar(v) if st.is_var(*v) => st.lower(*v, actual.clone()),
        Type::Class(ClassType { def, args: formal_args }) => {
            if actual.is_errorish() || *actual == Type::Null {
                return;
            }
            let Some(Type::Class(ClassType { args: actual_args, .. })) =
                instantiate_supertype(env, actual, *def)
            else {
                return;
            };
            if actual_args.len() != formal_args.len() {
                return;
            }
            for (a, f) in actual_args.iter().zip(formal_args.iter()) {
                constrain_type_argument(env, st, a, f);
            }
        }
        Type::Array(formal_elem) => match canonicalize_named(env, actual) {
            Type::Array(actual_elem) => {
                if actual_elem.is_reference() && formal_elem.is_reference() {
                    constrain_actual_to_formal(env, st, &actual_elem, formal_elem);
                } else {
                    constrain_equal(env, st, &actual_elem, formal_elem);
                }
            }
            _ => {}
        },
        Type::Intersection(parts) => {
            for part in parts {
                constrain_actual_to_formal(env, st, actual, part);
            }
        }
        _ => {}
    }
}

/// Constraints from one type-argument position: invariant unless the formal
/// argument is a wildcard.
fn constrain_type_argument(env: &dyn TypeEnv, st: &mut InferenceState, actual: &Type, formal: &Type) {
    match formal {
        Type::Wildcard(WildcardBound::Extends(fb)) => {
            let effective = match actual {
                Type::Wildcard(WildcardBound::Extends(ab)) => ab,
                Type::Wildcard(_) => return,
                other => other,
            };
            constrain_actual_to_formal(env, st, effective, fb);
        }
        Type::Wildcard(WildcardBound::Super(fb)) => {
            let effective = match actual {
                Type::Wildcard(WildcardBound::Super(ab)) => ab,
                Type::Wildcard(_) => return,
                other => other,
            };
            constrain_formal_to_actual(env, st, effective, fb);
        }
        Type::Wildcard(WildcardBound::Unbounded) => {}
        _ => constrain_equal(env, st, actual, formal),
    }
}

/// Record constraints implied by `actual == formal`.
fn constrain_equal(env: &dyn TypeEnv, st: &mut InferenceState, actual: &Type, formal: &Type) {
    match formal {
        Type::TypeVar(v) if st.is_var(*v) => st.equal(*v, actual.clone()),
        Type::Class(ClassType { def, args: formal_args }) => {
            let Type::Class(ClassType { def: actual_def, args: actual_args }) =
                canonicalize_named(env, actual)
            else {
                return;
            };
            if actual_def != *def || actual_args.len() != formal_args.len() {
                return;
            }
            for (a, f) in actual_args.iter().zip(formal_args.iter()) {
                constrain_type_argument(env, st, a, f);
            }
        }
        Type::Array(formal_elem) => {
            if let Type::Array(actual_elem) = canonicalize_named(env, actual) {
                constrain_equal(env, st, &actual_elem, formal_elem);
            }
        }
        _ => {}
    }
}

/// Record constraints implied by `formal <: actual` where only `formal` may
/// mention inference variables (the expected-return direction).
fn constrain_formal_to_actual(env: &dyn TypeEnv, st: &mut InferenceState, actual: &Type, formal: &Type) {
    match formal {
        Type::TypeVar(v) if st.is_var(*v) => st.upper(*v, actual.clone()),
        Type::Class(ClassType { .. }) => {
            let Type::Class(ClassType { def: actual_def, args: actual_args }) =
                canonicalize_named(env, actual)
            else {
                return;
            };
            // View the formal (variable-bearing) type as the expected
            // declaration; the walk substitutes symbolically, so inference
            // variables survive into the instantiated view.
            let Some(Type::Class(ClassType { args: formal_args, .. })) =
                instantiate_supertype(env, formal, actual_def)
            else {
                return;
            };
            if actual_args.len() != formal_args.len() {
                return;
            }
            for (f, a) in formal_args.iter().zip(actual_args.iter()) {
                match a {
                    Type::Wildcard(WildcardBound::Extends(ab)) => {
                        constrain_formal_to_actual(env, st, ab, f)
                    }
                    Type::Wildcard(WildcardBound::Super(ab)) => {
                        constrain_actual_to_formal(env, st, ab, f)
                    }
                    Type::Wildcard(WildcardBound::Unbounded) => {}
                    _ => constrain_equal(env, st, a, f),
                }
            }
        }
        Type::Array(formal_elem) => {
            if let Type::Array(actual_elem) = canonicalize_named(env, actual) {
                constrain_formal_to_actual(env, st, &actual_elem, formal_elem);
            }
        }
        _ => {}
    }
}

fn solve(env: &dyn TypeEnv, st: InferenceState) -> HashMap<TypeVarId, Type> {
    let mut solution: HashMap<TypeVarId, Type> = HashMap::with_capacity(st.vars.len());
    let mut remaining: HashSet<TypeVarId> = st.var_set.clone();

    for var in &st.vars {
        let c = &st.constraints[var];

        let mut choice: Option<Type> = None;

        if let Some(eq) = c.equal.iter().find(|t| !t.is_errorish()) {
            choice = Some(canonicalize_named(env, eq));
        }

        if choice.is_none() && !c.lower.is_empty() {
            choice = Some(lub(env, &c.lower));
        }

        if choice.is_none() && !c.upper.is_empty() {
            let mut it = c.upper.iter();
            let first = it.next().cloned().unwrap_or(Type::Unknown);
            let combined = it.fold(first, |acc, t| glb(env, &acc, t));
            choice = Some(combined);
        }

        let chosen = match choice {
            Some(t) => t,
            None => default_from_bounds(env, *var, &solution, &remaining),
        };

        remaining.remove(var);
        solution.insert(*var, chosen);
    }

    solution
}

/// An unconstrained variable falls back to its declared bound, with
/// already-solved variables substituted in. Bounds still mentioning unsolved
/// variables (the F-bounded case) degrade to the variable's erasure.
fn default_from_bounds(
    env: &dyn TypeEnv,
    var: TypeVarId,
    solution: &HashMap<TypeVarId, Type>,
    unsolved: &HashSet<TypeVarId>,
) -> Type {
    let Some(def) = env.type_param(var) else {
        return Type::class(env.well_known().object, vec![]);
    };
    if def.upper_bounds.is_empty() {
        return Type::class(env.well_known().object, vec![]);
    }
    let substituted: Vec<Type> = def
        .upper_bounds
        .iter()
        .map(|b| substitute(env, b, solution))
        .collect();
    if substituted.iter().any(|b| mentions_any_var(b, unsolved)) {
        return crate::erasure(env, &Type::TypeVar(var));
    }
    make_intersection(env, substituted)
}
