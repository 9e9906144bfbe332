//! Override reconciliation: run once per class after all member signatures
//! resolve, producing the bridge methods the code generator must emit and the
//! name-clash diagnostics for same-erasure pairs that do not override.
//!
//! The erased-signature map is scoped to one pass over one class; nothing is
//! shared across compilation units.

use std::collections::HashMap;

use tracing::debug;

use crate::erasure::{erased_param_types, erasure};
use crate::java::format::{method_signature, simple_name};
use crate::java::helpers::{class_supertype_walk, is_decl_subtype};
use crate::{
    is_subtype, substitute, ClassId, ClassType, Diagnostic, MethodDef, Type, TypeEnv, TypeVarId,
};

/// A synthesized forwarding method with the erased signature of an
/// overridden supertype method. `parameter_casts` holds, per parameter, the
/// checked cast the bridge body must insert before delegating (`None` when
/// the erasures already agree).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeMethod {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub target_params: Vec<Type>,
    pub target_return: Type,
    pub parameter_casts: Vec<Option<Type>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideReconciliation {
    pub bridges: Vec<BridgeMethod>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One inherited method as seen from the subclass: the supertype's
/// parameterization substituted into the signature, alongside the original
/// declaration (whose erasure fixes the bridge signature).
struct Inherited {
    owner: ClassId,
    declared: MethodDef,
    params: Vec<Type>,
    return_type: Type,
}

/// Decide, for every declared method of `class`, whether each same-erasure
/// inherited method is overridden (synthesizing a bridge when the erasures
/// diverge) or clashes.
pub fn reconcile_overrides(env: &dyn TypeEnv, class: ClassId) -> OverrideReconciliation {
    let Some(def) = env.class(class) else {
        return OverrideReconciliation::default();
    };

    let self_args: Vec<Type> = def.type_params.iter().map(|p| Type::TypeVar(*p)).collect();
    let inherited = collect_inherited(env, class, self_args);

    let mut out = OverrideReconciliation::default();

    for declared in &def.methods {
        if declared.is_static {
            continue;
        }
        let declared_erased = erased_param_types(env, declared);
        let declared_ret_erased = erasure(env, &declared.return_type);

        for inh in &inherited {
            if inh.declared.name != declared.name {
                continue;
            }
            // Same-erasure matching considers both views of the inherited
            // method: its signature under the inherited parameterization and
            // its declaration-site erasure. An override through a narrowed
            // parameterization matches the former; a legacy erased override
            // (`compareTo(Object)`) and the clash cases match the latter.
            let inh_sub_erased: Vec<Type> = inh.params.iter().map(|p| erasure(env, p)).collect();
            let inh_decl_erased = erased_param_types(env, &inh.declared);
            if inh_sub_erased != declared_erased && inh_decl_erased != declared_erased {
                continue;
            }

            let params_match =
                inh.params == declared.params || inh_sub_erased == declared.params;
            let return_ok = declared.return_type == inh.return_type
                || is_subtype(env, &declared.return_type, &inh.return_type);

            if !(params_match && return_ok) {
                let message = format!(
                    "Name clash: The method {} of type {} has the same erasure as {} of type {} but does not override it",
                    method_signature(env, &declared.name, &declared.params),
                    simple_name(&def.name),
                    method_signature(env, &inh.declared.name, &inh.params),
                    owner_simple_name(env, inh.owner),
                );
                let diag = Diagnostic::error("name-clash", message, None);
                if !out.diagnostics.contains(&diag) {
                    out.diagnostics.push(diag);
                }
                continue;
            }

            // Overridden. The bridge carries the *declaration-site* erasure
            // of the supertype method; when that differs from the declared
            // method's own erasure, erased callers need the forwarder.
            let bridge_params = inh_decl_erased;
            let bridge_return = erasure(env, &inh.declared.return_type);
            if bridge_params == declared_erased && bridge_return == declared_ret_erased {
                continue;
            }

            let parameter_casts: Vec<Option<Type>> = bridge_params
                .iter()
                .zip(declared_erased.iter())
                .map(|(bridge_p, target_p)| {
                    if bridge_p == target_p {
                        None
                    } else {
                        Some(target_p.clone())
                    }
                })
                .collect();

            let bridge = BridgeMethod {
                name: declared.name.clone(),
                params: bridge_params,
                return_type: bridge_return,
                target_params: declared.params.clone(),
                target_return: declared.return_type.clone(),
                parameter_casts,
            };
            if !out.bridges.contains(&bridge) {
                debug!(
                    class = def.name.as_str(),
                    method = declared.name.as_str(),
                    "bridge method required"
                );
                out.bridges.push(bridge);
            }
        }
    }

    // Same-erasure pairs arriving through two unrelated supertypes clash even
    // when the subclass declares nothing itself.
    for (i, a) in inherited.iter().enumerate() {
        for b in inherited.iter().skip(i + 1) {
            if a.declared.name != b.declared.name || a.owner == b.owner {
                continue;
            }
            let a_erased: Vec<Type> = a.params.iter().map(|p| erasure(env, p)).collect();
            let b_erased: Vec<Type> = b.params.iter().map(|p| erasure(env, p)).collect();
            if a_erased != b_erased || a.params == b.params {
                continue;
            }
            let related =
                is_decl_subtype(env, a.owner, b.owner) || is_decl_subtype(env, b.owner, a.owner);
            if related {
                continue;
            }
            let message = format!(
                "Name clash: The method {} of type {} has the same erasure as {} of type {} but does not override it",
                method_signature(env, &a.declared.name, &a.params),
                owner_simple_name(env, a.owner),
                method_signature(env, &b.declared.name, &b.params),
                owner_simple_name(env, b.owner),
            );
            let diag = Diagnostic::error("name-clash", message, None);
            if !out.diagnostics.contains(&diag) {
                out.diagnostics.push(diag);
            }
        }
    }

    out
}

fn collect_inherited(env: &dyn TypeEnv, class: ClassId, self_args: Vec<Type>) -> Vec<Inherited> {
    let mut out = Vec::new();
    for inst in class_supertype_walk(env, class, self_args) {
        let Type::Class(ClassType { def, args }) = inst else {
            continue;
        };
        if def == class {
            continue;
        }
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
            if m.is_static {
                continue;
            }
            let (params, return_type) = if raw {
                (
                    erased_param_types(env, m),
                    erasure(env, &m.return_type),
                )
            } else {
                (
                    m.params.iter().map(|p| substitute(env, p, &map)).collect(),
                    substitute(env, &m.return_type, &map),
                )
            };
            out.push(Inherited {
                owner: def,
                declared: m.clone(),
                params,
                return_type,
            });
        }
    }
    out
}

fn owner_simple_name(env: &dyn TypeEnv, id: ClassId) -> String {
    env.class(id)
        .map(|d| simple_name(&d.name).to_string())
        .unwrap_or_else(|| format!("<class#{}>", id.0))
}
