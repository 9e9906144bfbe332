//! Java-like rendering of types for diagnostics.
//!
//! Messages render *simple* names (`List<String>`, not
//! `java.util.List<java.lang.String>`), matching what compiler diagnostics
//! print. The wording of every message built on top of these formatters is a
//! stable contract; change with care.

use crate::{ClassType, Type, TypeEnv, TypeVarId, WildcardBound};

pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => p.name().to_string(),
        Type::Class(ClassType { def, args }) => {
            let name = env
                .class(*def)
                .map(|d| simple_name(&d.name).to_string())
                .unwrap_or_else(|| format!("<class#{}>", def.0));
            if args.is_empty() {
                name
            } else {
                format!("{name}<{}>", format_type_args(env, args))
            }
        }
        Type::Array(elem) => format!("{}[]", format_type(env, elem)),
        Type::TypeVar(id) => env
            .type_param(*id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("<tv#{}>", id.0)),
        Type::Wildcard(WildcardBound::Unbounded) => "?".to_string(),
        Type::Wildcard(WildcardBound::Extends(b)) => {
            format!("? extends {}", format_type(env, b))
        }
        Type::Wildcard(WildcardBound::Super(b)) => format!("? super {}", format_type(env, b)),
        Type::Intersection(parts) => {
            let rendered: Vec<String> = parts.iter().map(|p| format_type(env, p)).collect();
            rendered.join(" & ")
        }
        Type::Named(name) => simple_name(name).to_string(),
        Type::Null => "null".to_string(),
        Type::Void => "void".to_string(),
        Type::Unknown => "<unknown>".to_string(),
        Type::Error => "<error>".to_string(),
    }
}

/// Comma-joined argument list, without the surrounding angle brackets.
pub fn format_type_args(env: &dyn TypeEnv, args: &[Type]) -> String {
    let rendered: Vec<String> = args.iter().map(|a| format_type(env, a)).collect();
    rendered.join(", ")
}

/// A type parameter as declared, e.g. `T extends Number & Comparable<T>`.
/// Trivially bounded parameters render as just the name.
pub fn format_type_param(env: &dyn TypeEnv, id: TypeVarId) -> String {
    let Some(def) = env.type_param(id) else {
        return format!("<tv#{}>", id.0);
    };
    let object = Type::class(env.well_known().object, vec![]);
    let bounds: Vec<&Type> = def
        .upper_bounds
        .iter()
        .filter(|b| **b != object && !b.is_errorish())
        .collect();
    if bounds.is_empty() {
        return def.name.clone();
    }
    let rendered: Vec<String> = bounds.iter().map(|b| format_type(env, b)).collect();
    format!("{} extends {}", def.name, rendered.join(" & "))
}

/// `name` with its declared parameter list, e.g. `X<T, U>`.
pub(crate) fn generic_decl_name(env: &dyn TypeEnv, def: crate::ClassId) -> String {
    let Some(class) = env.class(def) else {
        return format!("<class#{}>", def.0);
    };
    if class.type_params.is_empty() {
        return simple_name(&class.name).to_string();
    }
    let params: Vec<String> = class
        .type_params
        .iter()
        .map(|tp| {
            env.type_param(*tp)
                .map(|d| d.name.clone())
                .unwrap_or_default()
        })
        .collect();
    format!("{}<{}>", simple_name(&class.name), params.join(", "))
}

/// `m(String, int)`-style rendering for resolution diagnostics.
pub(crate) fn method_signature(env: &dyn TypeEnv, name: &str, params: &[Type]) -> String {
    format!("{name}({})", format_type_args(env, params))
}

pub(crate) fn simple_name(binary_name: &str) -> &str {
    let after_dot = binary_name.rsplit('.').next().unwrap_or(binary_name);
    after_dot.rsplit('$').next().unwrap_or(after_dot)
}
