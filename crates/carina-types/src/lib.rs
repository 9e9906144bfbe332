//! Java generics type model and the checking algorithms built on it.
//!
//! This crate is the generics subsystem of the Carina front-end: the type
//! representation (type variables, wildcards, raw and parameterized types,
//! intersections), capture-aware substitution, subtyping and wildcard
//! containment, least-upper-bound computation, bound checking, generic
//! method/constructor/field resolution with inference, and the erasure /
//! bridge-method reconciliation pass.
//!
//! The crate deliberately knows nothing about source syntax or bytecode:
//! declarations arrive through the [`TypeStore`] building API (or through
//! `carina-types-bridge` for already-compiled types), and results leave as
//! resolved signatures, [`BridgeMethod`] lists, and [`Diagnostic`]s.

#![forbid(unsafe_code)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod bounds;
mod bridges;
mod diagnostics;
mod erasure;
mod infer;
mod java;
mod lub;
mod normalize;
mod resolve;
mod store;
mod subst;
mod subtype;

pub use bounds::{
    check_array_creation, check_catch_type, check_class_declaration,
    check_static_type_variable_reference, check_throws_type, check_type_application,
    check_type_param_declarations,
};
pub use bridges::{reconcile_overrides, BridgeMethod, OverrideReconciliation};
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity, Span, TypeWarning, UncheckedReason};
pub use erasure::{erased_param_types, erasure, is_reifiable};
pub use java::env::TyContext;
pub use java::format::{format_type, format_type_args, format_type_param};
pub use java::helpers::{get_class_type, instantiate_supertype};
pub use java::overload::resolve_method_call;
pub use lub::lub;
pub use normalize::{
    canonicalize_named, glb, intersection_component_rank, make_intersection, type_sort_key,
};
pub use resolve::{
    ambiguous_method_diagnostic, resolve_constructor_call, resolve_field, CallKind, MethodCall,
    MethodResolution, ResolvedMethod,
};
pub use store::{
    ChainTypeProvider, ClassDef, ClassKind, ConstructorDef, FieldDef, FieldStub, MethodDef,
    MethodStub, TypeDefStub, TypeEnv, TypeParamDef, TypeProvider, TypeStore, WellKnownTypes,
};
pub use subst::substitute;
pub use subtype::{
    assignment_conversion, cast_conversion, contains, is_assignable, is_subtype, AssignmentCheck,
    CastCheck,
};

/// Arena index of a class or interface declaration in a [`TypeStore`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct ClassId(pub u32);

/// Arena index of a type parameter declaration.
///
/// Ids with the high bit set are context-local capture variables owned by a
/// [`TyContext`]; they never refer into the global [`TypeStore`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct TypeVarId(pub(crate) u32);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

/// A use of a class or interface declaration.
///
/// `args` is empty both for non-generic declarations and for *raw* uses of
/// generic declarations; [`Type::is_raw`] distinguishes the two.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

/// The algebraic type model.
///
/// `Named` is an unresolved nominal reference kept around so partially
/// resolved declarations still type-check; [`canonicalize_named`] upgrades it
/// once the referenced class is known. `Unknown` and `Error` are the
/// fault-tolerance types: they are compatible with everything so one failed
/// expression does not cascade.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Intersection(Vec<Type>),
    Named(String),
    /// The type of the `null` literal; bottom for lub purposes.
    Null,
    Void,
    Unknown,
    Error,
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }

    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub fn char() -> Self {
        Type::Primitive(PrimitiveType::Char)
    }

    pub fn double() -> Self {
        Type::Primitive(PrimitiveType::Double)
    }

    pub fn is_errorish(&self) -> bool {
        matches!(self, Type::Unknown | Type::Error)
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Array(_)
                | Type::TypeVar(_)
                | Type::Intersection(_)
                | Type::Named(_)
                | Type::Null
        )
    }

    /// A raw use of a generic declaration: no arguments supplied even though
    /// the declaration has type parameters.
    pub fn is_raw(&self, env: &dyn TypeEnv) -> bool {
        let Type::Class(ClassType { def, args }) = self else {
            return false;
        };
        args.is_empty()
            && env
                .class(*def)
                .map(|d| !d.type_params.is_empty())
                .unwrap_or(false)
    }

    pub fn has_wildcard_args(&self) -> bool {
        match self {
            Type::Class(ClassType { args, .. }) => {
                args.iter().any(|a| matches!(a, Type::Wildcard(_)))
            }
            _ => false,
        }
    }
}
