use std::collections::HashMap;
use std::fmt;

use crate::{
    canonicalize_named, make_intersection, substitute, type_sort_key, CallKind, ClassId, ClassType,
    FieldDef, Type, TypeEnv, TypeParamDef, TypeVarId, WildcardBound,
};

/// Per-check typing context used by member resolution and inference.
///
/// Side-effect free with respect to the global [`crate::TypeStore`]: capture
/// conversion allocates context-local type parameters that die with the
/// context. Captures from two different contexts (or two different capture
/// operations in one context) never compare equal, which is exactly the
/// freshness the language requires of wildcard captures.
pub struct TyContext<'env> {
    base: &'env dyn TypeEnv,
    locals: Vec<TypeParamDef>,
}

impl fmt::Debug for TyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TyContext")
            .field("locals", &self.locals)
            .finish_non_exhaustive()
    }
}

impl<'env> TyContext<'env> {
    pub fn new(base: &'env dyn TypeEnv) -> Self {
        Self {
            base,
            locals: Vec::new(),
        }
    }

    /// Clear all context-local allocations.
    ///
    /// Callers that want deterministic ids across repeated invocations should
    /// prefer a fresh context per invocation; `reset` exists for reuse.
    pub fn reset(&mut self) {
        self.locals.clear();
    }

    fn alloc_capture(&mut self) -> TypeVarId {
        let idx: u32 = self
            .locals
            .len()
            .try_into()
            .expect("too many context-local type params");
        let id = TypeVarId::new_context_local(idx);
        self.locals.push(TypeParamDef {
            name: format!("CAP#{}", idx),
            upper_bounds: vec![],
            lower_bound: None,
        });
        id
    }

    fn define_capture(&mut self, id: TypeVarId, upper_bounds: Vec<Type>, lower_bound: Option<Type>) {
        let idx = id
            .context_local_index()
            .expect("define_capture requires a context-local id");
        self.locals[idx].upper_bounds = upper_bounds;
        self.locals[idx].lower_bound = lower_bound;
    }

    /// Capture conversion for parameterized types containing wildcards
    /// (JLS 5.1.10).
    ///
    /// Two-pass: every wildcard position gets its capture variable allocated
    /// first, then bounds are defined with the capture substitution applied,
    /// so self-referential formal bounds (`E extends EnumLike<E>`) close over
    /// the capture itself. Upper bound lists are normalized deterministically
    /// regardless of the declared bound order.
    pub fn capture_conversion(&mut self, ty: &Type) -> Type {
        let Type::Class(ClassType { def, args }) = ty else {
            return ty.clone();
        };

        if args.iter().all(|a| !matches!(a, Type::Wildcard(_))) {
            return ty.clone();
        }

        let Some(class_def) = self.class(*def) else {
            return ty.clone();
        };
        if class_def.type_params.len() != args.len() {
            return ty.clone();
        }
        let formals: Vec<TypeVarId> = class_def.type_params.clone();

        // Pass 1: allocate captures, build the substitution map.
        let mut new_args: Vec<Type> = Vec::with_capacity(args.len());
        let mut captures: Vec<Option<TypeVarId>> = Vec::with_capacity(args.len());
        for arg in args {
            if matches!(arg, Type::Wildcard(_)) {
                let cap = self.alloc_capture();
                captures.push(Some(cap));
                new_args.push(Type::TypeVar(cap));
            } else {
                captures.push(None);
                new_args.push(arg.clone());
            }
        }
        let mut map: HashMap<TypeVarId, Type> = HashMap::with_capacity(formals.len());
        for (formal, new_arg) in formals.iter().copied().zip(new_args.iter()) {
            map.insert(formal, new_arg.clone());
        }

        // Pass 2: compute each capture's bounds with the map applied, then
        // write the definitions.
        let mut defs: Vec<(TypeVarId, Vec<Type>, Option<Type>)> = Vec::new();
        for (idx, arg) in args.iter().enumerate() {
            let Some(cap) = captures[idx] else {
                continue;
            };
            let formal_bounds: Vec<Type> = self
                .type_param(formals[idx])
                .map(|d| d.upper_bounds.clone())
                .unwrap_or_default();
            let env: &dyn TypeEnv = self;
            let mut substituted: Vec<Type> = formal_bounds
                .iter()
                .map(|b| substitute(env, b, &map))
                .collect();

            let (upper, lower) = match arg {
                Type::Wildcard(WildcardBound::Unbounded) => {
                    (normalized_bounds(env, substituted), None)
                }
                Type::Wildcard(WildcardBound::Extends(wb)) => {
                    substituted.push((**wb).clone());
                    (normalized_bounds(env, substituted), None)
                }
                Type::Wildcard(WildcardBound::Super(lb)) => (
                    normalized_bounds(env, substituted),
                    Some((**lb).clone()),
                ),
                _ => continue,
            };
            defs.push((cap, upper, lower));
        }
        for (cap, upper, lower) in defs {
            self.define_capture(cap, upper, lower);
        }

        Type::class(*def, new_args)
    }

    /// Resolve a field access against `receiver`, applying capture conversion
    /// first.
    pub fn resolve_field(
        &mut self,
        receiver: &Type,
        name: &str,
        call_kind: CallKind,
    ) -> Option<FieldDef> {
        let receiver = canonicalize_named(self, receiver);
        let receiver = self.capture_conversion(&receiver);
        crate::resolve_field(self, &receiver, name, call_kind)
    }

    /// Flatten a receiver type into the ordered list of class types member
    /// lookup should search: resolve names, capture wildcards, expand type
    /// variable bounds (class bound first, errorish bounds dropped when a
    /// real bound exists), split intersections.
    pub(crate) fn normalize_receiver_for_member_access(&mut self, receiver: &Type) -> Vec<Type> {
        let receiver = canonicalize_named(self, receiver);
        let receiver = self.capture_conversion(&receiver);
        let mut parts = Vec::new();
        self.expand_receiver(&receiver, &mut parts, 0);
        parts
    }

    fn expand_receiver(&mut self, ty: &Type, parts: &mut Vec<Type>, depth: usize) {
        if depth > 16 {
            return;
        }
        match ty {
            Type::TypeVar(id) => {
                let bounds = self
                    .type_param(*id)
                    .map(|d| d.upper_bounds.clone())
                    .unwrap_or_default();
                let mut real: Vec<Type> = bounds.iter().filter(|b| !b.is_errorish()).cloned().collect();
                if real.is_empty() {
                    real = bounds;
                }
                real.sort_by_cached_key(|t| {
                    (
                        crate::intersection_component_rank(self, t),
                        type_sort_key(self, t),
                    )
                });
                for bound in &real {
                    let bound = self.capture_conversion(bound);
                    self.expand_receiver(&bound, parts, depth + 1);
                }
            }
            Type::Intersection(members) => {
                let normalized = make_intersection(self, members.clone());
                match normalized {
                    Type::Intersection(members) => {
                        for member in &members {
                            let member = self.capture_conversion(member);
                            self.expand_receiver(&member, parts, depth + 1);
                        }
                    }
                    other => self.expand_receiver(&other, parts, depth + 1),
                }
            }
            Type::Wildcard(WildcardBound::Extends(b)) => {
                let b = (**b).clone();
                self.expand_receiver(&b, parts, depth + 1)
            }
            Type::Wildcard(_) => {
                let object = Type::class(self.well_known().object, vec![]);
                if !parts.contains(&object) {
                    parts.push(object);
                }
            }
            other => {
                if !parts.contains(other) {
                    parts.push(other.clone());
                }
            }
        }
    }
}

fn normalized_bounds(env: &dyn TypeEnv, bounds: Vec<Type>) -> Vec<Type> {
    let object = Type::class(env.well_known().object, vec![]);
    let normalized = make_intersection(env, bounds);
    if normalized == object {
        return vec![object];
    }
    crate::normalize::into_bound_list(normalized)
}

impl TypeEnv for TyContext<'_> {
    fn class(&self, id: ClassId) -> Option<&crate::ClassDef> {
        self.base.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if let Some(idx) = id.context_local_index() {
            return self.locals.get(idx);
        }
        self.base.type_param(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.base.lookup_class(name)
    }

    fn well_known(&self) -> &crate::WellKnownTypes {
        self.base.well_known()
    }
}

impl TypeVarId {
    const CONTEXT_LOCAL_BIT: u32 = 1 << 31;

    pub(crate) fn new_context_local(index: u32) -> Self {
        Self(Self::CONTEXT_LOCAL_BIT | index)
    }

    pub(crate) fn context_local_index(self) -> Option<usize> {
        if (self.0 & Self::CONTEXT_LOCAL_BIT) == 0 {
            return None;
        }
        Some((self.0 & !Self::CONTEXT_LOCAL_BIT) as usize)
    }
}
