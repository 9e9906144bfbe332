//! On-demand translation of compiled-type stubs into `carina-types`
//! definitions.
//!
//! A [`TypeProvider`] hands back [`TypeDefStub`]s (names, descriptors,
//! generic signature strings, access flags); the loader turns them into
//! [`ClassDef`]s, pulling referenced types into the store as it goes.
//!
//! Bound validation is deliberately *not* performed while a closure of
//! compiled types is loading: a member type's bounds may reference type
//! variables of an enclosing type that has not finished building. Bounds of
//! imported declarations are validated lazily, if and when a source
//! declaration references them (`check_type_application`); drivers that want
//! eager validation can run `check_class_declaration` over
//! [`ExternalTypeLoader::loaded_classes`] once loading settles.

#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::trace;

use carina_signature::{
    parse_class_signature, parse_field_descriptor, parse_field_signature, parse_method_descriptor,
    parse_method_signature, BaseType, ClassTypeSignature, FieldType, MethodDescriptor,
    MethodSignature, ReturnType, TypeArgument, TypeParameter, TypeSignature,
};
use carina_types::{
    ClassDef, ClassId, ClassKind, ConstructorDef, FieldDef, MethodDef, PrimitiveType, Type,
    TypeDefStub, TypeEnv, TypeParamDef, TypeProvider, TypeStore, TypeVarId, WildcardBound,
};

const ACC_INTERFACE: u16 = 0x0200;
const ACC_PRIVATE: u16 = 0x0002;
const ACC_FINAL: u16 = 0x0010;
const ACC_STATIC: u16 = 0x0008;
const ACC_VARARGS: u16 = 0x0080;
const ACC_ABSTRACT: u16 = 0x0400;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("no provider knows the type {0}")]
    UnknownType(String),
}

/// Loads external [`TypeProvider`] stubs into a [`TypeStore`] on demand.
pub struct ExternalTypeLoader<'a> {
    store: &'a mut TypeStore,
    provider: &'a dyn TypeProvider,
    in_progress: HashSet<String>,
    loaded: Vec<ClassId>,
    loaded_names: HashSet<String>,
}

impl<'a> ExternalTypeLoader<'a> {
    pub fn new(store: &'a mut TypeStore, provider: &'a dyn TypeProvider) -> Self {
        Self {
            store,
            provider,
            in_progress: HashSet::new(),
            loaded: Vec::new(),
            loaded_names: HashSet::new(),
        }
    }

    pub fn store(&self) -> &TypeStore {
        self.store
    }

    /// Classes this loader defined, in load order. Bounds of these
    /// declarations have *not* been validated; see the crate docs.
    pub fn loaded_classes(&self) -> &[ClassId] {
        &self.loaded
    }

    /// Ensure `binary_name` is present in the store; `None` when no provider
    /// knows it and it is not already defined.
    pub fn ensure_class(&mut self, binary_name: &str) -> Option<ClassId> {
        self.load(binary_name).ok()
    }

    pub fn load(&mut self, binary_name: &str) -> Result<ClassId, LoadError> {
        if self.loaded_names.contains(binary_name) || self.in_progress.contains(binary_name) {
            return self
                .store
                .lookup_class(binary_name)
                .ok_or_else(|| LoadError::UnknownType(binary_name.to_string()));
        }

        let existing = self.store.lookup_class(binary_name);
        let Some(stub) = self.provider.lookup_type(binary_name) else {
            return existing.ok_or_else(|| LoadError::UnknownType(binary_name.to_string()));
        };

        let id = self.store.intern_class_id(binary_name);
        self.in_progress.insert(binary_name.to_string());
        trace!(name = binary_name, "loading external type");

        let def = self.class_def(binary_name, &stub);
        self.store.define_class(id, def);

        self.in_progress.remove(binary_name);
        self.loaded_names.insert(binary_name.to_string());
        self.loaded.push(id);

        Ok(id)
    }

    fn class_def(&mut self, binary_name: &str, stub: &TypeDefStub) -> ClassDef {
        let kind = if stub.access_flags & ACC_INTERFACE != 0 {
            ClassKind::Interface
        } else {
            ClassKind::Class
        };

        let mut class_vars = HashMap::<String, TypeVarId>::new();
        let no_method_vars = HashMap::<String, TypeVarId>::new();
        let mut type_params = Vec::new();

        let parsed = stub
            .signature
            .as_deref()
            .and_then(|sig| parse_class_signature(sig).ok());

        let (super_class, interfaces) = match parsed {
            Some(sig) => {
                self.allocate_type_params(&sig.type_parameters, &mut class_vars, &mut type_params);
                self.define_type_params(&sig.type_parameters, &class_vars, &no_method_vars);

                let super_class = match kind {
                    ClassKind::Interface => None,
                    ClassKind::Class => {
                        Some(self.class_signature_type(&sig.super_class, &class_vars, &no_method_vars))
                    }
                };
                let interfaces = sig
                    .interfaces
                    .iter()
                    .map(|iface| self.class_signature_type(iface, &class_vars, &no_method_vars))
                    .collect();
                (super_class, interfaces)
            }
            None => {
                let super_class = match kind {
                    ClassKind::Interface => None,
                    ClassKind::Class => stub
                        .super_binary_name
                        .as_deref()
                        .map(|name| self.class_ref(name)),
                };
                let interfaces = stub
                    .interfaces
                    .iter()
                    .map(|name| self.class_ref(name))
                    .collect();
                (super_class, interfaces)
            }
        };

        let fields = stub
            .fields
            .iter()
            .map(|field| {
                let ty = field
                    .signature
                    .as_deref()
                    .and_then(|sig| parse_field_signature(sig).ok())
                    .map(|sig| self.signature_type(&sig, &class_vars, &no_method_vars))
                    .or_else(|| {
                        parse_field_descriptor(&field.descriptor)
                            .ok()
                            .map(|desc| self.descriptor_type(&desc))
                    })
                    .unwrap_or(Type::Unknown);

                FieldDef {
                    name: field.name.clone(),
                    ty,
                    is_static: field.access_flags & ACC_STATIC != 0,
                    is_final: field.access_flags & ACC_FINAL != 0,
                }
            })
            .collect::<Vec<_>>();

        let mut methods = Vec::new();
        let mut constructors = Vec::new();
        for method in &stub.methods {
            match method.name.as_str() {
                "<clinit>" => continue,
                "<init>" => constructors.push(self.constructor_def(method, &class_vars)),
                _ => methods.push(self.method_def(method, &class_vars)),
            }
        }

        ClassDef {
            name: binary_name.to_string(),
            kind,
            type_params,
            super_class,
            interfaces,
            fields,
            constructors,
            methods,
        }
    }

    /// Two-pass type parameter construction: ids exist before bounds are
    /// translated, so self-referential bounds (`T extends Comparable<T>`)
    /// resolve to the variable being defined.
    fn allocate_type_params(
        &mut self,
        params: &[TypeParameter],
        vars: &mut HashMap<String, TypeVarId>,
        out: &mut Vec<TypeVarId>,
    ) {
        let placeholder = vec![self.object_type()];
        for tp in params {
            let id = self.store.add_type_param(tp.name.clone(), placeholder.clone());
            vars.insert(tp.name.clone(), id);
            out.push(id);
        }
    }

    fn define_type_params(
        &mut self,
        params: &[TypeParameter],
        class_vars: &HashMap<String, TypeVarId>,
        method_vars: &HashMap<String, TypeVarId>,
    ) {
        for tp in params {
            let Some(id) = method_vars
                .get(&tp.name)
                .or_else(|| class_vars.get(&tp.name))
                .copied()
            else {
                continue;
            };
            let bounds = self.bound_types(tp, class_vars, method_vars);
            self.store.define_type_param(
                id,
                TypeParamDef {
                    name: tp.name.clone(),
                    upper_bounds: bounds,
                    lower_bound: None,
                },
            );
        }
    }

    fn bound_types(
        &mut self,
        tp: &TypeParameter,
        class_vars: &HashMap<String, TypeVarId>,
        method_vars: &HashMap<String, TypeVarId>,
    ) -> Vec<Type> {
        let mut out = Vec::new();
        match &tp.class_bound {
            Some(bound) => out.push(self.signature_type(bound, class_vars, method_vars)),
            None if tp.interface_bounds.is_empty() => out.push(self.object_type()),
            None => {}
        }
        out.extend(
            tp.interface_bounds
                .iter()
                .map(|b| self.signature_type(b, class_vars, method_vars)),
        );
        out
    }

    fn constructor_def(
        &mut self,
        stub: &carina_types::MethodStub,
        class_vars: &HashMap<String, TypeVarId>,
    ) -> ConstructorDef {
        let is_varargs = stub.access_flags & ACC_VARARGS != 0;
        let is_accessible = stub.access_flags & ACC_PRIVATE == 0;
        let no_method_vars = HashMap::<String, TypeVarId>::new();

        if let Some(sig) = stub
            .signature
            .as_deref()
            .and_then(|s| parse_method_signature(s).ok())
        {
            let params = sig
                .parameters
                .iter()
                .map(|p| self.signature_type(p, class_vars, &no_method_vars))
                .collect();
            return ConstructorDef {
                params,
                is_varargs,
                is_accessible,
            };
        }

        let params = parse_method_descriptor(&stub.descriptor)
            .ok()
            .map(|d| self.descriptor_types(&d).0)
            .unwrap_or_default();

        ConstructorDef {
            params,
            is_varargs,
            is_accessible,
        }
    }

    fn method_def(
        &mut self,
        stub: &carina_types::MethodStub,
        class_vars: &HashMap<String, TypeVarId>,
    ) -> MethodDef {
        let is_static = stub.access_flags & ACC_STATIC != 0;
        let is_varargs = stub.access_flags & ACC_VARARGS != 0;
        let is_abstract = stub.access_flags & ACC_ABSTRACT != 0;

        if let Some(sig) = stub
            .signature
            .as_deref()
            .and_then(|s| parse_method_signature(s).ok())
        {
            let (type_params, method_vars) = self.method_type_params(&sig, class_vars);

            let params = sig
                .parameters
                .iter()
                .map(|p| self.signature_type(p, class_vars, &method_vars))
                .collect();
            let return_type = sig
                .return_type
                .as_ref()
                .map(|rt| self.signature_type(rt, class_vars, &method_vars))
                .unwrap_or(Type::Void);

            return MethodDef {
                name: stub.name.clone(),
                type_params,
                params,
                return_type,
                is_static,
                is_varargs,
                is_abstract,
            };
        }

        let (params, return_type) = parse_method_descriptor(&stub.descriptor)
            .ok()
            .map(|d| self.descriptor_types(&d))
            .unwrap_or_else(|| (Vec::new(), Type::Unknown));

        MethodDef {
            name: stub.name.clone(),
            type_params: Vec::new(),
            params,
            return_type,
            is_static,
            is_varargs,
            is_abstract,
        }
    }

    fn method_type_params(
        &mut self,
        sig: &MethodSignature,
        class_vars: &HashMap<String, TypeVarId>,
    ) -> (Vec<TypeVarId>, HashMap<String, TypeVarId>) {
        let mut method_vars = HashMap::<String, TypeVarId>::new();
        let mut type_params = Vec::new();
        self.allocate_type_params(&sig.type_parameters, &mut method_vars, &mut type_params);
        self.define_type_params(&sig.type_parameters, class_vars, &method_vars);
        (type_params, method_vars)
    }

    fn object_type(&mut self) -> Type {
        Type::class(self.store.well_known().object, vec![])
    }

    fn class_ref(&mut self, binary_name: &str) -> Type {
        self.ensure_class(binary_name)
            .map(|id| Type::class(id, vec![]))
            .unwrap_or_else(|| Type::Named(binary_name.to_string()))
    }

    fn internal_to_binary(internal: &str) -> String {
        internal.replace('/', ".")
    }

    fn class_signature_type(
        &mut self,
        sig: &ClassTypeSignature,
        class_vars: &HashMap<String, TypeVarId>,
        method_vars: &HashMap<String, TypeVarId>,
    ) -> Type {
        let binary_name = Self::internal_to_binary(&sig.internal_name());

        // Member type signatures can carry arguments on outer segments; the
        // model parameterizes the leaf class only, so outer arguments are
        // dropped here.
        let args = sig
            .segments
            .last()
            .map(|seg| {
                seg.type_arguments
                    .iter()
                    .map(|arg| self.argument_type(arg, class_vars, method_vars))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        match self.ensure_class(&binary_name) {
            Some(id) => Type::class(id, args),
            None => Type::Named(binary_name),
        }
    }

    fn argument_type(
        &mut self,
        arg: &TypeArgument,
        class_vars: &HashMap<String, TypeVarId>,
        method_vars: &HashMap<String, TypeVarId>,
    ) -> Type {
        match arg {
            TypeArgument::Any => Type::Wildcard(WildcardBound::Unbounded),
            TypeArgument::Exact(ty) => self.signature_type(ty, class_vars, method_vars),
            TypeArgument::Extends(ty) => Type::Wildcard(WildcardBound::Extends(Box::new(
                self.signature_type(ty, class_vars, method_vars),
            ))),
            TypeArgument::Super(ty) => Type::Wildcard(WildcardBound::Super(Box::new(
                self.signature_type(ty, class_vars, method_vars),
            ))),
        }
    }

    fn signature_type(
        &mut self,
        sig: &TypeSignature,
        class_vars: &HashMap<String, TypeVarId>,
        method_vars: &HashMap<String, TypeVarId>,
    ) -> Type {
        match sig {
            TypeSignature::Base(base) => Type::Primitive(primitive_of(*base)),
            TypeSignature::Array(elem) => {
                Type::Array(Box::new(self.signature_type(elem, class_vars, method_vars)))
            }
            TypeSignature::Class(cls) => self.class_signature_type(cls, class_vars, method_vars),
            TypeSignature::TypeVariable(name) => method_vars
                .get(name)
                .or_else(|| class_vars.get(name))
                .copied()
                .map(Type::TypeVar)
                .unwrap_or(Type::Unknown),
        }
    }

    fn descriptor_types(&mut self, desc: &MethodDescriptor) -> (Vec<Type>, Type) {
        let params = desc.params.iter().map(|p| self.field_type(p)).collect();
        let return_type = match &desc.return_type {
            ReturnType::Void => Type::Void,
            ReturnType::Type(ty) => self.field_type(ty),
        };
        (params, return_type)
    }

    fn descriptor_type(&mut self, ty: &FieldType) -> Type {
        self.field_type(ty)
    }

    fn field_type(&mut self, ty: &FieldType) -> Type {
        match ty {
            FieldType::Base(base) => Type::Primitive(primitive_of(*base)),
            FieldType::Array(elem) => Type::Array(Box::new(self.field_type(elem))),
            FieldType::Object(internal) => {
                let binary = Self::internal_to_binary(internal);
                self.ensure_class(&binary)
                    .map(|id| Type::class(id, vec![]))
                    .unwrap_or_else(|| Type::Named(binary))
            }
        }
    }
}

fn primitive_of(base: BaseType) -> PrimitiveType {
    match base {
        BaseType::Byte => PrimitiveType::Byte,
        BaseType::Char => PrimitiveType::Char,
        BaseType::Double => PrimitiveType::Double,
        BaseType::Float => PrimitiveType::Float,
        BaseType::Int => PrimitiveType::Int,
        BaseType::Long => PrimitiveType::Long,
        BaseType::Short => PrimitiveType::Short,
        BaseType::Boolean => PrimitiveType::Boolean,
    }
}
