//! Declaration storage: the arena of classes and type parameters.
//!
//! Declarations are created once and immutable thereafter as far as the
//! checking algorithms are concerned; the two-pass `intern`/`define` API
//! exists so self-referential bounds (`T extends Comparable<T>`,
//! `E extends EnumLike<E>`) can be built before the reference they close
//! over is complete.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ClassId, Type, TypeVarId, WildcardBound};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
}

/// A type parameter declaration.
///
/// `lower_bound` is only ever populated for capture variables; source-level
/// type parameters have upper bounds only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Binary name, e.g. `java.util.List` or `com.example.Outer$Inner`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDef {
    pub params: Vec<Type>,
    pub is_varargs: bool,
    pub is_accessible: bool,
}

/// Classes every checking algorithm needs to be able to name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub number: ClassId,
    pub integer: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub throwable: ClassId,
    pub runtime_class: ClassId,
}

/// Read-only view of declarations, implemented by [`TypeStore`] and by the
/// per-check [`crate::TyContext`].
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

/// The per-compilation declaration arena.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeStore {
    classes: Vec<Option<ClassDef>>,
    class_names: Vec<String>,
    classes_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        let mut store = TypeStore {
            classes: Vec::new(),
            class_names: Vec::new(),
            classes_by_name: HashMap::new(),
            type_params: Vec::new(),
            well_known: WellKnownTypes {
                object: ClassId(0),
                string: ClassId(0),
                number: ClassId(0),
                integer: ClassId(0),
                cloneable: ClassId(0),
                serializable: ClassId(0),
                throwable: ClassId(0),
                runtime_class: ClassId(0),
            },
        };

        // Reserve stable ids for the well-known classes up front so the
        // `WellKnownTypes` handles are valid even before anything is defined.
        store.well_known = WellKnownTypes {
            object: store.intern_class_id("java.lang.Object"),
            string: store.intern_class_id("java.lang.String"),
            number: store.intern_class_id("java.lang.Number"),
            integer: store.intern_class_id("java.lang.Integer"),
            cloneable: store.intern_class_id("java.lang.Cloneable"),
            serializable: store.intern_class_id("java.io.Serializable"),
            throwable: store.intern_class_id("java.lang.Throwable"),
            runtime_class: store.intern_class_id("java.lang.Class"),
        };
        store
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize).and_then(|c| c.as_ref())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if id.context_local_index().is_some() {
            return None;
        }
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.classes_by_name.get(name).copied()
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

impl TypeStore {
    /// Reserve an id for `name`, creating an undefined placeholder on first
    /// use. Idempotent.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.classes_by_name.get(name) {
            return *id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(None);
        self.class_names.push(name.to_string());
        self.classes_by_name.insert(name.to_string(), id);
        id
    }

    /// Fill in (or overwrite) the definition behind a previously interned id.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        self.classes[id.0 as usize] = Some(def);
    }

    /// Intern + define in one step.
    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    /// Define `def`, reusing the existing id when the name is already known.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        self.add_class(def)
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize).and_then(|c| c.as_mut())
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.classes_by_name.get(name).copied()
    }

    pub fn class_name(&self, id: ClassId) -> Option<&str> {
        self.class_names.get(id.0 as usize).map(|s| s.as_str())
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    /// Overwrite a type parameter allocated earlier; used for
    /// self-referential bounds that need the id before the bound exists.
    pub fn define_type_param(&mut self, id: TypeVarId, def: TypeParamDef) {
        self.type_params[id.0 as usize] = def;
    }

    /// A hand-built model of the handful of JDK types the engine's own tests
    /// and defaults rely on. Real drivers load the platform through
    /// `carina-types-bridge` instead.
    pub fn with_minimal_jdk() -> TypeStore {
        let mut s = TypeStore::default();
        let wk = s.well_known;
        let object = Type::class(wk.object, vec![]);

        s.define_class(
            wk.object,
            ClassDef {
                name: "java.lang.Object".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![ConstructorDef {
                    params: vec![],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![
                    MethodDef {
                        name: "equals".to_string(),
                        type_params: vec![],
                        params: vec![object.clone()],
                        return_type: Type::boolean(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "hashCode".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "toString".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::class(wk.string, vec![]),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
            },
        );

        s.define_class(
            wk.serializable,
            ClassDef {
                name: "java.io.Serializable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![],
            },
        );
        s.define_class(
            wk.cloneable,
            ClassDef {
                name: "java.lang.Cloneable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![],
            },
        );

        let char_sequence = s.intern_class_id("java.lang.CharSequence");
        s.define_class(
            char_sequence,
            ClassDef {
                name: "java.lang.CharSequence".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![
                    MethodDef {
                        name: "length".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "charAt".to_string(),
                        type_params: vec![],
                        params: vec![Type::int()],
                        return_type: Type::char(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                ],
            },
        );

        let comparable = s.intern_class_id("java.lang.Comparable");
        let comparable_t = s.add_type_param("T", vec![object.clone()]);
        s.define_class(
            comparable,
            ClassDef {
                name: "java.lang.Comparable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![comparable_t],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![MethodDef {
                    name: "compareTo".to_string(),
                    type_params: vec![],
                    params: vec![Type::TypeVar(comparable_t)],
                    return_type: Type::int(),
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                }],
            },
        );

        let runnable = s.intern_class_id("java.lang.Runnable");
        s.define_class(
            runnable,
            ClassDef {
                name: "java.lang.Runnable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![MethodDef {
                    name: "run".to_string(),
                    type_params: vec![],
                    params: vec![],
                    return_type: Type::Void,
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                }],
            },
        );

        let iterable = s.intern_class_id("java.lang.Iterable");
        let iterable_t = s.add_type_param("T", vec![object.clone()]);
        s.define_class(
            iterable,
            ClassDef {
                name: "java.lang.Iterable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![iterable_t],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![],
            },
        );

        let collection = s.intern_class_id("java.util.Collection");
        let collection_e = s.add_type_param("E", vec![object.clone()]);
        s.define_class(
            collection,
            ClassDef {
                name: "java.util.Collection".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![collection_e],
                super_class: None,
                interfaces: vec![Type::class(iterable, vec![Type::TypeVar(collection_e)])],
                fields: vec![],
                constructors: vec![],
                methods: vec![
                    MethodDef {
                        name: "size".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "isEmpty".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::boolean(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "add".to_string(),
                        type_params: vec![],
                        params: vec![Type::TypeVar(collection_e)],
                        return_type: Type::boolean(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "contains".to_string(),
                        type_params: vec![],
                        params: vec![object.clone()],
                        return_type: Type::boolean(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                ],
            },
        );

        let list = s.intern_class_id("java.util.List");
        let list_e = s.add_type_param("E", vec![object.clone()]);
        s.define_class(
            list,
            ClassDef {
                name: "java.util.List".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![list_e],
                super_class: None,
                interfaces: vec![Type::class(collection, vec![Type::TypeVar(list_e)])],
                fields: vec![],
                constructors: vec![],
                methods: vec![
                    MethodDef {
                        name: "get".to_string(),
                        type_params: vec![],
                        params: vec![Type::int()],
                        return_type: Type::TypeVar(list_e),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "set".to_string(),
                        type_params: vec![],
                        params: vec![Type::int(), Type::TypeVar(list_e)],
                        return_type: Type::TypeVar(list_e),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "indexOf".to_string(),
                        type_params: vec![],
                        params: vec![object.clone()],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                ],
            },
        );

        let array_list = s.intern_class_id("java.util.ArrayList");
        let array_list_e = s.add_type_param("E", vec![object.clone()]);
        s.define_class(
            array_list,
            ClassDef {
                name: "java.util.ArrayList".to_string(),
                kind: ClassKind::Class,
                type_params: vec![array_list_e],
                super_class: Some(object.clone()),
                interfaces: vec![Type::class(list, vec![Type::TypeVar(array_list_e)])],
                fields: vec![],
                constructors: vec![
                    ConstructorDef {
                        params: vec![],
                        is_varargs: false,
                        is_accessible: true,
                    },
                    ConstructorDef {
                        params: vec![Type::int()],
                        is_varargs: false,
                        is_accessible: true,
                    },
                    ConstructorDef {
                        params: vec![Type::class(
                            collection,
                            vec![Type::Wildcard(WildcardBound::Extends(Box::new(
                                Type::TypeVar(array_list_e),
                            )))],
                        )],
                        is_varargs: false,
                        is_accessible: true,
                    },
                ],
                methods: vec![],
            },
        );

        let map = s.intern_class_id("java.util.Map");
        let map_k = s.add_type_param("K", vec![object.clone()]);
        let map_v = s.add_type_param("V", vec![object.clone()]);
        s.define_class(
            map,
            ClassDef {
                name: "java.util.Map".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![map_k, map_v],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![
                    MethodDef {
                        name: "get".to_string(),
                        type_params: vec![],
                        params: vec![object.clone()],
                        return_type: Type::TypeVar(map_v),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "put".to_string(),
                        type_params: vec![],
                        params: vec![Type::TypeVar(map_k), Type::TypeVar(map_v)],
                        return_type: Type::TypeVar(map_v),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                ],
            },
        );

        let function = s.intern_class_id("java.util.function.Function");
        let function_t = s.add_type_param("T", vec![object.clone()]);
        let function_r = s.add_type_param("R", vec![object.clone()]);
        s.define_class(
            function,
            ClassDef {
                name: "java.util.function.Function".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![function_t, function_r],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![MethodDef {
                    name: "apply".to_string(),
                    type_params: vec![],
                    params: vec![Type::TypeVar(function_t)],
                    return_type: Type::TypeVar(function_r),
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                }],
            },
        );

        s.define_class(
            wk.string,
            ClassDef {
                name: "java.lang.String".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object.clone()),
                interfaces: vec![
                    Type::class(char_sequence, vec![]),
                    Type::class(comparable, vec![Type::class(wk.string, vec![])]),
                    Type::class(wk.serializable, vec![]),
                ],
                fields: vec![],
                constructors: vec![ConstructorDef {
                    params: vec![],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![
                    MethodDef {
                        name: "length".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "charAt".to_string(),
                        type_params: vec![],
                        params: vec![Type::int()],
                        return_type: Type::char(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "compareTo".to_string(),
                        type_params: vec![],
                        params: vec![Type::class(wk.string, vec![])],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "concat".to_string(),
                        type_params: vec![],
                        params: vec![Type::class(wk.string, vec![])],
                        return_type: Type::class(wk.string, vec![]),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
            },
        );

        s.define_class(
            wk.number,
            ClassDef {
                name: "java.lang.Number".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object.clone()),
                interfaces: vec![Type::class(wk.serializable, vec![])],
                fields: vec![],
                constructors: vec![ConstructorDef {
                    params: vec![],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![
                    MethodDef {
                        name: "intValue".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    MethodDef {
                        name: "doubleValue".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::double(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                ],
            },
        );

        s.define_class(
            wk.integer,
            ClassDef {
                name: "java.lang.Integer".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(Type::class(wk.number, vec![])),
                interfaces: vec![Type::class(comparable, vec![Type::class(wk.integer, vec![])])],
                fields: vec![FieldDef {
                    name: "MAX_VALUE".to_string(),
                    ty: Type::int(),
                    is_static: true,
                    is_final: true,
                }],
                constructors: vec![
                    ConstructorDef {
                        params: vec![Type::int()],
                        is_varargs: false,
                        is_accessible: true,
                    },
                    ConstructorDef {
                        params: vec![Type::class(wk.string, vec![])],
                        is_varargs: false,
                        is_accessible: true,
                    },
                ],
                methods: vec![
                    MethodDef {
                        name: "intValue".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "doubleValue".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::double(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "compareTo".to_string(),
                        type_params: vec![],
                        params: vec![Type::class(wk.integer, vec![])],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "parseInt".to_string(),
                        type_params: vec![],
                        params: vec![Type::class(wk.string, vec![])],
                        return_type: Type::int(),
                        is_static: true,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
            },
        );

        let double = s.intern_class_id("java.lang.Double");
        s.define_class(
            double,
            ClassDef {
                name: "java.lang.Double".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(Type::class(wk.number, vec![])),
                interfaces: vec![Type::class(comparable, vec![Type::class(double, vec![])])],
                fields: vec![],
                constructors: vec![ConstructorDef {
                    params: vec![Type::double()],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![
                    MethodDef {
                        name: "intValue".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "doubleValue".to_string(),
                        type_params: vec![],
                        params: vec![],
                        return_type: Type::double(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "compareTo".to_string(),
                        type_params: vec![],
                        params: vec![Type::class(double, vec![])],
                        return_type: Type::int(),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
            },
        );

        let boolean = s.intern_class_id("java.lang.Boolean");
        s.define_class(
            boolean,
            ClassDef {
                name: "java.lang.Boolean".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object.clone()),
                interfaces: vec![
                    Type::class(comparable, vec![Type::class(boolean, vec![])]),
                    Type::class(wk.serializable, vec![]),
                ],
                fields: vec![],
                constructors: vec![ConstructorDef {
                    params: vec![Type::boolean()],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![MethodDef {
                    name: "booleanValue".to_string(),
                    type_params: vec![],
                    params: vec![],
                    return_type: Type::boolean(),
                    is_static: false,
                    is_varargs: false,
                    is_abstract: false,
                }],
            },
        );

        let class_t = s.add_type_param("T", vec![object.clone()]);
        s.define_class(
            wk.runtime_class,
            ClassDef {
                name: "java.lang.Class".to_string(),
                kind: ClassKind::Class,
                type_params: vec![class_t],
                super_class: Some(object.clone()),
                interfaces: vec![Type::class(wk.serializable, vec![])],
                fields: vec![],
                constructors: vec![],
                methods: vec![MethodDef {
                    name: "getName".to_string(),
                    type_params: vec![],
                    params: vec![],
                    return_type: Type::class(wk.string, vec![]),
                    is_static: false,
                    is_varargs: false,
                    is_abstract: false,
                }],
            },
        );

        s.define_class(
            wk.throwable,
            ClassDef {
                name: "java.lang.Throwable".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object.clone()),
                interfaces: vec![Type::class(wk.serializable, vec![])],
                fields: vec![],
                constructors: vec![
                    ConstructorDef {
                        params: vec![],
                        is_varargs: false,
                        is_accessible: true,
                    },
                    ConstructorDef {
                        params: vec![Type::class(wk.string, vec![])],
                        is_varargs: false,
                        is_accessible: true,
                    },
                ],
                methods: vec![MethodDef {
                    name: "getMessage".to_string(),
                    type_params: vec![],
                    params: vec![],
                    return_type: Type::class(wk.string, vec![]),
                    is_static: false,
                    is_varargs: false,
                    is_abstract: false,
                }],
            },
        );

        let exception = s.intern_class_id("java.lang.Exception");
        s.define_class(
            exception,
            ClassDef {
                name: "java.lang.Exception".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(Type::class(wk.throwable, vec![])),
                interfaces: vec![],
                fields: vec![],
                constructors: vec![
                    ConstructorDef {
                        params: vec![],
                        is_varargs: false,
                        is_accessible: true,
                    },
                    ConstructorDef {
                        params: vec![Type::class(wk.string, vec![])],
                        is_varargs: false,
                        is_accessible: true,
                    },
                ],
                methods: vec![],
            },
        );

        let runtime_exception = s.intern_class_id("java.lang.RuntimeException");
        s.define_class(
            runtime_exception,
            ClassDef {
                name: "java.lang.RuntimeException".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(Type::class(exception, vec![])),
                interfaces: vec![],
                fields: vec![],
                constructors: vec![ConstructorDef {
                    params: vec![],
                    is_varargs: false,
                    is_accessible: true,
                }],
                methods: vec![],
            },
        );

        s
    }
}

/// The read-only import surface for already-compiled types: just enough of a
/// class file to rebuild a [`ClassDef`] (names, descriptors, generic
/// signature strings, access flags).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefStub {
    pub binary_name: String,
    pub access_flags: u16,
    pub super_binary_name: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStub {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub access_flags: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStub {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub access_flags: u16,
}

pub trait TypeProvider {
    fn lookup_type(&self, binary_name: &str) -> Option<TypeDefStub>;
}

/// First-match-wins composition of providers (dependencies before platform).
pub struct ChainTypeProvider<'a> {
    providers: Vec<&'a dyn TypeProvider>,
}

impl<'a> ChainTypeProvider<'a> {
    pub fn new(providers: Vec<&'a dyn TypeProvider>) -> Self {
        Self { providers }
    }
}

impl TypeProvider for ChainTypeProvider<'_> {
    fn lookup_type(&self, binary_name: &str) -> Option<TypeDefStub> {
        self.providers
            .iter()
            .find_map(|p| p.lookup_type(binary_name))
    }
}
