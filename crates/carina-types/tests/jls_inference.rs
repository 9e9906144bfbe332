use carina_types::{
    resolve_method_call, CallKind, ClassDef, ClassKind, MethodCall, MethodDef, MethodResolution,
    TyContext, Type, TypeEnv, TypeStore,
};

use pretty_assertions::assert_eq;

fn static_method(name: &str, type_params: Vec<carina_types::TypeVarId>, params: Vec<Type>, ret: Type) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        type_params,
        params,
        return_type: ret,
        is_static: true,
        is_varargs: false,
        is_abstract: false,
    }
}

fn util_class(env: &mut TypeStore, name: &str, methods: Vec<MethodDef>) -> carina_types::ClassId {
    let object = env.well_known().object;
    env.add_class(ClassDef {
        name: name.to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods,
    })
}

#[test]
fn infer_simple_identity() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let test = util_class(
        &mut env,
        "com.example.Test",
        vec![static_method("id", vec![t], vec![Type::TypeVar(t)], Type::TypeVar(t))],
    );

    let call = MethodCall {
        receiver: Type::class(test, vec![]),
        call_kind: CallKind::Static,
        name: "id",
        args: vec![Type::class(string, vec![])],
        expected_return: None,
        explicit_type_args: vec![],
    };

    let mut ctx = TyContext::new(&env);
    let MethodResolution::Found(res) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected method resolution success");
    };
    assert_eq!(res.inferred_type_args, vec![Type::class(string, vec![])]);
    assert_eq!(res.return_type, Type::class(string, vec![]));
}

#[test]
fn infer_from_return_context() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let list = env.class_id("java.util.List").unwrap();

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let test = util_class(
        &mut env,
        "com.example.Test2",
        vec![static_method(
            "empty",
            vec![t],
            vec![],
            Type::class(list, vec![Type::TypeVar(t)]),
        )],
    );

    let expected = Type::class(list, vec![Type::class(string, vec![])]);
    let call = MethodCall {
        receiver: Type::class(test, vec![]),
        call_kind: CallKind::Static,
        name: "empty",
        args: vec![],
        expected_return: Some(expected.clone()),
        explicit_type_args: vec![],
    };

    let mut ctx = TyContext::new(&env);
    let MethodResolution::Found(res) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected method resolution success");
    };
    assert_eq!(res.inferred_type_args, vec![Type::class(string, vec![])]);
    assert_eq!(res.return_type, expected);
}

#[test]
fn unconstrained_variable_defaults_to_its_declared_bound() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let list = env.class_id("java.util.List").unwrap();

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let test = util_class(
        &mut env,
        "com.example.Test2b",
        vec![static_method(
            "empty",
            vec![t],
            vec![],
            Type::class(list, vec![Type::TypeVar(t)]),
        )],
    );

    let call = MethodCall {
        receiver: Type::class(test, vec![]),
        call_kind: CallKind::Static,
        name: "empty",
        args: vec![],
        expected_return: None,
        explicit_type_args: vec![],
    };

    let mut ctx = TyContext::new(&env);
    let MethodResolution::Found(res) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected method resolution success");
    };
    assert_eq!(res.inferred_type_args, vec![Type::class(object, vec![])]);
}

#[test]
fn inferred_type_respects_bounds() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;

    let n = env.add_type_param("N", vec![Type::class(integer, vec![])]);
    let test = util_class(
        &mut env,
        "com.example.Test3",
        vec![static_method("m", vec![n], vec![Type::TypeVar(n)], Type::Void)],
    );

    let call = MethodCall {
        receiver: Type::class(test, vec![]),
        call_kind: CallKind::Static,
        name: "m",
        args: vec![Type::class(integer, vec![])],
        expected_return: None,
        explicit_type_args: vec![],
    };

    let mut ctx = TyContext::new(&env);
    let MethodResolution::Found(res) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected method resolution success");
    };
    assert_eq!(res.inferred_type_args, vec![Type::class(integer, vec![])]);
}

/// `<T extends Number & Comparable<T>> T max(T a, T b)`.
fn max_class(env: &mut TypeStore) -> carina_types::ClassId {
    let number = env.well_known().number;
    let comparable = env.class_id("java.lang.Comparable").unwrap();

    let t = env.add_type_param("T", vec![Type::class(number, vec![])]);
    env.define_type_param(
        t,
        carina_types::TypeParamDef {
            name: "T".to_string(),
            upper_bounds: vec![
                Type::class(number, vec![]),
                Type::class(comparable, vec![Type::TypeVar(t)]),
            ],
            lower_bound: None,
        },
    );
    util_class(
        env,
        "com.example.Util",
        vec![static_method(
            "max",
            vec![t],
            vec![Type::TypeVar(t), Type::TypeVar(t)],
            Type::TypeVar(t),
        )],
    )
}

#[test]
fn bounded_inference_accepts_two_integers() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;
    let util = max_class(&mut env);

    let call = MethodCall {
        receiver: Type::class(util, vec![]),
        call_kind: CallKind::Static,
        name: "max",
        args: vec![Type::class(integer, vec![]), Type::class(integer, vec![])],
        expected_return: None,
        explicit_type_args: vec![],
    };

    let mut ctx = TyContext::new(&env);
    let MethodResolution::Found(res) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected method resolution success");
    };
    assert_eq!(res.inferred_type_args, vec![Type::class(integer, vec![])]);
    assert_eq!(res.return_type, Type::class(integer, vec![]));
}

#[test]
fn bounded_inference_rejects_integer_and_string_with_bound_mismatch() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;
    let string = env.well_known().string;
    let util = max_class(&mut env);

    let call = MethodCall {
        receiver: Type::class(util, vec![]),
        call_kind: CallKind::Static,
        name: "max",
        args: vec![Type::class(integer, vec![]), Type::class(string, vec![])],
        expected_return: None,
        explicit_type_args: vec![],
    };

    let mut ctx = TyContext::new(&env);
    let MethodResolution::NotFound(diags) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected bound mismatch");
    };
    assert_eq!(diags[0].code, "bound-mismatch");
    assert!(
        diags[0].message.starts_with(
            "Bound mismatch: The generic method max(T, T) of type Util is not applicable for the arguments (Integer, String)."
        ),
        "unexpected message: {}",
        diags[0].message
    );
    assert!(
        diags[0]
            .message
            .contains("bounded parameter <T extends Number & Comparable<T>>"),
        "unexpected message: {}",
        diags[0].message
    );
}

#[test]
fn explicit_type_witness_is_bound_checked() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;
    let string = env.well_known().string;
    let util = max_class(&mut env);

    let ok = MethodCall {
        receiver: Type::class(util, vec![]),
        call_kind: CallKind::Static,
        name: "max",
        args: vec![Type::class(integer, vec![]), Type::class(integer, vec![])],
        expected_return: None,
        explicit_type_args: vec![Type::class(integer, vec![])],
    };
    let mut ctx = TyContext::new(&env);
    assert!(matches!(
        resolve_method_call(&mut ctx, &ok),
        MethodResolution::Found(_)
    ));

    let bad = MethodCall {
        receiver: Type::class(util, vec![]),
        call_kind: CallKind::Static,
        name: "max",
        args: vec![Type::class(string, vec![]), Type::class(string, vec![])],
        expected_return: None,
        explicit_type_args: vec![Type::class(string, vec![])],
    };
    let mut ctx_bad = TyContext::new(&env);
    let MethodResolution::NotFound(diags) = resolve_method_call(&mut ctx_bad, &bad) else {
        panic!("expected bound mismatch for explicit String witness");
    };
    assert_eq!(diags[0].code, "bound-mismatch");
}

#[test]
fn raw_receiver_erases_method_type_parameters() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;

    // class Holder<E> { <U extends E> U pick(U u) }
    let e = env.add_type_param("E", vec![Type::class(object, vec![])]);
    let u = env.add_type_param("U", vec![Type::TypeVar(e)]);
    let holder = env.add_class(ClassDef {
        name: "com.example.Holder".to_string(),
        kind: ClassKind::Class,
        type_params: vec![e],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![MethodDef {
            name: "pick".to_string(),
            type_params: vec![u],
            params: vec![Type::TypeVar(u)],
            return_type: Type::TypeVar(u),
            is_static: false,
            is_varargs: false,
            is_abstract: false,
        }],
    });

    // Raw receiver: the method's own type parameter is erased too, so an
    // explicit witness is illegal.
    let raw = Type::class(holder, vec![]);
    let witnessed = MethodCall {
        receiver: raw.clone(),
        call_kind: CallKind::Instance,
        name: "pick",
        args: vec![Type::class(string, vec![])],
        expected_return: None,
        explicit_type_args: vec![Type::class(string, vec![])],
    };
    let mut ctx = TyContext::new(&env);
    let MethodResolution::NotFound(diags) = resolve_method_call(&mut ctx, &witnessed) else {
        panic!("expected raw witness rejection");
    };
    assert_eq!(diags[0].code, "raw-method-witness");
    assert_eq!(
        diags[0].message,
        "The method pick(Object) of raw type Holder is no longer generic; it cannot be parameterized with arguments <String>"
    );

    // Without the witness the call resolves against the erased signature.
    let plain = MethodCall {
        receiver: raw,
        call_kind: CallKind::Instance,
        name: "pick",
        args: vec![Type::class(string, vec![])],
        expected_return: None,
        explicit_type_args: vec![],
    };
    let mut ctx2 = TyContext::new(&env);
    let MethodResolution::Found(res) = resolve_method_call(&mut ctx2, &plain) else {
        panic!("expected erased resolution success");
    };
    assert_eq!(res.return_type, Type::class(object, vec![]));
    assert!(res
        .warnings
        .contains(&carina_types::TypeWarning::Unchecked(
            carina_types::UncheckedReason::RawMemberAccess
        )));
}

#[test]
fn most_specific_overload_wins() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;

    let over = util_class(
        &mut env,
        "com.example.Over",
        vec![
            static_method("f", vec![], vec![Type::class(object, vec![])], Type::int()),
            static_method("f", vec![], vec![Type::class(string, vec![])], Type::boolean()),
        ],
    );

    let call = MethodCall {
        receiver: Type::class(over, vec![]),
        call_kind: CallKind::Static,
        name: "f",
        args: vec![Type::class(string, vec![])],
        expected_return: None,
        explicit_type_args: vec![],
    };
    let mut ctx = TyContext::new(&env);
    let MethodResolution::Found(res) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected overload resolution success");
    };
    assert_eq!(res.params, vec![Type::class(string, vec![])]);
    assert_eq!(res.return_type, Type::boolean());
}

#[test]
fn incomparable_overloads_are_ambiguous() {
    let mut env = TypeStore::with_minimal_jdk();
    let number = env.well_known().number;
    let serializable = env.well_known().serializable;
    let integer = env.well_known().integer;

    let over = util_class(
        &mut env,
        "com.example.Ambi",
        vec![
            static_method("g", vec![], vec![Type::class(number, vec![])], Type::Void),
            static_method("g", vec![], vec![Type::class(serializable, vec![])], Type::Void),
        ],
    );

    let receiver = Type::class(over, vec![]);
    let call = MethodCall {
        receiver: receiver.clone(),
        call_kind: CallKind::Static,
        name: "g",
        args: vec![Type::class(integer, vec![])],
        expected_return: None,
        explicit_type_args: vec![],
    };
    let mut ctx = TyContext::new(&env);
    let MethodResolution::Ambiguous(candidates) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected an ambiguous resolution");
    };
    assert_eq!(candidates.len(), 2);

    let diag = carina_types::ambiguous_method_diagnostic(&env, "g", &receiver, None);
    assert_eq!(diag.code, "ambiguous-method");
    assert_eq!(diag.message, "The method g is ambiguous for the type Ambi");
}

#[test]
fn same_erasure_from_unrelated_interfaces_is_a_name_clash() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let integer = env.well_known().integer;
    let list = env.class_id("java.util.List").unwrap();

    // interface P { void accept(List<String> l); }
    // interface Q { void accept(List<Integer> l); }
    // interface R extends P, Q {}  -> accept(List) erasure clash.
    let p = env.add_class(ClassDef {
        name: "com.example.P".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![],
        super_class: None,
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![MethodDef {
            name: "accept".to_string(),
            type_params: vec![],
            params: vec![Type::class(list, vec![Type::class(string, vec![])])],
            return_type: Type::Void,
            is_static: false,
            is_varargs: false,
            is_abstract: true,
        }],
    });
    let q = env.add_class(ClassDef {
        name: "com.example.Q".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![],
        super_class: None,
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![MethodDef {
            name: "accept".to_string(),
            type_params: vec![],
            params: vec![Type::class(list, vec![Type::class(integer, vec![])])],
            return_type: Type::Void,
            is_static: false,
            is_varargs: false,
            is_abstract: true,
        }],
    });
    let r = env.add_class(ClassDef {
        name: "com.example.R".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(p, vec![]), Type::class(q, vec![])],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    let call = MethodCall {
        receiver: Type::class(r, vec![]),
        call_kind: CallKind::Instance,
        name: "accept",
        args: vec![Type::class(list, vec![Type::class(string, vec![])])],
        expected_return: None,
        explicit_type_args: vec![],
    };
    let mut ctx = TyContext::new(&env);
    let MethodResolution::NotFound(diags) = resolve_method_call(&mut ctx, &call) else {
        panic!("expected a name clash, not a resolution");
    };
    assert_eq!(diags[0].code, "name-clash");
    assert!(
        diags[0].message.contains("has the same erasure as")
            && diags[0].message.contains("but does not override it"),
        "unexpected message: {}",
        diags[0].message
    );
}
