use carina_types::{
    check_array_creation, check_catch_type, check_class_declaration,
    check_static_type_variable_reference, check_throws_type, check_type_application,
    check_type_param_declarations, resolve_constructor_call, ClassDef, ClassKind, ConstructorDef,
    MethodResolution, Severity, Type, TypeEnv, TypeParamDef, TypeStore, WildcardBound,
};

use pretty_assertions::assert_eq;

fn plain_class(env: &mut TypeStore, name: &str) -> carina_types::ClassId {
    let object = env.well_known().object;
    env.add_class(ClassDef {
        name: name.to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    })
}

/// `class NumBox<T extends Number> {}`
fn num_box(env: &mut TypeStore) -> carina_types::ClassId {
    let object = env.well_known().object;
    let number = env.well_known().number;
    let t = env.add_type_param("T", vec![Type::class(number, vec![])]);
    env.add_class(ClassDef {
        name: "com.example.NumBox".to_string(),
        kind: ClassKind::Class,
        type_params: vec![t],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    })
}

#[test]
fn accepted_application_has_no_diagnostics() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;
    let bx = num_box(&mut env);

    let diags = check_type_application(&env, bx, &[Type::class(integer, vec![])], None);
    assert_eq!(diags, vec![]);
}

#[test]
fn bound_check_is_idempotent() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;
    let bx = num_box(&mut env);

    let args = [Type::class(integer, vec![])];
    assert_eq!(check_type_application(&env, bx, &args, None), vec![]);
    assert_eq!(check_type_application(&env, bx, &args, None), vec![]);
}

#[test]
fn bound_mismatch_names_argument_parameter_and_declaration() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = env.well_known().string;
    let bx = num_box(&mut env);

    let diags = check_type_application(&env, bx, &[Type::class(string, vec![])], None);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "bound-mismatch");
    assert_eq!(
        diags[0].message,
        "Bound mismatch: The type String is not a valid substitute for the bounded parameter <T extends Number> of the type NumBox<T>"
    );
}

#[test]
fn incorrect_arity_is_reported() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;
    let string = env.well_known().string;
    let bx = num_box(&mut env);

    let diags = check_type_application(
        &env,
        bx,
        &[Type::class(integer, vec![]), Type::class(string, vec![])],
        None,
    );
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "type-arity");
    assert_eq!(
        diags[0].message,
        "Incorrect number of arguments for type NumBox<T>; it cannot be parameterized with arguments <Integer, String>"
    );
}

#[test]
fn non_generic_type_cannot_be_parameterized() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = env.well_known().string;
    let plain = plain_class(&mut env, "com.example.Plain");

    let diags = check_type_application(&env, plain, &[Type::class(string, vec![])], None);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "not-generic");
    assert_eq!(
        diags[0].message,
        "The type Plain is not generic; it cannot be parameterized with arguments <String>"
    );
}

#[test]
fn wildcard_arguments_use_capture_bounds() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = env.well_known().integer;
    let string = env.well_known().string;
    let bx = num_box(&mut env);

    // NumBox<?> and NumBox<? extends Integer> are fine.
    assert_eq!(
        check_type_application(&env, bx, &[Type::Wildcard(WildcardBound::Unbounded)], None),
        vec![]
    );
    assert_eq!(
        check_type_application(
            &env,
            bx,
            &[Type::Wildcard(WildcardBound::Extends(Box::new(Type::class(
                integer,
                vec![]
            ))))],
            None
        ),
        vec![]
    );

    // NumBox<? extends String> is provably empty: String and Number are
    // unrelated classes.
    let diags = check_type_application(
        &env,
        bx,
        &[Type::Wildcard(WildcardBound::Extends(Box::new(Type::class(
            string,
            vec![],
        ))))],
        None,
    );
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "bound-mismatch");

    // NumBox<? super Integer> is fine; NumBox<? super String> is not.
    assert_eq!(
        check_type_application(
            &env,
            bx,
            &[Type::Wildcard(WildcardBound::Super(Box::new(Type::class(
                integer,
                vec![]
            ))))],
            None
        ),
        vec![]
    );
    let diags = check_type_application(
        &env,
        bx,
        &[Type::Wildcard(WildcardBound::Super(Box::new(Type::class(
            string,
            vec![],
        ))))],
        None,
    );
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "bound-mismatch");
}

#[test]
fn sibling_parameters_are_substituted_simultaneously() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let integer = env.well_known().integer;
    let list = env.class_id("java.util.List").unwrap();

    // class Pair<A, B extends List<A>> {}
    let a = env.add_type_param("A", vec![Type::class(object, vec![])]);
    let b = env.add_type_param("B", vec![Type::class(list, vec![Type::TypeVar(a)])]);
    let pair = env.add_class(ClassDef {
        name: "com.example.Pair".to_string(),
        kind: ClassKind::Class,
        type_params: vec![a, b],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    let ok = check_type_application(
        &env,
        pair,
        &[
            Type::class(string, vec![]),
            Type::class(list, vec![Type::class(string, vec![])]),
        ],
        None,
    );
    assert_eq!(ok, vec![]);

    let bad = check_type_application(
        &env,
        pair,
        &[
            Type::class(string, vec![]),
            Type::class(list, vec![Type::class(integer, vec![])]),
        ],
        None,
    );
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].code, "bound-mismatch");
    assert_eq!(
        bad[0].message,
        "Bound mismatch: The type List<Integer> is not a valid substitute for the bounded parameter <B extends List<A>> of the type Pair<A, B>"
    );
}

#[test]
fn constructor_call_checks_bounds_and_arguments() {
    // class X<T extends String> { X(T t) {} } ; new X<String>("..") -> ok.
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let integer = env.well_known().integer;

    let t = env.add_type_param("T", vec![Type::class(string, vec![])]);
    let x = env.add_class(ClassDef {
        name: "com.example.X".to_string(),
        kind: ClassKind::Class,
        type_params: vec![t],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![ConstructorDef {
            params: vec![Type::TypeVar(t)],
            is_varargs: false,
            is_accessible: true,
        }],
        methods: vec![],
    });

    let string_ty = Type::class(string, vec![]);
    assert_eq!(check_type_application(&env, x, &[string_ty.clone()], None), vec![]);

    let MethodResolution::Found(res) =
        resolve_constructor_call(&env, x, &[string_ty.clone()], Some(&[string_ty.clone()]))
    else {
        panic!("expected constructor resolution success");
    };
    assert_eq!(res.params, vec![string_ty.clone()]);
    assert_eq!(res.return_type, Type::class(x, vec![string_ty]));

    // new X<Integer>(..) violates the bound.
    let integer_ty = Type::class(integer, vec![]);
    let MethodResolution::NotFound(diags) =
        resolve_constructor_call(&env, x, &[integer_ty.clone()], Some(&[integer_ty]))
    else {
        panic!("expected constructor bound failure");
    };
    assert_eq!(diags[0].code, "bound-mismatch");
}

#[test]
fn diamond_constructor_infers_class_arguments() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let holder = env.add_class(ClassDef {
        name: "com.example.Holder2".to_string(),
        kind: ClassKind::Class,
        type_params: vec![t],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![ConstructorDef {
            params: vec![Type::TypeVar(t)],
            is_varargs: false,
            is_accessible: true,
        }],
        methods: vec![],
    });

    let string_ty = Type::class(string, vec![]);
    let MethodResolution::Found(res) =
        resolve_constructor_call(&env, holder, &[string_ty.clone()], None)
    else {
        panic!("expected diamond inference success");
    };
    assert_eq!(res.inferred_type_args, vec![string_ty.clone()]);
    assert_eq!(res.return_type, Type::class(holder, vec![string_ty]));
}

#[test]
fn duplicate_type_parameter_is_reported() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let t1 = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let t2 = env.add_type_param("T", vec![Type::class(object, vec![])]);

    let diags = check_type_param_declarations(&env, &[t1, t2], None);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "duplicate-type-parameter");
    assert_eq!(diags[0].message, "Duplicate type parameter T");
}

#[test]
fn forward_reference_in_top_level_bound_is_reported() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;

    // class C<T extends U, U> {}
    let u = env.add_type_param("U", vec![Type::class(object, vec![])]);
    let t = env.add_type_param("T", vec![Type::TypeVar(u)]);

    let diags = check_type_param_declarations(&env, &[t, u], None);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "forward-type-parameter");
    assert_eq!(diags[0].message, "Illegal forward reference to type parameter U");

    // The same pair in declaration order is fine.
    assert_eq!(check_type_param_declarations(&env, &[u, t], None), vec![]);
}

#[test]
fn self_bound_is_rejected_but_f_bounds_are_not() {
    let mut env = TypeStore::with_minimal_jdk();
    let comparable = env.class_id("java.lang.Comparable").unwrap();
    let object = env.well_known().object;

    // T extends T
    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    env.define_type_param(
        t,
        TypeParamDef {
            name: "T".to_string(),
            upper_bounds: vec![Type::TypeVar(t)],
            lower_bound: None,
        },
    );
    let diags = check_type_param_declarations(&env, &[t], None);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "type-parameter-cycle");

    // T extends Comparable<T> is the legal recursive form.
    let f = env.add_type_param("F", vec![Type::class(object, vec![])]);
    env.define_type_param(
        f,
        TypeParamDef {
            name: "F".to_string(),
            upper_bounds: vec![Type::class(comparable, vec![Type::TypeVar(f)])],
            lower_bound: None,
        },
    );
    assert_eq!(check_type_param_declarations(&env, &[f], None), vec![]);
}

#[test]
fn one_bound_cannot_repeat_an_interface_with_different_arguments() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let integer = env.well_known().integer;
    let comparable = env.class_id("java.lang.Comparable").unwrap();

    let t = env.add_type_param(
        "T",
        vec![
            Type::class(object, vec![]),
            Type::class(comparable, vec![Type::class(string, vec![])]),
            Type::class(comparable, vec![Type::class(integer, vec![])]),
        ],
    );
    let diags = check_type_param_declarations(&env, &[t], None);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "interface-reimplemented");
    assert_eq!(
        diags[0].message,
        "The interface Comparable cannot be implemented more than once with different arguments: Comparable<String> and Comparable<Integer>"
    );
}

#[test]
fn conflicting_interface_parameterizations_through_inheritance() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let integer = env.well_known().integer;

    // interface I<T> {} ; class A implements I<String> {} ;
    // class B extends A implements I<Integer> {} -> exactly one error.
    let i_t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let iface = env.add_class(ClassDef {
        name: "com.example.IConf".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![i_t],
        super_class: None,
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });
    let a = env.add_class(ClassDef {
        name: "com.example.ConfA".to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(iface, vec![Type::class(string, vec![])])],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });
    let b = env.add_class(ClassDef {
        name: "com.example.ConfB".to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(a, vec![])),
        interfaces: vec![Type::class(iface, vec![Type::class(integer, vec![])])],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    let diags = check_class_declaration(&env, b, None);
    let errors: Vec<_> = diags.iter().filter(|d| d.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "interface-reimplemented");
    assert_eq!(
        errors[0].message,
        "The interface IConf cannot be implemented more than once with different arguments: IConf<Integer> and IConf<String>"
    );

    // A raw path next to a parameterized path stays legal.
    let c = env.add_class(ClassDef {
        name: "com.example.ConfC".to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(a, vec![])),
        interfaces: vec![Type::class(iface, vec![])],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });
    let diags = check_class_declaration(&env, c, None);
    assert!(diags.iter().all(|d| d.severity != Severity::Error), "{diags:?}");
}

#[test]
fn raw_supertype_reference_warns() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let list = env.class_id("java.util.List").unwrap();

    let c = env.add_class(ClassDef {
        name: "com.example.RawImpl".to_string(),
        kind: ClassKind::Class,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(list, vec![])],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    let diags = check_class_declaration(&env, c, None);
    let warnings: Vec<_> = diags
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, "raw-type");
    assert_eq!(
        warnings[0].message,
        "List is a raw type. References to generic type List<E> should be parameterized"
    );
}

#[test]
fn generic_class_may_not_subclass_throwable() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let runtime_exception = env.class_id("java.lang.RuntimeException").unwrap();

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let ex = env.add_class(ClassDef {
        name: "com.example.MyEx".to_string(),
        kind: ClassKind::Class,
        type_params: vec![t],
        super_class: Some(Type::class(runtime_exception, vec![])),
        interfaces: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    let diags = check_class_declaration(&env, ex, None);
    assert!(diags
        .iter()
        .any(|d| d.code == "generic-throwable"
            && d.message == "The generic class MyEx<T> may not subclass java.lang.Throwable"));
}

#[test]
fn catch_throws_array_and_static_guards() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let exception = env.class_id("java.lang.Exception").unwrap();
    let list = env.class_id("java.util.List").unwrap();

    let t = env.add_type_param("T", vec![Type::class(exception, vec![])]);

    // catch (T e) is illegal; throws T is fine.
    let d = check_catch_type(&env, &Type::TypeVar(t), None).expect("catch of a type parameter");
    assert_eq!(d.code, "generic-catch");
    assert_eq!(d.message, "Cannot use the type parameter T in a catch block");
    assert!(check_throws_type(&env, &Type::TypeVar(t), None).is_none());

    // Parameterized types are rejected in both positions.
    let list_string = Type::class(list, vec![Type::class(string, vec![])]);
    assert!(check_catch_type(&env, &list_string, None).is_some());
    let d = check_throws_type(&env, &list_string, None).expect("throws of a parameterized type");
    assert_eq!(
        d.message,
        "Cannot use the parameterized type List<String> either in catch block or throws clause"
    );

    // new List<String>[10] is illegal, new List<?>[10] is not.
    let d = check_array_creation(&env, &list_string, None).expect("generic array creation");
    assert_eq!(d.code, "generic-array");
    assert_eq!(d.message, "Cannot create a generic array of List<String>");
    assert!(check_array_creation(
        &env,
        &Type::class(list, vec![Type::Wildcard(WildcardBound::Unbounded)]),
        None
    )
    .is_none());
    let d = check_array_creation(&env, &Type::TypeVar(t), None).expect("array of type variable");
    assert_eq!(d.message, "Cannot create a generic array of T");

    // Static references to class type variables.
    let d = check_static_type_variable_reference(&env, &Type::TypeVar(t), None)
        .expect("static reference to type parameter");
    assert_eq!(d.code, "static-type-variable");
    assert_eq!(
        d.message,
        "Cannot make a static reference to the non-static type T"
    );
    assert!(
        check_static_type_variable_reference(&env, &Type::class(object, vec![]), None).is_none()
    );
}

#[test]
fn diagnostics_accumulate_per_compilation_unit() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = env.well_known().string;
    let integer = env.well_known().integer;
    let bx = num_box(&mut env);

    // One failing declaration does not stop later checks; everything lands
    // in the same append-only sink.
    let mut sink = carina_types::DiagnosticSink::new();
    sink.extend(check_type_application(&env, bx, &[Type::class(string, vec![])], None));
    sink.extend(check_type_application(&env, bx, &[Type::class(integer, vec![])], None));
    sink.extend(check_type_application(
        &env,
        bx,
        &[Type::class(string, vec![]), Type::class(string, vec![])],
        None,
    ));

    assert!(sink.has_errors());
    assert_eq!(sink.len(), 2);
    let codes: Vec<&str> = sink.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec!["bound-mismatch", "type-arity"]);
}

#[test]
fn object_cannot_be_generic() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let mut def = env.class(object).expect("Object is defined").clone();
    def.type_params = vec![t];
    env.define_class(object, def);

    let diags = check_class_declaration(&env, object, None);
    assert!(diags
        .iter()
        .any(|d| d.code == "object-generic"
            && d.message == "The type java.lang.Object cannot be generic"));
}
