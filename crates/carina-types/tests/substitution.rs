use std::collections::HashMap;

use carina_types::{substitute, Type, TypeEnv, TypeStore, WildcardBound};

use pretty_assertions::assert_eq;

#[test]
fn substitution_replaces_variables_structurally() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let list = env.class_id("java.util.List").unwrap();

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let shape = Type::class(list, vec![Type::array(Type::TypeVar(t))]);

    let mut bindings = HashMap::new();
    bindings.insert(t, Type::class(string, vec![]));

    assert_eq!(
        substitute(&env, &shape, &bindings),
        Type::class(list, vec![Type::array(Type::class(string, vec![]))])
    );

    // Variables outside the map survive untouched.
    let u = env.add_type_param("U", vec![Type::class(object, vec![])]);
    assert_eq!(
        substitute(&env, &Type::TypeVar(u), &bindings),
        Type::TypeVar(u)
    );
}

#[test]
fn substituting_a_wildcard_derives_the_variable_bound() {
    let mut env = TypeStore::with_minimal_jdk();
    let number = env.well_known().number;
    let integer = env.well_known().integer;
    let object = env.well_known().object;
    let list = env.class_id("java.util.List").unwrap();

    // T extends Number, bound to plain `?`: the variable bound survives as
    // `? extends Number`.
    let t = env.add_type_param("T", vec![Type::class(number, vec![])]);
    let shape = Type::class(list, vec![Type::TypeVar(t)]);

    let mut bindings = HashMap::new();
    bindings.insert(t, Type::Wildcard(WildcardBound::Unbounded));
    assert_eq!(
        substitute(&env, &shape, &bindings),
        Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(Type::class(
                number,
                vec![]
            ))))]
        )
    );

    // `? extends Integer` narrows further: glb(Integer, Number) = Integer.
    bindings.insert(
        t,
        Type::Wildcard(WildcardBound::Extends(Box::new(Type::class(
            integer,
            vec![],
        )))),
    );
    assert_eq!(
        substitute(&env, &shape, &bindings),
        Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(Type::class(
                integer,
                vec![]
            ))))]
        )
    );

    // A trivially bounded variable stays a plain `?`.
    let u = env.add_type_param("U", vec![Type::class(object, vec![])]);
    let shape_u = Type::class(list, vec![Type::TypeVar(u)]);
    let mut bindings_u = HashMap::new();
    bindings_u.insert(u, Type::Wildcard(WildcardBound::Unbounded));
    assert_eq!(
        substitute(&env, &shape_u, &bindings_u),
        Type::class(list, vec![Type::Wildcard(WildcardBound::Unbounded)])
    );

    // A super-wildcard binding keeps its lower bound.
    bindings_u.insert(
        u,
        Type::Wildcard(WildcardBound::Super(Box::new(Type::class(integer, vec![])))),
    );
    assert_eq!(
        substitute(&env, &shape_u, &bindings_u),
        Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Super(Box::new(Type::class(
                integer,
                vec![]
            ))))]
        )
    );
}

#[test]
fn f_bounded_wildcard_substitution_terminates() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let comparable = env.class_id("java.lang.Comparable").unwrap();
    let list = env.class_id("java.util.List").unwrap();

    // T extends Comparable<T>
    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    env.define_type_param(
        t,
        carina_types::TypeParamDef {
            name: "T".to_string(),
            upper_bounds: vec![Type::class(comparable, vec![Type::TypeVar(t)])],
            lower_bound: None,
        },
    );

    let shape = Type::class(list, vec![Type::TypeVar(t)]);
    let mut bindings = HashMap::new();
    bindings.insert(t, Type::Wildcard(WildcardBound::Unbounded));

    // The derived bound must be finite; re-entry through the F-bound passes
    // the wildcard through unchanged.
    let substituted = substitute(&env, &shape, &bindings);
    assert_eq!(
        substituted,
        Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(Type::class(
                comparable,
                vec![Type::Wildcard(WildcardBound::Unbounded)]
            ))))]
        )
    );
}
