use carina_types::{is_subtype, Type, TypeEnv, TypeStore};

#[test]
fn minimal_jdk_interfaces_are_subtypes_of_object() {
    let env = TypeStore::with_minimal_jdk();

    let object = Type::class(env.well_known().object, vec![]);

    let list = env
        .class_id("java.util.List")
        .expect("List must exist in minimal JDK");
    let string = env.well_known().string;
    let list_string = Type::class(list, vec![Type::class(string, vec![])]);
    assert!(is_subtype(&env, &list_string, &object));

    let cloneable = Type::class(env.well_known().cloneable, vec![]);
    assert!(is_subtype(&env, &cloneable, &object));
}

#[test]
fn arrays_are_subtypes_of_object_cloneable_and_serializable() {
    let env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let arr = Type::array(string.clone());

    for target in [
        env.well_known().object,
        env.well_known().cloneable,
        env.well_known().serializable,
    ] {
        assert!(is_subtype(&env, &arr, &Type::class(target, vec![])));
    }

    // Reference arrays are covariant; primitive arrays are not.
    let object_arr = Type::array(Type::class(env.well_known().object, vec![]));
    assert!(is_subtype(&env, &arr, &object_arr));
    assert!(!is_subtype(&env, &Type::array(Type::int()), &object_arr));
}

#[test]
fn null_is_a_subtype_of_reference_types_only() {
    let env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);

    assert!(is_subtype(&env, &Type::Null, &string));
    assert!(!is_subtype(&env, &Type::Null, &Type::int()));
    assert!(!is_subtype(&env, &string, &Type::Null));
}
