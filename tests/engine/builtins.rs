//! Built-in objects working together

use super::{create_test_realm, obj, prop};
use jsrealm::function::construct;
use jsrealm::object::proxy::proxy_create;
use jsrealm::operations::{create_array_from_list, invoke, length_of_array_like};
use jsrealm::{JsError, JsValue, ObjectId, PropertyKey, Realm};

fn invoke_on(realm: &mut Realm, target: ObjectId, method: &str, args: &[JsValue]) -> JsValue {
    invoke(realm, &JsValue::Object(target), &PropertyKey::from(method), args).unwrap()
}

fn text(value: JsValue) -> String {
    value.as_string().unwrap().as_str().to_string()
}

#[test]
fn test_array_from_string_uses_code_points() {
    let mut realm = create_test_realm();
    let array_ctor = realm.intrinsics.array;
    let chars = invoke_on(&mut realm, array_ctor, "from", &[JsValue::from("a\u{1F600}b")]);
    let chars = chars.as_object().unwrap();
    assert_eq!(length_of_array_like(&mut realm, chars).unwrap(), 3);
    assert_eq!(prop(&mut realm, chars, "1"), JsValue::from("\u{1F600}"));
}

#[test]
fn test_entries_round_trip_through_from_entries() {
    let mut realm = create_test_realm();
    let source = obj(&mut realm, &[("b", JsValue::Number(2.0)), ("a", JsValue::Number(1.0))]);
    let object_ctor = realm.intrinsics.object;
    let entries = invoke_on(&mut realm, object_ctor, "entries", &[JsValue::Object(source)]);
    let copy = invoke_on(&mut realm, object_ctor, "fromEntries", &[entries]).as_object().unwrap();
    let keys = invoke_on(&mut realm, object_ctor, "keys", &[JsValue::Object(copy)])
        .as_object()
        .unwrap();
    assert_eq!(text(invoke_on(&mut realm, keys, "join", &[])), "b,a");
    assert_eq!(prop(&mut realm, copy, "a"), JsValue::Number(1.0));
}

#[test]
fn test_assign_from_string_source() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[]);
    let object_ctor = realm.intrinsics.object;
    invoke_on(
        &mut realm,
        object_ctor,
        "assign",
        &[JsValue::Object(target), JsValue::from("ab"), JsValue::Null],
    );
    assert_eq!(prop(&mut realm, target, "0"), JsValue::from("a"));
    assert_eq!(prop(&mut realm, target, "1"), JsValue::from("b"));
    assert!(prop(&mut realm, target, "length").is_undefined());
}

#[test]
fn test_join_treats_null_and_undefined_as_empty() {
    let mut realm = create_test_realm();
    let nested = create_array_from_list(&mut realm, &[JsValue::Number(2.0), JsValue::Number(3.0)])
        .unwrap();
    let list = create_array_from_list(
        &mut realm,
        &[JsValue::Number(1.0), JsValue::Null, JsValue::Undefined, JsValue::Object(nested)],
    )
    .unwrap();
    assert_eq!(text(invoke_on(&mut realm, list, "join", &[JsValue::from("-")])), "1---2,3");
}

#[test]
fn test_bound_constructor_prepends_arguments() {
    let mut realm = create_test_realm();
    let array_ctor = realm.intrinsics.array;
    let bound = invoke_on(
        &mut realm,
        array_ctor,
        "bind",
        &[JsValue::Null, JsValue::Number(1.0), JsValue::Number(2.0)],
    )
    .as_object()
    .unwrap();
    let made = construct(&mut realm, bound, &[JsValue::Number(3.0)], None).unwrap();
    assert_eq!(text(invoke_on(&mut realm, made, "join", &[])), "1,2,3");
    assert_eq!(prop(&mut realm, bound, "name"), JsValue::from("bound Array"));
}

#[test]
fn test_object_to_string_tags() {
    let mut realm = create_test_realm();
    let object_proto = realm.intrinsics.object_prototype;
    let to_string = prop(&mut realm, object_proto, "toString");
    let list = create_array_from_list(&mut realm, &[]).unwrap();
    let handler = obj(&mut realm, &[]);
    let proxied = proxy_create(&mut realm, &JsValue::Object(list), &JsValue::Object(handler))
        .unwrap();
    let error = realm.error_to_value(JsError::type_error("bad")).unwrap();

    let cases = [
        (JsValue::Object(list), "[object Array]"),
        (JsValue::Object(proxied), "[object Array]"),
        (error, "[object Error]"),
        (JsValue::Null, "[object Null]"),
        (JsValue::Object(realm.intrinsics.math), "[object Math]"),
    ];
    for (value, expected) in cases {
        let result = invoke(&mut realm, &to_string, &PropertyKey::from("call"), &[value]).unwrap();
        assert_eq!(text(result), expected);
    }
}

#[test]
fn test_error_to_string_combines_name_and_message() {
    let mut realm = create_test_realm();
    let error = realm.error_to_value(JsError::type_error("bad")).unwrap().as_object().unwrap();
    assert_eq!(text(invoke_on(&mut realm, error, "toString", &[])), "TypeError: bad");

    let plain = realm.error_to_value(JsError::eval_error("")).unwrap().as_object().unwrap();
    assert_eq!(text(invoke_on(&mut realm, plain, "toString", &[])), "EvalError");
}

#[test]
fn test_string_methods_coerce_their_receiver() {
    let mut realm = create_test_realm();
    let string_proto = realm.intrinsics.string_prototype;
    let slice = prop(&mut realm, string_proto, "slice");
    let result = invoke(
        &mut realm,
        &slice,
        &PropertyKey::from("call"),
        &[JsValue::Number(12345.0), JsValue::Number(1.0), JsValue::Number(-1.0)],
    )
    .unwrap();
    assert_eq!(text(result), "234");

    let err = invoke(&mut realm, &slice, &PropertyKey::from("call"), &[JsValue::Undefined])
        .unwrap_err();
    assert!(err.is_type_error());
}
