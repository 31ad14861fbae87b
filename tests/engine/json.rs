//! JSON.parse / JSON.stringify against exotic objects, accessors and callbacks

use super::{create_test_realm, native, obj};
use jsrealm::function::construct;
use jsrealm::object::proxy::proxy_create;
use jsrealm::operations::{
    create_array_from_list, define_property_or_throw, get, invoke, set, to_number, to_string,
};
use jsrealm::{JsResult, JsValue, ObjectId, PropertyDescriptor, PropertyKey, Realm};

fn json(realm: &mut Realm, method: &str, args: &[JsValue]) -> JsResult<JsValue> {
    let json = JsValue::Object(realm.intrinsics.json);
    invoke(realm, &json, &PropertyKey::from(method), args)
}

fn stringify(realm: &mut Realm, value: JsValue) -> String {
    let text = json(realm, "stringify", &[value]).unwrap();
    text.as_string().unwrap().as_str().to_string()
}

fn seven(
    _realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Number(7.0))
}

fn to_json_with_key(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let key = to_string(realm, &args.first().cloned().unwrap_or(JsValue::Undefined))?;
    Ok(JsValue::from(format!("key:{}", key.as_str())))
}

fn double_numbers(
    _realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(match args.get(1) {
        Some(JsValue::Number(n)) => JsValue::Number(n * 2.0),
        Some(other) => other.clone(),
        None => JsValue::Undefined,
    })
}

/// Reviver that records every key it sees in the global `seen` string
fn record_keys(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let global = realm.global_object();
    let seen = PropertyKey::from("seen");
    let key = to_string(realm, &args.first().cloned().unwrap_or(JsValue::Undefined))?;
    let previous = get(realm, global, &seen)?;
    let next = match previous {
        JsValue::String(s) => format!("{}|{}", s.as_str(), key.as_str()),
        _ => key.as_str().to_string(),
    };
    set(realm, global, &seen, JsValue::from(next), true)?;
    Ok(args.get(1).cloned().unwrap_or(JsValue::Undefined))
}

#[test]
fn test_getters_run_during_stringify() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[("plain", JsValue::Number(1.0))]);
    let getter = native(&mut realm, seven, "computed", 0);
    define_property_or_throw(
        &mut realm,
        target,
        &PropertyKey::from("computed"),
        PropertyDescriptor::accessor(getter, JsValue::Undefined, true, true),
    )
    .unwrap();
    assert_eq!(stringify(&mut realm, JsValue::Object(target)), r#"{"plain":1,"computed":7}"#);
}

#[test]
fn test_to_json_receives_the_key() {
    let mut realm = create_test_realm();
    let to_json = native(&mut realm, to_json_with_key, "toJSON", 1);
    let inner = obj(&mut realm, &[("toJSON", to_json)]);
    let outer = obj(&mut realm, &[("d", JsValue::Object(inner))]);
    assert_eq!(stringify(&mut realm, JsValue::Object(outer)), r#"{"d":"key:d"}"#);
}

#[test]
fn test_wrappers_and_non_finite_numbers() {
    let mut realm = create_test_realm();
    let number_ctor = realm.intrinsics.number;
    let wrapped = construct(&mut realm, number_ctor, &[JsValue::Number(3.0)], None).unwrap();
    let string_ctor = realm.intrinsics.string;
    let wrapped_str = construct(&mut realm, string_ctor, &[JsValue::from("s")], None).unwrap();
    let list = create_array_from_list(
        &mut realm,
        &[
            JsValue::Object(wrapped),
            JsValue::Object(wrapped_str),
            JsValue::Number(f64::NAN),
            JsValue::Number(f64::INFINITY),
            JsValue::Number(-0.0),
        ],
    )
    .unwrap();
    assert_eq!(stringify(&mut realm, JsValue::Object(list)), r#"[3,"s",null,null,0]"#);
}

#[test]
fn test_symbols_and_undefined_are_omitted() {
    let mut realm = create_test_realm();
    let sym = realm.new_symbol(None);
    let target = obj(
        &mut realm,
        &[("s", JsValue::from(sym)), ("u", JsValue::Undefined), ("n", JsValue::Null)],
    );
    assert_eq!(stringify(&mut realm, JsValue::Object(target)), r#"{"n":null}"#);
    assert!(json(&mut realm, "stringify", &[JsValue::Undefined]).unwrap().is_undefined());
}

#[test]
fn test_function_replacer_rewrites_values() {
    let mut realm = create_test_realm();
    let inner = create_array_from_list(&mut realm, &[JsValue::Number(2.0)]).unwrap();
    let target = obj(&mut realm, &[("a", JsValue::Number(1.0)), ("b", JsValue::Object(inner))]);
    let replacer = native(&mut realm, double_numbers, "replacer", 2);
    let text = json(&mut realm, "stringify", &[JsValue::Object(target), replacer]).unwrap();
    assert_eq!(text, JsValue::from(r#"{"a":2,"b":[4]}"#));
}

#[test]
fn test_proxy_of_array_serializes_as_array() {
    let mut realm = create_test_realm();
    let target = create_array_from_list(&mut realm, &[JsValue::Number(1.0), JsValue::Number(2.0)])
        .unwrap();
    let handler = obj(&mut realm, &[]);
    let proxy = proxy_create(&mut realm, &JsValue::Object(target), &JsValue::Object(handler))
        .unwrap();
    assert_eq!(stringify(&mut realm, JsValue::Object(proxy)), "[1,2]");
}

#[test]
fn test_reviver_visits_keys_depth_first() {
    let mut realm = create_test_realm();
    let reviver = native(&mut realm, record_keys, "reviver", 2);
    let text = JsValue::from(r#"{"a":{"b":1},"c":[true]}"#);
    let parsed = json(&mut realm, "parse", &[text, reviver]).unwrap();
    let global = realm.global_object();
    let seen = get(&mut realm, global, &PropertyKey::from("seen")).unwrap();
    assert_eq!(seen, JsValue::from("b|a|0|c|"));

    let parsed = parsed.as_object().unwrap();
    let a = get(&mut realm, parsed, &PropertyKey::from("a")).unwrap().as_object().unwrap();
    let b = get(&mut realm, a, &PropertyKey::from("b")).unwrap();
    assert_eq!(to_number(&mut realm, &b).unwrap(), 1.0);
}

#[test]
fn test_parse_builds_arrays_and_nested_objects() {
    let mut realm = create_test_realm();
    let parsed = json(&mut realm, "parse", &[JsValue::from(r#"[1, "two", null, {"x": false}]"#)])
        .unwrap();
    assert!(jsrealm::operations::is_array(&realm, &parsed).unwrap());
    assert_eq!(stringify(&mut realm, parsed), r#"[1,"two",null,{"x":false}]"#);
}
