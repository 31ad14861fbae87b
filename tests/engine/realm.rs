//! Realm creation, global bindings, configuration and teardown

use super::{create_test_realm, native, obj, prop};
use jsrealm::function::call;
use jsrealm::object::{get_own_property, get_prototype_of, is_extensible};
use jsrealm::operations::{create_data_property_or_throw, get, set, to_number};
use jsrealm::{
    HostConfig, JsError, JsResult, JsValue, NativeErrorKind, ObjectId, PropertyKey, Realm,
    RealmConfig,
};

const GLOBAL_CONSTRUCTORS: [&str; 17] = [
    "Object",
    "Function",
    "Array",
    "String",
    "Number",
    "Boolean",
    "Symbol",
    "Error",
    "EvalError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "TypeError",
    "URIError",
    "Promise",
    "Proxy",
    "eval",
];

#[test]
fn test_bootstrap_installs_globals() {
    let mut realm = create_test_realm();
    assert!(!realm.is_aborted());
    let global = realm.global_object();
    for name in GLOBAL_CONSTRUCTORS {
        let value = prop(&mut realm, global, name);
        assert!(value.as_object().is_some(), "{} is missing", name);
    }
    for name in ["Reflect", "JSON", "Math", "isNaN", "isFinite", "parseInt", "parseFloat"] {
        assert!(prop(&mut realm, global, name).as_object().is_some(), "{} is missing", name);
    }
    assert_eq!(prop(&mut realm, global, "Object"), JsValue::Object(realm.intrinsics.object));
    assert!(prop(&mut realm, global, "NaN").as_number().unwrap().is_nan());
    assert_eq!(prop(&mut realm, global, "Infinity"), JsValue::Number(f64::INFINITY));
}

#[test]
fn test_global_bindings_are_locked() {
    let mut realm = create_test_realm();
    let global = realm.global_object();
    for name in ["Object", "Math", "globalThis", "isNaN", "parseInt"] {
        let desc = get_own_property(&mut realm, global, &PropertyKey::from(name))
            .unwrap()
            .unwrap();
        assert_eq!(desc.writable, Some(false), "{}", name);
        assert_eq!(desc.enumerable, Some(false), "{}", name);
        assert_eq!(desc.configurable, Some(false), "{}", name);
    }

    // Sloppy assignment fails silently, strict assignment throws
    let key = PropertyKey::from("Object");
    set(&mut realm, global, &key, JsValue::Null, false).unwrap();
    assert!(matches!(
        set(&mut realm, global, &key, JsValue::Null, true),
        Err(ref err) if err.is_type_error()
    ));
    assert_eq!(prop(&mut realm, global, "Object"), JsValue::Object(realm.intrinsics.object));
}

#[test]
fn test_global_object_shape() {
    let mut realm = create_test_realm();
    let global = realm.global_object();
    assert_eq!(realm.global_this(), global);
    assert_eq!(prop(&mut realm, global, "globalThis"), JsValue::Object(global));
    assert_eq!(
        get_prototype_of(&mut realm, global).unwrap(),
        Some(realm.intrinsics.object_prototype)
    );
    assert!(is_extensible(&mut realm, global).unwrap());

    // Hosts can add their own bindings
    create_data_property_or_throw(
        &mut realm,
        global,
        &PropertyKey::from("host"),
        JsValue::from("yes"),
    )
    .unwrap();
    assert_eq!(prop(&mut realm, global, "host"), JsValue::from("yes"));
}

#[test]
fn test_realms_are_isolated() {
    let mut a = create_test_realm();
    let mut b = create_test_realm();
    let global_a = a.global_object();
    create_data_property_or_throw(
        &mut a,
        global_a,
        &PropertyKey::from("shared"),
        JsValue::Number(1.0),
    )
    .unwrap();
    let global_b = b.global_object();
    assert!(get(&mut b, global_b, &PropertyKey::from("shared")).unwrap().is_undefined());
}

#[test]
fn test_config_from_json() {
    let config = RealmConfig::from_json(r#"{"timeout_ms": 250}"#).unwrap();
    assert_eq!(config.timeout_ms, 250);
    assert_eq!(config.timeout_check_interval, RealmConfig::default().timeout_check_interval);

    let empty = RealmConfig::from_json("{}").unwrap();
    assert_eq!(empty, RealmConfig::default());
    assert_eq!(empty.timeout_ms, 3000);
    assert_eq!(empty.max_call_depth, 256);
    let limited = RealmConfig::from_json(r#"{"max_call_depth": 16}"#).unwrap();
    assert_eq!(limited.max_call_depth, 16);

    assert!(RealmConfig::from_json(r#"{"timeout_ms": "soon"}"#).is_err());

    let realm = Realm::create(HostConfig::new(config));
    assert_eq!(realm.config().timeout_ms, 250);
}

#[test]
fn test_execute_after_dispose_fails() {
    let mut realm = create_test_realm();
    assert_eq!(realm.execute(|_| Ok(7)).unwrap(), 7);
    realm.dispose();
    assert!(realm.is_disposed());
    let err = realm.execute(|_| Ok(())).unwrap_err();
    assert!(matches!(err, JsError::Internal(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_errors_materialize_with_realm_prototypes() {
    let mut realm = create_test_realm();
    let value = realm.error_to_value(JsError::range_error("too big")).unwrap();
    let error = value.as_object().unwrap();
    assert_eq!(prop(&mut realm, error, "message"), JsValue::from("too big"));
    assert_eq!(prop(&mut realm, error, "name"), JsValue::from("RangeError"));
    assert_eq!(
        get_prototype_of(&mut realm, error).unwrap(),
        Some(realm.intrinsics.range_error_prototype)
    );

    // Thrown values come back untouched
    let payload = JsValue::Object(obj(&mut realm, &[("code", JsValue::Number(3.0))]));
    assert_eq!(realm.error_to_value(JsError::thrown(payload.clone())).unwrap(), payload);
}

#[test]
fn test_native_error_kinds() {
    assert_eq!(JsError::type_error("x").native_kind(), Some(NativeErrorKind::TypeError));
    assert_eq!(JsError::syntax_error("x").native_kind(), Some(NativeErrorKind::SyntaxError));
    assert!(JsError::reference_error("x").is_reference_error());
    assert!(JsError::internal("x").native_kind().is_none());
    assert!(!JsError::internal("x").is_catchable());
}

/// `countDown(n)`: calls itself through the global binding until `n` reaches 0
fn count_down(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = to_number(realm, &args.first().cloned().unwrap_or(JsValue::Undefined))?;
    if n <= 0.0 {
        return Ok(JsValue::Number(0.0));
    }
    let global = realm.global_object();
    let me = get(realm, global, &PropertyKey::from("countDown"))?;
    let rest = call(realm, &me, &JsValue::Undefined, &[JsValue::Number(n - 1.0)])?;
    Ok(JsValue::Number(to_number(realm, &rest)? + 1.0))
}

fn realm_with_count_down(max_call_depth: u32) -> (Realm, JsValue) {
    let config = RealmConfig::default().with_max_call_depth(max_call_depth);
    let mut realm = Realm::create(HostConfig::new(config));
    let func = native(&mut realm, count_down, "countDown", 1);
    let global = realm.global_object();
    create_data_property_or_throw(&mut realm, global, &PropertyKey::from("countDown"), func.clone())
        .unwrap();
    (realm, func)
}

#[test]
fn test_recursion_within_limit() {
    let (mut realm, func) = realm_with_count_down(32);
    let result = call(&mut realm, &func, &JsValue::Undefined, &[JsValue::Number(5.0)]).unwrap();
    assert_eq!(result, JsValue::Number(5.0));
    assert_eq!(realm.call_depth(), 0);
}

#[test]
fn test_deep_recursion_is_range_error() {
    let (mut realm, func) = realm_with_count_down(32);
    let err = call(&mut realm, &func, &JsValue::Undefined, &[JsValue::Number(100.0)]).unwrap_err();
    assert_eq!(err.native_kind(), Some(NativeErrorKind::RangeError));
    assert!(err.to_string().contains("Maximum call stack size exceeded"), "{}", err);
    assert_eq!(realm.call_depth(), 0);

    // The realm stays usable after unwinding
    let result = call(&mut realm, &func, &JsValue::Undefined, &[JsValue::Number(3.0)]).unwrap();
    assert_eq!(result, JsValue::Number(3.0));
}

#[test]
fn test_zero_call_depth_disables_the_limit() {
    let (mut realm, func) = realm_with_count_down(0);
    let result = call(&mut realm, &func, &JsValue::Undefined, &[JsValue::Number(40.0)]).unwrap();
    assert_eq!(result, JsValue::Number(40.0));
}
