//! Proxy exotic objects: traps, invariants and revocation

use super::{create_test_realm, native, obj, prop, throws_type_error};
use jsrealm::function::{call, construct, is_callable, is_constructor};
use jsrealm::object::{self, proxy::proxy_create};
use jsrealm::operations::{create_array_from_list, define_property_or_throw, get, is_array};
use jsrealm::{JsResult, JsValue, ObjectId, PropertyDescriptor, PropertyKey, Realm};

fn answer_trap(
    _realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Number(42.0))
}

fn false_trap(
    _realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(false))
}

fn empty_keys_trap(
    realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Object(create_array_from_list(realm, &[])?))
}

fn proxy_with_trap(
    realm: &mut Realm,
    target: ObjectId,
    trap: &str,
    func: jsrealm::function::NativeFn,
) -> ObjectId {
    let trap_fn = native(realm, func, trap, 3);
    let handler = obj(realm, &[(trap, trap_fn)]);
    proxy_create(realm, &JsValue::Object(target), &JsValue::Object(handler)).unwrap()
}

#[test]
fn test_empty_handler_forwards_to_target() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[("x", JsValue::Number(1.0))]);
    let handler = obj(&mut realm, &[]);
    let proxy = proxy_create(&mut realm, &JsValue::Object(target), &JsValue::Object(handler))
        .unwrap();
    assert_eq!(prop(&mut realm, proxy, "x"), JsValue::Number(1.0));
    jsrealm::operations::set(&mut realm, proxy, &PropertyKey::from("y"), JsValue::Number(2.0), true)
        .unwrap();
    assert_eq!(prop(&mut realm, target, "y"), JsValue::Number(2.0));
}

#[test]
fn test_get_trap_result_is_used() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[("x", JsValue::Number(1.0))]);
    let proxy = proxy_with_trap(&mut realm, target, "get", answer_trap);
    assert_eq!(prop(&mut realm, proxy, "x"), JsValue::Number(42.0));
    assert_eq!(prop(&mut realm, proxy, "anything"), JsValue::Number(42.0));
}

#[test]
fn test_get_trap_must_report_frozen_value() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[]);
    let fixed = PropertyDescriptor::data(JsValue::Number(1.0), false, false, false);
    define_property_or_throw(&mut realm, target, &PropertyKey::from("x"), fixed).unwrap();
    let proxy = proxy_with_trap(&mut realm, target, "get", answer_trap);
    assert!(throws_type_error(get(&mut realm, proxy, &PropertyKey::from("x"))));
}

#[test]
fn test_has_trap_cannot_hide_non_configurable() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[]);
    let fixed = PropertyDescriptor::data(JsValue::Null, true, true, false);
    define_property_or_throw(&mut realm, target, &PropertyKey::from("x"), fixed).unwrap();
    let proxy = proxy_with_trap(&mut realm, target, "has", false_trap);
    assert!(throws_type_error(object::has_property(&mut realm, proxy, &PropertyKey::from("x"))));
    assert!(!object::has_property(&mut realm, proxy, &PropertyKey::from("y")).unwrap());
}

#[test]
fn test_own_keys_must_include_non_configurable() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[]);
    let fixed = PropertyDescriptor::data(JsValue::Null, true, true, false);
    define_property_or_throw(&mut realm, target, &PropertyKey::from("x"), fixed).unwrap();
    let proxy = proxy_with_trap(&mut realm, target, "ownKeys", empty_keys_trap);
    assert!(throws_type_error(object::own_property_keys(&mut realm, proxy)));

    let open = obj(&mut realm, &[("a", JsValue::Null)]);
    let proxy = proxy_with_trap(&mut realm, open, "ownKeys", empty_keys_trap);
    assert!(object::own_property_keys(&mut realm, proxy).unwrap().is_empty());
}

#[test]
fn test_prevent_extensions_trap_must_agree() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[]);
    let proxy = proxy_with_trap(&mut realm, target, "preventExtensions", answer_trap);
    // Truthy result while the target is still extensible
    assert!(throws_type_error(object::prevent_extensions(&mut realm, proxy)));
}

#[test]
fn test_callability_follows_target() {
    let mut realm = create_test_realm();
    let handler = JsValue::Object(obj(&mut realm, &[]));
    let plain = JsValue::Object(obj(&mut realm, &[]));
    let plain_proxy = JsValue::Object(proxy_create(&mut realm, &plain, &handler).unwrap());
    assert!(!is_callable(&realm, &plain_proxy));

    let array_ctor = JsValue::Object(realm.intrinsics.array);
    let ctor_proxy = proxy_create(&mut realm, &array_ctor, &handler).unwrap();
    assert!(is_callable(&realm, &JsValue::Object(ctor_proxy)));
    assert!(is_constructor(&realm, &JsValue::Object(ctor_proxy)));
    let made = construct(&mut realm, ctor_proxy, &[JsValue::Number(2.0)], None).unwrap();
    assert_eq!(prop(&mut realm, made, "length"), JsValue::Number(2.0));

    let result = call(&mut realm, &JsValue::Object(ctor_proxy), &JsValue::Undefined, &[]).unwrap();
    assert!(is_array(&realm, &result).unwrap());
}

#[test]
fn test_is_array_sees_through_proxy() {
    let mut realm = create_test_realm();
    let array = JsValue::Object(create_array_from_list(&mut realm, &[]).unwrap());
    let handler = JsValue::Object(obj(&mut realm, &[]));
    let proxy = JsValue::Object(proxy_create(&mut realm, &array, &handler).unwrap());
    assert!(is_array(&realm, &proxy).unwrap());
}

#[test]
fn test_revoked_proxy_throws() {
    let mut realm = create_test_realm();
    let target = JsValue::Object(obj(&mut realm, &[]));
    let handler = JsValue::Object(obj(&mut realm, &[]));
    let proxy = proxy_create(&mut realm, &target, &handler).unwrap();
    object::proxy::proxy_revoke(&mut realm, proxy).unwrap();

    let key = PropertyKey::from("x");
    let receiver = JsValue::Object(proxy);
    let desc = PropertyDescriptor::data(JsValue::Null, true, true, true);
    assert!(throws_type_error(get(&mut realm, proxy, &key)));
    assert!(throws_type_error(object::set(&mut realm, proxy, &key, JsValue::Null, &receiver)));
    assert!(throws_type_error(object::has_property(&mut realm, proxy, &key)));
    assert!(throws_type_error(object::delete(&mut realm, proxy, &key)));
    assert!(throws_type_error(object::define_own_property(&mut realm, proxy, &key, desc)));
    assert!(throws_type_error(object::get_own_property(&mut realm, proxy, &key)));
    assert!(throws_type_error(object::own_property_keys(&mut realm, proxy)));
    assert!(throws_type_error(object::is_extensible(&mut realm, proxy)));
    assert!(throws_type_error(object::prevent_extensions(&mut realm, proxy)));
    assert!(throws_type_error(object::get_prototype_of(&mut realm, proxy)));
    assert!(throws_type_error(object::set_prototype_of(&mut realm, proxy, None)));
    assert!(throws_type_error(is_array(&realm, &receiver)));
}

#[test]
fn test_revoked_function_proxy_cannot_be_called() {
    let mut realm = create_test_realm();
    let array_ctor = JsValue::Object(realm.intrinsics.array);
    let handler = JsValue::Object(obj(&mut realm, &[]));
    let proxy = proxy_create(&mut realm, &array_ctor, &handler).unwrap();
    object::proxy::proxy_revoke(&mut realm, proxy).unwrap();

    // Revocation keeps the proxy's shape; only the operations fail
    assert!(is_callable(&realm, &JsValue::Object(proxy)));
    assert!(throws_type_error(call(&mut realm, &JsValue::Object(proxy), &JsValue::Undefined, &[])));
    assert!(throws_type_error(construct(&mut realm, proxy, &[], None)));
}

#[test]
fn test_prototype_cycle_through_proxy_hits_depth_limit() {
    let mut realm = create_test_realm();
    let target = obj(&mut realm, &[]);
    let handler = JsValue::Object(obj(&mut realm, &[]));
    let proxy = proxy_create(&mut realm, &JsValue::Object(target), &handler).unwrap();
    // The cycle check stops at proxies, so this is allowed
    assert!(object::set_prototype_of(&mut realm, target, Some(proxy)).unwrap());

    let err = get(&mut realm, target, &PropertyKey::from("x")).unwrap_err();
    assert!(err.is_range_error(), "{:?}", err);
    assert!(err.is_catchable());
    assert_eq!(realm.call_depth(), 0);

    // Own properties are still reachable without walking the chain
    let key = PropertyKey::from("own");
    jsrealm::operations::create_data_property_or_throw(
        &mut realm,
        target,
        &key,
        JsValue::Number(1.0),
    )
    .unwrap();
    assert_eq!(get(&mut realm, target, &key).unwrap(), JsValue::Number(1.0));
}
