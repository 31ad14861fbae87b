//! Property descriptor validation through `[[DefineOwnProperty]]`

use super::{create_test_realm, native, obj, prop, throws_type_error};
use jsrealm::object::{define_own_property, get_own_property, prevent_extensions};
use jsrealm::operations::{from_property_descriptor, get, to_property_descriptor};
use jsrealm::{JsResult, JsValue, ObjectId, PropertyDescriptor, PropertyKey, Realm};

fn key(name: &str) -> PropertyKey {
    PropertyKey::from(name)
}

fn noop(
    _realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Number(7.0))
}

#[test]
fn test_missing_fields_default_to_false() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[]);
    let desc = PropertyDescriptor {
        value: Some(JsValue::Number(1.0)),
        ..PropertyDescriptor::default()
    };
    assert!(define_own_property(&mut realm, o, &key("x"), desc).unwrap());
    let own = get_own_property(&mut realm, o, &key("x")).unwrap().unwrap();
    assert_eq!(own.writable, Some(false));
    assert_eq!(own.enumerable, Some(false));
    assert_eq!(own.configurable, Some(false));
}

#[test]
fn test_non_configurable_cannot_be_redefined() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[]);
    let frozen = PropertyDescriptor::data(JsValue::Number(1.0), false, false, false);
    assert!(define_own_property(&mut realm, o, &key("x"), frozen).unwrap());

    let enumerable = PropertyDescriptor::default().with_enumerable(true);
    assert!(!define_own_property(&mut realm, o, &key("x"), enumerable).unwrap());
    let writable = PropertyDescriptor::default().with_writable(true);
    assert!(!define_own_property(&mut realm, o, &key("x"), writable).unwrap());
    let other_value = PropertyDescriptor::default().with_value(JsValue::Number(2.0));
    assert!(!define_own_property(&mut realm, o, &key("x"), other_value).unwrap());

    // Same value (by SameValue) is accepted
    let same_value = PropertyDescriptor::default().with_value(JsValue::Number(1.0));
    assert!(define_own_property(&mut realm, o, &key("x"), same_value).unwrap());
}

#[test]
fn test_signed_zero_is_a_different_value() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[]);
    let zero = PropertyDescriptor::data(JsValue::Number(0.0), false, false, false);
    assert!(define_own_property(&mut realm, o, &key("z"), zero).unwrap());
    let negative = PropertyDescriptor::default().with_value(JsValue::Number(-0.0));
    assert!(!define_own_property(&mut realm, o, &key("z"), negative).unwrap());
}

#[test]
fn test_configurable_data_becomes_accessor() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[("x", JsValue::Number(1.0))]);
    let getter = native(&mut realm, noop, "get", 0);
    let desc = PropertyDescriptor::default().with_get(getter);
    assert!(define_own_property(&mut realm, o, &key("x"), desc).unwrap());

    let own = get_own_property(&mut realm, o, &key("x")).unwrap().unwrap();
    assert!(own.is_accessor_descriptor());
    // Enumerable and configurable are carried over from the data property
    assert_eq!(own.enumerable, Some(true));
    assert_eq!(own.configurable, Some(true));
    assert_eq!(own.set, Some(JsValue::Undefined));
    assert_eq!(prop(&mut realm, o, "x"), JsValue::Number(7.0));
}

#[test]
fn test_non_extensible_rejects_new_properties() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[("x", JsValue::Number(1.0))]);
    assert!(prevent_extensions(&mut realm, o).unwrap());
    let desc = PropertyDescriptor::data_default(JsValue::Null);
    assert!(!define_own_property(&mut realm, o, &key("y"), desc).unwrap());
    // Existing properties remain writable
    let update = PropertyDescriptor::default().with_value(JsValue::Number(2.0));
    assert!(define_own_property(&mut realm, o, &key("x"), update).unwrap());
}

#[test]
fn test_to_property_descriptor_validation() {
    let mut realm = create_test_realm();
    let not_callable = obj(&mut realm, &[("get", JsValue::Number(1.0))]);
    assert!(throws_type_error(to_property_descriptor(&mut realm, &JsValue::Object(not_callable))));

    let getter = native(&mut realm, noop, "get", 0);
    let mixed = obj(&mut realm, &[("get", getter), ("value", JsValue::Number(1.0))]);
    assert!(throws_type_error(to_property_descriptor(&mut realm, &JsValue::Object(mixed))));

    assert!(throws_type_error(to_property_descriptor(&mut realm, &JsValue::Number(1.0))));
}

#[test]
fn test_from_property_descriptor_builds_object() {
    let mut realm = create_test_realm();
    let desc = PropertyDescriptor::data(JsValue::from("v"), true, false, true);
    let value = from_property_descriptor(&mut realm, Some(&desc)).unwrap();
    let o = value.as_object().unwrap();
    assert_eq!(prop(&mut realm, o, "value"), JsValue::from("v"));
    assert_eq!(prop(&mut realm, o, "writable"), JsValue::Boolean(true));
    assert_eq!(prop(&mut realm, o, "enumerable"), JsValue::Boolean(false));
    assert_eq!(get(&mut realm, o, &key("get")).unwrap(), JsValue::Undefined);

    assert_eq!(from_property_descriptor(&mut realm, None).unwrap(), JsValue::Undefined);
}

fn assert_same_descriptor(actual: &PropertyDescriptor, expected: &PropertyDescriptor) {
    assert_eq!(actual.value, expected.value);
    assert_eq!(actual.writable, expected.writable);
    assert_eq!(actual.get, expected.get);
    assert_eq!(actual.set, expected.set);
    assert_eq!(actual.enumerable, expected.enumerable);
    assert_eq!(actual.configurable, expected.configurable);
}

#[test]
fn test_redefining_with_the_same_descriptor_is_a_no_op() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[]);
    let getter = native(&mut realm, noop, "get", 0);
    let cases = [
        ("data", PropertyDescriptor::data(JsValue::from("v"), false, true, false)),
        ("accessor", PropertyDescriptor::accessor(getter, JsValue::Undefined, false, false)),
    ];
    for (name, desc) in cases {
        assert!(define_own_property(&mut realm, o, &key(name), desc.clone()).unwrap());
        let first = get_own_property(&mut realm, o, &key(name)).unwrap().unwrap();
        assert!(define_own_property(&mut realm, o, &key(name), desc.clone()).unwrap(), "{}", name);
        let second = get_own_property(&mut realm, o, &key(name)).unwrap().unwrap();
        assert_same_descriptor(&second, &first);
        assert_same_descriptor(&second, &desc);
    }
}

#[test]
fn test_locking_a_property_then_changing_its_value() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[]);
    let open = PropertyDescriptor::data(JsValue::Number(1.0), true, true, true);
    assert!(define_own_property(&mut realm, o, &key("x"), open).unwrap());

    let locked = PropertyDescriptor::data(JsValue::Number(1.0), false, true, false);
    assert!(define_own_property(&mut realm, o, &key("x"), locked.clone()).unwrap());

    let changed = PropertyDescriptor::default().with_value(JsValue::Number(2.0));
    assert!(!define_own_property(&mut realm, o, &key("x"), changed).unwrap());
    let own = get_own_property(&mut realm, o, &key("x")).unwrap().unwrap();
    assert_same_descriptor(&own, &locked);
}
