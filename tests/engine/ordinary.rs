//! Ordinary object internal methods

use super::{create_test_realm, native, obj, prop};
use jsrealm::object::{self, ordinary_object_create};
use jsrealm::operations::{define_property_or_throw, set};
use jsrealm::{JsResult, JsValue, ObjectId, PropertyDescriptor, PropertyKey, Realm, WellKnownSymbol};

fn keys(realm: &mut Realm, o: ObjectId) -> Vec<JsValue> {
    object::own_property_keys(realm, o).unwrap().iter().map(|k| k.to_value()).collect()
}

#[test]
fn test_own_keys_order() {
    let mut realm = create_test_realm();
    let o = obj(
        &mut realm,
        &[("b", JsValue::Null), ("10", JsValue::Null), ("a", JsValue::Null), ("2", JsValue::Null)],
    );
    let sym = WellKnownSymbol::Iterator;
    define_property_or_throw(
        &mut realm,
        o,
        &sym.key(),
        PropertyDescriptor::data_default(JsValue::Null),
    )
    .unwrap();
    let order = keys(&mut realm, o);
    assert_eq!(
        order,
        vec![
            JsValue::from("2"),
            JsValue::from("10"),
            JsValue::from("b"),
            JsValue::from("a"),
            JsValue::Symbol(sym.symbol()),
        ]
    );
}

#[test]
fn test_prototype_cycle_is_rejected() {
    let mut realm = create_test_realm();
    let a = obj(&mut realm, &[]);
    let b = ordinary_object_create(&mut realm, Some(a));
    assert!(!object::set_prototype_of(&mut realm, a, Some(b)).unwrap());
    assert!(object::set_prototype_of(&mut realm, a, None).unwrap());
    assert_eq!(object::get_prototype_of(&mut realm, a).unwrap(), None);
}

#[test]
fn test_non_extensible_prototype_is_fixed() {
    let mut realm = create_test_realm();
    let a = obj(&mut realm, &[]);
    let original = object::get_prototype_of(&mut realm, a).unwrap();
    assert!(object::prevent_extensions(&mut realm, a).unwrap());
    assert!(!object::is_extensible(&mut realm, a).unwrap());
    assert!(!object::set_prototype_of(&mut realm, a, None).unwrap());
    // Setting the same prototype again is allowed
    assert!(object::set_prototype_of(&mut realm, a, original).unwrap());
}

#[test]
fn test_set_creates_own_property_on_receiver() {
    let mut realm = create_test_realm();
    let proto = obj(&mut realm, &[("x", JsValue::Number(1.0))]);
    let child = ordinary_object_create(&mut realm, Some(proto));
    set(&mut realm, child, &PropertyKey::from("x"), JsValue::Number(2.0), true).unwrap();
    assert_eq!(prop(&mut realm, child, "x"), JsValue::Number(2.0));
    assert_eq!(prop(&mut realm, proto, "x"), JsValue::Number(1.0));
}

#[test]
fn test_inherited_read_only_blocks_set() {
    let mut realm = create_test_realm();
    let proto = obj(&mut realm, &[]);
    let read_only = PropertyDescriptor::data(JsValue::Number(1.0), false, true, true);
    define_property_or_throw(&mut realm, proto, &PropertyKey::from("x"), read_only).unwrap();
    let child = ordinary_object_create(&mut realm, Some(proto));
    let receiver = JsValue::Object(child);
    assert!(
        !object::set(&mut realm, child, &PropertyKey::from("x"), JsValue::Number(2.0), &receiver)
            .unwrap(),
    );
    let err = set(&mut realm, child, &PropertyKey::from("x"), JsValue::Number(2.0), true)
        .unwrap_err();
    assert!(err.is_type_error());
}

fn record_this(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = this.as_object().unwrap_or(realm.global_object());
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    object::define_own_property(
        realm,
        target,
        &PropertyKey::from("seen"),
        PropertyDescriptor::data_default(value),
    )?;
    Ok(JsValue::Undefined)
}

#[test]
fn test_inherited_setter_runs_with_receiver() {
    let mut realm = create_test_realm();
    let setter = native(&mut realm, record_this, "set", 1);
    let proto = obj(&mut realm, &[]);
    let accessor = PropertyDescriptor::accessor(JsValue::Undefined, setter, false, true);
    define_property_or_throw(&mut realm, proto, &PropertyKey::from("x"), accessor).unwrap();
    let child = ordinary_object_create(&mut realm, Some(proto));
    set(&mut realm, child, &PropertyKey::from("x"), JsValue::Number(5.0), true).unwrap();
    assert_eq!(prop(&mut realm, child, "seen"), JsValue::Number(5.0));
    assert_eq!(prop(&mut realm, child, "x"), JsValue::Undefined);
}

#[test]
fn test_delete_non_configurable() {
    let mut realm = create_test_realm();
    let o = obj(&mut realm, &[("a", JsValue::Null)]);
    let fixed = PropertyDescriptor::data(JsValue::Null, true, true, false);
    define_property_or_throw(&mut realm, o, &PropertyKey::from("b"), fixed).unwrap();
    assert!(object::delete(&mut realm, o, &PropertyKey::from("a")).unwrap());
    assert!(!object::delete(&mut realm, o, &PropertyKey::from("b")).unwrap());
    assert!(object::delete(&mut realm, o, &PropertyKey::from("missing")).unwrap());
    assert_eq!(keys(&mut realm, o), vec![JsValue::from("b")]);
}

#[test]
fn test_array_length_truncates() {
    let mut realm = create_test_realm();
    let values = [JsValue::Number(1.0), JsValue::Number(2.0), JsValue::Number(3.0)];
    let array = jsrealm::operations::create_array_from_list(&mut realm, &values).unwrap();
    set(&mut realm, array, &PropertyKey::from("length"), JsValue::Number(1.0), true).unwrap();
    assert_eq!(keys(&mut realm, array), vec![JsValue::from("0"), JsValue::from("length")]);

    let err = set(&mut realm, array, &PropertyKey::from("length"), JsValue::Number(-1.0), true)
        .unwrap_err();
    assert!(err.is_range_error());
}

#[test]
fn test_string_exotic_indices() {
    let mut realm = create_test_realm();
    let wrapper = jsrealm::operations::to_object(&mut realm, &JsValue::from("hi")).unwrap();
    assert_eq!(prop(&mut realm, wrapper, "1"), JsValue::from("i"));
    assert_eq!(prop(&mut realm, wrapper, "length"), JsValue::Number(2.0));
    assert!(!object::delete(&mut realm, wrapper, &PropertyKey::from("0")).unwrap());
    assert_eq!(
        keys(&mut realm, wrapper),
        vec![JsValue::from("0"), JsValue::from("1"), JsValue::from("length")],
    );
}
