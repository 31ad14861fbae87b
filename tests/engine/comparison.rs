//! Equality, relational comparison and instanceof

use super::{create_test_realm, native, obj, throws_type_error};
use jsrealm::function::{bound_function_create, construct};
use jsrealm::operations::{
    RelationalOp, instance_of, is_less_than, is_loosely_equal, is_strictly_equal,
    relational_compare, same_value, same_value_zero,
};
use jsrealm::operations::{create_data_property_or_throw, get, to_string};
use jsrealm::{JsResult, JsValue, ObjectId, PropertyKey, Realm};

#[test]
fn test_same_value_family() {
    let nan = JsValue::Number(f64::NAN);
    let zero = JsValue::Number(0.0);
    let neg_zero = JsValue::Number(-0.0);
    assert!(same_value(&nan, &nan));
    assert!(!same_value(&zero, &neg_zero));
    assert!(same_value_zero(&zero, &neg_zero));
    assert!(same_value_zero(&nan, &nan));
    assert!(!is_strictly_equal(&nan, &nan));
    assert!(is_strictly_equal(&zero, &neg_zero));
    assert!(!is_strictly_equal(&JsValue::from("1"), &JsValue::Number(1.0)));
}

#[test]
fn test_loose_equality_coerces() {
    let mut realm = create_test_realm();
    let cases = [
        (JsValue::Null, JsValue::Undefined, true),
        (JsValue::Null, JsValue::Number(0.0), false),
        (JsValue::from("1"), JsValue::Number(1.0), true),
        (JsValue::Boolean(true), JsValue::from("1"), true),
        (JsValue::from(""), JsValue::Number(0.0), true),
        (JsValue::Number(f64::NAN), JsValue::Number(f64::NAN), false),
    ];
    for (x, y, expected) in cases {
        assert_eq!(is_loosely_equal(&mut realm, &x, &y).unwrap(), expected, "{:?} == {:?}", x, y);
    }
}

#[test]
fn test_object_equality_uses_to_primitive() {
    let mut realm = create_test_realm();
    let wrapper = jsrealm::operations::to_object(&mut realm, &JsValue::Number(5.0)).unwrap();
    let wrapper = JsValue::Object(wrapper);
    assert!(is_loosely_equal(&mut realm, &wrapper, &JsValue::from("5")).unwrap());
    assert!(!is_strictly_equal(&wrapper, &JsValue::Number(5.0)));
    assert!(is_loosely_equal(&mut realm, &wrapper, &wrapper.clone()).unwrap());
}

#[test]
fn test_relational_comparison() {
    let mut realm = create_test_realm();
    let one = JsValue::Number(1.0);
    let nan = JsValue::Number(f64::NAN);
    assert_eq!(is_less_than(&mut realm, &one, &nan, true).unwrap(), None);
    assert!(!relational_compare(&mut realm, RelationalOp::LessEqual, &one, &nan).unwrap());
    assert!(!relational_compare(&mut realm, RelationalOp::GreaterEqual, &one, &nan).unwrap());

    // Strings compare by code units, not numerically
    let ten = JsValue::from("10");
    let nine = JsValue::from("9");
    assert!(relational_compare(&mut realm, RelationalOp::Less, &ten, &nine).unwrap());
    // Mixed operands compare as numbers
    assert!(
        relational_compare(&mut realm, RelationalOp::Greater, &ten, &JsValue::Number(9.0)).unwrap(),
    );
    assert!(
        relational_compare(&mut realm, RelationalOp::LessEqual, &one, &JsValue::from("1")).unwrap(),
    );
}

/// `valueOf` that appends the receiver's `tag` to the global `log` and returns 0
fn logging_value_of(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let Some(this) = this.as_object() else {
        return Ok(JsValue::Number(0.0));
    };
    let tag = get(realm, this, &PropertyKey::from("tag"))?;
    let tag = to_string(realm, &tag)?;
    let global = realm.global_object();
    let log_key = PropertyKey::from("log");
    let log = match get(realm, global, &log_key)? {
        JsValue::String(previous) => format!("{}{}", previous.as_str(), tag.as_str()),
        _ => tag.as_str().to_string(),
    };
    create_data_property_or_throw(realm, global, &log_key, JsValue::from(log))?;
    Ok(JsValue::Number(0.0))
}

/// Clear the log, run `f`, and return the order operands were converted in
fn conversion_order(realm: &mut Realm, f: impl FnOnce(&mut Realm)) -> String {
    let global = realm.global_object();
    create_data_property_or_throw(realm, global, &PropertyKey::from("log"), JsValue::from(""))
        .unwrap();
    f(realm);
    let log = get(realm, global, &PropertyKey::from("log")).unwrap();
    log.as_string().unwrap().as_str().to_string()
}

#[test]
fn test_operand_conversion_order() {
    let mut realm = create_test_realm();
    let value_of = native(&mut realm, logging_value_of, "valueOf", 0);
    let x = JsValue::Object(obj(
        &mut realm,
        &[("tag", JsValue::from("x")), ("valueOf", value_of.clone())],
    ));
    let y = JsValue::Object(obj(&mut realm, &[("tag", JsValue::from("y")), ("valueOf", value_of)]));

    let order = conversion_order(&mut realm, |realm| {
        assert_eq!(is_less_than(realm, &x, &y, true).unwrap(), Some(false));
    });
    assert_eq!(order, "xy");
    let order = conversion_order(&mut realm, |realm| {
        assert_eq!(is_less_than(realm, &x, &y, false).unwrap(), Some(false));
    });
    assert_eq!(order, "yx");

    // Every operator converts its left operand first, whichever side IsLessThan gets it on
    let ops = [
        RelationalOp::Less,
        RelationalOp::Greater,
        RelationalOp::LessEqual,
        RelationalOp::GreaterEqual,
    ];
    for op in ops {
        let order = conversion_order(&mut realm, |realm| {
            relational_compare(realm, op, &x, &y).unwrap();
        });
        assert_eq!(order, "xy", "{:?}", op);
    }
}

fn always(
    _realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Number(1.0))
}

#[test]
fn test_instance_of() {
    let mut realm = create_test_realm();
    let array_ctor = realm.intrinsics.array;
    let array = JsValue::Object(construct(&mut realm, array_ctor, &[], None).unwrap());
    let object_ctor = JsValue::Object(realm.intrinsics.object);
    assert!(instance_of(&mut realm, &array, &object_ctor).unwrap());
    assert!(!instance_of(&mut realm, &JsValue::Number(1.0), &object_ctor).unwrap());

    // Right-hand side must be an object and callable
    assert!(throws_type_error(instance_of(&mut realm, &array, &JsValue::Number(1.0))));
    let plain = JsValue::Object(obj(&mut realm, &[]));
    assert!(throws_type_error(instance_of(&mut realm, &array, &plain)));

    // Bound functions defer to their target
    let bound = bound_function_create(&mut realm, array_ctor, JsValue::Undefined, Vec::new())
        .unwrap();
    assert!(instance_of(&mut realm, &array, &JsValue::Object(bound)).unwrap());
}

#[test]
fn test_has_instance_override() {
    let mut realm = create_test_realm();
    let has_instance = native(&mut realm, always, "[Symbol.hasInstance]", 1);
    let target = obj(&mut realm, &[]);
    let key = jsrealm::WellKnownSymbol::HasInstance.key();
    jsrealm::operations::create_data_property_or_throw(&mut realm, target, &key, has_instance)
        .unwrap();
    assert!(instance_of(&mut realm, &JsValue::Null, &JsValue::Object(target)).unwrap());
}
