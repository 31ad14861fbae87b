//! Boolean constructor and Boolean.prototype

use super::{arg, create_constructor, register_method};
use crate::error::{JsError, JsResult};
use crate::function::ordinary_create_from_constructor;
use crate::object::ObjectKind;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId};

pub fn init_boolean(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.boolean_prototype;
    register_method(realm, proto, "toString", boolean_to_string, 0)?;
    register_method(realm, proto, "valueOf", boolean_value_of, 0)?;
    realm.intrinsics.boolean = create_constructor(realm, boolean_constructor, 1, "Boolean", proto)?;
    Ok(())
}

fn boolean_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let b = arg(args, 0).to_boolean();
    let Some(new_target) = nt else {
        return Ok(JsValue::Boolean(b));
    };
    let fallback = realm.intrinsics.boolean_prototype;
    let obj = ordinary_create_from_constructor(
        realm,
        new_target,
        fallback,
        ObjectKind::Boolean(b),
    )?;
    Ok(JsValue::Object(obj))
}

/// `thisBooleanValue(value)`
fn this_boolean_value(realm: &Realm, this: &JsValue) -> JsResult<bool> {
    match this {
        JsValue::Boolean(b) => return Ok(*b),
        JsValue::Object(obj) => {
            if let ObjectKind::Boolean(b) = realm.heap.get(*obj)?.kind {
                return Ok(b);
            }
        }
        _ => {}
    }
    Err(JsError::type_error("Boolean.prototype method called on an incompatible receiver"))
}

fn boolean_to_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let b = this_boolean_value(realm, this)?;
    Ok(JsValue::from(if b { "true" } else { "false" }))
}

fn boolean_value_of(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(this_boolean_value(realm, this)?))
}
