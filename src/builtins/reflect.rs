//! The Reflect namespace object
//!
//! Each method forwards to the matching internal method after checking that the
//! target is an object; it never falls back to a wrapper the way `Object.*` does.

use super::array::define_to_string_tag;
use super::{arg, plain_object, register_method};
use crate::error::{JsError, JsResult};
use crate::function::{call, construct, is_callable, is_constructor};
use crate::object;
use crate::operations::{
    ListElementTypes, create_array_from_list, create_list_from_array_like, from_property_descriptor,
    to_property_descriptor, to_property_key,
};
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId};

pub fn init_reflect(realm: &mut Realm) -> JsResult<()> {
    let reflect = plain_object(realm);
    register_method(realm, reflect, "apply", reflect_apply, 3)?;
    register_method(realm, reflect, "construct", reflect_construct, 2)?;
    register_method(realm, reflect, "defineProperty", reflect_define_property, 3)?;
    register_method(realm, reflect, "deleteProperty", reflect_delete_property, 2)?;
    register_method(realm, reflect, "get", reflect_get, 2)?;
    register_method(
        realm,
        reflect,
        "getOwnPropertyDescriptor",
        reflect_get_own_property_descriptor,
        2,
    )?;
    register_method(realm, reflect, "getPrototypeOf", reflect_get_prototype_of, 1)?;
    register_method(realm, reflect, "has", reflect_has, 2)?;
    register_method(realm, reflect, "isExtensible", reflect_is_extensible, 1)?;
    register_method(realm, reflect, "ownKeys", reflect_own_keys, 1)?;
    register_method(realm, reflect, "preventExtensions", reflect_prevent_extensions, 1)?;
    register_method(realm, reflect, "set", reflect_set, 3)?;
    register_method(realm, reflect, "setPrototypeOf", reflect_set_prototype_of, 2)?;
    define_to_string_tag(realm, reflect, "Reflect")?;
    realm.intrinsics.reflect = reflect;
    Ok(())
}

fn target_object(value: &JsValue, method: &str) -> JsResult<ObjectId> {
    match value {
        JsValue::Object(obj) => Ok(*obj),
        _ => Err(JsError::type_error(format!("Reflect.{} called on non-object", method))),
    }
}

/// Prototype argument for `setPrototypeOf`: an object or null
fn proto_arg(value: &JsValue) -> JsResult<Option<ObjectId>> {
    match value {
        JsValue::Object(obj) => Ok(Some(*obj)),
        JsValue::Null => Ok(None),
        _ => Err(JsError::type_error("Object prototype may only be an Object or null")),
    }
}

fn reflect_apply(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = arg(args, 0);
    if !is_callable(realm, &target) {
        return Err(JsError::type_error("Reflect.apply target is not callable"));
    }
    let list = create_list_from_array_like(realm, &arg(args, 2), ListElementTypes::All)?;
    call(realm, &target, &arg(args, 1), &list)
}

fn reflect_construct(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = arg(args, 0);
    let JsValue::Object(target_obj) = target else {
        return Err(JsError::type_error("Reflect.construct target is not a constructor"));
    };
    if !is_constructor(realm, &target) {
        return Err(JsError::type_error("Reflect.construct target is not a constructor"));
    }
    let new_target = match args.get(2) {
        None => target_obj,
        Some(nt) => match nt {
            JsValue::Object(obj) if is_constructor(realm, nt) => *obj,
            _ => {
                return Err(JsError::type_error(
                    "Reflect.construct newTarget is not a constructor",
                ));
            }
        },
    };
    let list = create_list_from_array_like(realm, &arg(args, 1), ListElementTypes::All)?;
    Ok(JsValue::Object(construct(realm, target_obj, &list, Some(new_target))?))
}

fn reflect_define_property(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "defineProperty")?;
    let key = to_property_key(realm, &arg(args, 1))?;
    let desc = to_property_descriptor(realm, &arg(args, 2))?;
    Ok(JsValue::Boolean(object::define_own_property(realm, target, &key, desc)?))
}

fn reflect_delete_property(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "deleteProperty")?;
    let key = to_property_key(realm, &arg(args, 1))?;
    Ok(JsValue::Boolean(object::delete(realm, target, &key)?))
}

fn reflect_get(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "get")?;
    let key = to_property_key(realm, &arg(args, 1))?;
    let receiver = args.get(2).cloned().unwrap_or(JsValue::Object(target));
    object::get(realm, target, &key, &receiver)
}

fn reflect_get_own_property_descriptor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "getOwnPropertyDescriptor")?;
    let key = to_property_key(realm, &arg(args, 1))?;
    let desc = object::get_own_property(realm, target, &key)?;
    from_property_descriptor(realm, desc.as_ref())
}

fn reflect_get_prototype_of(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "getPrototypeOf")?;
    Ok(object::get_prototype_of(realm, target)?.map_or(JsValue::Null, JsValue::Object))
}

fn reflect_has(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "has")?;
    let key = to_property_key(realm, &arg(args, 1))?;
    Ok(JsValue::Boolean(object::has_property(realm, target, &key)?))
}

fn reflect_is_extensible(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "isExtensible")?;
    Ok(JsValue::Boolean(object::is_extensible(realm, target)?))
}

fn reflect_own_keys(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "ownKeys")?;
    let keys: Vec<JsValue> = object::own_property_keys(realm, target)?
        .iter()
        .map(|k| k.to_value())
        .collect();
    Ok(JsValue::Object(create_array_from_list(realm, &keys)?))
}

fn reflect_prevent_extensions(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "preventExtensions")?;
    Ok(JsValue::Boolean(object::prevent_extensions(realm, target)?))
}

fn reflect_set(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "set")?;
    let key = to_property_key(realm, &arg(args, 1))?;
    let receiver = args.get(3).cloned().unwrap_or(JsValue::Object(target));
    Ok(JsValue::Boolean(object::set(realm, target, &key, arg(args, 2), &receiver)?))
}

fn reflect_set_prototype_of(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = target_object(&arg(args, 0), "setPrototypeOf")?;
    let proto = proto_arg(&arg(args, 1))?;
    Ok(JsValue::Boolean(object::set_prototype_of(realm, target, proto)?))
}
