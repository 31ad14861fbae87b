//! Object constructor and Object.prototype

use super::{arg, create_constructor, plain_object, register_method};
use crate::error::{JsError, JsResult};
use crate::function::ordinary_create_from_constructor;
use crate::object::{self, ObjectKind};
use crate::operations::{
    EnumerableKind, IntegrityLevel, create_array_from_list, create_data_property_or_throw,
    define_property_or_throw, enumerable_own_properties, from_property_descriptor, get,
    get_iterator, has_own_property, invoke, iterator_close, iterator_step_value,
    require_object_coercible, same_value, set, set_integrity_level, test_integrity_level, to_object,
    to_property_descriptor, to_property_key,
};
use crate::operations::comparison::is_prototype_of;
use crate::operations::object::object_to_string_tag;
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

/// Initialize Object.prototype methods and the Object constructor
pub fn init_object(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.object_prototype;
    register_method(realm, proto, "hasOwnProperty", object_has_own_property, 1)?;
    register_method(realm, proto, "isPrototypeOf", object_is_prototype_of, 1)?;
    register_method(realm, proto, "propertyIsEnumerable", object_property_is_enumerable, 1)?;
    register_method(realm, proto, "toLocaleString", object_to_locale_string, 0)?;
    register_method(realm, proto, "toString", object_to_string, 0)?;
    register_method(realm, proto, "valueOf", object_value_of, 0)?;

    let ctor = create_constructor(realm, object_constructor, 1, "Object", proto)?;
    realm.intrinsics.object = ctor;
    register_method(realm, ctor, "assign", object_assign, 2)?;
    register_method(realm, ctor, "create", object_create, 2)?;
    register_method(realm, ctor, "defineProperties", object_define_properties, 2)?;
    register_method(realm, ctor, "defineProperty", object_define_property, 3)?;
    register_method(realm, ctor, "entries", object_entries, 1)?;
    register_method(realm, ctor, "freeze", object_freeze, 1)?;
    register_method(realm, ctor, "fromEntries", object_from_entries, 1)?;
    register_method(
        realm,
        ctor,
        "getOwnPropertyDescriptor",
        object_get_own_property_descriptor,
        2,
    )?;
    register_method(
        realm,
        ctor,
        "getOwnPropertyDescriptors",
        object_get_own_property_descriptors,
        1,
    )?;
    register_method(realm, ctor, "getOwnPropertyNames", object_get_own_property_names, 1)?;
    register_method(realm, ctor, "getOwnPropertySymbols", object_get_own_property_symbols, 1)?;
    register_method(realm, ctor, "getPrototypeOf", object_get_prototype_of, 1)?;
    register_method(realm, ctor, "hasOwn", object_has_own, 2)?;
    register_method(realm, ctor, "is", object_is, 2)?;
    register_method(realm, ctor, "isExtensible", object_is_extensible, 1)?;
    register_method(realm, ctor, "isFrozen", object_is_frozen, 1)?;
    register_method(realm, ctor, "isSealed", object_is_sealed, 1)?;
    register_method(realm, ctor, "keys", object_keys, 1)?;
    register_method(realm, ctor, "preventExtensions", object_prevent_extensions, 1)?;
    register_method(realm, ctor, "seal", object_seal, 1)?;
    register_method(realm, ctor, "setPrototypeOf", object_set_prototype_of, 2)?;
    register_method(realm, ctor, "values", object_values, 1)?;
    Ok(())
}

/// Object(value)
fn object_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    if let Some(new_target) = nt {
        if new_target != realm.intrinsics.object {
            let fallback = realm.intrinsics.object_prototype;
            let obj = ordinary_create_from_constructor(
                realm,
                new_target,
                fallback,
                ObjectKind::Ordinary,
            )?;
            return Ok(JsValue::Object(obj));
        }
    }
    let value = arg(args, 0);
    if value.is_null_or_undefined() {
        return Ok(JsValue::Object(plain_object(realm)));
    }
    Ok(JsValue::Object(to_object(realm, &value)?))
}

fn require_object(value: &JsValue, method: &str) -> JsResult<ObjectId> {
    match value {
        JsValue::Object(obj) => Ok(*obj),
        _ => Err(JsError::type_error(format!("{} called on non-object", method))),
    }
}

// =============================================================================
// Object.prototype
// =============================================================================

fn object_has_own_property(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let key = to_property_key(realm, &arg(args, 0))?;
    let obj = to_object(realm, this)?;
    Ok(JsValue::Boolean(has_own_property(realm, obj, &key)?))
}

fn object_is_prototype_of(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let JsValue::Object(value) = arg(args, 0) else {
        return Ok(JsValue::Boolean(false));
    };
    let proto = to_object(realm, this)?;
    Ok(JsValue::Boolean(is_prototype_of(realm, proto, value)?))
}

fn object_property_is_enumerable(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let key = to_property_key(realm, &arg(args, 0))?;
    let obj = to_object(realm, this)?;
    let enumerable = object::get_own_property(realm, obj, &key)?
        .is_some_and(|desc| desc.is_enumerable());
    Ok(JsValue::Boolean(enumerable))
}

fn object_to_locale_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    invoke(realm, this, &PropertyKey::from("toString"), &[])
}

fn object_to_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::from(object_to_string_tag(realm, this)?))
}

fn object_value_of(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Object(to_object(realm, this)?))
}

// =============================================================================
// Object.*
// =============================================================================

/// Object.assign(target, ...sources)
fn object_assign(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = to_object(realm, &arg(args, 0))?;
    for source in args.iter().skip(1) {
        if source.is_null_or_undefined() {
            continue;
        }
        let from = to_object(realm, source)?;
        for key in object::own_property_keys(realm, from)? {
            let Some(desc) = object::get_own_property(realm, from, &key)? else {
                continue;
            };
            if desc.is_enumerable() {
                let value = get(realm, from, &key)?;
                set(realm, target, &key, value, true)?;
            }
        }
    }
    Ok(JsValue::Object(target))
}

/// Object.create(proto, properties)
fn object_create(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let proto = match arg(args, 0) {
        JsValue::Object(proto) => Some(proto),
        JsValue::Null => None,
        other => {
            return Err(JsError::type_error(format!(
                "Object prototype may only be an Object or null: {:?}",
                other
            )));
        }
    };
    let obj = object::ordinary_object_create(realm, proto);
    let properties = arg(args, 1);
    if !properties.is_undefined() {
        object_define_properties_impl(realm, obj, &properties)?;
    }
    Ok(JsValue::Object(obj))
}

/// `ObjectDefineProperties(O, Properties)`
fn object_define_properties_impl(
    realm: &mut Realm,
    obj: ObjectId,
    properties: &JsValue,
) -> JsResult<()> {
    let props = to_object(realm, properties)?;
    let mut descriptors: Vec<(PropertyKey, PropertyDescriptor)> = Vec::new();
    for key in object::own_property_keys(realm, props)? {
        let Some(prop) = object::get_own_property(realm, props, &key)? else {
            continue;
        };
        if !prop.is_enumerable() {
            continue;
        }
        let desc_obj = get(realm, props, &key)?;
        descriptors.push((key, to_property_descriptor(realm, &desc_obj)?));
    }
    for (key, desc) in descriptors {
        define_property_or_throw(realm, obj, &key, desc)?;
    }
    Ok(())
}

fn object_define_properties(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = arg(args, 0);
    let obj = require_object(&target, "Object.defineProperties")?;
    object_define_properties_impl(realm, obj, &arg(args, 1))?;
    Ok(target)
}

/// Object.defineProperty(O, P, Attributes)
fn object_define_property(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = arg(args, 0);
    let obj = require_object(&target, "Object.defineProperty")?;
    let key = to_property_key(realm, &arg(args, 1))?;
    let desc = to_property_descriptor(realm, &arg(args, 2))?;
    define_property_or_throw(realm, obj, &key, desc)?;
    Ok(target)
}

fn object_entries(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, &arg(args, 0))?;
    let entries = enumerable_own_properties(realm, obj, EnumerableKind::Entries)?;
    Ok(JsValue::Object(create_array_from_list(realm, &entries)?))
}

fn object_keys(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, &arg(args, 0))?;
    let keys = enumerable_own_properties(realm, obj, EnumerableKind::Keys)?;
    Ok(JsValue::Object(create_array_from_list(realm, &keys)?))
}

fn object_values(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, &arg(args, 0))?;
    let values = enumerable_own_properties(realm, obj, EnumerableKind::Values)?;
    Ok(JsValue::Object(create_array_from_list(realm, &values)?))
}

fn integrity(realm: &mut Realm, value: JsValue, level: IntegrityLevel) -> JsResult<JsValue> {
    let JsValue::Object(obj) = value else {
        return Ok(value);
    };
    if !set_integrity_level(realm, obj, level)? {
        return Err(JsError::type_error("Cannot change the integrity level of this object"));
    }
    Ok(value)
}

fn object_freeze(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    integrity(realm, arg(args, 0), IntegrityLevel::Frozen)
}

fn object_seal(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    integrity(realm, arg(args, 0), IntegrityLevel::Sealed)
}

fn object_is_frozen(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    match arg(args, 0) {
        JsValue::Object(obj) => {
            Ok(JsValue::Boolean(test_integrity_level(realm, obj, IntegrityLevel::Frozen)?))
        }
        _ => Ok(JsValue::Boolean(true)),
    }
}

fn object_is_sealed(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    match arg(args, 0) {
        JsValue::Object(obj) => {
            Ok(JsValue::Boolean(test_integrity_level(realm, obj, IntegrityLevel::Sealed)?))
        }
        _ => Ok(JsValue::Boolean(true)),
    }
}

fn object_is_extensible(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    match arg(args, 0) {
        JsValue::Object(obj) => Ok(JsValue::Boolean(object::is_extensible(realm, obj)?)),
        _ => Ok(JsValue::Boolean(false)),
    }
}

fn object_prevent_extensions(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let value = arg(args, 0);
    if let JsValue::Object(obj) = value {
        if !object::prevent_extensions(realm, obj)? {
            return Err(JsError::type_error("Cannot prevent extensions"));
        }
    }
    Ok(value)
}

/// Object.fromEntries(iterable)
fn object_from_entries(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let iterable = arg(args, 0);
    require_object_coercible(&iterable)?;
    let obj = plain_object(realm);
    let mut record = get_iterator(realm, &iterable)?;
    while let Some(entry) = iterator_step_value(realm, &mut record)? {
        let added = add_entry(realm, obj, &entry);
        if let Err(err) = added {
            return iterator_close(realm, &record, Err(err));
        }
    }
    Ok(JsValue::Object(obj))
}

fn add_entry(realm: &mut Realm, obj: ObjectId, entry: &JsValue) -> JsResult<()> {
    let JsValue::Object(entry) = entry else {
        return Err(JsError::type_error(format!(
            "Iterator value {:?} is not an entry object",
            entry,
        )));
    };
    let key = get(realm, *entry, &PropertyKey::from(0u32))?;
    let value = get(realm, *entry, &PropertyKey::from(1u32))?;
    let key = to_property_key(realm, &key)?;
    create_data_property_or_throw(realm, obj, &key, value)
}

fn object_get_own_property_descriptor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, &arg(args, 0))?;
    let key = to_property_key(realm, &arg(args, 1))?;
    let desc = object::get_own_property(realm, obj, &key)?;
    from_property_descriptor(realm, desc.as_ref())
}

fn object_get_own_property_descriptors(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, &arg(args, 0))?;
    let result = plain_object(realm);
    for key in object::own_property_keys(realm, obj)? {
        let desc = object::get_own_property(realm, obj, &key)?;
        let desc = from_property_descriptor(realm, desc.as_ref())?;
        if !desc.is_undefined() {
            create_data_property_or_throw(realm, result, &key, desc)?;
        }
    }
    Ok(JsValue::Object(result))
}

/// `GetOwnPropertyKeys(O, type)`
fn own_keys_of_type(realm: &mut Realm, value: &JsValue, symbols: bool) -> JsResult<JsValue> {
    let obj = to_object(realm, value)?;
    let keys: Vec<JsValue> = object::own_property_keys(realm, obj)?
        .into_iter()
        .filter(|key| key.is_symbol() == symbols)
        .map(|key| key.to_value())
        .collect();
    Ok(JsValue::Object(create_array_from_list(realm, &keys)?))
}

fn object_get_own_property_names(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    own_keys_of_type(realm, &arg(args, 0), false)
}

fn object_get_own_property_symbols(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    own_keys_of_type(realm, &arg(args, 0), true)
}

fn object_get_prototype_of(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, &arg(args, 0))?;
    Ok(object::get_prototype_of(realm, obj)?.map_or(JsValue::Null, JsValue::Object))
}

/// Object.setPrototypeOf(O, proto)
fn object_set_prototype_of(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let target = arg(args, 0);
    require_object_coercible(&target)?;
    let proto = match arg(args, 1) {
        JsValue::Object(proto) => Some(proto),
        JsValue::Null => None,
        _ => return Err(JsError::type_error("Object prototype may only be an Object or null")),
    };
    let JsValue::Object(obj) = target else {
        return Ok(target);
    };
    if !object::set_prototype_of(realm, obj, proto)? {
        return Err(JsError::type_error("Object.setPrototypeOf failed"));
    }
    Ok(target)
}

fn object_has_own(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, &arg(args, 0))?;
    let key = to_property_key(realm, &arg(args, 1))?;
    Ok(JsValue::Boolean(has_own_property(realm, obj, &key)?))
}

fn object_is(
    _realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(same_value(&arg(args, 0), &arg(args, 1))))
}
