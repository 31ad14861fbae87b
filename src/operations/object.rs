//! Operations on objects

use super::conversion::{to_length, to_object, to_property_key, to_string};
use crate::error::{JsError, JsResult};
use crate::function::{call, is_callable, is_constructor};
use crate::object::array::array_create;
use crate::object::proxy::proxy_target;
use crate::object::{self, ObjectKind};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// `Get(O, P)`
pub fn get(realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<JsValue> {
    object::get(realm, obj, key, &JsValue::Object(obj))
}

/// `GetV(V, P)`: property lookup on any value, boxing primitives for the lookup only
pub fn get_v(realm: &mut Realm, value: &JsValue, key: &PropertyKey) -> JsResult<JsValue> {
    let obj = to_object(realm, value)?;
    object::get(realm, obj, key, value)
}

/// `Set(O, P, V, Throw)`
pub fn set(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    value: JsValue,
    throw: bool,
) -> JsResult<()> {
    let succeeded = object::set(realm, obj, key, value, &JsValue::Object(obj))?;
    if !succeeded && throw {
        return Err(JsError::type_error(format!(
            "Cannot assign to read only property '{}'",
            key
        )));
    }
    Ok(())
}

/// `CreateDataProperty(O, P, V)`
pub fn create_data_property(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    value: JsValue,
) -> JsResult<bool> {
    object::define_own_property(realm, obj, key, PropertyDescriptor::data_default(value))
}

/// `CreateDataPropertyOrThrow(O, P, V)`
pub fn create_data_property_or_throw(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    value: JsValue,
) -> JsResult<()> {
    if !create_data_property(realm, obj, key, value)? {
        return Err(JsError::type_error(format!("Cannot define property '{}'", key)));
    }
    Ok(())
}

/// `DefinePropertyOrThrow(O, P, desc)`
pub fn define_property_or_throw(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    desc: PropertyDescriptor,
) -> JsResult<()> {
    if !object::define_own_property(realm, obj, key, desc)? {
        return Err(JsError::type_error(format!("Cannot redefine property: {}", key)));
    }
    Ok(())
}

/// `DeletePropertyOrThrow(O, P)`
pub fn delete_property_or_throw(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
) -> JsResult<()> {
    if !object::delete(realm, obj, key)? {
        return Err(JsError::type_error(format!("Cannot delete property '{}'", key)));
    }
    Ok(())
}

/// `GetMethod(V, P)`: `None` when the property is undefined or null
pub fn get_method(
    realm: &mut Realm,
    value: &JsValue,
    key: &PropertyKey,
) -> JsResult<Option<JsValue>> {
    let func = get_v(realm, value, key)?;
    if func.is_null_or_undefined() {
        return Ok(None);
    }
    if !is_callable(realm, &func) {
        return Err(JsError::type_error(format!("{} is not a function", key)));
    }
    Ok(Some(func))
}

/// `HasProperty(O, P)`
pub fn has_property(realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
    object::has_property(realm, obj, key)
}

/// `HasOwnProperty(O, P)`
pub fn has_own_property(realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
    Ok(object::get_own_property(realm, obj, key)?.is_some())
}

/// `Invoke(V, P, args)`
pub fn invoke(
    realm: &mut Realm,
    value: &JsValue,
    key: &PropertyKey,
    args: &[JsValue],
) -> JsResult<JsValue> {
    let func = get_v(realm, value, key)?;
    call(realm, &func, value, args)
}

/// Level for `SetIntegrityLevel` / `TestIntegrityLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityLevel {
    Sealed,
    Frozen,
}

/// `SetIntegrityLevel(O, level)`
pub fn set_integrity_level(
    realm: &mut Realm,
    obj: ObjectId,
    level: IntegrityLevel,
) -> JsResult<bool> {
    if !object::prevent_extensions(realm, obj)? {
        return Ok(false);
    }
    let keys = object::own_property_keys(realm, obj)?;
    for key in keys {
        let desc = match level {
            IntegrityLevel::Sealed => PropertyDescriptor::default().with_configurable(false),
            IntegrityLevel::Frozen => {
                let Some(current) = object::get_own_property(realm, obj, &key)? else {
                    continue;
                };
                if current.is_accessor_descriptor() {
                    PropertyDescriptor::default().with_configurable(false)
                } else {
                    PropertyDescriptor::default()
                        .with_configurable(false)
                        .with_writable(false)
                }
            }
        };
        define_property_or_throw(realm, obj, &key, desc)?;
    }
    Ok(true)
}

/// `TestIntegrityLevel(O, level)`
pub fn test_integrity_level(
    realm: &mut Realm,
    obj: ObjectId,
    level: IntegrityLevel,
) -> JsResult<bool> {
    if object::is_extensible(realm, obj)? {
        return Ok(false);
    }
    for key in object::own_property_keys(realm, obj)? {
        if let Some(current) = object::get_own_property(realm, obj, &key)? {
            if current.is_configurable() {
                return Ok(false);
            }
            if level == IntegrityLevel::Frozen
                && current.is_data_descriptor()
                && current.is_writable()
            {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// `CreateArrayFromList(elements)`
pub fn create_array_from_list(realm: &mut Realm, elements: &[JsValue]) -> JsResult<ObjectId> {
    let array = array_create(realm, 0, None)?;
    for (index, element) in elements.iter().enumerate() {
        create_data_property_or_throw(
            realm,
            array,
            &PropertyKey::from(index as u32),
            element.clone(),
        )?;
    }
    Ok(array)
}

/// `LengthOfArrayLike(obj)`
pub fn length_of_array_like(realm: &mut Realm, obj: ObjectId) -> JsResult<u64> {
    let len = get(realm, obj, &PropertyKey::from("length"))?;
    to_length(realm, &len)
}

/// Element types accepted by `CreateListFromArrayLike`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListElementTypes {
    All,
    /// Strings and symbols only
    PropertyKeys,
}

/// `CreateListFromArrayLike(obj, elementTypes)`
pub fn create_list_from_array_like(
    realm: &mut Realm,
    value: &JsValue,
    element_types: ListElementTypes,
) -> JsResult<Vec<JsValue>> {
    let JsValue::Object(obj) = value else {
        return Err(JsError::type_error("CreateListFromArrayLike called on non-object"));
    };
    let len = length_of_array_like(realm, *obj)?;
    let mut list = Vec::new();
    for index in 0..len {
        let next = get(realm, *obj, &index_key(index))?;
        if element_types == ListElementTypes::PropertyKeys
            && !(next.is_string() || next.is_symbol())
        {
            return Err(JsError::type_error(format!("{:?} is not a valid property name", next)));
        }
        list.push(next);
    }
    Ok(list)
}

/// Key for an index that may exceed the array-index range
pub fn index_key(index: u64) -> PropertyKey {
    match u32::try_from(index) {
        Ok(i) => PropertyKey::from(i),
        Err(_) => PropertyKey::from(index.to_string()),
    }
}

/// Which parts `EnumerableOwnProperties` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerableKind {
    Keys,
    Values,
    Entries,
}

/// `EnumerableOwnProperties(O, kind)`
pub fn enumerable_own_properties(
    realm: &mut Realm,
    obj: ObjectId,
    kind: EnumerableKind,
) -> JsResult<Vec<JsValue>> {
    let keys = object::own_property_keys(realm, obj)?;
    let mut properties = Vec::new();
    for key in keys {
        if key.is_symbol() {
            continue;
        }
        let Some(desc) = object::get_own_property(realm, obj, &key)? else {
            continue;
        };
        if !desc.is_enumerable() {
            continue;
        }
        match kind {
            EnumerableKind::Keys => properties.push(key.to_value()),
            EnumerableKind::Values => properties.push(get(realm, obj, &key)?),
            EnumerableKind::Entries => {
                let value = get(realm, obj, &key)?;
                let entry = create_array_from_list(realm, &[key.to_value(), value])?;
                properties.push(JsValue::Object(entry));
            }
        }
    }
    Ok(properties)
}

/// `IsArray(argument)`, looking through proxies
pub fn is_array(realm: &Realm, value: &JsValue) -> JsResult<bool> {
    let &JsValue::Object(mut obj) = value else {
        return Ok(false);
    };
    loop {
        match &realm.heap.get(obj)?.kind {
            ObjectKind::Array => return Ok(true),
            ObjectKind::Proxy(_) => match proxy_target(realm, obj)? {
                Some(target) => obj = target,
                None => return Ok(false),
            },
            _ => return Ok(false),
        }
    }
}

/// `SpeciesConstructor(O, defaultConstructor)`
pub fn species_constructor(
    realm: &mut Realm,
    obj: ObjectId,
    default: ObjectId,
) -> JsResult<ObjectId> {
    let constructor = get(realm, obj, &PropertyKey::from("constructor"))?;
    let constructor = match constructor {
        JsValue::Undefined => return Ok(default),
        JsValue::Object(c) => c,
        _ => return Err(JsError::type_error("object.constructor is not an object")),
    };
    let species = get(realm, constructor, &WellKnownSymbol::Species.key())?;
    if species.is_null_or_undefined() {
        return Ok(default);
    }
    if is_constructor(realm, &species) {
        if let JsValue::Object(species) = species {
            return Ok(species);
        }
    }
    Err(JsError::type_error("object.constructor[Symbol.species] is not a constructor"))
}

/// `CopyDataProperties(target, source, excludedItems)`
pub fn copy_data_properties(
    realm: &mut Realm,
    target: ObjectId,
    source: &JsValue,
    excluded: &[PropertyKey],
) -> JsResult<()> {
    if source.is_null_or_undefined() {
        return Ok(());
    }
    let from = to_object(realm, source)?;
    for key in object::own_property_keys(realm, from)? {
        if excluded.contains(&key) {
            continue;
        }
        if let Some(desc) = object::get_own_property(realm, from, &key)? {
            if desc.is_enumerable() {
                let value = get(realm, from, &key)?;
                create_data_property_or_throw(realm, target, &key, value)?;
            }
        }
    }
    Ok(())
}

/// Property key from an arbitrary value, then a `Get` on the boxed base
pub fn get_by_value(realm: &mut Realm, base: &JsValue, key: &JsValue) -> JsResult<JsValue> {
    let key = to_property_key(realm, key)?;
    get_v(realm, base, &key)
}

/// `Object.prototype.toString` tag computation
pub fn object_to_string_tag(realm: &mut Realm, value: &JsValue) -> JsResult<String> {
    match value {
        JsValue::Undefined => return Ok("[object Undefined]".to_string()),
        JsValue::Null => return Ok("[object Null]".to_string()),
        _ => {}
    }
    let obj = to_object(realm, value)?;
    let builtin_tag = if is_array(realm, &JsValue::Object(obj))? {
        "Array"
    } else if realm.heap.get(obj)?.is_proxy() && is_callable(realm, value) {
        "Function"
    } else {
        realm.heap.get(obj)?.kind.builtin_tag()
    };
    let tag = get(realm, obj, &WellKnownSymbol::ToStringTag.key())?;
    let tag = match tag {
        JsValue::String(s) => s.to_string(),
        _ => builtin_tag.to_string(),
    };
    Ok(format!("[object {}]", tag))
}

/// `ToString` applied to each element, for `Array.prototype.join` and friends
pub fn join_values(realm: &mut Realm, values: &[JsValue], separator: &str) -> JsResult<String> {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        if !value.is_null_or_undefined() {
            out.push_str(to_string(realm, value)?.as_str());
        }
    }
    Ok(out)
}
