//! Ordinary object internal methods
//!
//! These are the default behaviours every exotic object falls back to. All property
//! definition funnels through [`validate_and_apply_property_descriptor`], the single
//! gate that writes into an object's property map.

use tracing::trace;

use super::{InternalMethods, ObjectKind};
use crate::error::JsResult;
use crate::function::call;
use crate::operations::same_value;
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

/// Internal-method table of ordinary objects: every method is the default
pub struct OrdinaryMethods;

impl InternalMethods for OrdinaryMethods {}

/// `OrdinaryGetPrototypeOf`
pub fn ordinary_get_prototype_of(realm: &mut Realm, obj: ObjectId) -> JsResult<Option<ObjectId>> {
    Ok(realm.heap.get(obj)?.prototype)
}

/// `OrdinarySetPrototypeOf`
pub fn ordinary_set_prototype_of(
    realm: &mut Realm,
    obj: ObjectId,
    proto: Option<ObjectId>,
) -> JsResult<bool> {
    let object = realm.heap.get(obj)?;
    if object.prototype == proto {
        return Ok(true);
    }
    if !object.extensible {
        return Ok(false);
    }

    // Refuse to create a cycle. The walk stops at proxies, whose
    // [[GetPrototypeOf]] is not the ordinary one.
    let mut p = proto;
    while let Some(current) = p {
        if current == obj {
            return Ok(false);
        }
        let current_obj = realm.heap.get(current)?;
        if !has_ordinary_get_prototype_of(&current_obj.kind) {
            break;
        }
        p = current_obj.prototype;
    }

    realm.heap.get_mut(obj)?.prototype = proto;
    Ok(true)
}

/// `OrdinaryIsExtensible`
pub fn ordinary_is_extensible(realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
    Ok(realm.heap.get(obj)?.extensible)
}

/// `OrdinaryPreventExtensions`
pub fn ordinary_prevent_extensions(realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
    realm.heap.get_mut(obj)?.extensible = false;
    Ok(true)
}

/// `OrdinaryGetOwnProperty`
pub fn ordinary_get_own_property(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
) -> JsResult<Option<PropertyDescriptor>> {
    Ok(realm.heap.get(obj)?.properties.get(key).cloned())
}

/// `OrdinaryDefineOwnProperty`
pub fn ordinary_define_own_property(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    desc: PropertyDescriptor,
) -> JsResult<bool> {
    let current = super::get_own_property(realm, obj, key)?;
    let extensible = super::is_extensible(realm, obj)?;
    validate_and_apply_property_descriptor(realm, Some(obj), key, extensible, desc, current)
}

/// `IsCompatiblePropertyDescriptor`
pub fn is_compatible_property_descriptor(
    realm: &mut Realm,
    extensible: bool,
    desc: PropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> JsResult<bool> {
    let key = PropertyKey::from("");
    validate_and_apply_property_descriptor(realm, None, &key, extensible, desc, current)
}

/// `ValidateAndApplyPropertyDescriptor(O, P, extensible, Desc, current)`
///
/// The order of the checks decides which attribute changes are legal on sealed and
/// frozen objects, so the branches below are kept in one function with early returns.
/// `current` must be fully populated when present.
pub fn validate_and_apply_property_descriptor(
    realm: &mut Realm,
    obj: Option<ObjectId>,
    key: &PropertyKey,
    extensible: bool,
    desc: PropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> JsResult<bool> {
    // 1. No existing property: create one from defaults, if the object may grow.
    let Some(current) = current else {
        if !extensible {
            return Ok(false);
        }
        let Some(obj) = obj else {
            return Ok(true);
        };
        let stored = if desc.is_accessor_descriptor() {
            PropertyDescriptor {
                value: None,
                writable: None,
                get: Some(desc.get.unwrap_or_default()),
                set: Some(desc.set.unwrap_or_default()),
                enumerable: Some(desc.enumerable.unwrap_or(false)),
                configurable: Some(desc.configurable.unwrap_or(false)),
            }
        } else {
            PropertyDescriptor {
                value: Some(desc.value.unwrap_or_default()),
                writable: Some(desc.writable.unwrap_or(false)),
                get: None,
                set: None,
                enumerable: Some(desc.enumerable.unwrap_or(false)),
                configurable: Some(desc.configurable.unwrap_or(false)),
            }
        };
        trace!(object = ?obj, %key, "define new property");
        realm.heap.get_mut(obj)?.properties.insert(key.clone(), stored);
        return Ok(true);
    };

    // 2. Nothing requested: success without mutation.
    if !desc.has_fields() {
        return Ok(true);
    }

    let current_configurable = current.is_configurable();

    // 3. Non-configurable properties keep their configurability and enumerability.
    if !current_configurable {
        if desc.configurable == Some(true) {
            return Ok(false);
        }
        if let Some(enumerable) = desc.enumerable {
            if enumerable != current.is_enumerable() {
                return Ok(false);
            }
        }
    }

    // 4. Changing between data and accessor.
    let kind_changes = !desc.is_generic_descriptor()
        && desc.is_accessor_descriptor() != current.is_accessor_descriptor();
    if kind_changes && !current_configurable {
        return Ok(false);
    }

    if !kind_changes {
        // 5. Frozen data property: only a no-op redefinition is allowed.
        if current.is_data_descriptor() && desc.is_data_descriptor() {
            if !current_configurable && !current.is_writable() {
                if desc.writable == Some(true) {
                    return Ok(false);
                }
                if let Some(value) = &desc.value {
                    if !same_value(value, &current.value_or_undefined()) {
                        return Ok(false);
                    }
                }
                return Ok(true);
            }
        }
        // 6. Non-configurable accessor: get/set are fixed.
        else if current.is_accessor_descriptor()
            && desc.is_accessor_descriptor()
            && !current_configurable
        {
            if let Some(get) = &desc.get {
                if !same_value(get, &current.getter()) {
                    return Ok(false);
                }
            }
            if let Some(set) = &desc.set {
                if !same_value(set, &current.setter()) {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
    }

    let Some(obj) = obj else {
        return Ok(true);
    };

    let object = realm.heap.get_mut(obj)?;
    let Some(stored) = object.properties.get_mut(key) else {
        return Ok(true);
    };

    if kind_changes {
        // Convert in place, keeping configurable/enumerable, defaults elsewhere
        let configurable = stored.configurable;
        let enumerable = stored.enumerable;
        *stored = if stored.is_data_descriptor() {
            PropertyDescriptor {
                value: None,
                writable: None,
                get: Some(JsValue::Undefined),
                set: Some(JsValue::Undefined),
                enumerable,
                configurable,
            }
        } else {
            PropertyDescriptor {
                value: Some(JsValue::Undefined),
                writable: Some(false),
                get: None,
                set: None,
                enumerable,
                configurable,
            }
        };
    }

    // 7. Merge every present field.
    if let Some(value) = desc.value {
        stored.value = Some(value);
    }
    if let Some(writable) = desc.writable {
        stored.writable = Some(writable);
    }
    if let Some(get) = desc.get {
        stored.get = Some(get);
    }
    if let Some(set) = desc.set {
        stored.set = Some(set);
    }
    if let Some(enumerable) = desc.enumerable {
        stored.enumerable = Some(enumerable);
    }
    if let Some(configurable) = desc.configurable {
        stored.configurable = Some(configurable);
    }
    Ok(true)
}

/// `OrdinaryHasProperty`
pub fn ordinary_has_property(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
) -> JsResult<bool> {
    if super::get_own_property(realm, obj, key)?.is_some() {
        return Ok(true);
    }
    match super::get_prototype_of(realm, obj)? {
        Some(parent) => super::has_property(realm, parent, key),
        None => Ok(false),
    }
}

/// `OrdinaryGet`
pub fn ordinary_get(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    receiver: &JsValue,
) -> JsResult<JsValue> {
    let Some(desc) = super::get_own_property(realm, obj, key)? else {
        return match super::get_prototype_of(realm, obj)? {
            Some(parent) => super::get(realm, parent, key, receiver),
            None => Ok(JsValue::Undefined),
        };
    };
    if desc.is_data_descriptor() {
        return Ok(desc.value_or_undefined());
    }
    let getter = desc.getter();
    if getter.is_undefined() {
        return Ok(JsValue::Undefined);
    }
    call(realm, &getter, receiver, &[])
}

/// `OrdinarySet`
pub fn ordinary_set(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    value: JsValue,
    receiver: &JsValue,
) -> JsResult<bool> {
    let own = super::get_own_property(realm, obj, key)?;
    ordinary_set_with_own_descriptor(realm, obj, key, value, receiver, own)
}

/// `OrdinarySetWithOwnDescriptor`
pub fn ordinary_set_with_own_descriptor(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    value: JsValue,
    receiver: &JsValue,
    own: Option<PropertyDescriptor>,
) -> JsResult<bool> {
    let own = match own {
        Some(desc) => desc,
        None => match super::get_prototype_of(realm, obj)? {
            Some(parent) => return super::set(realm, parent, key, value, receiver),
            None => PropertyDescriptor::data_default(JsValue::Undefined),
        },
    };

    if own.is_data_descriptor() {
        if !own.is_writable() {
            return Ok(false);
        }
        let JsValue::Object(receiver_obj) = receiver else {
            return Ok(false);
        };
        let receiver_obj = *receiver_obj;
        return match super::get_own_property(realm, receiver_obj, key)? {
            Some(existing) => {
                if existing.is_accessor_descriptor() || !existing.is_writable() {
                    return Ok(false);
                }
                let update = PropertyDescriptor::default().with_value(value);
                super::define_own_property(realm, receiver_obj, key, update)
            }
            None => super::define_own_property(
                realm,
                receiver_obj,
                key,
                PropertyDescriptor::data_default(value),
            ),
        };
    }

    let setter = own.setter();
    if setter.is_undefined() {
        return Ok(false);
    }
    call(realm, &setter, receiver, &[value])?;
    Ok(true)
}

/// `OrdinaryDelete`
pub fn ordinary_delete(realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
    let Some(desc) = super::get_own_property(realm, obj, key)? else {
        return Ok(true);
    };
    if desc.is_configurable() {
        realm.heap.get_mut(obj)?.properties.remove(key);
        return Ok(true);
    }
    Ok(false)
}

/// `OrdinaryOwnPropertyKeys`
pub fn ordinary_own_property_keys(realm: &mut Realm, obj: ObjectId) -> JsResult<Vec<PropertyKey>> {
    Ok(realm.heap.get(obj)?.properties.keys())
}

/// True if the object's `[[GetPrototypeOf]]` is the ordinary one
pub(crate) fn has_ordinary_get_prototype_of(kind: &ObjectKind) -> bool {
    !matches!(kind, ObjectKind::Proxy(_))
}
