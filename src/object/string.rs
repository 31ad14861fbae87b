//! String exotic objects
//!
//! A `String` wrapper exposes its code units as read-only indexed properties and a
//! non-writable `length`. The indexed properties are virtual: they are synthesized
//! from the wrapped string on every lookup and never stored.

use super::ordinary::{
    is_compatible_property_descriptor, ordinary_define_own_property, ordinary_get_own_property,
    ordinary_own_property_keys,
};
use super::{InternalMethods, ObjectKind};
use crate::error::JsResult;
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey};

/// Internal-method table of String exotic objects
pub struct StringMethods;

impl InternalMethods for StringMethods {
    fn get_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if let Some(desc) = ordinary_get_own_property(realm, obj, key)? {
            return Ok(Some(desc));
        }
        string_get_own_property(realm, obj, key)
    }

    fn define_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        if let Some(string_desc) = string_get_own_property(realm, obj, key)? {
            let extensible = realm.heap.get(obj)?.extensible;
            return is_compatible_property_descriptor(realm, extensible, desc, Some(string_desc));
        }
        ordinary_define_own_property(realm, obj, key, desc)
    }

    fn own_property_keys(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<Vec<PropertyKey>> {
        let len = string_data(realm, obj)?.map_or(0, |s| s.utf16_len());
        let mut keys: Vec<PropertyKey> = (0..len as u32).map(PropertyKey::Index).collect();
        keys.extend(ordinary_own_property_keys(realm, obj)?);
        Ok(keys)
    }
}

fn string_data(realm: &Realm, obj: ObjectId) -> JsResult<Option<JsString>> {
    Ok(match &realm.heap.get(obj)?.kind {
        ObjectKind::String(s) => Some(s.clone()),
        _ => None,
    })
}

/// `StringGetOwnProperty(S, P)`
///
/// Only canonical integer indices inside the string produce a descriptor; strings
/// like `"-0"` or `"1.0"` never reach here as indices.
pub fn string_get_own_property(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
) -> JsResult<Option<PropertyDescriptor>> {
    let PropertyKey::Index(index) = key else {
        return Ok(None);
    };
    let Some(string) = string_data(realm, obj)? else {
        return Ok(None);
    };
    let Some(unit) = string.code_unit_at(*index as usize) else {
        return Ok(None);
    };
    let value = JsValue::String(JsString::from_utf16_lossy(&[unit]));
    Ok(Some(PropertyDescriptor::data(value, false, true, false)))
}

/// `StringCreate(value, prototype)`
pub fn string_create(
    realm: &mut Realm,
    value: JsString,
    proto: Option<ObjectId>,
) -> JsResult<ObjectId> {
    let length = value.utf16_len();
    let obj = super::make_object(realm, proto, ObjectKind::String(value));
    realm.heap.get_mut(obj)?.properties.insert(
        PropertyKey::from("length"),
        PropertyDescriptor::frozen(JsValue::Number(length as f64)),
    );
    Ok(obj)
}
