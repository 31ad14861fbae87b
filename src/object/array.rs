//! Array exotic objects
//!
//! Arrays keep `length` as an ordinary own data property; only `[[DefineOwnProperty]]`
//! is overridden so that index writes grow the length and length writes truncate.

use super::ordinary::{ordinary_define_own_property, ordinary_get_own_property};
use super::{InternalMethods, ObjectKind};
use crate::error::{JsError, JsResult};
use crate::operations::{to_number, to_uint32};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

/// Internal-method table of Array exotic objects
pub struct ArrayMethods;

impl InternalMethods for ArrayMethods {
    fn define_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        if key.eq_str("length") {
            return array_set_length(realm, obj, desc);
        }
        let PropertyKey::Index(index) = key else {
            return ordinary_define_own_property(realm, obj, key, desc);
        };
        let index = *index;

        let length_key = PropertyKey::from("length");
        let Some(mut length_desc) = ordinary_get_own_property(realm, obj, &length_key)? else {
            return Err(JsError::internal("array without a length property"));
        };
        let length = current_length(&length_desc);
        if index >= length && !length_desc.is_writable() {
            return Ok(false);
        }
        if !ordinary_define_own_property(realm, obj, key, desc)? {
            return Ok(false);
        }
        if index >= length {
            length_desc.value = Some(JsValue::Number(index as f64 + 1.0));
            ordinary_define_own_property(realm, obj, &length_key, length_desc)?;
        }
        Ok(true)
    }
}

fn current_length(desc: &PropertyDescriptor) -> u32 {
    match desc.value {
        Some(JsValue::Number(n)) => n as u32,
        _ => 0,
    }
}

/// `ArrayCreate(length, proto)`
pub fn array_create(realm: &mut Realm, length: u64, proto: Option<ObjectId>) -> JsResult<ObjectId> {
    if length > u32::MAX as u64 {
        return Err(JsError::range_error("Invalid array length"));
    }
    let proto = proto.or(Some(realm.intrinsics.array_prototype));
    let array = super::make_object(realm, proto, ObjectKind::Array);
    // Initial length goes straight to storage: the array is fresh and extensible
    realm.heap.get_mut(array)?.properties.insert(
        PropertyKey::from("length"),
        PropertyDescriptor::data(JsValue::Number(length as f64), true, false, false),
    );
    Ok(array)
}

/// `ArraySetLength(A, Desc)`
pub fn array_set_length(
    realm: &mut Realm,
    obj: ObjectId,
    desc: PropertyDescriptor,
) -> JsResult<bool> {
    let length_key = PropertyKey::from("length");
    let Some(value) = desc.value.clone() else {
        return ordinary_define_own_property(realm, obj, &length_key, desc);
    };

    let mut new_len_desc = desc;
    let new_len = to_uint32(realm, &value)?;
    let number_len = to_number(realm, &value)?;
    if new_len as f64 != number_len {
        return Err(JsError::range_error("Invalid array length"));
    }
    new_len_desc.value = Some(JsValue::Number(new_len as f64));

    let Some(old_len_desc) = ordinary_get_own_property(realm, obj, &length_key)? else {
        return Err(JsError::internal("array without a length property"));
    };
    let old_len = current_length(&old_len_desc);
    if new_len >= old_len {
        return ordinary_define_own_property(realm, obj, &length_key, new_len_desc);
    }
    if !old_len_desc.is_writable() {
        return Ok(false);
    }

    // A non-writable length is applied only after the elements are deleted
    let new_writable = new_len_desc.writable != Some(false);
    if !new_writable {
        new_len_desc.writable = Some(true);
    }
    if !ordinary_define_own_property(realm, obj, &length_key, new_len_desc.clone())? {
        return Ok(false);
    }

    let doomed = realm.heap.get(obj)?.properties.indices_from_descending(new_len);
    for index in doomed {
        if !super::delete(realm, obj, &PropertyKey::Index(index))? {
            new_len_desc.value = Some(JsValue::Number(index as f64 + 1.0));
            if !new_writable {
                new_len_desc.writable = Some(false);
            }
            ordinary_define_own_property(realm, obj, &length_key, new_len_desc)?;
            return Ok(false);
        }
    }

    if !new_writable {
        ordinary_define_own_property(
            realm,
            obj,
            &length_key,
            PropertyDescriptor::default().with_writable(false),
        )?;
    }
    Ok(true)
}
