//! Conversions between property descriptors and descriptor objects

use super::object::{create_data_property_or_throw, get, has_property};
use crate::error::{JsError, JsResult};
use crate::function::is_callable;
use crate::object::ordinary_object_create;
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, PropertyKey};

/// `ToPropertyDescriptor(Obj)`
pub fn to_property_descriptor(realm: &mut Realm, value: &JsValue) -> JsResult<PropertyDescriptor> {
    let JsValue::Object(obj) = value else {
        return Err(JsError::type_error(format!(
            "Property description must be an object: {:?}",
            value
        )));
    };
    let obj = *obj;
    let mut desc = PropertyDescriptor::default();

    let field = |realm: &mut Realm, name: &str| -> JsResult<Option<JsValue>> {
        let key = PropertyKey::from(name);
        if has_property(realm, obj, &key)? {
            return Ok(Some(get(realm, obj, &key)?));
        }
        Ok(None)
    };

    if let Some(v) = field(realm, "enumerable")? {
        desc.enumerable = Some(v.to_boolean());
    }
    if let Some(v) = field(realm, "configurable")? {
        desc.configurable = Some(v.to_boolean());
    }
    if let Some(v) = field(realm, "value")? {
        desc.value = Some(v);
    }
    if let Some(v) = field(realm, "writable")? {
        desc.writable = Some(v.to_boolean());
    }
    if let Some(getter) = field(realm, "get")? {
        if !getter.is_undefined() && !is_callable(realm, &getter) {
            return Err(JsError::type_error(format!(
                "Getter must be a function: {:?}",
                getter
            )));
        }
        desc.get = Some(getter);
    }
    if let Some(setter) = field(realm, "set")? {
        if !setter.is_undefined() && !is_callable(realm, &setter) {
            return Err(JsError::type_error(format!(
                "Setter must be a function: {:?}",
                setter
            )));
        }
        desc.set = Some(setter);
    }
    if !desc.is_valid() {
        return Err(JsError::type_error(
            "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
        ));
    }
    Ok(desc)
}

/// `FromPropertyDescriptor(Desc)`
pub fn from_property_descriptor(
    realm: &mut Realm,
    desc: Option<&PropertyDescriptor>,
) -> JsResult<JsValue> {
    let Some(desc) = desc else {
        return Ok(JsValue::Undefined);
    };
    let proto = Some(realm.intrinsics.object_prototype);
    let obj = ordinary_object_create(realm, proto);
    let fields = [
        ("value", desc.value.clone()),
        ("writable", desc.writable.map(JsValue::Boolean)),
        ("get", desc.get.clone()),
        ("set", desc.set.clone()),
        ("enumerable", desc.enumerable.map(JsValue::Boolean)),
        ("configurable", desc.configurable.map(JsValue::Boolean)),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            create_data_property_or_throw(realm, obj, &PropertyKey::from(name), value)?;
        }
    }
    Ok(JsValue::Object(obj))
}
