//! Integration tests for the engine, organized by feature
//!
//! Everything goes through the public API: there is no parser, so language-level
//! behaviour is driven through abstract operations, native functions and closures
//! standing in for generator bodies.

#![allow(clippy::unwrap_used)]

mod builtins;
mod comparison;
mod context;
mod descriptors;
mod generator;
mod json;
mod namespace;
mod ordinary;
mod promise;
mod proxy;
mod realm;

use jsrealm::function::{NativeFn, create_builtin_function};
use jsrealm::object::ordinary_object_create;
use jsrealm::operations::{create_data_property_or_throw, get};
use jsrealm::{HostConfig, JsResult, JsValue, ObjectId, PropertyKey, Realm};

/// A realm with the default host configuration
pub fn create_test_realm() -> Realm {
    Realm::create(HostConfig::default())
}

/// An ordinary object inheriting from `%Object.prototype%` with the given data properties
pub fn obj(realm: &mut Realm, props: &[(&str, JsValue)]) -> ObjectId {
    let proto = Some(realm.intrinsics.object_prototype);
    let obj = ordinary_object_create(realm, proto);
    for (name, value) in props {
        create_data_property_or_throw(realm, obj, &PropertyKey::from(*name), value.clone())
            .unwrap();
    }
    obj
}

/// Read a string-keyed property
pub fn prop(realm: &mut Realm, obj: ObjectId, name: &str) -> JsValue {
    get(realm, obj, &PropertyKey::from(name)).unwrap()
}

/// A built-in function object wrapping `func`
pub fn native(realm: &mut Realm, func: NativeFn, name: &str, length: u32) -> JsValue {
    JsValue::Object(create_builtin_function(realm, func, length, name, false).unwrap())
}

/// True if `result` failed with a TypeError
pub fn throws_type_error<T: std::fmt::Debug>(result: JsResult<T>) -> bool {
    matches!(result, Err(err) if err.is_type_error())
}
