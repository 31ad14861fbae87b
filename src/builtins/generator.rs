//! %GeneratorFunction.prototype% and %GeneratorPrototype%

use super::array::define_to_string_tag;
use super::{arg, register_method};
use crate::completion::Completion;
use crate::error::JsResult;
use crate::generator::{generator_resume, generator_resume_abrupt};
use crate::operations::define_property_or_throw;
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

pub fn init_generator(realm: &mut Realm) -> JsResult<()> {
    let function_proto = realm.intrinsics.generator_function_prototype;
    let proto = realm.intrinsics.generator_prototype;

    // The two prototypes point at each other through read-only, configurable links
    define_property_or_throw(
        realm,
        function_proto,
        &PropertyKey::from("prototype"),
        PropertyDescriptor::data(JsValue::Object(proto), false, false, true),
    )?;
    define_property_or_throw(
        realm,
        proto,
        &PropertyKey::from("constructor"),
        PropertyDescriptor::data(JsValue::Object(function_proto), false, false, true),
    )?;
    define_to_string_tag(realm, function_proto, "GeneratorFunction")?;

    register_method(realm, proto, "next", generator_next, 1)?;
    register_method(realm, proto, "return", generator_return, 1)?;
    register_method(realm, proto, "throw", generator_throw, 1)?;
    define_to_string_tag(realm, proto, "Generator")?;
    Ok(())
}

/// %GeneratorPrototype%.next(value)
fn generator_next(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    generator_resume(realm, this, arg(args, 0))
}

/// %GeneratorPrototype%.return(value)
fn generator_return(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    generator_resume_abrupt(realm, this, Completion::return_(arg(args, 0)))
}

/// %GeneratorPrototype%.throw(exception)
fn generator_throw(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    generator_resume_abrupt(realm, this, Completion::throw(arg(args, 0)))
}
