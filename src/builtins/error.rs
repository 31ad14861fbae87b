//! Error and the native error constructors

use super::{arg, create_constructor, define_builtin, register_method};
use crate::error::{JsError, JsResult, NativeErrorKind};
use crate::function::ordinary_create_from_constructor;
use crate::object::{ObjectKind, make_object};
use crate::operations::{get, has_property, to_string};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey};

const NATIVE_ERRORS: [NativeErrorKind; 6] = [
    NativeErrorKind::EvalError,
    NativeErrorKind::RangeError,
    NativeErrorKind::ReferenceError,
    NativeErrorKind::SyntaxError,
    NativeErrorKind::TypeError,
    NativeErrorKind::UriError,
];

/// Initialize Error, its prototype and the six native error constructors
pub fn init_error(realm: &mut Realm) -> JsResult<()> {
    let error_proto = realm.intrinsics.error_prototype;
    define_builtin(realm, error_proto, "name", JsValue::from("Error"))?;
    define_builtin(realm, error_proto, "message", JsValue::from(""))?;
    register_method(realm, error_proto, "toString", error_to_string, 0)?;
    realm.intrinsics.error = create_constructor(realm, error_constructor, 1, "Error", error_proto)?;

    let error_ctor = realm.intrinsics.error;
    for kind in NATIVE_ERRORS {
        let proto = realm.intrinsics.error_prototype_for(kind);
        define_builtin(realm, proto, "name", JsValue::from(kind.name()))?;
        define_builtin(realm, proto, "message", JsValue::from(""))?;
        let ctor = create_constructor(realm, native_constructor(kind), 1, kind.name(), proto)?;
        // NativeError constructors inherit from %Error%
        crate::object::set_prototype_of(realm, ctor, Some(error_ctor))?;
        match kind {
            NativeErrorKind::EvalError => realm.intrinsics.eval_error = ctor,
            NativeErrorKind::RangeError => realm.intrinsics.range_error = ctor,
            NativeErrorKind::ReferenceError => realm.intrinsics.reference_error = ctor,
            NativeErrorKind::SyntaxError => realm.intrinsics.syntax_error = ctor,
            NativeErrorKind::TypeError => realm.intrinsics.type_error = ctor,
            NativeErrorKind::UriError => realm.intrinsics.uri_error = ctor,
            NativeErrorKind::Error => {}
        }
    }
    Ok(())
}

/// Allocate the error object a lazily created native error stands for
pub fn create_error_object(
    realm: &mut Realm,
    kind: NativeErrorKind,
    message: &str,
) -> JsResult<ObjectId> {
    let proto = Some(realm.intrinsics.error_prototype_for(kind));
    let obj = make_object(realm, proto, ObjectKind::Error);
    define_builtin(realm, obj, "message", JsValue::from(message))?;
    Ok(obj)
}

fn native_constructor(kind: NativeErrorKind) -> crate::function::NativeFn {
    match kind {
        NativeErrorKind::Error => error_constructor,
        NativeErrorKind::EvalError => eval_error_constructor,
        NativeErrorKind::RangeError => range_error_constructor,
        NativeErrorKind::ReferenceError => reference_error_constructor,
        NativeErrorKind::SyntaxError => syntax_error_constructor,
        NativeErrorKind::TypeError => type_error_constructor,
        NativeErrorKind::UriError => uri_error_constructor,
    }
}

/// Shared steps of `Error(message, options)` and every `NativeError(message, options)`
fn construct_error(
    realm: &mut Realm,
    kind: NativeErrorKind,
    args: &[JsValue],
    new_target: Option<ObjectId>,
) -> JsResult<JsValue> {
    let new_target = new_target.unwrap_or(realm.intrinsics.error_constructor_for(kind));
    let fallback = realm.intrinsics.error_prototype_for(kind);
    let obj = ordinary_create_from_constructor(realm, new_target, fallback, ObjectKind::Error)?;

    let message = arg(args, 0);
    if !message.is_undefined() {
        let message = to_string(realm, &message)?;
        define_builtin(realm, obj, "message", JsValue::String(message))?;
    }

    // InstallErrorCause
    if let JsValue::Object(options) = arg(args, 1) {
        let cause = PropertyKey::from("cause");
        if has_property(realm, options, &cause)? {
            let value = get(realm, options, &cause)?;
            define_builtin(realm, obj, cause, value)?;
        }
    }
    Ok(JsValue::Object(obj))
}

fn error_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    construct_error(realm, NativeErrorKind::Error, args, nt)
}

fn eval_error_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    construct_error(realm, NativeErrorKind::EvalError, args, nt)
}

fn range_error_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    construct_error(realm, NativeErrorKind::RangeError, args, nt)
}

fn reference_error_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    construct_error(realm, NativeErrorKind::ReferenceError, args, nt)
}

fn syntax_error_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    construct_error(realm, NativeErrorKind::SyntaxError, args, nt)
}

fn type_error_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    construct_error(realm, NativeErrorKind::TypeError, args, nt)
}

fn uri_error_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    construct_error(realm, NativeErrorKind::UriError, args, nt)
}

/// Error.prototype.toString()
fn error_to_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let JsValue::Object(obj) = this else {
        return Err(JsError::type_error("Error.prototype.toString called on non-object"));
    };
    let name = match get(realm, *obj, &PropertyKey::from("name"))? {
        JsValue::Undefined => JsString::from("Error"),
        other => to_string(realm, &other)?,
    };
    let message = match get(realm, *obj, &PropertyKey::from("message"))? {
        JsValue::Undefined => JsString::from(""),
        other => to_string(realm, &other)?,
    };
    let result = if name.is_empty() {
        message
    } else if message.is_empty() {
        name
    } else {
        JsString::from(format!("{}: {}", name, message))
    };
    Ok(JsValue::String(result))
}
