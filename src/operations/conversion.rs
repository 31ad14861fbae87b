//! Type conversion operations

use super::number::{number_to_string, string_to_number};
use super::object::get_method;
use crate::error::{JsError, JsResult};
use crate::function::call;
use crate::object::string::string_create;
use crate::object::{self, ObjectKind, make_object};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// Hint passed to `ToPrimitive`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    Number,
    String,
}

impl PreferredType {
    fn hint_name(self) -> &'static str {
        match self {
            PreferredType::Default => "default",
            PreferredType::Number => "number",
            PreferredType::String => "string",
        }
    }
}

/// `ToPrimitive(input, preferredType)`
pub fn to_primitive(
    realm: &mut Realm,
    input: &JsValue,
    preferred: PreferredType,
) -> JsResult<JsValue> {
    let JsValue::Object(obj) = input else {
        return Ok(input.clone());
    };
    let exotic = get_method(realm, input, &WellKnownSymbol::ToPrimitive.key())?;
    if let Some(exotic) = exotic {
        let hint = JsValue::from(preferred.hint_name());
        let result = call(realm, &exotic, input, &[hint])?;
        if result.is_object() {
            return Err(JsError::type_error("Cannot convert object to primitive value"));
        }
        return Ok(result);
    }
    let hint = match preferred {
        PreferredType::String => PreferredType::String,
        _ => PreferredType::Number,
    };
    ordinary_to_primitive(realm, *obj, hint)
}

/// `OrdinaryToPrimitive(O, hint)`
pub fn ordinary_to_primitive(
    realm: &mut Realm,
    obj: ObjectId,
    hint: PreferredType,
) -> JsResult<JsValue> {
    let order = if hint == PreferredType::String {
        ["toString", "valueOf"]
    } else {
        ["valueOf", "toString"]
    };
    let this = JsValue::Object(obj);
    for name in order {
        let method = object::get(realm, obj, &PropertyKey::from(name), &this)?;
        if crate::function::is_callable(realm, &method) {
            let result = call(realm, &method, &this, &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Err(JsError::type_error("Cannot convert object to primitive value"))
}

/// `ToNumber(argument)`
pub fn to_number(realm: &mut Realm, value: &JsValue) -> JsResult<f64> {
    match value {
        JsValue::Undefined => Ok(f64::NAN),
        JsValue::Null => Ok(0.0),
        JsValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        JsValue::Number(n) => Ok(*n),
        JsValue::String(s) => Ok(string_to_number(s.as_str())),
        JsValue::Symbol(_) => Err(JsError::type_error("Cannot convert a Symbol value to a number")),
        JsValue::Object(_) => {
            let prim = to_primitive(realm, value, PreferredType::Number)?;
            to_number(realm, &prim)
        }
    }
}

/// `ToString(argument)`
pub fn to_string(realm: &mut Realm, value: &JsValue) -> JsResult<JsString> {
    match value {
        JsValue::Undefined => Ok(JsString::from("undefined")),
        JsValue::Null => Ok(JsString::from("null")),
        JsValue::Boolean(b) => Ok(JsString::from(if *b { "true" } else { "false" })),
        JsValue::Number(n) => Ok(JsString::from(number_to_string(*n))),
        JsValue::String(s) => Ok(s.clone()),
        JsValue::Symbol(_) => Err(JsError::type_error("Cannot convert a Symbol value to a string")),
        JsValue::Object(_) => {
            let prim = to_primitive(realm, value, PreferredType::String)?;
            to_string(realm, &prim)
        }
    }
}

/// `ToObject(argument)`
pub fn to_object(realm: &mut Realm, value: &JsValue) -> JsResult<ObjectId> {
    let intrinsics = &realm.intrinsics;
    let (proto, kind) = match value {
        JsValue::Undefined | JsValue::Null => {
            return Err(JsError::type_error(format!(
                "Cannot convert {} to object",
                value.kind_name()
            )));
        }
        JsValue::Object(obj) => return Ok(*obj),
        JsValue::String(s) => {
            let proto = Some(intrinsics.string_prototype);
            return string_create(realm, s.clone(), proto);
        }
        JsValue::Boolean(b) => (intrinsics.boolean_prototype, ObjectKind::Boolean(*b)),
        JsValue::Number(n) => (intrinsics.number_prototype, ObjectKind::Number(*n)),
        JsValue::Symbol(s) => (intrinsics.symbol_prototype, ObjectKind::Symbol(s.clone())),
    };
    Ok(make_object(realm, Some(proto), kind))
}

/// `ToPropertyKey(argument)`
pub fn to_property_key(realm: &mut Realm, value: &JsValue) -> JsResult<PropertyKey> {
    match value {
        JsValue::String(s) => Ok(PropertyKey::from(s.clone())),
        JsValue::Symbol(s) => Ok(PropertyKey::Symbol(s.clone())),
        JsValue::Number(n) => Ok(PropertyKey::from_number(*n)),
        _ => {
            let key = to_primitive(realm, value, PreferredType::String)?;
            if let JsValue::Symbol(s) = key {
                return Ok(PropertyKey::Symbol(s));
            }
            Ok(PropertyKey::from(to_string(realm, &key)?))
        }
    }
}

/// Truncation step of `ToIntegerOrInfinity` on an already converted number
pub fn integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        return 0.0;
    }
    if n.is_infinite() {
        return n;
    }
    // trunc keeps the sign of -0.5 etc.; normalise to +0
    let t = n.trunc();
    if t == 0.0 { 0.0 } else { t }
}

/// `ToIntegerOrInfinity(argument)`
pub fn to_integer_or_infinity(realm: &mut Realm, value: &JsValue) -> JsResult<f64> {
    Ok(integer_or_infinity(to_number(realm, value)?))
}

/// Largest length an array-like may have (2^53 - 1)
pub const MAX_SAFE_LENGTH: u64 = (1 << 53) - 1;

/// `ToLength(argument)`
pub fn to_length(realm: &mut Realm, value: &JsValue) -> JsResult<u64> {
    let len = to_integer_or_infinity(realm, value)?;
    if len <= 0.0 {
        return Ok(0);
    }
    Ok(len.min(MAX_SAFE_LENGTH as f64) as u64)
}

/// Modular conversion of a number to the unsigned 32-bit range
pub fn f64_to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let int = n.trunc();
    int.rem_euclid(4_294_967_296.0) as u32
}

/// Modular conversion of a number to the signed 32-bit range
pub fn f64_to_int32(n: f64) -> i32 {
    f64_to_uint32(n) as i32
}

/// `ToUint32(argument)`
pub fn to_uint32(realm: &mut Realm, value: &JsValue) -> JsResult<u32> {
    Ok(f64_to_uint32(to_number(realm, value)?))
}

/// `ToInt32(argument)`
pub fn to_int32(realm: &mut Realm, value: &JsValue) -> JsResult<i32> {
    Ok(f64_to_int32(to_number(realm, value)?))
}

/// `CanonicalNumericIndexString(argument)`
pub fn canonical_numeric_index_string(s: &JsString) -> Option<f64> {
    if s.as_str() == "-0" {
        return Some(-0.0);
    }
    let n = string_to_number(s.as_str());
    (number_to_string(n) == s.as_str()).then_some(n)
}

/// `RequireObjectCoercible(argument)`
pub fn require_object_coercible(value: &JsValue) -> JsResult<&JsValue> {
    if value.is_null_or_undefined() {
        return Err(JsError::type_error(format!(
            "Cannot convert {} to object",
            value.kind_name()
        )));
    }
    Ok(value)
}
