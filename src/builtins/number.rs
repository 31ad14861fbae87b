//! Number constructor and Number.prototype

use super::{arg, create_constructor, define_constant, register_method};
use crate::error::{JsError, JsResult};
use crate::function::ordinary_create_from_constructor;
use crate::object::ObjectKind;
use crate::operations::{
    number_to_string, number_to_string_radix, parse_float, parse_int, to_integer_or_infinity,
    to_number, to_primitive, to_string, PreferredType,
};
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId};

/// 2^53 - 1
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Initialize Number.prototype and the Number constructor
pub fn init_number(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.number_prototype;
    register_method(realm, proto, "toExponential", number_to_exponential, 1)?;
    register_method(realm, proto, "toFixed", number_to_fixed, 1)?;
    register_method(realm, proto, "toLocaleString", number_to_locale_string, 0)?;
    register_method(realm, proto, "toPrecision", number_to_precision, 1)?;
    register_method(realm, proto, "toString", number_proto_to_string, 1)?;
    register_method(realm, proto, "valueOf", number_value_of, 0)?;

    let ctor = create_constructor(realm, number_constructor, 1, "Number", proto)?;
    realm.intrinsics.number = ctor;
    define_constant(realm, ctor, "EPSILON", JsValue::Number(f64::EPSILON))?;
    define_constant(realm, ctor, "MAX_SAFE_INTEGER", JsValue::Number(MAX_SAFE_INTEGER))?;
    define_constant(realm, ctor, "MIN_SAFE_INTEGER", JsValue::Number(-MAX_SAFE_INTEGER))?;
    define_constant(realm, ctor, "MAX_VALUE", JsValue::Number(f64::MAX))?;
    // Smallest positive subnormal
    define_constant(realm, ctor, "MIN_VALUE", JsValue::Number(5e-324))?;
    define_constant(realm, ctor, "NaN", JsValue::Number(f64::NAN))?;
    define_constant(realm, ctor, "NEGATIVE_INFINITY", JsValue::Number(f64::NEG_INFINITY))?;
    define_constant(realm, ctor, "POSITIVE_INFINITY", JsValue::Number(f64::INFINITY))?;

    register_method(realm, ctor, "isFinite", number_is_finite, 1)?;
    register_method(realm, ctor, "isInteger", number_is_integer, 1)?;
    register_method(realm, ctor, "isNaN", number_is_nan, 1)?;
    register_method(realm, ctor, "isSafeInteger", number_is_safe_integer, 1)?;
    // The global parseInt/parseFloat are these same function objects
    register_method(realm, ctor, "parseFloat", global_parse_float, 1)?;
    register_method(realm, ctor, "parseInt", global_parse_int, 2)?;
    Ok(())
}

/// Number(value)
fn number_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = match args.first() {
        None => 0.0,
        Some(value) => {
            let prim = to_primitive(realm, value, PreferredType::Number)?;
            to_number(realm, &prim)?
        }
    };
    let Some(new_target) = nt else {
        return Ok(JsValue::Number(n));
    };
    let fallback = realm.intrinsics.number_prototype;
    let obj = ordinary_create_from_constructor(realm, new_target, fallback, ObjectKind::Number(n))?;
    Ok(JsValue::Object(obj))
}

/// `thisNumberValue(value)`
fn this_number_value(realm: &Realm, this: &JsValue, method: &str) -> JsResult<f64> {
    match this {
        JsValue::Number(n) => return Ok(*n),
        JsValue::Object(obj) => {
            if let ObjectKind::Number(n) = realm.heap.get(*obj)?.kind {
                return Ok(n);
            }
        }
        _ => {}
    }
    Err(JsError::type_error(format!(
        "Number.prototype.{} requires that 'this' be a Number",
        method,
    )))
}

fn is_integral(value: &JsValue) -> Option<f64> {
    match value {
        JsValue::Number(n) if n.is_finite() && n.trunc() == *n => Some(*n),
        _ => None,
    }
}

fn number_is_finite(
    _realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(matches!(arg(args, 0), JsValue::Number(n) if n.is_finite())))
}

fn number_is_integer(
    _realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(is_integral(&arg(args, 0)).is_some()))
}

fn number_is_nan(
    _realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(matches!(arg(args, 0), JsValue::Number(n) if n.is_nan())))
}

fn number_is_safe_integer(
    _realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let safe = is_integral(&arg(args, 0)).is_some_and(|n| n.abs() <= MAX_SAFE_INTEGER);
    Ok(JsValue::Boolean(safe))
}

/// parseFloat(string)
pub(crate) fn global_parse_float(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let input = to_string(realm, &arg(args, 0))?;
    Ok(JsValue::Number(parse_float(input.as_str())))
}

/// parseInt(string, radix)
pub(crate) fn global_parse_int(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let input = to_string(realm, &arg(args, 0))?;
    let radix = crate::operations::to_int32(realm, &arg(args, 1))?;
    Ok(JsValue::Number(parse_int(input.as_str(), radix)))
}

fn number_value_of(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Number(this_number_value(realm, this, "valueOf")?))
}

fn number_to_locale_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = this_number_value(realm, this, "toLocaleString")?;
    Ok(JsValue::from(number_to_string(n)))
}

/// Number.prototype.toString(radix)
fn number_proto_to_string(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = this_number_value(realm, this, "toString")?;
    let radix = match arg(args, 0) {
        JsValue::Undefined => 10.0,
        radix => to_integer_or_infinity(realm, &radix)?,
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(JsError::range_error("toString() radix must be between 2 and 36"));
    }
    Ok(JsValue::from(number_to_string_radix(n, radix as u32)))
}

/// Digit-count argument shared by toFixed/toExponential/toPrecision
fn digits_arg(
    realm: &mut Realm,
    value: &JsValue,
    min: f64,
    max: f64,
    method: &str,
) -> JsResult<usize> {
    let digits = to_integer_or_infinity(realm, value)?;
    if !(min..=max).contains(&digits) {
        return Err(JsError::range_error(format!(
            "{}() argument must be between {} and {}",
            method, min, max
        )));
    }
    Ok(digits as usize)
}

/// Rust's `{:e}` output (`1.5e3`) in the language's form (`1.5e+3`)
fn exponent_form(formatted: &str) -> String {
    match formatted.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{}e{}", mantissa, exp),
        Some((mantissa, exp)) => format!("{}e+{}", mantissa, exp),
        None => formatted.to_string(),
    }
}

/// Number.prototype.toFixed(fractionDigits)
fn number_to_fixed(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = this_number_value(realm, this, "toFixed")?;
    let digits = digits_arg(realm, &arg(args, 0), 0.0, 100.0, "toFixed")?;
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(JsValue::from(number_to_string(n)));
    }
    Ok(JsValue::from(format!("{:.*}", digits, n)))
}

/// Number.prototype.toExponential(fractionDigits)
fn number_to_exponential(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = this_number_value(realm, this, "toExponential")?;
    let fraction = arg(args, 0);
    let digits = digits_arg(realm, &fraction, 0.0, 100.0, "toExponential")?;
    if !n.is_finite() {
        return Ok(JsValue::from(number_to_string(n)));
    }
    let formatted = if fraction.is_undefined() {
        format!("{:e}", n)
    } else {
        format!("{:.*e}", digits, n)
    };
    Ok(JsValue::from(exponent_form(&formatted)))
}

/// Number.prototype.toPrecision(precision)
fn number_to_precision(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = this_number_value(realm, this, "toPrecision")?;
    let precision = arg(args, 0);
    if precision.is_undefined() {
        return Ok(JsValue::from(number_to_string(n)));
    }
    let p = digits_arg(realm, &precision, 1.0, 100.0, "toPrecision")?;
    if !n.is_finite() {
        return Ok(JsValue::from(number_to_string(n)));
    }
    if n == 0.0 {
        return Ok(JsValue::from(format!("{:.*}", p - 1, 0.0)));
    }
    // Exponent after rounding to p significant digits
    let scientific = format!("{:.*e}", p - 1, n);
    let e: i32 = scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    if e < -6 || e >= p as i32 {
        return Ok(JsValue::from(exponent_form(&scientific)));
    }
    let decimals = (p as i32 - 1 - e).max(0) as usize;
    Ok(JsValue::from(format!("{:.*}", decimals, n)))
}
