//! The Math namespace object

use super::array::define_to_string_tag;
use super::{arg, define_constant, plain_object, register_method};
use crate::error::JsResult;
use crate::function::NativeFn;
use crate::operations::{to_int32, to_number, to_uint32};
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId};

/// Define a one-argument method that applies `$op` to `ToNumber(x)`
macro_rules! unary_math {
    ($name:ident, $op:expr) => {
        fn $name(
            realm: &mut Realm,
            _this: &JsValue,
            args: &[JsValue],
            _nt: Option<ObjectId>,
        ) -> JsResult<JsValue> {
            let x = to_number(realm, &arg(args, 0))?;
            let op: fn(f64) -> f64 = $op;
            Ok(JsValue::Number(op(x)))
        }
    };
}

unary_math!(math_abs, f64::abs);
unary_math!(math_acos, f64::acos);
unary_math!(math_acosh, f64::acosh);
unary_math!(math_asin, f64::asin);
unary_math!(math_asinh, f64::asinh);
unary_math!(math_atan, f64::atan);
unary_math!(math_atanh, f64::atanh);
unary_math!(math_cbrt, f64::cbrt);
unary_math!(math_ceil, f64::ceil);
unary_math!(math_cos, f64::cos);
unary_math!(math_cosh, f64::cosh);
unary_math!(math_exp, f64::exp);
unary_math!(math_expm1, f64::exp_m1);
unary_math!(math_floor, f64::floor);
unary_math!(math_fround, |x| f64::from(x as f32));
unary_math!(math_log, f64::ln);
unary_math!(math_log1p, f64::ln_1p);
unary_math!(math_log10, f64::log10);
unary_math!(math_log2, f64::log2);
unary_math!(math_round, round);
unary_math!(math_sign, sign);
unary_math!(math_sin, f64::sin);
unary_math!(math_sinh, f64::sinh);
unary_math!(math_sqrt, f64::sqrt);
unary_math!(math_tan, f64::tan);
unary_math!(math_tanh, f64::tanh);
unary_math!(math_trunc, f64::trunc);

pub fn init_math(realm: &mut Realm) -> JsResult<()> {
    let math = plain_object(realm);

    use std::f64::consts;
    let constants = [
        ("E", consts::E),
        ("LN10", consts::LN_10),
        ("LN2", consts::LN_2),
        ("LOG10E", consts::LOG10_E),
        ("LOG2E", consts::LOG2_E),
        ("PI", consts::PI),
        ("SQRT1_2", consts::FRAC_1_SQRT_2),
        ("SQRT2", consts::SQRT_2),
    ];
    for (name, value) in constants {
        define_constant(realm, math, name, JsValue::Number(value))?;
    }

    let methods: [(&str, NativeFn, u32); 35] = [
        ("abs", math_abs, 1),
        ("acos", math_acos, 1),
        ("acosh", math_acosh, 1),
        ("asin", math_asin, 1),
        ("asinh", math_asinh, 1),
        ("atan", math_atan, 1),
        ("atan2", math_atan2, 2),
        ("atanh", math_atanh, 1),
        ("cbrt", math_cbrt, 1),
        ("ceil", math_ceil, 1),
        ("clz32", math_clz32, 1),
        ("cos", math_cos, 1),
        ("cosh", math_cosh, 1),
        ("exp", math_exp, 1),
        ("expm1", math_expm1, 1),
        ("floor", math_floor, 1),
        ("fround", math_fround, 1),
        ("hypot", math_hypot, 2),
        ("imul", math_imul, 2),
        ("log", math_log, 1),
        ("log10", math_log10, 1),
        ("log1p", math_log1p, 1),
        ("log2", math_log2, 1),
        ("max", math_max, 2),
        ("min", math_min, 2),
        ("pow", math_pow, 2),
        ("random", math_random, 0),
        ("round", math_round, 1),
        ("sign", math_sign, 1),
        ("sin", math_sin, 1),
        ("sinh", math_sinh, 1),
        ("sqrt", math_sqrt, 1),
        ("tan", math_tan, 1),
        ("tanh", math_tanh, 1),
        ("trunc", math_trunc, 1),
    ];
    for (name, func, length) in methods {
        register_method(realm, math, name, func, length)?;
    }
    define_to_string_tag(realm, math, "Math")?;
    realm.intrinsics.math = math;
    Ok(())
}

/// `Math.round`: ties go towards +Infinity, and the sign of zero is kept
fn round(x: f64) -> f64 {
    if !x.is_finite() || x.fract() == 0.0 {
        return x;
    }
    if x > 0.0 && x < 0.5 {
        return 0.0;
    }
    if (-0.5..0.0).contains(&x) {
        return -0.0;
    }
    (x + 0.5).floor()
}

fn sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 { x } else { x.signum() }
}

/// `Number::exponentiate(base, exponent)`
pub(crate) fn number_exponentiate(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() {
        return f64::NAN;
    }
    if exponent == 0.0 {
        return 1.0;
    }
    if base.abs() == 1.0 && exponent.is_infinite() {
        return f64::NAN;
    }
    base.powf(exponent)
}

fn numbers(realm: &mut Realm, args: &[JsValue]) -> JsResult<Vec<f64>> {
    args.iter().map(|v| to_number(realm, v)).collect()
}

fn math_atan2(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let y = to_number(realm, &arg(args, 0))?;
    let x = to_number(realm, &arg(args, 1))?;
    Ok(JsValue::Number(y.atan2(x)))
}

fn math_clz32(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let n = to_uint32(realm, &arg(args, 0))?;
    Ok(JsValue::Number(f64::from(n.leading_zeros())))
}

fn math_hypot(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let values = numbers(realm, args)?;
    if values.iter().any(|v| v.is_infinite()) {
        return Ok(JsValue::Number(f64::INFINITY));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Ok(JsValue::Number(f64::NAN));
    }
    Ok(JsValue::Number(values.iter().fold(0.0, |acc: f64, v| acc.hypot(*v))))
}

fn math_imul(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let a = to_int32(realm, &arg(args, 0))?;
    let b = to_int32(realm, &arg(args, 1))?;
    Ok(JsValue::Number(f64::from(a.wrapping_mul(b))))
}

fn math_max(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let values = numbers(realm, args)?;
    let mut highest = f64::NEG_INFINITY;
    for v in values {
        if v.is_nan() {
            return Ok(JsValue::Number(f64::NAN));
        }
        // +0 is larger than -0
        if v > highest || (v == 0.0 && highest == 0.0 && v.is_sign_positive()) {
            highest = v;
        }
    }
    Ok(JsValue::Number(highest))
}

fn math_min(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let values = numbers(realm, args)?;
    let mut lowest = f64::INFINITY;
    for v in values {
        if v.is_nan() {
            return Ok(JsValue::Number(f64::NAN));
        }
        if v < lowest || (v == 0.0 && lowest == 0.0 && v.is_sign_negative()) {
            lowest = v;
        }
    }
    Ok(JsValue::Number(lowest))
}

fn math_pow(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let base = to_number(realm, &arg(args, 0))?;
    let exponent = to_number(realm, &arg(args, 1))?;
    Ok(JsValue::Number(number_exponentiate(base, exponent)))
}

fn math_random(
    realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Number(realm.random()))
}
