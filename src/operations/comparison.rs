//! Equality, relational comparison and `instanceof`

use super::conversion::{PreferredType, to_number, to_primitive};
use super::object::{get, get_method};
use crate::error::{JsError, JsResult};
use crate::function::{bound_target_function, call, is_callable};
use crate::object;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// `SameValue(x, y)`: NaN equals NaN, +0 and -0 differ
pub fn same_value(x: &JsValue, y: &JsValue) -> bool {
    match (x, y) {
        (JsValue::Number(a), JsValue::Number(b)) => {
            if a.is_nan() && b.is_nan() {
                return true;
            }
            a == b && a.is_sign_negative() == b.is_sign_negative()
        }
        _ => x.strict_equals(y),
    }
}

/// `SameValueZero(x, y)`: like `SameValue` but +0 equals -0
pub fn same_value_zero(x: &JsValue, y: &JsValue) -> bool {
    match (x, y) {
        (JsValue::Number(a), JsValue::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
        _ => x.strict_equals(y),
    }
}

/// `IsStrictlyEqual(x, y)` (`===`)
pub fn is_strictly_equal(x: &JsValue, y: &JsValue) -> bool {
    x.strict_equals(y)
}

/// `IsLooselyEqual(x, y)` (`==`)
pub fn is_loosely_equal(realm: &mut Realm, x: &JsValue, y: &JsValue) -> JsResult<bool> {
    use JsValue::*;
    match (x, y) {
        (Undefined, Undefined)
        | (Null, Null)
        | (Boolean(_), Boolean(_))
        | (Number(_), Number(_))
        | (String(_), String(_))
        | (Symbol(_), Symbol(_))
        | (Object(_), Object(_)) => Ok(x.strict_equals(y)),
        (Null, Undefined) | (Undefined, Null) => Ok(true),
        (Number(a), String(_)) => Ok(*a == to_number(realm, y)?),
        (String(_), Number(b)) => Ok(to_number(realm, x)? == *b),
        (Boolean(_), _) => {
            let nx = JsValue::Number(to_number(realm, x)?);
            is_loosely_equal(realm, &nx, y)
        }
        (_, Boolean(_)) => {
            let ny = JsValue::Number(to_number(realm, y)?);
            is_loosely_equal(realm, x, &ny)
        }
        (Number(_) | String(_) | Symbol(_), Object(_)) => {
            let py = to_primitive(realm, y, PreferredType::Default)?;
            is_loosely_equal(realm, x, &py)
        }
        (Object(_), Number(_) | String(_) | Symbol(_)) => {
            let px = to_primitive(realm, x, PreferredType::Default)?;
            is_loosely_equal(realm, &px, y)
        }
        _ => Ok(false),
    }
}

/// `IsLessThan(x, y, LeftFirst)`
///
/// `None` stands for the undefined result (a NaN operand). `left_first` controls the
/// order in which the two operands are converted to primitives.
pub fn is_less_than(
    realm: &mut Realm,
    x: &JsValue,
    y: &JsValue,
    left_first: bool,
) -> JsResult<Option<bool>> {
    let (px, py) = if left_first {
        let px = to_primitive(realm, x, PreferredType::Number)?;
        let py = to_primitive(realm, y, PreferredType::Number)?;
        (px, py)
    } else {
        let py = to_primitive(realm, y, PreferredType::Number)?;
        let px = to_primitive(realm, x, PreferredType::Number)?;
        (px, py)
    };
    if let (JsValue::String(a), JsValue::String(b)) = (&px, &py) {
        return Ok(Some(a.cmp_code_units(b).is_lt()));
    }
    let nx = to_number(realm, &px)?;
    let ny = to_number(realm, &py)?;
    if nx.is_nan() || ny.is_nan() {
        return Ok(None);
    }
    // IEEE comparison already orders -0 == +0 and the infinities
    Ok(Some(nx < ny))
}

/// Relational operators built on `IsLessThan`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

/// Evaluate `x op y` with the operand order each operator requires
pub fn relational_compare(
    realm: &mut Realm,
    op: RelationalOp,
    x: &JsValue,
    y: &JsValue,
) -> JsResult<bool> {
    Ok(match op {
        RelationalOp::Less => is_less_than(realm, x, y, true)? == Some(true),
        RelationalOp::Greater => is_less_than(realm, y, x, false)? == Some(true),
        RelationalOp::LessEqual => is_less_than(realm, y, x, false)? == Some(false),
        RelationalOp::GreaterEqual => is_less_than(realm, x, y, true)? == Some(false),
    })
}

/// `InstanceofOperator(V, target)`
pub fn instance_of(realm: &mut Realm, value: &JsValue, target: &JsValue) -> JsResult<bool> {
    if !target.is_object() {
        return Err(JsError::type_error(
            "Right-hand side of 'instanceof' is not an object",
        ));
    }
    let handler = get_method(realm, target, &WellKnownSymbol::HasInstance.key())?;
    if let Some(handler) = handler {
        let result = call(realm, &handler, target, &[value.clone()])?;
        return Ok(result.to_boolean());
    }
    if !is_callable(realm, target) {
        return Err(JsError::type_error(
            "Right-hand side of 'instanceof' is not callable",
        ));
    }
    ordinary_has_instance(realm, target, value)
}

/// `OrdinaryHasInstance(C, O)`
pub fn ordinary_has_instance(
    realm: &mut Realm,
    constructor: &JsValue,
    value: &JsValue,
) -> JsResult<bool> {
    if !is_callable(realm, constructor) {
        return Ok(false);
    }
    let JsValue::Object(c) = constructor else {
        return Ok(false);
    };
    if let Some(bound_target) = bound_target_function(realm, *c)? {
        return instance_of(realm, value, &JsValue::Object(bound_target));
    }
    let &JsValue::Object(mut o) = value else {
        return Ok(false);
    };
    let JsValue::Object(proto) = get(realm, *c, &PropertyKey::from("prototype"))? else {
        return Err(JsError::type_error(
            "Function has non-object prototype in instanceof check",
        ));
    };
    loop {
        match object::get_prototype_of(realm, o)? {
            None => return Ok(false),
            Some(p) if p == proto => return Ok(true),
            Some(p) => o = p,
        }
    }
}

/// Prototype-chain identity walk without `@@hasInstance`, for `Object.prototype.isPrototypeOf`
pub fn is_prototype_of(realm: &mut Realm, proto: ObjectId, mut obj: ObjectId) -> JsResult<bool> {
    loop {
        match object::get_prototype_of(realm, obj)? {
            None => return Ok(false),
            Some(p) if p == proto => return Ok(true),
            Some(p) => obj = p,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::HostConfig;

    #[test]
    fn test_same_value_variants() {
        let nan = JsValue::Number(f64::NAN);
        let pz = JsValue::Number(0.0);
        let nz = JsValue::Number(-0.0);
        assert!(same_value(&nan, &nan));
        assert!(!same_value(&pz, &nz));
        assert!(same_value_zero(&pz, &nz));
        assert!(!is_strictly_equal(&nan, &nan));
        assert!(is_strictly_equal(&pz, &nz));
    }

    #[test]
    fn test_loose_equality_table() {
        let mut realm = Realm::create(HostConfig::default());
        assert!(is_loosely_equal(&mut realm, &JsValue::Null, &JsValue::Undefined).unwrap());
        assert!(is_loosely_equal(&mut realm, &JsValue::Undefined, &JsValue::Null).unwrap());
        assert!(is_loosely_equal(&mut realm, &JsValue::Number(1.0), &JsValue::from("1")).unwrap());
        assert!(
            is_loosely_equal(&mut realm, &JsValue::Boolean(true), &JsValue::from("1")).unwrap(),
        );
        assert!(!is_loosely_equal(&mut realm, &JsValue::Null, &JsValue::Number(0.0)).unwrap());
        assert!(
            !is_loosely_equal(&mut realm, &JsValue::from("a"), &JsValue::Number(f64::NAN)).unwrap(),
        );
    }

    #[test]
    fn test_is_less_than() {
        let mut realm = Realm::create(HostConfig::default());
        let lt = |realm: &mut Realm, a: JsValue, b: JsValue| {
            is_less_than(realm, &a, &b, true).unwrap()
        };
        assert_eq!(lt(&mut realm, JsValue::from("a"), JsValue::from("b")), Some(true));
        assert_eq!(lt(&mut realm, JsValue::from("10"), JsValue::from("9")), Some(true));
        assert_eq!(lt(&mut realm, JsValue::from("10"), JsValue::Number(9.0)), Some(false));
        assert_eq!(lt(&mut realm, JsValue::Number(f64::NAN), JsValue::Number(1.0)), None);
        assert_eq!(lt(&mut realm, JsValue::Number(-0.0), JsValue::Number(0.0)), Some(false));
        assert!(
            relational_compare(
                &mut realm,
                RelationalOp::LessEqual,
                &JsValue::Number(1.0),
                &JsValue::Number(1.0),
            )
            .unwrap()
        );
        assert!(
            !relational_compare(
                &mut realm,
                RelationalOp::GreaterEqual,
                &JsValue::Number(f64::NAN),
                &JsValue::Number(1.0),
            )
            .unwrap()
        );
    }

    #[test]
    fn test_instance_of_requires_object() {
        let mut realm = Realm::create(HostConfig::default());
        let err = instance_of(&mut realm, &JsValue::Null, &JsValue::Number(1.0)).unwrap_err();
        assert!(err.is_type_error());
        let plain = object::ordinary_object_create(&mut realm, None);
        let err = instance_of(&mut realm, &JsValue::Null, &JsValue::Object(plain)).unwrap_err();
        assert!(err.is_type_error());
    }
}
