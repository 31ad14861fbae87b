//! Function properties of the global object

use tracing::debug;

use super::{arg, define_constant};
use crate::error::{JsError, JsResult};
use crate::function::create_builtin_function;
use crate::operations::{get, to_number};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey};

/// Create `%eval%`. The other global functions are installed with the bindings.
pub fn init_global_functions(realm: &mut Realm) -> JsResult<()> {
    realm.intrinsics.eval = create_builtin_function(realm, global_eval, 1, "eval", false)?;
    Ok(())
}

/// isNaN, isFinite, parseInt, parseFloat
///
/// parseInt and parseFloat are the same function objects as `Number.parseInt` and
/// `Number.parseFloat`.
pub(crate) fn define_global_functions(realm: &mut Realm, global: ObjectId) -> JsResult<()> {
    let is_nan = create_builtin_function(realm, global_is_nan, 1, "isNaN", false)?;
    define_constant(realm, global, "isNaN", JsValue::Object(is_nan))?;
    let is_finite = create_builtin_function(realm, global_is_finite, 1, "isFinite", false)?;
    define_constant(realm, global, "isFinite", JsValue::Object(is_finite))?;

    let number = realm.intrinsics.number;
    for name in ["parseFloat", "parseInt"] {
        let func = get(realm, number, &PropertyKey::from(name))?;
        define_constant(realm, global, name, func)?;
    }
    Ok(())
}

/// `PerformEval(x, strictCaller = false, direct = false)`
///
/// Only indirect eval exists: the source is handed to the host's evaluator, which
/// runs it in the global scope.
pub fn perform_eval(realm: &mut Realm, source: &JsString) -> JsResult<JsValue> {
    realm.ensure_can_compile_strings(source)?;
    let Some(evaluator) = realm.evaluator() else {
        return Err(JsError::eval_error(
            "Code generation from strings is not available in this realm",
        ));
    };
    debug!(len = source.as_str().len(), "indirect eval");
    evaluator.evaluate(realm, source)
}

/// eval(x)
fn global_eval(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    match arg(args, 0) {
        JsValue::String(source) => perform_eval(realm, &source),
        other => Ok(other),
    }
}

/// isNaN(number)
fn global_is_nan(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(to_number(realm, &arg(args, 0))?.is_nan()))
}

/// isFinite(number)
fn global_is_finite(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(to_number(realm, &arg(args, 0))?.is_finite()))
}
