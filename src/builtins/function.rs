//! Function constructor and Function.prototype

use super::{arg, create_constructor, register_method};
use crate::error::{JsError, JsResult};
use crate::function::{
    bound_function_create, call, get_prototype_from_constructor, is_callable, name_of,
    set_function_length, set_function_name,
};
use crate::host::DynamicFunctionKind;
use crate::object::{self, ObjectKind};
use crate::operations::{
    ListElementTypes, create_list_from_array_like, define_property_or_throw, get, has_own_property,
    integer_or_infinity, ordinary_has_instance, to_string,
};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// Initialize Function.prototype and the Function constructor
pub fn init_function(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.function_prototype;
    set_function_length(realm, proto, 0.0)?;
    set_function_name(realm, proto, &PropertyKey::from(""), None)?;
    register_method(realm, proto, "apply", function_apply, 2)?;
    register_method(realm, proto, "bind", function_bind, 1)?;
    register_method(realm, proto, "call", function_call, 1)?;
    register_method(realm, proto, "toString", function_to_string, 0)?;

    // Function.prototype[@@hasInstance] is neither writable nor configurable
    let has_instance = crate::function::create_builtin_function(
        realm,
        function_has_instance,
        1,
        WellKnownSymbol::HasInstance,
        false,
    )?;
    define_property_or_throw(
        realm,
        proto,
        &WellKnownSymbol::HasInstance.key(),
        PropertyDescriptor::frozen(JsValue::Object(has_instance)),
    )?;

    realm.intrinsics.function = create_constructor(
        realm,
        function_constructor,
        1,
        "Function",
        proto,
    )?;
    Ok(())
}

/// `CreateDynamicFunction(constructor, newTarget, kind, args)`
///
/// Assembles the source text, consults the compile-strings hook, then hands the
/// pieces to the host evaluator.
pub(crate) fn create_dynamic_function(
    realm: &mut Realm,
    constructor: ObjectId,
    new_target: Option<ObjectId>,
    kind: DynamicFunctionKind,
    args: &[JsValue],
) -> JsResult<JsValue> {
    let new_target = new_target.unwrap_or(constructor);
    let (params, body) = match args.split_last() {
        Some((body, params)) => (params, to_string(realm, body)?),
        None => (&[][..], JsString::from("")),
    };
    let mut parameters = Vec::with_capacity(params.len());
    for param in params {
        parameters.push(to_string(realm, param)?);
    }

    let prefix = match kind {
        DynamicFunctionKind::Normal => "function",
        DynamicFunctionKind::Generator => "function*",
    };
    let joined: Vec<&str> = parameters.iter().map(JsString::as_str).collect();
    let source = JsString::from(format!(
        "{} anonymous({}\n) {{\n{}\n}}",
        prefix,
        joined.join(","),
        body,
    ));
    realm.ensure_can_compile_strings(&source)?;

    let Some(evaluator) = realm.evaluator() else {
        return Err(JsError::eval_error(
            "Code generation from strings is not available in this realm",
        ));
    };
    let func = evaluator.create_function(realm, kind, &parameters, &body)?;

    let fallback = match kind {
        DynamicFunctionKind::Normal => realm.intrinsics.function_prototype,
        DynamicFunctionKind::Generator => realm.intrinsics.generator_function_prototype,
    };
    let proto = get_prototype_from_constructor(realm, new_target, fallback)?;
    object::set_prototype_of(realm, func, Some(proto))?;
    set_function_name(realm, func, &PropertyKey::from("anonymous"), None)?;
    Ok(JsValue::Object(func))
}

fn function_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let constructor = realm.intrinsics.function;
    create_dynamic_function(realm, constructor, nt, DynamicFunctionKind::Normal, args)
}

fn this_callable(realm: &Realm, this: &JsValue, method: &str) -> JsResult<()> {
    if is_callable(realm, this) {
        Ok(())
    } else {
        Err(JsError::type_error(format!(
            "Function.prototype.{} called on a non-callable {}",
            method,
            this.kind_name()
        )))
    }
}

/// Function.prototype.apply(thisArg, argArray)
fn function_apply(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    this_callable(realm, this, "apply")?;
    let this_arg = arg(args, 0);
    let list = match arg(args, 1) {
        JsValue::Undefined | JsValue::Null => Vec::new(),
        other => create_list_from_array_like(realm, &other, ListElementTypes::All)?,
    };
    call(realm, this, &this_arg, &list)
}

/// Function.prototype.call(thisArg, ...args)
fn function_call(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    this_callable(realm, this, "call")?;
    let this_arg = arg(args, 0);
    call(realm, this, &this_arg, args.get(1..).unwrap_or(&[]))
}

/// Function.prototype.bind(thisArg, ...args)
fn function_bind(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    this_callable(realm, this, "bind")?;
    let JsValue::Object(target) = this else {
        return Err(JsError::type_error("Bind must be called on a function"));
    };
    let target = *target;
    let bound_args: Vec<JsValue> = args.get(1..).unwrap_or(&[]).to_vec();
    let bound_arg_count = bound_args.len() as f64;
    let bound = bound_function_create(realm, target, arg(args, 0), bound_args)?;

    let length_key = PropertyKey::from("length");
    let mut length = 0.0;
    if has_own_property(realm, target, &length_key)? {
        if let JsValue::Number(target_len) = get(realm, target, &length_key)? {
            length = match target_len {
                f64::INFINITY => f64::INFINITY,
                f64::NEG_INFINITY => 0.0,
                n => (integer_or_infinity(n) - bound_arg_count).max(0.0),
            };
        }
    }
    set_function_length(realm, bound, length)?;

    let target_name = name_of(realm, target)?;
    set_function_name(realm, bound, &PropertyKey::from(target_name), Some("bound"))?;
    Ok(JsValue::Object(bound))
}

/// Function.prototype.toString()
fn function_to_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let JsValue::Object(func) = this else {
        return Err(JsError::type_error(
            "Function.prototype.toString requires that 'this' be a Function",
        ));
    };
    let native = match &realm.heap.get(*func)?.kind {
        ObjectKind::Function(crate::function::FunctionData::Script(_)) => false,
        ObjectKind::Function(_) | ObjectKind::BoundFunction(_) => true,
        ObjectKind::Proxy(data) if data.callable => true,
        _ => {
            return Err(JsError::type_error(
                "Function.prototype.toString requires that 'this' be a Function",
            ));
        }
    };
    let name = name_of(realm, *func)?;
    let text = if native {
        format!("function {}() {{ [native code] }}", name)
    } else {
        format!("function {}() {{ [code] }}", name)
    };
    Ok(JsValue::from(text))
}

/// Function.prototype[@@hasInstance](V)
fn function_has_instance(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(ordinary_has_instance(realm, this, &arg(args, 0))?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::function::create_builtin_function;
    use crate::host::{DynamicEvaluator, HostConfig};
    use crate::operations::invoke;
    use std::rc::Rc;

    fn sum(
        realm: &mut Realm,
        this: &JsValue,
        args: &[JsValue],
        _nt: Option<ObjectId>,
    ) -> JsResult<JsValue> {
        let mut total = match this {
            JsValue::Number(n) => *n,
            _ => 0.0,
        };
        for value in args {
            total += crate::operations::to_number(realm, value)?;
        }
        Ok(JsValue::Number(total))
    }

    fn sum_function(realm: &mut Realm) -> JsValue {
        JsValue::Object(create_builtin_function(realm, sum, 3, "sum", false).unwrap())
    }

    #[test]
    fn test_call_and_apply() {
        let mut realm = Realm::create(HostConfig::default());
        let f = sum_function(&mut realm);
        let result = invoke(
            &mut realm,
            &f,
            &PropertyKey::from("call"),
            &[JsValue::Number(10.0), JsValue::Number(1.0), JsValue::Number(2.0)],
        )
        .unwrap();
        assert_eq!(result, JsValue::Number(13.0));

        let list = crate::operations::create_array_from_list(&mut realm, &[JsValue::Number(5.0)])
            .unwrap();
        let result = invoke(
            &mut realm,
            &f,
            &PropertyKey::from("apply"),
            &[JsValue::Number(1.0), JsValue::Object(list)],
        )
        .unwrap();
        assert_eq!(result, JsValue::Number(6.0));
    }

    #[test]
    fn test_bind_name_and_length() {
        let mut realm = Realm::create(HostConfig::default());
        let f = sum_function(&mut realm);
        let bound = invoke(
            &mut realm,
            &f,
            &PropertyKey::from("bind"),
            &[JsValue::Number(100.0), JsValue::Number(1.0)],
        )
        .unwrap();
        let bound_id = bound.as_object().unwrap();
        assert_eq!(
            get(&mut realm, bound_id, &PropertyKey::from("name")).unwrap(),
            JsValue::from("bound sum")
        );
        assert_eq!(
            get(&mut realm, bound_id, &PropertyKey::from("length")).unwrap(),
            JsValue::Number(2.0)
        );
        let result = call(&mut realm, &bound, &JsValue::Undefined, &[JsValue::Number(2.0)])
            .unwrap();
        assert_eq!(result, JsValue::Number(103.0));
    }

    #[test]
    fn test_function_constructor_without_evaluator() {
        let mut realm = Realm::create(HostConfig::default());
        let function = JsValue::Object(realm.intrinsics.function);
        let err = call(&mut realm, &function, &JsValue::Undefined, &[JsValue::from("return 1")])
            .unwrap_err();
        assert_eq!(err.native_kind(), Some(crate::error::NativeErrorKind::EvalError));
    }

    struct ConstantFunctions;

    fn forty_two(
        _realm: &mut Realm,
        _this: &JsValue,
        _args: &[JsValue],
        _nt: Option<ObjectId>,
    ) -> JsResult<JsValue> {
        Ok(JsValue::Number(42.0))
    }

    impl DynamicEvaluator for ConstantFunctions {
        fn evaluate(&self, _realm: &mut Realm, _source: &JsString) -> JsResult<JsValue> {
            Ok(JsValue::Undefined)
        }

        fn create_function(
            &self,
            realm: &mut Realm,
            _kind: DynamicFunctionKind,
            parameters: &[JsString],
            _body: &JsString,
        ) -> JsResult<ObjectId> {
            create_builtin_function(realm, forty_two, parameters.len() as u32, "", false)
        }
    }

    #[test]
    fn test_function_constructor_with_evaluator() {
        let mut realm = Realm::create(
            HostConfig::default().with_evaluator(Rc::new(ConstantFunctions)),
        );
        let function = JsValue::Object(realm.intrinsics.function);
        let f = call(
            &mut realm,
            &function,
            &JsValue::Undefined,
            &[JsValue::from("a"), JsValue::from("return 42")],
        )
        .unwrap();
        let f_id = f.as_object().unwrap();
        assert_eq!(
            get(&mut realm, f_id, &PropertyKey::from("name")).unwrap(),
            JsValue::from("anonymous")
        );
        assert_eq!(call(&mut realm, &f, &JsValue::Undefined, &[]).unwrap(), JsValue::Number(42.0));
    }

    #[test]
    fn test_function_constructor_respects_compile_hook() {
        let config = HostConfig::default()
            .with_evaluator(Rc::new(ConstantFunctions))
            .with_compile_strings_hook(|_, _| {
                crate::completion::Completion::throw(JsValue::from("denied"))
            });
        let mut realm = Realm::create(config);
        let function = JsValue::Object(realm.intrinsics.function);
        let err = call(&mut realm, &function, &JsValue::Undefined, &[]).unwrap_err();
        assert!(matches!(err, JsError::Thrown { .. }));
    }
}
