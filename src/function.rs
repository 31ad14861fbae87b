//! Function objects, `[[Call]]` and `[[Construct]]`
//!
//! Built-in functions are plain Rust `fn` pointers. Functions written in the language
//! are created by the AST driver through [`ordinary_function_create`] with a
//! [`FunctionCode`] that evaluates the body; the engine takes care of contexts,
//! environments and `this` binding around it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::builtins::promise::{
    CapabilitySlots, call_capability_executor, call_reject_function, call_resolve_function,
};
use crate::completion::{Completion, CompletionType};
use crate::context::ScriptOrModule;
use crate::environment::{self, EnvId};
use crate::error::{JsError, JsResult};
use crate::generator::{GeneratorBody, GeneratorData, generator_start};
use crate::object::proxy::{proxy_call, proxy_construct, proxy_revoke};
use crate::object::{self, ObjectKind, make_object, ordinary_object_create};
use crate::operations::{define_property_or_throw, get, to_object};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey};

/// Signature of built-in functions: `(realm, this, args, new_target)`
///
/// `new_target` is `Some` only when the function is invoked through `[[Construct]]`.
pub type NativeFn = fn(&mut Realm, &JsValue, &[JsValue], Option<ObjectId>) -> JsResult<JsValue>;

/// `[[ThisMode]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisMode {
    Lexical,
    Strict,
    Global,
}

/// `[[ConstructorKind]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
    Base,
    Derived,
}

/// Kind of function body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCodeKind {
    Normal,
    Generator,
}

/// Body of a function written in the language, supplied by the AST driver
///
/// When a method is called the callee context is already running, with a fresh
/// function environment as both lexical and variable environment and `this` bound.
pub trait FunctionCode {
    fn kind(&self) -> FunctionCodeKind {
        FunctionCodeKind::Normal
    }

    fn is_strict(&self) -> bool;

    /// `ExpectedArgumentCount` of the formal parameters
    fn expected_argument_count(&self) -> u32 {
        0
    }

    /// `FunctionDeclarationInstantiation` followed by the body.
    /// A `return` completion carries the function's result.
    fn evaluate(
        &self,
        realm: &mut Realm,
        function: ObjectId,
        args: &[JsValue],
    ) -> JsResult<Completion>;

    /// For generator functions: run `FunctionDeclarationInstantiation` and hand back
    /// the body as a resumable continuation
    fn generator_body(
        &self,
        _realm: &mut Realm,
        _function: ObjectId,
        _args: &[JsValue],
    ) -> JsResult<Box<dyn GeneratorBody>> {
        Err(JsError::internal("function code is not a generator"))
    }
}

/// A function written in the language
#[derive(Clone)]
pub struct ScriptFunction {
    pub code: Rc<dyn FunctionCode>,
    /// `[[Environment]]`
    pub environment: Option<EnvId>,
    pub this_mode: ThisMode,
    pub constructor_kind: ConstructorKind,
    pub is_class_constructor: bool,
    /// Set by `MakeConstructor`
    pub is_constructor: bool,
    pub home_object: Option<ObjectId>,
    pub script_or_module: Option<ScriptOrModule>,
}

/// A built-in function
#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub func: NativeFn,
    pub constructor: bool,
}

/// Slots of a function object
pub enum FunctionData {
    Native(NativeFunction),
    Script(ScriptFunction),
    /// Promise resolve function
    PromiseResolve {
        promise: ObjectId,
        already_resolved: Rc<Cell<bool>>,
    },
    /// Promise reject function
    PromiseReject {
        promise: ObjectId,
        already_resolved: Rc<Cell<bool>>,
    },
    /// `GetCapabilitiesExecutor` closure
    CapabilityExecutor(Rc<RefCell<CapabilitySlots>>),
    /// `Proxy.revocable` revoke function; `None` once used
    ProxyRevoke { proxy: Option<ObjectId> },
}

impl fmt::Debug for FunctionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionData::Native(n) => write!(f, "Native(constructor: {})", n.constructor),
            FunctionData::Script(s) => write!(f, "Script({:?})", s.this_mode),
            FunctionData::PromiseResolve { promise, .. } => {
                write!(f, "PromiseResolve({:?})", promise)
            }
            FunctionData::PromiseReject { promise, .. } => {
                write!(f, "PromiseReject({:?})", promise)
            }
            FunctionData::CapabilityExecutor(_) => write!(f, "CapabilityExecutor"),
            FunctionData::ProxyRevoke { proxy } => write!(f, "ProxyRevoke({:?})", proxy),
        }
    }
}

/// Slots of a bound function exotic object
#[derive(Debug, Clone)]
pub struct BoundFunctionData {
    pub target: ObjectId,
    pub bound_this: JsValue,
    pub bound_args: Vec<JsValue>,
}

// =============================================================================
// Predicates
// =============================================================================

/// `IsCallable(argument)`
pub fn is_callable(realm: &Realm, value: &JsValue) -> bool {
    let JsValue::Object(obj) = value else {
        return false;
    };
    match realm.heap.get(*obj).map(|o| &o.kind) {
        Ok(ObjectKind::Function(_) | ObjectKind::BoundFunction(_)) => true,
        Ok(ObjectKind::Proxy(p)) => p.callable,
        _ => false,
    }
}

/// `IsConstructor(argument)`
pub fn is_constructor(realm: &Realm, value: &JsValue) -> bool {
    let JsValue::Object(obj) = value else {
        return false;
    };
    match realm.heap.get(*obj).map(|o| &o.kind) {
        Ok(ObjectKind::Function(FunctionData::Native(n))) => n.constructor,
        Ok(ObjectKind::Function(FunctionData::Script(s))) => s.is_constructor,
        Ok(ObjectKind::BoundFunction(b)) => is_constructor(realm, &JsValue::Object(b.target)),
        Ok(ObjectKind::Proxy(p)) => p.constructor,
        _ => false,
    }
}

/// `[[BoundTargetFunction]]` of a bound function
pub fn bound_target_function(realm: &Realm, obj: ObjectId) -> JsResult<Option<ObjectId>> {
    Ok(match &realm.heap.get(obj)?.kind {
        ObjectKind::BoundFunction(b) => Some(b.target),
        _ => None,
    })
}

/// `[[HomeObject]]` of a method
pub fn home_object(realm: &Realm, obj: ObjectId) -> JsResult<Option<ObjectId>> {
    Ok(match &realm.heap.get(obj)?.kind {
        ObjectKind::Function(FunctionData::Script(s)) => s.home_object,
        _ => None,
    })
}

/// The function's own `name` data property, for stack traces
pub fn function_name(realm: &Realm, obj: ObjectId) -> Option<String> {
    let object = realm.heap.get(obj).ok()?;
    match object.properties.get(&PropertyKey::from("name"))?.value.as_ref()? {
        JsValue::String(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}

// =============================================================================
// [[Call]] / [[Construct]]
// =============================================================================

enum CallTarget {
    Native(NativeFn),
    Script(ScriptFunction),
    Bound(BoundFunctionData),
    Proxy,
    Resolve(ObjectId, Rc<Cell<bool>>),
    Reject(ObjectId, Rc<Cell<bool>>),
    Executor(Rc<RefCell<CapabilitySlots>>),
    Revoke(Option<ObjectId>),
}

fn call_target(realm: &Realm, func: ObjectId) -> JsResult<Option<CallTarget>> {
    Ok(Some(match &realm.heap.get(func)?.kind {
        ObjectKind::Function(data) => match data {
            FunctionData::Native(n) => CallTarget::Native(n.func),
            FunctionData::Script(s) => CallTarget::Script(s.clone()),
            FunctionData::PromiseResolve {
                promise,
                already_resolved,
            } => CallTarget::Resolve(*promise, already_resolved.clone()),
            FunctionData::PromiseReject {
                promise,
                already_resolved,
            } => CallTarget::Reject(*promise, already_resolved.clone()),
            FunctionData::CapabilityExecutor(slots) => CallTarget::Executor(slots.clone()),
            FunctionData::ProxyRevoke { proxy } => CallTarget::Revoke(*proxy),
        },
        ObjectKind::BoundFunction(b) => CallTarget::Bound(b.clone()),
        ObjectKind::Proxy(p) if p.callable => CallTarget::Proxy,
        _ => return Ok(None),
    }))
}

/// `Call(F, V, argumentsList)`
pub fn call(
    realm: &mut Realm,
    func: &JsValue,
    this: &JsValue,
    args: &[JsValue],
) -> JsResult<JsValue> {
    let target = match func {
        JsValue::Object(obj) => call_target(realm, *obj)?.map(|t| (*obj, t)),
        _ => None,
    };
    let Some((func, target)) = target else {
        return Err(JsError::type_error(format!("{:?} is not a function", func)));
    };
    realm.check_timeout()?;
    realm.nested(|realm| match target {
        CallTarget::Native(native) => call_native(realm, func, native, this, args, None),
        CallTarget::Script(script) => ordinary_call(realm, func, &script, this, args),
        CallTarget::Bound(bound) => {
            let mut all_args = bound.bound_args;
            all_args.extend_from_slice(args);
            call(realm, &JsValue::Object(bound.target), &bound.bound_this, &all_args)
        }
        CallTarget::Proxy => proxy_call(realm, func, this, args),
        CallTarget::Resolve(promise, already_resolved) => {
            let resolution = args.first().cloned().unwrap_or_default();
            call_resolve_function(realm, promise, &already_resolved, resolution)
        }
        CallTarget::Reject(promise, already_resolved) => {
            let reason = args.first().cloned().unwrap_or_default();
            call_reject_function(realm, promise, &already_resolved, reason)
        }
        CallTarget::Executor(slots) => call_capability_executor(realm, &slots, args),
        CallTarget::Revoke(proxy) => {
            if let Some(proxy) = proxy {
                if let ObjectKind::Function(FunctionData::ProxyRevoke { proxy }) =
                    &mut realm.heap.get_mut(func)?.kind
                {
                    *proxy = None;
                }
                proxy_revoke(realm, proxy)?;
            }
            Ok(JsValue::Undefined)
        }
    })
}

/// `Construct(F, argumentsList, newTarget)`; `new_target` defaults to `F`
pub fn construct(
    realm: &mut Realm,
    func: ObjectId,
    args: &[JsValue],
    new_target: Option<ObjectId>,
) -> JsResult<ObjectId> {
    let new_target = new_target.unwrap_or(func);
    if !is_constructor(realm, &JsValue::Object(func)) {
        return Err(JsError::type_error(format!(
            "{} is not a constructor",
            function_name(realm, func).unwrap_or_else(|| format!("{:?}", func))
        )));
    }
    realm.check_timeout()?;
    let target = call_target(realm, func)?;
    realm.nested(|realm| match target {
        Some(CallTarget::Native(native)) => {
            match call_native(realm, func, native, &JsValue::Undefined, args, Some(new_target))? {
                JsValue::Object(obj) => Ok(obj),
                _ => Err(JsError::internal("built-in constructor returned a non-object")),
            }
        }
        Some(CallTarget::Script(script)) => {
            ordinary_construct(realm, func, &script, args, new_target)
        }
        Some(CallTarget::Bound(bound)) => {
            let new_target = if new_target == func { bound.target } else { new_target };
            let mut all_args = bound.bound_args;
            all_args.extend_from_slice(args);
            construct(realm, bound.target, &all_args, Some(new_target))
        }
        Some(CallTarget::Proxy) => proxy_construct(realm, func, args, new_target),
        _ => Err(JsError::type_error("not a constructor")),
    })
}

fn call_native(
    realm: &mut Realm,
    func: ObjectId,
    native: NativeFn,
    this: &JsValue,
    args: &[JsValue],
    new_target: Option<ObjectId>,
) -> JsResult<JsValue> {
    let mut context = realm.new_context();
    context.function = Some(func);
    realm.push_context(context);
    let result = native(realm, this, args, new_target);
    realm.pop_context()?;
    result
}

/// `PrepareForOrdinaryCall(F, newTarget)`: pushes the callee context
fn prepare_for_ordinary_call(
    realm: &mut Realm,
    func: ObjectId,
    script: &ScriptFunction,
    new_target: Option<ObjectId>,
) -> EnvId {
    let local_env = environment::new_function_environment(
        realm,
        func,
        new_target,
        script.environment,
        script.this_mode == ThisMode::Lexical,
        script.home_object,
    );
    let mut context = realm.new_context();
    context.function = Some(func);
    context.script_or_module = script.script_or_module.clone();
    context.lexical_environment = Some(local_env);
    context.variable_environment = Some(local_env);
    realm.push_context(context);
    local_env
}

/// `OrdinaryCallBindThis(F, calleeContext, thisArgument)`
fn ordinary_call_bind_this(
    realm: &mut Realm,
    script: &ScriptFunction,
    env: EnvId,
    this: &JsValue,
) -> JsResult<()> {
    let this_value = match script.this_mode {
        ThisMode::Lexical => return Ok(()),
        ThisMode::Strict => this.clone(),
        ThisMode::Global => {
            if this.is_null_or_undefined() {
                JsValue::Object(realm.global_this())
            } else {
                JsValue::Object(to_object(realm, this)?)
            }
        }
    };
    environment::bind_this_value(realm, env, this_value)?;
    Ok(())
}

/// `OrdinaryCallEvaluateBody(F, argumentsList)`
fn ordinary_call_evaluate_body(
    realm: &mut Realm,
    func: ObjectId,
    script: &ScriptFunction,
    args: &[JsValue],
) -> JsResult<Completion> {
    match script.code.kind() {
        FunctionCodeKind::Normal => script.code.evaluate(realm, func, args),
        FunctionCodeKind::Generator => {
            let body = script.code.generator_body(realm, func, args)?;
            let fallback = realm.intrinsics.generator_prototype;
            let generator = ordinary_create_from_constructor(
                realm,
                func,
                fallback,
                ObjectKind::Generator(GeneratorData::new()),
            )?;
            generator_start(realm, generator, body)?;
            Ok(Completion::return_(JsValue::Object(generator)))
        }
    }
}

/// Pop the callee context whatever the body did
fn finish_call<T>(realm: &mut Realm, result: JsResult<T>) -> JsResult<T> {
    let popped = realm.pop_context();
    let value = result?;
    popped?;
    Ok(value)
}

/// `[[Call]]` of an ordinary function object
fn ordinary_call(
    realm: &mut Realm,
    func: ObjectId,
    script: &ScriptFunction,
    this: &JsValue,
    args: &[JsValue],
) -> JsResult<JsValue> {
    let env = prepare_for_ordinary_call(realm, func, script, None);
    if script.is_class_constructor {
        let err = JsError::type_error("Class constructor cannot be invoked without 'new'");
        return finish_call(realm, Err(err));
    }
    let result = ordinary_call_bind_this(realm, script, env, this)
        .and_then(|()| ordinary_call_evaluate_body(realm, func, script, args));
    let completion = finish_call(realm, result)?;
    match completion.kind() {
        CompletionType::Return => Ok(completion.value_or_undefined()),
        CompletionType::Throw => Err(JsError::thrown(completion.value_or_undefined())),
        _ => Ok(JsValue::Undefined),
    }
}

/// `[[Construct]]` of an ordinary function object
fn ordinary_construct(
    realm: &mut Realm,
    func: ObjectId,
    script: &ScriptFunction,
    args: &[JsValue],
    new_target: ObjectId,
) -> JsResult<ObjectId> {
    let this_argument = match script.constructor_kind {
        ConstructorKind::Base => {
            let fallback = realm.intrinsics.object_prototype;
            Some(ordinary_create_from_constructor(
                realm,
                new_target,
                fallback,
                ObjectKind::Ordinary,
            )?)
        }
        ConstructorKind::Derived => None,
    };
    let env = prepare_for_ordinary_call(realm, func, script, Some(new_target));
    let result = match this_argument {
        Some(this) => ordinary_call_bind_this(realm, script, env, &JsValue::Object(this)),
        None => Ok(()),
    }
    .and_then(|()| ordinary_call_evaluate_body(realm, func, script, args));
    let completion = finish_call(realm, result)?;

    match completion.kind() {
        CompletionType::Throw => return Err(JsError::thrown(completion.value_or_undefined())),
        CompletionType::Return => match completion.value_or_undefined() {
            JsValue::Object(obj) => return Ok(obj),
            _ if this_argument.is_some() => {}
            JsValue::Undefined => {}
            _ => {
                return Err(JsError::type_error(
                    "Derived constructors may only return object or undefined",
                ));
            }
        },
        _ => {}
    }
    if let Some(this) = this_argument {
        return Ok(this);
    }
    match environment::get_this_binding(realm, env)? {
        JsValue::Object(obj) => Ok(obj),
        _ => Err(JsError::internal("derived constructor bound a non-object this")),
    }
}

// =============================================================================
// Creation
// =============================================================================

/// `OrdinaryCreateFromConstructor(constructor, intrinsicDefaultProto)`
pub fn ordinary_create_from_constructor(
    realm: &mut Realm,
    constructor: ObjectId,
    fallback: ObjectId,
    kind: ObjectKind,
) -> JsResult<ObjectId> {
    let proto = get_prototype_from_constructor(realm, constructor, fallback)?;
    Ok(make_object(realm, Some(proto), kind))
}

/// `GetPrototypeFromConstructor(constructor, intrinsicDefaultProto)`
pub fn get_prototype_from_constructor(
    realm: &mut Realm,
    constructor: ObjectId,
    fallback: ObjectId,
) -> JsResult<ObjectId> {
    match get(realm, constructor, &PropertyKey::from("prototype"))? {
        JsValue::Object(proto) => Ok(proto),
        _ => Ok(fallback),
    }
}

/// `SetFunctionName(F, name, prefix)`
pub fn set_function_name(
    realm: &mut Realm,
    func: ObjectId,
    name: &PropertyKey,
    prefix: Option<&str>,
) -> JsResult<()> {
    let name = match name {
        PropertyKey::Symbol(sym) => match sym.description() {
            Some(desc) => format!("[{}]", desc),
            None => String::new(),
        },
        other => other.to_string(),
    };
    let name = match prefix {
        Some(prefix) => format!("{} {}", prefix, name),
        None => name,
    };
    define_property_or_throw(
        realm,
        func,
        &PropertyKey::from("name"),
        PropertyDescriptor::data(JsValue::from(name), false, false, true),
    )
}

/// `SetFunctionLength(F, length)`
pub fn set_function_length(realm: &mut Realm, func: ObjectId, length: f64) -> JsResult<()> {
    define_property_or_throw(
        realm,
        func,
        &PropertyKey::from("length"),
        PropertyDescriptor::data(JsValue::Number(length), false, false, true),
    )
}

/// `CreateBuiltinFunction(behaviour, length, name, prototype)`
pub fn create_builtin_function(
    realm: &mut Realm,
    func: NativeFn,
    length: u32,
    name: impl Into<PropertyKey>,
    constructor: bool,
) -> JsResult<ObjectId> {
    let proto = Some(realm.intrinsics.function_prototype);
    let obj = make_object(
        realm,
        proto,
        ObjectKind::Function(FunctionData::Native(NativeFunction { func, constructor })),
    );
    set_function_length(realm, obj, length as f64)?;
    set_function_name(realm, obj, &name.into(), None)?;
    Ok(obj)
}

/// Create an anonymous function object carrying special slots (resolving functions, revokers)
pub(crate) fn create_internal_function(
    realm: &mut Realm,
    data: FunctionData,
    length: u32,
) -> JsResult<ObjectId> {
    let proto = Some(realm.intrinsics.function_prototype);
    let obj = make_object(realm, proto, ObjectKind::Function(data));
    set_function_length(realm, obj, length as f64)?;
    set_function_name(realm, obj, &PropertyKey::from(""), None)?;
    Ok(obj)
}

/// `OrdinaryFunctionCreate(functionPrototype, ..., thisMode, env)`
///
/// `lexical_this` marks arrow functions. The function is not a constructor until
/// `make_constructor` is applied.
pub fn ordinary_function_create(
    realm: &mut Realm,
    proto: ObjectId,
    code: Rc<dyn FunctionCode>,
    lexical_this: bool,
    env: Option<EnvId>,
) -> JsResult<ObjectId> {
    let this_mode = if lexical_this {
        ThisMode::Lexical
    } else if code.is_strict() {
        ThisMode::Strict
    } else {
        ThisMode::Global
    };
    let length = code.expected_argument_count();
    let script_or_module = realm.running_context()?.script_or_module.clone();
    let obj = make_object(
        realm,
        Some(proto),
        ObjectKind::Function(FunctionData::Script(ScriptFunction {
            code,
            environment: env,
            this_mode,
            constructor_kind: ConstructorKind::Base,
            is_class_constructor: false,
            is_constructor: false,
            home_object: None,
            script_or_module,
        })),
    );
    set_function_length(realm, obj, length as f64)?;
    Ok(obj)
}

fn script_function_mut(realm: &mut Realm, func: ObjectId) -> JsResult<&mut ScriptFunction> {
    match &mut realm.heap.get_mut(func)?.kind {
        ObjectKind::Function(FunctionData::Script(script)) => Ok(script),
        _ => Err(JsError::internal("expected an ordinary function object")),
    }
}

/// `MakeConstructor(F, writablePrototype, prototype)`
pub fn make_constructor(
    realm: &mut Realm,
    func: ObjectId,
    writable_prototype: bool,
    prototype: Option<ObjectId>,
) -> JsResult<()> {
    if let ObjectKind::Function(FunctionData::Script(script)) =
        &mut realm.heap.get_mut(func)?.kind
    {
        script.is_constructor = true;
    }
    let prototype = match prototype {
        Some(prototype) => prototype,
        None => {
            let object_prototype = Some(realm.intrinsics.object_prototype);
            let prototype = ordinary_object_create(realm, object_prototype);
            define_property_or_throw(
                realm,
                prototype,
                &PropertyKey::from("constructor"),
                PropertyDescriptor::data(JsValue::Object(func), writable_prototype, false, true),
            )?;
            prototype
        }
    };
    define_property_or_throw(
        realm,
        func,
        &PropertyKey::from("prototype"),
        PropertyDescriptor::data(JsValue::Object(prototype), writable_prototype, false, false),
    )
}

/// `MakeMethod(F, homeObject)`
pub fn make_method(realm: &mut Realm, func: ObjectId, home_object: ObjectId) -> JsResult<()> {
    script_function_mut(realm, func)?.home_object = Some(home_object);
    Ok(())
}

/// `MakeClassConstructor(F)`
pub fn make_class_constructor(realm: &mut Realm, func: ObjectId) -> JsResult<()> {
    script_function_mut(realm, func)?.is_class_constructor = true;
    Ok(())
}

/// Mark a class constructor as derived (`class B extends A`)
pub fn set_constructor_kind(
    realm: &mut Realm,
    func: ObjectId,
    kind: ConstructorKind,
) -> JsResult<()> {
    script_function_mut(realm, func)?.constructor_kind = kind;
    Ok(())
}

/// `BoundFunctionCreate(targetFunction, boundThis, boundArgs)`
pub fn bound_function_create(
    realm: &mut Realm,
    target: ObjectId,
    bound_this: JsValue,
    bound_args: Vec<JsValue>,
) -> JsResult<ObjectId> {
    let proto = object::get_prototype_of(realm, target)?;
    Ok(make_object(
        realm,
        proto,
        ObjectKind::BoundFunction(BoundFunctionData {
            target,
            bound_this,
            bound_args,
        }),
    ))
}

/// Function name string used for `bound ` prefixes and diagnostics
pub fn name_of(realm: &mut Realm, func: ObjectId) -> JsResult<JsString> {
    match get(realm, func, &PropertyKey::from("name"))? {
        JsValue::String(s) => Ok(s),
        _ => Ok(JsString::from("")),
    }
}
