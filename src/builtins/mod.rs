//! Intrinsic objects and the global object's default bindings

pub mod array;
pub mod boolean;
pub mod error;
pub mod function;
pub mod generator;
pub mod global;
pub mod iterator;
pub mod json;
pub mod math;
pub mod number;
pub mod object;
pub mod promise;
pub mod proxy;
pub mod reflect;
pub mod string;
pub mod symbol;

use crate::error::{JsResult, NativeErrorKind};
use crate::function::{FunctionData, NativeFn, NativeFunction, create_builtin_function};
use crate::object::{ObjectKind, make_object, ordinary_object_create};
use crate::operations::define_property_or_throw;
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

/// `[[Intrinsics]]` of a realm
///
/// Every field starts out as a placeholder (the object prototype) and is replaced
/// by [`init_intrinsics`] before anything else runs.
#[derive(Debug, Clone)]
pub struct Intrinsics {
    pub object_prototype: ObjectId,
    pub function_prototype: ObjectId,
    pub array_prototype: ObjectId,
    pub string_prototype: ObjectId,
    pub number_prototype: ObjectId,
    pub boolean_prototype: ObjectId,
    pub symbol_prototype: ObjectId,
    pub error_prototype: ObjectId,
    pub eval_error_prototype: ObjectId,
    pub range_error_prototype: ObjectId,
    pub reference_error_prototype: ObjectId,
    pub syntax_error_prototype: ObjectId,
    pub type_error_prototype: ObjectId,
    pub uri_error_prototype: ObjectId,
    pub iterator_prototype: ObjectId,
    pub array_iterator_prototype: ObjectId,
    /// `%GeneratorFunction.prototype%`
    pub generator_function_prototype: ObjectId,
    /// `%GeneratorFunction.prototype.prototype%`
    pub generator_prototype: ObjectId,
    pub promise_prototype: ObjectId,

    pub object: ObjectId,
    pub function: ObjectId,
    pub array: ObjectId,
    pub string: ObjectId,
    pub number: ObjectId,
    pub boolean: ObjectId,
    pub symbol: ObjectId,
    pub error: ObjectId,
    pub eval_error: ObjectId,
    pub range_error: ObjectId,
    pub reference_error: ObjectId,
    pub syntax_error: ObjectId,
    pub type_error: ObjectId,
    pub uri_error: ObjectId,
    pub promise: ObjectId,
    pub proxy: ObjectId,
    pub reflect: ObjectId,
    pub json: ObjectId,
    pub math: ObjectId,
    pub eval: ObjectId,
    /// `%Array.prototype.values%`, shared by `values` and `@@iterator`
    pub array_prototype_values: ObjectId,
}

impl Intrinsics {
    pub(crate) fn placeholder(id: ObjectId) -> Self {
        Self {
            object_prototype: id,
            function_prototype: id,
            array_prototype: id,
            string_prototype: id,
            number_prototype: id,
            boolean_prototype: id,
            symbol_prototype: id,
            error_prototype: id,
            eval_error_prototype: id,
            range_error_prototype: id,
            reference_error_prototype: id,
            syntax_error_prototype: id,
            type_error_prototype: id,
            uri_error_prototype: id,
            iterator_prototype: id,
            array_iterator_prototype: id,
            generator_function_prototype: id,
            generator_prototype: id,
            promise_prototype: id,
            object: id,
            function: id,
            array: id,
            string: id,
            number: id,
            boolean: id,
            symbol: id,
            error: id,
            eval_error: id,
            range_error: id,
            reference_error: id,
            syntax_error: id,
            type_error: id,
            uri_error: id,
            promise: id,
            proxy: id,
            reflect: id,
            json: id,
            math: id,
            eval: id,
            array_prototype_values: id,
        }
    }

    /// Prototype of the error objects created for `kind`
    pub fn error_prototype_for(&self, kind: NativeErrorKind) -> ObjectId {
        match kind {
            NativeErrorKind::Error => self.error_prototype,
            NativeErrorKind::EvalError => self.eval_error_prototype,
            NativeErrorKind::RangeError => self.range_error_prototype,
            NativeErrorKind::ReferenceError => self.reference_error_prototype,
            NativeErrorKind::SyntaxError => self.syntax_error_prototype,
            NativeErrorKind::TypeError => self.type_error_prototype,
            NativeErrorKind::UriError => self.uri_error_prototype,
        }
    }

    /// Constructor for `kind`
    pub fn error_constructor_for(&self, kind: NativeErrorKind) -> ObjectId {
        match kind {
            NativeErrorKind::Error => self.error,
            NativeErrorKind::EvalError => self.eval_error,
            NativeErrorKind::RangeError => self.range_error,
            NativeErrorKind::ReferenceError => self.reference_error,
            NativeErrorKind::SyntaxError => self.syntax_error,
            NativeErrorKind::TypeError => self.type_error,
            NativeErrorKind::UriError => self.uri_error,
        }
    }
}

// =============================================================================
// Registration helpers
// =============================================================================

/// Argument `index`, `undefined` when absent
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or(JsValue::Undefined)
}

/// Install a built-in method: writable, non-enumerable, configurable
pub(crate) fn register_method(
    realm: &mut Realm,
    obj: ObjectId,
    name: impl Into<PropertyKey>,
    func: NativeFn,
    length: u32,
) -> JsResult<ObjectId> {
    let key = name.into();
    let f = create_builtin_function(realm, func, length, key.clone(), false)?;
    define_property_or_throw(realm, obj, &key, PropertyDescriptor::builtin(JsValue::Object(f)))?;
    Ok(f)
}

/// Install a configurable accessor with only a getter
pub(crate) fn register_getter(
    realm: &mut Realm,
    obj: ObjectId,
    name: impl Into<PropertyKey>,
    func: NativeFn,
) -> JsResult<()> {
    let key = name.into();
    let getter = create_builtin_function(realm, func, 0, key.clone(), false)?;
    crate::function::set_function_name(realm, getter, &key, Some("get"))?;
    define_property_or_throw(
        realm,
        obj,
        &key,
        PropertyDescriptor::accessor(JsValue::Object(getter), JsValue::Undefined, false, true),
    )
}

/// Install a constant: non-writable, non-enumerable, non-configurable
pub(crate) fn define_constant(
    realm: &mut Realm,
    obj: ObjectId,
    name: impl Into<PropertyKey>,
    value: JsValue,
) -> JsResult<()> {
    define_property_or_throw(realm, obj, &name.into(), PropertyDescriptor::frozen(value))
}

/// Install a plain built-in data property (writable, non-enumerable, configurable)
pub(crate) fn define_builtin(
    realm: &mut Realm,
    obj: ObjectId,
    name: impl Into<PropertyKey>,
    value: JsValue,
) -> JsResult<()> {
    define_property_or_throw(realm, obj, &name.into(), PropertyDescriptor::builtin(value))
}

/// Create a constructor wired to `prototype` in both directions
pub(crate) fn create_constructor(
    realm: &mut Realm,
    func: NativeFn,
    length: u32,
    name: &str,
    prototype: ObjectId,
) -> JsResult<ObjectId> {
    let ctor = create_builtin_function(realm, func, length, name, true)?;
    define_constant(realm, ctor, "prototype", JsValue::Object(prototype))?;
    define_builtin(realm, prototype, "constructor", JsValue::Object(ctor))?;
    Ok(ctor)
}

/// A fresh ordinary object inheriting from `%Object.prototype%`
pub(crate) fn plain_object(realm: &mut Realm) -> ObjectId {
    let proto = Some(realm.intrinsics.object_prototype);
    ordinary_object_create(realm, proto)
}

fn function_prototype_behaviour(
    _realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _new_target: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Undefined)
}

// =============================================================================
// Bootstrap
// =============================================================================

/// `CreateIntrinsics(realmRec)`
///
/// Prototypes are allocated first so that every constructor and method created
/// afterwards can link to them.
pub(crate) fn init_intrinsics(realm: &mut Realm) -> JsResult<()> {
    let object_prototype = realm.intrinsics.object_prototype;
    let proto = Some(object_prototype);

    // %Function.prototype% is itself a built-in function returning undefined
    realm.intrinsics.function_prototype = make_object(
        realm,
        proto,
        ObjectKind::Function(FunctionData::Native(NativeFunction {
            func: function_prototype_behaviour,
            constructor: false,
        })),
    );
    realm.intrinsics.array_prototype = crate::object::array::array_create(realm, 0, proto)?;
    realm.intrinsics.string_prototype = crate::object::string::string_create(
        realm,
        "".into(),
        proto,
    )?;
    realm.intrinsics.number_prototype = make_object(realm, proto, ObjectKind::Number(0.0));
    realm.intrinsics.boolean_prototype = make_object(realm, proto, ObjectKind::Boolean(false));
    realm.intrinsics.symbol_prototype = ordinary_object_create(realm, proto);
    realm.intrinsics.error_prototype = ordinary_object_create(realm, proto);
    let error_proto = Some(realm.intrinsics.error_prototype);
    realm.intrinsics.eval_error_prototype = ordinary_object_create(realm, error_proto);
    realm.intrinsics.range_error_prototype = ordinary_object_create(realm, error_proto);
    realm.intrinsics.reference_error_prototype = ordinary_object_create(realm, error_proto);
    realm.intrinsics.syntax_error_prototype = ordinary_object_create(realm, error_proto);
    realm.intrinsics.type_error_prototype = ordinary_object_create(realm, error_proto);
    realm.intrinsics.uri_error_prototype = ordinary_object_create(realm, error_proto);
    realm.intrinsics.iterator_prototype = ordinary_object_create(realm, proto);
    let iterator_proto = Some(realm.intrinsics.iterator_prototype);
    realm.intrinsics.array_iterator_prototype = ordinary_object_create(realm, iterator_proto);
    let function_proto = Some(realm.intrinsics.function_prototype);
    realm.intrinsics.generator_function_prototype = ordinary_object_create(realm, function_proto);
    realm.intrinsics.generator_prototype = ordinary_object_create(realm, iterator_proto);
    realm.intrinsics.promise_prototype = ordinary_object_create(realm, proto);

    object::init_object(realm)?;
    function::init_function(realm)?;
    iterator::init_iterator_prototype(realm)?;
    array::init_array(realm)?;
    string::init_string(realm)?;
    number::init_number(realm)?;
    boolean::init_boolean(realm)?;
    symbol::init_symbol(realm)?;
    error::init_error(realm)?;
    generator::init_generator(realm)?;
    promise::init_promise(realm)?;
    proxy::init_proxy(realm)?;
    reflect::init_reflect(realm)?;
    json::init_json(realm)?;
    math::init_math(realm)?;
    global::init_global_functions(realm)?;
    Ok(())
}

/// `SetDefaultGlobalBindings(realmRec)`
///
/// Every binding goes through `DefinePropertyOrThrow` as a non-writable,
/// non-enumerable, non-configurable data property, so the global object's shape is
/// the same for every realm and cannot be changed afterwards.
pub(crate) fn set_default_global_bindings(realm: &mut Realm) -> JsResult<()> {
    let global = realm.global_object();
    let global_this = realm.global_this();

    define_constant(realm, global, "globalThis", JsValue::Object(global_this))?;
    define_constant(realm, global, "Infinity", JsValue::Number(f64::INFINITY))?;
    define_constant(realm, global, "NaN", JsValue::Number(f64::NAN))?;
    define_constant(realm, global, "undefined", JsValue::Undefined)?;

    let i = realm.intrinsics.clone();
    let bindings = [
        ("Object", i.object),
        ("Function", i.function),
        ("Array", i.array),
        ("String", i.string),
        ("Number", i.number),
        ("Boolean", i.boolean),
        ("Symbol", i.symbol),
        ("Error", i.error),
        ("EvalError", i.eval_error),
        ("RangeError", i.range_error),
        ("ReferenceError", i.reference_error),
        ("SyntaxError", i.syntax_error),
        ("TypeError", i.type_error),
        ("URIError", i.uri_error),
        ("Promise", i.promise),
        ("Proxy", i.proxy),
        ("Reflect", i.reflect),
        ("JSON", i.json),
        ("Math", i.math),
        ("eval", i.eval),
    ];
    for (name, value) in bindings {
        define_constant(realm, global, name, JsValue::Object(value))?;
    }
    global::define_global_functions(realm, global)
}
