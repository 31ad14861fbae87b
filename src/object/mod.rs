//! Objects and internal-method dispatch
//!
//! Every object is an ordinary object (prototype, extensibility, own properties) plus
//! an [`ObjectKind`] tag. The tag selects an [`InternalMethods`] table; each exotic
//! table overrides only the methods it must and inherits the ordinary behaviour for
//! the rest through the trait's default methods. The free functions in this module
//! (`get`, `define_own_property`, ...) are the `O.[[Method]](...)` entry points.

pub mod array;
pub mod namespace;
pub mod ordinary;
pub mod proxy;
pub mod string;

use std::fmt;

use crate::builtins::array::ArrayIteratorData;
use crate::builtins::promise::PromiseData;
use crate::error::{JsError, JsResult};
use crate::function::{BoundFunctionData, FunctionData};
use crate::generator::GeneratorData;
use crate::property::{PropertyDescriptor, PropertyMap};
use crate::realm::Realm;
use crate::value::{JsString, JsSymbol, JsValue, ObjectId, PropertyKey};

pub use namespace::NamespaceData;
pub use proxy::ProxyData;

/// Exotic behaviour and internal slots of an object
pub enum ObjectKind {
    /// Ordinary object
    Ordinary,
    /// Array exotic object (`length` lives in the property map)
    Array,
    /// Function object (built-in, driver-supplied, or a special closure)
    Function(FunctionData),
    /// Bound function exotic object
    BoundFunction(BoundFunctionData),
    /// Proxy exotic object
    Proxy(ProxyData),
    /// Module namespace exotic object
    Namespace(NamespaceData),
    /// String exotic object wrapping a primitive string
    String(JsString),
    /// Number wrapper (`[[NumberData]]`)
    Number(f64),
    /// Boolean wrapper (`[[BooleanData]]`)
    Boolean(bool),
    /// Symbol wrapper (`[[SymbolData]]`)
    Symbol(JsSymbol),
    /// Error instance (`[[ErrorData]]`)
    Error,
    /// Generator instance
    Generator(GeneratorData),
    /// Promise instance
    Promise(PromiseData),
    /// %ArrayIteratorPrototype% instance
    ArrayIterator(ArrayIteratorData),
}

impl ObjectKind {
    /// The internal-method table for this kind
    pub fn internal_methods(&self) -> &'static dyn InternalMethods {
        match self {
            ObjectKind::Array => &array::ArrayMethods,
            ObjectKind::String(_) => &string::StringMethods,
            ObjectKind::Proxy(_) => &proxy::ProxyMethods,
            ObjectKind::Namespace(_) => &namespace::NamespaceMethods,
            _ => &ordinary::OrdinaryMethods,
        }
    }

    /// Tag used by `Object.prototype.toString` before `@@toStringTag`
    pub fn builtin_tag(&self) -> &'static str {
        match self {
            ObjectKind::Array => "Array",
            ObjectKind::Function(_) | ObjectKind::BoundFunction(_) => "Function",
            ObjectKind::Error => "Error",
            ObjectKind::Boolean(_) => "Boolean",
            ObjectKind::Number(_) => "Number",
            ObjectKind::String(_) => "String",
            _ => "Object",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ObjectKind::Ordinary => "Ordinary",
            ObjectKind::Array => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::BoundFunction(_) => "BoundFunction",
            ObjectKind::Proxy(_) => "Proxy",
            ObjectKind::Namespace(_) => "Namespace",
            ObjectKind::String(_) => "String",
            ObjectKind::Number(_) => "Number",
            ObjectKind::Boolean(_) => "Boolean",
            ObjectKind::Symbol(_) => "Symbol",
            ObjectKind::Error => "Error",
            ObjectKind::Generator(_) => "Generator",
            ObjectKind::Promise(_) => "Promise",
            ObjectKind::ArrayIterator(_) => "ArrayIterator",
        }
    }
}

impl fmt::Debug for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JavaScript object
#[derive(Debug)]
pub struct JsObject {
    /// `[[Prototype]]`
    pub prototype: Option<ObjectId>,
    /// `[[Extensible]]`
    pub extensible: bool,
    /// Own properties; only the descriptor pipeline writes here
    pub(crate) properties: PropertyMap,
    /// Exotic behaviour and internal slots
    pub kind: ObjectKind,
}

impl JsObject {
    /// Create a new ordinary object
    pub fn ordinary(prototype: Option<ObjectId>) -> Self {
        Self::with_kind(prototype, ObjectKind::Ordinary)
    }

    pub fn with_kind(prototype: Option<ObjectId>, kind: ObjectKind) -> Self {
        Self {
            prototype,
            extensible: true,
            properties: PropertyMap::new(),
            kind,
        }
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self.kind, ObjectKind::Proxy(_))
    }
}

/// The essential internal methods of an object
///
/// Default implementations are the ordinary-object algorithms; exotic tables
/// override a subset.
pub trait InternalMethods {
    fn get_prototype_of(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<Option<ObjectId>> {
        ordinary::ordinary_get_prototype_of(realm, obj)
    }

    fn set_prototype_of(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        proto: Option<ObjectId>,
    ) -> JsResult<bool> {
        ordinary::ordinary_set_prototype_of(realm, obj, proto)
    }

    fn is_extensible(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
        ordinary::ordinary_is_extensible(realm, obj)
    }

    fn prevent_extensions(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
        ordinary::ordinary_prevent_extensions(realm, obj)
    }

    fn get_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        ordinary::ordinary_get_own_property(realm, obj, key)
    }

    fn define_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        ordinary::ordinary_define_own_property(realm, obj, key, desc)
    }

    fn has_property(&self, realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
        ordinary::ordinary_has_property(realm, obj, key)
    }

    fn get(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        receiver: &JsValue,
    ) -> JsResult<JsValue> {
        ordinary::ordinary_get(realm, obj, key, receiver)
    }

    fn set(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        value: JsValue,
        receiver: &JsValue,
    ) -> JsResult<bool> {
        ordinary::ordinary_set(realm, obj, key, value, receiver)
    }

    fn delete(&self, realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
        ordinary::ordinary_delete(realm, obj, key)
    }

    fn own_property_keys(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<Vec<PropertyKey>> {
        ordinary::ordinary_own_property_keys(realm, obj)
    }
}

fn methods(realm: &Realm, obj: ObjectId) -> JsResult<&'static dyn InternalMethods> {
    Ok(realm.heap.get(obj)?.kind.internal_methods())
}

/// `O.[[GetPrototypeOf]]()`
pub fn get_prototype_of(realm: &mut Realm, obj: ObjectId) -> JsResult<Option<ObjectId>> {
    realm.nested(|realm| methods(realm, obj)?.get_prototype_of(realm, obj))
}

/// `O.[[SetPrototypeOf]](V)`
pub fn set_prototype_of(
    realm: &mut Realm,
    obj: ObjectId,
    proto: Option<ObjectId>,
) -> JsResult<bool> {
    realm.nested(|realm| methods(realm, obj)?.set_prototype_of(realm, obj, proto))
}

/// `O.[[IsExtensible]]()`
pub fn is_extensible(realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
    realm.nested(|realm| methods(realm, obj)?.is_extensible(realm, obj))
}

/// `O.[[PreventExtensions]]()`
pub fn prevent_extensions(realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
    realm.nested(|realm| methods(realm, obj)?.prevent_extensions(realm, obj))
}

/// `O.[[GetOwnProperty]](P)`
pub fn get_own_property(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
) -> JsResult<Option<PropertyDescriptor>> {
    realm.nested(|realm| methods(realm, obj)?.get_own_property(realm, obj, key))
}

/// `O.[[DefineOwnProperty]](P, Desc)`
pub fn define_own_property(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    desc: PropertyDescriptor,
) -> JsResult<bool> {
    if !desc.is_valid() {
        return Err(JsError::internal(
            "property descriptor mixes data and accessor fields",
        ));
    }
    realm.nested(|realm| methods(realm, obj)?.define_own_property(realm, obj, key, desc))
}

/// `O.[[HasProperty]](P)`
pub fn has_property(realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
    realm.nested(|realm| methods(realm, obj)?.has_property(realm, obj, key))
}

/// `O.[[Get]](P, Receiver)`
pub fn get(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    receiver: &JsValue,
) -> JsResult<JsValue> {
    realm.nested(|realm| methods(realm, obj)?.get(realm, obj, key, receiver))
}

/// `O.[[Set]](P, V, Receiver)`
pub fn set(
    realm: &mut Realm,
    obj: ObjectId,
    key: &PropertyKey,
    value: JsValue,
    receiver: &JsValue,
) -> JsResult<bool> {
    realm.nested(|realm| methods(realm, obj)?.set(realm, obj, key, value, receiver))
}

/// `O.[[Delete]](P)`
pub fn delete(realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
    realm.nested(|realm| methods(realm, obj)?.delete(realm, obj, key))
}

/// `O.[[OwnPropertyKeys]]()`
pub fn own_property_keys(realm: &mut Realm, obj: ObjectId) -> JsResult<Vec<PropertyKey>> {
    realm.nested(|realm| methods(realm, obj)?.own_property_keys(realm, obj))
}

/// `OrdinaryObjectCreate(proto)`
pub fn ordinary_object_create(realm: &mut Realm, proto: Option<ObjectId>) -> ObjectId {
    realm.heap.alloc(JsObject::ordinary(proto))
}

/// `MakeBasicObject` with a specific kind
pub fn make_object(realm: &mut Realm, proto: Option<ObjectId>, kind: ObjectKind) -> ObjectId {
    realm.heap.alloc(JsObject::with_kind(proto, kind))
}
