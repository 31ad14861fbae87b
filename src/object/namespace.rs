//! Module namespace exotic objects
//!
//! A namespace is a frozen view of a module's exports. Its string-keyed properties
//! are live: every read goes back to the exporting module's environment, so the
//! namespace never holds values of its own.

use std::rc::Rc;

use tracing::debug;

use super::ordinary::{
    ordinary_get, ordinary_get_own_property, ordinary_has_property, ordinary_own_property_keys,
};
use super::{InternalMethods, ObjectKind};
use crate::environment::get_binding_value;
use crate::error::{JsError, JsResult};
use crate::module::{BindingName, ModuleRecord, ResolvedExport, get_module_namespace};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// `[[Module]]` and `[[Exports]]` of a namespace
pub struct NamespaceData {
    pub module: Rc<dyn ModuleRecord>,
    /// Export names ordered by code units, fixed at creation
    pub exports: Vec<JsString>,
}

impl NamespaceData {
    fn export_named(&self, key: &PropertyKey) -> Option<&JsString> {
        let name = key.to_js_string();
        self.exports
            .binary_search_by(|e| e.cmp_code_units(&name))
            .ok()
            .and_then(|i| self.exports.get(i))
    }
}

/// Internal-method table of module namespace objects
pub struct NamespaceMethods;

fn namespace_data(realm: &Realm, obj: ObjectId) -> JsResult<&NamespaceData> {
    match &realm.heap.get(obj)?.kind {
        ObjectKind::Namespace(data) => Ok(data),
        _ => Err(JsError::internal("namespace method on a non-namespace")),
    }
}

/// The export name for a string key, or `None` for symbols and non-exports
fn exported_name(realm: &Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<Option<JsString>> {
    if key.is_symbol() {
        return Ok(None);
    }
    Ok(namespace_data(realm, obj)?.export_named(key).cloned())
}

impl InternalMethods for NamespaceMethods {
    fn get_prototype_of(&self, _realm: &mut Realm, _obj: ObjectId) -> JsResult<Option<ObjectId>> {
        Ok(None)
    }

    /// `SetImmutablePrototype`: only "setting" the current (null) prototype succeeds
    fn set_prototype_of(
        &self,
        _realm: &mut Realm,
        _obj: ObjectId,
        proto: Option<ObjectId>,
    ) -> JsResult<bool> {
        Ok(proto.is_none())
    }

    fn is_extensible(&self, _realm: &mut Realm, _obj: ObjectId) -> JsResult<bool> {
        Ok(false)
    }

    fn prevent_extensions(&self, _realm: &mut Realm, _obj: ObjectId) -> JsResult<bool> {
        Ok(true)
    }

    fn get_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if key.is_symbol() {
            return ordinary_get_own_property(realm, obj, key);
        }
        if exported_name(realm, obj, key)?.is_none() {
            return Ok(None);
        }
        let value = self.get(realm, obj, key, &JsValue::Object(obj))?;
        Ok(Some(PropertyDescriptor::data(value, true, true, false)))
    }

    fn define_own_property(
        &self,
        _realm: &mut Realm,
        _obj: ObjectId,
        _key: &PropertyKey,
        _desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        Ok(false)
    }

    fn has_property(&self, realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
        if key.is_symbol() {
            return ordinary_has_property(realm, obj, key);
        }
        Ok(exported_name(realm, obj, key)?.is_some())
    }

    fn get(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        receiver: &JsValue,
    ) -> JsResult<JsValue> {
        if key.is_symbol() {
            return ordinary_get(realm, obj, key, receiver);
        }
        let Some(name) = exported_name(realm, obj, key)? else {
            return Ok(JsValue::Undefined);
        };
        let module = namespace_data(realm, obj)?.module.clone();

        let ResolvedExport::Binding(binding) = module.resolve_export(&name, &mut Vec::new()) else {
            return Err(JsError::internal(format!(
                "namespace export '{}' no longer resolves",
                name
            )));
        };
        let binding_name = match binding.binding_name {
            BindingName::Namespace => {
                return get_module_namespace(realm, &binding.module).map(JsValue::Object);
            }
            BindingName::Name(binding_name) => binding_name,
        };
        let Some(target_env) = binding.module.environment() else {
            return Err(JsError::reference_error(format!(
                "Cannot access '{}': module environment is gone",
                binding_name
            )));
        };
        get_binding_value(realm, target_env, &binding_name, true)
    }

    fn set(
        &self,
        _realm: &mut Realm,
        _obj: ObjectId,
        _key: &PropertyKey,
        _value: JsValue,
        _receiver: &JsValue,
    ) -> JsResult<bool> {
        Ok(false)
    }

    fn delete(&self, _realm: &mut Realm, _obj: ObjectId, _key: &PropertyKey) -> JsResult<bool> {
        Ok(false)
    }

    fn own_property_keys(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<Vec<PropertyKey>> {
        let mut keys: Vec<PropertyKey> = namespace_data(realm, obj)?
            .exports
            .iter()
            .map(|name| PropertyKey::from(name.clone()))
            .collect();
        keys.extend(
            ordinary_own_property_keys(realm, obj)?
                .into_iter()
                .filter(PropertyKey::is_symbol),
        );
        Ok(keys)
    }
}

/// `ModuleNamespaceCreate(module, exports)`
///
/// Callers go through `get_module_namespace`, which caches one namespace per module.
pub fn module_namespace_create(
    realm: &mut Realm,
    module: Rc<dyn ModuleRecord>,
    mut exports: Vec<JsString>,
) -> JsResult<ObjectId> {
    exports.sort_by(|a, b| a.cmp_code_units(b));
    exports.dedup();
    debug!(module = module.id().0, exports = exports.len(), "create module namespace");

    let namespace = super::make_object(
        realm,
        None,
        ObjectKind::Namespace(NamespaceData { module, exports }),
    );
    // Written straight to storage: the namespace already reports itself non-extensible
    let object = realm.heap.get_mut(namespace)?;
    object.properties.insert(
        WellKnownSymbol::ToStringTag.key(),
        PropertyDescriptor::frozen(JsValue::from("Module")),
    );
    object.extensible = false;
    Ok(namespace)
}
