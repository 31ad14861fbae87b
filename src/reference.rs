//! Reference Records
//!
//! The resolved target of an identifier or property access, as produced by the AST
//! driver before it reads, writes or deletes through it.

use crate::environment::{self, EnvId};
use crate::error::{JsError, JsResult};
use crate::object;
use crate::operations::to_object;
use crate::realm::Realm;
use crate::value::{JsValue, PropertyKey};

/// `[[Base]]` of a reference
#[derive(Debug, Clone)]
pub enum ReferenceBase {
    Unresolvable,
    /// Property reference on a value (primitives are boxed on access)
    Value(JsValue),
    Environment(EnvId),
}

/// Reference Record
#[derive(Debug, Clone)]
pub struct Reference {
    pub base: ReferenceBase,
    /// `[[ReferencedName]]`; binding names are always `PropertyKey::String`
    pub name: PropertyKey,
    pub strict: bool,
    /// `[[ThisValue]]`, present only for `super.x` references
    pub this_value: Option<JsValue>,
}

impl Reference {
    /// Property reference `base[name]`
    pub fn property(base: JsValue, name: PropertyKey, strict: bool) -> Self {
        Self {
            base: ReferenceBase::Value(base),
            name,
            strict,
            this_value: None,
        }
    }

    /// Super reference `super[name]` with an explicit this value
    pub fn super_property(
        base: JsValue,
        name: PropertyKey,
        this_value: JsValue,
        strict: bool,
    ) -> Self {
        Self {
            base: ReferenceBase::Value(base),
            name,
            strict,
            this_value: Some(this_value),
        }
    }

    pub fn is_property_reference(&self) -> bool {
        matches!(self.base, ReferenceBase::Value(_))
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self.base, ReferenceBase::Unresolvable)
    }

    pub fn is_super_reference(&self) -> bool {
        self.this_value.is_some()
    }

    /// `GetThisValue(V)`
    pub fn this_value(&self) -> JsResult<JsValue> {
        if let Some(this) = &self.this_value {
            return Ok(this.clone());
        }
        match &self.base {
            ReferenceBase::Value(base) => Ok(base.clone()),
            _ => Err(JsError::internal("GetThisValue on a non-property reference")),
        }
    }

    /// `GetValue(V)`
    pub fn get_value(&self, realm: &mut Realm) -> JsResult<JsValue> {
        match &self.base {
            ReferenceBase::Unresolvable => Err(JsError::not_defined(&self.name)),
            ReferenceBase::Value(base) => {
                let base_obj = to_object(realm, base)?;
                let this = self.this_value()?;
                object::get(realm, base_obj, &self.name, &this)
            }
            ReferenceBase::Environment(env) => {
                environment::get_binding_value(realm, *env, &self.name.to_js_string(), self.strict)
            }
        }
    }

    /// `PutValue(V, W)`
    pub fn put_value(&self, realm: &mut Realm, value: JsValue) -> JsResult<()> {
        match &self.base {
            ReferenceBase::Unresolvable => {
                if self.strict {
                    return Err(JsError::not_defined(&self.name));
                }
                let global = environment::get_global_object(realm);
                let receiver = JsValue::Object(global);
                object::set(realm, global, &self.name, value, &receiver)?;
                Ok(())
            }
            ReferenceBase::Value(base) => {
                let base_obj = to_object(realm, base)?;
                let this = self.this_value()?;
                let succeeded = object::set(realm, base_obj, &self.name, value, &this)?;
                if !succeeded && self.strict {
                    return Err(JsError::type_error(format!(
                        "Cannot assign to read only property '{}' of {}",
                        self.name,
                        base.kind_name()
                    )));
                }
                Ok(())
            }
            ReferenceBase::Environment(env) => environment::set_mutable_binding(
                realm,
                *env,
                &self.name.to_js_string(),
                value,
                self.strict,
            ),
        }
    }

    /// `InitializeReferencedBinding(V, W)`
    pub fn initialize_referenced_binding(&self, realm: &mut Realm, value: JsValue) -> JsResult<()> {
        match &self.base {
            ReferenceBase::Environment(env) => {
                environment::initialize_binding(realm, *env, &self.name.to_js_string(), value)
            }
            _ => Err(JsError::internal("InitializeReferencedBinding on a non-binding reference")),
        }
    }

    /// The `delete` operator applied to this reference
    pub fn delete(&self, realm: &mut Realm) -> JsResult<bool> {
        match &self.base {
            ReferenceBase::Unresolvable => Ok(true),
            ReferenceBase::Value(base) => {
                if self.is_super_reference() {
                    return Err(JsError::reference_error("Unsupported reference to 'super'"));
                }
                let base_obj = to_object(realm, base)?;
                let deleted = object::delete(realm, base_obj, &self.name)?;
                if !deleted && self.strict {
                    return Err(JsError::type_error(format!(
                        "Cannot delete property '{}'",
                        self.name
                    )));
                }
                Ok(deleted)
            }
            ReferenceBase::Environment(env) => {
                environment::delete_binding(realm, *env, &self.name.to_js_string())
            }
        }
    }
}
