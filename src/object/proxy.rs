//! Proxy exotic objects
//!
//! Every internal method looks up the matching trap on the handler and forwards to
//! the target when the trap is absent. Trap results are checked against the target
//! so a proxy can never report something the target's own invariants forbid
//! (e.g. a non-configurable property disappearing).

use super::ordinary::is_compatible_property_descriptor;
use super::{InternalMethods, ObjectKind};
use crate::error::{JsError, JsResult};
use crate::function::{call, construct, is_callable, is_constructor};
use crate::operations::{
    ListElementTypes, create_array_from_list, create_list_from_array_like,
    from_property_descriptor, get_method, same_value, to_property_descriptor,
};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

/// `[[ProxyTarget]]` / `[[ProxyHandler]]`, both cleared by revocation
#[derive(Debug, Clone)]
pub struct ProxyData {
    pub target: Option<ObjectId>,
    pub handler: Option<ObjectId>,
    /// Whether the proxy got a `[[Call]]` (target was callable at creation)
    pub callable: bool,
    /// Whether the proxy got a `[[Construct]]`
    pub constructor: bool,
}

impl ProxyData {
    pub fn is_revoked(&self) -> bool {
        self.handler.is_none()
    }
}

/// Internal-method table of Proxy exotic objects
pub struct ProxyMethods;

/// Target, handler and (if defined) the trap function
struct TrapLookup {
    target: ObjectId,
    handler: ObjectId,
    trap: Option<JsValue>,
}

fn lookup_trap(realm: &mut Realm, proxy: ObjectId, name: &str) -> JsResult<TrapLookup> {
    let (target, handler) = match &realm.heap.get(proxy)?.kind {
        ObjectKind::Proxy(data) => (data.target, data.handler),
        _ => return Err(JsError::internal("proxy trap lookup on a non-proxy")),
    };
    let (Some(target), Some(handler)) = (target, handler) else {
        return Err(JsError::type_error(format!(
            "Cannot perform '{}' on a proxy that has been revoked",
            name
        )));
    };
    let trap = get_method(realm, &JsValue::Object(handler), &PropertyKey::from(name))?;
    Ok(TrapLookup {
        target,
        handler,
        trap,
    })
}

fn trap_error(trap: &str, detail: &str) -> JsError {
    JsError::type_error(format!("'{}' on proxy: {}", trap, detail))
}

impl InternalMethods for ProxyMethods {
    fn get_prototype_of(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<Option<ObjectId>> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "getPrototypeOf")?;
        let Some(trap) = trap else {
            return super::get_prototype_of(realm, target);
        };

        let result = call(realm, &trap, &JsValue::Object(handler), &[JsValue::Object(target)])?;
        let handler_proto = match result {
            JsValue::Object(p) => Some(p),
            JsValue::Null => None,
            _ => {
                return Err(trap_error(
                    "getPrototypeOf",
                    "trap returned neither object nor null",
                ));
            }
        };
        if super::is_extensible(realm, target)? {
            return Ok(handler_proto);
        }
        let target_proto = super::get_prototype_of(realm, target)?;
        if handler_proto != target_proto {
            return Err(trap_error(
                "getPrototypeOf",
                "proxy target is non-extensible but the trap did not return its actual prototype",
            ));
        }
        Ok(handler_proto)
    }

    fn set_prototype_of(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        proto: Option<ObjectId>,
    ) -> JsResult<bool> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "setPrototypeOf")?;
        let Some(trap) = trap else {
            return super::set_prototype_of(realm, target, proto);
        };

        let proto_value = proto.map_or(JsValue::Null, JsValue::Object);
        let result = call(
            realm,
            &trap,
            &JsValue::Object(handler),
            &[JsValue::Object(target), proto_value],
        )?;
        if !result.to_boolean() {
            return Ok(false);
        }
        if super::is_extensible(realm, target)? {
            return Ok(true);
        }
        if super::get_prototype_of(realm, target)? != proto {
            return Err(trap_error(
                "setPrototypeOf",
                "trap returned truish for setting a new prototype on a non-extensible target",
            ));
        }
        Ok(true)
    }

    fn is_extensible(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "isExtensible")?;
        let Some(trap) = trap else {
            return super::is_extensible(realm, target);
        };

        let result = call(realm, &trap, &JsValue::Object(handler), &[JsValue::Object(target)])?
            .to_boolean();
        if result != super::is_extensible(realm, target)? {
            return Err(trap_error(
                "isExtensible",
                "trap result does not reflect extensibility of proxy target",
            ));
        }
        Ok(result)
    }

    fn prevent_extensions(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<bool> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "preventExtensions")?;
        let Some(trap) = trap else {
            return super::prevent_extensions(realm, target);
        };

        let result = call(realm, &trap, &JsValue::Object(handler), &[JsValue::Object(target)])?
            .to_boolean();
        if result && super::is_extensible(realm, target)? {
            return Err(trap_error(
                "preventExtensions",
                "trap returned truish but the proxy target is extensible",
            ));
        }
        Ok(result)
    }

    fn get_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "getOwnPropertyDescriptor")?;
        let Some(trap) = trap else {
            return super::get_own_property(realm, target, key);
        };

        let trap_result = call(
            realm,
            &trap,
            &JsValue::Object(handler),
            &[JsValue::Object(target), key.to_value()],
        )?;
        if !trap_result.is_object() && !trap_result.is_undefined() {
            return Err(trap_error(
                "getOwnPropertyDescriptor",
                "trap returned neither object nor undefined",
            ));
        }
        let target_desc = super::get_own_property(realm, target, key)?;

        if trap_result.is_undefined() {
            let Some(target_desc) = target_desc else {
                return Ok(None);
            };
            if !target_desc.is_configurable() {
                return Err(trap_error(
                    "getOwnPropertyDescriptor",
                    &format!("trap returned undefined for non-configurable property '{}'", key),
                ));
            }
            if !super::is_extensible(realm, target)? {
                return Err(trap_error(
                    "getOwnPropertyDescriptor",
                    &format!("trap returned undefined for '{}' of a non-extensible target", key),
                ));
            }
            return Ok(None);
        }

        let extensible_target = super::is_extensible(realm, target)?;
        let result_desc = to_property_descriptor(realm, &trap_result)?.complete();
        if !is_compatible_property_descriptor(
            realm,
            extensible_target,
            result_desc.clone(),
            target_desc.clone(),
        )? {
            return Err(trap_error(
                "getOwnPropertyDescriptor",
                &format!("trap returned an incompatible descriptor for '{}'", key),
            ));
        }
        if result_desc.configurable == Some(false) {
            match &target_desc {
                Some(desc) if !desc.is_configurable() => {
                    if result_desc.writable == Some(false) && desc.is_writable() {
                        return Err(trap_error(
                            "getOwnPropertyDescriptor",
                            &format!("trap reported non-writable for writable property '{}'", key),
                        ));
                    }
                }
                _ => {
                    return Err(trap_error(
                        "getOwnPropertyDescriptor",
                        &format!("trap reported non-configurability for '{}'", key),
                    ));
                }
            }
        }
        Ok(Some(result_desc))
    }

    fn define_own_property(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> JsResult<bool> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "defineProperty")?;
        let Some(trap) = trap else {
            return super::define_own_property(realm, target, key, desc);
        };

        let desc_obj = from_property_descriptor(realm, Some(&desc))?;
        let result = call(
            realm,
            &trap,
            &JsValue::Object(handler),
            &[JsValue::Object(target), key.to_value(), desc_obj],
        )?;
        if !result.to_boolean() {
            return Ok(false);
        }

        let target_desc = super::get_own_property(realm, target, key)?;
        let extensible_target = super::is_extensible(realm, target)?;
        let setting_config_false = desc.configurable == Some(false);

        let Some(target_desc) = target_desc else {
            if !extensible_target {
                return Err(trap_error(
                    "defineProperty",
                    &format!(
                        "trap returned truish for adding '{}' to a non-extensible target",
                        key,
                    ),
                ));
            }
            if setting_config_false {
                return Err(trap_error(
                    "defineProperty",
                    &format!(
                        "trap returned truish for non-configurable '{}' missing on target",
                        key,
                    ),
                ));
            }
            return Ok(true);
        };

        if !is_compatible_property_descriptor(
            realm,
            extensible_target,
            desc.clone(),
            Some(target_desc.clone()),
        )? {
            return Err(trap_error(
                "defineProperty",
                &format!("trap returned truish for an incompatible descriptor of '{}'", key),
            ));
        }
        if setting_config_false && target_desc.is_configurable() {
            return Err(trap_error(
                "defineProperty",
                &format!("trap reported non-configurability for configurable '{}'", key),
            ));
        }
        if target_desc.is_data_descriptor()
            && !target_desc.is_configurable()
            && target_desc.is_writable()
            && desc.writable == Some(false)
        {
            return Err(trap_error(
                "defineProperty",
                &format!("trap made non-configurable writable '{}' non-writable", key),
            ));
        }
        Ok(true)
    }

    fn has_property(&self, realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "has")?;
        let Some(trap) = trap else {
            return super::has_property(realm, target, key);
        };

        let result = call(
            realm,
            &trap,
            &JsValue::Object(handler),
            &[JsValue::Object(target), key.to_value()],
        )?
        .to_boolean();
        if !result {
            if let Some(target_desc) = super::get_own_property(realm, target, key)? {
                if !target_desc.is_configurable() {
                    return Err(trap_error(
                        "has",
                        &format!("trap returned falsish for non-configurable '{}'", key),
                    ));
                }
                if !super::is_extensible(realm, target)? {
                    return Err(trap_error(
                        "has",
                        &format!("trap returned falsish for '{}' of a non-extensible target", key),
                    ));
                }
            }
        }
        Ok(result)
    }

    fn get(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        receiver: &JsValue,
    ) -> JsResult<JsValue> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "get")?;
        let Some(trap) = trap else {
            return super::get(realm, target, key, receiver);
        };

        let trap_result = call(
            realm,
            &trap,
            &JsValue::Object(handler),
            &[JsValue::Object(target), key.to_value(), receiver.clone()],
        )?;
        if let Some(target_desc) = super::get_own_property(realm, target, key)? {
            if !target_desc.is_configurable() {
                if target_desc.is_data_descriptor()
                    && !target_desc.is_writable()
                    && !same_value(&trap_result, &target_desc.value_or_undefined())
                {
                    return Err(trap_error(
                        "get",
                        &format!(
                            "trap result differs from non-writable, non-configurable '{}'",
                            key,
                        ),
                    ));
                }
                if target_desc.is_accessor_descriptor()
                    && target_desc.getter().is_undefined()
                    && !trap_result.is_undefined()
                {
                    return Err(trap_error(
                        "get",
                        &format!(
                            "'{}' has no getter on the target but the trap returned a value",
                            key,
                        ),
                    ));
                }
            }
        }
        Ok(trap_result)
    }

    fn set(
        &self,
        realm: &mut Realm,
        obj: ObjectId,
        key: &PropertyKey,
        value: JsValue,
        receiver: &JsValue,
    ) -> JsResult<bool> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "set")?;
        let Some(trap) = trap else {
            return super::set(realm, target, key, value, receiver);
        };

        let result = call(
            realm,
            &trap,
            &JsValue::Object(handler),
            &[
                JsValue::Object(target),
                key.to_value(),
                value.clone(),
                receiver.clone(),
            ],
        )?;
        if !result.to_boolean() {
            return Ok(false);
        }
        if let Some(target_desc) = super::get_own_property(realm, target, key)? {
            if !target_desc.is_configurable() {
                if target_desc.is_data_descriptor()
                    && !target_desc.is_writable()
                    && !same_value(&value, &target_desc.value_or_undefined())
                {
                    return Err(trap_error(
                        "set",
                        &format!("trap changed non-writable, non-configurable '{}'", key),
                    ));
                }
                if target_desc.is_accessor_descriptor() && target_desc.setter().is_undefined() {
                    return Err(trap_error(
                        "set",
                        &format!("trap returned truish for '{}' which has no setter", key),
                    ));
                }
            }
        }
        Ok(true)
    }

    fn delete(&self, realm: &mut Realm, obj: ObjectId, key: &PropertyKey) -> JsResult<bool> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "deleteProperty")?;
        let Some(trap) = trap else {
            return super::delete(realm, target, key);
        };

        let result = call(
            realm,
            &trap,
            &JsValue::Object(handler),
            &[JsValue::Object(target), key.to_value()],
        )?;
        if !result.to_boolean() {
            return Ok(false);
        }
        let Some(target_desc) = super::get_own_property(realm, target, key)? else {
            return Ok(true);
        };
        if !target_desc.is_configurable() {
            return Err(trap_error(
                "deleteProperty",
                &format!("trap returned truish for non-configurable '{}'", key),
            ));
        }
        if !super::is_extensible(realm, target)? {
            return Err(trap_error(
                "deleteProperty",
                &format!("trap returned truish for '{}' of a non-extensible target", key),
            ));
        }
        Ok(true)
    }

    fn own_property_keys(&self, realm: &mut Realm, obj: ObjectId) -> JsResult<Vec<PropertyKey>> {
        let TrapLookup {
            target,
            handler,
            trap,
        } = lookup_trap(realm, obj, "ownKeys")?;
        let Some(trap) = trap else {
            return super::own_property_keys(realm, target);
        };

        let trap_result_array =
            call(realm, &trap, &JsValue::Object(handler), &[JsValue::Object(target)])?;
        let values = create_list_from_array_like(
            realm,
            &trap_result_array,
            ListElementTypes::PropertyKeys,
        )?;
        let mut trap_result: Vec<PropertyKey> = Vec::with_capacity(values.len());
        for value in values {
            let key = match value {
                JsValue::String(s) => PropertyKey::from(s),
                JsValue::Symbol(s) => PropertyKey::Symbol(s),
                _ => return Err(trap_error("ownKeys", "trap result contains a non-key")),
            };
            if trap_result.contains(&key) {
                return Err(trap_error(
                    "ownKeys",
                    &format!("trap returned duplicate entries ('{}')", key),
                ));
            }
            trap_result.push(key);
        }

        let extensible_target = super::is_extensible(realm, target)?;
        let target_keys = super::own_property_keys(realm, target)?;
        let mut configurable_keys = Vec::new();
        let mut non_configurable_keys = Vec::new();
        for key in target_keys {
            match super::get_own_property(realm, target, &key)? {
                Some(desc) if !desc.is_configurable() => non_configurable_keys.push(key),
                _ => configurable_keys.push(key),
            }
        }
        if extensible_target && non_configurable_keys.is_empty() {
            return Ok(trap_result);
        }

        let mut unchecked: Vec<Option<&PropertyKey>> = trap_result.iter().map(Some).collect();
        let mut consume = |key: &PropertyKey| -> bool {
            match unchecked.iter_mut().find(|k| **k == Some(key)) {
                Some(slot) => {
                    *slot = None;
                    true
                }
                None => false,
            }
        };
        for key in &non_configurable_keys {
            if !consume(key) {
                return Err(trap_error(
                    "ownKeys",
                    &format!("trap result did not include non-configurable '{}'", key),
                ));
            }
        }
        if extensible_target {
            return Ok(trap_result.clone());
        }
        for key in &configurable_keys {
            if !consume(key) {
                return Err(trap_error(
                    "ownKeys",
                    &format!("trap result did not include '{}' of a non-extensible target", key),
                ));
            }
        }
        if unchecked.iter().any(Option::is_some) {
            return Err(trap_error(
                "ownKeys",
                "trap returned extra keys but the proxy target is non-extensible",
            ));
        }
        Ok(trap_result.clone())
    }
}

/// `[[Call]]` of a proxy whose target was callable
pub fn proxy_call(
    realm: &mut Realm,
    proxy: ObjectId,
    this: &JsValue,
    args: &[JsValue],
) -> JsResult<JsValue> {
    let TrapLookup {
        target,
        handler,
        trap,
    } = lookup_trap(realm, proxy, "apply")?;
    let Some(trap) = trap else {
        return call(realm, &JsValue::Object(target), this, args);
    };
    let arg_array = create_array_from_list(realm, args)?;
    call(
        realm,
        &trap,
        &JsValue::Object(handler),
        &[JsValue::Object(target), this.clone(), JsValue::Object(arg_array)],
    )
}

/// `[[Construct]]` of a proxy whose target was a constructor
pub fn proxy_construct(
    realm: &mut Realm,
    proxy: ObjectId,
    args: &[JsValue],
    new_target: ObjectId,
) -> JsResult<ObjectId> {
    let TrapLookup {
        target,
        handler,
        trap,
    } = lookup_trap(realm, proxy, "construct")?;
    let Some(trap) = trap else {
        return construct(realm, target, args, Some(new_target));
    };
    let arg_array = create_array_from_list(realm, args)?;
    let result = call(
        realm,
        &trap,
        &JsValue::Object(handler),
        &[
            JsValue::Object(target),
            JsValue::Object(arg_array),
            JsValue::Object(new_target),
        ],
    )?;
    match result {
        JsValue::Object(obj) => Ok(obj),
        _ => Err(trap_error("construct", "trap returned non-object")),
    }
}

/// `ProxyCreate(target, handler)`
pub fn proxy_create(realm: &mut Realm, target: &JsValue, handler: &JsValue) -> JsResult<ObjectId> {
    let JsValue::Object(target_obj) = target else {
        return Err(JsError::type_error(
            "Cannot create proxy with a non-object as target or handler",
        ));
    };
    let JsValue::Object(handler_obj) = handler else {
        return Err(JsError::type_error(
            "Cannot create proxy with a non-object as target or handler",
        ));
    };
    let data = ProxyData {
        target: Some(*target_obj),
        handler: Some(*handler_obj),
        callable: is_callable(realm, target),
        constructor: is_constructor(realm, target),
    };
    Ok(super::make_object(realm, None, ObjectKind::Proxy(data)))
}

/// Clear target and handler. Revoking twice is a no-op.
pub fn proxy_revoke(realm: &mut Realm, proxy: ObjectId) -> JsResult<()> {
    if let ObjectKind::Proxy(data) = &mut realm.heap.get_mut(proxy)?.kind {
        data.target = None;
        data.handler = None;
    }
    Ok(())
}

/// True if `obj` is a proxy that has been revoked
pub fn is_revoked_proxy(realm: &Realm, obj: ObjectId) -> JsResult<bool> {
    Ok(match &realm.heap.get(obj)?.kind {
        ObjectKind::Proxy(data) => data.is_revoked(),
        _ => false,
    })
}

/// The proxy's target, or a TypeError if it has been revoked
pub fn proxy_target(realm: &Realm, proxy: ObjectId) -> JsResult<Option<ObjectId>> {
    match &realm.heap.get(proxy)?.kind {
        ObjectKind::Proxy(data) => match data.target {
            Some(target) => Ok(Some(target)),
            None => Err(JsError::type_error(
                "Cannot perform operation on a proxy that has been revoked",
            )),
        },
        _ => Ok(None),
    }
}
