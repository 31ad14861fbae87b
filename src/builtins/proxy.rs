//! Proxy constructor and Proxy.revocable

use super::{arg, plain_object, register_method};
use crate::error::{JsError, JsResult};
use crate::function::{FunctionData, create_builtin_function, create_internal_function};
use crate::object::proxy::proxy_create;
use crate::operations::create_data_property_or_throw;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

/// Initialize the Proxy constructor. It has no `prototype` property.
pub fn init_proxy(realm: &mut Realm) -> JsResult<()> {
    let ctor = create_builtin_function(realm, proxy_constructor, 2, "Proxy", true)?;
    register_method(realm, ctor, "revocable", proxy_revocable, 2)?;
    realm.intrinsics.proxy = ctor;
    Ok(())
}

/// new Proxy(target, handler)
fn proxy_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    if nt.is_none() {
        return Err(JsError::type_error("Constructor Proxy requires 'new'"));
    }
    Ok(JsValue::Object(proxy_create(realm, &arg(args, 0), &arg(args, 1))?))
}

/// Proxy.revocable(target, handler)
fn proxy_revocable(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let proxy = proxy_create(realm, &arg(args, 0), &arg(args, 1))?;
    let revoke = create_internal_function(
        realm,
        FunctionData::ProxyRevoke { proxy: Some(proxy) },
        0,
    )?;
    let result = plain_object(realm);
    create_data_property_or_throw(
        realm,
        result,
        &PropertyKey::from("proxy"),
        JsValue::Object(proxy),
    )?;
    create_data_property_or_throw(
        realm,
        result,
        &PropertyKey::from("revoke"),
        JsValue::Object(revoke),
    )?;
    Ok(JsValue::Object(result))
}
