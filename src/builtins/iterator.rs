//! %IteratorPrototype%

use super::register_method;
use crate::error::JsResult;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, WellKnownSymbol};

pub fn init_iterator_prototype(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.iterator_prototype;
    register_method(realm, proto, WellKnownSymbol::Iterator, iterator_self, 0)?;
    Ok(())
}

/// %IteratorPrototype%[@@iterator]()
fn iterator_self(
    _realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(this.clone())
}
