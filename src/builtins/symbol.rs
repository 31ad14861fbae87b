//! Symbol constructor, Symbol.prototype and the well-known symbols

use super::{arg, create_constructor, define_constant, register_getter, register_method};
use crate::error::{JsError, JsResult};
use crate::function::create_builtin_function;
use crate::object::ObjectKind;
use crate::operations::{define_property_or_throw, to_string};
use crate::property::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{JsSymbol, JsValue, ObjectId, WellKnownSymbol};

/// Initialize Symbol.prototype, the Symbol constructor and its well-known symbol properties
pub fn init_symbol(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.symbol_prototype;
    register_getter(realm, proto, "description", symbol_description)?;
    register_method(realm, proto, "toString", symbol_to_string, 0)?;
    register_method(realm, proto, "valueOf", symbol_value_of, 0)?;
    super::array::define_to_string_tag(realm, proto, "Symbol")?;

    // Symbol.prototype[@@toPrimitive] is configurable but not writable
    let to_primitive = create_builtin_function(
        realm,
        symbol_to_primitive,
        1,
        WellKnownSymbol::ToPrimitive,
        false,
    )?;
    define_property_or_throw(
        realm,
        proto,
        &WellKnownSymbol::ToPrimitive.key(),
        PropertyDescriptor::data(JsValue::Object(to_primitive), false, false, true),
    )?;

    let ctor = create_constructor(realm, symbol_constructor, 0, "Symbol", proto)?;
    realm.intrinsics.symbol = ctor;
    register_method(realm, ctor, "for", symbol_for, 1)?;
    register_method(realm, ctor, "keyFor", symbol_key_for, 1)?;
    for wk in WellKnownSymbol::ALL {
        define_constant(realm, ctor, wk.name(), JsValue::Symbol(wk.symbol()))?;
    }
    Ok(())
}

/// `get [Symbol.species]` returning `this`, installed on constructors that honour species
pub(crate) fn register_species_getter(realm: &mut Realm, ctor: ObjectId) -> JsResult<()> {
    register_getter(realm, ctor, WellKnownSymbol::Species, species_getter)
}

fn species_getter(
    _realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(this.clone())
}

/// Symbol(description)
fn symbol_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    if nt.is_some() {
        return Err(JsError::type_error("Symbol is not a constructor"));
    }
    let description = match arg(args, 0) {
        JsValue::Undefined => None,
        value => Some(to_string(realm, &value)?),
    };
    Ok(JsValue::Symbol(realm.new_symbol(description)))
}

/// Symbol.for(key)
fn symbol_for(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let key = to_string(realm, &arg(args, 0))?;
    Ok(JsValue::Symbol(realm.symbol_for(key)))
}

/// Symbol.keyFor(sym)
fn symbol_key_for(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let JsValue::Symbol(sym) = arg(args, 0) else {
        return Err(JsError::type_error("Symbol.keyFor requires a symbol"));
    };
    Ok(realm.key_for(&sym).map_or(JsValue::Undefined, JsValue::String))
}

/// `thisSymbolValue(value)`
fn this_symbol_value(realm: &Realm, this: &JsValue) -> JsResult<JsSymbol> {
    match this {
        JsValue::Symbol(sym) => return Ok(sym.clone()),
        JsValue::Object(obj) => {
            if let ObjectKind::Symbol(sym) = &realm.heap.get(*obj)?.kind {
                return Ok(sym.clone());
            }
        }
        _ => {}
    }
    Err(JsError::type_error("Symbol.prototype method called on an incompatible receiver"))
}

fn symbol_description(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let sym = this_symbol_value(realm, this)?;
    Ok(sym.description().cloned().map_or(JsValue::Undefined, JsValue::String))
}

fn symbol_to_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::String(this_symbol_value(realm, this)?.descriptive_string()))
}

fn symbol_value_of(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Symbol(this_symbol_value(realm, this)?))
}

fn symbol_to_primitive(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Symbol(this_symbol_value(realm, this)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::function::{call, construct};
    use crate::host::HostConfig;
    use crate::operations::{get, get_v, to_object};
    use crate::value::{JsString, PropertyKey};

    #[test]
    fn test_symbol_is_not_constructible() {
        let mut realm = Realm::create(HostConfig::default());
        let symbol = realm.intrinsics.symbol;
        assert!(construct(&mut realm, symbol, &[], None).unwrap_err().is_type_error());
        let sym = call(
            &mut realm,
            &JsValue::Object(symbol),
            &JsValue::Undefined,
            &[JsValue::from("x")],
        )
        .unwrap();
        assert!(sym.is_symbol());
        let desc = get_v(&mut realm, &sym, &PropertyKey::from("description")).unwrap();
        assert_eq!(desc, JsValue::from("x"));
    }

    #[test]
    fn test_registry_round_trip() {
        let mut realm = Realm::create(HostConfig::default());
        let symbol = JsValue::Object(realm.intrinsics.symbol);
        let a = crate::operations::invoke(
            &mut realm,
            &symbol,
            &PropertyKey::from("for"),
            &[JsValue::from("app")],
        )
        .unwrap();
        let b = crate::operations::invoke(
            &mut realm,
            &symbol,
            &PropertyKey::from("for"),
            &[JsValue::from("app")],
        )
        .unwrap();
        assert_eq!(a, b);
        let key = crate::operations::invoke(&mut realm, &symbol, &PropertyKey::from("keyFor"), &[a])
            .unwrap();
        assert_eq!(key, JsValue::from("app"));
        let unique = JsValue::Symbol(realm.new_symbol(Some(JsString::from("app"))));
        let key = crate::operations::invoke(
            &mut realm,
            &symbol,
            &PropertyKey::from("keyFor"),
            &[unique],
        )
        .unwrap();
        assert_eq!(key, JsValue::Undefined);
    }

    #[test]
    fn test_well_known_symbols_are_frozen_properties() {
        let mut realm = Realm::create(HostConfig::default());
        let symbol = realm.intrinsics.symbol;
        let iterator = get(&mut realm, symbol, &PropertyKey::from("iterator")).unwrap();
        assert_eq!(iterator, JsValue::Symbol(WellKnownSymbol::Iterator.symbol()));
        let wrapper = to_object(&mut realm, &iterator).unwrap();
        let text = crate::operations::invoke(
            &mut realm,
            &JsValue::Object(wrapper),
            &PropertyKey::from("toString"),
            &[],
        )
        .unwrap();
        assert_eq!(text, JsValue::from("Symbol(Symbol.iterator)"));
    }
}
