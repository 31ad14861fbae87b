//! Module namespace exotic objects over host-defined modules

use super::{create_test_realm, prop};
use jsrealm::module::{SyntheticModule, get_module_namespace};
use jsrealm::object;
use jsrealm::operations::{get, set};
use jsrealm::{JsValue, PropertyDescriptor, PropertyKey, WellKnownSymbol};

#[test]
fn test_exports_are_sorted_and_live() {
    let mut realm = create_test_realm();
    let module = SyntheticModule::create(&mut realm, &["zeta", "alpha"]).unwrap();
    let ns = get_module_namespace(&mut realm, &module.as_record()).unwrap();

    let keys: Vec<JsValue> = object::own_property_keys(&mut realm, ns)
        .unwrap()
        .iter()
        .map(|k| k.to_value())
        .collect();
    assert_eq!(
        keys,
        vec![
            JsValue::from("alpha"),
            JsValue::from("zeta"),
            JsValue::Symbol(WellKnownSymbol::ToStringTag.symbol()),
        ]
    );

    assert_eq!(prop(&mut realm, ns, "alpha"), JsValue::Undefined);
    module.set_export(&mut realm, "alpha", JsValue::Number(1.0)).unwrap();
    assert_eq!(prop(&mut realm, ns, "alpha"), JsValue::Number(1.0));
    assert_eq!(prop(&mut realm, ns, "missing"), JsValue::Undefined);
}

#[test]
fn test_namespace_is_cached_per_module() {
    let mut realm = create_test_realm();
    let module = SyntheticModule::create(&mut realm, &["x"]).unwrap();
    let first = get_module_namespace(&mut realm, &module.as_record()).unwrap();
    let second = get_module_namespace(&mut realm, &module.as_record()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_namespace_is_immutable() {
    let mut realm = create_test_realm();
    let module = SyntheticModule::create(&mut realm, &["x"]).unwrap();
    let ns = get_module_namespace(&mut realm, &module.as_record()).unwrap();
    let key = PropertyKey::from("x");

    assert!(!object::is_extensible(&mut realm, ns).unwrap());
    assert!(object::prevent_extensions(&mut realm, ns).unwrap());
    assert_eq!(object::get_prototype_of(&mut realm, ns).unwrap(), None);
    assert!(object::set_prototype_of(&mut realm, ns, None).unwrap());
    let object_prototype = Some(realm.intrinsics.object_prototype);
    assert!(!object::set_prototype_of(&mut realm, ns, object_prototype).unwrap());

    assert!(!object::delete(&mut realm, ns, &key).unwrap());
    assert!(
        !object::define_own_property(
            &mut realm,
            ns,
            &key,
            PropertyDescriptor::data_default(JsValue::Null),
        )
        .unwrap(),
    );
    let err = set(&mut realm, ns, &key, JsValue::Number(1.0), true).unwrap_err();
    assert!(err.is_type_error());

    let desc = object::get_own_property(&mut realm, ns, &key).unwrap().unwrap();
    assert_eq!(desc.writable, Some(true));
    assert_eq!(desc.enumerable, Some(true));
    assert_eq!(desc.configurable, Some(false));
}

#[test]
fn test_to_string_tag_is_module() {
    let mut realm = create_test_realm();
    let module = SyntheticModule::create(&mut realm, &[]).unwrap();
    let ns = get_module_namespace(&mut realm, &module.as_record()).unwrap();
    let tag = get(&mut realm, ns, &WellKnownSymbol::ToStringTag.key()).unwrap();
    assert_eq!(tag, JsValue::from("Module"));
}

#[test]
fn test_read_after_environment_is_gone() {
    let mut realm = create_test_realm();
    let module = SyntheticModule::create(&mut realm, &["x"]).unwrap();
    let ns = get_module_namespace(&mut realm, &module.as_record()).unwrap();
    module.detach_environment();
    let err = get(&mut realm, ns, &PropertyKey::from("x")).unwrap_err();
    assert!(err.is_reference_error());
}

#[test]
fn test_unknown_export_cannot_be_set() {
    let mut realm = create_test_realm();
    let module = SyntheticModule::create(&mut realm, &["x"]).unwrap();
    let err = module.set_export(&mut realm, "y", JsValue::Null).unwrap_err();
    assert!(err.is_reference_error());
}
