//! Property descriptors and ordered property storage

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::value::{CheapClone, JsValue, PropertyKey};

/// Property descriptor with independently present fields
///
/// Whether a descriptor is a data, accessor or generic descriptor is derived from
/// which fields are present. A descriptor must never carry both a data field
/// (`value`/`writable`) and an accessor field (`get`/`set`); `is_valid` checks this.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    /// Getter: `Undefined` or a callable object
    pub get: Option<JsValue>,
    /// Setter: `Undefined` or a callable object
    pub set: Option<JsValue>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Fully populated data descriptor
    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            get: None,
            set: None,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// Writable, enumerable, configurable data property (what assignment creates)
    pub fn data_default(value: JsValue) -> Self {
        Self::data(value, true, true, true)
    }

    /// Attributes used for built-in methods: writable, non-enumerable, configurable
    pub fn builtin(value: JsValue) -> Self {
        Self::data(value, true, false, true)
    }

    /// Non-writable, non-enumerable, non-configurable data property
    pub fn frozen(value: JsValue) -> Self {
        Self::data(value, false, false, false)
    }

    /// Fully populated accessor descriptor
    pub fn accessor(get: JsValue, set: JsValue, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: None,
            writable: None,
            get: Some(get),
            set: Some(set),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    pub fn with_value(mut self, value: JsValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn with_get(mut self, get: JsValue) -> Self {
        self.get = Some(get);
        self
    }

    pub fn with_set(mut self, set: JsValue) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// `IsDataDescriptor`
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// `IsAccessorDescriptor`
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// `IsGenericDescriptor`
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// True if any field is present
    pub fn has_fields(&self) -> bool {
        self.value.is_some()
            || self.writable.is_some()
            || self.get.is_some()
            || self.set.is_some()
            || self.enumerable.is_some()
            || self.configurable.is_some()
    }

    /// A descriptor may not mix data and accessor fields
    pub fn is_valid(&self) -> bool {
        !(self.is_data_descriptor() && self.is_accessor_descriptor())
    }

    pub fn is_fully_populated(&self) -> bool {
        let kind_complete = if self.is_accessor_descriptor() {
            self.get.is_some() && self.set.is_some()
        } else {
            self.value.is_some() && self.writable.is_some()
        };
        kind_complete && self.enumerable.is_some() && self.configurable.is_some()
    }

    /// `CompletePropertyDescriptor`: fill absent fields with their defaults
    pub fn complete(mut self) -> Self {
        if self.is_generic_descriptor() || self.is_data_descriptor() {
            self.value.get_or_insert(JsValue::Undefined);
            self.writable.get_or_insert(false);
        } else {
            self.get.get_or_insert(JsValue::Undefined);
            self.set.get_or_insert(JsValue::Undefined);
        }
        self.enumerable.get_or_insert(false);
        self.configurable.get_or_insert(false);
        self
    }

    pub fn is_configurable(&self) -> bool {
        self.configurable.unwrap_or(false)
    }

    pub fn is_enumerable(&self) -> bool {
        self.enumerable.unwrap_or(false)
    }

    pub fn is_writable(&self) -> bool {
        self.writable.unwrap_or(false)
    }

    pub fn value_or_undefined(&self) -> JsValue {
        self.value.clone().unwrap_or_default()
    }

    pub fn getter(&self) -> JsValue {
        self.get.clone().unwrap_or_default()
    }

    pub fn setter(&self) -> JsValue {
        self.set.clone().unwrap_or_default()
    }
}

/// Own-property storage of an object
///
/// Iteration order is the one `[[OwnPropertyKeys]]` must report: array indices in
/// ascending numeric order, then string keys in insertion order, then symbol keys
/// in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    indexed: BTreeMap<u32, PropertyDescriptor>,
    named: IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.indexed.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.named.is_empty()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        match key {
            PropertyKey::Index(i) => self.indexed.get(i),
            _ => self.named.get(key),
        }
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyDescriptor> {
        match key {
            PropertyKey::Index(i) => self.indexed.get_mut(i),
            _ => self.named.get_mut(key),
        }
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        match key {
            PropertyKey::Index(i) => self.indexed.contains_key(i),
            _ => self.named.contains_key(key),
        }
    }

    /// Insert or replace. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: PropertyKey, desc: PropertyDescriptor) {
        match key {
            PropertyKey::Index(i) => {
                self.indexed.insert(i, desc);
            }
            _ => {
                self.named.insert(key, desc);
            }
        }
    }

    /// Remove a key, preserving the order of the remaining keys
    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        match key {
            PropertyKey::Index(i) => self.indexed.remove(i),
            _ => self.named.shift_remove(key),
        }
    }

    /// Keys in `[[OwnPropertyKeys]]` order
    pub fn keys(&self) -> Vec<PropertyKey> {
        let mut keys = Vec::with_capacity(self.len());
        keys.extend(self.indexed.keys().map(|i| PropertyKey::Index(*i)));
        keys.extend(self.named.keys().filter(|k| !k.is_symbol()).cloned());
        keys.extend(self.named.keys().filter(|k| k.is_symbol()).cloned());
        keys
    }

    /// Array indices greater than or equal to `start`, in descending order
    pub fn indices_from_descending(&self, start: u32) -> Vec<u32> {
        self.indexed.range(start..).rev().map(|(i, _)| *i).collect()
    }

    /// Iterate over `(key, descriptor)` pairs in `[[OwnPropertyKeys]]` order
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &PropertyDescriptor)> + '_ {
        let indexed = self
            .indexed
            .iter()
            .map(|(i, d)| (PropertyKey::Index(*i), d));
        let strings = self
            .named
            .iter()
            .filter(|(k, _)| !k.is_symbol())
            .map(|(k, d)| (k.cheap_clone(), d));
        let symbols = self
            .named
            .iter()
            .filter(|(k, _)| k.is_symbol())
            .map(|(k, d)| (k.cheap_clone(), d));
        indexed.chain(strings).chain(symbols)
    }

    pub fn clear(&mut self) {
        self.indexed.clear();
        self.named.clear();
    }
}
