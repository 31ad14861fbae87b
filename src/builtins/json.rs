//! JSON.parse and JSON.stringify
//!
//! Parsing is delegated to serde_json (with `preserve_order`, so member order is
//! source order) and the resulting tree is turned into fresh objects and arrays.
//! Serialization walks the object graph itself, since it has to observe getters,
//! proxies, `toJSON` and the replacer in the right order.

use super::array::define_to_string_tag;
use super::{arg, plain_object, register_method};
use crate::error::{JsError, JsResult};
use crate::function::{call, is_callable};
use crate::object::{self, ObjectKind};
use crate::operations::{
    EnumerableKind, create_array_from_list, create_data_property, create_data_property_or_throw,
    enumerable_own_properties, get, get_v, index_key, integer_or_infinity, is_array,
    length_of_array_like, number_to_string, to_number, to_property_key, to_string,
};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey};

pub fn init_json(realm: &mut Realm) -> JsResult<()> {
    let json = plain_object(realm);
    register_method(realm, json, "parse", json_parse, 2)?;
    register_method(realm, json, "stringify", json_stringify, 3)?;
    define_to_string_tag(realm, json, "JSON")?;
    realm.intrinsics.json = json;
    Ok(())
}

// =============================================================================
// JSON.parse
// =============================================================================

/// JSON.parse(text, reviver)
fn json_parse(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let text = to_string(realm, &arg(args, 0))?;
    let tree: serde_json::Value = serde_json::from_str(text.as_str())
        .map_err(|e| JsError::syntax_error(format!("JSON.parse: {}", e)))?;
    let unfiltered = json_to_value(realm, &tree)?;

    let reviver = arg(args, 1);
    if !is_callable(realm, &reviver) {
        return Ok(unfiltered);
    }
    let root = plain_object(realm);
    let empty = PropertyKey::from("");
    create_data_property_or_throw(realm, root, &empty, unfiltered)?;
    internalize_json_property(realm, root, &empty, &reviver)
}

/// Build a value from a parsed JSON tree
pub fn json_to_value(realm: &mut Realm, json: &serde_json::Value) -> JsResult<JsValue> {
    Ok(match json {
        serde_json::Value::Null => JsValue::Null,
        serde_json::Value::Bool(b) => JsValue::Boolean(*b),
        serde_json::Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => JsValue::from(s.as_str()),
        serde_json::Value::Array(items) => {
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                elements.push(json_to_value(realm, item)?);
            }
            JsValue::Object(create_array_from_list(realm, &elements)?)
        }
        serde_json::Value::Object(map) => {
            let obj = plain_object(realm);
            for (key, value) in map {
                let value = json_to_value(realm, value)?;
                create_data_property_or_throw(realm, obj, &PropertyKey::from(key.as_str()), value)?;
            }
            JsValue::Object(obj)
        }
    })
}

/// `InternalizeJSONProperty(holder, name, reviver)`
fn internalize_json_property(
    realm: &mut Realm,
    holder: ObjectId,
    name: &PropertyKey,
    reviver: &JsValue,
) -> JsResult<JsValue> {
    let val = get(realm, holder, name)?;
    if let JsValue::Object(obj) = val {
        let keys = if is_array(realm, &val)? {
            let len = length_of_array_like(realm, obj)?;
            (0..len).map(index_key).collect::<Vec<_>>()
        } else {
            let mut keys = Vec::new();
            for key in enumerable_own_properties(realm, obj, EnumerableKind::Keys)? {
                keys.push(to_property_key(realm, &key)?);
            }
            keys
        };
        for key in keys {
            let element = internalize_json_property(realm, obj, &key, reviver)?;
            if element.is_undefined() {
                object::delete(realm, obj, &key)?;
            } else {
                create_data_property(realm, obj, &key, element)?;
            }
        }
    }
    call(realm, reviver, &JsValue::Object(holder), &[name.to_value(), val])
}

// =============================================================================
// JSON.stringify
// =============================================================================

/// JSON.stringify(value, replacer, space)
fn json_stringify(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let mut state = SerializerState::new(realm, &arg(args, 1), &arg(args, 2))?;
    let wrapper = plain_object(realm);
    let empty = PropertyKey::from("");
    create_data_property_or_throw(realm, wrapper, &empty, arg(args, 0))?;
    Ok(match state.serialize_property(realm, &empty, wrapper)? {
        Some(text) => JsValue::from(text),
        None => JsValue::Undefined,
    })
}

/// `JSON Serialization Record`
struct SerializerState {
    replacer: Option<JsValue>,
    property_list: Option<Vec<PropertyKey>>,
    stack: Vec<ObjectId>,
    indent: String,
    gap: String,
}

impl SerializerState {
    fn new(realm: &mut Realm, replacer: &JsValue, space: &JsValue) -> JsResult<Self> {
        let mut state = SerializerState {
            replacer: None,
            property_list: None,
            stack: Vec::new(),
            indent: String::new(),
            gap: gap_from_space(realm, space)?,
        };
        if let JsValue::Object(obj) = replacer {
            if is_callable(realm, replacer) {
                state.replacer = Some(replacer.clone());
            } else if is_array(realm, replacer)? {
                state.property_list = Some(property_list_from_array(realm, *obj)?);
            }
        }
        Ok(state)
    }

    /// `SerializeJSONProperty(state, key, holder)`
    fn serialize_property(
        &mut self,
        realm: &mut Realm,
        key: &PropertyKey,
        holder: ObjectId,
    ) -> JsResult<Option<String>> {
        let mut value = get(realm, holder, key)?;
        if value.is_object() {
            let to_json = get_v(realm, &value, &PropertyKey::from("toJSON"))?;
            if is_callable(realm, &to_json) {
                value = call(realm, &to_json, &value, &[key.to_value()])?;
            }
        }
        if let Some(replacer) = &self.replacer {
            value = call(realm, replacer, &JsValue::Object(holder), &[key.to_value(), value])?;
        }
        if let JsValue::Object(obj) = value {
            value = match &realm.heap.get(obj)?.kind {
                ObjectKind::Number(_) => JsValue::Number(to_number(realm, &value)?),
                ObjectKind::String(_) => JsValue::String(to_string(realm, &value)?),
                ObjectKind::Boolean(b) => JsValue::Boolean(*b),
                _ => value,
            };
        }
        Ok(match &value {
            JsValue::Null => Some("null".to_string()),
            JsValue::Boolean(true) => Some("true".to_string()),
            JsValue::Boolean(false) => Some("false".to_string()),
            JsValue::String(s) => Some(quote_json_string(s)?),
            JsValue::Number(n) if n.is_finite() => Some(number_to_string(*n)),
            JsValue::Number(_) => Some("null".to_string()),
            JsValue::Object(obj) if !is_callable(realm, &value) => {
                if is_array(realm, &value)? {
                    Some(self.serialize_array(realm, *obj)?)
                } else {
                    Some(self.serialize_object(realm, *obj)?)
                }
            }
            _ => None,
        })
    }

    fn enter(&mut self, obj: ObjectId) -> JsResult<String> {
        if self.stack.contains(&obj) {
            return Err(JsError::type_error("Converting circular structure to JSON"));
        }
        self.stack.push(obj);
        let stepback = self.indent.clone();
        self.indent.push_str(&self.gap);
        Ok(stepback)
    }

    fn leave(&mut self, stepback: String) {
        self.stack.pop();
        self.indent = stepback;
    }

    /// Join members between `open` and `close`, one per line when a gap is set
    fn wrap(&self, partial: &[String], open: char, close: char, stepback: &str) -> String {
        if partial.is_empty() {
            return format!("{}{}", open, close);
        }
        if self.gap.is_empty() {
            return format!("{}{}{}", open, partial.join(","), close);
        }
        let separator = format!(",\n{}", self.indent);
        format!("{}\n{}{}\n{}{}", open, self.indent, partial.join(&separator), stepback, close)
    }

    /// `SerializeJSONObject(state, value)`
    fn serialize_object(&mut self, realm: &mut Realm, obj: ObjectId) -> JsResult<String> {
        let stepback = self.enter(obj)?;
        let keys = match &self.property_list {
            Some(list) => list.clone(),
            None => {
                let mut keys = Vec::new();
                for key in enumerable_own_properties(realm, obj, EnumerableKind::Keys)? {
                    keys.push(to_property_key(realm, &key)?);
                }
                keys
            }
        };
        let mut partial = Vec::new();
        for key in keys {
            if let Some(text) = self.serialize_property(realm, &key, obj)? {
                let colon = if self.gap.is_empty() { ":" } else { ": " };
                partial.push(format!(
                    "{}{}{}",
                    quote_json_string(&key.to_js_string())?,
                    colon,
                    text,
                ));
            }
        }
        let result = self.wrap(&partial, '{', '}', &stepback);
        self.leave(stepback);
        Ok(result)
    }

    /// `SerializeJSONArray(state, value)`
    fn serialize_array(&mut self, realm: &mut Realm, obj: ObjectId) -> JsResult<String> {
        let stepback = self.enter(obj)?;
        let len = length_of_array_like(realm, obj)?;
        let mut partial = Vec::new();
        for index in 0..len {
            let text = self.serialize_property(realm, &index_key(index), obj)?;
            partial.push(text.unwrap_or_else(|| "null".to_string()));
        }
        let result = self.wrap(&partial, '[', ']', &stepback);
        self.leave(stepback);
        Ok(result)
    }
}

/// Gap string from the `space` argument: up to ten spaces or code units
fn gap_from_space(realm: &mut Realm, space: &JsValue) -> JsResult<String> {
    let mut space = space.clone();
    if let JsValue::Object(obj) = space {
        space = match realm.heap.get(obj)?.kind {
            ObjectKind::Number(_) => JsValue::Number(to_number(realm, &space)?),
            ObjectKind::String(_) => JsValue::String(to_string(realm, &space)?),
            _ => space,
        };
    }
    Ok(match &space {
        JsValue::Number(n) => {
            let count = integer_or_infinity(*n).clamp(0.0, 10.0) as usize;
            " ".repeat(count)
        }
        JsValue::String(s) => {
            let units = s.to_utf16();
            let units = units.get(..units.len().min(10)).unwrap_or_default();
            String::from_utf16_lossy(units)
        }
        _ => String::new(),
    })
}

/// Keys named by an array replacer, deduplicated in order
fn property_list_from_array(realm: &mut Realm, array: ObjectId) -> JsResult<Vec<PropertyKey>> {
    let len = length_of_array_like(realm, array)?;
    let mut list: Vec<PropertyKey> = Vec::new();
    for index in 0..len {
        let value = get(realm, array, &index_key(index))?;
        let item = match &value {
            JsValue::String(s) => Some(s.clone()),
            JsValue::Number(_) => Some(to_string(realm, &value)?),
            JsValue::Object(obj) => match realm.heap.get(*obj)?.kind {
                ObjectKind::String(_) | ObjectKind::Number(_) => Some(to_string(realm, &value)?),
                _ => None,
            },
            _ => None,
        };
        if let Some(item) = item {
            let key = PropertyKey::from(item);
            if !list.contains(&key) {
                list.push(key);
            }
        }
    }
    Ok(list)
}

/// `QuoteJSONString(value)`
fn quote_json_string(s: &JsString) -> JsResult<String> {
    serde_json::to_string(s.as_str())
        .map_err(|e| JsError::internal(format!("string quoting failed: {}", e)))
}
