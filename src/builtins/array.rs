//! Array constructor, Array.prototype and %ArrayIteratorPrototype%

use std::cmp::Ordering;

use super::{arg, create_constructor, define_builtin, register_method};
use crate::error::{JsError, JsResult};
use crate::function::{call, construct, get_prototype_from_constructor, is_callable, is_constructor};
use crate::object::array::array_create;
use crate::object::{self, ObjectKind};
use crate::operations::{
    create_array_from_list, create_data_property_or_throw, create_iter_result_object,
    delete_property_or_throw, get, get_iterator_from_method, get_method, has_property, index_key,
    is_array, is_strictly_equal, iterator_close, iterator_step_value, join_values,
    length_of_array_like, same_value_zero, set, to_integer_or_infinity, to_number, to_object,
    to_string, to_uint32,
};
use crate::operations::object::object_to_string_tag;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// Largest length an array-like may reach through `push`/`unshift`/`concat`
const MAX_SAFE_LENGTH: u64 = (1 << 53) - 1;

/// What an array iterator produces per step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayIterationKind {
    Keys,
    Values,
    Entries,
}

/// Internal slots of an array iterator
#[derive(Debug, Clone)]
pub struct ArrayIteratorData {
    /// `[[IteratedArrayLike]]`; `None` once exhausted
    pub iterated: Option<ObjectId>,
    pub next_index: u64,
    pub kind: ArrayIterationKind,
}

/// Initialize Array.prototype, the Array constructor and %ArrayIteratorPrototype%
pub fn init_array(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.array_prototype;

    // Mutating methods
    register_method(realm, proto, "push", array_push, 1)?;
    register_method(realm, proto, "pop", array_pop, 0)?;
    register_method(realm, proto, "shift", array_shift, 0)?;
    register_method(realm, proto, "unshift", array_unshift, 1)?;
    register_method(realm, proto, "splice", array_splice, 2)?;
    register_method(realm, proto, "reverse", array_reverse, 0)?;
    register_method(realm, proto, "sort", array_sort, 1)?;
    register_method(realm, proto, "fill", array_fill, 1)?;

    // Accessor methods
    register_method(realm, proto, "at", array_at, 1)?;
    register_method(realm, proto, "concat", array_concat, 1)?;
    register_method(realm, proto, "slice", array_slice, 2)?;
    register_method(realm, proto, "join", array_join, 1)?;
    register_method(realm, proto, "toString", array_to_string, 0)?;
    register_method(realm, proto, "indexOf", array_index_of, 1)?;
    register_method(realm, proto, "lastIndexOf", array_last_index_of, 1)?;
    register_method(realm, proto, "includes", array_includes, 1)?;

    // Iteration methods
    register_method(realm, proto, "forEach", array_for_each, 1)?;
    register_method(realm, proto, "map", array_map, 1)?;
    register_method(realm, proto, "filter", array_filter, 1)?;
    register_method(realm, proto, "reduce", array_reduce, 1)?;
    register_method(realm, proto, "find", array_find, 1)?;
    register_method(realm, proto, "findIndex", array_find_index, 1)?;
    register_method(realm, proto, "every", array_every, 1)?;
    register_method(realm, proto, "some", array_some, 1)?;

    // Iterator methods
    register_method(realm, proto, "keys", array_keys, 0)?;
    register_method(realm, proto, "entries", array_entries, 0)?;
    let values = register_method(realm, proto, "values", array_values, 0)?;
    realm.intrinsics.array_prototype_values = values;
    define_builtin(realm, proto, WellKnownSymbol::Iterator, JsValue::Object(values))?;

    let ctor = create_constructor(realm, array_constructor, 1, "Array", proto)?;
    realm.intrinsics.array = ctor;
    register_method(realm, ctor, "isArray", array_is_array, 1)?;
    register_method(realm, ctor, "of", array_of, 0)?;
    register_method(realm, ctor, "from", array_from, 1)?;
    super::symbol::register_species_getter(realm, ctor)?;

    let iter_proto = realm.intrinsics.array_iterator_prototype;
    register_method(realm, iter_proto, "next", array_iterator_next, 0)?;
    define_to_string_tag(realm, iter_proto, "Array Iterator")?;
    Ok(())
}

/// `@@toStringTag` data property: non-writable, non-enumerable, configurable
pub(crate) fn define_to_string_tag(realm: &mut Realm, obj: ObjectId, tag: &str) -> JsResult<()> {
    crate::operations::define_property_or_throw(
        realm,
        obj,
        &WellKnownSymbol::ToStringTag.key(),
        crate::property::PropertyDescriptor::data(JsValue::from(tag), false, false, true),
    )
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolve a relative index argument (negative counts from the end) against `len`
fn relative_index(realm: &mut Realm, value: &JsValue, len: u64, default: u64) -> JsResult<u64> {
    if value.is_undefined() {
        return Ok(default);
    }
    let relative = to_integer_or_infinity(realm, value)?;
    let len_f = len as f64;
    let index = if relative < 0.0 {
        (len_f + relative).max(0.0)
    } else {
        relative.min(len_f)
    };
    Ok(index as u64)
}

fn callback_arg(realm: &Realm, args: &[JsValue], method: &str) -> JsResult<JsValue> {
    let callback = arg(args, 0);
    if !is_callable(realm, &callback) {
        return Err(JsError::type_error(format!(
            "Array.prototype.{}: {} is not a function",
            method,
            callback.kind_name()
        )));
    }
    Ok(callback)
}

fn set_length(realm: &mut Realm, obj: ObjectId, len: u64) -> JsResult<()> {
    set(realm, obj, &PropertyKey::from("length"), JsValue::Number(len as f64), true)
}

/// `ArraySpeciesCreate(originalArray, length)`
fn array_species_create(realm: &mut Realm, original: ObjectId, length: u64) -> JsResult<ObjectId> {
    if !is_array(realm, &JsValue::Object(original))? {
        return array_create(realm, length, None);
    }
    let mut ctor = get(realm, original, &PropertyKey::from("constructor"))?;
    if let JsValue::Object(c) = ctor {
        ctor = get(realm, c, &WellKnownSymbol::Species.key())?;
        if ctor.is_null() {
            ctor = JsValue::Undefined;
        }
    }
    match &ctor {
        JsValue::Undefined => array_create(realm, length, None),
        JsValue::Object(c) if is_constructor(realm, &ctor) => {
            construct(realm, *c, &[JsValue::Number(length as f64)], None)
        }
        _ => Err(JsError::type_error("object.constructor[Symbol.species] is not a constructor")),
    }
}

/// Call `callback(element, index, array)` for every present element below `len`
/// until `visit` says stop
///
/// Returns the index at which `visit` stopped.
fn for_each_present(
    realm: &mut Realm,
    obj: ObjectId,
    len: u64,
    callback: &JsValue,
    this_arg: &JsValue,
    mut visit: impl FnMut(&mut Realm, u64, JsValue, JsValue) -> JsResult<bool>,
) -> JsResult<Option<u64>> {
    for k in 0..len {
        let key = index_key(k);
        if !has_property(realm, obj, &key)? {
            continue;
        }
        let value = get(realm, obj, &key)?;
        let result = call(
            realm,
            callback,
            this_arg,
            &[value.clone(), JsValue::Number(k as f64), JsValue::Object(obj)],
        )?;
        if !visit(realm, k, value, result)? {
            return Ok(Some(k));
        }
    }
    Ok(None)
}

// =============================================================================
// Array constructor
// =============================================================================

/// Array(...values)
fn array_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let new_target = nt.unwrap_or(realm.intrinsics.array);
    let fallback = realm.intrinsics.array_prototype;
    let proto = get_prototype_from_constructor(realm, new_target, fallback)?;

    match args {
        [] => Ok(JsValue::Object(array_create(realm, 0, Some(proto))?)),
        [JsValue::Number(n)] => {
            let len = to_uint32(realm, &JsValue::Number(*n))?;
            if len as f64 != *n {
                return Err(JsError::range_error("Invalid array length"));
            }
            Ok(JsValue::Object(array_create(realm, len as u64, Some(proto))?))
        }
        values => {
            let array = array_create(realm, 0, Some(proto))?;
            for (i, value) in values.iter().enumerate() {
                create_data_property_or_throw(realm, array, &index_key(i as u64), value.clone())?;
            }
            Ok(JsValue::Object(array))
        }
    }
}

fn array_is_array(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(is_array(realm, &arg(args, 0))?))
}

/// Target of `Array.of`/`Array.from`: `new this(len)` when `this` is a constructor
fn construct_this_or_array(
    realm: &mut Realm,
    this: &JsValue,
    len: Option<u64>,
) -> JsResult<ObjectId> {
    match this {
        JsValue::Object(c) if is_constructor(realm, this) => {
            let args: Vec<JsValue> = len.map(|l| JsValue::Number(l as f64)).into_iter().collect();
            construct(realm, *c, &args, None)
        }
        _ => array_create(realm, len.unwrap_or(0), None),
    }
}

fn array_of(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let len = args.len() as u64;
    let array = construct_this_or_array(realm, this, Some(len))?;
    for (k, value) in args.iter().enumerate() {
        create_data_property_or_throw(realm, array, &index_key(k as u64), value.clone())?;
    }
    set_length(realm, array, len)?;
    Ok(JsValue::Object(array))
}

/// Array.from(items, mapFn, thisArg)
fn array_from(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let items = arg(args, 0);
    let map_fn = arg(args, 1);
    let this_arg = arg(args, 2);
    let mapping = !map_fn.is_undefined();
    if mapping && !is_callable(realm, &map_fn) {
        return Err(JsError::type_error("Array.from: mapper is not a function"));
    }

    if let Some(using_iterator) = get_method(realm, &items, &WellKnownSymbol::Iterator.key())? {
        let array = construct_this_or_array(realm, this, None)?;
        let mut record = get_iterator_from_method(realm, &items, &using_iterator)?;
        let mut k: u64 = 0;
        while let Some(next) = iterator_step_value(realm, &mut record)? {
            let step = (|| -> JsResult<()> {
                let value = if mapping {
                    call(realm, &map_fn, &this_arg, &[next, JsValue::Number(k as f64)])?
                } else {
                    next
                };
                create_data_property_or_throw(realm, array, &index_key(k), value)
            })();
            if let Err(err) = step {
                return iterator_close(realm, &record, Err(err));
            }
            k += 1;
        }
        set_length(realm, array, k)?;
        return Ok(JsValue::Object(array));
    }

    let array_like = to_object(realm, &items)?;
    let len = length_of_array_like(realm, array_like)?;
    let array = construct_this_or_array(realm, this, Some(len))?;
    for k in 0..len {
        let value = get(realm, array_like, &index_key(k))?;
        let value = if mapping {
            call(realm, &map_fn, &this_arg, &[value, JsValue::Number(k as f64)])?
        } else {
            value
        };
        create_data_property_or_throw(realm, array, &index_key(k), value)?;
    }
    set_length(realm, array, len)?;
    Ok(JsValue::Object(array))
}

// =============================================================================
// Mutating methods
// =============================================================================

fn array_push(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    if len + args.len() as u64 > MAX_SAFE_LENGTH {
        return Err(JsError::type_error("Pushing elements would exceed the maximum array length"));
    }
    let mut len = len;
    for value in args {
        set(realm, obj, &index_key(len), value.clone(), true)?;
        len += 1;
    }
    set_length(realm, obj, len)?;
    Ok(JsValue::Number(len as f64))
}

fn array_pop(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    if len == 0 {
        set_length(realm, obj, 0)?;
        return Ok(JsValue::Undefined);
    }
    let key = index_key(len - 1);
    let element = get(realm, obj, &key)?;
    delete_property_or_throw(realm, obj, &key)?;
    set_length(realm, obj, len - 1)?;
    Ok(element)
}

fn array_shift(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    if len == 0 {
        set_length(realm, obj, 0)?;
        return Ok(JsValue::Undefined);
    }
    let first = get(realm, obj, &index_key(0))?;
    move_elements(realm, obj, 1, 0, len - 1)?;
    delete_property_or_throw(realm, obj, &index_key(len - 1))?;
    set_length(realm, obj, len - 1)?;
    Ok(first)
}

fn array_unshift(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let count = args.len() as u64;
    if count > 0 {
        if len + count > MAX_SAFE_LENGTH {
            return Err(JsError::type_error(
                "Unshifting elements would exceed the maximum array length",
            ));
        }
        move_elements(realm, obj, 0, count, len)?;
        for (j, value) in args.iter().enumerate() {
            set(realm, obj, &index_key(j as u64), value.clone(), true)?;
        }
    }
    set_length(realm, obj, len + count)?;
    Ok(JsValue::Number((len + count) as f64))
}

/// Move `count` elements from `from` to `to`, preserving holes
///
/// Iterates in the direction that never overwrites a not-yet-moved element.
fn move_elements(realm: &mut Realm, obj: ObjectId, from: u64, to: u64, count: u64) -> JsResult<()> {
    let step = |realm: &mut Realm, k: u64| -> JsResult<()> {
        let from_key = index_key(from + k);
        let to_key = index_key(to + k);
        if has_property(realm, obj, &from_key)? {
            let value = get(realm, obj, &from_key)?;
            set(realm, obj, &to_key, value, true)
        } else {
            delete_property_or_throw(realm, obj, &to_key)
        }
    };
    if from > to {
        for k in 0..count {
            step(realm, k)?;
        }
    } else {
        for k in (0..count).rev() {
            step(realm, k)?;
        }
    }
    Ok(())
}

/// Array.prototype.splice(start, deleteCount, ...items)
fn array_splice(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let start = relative_index(realm, &arg(args, 0), len, 0)?;
    let items = args.get(2..).unwrap_or(&[]);
    let delete_count = match args.len() {
        0 => 0,
        1 => len - start,
        _ => {
            let dc = to_integer_or_infinity(realm, &arg(args, 1))?;
            dc.clamp(0.0, (len - start) as f64) as u64
        }
    };
    let item_count = items.len() as u64;
    if len + item_count - delete_count > MAX_SAFE_LENGTH {
        return Err(JsError::type_error("Splice would exceed the maximum array length"));
    }

    let removed = array_species_create(realm, obj, delete_count)?;
    for k in 0..delete_count {
        let from = index_key(start + k);
        if has_property(realm, obj, &from)? {
            let value = get(realm, obj, &from)?;
            create_data_property_or_throw(realm, removed, &index_key(k), value)?;
        }
    }
    set_length(realm, removed, delete_count)?;

    let tail = len - start - delete_count;
    if item_count < delete_count {
        move_elements(realm, obj, start + delete_count, start + item_count, tail)?;
        for k in ((len - delete_count + item_count)..len).rev() {
            delete_property_or_throw(realm, obj, &index_key(k))?;
        }
    } else if item_count > delete_count {
        move_elements(realm, obj, start + delete_count, start + item_count, tail)?;
    }
    for (k, item) in items.iter().enumerate() {
        set(realm, obj, &index_key(start + k as u64), item.clone(), true)?;
    }
    set_length(realm, obj, len - delete_count + item_count)?;
    Ok(JsValue::Object(removed))
}

fn array_reverse(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let middle = len / 2;
    for lower in 0..middle {
        let upper = len - lower - 1;
        let lower_key = index_key(lower);
        let upper_key = index_key(upper);
        let lower_exists = has_property(realm, obj, &lower_key)?;
        let lower_value = if lower_exists {
            get(realm, obj, &lower_key)?
        } else {
            JsValue::Undefined
        };
        let upper_exists = has_property(realm, obj, &upper_key)?;
        let upper_value = if upper_exists {
            get(realm, obj, &upper_key)?
        } else {
            JsValue::Undefined
        };
        match (lower_exists, upper_exists) {
            (true, true) => {
                set(realm, obj, &lower_key, upper_value, true)?;
                set(realm, obj, &upper_key, lower_value, true)?;
            }
            (false, true) => {
                set(realm, obj, &lower_key, upper_value, true)?;
                delete_property_or_throw(realm, obj, &upper_key)?;
            }
            (true, false) => {
                delete_property_or_throw(realm, obj, &lower_key)?;
                set(realm, obj, &upper_key, lower_value, true)?;
            }
            (false, false) => {}
        }
    }
    Ok(JsValue::Object(obj))
}

/// `SortCompare(x, y)` with `undefined` sorted last
fn sort_compare(
    realm: &mut Realm,
    compare_fn: &JsValue,
    x: &JsValue,
    y: &JsValue,
) -> JsResult<Ordering> {
    match (x.is_undefined(), y.is_undefined()) {
        (true, true) => return Ok(Ordering::Equal),
        (true, false) => return Ok(Ordering::Greater),
        (false, true) => return Ok(Ordering::Less),
        (false, false) => {}
    }
    if !compare_fn.is_undefined() {
        let v = call(realm, compare_fn, &JsValue::Undefined, &[x.clone(), y.clone()])?;
        let v = to_number(realm, &v)?;
        return Ok(v.partial_cmp(&0.0).unwrap_or(Ordering::Equal));
    }
    let x = to_string(realm, x)?;
    let y = to_string(realm, y)?;
    Ok(x.cmp_code_units(&y))
}

/// Stable merge sort with a fallible comparator
fn merge_sort(
    realm: &mut Realm,
    items: Vec<JsValue>,
    compare_fn: &JsValue,
) -> JsResult<Vec<JsValue>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut right = items;
    let left = right.drain(..right.len() / 2).collect::<Vec<_>>();
    let left = merge_sort(realm, left, compare_fn)?;
    let right = merge_sort(realm, right, compare_fn)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let take_right = sort_compare(realm, compare_fn, l, r)? == Ordering::Greater;
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

fn array_sort(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let compare_fn = arg(args, 0);
    if !compare_fn.is_undefined() && !is_callable(realm, &compare_fn) {
        return Err(JsError::type_error(
            "The comparison function must be either a function or undefined",
        ));
    }
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let mut items = Vec::new();
    for k in 0..len {
        let key = index_key(k);
        if has_property(realm, obj, &key)? {
            items.push(get(realm, obj, &key)?);
        }
    }
    let sorted = merge_sort(realm, items, &compare_fn)?;
    let present = sorted.len() as u64;
    for (k, value) in sorted.into_iter().enumerate() {
        set(realm, obj, &index_key(k as u64), value, true)?;
    }
    for k in present..len {
        delete_property_or_throw(realm, obj, &index_key(k))?;
    }
    Ok(JsValue::Object(obj))
}

fn array_fill(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let value = arg(args, 0);
    let start = relative_index(realm, &arg(args, 1), len, 0)?;
    let end = relative_index(realm, &arg(args, 2), len, len)?;
    for k in start..end {
        set(realm, obj, &index_key(k), value.clone(), true)?;
    }
    Ok(JsValue::Object(obj))
}

// =============================================================================
// Accessor methods
// =============================================================================

fn array_at(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)? as f64;
    let relative = to_integer_or_infinity(realm, &arg(args, 0))?;
    let k = if relative >= 0.0 { relative } else { len + relative };
    if k < 0.0 || k >= len {
        return Ok(JsValue::Undefined);
    }
    get(realm, obj, &index_key(k as u64))
}

/// `IsConcatSpreadable(O)`
fn is_concat_spreadable(realm: &mut Realm, value: &JsValue) -> JsResult<bool> {
    let JsValue::Object(obj) = value else {
        return Ok(false);
    };
    let spreadable = get(realm, *obj, &WellKnownSymbol::IsConcatSpreadable.key())?;
    if !spreadable.is_undefined() {
        return Ok(spreadable.to_boolean());
    }
    is_array(realm, value)
}

fn array_concat(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let result = array_species_create(realm, obj, 0)?;
    let mut n: u64 = 0;
    let items = std::iter::once(JsValue::Object(obj)).chain(args.iter().cloned());
    for item in items {
        if is_concat_spreadable(realm, &item)? {
            let JsValue::Object(e) = item else {
                continue;
            };
            let len = length_of_array_like(realm, e)?;
            if n + len > MAX_SAFE_LENGTH {
                return Err(JsError::type_error(
                    "Concatenation would exceed the maximum array length",
                ));
            }
            for k in 0..len {
                let key = index_key(k);
                if has_property(realm, e, &key)? {
                    let value = get(realm, e, &key)?;
                    create_data_property_or_throw(realm, result, &index_key(n), value)?;
                }
                n += 1;
            }
        } else {
            create_data_property_or_throw(realm, result, &index_key(n), item)?;
            n += 1;
        }
    }
    set_length(realm, result, n)?;
    Ok(JsValue::Object(result))
}

fn array_slice(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let start = relative_index(realm, &arg(args, 0), len, 0)?;
    let end = relative_index(realm, &arg(args, 1), len, len)?;
    let count = end.saturating_sub(start);
    let result = array_species_create(realm, obj, count)?;
    let mut n: u64 = 0;
    for k in start..end {
        let key = index_key(k);
        if has_property(realm, obj, &key)? {
            let value = get(realm, obj, &key)?;
            create_data_property_or_throw(realm, result, &index_key(n), value)?;
        }
        n += 1;
    }
    set_length(realm, result, n)?;
    Ok(JsValue::Object(result))
}

fn array_join(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let separator = match arg(args, 0) {
        JsValue::Undefined => ",".to_string(),
        other => to_string(realm, &other)?.to_string(),
    };
    let mut values = Vec::new();
    for k in 0..len {
        values.push(get(realm, obj, &index_key(k))?);
    }
    Ok(JsValue::from(join_values(realm, &values, &separator)?))
}

fn array_to_string(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let join = get(realm, obj, &PropertyKey::from("join"))?;
    if is_callable(realm, &join) {
        return call(realm, &join, &JsValue::Object(obj), &[]);
    }
    Ok(JsValue::from(object_to_string_tag(realm, &JsValue::Object(obj))?))
}

fn array_index_of(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    if len == 0 {
        return Ok(JsValue::Number(-1.0));
    }
    let target = arg(args, 0);
    let start = relative_index(realm, &arg(args, 1), len, 0)?;
    for k in start..len {
        let key = index_key(k);
        if has_property(realm, obj, &key)? && is_strictly_equal(&get(realm, obj, &key)?, &target) {
            return Ok(JsValue::Number(k as f64));
        }
    }
    Ok(JsValue::Number(-1.0))
}

fn array_last_index_of(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    if len == 0 {
        return Ok(JsValue::Number(-1.0));
    }
    let target = arg(args, 0);
    let from = if args.len() > 1 {
        let n = to_integer_or_infinity(realm, &arg(args, 1))?;
        if n >= 0.0 { n.min(len as f64 - 1.0) } else { len as f64 + n }
    } else {
        len as f64 - 1.0
    };
    if from < 0.0 {
        return Ok(JsValue::Number(-1.0));
    }
    for k in (0..=from as u64).rev() {
        let key = index_key(k);
        if has_property(realm, obj, &key)? && is_strictly_equal(&get(realm, obj, &key)?, &target) {
            return Ok(JsValue::Number(k as f64));
        }
    }
    Ok(JsValue::Number(-1.0))
}

fn array_includes(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    if len == 0 {
        return Ok(JsValue::Boolean(false));
    }
    let target = arg(args, 0);
    let start = relative_index(realm, &arg(args, 1), len, 0)?;
    for k in start..len {
        if same_value_zero(&get(realm, obj, &index_key(k))?, &target) {
            return Ok(JsValue::Boolean(true));
        }
    }
    Ok(JsValue::Boolean(false))
}

// =============================================================================
// Iteration methods
// =============================================================================

fn array_for_each(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let callback = callback_arg(realm, args, "forEach")?;
    for_each_present(realm, obj, len, &callback, &arg(args, 1), |_, _, _, _| Ok(true))?;
    Ok(JsValue::Undefined)
}

fn array_map(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let callback = callback_arg(realm, args, "map")?;
    let result = array_species_create(realm, obj, len)?;
    for_each_present(realm, obj, len, &callback, &arg(args, 1), |realm, k, _, mapped| {
        create_data_property_or_throw(realm, result, &index_key(k), mapped)?;
        Ok(true)
    })?;
    Ok(JsValue::Object(result))
}

fn array_filter(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let callback = callback_arg(realm, args, "filter")?;
    let result = array_species_create(realm, obj, 0)?;
    let mut to: u64 = 0;
    for_each_present(realm, obj, len, &callback, &arg(args, 1), |realm, _, value, selected| {
        if selected.to_boolean() {
            create_data_property_or_throw(realm, result, &index_key(to), value)?;
            to += 1;
        }
        Ok(true)
    })?;
    Ok(JsValue::Object(result))
}

fn array_every(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let callback = callback_arg(realm, args, "every")?;
    let stopped = for_each_present(realm, obj, len, &callback, &arg(args, 1), |_, _, _, result| {
        Ok(result.to_boolean())
    })?;
    Ok(JsValue::Boolean(stopped.is_none()))
}

fn array_some(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let callback = callback_arg(realm, args, "some")?;
    let stopped = for_each_present(realm, obj, len, &callback, &arg(args, 1), |_, _, _, result| {
        Ok(!result.to_boolean())
    })?;
    Ok(JsValue::Boolean(stopped.is_some()))
}

/// `FindViaPredicate` visits holes as `undefined`, unlike the other iteration methods
fn find_via_predicate(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    method: &str,
) -> JsResult<Option<(u64, JsValue)>> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let predicate = callback_arg(realm, args, method)?;
    let this_arg = arg(args, 1);
    for k in 0..len {
        let value = get(realm, obj, &index_key(k))?;
        let result = call(
            realm,
            &predicate,
            &this_arg,
            &[value.clone(), JsValue::Number(k as f64), JsValue::Object(obj)],
        )?;
        if result.to_boolean() {
            return Ok(Some((k, value)));
        }
    }
    Ok(None)
}

fn array_find(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(find_via_predicate(realm, this, args, "find")?
        .map_or(JsValue::Undefined, |(_, value)| value))
}

fn array_find_index(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let found = find_via_predicate(realm, this, args, "findIndex")?;
    Ok(JsValue::Number(found.map_or(-1.0, |(k, _)| k as f64)))
}

fn array_reduce(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    let len = length_of_array_like(realm, obj)?;
    let callback = callback_arg(realm, args, "reduce")?;
    let mut k: u64 = 0;
    let mut accumulator = if args.len() >= 2 {
        arg(args, 1)
    } else {
        let mut initial = None;
        while initial.is_none() && k < len {
            let key = index_key(k);
            if has_property(realm, obj, &key)? {
                initial = Some(get(realm, obj, &key)?);
            }
            k += 1;
        }
        initial.ok_or_else(|| JsError::type_error("Reduce of empty array with no initial value"))?
    };
    while k < len {
        let key = index_key(k);
        if has_property(realm, obj, &key)? {
            let value = get(realm, obj, &key)?;
            accumulator = call(
                realm,
                &callback,
                &JsValue::Undefined,
                &[accumulator, value, JsValue::Number(k as f64), JsValue::Object(obj)],
            )?;
        }
        k += 1;
    }
    Ok(accumulator)
}

// =============================================================================
// Iterators
// =============================================================================

/// `CreateArrayIterator(array, kind)`
pub fn create_array_iterator(
    realm: &mut Realm,
    array: ObjectId,
    kind: ArrayIterationKind,
) -> ObjectId {
    let proto = Some(realm.intrinsics.array_iterator_prototype);
    object::make_object(
        realm,
        proto,
        ObjectKind::ArrayIterator(ArrayIteratorData {
            iterated: Some(array),
            next_index: 0,
            kind,
        }),
    )
}

fn array_keys(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    Ok(JsValue::Object(create_array_iterator(realm, obj, ArrayIterationKind::Keys)))
}

fn array_values(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    Ok(JsValue::Object(create_array_iterator(realm, obj, ArrayIterationKind::Values)))
}

fn array_entries(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let obj = to_object(realm, this)?;
    Ok(JsValue::Object(create_array_iterator(realm, obj, ArrayIterationKind::Entries)))
}

/// %ArrayIteratorPrototype%.next()
fn array_iterator_next(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let iterator = match this {
        JsValue::Object(obj)
            if matches!(realm.heap.get(*obj)?.kind, ObjectKind::ArrayIterator(_)) =>
        {
            *obj
        }
        _ => return Err(JsError::type_error("next method called on an incompatible receiver")),
    };
    let ObjectKind::ArrayIterator(data) = &realm.heap.get(iterator)?.kind else {
        return Err(JsError::internal("array iterator lost its slots"));
    };
    let ArrayIteratorData { iterated, next_index, kind } = data.clone();

    let Some(array) = iterated else {
        return Ok(JsValue::Object(create_iter_result_object(realm, JsValue::Undefined, true)?));
    };
    let len = length_of_array_like(realm, array)?;
    if next_index >= len {
        if let ObjectKind::ArrayIterator(data) = &mut realm.heap.get_mut(iterator)?.kind {
            data.iterated = None;
        }
        return Ok(JsValue::Object(create_iter_result_object(realm, JsValue::Undefined, true)?));
    }
    if let ObjectKind::ArrayIterator(data) = &mut realm.heap.get_mut(iterator)?.kind {
        data.next_index = next_index + 1;
    }

    let index = JsValue::Number(next_index as f64);
    let result = match kind {
        ArrayIterationKind::Keys => index,
        ArrayIterationKind::Values => get(realm, array, &index_key(next_index))?,
        ArrayIterationKind::Entries => {
            let value = get(realm, array, &index_key(next_index))?;
            JsValue::Object(create_array_from_list(realm, &[index, value])?)
        }
    };
    Ok(JsValue::Object(create_iter_result_object(realm, result, false)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::function::create_builtin_function;
    use crate::host::HostConfig;
    use crate::operations::{invoke, iterable_to_list};

    fn numbers(realm: &mut Realm, values: &[f64]) -> JsValue {
        let values: Vec<JsValue> = values.iter().map(|n| JsValue::Number(*n)).collect();
        JsValue::Object(create_array_from_list(realm, &values).unwrap())
    }

    fn list(realm: &mut Realm, value: &JsValue) -> Vec<JsValue> {
        iterable_to_list(realm, value).unwrap()
    }

    fn double(
        realm: &mut Realm,
        _this: &JsValue,
        args: &[JsValue],
        _nt: Option<ObjectId>,
    ) -> JsResult<JsValue> {
        Ok(JsValue::Number(to_number(realm, &arg(args, 0))? * 2.0))
    }

    fn is_even(
        realm: &mut Realm,
        _this: &JsValue,
        args: &[JsValue],
        _nt: Option<ObjectId>,
    ) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(to_number(realm, &arg(args, 0))? % 2.0 == 0.0))
    }

    fn descending(
        realm: &mut Realm,
        _this: &JsValue,
        args: &[JsValue],
        _nt: Option<ObjectId>,
    ) -> JsResult<JsValue> {
        Ok(JsValue::Number(to_number(realm, &arg(args, 1))? - to_number(realm, &arg(args, 0))?))
    }

    #[test]
    fn test_push_pop_shift_unshift() {
        let mut realm = Realm::create(HostConfig::default());
        let array = numbers(&mut realm, &[1.0, 2.0]);
        let len = invoke(&mut realm, &array, &PropertyKey::from("push"), &[JsValue::Number(3.0)])
            .unwrap();
        assert_eq!(len, JsValue::Number(3.0));
        let last = invoke(&mut realm, &array, &PropertyKey::from("pop"), &[]).unwrap();
        assert_eq!(last, JsValue::Number(3.0));
        invoke(&mut realm, &array, &PropertyKey::from("unshift"), &[JsValue::Number(0.0)]).unwrap();
        let first = invoke(&mut realm, &array, &PropertyKey::from("shift"), &[]).unwrap();
        assert_eq!(first, JsValue::Number(0.0));
        assert_eq!(list(&mut realm, &array), vec![JsValue::Number(1.0), JsValue::Number(2.0)]);
    }

    #[test]
    fn test_constructor_length_and_range_error() {
        let mut realm = Realm::create(HostConfig::default());
        let array = realm.intrinsics.array;
        let a = construct(&mut realm, array, &[JsValue::Number(3.0)], None).unwrap();
        assert_eq!(length_of_array_like(&mut realm, a).unwrap(), 3);
        let err = construct(&mut realm, array, &[JsValue::Number(1.5)], None).unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_map_filter_join() {
        let mut realm = Realm::create(HostConfig::default());
        let array = numbers(&mut realm, &[1.0, 2.0, 3.0, 4.0]);
        let double = JsValue::Object(
            create_builtin_function(&mut realm, double, 1, "double", false).unwrap(),
        );
        let even = JsValue::Object(
            create_builtin_function(&mut realm, is_even, 1, "isEven", false).unwrap(),
        );
        let doubled = invoke(&mut realm, &array, &PropertyKey::from("map"), &[double]).unwrap();
        let joined = invoke(&mut realm, &doubled, &PropertyKey::from("join"), &[JsValue::from("-")])
            .unwrap();
        assert_eq!(joined, JsValue::from("2-4-6-8"));
        let evens = invoke(&mut realm, &array, &PropertyKey::from("filter"), &[even]).unwrap();
        let text = invoke(&mut realm, &evens, &PropertyKey::from("toString"), &[]).unwrap();
        assert_eq!(text, JsValue::from("2,4"));
    }

    #[test]
    fn test_splice_and_slice() {
        let mut realm = Realm::create(HostConfig::default());
        let array = numbers(&mut realm, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let removed = invoke(
            &mut realm,
            &array,
            &PropertyKey::from("splice"),
            &[JsValue::Number(1.0), JsValue::Number(2.0), JsValue::from("x")],
        )
        .unwrap();
        assert_eq!(list(&mut realm, &removed), vec![JsValue::Number(2.0), JsValue::Number(3.0)]);
        let text = invoke(&mut realm, &array, &PropertyKey::from("join"), &[]).unwrap();
        assert_eq!(text, JsValue::from("1,x,4,5"));
        let tail = invoke(&mut realm, &array, &PropertyKey::from("slice"), &[JsValue::Number(-2.0)])
            .unwrap();
        assert_eq!(list(&mut realm, &tail), vec![JsValue::Number(4.0), JsValue::Number(5.0)]);
    }

    #[test]
    fn test_sort_default_and_comparator() {
        let mut realm = Realm::create(HostConfig::default());
        let array = numbers(&mut realm, &[10.0, 9.0, 1.0]);
        invoke(&mut realm, &array, &PropertyKey::from("sort"), &[]).unwrap();
        let text = invoke(&mut realm, &array, &PropertyKey::from("join"), &[]).unwrap();
        assert_eq!(text, JsValue::from("1,10,9"));
        let cmp = JsValue::Object(
            create_builtin_function(&mut realm, descending, 2, "cmp", false).unwrap(),
        );
        invoke(&mut realm, &array, &PropertyKey::from("sort"), &[cmp]).unwrap();
        let text = invoke(&mut realm, &array, &PropertyKey::from("join"), &[]).unwrap();
        assert_eq!(text, JsValue::from("10,9,1"));
    }

    #[test]
    fn test_includes_nan_but_index_of_does_not() {
        let mut realm = Realm::create(HostConfig::default());
        let array = numbers(&mut realm, &[f64::NAN]);
        let includes = invoke(
            &mut realm,
            &array,
            &PropertyKey::from("includes"),
            &[JsValue::Number(f64::NAN)],
        )
        .unwrap();
        assert_eq!(includes, JsValue::Boolean(true));
        let index = invoke(
            &mut realm,
            &array,
            &PropertyKey::from("indexOf"),
            &[JsValue::Number(f64::NAN)],
        )
        .unwrap();
        assert_eq!(index, JsValue::Number(-1.0));
    }

    #[test]
    fn test_entries_iterator() {
        let mut realm = Realm::create(HostConfig::default());
        let array = numbers(&mut realm, &[7.0]);
        let entries = invoke(&mut realm, &array, &PropertyKey::from("entries"), &[]).unwrap();
        let items = list(&mut realm, &entries);
        assert_eq!(items.len(), 1);
        let pair = list(&mut realm, items.first().unwrap());
        assert_eq!(pair, vec![JsValue::Number(0.0), JsValue::Number(7.0)]);

        let tag = object_to_string_tag(&mut realm, &entries).unwrap();
        assert_eq!(tag, "[object Array Iterator]");
    }

    #[test]
    fn test_reduce_empty_throws() {
        let mut realm = Realm::create(HostConfig::default());
        let array = numbers(&mut realm, &[]);
        let f = JsValue::Object(
            create_builtin_function(&mut realm, double, 1, "f", false).unwrap(),
        );
        let err = invoke(&mut realm, &array, &PropertyKey::from("reduce"), &[f]).unwrap_err();
        assert!(err.is_type_error());
    }
}
