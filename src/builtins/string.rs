//! String constructor and String.prototype
//!
//! Index arguments count UTF-16 code units; methods work on the code-unit view and
//! rebuild strings through `JsString::from_utf16_lossy`.

use super::{arg, create_constructor, register_method};
use crate::completion::{Completion, CompletionType};
use crate::error::{JsError, JsResult};
use crate::function::get_prototype_from_constructor;
use crate::generator::{GeneratorStep, create_generator};
use crate::object::ObjectKind;
use crate::object::string::string_create;
use crate::operations::number::trim_js_whitespace;
use crate::operations::{
    create_array_from_list, require_object_coercible, to_integer_or_infinity, to_length, to_number,
    to_string,
};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, WellKnownSymbol};

/// Initialize String.prototype and the String constructor
pub fn init_string(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.string_prototype;

    register_method(realm, proto, "at", string_at, 1)?;
    register_method(realm, proto, "charAt", string_char_at, 1)?;
    register_method(realm, proto, "charCodeAt", string_char_code_at, 1)?;
    register_method(realm, proto, "codePointAt", string_code_point_at, 1)?;
    register_method(realm, proto, "concat", string_concat, 1)?;
    register_method(realm, proto, "endsWith", string_ends_with, 1)?;
    register_method(realm, proto, "includes", string_includes, 1)?;
    register_method(realm, proto, "indexOf", string_index_of, 1)?;
    register_method(realm, proto, "lastIndexOf", string_last_index_of, 1)?;
    register_method(realm, proto, "padEnd", string_pad_end, 1)?;
    register_method(realm, proto, "padStart", string_pad_start, 1)?;
    register_method(realm, proto, "repeat", string_repeat, 1)?;
    register_method(realm, proto, "slice", string_slice, 2)?;
    register_method(realm, proto, "split", string_split, 2)?;
    register_method(realm, proto, "startsWith", string_starts_with, 1)?;
    register_method(realm, proto, "substring", string_substring, 2)?;
    register_method(realm, proto, "toLowerCase", string_to_lower_case, 0)?;
    register_method(realm, proto, "toString", string_value_of, 0)?;
    register_method(realm, proto, "toUpperCase", string_to_upper_case, 0)?;
    register_method(realm, proto, "trim", string_trim, 0)?;
    register_method(realm, proto, "trimEnd", string_trim_end, 0)?;
    register_method(realm, proto, "trimStart", string_trim_start, 0)?;
    register_method(realm, proto, "valueOf", string_value_of, 0)?;
    register_method(realm, proto, WellKnownSymbol::Iterator, string_iterator, 0)?;

    let ctor = create_constructor(realm, string_constructor, 1, "String", proto)?;
    realm.intrinsics.string = ctor;
    register_method(realm, ctor, "fromCharCode", string_from_char_code, 1)?;
    register_method(realm, ctor, "fromCodePoint", string_from_code_point, 1)?;
    Ok(())
}

/// String(value)
fn string_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let s = match args.first() {
        None => JsString::from(""),
        // String(sym) is allowed as a call, not as `new`
        Some(JsValue::Symbol(sym)) if nt.is_none() => sym.descriptive_string(),
        Some(value) => to_string(realm, value)?,
    };
    let Some(new_target) = nt else {
        return Ok(JsValue::String(s));
    };
    let fallback = realm.intrinsics.string_prototype;
    let proto = get_prototype_from_constructor(realm, new_target, fallback)?;
    Ok(JsValue::Object(string_create(realm, s, Some(proto))?))
}

/// `thisStringValue(value)`
fn this_string_value(realm: &Realm, this: &JsValue, method: &str) -> JsResult<JsString> {
    match this {
        JsValue::String(s) => return Ok(s.clone()),
        JsValue::Object(obj) => {
            if let ObjectKind::String(s) = &realm.heap.get(*obj)?.kind {
                return Ok(s.clone());
            }
        }
        _ => {}
    }
    Err(JsError::type_error(format!(
        "String.prototype.{} requires that 'this' be a String",
        method,
    )))
}

/// `? ToString(? RequireObjectCoercible(this))`
fn coerce_this(realm: &mut Realm, this: &JsValue) -> JsResult<JsString> {
    require_object_coercible(this)?;
    to_string(realm, this)
}

/// Clamp `ToIntegerOrInfinity(value)` into `[0, len]`
fn clamped_position(realm: &mut Realm, value: &JsValue, len: usize) -> JsResult<usize> {
    let n = to_integer_or_infinity(realm, value)?;
    Ok(n.clamp(0.0, len as f64) as usize)
}

fn from_units(units: &[u16]) -> JsValue {
    JsValue::String(JsString::from_utf16_lossy(units))
}

/// Position of `needle` in `haystack` at or after `from`
fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .skip(from)
        .find(|(_, window)| *window == needle)
        .map(|(i, _)| i)
}

fn string_value_of(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::String(this_string_value(realm, this, "valueOf")?))
}

fn string_at(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let len = units.len() as f64;
    let relative = to_integer_or_infinity(realm, &arg(args, 0))?;
    let k = if relative >= 0.0 { relative } else { len + relative };
    if k < 0.0 || k >= len {
        return Ok(JsValue::Undefined);
    }
    Ok(units.get(k as usize).map_or(JsValue::Undefined, |unit| from_units(&[*unit])))
}

fn string_char_at(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let s = coerce_this(realm, this)?;
    let pos = to_integer_or_infinity(realm, &arg(args, 0))?;
    if pos < 0.0 {
        return Ok(JsValue::from(""));
    }
    Ok(s.code_unit_at(pos as usize).map_or(JsValue::from(""), |unit| from_units(&[unit])))
}

fn string_char_code_at(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let s = coerce_this(realm, this)?;
    let pos = to_integer_or_infinity(realm, &arg(args, 0))?;
    if pos < 0.0 {
        return Ok(JsValue::Number(f64::NAN));
    }
    Ok(JsValue::Number(s.code_unit_at(pos as usize).map_or(f64::NAN, f64::from)))
}

fn string_code_point_at(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let pos = to_integer_or_infinity(realm, &arg(args, 0))?;
    if pos < 0.0 {
        return Ok(JsValue::Undefined);
    }
    let pos = pos as usize;
    let Some(first) = units.get(pos).copied() else {
        return Ok(JsValue::Undefined);
    };
    let tail = units.get(pos..).unwrap_or(&[]);
    let code_point = match char::decode_utf16(tail.iter().copied()).next() {
        Some(Ok(c)) => c as u32,
        _ => first as u32,
    };
    Ok(JsValue::Number(code_point as f64))
}

fn string_concat(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let mut result = coerce_this(realm, this)?.to_string();
    for value in args {
        result.push_str(to_string(realm, value)?.as_str());
    }
    Ok(JsValue::from(result))
}

/// Search string argument; a RegExp would be rejected here, but the realm has none
fn search_string(realm: &mut Realm, args: &[JsValue]) -> JsResult<Vec<u16>> {
    Ok(to_string(realm, &arg(args, 0))?.to_utf16())
}

fn string_starts_with(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let search = search_string(realm, args)?;
    let start = match arg(args, 1) {
        JsValue::Undefined => 0,
        pos => clamped_position(realm, &pos, units.len())?,
    };
    let matches = units
        .get(start..start + search.len())
        .is_some_and(|window| window == search.as_slice());
    Ok(JsValue::Boolean(matches))
}

fn string_ends_with(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let search = search_string(realm, args)?;
    let end = match arg(args, 1) {
        JsValue::Undefined => units.len(),
        pos => clamped_position(realm, &pos, units.len())?,
    };
    let Some(start) = end.checked_sub(search.len()) else {
        return Ok(JsValue::Boolean(false));
    };
    Ok(JsValue::Boolean(units.get(start..end).is_some_and(|window| window == search.as_slice())))
}

fn string_includes(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let search = search_string(realm, args)?;
    let start = clamped_position(realm, &arg(args, 1), units.len())?;
    Ok(JsValue::Boolean(find_units(&units, &search, start).is_some()))
}

fn string_index_of(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let search = search_string(realm, args)?;
    let start = clamped_position(realm, &arg(args, 1), units.len())?;
    Ok(JsValue::Number(find_units(&units, &search, start).map_or(-1.0, |i| i as f64)))
}

fn string_last_index_of(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let search = search_string(realm, args)?;
    let num_pos = to_number(realm, &arg(args, 1))?;
    let pos = if num_pos.is_nan() { f64::INFINITY } else { num_pos.trunc() };
    let Some(last_start) = units.len().checked_sub(search.len()) else {
        return Ok(JsValue::Number(-1.0));
    };
    let start = pos.clamp(0.0, last_start as f64) as usize;
    let found = (0..=start)
        .rev()
        .find(|&i| {
            units
                .get(i..i + search.len())
                .is_some_and(|window| window == search.as_slice())
        });
    Ok(JsValue::Number(found.map_or(-1.0, |i| i as f64)))
}

#[derive(Clone, Copy)]
enum PadPlacement {
    Start,
    End,
}

/// `StringPad(S, maxLength, fillString, placement)`
fn string_pad(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    placement: PadPlacement,
) -> JsResult<JsValue> {
    let s = coerce_this(realm, this)?;
    let units = s.to_utf16();
    let max_length = to_length(realm, &arg(args, 0))?;
    if max_length <= units.len() as u64 {
        return Ok(JsValue::String(s));
    }
    let filler = match arg(args, 1) {
        JsValue::Undefined => vec![u16::from(b' ')],
        fill => to_string(realm, &fill)?.to_utf16(),
    };
    if filler.is_empty() {
        return Ok(JsValue::String(s));
    }
    let target_len =
        usize::try_from(max_length).map_err(|_| JsError::range_error("Invalid string length"))?;
    let fill_len = target_len - units.len();
    let padding: Vec<u16> = filler.iter().copied().cycle().take(fill_len).collect();
    let result = match placement {
        PadPlacement::Start => [padding, units].concat(),
        PadPlacement::End => [units, padding].concat(),
    };
    Ok(from_units(&result))
}

fn string_pad_start(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    string_pad(realm, this, args, PadPlacement::Start)
}

fn string_pad_end(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    string_pad(realm, this, args, PadPlacement::End)
}

fn string_repeat(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let s = coerce_this(realm, this)?;
    let n = to_integer_or_infinity(realm, &arg(args, 0))?;
    if n < 0.0 || n == f64::INFINITY {
        return Err(JsError::range_error(format!("Invalid count value: {}", n)));
    }
    if s.is_empty() || n == 0.0 {
        return Ok(JsValue::from(""));
    }
    // Strings longer than 2^30 code units are refused
    if (s.utf16_len() as f64) * n > (1u64 << 30) as f64 {
        return Err(JsError::range_error("Invalid string length"));
    }
    Ok(JsValue::from(s.as_str().repeat(n as usize)))
}

fn string_slice(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let len = units.len() as f64;
    let relative = |n: f64| if n < 0.0 { (len + n).max(0.0) } else { n.min(len) };
    let from = relative(to_integer_or_infinity(realm, &arg(args, 0))?);
    let to = match arg(args, 1) {
        JsValue::Undefined => len,
        end => relative(to_integer_or_infinity(realm, &end)?),
    };
    if from >= to {
        return Ok(JsValue::from(""));
    }
    Ok(from_units(units.get(from as usize..to as usize).unwrap_or(&[])))
}

fn string_substring(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let units = coerce_this(realm, this)?.to_utf16();
    let start = clamped_position(realm, &arg(args, 0), units.len())?;
    let end = match arg(args, 1) {
        JsValue::Undefined => units.len(),
        end => clamped_position(realm, &end, units.len())?,
    };
    let (from, to) = (start.min(end), start.max(end));
    Ok(from_units(units.get(from..to).unwrap_or(&[])))
}

/// String.prototype.split(separator, limit) with string separators
fn string_split(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let s = coerce_this(realm, this)?;
    let limit = match arg(args, 1) {
        JsValue::Undefined => u32::MAX,
        limit => crate::operations::to_uint32(realm, &limit)?,
    } as usize;
    let separator = arg(args, 0);
    let separator = if separator.is_undefined() {
        None
    } else {
        Some(to_string(realm, &separator)?.to_utf16())
    };
    if limit == 0 {
        return Ok(JsValue::Object(create_array_from_list(realm, &[])?));
    }
    let Some(separator) = separator else {
        return Ok(JsValue::Object(create_array_from_list(realm, &[JsValue::String(s)])?));
    };

    let units = s.to_utf16();
    let mut parts = Vec::new();
    if separator.is_empty() {
        parts.extend(units.iter().take(limit).map(|unit| from_units(&[*unit])));
        return Ok(JsValue::Object(create_array_from_list(realm, &parts)?));
    }
    let mut start = 0;
    while let Some(found) = find_units(&units, &separator, start) {
        parts.push(from_units(units.get(start..found).unwrap_or(&[])));
        if parts.len() >= limit {
            return Ok(JsValue::Object(create_array_from_list(realm, &parts)?));
        }
        start = found + separator.len();
    }
    parts.push(from_units(units.get(start..).unwrap_or(&[])));
    Ok(JsValue::Object(create_array_from_list(realm, &parts)?))
}

fn string_to_lower_case(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::from(coerce_this(realm, this)?.as_str().to_lowercase()))
}

fn string_to_upper_case(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::from(coerce_this(realm, this)?.as_str().to_uppercase()))
}

fn string_trim(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::from(trim_js_whitespace(coerce_this(realm, this)?.as_str())))
}

fn is_js_whitespace(c: char) -> bool {
    trim_js_whitespace(c.encode_utf8(&mut [0; 4])).is_empty()
}

fn string_trim_start(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::from(coerce_this(realm, this)?.as_str().trim_start_matches(is_js_whitespace)))
}

fn string_trim_end(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Ok(JsValue::from(coerce_this(realm, this)?.as_str().trim_end_matches(is_js_whitespace)))
}

/// String.prototype[@@iterator]: yields code points, built on the generator machinery
fn string_iterator(
    realm: &mut Realm,
    this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let s = coerce_this(realm, this)?;
    let mut chars: Vec<JsValue> = char::decode_utf16(s.to_utf16())
        .map(|c| match c {
            Ok(c) => JsValue::from(c.to_string()),
            Err(e) => from_units(&[e.unpaired_surrogate()]),
        })
        .collect();
    chars.reverse();
    let body =
        move |_: &mut Realm, _: ObjectId, completion: Completion| -> JsResult<GeneratorStep> {
            match completion.kind() {
                CompletionType::Throw => Err(JsError::thrown(completion.value_or_undefined())),
                CompletionType::Return => {
                    Ok(GeneratorStep::Return(completion.value_or_undefined()))
                }
                _ => Ok(chars
                    .pop()
                    .map_or(GeneratorStep::Return(JsValue::Undefined), GeneratorStep::Yield)),
            }
        };
    Ok(JsValue::Object(create_generator(realm, Box::new(body))?))
}

fn string_from_char_code(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let mut units = Vec::with_capacity(args.len());
    for value in args {
        units.push(crate::operations::to_uint32(realm, value)? as u16);
    }
    Ok(from_units(&units))
}

fn string_from_code_point(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let mut result = String::new();
    for value in args {
        let n = to_number(realm, value)?;
        let c = (n.fract() == 0.0 && (0.0..=1_114_111.0).contains(&n))
            .then(|| char::from_u32(n as u32))
            .flatten()
            .ok_or_else(|| JsError::range_error(format!("Invalid code point {}", n)))?;
        result.push(c);
    }
    Ok(JsValue::from(result))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::HostConfig;
    use crate::operations::{invoke, iterable_to_list};
    use crate::value::PropertyKey;

    fn method(realm: &mut Realm, s: &str, name: &str, args: &[JsValue]) -> JsResult<JsValue> {
        invoke(realm, &JsValue::from(s), &PropertyKey::from(name), args)
    }

    #[test]
    fn test_slice_substring_and_at() {
        let mut realm = Realm::create(HostConfig::default());
        let r = method(&mut realm, "hello", "slice", &[JsValue::Number(-3.0)]).unwrap();
        assert_eq!(r, JsValue::from("llo"));
        let r = method(
            &mut realm,
            "hello",
            "substring",
            &[JsValue::Number(4.0), JsValue::Number(1.0)],
        )
        .unwrap();
        assert_eq!(r, JsValue::from("ell"));
        let r = method(&mut realm, "hello", "at", &[JsValue::Number(-1.0)]).unwrap();
        assert_eq!(r, JsValue::from("o"));
    }

    #[test]
    fn test_search_methods() {
        let mut realm = Realm::create(HostConfig::default());
        let r = method(&mut realm, "abcabc", "indexOf", &[JsValue::from("c"), JsValue::Number(3.0)])
            .unwrap();
        assert_eq!(r, JsValue::Number(5.0));
        let r = method(&mut realm, "abcabc", "lastIndexOf", &[JsValue::from("a")]).unwrap();
        assert_eq!(r, JsValue::Number(3.0));
        let r = method(
            &mut realm,
            "abcabc",
            "startsWith",
            &[JsValue::from("ca"), JsValue::Number(2.0)],
        )
        .unwrap();
        assert_eq!(r, JsValue::Boolean(true));
        let r = method(
            &mut realm,
            "abcabc",
            "endsWith",
            &[JsValue::from("ab"), JsValue::Number(5.0)],
        )
        .unwrap();
        assert_eq!(r, JsValue::Boolean(true));
    }

    #[test]
    fn test_split_and_pad() {
        let mut realm = Realm::create(HostConfig::default());
        let parts = method(&mut realm, "a,b,,c", "split", &[JsValue::from(",")]).unwrap();
        let parts = iterable_to_list(&mut realm, &parts).unwrap();
        assert_eq!(
            parts,
            vec![JsValue::from("a"), JsValue::from("b"), JsValue::from(""), JsValue::from("c")],
        );
        let r = method(&mut realm, "5", "padStart", &[JsValue::Number(3.0), JsValue::from("0")])
            .unwrap();
        assert_eq!(r, JsValue::from("005"));
        let err = method(&mut realm, "x", "repeat", &[JsValue::Number(-1.0)]).unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_string_iterator_yields_code_points() {
        let mut realm = Realm::create(HostConfig::default());
        let chars = iterable_to_list(&mut realm, &JsValue::from("a😀")).unwrap();
        assert_eq!(chars, vec![JsValue::from("a"), JsValue::from("😀")]);
    }

    #[test]
    fn test_constructor_and_value_of() {
        let mut realm = Realm::create(HostConfig::default());
        let string = realm.intrinsics.string;
        let wrapper = crate::function::construct(&mut realm, string, &[JsValue::Number(12.0)], None)
            .unwrap();
        let r = invoke(&mut realm, &JsValue::Object(wrapper), &PropertyKey::from("valueOf"), &[])
            .unwrap();
        assert_eq!(r, JsValue::from("12"));
        let sym = realm.new_symbol(Some(JsString::from("tag")));
        let r = crate::function::call(
            &mut realm,
            &JsValue::Object(string),
            &JsValue::Undefined,
            &[JsValue::Symbol(sym)],
        )
        .unwrap();
        assert_eq!(r, JsValue::from("Symbol(tag)"));
        let proto = realm.intrinsics.string_prototype;
        let value_of = crate::operations::get(&mut realm, proto, &PropertyKey::from("valueOf"))
            .unwrap();
        let err = crate::function::call(&mut realm, &value_of, &JsValue::Number(1.0), &[])
            .unwrap_err();
        assert!(err.is_type_error());
    }
}
