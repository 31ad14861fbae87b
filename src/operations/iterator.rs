//! Iterator protocol operations

use super::object::{create_data_property_or_throw, get, get_method};
use crate::error::{JsError, JsResult};
use crate::function::call;
use crate::object::ordinary_object_create;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey, WellKnownSymbol};

/// Iterator Record
#[derive(Debug, Clone)]
pub struct IteratorRecord {
    pub iterator: ObjectId,
    pub next_method: JsValue,
    pub done: bool,
}

/// `GetIteratorFromMethod(obj, method)`
pub fn get_iterator_from_method(
    realm: &mut Realm,
    value: &JsValue,
    method: &JsValue,
) -> JsResult<IteratorRecord> {
    let iterator = call(realm, method, value, &[])?;
    let JsValue::Object(iterator) = iterator else {
        return Err(JsError::type_error("Result of the Symbol.iterator method is not an object"));
    };
    let next_method = get(realm, iterator, &PropertyKey::from("next"))?;
    Ok(IteratorRecord {
        iterator,
        next_method,
        done: false,
    })
}

/// `GetIterator(obj, sync)`
pub fn get_iterator(realm: &mut Realm, value: &JsValue) -> JsResult<IteratorRecord> {
    let Some(method) = get_method(realm, value, &WellKnownSymbol::Iterator.key())? else {
        return Err(JsError::type_error(format!("{:?} is not iterable", value)));
    };
    get_iterator_from_method(realm, value, &method)
}

/// `IteratorNext(iteratorRecord, value)`
pub fn iterator_next(
    realm: &mut Realm,
    record: &mut IteratorRecord,
    value: Option<JsValue>,
) -> JsResult<ObjectId> {
    let args: Vec<JsValue> = value.into_iter().collect();
    let result = match call(realm, &record.next_method, &JsValue::Object(record.iterator), &args) {
        Ok(result) => result,
        Err(err) => {
            record.done = true;
            return Err(err);
        }
    };
    match result {
        JsValue::Object(result) => Ok(result),
        other => {
            record.done = true;
            Err(JsError::type_error(format!(
                "Iterator result {:?} is not an object",
                other
            )))
        }
    }
}

/// `IteratorComplete(iterResult)`
pub fn iterator_complete(realm: &mut Realm, result: ObjectId) -> JsResult<bool> {
    Ok(get(realm, result, &PropertyKey::from("done"))?.to_boolean())
}

/// `IteratorValue(iterResult)`
pub fn iterator_value(realm: &mut Realm, result: ObjectId) -> JsResult<JsValue> {
    get(realm, result, &PropertyKey::from("value"))
}

/// `IteratorStep(iteratorRecord)`: the next result object, or `None` once done
pub fn iterator_step(realm: &mut Realm, record: &mut IteratorRecord) -> JsResult<Option<ObjectId>> {
    let result = iterator_next(realm, record, None)?;
    match iterator_complete(realm, result) {
        Ok(true) => {
            record.done = true;
            Ok(None)
        }
        Ok(false) => Ok(Some(result)),
        Err(err) => {
            record.done = true;
            Err(err)
        }
    }
}

/// `IteratorStepValue(iteratorRecord)`
pub fn iterator_step_value(
    realm: &mut Realm,
    record: &mut IteratorRecord,
) -> JsResult<Option<JsValue>> {
    let Some(result) = iterator_step(realm, record)? else {
        return Ok(None);
    };
    match iterator_value(realm, result) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            record.done = true;
            Err(err)
        }
    }
}

/// `IteratorClose(iteratorRecord, completion)`
///
/// A throw completion wins over anything `return()` does; otherwise a failing or
/// non-object `return()` result replaces the completion.
pub fn iterator_close(
    realm: &mut Realm,
    record: &IteratorRecord,
    completion: JsResult<JsValue>,
) -> JsResult<JsValue> {
    let iterator = JsValue::Object(record.iterator);
    let inner = match get_method(realm, &iterator, &PropertyKey::from("return")) {
        Ok(None) => return completion,
        Ok(Some(method)) => call(realm, &method, &iterator, &[]),
        Err(err) => Err(err),
    };
    if let Err(err) = &inner {
        if err.is_fatal() {
            return inner;
        }
    }
    let value = completion?;
    match inner? {
        JsValue::Object(_) => Ok(value),
        _ => Err(JsError::type_error("Iterator result is not an object")),
    }
}

/// `CreateIterResultObject(value, done)`
pub fn create_iter_result_object(
    realm: &mut Realm,
    value: JsValue,
    done: bool,
) -> JsResult<ObjectId> {
    let proto = Some(realm.intrinsics.object_prototype);
    let obj = ordinary_object_create(realm, proto);
    create_data_property_or_throw(realm, obj, &PropertyKey::from("value"), value)?;
    create_data_property_or_throw(realm, obj, &PropertyKey::from("done"), JsValue::Boolean(done))?;
    Ok(obj)
}

/// `IteratorToList(GetIterator(items))`
pub fn iterable_to_list(realm: &mut Realm, items: &JsValue) -> JsResult<Vec<JsValue>> {
    let mut record = get_iterator(realm, items)?;
    let mut values = Vec::new();
    while let Some(value) = iterator_step_value(realm, &mut record)? {
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::create_array_from_list;
    use crate::host::HostConfig;

    #[test]
    fn test_array_is_iterable() {
        let mut realm = Realm::create(HostConfig::default());
        let values = [JsValue::Number(1.0), JsValue::from("two")];
        let array = create_array_from_list(&mut realm, &values).unwrap();
        let list = iterable_to_list(&mut realm, &JsValue::Object(array)).unwrap();
        assert_eq!(list, values);
    }

    #[test]
    fn test_non_iterable() {
        let mut realm = Realm::create(HostConfig::default());
        let obj = ordinary_object_create(&mut realm, None);
        let err = iterable_to_list(&mut realm, &JsValue::Object(obj)).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_iter_result_shape() {
        let mut realm = Realm::create(HostConfig::default());
        let result = create_iter_result_object(&mut realm, JsValue::Null, true).unwrap();
        assert!(iterator_complete(&mut realm, result).unwrap());
        assert!(iterator_value(&mut realm, result).unwrap().is_null());
    }

    #[test]
    fn test_close_without_return_keeps_completion() {
        let mut realm = Realm::create(HostConfig::default());
        let array = create_array_from_list(&mut realm, &[]).unwrap();
        let record = get_iterator(&mut realm, &JsValue::Object(array)).unwrap();
        let thrown = iterator_close(&mut realm, &record, Err(JsError::type_error("x")))
            .unwrap_err();
        assert!(thrown.is_type_error());
        let ok = iterator_close(&mut realm, &record, Ok(JsValue::Number(1.0))).unwrap();
        assert_eq!(ok, JsValue::Number(1.0));
    }
}
