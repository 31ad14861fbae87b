//! Generator state machine driven by closure bodies

use super::{create_test_realm, prop, throws_type_error};
use jsrealm::generator::{
    GeneratorBody, GeneratorState, GeneratorStep, create_generator, generator_resume,
    generator_resume_abrupt, generator_state,
};
use jsrealm::{Completion, CompletionType, JsError, JsResult, JsValue, ObjectId, Realm};
use std::cell::RefCell;
use std::rc::Rc;

/// Yields 1, 2, 3; records every completion it is resumed with
fn counting_body(log: Rc<RefCell<Vec<CompletionType>>>) -> Box<dyn GeneratorBody> {
    let mut next = 1.0;
    Box::new(move |_: &mut Realm, _: ObjectId, completion: Completion| -> JsResult<GeneratorStep> {
        log.borrow_mut().push(completion.kind());
        match completion.kind() {
            CompletionType::Return => {
                return Ok(GeneratorStep::Return(completion.value_or_undefined()));
            }
            CompletionType::Throw => return Err(JsError::thrown(completion.value_or_undefined())),
            _ => {}
        }
        if next > 3.0 {
            return Ok(GeneratorStep::Return(JsValue::from("done")));
        }
        let value = next;
        next += 1.0;
        Ok(GeneratorStep::Yield(JsValue::Number(value)))
    })
}

fn step(realm: &mut Realm, generator: ObjectId) -> (JsValue, JsValue) {
    let result = generator_resume(realm, &JsValue::Object(generator), JsValue::Undefined).unwrap();
    let result = result.as_object().unwrap();
    (prop(realm, result, "value"), prop(realm, result, "done"))
}

#[test]
fn test_states_through_a_full_run() {
    let mut realm = create_test_realm();
    let log = Rc::new(RefCell::new(Vec::new()));
    let generator = create_generator(&mut realm, counting_body(log.clone())).unwrap();
    assert_eq!(generator_state(&realm, generator).unwrap(), GeneratorState::SuspendedStart);

    assert_eq!(step(&mut realm, generator), (JsValue::Number(1.0), JsValue::Boolean(false)));
    assert_eq!(generator_state(&realm, generator).unwrap(), GeneratorState::SuspendedYield);
    step(&mut realm, generator);
    step(&mut realm, generator);
    assert_eq!(step(&mut realm, generator), (JsValue::from("done"), JsValue::Boolean(true)));
    assert_eq!(generator_state(&realm, generator).unwrap(), GeneratorState::Completed);

    // Completed generators answer without running the body
    assert_eq!(step(&mut realm, generator), (JsValue::Undefined, JsValue::Boolean(true)));
    assert_eq!(log.borrow().len(), 4);
}

#[test]
fn test_return_before_start_skips_body() {
    let mut realm = create_test_realm();
    let log = Rc::new(RefCell::new(Vec::new()));
    let generator = create_generator(&mut realm, counting_body(log.clone())).unwrap();
    let result = generator_resume_abrupt(
        &mut realm,
        &JsValue::Object(generator),
        Completion::return_(JsValue::Number(9.0)),
    )
    .unwrap()
    .as_object()
    .unwrap();
    assert_eq!(prop(&mut realm, result, "value"), JsValue::Number(9.0));
    assert_eq!(prop(&mut realm, result, "done"), JsValue::Boolean(true));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_throw_at_yield_reaches_body() {
    let mut realm = create_test_realm();
    let log = Rc::new(RefCell::new(Vec::new()));
    let generator = create_generator(&mut realm, counting_body(log.clone())).unwrap();
    step(&mut realm, generator);
    let err = generator_resume_abrupt(
        &mut realm,
        &JsValue::Object(generator),
        Completion::throw(JsValue::from("boom")),
    )
    .unwrap_err();
    assert!(matches!(err, JsError::Thrown { ref value, .. } if *value == JsValue::from("boom")));
    assert_eq!(generator_state(&realm, generator).unwrap(), GeneratorState::Completed);
    assert_eq!(log.borrow().last(), Some(&CompletionType::Throw));
}

#[test]
fn test_reentrant_resume_is_type_error() {
    let mut realm = create_test_realm();
    let body: Box<dyn GeneratorBody> = Box::new(
        |realm: &mut Realm, generator: ObjectId, _: Completion| -> JsResult<GeneratorStep> {
            let nested = generator_resume(realm, &JsValue::Object(generator), JsValue::Undefined);
            Ok(GeneratorStep::Return(JsValue::Boolean(throws_type_error(nested))))
        },
    );
    let generator = create_generator(&mut realm, body).unwrap();
    assert_eq!(step(&mut realm, generator).0, JsValue::Boolean(true));
}

#[test]
fn test_non_generator_receiver() {
    let mut realm = create_test_realm();
    assert!(throws_type_error(generator_resume(
        &mut realm,
        &JsValue::Number(1.0),
        JsValue::Undefined,
    )));
    let plain = JsValue::Object(super::obj(&mut realm, &[]));
    assert!(throws_type_error(generator_resume(&mut realm, &plain, JsValue::Undefined)));
}

#[test]
fn test_context_stack_is_restored_after_yield() {
    let mut realm = create_test_realm();
    let depth = realm.context_depth();
    let log = Rc::new(RefCell::new(Vec::new()));
    let generator = create_generator(&mut realm, counting_body(log)).unwrap();
    step(&mut realm, generator);
    assert_eq!(realm.context_depth(), depth);
}
