//! Promise settlement and the job queue

use super::{create_test_realm, native, obj};
use jsrealm::builtins::promise::{PromiseState, new_promise_capability, promise_state};
use jsrealm::function::{call, construct};
use jsrealm::object::get_prototype_of;
use jsrealm::operations::{create_data_property_or_throw, get, invoke, to_string};
use jsrealm::{JsError, JsResult, JsValue, ObjectId, PropertyKey, Realm};

/// Append `entry` to the comma-separated global `log` string
fn append(realm: &mut Realm, entry: String) -> JsResult<()> {
    let global = realm.global_object();
    let key = PropertyKey::from("log");
    let current = get(realm, global, &key)?;
    let next = if current.is_undefined() {
        entry
    } else {
        format!("{},{}", to_string(realm, &current)?.as_str(), entry)
    };
    create_data_property_or_throw(realm, global, &key, JsValue::from(next))
}

fn log_of(realm: &mut Realm) -> String {
    let global = realm.global_object();
    let value = get(realm, global, &PropertyKey::from("log")).unwrap();
    to_string(realm, &value).unwrap().as_str().to_string()
}

macro_rules! logger {
    ($name:ident, $tag:expr) => {
        fn $name(
            realm: &mut Realm,
            _this: &JsValue,
            args: &[JsValue],
            _nt: Option<ObjectId>,
        ) -> JsResult<JsValue> {
            let value = args.first().cloned().unwrap_or(JsValue::Undefined);
            let text = to_string(realm, &value)?;
            append(realm, format!("{}{}", $tag, text.as_str()))?;
            Ok(value)
        }
    };
}

logger!(log_a, "a");
logger!(log_b, "b");
logger!(log_c, "c");

fn throwing_executor(
    _realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    Err(JsError::type_error("executor failed"))
}

fn resolve_then_throw(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let resolve = args.first().cloned().unwrap_or(JsValue::Undefined);
    call(realm, &resolve, &JsValue::Undefined, &[JsValue::Number(5.0)])?;
    Err(JsError::thrown(JsValue::from("ignored")))
}

fn then_with_42(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let resolve = args.first().cloned().unwrap_or(JsValue::Undefined);
    call(realm, &resolve, &JsValue::Undefined, &[JsValue::Number(42.0)])
}

fn resolved(realm: &mut Realm, value: JsValue) -> JsValue {
    let promise = JsValue::Object(realm.intrinsics.promise);
    invoke(realm, &promise, &PropertyKey::from("resolve"), &[value]).unwrap()
}

fn then(realm: &mut Realm, promise: &JsValue, handler: JsValue) -> JsValue {
    invoke(realm, promise, &PropertyKey::from("then"), &[handler]).unwrap()
}

fn new_promise(realm: &mut Realm, executor: JsValue) -> ObjectId {
    let ctor = realm.intrinsics.promise;
    construct(realm, ctor, &[executor], None).unwrap()
}

#[test]
fn test_reactions_run_in_fifo_order() {
    let mut realm = create_test_realm();
    let p1 = resolved(&mut realm, JsValue::Number(1.0));
    let p2 = resolved(&mut realm, JsValue::Number(2.0));
    let a = native(&mut realm, log_a, "a", 1);
    let b = native(&mut realm, log_b, "b", 1);
    let c = native(&mut realm, log_c, "c", 1);
    then(&mut realm, &p1, a);
    then(&mut realm, &p2, b);
    then(&mut realm, &p1, c);
    assert_eq!(realm.pending_jobs(), 3);
    assert_eq!(realm.run_jobs().unwrap(), 3);
    assert_eq!(log_of(&mut realm), "a1,b2,c1");
}

#[test]
fn test_chained_reactions_queue_behind_existing_jobs() {
    let mut realm = create_test_realm();
    let p = resolved(&mut realm, JsValue::Number(1.0));
    let q = resolved(&mut realm, JsValue::Number(2.0));
    let a = native(&mut realm, log_a, "a", 1);
    let b = native(&mut realm, log_b, "b", 1);
    let c = native(&mut realm, log_c, "c", 1);
    let derived = then(&mut realm, &p, a);
    then(&mut realm, &derived, b);
    then(&mut realm, &q, c);
    realm.run_jobs().unwrap();
    assert_eq!(log_of(&mut realm), "a1,c2,b1");
}

#[test]
fn test_executor_error_rejects() {
    let mut realm = create_test_realm();
    let executor = native(&mut realm, throwing_executor, "executor", 2);
    let promise = new_promise(&mut realm, executor);
    let (state, reason) = promise_state(&realm, promise).unwrap();
    assert_eq!(state, PromiseState::Rejected);
    let reason = reason.as_object().unwrap();
    assert_eq!(
        get_prototype_of(&mut realm, reason).unwrap(),
        Some(realm.intrinsics.type_error_prototype)
    );
}

#[test]
fn test_error_after_resolve_is_ignored() {
    let mut realm = create_test_realm();
    let executor = native(&mut realm, resolve_then_throw, "executor", 2);
    let promise = new_promise(&mut realm, executor);
    assert_eq!(
        promise_state(&realm, promise).unwrap(),
        (PromiseState::Fulfilled, JsValue::Number(5.0))
    );
}

#[test]
fn test_thenable_is_adopted_in_a_job() {
    let mut realm = create_test_realm();
    let then_fn = native(&mut realm, then_with_42, "then", 2);
    let thenable = JsValue::Object(obj(&mut realm, &[("then", then_fn)]));
    let promise = resolved(&mut realm, thenable).as_object().unwrap();
    assert_eq!(promise_state(&realm, promise).unwrap().0, PromiseState::Pending);
    realm.run_jobs().unwrap();
    assert_eq!(
        promise_state(&realm, promise).unwrap(),
        (PromiseState::Fulfilled, JsValue::Number(42.0))
    );
}

#[test]
fn test_self_resolution_rejects_with_type_error() {
    let mut realm = create_test_realm();
    let ctor = JsValue::Object(realm.intrinsics.promise);
    let capability = new_promise_capability(&mut realm, &ctor).unwrap();
    let itself = JsValue::Object(capability.promise);
    call(&mut realm, &capability.resolve, &JsValue::Undefined, &[itself]).unwrap();
    let (state, reason) = promise_state(&realm, capability.promise).unwrap();
    assert_eq!(state, PromiseState::Rejected);
    let reason = reason.as_object().unwrap();
    assert_eq!(
        get_prototype_of(&mut realm, reason).unwrap(),
        Some(realm.intrinsics.type_error_prototype)
    );
}

#[test]
fn test_missing_handlers_pass_values_through() {
    let mut realm = create_test_realm();
    let p = resolved(&mut realm, JsValue::from("kept"));
    let derived = then(&mut realm, &p, JsValue::Undefined).as_object().unwrap();
    realm.run_jobs().unwrap();
    assert_eq!(
        promise_state(&realm, derived).unwrap(),
        (PromiseState::Fulfilled, JsValue::from("kept"))
    );
}

#[test]
fn test_unhandled_rejection_does_not_stop_the_queue() {
    let mut realm = create_test_realm();
    let promise = JsValue::Object(realm.intrinsics.promise);
    let rejected = invoke(
        &mut realm,
        &promise,
        &PropertyKey::from("reject"),
        &[JsValue::from("no")],
    )
    .unwrap();
    // A rejected derived promise with no handler of its own
    let a = native(&mut realm, log_a, "a", 1);
    then(&mut realm, &rejected, a);
    let p = resolved(&mut realm, JsValue::Number(3.0));
    let b = native(&mut realm, log_b, "b", 1);
    then(&mut realm, &p, b);
    assert_eq!(realm.run_jobs().unwrap(), 2);
    assert_eq!(log_of(&mut realm), "b3");
}
