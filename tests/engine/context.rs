//! Execution context stack and the cooperative timeout

use super::native;
use jsrealm::function::call;
use jsrealm::platform::{ManualTimeProvider, NoOpTimeProvider};
use jsrealm::{HostConfig, JsError, JsResult, JsValue, ObjectId, Realm, RealmConfig};
use std::rc::Rc;
use std::time::Duration;

fn realm_with_clock(timeout_ms: u64, interval: u32) -> (Realm, Rc<ManualTimeProvider>) {
    let clock = Rc::new(ManualTimeProvider::new());
    let config = RealmConfig::default()
        .with_timeout_ms(timeout_ms)
        .with_timeout_check_interval(interval);
    let realm = Realm::create(HostConfig::new(config).with_time_provider(clock.clone()));
    (realm, clock)
}

fn checkpoint_forever(
    realm: &mut Realm,
    _this: &JsValue,
    _args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    loop {
        realm.check_timeout()?;
    }
}

#[test]
fn test_push_suspends_caller_and_pop_resumes_it() {
    let mut realm = super::create_test_realm();
    realm
        .execute(|realm| {
            let root = realm.running_context()?.id();
            let callee = realm.new_context();
            let callee_id = callee.id();
            realm.push_context(callee);
            assert_eq!(realm.context_depth(), 2);
            assert_eq!(realm.running_context()?.id(), callee_id);
            assert!(!realm.running_context()?.is_suspended());

            let popped = realm.pop_context()?;
            assert_eq!(popped.id(), callee_id);
            assert_eq!(realm.running_context()?.id(), root);
            assert!(!realm.running_context()?.is_suspended());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_execute_unwinds_leftover_contexts() {
    let mut realm = super::create_test_realm();
    realm
        .execute(|realm| {
            let first = realm.new_context();
            realm.push_context(first);
            let second = realm.new_context();
            realm.push_context(second);
            Ok(())
        })
        .unwrap();
    assert_eq!(realm.context_depth(), 1);
    assert!(realm.running_context().unwrap().is_suspended());
}

#[test]
fn test_runaway_evaluation_times_out() {
    let (mut realm, clock) = realm_with_clock(100, 1);
    let spin = native(&mut realm, checkpoint_forever, "spin", 0);
    let err = realm
        .execute(|realm| {
            clock.advance(Duration::from_millis(150));
            call(realm, &spin, &JsValue::Undefined, &[])
        })
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(!err.is_catchable());
    assert!(matches!(err, JsError::Timeout { timeout_ms: 100, elapsed_ms: 150 }));

    // An aborted realm refuses further work
    assert!(realm.is_aborted());
    assert!(matches!(realm.execute(|_| Ok(())), Err(JsError::Timeout { .. })));
}

#[test]
fn test_clock_is_sampled_every_interval() {
    let (mut realm, clock) = realm_with_clock(10, 4);
    let result = realm.execute(|realm| {
        clock.advance(Duration::from_millis(20));
        for _ in 0..3 {
            realm.check_timeout()?;
        }
        Ok(())
    });
    assert!(result.is_ok());

    let err = realm
        .execute(|realm| {
            clock.advance(Duration::from_millis(20));
            for _ in 0..4 {
                realm.check_timeout()?;
            }
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, JsError::Timeout { timeout_ms: 10, .. }));
}

#[test]
fn test_zero_timeout_disables_the_budget() {
    let (mut realm, clock) = realm_with_clock(0, 1);
    realm
        .execute(|realm| {
            clock.advance(Duration::from_secs(3600));
            realm.check_timeout()
        })
        .unwrap();
    assert!(!realm.is_aborted());
}

#[test]
fn test_suspended_time_is_not_charged() {
    let (mut realm, clock) = realm_with_clock(10, 1);
    realm
        .execute(|realm| {
            clock.advance(Duration::from_millis(6));
            realm.check_timeout()?;

            // The root is suspended while the callee runs, so the 3ms are charged once.
            let callee = realm.new_context();
            let callee_id = callee.id();
            realm.push_context(callee);
            clock.advance(Duration::from_millis(3));
            realm.check_timeout()?;
            let popped = realm.pop_context()?;
            assert_eq!(popped.id(), callee_id);
            let now = realm.now();
            assert_eq!(popped.active_time(now), Duration::from_millis(3));
            realm.check_timeout()
        })
        .unwrap();
}

#[test]
fn test_checkpoints_outside_execute_are_free() {
    let (mut realm, clock) = realm_with_clock(10, 1);
    clock.advance(Duration::from_secs(10));
    assert!(realm.check_timeout().is_ok());
    assert!(!realm.is_aborted());
}

#[test]
fn test_frozen_clock_never_times_out() {
    let config = RealmConfig::default().with_timeout_ms(1).with_timeout_check_interval(1);
    let mut realm = Realm::create(
        HostConfig::new(config).with_time_provider(Rc::new(NoOpTimeProvider)),
    );
    realm
        .execute(|realm| {
            for _ in 0..1000 {
                realm.check_timeout()?;
            }
            Ok(())
        })
        .unwrap();
}
