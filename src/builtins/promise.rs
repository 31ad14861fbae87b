//! Promise objects, capabilities and reaction jobs
//!
//! Reactions never run synchronously: settling a promise queues one job per
//! reaction on the realm, and `Realm::run_jobs` drains them in FIFO order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use super::array::define_to_string_tag;
use super::{arg, create_constructor, register_method};
use crate::error::{JsError, JsResult};
use crate::function::{
    FunctionData, call, construct, create_internal_function, is_callable, is_constructor,
    ordinary_create_from_constructor,
};
use crate::object::ObjectKind;
use crate::operations::{get, invoke, same_value, species_constructor};
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId, PropertyKey};

/// `[[PromiseState]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    Pending,
    Fulfilled,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReactionType {
    Fulfill,
    Reject,
}

/// `PromiseCapability Record`
#[derive(Debug, Clone)]
pub struct PromiseCapability {
    pub promise: ObjectId,
    pub resolve: JsValue,
    pub reject: JsValue,
}

/// `PromiseReaction Record`
#[derive(Debug, Clone)]
struct PromiseReaction {
    capability: Option<PromiseCapability>,
    kind: ReactionType,
    handler: Option<JsValue>,
}

/// Internal slots of a promise instance
#[derive(Debug)]
pub struct PromiseData {
    pub state: PromiseState,
    pub result: JsValue,
    pub is_handled: bool,
    fulfill_reactions: Vec<PromiseReaction>,
    reject_reactions: Vec<PromiseReaction>,
}

impl PromiseData {
    pub fn new() -> Self {
        Self {
            state: PromiseState::Pending,
            result: JsValue::Undefined,
            is_handled: false,
            fulfill_reactions: Vec::new(),
            reject_reactions: Vec::new(),
        }
    }
}

impl Default for PromiseData {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve/reject slots filled in by a `GetCapabilitiesExecutor` function
#[derive(Debug, Default)]
pub struct CapabilitySlots {
    resolve: JsValue,
    reject: JsValue,
}

pub fn init_promise(realm: &mut Realm) -> JsResult<()> {
    let proto = realm.intrinsics.promise_prototype;
    register_method(realm, proto, "catch", promise_catch, 1)?;
    register_method(realm, proto, "then", promise_then, 2)?;
    define_to_string_tag(realm, proto, "Promise")?;

    let ctor = create_constructor(realm, promise_constructor, 1, "Promise", proto)?;
    realm.intrinsics.promise = ctor;
    register_method(realm, ctor, "reject", promise_reject_static, 1)?;
    register_method(realm, ctor, "resolve", promise_resolve_static, 1)?;
    super::symbol::register_species_getter(realm, ctor)?;
    Ok(())
}

fn promise_data(realm: &mut Realm, promise: ObjectId) -> JsResult<&mut PromiseData> {
    match &mut realm.heap.get_mut(promise)?.kind {
        ObjectKind::Promise(data) => Ok(data),
        _ => Err(JsError::type_error("not a promise")),
    }
}

fn is_promise(realm: &Realm, value: &JsValue) -> JsResult<bool> {
    match value {
        JsValue::Object(obj) => Ok(matches!(realm.heap.get(*obj)?.kind, ObjectKind::Promise(_))),
        _ => Ok(false),
    }
}

/// State and result of a promise, for hosts and tests
pub fn promise_state(realm: &Realm, promise: ObjectId) -> JsResult<(PromiseState, JsValue)> {
    match &realm.heap.get(promise)?.kind {
        ObjectKind::Promise(data) => Ok((data.state, data.result.clone())),
        _ => Err(JsError::type_error("not a promise")),
    }
}

/// Turn a catchable error into its thrown value; fatal errors propagate
fn thrown_value(realm: &mut Realm, err: JsError) -> JsResult<JsValue> {
    if err.is_catchable() {
        realm.error_to_value(err)
    } else {
        Err(err)
    }
}

// =============================================================================
// Abstract operations
// =============================================================================

/// `CreateResolvingFunctions(promise)`
pub fn create_resolving_functions(
    realm: &mut Realm,
    promise: ObjectId,
) -> JsResult<(ObjectId, ObjectId)> {
    let already_resolved = Rc::new(Cell::new(false));
    let resolve = create_internal_function(
        realm,
        FunctionData::PromiseResolve {
            promise,
            already_resolved: already_resolved.clone(),
        },
        1,
    )?;
    let reject = create_internal_function(
        realm,
        FunctionData::PromiseReject {
            promise,
            already_resolved,
        },
        1,
    )?;
    Ok((resolve, reject))
}

/// Promise resolve function steps
pub(crate) fn call_resolve_function(
    realm: &mut Realm,
    promise: ObjectId,
    already_resolved: &Rc<Cell<bool>>,
    resolution: JsValue,
) -> JsResult<JsValue> {
    if already_resolved.replace(true) {
        return Ok(JsValue::Undefined);
    }
    if same_value(&resolution, &JsValue::Object(promise)) {
        let err = realm.error_to_value(JsError::type_error("Chaining cycle detected for promise"))?;
        reject_promise(realm, promise, err)?;
        return Ok(JsValue::Undefined);
    }
    let JsValue::Object(thenable) = resolution else {
        fulfill_promise(realm, promise, resolution)?;
        return Ok(JsValue::Undefined);
    };
    let then = match get(realm, thenable, &PropertyKey::from("then")) {
        Ok(then) => then,
        Err(err) => {
            let reason = thrown_value(realm, err)?;
            reject_promise(realm, promise, reason)?;
            return Ok(JsValue::Undefined);
        }
    };
    if !is_callable(realm, &then) {
        fulfill_promise(realm, promise, resolution)?;
        return Ok(JsValue::Undefined);
    }
    // NewPromiseResolveThenableJob
    realm.enqueue_job(Box::new(move |realm: &mut Realm| {
        let (resolve, reject) = create_resolving_functions(realm, promise)?;
        let result = call(
            realm,
            &then,
            &JsValue::Object(thenable),
            &[JsValue::Object(resolve), JsValue::Object(reject)],
        );
        if let Err(err) = result {
            let reason = thrown_value(realm, err)?;
            call(realm, &JsValue::Object(reject), &JsValue::Undefined, &[reason])?;
        }
        Ok(())
    }));
    Ok(JsValue::Undefined)
}

/// Promise reject function steps
pub(crate) fn call_reject_function(
    realm: &mut Realm,
    promise: ObjectId,
    already_resolved: &Rc<Cell<bool>>,
    reason: JsValue,
) -> JsResult<JsValue> {
    if already_resolved.replace(true) {
        return Ok(JsValue::Undefined);
    }
    reject_promise(realm, promise, reason)?;
    Ok(JsValue::Undefined)
}

/// `GetCapabilitiesExecutor` function steps
pub(crate) fn call_capability_executor(
    _realm: &mut Realm,
    slots: &Rc<RefCell<CapabilitySlots>>,
    args: &[JsValue],
) -> JsResult<JsValue> {
    let mut slots = slots.borrow_mut();
    if !slots.resolve.is_undefined() || !slots.reject.is_undefined() {
        return Err(JsError::type_error("Promise executor has already been invoked"));
    }
    slots.resolve = arg(args, 0);
    slots.reject = arg(args, 1);
    Ok(JsValue::Undefined)
}

fn settle(
    realm: &mut Realm,
    promise: ObjectId,
    state: PromiseState,
    value: JsValue,
) -> JsResult<()> {
    let data = promise_data(realm, promise)?;
    if data.state != PromiseState::Pending {
        return Err(JsError::internal("settling a promise that is already settled"));
    }
    let fulfill = std::mem::take(&mut data.fulfill_reactions);
    let reject = std::mem::take(&mut data.reject_reactions);
    data.state = state;
    data.result = value.clone();
    let unhandled = state == PromiseState::Rejected && !data.is_handled;
    trace!(?promise, ?state, "promise settled");
    if unhandled {
        trace!(?promise, "promise rejected without a handler");
    }
    let reactions = if state == PromiseState::Fulfilled { fulfill } else { reject };
    for reaction in reactions {
        enqueue_reaction_job(realm, reaction, value.clone());
    }
    Ok(())
}

/// `FulfillPromise(promise, value)`
fn fulfill_promise(realm: &mut Realm, promise: ObjectId, value: JsValue) -> JsResult<()> {
    settle(realm, promise, PromiseState::Fulfilled, value)
}

/// `RejectPromise(promise, reason)`
fn reject_promise(realm: &mut Realm, promise: ObjectId, reason: JsValue) -> JsResult<()> {
    settle(realm, promise, PromiseState::Rejected, reason)
}

/// `NewPromiseReactionJob(reaction, argument)`, queued immediately
fn enqueue_reaction_job(realm: &mut Realm, reaction: PromiseReaction, argument: JsValue) {
    realm.enqueue_job(Box::new(move |realm: &mut Realm| {
        let result = match &reaction.handler {
            None => match reaction.kind {
                ReactionType::Fulfill => Ok(argument),
                ReactionType::Reject => Err(JsError::thrown(argument)),
            },
            Some(handler) => call(realm, handler, &JsValue::Undefined, &[argument]),
        };
        let Some(capability) = reaction.capability else {
            return result.map(|_| ());
        };
        match result {
            Ok(value) => call(realm, &capability.resolve, &JsValue::Undefined, &[value])?,
            Err(err) => {
                let reason = thrown_value(realm, err)?;
                call(realm, &capability.reject, &JsValue::Undefined, &[reason])?
            }
        };
        Ok(())
    }));
}

/// `NewPromiseCapability(C)`
pub fn new_promise_capability(
    realm: &mut Realm,
    constructor: &JsValue,
) -> JsResult<PromiseCapability> {
    let JsValue::Object(c) = constructor else {
        return Err(JsError::type_error("Promise capability requires a constructor"));
    };
    if !is_constructor(realm, constructor) {
        return Err(JsError::type_error("Promise capability requires a constructor"));
    }
    let slots = Rc::new(RefCell::new(CapabilitySlots::default()));
    let executor = create_internal_function(
        realm,
        FunctionData::CapabilityExecutor(slots.clone()),
        2,
    )?;
    let promise = construct(realm, *c, &[JsValue::Object(executor)], None)?;
    let slots = slots.borrow();
    if !is_callable(realm, &slots.resolve) {
        return Err(JsError::type_error("Promise resolve function is not callable"));
    }
    if !is_callable(realm, &slots.reject) {
        return Err(JsError::type_error("Promise reject function is not callable"));
    }
    Ok(PromiseCapability {
        promise,
        resolve: slots.resolve.clone(),
        reject: slots.reject.clone(),
    })
}

/// `PromiseResolve(C, x)`
pub fn promise_resolve(realm: &mut Realm, constructor: ObjectId, x: JsValue) -> JsResult<ObjectId> {
    if is_promise(realm, &x)? {
        if let JsValue::Object(promise) = x {
            let x_ctor = get(realm, promise, &PropertyKey::from("constructor"))?;
            if same_value(&x_ctor, &JsValue::Object(constructor)) {
                return Ok(promise);
            }
        }
    }
    let capability = new_promise_capability(realm, &JsValue::Object(constructor))?;
    call(realm, &capability.resolve, &JsValue::Undefined, &[x])?;
    Ok(capability.promise)
}

/// `PerformPromiseThen(promise, onFulfilled, onRejected, resultCapability)`
pub fn perform_promise_then(
    realm: &mut Realm,
    promise: ObjectId,
    on_fulfilled: &JsValue,
    on_rejected: &JsValue,
    capability: Option<PromiseCapability>,
) -> JsResult<JsValue> {
    let handler = |realm: &Realm, f: &JsValue| is_callable(realm, f).then(|| f.clone());
    let fulfill = PromiseReaction {
        capability: capability.clone(),
        kind: ReactionType::Fulfill,
        handler: handler(realm, on_fulfilled),
    };
    let reject = PromiseReaction {
        capability: capability.clone(),
        kind: ReactionType::Reject,
        handler: handler(realm, on_rejected),
    };

    let data = promise_data(realm, promise)?;
    let state = data.state;
    let result = data.result.clone();
    data.is_handled = true;
    match state {
        PromiseState::Pending => {
            data.fulfill_reactions.push(fulfill);
            data.reject_reactions.push(reject);
        }
        PromiseState::Fulfilled => enqueue_reaction_job(realm, fulfill, result),
        PromiseState::Rejected => enqueue_reaction_job(realm, reject, result),
    }
    Ok(capability.map_or(JsValue::Undefined, |c| JsValue::Object(c.promise)))
}

// =============================================================================
// Built-ins
// =============================================================================

/// new Promise(executor)
fn promise_constructor(
    realm: &mut Realm,
    _this: &JsValue,
    args: &[JsValue],
    nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let Some(new_target) = nt else {
        return Err(JsError::type_error("Promise constructor cannot be invoked without 'new'"));
    };
    let executor = arg(args, 0);
    if !is_callable(realm, &executor) {
        return Err(JsError::type_error("Promise resolver is not a function"));
    }
    let fallback = realm.intrinsics.promise_prototype;
    let promise = ordinary_create_from_constructor(
        realm,
        new_target,
        fallback,
        ObjectKind::Promise(PromiseData::new()),
    )?;
    let (resolve, reject) = create_resolving_functions(realm, promise)?;
    let completion = call(
        realm,
        &executor,
        &JsValue::Undefined,
        &[JsValue::Object(resolve), JsValue::Object(reject)],
    );
    if let Err(err) = completion {
        let reason = thrown_value(realm, err)?;
        call(realm, &JsValue::Object(reject), &JsValue::Undefined, &[reason])?;
    }
    Ok(JsValue::Object(promise))
}

/// Promise.prototype.then(onFulfilled, onRejected)
fn promise_then(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let promise = match this {
        JsValue::Object(obj) if is_promise(realm, this)? => *obj,
        _ => {
            return Err(JsError::type_error(
                "Promise.prototype.then called on incompatible receiver",
            ));
        }
    };
    let default = realm.intrinsics.promise;
    let c = species_constructor(realm, promise, default)?;
    let capability = new_promise_capability(realm, &JsValue::Object(c))?;
    perform_promise_then(realm, promise, &arg(args, 0), &arg(args, 1), Some(capability))
}

/// Promise.prototype.catch(onRejected)
fn promise_catch(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    invoke(realm, this, &PropertyKey::from("then"), &[JsValue::Undefined, arg(args, 0)])
}

/// Promise.resolve(x)
fn promise_resolve_static(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let JsValue::Object(c) = this else {
        return Err(JsError::type_error("Promise.resolve called on non-object"));
    };
    Ok(JsValue::Object(promise_resolve(realm, *c, arg(args, 0))?))
}

/// Promise.reject(r)
fn promise_reject_static(
    realm: &mut Realm,
    this: &JsValue,
    args: &[JsValue],
    _nt: Option<ObjectId>,
) -> JsResult<JsValue> {
    let capability = new_promise_capability(realm, this)?;
    call(realm, &capability.reject, &JsValue::Undefined, &[arg(args, 0)])?;
    Ok(JsValue::Object(capability.promise))
}
