//! Generator objects
//!
//! There are no native coroutines underneath: a generator body is a resumable state
//! machine ([`GeneratorBody`]) stored as the continuation of the generator's own
//! execution context. Resuming pushes that context, hands the body the resumption
//! completion and runs it until it yields or finishes; yielding pops the context
//! again and keeps the body as the next continuation.

use std::fmt;

use tracing::trace;

use crate::completion::{Completion, CompletionType};
use crate::context::ExecutionContext;
use crate::error::{JsError, JsResult};
use crate::object::ObjectKind;
use crate::operations::create_iter_result_object;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectId};

/// `[[GeneratorState]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Allocated but `GeneratorStart` has not run yet
    None,
    SuspendedStart,
    SuspendedYield,
    Executing,
    Completed,
}

/// Outcome of running a generator body up to its next suspension point
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorStep {
    /// `yield value`
    Yield(JsValue),
    /// The body finished, by `return value` or by falling off the end (`undefined`)
    Return(JsValue),
}

/// A generator body
///
/// `resume` receives the completion the generator was resumed with: a normal
/// completion for `next(v)`, or a return/throw completion for `return(v)` and
/// `throw(e)` delivered at the `yield` the body is suspended in. Throwing from the
/// body is an `Err`.
pub trait GeneratorBody {
    fn resume(
        &mut self,
        realm: &mut Realm,
        generator: ObjectId,
        completion: Completion,
    ) -> JsResult<GeneratorStep>;
}

impl<F> GeneratorBody for F
where
    F: FnMut(&mut Realm, ObjectId, Completion) -> JsResult<GeneratorStep>,
{
    fn resume(
        &mut self,
        realm: &mut Realm,
        generator: ObjectId,
        completion: Completion,
    ) -> JsResult<GeneratorStep> {
        self(realm, generator, completion)
    }
}

/// Internal slots of a generator instance
pub struct GeneratorData {
    pub state: GeneratorState,
    /// `[[GeneratorContext]]`, parked here while the generator is not running
    pub(crate) context: Option<ExecutionContext>,
}

impl GeneratorData {
    pub fn new() -> Self {
        Self {
            state: GeneratorState::None,
            context: None,
        }
    }
}

impl Default for GeneratorData {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GeneratorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorData").field("state", &self.state).finish_non_exhaustive()
    }
}

fn generator_data(realm: &mut Realm, generator: ObjectId) -> JsResult<&mut GeneratorData> {
    match &mut realm.heap.get_mut(generator)?.kind {
        ObjectKind::Generator(data) => Ok(data),
        _ => Err(JsError::type_error("not a generator object")),
    }
}

fn set_state(realm: &mut Realm, generator: ObjectId, state: GeneratorState) -> JsResult<()> {
    let data = generator_data(realm, generator)?;
    trace!(?generator, from = ?data.state, to = ?state, "generator state");
    data.state = state;
    Ok(())
}

/// `GeneratorStart(generator, generatorBody)`
///
/// Captures the running context's function, script and environments into the
/// generator's own context, with `body` as its first continuation.
pub fn generator_start(
    realm: &mut Realm,
    generator: ObjectId,
    body: Box<dyn GeneratorBody>,
) -> JsResult<()> {
    let mut context = realm.new_context();
    {
        let running = realm.running_context()?;
        context.function = running.function;
        context.script_or_module = running.script_or_module.clone();
        context.lexical_environment = running.lexical_environment;
        context.variable_environment = running.variable_environment;
    }
    context.generator = Some(generator);
    context.continuation = Some(body);
    let data = generator_data(realm, generator)?;
    if data.state != GeneratorState::None {
        return Err(JsError::internal("generator started twice"));
    }
    data.context = Some(context);
    set_state(realm, generator, GeneratorState::SuspendedStart)
}

/// `GeneratorValidate(generator)`
pub fn generator_validate(
    realm: &mut Realm,
    generator: &JsValue,
) -> JsResult<(ObjectId, GeneratorState)> {
    let JsValue::Object(obj) = generator else {
        return Err(JsError::type_error(format!("{:?} is not a generator object", generator)));
    };
    let state = generator_data(realm, *obj)?.state;
    if state == GeneratorState::Executing {
        return Err(JsError::type_error("Generator is already running"));
    }
    Ok((*obj, state))
}

/// `GeneratorResume(generator, value)`
pub fn generator_resume(
    realm: &mut Realm,
    generator: &JsValue,
    value: JsValue,
) -> JsResult<JsValue> {
    let (generator, state) = generator_validate(realm, generator)?;
    if state == GeneratorState::Completed {
        let result = create_iter_result_object(realm, JsValue::Undefined, true)?;
        return Ok(JsValue::Object(result));
    }
    run_body(realm, generator, Completion::normal(value))
}

/// `GeneratorResumeAbrupt(generator, abruptCompletion)`
pub fn generator_resume_abrupt(
    realm: &mut Realm,
    generator: &JsValue,
    completion: Completion,
) -> JsResult<JsValue> {
    let (generator, mut state) = generator_validate(realm, generator)?;
    if state == GeneratorState::SuspendedStart {
        if let Some(mut context) = generator_data(realm, generator)?.context.take() {
            context.detach();
        }
        set_state(realm, generator, GeneratorState::Completed)?;
        state = GeneratorState::Completed;
    }
    if state == GeneratorState::Completed {
        return match completion.kind() {
            CompletionType::Return => {
                let result = create_iter_result_object(
                    realm,
                    completion.value_or_undefined(),
                    true,
                )?;
                Ok(JsValue::Object(result))
            }
            CompletionType::Throw => Err(JsError::thrown(completion.value_or_undefined())),
            _ => Err(JsError::internal("generator resumed with a non-abrupt completion")),
        };
    }
    run_body(realm, generator, completion)
}

/// Push the generator's context, run its continuation and park the context again on yield
fn run_body(realm: &mut Realm, generator: ObjectId, completion: Completion) -> JsResult<JsValue> {
    let Some(mut context) = generator_data(realm, generator)?.context.take() else {
        return Err(JsError::internal("suspended generator has no context"));
    };
    let Some(mut body) = context.continuation.take() else {
        return Err(JsError::internal("suspended generator has no continuation"));
    };
    set_state(realm, generator, GeneratorState::Executing)?;
    realm.push_context(context);

    let step = body.resume(realm, generator, completion);

    let mut context = realm.pop_context()?;
    match step {
        Ok(GeneratorStep::Yield(value)) => {
            context.continuation = Some(body);
            generator_data(realm, generator)?.context = Some(context);
            set_state(realm, generator, GeneratorState::SuspendedYield)?;
            let result = create_iter_result_object(realm, value, false)?;
            Ok(JsValue::Object(result))
        }
        Ok(GeneratorStep::Return(value)) => {
            context.detach();
            set_state(realm, generator, GeneratorState::Completed)?;
            let result = create_iter_result_object(realm, value, true)?;
            Ok(JsValue::Object(result))
        }
        Err(err) => {
            context.detach();
            set_state(realm, generator, GeneratorState::Completed)?;
            Err(err)
        }
    }
}

/// Current `[[GeneratorState]]` of a generator object
pub fn generator_state(realm: &Realm, generator: ObjectId) -> JsResult<GeneratorState> {
    match &realm.heap.get(generator)?.kind {
        ObjectKind::Generator(data) => Ok(data.state),
        _ => Err(JsError::type_error("not a generator object")),
    }
}

/// Allocate a generator instance with `%GeneratorPrototype%` and start it on `body`
pub fn create_generator(realm: &mut Realm, body: Box<dyn GeneratorBody>) -> JsResult<ObjectId> {
    let proto = Some(realm.intrinsics.generator_prototype);
    let generator = crate::object::make_object(
        realm,
        proto,
        ObjectKind::Generator(GeneratorData::new()),
    );
    generator_start(realm, generator, body)?;
    Ok(generator)
}
