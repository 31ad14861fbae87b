//! Execution contexts and the context stack
//!
//! The stack is the engine's explicit call stack. Each context tracks how long it has
//! actually been running: time spent suspended (while a callee or a resumed generator
//! runs on top of it) is excluded, which is what the realm's timeout budget is
//! measured against.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{error, trace};

use crate::environment::EnvId;
use crate::error::{JsError, JsResult};
use crate::generator::GeneratorBody;
use crate::module::ModuleRecord;
use crate::value::{JsString, ObjectId};

/// `ScriptOrModule` of a context
#[derive(Clone)]
pub enum ScriptOrModule {
    Script { name: JsString },
    Module(Rc<dyn ModuleRecord>),
}

impl fmt::Debug for ScriptOrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptOrModule::Script { name } => write!(f, "Script({})", name),
            ScriptOrModule::Module(module) => write!(f, "Module({:?})", module.id()),
        }
    }
}

/// An execution context
pub struct ExecutionContext {
    id: u64,
    /// Running function, `None` for script/module code and the root context
    pub function: Option<ObjectId>,
    pub script_or_module: Option<ScriptOrModule>,
    pub lexical_environment: Option<EnvId>,
    pub variable_environment: Option<EnvId>,
    /// Generator whose body this context runs
    pub generator: Option<ObjectId>,
    /// Continuation invoked the next time the generator is resumed
    pub(crate) continuation: Option<Box<dyn GeneratorBody>>,
    suspended: bool,
    active: Duration,
    resumed_at: Option<Duration>,
    /// `active` when pushed; the difference is charged to the stack on pop
    active_at_push: Duration,
    /// Whether pushing this context suspended the context below it
    suspended_caller: bool,
}

impl ExecutionContext {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Active time accumulated up to `now`
    pub fn active_time(&self, now: Duration) -> Duration {
        match self.resumed_at {
            Some(since) if !self.suspended => self.active + now.saturating_sub(since),
            _ => self.active,
        }
    }

    /// Drop the environment links; the environments themselves stay in the arena.
    pub fn detach(&mut self) {
        self.lexical_environment = None;
        self.variable_environment = None;
        self.continuation = None;
    }

    fn start(&mut self, now: Duration) {
        self.suspended = false;
        self.resumed_at = Some(now);
    }

    fn stop(&mut self, now: Duration) {
        self.active = self.active_time(now);
        self.suspended = true;
        self.resumed_at = None;
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("function", &self.function)
            .field("script_or_module", &self.script_or_module)
            .field("lexical_environment", &self.lexical_environment)
            .field("generator", &self.generator)
            .field("suspended", &self.suspended)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// The execution context stack
#[derive(Debug, Default)]
pub struct ExecutionContextStack {
    contexts: Vec<ExecutionContext>,
    next_id: u64,
    /// Active time charged by contexts already popped in this evaluation
    retired: Duration,
}

impl ExecutionContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh, not yet pushed context with a new id
    pub fn new_context(&mut self) -> ExecutionContext {
        self.next_id += 1;
        ExecutionContext {
            id: self.next_id,
            function: None,
            script_or_module: None,
            lexical_environment: None,
            variable_environment: None,
            generator: None,
            continuation: None,
            suspended: true,
            active: Duration::ZERO,
            resumed_at: None,
            active_at_push: Duration::ZERO,
            suspended_caller: false,
        }
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// The running execution context
    pub fn top(&self) -> Option<&ExecutionContext> {
        self.contexts.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut ExecutionContext> {
        self.contexts.last_mut()
    }

    /// Contexts from the innermost outwards
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionContext> {
        self.contexts.iter().rev()
    }

    /// Push `context` and make it running; a running caller is suspended first.
    pub fn push(&mut self, mut context: ExecutionContext, now: Duration) {
        context.suspended_caller = false;
        if let Some(caller) = self.contexts.last_mut() {
            if !caller.suspended {
                caller.stop(now);
                context.suspended_caller = true;
            }
        }
        context.active_at_push = context.active;
        context.start(now);
        trace!(context = context.id, depth = self.contexts.len() + 1, "push context");
        self.contexts.push(context);
    }

    /// Pop the running context; the caller resumes if `push` suspended it.
    pub fn pop(&mut self, now: Duration) -> JsResult<ExecutionContext> {
        let Some(mut context) = self.contexts.pop() else {
            error!("pop on an empty execution context stack");
            return Err(JsError::internal("execution context stack underflow"));
        };
        context.stop(now);
        self.retired += context.active.saturating_sub(context.active_at_push);
        if context.suspended_caller {
            if let Some(caller) = self.contexts.last_mut() {
                caller.start(now);
            }
        }
        trace!(context = context.id, depth = self.contexts.len(), "pop context");
        Ok(context)
    }

    fn top_with_id(&mut self, id: u64, op: &str) -> JsResult<&mut ExecutionContext> {
        match self.contexts.last_mut() {
            Some(top) if top.id == id => Ok(top),
            top => {
                let top = top.map(|c| c.id);
                error!(context = id, ?top, "{} on a context that is not running", op);
                Err(JsError::internal(format!(
                    "{} of context {} which is not on top of the stack",
                    op, id
                )))
            }
        }
    }

    /// Suspend the top context, freezing its active-time accumulator
    pub fn suspend(&mut self, id: u64, now: Duration) -> JsResult<()> {
        let top = self.top_with_id(id, "suspend")?;
        if top.suspended {
            error!(context = id, "suspend of an already suspended context");
            return Err(JsError::internal(format!("context {} is already suspended", id)));
        }
        top.stop(now);
        Ok(())
    }

    /// Resume the top context
    pub fn resume(&mut self, id: u64, now: Duration) -> JsResult<()> {
        let top = self.top_with_id(id, "resume")?;
        if !top.suspended {
            error!(context = id, "resume of a context that is not suspended");
            return Err(JsError::internal(format!("context {} is not suspended", id)));
        }
        top.start(now);
        Ok(())
    }

    /// Active time charged to the current evaluation so far
    pub fn elapsed(&self, now: Duration) -> Duration {
        self.contexts.iter().fold(self.retired, |total, context| {
            total + context.active_time(now).saturating_sub(context.active_at_push)
        })
    }

    /// Start a new budget period: forget retired time and rebase every live context
    pub fn reset_accounting(&mut self, now: Duration) {
        self.retired = Duration::ZERO;
        for context in &mut self.contexts {
            context.active_at_push = context.active_time(now);
        }
    }

    /// Pop everything, detaching each context
    pub fn clear(&mut self) {
        for context in &mut self.contexts {
            context.detach();
        }
        self.contexts.clear();
        self.retired = Duration::ZERO;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_push_suspends_caller_and_pop_resumes_it() {
        let mut stack = ExecutionContextStack::new();
        let root = stack.new_context();
        let root_id = root.id();
        stack.push(root, ms(0));
        let callee = stack.new_context();
        stack.push(callee, ms(10));
        assert!(stack.iter().nth(1).unwrap().is_suspended());

        let popped = stack.pop(ms(15)).unwrap();
        assert_eq!(popped.active_time(ms(100)), ms(5));
        let top = stack.top().unwrap();
        assert_eq!(top.id(), root_id);
        assert!(!top.is_suspended());
        assert_eq!(top.active_time(ms(20)), ms(15));
    }

    #[test]
    fn test_suspended_time_is_excluded() {
        let mut stack = ExecutionContextStack::new();
        let ctx = stack.new_context();
        let id = ctx.id();
        stack.push(ctx, ms(0));
        stack.suspend(id, ms(4)).unwrap();
        stack.resume(id, ms(50)).unwrap();
        assert_eq!(stack.top().unwrap().active_time(ms(51)), ms(5));
        assert_eq!(stack.elapsed(ms(51)), ms(5));
    }

    #[test]
    fn test_discipline_faults_are_internal_errors() {
        let mut stack = ExecutionContextStack::new();
        let below = stack.new_context();
        let below_id = below.id();
        stack.push(below, ms(0));
        let top = stack.new_context();
        let top_id = top.id();
        stack.push(top, ms(0));

        assert!(stack.suspend(below_id, ms(1)).unwrap_err().is_fatal());
        assert!(stack.resume(top_id, ms(1)).unwrap_err().is_fatal());
        stack.suspend(top_id, ms(1)).unwrap();
        assert!(stack.suspend(top_id, ms(1)).unwrap_err().is_fatal());
    }

    #[test]
    fn test_popped_time_stays_charged() {
        let mut stack = ExecutionContextStack::new();
        let root = stack.new_context();
        stack.push(root, ms(0));
        let callee = stack.new_context();
        stack.push(callee, ms(0));
        stack.pop(ms(30)).unwrap();
        assert_eq!(stack.elapsed(ms(30)), ms(30));
        stack.reset_accounting(ms(30));
        assert_eq!(stack.elapsed(ms(31)), ms(1));
    }

    #[test]
    fn test_pop_on_empty_stack() {
        let mut stack = ExecutionContextStack::new();
        assert!(stack.pop(ms(0)).is_err());
    }
}
