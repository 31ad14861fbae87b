//! The realm: heap, environments, intrinsics, context stack and host hooks
//!
//! Everything that is global to one isolated execution environment is owned by a
//! [`Realm`] and threaded explicitly through every operation.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::{debug, error, trace, warn};

use crate::builtins::{self, Intrinsics};
use crate::completion::Completion;
use crate::context::{ExecutionContext, ExecutionContextStack};
use crate::environment::{EnvId, EnvironmentArena, new_global_environment};
use crate::error::{ErrorTrace, JsError, JsResult, StackFrame};
use crate::function::function_name;
use crate::heap::Heap;
use crate::host::{CompileStringsHook, DynamicEvaluator, HostConfig, RealmConfig};
use crate::module::ModuleId;
use crate::object::ordinary_object_create;
use crate::platform::{RandomProvider, TimeProvider};
use crate::value::{FIRST_USER_SYMBOL_ID, JsString, JsSymbol, JsValue, ObjectId};

/// A queued job (`HostEnqueuePromiseJob`)
pub type Job = Box<dyn FnOnce(&mut Realm) -> JsResult<()>>;

/// An isolated global environment
pub struct Realm {
    /// Object arena
    pub heap: Heap,
    /// Environment-record arena
    pub envs: EnvironmentArena,
    /// `[[Intrinsics]]`
    pub intrinsics: Intrinsics,
    /// Execution context stack
    pub contexts: ExecutionContextStack,
    global_object: ObjectId,
    global_this: ObjectId,
    global_env: EnvId,
    root_context: u64,
    config: RealmConfig,
    time: Rc<dyn TimeProvider>,
    random: Box<dyn RandomProvider>,
    compile_strings: Option<Rc<CompileStringsHook>>,
    evaluator: Option<Rc<dyn DynamicEvaluator>>,
    jobs: VecDeque<Job>,
    symbol_registry: FxHashMap<JsString, JsSymbol>,
    next_symbol_id: u64,
    next_module_id: u32,
    namespaces: FxHashMap<ModuleId, ObjectId>,
    /// Calls and internal-method dispatches currently on the native stack
    call_depth: u32,
    /// Checkpoints since the clock was last sampled
    checkpoints: u32,
    /// Elapsed milliseconds at the moment the budget was exceeded
    aborted: Option<u64>,
    disposed: bool,
}

impl Realm {
    /// `CreateRealm()` + `SetRealmGlobalObject` + `SetDefaultGlobalBindings`
    ///
    /// Leaves the root execution context on the stack, suspended until the host
    /// starts an evaluation with [`Realm::execute`].
    pub fn create(host: HostConfig) -> Realm {
        let HostConfig {
            config,
            compile_strings,
            evaluator,
            time,
            random,
        } = host;

        let mut heap = Heap::with_capacity(512);
        let object_prototype = heap.alloc(crate::object::JsObject::ordinary(None));
        let mut realm = Realm {
            heap,
            envs: EnvironmentArena::new(),
            intrinsics: Intrinsics::placeholder(object_prototype),
            contexts: ExecutionContextStack::new(),
            global_object: object_prototype,
            global_this: object_prototype,
            global_env: EnvId(0),
            root_context: 0,
            config,
            time,
            random,
            compile_strings,
            evaluator,
            jobs: VecDeque::new(),
            symbol_registry: FxHashMap::default(),
            next_symbol_id: FIRST_USER_SYMBOL_ID,
            next_module_id: 0,
            namespaces: FxHashMap::default(),
            call_depth: 0,
            checkpoints: 0,
            aborted: None,
            disposed: false,
        };

        let bootstrap = builtins::init_intrinsics(&mut realm).and_then(|()| {
            let proto = Some(realm.intrinsics.object_prototype);
            let global = ordinary_object_create(&mut realm, proto);
            realm.global_object = global;
            realm.global_this = global;
            realm.global_env = new_global_environment(&mut realm, global, global);
            builtins::set_default_global_bindings(&mut realm)
        });
        if let Err(err) = bootstrap {
            error!(%err, "realm bootstrap failed");
            realm.aborted = Some(0);
        }

        let mut root = realm.contexts.new_context();
        root.lexical_environment = Some(realm.global_env);
        root.variable_environment = Some(realm.global_env);
        realm.root_context = root.id();
        let now = realm.now();
        realm.contexts.push(root, now);
        if let Err(err) = realm.contexts.suspend(realm.root_context, now) {
            error!(%err, "could not park the root context");
        }

        debug!(
            objects = realm.heap.len(),
            timeout_ms = realm.config.timeout_ms,
            "realm created"
        );
        realm
    }

    pub fn config(&self) -> &RealmConfig {
        &self.config
    }

    pub fn global_object(&self) -> ObjectId {
        self.global_object
    }

    /// `[[GlobalEnv]].[[GlobalThisValue]]`
    pub fn global_this(&self) -> ObjectId {
        self.global_this
    }

    pub fn global_env(&self) -> EnvId {
        self.global_env
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// Monotonic time according to the host clock
    pub fn now(&self) -> Duration {
        self.time.monotonic()
    }

    /// Next value from the host's random source
    pub fn random(&mut self) -> f64 {
        self.random.random()
    }

    // =========================================================================
    // Execution contexts
    // =========================================================================

    /// A fresh context, not yet pushed
    pub fn new_context(&mut self) -> ExecutionContext {
        self.contexts.new_context()
    }

    pub fn push_context(&mut self, context: ExecutionContext) {
        let now = self.now();
        self.contexts.push(context, now);
    }

    pub fn pop_context(&mut self) -> JsResult<ExecutionContext> {
        let now = self.now();
        self.contexts.pop(now)
    }

    /// The running execution context
    pub fn running_context(&self) -> JsResult<&ExecutionContext> {
        self.contexts
            .top()
            .ok_or_else(|| JsError::internal("execution context stack is empty"))
    }

    pub fn context_depth(&self) -> usize {
        self.contexts.len()
    }

    pub fn call_depth(&self) -> u32 {
        self.call_depth
    }

    /// Run `f` one nesting level deeper
    ///
    /// Every call, construct and internal-method dispatch goes through here, so
    /// unbounded recursion (including prototype cycles through proxies) ends in a
    /// catchable RangeError instead of exhausting the native stack.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Realm) -> JsResult<T>) -> JsResult<T> {
        let limit = self.config.max_call_depth;
        if limit != 0 && self.call_depth >= limit {
            debug!(depth = self.call_depth, "call depth limit reached");
            return Err(JsError::range_error("Maximum call stack size exceeded"));
        }
        self.call_depth += 1;
        let result = f(self);
        self.call_depth -= 1;
        result
    }

    /// Evaluation checkpoint
    ///
    /// Only every `timeout_check_interval`-th call reads the clock. Exceeding the
    /// budget aborts the realm for good; later checkpoints keep failing.
    pub fn check_timeout(&mut self) -> JsResult<()> {
        let timeout_ms = self.config.timeout_ms;
        if let Some(elapsed_ms) = self.aborted {
            return Err(JsError::Timeout {
                timeout_ms,
                elapsed_ms,
            });
        }
        if timeout_ms == 0 {
            return Ok(());
        }
        match self.contexts.top() {
            Some(context) if !context.is_suspended() => {}
            _ => return Ok(()),
        }
        self.checkpoints += 1;
        if self.checkpoints < self.config.timeout_check_interval.max(1) {
            return Ok(());
        }
        self.checkpoints = 0;
        let elapsed_ms = self.contexts.elapsed(self.now()).as_millis() as u64;
        if elapsed_ms > timeout_ms {
            warn!(timeout_ms, elapsed_ms, "execution timeout, aborting realm");
            self.aborted = Some(elapsed_ms);
            return Err(JsError::Timeout {
                timeout_ms,
                elapsed_ms,
            });
        }
        Ok(())
    }

    /// Run `f` as one outermost evaluation
    ///
    /// Resets the time budget, resumes the root context for the duration of `f`
    /// and suspends it again afterwards. Not reentrant.
    pub fn execute<T>(&mut self, f: impl FnOnce(&mut Realm) -> JsResult<T>) -> JsResult<T> {
        if self.disposed {
            return Err(JsError::internal("realm has been disposed"));
        }
        if let Some(elapsed_ms) = self.aborted {
            return Err(JsError::Timeout {
                timeout_ms: self.config.timeout_ms,
                elapsed_ms,
            });
        }
        let now = self.now();
        self.checkpoints = 0;
        self.contexts.reset_accounting(now);
        self.contexts.resume(self.root_context, now)?;

        let result = f(self);

        while self.contexts.len() > 1 {
            error!(depth = self.contexts.len(), "evaluation left contexts on the stack");
            self.pop_context()?;
        }
        let now = self.now();
        let parked = self.contexts.suspend(self.root_context, now);
        let value = result?;
        parked?;
        Ok(value)
    }

    /// Tear the realm down; every object and environment is released at once
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!(objects = self.heap.len(), environments = self.envs.len(), "realm disposed");
        self.contexts.clear();
        self.jobs.clear();
        self.namespaces.clear();
        self.symbol_registry.clear();
        self.envs.clear();
        self.heap.clear();
        self.disposed = true;
    }

    // =========================================================================
    // Errors and completions
    // =========================================================================

    /// Materialize a catchable error as the language value `catch` would see.
    /// Fatal errors are handed back unchanged.
    pub fn error_to_value(&mut self, err: JsError) -> JsResult<JsValue> {
        match err {
            JsError::Native { kind, message, .. } => {
                let obj = builtins::error::create_error_object(self, kind, &message)?;
                Ok(JsValue::Object(obj))
            }
            JsError::Thrown { value, .. } => Ok(value),
            fatal => Err(fatal),
        }
    }

    /// Turn an error into a throw completion; fatal errors stay errors
    pub fn completion_from_error(&mut self, err: JsError) -> JsResult<Completion> {
        Ok(Completion::throw(self.error_to_value(err)?))
    }

    pub fn completion_from_result(&mut self, result: JsResult<JsValue>) -> JsResult<Completion> {
        match result {
            Ok(value) => Ok(Completion::normal(value)),
            Err(err) => self.completion_from_error(err),
        }
    }

    /// Snapshot of the context stack, innermost first
    pub fn stack_frames(&self) -> Vec<StackFrame> {
        self.contexts
            .iter()
            .map(|context| StackFrame {
                context_id: context.id(),
                function_name: context.function.and_then(|f| function_name(self, f)),
            })
            .collect()
    }

    /// Attach the context stack and `node_path` to `err` unless it already carries a trace
    pub fn enrich_with(&self, err: JsError, node_path: &str) -> JsError {
        err.with_trace_if_absent(|| ErrorTrace {
            node_path: node_path.to_string(),
            frames: self.stack_frames(),
        })
    }

    // =========================================================================
    // Host hooks
    // =========================================================================

    /// `HostEnsureCanCompileStrings`
    pub fn ensure_can_compile_strings(&self, source: &JsString) -> JsResult<()> {
        let Some(hook) = &self.compile_strings else {
            return Ok(());
        };
        let completion = hook(self, source);
        if completion.is_throw() {
            return Err(JsError::thrown(completion.value_or_undefined()));
        }
        Ok(())
    }

    pub fn evaluator(&self) -> Option<Rc<dyn DynamicEvaluator>> {
        self.evaluator.clone()
    }

    // =========================================================================
    // Jobs
    // =========================================================================

    /// `HostEnqueuePromiseJob`
    pub fn enqueue_job(&mut self, job: Job) {
        self.jobs.push_back(job);
        trace!(pending = self.jobs.len(), "job enqueued");
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Drain the job queue in FIFO order, including jobs enqueued while draining.
    ///
    /// A job that throws is logged and the queue keeps going; fatal errors stop it.
    /// Returns the number of jobs run.
    pub fn run_jobs(&mut self) -> JsResult<usize> {
        self.execute(|realm| {
            let mut ran = 0;
            while let Some(job) = realm.jobs.pop_front() {
                ran += 1;
                trace!(job = ran, pending = realm.jobs.len(), "running job");
                if let Err(err) = job(realm) {
                    if err.is_fatal() {
                        return Err(err);
                    }
                    warn!(%err, "uncaught error in job");
                }
            }
            Ok(ran)
        })
    }

    // =========================================================================
    // Symbols and modules
    // =========================================================================

    /// A new unique symbol
    pub fn new_symbol(&mut self, description: Option<JsString>) -> JsSymbol {
        let id = self.next_symbol_id;
        self.next_symbol_id += 1;
        JsSymbol::new(id, description)
    }

    /// `Symbol.for(key)`
    pub fn symbol_for(&mut self, key: JsString) -> JsSymbol {
        if let Some(sym) = self.symbol_registry.get(&key) {
            return sym.clone();
        }
        let sym = self.new_symbol(Some(key.clone()));
        self.symbol_registry.insert(key, sym.clone());
        sym
    }

    /// `Symbol.keyFor(sym)`
    pub fn key_for(&self, sym: &JsSymbol) -> Option<JsString> {
        self.symbol_registry
            .iter()
            .find(|(_, registered)| *registered == sym)
            .map(|(key, _)| key.clone())
    }

    pub fn next_module_id(&mut self) -> ModuleId {
        let id = ModuleId(self.next_module_id);
        self.next_module_id += 1;
        id
    }

    pub fn cached_namespace(&self, module: ModuleId) -> Option<ObjectId> {
        self.namespaces.get(&module).copied()
    }

    pub fn cache_namespace(&mut self, module: ModuleId, namespace: ObjectId) {
        self.namespaces.insert(module, namespace);
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realm")
            .field("objects", &self.heap.len())
            .field("environments", &self.envs.len())
            .field("contexts", &self.contexts.len())
            .field("config", &self.config)
            .field("aborted", &self.aborted)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
