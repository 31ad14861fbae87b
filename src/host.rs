//! Host configuration and hooks
//!
//! Everything a realm needs from its embedder is fixed when the realm is created:
//! the timeout budget, the clock, the string-compilation policy and the evaluator
//! used by `eval` / `Function` once that policy allows it.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::completion::Completion;
use crate::error::JsResult;
use crate::platform::{RandomProvider, StdRandomProvider, StdTimeProvider, TimeProvider};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId};

/// Default wall-clock budget for one outermost evaluation
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Default number of checkpoints between two clock samples
pub const DEFAULT_TIMEOUT_CHECK_INTERVAL: u32 = 64;

/// Default limit on nested calls and internal-method dispatches
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 256;

/// Serializable realm settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmConfig {
    /// Budget in milliseconds. 0 disables the timeout.
    pub timeout_ms: u64,

    /// Checkpoints between clock samples; 0 and 1 both sample on every checkpoint
    pub timeout_check_interval: u32,

    /// Nesting limit before a RangeError is thrown. 0 disables the limit.
    pub max_call_depth: u32,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            timeout_check_interval: DEFAULT_TIMEOUT_CHECK_INTERVAL,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl RealmConfig {
    /// Parse settings from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_timeout_check_interval(mut self, interval: u32) -> Self {
        self.timeout_check_interval = interval;
        self
    }

    pub fn with_max_call_depth(mut self, depth: u32) -> Self {
        self.max_call_depth = depth;
        self
    }
}

/// `HostEnsureCanCompileStrings`: a normal completion permits compilation; a throw
/// completion is rethrown to the `eval` / `Function` caller.
pub type CompileStringsHook = dyn Fn(&Realm, &JsString) -> Completion;

/// What kind of function the `Function` constructor is asked to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicFunctionKind {
    Normal,
    Generator,
}

/// Parser + evaluator supplied by the embedding driver
///
/// The engine owns no parser; `eval` and `Function` hand source text to this trait
/// after the compile-strings hook has agreed.
pub trait DynamicEvaluator {
    /// Evaluate `source` as a script in the realm's global scope (indirect eval)
    fn evaluate(&self, realm: &mut Realm, source: &JsString) -> JsResult<JsValue>;

    /// Create a function from parameter and body source text
    fn create_function(
        &self,
        realm: &mut Realm,
        kind: DynamicFunctionKind,
        parameters: &[JsString],
        body: &JsString,
    ) -> JsResult<ObjectId>;
}

/// Everything the host hands a realm at creation
pub struct HostConfig {
    pub config: RealmConfig,
    pub compile_strings: Option<Rc<CompileStringsHook>>,
    pub evaluator: Option<Rc<dyn DynamicEvaluator>>,
    pub time: Rc<dyn TimeProvider>,
    pub random: Box<dyn RandomProvider>,
}

impl HostConfig {
    pub fn new(config: RealmConfig) -> Self {
        Self {
            config,
            compile_strings: None,
            evaluator: None,
            time: Rc::new(StdTimeProvider::new()),
            random: Box::new(StdRandomProvider::new()),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn with_compile_strings_hook(
        mut self,
        hook: impl Fn(&Realm, &JsString) -> Completion + 'static,
    ) -> Self {
        self.compile_strings = Some(Rc::new(hook));
        self
    }

    pub fn with_evaluator(mut self, evaluator: Rc<dyn DynamicEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_time_provider(mut self, time: Rc<dyn TimeProvider>) -> Self {
        self.time = time;
        self
    }

    pub fn with_random_provider(mut self, random: Box<dyn RandomProvider>) -> Self {
        self.random = random;
        self
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new(RealmConfig::default())
    }
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("config", &self.config)
            .field("compile_strings", &self.compile_strings.is_some())
            .field("evaluator", &self.evaluator.is_some())
            .finish_non_exhaustive()
    }
}

/// Default policy: compiling strings is always permitted
pub fn default_compile_strings(_realm: &Realm, _source: &JsString) -> Completion {
    Completion::empty()
}
