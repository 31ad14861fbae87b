//! Error types for the engine
//!
//! Language-level errors (TypeError, RangeError, ...) are created lazily: the error
//! object is only allocated once language code observes it. Fatal conditions
//! (timeout, broken engine invariants) are never catchable.

use std::fmt;

use thiserror::Error;

use crate::value::JsValue;

/// The native error constructors a lazily created error maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
}

impl NativeErrorKind {
    /// Constructor name, also the default `name` property of its prototype
    pub fn name(self) -> &'static str {
        match self {
            NativeErrorKind::Error => "Error",
            NativeErrorKind::EvalError => "EvalError",
            NativeErrorKind::RangeError => "RangeError",
            NativeErrorKind::ReferenceError => "ReferenceError",
            NativeErrorKind::SyntaxError => "SyntaxError",
            NativeErrorKind::TypeError => "TypeError",
            NativeErrorKind::UriError => "URIError",
        }
    }
}

impl fmt::Display for NativeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stack frame captured when an error is enriched
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    /// Execution context id
    pub context_id: u64,
    /// Function name, `None` for script/module code
    pub function_name: Option<String>,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.function_name.as_deref().unwrap_or("<anonymous>");
        write!(f, "    at {} (context {})", name, self.context_id)
    }
}

/// Context-stack snapshot and node path attached the first time an error
/// crosses an enrichment point
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorTrace {
    pub node_path: String,
    /// Innermost frame first
    pub frames: Vec<StackFrame>,
}

impl fmt::Display for ErrorTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.node_path.is_empty() {
            write!(f, "\n    at node {}", self.node_path)?;
        }
        for frame in &self.frames {
            write!(f, "\n{}", frame)?;
        }
        Ok(())
    }
}

fn format_trace(trace: &Option<Box<ErrorTrace>>) -> String {
    match trace {
        Some(trace) => trace.to_string(),
        None => String::new(),
    }
}

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum JsError {
    /// A native error that has not been turned into an object yet
    #[error("{kind}: {message}{}", format_trace(.trace))]
    Native {
        kind: NativeErrorKind,
        message: String,
        trace: Option<Box<ErrorTrace>>,
    },

    /// An arbitrary value thrown by language code
    #[error("Uncaught {value:?}{}", format_trace(.trace))]
    Thrown {
        value: JsValue,
        trace: Option<Box<ErrorTrace>>,
    },

    /// The realm ran past its time budget; the realm is unusable afterwards
    #[error("Execution timeout: exceeded {timeout_ms}ms limit (elapsed: {elapsed_ms}ms)")]
    Timeout { timeout_ms: u64, elapsed_ms: u64 },

    /// An engine invariant was violated (stack discipline, dangling handle, ...)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias used by every fallible engine operation
pub type JsResult<T> = Result<T, JsError>;

impl JsError {
    pub fn native(kind: NativeErrorKind, message: impl Into<String>) -> Self {
        JsError::Native {
            kind,
            message: message.into(),
            trace: None,
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::native(NativeErrorKind::TypeError, message)
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::native(NativeErrorKind::RangeError, message)
    }

    pub fn reference_error(message: impl Into<String>) -> Self {
        JsError::native(NativeErrorKind::ReferenceError, message)
    }

    /// ReferenceError for an unresolvable identifier
    pub fn not_defined(name: impl fmt::Display) -> Self {
        JsError::reference_error(format!("{} is not defined", name))
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        JsError::native(NativeErrorKind::SyntaxError, message)
    }

    pub fn uri_error(message: impl Into<String>) -> Self {
        JsError::native(NativeErrorKind::UriError, message)
    }

    pub fn eval_error(message: impl Into<String>) -> Self {
        JsError::native(NativeErrorKind::EvalError, message)
    }

    /// Wrap a thrown language value
    pub fn thrown(value: JsValue) -> Self {
        JsError::Thrown { value, trace: None }
    }

    /// Create an internal error for unexpected engine states.
    /// These should never happen in correctly-written code.
    pub fn internal(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// Whether language code may observe this error through `catch`
    pub fn is_catchable(&self) -> bool {
        matches!(self, JsError::Native { .. } | JsError::Thrown { .. })
    }

    pub fn is_fatal(&self) -> bool {
        !self.is_catchable()
    }

    /// The native error kind, if this is a not-yet-materialized native error
    pub fn native_kind(&self) -> Option<NativeErrorKind> {
        match self {
            JsError::Native { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_type_error(&self) -> bool {
        self.native_kind() == Some(NativeErrorKind::TypeError)
    }

    pub fn is_reference_error(&self) -> bool {
        self.native_kind() == Some(NativeErrorKind::ReferenceError)
    }

    pub fn is_range_error(&self) -> bool {
        self.native_kind() == Some(NativeErrorKind::RangeError)
    }

    pub fn trace(&self) -> Option<&ErrorTrace> {
        match self {
            JsError::Native { trace, .. } | JsError::Thrown { trace, .. } => trace.as_deref(),
            _ => None,
        }
    }

    /// Attach a trace unless one is already present. Fatal errors are returned unchanged.
    pub fn with_trace_if_absent(mut self, make: impl FnOnce() -> ErrorTrace) -> Self {
        if let JsError::Native { trace, .. } | JsError::Thrown { trace, .. } = &mut self {
            if trace.is_none() {
                *trace = Some(Box::new(make()));
            }
        }
        self
    }
}
