//! Completion records
//!
//! A completion is the tagged result of evaluating a construct. Engine operations
//! propagate failures through `JsResult`; completions carry the structured control
//! transfers (break/continue/return) and are the currency at the boundary with the
//! AST driver and generator bodies.

use crate::error::{JsError, JsResult};
use crate::value::{CheapClone, JsString, JsValue};

/// The `[[Type]]` of a completion record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionType {
    Normal,
    Break,
    Continue,
    Return,
    Throw,
    /// Normal completion whose value is still empty
    Empty,
}

/// Completion record: type, optional value and optional label target
#[derive(Debug, Clone)]
pub struct Completion {
    kind: CompletionType,
    value: Option<JsValue>,
    target: Option<JsString>,
}

impl Completion {
    pub fn normal(value: JsValue) -> Self {
        Self {
            kind: CompletionType::Normal,
            value: Some(value),
            target: None,
        }
    }

    /// Normal completion with an empty value
    pub fn empty() -> Self {
        Self {
            kind: CompletionType::Empty,
            value: None,
            target: None,
        }
    }

    pub fn return_(value: JsValue) -> Self {
        Self {
            kind: CompletionType::Return,
            value: Some(value),
            target: None,
        }
    }

    pub fn throw(value: JsValue) -> Self {
        Self {
            kind: CompletionType::Throw,
            value: Some(value),
            target: None,
        }
    }

    /// `break` / `break label` with an empty value
    pub fn break_(target: Option<JsString>) -> Self {
        Self {
            kind: CompletionType::Break,
            value: None,
            target,
        }
    }

    /// `continue` / `continue label` with an empty value
    pub fn continue_(target: Option<JsString>) -> Self {
        Self {
            kind: CompletionType::Continue,
            value: None,
            target,
        }
    }

    pub fn kind(&self) -> CompletionType {
        self.kind
    }

    /// The carried value, `None` when empty
    pub fn value(&self) -> Option<&JsValue> {
        self.value.as_ref()
    }

    /// The carried value, with empty read as undefined
    pub fn value_or_undefined(&self) -> JsValue {
        self.value.clone().unwrap_or_default()
    }

    pub fn target(&self) -> Option<&JsString> {
        self.target.as_ref()
    }

    /// Any completion other than normal/empty
    pub fn is_abrupt(&self) -> bool {
        !matches!(self.kind, CompletionType::Normal | CompletionType::Empty)
    }

    pub fn is_throw(&self) -> bool {
        self.kind == CompletionType::Throw
    }

    pub fn is_return(&self) -> bool {
        self.kind == CompletionType::Return
    }

    /// `UpdateEmpty(completion, value)`
    ///
    /// Only an empty payload is filled in. Return and throw completions always
    /// carry a value, so they come back unchanged.
    pub fn update_empty(self, value: JsValue) -> Self {
        if self.value.is_some() {
            return self;
        }
        let kind = match self.kind {
            CompletionType::Empty => CompletionType::Normal,
            other => other,
        };
        Self {
            kind,
            value: Some(value),
            target: self.target,
        }
    }

    /// `LoopContinues(completion, labelSet)`
    pub fn loop_continues(&self, label_set: &[JsString]) -> bool {
        match self.kind {
            CompletionType::Normal | CompletionType::Empty => true,
            CompletionType::Continue => match &self.target {
                None => true,
                Some(label) => label_set.contains(label),
            },
            _ => false,
        }
    }

    /// Convert into a `JsResult`, mapping a throw completion to `JsError::Thrown`.
    ///
    /// Break and continue completions are not results; they come back as `Ok(None)`
    /// only when empty-valued, so the caller must inspect `kind()` first if it cares.
    pub fn into_result(self) -> JsResult<Option<JsValue>> {
        match self.kind {
            CompletionType::Throw => Err(JsError::thrown(self.value.unwrap_or_default())),
            _ => Ok(self.value),
        }
    }

    /// Lift a `JsResult` into a completion. Catchable errors must already have been
    /// turned into values by the realm; see `Realm::completion_from_result`.
    pub fn from_value_result(result: Result<JsValue, JsValue>) -> Self {
        match result {
            Ok(value) => Completion::normal(value),
            Err(thrown) => Completion::throw(thrown),
        }
    }
}

impl From<JsValue> for Completion {
    fn from(value: JsValue) -> Self {
        Completion::normal(value)
    }
}

impl CheapClone for Completion {}
