//! The firmware method-call seam and a table-backed implementation of it.
use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::MethodName;

/// Largest number of positional arguments passed in one call.
pub const MAX_ARGS: usize = 3;

/// An object passed to or returned from firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Integer object.
    Integer(u64),
    /// String object.
    String(String),
    /// Raw buffer.
    Buffer(Vec<u8>),
    /// Ordered package of objects.
    Package(Vec<Value>),
}

impl Value {
    /// Integer payload, if this is an integer.
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Buffer payload, if this is a buffer.
    pub fn as_buffer(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Integer(n)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Self::Integer(u64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Integer(u64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Integer(u64::from(b))
    }
}

/// Failure reported by the platform for a single method evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (status {status:#010x})")]
pub struct PlatformError {
    /// Platform status code.
    pub status: u32,
    /// Human-readable detail.
    pub message: String,
}

impl PlatformError {
    /// Status used when a method does not exist.
    pub const NOT_FOUND: u32 = 0xE000_02F0;
    /// Generic failure status.
    pub const ERROR: u32 = 0xE000_02BC;

    /// Build an error from parts.
    pub fn new(status: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The method is not present in the firmware namespace.
    pub fn not_found(method: MethodName) -> Self {
        Self::new(Self::NOT_FOUND, format!("method {method} not found"))
    }
}

/// Evaluates named firmware methods on the device that owns the block directory.
pub trait Platform {
    /// Evaluate `method` with positional `args`, returning its result object if any.
    fn evaluate(
        &self,
        method: MethodName,
        args: &[Value],
    ) -> Result<Option<Value>, PlatformError>;
}

impl<P: Platform + ?Sized> Platform for &P {
    fn evaluate(
        &self,
        method: MethodName,
        args: &[Value],
    ) -> Result<Option<Value>, PlatformError> {
        (**self).evaluate(method, args)
    }
}

impl<P: Platform + ?Sized> Platform for Arc<P> {
    fn evaluate(
        &self,
        method: MethodName,
        args: &[Value],
    ) -> Result<Option<Value>, PlatformError> {
        (**self).evaluate(method, args)
    }
}

/// One recorded method evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Method that was evaluated.
    pub method: MethodName,
    /// Arguments it was given.
    pub args: Vec<Value>,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match a {
                Value::Integer(n) => write!(f, "{n:#x}")?,
                other => write!(f, "{other:?}")?,
            }
        }
        f.write_str(")")
    }
}

/// Canned reply for a method.
#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Empty,
    Fail(PlatformError),
}

/// A platform backed by fixed replies; every call is recorded.
///
/// Methods without a configured reply fail with [`PlatformError::NOT_FOUND`] unless
/// [`TablePlatform::accept_unknown`] is set, in which case they succeed with no result.
/// `_WED` replies are keyed by the notify id argument.
#[derive(Debug, Default)]
pub struct TablePlatform {
    replies: HashMap<MethodName, Reply>,
    event_data: HashMap<u8, Reply>,
    accept_unknown: bool,
    calls: Mutex<Vec<Call>>,
}

impl TablePlatform {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `blob` from the directory method.
    pub fn with_directory(blob: impl Into<Vec<u8>>) -> Self {
        let mut p = Self::new();
        p.respond(MethodName::DIRECTORY, Value::Buffer(blob.into()));
        p
    }

    /// Return `value` from `method`.
    pub fn respond(&mut self, method: MethodName, value: Value) -> &mut Self {
        self.replies.insert(method, Reply::Value(value));
        self
    }

    /// Succeed without a result for `method`.
    pub fn accept(&mut self, method: MethodName) -> &mut Self {
        self.replies.insert(method, Reply::Empty);
        self
    }

    /// Fail every evaluation of `method` with `error`.
    pub fn fail(&mut self, method: MethodName, error: PlatformError) -> &mut Self {
        self.replies.insert(method, Reply::Fail(error));
        self
    }

    /// Return `value` from `_WED` for `notify_id`.
    pub fn event_data(&mut self, notify_id: u8, value: Value) -> &mut Self {
        self.event_data.insert(notify_id, Reply::Value(value));
        self
    }

    /// Fail `_WED` for `notify_id`.
    pub fn fail_event_data(&mut self, notify_id: u8, error: PlatformError) -> &mut Self {
        self.event_data.insert(notify_id, Reply::Fail(error));
        self
    }

    /// Let methods without a configured reply succeed with no result.
    pub fn accept_unknown(&mut self, accept: bool) -> &mut Self {
        self.accept_unknown = accept;
        self
    }

    /// Snapshot of the calls made so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Drop the recorded call log.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn lookup(&self, method: MethodName, args: &[Value]) -> Option<&Reply> {
        if method == MethodName::EVENT_DATA {
            let id = args.first().and_then(Value::as_integer)?;
            return u8::try_from(id).ok().and_then(|id| self.event_data.get(&id));
        }
        self.replies.get(&method)
    }
}

impl Platform for TablePlatform {
    fn evaluate(
        &self,
        method: MethodName,
        args: &[Value],
    ) -> Result<Option<Value>, PlatformError> {
        let call = Call {
            method,
            args: args.to_vec(),
        };
        trace!(%call, "evaluate");
        self.calls.lock().push(call);
        match self.lookup(method, args) {
            Some(Reply::Value(v)) => Ok(Some(v.clone())),
            Some(Reply::Empty) => Ok(None),
            Some(Reply::Fail(e)) => Err(e.clone()),
            None if self.accept_unknown => Ok(None),
            None => Err(PlatformError::not_found(method)),
        }
    }
}
