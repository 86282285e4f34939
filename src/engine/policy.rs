//! Error and empty-value policies.
//!
//! Handlers answer with a [`Behavior`]. The executor turns that answer into a
//! [`Flow`] for the chain:
//!
//! ```text
//! Behavior            on error                     on empty
//! ------------------  ---------------------------  ---------------------------
//! Ignore(None)        continue with input value    continue with input value
//! Ignore(Some(v))     continue with v              continue with v
//! Abort(None)         stop, emit input value       stop, emit the empty value
//! Abort(Some(v))      stop, emit v                 stop, emit v
//! Throw(None)         propagate the filter error   propagate EmptyValue
//! Throw(Some(e))      propagate e                  propagate e
//! handler fails       warn, then as Ignore(None)   warn, then as Ignore(None)
//! no handler          as Ignore(None)              stop, emit ""
//! ```

use crate::error::{BoxError, Error};
use serde_json::Value;
use tracing::warn;

/// What a policy handler wants done.
#[derive(Debug)]
pub enum Behavior {
    /// Keep going with the given value, or with the failing filter's input.
    Ignore(Option<Value>),
    /// End the chain and emit the given value.
    Abort(Option<Value>),
    /// Fail the whole interpolation.
    Throw(Option<BoxError>),
}

impl Behavior {
    pub fn ignore() -> Self {
        Behavior::Ignore(None)
    }

    pub fn abort() -> Self {
        Behavior::Abort(None)
    }

    pub fn throw() -> Self {
        Behavior::Throw(None)
    }
}

/// A bare string answer aborts with that string.
impl From<&str> for Behavior {
    fn from(value: &str) -> Self {
        Behavior::Abort(Some(Value::String(value.to_string())))
    }
}

impl From<String> for Behavior {
    fn from(value: String) -> Self {
        Behavior::Abort(Some(Value::String(value)))
    }
}

/// What the executor does next.
#[derive(Debug)]
pub(crate) enum Flow {
    Continue(Value),
    Stop(Value),
    Propagate(Error),
}

/// Resolve a filter failure. `outcome` is `None` when no handler is set.
pub(crate) fn error_flow(
    filter: &str,
    error: BoxError,
    input: Value,
    outcome: Option<Result<Behavior, BoxError>>,
) -> Flow {
    let behavior = match outcome {
        None => Behavior::ignore(),
        Some(Ok(behavior)) => behavior,
        Some(Err(handler_err)) => {
            warn!(filter, error = %handler_err, "error handler failed, ignoring");
            Behavior::ignore()
        }
    };

    match behavior {
        Behavior::Ignore(value) => Flow::Continue(value.unwrap_or(input)),
        Behavior::Abort(value) => Flow::Stop(value.unwrap_or(input)),
        Behavior::Throw(replacement) => Flow::Propagate(Error::Filter {
            filter: filter.to_string(),
            source: replacement.unwrap_or(error),
        }),
    }
}

/// Resolve an empty filter result.
pub(crate) fn empty_flow(
    filter: &str,
    input: Value,
    empty: Value,
    outcome: Option<Result<Behavior, BoxError>>,
) -> Flow {
    let behavior = match outcome {
        None => Behavior::Abort(Some(Value::String(String::new()))),
        Some(Ok(behavior)) => behavior,
        Some(Err(handler_err)) => {
            warn!(filter, error = %handler_err, "empty handler failed, ignoring");
            Behavior::ignore()
        }
    };

    match behavior {
        Behavior::Ignore(value) => Flow::Continue(value.unwrap_or(input)),
        Behavior::Abort(value) => Flow::Stop(value.unwrap_or(empty)),
        Behavior::Throw(None) => Flow::Propagate(Error::EmptyValue { filter: filter.to_string() }),
        Behavior::Throw(Some(source)) => Flow::Propagate(Error::Filter { filter: filter.to_string(), source }),
    }
}
