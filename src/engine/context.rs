//! Per-invocation data handed to filter transforms.

use super::definition::{EmptyHandler, ErrorHandler};
use super::policy::Behavior;
use crate::error::BoxError;
use crate::RawArg;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Merged arguments of one filter invocation.
///
/// `named` holds defaults, then the filter's config section, then the call
/// site arguments, each layer overriding the previous one. The raw call
/// slots stay available through [`Args::positional`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    named: Map<String, Value>,
    positional: Vec<RawArg>,
}

impl Args {
    pub fn new(named: Map<String, Value>, positional: Vec<RawArg>) -> Self {
        Args { named, positional }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Numeric argument; numeric strings are accepted.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(crate::value::as_number)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn named(&self) -> &Map<String, Value> {
        &self.named
    }

    /// Call-site slots as written, `None` for unset ones.
    pub fn positional(&self) -> &[RawArg] {
        &self.positional
    }

    /// The call-site slot at `index`, if it is set.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional.get(index).and_then(Option::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }
}

/// Context shared by all filters of one placeholder.
///
/// A single context lives for the whole chain. Control filters use it to
/// install error/empty policies that override the filter-local and global
/// ones for the filters that run after them.
pub struct FilterContext<'a> {
    /// Placeholder name; empty for positional `{}`.
    pub name: &'a str,
    /// Value the chain started with.
    pub value: Value,
    /// Whole template being interpolated.
    pub template: &'a str,
    /// Placeholder text, braces included.
    pub matched: &'a str,
    pub prefix: &'a str,
    pub suffix: &'a str,
    /// Raw slots of the filter currently running.
    pub args: Vec<RawArg>,
    /// Config section of the filter currently running.
    pub config: Option<Value>,
    on_error: Option<ErrorHandler>,
    on_empty: Option<EmptyHandler>,
}

impl<'a> FilterContext<'a> {
    pub(crate) fn new(
        name: &'a str,
        value: Value,
        template: &'a str,
        matched: &'a str,
        prefix: &'a str,
        suffix: &'a str,
    ) -> Self {
        FilterContext {
            name,
            value,
            template,
            matched,
            prefix,
            suffix,
            args: Vec::new(),
            config: None,
            on_error: None,
            on_empty: None,
        }
    }

    /// Override the error policy for the rest of the chain.
    pub fn set_on_error<F>(&mut self, handler: F)
    where
        F: Fn(&BoxError, &Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
    }

    /// Override the empty-value policy for the rest of the chain.
    pub fn set_on_empty<F>(&mut self, handler: F)
    where
        F: Fn(&Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_empty = Some(Arc::new(handler));
    }

    pub fn on_error(&self) -> Option<&ErrorHandler> {
        self.on_error.as_ref()
    }

    pub fn on_empty(&self) -> Option<&EmptyHandler> {
        self.on_empty.as_ref()
    }
}

impl fmt::Debug for FilterContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterContext")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("matched", &self.matched)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("args", &self.args)
            .field("config", &self.config)
            .field("on_error", &self.on_error.is_some())
            .field("on_empty", &self.on_empty.is_some())
            .finish()
    }
}
