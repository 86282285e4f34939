//! Filter definitions.
//!
//! A [`FilterDef`] is the long-lived, registered side of a filter: its name,
//! where it runs in a chain, how call-site arguments map onto named ones, the
//! transform itself and optional filter-local error/empty policies.
//!
//! Definitions are plain data with `pub` fields. They can be built with
//! [`FilterDef::new`] plus the `with_*` helpers, with [`FilterDef::builder`]
//! (which validates on `build`), or with the [`filter!`](crate::filter)
//! macro.

use super::context::{Args, FilterContext};
use super::policy::Behavior;
use crate::error::{BoxError, Error};
use crate::Priority;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A filter transform: `(value, merged args, context) -> new value`.
pub type Transform = Arc<dyn Fn(&Value, &Args, &mut FilterContext<'_>) -> Result<Value, BoxError> + Send + Sync>;

/// Decides what happens when a filter fails.
///
/// Receives the filter's error and the value the filter was given.
pub type ErrorHandler =
    Arc<dyn Fn(&BoxError, &Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync>;

/// Decides what happens when a filter returns an empty value.
pub type EmptyHandler = Arc<dyn Fn(&Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync>;

/// Predicate deciding whether a value counts as empty.
pub type IsEmpty = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Dynamic filter source consulted for names missing from the registry.
pub type GetFilter = Arc<dyn Fn(&str) -> Option<FilterLookup> + Send + Sync>;

/// What a dynamic filter source can hand back.
pub enum FilterLookup {
    /// A complete definition.
    Definition(FilterDef),
    /// A bare transform, wrapped into a minimal definition.
    Transform(Transform),
}

impl FilterLookup {
    /// Wrap a closure as a bare transform.
    pub fn transform<F>(next: F) -> Self
    where
        F: Fn(&Value, &Args, &mut FilterContext<'_>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        FilterLookup::Transform(Arc::new(next))
    }
}

/// Default argument values of a filter.
#[derive(Clone, Default)]
pub enum Defaults {
    #[default]
    None,
    /// A fixed map, cloned for every invocation.
    Static(Map<String, Value>),
    /// Evaluated on every invocation.
    Factory(Arc<dyn Fn() -> Map<String, Value> + Send + Sync>),
}

impl Defaults {
    /// Defaults from a JSON object; anything else means no defaults.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Defaults::Static(map),
            _ => Defaults::None,
        }
    }

    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> Map<String, Value> + Send + Sync + 'static,
    {
        Defaults::Factory(Arc::new(f))
    }

    pub(crate) fn evaluate(&self) -> Map<String, Value> {
        match self {
            Defaults::None => Map::new(),
            Defaults::Static(map) => map.clone(),
            Defaults::Factory(f) => f(),
        }
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defaults::None => f.write_str("None"),
            Defaults::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Defaults::Factory(_) => f.write_str("Factory(<function>)"),
        }
    }
}

/// A registered filter.
#[derive(Clone)]
pub struct FilterDef {
    /// Registry key. Last registration wins.
    pub name: String,
    pub priority: Priority,
    pub defaults: Defaults,
    /// Declared argument order used to name positional arguments. `None`
    /// leaves positional arguments unnamed.
    pub args: Option<Vec<String>>,
    /// Dotted path of this filter's section in [`Options::config`](crate::Options::config).
    pub config_key: Option<String>,
    pub next: Transform,
    pub on_error: Option<ErrorHandler>,
    pub on_empty: Option<EmptyHandler>,
    /// Control filters install policies instead of transforming; their
    /// output is exempt from the empty check.
    pub control: bool,
}

impl FilterDef {
    /// A normal-priority filter without defaults or declared arguments.
    pub fn new<F>(name: impl Into<String>, next: F) -> Self
    where
        F: Fn(&Value, &Args, &mut FilterContext<'_>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::with_transform(name, Arc::new(next))
    }

    pub fn with_transform(name: impl Into<String>, next: Transform) -> Self {
        FilterDef {
            name: name.into(),
            priority: Priority::Normal,
            defaults: Defaults::None,
            args: None,
            config_key: None,
            next,
            on_error: None,
            on_empty: None,
            control: false,
        }
    }

    pub fn builder(name: impl Into<String>) -> FilterBuilder {
        FilterBuilder::new(name)
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_args<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_config_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    /// Install a filter-local error policy.
    pub fn set_on_error<F>(&mut self, handler: F)
    where
        F: Fn(&BoxError, &Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
    }

    /// Install a filter-local empty-value policy.
    pub fn set_on_empty<F>(&mut self, handler: F)
    where
        F: Fn(&Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_empty = Some(Arc::new(handler));
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidFilter("filter name must not be empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for FilterDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDef")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("defaults", &self.defaults)
            .field("args", &self.args)
            .field("config_key", &self.config_key)
            .field("next", &"<function>")
            .field("on_error", &self.on_error.as_ref().map(|_| "<function>"))
            .field("on_empty", &self.on_empty.as_ref().map(|_| "<function>"))
            .field("control", &self.control)
            .finish()
    }
}

/// Step-by-step construction of a [`FilterDef`] that fails fast on a missing
/// name or transform.
#[derive(Default)]
pub struct FilterBuilder {
    name: String,
    priority: Priority,
    defaults: Defaults,
    args: Option<Vec<String>>,
    config_key: Option<String>,
    next: Option<Transform>,
    on_error: Option<ErrorHandler>,
    on_empty: Option<EmptyHandler>,
}

impl FilterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        FilterBuilder { name: name.into(), ..Default::default() }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn args<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn defaults(mut self, defaults: Value) -> Self {
        self.defaults = Defaults::from_value(defaults);
        self
    }

    pub fn default_factory<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Map<String, Value> + Send + Sync + 'static,
    {
        self.defaults = Defaults::factory(f);
        self
    }

    pub fn config_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    pub fn next<F>(mut self, next: F) -> Self
    where
        F: Fn(&Value, &Args, &mut FilterContext<'_>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.next = Some(Arc::new(next));
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&BoxError, &Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn on_empty<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_empty = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<FilterDef, Error> {
        let Some(next) = self.next else {
            return Err(Error::InvalidFilter(format!("filter `{}` has no transform", self.name)));
        };
        let def = FilterDef {
            name: self.name,
            priority: self.priority,
            defaults: self.defaults,
            args: self.args,
            config_key: self.config_key,
            next,
            on_error: self.on_error,
            on_empty: self.on_empty,
            control: false,
        };
        def.validate()?;
        Ok(def)
    }
}
