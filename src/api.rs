use crate::engine::{self, Resolver, ScanMode};
use crate::error::{BoxError, Error};
use crate::filters;
use crate::{Args, Behavior, EmptyHandler, ErrorHandler, FilterContext, FilterDef, FilterLookup, GetFilter, IsEmpty};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

static DEFAULT_ENGINE: Lazy<FlexVars> = Lazy::new(FlexVars::new);

/// Interpolate with a default engine (built-in filters only).
///
/// ```
/// assert_eq!(flexvars::replace("{ a | to_uppercase }", "x").unwrap(), "X");
/// ```
pub fn replace(template: &str, vars: impl Into<Vars>) -> Result<String, Error> {
    DEFAULT_ENGINE.replace(template, vars)
}

// --- values -------------------------------------------------------------------

/// A single interpolation value, possibly produced on demand.
#[derive(Clone)]
pub enum VarValue {
    Value(Value),
    /// Called each time a placeholder consumes this value.
    Lazy(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl VarValue {
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        VarValue::Lazy(Arc::new(f))
    }

    fn resolve(&self) -> Value {
        match self {
            VarValue::Value(v) => v.clone(),
            VarValue::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            VarValue::Lazy(_) => f.write_str("Lazy(<function>)"),
        }
    }
}

macro_rules! var_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for VarValue {
                fn from(value: $ty) -> Self {
                    VarValue::Value(Value::from(value))
                }
            }
        )*
    };
}

var_value_from!(&str, String, i32, i64, u32, u64, f64, bool, Value);

/// The values supplied to one `replace` call.
pub enum Vars {
    /// Consumed left to right, one per placeholder occurrence.
    Positional(Vec<VarValue>),
    /// Looked up by placeholder name.
    Named(HashMap<String, VarValue>),
    /// Evaluated once, before scanning.
    Lazy(Box<dyn FnOnce() -> Vars>),
}

impl Vars {
    pub fn lazy<F, V>(f: F) -> Self
    where
        F: FnOnce() -> V + 'static,
        V: Into<Vars>,
    {
        Vars::Lazy(Box::new(move || f().into()))
    }
}

impl fmt::Debug for Vars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vars::Positional(values) => f.debug_tuple("Positional").field(values).finish(),
            Vars::Named(map) => f.debug_tuple("Named").field(map).finish(),
            Vars::Lazy(_) => f.write_str("Lazy(<function>)"),
        }
    }
}

impl From<()> for Vars {
    fn from(_: ()) -> Self {
        Vars::Positional(Vec::new())
    }
}

macro_rules! vars_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Vars {
                fn from(value: $ty) -> Self {
                    Vars::Positional(vec![VarValue::from(value)])
                }
            }
        )*
    };
}

vars_from_scalar!(&str, String, i32, i64, u32, u64, f64, bool);

impl From<VarValue> for Vars {
    fn from(value: VarValue) -> Self {
        Vars::Positional(vec![value])
    }
}

impl<T: Into<VarValue>> From<Vec<T>> for Vars {
    fn from(values: Vec<T>) -> Self {
        Vars::Positional(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<VarValue>, const N: usize> From<[T; N]> for Vars {
    fn from(values: [T; N]) -> Self {
        Vars::Positional(values.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, T: Into<VarValue>> From<HashMap<K, T>> for Vars {
    fn from(map: HashMap<K, T>) -> Self {
        Vars::Named(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, T: Into<VarValue>> From<BTreeMap<K, T>> for Vars {
    fn from(map: BTreeMap<K, T>) -> Self {
        Vars::Named(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<Map<String, Value>> for Vars {
    fn from(map: Map<String, Value>) -> Self {
        Vars::Named(map.into_iter().map(|(k, v)| (k, VarValue::Value(v))).collect())
    }
}

/// Arrays spread into positional values, objects are named, anything else is
/// one positional value.
impl From<Value> for Vars {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => items.into(),
            Value::Object(map) => map.into(),
            other => Vars::Positional(vec![VarValue::Value(other)]),
        }
    }
}

// --- options ------------------------------------------------------------------

/// Identifies a placeholder that had no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKey<'a> {
    /// Named mode: the placeholder name.
    Name(&'a str),
    /// Positional mode: zero-based occurrence index of the placeholder.
    Index(usize),
}

/// What to do with a placeholder that has no value.
#[derive(Clone, Default)]
pub enum Missing {
    /// Use an empty string (the filter chain still runs).
    #[default]
    Default,
    /// Leave the placeholder text untouched and skip its chain.
    Ignore,
    /// Ask a callback for the value; the chain runs on the answer.
    With(Arc<dyn Fn(MissingKey<'_>) -> Value + Send + Sync>),
}

impl Missing {
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(MissingKey<'_>) -> Value + Send + Sync + 'static,
    {
        Missing::With(Arc::new(f))
    }

    /// `None` means "leave the placeholder as written".
    fn value_for(&self, key: MissingKey<'_>) -> Option<Value> {
        match self {
            Missing::Default => Some(Value::String(String::new())),
            Missing::Ignore => None,
            Missing::With(f) => Some(f(key)),
        }
    }
}

impl fmt::Debug for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Default => f.write_str("Default"),
            Missing::Ignore => f.write_str("Ignore"),
            Missing::With(_) => f.write_str("With(<function>)"),
        }
    }
}

/// Engine-wide settings.
///
/// Read on every `replace`, so changes through [`FlexVars::options_mut`]
/// apply to the next call.
#[derive(Clone, Default)]
pub struct Options {
    pub missing: Missing,
    /// Global error policy. Unset means ignore the failing filter.
    pub on_error: Option<ErrorHandler>,
    /// Global empty-value policy. Unset means stop with an empty string.
    pub on_empty: Option<EmptyHandler>,
    /// Replaces the default emptiness test (`null` or `""`).
    pub is_empty: Option<IsEmpty>,
    /// Consulted for filter names that are not registered.
    pub get_filter: Option<GetFilter>,
    /// Config bag; filters find their section through `config_key`.
    pub config: Value,
}

impl Options {
    pub fn with_missing(mut self, missing: Missing) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&BoxError, &Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.set_on_error(handler);
        self
    }

    pub fn with_on_empty<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.set_on_empty(handler);
        self
    }

    pub fn with_is_empty<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.is_empty = Some(Arc::new(predicate));
        self
    }

    pub fn with_get_filter<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<FilterLookup> + Send + Sync + 'static,
    {
        self.get_filter = Some(Arc::new(lookup));
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn set_on_error<F>(&mut self, handler: F)
    where
        F: Fn(&BoxError, &Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
    }

    pub fn set_on_empty<F>(&mut self, handler: F)
    where
        F: Fn(&Value, &Args, &FilterContext<'_>) -> Result<Behavior, BoxError> + Send + Sync + 'static,
    {
        self.on_empty = Some(Arc::new(handler));
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |present: bool| if present { "<function>" } else { "None" };
        f.debug_struct("Options")
            .field("missing", &self.missing)
            .field("on_error", &set(self.on_error.is_some()))
            .field("on_empty", &set(self.on_empty.is_some()))
            .field("is_empty", &set(self.is_empty.is_some()))
            .field("get_filter", &set(self.get_filter.is_some()))
            .field("config", &self.config)
            .finish()
    }
}

// --- engine -------------------------------------------------------------------

/// An interpolation engine: a filter registry plus [`Options`].
///
/// ```
/// use flexvars::{FlexVars, FilterDef, serde_json::json};
///
/// let mut vars = FlexVars::new();
/// vars.add_filter(FilterDef::new("double", |v, _, _| {
///     Ok(flexvars::value::number(flexvars::value::as_number(v).unwrap_or(0.0) * 2.0))
/// }))
/// .unwrap();
///
/// assert_eq!(vars.replace("{n | double}", json!({"n": 21})).unwrap(), "42");
/// assert_eq!(vars.replace("{} and {}", ["a", "b"]).unwrap(), "a and b");
/// ```
#[derive(Debug, Clone)]
pub struct FlexVars {
    options: Options,
    filters: HashMap<String, FilterDef>,
}

impl Default for FlexVars {
    fn default() -> Self {
        Self::new()
    }
}

impl FlexVars {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// An engine with the `error`/`empty` control filters registered.
    pub fn with_options(options: Options) -> Self {
        let filters = filters::control::builtins().into_iter().map(|def| (def.name.clone(), def)).collect();
        FlexVars { options, filters }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Register `def`, replacing any filter of the same name.
    pub fn add_filter(&mut self, def: FilterDef) -> Result<&mut FilterDef, Error> {
        def.validate()?;
        let name = def.name.clone();
        if self.filters.contains_key(&name) {
            debug!(filter = %name, "replacing registered filter");
        }
        self.filters.insert(name.clone(), def);
        self.filters.get_mut(&name).ok_or(Error::InvalidFilter(name))
    }

    pub fn remove_filter(&mut self, name: &str) -> Option<FilterDef> {
        self.filters.remove(name)
    }

    pub fn filter(&self, name: &str) -> Option<&FilterDef> {
        self.filters.get(name)
    }

    /// Registered definitions are mutable in place; changes apply to the
    /// next `replace`.
    pub fn filter_mut(&mut self, name: &str) -> Option<&mut FilterDef> {
        self.filters.get_mut(name)
    }

    /// Whether `name` resolves to a filter (registered, dynamic or built-in).
    pub fn has_filter(&self, name: &str) -> bool {
        Resolver::new(&self.filters, &self.options).resolve(name).is_some()
    }

    /// Registered filter names, sorted.
    pub fn filter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Substitute the placeholders of `template`.
    ///
    /// Fails only when an error or empty policy selected `Throw`.
    pub fn replace(&self, template: &str, vars: impl Into<Vars>) -> Result<String, Error> {
        let resolver = Resolver::new(&self.filters, &self.options);

        match vars.into() {
            Vars::Lazy(produce) => self.replace(template, produce()),
            Vars::Named(values) => {
                debug!(template, names = values.len(), "interpolating named values");
                engine::scan_and_replace(template, ScanMode::ReplaceAll, |placeholder| {
                    let value = match values.get(&placeholder.name) {
                        Some(value) => value.resolve(),
                        None => match self.options.missing.value_for(MissingKey::Name(&placeholder.name)) {
                            Some(value) => value,
                            None => return Ok(placeholder.matched.clone()),
                        },
                    };
                    engine::execute(&resolver, &self.options, template, placeholder, value)
                })
            }
            Vars::Positional(values) => {
                debug!(template, values = values.len(), "interpolating positional values");
                let mut supplied = values.iter();
                let mut index = 0;
                engine::scan_and_replace(template, ScanMode::FirstOnly, |placeholder| {
                    let key = MissingKey::Index(index);
                    index += 1;
                    let value = match supplied.next() {
                        Some(value) => value.resolve(),
                        None => match self.options.missing.value_for(key) {
                            Some(value) => value,
                            None => return Ok(placeholder.matched.clone()),
                        },
                    };
                    engine::execute(&resolver, &self.options, template, placeholder, value)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_conversions_are_positional() {
        assert!(matches!(Vars::from("x"), Vars::Positional(v) if v.len() == 1));
        assert!(matches!(Vars::from(3), Vars::Positional(v) if v.len() == 1));
        assert!(matches!(Vars::from(()), Vars::Positional(v) if v.is_empty()));
        assert!(matches!(Vars::from(json!(null)), Vars::Positional(v) if v.len() == 1));
    }

    #[test]
    fn json_arrays_spread_and_objects_name() {
        assert!(matches!(Vars::from(json!([1, 2, 3])), Vars::Positional(v) if v.len() == 3));
        assert!(matches!(Vars::from(json!({"a": 1})), Vars::Named(m) if m.contains_key("a")));
    }

    #[test]
    fn maps_are_named() {
        let map: HashMap<&str, i32> = HashMap::from([("a", 1)]);
        assert!(matches!(Vars::from(map), Vars::Named(m) if m.contains_key("a")));
        let map: BTreeMap<String, &str> = BTreeMap::from([("b".to_string(), "x")]);
        assert!(matches!(Vars::from(map), Vars::Named(m) if m.contains_key("b")));
    }

    #[test]
    fn nested_lazy_vars_are_unwrapped() {
        let vars = Vars::lazy(|| Vars::lazy(|| ["a", "b"]));
        assert_eq!(FlexVars::new().replace("{}-{}", vars).unwrap(), "a-b");
    }

    #[test]
    fn control_filters_are_preregistered() {
        let vars = FlexVars::new();
        assert_eq!(vars.filter_names(), ["empty", "error"]);
        assert!(vars.has_filter("to_uppercase"));
        assert!(!vars.has_filter("nope"));
    }

    #[test]
    fn add_filter_rejects_blank_names() {
        let mut vars = FlexVars::new();
        let err = vars.add_filter(FilterDef::new("", |v, _, _| Ok(v.clone()))).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn add_filter_hands_back_the_stored_definition() {
        let mut vars = FlexVars::new();
        let def = vars.add_filter(FilterDef::new("x", |v, _, _| Ok(v.clone()))).unwrap();
        def.priority = crate::Priority::After;
        assert_eq!(vars.filter("x").map(|d| d.priority), Some(crate::Priority::After));
        assert!(vars.remove_filter("x").is_some());
        assert!(vars.filter("x").is_none());
    }

    #[test]
    fn missing_debug_hides_callbacks() {
        assert_eq!(format!("{:?}", Missing::with(|_| Value::Null)), "With(<function>)");
    }
}
