//! String interpolation with pipe-style filter chains.
//!
//! A template holds `{ ... }` placeholders. Each placeholder may carry a
//! literal prefix, a name, a chain of filters and a literal suffix:
//!
//! ```text
//! {( name | upper | pad_end(8, '.') )}
//!  ^  ^      ^                      ^
//!  |  |      filter chain           suffix
//!  |  name
//!  prefix
//! ```
//!
//! Values are supplied positionally (`replace("{}{}", ["a", "b"])`) or by
//! name (`replace("{x}", json!({"x": 1}))`). See [`FlexVars`] for the entry
//! point and [`FilterDef`] for writing filters.
//!
//! ```
//! use flexvars::FlexVars;
//!
//! let vars = FlexVars::new();
//! assert_eq!(vars.replace("I am {( name )}", "tom").unwrap(), "I am (tom)");
//! assert_eq!(vars.replace("I am {( name )}", ()).unwrap(), "I am ");
//! ```

extern crate self as flexvars;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod filters;
pub mod value;

pub use serde_json;

pub use api::{FlexVars, Missing, MissingKey, Options, VarValue, Vars, replace};
pub use engine::{
    Args, Behavior, Defaults, EmptyHandler, ErrorHandler, FilterBuilder, FilterContext, FilterDef, FilterLookup,
    GetFilter, IsEmpty, Transform, has_interpolation, parse_args, parse_chain, parse_template, tag, tag_pairs,
    untag, untag_pairs,
};
pub use error::{BoxError, Error};

use serde_json::Value;

// --- Parsed template types --------------------------------------------------

/// One argument slot of a filter call.
///
/// `None` is an unset slot (`f(a,,b)` leaves the second slot unset); it is
/// not the same as `Some(Value::Null)`, which is an explicit `null`.
pub type RawArg = Option<Value>;

/// Where a filter runs in its chain, independent of where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// Runs ahead of every normal filter.
    Before,
    /// Runs in textual order.
    #[default]
    Normal,
    /// Runs after every normal filter.
    After,
}

/// A single `name(args)` stage parsed from a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<RawArg>,
}

impl FilterCall {
    pub fn new(name: impl Into<String>, args: Vec<RawArg>) -> Self {
        FilterCall { name: name.into(), args }
    }
}

/// A placeholder found in a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Variable name; empty for `{}` and `{ | filter }`.
    pub name: String,
    /// Literal emitted before a non-empty result.
    pub prefix: String,
    /// Literal emitted after a non-empty result.
    pub suffix: String,
    /// Filters in textual order.
    pub chain: Vec<FilterCall>,
    /// The original placeholder text, braces included.
    pub matched: String,
    /// Start byte index in the scanned template.
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}
