//! Filters available without registration.
//!
//! - `control.rs`: the `error(..)` / `empty(..)` policy overrides, registered
//!   in every engine.
//! - `ops.rs`: value operations (`to_uppercase`, `join`, `to_fixed`, ...)
//!   resolved by name when nothing else provides the filter.

pub(crate) mod control;
pub(crate) mod ops;
