//! Filter name resolution.
//!
//! A chain names its filters; resolution turns each name into a definition:
//!
//! ```text
//! name ──▶ registry ──hit──▶ borrowed FilterDef
//!            │ miss
//!            ▼
//!          Options::get_filter ──Definition──▶ owned FilterDef
//!            │ None            └─Transform───▶ owned minimal FilterDef
//!            ▼
//!          built-in value ops ──hit──▶ owned adapter FilterDef
//!            │ miss
//!            ▼
//!          None (the stage is skipped)
//! ```
//!
//! Registered filters are borrowed; everything produced on the fly is owned,
//! hence the `Cow`.

use super::definition::{FilterDef, FilterLookup, GetFilter};
use crate::api::Options;
use crate::filters::ops;
use std::borrow::Cow;
use std::collections::HashMap;

pub(crate) struct Resolver<'a> {
    filters: &'a HashMap<String, FilterDef>,
    lookup: Option<&'a GetFilter>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(filters: &'a HashMap<String, FilterDef>, options: &'a Options) -> Self {
        Resolver { filters, lookup: options.get_filter.as_ref() }
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<Cow<'a, FilterDef>> {
        if let Some(def) = self.filters.get(name) {
            return Some(Cow::Borrowed(def));
        }

        if let Some(lookup) = self.lookup {
            match lookup(name) {
                Some(FilterLookup::Definition(mut def)) => {
                    if def.name.is_empty() {
                        def.name = name.to_string();
                    }
                    return Some(Cow::Owned(def));
                }
                Some(FilterLookup::Transform(next)) => {
                    return Some(Cow::Owned(FilterDef::with_transform(name, next)));
                }
                None => {}
            }
        }

        ops::lookup(name).map(Cow::Owned)
    }
}
