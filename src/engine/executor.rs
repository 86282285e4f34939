//! Filter chain execution.
//!
//! ```text
//! Placeholder.chain ──resolve──▶ [(FilterDef, call)]  (unknown names dropped)
//!                                 │
//!                   stable sort   ▼  Before < Normal < After
//!                                 │
//!   value ──▶ f1 ──▶ f2 ──▶ ... ──▶ fn ──▶ wrap(prefix, value, suffix)
//!             │  Err: error policy ─┐
//!             │  empty: empty policy┤
//!             ▼                     ▼
//!          Continue / Stop / Propagate
//! ```
//!
//! Policy lookup order for every stage is: override installed in the
//! [`FilterContext`] by a control filter, then the filter's own handler, then
//! the global one in [`Options`].

use super::context::{Args, FilterContext};
use super::definition::FilterDef;
use super::policy::{self, Flow};
use super::resolve::Resolver;
use crate::api::Options;
use crate::error::Error;
use crate::{FilterCall, Placeholder, Priority, RawArg, value};
use serde_json::Value;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Run `placeholder`'s chain over `input` and return the text to splice in.
pub(crate) fn execute(
    resolver: &Resolver<'_>,
    options: &Options,
    template: &str,
    placeholder: &Placeholder,
    input: Value,
) -> Result<String, Error> {
    let is_empty = |v: &Value| match &options.is_empty {
        Some(predicate) => predicate(v),
        None => value::is_empty(v),
    };

    let stages = ordered_stages(resolver, &placeholder.chain);
    let mut ctx = FilterContext::new(
        &placeholder.name,
        input.clone(),
        template,
        &placeholder.matched,
        &placeholder.prefix,
        &placeholder.suffix,
    );
    let mut current = input;

    for (def, call) in stages {
        let section = def.config_key.as_deref().and_then(|key| config_section(&options.config, key));
        let args = merge_args(&def, &call.args, section);
        ctx.args = call.args.clone();
        ctx.config = section.cloned();

        trace!(filter = %def.name, value = %current, "running filter");
        let flow = match (def.next)(&current, &args, &mut ctx) {
            Ok(output) if def.control || !is_empty(&output) => Flow::Continue(output),
            Ok(output) => {
                let outcome = if let Some(handler) = ctx.on_empty() {
                    Some(handler(&output, &args, &ctx))
                } else if let Some(handler) = &def.on_empty {
                    Some(handler(&output, &args, &ctx))
                } else {
                    options.on_empty.as_ref().map(|handler| handler(&output, &args, &ctx))
                };
                policy::empty_flow(&def.name, current, output, outcome)
            }
            Err(error) => {
                debug!(filter = %def.name, %error, "filter failed");
                let outcome = if let Some(handler) = ctx.on_error() {
                    Some(handler(&error, &current, &args, &ctx))
                } else if let Some(handler) = &def.on_error {
                    Some(handler(&error, &current, &args, &ctx))
                } else {
                    options.on_error.as_ref().map(|handler| handler(&error, &current, &args, &ctx))
                };
                policy::error_flow(&def.name, error, current, outcome)
            }
        };

        match flow {
            Flow::Continue(next) => current = next,
            Flow::Stop(last) => {
                debug!(filter = %def.name, "chain stopped");
                current = last;
                break;
            }
            Flow::Propagate(err) => return Err(err),
        }
    }

    Ok(wrap(placeholder, &current, is_empty(&current)))
}

/// Resolve the chain and order it by priority, keeping textual order within
/// a priority.
fn ordered_stages<'r, 'c>(
    resolver: &Resolver<'r>,
    chain: &'c [FilterCall],
) -> Vec<(Cow<'r, FilterDef>, &'c FilterCall)> {
    let mut stages: Vec<_> = chain
        .iter()
        .filter_map(|call| match resolver.resolve(&call.name) {
            Some(def) => Some((def, call)),
            None => {
                debug!(filter = %call.name, "unknown filter, skipped");
                None
            }
        })
        .collect();
    stages.sort_by_key(|(def, _)| rank(def.priority));
    stages
}

fn rank(priority: Priority) -> u8 {
    match priority {
        Priority::Before => 0,
        Priority::Normal => 1,
        Priority::After => 2,
    }
}

/// Look up a dotted `key` (`"units.money"`) in the config bag.
fn config_section<'v>(config: &'v Value, key: &str) -> Option<&'v Value> {
    if key.is_empty() {
        return None;
    }
    config.pointer(&format!("/{}", key.replace('.', "/")))
}

/// Layer defaults, config section and call-site arguments into named args.
///
/// A call with a single object argument merges that object key by key.
/// Otherwise set slots are named after the declared argument list; unset
/// slots leave the lower layers in place.
fn merge_args(def: &FilterDef, raw: &[RawArg], section: Option<&Value>) -> Args {
    let mut named = def.defaults.evaluate();

    if let Some(Value::Object(config)) = section {
        named.extend(config.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    match raw {
        [Some(Value::Object(map))] => {
            named.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        _ => {
            if let Some(names) = &def.args {
                for (name, slot) in names.iter().zip(raw) {
                    if let Some(value) = slot {
                        named.insert(name.clone(), value.clone());
                    }
                }
            }
        }
    }

    Args::new(named, raw.to_vec())
}

fn wrap(placeholder: &Placeholder, result: &Value, empty: bool) -> String {
    let text = value::render(result);
    if empty {
        return text;
    }
    format!("{}{}{}", placeholder.prefix, text, placeholder.suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Defaults;
    use serde_json::json;

    fn unit() -> FilterDef {
        FilterDef::new("unit", |v, _, _| Ok(v.clone()))
            .with_args(["prefix", "suffix", "upper"])
            .with_defaults(Defaults::from_value(json!({"prefix": "", "suffix": "", "upper": false})))
            .with_config_key("units.money")
    }

    #[test]
    fn positional_args_skip_unset_slots() {
        let args = merge_args(&unit(), &[Some(json!("$")), None, Some(json!(true))], None);
        assert_eq!(args.get_str("prefix"), Some("$"));
        assert_eq!(args.get_str("suffix"), Some(""));
        assert_eq!(args.get_bool("upper"), Some(true));
        assert_eq!(args.positional().len(), 3);
    }

    #[test]
    fn single_object_argument_merges_by_key() {
        let args = merge_args(&unit(), &[Some(json!({"suffix": "元"}))], None);
        assert_eq!(args.get_str("prefix"), Some(""));
        assert_eq!(args.get_str("suffix"), Some("元"));
    }

    #[test]
    fn config_section_sits_between_defaults_and_call() {
        let config = json!({"units": {"money": {"prefix": "€", "suffix": "EUR"}}});
        let section = config_section(&config, "units.money");
        let args = merge_args(&unit(), &[None, Some(json!("USD"))], section);
        assert_eq!(args.get_str("prefix"), Some("€"));
        assert_eq!(args.get_str("suffix"), Some("USD"));
    }

    #[test]
    fn non_object_config_section_is_ignored() {
        let config = json!({"units": {"money": 3}});
        let args = merge_args(&unit(), &[], config_section(&config, "units.money"));
        assert_eq!(args.get_str("prefix"), Some(""));
    }

    #[test]
    fn missing_config_section() {
        assert!(config_section(&json!({}), "a.b").is_none());
        assert!(config_section(&json!({"a": 1}), "").is_none());
    }

    #[test]
    fn undeclared_args_stay_positional_only() {
        let def = FilterDef::new("f", |v, _, _| Ok(v.clone()));
        let args = merge_args(&def, &[Some(json!(1))], None);
        assert!(args.named().is_empty());
        assert_eq!(args.arg(0), Some(&json!(1)));
    }
}
