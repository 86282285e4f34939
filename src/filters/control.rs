//! `error(..)` and `empty(..)`: per-placeholder policy overrides.
//!
//! ```text
//! { price | error('abort', 'N/A') | to_fixed(2) }
//!           └ runs first (Before), installs an error override,
//!             passes the value through unchanged
//! ```
//!
//! Keywords: `ignore`, `abort`, `throw`. The optional second argument is the
//! replacement value (`ignore`/`abort`) or the error message (`throw`).

use crate::{Behavior, BoxError, FilterDef, Priority};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operate {
    Ignore,
    Abort,
    Throw,
}

impl Operate {
    fn parse(filter: &str, keyword: Option<&str>, fallback: Operate) -> Operate {
        match keyword.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            Some("ignore") => Operate::Ignore,
            Some("abort") => Operate::Abort,
            Some("throw") => Operate::Throw,
            None | Some("") => fallback,
            Some(other) => {
                warn!(filter, keyword = other, "unknown keyword, using {:?}", fallback);
                fallback
            }
        }
    }

    fn behavior(self, payload: Option<Value>) -> Behavior {
        match self {
            Operate::Ignore => Behavior::Ignore(payload),
            Operate::Abort => Behavior::Abort(payload),
            Operate::Throw => Behavior::Throw(payload.map(message)),
        }
    }
}

fn message(payload: Value) -> BoxError {
    match payload {
        Value::String(s) => s.into(),
        other => other.to_string().into(),
    }
}

/// Payload argument, with an explicit `null` treated as absent.
fn payload(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

/// `error(operate = "ignore", message)`.
pub(crate) fn error_filter() -> FilterDef {
    let mut def = filter! {
        name: "error",
        priority: Priority::Before,
        args: ["operate", "message"],
        default: { "operate": "ignore" },
        next: |value, args, ctx| {
            let operate = Operate::parse("error", args.get_str("operate"), Operate::Ignore);
            let message = payload(args.get("message"));
            ctx.set_on_error(move |_, _, _, _| Ok(operate.behavior(message.clone())));
            Ok(value.clone())
        },
    };
    def.control = true;
    def
}

/// `empty(operate = "abort", value)`.
pub(crate) fn empty_filter() -> FilterDef {
    let mut def = filter! {
        name: "empty",
        priority: Priority::Before,
        args: ["operate", "value"],
        default: { "operate": "abort" },
        next: |value, args, ctx| {
            let operate = Operate::parse("empty", args.get_str("operate"), Operate::Abort);
            let replacement = payload(args.get("value"));
            ctx.set_on_empty(move |_, _, _| Ok(operate.behavior(replacement.clone())));
            Ok(value.clone())
        },
    };
    def.control = true;
    def
}

/// Control filters registered in every new engine.
pub(crate) fn builtins() -> [FilterDef; 2] {
    [error_filter(), empty_filter()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(Operate::parse("error", Some(" THROW "), Operate::Ignore), Operate::Throw);
        assert_eq!(Operate::parse("error", Some("Abort"), Operate::Ignore), Operate::Abort);
    }

    #[test]
    fn unknown_keyword_falls_back() {
        assert_eq!(Operate::parse("empty", Some("explode"), Operate::Abort), Operate::Abort);
        assert_eq!(Operate::parse("empty", None, Operate::Abort), Operate::Abort);
    }

    #[test]
    fn throw_payload_becomes_the_message() {
        match Operate::Throw.behavior(Some(Value::from("bad"))) {
            Behavior::Throw(Some(err)) => assert_eq!(err.to_string(), "bad"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(Operate::Throw.behavior(None), Behavior::Throw(None)));
    }

    #[test]
    fn control_filters_are_flagged_and_run_first() {
        for def in builtins() {
            assert!(def.control);
            assert_eq!(def.priority, Priority::Before);
        }
    }
}
