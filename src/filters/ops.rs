//! Built-in value operations usable as filters without registration.
//!
//! Each entry names an operation and the kind of value it works on. A name
//! can appear once per kind (`len`, `slice` work on text and lists). When the
//! running value has no matching kind the operation passes it through
//! unchanged:
//!
//! ```text
//! { name | to_uppercase }   "tom"  -> "TOM"
//! { n    | to_uppercase }   42     -> 42       (no TEXT capability)
//! { xs   | join(' / ') }    [1,2]  -> "1 / 2"
//! ```
//!
//! Registered filters and the dynamic source always take precedence over
//! these names.

use crate::value::{as_number, number, render};
use crate::{Args, BoxError, FilterDef};
use serde_json::Value;
use tracing::trace;

bitflags::bitflags! {
    /// What a value can do.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Capability: u8 {
        const TEXT   = 1 << 0;
        const NUMBER = 1 << 1;
        const LIST   = 1 << 2;
    }
}

impl Capability {
    pub(crate) fn of(value: &Value) -> Capability {
        match value {
            Value::String(_) => Capability::TEXT,
            Value::Number(_) => Capability::NUMBER,
            Value::Array(_) => Capability::LIST,
            _ => Capability::empty(),
        }
    }
}

type Apply = fn(&Value, &Args) -> Result<Value, BoxError>;

struct Op {
    name: &'static str,
    needs: Capability,
    apply: Apply,
}

static OPS: &[Op] = &[
    Op { name: "to_uppercase", needs: Capability::TEXT, apply: to_uppercase },
    Op { name: "to_lowercase", needs: Capability::TEXT, apply: to_lowercase },
    Op { name: "trim", needs: Capability::TEXT, apply: trim },
    Op { name: "trim_start", needs: Capability::TEXT, apply: trim_start },
    Op { name: "trim_end", needs: Capability::TEXT, apply: trim_end },
    Op { name: "pad_start", needs: Capability::TEXT, apply: pad_start },
    Op { name: "pad_end", needs: Capability::TEXT, apply: pad_end },
    Op { name: "repeat", needs: Capability::TEXT, apply: repeat },
    Op { name: "replace", needs: Capability::TEXT, apply: replace },
    Op { name: "split", needs: Capability::TEXT, apply: split },
    Op { name: "slice", needs: Capability::TEXT, apply: slice_text },
    Op { name: "len", needs: Capability::TEXT, apply: len_text },
    Op { name: "to_fixed", needs: Capability::NUMBER, apply: to_fixed },
    Op { name: "abs", needs: Capability::NUMBER, apply: abs },
    Op { name: "round", needs: Capability::NUMBER, apply: round },
    Op { name: "floor", needs: Capability::NUMBER, apply: floor },
    Op { name: "ceil", needs: Capability::NUMBER, apply: ceil },
    Op { name: "join", needs: Capability::LIST, apply: join },
    Op { name: "reverse", needs: Capability::LIST, apply: reverse },
    Op { name: "first", needs: Capability::LIST, apply: first },
    Op { name: "last", needs: Capability::LIST, apply: last },
    Op { name: "slice", needs: Capability::LIST, apply: slice_list },
    Op { name: "len", needs: Capability::LIST, apply: len_list },
];

/// Adapter definition for a built-in operation name.
pub(crate) fn lookup(name: &str) -> Option<FilterDef> {
    let name: &'static str = OPS.iter().find(|op| op.name == name)?.name;
    Some(FilterDef::new(name, move |value, args, _ctx| apply(name, value, args)))
}

fn apply(name: &str, value: &Value, args: &Args) -> Result<Value, BoxError> {
    let has = Capability::of(value);
    match OPS.iter().find(|op| op.name == name && has.intersects(op.needs)) {
        Some(op) => (op.apply)(value, args),
        None => {
            trace!(filter = name, "value lacks capability, passed through");
            Ok(value.clone())
        }
    }
}

// --- argument helpers ---------------------------------------------------------

/// Upper bound, in bytes, on text produced by `repeat` and the `pad_*` ops.
const MAX_OUTPUT: usize = 1 << 20;

fn int_arg(args: &Args, index: usize) -> Option<i64> {
    args.arg(index).and_then(as_number).map(|f| f.trunc() as i64)
}

fn text_arg(args: &Args, index: usize) -> Option<String> {
    args.arg(index).map(render)
}

fn count_arg(args: &Args, index: usize, what: &str) -> Result<usize, BoxError> {
    match int_arg(args, index) {
        Some(n) if n >= 0 => Ok(n as usize),
        Some(n) => Err(format!("{what} must not be negative, got {n}").into()),
        None => Err(format!("{what} is required").into()),
    }
}

/// Clamp `start..end` the way slicing with negative offsets usually works.
fn span(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let norm = |i: i64| if i < 0 { (len as i64 + i).max(0) as usize } else { (i as usize).min(len) };
    let from = start.map(norm).unwrap_or(0);
    let to = end.map(norm).unwrap_or(len);
    (from, to.max(from))
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

fn list(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

// --- text ---------------------------------------------------------------------

fn to_uppercase(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(text(value).to_uppercase().into())
}

fn to_lowercase(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(text(value).to_lowercase().into())
}

fn trim(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(text(value).trim().into())
}

fn trim_start(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(text(value).trim_start().into())
}

fn trim_end(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(text(value).trim_end().into())
}

fn padding(value: &Value, args: &Args) -> Result<(String, String), BoxError> {
    let width = count_arg(args, 0, "pad width")?;
    if width > MAX_OUTPUT {
        return Err(format!("pad width {width} exceeds the {MAX_OUTPUT} limit").into());
    }
    let fill = text_arg(args, 1).unwrap_or_else(|| " ".to_string());
    let s = text(value);
    let missing = width.saturating_sub(s.chars().count());
    if missing == 0 || fill.is_empty() {
        return Ok((String::new(), s.to_string()));
    }
    Ok((fill.chars().cycle().take(missing).collect(), s.to_string()))
}

fn pad_start(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let (pad, s) = padding(value, args)?;
    Ok(format!("{pad}{s}").into())
}

fn pad_end(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let (pad, s) = padding(value, args)?;
    Ok(format!("{s}{pad}").into())
}

fn repeat(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let times = count_arg(args, 0, "repeat count")?;
    let s = text(value);
    match s.len().checked_mul(times) {
        Some(size) if size <= MAX_OUTPUT => Ok(s.repeat(times).into()),
        _ => Err(format!("repeating {} bytes {times} times exceeds the {MAX_OUTPUT} byte limit", s.len()).into()),
    }
}

fn replace(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let from = text_arg(args, 0).ok_or("replace needs a pattern")?;
    let to = text_arg(args, 1).unwrap_or_default();
    if from.is_empty() {
        return Ok(value.clone());
    }
    Ok(text(value).replace(&from, &to).into())
}

fn split(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let sep = text_arg(args, 0).unwrap_or_else(|| ",".to_string());
    let parts: Vec<Value> = if sep.is_empty() {
        text(value).chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        text(value).split(sep.as_str()).map(Value::from).collect()
    };
    Ok(Value::Array(parts))
}

fn slice_text(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let chars: Vec<char> = text(value).chars().collect();
    let (from, to) = span(chars.len(), int_arg(args, 0), int_arg(args, 1));
    Ok(chars[from..to].iter().collect::<String>().into())
}

fn len_text(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(text(value).chars().count().into())
}

// --- number -------------------------------------------------------------------

fn num(value: &Value) -> f64 {
    as_number(value).unwrap_or(0.0)
}

fn to_fixed(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let digits = int_arg(args, 0).unwrap_or(0);
    if !(0..=100).contains(&digits) {
        return Err(format!("to_fixed digits out of range: {digits}").into());
    }
    Ok(format!("{:.*}", digits as usize, num(value)).into())
}

fn abs(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(number(num(value).abs()))
}

fn round(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(number(num(value).round()))
}

fn floor(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(number(num(value).floor()))
}

fn ceil(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(number(num(value).ceil()))
}

// --- list ---------------------------------------------------------------------

fn join(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let sep = text_arg(args, 0).unwrap_or_else(|| ",".to_string());
    Ok(list(value).iter().map(render).collect::<Vec<_>>().join(&sep).into())
}

fn reverse(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(Value::Array(list(value).iter().rev().cloned().collect()))
}

fn first(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(list(value).first().cloned().unwrap_or(Value::Null))
}

fn last(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(list(value).last().cloned().unwrap_or(Value::Null))
}

fn slice_list(value: &Value, args: &Args) -> Result<Value, BoxError> {
    let items = list(value);
    let (from, to) = span(items.len(), int_arg(args, 0), int_arg(args, 1));
    Ok(Value::Array(items[from..to].to_vec()))
}

fn len_list(value: &Value, _: &Args) -> Result<Value, BoxError> {
    Ok(list(value).len().into())
}
